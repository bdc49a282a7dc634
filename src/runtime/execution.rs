//! The global namespace: builtin types, singletons and builtin functions
//! reachable by name.

use crate::builtins::BuiltinFunction;
use crate::runtime::context::Runtime;
use crate::runtime::error::RtResult;
use crate::runtime::value::Value;

impl Runtime {
    /// Looks a global up by name, raising `NameError` when it is unbound.
    pub fn global_get(&mut self, name: &str) -> RtResult<Value> {
        match self.globals.get(name) {
            Some(value) => Ok(value),
            None => Err(self.name_error(name)),
        }
    }

    pub fn global_set(&mut self, name: &str, value: Value) {
        self.globals.insert(name, value);
    }

    pub fn global_names(&self) -> Vec<String> {
        self.globals.keys().map(|name| name.to_string()).collect()
    }

    /// Calls the global bound to `name`.
    pub fn call_global(&mut self, name: &str, args: &[Value]) -> RtResult<Value> {
        let callee = self.global_get(name)?;
        self.call(callee, args)
    }
}

/// Binds every builtin under its own name unless something already claimed it.
pub(crate) fn seed_builtin_globals(rt: &mut Runtime) {
    let types = *rt.types();
    let mut seeded: Vec<(String, Value)> = types
        .all()
        .into_iter()
        .map(|ty| (rt.type_name(ty).to_string(), ty))
        .collect();
    seeded.extend([
        ("None".to_string(), rt.none()),
        ("NotImplemented".to_string(), rt.not_implemented()),
        ("True".to_string(), rt.true_value()),
        ("False".to_string(), rt.false_value()),
    ]);
    for builtin in BuiltinFunction::ALL {
        let function = rt.new_function(builtin.name(), move |rt, args| builtin.call(rt, args));
        seeded.push((builtin.name().to_string(), function));
    }
    for (name, value) in seeded {
        if !rt.globals.contains_key(&name) {
            rt.globals.insert(&name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::console::BufferConsole;
    use crate::runtime::context::Runtime;

    #[test]
    fn builtin_types_and_singletons_are_bound_by_name() {
        let mut rt = Runtime::new();
        let types = *rt.types();
        assert_eq!(rt.global_get("int").expect("int"), types.int);
        assert_eq!(rt.global_get("NoneType").expect("NoneType"), types.none);
        assert_eq!(rt.global_get("StopIteration").expect("StopIteration"), types.stop_iteration);
        assert_eq!(rt.global_get("None").expect("None"), rt.none());
        assert_eq!(rt.global_get("True").expect("True"), rt.true_value());
        assert!(rt.global_names().iter().any(|name| name == "isinstance"));
    }

    #[test]
    fn unbound_names_raise_name_error() {
        let mut rt = Runtime::new();
        let error = rt.global_get("undefined").expect_err("unbound");
        assert!(rt.is_exception(&error, rt.types().name_error));
        assert_eq!(error.to_string(), "NameError: undefined");
    }

    #[test]
    fn globals_can_be_rebound() {
        let mut rt = Runtime::new();
        let seven = rt.new_int(7);
        rt.global_set("answer", seven);
        assert_eq!(rt.global_get("answer").expect("answer"), seven);
        rt.global_set("len", seven);
        assert_eq!(rt.global_get("len").expect("shadowed"), seven);
    }

    #[test]
    fn print_writes_space_separated_text_and_a_newline() {
        let console = BufferConsole::default();
        let mut rt = Runtime::with_console(Box::new(console.clone()));
        let (one, text) = (rt.new_int(1), rt.new_str("two"));
        rt.call_global("print", &[one, text]).expect("print");
        rt.call_global("print", &[]).expect("print()");
        assert_eq!(console.output(), "1 two\n\n");
    }
}
