use crate::runtime::context::Runtime;
use crate::runtime::error::RtResult;
use crate::runtime::iteration::Resume;
use crate::runtime::operator::BinaryOp;
use crate::runtime::value::Value;

/// Native functions installed in the global namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFunction {
    Print,
    RawPrint,
    Input,
    Flush,
    Repr,
    Len,
    Getattr,
    Setattr,
    Isinstance,
    Iter,
    Next,
    All,
    Any,
    Map,
    Divmod,
    Pow,
    Id,
}

impl BuiltinFunction {
    pub const ALL: [Self; 17] = [
        Self::Print,
        Self::RawPrint,
        Self::Input,
        Self::Flush,
        Self::Repr,
        Self::Len,
        Self::Getattr,
        Self::Setattr,
        Self::Isinstance,
        Self::Iter,
        Self::Next,
        Self::All,
        Self::Any,
        Self::Map,
        Self::Divmod,
        Self::Pow,
        Self::Id,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Print => "print",
            Self::RawPrint => "raw_print",
            Self::Input => "input",
            Self::Flush => "flush",
            Self::Repr => "repr",
            Self::Len => "len",
            Self::Getattr => "getattr",
            Self::Setattr => "setattr",
            Self::Isinstance => "isinstance",
            Self::Iter => "iter",
            Self::Next => "next",
            Self::All => "all",
            Self::Any => "any",
            Self::Map => "map",
            Self::Divmod => "divmod",
            Self::Pow => "pow",
            Self::Id => "id",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|builtin| builtin.name() == name)
    }

    pub fn call(self, rt: &mut Runtime, args: &[Value]) -> RtResult<Value> {
        let name = self.name();
        match self {
            Self::Print => {
                let mut rendered = Vec::with_capacity(args.len());
                for &arg in args {
                    rendered.push(rt.to_text(arg)?);
                }
                let mut line = rendered.join(" ");
                line.push('\n');
                rt.write_console(&line)?;
                Ok(rt.none())
            }
            Self::RawPrint => {
                rt.expect_args(name, args, 1..=1)?;
                let text = rt.to_text(args[0])?;
                rt.write_console(&text)?;
                Ok(rt.none())
            }
            Self::Input => {
                rt.expect_args(name, args, 0..=1)?;
                if let Some(&prompt) = args.first()
                    && !rt.is_none(prompt)
                {
                    let prompt = rt.to_text(prompt)?;
                    rt.write_console(&prompt)?;
                    rt.flush_console()?;
                }
                match rt.read_console_line()? {
                    Some(line) => Ok(rt.new_str(&line)),
                    None => Err(rt.value_error("EOF when reading a line")),
                }
            }
            Self::Flush => {
                rt.expect_args(name, args, 0..=0)?;
                rt.flush_console()?;
                Ok(rt.none())
            }
            Self::Repr => {
                rt.expect_args(name, args, 1..=1)?;
                let rendered = rt.repr(args[0])?;
                Ok(rt.new_str(&rendered))
            }
            Self::Len => {
                rt.expect_args(name, args, 1..=1)?;
                let len = rt.len(args[0])?;
                Ok(rt.new_int(len as i64))
            }
            Self::Getattr => {
                rt.expect_args(name, args, 2..=3)?;
                let attribute = attribute_name(rt, name, args[1])?;
                match (rt.get_attribute_or(args[0], &attribute), args.get(2)) {
                    (Some(found), _) => Ok(found),
                    (None, Some(&default)) => Ok(default),
                    (None, None) => Err(rt.attribute_error(&attribute)),
                }
            }
            Self::Setattr => {
                rt.expect_args(name, args, 3..=3)?;
                let attribute = attribute_name(rt, name, args[1])?;
                rt.set_attribute(args[0], &attribute, args[2]);
                Ok(rt.none())
            }
            Self::Isinstance => {
                rt.expect_args(name, args, 2..=2)?;
                if !rt.is_type(args[1]) {
                    return Err(rt.type_error("isinstance() arg 2 must be a type"));
                }
                Ok(rt.new_bool(rt.is_instance_of(args[0], args[1])))
            }
            Self::Iter => {
                rt.expect_args(name, args, 1..=2)?;
                match args.get(1) {
                    None => rt.iter(args[0]),
                    Some(&sentinel) => Ok(call_until(rt, args[0], sentinel)),
                }
            }
            Self::Next => {
                rt.expect_args(name, args, 1..=2)?;
                match args.get(1) {
                    None => rt.next(args[0]),
                    Some(&default) => rt.next_or(args[0], default),
                }
            }
            Self::All | Self::Any => {
                rt.expect_args(name, args, 1..=1)?;
                let wanted = self == Self::Any;
                let iterator = rt.iter(args[0])?;
                while let Some(item) = rt.next_item(iterator)? {
                    if rt.truthy(item)? == wanted {
                        return Ok(rt.new_bool(wanted));
                    }
                }
                Ok(rt.new_bool(!wanted))
            }
            Self::Map => {
                rt.expect_args(name, args, 2..=2)?;
                let function = args[0];
                let iterator = rt.iter(args[1])?;
                let held = vec![function, iterator];
                Ok(rt.new_native_generator_holding(held, move |rt| {
                    match rt.next_item(iterator)? {
                        Some(item) => Ok(Resume::Yield(rt.call(function, &[item])?)),
                        None => Ok(Resume::Complete(None)),
                    }
                }))
            }
            Self::Divmod => {
                rt.expect_args(name, args, 2..=2)?;
                rt.divmod(args[0], args[1])
            }
            Self::Pow => {
                rt.expect_args(name, args, 2..=2)?;
                rt.binary_op(BinaryOp::Pow, args[0], args[1])
            }
            Self::Id => {
                rt.expect_args(name, args, 1..=1)?;
                Ok(rt.new_int(args[0].id() as i64))
            }
        }
    }
}

fn attribute_name(rt: &mut Runtime, builtin: &str, value: Value) -> RtResult<std::rc::Rc<str>> {
    match rt.str_value(value) {
        Some(name) => Ok(name),
        None => Err(rt.type_error(format!("`{builtin}` requires the attribute name to be str"))),
    }
}

/// `iter(callable, sentinel)`: calls `callable` until it returns a value
/// equal to `sentinel`.
fn call_until(rt: &mut Runtime, callable: Value, sentinel: Value) -> Value {
    let mut done = false;
    rt.new_native_generator_holding(vec![callable, sentinel], move |rt| {
        if done {
            return Ok(Resume::Complete(None));
        }
        let value = rt.call(callable, &[])?;
        if rt.values_equal(value, sentinel)? {
            done = true;
            return Ok(Resume::Complete(None));
        }
        Ok(Resume::Yield(value))
    })
}
