#![allow(dead_code)]
use pyrt::{Runtime, Value};

/// Builds a chain of `depth` types below `object`, each adding one member,
/// and returns the leaf type.
pub fn deep_hierarchy(rt: &mut Runtime, depth: usize) -> Value {
    let mut base = None;
    for level in 0..depth {
        let marker = rt.new_int(level as i64);
        let name = format!("Level{level}");
        let member = format!("member{level}");
        base = Some(
            rt.define_type(&name, base, &[(member.as_str(), marker)])
                .unwrap_or_else(|err| panic!("define {name}: {err}")),
        );
    }
    base.expect("depth must be positive")
}

pub fn int_tuple(rt: &mut Runtime, len: i64) -> Value {
    let items = (0..len).map(|value| rt.new_int(value)).collect();
    rt.new_tuple(items)
}
