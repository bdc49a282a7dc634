//! Text-keyed mappings: the storage behind attribute maps and `dict`.
//!
//! Storage preserves insertion order (`entries`) while `index` accelerates
//! lookup by key. Removing an entry shifts the later ones down and reindexes
//! them, so enumeration always follows insertion order.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::runtime::context::Runtime;
use crate::runtime::error::RtResult;
use crate::runtime::iteration::Resume;
use crate::runtime::value::Value;

#[derive(Debug, Clone, Default)]
pub(crate) struct OrderedDict {
    entries: Vec<(Rc<str>, Value)>,
    index: FxHashMap<Rc<str>, usize>,
}

impl OrderedDict {
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn get(&self, key: &str) -> Option<Value> {
        self.index.get(key).map(|&slot| self.entries[slot].1)
    }

    pub(crate) fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Stores `value` under `key`, returning the value it replaced.
    ///
    /// Overwriting keeps the key at its original position.
    pub(crate) fn insert(&mut self, key: &str, value: Value) -> Option<Value> {
        if let Some(&slot) = self.index.get(key) {
            return Some(std::mem::replace(&mut self.entries[slot].1, value));
        }
        let key: Rc<str> = key.into();
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<Value> {
        let slot = self.index.remove(key)?;
        let (_, value) = self.entries.remove(slot);
        for (shifted, (key, _)) in self.entries.iter().enumerate().skip(slot) {
            self.index.insert(key.clone(), shifted);
        }
        Some(value)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Rc<str>, Value)> + '_ {
        self.entries.iter().map(|(key, value)| (key, *value))
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &Rc<str>> + '_ {
        self.entries.iter().map(|(key, _)| key)
    }
}

impl<'a> FromIterator<(&'a str, Value)> for OrderedDict {
    fn from_iter<I: IntoIterator<Item = (&'a str, Value)>>(iter: I) -> Self {
        let mut dict = Self::default();
        for (key, value) in iter {
            dict.insert(key, value);
        }
        dict
    }
}

impl Runtime {
    fn expect_text_key(&mut self, key: Value) -> RtResult<Rc<str>> {
        match self.str_value(key) {
            Some(text) => Ok(text),
            None => {
                let type_name = self.type_name(self.type_of(key));
                Err(self.type_error(format!("dict keys must be str, not {type_name}")))
            }
        }
    }

    /// Storage of a `dict` receiver; anything else is a `TypeError`.
    fn dict_receiver(&mut self, name: &str, receiver: Value) -> RtResult<&mut OrderedDict> {
        if self.dict_storage(receiver).is_none() {
            return Err(self.type_error(format!("`{name}` requires a dict receiver")));
        }
        self.dict_storage_mut(receiver)
    }

    pub fn dict_get(&mut self, dict: Value, key: Value) -> RtResult<Option<Value>> {
        let key = self.expect_text_key(key)?;
        Ok(self.dict_receiver("dict.get", dict)?.get(&key))
    }

    pub fn dict_set(&mut self, dict: Value, key: Value, value: Value) -> RtResult<()> {
        let key = self.expect_text_key(key)?;
        self.dict_receiver("dict.__setitem__", dict)?.insert(&key, value);
        Ok(())
    }
}

pub(crate) fn install(rt: &mut Runtime) {
    let dict = rt.types.dict;
    rt.define_native(dict, "__new__", |rt, args| {
        let Some(&cls) = args.first() else {
            return Err(rt.type_error("`dict.__new__` needs a type"));
        };
        Ok(rt.new_dict_of(cls, OrderedDict::default()))
    });
    rt.define_native(dict, "__init__", |rt, args| {
        rt.expect_args("dict.__init__", args, 1..=2)?;
        if let Some(&source) = args.get(1) {
            let dict = args[0];
            rt.for_each(source, |rt, pair| {
                let parts = rt.collect(pair)?;
                let [key, value] = parts[..] else {
                    return Err(rt.value_error(format!(
                        "dict update sequence element has length {}; 2 is required",
                        parts.len()
                    )));
                };
                rt.dict_set(dict, key, value)
            })?;
        }
        Ok(rt.none())
    });
    rt.define_native(dict, "get", |rt, args| {
        rt.expect_args("dict.get", args, 2..=3)?;
        match (rt.dict_get(args[0], args[1])?, args.get(2)) {
            (Some(value), _) => Ok(value),
            (None, Some(&default)) => Ok(default),
            (None, None) => {
                let key = rt.repr(args[1])?;
                Err(rt.key_error(key))
            }
        }
    });
    rt.define_native(dict, "__getitem__", |rt, args| {
        rt.expect_args("dict.__getitem__", args, 2..=2)?;
        match rt.dict_get(args[0], args[1])? {
            Some(value) => Ok(value),
            None => {
                let key = rt.repr(args[1])?;
                Err(rt.key_error(key))
            }
        }
    });
    rt.define_native(dict, "__setitem__", |rt, args| {
        rt.expect_args("dict.__setitem__", args, 3..=3)?;
        rt.dict_set(args[0], args[1], args[2])?;
        Ok(rt.none())
    });
    rt.define_native(dict, "__delitem__", |rt, args| {
        rt.expect_args("dict.__delitem__", args, 2..=2)?;
        let key = rt.expect_text_key(args[1])?;
        if rt.dict_receiver("dict.__delitem__", args[0])?.remove(&key).is_none() {
            let key = rt.repr(args[1])?;
            return Err(rt.key_error(key));
        }
        Ok(rt.none())
    });
    rt.define_native(dict, "__contains__", |rt, args| {
        rt.expect_args("dict.__contains__", args, 2..=2)?;
        let found = rt.dict_get(args[0], args[1])?.is_some();
        Ok(rt.new_bool(found))
    });
    rt.define_native(dict, "__len__", |rt, args| {
        rt.expect_args("dict.__len__", args, 1..=1)?;
        let len = rt.dict_receiver("dict.__len__", args[0])?.len();
        Ok(rt.new_int(len as i64))
    });
    rt.define_native(dict, "__iter__", |rt, args| {
        rt.expect_args("dict.__iter__", args, 1..=1)?;
        let snapshot: Vec<(Rc<str>, Value)> = rt
            .dict_receiver("dict.__iter__", args[0])?
            .iter()
            .map(|(key, value)| (key.clone(), value))
            .collect();
        let held = snapshot.iter().map(|&(_, value)| value).collect();
        let mut entries = snapshot.into_iter();
        Ok(rt.new_native_generator_holding(held, move |rt| match entries.next() {
            Some((key, value)) => {
                let key = rt.new_str(&key);
                Ok(Resume::Yield(rt.new_tuple(vec![key, value])))
            }
            None => Ok(Resume::Complete(None)),
        }))
    });
    rt.define_native(dict, "__repr__", |rt, args| {
        rt.expect_args("dict.__repr__", args, 1..=1)?;
        let entries: Vec<(Rc<str>, Value)> = rt
            .dict_receiver("dict.__repr__", args[0])?
            .iter()
            .map(|(key, value)| (key.clone(), value))
            .collect();
        let mut rendered = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            rendered.push(format!("{}: {}", quote_text(&key), rt.repr(value)?));
        }
        Ok(rt.new_str(&format!("{{{}}}", rendered.join(", "))))
    });
}

/// Renders text the way `str.__repr__` does.
pub(crate) fn quote_text(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('\'');
    for ch in text.chars() {
        match ch {
            '\'' => quoted.push_str("\\'"),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            _ => quoted.push(ch),
        }
    }
    quoted.push('\'');
    quoted
}
