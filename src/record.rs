//! Record accessors.
//!
//! Evaluation never looks inside a record directly; it asks a [`Getter`]
//! for the value of each key it references. `None` means the field is
//! absent, which is different from a present `null`.

use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap},
    rc::Rc,
    sync::Arc,
};

use crate::value::Value;

/// Maps a field name to its value in one record.
pub trait Getter {
    fn get(&self, key: &str) -> Option<Cow<'_, Value>>;
}

impl<G: Getter + ?Sized> Getter for &G {
    fn get(&self, key: &str) -> Option<Cow<'_, Value>> {
        (**self).get(key)
    }
}

impl<G: Getter + ?Sized> Getter for Box<G> {
    fn get(&self, key: &str) -> Option<Cow<'_, Value>> {
        (**self).get(key)
    }
}

impl<G: Getter + ?Sized> Getter for Rc<G> {
    fn get(&self, key: &str) -> Option<Cow<'_, Value>> {
        (**self).get(key)
    }
}

impl<G: Getter + ?Sized> Getter for Arc<G> {
    fn get(&self, key: &str) -> Option<Cow<'_, Value>> {
        (**self).get(key)
    }
}

impl Getter for HashMap<String, Value> {
    fn get(&self, key: &str) -> Option<Cow<'_, Value>> {
        HashMap::get(self, key).map(Cow::Borrowed)
    }
}

impl Getter for BTreeMap<String, Value> {
    fn get(&self, key: &str) -> Option<Cow<'_, Value>> {
        BTreeMap::get(self, key).map(Cow::Borrowed)
    }
}

/// Only objects have fields; every key of a scalar or array is absent.
impl Getter for Value {
    fn get(&self, key: &str) -> Option<Cow<'_, Value>> {
        match self {
            Value::Object(map) => map.get(key).map(Cow::Borrowed),
            _ => None,
        }
    }
}

impl Getter for serde_json::Map<String, serde_json::Value> {
    fn get(&self, key: &str) -> Option<Cow<'_, Value>> {
        serde_json::Map::get(self, key).map(|v| Cow::Owned(Value::from(v.clone())))
    }
}

impl Getter for serde_json::Value {
    fn get(&self, key: &str) -> Option<Cow<'_, Value>> {
        match self {
            serde_json::Value::Object(map) => Getter::get(map, key),
            _ => None,
        }
    }
}

/// A record with no fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyRecord;

impl Getter for EmptyRecord {
    fn get(&self, _key: &str) -> Option<Cow<'_, Value>> {
        None
    }
}

/// Adapts a closure into a [`Getter`].
///
/// # Examples
///
/// ```
/// use clove_filter::{FnGetter, Getter, Value};
///
/// let getter = FnGetter(|key: &str| (key == "age").then(|| Value::Integer(12)));
/// assert_eq!(getter.get("age").as_deref(), Some(&Value::Integer(12)));
/// assert!(getter.get("name").is_none());
/// ```
pub struct FnGetter<F>(pub F);

impl<F> Getter for FnGetter<F>
where
    F: Fn(&str) -> Option<Value>,
{
    fn get(&self, key: &str) -> Option<Cow<'_, Value>> {
        (self.0)(key).map(Cow::Owned)
    }
}
