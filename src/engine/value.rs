//! Dynamic attribute values.
//!
//! Component kinds are declared at runtime as a list of named attributes, so
//! attribute storage is dynamically typed. [`Value`] is that storage cell.
//!
//! ## Identity, not equality
//! Attribute-change dispatch fires only when a written value is *not
//! identical* to the current one ([`Value::is_identical`]):
//!
//! * scalars (`Nil`, `Bool`, `Int`, `Float`) are identical when equal
//!   (floats compare by bit pattern),
//! * compound values (`Str`, `List`, `Map`) are identical only when they
//!   share the same allocation.
//!
//! A freshly built string or list is therefore always "new", even if its
//! contents match. Conversely, mutating a `List` or `Map` in place through
//! its `RefCell` does not go through `update` and is never observed by
//! attribute triggers. Callers that want notification must write a new value.
//!
//! ## Defaults
//! Kind defaults are copied into each instance with [`Value::duplicate`],
//! which allocates a fresh cell for compound values so instances never alias
//! a shared default.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;


/// Shared, interior-mutable list payload.
pub type ListCell = Rc<RefCell<Vec<Value>>>;

/// Shared, interior-mutable map payload.
pub type MapCell = Rc<RefCell<BTreeMap<String, Value>>>;

/// A dynamically typed attribute value.
#[derive(Clone, Default)]
pub enum Value {
    /// Absent value; the default for attributes declared without a default.
    #[default]
    Nil,

    /// Boolean.
    Bool(bool),

    /// Signed integer.
    Int(i64),

    /// Floating point number.
    Float(f64),

    /// Immutable string, compared by allocation identity.
    Str(Rc<str>),

    /// Mutable list, compared by allocation identity.
    List(ListCell),

    /// Mutable string-keyed map, compared by allocation identity.
    Map(MapCell),
}

impl Value {

    /// Builds a new list value.
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items.into_iter().collect())))
    }

    /// Builds a new map value.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Map(Rc::new(RefCell::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )))
    }

    /// Returns `true` if `self` and `other` are the same value by identity.
    pub fn is_identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => Rc::ptr_eq(a, b),
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Shallow copy with a fresh allocation for compound values.
    ///
    /// Elements of a list or map are cloned as values, so nested compound
    /// values are still shared, matching a one-level copy.
    pub fn duplicate(&self) -> Value {
        match self {
            Value::Str(s) => Value::Str(Rc::from(&**s)),
            Value::List(items) => Value::List(Rc::new(RefCell::new(items.borrow().clone()))),
            Value::Map(entries) => Value::Map(Rc::new(RefCell::new(entries.borrow().clone()))),
            scalar => scalar.clone(),
        }
    }

    /// Returns `true` for [`Value::Nil`].
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Integer payload, if any.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Float payload; integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Boolean payload, if any.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// String payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(&**s),
            _ => None,
        }
    }

    /// List cell, if any.
    pub fn as_list(&self) -> Option<&ListCell> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Map cell, if any.
    pub fn as_map(&self) -> Option<&MapCell> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }
}

/// Structural equality (contents, not identity). Used by tests and hosts;
/// dispatch never uses it.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(items) => f.debug_list().entries(items.borrow().iter()).finish(),
            Value::Map(entries) => f.debug_map().entries(entries.borrow().iter()).finish(),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self { Value::Bool(v) }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self { Value::Int(v) }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self { Value::Int(i64::from(v)) }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self { Value::Int(i64::from(v)) }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self { Value::Float(v) }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self { Value::Float(f64::from(v)) }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self { Value::Str(Rc::from(v)) }
}

impl From<String> for Value {
    fn from(v: String) -> Self { Value::Str(Rc::from(v)) }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self { Value::List(Rc::new(RefCell::new(v))) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}
