/// Rowdex Cell Values
///
/// A `Value` is the scalar stored in one cell of a row. All values are
/// comparable under a single total order so that index entries and query
/// operators behave identically for every column:
///
/// - `Null` (the absent value) sorts after every defined value;
/// - numbers compare numerically, `Int` and `Float` against each other;
/// - strings compare lexicographically;
/// - across kinds, numbers sort before strings, strings before booleans.
///
/// The order is total even for floats (IEEE total ordering), so sorting and
/// binary search never hit an incomparable pair.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// A single cell value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// A row as seen by comparators and predicates: column name to cell value.
/// Columns not present in the map are treated as `Null`.
pub type Cells = HashMap<String, Value>;

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Rank used when two values of different kinds meet. Defined values
    /// always rank below `Null`.
    fn kind_rank(&self) -> u8 {
        match self {
            Value::Int(_) | Value::Float(_) => 0,
            Value::Str(_) => 1,
            Value::Bool(_) => 2,
            Value::Null => 3,
        }
    }

    /// The total order over cell values.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        use Value::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Null, _) => Ordering::Greater,
            (_, Null) => Ordering::Less,
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Int(a), Float(b)) => (*a as f64).total_cmp(b),
            (Float(a), Int(b)) => a.total_cmp(&(*b as f64)),
            (Str(a), Str(b)) => a.cmp(b),
            (Bool(a), Bool(b)) => a.cmp(b),
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        self.total_cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Value) -> Option<Ordering> {
        Some(self.total_cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Value) -> Ordering {
        self.total_cmp(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

/// Compare two cell values under the shared total order.
pub fn compare(l: &Value, r: &Value) -> Ordering {
    l.total_cmp(r)
}

/// Build a comparator over rows that projects both sides through the named
/// column before comparing. Missing columns compare as `Null`.
pub fn pluck(name: &str) -> impl Fn(&Cells, &Cells) -> Ordering + '_ {
    move |l, r| {
        let lv = l.get(name).unwrap_or(&Value::Null);
        let rv = r.get(name).unwrap_or(&Value::Null);
        lv.total_cmp(rv)
    }
}

/// Like [`pluck`], but with a different column name on each side. Useful
/// when joining rows from differently named schemas.
pub fn pluck_pair<'a>(
    l_name: &'a str,
    r_name: &'a str,
) -> impl Fn(&Cells, &Cells) -> Ordering + 'a {
    move |l, r| {
        let lv = l.get(l_name).unwrap_or(&Value::Null);
        let rv = r.get(r_name).unwrap_or(&Value::Null);
        lv.total_cmp(rv)
    }
}
