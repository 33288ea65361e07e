//! Typed tree values.
//!
//! `TreeValue` is the tagged union stored at every node of the dashboard
//! tree. Records and sequences sit behind `Arc` so cloning a tree is cheap
//! and writes copy only the nodes along the edited path.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};


/// Map type backing a record node.
pub type Record = BTreeMap<String, TreeValue>;


/// A node in the dashboard data tree.
#[derive(Debug, Clone)]
pub enum TreeValue {
    Number(f64),
    Text(String),
    Flag(bool),
    Null,
    Record(Arc<Record>),
    Sequence(Arc<Vec<TreeValue>>),
}

impl TreeValue {
    /// An empty record, used when `set` creates a missing intermediate.
    pub fn empty_record() -> Self {
        TreeValue::Record(Arc::new(Record::new()))
    }

    pub fn record<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, TreeValue)>,
        K: Into<String>,
    {
        TreeValue::Record(Arc::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn sequence(items: Vec<TreeValue>) -> Self {
        TreeValue::Sequence(Arc::new(items))
    }

    /// Short name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            TreeValue::Number(_) => "number",
            TreeValue::Text(_) => "text",
            TreeValue::Flag(_) => "flag",
            TreeValue::Null => "null",
            TreeValue::Record(_) => "record",
            TreeValue::Sequence(_) => "sequence",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TreeValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TreeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            TreeValue::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[TreeValue]> {
        match self {
            TreeValue::Sequence(s) => Some(s),
            _ => None,
        }
    }

    /// True when both values are the same shared allocation (or equal scalars).
    #[cfg(test)]
    pub(crate) fn same_node(&self, other: &TreeValue) -> bool {
        match (self, other) {
            (TreeValue::Record(a), TreeValue::Record(b)) => Arc::ptr_eq(a, b),
            (TreeValue::Sequence(a), TreeValue::Sequence(b)) => Arc::ptr_eq(a, b),
            _ => self == other,
        }
    }

    /// Text used to seed an edit draft and to show unformatted values.
    ///
    /// Integral numbers print without a decimal point (`67`, not `67.0`).
    pub fn display_string(&self) -> String {
        match self {
            TreeValue::Number(n) => format_number(*n),
            TreeValue::Text(s) => s.clone(),
            TreeValue::Flag(b) => b.to_string(),
            TreeValue::Null => String::new(),
            TreeValue::Record(_) | TreeValue::Sequence(_) => self.to_json().to_string(),
        }
    }

    // -------------------------------------------------------------------
    // JSON conversion
    // -------------------------------------------------------------------

    pub fn to_json(&self) -> Value {
        match self {
            TreeValue::Number(n) => number_to_json(*n),
            TreeValue::Text(s) => Value::String(s.clone()),
            TreeValue::Flag(b) => Value::Bool(*b),
            TreeValue::Null => Value::Null,
            TreeValue::Record(r) => {
                let mut map = Map::new();
                for (k, v) in r.iter() {
                    map.insert(k.clone(), v.to_json());
                }
                Value::Object(map)
            }
            TreeValue::Sequence(items) => {
                Value::Array(items.iter().map(TreeValue::to_json).collect())
            }
        }
    }
}


impl PartialEq for TreeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TreeValue::Number(a), TreeValue::Number(b)) => a == b,
            (TreeValue::Text(a), TreeValue::Text(b)) => a == b,
            (TreeValue::Flag(a), TreeValue::Flag(b)) => a == b,
            (TreeValue::Null, TreeValue::Null) => true,
            (TreeValue::Record(a), TreeValue::Record(b)) => Arc::ptr_eq(a, b) || a == b,
            (TreeValue::Sequence(a), TreeValue::Sequence(b)) => Arc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }
}


impl From<Value> for TreeValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => TreeValue::Null,
            Value::Bool(b) => TreeValue::Flag(b),
            // Every serde_json number has an f64 view; u64/i64 beyond 2^53 lose precision.
            Value::Number(n) => TreeValue::Number(n.as_f64().unwrap_or(0.0)),
            Value::String(s) => TreeValue::Text(s),
            Value::Array(items) => {
                TreeValue::sequence(items.into_iter().map(TreeValue::from).collect())
            }
            Value::Object(map) => {
                TreeValue::record(map.into_iter().map(|(k, v)| (k, TreeValue::from(v))))
            }
        }
    }
}

impl From<f64> for TreeValue {
    fn from(n: f64) -> Self {
        TreeValue::Number(n)
    }
}

impl From<i64> for TreeValue {
    fn from(n: i64) -> Self {
        TreeValue::Number(n as f64)
    }
}

impl From<i32> for TreeValue {
    fn from(n: i32) -> Self {
        TreeValue::Number(f64::from(n))
    }
}

impl From<&str> for TreeValue {
    fn from(s: &str) -> Self {
        TreeValue::Text(s.to_string())
    }
}

impl From<String> for TreeValue {
    fn from(s: String) -> Self {
        TreeValue::Text(s)
    }
}

impl From<bool> for TreeValue {
    fn from(b: bool) -> Self {
        TreeValue::Flag(b)
    }
}


impl Serialize for TreeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TreeValue::Number(n) => {
                if let Some(i) = integral(*n) {
                    serializer.serialize_i64(i)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            TreeValue::Text(s) => serializer.serialize_str(s),
            TreeValue::Flag(b) => serializer.serialize_bool(*b),
            TreeValue::Null => serializer.serialize_unit(),
            TreeValue::Record(r) => r.as_ref().serialize(serializer),
            TreeValue::Sequence(items) => items.as_ref().serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for TreeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(TreeValue::from)
    }
}


impl fmt::Display for TreeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_string())
    }
}


// ---------------------------------------------------------------------------
// Internal: number handling
// ---------------------------------------------------------------------------

/// `Some(i)` when `n` is a whole number that fits in an `i64` exactly.
fn integral(n: f64) -> Option<i64> {
    const LIMIT: f64 = 9_007_199_254_740_992.0; // 2^53
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= LIMIT {
        Some(n as i64)
    } else {
        None
    }
}

fn number_to_json(n: f64) -> Value {
    match integral(n) {
        Some(i) => Value::Number(Number::from(i)),
        None => Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null),
    }
}

fn format_number(n: f64) -> String {
    match integral(n) {
        Some(i) => i.to_string(),
        None => n.to_string(),
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
