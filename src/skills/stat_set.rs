//! Loosely-typed parameter bags produced by the skill document parser.
//!
//! Keys beginning with `.` carry node metadata (`.id`, `.level`, `.name`);
//! all other keys are domain parameters. Values stay in the shape they were
//! declared in and are only interpreted when a typed accessor asks for them.

use std::collections::HashMap;
use std::fmt;

/// Error returned by the typed [`StatSet`] accessors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StatSetError {
    #[error("missing key '{0}'")]
    Missing(String),

    #[error("key '{key}' expected {expected}, found {found}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: String,
    },
}

/// A single parsed parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(f64),
    Bool(bool),
    List(Vec<Value>),
    Set(StatSet),
}

impl Value {
    /// Short type label used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Bool(_) => "bool",
            Value::List(_) => "list",
            Value::Set(_) => "set",
        }
    }

    /// Numeric view of a scalar. Strings are parsed; booleans, lists and
    /// nested sets have no numeric form.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Returns true for `Bool` values and for the literal strings
    /// `true`/`false` in any case.
    pub fn is_boolean_like(&self) -> bool {
        match self {
            Value::Bool(_) => true,
            Value::String(s) => s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false"),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Value::Number(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Set(set) => write!(f, "{{{} keys}}", set.len()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Keyed bag of [`Value`]s (the attribute set of one node or one merged
/// level/sub-level entry).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatSet {
    values: HashMap<String, Value>,
}

impl StatSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Insert or replace `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Copy every entry of `other` whose key is not already present.
    /// Existing keys are never overwritten.
    pub fn fill_missing_from(&mut self, other: &StatSet) {
        for (key, value) in &other.values {
            if !self.values.contains_key(key) {
                self.values.insert(key.clone(), value.clone());
            }
        }
    }

    fn require(&self, key: &str) -> Result<&Value, StatSetError> {
        self.values
            .get(key)
            .ok_or_else(|| StatSetError::Missing(key.to_string()))
    }

    fn wrong(key: &str, expected: &'static str, found: &Value) -> StatSetError {
        StatSetError::WrongType {
            key: key.to_string(),
            expected,
            found: format!("{} '{}'", found.kind(), found),
        }
    }

    pub fn get_i64(&self, key: &str) -> Result<i64, StatSetError> {
        let value = self.require(key)?;
        match value {
            Value::String(s) => s
                .trim()
                .parse()
                .map_err(|_| Self::wrong(key, "integer", value)),
            Value::Number(n) if n.fract() == 0.0 && n.is_finite() => Ok(*n as i64),
            _ => Err(Self::wrong(key, "integer", value)),
        }
    }

    pub fn get_int(&self, key: &str) -> Result<i32, StatSetError> {
        let n = self.get_i64(key)?;
        i32::try_from(n).map_err(|_| Self::wrong(key, "32-bit integer", &Value::Number(n as f64)))
    }

    pub fn get_f64(&self, key: &str) -> Result<f64, StatSetError> {
        let value = self.require(key)?;
        match value {
            Value::String(_) | Value::Number(_) => {
                value.as_f64().ok_or_else(|| Self::wrong(key, "number", value))
            }
            _ => Err(Self::wrong(key, "number", value)),
        }
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, StatSetError> {
        let value = self.require(key)?;
        match value {
            Value::Bool(b) => Ok(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            _ => Err(Self::wrong(key, "boolean", value)),
        }
    }

    /// Scalars render to their textual form; lists and sets are rejected.
    pub fn get_string(&self, key: &str) -> Result<String, StatSetError> {
        let value = self.require(key)?;
        match value {
            Value::List(_) | Value::Set(_) => Err(Self::wrong(key, "string", value)),
            scalar => Ok(scalar.to_string()),
        }
    }

    pub fn get_list(&self, key: &str) -> Result<&[Value], StatSetError> {
        let value = self.require(key)?;
        match value {
            Value::List(items) => Ok(items),
            _ => Err(Self::wrong(key, "list", value)),
        }
    }

    pub fn get_set(&self, key: &str) -> Result<&StatSet, StatSetError> {
        let value = self.require(key)?;
        match value {
            Value::Set(set) => Ok(set),
            _ => Err(Self::wrong(key, "set", value)),
        }
    }

    pub fn get_int_or(&self, key: &str, default: i32) -> Result<i32, StatSetError> {
        if self.contains(key) {
            self.get_int(key)
        } else {
            Ok(default)
        }
    }

    pub fn get_i64_or(&self, key: &str, default: i64) -> Result<i64, StatSetError> {
        if self.contains(key) {
            self.get_i64(key)
        } else {
            Ok(default)
        }
    }

    pub fn get_f64_or(&self, key: &str, default: f64) -> Result<f64, StatSetError> {
        if self.contains(key) {
            self.get_f64(key)
        } else {
            Ok(default)
        }
    }

    pub fn get_bool_or(&self, key: &str, default: bool) -> Result<bool, StatSetError> {
        if self.contains(key) {
            self.get_bool(key)
        } else {
            Ok(default)
        }
    }

    pub fn get_string_or(&self, key: &str, default: &str) -> Result<String, StatSetError> {
        if self.contains(key) {
            self.get_string(key)
        } else {
            Ok(default.to_string())
        }
    }
}

impl FromIterator<(String, Value)> for StatSet {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
