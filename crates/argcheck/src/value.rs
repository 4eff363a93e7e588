//! Dynamic argument values and their runtime types.
//!
//! Every argument that flows through a validated call is a [`Value`]. Values
//! render in a literal form that could be typed back in to recreate them
//! (`'hello'`, `[1, 2]`, `(1,)`, `None`), which is the form used in every
//! diagnostic the engine produces.

use std::cmp::Ordering;
use std::fmt;

use im::{OrdMap, Vector};
use itertools::Itertools;
use serde::Serialize;
use strum::Display;

// ═══════════════════════════════════════════════════════════════════════════
// RUNTIME TYPES
// ═══════════════════════════════════════════════════════════════════════════

/// The runtime type of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[strum(serialize = "NoneType")]
    #[serde(rename = "NoneType")]
    NoneType,
    Bool,
    Int,
    Float,
    Str,
    List,
    Tuple,
    Dict,
}

impl ValueType {
    /// Whether a value of this type satisfies a declared type.
    ///
    /// Equality, plus the one recognized subtype relation: `bool` is an `int`.
    #[must_use]
    pub fn conforms_to(self, declared: Self) -> bool {
        self == declared || (self == Self::Bool && declared == Self::Int)
    }

    /// Whether values of this type are ordered, indexable sequences.
    #[must_use]
    pub const fn is_sequence(self) -> bool {
        matches!(self, Self::List | Self::Tuple)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// VALUES
// ═══════════════════════════════════════════════════════════════════════════

/// A dynamically typed argument value.
///
/// Containers use persistent collections so that default values and
/// collected variadic arguments can be shared between calls without copying.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vector<Value>),
    Tuple(Vector<Value>),
    Dict(OrdMap<String, Value>),
}

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn compare(self, other: Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    const fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }
}

impl Value {
    /// Build a list from anything convertible into values.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Self>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Build a tuple from anything convertible into values.
    pub fn tuple<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Self>,
    {
        Self::Tuple(items.into_iter().map(Into::into).collect())
    }

    /// Build a dict from `(key, value)` pairs.
    pub fn dict<I, K, T>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<Self>,
    {
        Self::Dict(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// The runtime type of this value.
    #[must_use]
    pub const fn type_of(&self) -> ValueType {
        match self {
            Self::None => ValueType::NoneType,
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::Str(_) => ValueType::Str,
            Self::List(_) => ValueType::List,
            Self::Tuple(_) => ValueType::Tuple,
            Self::Dict(_) => ValueType::Dict,
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The elements of a list or tuple.
    #[must_use]
    pub const fn as_sequence(&self) -> Option<&Vector<Self>> {
        match self {
            Self::List(items) | Self::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Number of items, for values that have a length.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Str(s) => Some(s.chars().count()),
            Self::List(items) | Self::Tuple(items) => Some(items.len()),
            Self::Dict(entries) => Some(entries.len()),
            _ => None,
        }
    }

    /// The items produced by iterating over this value, if it is iterable.
    ///
    /// Text iterates over single-character strings and dicts over their keys.
    #[must_use]
    pub fn iter_items(&self) -> Option<Vector<Self>> {
        match self {
            Self::List(items) | Self::Tuple(items) => Some(items.clone()),
            Self::Str(s) => Some(s.chars().map(|c| Self::Str(c.to_string())).collect()),
            Self::Dict(entries) => Some(entries.keys().cloned().map(Self::Str).collect()),
            _ => None,
        }
    }

    const fn as_number(&self) -> Option<Number> {
        match self {
            Self::Bool(b) => Some(Number::Int(*b as i64)),
            Self::Int(i) => Some(Number::Int(*i)),
            Self::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    /// Order two values, or `None` when they are not comparable.
    ///
    /// Numbers compare across `bool`/`int`/`float`; text compares with text;
    /// lists and tuples compare lexicographically with their own kind.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        if let (Some(a), Some(b)) = (self.as_number(), other.as_number()) {
            return a.compare(b);
        }
        match (self, other) {
            (Self::Str(a), Self::Str(b)) => Some(a.cmp(b)),
            (Self::List(a), Self::List(b)) | (Self::Tuple(a), Self::Tuple(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.compare(y)? {
                        Ordering::Equal => {}
                        ordering => return Some(ordering),
                    }
                }
                Some(a.len().cmp(&b.len()))
            }
            _ => None,
        }
    }

    /// Render this value, cutting the rendering off after `max_len` characters.
    #[must_use]
    pub fn truncated_repr(&self, max_len: usize) -> String {
        let repr = self.to_string();
        if repr.chars().count() <= max_len {
            return repr;
        }
        let head: String = repr.chars().take(max_len).collect();
        format!("{head}...")
    }
}

fn write_str_literal(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    write!(f, "{quote}")?;
    for c in s.chars() {
        match c {
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            c if c == quote => write!(f, "\\{c}")?,
            c => write!(f, "{c}")?,
        }
    }
    write!(f, "{quote}")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) if x.is_nan() => write!(f, "nan"),
            Self::Float(x) if x.is_infinite() => {
                write!(f, "{}", if *x > 0.0 { "inf" } else { "-inf" })
            }
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) => write_str_literal(f, s),
            Self::List(items) => write!(f, "[{}]", items.iter().join(", ")),
            Self::Tuple(items) if items.len() == 1 => write!(f, "({},)", items.iter().join("")),
            Self::Tuple(items) => write!(f, "({})", items.iter().join(", ")),
            Self::Dict(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_str_literal(f, k)?;
                    write!(f, ": {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// CONVERSIONS
// ═══════════════════════════════════════════════════════════════════════════

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::list(items)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::None, Into::into)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// UNIT TESTS
// ═══════════════════════════════════════════════════════════════════════════
