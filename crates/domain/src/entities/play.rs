//! Play-by-play records.
//!
//! A play is an ordered list of named values exactly as the warehouse
//! returned them. The replay loop never looks inside; prompt builders read
//! fields through the typed accessors below, which fail per field instead of
//! panicking on a malformed row.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single column value of a play row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlayValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl PlayValue {
    fn kind(&self) -> &'static str {
        match self {
            PlayValue::Null => "null",
            PlayValue::Bool(_) => "bool",
            PlayValue::Int(_) => "integer",
            PlayValue::Float(_) => "float",
            PlayValue::Text(_) => "text",
        }
    }
}

impl fmt::Display for PlayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayValue::Null => f.write_str("unknown"),
            PlayValue::Bool(b) => write!(f, "{b}"),
            PlayValue::Int(i) => write!(f, "{i}"),
            PlayValue::Float(x) => write!(f, "{x}"),
            PlayValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlayFieldError {
    #[error("field '{field}' is missing")]
    Missing { field: String },
    #[error("field '{field}' is {found}, expected {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("field '{field}' is out of range for a counting stat")]
    OutOfRange { field: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayRecord {
    fields: Vec<(String, PlayValue)>,
}

impl PlayRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, keeping column order. A repeated name shadows the
    /// earlier value on lookup but both stay in the record.
    pub fn with(mut self, name: impl Into<String>, value: PlayValue) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: PlayValue) {
        self.fields.push((name.into(), value));
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &PlayValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, name: &str) -> Option<&PlayValue> {
        self.fields
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    fn require(&self, name: &str) -> Result<&PlayValue, PlayFieldError> {
        self.get(name).ok_or_else(|| PlayFieldError::Missing {
            field: name.to_string(),
        })
    }

    /// Integer view of a counting stat. Booleans count as 0/1 and numeric
    /// text is parsed, because warehouse exports are not consistent about
    /// either.
    pub fn int(&self, name: &str) -> Result<i64, PlayFieldError> {
        let value = self.require(name)?;
        let wrong = || PlayFieldError::WrongType {
            field: name.to_string(),
            expected: "integer",
            found: value.kind(),
        };
        match value {
            PlayValue::Int(i) => Ok(*i),
            PlayValue::Bool(b) => Ok(i64::from(*b)),
            PlayValue::Float(x) if x.fract() == 0.0 => Ok(*x as i64),
            PlayValue::Text(s) => s.trim().parse::<i64>().map_err(|_| wrong()),
            _ => Err(wrong()),
        }
    }

    /// Sum of several integer fields, failing on the first bad one.
    pub fn sum(&self, names: &[&str]) -> Result<i64, PlayFieldError> {
        names.iter().try_fold(0i64, |acc, name| {
            acc.checked_add(self.int(name)?)
                .ok_or_else(|| PlayFieldError::OutOfRange {
                    field: name.to_string(),
                })
        })
    }

    /// `minuend - subtrahend` of two integer fields.
    pub fn difference(&self, minuend: &str, subtrahend: &str) -> Result<i64, PlayFieldError> {
        self.int(minuend)?
            .checked_sub(self.int(subtrahend)?)
            .ok_or_else(|| PlayFieldError::OutOfRange {
                field: minuend.to_string(),
            })
    }

    /// Truthiness of a field: null, false, zero and empty text are false.
    pub fn flag(&self, name: &str) -> Result<bool, PlayFieldError> {
        Ok(match self.require(name)? {
            PlayValue::Null => false,
            PlayValue::Bool(b) => *b,
            PlayValue::Int(i) => *i != 0,
            PlayValue::Float(x) => *x != 0.0,
            PlayValue::Text(s) => !s.trim().is_empty(),
        })
    }

    /// Text rendering of any present field.
    pub fn display(&self, name: &str) -> Result<String, PlayFieldError> {
        Ok(self.require(name)?.to_string())
    }
}
