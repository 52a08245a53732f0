//! Keys of indexed component members.

use std::fmt;

/// One atom of an index tuple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexValue {
    Int(i64),
    Str(String),
}

impl IndexValue {
    /// Parse a single atom: integers stay integers, anything else is a
    /// string with surrounding quotes removed.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(value) = trimmed.parse::<i64>() {
            return IndexValue::Int(value);
        }
        let unquoted = trimmed
            .strip_prefix('\'')
            .and_then(|s| s.strip_suffix('\''))
            .or_else(|| {
                trimmed
                    .strip_prefix('"')
                    .and_then(|s| s.strip_suffix('"'))
            })
            .unwrap_or(trimmed);
        IndexValue::Str(unquoted.to_string())
    }
}

impl fmt::Display for IndexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexValue::Int(value) => write!(f, "{value}"),
            IndexValue::Str(value) => write!(f, "{value}"),
        }
    }
}

impl From<i64> for IndexValue {
    fn from(value: i64) -> Self {
        IndexValue::Int(value)
    }
}

impl From<&str> for IndexValue {
    fn from(value: &str) -> Self {
        IndexValue::Str(value.to_string())
    }
}

/// Index of a component member. The empty tuple is the scalar member.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Index(Vec<IndexValue>);

impl Index {
    pub fn scalar() -> Self {
        Self(Vec::new())
    }

    pub fn new(values: Vec<IndexValue>) -> Self {
        Self(values)
    }

    pub fn is_scalar(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[IndexValue] {
        &self.0
    }

    /// Copy of this index with one more atom appended.
    pub fn with(&self, value: impl Into<IndexValue>) -> Self {
        let mut values = self.0.clone();
        values.push(value.into());
        Self(values)
    }

    /// Parse the comma separated contents of `[...]`.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::scalar();
        }
        Self(raw.split(',').map(IndexValue::parse).collect())
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        let rendered: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", rendered.join(","))
    }
}

impl From<i64> for Index {
    fn from(value: i64) -> Self {
        Self(vec![IndexValue::Int(value)])
    }
}

impl From<&str> for Index {
    fn from(value: &str) -> Self {
        Self(vec![IndexValue::Str(value.to_string())])
    }
}

impl From<(i64, i64)> for Index {
    fn from((a, b): (i64, i64)) -> Self {
        Self(vec![IndexValue::Int(a), IndexValue::Int(b)])
    }
}
