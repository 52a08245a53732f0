//! Path-based component identifiers, e.g. `b[1].disjunct[2].c`.

use std::fmt;
use std::str::FromStr;

use crate::index::Index;
use crate::model::ModelError;

/// Stable identity of a component or component member, independent of ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentUid {
    segments: Vec<(String, Index)>,
}

impl ComponentUid {
    pub fn new(segments: Vec<(String, Index)>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[(String, Index)] {
        &self.segments
    }

    /// Parse a dotted path. Dots inside `[...]` do not split segments.
    pub fn parse(path: &str) -> Result<Self, String> {
        let mut raw_segments = Vec::new();
        let mut depth = 0usize;
        let mut start = 0usize;
        for (pos, ch) in path.char_indices() {
            match ch {
                '[' => depth += 1,
                ']' => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| format!("unbalanced ']' at position {pos}"))?;
                }
                '.' if depth == 0 => {
                    raw_segments.push(&path[start..pos]);
                    start = pos + 1;
                }
                _ => {}
            }
        }
        if depth != 0 {
            return Err("unbalanced '['".to_string());
        }
        raw_segments.push(&path[start..]);

        let mut segments = Vec::with_capacity(raw_segments.len());
        for raw in raw_segments {
            let raw = raw.trim();
            let (name, index) = match raw.find('[') {
                Some(open) => {
                    let inner = raw[open + 1..]
                        .strip_suffix(']')
                        .ok_or_else(|| format!("segment '{raw}' has trailing text"))?;
                    (&raw[..open], Index::parse(inner))
                }
                None => (raw, Index::scalar()),
            };
            if name.is_empty() {
                return Err(format!("empty segment in '{path}'"));
            }
            segments.push((name.to_string(), index));
        }
        Ok(Self { segments })
    }
}

impl FromStr for ComponentUid {
    type Err = ModelError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        Self::parse(path).map_err(|reason| ModelError::InvalidPath {
            path: path.to_string(),
            reason,
        })
    }
}

impl fmt::Display for ComponentUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pos, (name, index)) in self.segments.iter().enumerate() {
            if pos > 0 {
                f.write_str(".")?;
            }
            write!(f, "{name}{index}")?;
        }
        Ok(())
    }
}
