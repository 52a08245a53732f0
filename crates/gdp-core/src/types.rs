use gdp_expr::{ComponentId, ConstraintExpr, Expr};

use crate::index::Index;

/// Optimization sense
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

/// Bounds for a variable or constraint. Infinite values mean "no bound".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn unbounded() -> Self {
        Self::new(f64::NEG_INFINITY, f64::INFINITY)
    }

    pub fn at_least(lower: f64) -> Self {
        Self::new(lower, f64::INFINITY)
    }

    pub fn at_most(upper: f64) -> Self {
        Self::new(f64::NEG_INFINITY, upper)
    }

    pub fn equal_to(value: f64) -> Self {
        Self::new(value, value)
    }

    /// The lower bound, if it is finite.
    pub fn lower_bound(&self) -> Option<f64> {
        self.lower.is_finite().then_some(self.lower)
    }

    /// The upper bound, if it is finite.
    pub fn upper_bound(&self) -> Option<f64> {
        self.upper.is_finite().then_some(self.upper)
    }

    pub(crate) fn is_valid(&self) -> bool {
        !self.lower.is_nan() && !self.upper.is_nan() && self.lower <= self.upper
    }
}

/// Variable domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Continuous,
    Integer,
    Binary,
}

/// A decision variable with bounds, domain and an optional fixed value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variable {
    pub bounds: Bounds,
    pub domain: Domain,
    pub fixed: Option<f64>,
}

impl Variable {
    /// Create a binary variable with bounds [0, 1].
    pub fn binary() -> Self {
        Self {
            bounds: Bounds::new(0.0, 1.0),
            domain: Domain::Binary,
            fixed: None,
        }
    }

    /// Create a continuous variable with specified bounds.
    pub fn continuous(bounds: Bounds) -> Self {
        Self {
            bounds,
            domain: Domain::Continuous,
            fixed: None,
        }
    }

    /// Create an integer variable with specified bounds.
    pub fn integer(bounds: Bounds) -> Self {
        Self {
            bounds,
            domain: Domain::Integer,
            fixed: None,
        }
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed.is_some()
    }
}

/// One member of a (possibly indexed) constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintData {
    pub body: Expr,
    pub bounds: Bounds,
    pub active: bool,
}

impl ConstraintData {
    pub fn new(body: Expr, bounds: Bounds) -> Self {
        Self {
            body,
            bounds,
            active: true,
        }
    }

    pub fn from_expr(constraint: ConstraintExpr) -> Self {
        let (body, lower, upper) = constraint.into_bounded();
        Self::new(body, Bounds::new(lower, upper))
    }

    pub fn is_equality(&self) -> bool {
        self.bounds.lower_bound().is_some() && self.bounds.lower == self.bounds.upper
    }
}

/// Objective function
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub sense: Sense,
    pub expr: Expr,
}

/// Key of a suffix entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SuffixKey {
    /// Applies to everything below the owning block.
    Default,
    /// A whole (possibly indexed) component.
    Component(ComponentId),
    /// A single member of an indexed component.
    Data(ComponentId, Index),
}

/// Value stored in a suffix entry.
#[derive(Debug, Clone, PartialEq)]
pub enum SuffixValue {
    Scalar(f64),
    Sequence(Vec<Option<f64>>),
}

impl From<f64> for SuffixValue {
    fn from(value: f64) -> Self {
        SuffixValue::Scalar(value)
    }
}

impl From<(f64, f64)> for SuffixValue {
    fn from((lower, upper): (f64, f64)) -> Self {
        SuffixValue::Sequence(vec![Some(lower), Some(upper)])
    }
}

impl From<(Option<f64>, Option<f64>)> for SuffixValue {
    fn from((lower, upper): (Option<f64>, Option<f64>)) -> Self {
        SuffixValue::Sequence(vec![lower, upper])
    }
}

impl std::fmt::Display for SuffixValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuffixValue::Scalar(value) => write!(f, "{value}"),
            SuffixValue::Sequence(values) => {
                let rendered: Vec<String> = values
                    .iter()
                    .map(|v| v.map_or_else(|| "None".to_string(), |v| v.to_string()))
                    .collect();
                write!(f, "({})", rendered.join(", "))
            }
        }
    }
}

/// Block-scoped side table of values keyed by component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Suffix {
    entries: Vec<(SuffixKey, SuffixValue)>,
}

impl Suffix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value for a key.
    pub fn set(&mut self, key: SuffixKey, value: SuffixValue) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &SuffixKey) -> Option<&SuffixValue> {
        self.entries
            .iter()
            .find_map(|(k, value)| (k == key).then_some(value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
