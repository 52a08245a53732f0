//! Comparison expressions: `expr <sense> rhs`, lowered to a bounded body.

use crate::expr::core::Expr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonSense {
    LessEqual,
    GreaterEqual,
    Equal,
}

impl ComparisonSense {
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonSense::LessEqual => "<=",
            ComparisonSense::GreaterEqual => ">=",
            ComparisonSense::Equal => "==",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConstraintExpr {
    expr: Expr,
    sense: ComparisonSense,
    rhs: f64,
}

impl ConstraintExpr {
    pub fn new(expr: Expr, sense: ComparisonSense, rhs: f64) -> Self {
        Self { expr, sense, rhs }
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn sense(&self) -> ComparisonSense {
        self.sense
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    /// Split into `(body, lower, upper)` with infinite values for a missing side.
    pub fn into_bounded(self) -> (Expr, f64, f64) {
        let (lower, upper) = match self.sense {
            ComparisonSense::LessEqual => (f64::NEG_INFINITY, self.rhs),
            ComparisonSense::GreaterEqual => (self.rhs, f64::INFINITY),
            ComparisonSense::Equal => (self.rhs, self.rhs),
        };
        (self.expr, lower, upper)
    }
}
