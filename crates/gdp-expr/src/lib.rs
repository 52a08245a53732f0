//! Identifiers and algebraic expressions for disjunctive models.

pub mod expr;
pub mod ids;

pub use expr::{ComparisonSense, ConstraintExpr, Expr, Term, linear_sum};
pub use ids::{BlockId, ComponentId, VariableId};
