//! Expression types for disjunctive modeling.
//!
//! - `core`       - Expr: a constant plus linear and bilinear terms
//! - `constraint` - ConstraintExpr: expression with comparison sense and RHS
//! - `builders`   - helpers for assembling expressions

pub mod builders;
pub mod constraint;
pub mod core;

pub use builders::linear_sum;
pub use constraint::{ComparisonSense, ConstraintExpr};
pub use core::{Expr, Term};
