//! Bound-based Big-M estimation.

use gdp_core::Model;
use gdp_expr::Expr;

use crate::error::GdpError;

/// Range `(lo, hi)` of a linear body over its variables' bounds.
///
/// Fixed variables count as constants. Every remaining variable must have
/// finite bounds on both sides.
pub fn estimate_m(model: &Model, body: &Expr, constraint: &str) -> Result<(f64, f64), GdpError> {
    let repn = model
        .linear_repn(body)
        .ok_or_else(|| GdpError::NonlinearEstimate {
            constraint: constraint.to_string(),
        })?;

    let mut lo = repn.constant;
    let mut hi = repn.constant;
    for (var_id, coeff) in &repn.terms {
        let bounds = model.variable(*var_id)?.bounds;
        let (Some(lb), Some(ub)) = (bounds.lower_bound(), bounds.upper_bound()) else {
            return Err(GdpError::UnboundedEstimate {
                constraint: constraint.to_string(),
            });
        };
        if *coeff > 0.0 {
            hi += coeff * ub;
            lo += coeff * lb;
        } else {
            hi += coeff * lb;
            lo += coeff * ub;
        }
    }

    tracing::debug!(
        component = "gdp.bigm",
        operation = "estimate",
        status = "success",
        constraint,
        terms = repn.terms.len(),
        lo,
        hi,
        "Estimated Big-M range from variable bounds"
    );
    Ok((lo, hi))
}
