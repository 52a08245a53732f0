//! Expression assembly helpers.

use crate::expr::core::Expr;

/// Sum expressions by concatenating their terms and adding their constants.
///
/// Repeated variables are kept as separate terms; `normalized_terms()`
/// merges them.
pub fn linear_sum<I>(exprs: I) -> Expr
where
    I: IntoIterator<Item = Expr>,
{
    exprs
        .into_iter()
        .fold(Expr::default(), |acc, expr| acc.add(&expr))
}
