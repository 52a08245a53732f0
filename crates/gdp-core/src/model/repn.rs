//! Linear canonical form of expressions.

use std::collections::BTreeMap;

use gdp_expr::Expr;
use gdp_expr::ids::VariableId;

use crate::model::Model;

/// `constant + Σ coeff·var` over unfixed variables, duplicates merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearRepn {
    pub constant: f64,
    pub terms: Vec<(VariableId, f64)>,
}

impl Model {
    /// Canonicalize `expr` against the current variable state.
    ///
    /// Fixed variables are folded into the constant, so a product with a
    /// fixed factor stays linear. Returns `None` when a product of two
    /// unfixed variables survives.
    pub fn linear_repn(&self, expr: &Expr) -> Option<LinearRepn> {
        let fixed = |id: VariableId| self.variables.get(id.index()).and_then(|v| v.fixed);

        let mut constant = expr.constant();
        let mut merged: BTreeMap<VariableId, f64> = BTreeMap::new();
        for (var_id, coeff) in expr.linear_terms() {
            match fixed(var_id) {
                Some(value) => constant += coeff * value,
                None => *merged.entry(var_id).or_insert(0.0) += coeff,
            }
        }
        for (a, b, coeff) in expr.bilinear_terms() {
            if coeff == 0.0 {
                continue;
            }
            match (fixed(a), fixed(b)) {
                (Some(x), Some(y)) => constant += coeff * x * y,
                (Some(x), None) => *merged.entry(b).or_insert(0.0) += coeff * x,
                (None, Some(y)) => *merged.entry(a).or_insert(0.0) += coeff * y,
                (None, None) => return None,
            }
        }

        Some(LinearRepn {
            constant,
            terms: merged.into_iter().filter(|(_, c)| *c != 0.0).collect(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::types::{Bounds, Variable};

    #[test]
    fn duplicate_terms_merge_and_cancel() {
        let mut model = Model::new();
        let root = model.root();
        let x = model
            .add_variable(root, "x", Variable::continuous(Bounds::new(0.0, 1.0)))
            .unwrap();
        let y = model
            .add_variable(root, "y", Variable::continuous(Bounds::new(0.0, 1.0)))
            .unwrap();
        let expr = Expr::new(vec![(x, 2.0), (y, 1.0), (x, 3.0), (y, -1.0)], 4.0);

        let repn = model.linear_repn(&expr).unwrap();
        assert_eq!(repn.constant, 4.0);
        assert_eq!(repn.terms, vec![(x, 5.0)]);
    }

    #[test]
    fn fixed_variables_fold_into_constant() {
        let mut model = Model::new();
        let root = model.root();
        let x = model
            .add_variable(root, "x", Variable::continuous(Bounds::new(0.0, 9.0)))
            .unwrap();
        let y = model
            .add_variable(root, "y", Variable::continuous(Bounds::new(0.0, 9.0)))
            .unwrap();
        model.fix_variable(y, 3.0).unwrap();

        let expr = Expr::term(x, 1.0) + Expr::term(y, 2.0) + Expr::product(x, y, 1.0);
        let repn = model.linear_repn(&expr).unwrap();
        assert_eq!(repn.constant, 6.0);
        assert_eq!(repn.terms, vec![(x, 4.0)]);
    }

    #[test]
    fn product_of_free_variables_is_nonlinear() {
        let mut model = Model::new();
        let root = model.root();
        let x = model
            .add_variable(root, "x", Variable::continuous(Bounds::new(0.0, 1.0)))
            .unwrap();
        assert!(model.linear_repn(&Expr::product(x, x, 1.0)).is_none());
    }
}
