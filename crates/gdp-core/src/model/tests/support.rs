use crate::types::{Bounds, Variable};
use gdp_expr::Expr;
use gdp_expr::ids::{BlockId, VariableId};

use crate::model::Model;

pub(super) fn bounded_variable(model: &mut Model, block: BlockId, name: &str) -> VariableId {
    model
        .add_variable(block, name, Variable::continuous(Bounds::new(0.0, 10.0)))
        .unwrap()
}

/// Root with `d1`, `d2` disjuncts each holding `c: x <= bound` and a
/// disjunction `dj` over them.
pub(super) fn two_term_disjunction() -> (Model, VariableId, BlockId, BlockId) {
    let mut model = Model::new();
    let root = model.root();
    let x = bounded_variable(&mut model, root, "x");
    let d1 = model.add_disjunct(root, "d1").unwrap();
    let d2 = model.add_disjunct(root, "d2").unwrap();
    model
        .add_bounded_constraint(d1, "c", Expr::var(x), Bounds::at_most(2.0))
        .unwrap();
    model
        .add_bounded_constraint(d2, "c", Expr::var(x), Bounds::at_least(8.0))
        .unwrap();
    model.add_disjunction(root, "dj", vec![d1, d2], true).unwrap();
    (model, x, d1, d2)
}
