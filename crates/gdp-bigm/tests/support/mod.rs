#![allow(dead_code)]

use gdp_core::{Bounds, ConstraintData, Index, Model, Variable};
use gdp_expr::Expr;
use gdp_expr::ids::{BlockId, ComponentId, VariableId};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub struct TwoTerm {
    pub model: Model,
    pub x: VariableId,
    pub d1: BlockId,
    pub d2: BlockId,
    pub dj: ComponentId,
}

/// `x in [0, 10]`, `d1: x <= 2`, `d2: x >= 8`, `dj = d1 xor d2`.
pub fn two_term(xor: bool) -> TwoTerm {
    let mut model = Model::new();
    let root = model.root();
    let x = model
        .add_variable(root, "x", Variable::continuous(Bounds::new(0.0, 10.0)))
        .unwrap();
    let d1 = model.add_disjunct(root, "d1").unwrap();
    let d2 = model.add_disjunct(root, "d2").unwrap();
    model
        .add_bounded_constraint(d1, "c", Expr::var(x), Bounds::at_most(2.0))
        .unwrap();
    model
        .add_bounded_constraint(d2, "c", Expr::var(x), Bounds::at_least(8.0))
        .unwrap();
    let dj = model.add_disjunction(root, "dj", vec![d1, d2], xor).unwrap();
    TwoTerm {
        model,
        x,
        d1,
        d2,
        dj,
    }
}

/// Block holding the relaxation of `disjunct`.
pub fn relaxed_block(model: &Model, disjunct: BlockId) -> BlockId {
    model
        .disjunct_info(disjunct)
        .and_then(|info| info.bigm)
        .expect("disjunct was not relaxed")
}

/// Relaxed row `name[index]` of `disjunct`.
pub fn relaxed_row(model: &Model, disjunct: BlockId, name: &str, index: Index) -> ConstraintData {
    let block = relaxed_block(model, disjunct);
    let id = model.find_child(block, name).expect("missing relaxed constraint");
    model.constraint(id, &index).unwrap().clone()
}

/// Indices present on the relaxed constraint `name` of `disjunct`.
pub fn relaxed_indices(model: &Model, disjunct: BlockId, name: &str) -> Vec<Index> {
    let block = relaxed_block(model, disjunct);
    let id = model.find_child(block, name).expect("missing relaxed constraint");
    model.component(id).unwrap().indices()
}

pub fn coefficient(expr: &Expr, var: VariableId) -> f64 {
    expr.normalized_terms()
        .into_iter()
        .find_map(|(v, c)| (v == var).then_some(c))
        .unwrap_or(0.0)
}

/// The M of a relaxed row is the coefficient on the disjunct's indicator.
pub fn big_m_of(model: &Model, disjunct: BlockId, row: &ConstraintData) -> f64 {
    coefficient(&row.body, model.indicator_var(disjunct).unwrap())
}
