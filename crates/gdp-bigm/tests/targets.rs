mod support;

use gdp_bigm::{BigM, GdpError, TransformConfig};
use gdp_core::{Bounds, Index, Model, Variable};
use gdp_expr::Expr;
use gdp_expr::ids::{BlockId, ComponentId};
use support::two_term;

fn targets(paths: &[&str]) -> TransformConfig {
    TransformConfig::new().with_targets(paths.iter().map(|path| path.parse().unwrap()))
}

/// Two blocks `p` and `q`, each with its own scalar disjunction `dj`, plus an
/// indexed disjunction `many[1..=2]` on the root.
fn two_blocks() -> (Model, [BlockId; 2], ComponentId) {
    let mut model = Model::new();
    let root = model.root();
    let x = model
        .add_variable(root, "x", Variable::continuous(Bounds::new(0.0, 10.0)))
        .unwrap();
    let mut blocks = [root; 2];
    for (slot, name) in ["p", "q"].into_iter().enumerate() {
        let block = model.add_block(root, name).unwrap();
        let on = model.add_disjunct(block, "on").unwrap();
        let off = model.add_disjunct(block, "off").unwrap();
        model
            .add_bounded_constraint(on, "c", Expr::var(x), Bounds::at_most(5.0))
            .unwrap();
        model.add_disjunction(block, "dj", vec![on, off], true).unwrap();
        blocks[slot] = block;
    }
    let d = model.add_indexed_disjunct(root, "d").unwrap();
    let many = model.add_indexed_disjunction(root, "many", false).unwrap();
    for t in 1..=2 {
        let a = model.add_disjunct_member(d, Index::from((t, 0))).unwrap();
        let b = model.add_disjunct_member(d, Index::from((t, 1))).unwrap();
        model
            .add_disjunction_member(many, Index::from(t), vec![a, b])
            .unwrap();
    }
    (model, blocks, many)
}

#[test]
fn test_unknown_target_is_reported() {
    let mut fx = two_term(true);
    let err = BigM::apply(&mut fx.model, &targets(&["missing.dj"])).unwrap_err();
    assert_eq!(err, GdpError::TargetNotFound("missing.dj".to_string()));
}

#[test]
fn test_constraint_target_is_rejected() {
    let mut fx = two_term(true);
    let err = BigM::apply(&mut fx.model, &targets(&["d1.c"])).unwrap_err();
    assert_eq!(
        err,
        GdpError::InvalidTarget {
            target: "d1.c".to_string(),
            kind: "constraint",
        }
    );
}

#[test]
fn test_inactive_target_is_skipped() {
    let mut fx = two_term(true);
    fx.model.deactivate_component(fx.dj).unwrap();
    BigM::apply(&mut fx.model, &targets(&["dj"])).unwrap();
    assert!(fx.model.disjunct_info(fx.d1).is_none());
    assert!(fx.model.find_child(fx.model.root(), "_gdp_bigm_relaxation_dj_xor").is_none());
}

#[test]
fn test_block_target_only_touches_that_block() {
    let (mut model, [p, q], many) = two_blocks();
    BigM::apply(&mut model, &targets(&["p"])).unwrap();

    let p_dj = model.find_child(p, "dj").unwrap();
    let q_dj = model.find_child(q, "dj").unwrap();
    assert!(!model.is_component_active(p_dj));
    assert!(model.is_component_active(q_dj));
    assert!(model.find_child(p, "_gdp_bigm_relaxation_dj_xor").is_some());
    assert!(model.find_child(q, "_gdp_bigm_relaxation_dj_xor").is_none());
    assert!(model.disjunction(many, &Index::from(1)).unwrap().active);
}

#[test]
fn test_disjunction_members_share_one_selection_constraint() {
    let (mut model, _, many) = two_blocks();
    let root = model.root();

    BigM::apply(&mut model, &targets(&["many[2]"])).unwrap();
    let selection = model
        .find_child(root, "_gdp_bigm_relaxation_many_or")
        .unwrap();
    assert_eq!(
        model.component(selection).unwrap().indices(),
        vec![Index::from(2)]
    );
    assert!(model.disjunction(many, &Index::from(1)).unwrap().active);
    assert!(!model.disjunction(many, &Index::from(2)).unwrap().active);

    BigM::apply(&mut model, &targets(&["many[1]"])).unwrap();
    assert_eq!(
        model.component(selection).unwrap().indices(),
        vec![Index::from(1), Index::from(2)]
    );
    assert!(
        model
            .find_child(root, "_gdp_bigm_relaxation_many_or_1")
            .is_none()
    );
    let row = model.constraint(selection, &Index::from(1)).unwrap();
    assert_eq!(row.bounds, Bounds::at_least(1.0));
}

#[test]
fn test_disjunction_component_target_deactivates_component() {
    let (mut model, _, many) = two_blocks();
    BigM::apply(&mut model, &targets(&["many"])).unwrap();
    assert!(!model.is_component_active(many));
    assert!(!model.disjunction(many, &Index::from(1)).unwrap().active);
    assert!(!model.disjunction(many, &Index::from(2)).unwrap().active);
}

#[test]
fn test_whole_model_reuses_area_across_calls() {
    let (mut model, [p, _], _) = two_blocks();
    BigM::apply(&mut model, &targets(&["p"])).unwrap();
    let area = model.bigm_area().unwrap();
    gdp_bigm::apply(&mut model).unwrap();

    assert_eq!(model.bigm_area(), Some(area));
    let relaxed = model.find_child(area, "relaxed_disjuncts").unwrap();
    // p.on, p.off, q.on, q.off and the four members of `d`.
    assert_eq!(model.component(relaxed).unwrap().indices().len(), 8);
    assert!(model.active_disjunctions_postorder(model.root()).is_empty());
    let on = model.child_block(p, "on").unwrap();
    assert!(model.disjunct_info(on).unwrap().relaxed);
}
