#![allow(clippy::float_cmp)]

mod support;

use gdp_bigm::{AREA_NAME, BigM, BigMArgs, GdpError, TransformConfig};
use gdp_core::{Bounds, Index, Model, Objective, Sense, Variable};
use gdp_expr::Expr;
use gdp_expr::ids::BlockId;
use support::{
    big_m_of, coefficient, init_tracing, relaxed_block, relaxed_indices, relaxed_row, two_term,
};

#[test]
fn test_two_term_xor_end_to_end() {
    init_tracing();
    let mut fx = two_term(true);
    gdp_bigm::apply(&mut fx.model).unwrap();
    let model = &fx.model;
    let root = model.root();

    let selection = model
        .find_child(root, "_gdp_bigm_relaxation_dj_xor")
        .expect("selection constraint");
    let row = model.constraint(selection, &Index::scalar()).unwrap();
    assert_eq!(row.bounds, Bounds::equal_to(1.0));
    let y1 = model.indicator_var(fx.d1).unwrap();
    let y2 = model.indicator_var(fx.d2).unwrap();
    assert_eq!(row.body.normalized_terms(), vec![(y1, 1.0), (y2, 1.0)]);
    assert_eq!(
        model.block_info(root).unwrap().selection_constraints.get(&fx.dj),
        Some(&selection)
    );

    let area = model.bigm_area().unwrap();
    assert_eq!(model.block_name(area), AREA_NAME);
    let relaxed = model.find_child(area, "relaxed_disjuncts").unwrap();
    assert_eq!(
        model.component(relaxed).unwrap().indices(),
        vec![Index::from(0), Index::from(1)]
    );
    assert!(model.find_child(area, "lbub").is_some());

    // x <= 2 only has an upper side, x >= 8 only a lower one.
    assert_eq!(relaxed_indices(model, fx.d1, "c"), vec![Index::from("ub")]);
    assert_eq!(relaxed_indices(model, fx.d2, "c"), vec![Index::from("lb")]);

    assert!(!model.is_component_active(fx.dj));
    assert!(!model.is_block_active(fx.d1));
    assert!(!model.is_block_active(fx.d2));
    let original = model.find_child(fx.d1, "c").unwrap();
    assert!(!model.constraint(original, &Index::scalar()).unwrap().active);
    assert!(model.disjunct_info(fx.d1).unwrap().relaxed);
}

#[test]
fn test_estimated_m_values() {
    let mut fx = two_term(true);
    gdp_bigm::apply(&mut fx.model).unwrap();
    let model = &fx.model;

    // upper: est_hi - upper = 10 - 2
    let upper = relaxed_row(model, fx.d1, "c", Index::from("ub"));
    assert_eq!(big_m_of(model, fx.d1, &upper), 8.0);
    assert_eq!(upper.body.constant(), -8.0);
    assert_eq!(upper.bounds, Bounds::at_most(2.0));

    // lower: est_lo - lower = 0 - 8
    let lower = relaxed_row(model, fx.d2, "c", Index::from("lb"));
    assert_eq!(big_m_of(model, fx.d2, &lower), -8.0);
    assert_eq!(lower.bounds, Bounds::at_least(8.0));
}

#[test]
fn test_selected_indicator_recovers_original_bounds() {
    let mut model = Model::new();
    let root = model.root();
    let x = model
        .add_variable(root, "x", Variable::continuous(Bounds::new(-4.0, 4.0)))
        .unwrap();
    let d = model.add_disjunct(root, "d").unwrap();
    let e = model.add_disjunct(root, "e").unwrap();
    model
        .add_bounded_constraint(d, "c", Expr::term(x, 2.0).add_constant(1.0), Bounds::new(-1.0, 3.0))
        .unwrap();
    model.add_disjunction(root, "dj", vec![d, e], true).unwrap();
    gdp_bigm::apply(&mut model).unwrap();

    let y = model.indicator_var(d).unwrap();
    for tag in ["lb", "ub"] {
        let row = relaxed_row(&model, d, "c", Index::from(tag));
        for x_value in [-4.0, -1.0, 0.5, 4.0] {
            let selected = row
                .body
                .evaluate(|v| Some(if v == y { 1.0 } else { x_value }))
                .unwrap();
            assert_eq!(selected, 2.0 * x_value + 1.0);
        }
        // Deselected, the row holds over the whole box.
        for x_value in [-4.0, 4.0] {
            let dropped = row
                .body
                .evaluate(|v| Some(if v == y { 0.0 } else { x_value }))
                .unwrap();
            assert!(row.bounds.lower <= dropped && dropped <= row.bounds.upper);
        }
    }
}

#[test]
fn test_equality_constraint_relaxes_both_sides() {
    let mut model = Model::new();
    let root = model.root();
    let x = model
        .add_variable(root, "x", Variable::continuous(Bounds::new(0.0, 10.0)))
        .unwrap();
    let d = model.add_disjunct(root, "d").unwrap();
    let e = model.add_disjunct(root, "e").unwrap();
    model.add_constraint(d, "c", Expr::var(x).eq_scalar(5.0)).unwrap();
    model.add_disjunction(root, "dj", vec![d, e], true).unwrap();
    gdp_bigm::apply(&mut model).unwrap();

    assert_eq!(
        relaxed_indices(&model, d, "c"),
        vec![Index::from("lb"), Index::from("ub")]
    );
    let lower = relaxed_row(&model, d, "c", Index::from("lb"));
    let upper = relaxed_row(&model, d, "c", Index::from("ub"));
    assert_eq!(big_m_of(&model, d, &lower), -5.0);
    assert_eq!(big_m_of(&model, d, &upper), 5.0);
}

#[test]
fn test_inclusive_or_selection() {
    let mut fx = two_term(false);
    gdp_bigm::apply(&mut fx.model).unwrap();
    let model = &fx.model;
    let selection = model
        .find_child(model.root(), "_gdp_bigm_relaxation_dj_or")
        .expect("selection constraint");
    let row = model.constraint(selection, &Index::scalar()).unwrap();
    assert_eq!(row.bounds, Bounds::at_least(1.0));
    assert_eq!(row.bounds.upper_bound(), None);
}

#[test]
fn test_second_apply_leaves_model_unchanged() {
    let mut fx = two_term(true);
    gdp_bigm::apply(&mut fx.model).unwrap();
    let once = fx.model.clone();
    gdp_bigm::apply(&mut fx.model).unwrap();
    assert_eq!(fx.model, once);
}

#[test]
fn test_deactivated_disjunct_is_fixed_off() {
    let mut fx = two_term(true);
    let d2 = fx.model.find_child(fx.model.root(), "d2").unwrap();
    fx.model.deactivate_component(d2).unwrap();
    gdp_bigm::apply(&mut fx.model).unwrap();
    let model = &fx.model;

    let y2 = model.indicator_var(fx.d2).unwrap();
    assert_eq!(model.variable(y2).unwrap().fixed, Some(0.0));
    assert!(model.disjunct_info(fx.d2).is_none());
    let original = model.find_child(fx.d2, "c").unwrap();
    assert!(model.constraint(original, &Index::scalar()).unwrap().active);

    let area = model.bigm_area().unwrap();
    let relaxed = model.find_child(area, "relaxed_disjuncts").unwrap();
    assert_eq!(model.component(relaxed).unwrap().indices().len(), 1);
}

#[test]
fn test_deactivated_indexed_disjunct_is_fixed_off() {
    let mut model = Model::new();
    let root = model.root();
    let x = model
        .add_variable(root, "x", Variable::continuous(Bounds::new(0.0, 10.0)))
        .unwrap();
    let d = model.add_indexed_disjunct(root, "d").unwrap();
    let mut members = Vec::new();
    for t in 1..=2 {
        let member = model.add_disjunct_member(d, Index::from(t)).unwrap();
        model
            .add_bounded_constraint(member, "c", Expr::var(x), Bounds::at_most(t as f64))
            .unwrap();
        members.push(member);
    }
    let keep = model.add_disjunct(root, "keep").unwrap();
    model
        .add_bounded_constraint(keep, "c", Expr::var(x), Bounds::at_least(8.0))
        .unwrap();
    model
        .add_disjunction(root, "dj", vec![members[0], members[1], keep], true)
        .unwrap();

    model.deactivate_component(d).unwrap();
    gdp_bigm::apply(&mut model).unwrap();

    for member in members {
        let y = model.indicator_var(member).unwrap();
        assert_eq!(model.variable(y).unwrap().fixed, Some(0.0));
        assert!(model.disjunct_info(member).is_none());
        let original = model.find_child(member, "c").unwrap();
        assert!(model.constraint(original, &Index::scalar()).unwrap().active);
    }
    assert_eq!(relaxed_indices(&model, keep, "c"), vec![Index::from("lb")]);
    let area = model.bigm_area().unwrap();
    let relaxed = model.find_child(area, "relaxed_disjuncts").unwrap();
    assert_eq!(model.component(relaxed).unwrap().indices().len(), 1);
}

#[test]
fn test_failed_call_resumes_on_retry() {
    let mut model = Model::new();
    let root = model.root();
    let x = model
        .add_variable(root, "x", Variable::continuous(Bounds::new(0.0, 10.0)))
        .unwrap();
    let z = model
        .add_variable(root, "z", Variable::continuous(Bounds::unbounded()))
        .unwrap();
    let d1 = model.add_disjunct(root, "d1").unwrap();
    let d2 = model.add_disjunct(root, "d2").unwrap();
    model
        .add_bounded_constraint(d1, "a", Expr::var(x), Bounds::at_most(2.0))
        .unwrap();
    let b = model
        .add_bounded_constraint(d1, "b", Expr::var(z), Bounds::at_most(3.0))
        .unwrap();
    model
        .add_bounded_constraint(d2, "c", Expr::var(x), Bounds::at_least(8.0))
        .unwrap();
    let dj = model.add_disjunction(root, "dj", vec![d1, d2], true).unwrap();

    let err = gdp_bigm::apply(&mut model).unwrap_err();
    assert_eq!(err.code(), "GDP_ESTIMATE_UNBOUNDED");
    assert!(model.constraint(b, &Index::scalar()).unwrap().active);
    assert!(model.is_block_active(d1));

    let config = TransformConfig::new().with_big_m(BigMArgs::global(100.0));
    BigM::apply(&mut model, &config).unwrap();

    let row = relaxed_row(&model, d1, "b", Index::from("ub"));
    assert_eq!(big_m_of(&model, d1, &row), 100.0);
    assert_eq!(coefficient(&row.body, z), 1.0);
    // `a` was relaxed by the failed call and keeps its estimated M.
    let row = relaxed_row(&model, d1, "a", Index::from("ub"));
    assert_eq!(big_m_of(&model, d1, &row), 8.0);

    assert!(!model.constraint(b, &Index::scalar()).unwrap().active);
    assert!(!model.is_block_active(d1));
    assert!(model.disjunct_info(d1).unwrap().relaxed);
    assert!(!model.is_component_active(dj));
    let area = model.bigm_area().unwrap();
    let relaxed = model.find_child(area, "relaxed_disjuncts").unwrap();
    assert_eq!(
        model.component(relaxed).unwrap().indices(),
        vec![Index::from(0), Index::from(1)]
    );
}

#[test]
fn test_reactivated_disjunction_rebuilds_selection_row() {
    let mut fx = two_term(true);
    gdp_bigm::apply(&mut fx.model).unwrap();
    let root = fx.model.root();
    let selection = fx
        .model
        .find_child(root, "_gdp_bigm_relaxation_dj_xor")
        .unwrap();
    let components = fx.model.block(root).unwrap().components().len();

    fx.model.deactivate_component(selection).unwrap();
    fx.model.activate_disjunction(fx.dj, &Index::scalar()).unwrap();
    gdp_bigm::apply(&mut fx.model).unwrap();
    let model = &fx.model;

    let row = model.constraint(selection, &Index::scalar()).unwrap();
    assert!(row.active);
    assert_eq!(row.bounds, Bounds::equal_to(1.0));
    let y1 = model.indicator_var(fx.d1).unwrap();
    let y2 = model.indicator_var(fx.d2).unwrap();
    assert_eq!(row.body.normalized_terms(), vec![(y1, 1.0), (y2, 1.0)]);
    assert_eq!(model.block(root).unwrap().components().len(), components);
    assert!(!model.is_component_active(fx.dj));
}

#[test]
fn test_links_between_original_and_relaxed() {
    let mut fx = two_term(true);
    gdp_bigm::apply(&mut fx.model).unwrap();
    let model = &fx.model;

    let block = relaxed_block(model, fx.d1);
    assert_eq!(model.relaxed_block_info(block).unwrap().src, fx.d1);
    let original = model.find_child(fx.d1, "c").unwrap();
    let relaxed = model.find_child(block, "c").unwrap();
    assert_eq!(
        model
            .disjunct_info(fx.d1)
            .unwrap()
            .relaxed_constraints
            .get(&original),
        Some(&relaxed)
    );

    let json = model.transformation_info_json().unwrap();
    assert_eq!(
        json["bigm_area"],
        serde_json::json!(model.bigm_area().unwrap().inner())
    );
    assert_eq!(json["disjuncts"].as_object().unwrap().len(), 2);
}

#[test]
fn test_nested_disjunctions_relax_inner_first() {
    init_tracing();
    let mut model = Model::new();
    let root = model.root();
    let x = model
        .add_variable(root, "x", Variable::continuous(Bounds::new(0.0, 10.0)))
        .unwrap();
    let a = model.add_disjunct(root, "a").unwrap();
    let b = model.add_disjunct(root, "b").unwrap();
    let i1 = model.add_disjunct(a, "i1").unwrap();
    let i2 = model.add_disjunct(a, "i2").unwrap();
    model
        .add_bounded_constraint(i1, "c", Expr::var(x), Bounds::at_most(1.0))
        .unwrap();
    model
        .add_bounded_constraint(i2, "c", Expr::var(x), Bounds::at_least(3.0))
        .unwrap();
    model.add_disjunction(a, "inner", vec![i1, i2], true).unwrap();
    model
        .add_bounded_constraint(b, "c", Expr::var(x), Bounds::at_least(9.0))
        .unwrap();
    model.add_disjunction(root, "outer", vec![a, b], true).unwrap();

    gdp_bigm::apply(&mut model).unwrap();

    let slot = |disjunct| {
        let block = relaxed_block(&model, disjunct);
        model.block(block).unwrap().owner().unwrap().1.clone()
    };
    assert_eq!(slot(i1), Index::from(0));
    assert_eq!(slot(i2), Index::from(1));
    assert_eq!(slot(a), Index::from(2));
    assert_eq!(slot(b), Index::from(3));

    // The inner selection constraint sits on `a` and is relaxed with it.
    assert!(model.find_child(a, "_gdp_bigm_relaxation_inner_xor").is_some());
    let rows = relaxed_indices(&model, a, "_gdp_bigm_relaxation_inner_xor");
    assert_eq!(rows, vec![Index::from("lb"), Index::from("ub")]);
    let upper = relaxed_row(&model, a, "_gdp_bigm_relaxation_inner_xor", Index::from("ub"));
    assert_eq!(big_m_of(&model, a, &upper), 1.0);
}

/// `outer = a xor b` where `a` holds `inner = i1 xor i2`; the inner
/// disjuncts live on the root so `a` only contains the disjunction.
fn nested_on_root() -> (Model, BlockId) {
    let mut model = Model::new();
    let root = model.root();
    let a = model.add_disjunct(root, "a").unwrap();
    let b = model.add_disjunct(root, "b").unwrap();
    let i1 = model.add_disjunct(root, "i1").unwrap();
    let i2 = model.add_disjunct(root, "i2").unwrap();
    model.add_disjunction(a, "inner", vec![i1, i2], true).unwrap();
    model.add_disjunction(root, "outer", vec![a, b], true).unwrap();
    (model, a)
}

#[test]
fn test_outer_disjunction_before_inner_is_an_error() {
    let (mut model, _) = nested_on_root();
    let config = TransformConfig::new().with_target("outer".parse().unwrap());
    let err = BigM::apply(&mut model, &config).unwrap_err();
    assert_eq!(
        err,
        GdpError::UntransformedDisjunction {
            disjunction: "a.inner".to_string(),
            disjunct: "a".to_string(),
        }
    );
}

#[test]
fn test_targets_listed_inner_first_succeed() {
    let (mut model, a) = nested_on_root();
    let config = TransformConfig::new()
        .with_target("a.inner".parse().unwrap())
        .with_target("outer".parse().unwrap());
    BigM::apply(&mut model, &config).unwrap();
    assert!(model.disjunct_info(a).unwrap().relaxed);
    assert_eq!(
        relaxed_indices(&model, a, "_gdp_bigm_relaxation_inner_xor"),
        vec![Index::from("lb"), Index::from("ub")]
    );
}

#[test]
fn test_stray_active_disjunct_is_an_error() {
    let mut model = Model::new();
    let root = model.root();
    let a = model.add_disjunct(root, "a").unwrap();
    let b = model.add_disjunct(root, "b").unwrap();
    model.add_disjunct(a, "stray").unwrap();
    model.add_disjunction(root, "dj", vec![a, b], true).unwrap();

    let err = gdp_bigm::apply(&mut model).unwrap_err();
    assert_eq!(
        err,
        GdpError::ActiveNestedDisjunct {
            nested: "a.stray".to_string(),
            disjunct: "a".to_string(),
        }
    );
}

#[test]
fn test_objective_inside_disjunct_is_unsupported() {
    let mut model = Model::new();
    let root = model.root();
    let a = model.add_disjunct(root, "a").unwrap();
    let b = model.add_disjunct(root, "b").unwrap();
    model
        .add_objective(
            a,
            "obj",
            Objective {
                sense: Sense::Minimize,
                expr: Expr::from_constant(0.0),
            },
        )
        .unwrap();
    model.add_disjunction(root, "dj", vec![a, b], true).unwrap();

    let err = gdp_bigm::apply(&mut model).unwrap_err();
    assert_eq!(err.code(), "GDP_UNSUPPORTED_COMPONENT");
    assert!(err.to_string().contains("a.obj"));
}

#[test]
fn test_indexed_disjunction_and_constraints() {
    let mut model = Model::new();
    let root = model.root();
    let x = model
        .add_variable(root, "x", Variable::continuous(Bounds::new(0.0, 10.0)))
        .unwrap();
    let d = model.add_indexed_disjunct(root, "d").unwrap();
    let dj = model.add_indexed_disjunction(root, "dj", true).unwrap();
    let mut members = Vec::new();
    for t in 1..=2 {
        let on = model.add_disjunct_member(d, Index::from((t, 0))).unwrap();
        let off = model.add_disjunct_member(d, Index::from((t, 1))).unwrap();
        let c = model.add_indexed_constraint(on, "c").unwrap();
        for k in 1..=2 {
            model
                .add_constraint_member(c, Index::from(k), Expr::var(x), Bounds::at_most(k as f64))
                .unwrap();
        }
        model
            .add_disjunction_member(dj, Index::from(t), vec![on, off])
            .unwrap();
        members.push(on);
    }

    gdp_bigm::apply(&mut model).unwrap();

    let selection = model
        .find_child(root, "_gdp_bigm_relaxation_dj_xor")
        .unwrap();
    assert_eq!(
        model.component(selection).unwrap().indices(),
        vec![Index::from(1), Index::from(2)]
    );
    assert_eq!(
        relaxed_indices(&model, members[0], "c"),
        vec![
            Index::from(1).with("ub"),
            Index::from(2).with("ub"),
        ]
    );
    let row = relaxed_row(&model, members[1], "c", Index::from(2).with("ub"));
    assert_eq!(big_m_of(&model, members[1], &row), 8.0);
    assert_eq!(coefficient(&row.body, x), 1.0);
}

#[test]
fn test_generated_names_avoid_collisions() {
    let mut model = Model::new();
    let root = model.root();
    model.add_block(root, AREA_NAME).unwrap();
    let x = model
        .add_variable(root, "x", Variable::continuous(Bounds::new(0.0, 10.0)))
        .unwrap();
    let d = model.add_disjunct(root, "d").unwrap();
    let e = model.add_disjunct(root, "e").unwrap();
    model
        .add_bounded_constraint(d, "c", Expr::var(x), Bounds::at_most(4.0))
        .unwrap();
    let inner = model.add_block(d, "inner").unwrap();
    model
        .add_bounded_constraint(inner, "c", Expr::var(x), Bounds::at_least(1.0))
        .unwrap();
    model.add_disjunction(root, "dj", vec![d, e], true).unwrap();

    gdp_bigm::apply(&mut model).unwrap();

    let area = model.bigm_area().unwrap();
    assert_eq!(model.block_name(area), format!("{AREA_NAME}_1"));
    let block = relaxed_block(&model, d);
    assert!(model.find_child(block, "c").is_some());
    assert_eq!(relaxed_indices(&model, d, "c_1"), vec![Index::from("lb")]);
}
