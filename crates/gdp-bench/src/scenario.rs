//! Synthetic disjunctive models and timed transformation runs.

use clap::ValueEnum;
use gdp_bigm::{BigM, TransformConfig};
use gdp_core::{Bounds, Model, ModelError, Variable};
use gdp_expr::Expr;
use gdp_expr::ids::{BlockId, VariableId};
use gdp_tools::MemoryProbe;
use std::time::{Duration, Instant};

use crate::artifact::{BenchRecord, SCHEMA_VERSION};

const VARIABLE_UPPER: f64 = 100.0;

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum Scenario {
    /// Independent disjunctions on the root block
    Flat,
    /// The first disjunct of every disjunction nests a two-term disjunction
    Nested,
}

impl Scenario {
    pub fn as_str(self) -> &'static str {
        match self {
            Scenario::Flat => "flat",
            Scenario::Nested => "nested",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub disjunctions: usize,
    pub disjuncts: usize,
    /// Constraints per disjunct
    pub rows: usize,
}

impl Shape {
    fn case_name(&self) -> String {
        format!("dj_{}x{}", self.disjunctions, self.disjuncts)
    }
}

#[derive(Debug, Clone)]
struct Stage {
    name: &'static str,
    duration: Duration,
    rss_before: Option<u64>,
    rss_after: Option<u64>,
}

/// Result of one build-and-transform repetition.
#[derive(Debug, Clone)]
pub struct Outcome {
    variables: usize,
    components: usize,
    relaxed_disjuncts: usize,
    stages: Vec<Stage>,
}

impl Outcome {
    pub fn records(
        &self,
        run_id: &str,
        scenario: Scenario,
        shape: Shape,
        repetition: u32,
    ) -> Vec<BenchRecord> {
        self.stages
            .iter()
            .map(|stage| BenchRecord {
                schema_version: SCHEMA_VERSION,
                run_id: run_id.to_string(),
                scenario: scenario.as_str().to_string(),
                case_name: shape.case_name(),
                repetition,
                variables: self.variables,
                components: self.components,
                relaxed_disjuncts: self.relaxed_disjuncts,
                stage: stage.name.to_string(),
                duration_ms: stage.duration.as_secs_f64() * 1000.0,
                rss_before_bytes: stage.rss_before,
                rss_after_bytes: stage.rss_after,
                rss_delta_bytes: stage
                    .rss_before
                    .zip(stage.rss_after)
                    .map(|(before, after)| after as i64 - before as i64),
            })
            .collect()
    }
}

/// Times closures and brackets each with RSS snapshots.
#[derive(Default)]
struct Stopwatch {
    probe: MemoryProbe,
    stages: Vec<Stage>,
}

impl Stopwatch {
    fn rss(&mut self, label: &str) -> Option<u64> {
        match self.probe.record(label) {
            Ok(snapshot) => Some(snapshot.rss_bytes),
            Err(err) => {
                tracing::warn!(
                    component = "gdp.bench",
                    operation = "measure",
                    status = "error",
                    code = err.code(),
                    stage = label,
                    "RSS snapshot unavailable"
                );
                None
            }
        }
    }

    fn time<T, E>(
        &mut self,
        name: &'static str,
        work: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        let rss_before = self.rss(name);
        let started = Instant::now();
        let result = work();
        let duration = started.elapsed();
        let rss_after = self.rss(name);
        self.stages.push(Stage {
            name,
            duration,
            rss_before,
            rss_after,
        });
        result
    }

    /// Append a `total` stage spanning every timed stage.
    fn finish(mut self) -> Vec<Stage> {
        let total = Stage {
            name: "total",
            duration: self.stages.iter().map(|stage| stage.duration).sum(),
            rss_before: self.stages.first().and_then(|stage| stage.rss_before),
            rss_after: self.stages.last().and_then(|stage| stage.rss_after),
        };
        tracing::debug!(
            component = "gdp.bench",
            operation = "measure",
            status = "success",
            duration_ms = total.duration.as_secs_f64() * 1000.0,
            peak_rss_bytes = ?self.probe.peak_rss(),
            "Finished repetition"
        );
        self.stages.push(total);
        self.stages
    }
}

/// Build a model of `shape` and relax it with `config`.
pub fn execute(
    scenario: Scenario,
    shape: Shape,
    config: &TransformConfig,
) -> Result<Outcome, Box<dyn std::error::Error>> {
    let mut stopwatch = Stopwatch::default();
    let mut model = stopwatch.time("build", || build_model(scenario, shape))?;
    stopwatch.time("transform", || BigM::apply(&mut model, config))?;

    let relaxed_disjuncts = model
        .transformation_info()
        .disjuncts
        .as_ref()
        .map_or(0, |table| table.values().filter(|info| info.relaxed).count());

    Ok(Outcome {
        variables: model.num_variables(),
        components: model.num_components(),
        relaxed_disjuncts,
        stages: stopwatch.finish(),
    })
}

/// One variable `x_i in [0, 100]` per disjunction. Row `r` of disjunct `k`
/// keeps `x_i + (r + 1) x_{i+1}` inside `[10 k, 10 k + 5 + r]`.
pub fn build_model(scenario: Scenario, shape: Shape) -> Result<Model, ModelError> {
    let mut model = Model::new();
    let root = model.root();

    let vars = (0..shape.disjunctions)
        .map(|i| {
            model.add_variable(
                root,
                &format!("x_{i}"),
                Variable::continuous(Bounds::new(0.0, VARIABLE_UPPER)),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (i, &x) in vars.iter().enumerate() {
        let next = vars[(i + 1) % vars.len()];
        let mut disjuncts = Vec::with_capacity(shape.disjuncts);
        for k in 0..shape.disjuncts {
            let disjunct = model.add_disjunct(root, &format!("d_{i}_{k}"))?;
            add_window_rows(&mut model, disjunct, (x, next), k, shape.rows)?;
            if scenario == Scenario::Nested && k == 0 {
                add_inner_disjunction(&mut model, disjunct, x)?;
            }
            disjuncts.push(disjunct);
        }
        model.add_disjunction(root, &format!("dj_{i}"), disjuncts, true)?;
    }
    Ok(model)
}

fn add_window_rows(
    model: &mut Model,
    disjunct: BlockId,
    (x, next): (VariableId, VariableId),
    k: usize,
    rows: usize,
) -> Result<(), ModelError> {
    let start = 10.0 * k as f64;
    for r in 0..rows {
        let weight = (r + 1) as f64;
        model.add_bounded_constraint(
            disjunct,
            &format!("c_{r}"),
            Expr::var(x).add(&Expr::term(next, weight)),
            Bounds::new(start, start + 4.0 + weight),
        )?;
    }
    Ok(())
}

fn add_inner_disjunction(
    model: &mut Model,
    disjunct: BlockId,
    x: VariableId,
) -> Result<(), ModelError> {
    let low = model.add_disjunct(disjunct, "low")?;
    let high = model.add_disjunct(disjunct, "high")?;
    model.add_bounded_constraint(low, "c", Expr::var(x), Bounds::at_most(1.0))?;
    model.add_bounded_constraint(high, "c", Expr::var(x), Bounds::at_least(3.0))?;
    model.add_disjunction(disjunct, "inner", vec![low, high], false)?;
    Ok(())
}
