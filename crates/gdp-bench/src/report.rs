//! Summaries and baseline comparisons of benchmark records.

use clap::ValueEnum;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::artifact::BenchRecord;

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Ndjson,
}

/// Rows that can be printed as a fixed-width table.
pub trait Tabular {
    fn header() -> String;
    fn line(&self) -> String;
}

/// Print `rows` in `format`.
pub fn emit<T>(format: OutputFormat, rows: &[T]) -> Result<(), Box<dyn std::error::Error>>
where
    T: Tabular + Serialize,
{
    match format {
        OutputFormat::Table => {
            println!("{}", T::header());
            rows.iter().for_each(|row| println!("{}", row.line()));
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(rows)?),
        OutputFormat::Ndjson => {
            for row in rows {
                println!("{}", serde_json::to_string(row)?);
            }
        }
    }
    Ok(())
}

/// Aggregate of one (scenario, case, stage) group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub scenario: String,
    pub case_name: String,
    pub stage: String,
    pub samples: usize,
    pub mean_duration_ms: f64,
    pub max_duration_ms: f64,
    pub mean_rss_delta_bytes: Option<f64>,
    pub max_rss_after_bytes: Option<u64>,
}

#[derive(Default)]
struct Accumulator {
    samples: usize,
    duration_total: f64,
    duration_max: f64,
    rss_deltas: Vec<i64>,
    rss_after_max: Option<u64>,
}

impl Accumulator {
    fn push(&mut self, record: &BenchRecord) {
        self.samples += 1;
        self.duration_total += record.duration_ms;
        self.duration_max = self.duration_max.max(record.duration_ms);
        self.rss_deltas.extend(record.rss_delta_bytes);
        self.rss_after_max = self.rss_after_max.max(record.rss_after_bytes);
    }

    fn mean_rss_delta(&self) -> Option<f64> {
        if self.rss_deltas.is_empty() {
            return None;
        }
        let total: i64 = self.rss_deltas.iter().sum();
        Some(total as f64 / self.rss_deltas.len() as f64)
    }
}

/// Group records by scenario, case and stage, in that order.
pub fn summarize(records: &[BenchRecord]) -> Vec<SummaryRow> {
    let mut groups: BTreeMap<(&str, &str, &str), Accumulator> = BTreeMap::new();
    for record in records {
        groups
            .entry((
                record.scenario.as_str(),
                record.case_name.as_str(),
                record.stage.as_str(),
            ))
            .or_default()
            .push(record);
    }

    groups
        .into_iter()
        .map(|((scenario, case_name, stage), acc)| SummaryRow {
            scenario: scenario.to_string(),
            case_name: case_name.to_string(),
            stage: stage.to_string(),
            samples: acc.samples,
            mean_duration_ms: acc.duration_total / acc.samples.max(1) as f64,
            max_duration_ms: acc.duration_max,
            mean_rss_delta_bytes: acc.mean_rss_delta(),
            max_rss_after_bytes: acc.rss_after_max,
        })
        .collect()
}

/// Change of one summary group between two artifacts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareRow {
    pub scenario: String,
    pub case_name: String,
    pub stage: String,
    pub baseline_mean_duration_ms: f64,
    pub candidate_mean_duration_ms: f64,
    pub duration_change_pct: Option<f64>,
    pub baseline_mean_rss_delta_bytes: Option<f64>,
    pub candidate_mean_rss_delta_bytes: Option<f64>,
    pub rss_change_pct: Option<f64>,
}

/// Pair the `stage` rows present in both summaries.
pub fn compare(
    baseline: &[SummaryRow],
    candidate: &[SummaryRow],
    stage: &str,
) -> Vec<CompareRow> {
    let baseline: BTreeMap<(&str, &str), &SummaryRow> = baseline
        .iter()
        .filter(|row| row.stage == stage)
        .map(|row| ((row.scenario.as_str(), row.case_name.as_str()), row))
        .collect();

    candidate
        .iter()
        .filter(|row| row.stage == stage)
        .filter_map(|next| {
            let base = baseline.get(&(next.scenario.as_str(), next.case_name.as_str()))?;
            Some(CompareRow {
                scenario: next.scenario.clone(),
                case_name: next.case_name.clone(),
                stage: next.stage.clone(),
                baseline_mean_duration_ms: base.mean_duration_ms,
                candidate_mean_duration_ms: next.mean_duration_ms,
                duration_change_pct: percent_change(base.mean_duration_ms, next.mean_duration_ms),
                baseline_mean_rss_delta_bytes: base.mean_rss_delta_bytes,
                candidate_mean_rss_delta_bytes: next.mean_rss_delta_bytes,
                rss_change_pct: base
                    .mean_rss_delta_bytes
                    .zip(next.mean_rss_delta_bytes)
                    .and_then(|(before, after)| percent_change(before, after)),
            })
        })
        .collect()
}

fn percent_change(baseline: f64, candidate: f64) -> Option<f64> {
    (baseline.abs() > f64::EPSILON).then(|| (candidate - baseline) / baseline.abs() * 100.0)
}

/// Regression limits in percent; `None` disables a check.
#[derive(Debug, Clone, Copy, Default)]
pub struct Thresholds {
    pub duration_pct: Option<f64>,
    pub memory_pct: Option<f64>,
}

impl Thresholds {
    pub fn exceeded_by(&self, row: &CompareRow) -> bool {
        let over = |limit: Option<f64>, change: Option<f64>| {
            limit.zip(change).is_some_and(|(limit, change)| change > limit)
        };
        over(self.duration_pct, row.duration_change_pct)
            || over(self.memory_pct, row.rss_change_pct)
    }
}

fn megabytes(bytes: Option<f64>) -> String {
    bytes.map_or_else(|| "-".to_string(), |b| format!("{:.3}", b / (1024.0 * 1024.0)))
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |pct| format!("{pct:.2}"))
}

impl Tabular for BenchRecord {
    fn header() -> String {
        format!(
            "{:<8} {:<14} {:<10} {:>4} {:>12} {:>12}",
            "scenario", "case", "stage", "rep", "ms", "rss_mb"
        )
    }

    fn line(&self) -> String {
        format!(
            "{:<8} {:<14} {:<10} {:>4} {:>12.3} {:>12}",
            self.scenario,
            self.case_name,
            self.stage,
            self.repetition,
            self.duration_ms,
            megabytes(self.rss_delta_bytes.map(|b| b as f64)),
        )
    }
}

impl Tabular for SummaryRow {
    fn header() -> String {
        format!(
            "{:<8} {:<14} {:<10} {:>7} {:>12} {:>12} {:>14} {:>14}",
            "scenario", "case", "stage", "samples", "mean_ms", "max_ms", "mean_rss_mb", "max_rss_mb"
        )
    }

    fn line(&self) -> String {
        format!(
            "{:<8} {:<14} {:<10} {:>7} {:>12.3} {:>12.3} {:>14} {:>14}",
            self.scenario,
            self.case_name,
            self.stage,
            self.samples,
            self.mean_duration_ms,
            self.max_duration_ms,
            megabytes(self.mean_rss_delta_bytes),
            megabytes(self.max_rss_after_bytes.map(|b| b as f64)),
        )
    }
}

impl Tabular for CompareRow {
    fn header() -> String {
        format!(
            "{:<8} {:<14} {:<10} {:>12} {:>12} {:>10} {:>12} {:>12} {:>10}",
            "scenario", "case", "stage", "base_ms", "cand_ms", "dur_%", "base_rss_mb",
            "cand_rss_mb", "rss_%"
        )
    }

    fn line(&self) -> String {
        format!(
            "{:<8} {:<14} {:<10} {:>12.3} {:>12.3} {:>10} {:>12} {:>12} {:>10}",
            self.scenario,
            self.case_name,
            self.stage,
            self.baseline_mean_duration_ms,
            self.candidate_mean_duration_ms,
            percent(self.duration_change_pct),
            megabytes(self.baseline_mean_rss_delta_bytes),
            megabytes(self.candidate_mean_rss_delta_bytes),
            percent(self.rss_change_pct),
        )
    }
}
