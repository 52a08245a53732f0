//! JSONL benchmark artifacts.

use serde::{Deserialize, Serialize};
use std::fs::{File, create_dir_all};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

pub const SCHEMA_VERSION: u32 = 1;

/// One timed stage of one repetition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchRecord {
    pub schema_version: u32,
    pub run_id: String,
    pub scenario: String,
    pub case_name: String,
    pub repetition: u32,
    pub variables: usize,
    pub components: usize,
    pub relaxed_disjuncts: usize,
    pub stage: String,
    pub duration_ms: f64,
    pub rss_before_bytes: Option<u64>,
    pub rss_after_bytes: Option<u64>,
    pub rss_delta_bytes: Option<i64>,
}

pub fn write_records(
    path: &Path,
    records: &[BenchRecord],
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Read every non-blank line of `path` as a record.
pub fn load_records(path: &Path) -> Result<Vec<BenchRecord>, Box<dyn std::error::Error>> {
    let mut records = Vec::new();
    for line in BufReader::new(File::open(path)?).lines() {
        let line = line?;
        if !line.trim().is_empty() {
            records.push(serde_json::from_str(&line)?);
        }
    }
    Ok(records)
}
