//! Resident memory probes around transformation stages.

use std::time::Instant;

use sysinfo::System;

/// Resident memory of this process at one stage.
#[derive(Debug, Clone)]
pub struct MemorySnapshot {
    /// Resident set size in bytes
    pub rss_bytes: u64,
    pub timestamp: Instant,
    /// Stage label, e.g. "build" or "transform"
    pub stage: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    ProcessNotFound { pid: u32 },
}

impl MemoryError {
    pub fn code(&self) -> &'static str {
        match self {
            MemoryError::ProcessNotFound { .. } => "MEMORY_PROCESS_NOT_FOUND",
        }
    }
}

impl std::fmt::Display for MemoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemoryError::ProcessNotFound { pid } => {
                write!(f, "[{}] Failed to locate process {}", self.code(), pid)
            }
        }
    }
}

impl std::error::Error for MemoryError {}

impl MemorySnapshot {
    /// Capture the current RSS, refreshing only this process.
    pub fn capture(stage: &str) -> Result<Self, MemoryError> {
        let raw_pid = std::process::id();
        let pid = sysinfo::Pid::from(raw_pid as usize);

        let mut sys = System::new();
        sys.refresh_processes_specifics(
            sysinfo::ProcessesToUpdate::Some(&[pid]),
            true,
            sysinfo::ProcessRefreshKind::nothing().with_memory(),
        );
        let process = sys
            .process(pid)
            .ok_or(MemoryError::ProcessNotFound { pid: raw_pid })?;

        Ok(MemorySnapshot {
            rss_bytes: process.memory(),
            timestamp: Instant::now(),
            stage: stage.to_string(),
        })
    }

    /// RSS growth from `earlier` to `self`, in bytes.
    pub fn diff(&self, earlier: &Self) -> i64 {
        self.rss_bytes as i64 - earlier.rss_bytes as i64
    }
}

/// Ordered snapshots of one run.
#[derive(Debug, Default)]
pub struct MemoryProbe {
    snapshots: Vec<MemorySnapshot>,
}

impl MemoryProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stage: &str) -> Result<&MemorySnapshot, MemoryError> {
        self.snapshots.push(MemorySnapshot::capture(stage)?);
        Ok(&self.snapshots[self.snapshots.len() - 1])
    }

    pub fn snapshots(&self) -> &[MemorySnapshot] {
        &self.snapshots
    }

    /// Growth between the last two snapshots.
    pub fn last_diff(&self) -> Option<i64> {
        match self.snapshots.as_slice() {
            [.., prev, last] => Some(last.diff(prev)),
            _ => None,
        }
    }

    /// Largest RSS seen so far.
    pub fn peak_rss(&self) -> Option<u64> {
        self.snapshots.iter().map(|s| s.rss_bytes).max()
    }
}
