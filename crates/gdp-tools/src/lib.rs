//! Development tools for GDP transformations.
//!
//! - [`logging`]: installs a `tracing` subscriber driven by `GDP_*` env vars
//! - [`memory`]: resident memory probes around transformation stages

pub mod logging;
pub mod memory;

pub use logging::{LogFormat, LoggingError, enable_logging};
pub use memory::{MemoryError, MemoryProbe, MemorySnapshot};
