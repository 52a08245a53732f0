//! Big-M relaxation of generalized disjunctive programs.
//!
//! [`BigM::apply`] rewrites every targeted disjunction of a
//! [`gdp_core::Model`] into mixed-integer constraints. Big-M coefficients
//! come from [`BigMArgs`], `BigM` suffixes on enclosing blocks, or are
//! estimated from variable bounds.

pub mod config;
mod disjunction;
mod driver;
pub mod error;
mod estimate;
mod relax;
mod resolve;

pub use config::{BigMArgs, GLOBAL_KEY, TransformConfig};
pub use disjunction::SELECTION_PREFIX;
pub use driver::{AREA_NAME, BigM, LBUB_NAME, RELAXED_DISJUNCTS_NAME};
pub use error::GdpError;
pub use estimate::estimate_m;
pub use relax::{LOWER_TAG, UPPER_TAG};
pub use resolve::{BIGM_SUFFIX_NAME, MPair, expand};

use gdp_core::Model;

/// Relax every active disjunction of `model` with default options.
pub fn apply(model: &mut Model) -> Result<(), GdpError> {
    BigM::apply(model, &TransformConfig::default())
}
