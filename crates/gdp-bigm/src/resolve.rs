//! Big-M coefficient resolution.
//!
//! Sources in precedence order: explicit arguments (constraint member,
//! constraint component, global), `BigM` suffixes walking up from the
//! constraint's block (member then component at each level), the first
//! default suffix entry, and finally bound-based estimation per missing side.

use gdp_core::{ConstraintData, Index, Model, SuffixKey, SuffixValue};
use gdp_expr::ids::ComponentId;

use crate::config::BigMArgs;
use crate::error::GdpError;
use crate::estimate::estimate_m;

/// Name of the suffix holding Big-M values.
pub const BIGM_SUFFIX_NAME: &str = "BigM";

/// Lower and upper side coefficients; `None` means unset.
pub type MPair = (Option<f64>, Option<f64>);

fn from_args<'a>(
    model: &Model,
    args: Option<&'a BigMArgs>,
    constraint: ComponentId,
    index: &Index,
) -> Option<&'a SuffixValue> {
    let args = args?;
    args.get(Some(&model.member_uid(constraint, index)))
        .or_else(|| args.get(Some(&model.component_uid(constraint))))
        .or_else(|| args.get(None))
}

fn from_suffixes<'a>(
    model: &'a Model,
    constraint: ComponentId,
    index: &Index,
) -> Result<Option<&'a SuffixValue>, GdpError> {
    let owner = model.component(constraint)?.parent();
    let suffixes: Vec<_> = model
        .ancestors(owner)
        .filter_map(|block| model.find_suffix(block, BIGM_SUFFIX_NAME))
        .collect();

    let data_key = SuffixKey::Data(constraint, index.clone());
    let component_key = SuffixKey::Component(constraint);
    let specific = suffixes
        .iter()
        .find_map(|suffix| suffix.get(&data_key).or_else(|| suffix.get(&component_key)));
    if specific.is_some() {
        return Ok(specific);
    }
    Ok(suffixes
        .iter()
        .find_map(|suffix| suffix.get(&SuffixKey::Default)))
}

/// Expand a resolved value into a pair: `v` becomes `(-v, v)`.
pub fn expand(value: &SuffixValue, constraint: &str) -> Result<MPair, GdpError> {
    match value {
        SuffixValue::Scalar(m) => Ok((Some(-m), Some(*m))),
        SuffixValue::Sequence(values) => match values.as_slice() {
            [lower, upper] => Ok((*lower, *upper)),
            _ => Err(GdpError::InvalidMValue {
                value: value.to_string(),
                constraint: constraint.to_string(),
            }),
        },
    }
}

/// Coefficients for one constraint member.
///
/// Every side the constraint has comes back set; sides it lacks keep
/// whatever the sources supplied.
pub(crate) fn resolve_m(
    model: &Model,
    args: Option<&BigMArgs>,
    constraint: ComponentId,
    index: &Index,
    data: &ConstraintData,
    name: &str,
) -> Result<MPair, GdpError> {
    let mut value = from_args(model, args, constraint, index);
    tracing::debug!(
        component = "gdp.bigm",
        operation = "resolve_m",
        stage = "arguments",
        constraint = name,
        value = ?value,
        "Big-M after checking arguments"
    );

    if value.is_none() {
        value = from_suffixes(model, constraint, index)?;
        tracing::debug!(
            component = "gdp.bigm",
            operation = "resolve_m",
            stage = "suffixes",
            constraint = name,
            value = ?value,
            "Big-M after checking suffixes"
        );
    }

    let (mut m_lo, mut m_hi) = match value {
        Some(value) => expand(value, name)?,
        None => (None, None),
    };

    let lower = data.bounds.lower_bound();
    let upper = data.bounds.upper_bound();
    let needs_lo = lower.is_some() && m_lo.is_none();
    let needs_hi = upper.is_some() && m_hi.is_none();
    if needs_lo || needs_hi {
        let (est_lo, est_hi) = estimate_m(model, &data.body, name)?;
        if let (true, Some(lower)) = (needs_lo, lower) {
            m_lo = Some(est_lo - lower);
        }
        if let (true, Some(upper)) = (needs_hi, upper) {
            m_hi = Some(est_hi - upper);
        }
    }

    tracing::debug!(
        component = "gdp.bigm",
        operation = "resolve_m",
        stage = "estimation",
        status = "success",
        constraint = name,
        m_lo = ?m_lo,
        m_hi = ?m_hi,
        estimated = needs_lo || needs_hi,
        "Big-M after estimating"
    );
    Ok((m_lo, m_hi))
}
