//! Transformation configuration.
//!
//! [`TransformConfig`] is built either with the `with_*` builder methods or
//! from a loosely typed JSON option bag with [`TransformConfig::from_json`].

use std::collections::BTreeMap;

use gdp_core::{ComponentUid, SuffixValue};
use serde_json::Value;

use crate::error::GdpError;

/// Key of the global entry when `bigM` is given as a JSON object.
pub const GLOBAL_KEY: &str = "";

/// User supplied Big-M values keyed by component path.
///
/// The `None` key holds the global default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BigMArgs {
    entries: BTreeMap<Option<ComponentUid>, SuffixValue>,
}

impl BigMArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single value applied to every constraint.
    pub fn global(value: impl Into<SuffixValue>) -> Self {
        Self::new().with_default(value)
    }

    pub fn with_default(mut self, value: impl Into<SuffixValue>) -> Self {
        self.entries.insert(None, value.into());
        self
    }

    /// Value for a constraint component or one of its members.
    pub fn with(mut self, target: ComponentUid, value: impl Into<SuffixValue>) -> Self {
        self.entries.insert(Some(target), value.into());
        self
    }

    pub fn get(&self, key: Option<&ComponentUid>) -> Option<&SuffixValue> {
        self.entries.get(&key.cloned())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn from_json(value: &Value) -> Result<Option<Self>, GdpError> {
        match value {
            Value::Null => Ok(None),
            Value::Number(_) | Value::Array(_) => Ok(Some(Self::global(m_value(value)?))),
            Value::Object(map) => {
                let mut args = Self::new();
                for (key, entry) in map {
                    let entry = m_value(entry)?;
                    args = if key == GLOBAL_KEY {
                        args.with_default(entry)
                    } else {
                        args.with(key.parse()?, entry)
                    };
                }
                Ok(Some(args))
            }
            other => Err(GdpError::InvalidBigMArgument(other.to_string())),
        }
    }
}

fn m_value(value: &Value) -> Result<SuffixValue, GdpError> {
    match value {
        Value::Number(number) => number
            .as_f64()
            .map(SuffixValue::Scalar)
            .ok_or_else(|| GdpError::InvalidBigMArgument(value.to_string())),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => Ok(None),
                Value::Number(number) => Ok(number.as_f64()),
                _ => Err(GdpError::InvalidBigMArgument(value.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(SuffixValue::Sequence),
        _ => Err(GdpError::InvalidBigMArgument(value.to_string())),
    }
}

/// Options of one Big-M transformation call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformConfig {
    /// Components to transform. `None` means the whole model.
    pub targets: Option<Vec<ComponentUid>>,
    /// Explicit Big-M values; `None` relies on suffixes and estimation.
    pub big_m: Option<BigMArgs>,
}

impl TransformConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_targets<I>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = ComponentUid>,
    {
        self.targets = Some(targets.into_iter().collect());
        self
    }

    pub fn with_target(mut self, target: ComponentUid) -> Self {
        self.targets.get_or_insert_with(Vec::new).push(target);
        self
    }

    pub fn with_big_m(mut self, big_m: BigMArgs) -> Self {
        self.big_m = Some(big_m);
        self
    }

    /// Parse a keyword option bag such as
    /// `{"targets": ["b.dj"], "bigM": {"": 100, "b.d1.c": [-5, 5]}}`.
    ///
    /// Unrecognized keys and every entry of a nested `options` object are
    /// logged and ignored.
    pub fn from_json(options: &Value) -> Result<Self, GdpError> {
        let Value::Object(map) = options else {
            return Err(GdpError::InvalidConfig(format!(
                "expected an object of keyword options, got {options}"
            )));
        };

        let mut config = Self::new();
        for (key, value) in map {
            match key.as_str() {
                "bigM" => config.big_m = BigMArgs::from_json(value)?,
                "targets" => config.targets = parse_targets(value)?,
                "options" => warn_unrecognized_options(value),
                _ => {
                    tracing::warn!(
                        component = "gdp.bigm",
                        operation = "configure",
                        status = "ignored",
                        key = key.as_str(),
                        "Unrecognized keyword argument"
                    );
                }
            }
        }
        Ok(config)
    }
}

fn parse_targets(value: &Value) -> Result<Option<Vec<ComponentUid>>, GdpError> {
    match value {
        Value::Null => Ok(None),
        Value::String(path) => Ok(Some(vec![path.parse::<ComponentUid>()?])),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(path) => Ok(path.parse::<ComponentUid>()?),
                other => Err(GdpError::InvalidConfig(format!(
                    "target {other} is not a component path"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        other => Err(GdpError::InvalidConfig(format!(
            "'targets' must be a path or a list of paths, got {other}"
        ))),
    }
}

fn warn_unrecognized_options(value: &Value) {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for key in map.keys() {
                tracing::warn!(
                    component = "gdp.bigm",
                    operation = "configure",
                    status = "ignored",
                    option = key.as_str(),
                    "Unrecognized option"
                );
            }
        }
        other => {
            tracing::warn!(
                component = "gdp.bigm",
                operation = "configure",
                status = "ignored",
                options = %other,
                "Unrecognized options"
            );
        }
    }
}
