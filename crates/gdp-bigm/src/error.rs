//! Error types for the Big-M transformation.

use gdp_core::ModelError;

/// Error type for Big-M transformation operations.
#[derive(Debug, Clone, PartialEq)]
pub enum GdpError {
    /// The option bag itself is malformed (not an object, bad target path).
    InvalidConfig(String),
    /// `bigM` was neither a number, a sequence nor a map of those.
    InvalidBigMArgument(String),
    /// A resolved Big-M sequence does not have exactly two entries.
    InvalidMValue { value: String, constraint: String },
    /// A target path does not resolve on the model.
    TargetNotFound(String),
    /// An active disjunction was found inside a disjunct being relaxed.
    UntransformedDisjunction { disjunction: String, disjunct: String },
    /// An active disjunct was found inside a disjunct being relaxed.
    ActiveNestedDisjunct { nested: String, disjunct: String },
    /// A component kind with no Big-M handler was found inside a disjunct.
    UnsupportedComponent { component: String, kind: &'static str },
    /// A target is not a block, disjunct or disjunction.
    InvalidTarget { target: String, kind: &'static str },
    NonlinearEstimate { constraint: String },
    UnboundedEstimate { constraint: String },
    Model(ModelError),
}

impl GdpError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            GdpError::InvalidConfig(_) => "GDP_INVALID_CONFIG",
            GdpError::InvalidBigMArgument(_) => "GDP_INVALID_BIGM_ARGUMENT",
            GdpError::InvalidMValue { .. } => "GDP_INVALID_M_VALUE",
            GdpError::TargetNotFound(_) => "GDP_TARGET_NOT_FOUND",
            GdpError::UntransformedDisjunction { .. } => "GDP_UNTRANSFORMED_DISJUNCTION",
            GdpError::ActiveNestedDisjunct { .. } => "GDP_ACTIVE_NESTED_DISJUNCT",
            GdpError::UnsupportedComponent { .. } => "GDP_UNSUPPORTED_COMPONENT",
            GdpError::InvalidTarget { .. } => "GDP_INVALID_TARGET",
            GdpError::NonlinearEstimate { .. } => "GDP_ESTIMATE_NONLINEAR",
            GdpError::UnboundedEstimate { .. } => "GDP_ESTIMATE_UNBOUNDED",
            GdpError::Model(err) => err.code(),
        }
    }
}

impl std::fmt::Display for GdpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GdpError::InvalidConfig(msg) => write!(f, "[{}] {}", self.code(), msg),
            GdpError::InvalidBigMArgument(msg) => write!(
                f,
                "[{}] 'bigM' argument was not a dictionary! Expected component paths as keys \
                 and big-m values (or pairs) as values: {}",
                self.code(),
                msg
            ),
            GdpError::InvalidMValue { value, constraint } => write!(
                f,
                "[{}] Big-M {} for constraint {} is not of length two. Expected either a \
                 single value or a pair of values for M",
                self.code(),
                value,
                constraint
            ),
            GdpError::TargetNotFound(target) => write!(
                f,
                "[{}] Target {} is not a component on the model",
                self.code(),
                target
            ),
            GdpError::UntransformedDisjunction {
                disjunction,
                disjunct,
            } => write!(
                f,
                "[{}] Found untransformed disjunction {} in disjunct {}. The disjunction \
                 must be transformed before the disjunct; when using targets, list the \
                 disjunction before the disjunct",
                self.code(),
                disjunction,
                disjunct
            ),
            GdpError::ActiveNestedDisjunct { nested, disjunct } => write!(
                f,
                "[{}] Found active disjunct {} in disjunct {}. Either {} is not in a \
                 disjunction or its disjunction has not been transformed; deactivate it or \
                 transform its disjunction before {}",
                self.code(),
                nested,
                disjunct,
                nested,
                disjunct
            ),
            GdpError::UnsupportedComponent { component, kind } => write!(
                f,
                "[{}] No Big-M handler for {} components (found {})",
                self.code(),
                kind,
                component
            ),
            GdpError::InvalidTarget { target, kind } => write!(
                f,
                "[{}] Target {} was not a block, disjunct or disjunction; it is a {} and \
                 can't be transformed",
                self.code(),
                target,
                kind
            ),
            GdpError::NonlinearEstimate { constraint } => write!(
                f,
                "[{}] Cannot estimate M for nonlinear expressions (constraint {})",
                self.code(),
                constraint
            ),
            GdpError::UnboundedEstimate { constraint } => write!(
                f,
                "[{}] Cannot estimate M for expressions with unbounded variables \
                 (constraint {})",
                self.code(),
                constraint
            ),
            GdpError::Model(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for GdpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GdpError::Model(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelError> for GdpError {
    fn from(err: ModelError) -> Self {
        GdpError::Model(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdp_expr::ids::BlockId;

    #[test]
    fn test_display_includes_code() {
        let err = GdpError::TargetNotFound("b.d".to_string());
        assert_eq!(
            err.to_string(),
            "[GDP_TARGET_NOT_FOUND] Target b.d is not a component on the model"
        );
    }

    #[test]
    fn test_estimate_errors_name_constraint() {
        let err = GdpError::UnboundedEstimate {
            constraint: "d.c".to_string(),
        };
        assert_eq!(err.code(), "GDP_ESTIMATE_UNBOUNDED");
        assert!(err.to_string().contains("(constraint d.c)"));
    }

    #[test]
    fn test_model_error_keeps_its_code() {
        let err: GdpError = ModelError::NotADisjunct(BlockId::new(3)).into();
        assert_eq!(err.code(), ModelError::NotADisjunct(BlockId::new(3)).code());
        assert!(std::error::Error::source(&err).is_some());
    }
}
