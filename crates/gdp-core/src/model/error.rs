//! Model error types.

use gdp_expr::ids::{BlockId, ComponentId, VariableId};

/// Errors that can occur during model operations
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Invalid variable ID
    InvalidVariableId(VariableId),
    /// Invalid component ID
    InvalidComponentId(ComponentId),
    /// Invalid block ID
    InvalidBlockId(BlockId),
    /// Invalid variable bounds
    InvalidVariableBounds { lower: f64, upper: f64 },
    /// Invalid constraint bounds
    InvalidConstraintBounds { lower: f64, upper: f64 },
    /// A component with this name already exists on the block
    DuplicateComponent { block: String, name: String },
    /// The member index already exists on the component
    DuplicateIndex { component: String, index: String },
    /// The member index does not exist on the component
    MissingIndex { component: String, index: String },
    /// The component is not of the expected kind
    WrongComponentKind {
        component: String,
        expected: &'static str,
        found: &'static str,
    },
    /// A block used as a disjunction member is not a disjunct
    NotADisjunct(BlockId),
    /// A component path could not be parsed
    InvalidPath { path: String, reason: String },
    /// Transformation info could not be serialized
    Serialization(String),
}

impl ModelError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::InvalidVariableId(_) => "VARIABLE_INVALID_ID",
            ModelError::InvalidComponentId(_) => "COMPONENT_INVALID_ID",
            ModelError::InvalidBlockId(_) => "BLOCK_INVALID_ID",
            ModelError::InvalidVariableBounds { .. } => "VARIABLE_INVALID_BOUNDS",
            ModelError::InvalidConstraintBounds { .. } => "CONSTRAINT_INVALID_BOUNDS",
            ModelError::DuplicateComponent { .. } => "COMPONENT_DUPLICATE_NAME",
            ModelError::DuplicateIndex { .. } => "COMPONENT_DUPLICATE_INDEX",
            ModelError::MissingIndex { .. } => "COMPONENT_MISSING_INDEX",
            ModelError::WrongComponentKind { .. } => "COMPONENT_WRONG_KIND",
            ModelError::NotADisjunct(_) => "DISJUNCTION_INVALID_MEMBER",
            ModelError::InvalidPath { .. } => "PATH_INVALID",
            ModelError::Serialization(_) => "INFO_SERIALIZATION",
        }
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::InvalidVariableId(id) => write!(
                f,
                "[{}] Variable ID {} does not exist",
                self.code(),
                id.inner()
            ),
            ModelError::InvalidComponentId(id) => write!(
                f,
                "[{}] Component ID {} does not exist",
                self.code(),
                id.inner()
            ),
            ModelError::InvalidBlockId(id) => write!(
                f,
                "[{}] Block ID {} does not exist",
                self.code(),
                id.inner()
            ),
            ModelError::InvalidVariableBounds { lower, upper } => write!(
                f,
                "[{}] Variable bounds invalid: lower ({}) > upper ({})",
                self.code(),
                lower,
                upper
            ),
            ModelError::InvalidConstraintBounds { lower, upper } => write!(
                f,
                "[{}] Constraint bounds invalid: lower ({}) > upper ({})",
                self.code(),
                lower,
                upper
            ),
            ModelError::DuplicateComponent { block, name } => write!(
                f,
                "[{}] Block '{}' already has a component named '{}'",
                self.code(),
                block,
                name
            ),
            ModelError::DuplicateIndex { component, index } => write!(
                f,
                "[{}] Component '{}' already has a member at index {}",
                self.code(),
                component,
                index
            ),
            ModelError::MissingIndex { component, index } => write!(
                f,
                "[{}] Component '{}' has no member at index {}",
                self.code(),
                component,
                index
            ),
            ModelError::WrongComponentKind {
                component,
                expected,
                found,
            } => write!(
                f,
                "[{}] Component '{}' is a {}, expected a {}",
                self.code(),
                component,
                found,
                expected
            ),
            ModelError::NotADisjunct(id) => write!(
                f,
                "[{}] Block ID {} is not a disjunct",
                self.code(),
                id.inner()
            ),
            ModelError::InvalidPath { path, reason } => {
                write!(f, "[{}] Invalid path '{}': {}", self.code(), path, reason)
            }
            ModelError::Serialization(reason) => write!(
                f,
                "[{}] Failed to serialize transformation info: {}",
                self.code(),
                reason
            ),
        }
    }
}

impl std::error::Error for ModelError {}
