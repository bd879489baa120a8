use thiserror::Error;

/// Result type alias using HTreeError
pub type Result<T> = std::result::Result<T, HTreeError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// A stable classification of every error the tree kernel can raise. Each
/// kind maps to a stable error code usable for programmatic handling and
/// for assertions in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    InvalidKind,
    NotFound,
    AlreadyExists,
    RangeError,
    ConstraintViolation,
    CycleDetected,

    /// A declared operation that has no implemented policy yet
    NotImplemented,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidKind => "ERR_INVALID_KIND",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::RangeError => "ERR_RANGE",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::CycleDetected => "ERR_CYCLE_DETECTED",
            ExErrorKind::NotImplemented => "ERR_NOT_IMPLEMENTED",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling plus the tree
/// coordinates (node key, link field, index) the failure refers to.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    node_key: Option<String>,
    field: Option<String>,
    index: Option<i64>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            node_key: None,
            field: None,
            index: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add encoded node key context
    pub fn with_node_key(mut self, key: impl Into<String>) -> Self {
        self.node_key = Some(key.into());
        self
    }

    /// Add link field context
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Add index context
    pub fn with_index(mut self, index: i64) -> Self {
        self.index = Some(index);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the node key context, if any
    pub fn node_key(&self) -> Option<&str> {
        self.node_key.as_deref()
    }

    /// Get the link field context, if any
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Get the index context, if any
    pub fn index(&self) -> Option<i64> {
        self.index
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(node_key) = &self.node_key {
            write!(f, " (node: {})", node_key)?;
        }
        if let Some(field) = &self.field {
            write!(f, " (field: {})", field)?;
        }
        if let Some(index) = self.index {
            write!(f, " (index: {})", index)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for tree operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HTreeError {
    // ===== Schema Errors =====
    /// Node kind is not registered in the schema
    #[error("Unknown node kind: {kind}")]
    UnknownNodeKind { kind: String },

    /// Node kind tag cannot be used as an encoding prefix
    #[error("Invalid node kind '{kind}': {reason}")]
    InvalidNodeKind { kind: String, reason: String },

    /// Template node declares a data field the caller tried to set but the kind lacks
    #[error("Node kind {kind} has no data field '{field}'")]
    UnknownDataField { kind: String, field: String },

    // ===== Lookup Errors =====
    /// Parent node was not found
    #[error("No parent found: {parent_key}")]
    ParentNotFound { parent_key: String },

    /// Node was not found
    #[error("Node not found: {node_key}")]
    NodeNotFound { node_key: String },

    /// Requested link field is not present on the node's children
    #[error("Requested link field '{field}' not present on node {node_key}")]
    LinkFieldNotFound { node_key: String, field: String },

    /// Node to move is not referenced by the link field
    #[error("Requested node to move not found: {node_key}")]
    NodeNotInLinkField { node_key: String },

    // ===== Mutation Errors =====
    /// Index is outside the valid insertion range of an array link
    #[error("Index {index} out of range for array of length {len}")]
    IndexOutOfRange { index: isize, len: usize },

    /// Action has no meaning for the link shape
    #[error("Action {action} is not supported on a {shape} link")]
    UnsupportedLinkAction {
        action: &'static str,
        shape: &'static str,
    },

    /// Change kind is declared but has no implemented policy
    #[error("Change {change} is not supported")]
    UnsupportedChange { change: &'static str },

    /// Explicit id collides with a node that is not the addressed child
    #[error("Node already exists: {node_key}")]
    NodeAlreadyExists { node_key: String },

    /// Explicit id collides with the unset single-link marker
    #[error("Id of {node_key} is reserved for unset single links")]
    ReservedId { node_key: String },

    // ===== Invariant Errors =====
    /// Root node carries a parent back-reference
    #[error("Root node {node_key} has a parent")]
    RootHasParent { node_key: String },

    /// Storage key does not match the node's own identity encoding
    #[error("Storage key {key} does not match node identity {node_key}")]
    KeyMismatch { key: String, node_key: String },

    /// Child link references a node absent from the tree
    #[error("Node {node_key} field '{field}' references missing node {child_key}")]
    DanglingChildReference {
        node_key: String,
        field: String,
        child_key: String,
    },

    /// Parent back-reference and children link disagree
    #[error("Invalid parent back-reference on {node_key}: {reason}")]
    InvalidParentRef { node_key: String, reason: String },

    /// Children links form a cycle
    #[error("Cycle detected at node {node_key}")]
    CycleDetected { node_key: String },

    // ===== Generic Errors =====
    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Conversion from HTreeError to ExError
impl From<HTreeError> for ExError {
    fn from(err: HTreeError) -> Self {
        match err {
            HTreeError::UnknownNodeKind { kind } => ExError::new(ExErrorKind::InvalidKind)
                .with_message(format!("Unknown node kind {}", kind)),

            HTreeError::InvalidNodeKind { kind, reason } => ExError::new(ExErrorKind::InvalidKind)
                .with_message(format!("Invalid node kind {}: {}", kind, reason)),

            HTreeError::UnknownDataField { kind, field } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_field(field)
                    .with_message(format!("Kind {} has no such data field", kind))
            }

            HTreeError::ParentNotFound { parent_key } => ExError::new(ExErrorKind::NotFound)
                .with_node_key(parent_key)
                .with_op("find_parent")
                .with_message("No parent found"),

            HTreeError::NodeNotFound { node_key } => ExError::new(ExErrorKind::NotFound)
                .with_node_key(node_key)
                .with_message("Node not found"),

            HTreeError::LinkFieldNotFound { node_key, field } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_node_key(node_key)
                    .with_field(field)
                    .with_message("Requested link field not present")
            }

            HTreeError::NodeNotInLinkField { node_key } => ExError::new(ExErrorKind::NotFound)
                .with_node_key(node_key)
                .with_message("Requested node not referenced by link field"),

            HTreeError::IndexOutOfRange { index, len } => ExError::new(ExErrorKind::RangeError)
                .with_index(index as i64)
                .with_message(format!("Index out of range for length {}", len)),

            HTreeError::UnsupportedLinkAction { action, shape } => {
                ExError::new(ExErrorKind::NotImplemented)
                    .with_message(format!("{} on {} link", action, shape))
            }

            HTreeError::UnsupportedChange { change } => ExError::new(ExErrorKind::NotImplemented)
                .with_op("apply_changes")
                .with_message(format!("Change {} is not supported", change)),

            HTreeError::NodeAlreadyExists { node_key } => {
                ExError::new(ExErrorKind::AlreadyExists)
                    .with_node_key(node_key)
                    .with_message("Node already exists")
            }

            HTreeError::ReservedId { node_key } => ExError::new(ExErrorKind::InvalidInput)
                .with_op("add_node")
                .with_node_key(node_key)
                .with_message("Id is reserved"),

            HTreeError::RootHasParent { node_key } => {
                ExError::new(ExErrorKind::ConstraintViolation)
                    .with_node_key(node_key)
                    .with_message("Root node has a parent")
            }

            HTreeError::KeyMismatch { key, node_key } => {
                ExError::new(ExErrorKind::ConstraintViolation)
                    .with_node_key(node_key)
                    .with_message(format!("Stored under key {}", key))
            }

            HTreeError::DanglingChildReference {
                node_key,
                field,
                child_key,
            } => ExError::new(ExErrorKind::ConstraintViolation)
                .with_node_key(node_key)
                .with_field(field)
                .with_message(format!("References missing node {}", child_key)),

            HTreeError::InvalidParentRef { node_key, reason } => {
                ExError::new(ExErrorKind::ConstraintViolation)
                    .with_node_key(node_key)
                    .with_message(format!("Invalid parent back-reference: {}", reason))
            }

            HTreeError::CycleDetected { node_key } => ExError::new(ExErrorKind::CycleDetected)
                .with_node_key(node_key)
                .with_message("Cycle detected"),

            HTreeError::Internal { message } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes() {
        let cases = [
            (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
            (ExErrorKind::RangeError, "ERR_RANGE"),
            (ExErrorKind::InvalidKind, "ERR_INVALID_KIND"),
            (ExErrorKind::NotImplemented, "ERR_NOT_IMPLEMENTED"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_index_out_of_range_carries_index() {
        let err: ExError = HTreeError::IndexOutOfRange { index: -1, len: 3 }.into();
        assert_eq!(err.kind(), ExErrorKind::RangeError);
        assert_eq!(err.index(), Some(-1));
    }

    #[test]
    fn test_display_includes_code_and_context() {
        let err = ExError::new(ExErrorKind::NotFound)
            .with_op("add_node")
            .with_node_key("Root.r1")
            .with_message("No parent found");
        let rendered = err.to_string();
        assert!(rendered.starts_with("[ERR_NOT_FOUND]"));
        assert!(rendered.contains("add_node"));
        assert!(rendered.contains("Root.r1"));
    }
}
