use thiserror::Error;

/// Failures reported by a document store
///
/// Stores return `anyhow::Result`; callers that need to branch on the kind
/// of failure recover it with `downcast_ref::<StoreError>()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store's own access rules refused the operation
    #[error("permission denied on {path}")]
    PermissionDenied { path: String },
    /// Update of a document that does not exist
    #[error("document not found: {path}")]
    NotFound { path: String },
    /// Transport or backend failure
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },
}

impl StoreError {
    pub fn permission_denied(path: impl Into<String>) -> Self {
        StoreError::PermissionDenied { path: path.into() }
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        StoreError::NotFound { path: path.into() }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        StoreError::Unavailable { reason: reason.into() }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, StoreError::PermissionDenied { .. })
    }
}
