//! User-facing error banners.

use crate::backend::domain::{ResetError, ValidationError};
use crate::backend::storage::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    /// A feed was refused by the store's access rules
    Permission,
    /// An action failed
    Error,
}

/// A dismissible message shown above the dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
}

impl Banner {
    /// Banner for a feed the store refused, e.g. `Permission Error: members`
    pub fn permission(feed: &str) -> Self {
        Self {
            kind: BannerKind::Permission,
            message: format!("Permission Error: {}", feed),
        }
    }

    pub fn from_error(error: &anyhow::Error) -> Self {
        Self {
            kind: BannerKind::Error,
            message: describe_error(error),
        }
    }
}

/// Plain-language sentence for any error an action can return
pub fn describe_error(error: &anyhow::Error) -> String {
    if let Some(store_error) = error.downcast_ref::<StoreError>() {
        return match store_error {
            StoreError::PermissionDenied { path } => {
                format!("You do not have permission to change {}.", path)
            }
            StoreError::NotFound { .. } => "That record no longer exists.".to_string(),
            StoreError::Unavailable { .. } => {
                "The data store is unavailable right now. Please try again.".to_string()
            }
        };
    }
    if let Some(validation_error) = error.downcast_ref::<ValidationError>() {
        return format!("{}.", validation_error);
    }
    if let Some(reset_error) = error.downcast_ref::<ResetError>() {
        return format!("{}. Run the reset again to finish.", reset_error);
    }
    format!("Something went wrong: {}", error)
}
