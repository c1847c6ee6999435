use serde_json::json;

use crate::backend::domain::coerce::safe_str;
use crate::backend::storage::{Document, Fields};

/// PIN used until a manager sets one
pub const DEFAULT_MANAGER_PIN: &str = "1234";

/// Shared manager PIN, stored and compared as plain text
#[derive(Debug, Clone, PartialEq)]
pub struct ManagerConfig {
    pub pin: String,
}

impl ManagerConfig {
    /// An absent document or an empty PIN falls back to `default_pin`
    pub fn from_document(document: Option<&Document>, default_pin: &str) -> Self {
        let pin = document
            .map(|d| safe_str(d.get("pin")))
            .filter(|pin| !pin.is_empty())
            .unwrap_or_else(|| default_pin.to_string());
        Self { pin }
    }

    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("pin".to_string(), json!(self.pin));
        fields
    }
}

/// Announcement shown on the dashboard
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NoticeConfig {
    pub text: String,
}

impl NoticeConfig {
    pub fn from_document(document: Option<&Document>) -> Self {
        Self {
            text: document.map(|d| safe_str(d.get("text"))).unwrap_or_default(),
        }
    }

    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("text".to_string(), json!(self.text));
        fields
    }
}
