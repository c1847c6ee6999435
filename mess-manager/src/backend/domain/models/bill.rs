use serde_json::json;
use shared::BillKind;

use crate::backend::domain::coerce::{safe_bool, safe_num, safe_str};
use crate::backend::storage::{Document, Fields};

/// Mess-wide fixed monthly costs, split evenly across members
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FixedBills {
    pub wifi: f64,
    pub current: f64,
    pub rent: f64,
}

impl FixedBills {
    /// Absent settings document means no fixed bills
    pub fn from_document(document: Option<&Document>) -> Self {
        match document {
            Some(document) => Self {
                wifi: safe_num(document.get("wifi")),
                current: safe_num(document.get("current")),
                rent: safe_num(document.get("rent")),
            },
            None => Self::default(),
        }
    }

    pub fn total(&self) -> f64 {
        self.wifi + self.current + self.rent
    }

    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("wifi".to_string(), json!(self.wifi));
        fields.insert("current".to_string(), json!(self.current));
        fields.insert("rent".to_string(), json!(self.rent));
        fields
    }
}

/// Which fixed bills a member paid in a month
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BillTrackingRecord {
    pub member_id: String,
    /// YYYY-MM
    pub month: String,
    pub wifi: bool,
    pub current: bool,
    pub rent: bool,
}

impl BillTrackingRecord {
    /// Document id of a member's record for a month
    pub fn key(member_id: &str, month: &str) -> String {
        format!("{}_{}", member_id, month)
    }

    pub fn from_document(document: &Document) -> Self {
        Self {
            member_id: safe_str(document.get("member_id")),
            month: safe_str(document.get("month")),
            wifi: safe_bool(document.get("wifi")),
            current: safe_bool(document.get("current")),
            rent: safe_bool(document.get("rent")),
        }
    }

    pub fn is_paid(&self, bill: BillKind) -> bool {
        match bill {
            BillKind::Wifi => self.wifi,
            BillKind::Current => self.current,
            BillKind::Rent => self.rent,
        }
    }

    /// Fields written when one flag is toggled; merged into the stored record
    pub fn toggle_fields(&self, member_id: &str, month: &str, bill: BillKind) -> Fields {
        let mut fields = Fields::new();
        fields.insert(bill.field_name().to_string(), json!(!self.is_paid(bill)));
        fields.insert("member_id".to_string(), json!(member_id));
        fields.insert("month".to_string(), json!(month));
        fields
    }
}
