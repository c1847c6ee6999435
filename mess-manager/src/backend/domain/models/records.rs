use serde_json::json;
use shared::BazarType;
use std::collections::BTreeMap;

use crate::backend::domain::coerce::{safe_num, safe_str};
use crate::backend::storage::{Document, Fields};

/// Stored bazar type; anything other than cash/credit is kept but not counted
#[derive(Debug, Clone, PartialEq)]
pub enum BazarKind {
    Cash,
    Credit,
    Unrecognized(String),
}

impl BazarKind {
    /// A missing or empty type means cash
    pub fn parse(raw: &str) -> Self {
        match raw {
            "" | "cash" => BazarKind::Cash,
            "credit" => BazarKind::Credit,
            other => BazarKind::Unrecognized(other.to_string()),
        }
    }

    pub fn as_bazar_type(&self) -> Option<BazarType> {
        match self {
            BazarKind::Cash => Some(BazarType::Cash),
            BazarKind::Credit => Some(BazarType::Credit),
            BazarKind::Unrecognized(_) => None,
        }
    }
}

/// A grocery purchase
#[derive(Debug, Clone, PartialEq)]
pub struct BazarEntry {
    pub id: String,
    pub item: String,
    pub amount: f64,
    pub member_id: String,
    pub date: String,
    pub kind: BazarKind,
}

impl BazarEntry {
    pub fn from_document(document: &Document) -> Self {
        Self {
            id: document.id.clone(),
            item: safe_str(document.get("item")),
            amount: safe_num(document.get("amount")),
            member_id: safe_str(document.get("member_id")),
            date: safe_str(document.get("date")),
            kind: BazarKind::parse(&safe_str(document.get("type"))),
        }
    }

    /// Only cash purchases leave the shared fund
    pub fn is_cash(&self) -> bool {
        self.kind == BazarKind::Cash
    }

    pub fn new_fields(item: &str, amount: f64, member_id: &str, date: &str, bazar_type: BazarType) -> Fields {
        let mut fields = Fields::new();
        fields.insert("item".to_string(), json!(item));
        fields.insert("amount".to_string(), json!(amount));
        fields.insert("member_id".to_string(), json!(member_id));
        fields.insert("date".to_string(), json!(date));
        fields.insert("type".to_string(), json!(bazar_type.as_str()));
        fields
    }
}

/// Cash paid into the shared fund by a member
#[derive(Debug, Clone, PartialEq)]
pub struct Deposit {
    pub id: String,
    pub member_id: String,
    pub amount: f64,
    pub date: String,
}

impl Deposit {
    pub fn from_document(document: &Document) -> Self {
        Self {
            id: document.id.clone(),
            member_id: safe_str(document.get("member_id")),
            amount: safe_num(document.get("amount")),
            date: safe_str(document.get("date")),
        }
    }

    pub fn new_fields(member_id: &str, amount: f64, date: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert("member_id".to_string(), json!(member_id));
        fields.insert("amount".to_string(), json!(amount));
        fields.insert("date".to_string(), json!(date));
        fields
    }
}

/// A disciplinary fine, always worth two fine-meals
#[derive(Debug, Clone, PartialEq)]
pub struct Fine {
    pub id: String,
    pub member_id: String,
    pub reason: String,
    pub date: String,
}

impl Fine {
    pub fn from_document(document: &Document) -> Self {
        Self {
            id: document.id.clone(),
            member_id: safe_str(document.get("member_id")),
            reason: safe_str(document.get("reason")),
            date: safe_str(document.get("date")),
        }
    }

    pub fn new_fields(member_id: &str, reason: &str, date: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert("member_id".to_string(), json!(member_id));
        fields.insert("reason".to_string(), json!(reason));
        fields.insert("date".to_string(), json!(date));
        fields
    }
}

/// Meal counts of one date, keyed by member id; absent members ate 0 meals
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MealDay {
    pub date: String,
    pub counts: BTreeMap<String, f64>,
}

impl MealDay {
    pub fn from_document(document: &Document) -> Self {
        let counts = document
            .fields
            .iter()
            .map(|(member_id, value)| (member_id.clone(), safe_num(Some(value))))
            .collect();
        Self {
            date: document.id.clone(),
            counts,
        }
    }

    pub fn count_for(&self, member_id: &str) -> f64 {
        self.counts.get(member_id).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.counts.values().sum()
    }
}
