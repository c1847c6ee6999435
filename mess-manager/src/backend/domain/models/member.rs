use serde_json::json;

use crate::backend::domain::coerce::{safe_bool, safe_str};
use crate::backend::storage::{Document, Fields};

/// Display name for records whose member no longer exists
pub const UNKNOWN_MEMBER_NAME: &str = "Unknown";

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub id: String,
    pub name: String,
    /// Display tag marking the member who currently runs the mess
    pub is_manager_tag: bool,
    /// RFC 3339 timestamp
    pub created_at: String,
}

impl Member {
    pub fn from_document(document: &Document) -> Self {
        Self {
            id: document.id.clone(),
            name: safe_str(document.get("name")),
            is_manager_tag: safe_bool(document.get("is_manager_tag")),
            created_at: safe_str(document.get("created_at")),
        }
    }

    /// Fields for a newly created member
    pub fn new_fields(name: &str, created_at: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert("name".to_string(), json!(name));
        fields.insert("is_manager_tag".to_string(), json!(false));
        fields.insert("created_at".to_string(), json!(created_at));
        fields
    }
}

/// Result of resolving a member id
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MemberLookup<'a> {
    Found(&'a Member),
    /// The id refers to a deleted (or never existing) member
    NotFound,
}

impl<'a> MemberLookup<'a> {
    pub fn display_name(&self) -> &'a str {
        match self {
            MemberLookup::Found(member) => member.name.as_str(),
            MemberLookup::NotFound => UNKNOWN_MEMBER_NAME,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, MemberLookup::Found(_))
    }
}

/// Resolves member ids found on historical records
pub struct MemberDirectory<'a> {
    members: &'a [Member],
}

impl<'a> MemberDirectory<'a> {
    pub fn new(members: &'a [Member]) -> Self {
        Self { members }
    }

    pub fn lookup(&self, member_id: &str) -> MemberLookup<'a> {
        match self.members.iter().find(|m| m.id == member_id) {
            Some(member) => MemberLookup::Found(member),
            None => MemberLookup::NotFound,
        }
    }

    pub fn display_name(&self, member_id: &str) -> &'a str {
        self.lookup(member_id).display_name()
    }
}
