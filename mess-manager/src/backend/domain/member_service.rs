use anyhow::Result;
use chrono::Utc;
use log::{info, warn};
use serde_json::json;
use std::sync::Arc;

use crate::backend::domain::models::Member;
use crate::backend::domain::role_gate::{Gated, RoleGate};
use crate::backend::domain::validation::{validate_member_id, validate_member_name};
use crate::backend::storage::{Collection, DocPath, DocumentStore, Fields, StoreError};
use shared::{CreateMemberRequest, CreateMemberResponse};

/// Service for managing the members of the mess
#[derive(Clone)]
pub struct MemberService {
    store: Arc<dyn DocumentStore>,
    gate: RoleGate,
}

impl MemberService {
    pub fn new(store: Arc<dyn DocumentStore>, gate: RoleGate) -> Self {
        Self { store, gate }
    }

    /// Add a member with a trimmed name
    pub async fn add_member(&self, request: CreateMemberRequest) -> Result<Gated<CreateMemberResponse>> {
        if !self.gate.permits("add_member") {
            return Ok(Gated::Rejected);
        }
        let name = validate_member_name(&request.name)?;
        info!("Adding member: {}", name);

        let created_at = Utc::now().to_rfc3339();
        let member_id = self
            .store
            .create(Collection::Members, Member::new_fields(&name, &created_at))
            .await?;

        info!("Added member {} with ID: {}", name, member_id);
        Ok(Gated::Applied(CreateMemberResponse {
            member_id,
            success_message: format!("{} joined the mess", name),
        }))
    }

    /// Flip the display tag that marks who runs the mess
    pub async fn toggle_manager_tag(&self, member_id: &str) -> Result<Gated<bool>> {
        if !self.gate.permits("toggle_manager_tag") {
            return Ok(Gated::Rejected);
        }
        validate_member_id(member_id)?;

        let path = DocPath::record(Collection::Members, member_id);
        let document = self
            .store
            .get(&path)
            .await?
            .ok_or_else(|| StoreError::not_found(path.to_string()))?;
        let tagged = !Member::from_document(&document).is_manager_tag;

        let mut fields = Fields::new();
        fields.insert("is_manager_tag".to_string(), json!(tagged));
        self.store.update(&path, fields).await?;

        info!("Member {} manager tag set to {}", member_id, tagged);
        Ok(Gated::Applied(tagged))
    }

    /// Remove a member; their records stay and show up as "Unknown"
    pub async fn delete_member(&self, member_id: &str) -> Result<Gated<()>> {
        if !self.gate.permits("delete_member") {
            return Ok(Gated::Rejected);
        }
        validate_member_id(member_id)?;

        self.store
            .delete(&DocPath::record(Collection::Members, member_id))
            .await?;
        warn!("Deleted member {} (records kept)", member_id);
        Ok(Gated::Applied(()))
    }

    pub async fn list_members(&self) -> Result<Vec<Member>> {
        let documents = self.store.list(Collection::Members).await?;
        Ok(documents.iter().map(Member::from_document).collect())
    }
}
