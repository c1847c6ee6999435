use anyhow::Result;
use chrono::Utc;
use log::info;
use std::sync::Arc;

use crate::backend::domain::models::Fine;
use crate::backend::domain::role_gate::{Gated, RoleGate};
use crate::backend::domain::validation::{validate_member_id, validate_text};
use crate::backend::storage::{Collection, DocumentStore};
use shared::{AddFineRequest, CreatedRecordResponse};

/// Service for fining members; each fine costs two fine-meals
#[derive(Clone)]
pub struct FineService {
    store: Arc<dyn DocumentStore>,
    gate: RoleGate,
}

impl FineService {
    pub fn new(store: Arc<dyn DocumentStore>, gate: RoleGate) -> Self {
        Self { store, gate }
    }

    pub async fn add_fine(&self, request: AddFineRequest) -> Result<Gated<CreatedRecordResponse>> {
        if !self.gate.permits("add_fine") {
            return Ok(Gated::Rejected);
        }
        validate_member_id(&request.member_id)?;
        let reason = validate_text("Fine reason", &request.reason)?;

        let date = Utc::now().to_rfc3339();
        let id = self
            .store
            .create(Collection::Fines, Fine::new_fields(&request.member_id, &reason, &date))
            .await?;

        info!("Fine {} issued to member {}: {}", id, request.member_id, reason);
        Ok(Gated::Applied(CreatedRecordResponse {
            id,
            success_message: "Fine added".to_string(),
        }))
    }
}
