use anyhow::Result;
use log::info;
use std::sync::Arc;

use crate::backend::domain::models::{FixedBills, NoticeConfig};
use crate::backend::domain::role_gate::{Gated, RoleGate};
use crate::backend::domain::validation::{validate_non_negative_amount, validate_text};
use crate::backend::storage::{DocPath, DocumentStore, SettingsDoc};
use shared::{UpdateFixedBillsRequest, UpdateNoticeRequest};

/// Service for the singleton settings documents (notice and fixed bills)
#[derive(Clone)]
pub struct SettingsService {
    store: Arc<dyn DocumentStore>,
    gate: RoleGate,
}

impl SettingsService {
    pub fn new(store: Arc<dyn DocumentStore>, gate: RoleGate) -> Self {
        Self { store, gate }
    }

    pub async fn update_notice(&self, request: UpdateNoticeRequest) -> Result<Gated<()>> {
        if !self.gate.permits("update_notice") {
            return Ok(Gated::Rejected);
        }
        let text = validate_text("Notice", &request.text)?;

        let notice = NoticeConfig { text };
        self.store
            .upsert(&DocPath::settings(SettingsDoc::NoticeConfig), notice.to_fields(), true)
            .await?;
        info!("Notice updated ({} characters)", notice.text.chars().count());
        Ok(Gated::Applied(()))
    }

    /// Replace the monthly wifi, electricity and rent totals
    pub async fn update_fixed_bills(&self, request: UpdateFixedBillsRequest) -> Result<Gated<FixedBills>> {
        if !self.gate.permits("update_fixed_bills") {
            return Ok(Gated::Rejected);
        }
        let bills = FixedBills {
            wifi: validate_non_negative_amount(request.wifi)?,
            current: validate_non_negative_amount(request.current)?,
            rent: validate_non_negative_amount(request.rent)?,
        };

        self.store
            .upsert(&DocPath::settings(SettingsDoc::FixedBills), bills.to_fields(), true)
            .await?;
        info!(
            "Fixed bills updated: wifi={:.2}, current={:.2}, rent={:.2}",
            bills.wifi, bills.current, bills.rent
        );
        Ok(Gated::Applied(bills))
    }
}
