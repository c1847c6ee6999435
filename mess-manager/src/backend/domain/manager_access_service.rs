use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;

use crate::backend::domain::models::ManagerConfig;
use crate::backend::domain::role_gate::{Gated, RoleGate};
use crate::backend::domain::validation::validate_pin;
use crate::backend::storage::{DocPath, DocumentStore, SettingsDoc};
use shared::{ChangePinRequest, ManagerLoginRequest, ManagerLoginResponse, Role};

/// Service for switching the session between viewer and manager
#[derive(Clone)]
pub struct ManagerAccessService {
    store: Arc<dyn DocumentStore>,
    gate: RoleGate,
    default_pin: String,
}

impl ManagerAccessService {
    pub fn new(store: Arc<dyn DocumentStore>, gate: RoleGate, default_pin: impl Into<String>) -> Self {
        Self {
            store,
            gate,
            default_pin: default_pin.into(),
        }
    }

    async fn stored_config(&self) -> Result<ManagerConfig> {
        let document = self
            .store
            .get(&DocPath::settings(SettingsDoc::ManagerConfig))
            .await?;
        Ok(ManagerConfig::from_document(document.as_ref(), &self.default_pin))
    }

    /// Enter manager mode when the PIN matches the stored one exactly
    pub async fn login(&self, request: ManagerLoginRequest) -> Result<ManagerLoginResponse> {
        info!("Manager login attempt (PIN length: {})", request.pin.len());

        let config = self.stored_config().await?;
        if request.pin == config.pin {
            self.gate.set_role(Role::Manager);
            info!("Manager login successful");
            Ok(ManagerLoginResponse {
                success: true,
                role: Role::Manager,
                message: "Manager mode enabled".to_string(),
            })
        } else {
            warn!("Manager login failed: incorrect PIN");
            Ok(ManagerLoginResponse {
                success: false,
                role: self.gate.role(),
                message: "Incorrect PIN".to_string(),
            })
        }
    }

    pub fn logout(&self) -> Role {
        self.gate.set_role(Role::Viewer);
        info!("Manager logged out");
        Role::Viewer
    }

    pub fn current_role(&self) -> Role {
        self.gate.role()
    }

    pub async fn change_pin(&self, request: ChangePinRequest) -> Result<Gated<()>> {
        if !self.gate.permits("change_pin") {
            return Ok(Gated::Rejected);
        }
        validate_pin(&request.new_pin)?;

        let config = ManagerConfig { pin: request.new_pin };
        self.store
            .upsert(
                &DocPath::settings(SettingsDoc::ManagerConfig),
                config.to_fields(),
                true,
            )
            .await?;

        info!("Manager PIN updated");
        Ok(Gated::Applied(()))
    }
}
