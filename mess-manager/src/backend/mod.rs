//! # Backend Module
//!
//! Contains all non-UI logic of the mess ledger.
//!
//! This module serves as the orchestration layer that brings together:
//! - **Domain**: Ledger calculations and the gated mutations
//! - **Storage**: The document store abstraction and its implementations
//! - **IO**: Sign-in, live sync of the dashboard and error banners
//!
//! ## Architecture
//!
//! ```text
//! UI (dashboard, forms)
//!     ↓
//! IO Layer (live session, auth, banners)
//!     ↓
//! Domain Layer (ledger engine, services, role gate)
//!     ↓
//! Storage Layer (DocumentStore: memory, file)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use log::info;
use std::sync::Arc;

use crate::backend::config::AppConfig;
use crate::backend::domain::{
    BillService, ExportService, FineService, FundService, LedgerSnapshot, ManagerAccessService,
    MealService, MemberService, ResetService, RoleGate, SettingsService,
};
use crate::backend::io::LiveSession;
use crate::backend::storage::{DocumentStore, FileStore};

/// Every service of one installation, sharing a store and a session role
#[derive(Clone)]
pub struct Backend {
    pub config: AppConfig,
    pub store: Arc<dyn DocumentStore>,
    pub gate: RoleGate,
    pub manager_access_service: ManagerAccessService,
    pub member_service: MemberService,
    pub meal_service: MealService,
    pub fund_service: FundService,
    pub fine_service: FineService,
    pub bill_service: BillService,
    pub settings_service: SettingsService,
    pub reset_service: ResetService,
    pub export_service: ExportService,
}

impl Backend {
    /// Wire all services over `store`; the session starts as a viewer
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>) -> Self {
        let gate = RoleGate::new();
        Self {
            manager_access_service: ManagerAccessService::new(store.clone(), gate.clone(), config.default_pin.clone()),
            member_service: MemberService::new(store.clone(), gate.clone()),
            meal_service: MealService::new(store.clone(), gate.clone()),
            fund_service: FundService::new(store.clone(), gate.clone()),
            fine_service: FineService::new(store.clone(), gate.clone()),
            bill_service: BillService::new(store.clone(), gate.clone()),
            settings_service: SettingsService::new(store.clone(), gate.clone()),
            reset_service: ResetService::new(store.clone(), gate.clone()),
            export_service: ExportService::new(gate.clone()),
            config,
            store,
            gate,
        }
    }

    pub async fn start_live_session(&self) -> LiveSession {
        LiveSession::start(self.store.clone(), &self.config.default_pin).await
    }

    /// One-off read of everything, for exports and tools that do not need live sync
    pub async fn load_snapshot(&self) -> Result<LedgerSnapshot> {
        LedgerSnapshot::load(self.store.as_ref(), &self.config.default_pin).await
    }
}

/// Initialize the backend over the file store in the configured data directory
pub fn initialize_backend(config: AppConfig) -> Result<Backend> {
    let data_directory = config.resolved_data_directory()?;
    info!("Setting up file store in {}", data_directory.display());
    let store = FileStore::open(&data_directory)?;

    info!("Setting up domain services");
    Ok(Backend::new(config, Arc::new(store)))
}
