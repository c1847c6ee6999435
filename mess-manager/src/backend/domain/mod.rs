//! # Domain Module
//!
//! Business logic of the mess ledger: how meals, bazar spending, deposits,
//! fines and fixed bills turn into a meal rate and a balance per member.
//!
//! ## Module Organization
//!
//! - **coerce**: Read-boundary coercion of untyped document values
//! - **validation**: Input checks run before any write
//! - **models**: Typed records parsed from store documents
//! - **snapshot**: The in-memory copy of every collection
//! - **ledger**: Pure calculations (meal rate, bill split, balances, fund status)
//! - **history**: Display rows for the bazar, deposit and fine histories
//! - **role_gate**: Viewer/manager session role and the mutation gate
//! - ***_service**: Gated mutations, one service per area
//!
//! ## Core Concepts
//!
//! - **Fine-meal**: Each fine counts as two meals in the offender's cost basis
//! - **Meal rate**: Cash bazar divided by all meals plus all fine-meals
//! - **Bill per head**: Wifi, electricity and rent split evenly across members
//! - **Fund status**: Total deposits minus cash bazar
//! - **Monthly reset**: Purge of all transactional records, keeping members and settings
//!
//! ## Design Principles
//!
//! - **Explicit snapshot**: Calculations take a [`LedgerSnapshot`] and never read the store
//! - **Gated writes**: Every mutation returns [`Gated`]; viewers get `Rejected` and nothing is written
//! - **Storage agnostic**: Services work against any [`DocumentStore`](crate::backend::storage::DocumentStore)

pub mod bill_service;
pub mod coerce;
pub mod export_service;
pub mod fine_service;
pub mod fund_service;
pub mod history;
pub mod ledger;
pub mod manager_access_service;
pub mod meal_service;
pub mod member_service;
pub mod models;
pub mod reset_service;
pub mod role_gate;
pub mod settings_service;
pub mod snapshot;
pub mod validation;

pub use bill_service::{bill_board, BillService};
pub use export_service::ExportService;
pub use fine_service::FineService;
pub use fund_service::FundService;
pub use history::{bazar_history, deposit_history, fine_history};
pub use ledger::{compute_dashboard, LedgerReport};
pub use manager_access_service::ManagerAccessService;
pub use meal_service::MealService;
pub use member_service::MemberService;
pub use reset_service::{FailedPurge, ResetError, ResetService};
pub use role_gate::{Gated, RoleGate};
pub use settings_service::SettingsService;
pub use snapshot::LedgerSnapshot;
pub use validation::ValidationError;
