//! Shared-household meal and expense ledger.
//!
//! Members record meals, deposits, grocery (bazar) spending and fines; the
//! ledger turns them into a meal rate, each member's share of the fixed
//! bills and a running balance per member.

pub mod backend;

pub use backend::config::AppConfig;
pub use backend::{initialize_backend, Backend};
