//! # Monthly Reset
//!
//! Closes a month by purging every transactional collection (bazar, meals,
//! deposits, fines, bill tracking). Members and settings survive.
//!
//! The purges run one after another and every collection is attempted even
//! when an earlier one fails. A failure yields [`ResetError::Partial`] naming
//! what was purged and what was not. Deleting is idempotent, so running the
//! reset again finishes the job.

use anyhow::Result;
use log::{error, info, warn};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::backend::domain::role_gate::{Gated, RoleGate};
use crate::backend::storage::{Collection, DocumentStore};
use shared::{PurgedCollection, ResetMonthResponse};

/// A collection whose purge failed, with the store's reason
#[derive(Debug, Clone, PartialEq)]
pub struct FailedPurge {
    pub collection: Collection,
    pub reason: String,
}

impl fmt::Display for FailedPurge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.collection, self.reason)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResetError {
    #[error(
        "Monthly reset incomplete. Purged: [{}]. Failed: [{}]",
        list_purged(.purged),
        list_failed(.failed)
    )]
    Partial {
        purged: Vec<PurgedCollection>,
        failed: Vec<FailedPurge>,
    },
}

fn list_purged(purged: &[PurgedCollection]) -> String {
    purged
        .iter()
        .map(|p| format!("{} ({} deleted)", p.collection, p.deleted))
        .collect::<Vec<_>>()
        .join(", ")
}

fn list_failed(failed: &[FailedPurge]) -> String {
    failed.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

#[derive(Clone)]
pub struct ResetService {
    store: Arc<dyn DocumentStore>,
    gate: RoleGate,
}

impl ResetService {
    pub fn new(store: Arc<dyn DocumentStore>, gate: RoleGate) -> Self {
        Self { store, gate }
    }

    pub async fn reset_month(&self) -> Result<Gated<ResetMonthResponse>> {
        if !self.gate.permits("reset_month") {
            return Ok(Gated::Rejected);
        }
        info!("Starting monthly reset");

        let mut purged = Vec::new();
        let mut failed = Vec::new();
        for collection in Collection::TRANSACTIONAL {
            match self.store.batch_delete(collection).await {
                Ok(deleted) => {
                    info!("Purged {} documents from {}", deleted, collection);
                    purged.push(PurgedCollection {
                        collection: collection.as_str().to_string(),
                        deleted,
                    });
                }
                Err(e) => {
                    error!("Failed to purge {}: {}", collection, e);
                    failed.push(FailedPurge {
                        collection,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if !failed.is_empty() {
            warn!("Monthly reset incomplete: {} of {} collections failed", failed.len(), Collection::TRANSACTIONAL.len());
            return Err(ResetError::Partial { purged, failed }.into());
        }

        let total: usize = purged.iter().map(|p| p.deleted).sum();
        info!("Monthly reset complete: {} documents removed", total);
        Ok(Gated::Applied(ResetMonthResponse {
            purged,
            success_message: format!("Month reset: {} records cleared", total),
        }))
    }
}
