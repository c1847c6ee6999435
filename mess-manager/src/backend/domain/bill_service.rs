//! Monthly payment tracking for the fixed bills.
//!
//! One record per member per month, keyed `{member_id}_{YYYY-MM}`, holding a
//! paid flag for wifi, electricity and rent. A month without a record means
//! nothing has been paid yet.

use anyhow::Result;
use log::info;
use std::sync::Arc;

use crate::backend::domain::ledger::share_per_head;
use crate::backend::domain::models::BillTrackingRecord;
use crate::backend::domain::role_gate::{Gated, RoleGate};
use crate::backend::domain::snapshot::LedgerSnapshot;
use crate::backend::domain::validation::{validate_member_id, validate_month};
use crate::backend::storage::{Collection, DocPath, DocumentStore};
use shared::{BillBoard, BillKind, BillPaidCounts, BillStatusRow, DueDates, ToggleBillRequest};

#[derive(Clone)]
pub struct BillService {
    store: Arc<dyn DocumentStore>,
    gate: RoleGate,
}

impl BillService {
    pub fn new(store: Arc<dyn DocumentStore>, gate: RoleGate) -> Self {
        Self { store, gate }
    }

    /// Flip one paid flag, leaving the other two as stored; returns the new value
    pub async fn toggle_bill_status(&self, request: ToggleBillRequest) -> Result<Gated<bool>> {
        if !self.gate.permits("toggle_bill_status") {
            return Ok(Gated::Rejected);
        }
        validate_member_id(&request.member_id)?;
        let month = validate_month(&request.month)?;

        let path = DocPath::record(
            Collection::BillTracking,
            BillTrackingRecord::key(&request.member_id, &month),
        );
        let current = self
            .store
            .get(&path)
            .await?
            .map(|d| BillTrackingRecord::from_document(&d))
            .unwrap_or_default();

        let fields = current.toggle_fields(&request.member_id, &month, request.bill);
        self.store.upsert(&path, fields, true).await?;

        let paid = !current.is_paid(request.bill);
        info!(
            "Bill {} for member {} in {} marked {}",
            request.bill,
            request.member_id,
            month,
            if paid { "paid" } else { "unpaid" }
        );
        Ok(Gated::Applied(paid))
    }
}

/// Paid status of every current member for `month`
pub fn bill_board(snapshot: &LedgerSnapshot, month: &str, due_dates: &DueDates) -> BillBoard {
    let mut paid_counts = BillPaidCounts::default();
    let rows: Vec<BillStatusRow> = snapshot
        .members
        .iter()
        .map(|member| {
            let record = snapshot.bill_record(&member.id, month);
            for bill in BillKind::ALL {
                if record.is_paid(bill) {
                    match bill {
                        BillKind::Wifi => paid_counts.wifi += 1,
                        BillKind::Current => paid_counts.current += 1,
                        BillKind::Rent => paid_counts.rent += 1,
                    }
                }
            }
            BillStatusRow {
                member_id: member.id.clone(),
                name: member.name.clone(),
                wifi: record.wifi,
                current: record.current,
                rent: record.rent,
            }
        })
        .collect();

    BillBoard {
        month: month.to_string(),
        share_per_head: share_per_head(&snapshot.fixed_bills, snapshot.members.len()),
        due_dates: due_dates.clone(),
        rows,
        paid_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::{FixedBills, Member};
    use crate::backend::storage::MemoryStore;
    use shared::Role;

    fn setup_test() -> (BillService, MemoryStore) {
        let store = MemoryStore::new();
        let gate = RoleGate::new();
        gate.set_role(Role::Manager);
        (BillService::new(Arc::new(store.clone()), gate), store)
    }

    fn toggle(bill: BillKind) -> ToggleBillRequest {
        ToggleBillRequest {
            member_id: "m1".to_string(),
            month: "2024-05".to_string(),
            bill,
        }
    }

    async fn stored(store: &MemoryStore) -> BillTrackingRecord {
        let document = store
            .get(&DocPath::record(Collection::BillTracking, "m1_2024-05"))
            .await
            .unwrap()
            .unwrap();
        BillTrackingRecord::from_document(&document)
    }

    #[tokio::test]
    async fn test_toggle_creates_record() {
        let (service, store) = setup_test();
        assert_eq!(service.toggle_bill_status(toggle(BillKind::Rent)).await.unwrap(), Gated::Applied(true));

        let record = stored(&store).await;
        assert!(record.rent);
        assert!(!record.wifi && !record.current);
        assert_eq!(record.member_id, "m1");
        assert_eq!(record.month, "2024-05");
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_and_keeps_other_flags() {
        let (service, store) = setup_test();
        service.toggle_bill_status(toggle(BillKind::Wifi)).await.unwrap();
        service.toggle_bill_status(toggle(BillKind::Rent)).await.unwrap();
        service.toggle_bill_status(toggle(BillKind::Rent)).await.unwrap();

        let record = stored(&store).await;
        assert!(record.wifi);
        assert!(!record.rent);
    }

    #[tokio::test]
    async fn test_toggle_rejects_bad_month() {
        let (service, store) = setup_test();
        let mut request = toggle(BillKind::Wifi);
        request.month = "May".to_string();
        assert!(service.toggle_bill_status(request).await.is_err());
        assert_eq!(store.count(Collection::BillTracking), 0);
    }

    #[test]
    fn test_bill_board_counts_paid_members() {
        let mut snapshot = LedgerSnapshot::default();
        snapshot.members = ["m1", "m2", "m3"]
            .iter()
            .map(|id| Member {
                id: id.to_string(),
                name: id.to_uppercase(),
                is_manager_tag: false,
                created_at: String::new(),
            })
            .collect();
        snapshot.fixed_bills = FixedBills { wifi: 300.0, current: 600.0, rent: 1500.0 };
        snapshot.bill_tracking.insert(
            BillTrackingRecord::key("m1", "2024-05"),
            BillTrackingRecord {
                member_id: "m1".to_string(),
                month: "2024-05".to_string(),
                wifi: true,
                current: false,
                rent: true,
            },
        );
        snapshot.bill_tracking.insert(
            BillTrackingRecord::key("m2", "2024-04"),
            BillTrackingRecord {
                member_id: "m2".to_string(),
                month: "2024-04".to_string(),
                wifi: true,
                current: true,
                rent: true,
            },
        );

        let board = bill_board(&snapshot, "2024-05", &DueDates::default());
        assert_eq!(board.rows.len(), 3);
        assert!(board.rows[0].wifi && board.rows[0].rent);
        // April payments do not count for May
        assert!(!board.rows[1].wifi);
        assert_eq!(board.paid_counts, BillPaidCounts { wifi: 1, current: 0, rent: 1 });
        assert_eq!(board.share_per_head.rent, 500.0);
        assert_eq!(board.due_dates.rent, 8);
    }
}
