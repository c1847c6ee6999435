//! Display rows for the bazar, deposit and fine histories.
//!
//! Rows come out latest entry first (reverse insertion order) with member
//! names resolved through the directory, so records of deleted members read
//! "Unknown".

use crate::backend::domain::coerce::display_date;
use crate::backend::domain::snapshot::LedgerSnapshot;
use shared::{BazarHistoryRow, DepositHistoryRow, FineHistoryRow};

pub fn bazar_history(snapshot: &LedgerSnapshot) -> Vec<BazarHistoryRow> {
    let directory = snapshot.member_directory();
    snapshot
        .bazar
        .iter()
        .rev()
        .map(|entry| BazarHistoryRow {
            id: entry.id.clone(),
            item: entry.item.clone(),
            amount: entry.amount,
            member_name: directory.display_name(&entry.member_id).to_string(),
            display_date: display_date(&entry.date),
            bazar_type: entry.kind.as_bazar_type(),
        })
        .collect()
}

pub fn deposit_history(snapshot: &LedgerSnapshot) -> Vec<DepositHistoryRow> {
    let directory = snapshot.member_directory();
    snapshot
        .deposits
        .iter()
        .rev()
        .map(|deposit| DepositHistoryRow {
            id: deposit.id.clone(),
            member_name: directory.display_name(&deposit.member_id).to_string(),
            amount: deposit.amount,
            display_date: display_date(&deposit.date),
        })
        .collect()
}

pub fn fine_history(snapshot: &LedgerSnapshot) -> Vec<FineHistoryRow> {
    let directory = snapshot.member_directory();
    snapshot
        .fines
        .iter()
        .rev()
        .map(|fine| FineHistoryRow {
            id: fine.id.clone(),
            member_name: directory.display_name(&fine.member_id).to_string(),
            reason: fine.reason.clone(),
            display_date: display_date(&fine.date),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::{BazarEntry, BazarKind, Deposit, Fine, Member};
    use shared::BazarType;

    fn snapshot() -> LedgerSnapshot {
        let mut snapshot = LedgerSnapshot::default();
        snapshot.members = vec![Member {
            id: "m1".to_string(),
            name: "Rahim".to_string(),
            is_manager_tag: false,
            created_at: String::new(),
        }];
        snapshot.bazar = vec![
            BazarEntry {
                id: "b1".to_string(),
                item: "rice".to_string(),
                amount: 500.0,
                member_id: "m1".to_string(),
                date: "2024-05-01".to_string(),
                kind: BazarKind::Cash,
            },
            BazarEntry {
                id: "b2".to_string(),
                item: "oil".to_string(),
                amount: 200.0,
                member_id: "gone".to_string(),
                date: "not a date".to_string(),
                kind: BazarKind::Unrecognized("card".to_string()),
            },
        ];
        snapshot.deposits = vec![
            Deposit {
                id: "d1".to_string(),
                member_id: "m1".to_string(),
                amount: 1000.0,
                date: "2024-05-02T08:30:00Z".to_string(),
            },
            Deposit {
                id: "d2".to_string(),
                member_id: "gone".to_string(),
                amount: 300.0,
                date: "2024-05-04T08:30:00Z".to_string(),
            },
        ];
        snapshot.fines = vec![Fine {
            id: "f1".to_string(),
            member_id: "gone".to_string(),
            reason: "late".to_string(),
            date: "2024-05-05T10:00:00+06:00".to_string(),
        }];
        snapshot
    }

    #[test]
    fn test_bazar_history_latest_first() {
        let rows = bazar_history(&snapshot());
        assert_eq!(rows[0].id, "b2");
        assert_eq!(rows[0].member_name, "Unknown");
        assert_eq!(rows[0].display_date, "");
        assert_eq!(rows[0].bazar_type, None);
        assert_eq!(rows[1].member_name, "Rahim");
        assert_eq!(rows[1].display_date, "01/05/2024");
        assert_eq!(rows[1].bazar_type, Some(BazarType::Cash));
    }

    #[test]
    fn test_deposit_history() {
        let rows = deposit_history(&snapshot());
        assert_eq!(rows.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), vec!["d2", "d1"]);
        assert_eq!(rows[0].member_name, "Unknown");
        assert_eq!(rows[1].display_date, "02/05/2024");
    }

    #[test]
    fn test_fine_history() {
        let rows = fine_history(&snapshot());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].reason, "late");
        assert_eq!(rows[0].display_date, "05/05/2024");
    }
}
