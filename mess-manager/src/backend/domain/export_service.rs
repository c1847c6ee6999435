//! Monthly statement export.
//!
//! Writes the per-member figures of the current report to a CSV file so the
//! month can be archived before it is reset.

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, Utc};
use log::{error, info};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::domain::coerce::format_money;
use crate::backend::domain::ledger::LedgerReport;
use crate::backend::domain::role_gate::{Gated, RoleGate};
use crate::backend::domain::snapshot::LedgerSnapshot;
use shared::ExportStatementResponse;

#[derive(Debug, Serialize)]
struct StatementRow<'a> {
    name: &'a str,
    meals: f64,
    fine_meals: f64,
    meal_cost: String,
    paid: String,
    total_cost: String,
    balance: String,
}

#[derive(Clone)]
pub struct ExportService {
    gate: RoleGate,
}

impl ExportService {
    pub fn new(gate: RoleGate) -> Self {
        Self { gate }
    }

    /// File name of the statement exported on `date`
    pub fn statement_file_name(date: NaiveDate) -> String {
        format!("mess_statement_{}.csv", date.format("%Y%m%d"))
    }

    /// Export today's statement into `directory` (Documents, or home, when None)
    pub fn export_statement(
        &self,
        snapshot: &LedgerSnapshot,
        directory: Option<&Path>,
    ) -> Result<Gated<ExportStatementResponse>> {
        self.export_statement_on(snapshot, directory, Utc::now().date_naive())
    }

    pub fn export_statement_on(
        &self,
        snapshot: &LedgerSnapshot,
        directory: Option<&Path>,
        date: NaiveDate,
    ) -> Result<Gated<ExportStatementResponse>> {
        if !self.gate.permits("export_statement") {
            return Ok(Gated::Rejected);
        }

        let export_dir = match directory {
            Some(dir) => dir.to_path_buf(),
            None => default_export_directory()?,
        };
        fs::create_dir_all(&export_dir)
            .with_context(|| format!("Failed to create export directory {}", export_dir.display()))?;

        let file_path = export_dir.join(Self::statement_file_name(date));
        let report = LedgerReport::compute(snapshot);
        let directory_lookup = snapshot.member_directory();

        let mut writer = csv::Writer::from_path(&file_path)
            .with_context(|| format!("Failed to open {}", file_path.display()))?;
        for (member_id, stats) in &report.members {
            writer.serialize(StatementRow {
                name: directory_lookup.display_name(member_id),
                meals: stats.meals,
                fine_meals: stats.fine_meals,
                meal_cost: format_money(stats.meal_cost),
                paid: format_money(stats.paid),
                total_cost: format_money(stats.total_cost),
                balance: format_money(stats.balance),
            })?;
        }
        writer.flush()?;

        let file_path_str = file_path.to_string_lossy().to_string();
        info!("Exported statement for {} members to {}", report.members.len(), file_path_str);
        Ok(Gated::Applied(ExportStatementResponse {
            success_message: format!("Statement exported to: {}", file_path_str),
            file_path: file_path_str,
            row_count: report.members.len(),
        }))
    }
}

fn default_export_directory() -> Result<PathBuf> {
    dirs::document_dir().or_else(dirs::home_dir).ok_or_else(|| {
        error!("Could not determine default export directory");
        anyhow!("Failed to determine export directory")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::{BazarEntry, BazarKind, Deposit, MealDay, Member};
    use shared::Role;
    use tempfile::TempDir;

    fn snapshot() -> LedgerSnapshot {
        let mut snapshot = LedgerSnapshot::default();
        snapshot.members = vec![Member {
            id: "m1".to_string(),
            name: "Rahim, Jr.".to_string(),
            is_manager_tag: true,
            created_at: String::new(),
        }];
        let mut day = MealDay { date: "2024-05-01".to_string(), ..Default::default() };
        day.counts.insert("m1".to_string(), 4.0);
        snapshot.meals.insert(day.date.clone(), day);
        snapshot.bazar = vec![BazarEntry {
            id: "b1".to_string(),
            item: "rice".to_string(),
            amount: 100.0,
            member_id: "m1".to_string(),
            date: "2024-05-01".to_string(),
            kind: BazarKind::Cash,
        }];
        snapshot.deposits = vec![Deposit {
            id: "d1".to_string(),
            member_id: "m1".to_string(),
            amount: 150.0,
            date: String::new(),
        }];
        snapshot
    }

    fn manager_gate() -> RoleGate {
        let gate = RoleGate::new();
        gate.set_role(Role::Manager);
        gate
    }

    #[test]
    fn test_statement_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        assert_eq!(ExportService::statement_file_name(date), "mess_statement_20240531.csv");
    }

    #[test]
    fn test_export_writes_member_rows() {
        let temp_dir = TempDir::new().unwrap();
        let service = ExportService::new(manager_gate());
        let date = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();

        let response = service
            .export_statement_on(&snapshot(), Some(temp_dir.path()), date)
            .unwrap()
            .applied()
            .unwrap();
        assert_eq!(response.row_count, 1);

        let content = fs::read_to_string(temp_dir.path().join("mess_statement_20240531.csv")).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), "name,meals,fine_meals,meal_cost,paid,total_cost,balance");
        assert_eq!(lines.next().unwrap(), "\"Rahim, Jr.\",4.0,0.0,100.00,150.00,100.00,50.00");
    }

    #[test]
    fn test_viewer_cannot_export() {
        let temp_dir = TempDir::new().unwrap();
        let service = ExportService::new(RoleGate::new());
        let outcome = service.export_statement(&snapshot(), Some(temp_dir.path())).unwrap();
        assert!(outcome.is_rejected());
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }
}
