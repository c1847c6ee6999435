//! Money in and money out of the shared fund: deposits and bazar purchases.

use anyhow::Result;
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

use crate::backend::domain::models::{BazarEntry, Deposit};
use crate::backend::domain::role_gate::{Gated, RoleGate};
use crate::backend::domain::validation::{
    validate_date, validate_deposit_amount, validate_member_id, validate_non_negative_amount,
    validate_text, ValidationError,
};
use crate::backend::storage::{Collection, DocPath, DocumentStore};
use shared::{AddBazarRequest, AddDepositRequest, CreatedRecordResponse};

#[derive(Clone)]
pub struct FundService {
    store: Arc<dyn DocumentStore>,
    gate: RoleGate,
}

impl FundService {
    pub fn new(store: Arc<dyn DocumentStore>, gate: RoleGate) -> Self {
        Self { store, gate }
    }

    /// Record money a member paid into the fund, dated now
    pub async fn add_deposit(&self, request: AddDepositRequest) -> Result<Gated<CreatedRecordResponse>> {
        if !self.gate.permits("add_deposit") {
            return Ok(Gated::Rejected);
        }
        validate_member_id(&request.member_id)?;
        let amount = validate_deposit_amount(request.amount)?;

        let date = Utc::now().to_rfc3339();
        let id = self
            .store
            .create(Collection::Deposits, Deposit::new_fields(&request.member_id, amount, &date))
            .await?;

        info!("Deposit {} of {:.2} from member {}", id, amount, request.member_id);
        Ok(Gated::Applied(CreatedRecordResponse {
            id,
            success_message: format!("Deposit of {:.2} added", amount),
        }))
    }

    pub async fn delete_deposit(&self, deposit_id: &str) -> Result<Gated<()>> {
        if !self.gate.permits("delete_deposit") {
            return Ok(Gated::Rejected);
        }
        self.store
            .delete(&DocPath::record(Collection::Deposits, deposit_id))
            .await?;
        warn!("Deleted deposit {}", deposit_id);
        Ok(Gated::Applied(()))
    }

    /// Record a grocery purchase; only cash purchases reduce the fund
    pub async fn add_bazar(&self, request: AddBazarRequest) -> Result<Gated<CreatedRecordResponse>> {
        if !self.gate.permits("add_bazar") {
            return Ok(Gated::Rejected);
        }
        let item = validate_text("Item description", &request.item)?;
        if item.is_empty() {
            return Err(ValidationError::EmptyItem.into());
        }
        let amount = validate_non_negative_amount(request.amount)?;
        validate_member_id(&request.member_id)?;
        let date = validate_date(&request.date)?.format("%Y-%m-%d").to_string();

        let id = self
            .store
            .create(
                Collection::Bazar,
                BazarEntry::new_fields(&item, amount, &request.member_id, &date, request.bazar_type),
            )
            .await?;

        info!(
            "Bazar {} recorded: {} for {:.2} ({}) by {}",
            id,
            item,
            amount,
            request.bazar_type.as_str(),
            request.member_id
        );
        Ok(Gated::Applied(CreatedRecordResponse {
            id,
            success_message: format!("{} added to bazar", item),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::BazarKind;
    use crate::backend::storage::MemoryStore;
    use shared::{BazarType, Role};

    fn setup_test(role: Role) -> (FundService, MemoryStore) {
        let store = MemoryStore::new();
        let gate = RoleGate::new();
        gate.set_role(role);
        (FundService::new(Arc::new(store.clone()), gate), store)
    }

    fn bazar_request(item: &str, amount: f64, bazar_type: BazarType) -> AddBazarRequest {
        AddBazarRequest {
            item: item.to_string(),
            amount,
            member_id: "m1".to_string(),
            date: "2024-05-03".to_string(),
            bazar_type,
        }
    }

    #[tokio::test]
    async fn test_add_and_delete_deposit() {
        let (service, store) = setup_test(Role::Manager);
        let created = service
            .add_deposit(AddDepositRequest { member_id: "m1".to_string(), amount: 1500.0 })
            .await
            .unwrap()
            .applied()
            .unwrap();

        let deposits = store.collection_snapshot(Collection::Deposits);
        let deposit = Deposit::from_document(&deposits[0]);
        assert_eq!(deposit.id, created.id);
        assert_eq!(deposit.amount, 1500.0);
        assert!(!deposit.date.is_empty());

        assert!(service.delete_deposit(&created.id).await.unwrap().is_applied());
        assert_eq!(store.count(Collection::Deposits), 0);
    }

    #[tokio::test]
    async fn test_deposit_must_be_positive() {
        let (service, store) = setup_test(Role::Manager);
        let err = service
            .add_deposit(AddDepositRequest { member_id: "m1".to_string(), amount: 0.0 })
            .await
            .unwrap_err();
        assert_eq!(err.downcast_ref::<ValidationError>(), Some(&ValidationError::AmountNotPositive));
        assert_eq!(store.count(Collection::Deposits), 0);
    }

    #[tokio::test]
    async fn test_add_bazar_stores_type() {
        let (service, store) = setup_test(Role::Manager);
        service.add_bazar(bazar_request(" fish ", 320.0, BazarType::Credit)).await.unwrap();

        let entry = BazarEntry::from_document(&store.collection_snapshot(Collection::Bazar)[0]);
        assert_eq!(entry.item, "fish");
        assert_eq!(entry.kind, BazarKind::Credit);
        assert_eq!(entry.date, "2024-05-03");
    }

    #[tokio::test]
    async fn test_bazar_requires_item() {
        let (service, _) = setup_test(Role::Manager);
        let err = service.add_bazar(bazar_request("  ", 10.0, BazarType::Cash)).await.unwrap_err();
        assert_eq!(err.downcast_ref::<ValidationError>(), Some(&ValidationError::EmptyItem));
    }

    #[tokio::test]
    async fn test_viewer_cannot_touch_fund() {
        let (service, store) = setup_test(Role::Viewer);
        assert!(service
            .add_deposit(AddDepositRequest { member_id: "m1".to_string(), amount: 10.0 })
            .await
            .unwrap()
            .is_rejected());
        assert!(service
            .add_bazar(bazar_request("rice", 10.0, BazarType::Cash))
            .await
            .unwrap()
            .is_rejected());
        assert!(service.delete_deposit("d1").await.unwrap().is_rejected());
        assert_eq!(store.count(Collection::Deposits), 0);
        assert_eq!(store.count(Collection::Bazar), 0);
    }
}
