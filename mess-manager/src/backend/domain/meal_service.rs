use anyhow::Result;
use log::info;
use serde_json::json;
use std::sync::Arc;

use crate::backend::domain::role_gate::{Gated, RoleGate};
use crate::backend::domain::validation::{validate_date, validate_meal_count, validate_member_id};
use crate::backend::storage::{Collection, DocPath, DocumentStore, Fields};
use shared::RecordMealRequest;

/// Service for recording daily meal counts
///
/// Each date is one document keyed `YYYY-MM-DD` holding `{member_id: count}`.
#[derive(Clone)]
pub struct MealService {
    store: Arc<dyn DocumentStore>,
    gate: RoleGate,
}

impl MealService {
    pub fn new(store: Arc<dyn DocumentStore>, gate: RoleGate) -> Self {
        Self { store, gate }
    }

    /// Set one member's count for a date, keeping everyone else's
    pub async fn record_meal(&self, request: RecordMealRequest) -> Result<Gated<()>> {
        if !self.gate.permits("record_meal") {
            return Ok(Gated::Rejected);
        }
        let date = validate_date(&request.date)?;
        validate_member_id(&request.member_id)?;
        let count = validate_meal_count(request.count)?;

        let date_key = date.format("%Y-%m-%d").to_string();
        let mut fields = Fields::new();
        fields.insert(request.member_id.clone(), json!(count));
        self.store
            .upsert(&DocPath::record(Collection::Meals, &date_key), fields, true)
            .await?;

        info!("Recorded {} meals for {} on {}", count, request.member_id, date_key);
        Ok(Gated::Applied(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::MealDay;
    use crate::backend::domain::validation::ValidationError;
    use crate::backend::storage::MemoryStore;
    use shared::Role;

    fn setup_test() -> (MealService, MemoryStore, RoleGate) {
        let store = MemoryStore::new();
        let gate = RoleGate::new();
        gate.set_role(Role::Manager);
        (MealService::new(Arc::new(store.clone()), gate.clone()), store, gate)
    }

    fn request(date: &str, member_id: &str, count: f64) -> RecordMealRequest {
        RecordMealRequest {
            date: date.to_string(),
            member_id: member_id.to_string(),
            count,
        }
    }

    async fn day(store: &MemoryStore, date: &str) -> MealDay {
        let document = store
            .get(&DocPath::record(Collection::Meals, date))
            .await
            .unwrap()
            .unwrap();
        MealDay::from_document(&document)
    }

    #[tokio::test]
    async fn test_record_merges_into_date() {
        let (service, store, _) = setup_test();
        service.record_meal(request("2024-05-01", "m1", 2.0)).await.unwrap();
        service.record_meal(request("2024-05-01", "m2", 1.5)).await.unwrap();
        service.record_meal(request("2024-05-01", "m1", 3.0)).await.unwrap();

        let meals = day(&store, "2024-05-01").await;
        assert_eq!(meals.count_for("m1"), 3.0);
        assert_eq!(meals.count_for("m2"), 1.5);
        assert_eq!(store.count(Collection::Meals), 1);
    }

    #[tokio::test]
    async fn test_rejects_fractional_counts() {
        let (service, store, _) = setup_test();
        let err = service.record_meal(request("2024-05-01", "m1", 0.3)).await.unwrap_err();
        assert_eq!(err.downcast_ref::<ValidationError>(), Some(&ValidationError::InvalidMealCount));
        assert_eq!(store.count(Collection::Meals), 0);
    }

    #[tokio::test]
    async fn test_rejects_bad_date() {
        let (service, _, _) = setup_test();
        let err = service.record_meal(request("01/05/2024", "m1", 1.0)).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<ValidationError>(), Some(ValidationError::InvalidDate(_))));
    }

    #[tokio::test]
    async fn test_viewer_is_rejected() {
        let (service, store, gate) = setup_test();
        gate.set_role(Role::Viewer);
        let outcome = service.record_meal(request("2024-05-01", "m1", 1.0)).await.unwrap();
        assert!(outcome.is_rejected());
        assert_eq!(store.count(Collection::Meals), 0);
    }
}
