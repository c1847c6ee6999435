//! The in-memory copy of every collection the ledger reads.
//!
//! A [`LedgerSnapshot`] is an explicit value: the live session replaces one
//! collection at a time as realtime updates arrive, and the ledger functions
//! only ever see a complete snapshot passed in by reference.

use anyhow::Result;
use std::collections::BTreeMap;

use crate::backend::domain::models::{
    BazarEntry, BillTrackingRecord, Deposit, Fine, FixedBills, ManagerConfig, MealDay, Member,
    MemberDirectory, NoticeConfig, DEFAULT_MANAGER_PIN,
};
use crate::backend::storage::{Collection, DocPath, Document, DocumentStore, SettingsDoc};

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSnapshot {
    pub members: Vec<Member>,
    pub bazar: Vec<BazarEntry>,
    /// Keyed by date (YYYY-MM-DD)
    pub meals: BTreeMap<String, MealDay>,
    pub deposits: Vec<Deposit>,
    pub fines: Vec<Fine>,
    /// Keyed by `{member_id}_{month}`
    pub bill_tracking: BTreeMap<String, BillTrackingRecord>,
    pub fixed_bills: FixedBills,
    pub manager: ManagerConfig,
    pub notice: NoticeConfig,
}

impl Default for LedgerSnapshot {
    fn default() -> Self {
        Self::empty(DEFAULT_MANAGER_PIN)
    }
}

impl LedgerSnapshot {
    pub fn empty(default_pin: &str) -> Self {
        Self {
            members: Vec::new(),
            bazar: Vec::new(),
            meals: BTreeMap::new(),
            deposits: Vec::new(),
            fines: Vec::new(),
            bill_tracking: BTreeMap::new(),
            fixed_bills: FixedBills::default(),
            manager: ManagerConfig::from_document(None, default_pin),
            notice: NoticeConfig::default(),
        }
    }

    /// Read every collection and settings document once
    pub async fn load(store: &dyn DocumentStore, default_pin: &str) -> Result<Self> {
        let mut snapshot = Self::empty(default_pin);
        for collection in Collection::ALL {
            let documents = store.list(collection).await?;
            snapshot.apply_collection(collection, &documents);
        }
        for doc in SettingsDoc::ALL {
            let document = store.get(&DocPath::settings(doc)).await?;
            snapshot.apply_settings(doc, document.as_ref(), default_pin);
        }
        Ok(snapshot)
    }

    /// Replace one collection with a freshly delivered set of documents
    pub fn apply_collection(&mut self, collection: Collection, documents: &[Document]) {
        match collection {
            Collection::Members => {
                self.members = documents.iter().map(Member::from_document).collect();
            }
            Collection::Bazar => {
                self.bazar = documents.iter().map(BazarEntry::from_document).collect();
            }
            Collection::Meals => {
                self.meals = documents
                    .iter()
                    .map(|d| (d.id.clone(), MealDay::from_document(d)))
                    .collect();
            }
            Collection::Deposits => {
                self.deposits = documents.iter().map(Deposit::from_document).collect();
            }
            Collection::Fines => {
                self.fines = documents.iter().map(Fine::from_document).collect();
            }
            Collection::BillTracking => {
                self.bill_tracking = documents
                    .iter()
                    .map(|d| (d.id.clone(), BillTrackingRecord::from_document(d)))
                    .collect();
            }
        }
    }

    /// Replace one settings document (None when it does not exist)
    pub fn apply_settings(&mut self, doc: SettingsDoc, document: Option<&Document>, default_pin: &str) {
        match doc {
            SettingsDoc::ManagerConfig => {
                self.manager = ManagerConfig::from_document(document, default_pin);
            }
            SettingsDoc::FixedBills => self.fixed_bills = FixedBills::from_document(document),
            SettingsDoc::NoticeConfig => self.notice = NoticeConfig::from_document(document),
        }
    }

    pub fn member_directory(&self) -> MemberDirectory<'_> {
        MemberDirectory::new(&self.members)
    }

    /// A member's bill record for a month; all unpaid when none is stored
    pub fn bill_record(&self, member_id: &str, month: &str) -> BillTrackingRecord {
        self.bill_tracking
            .get(&BillTrackingRecord::key(member_id, month))
            .cloned()
            .unwrap_or_else(|| BillTrackingRecord {
                member_id: member_id.to_string(),
                month: month.to_string(),
                ..Default::default()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::{Fields, MemoryStore};
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_apply_collection_replaces_previous_contents() {
        let mut snapshot = LedgerSnapshot::default();
        let first = vec![
            Document::new("f1", fields(json!({"member_id": "m1"}))),
            Document::new("f2", fields(json!({"member_id": "m2"}))),
        ];
        snapshot.apply_collection(Collection::Fines, &first);
        assert_eq!(snapshot.fines.len(), 2);

        snapshot.apply_collection(Collection::Fines, &first[..1]);
        assert_eq!(snapshot.fines.len(), 1);
    }

    #[test]
    fn test_bill_record_defaults_to_unpaid() {
        let snapshot = LedgerSnapshot::default();
        let record = snapshot.bill_record("m1", "2024-05");
        assert_eq!(record.member_id, "m1");
        assert!(!record.wifi && !record.current && !record.rent);
    }

    #[tokio::test]
    async fn test_load_reads_everything() {
        let store = MemoryStore::new();
        store.create(Collection::Members, fields(json!({"name": "Rahim"}))).await.unwrap();
        store
            .upsert(&DocPath::record(Collection::Meals, "2024-05-01"), fields(json!({"x": 2})), false)
            .await
            .unwrap();
        store
            .upsert(&DocPath::settings(SettingsDoc::NoticeConfig), fields(json!({"text": "hello"})), false)
            .await
            .unwrap();

        let snapshot = LedgerSnapshot::load(&store, "0000").await.unwrap();
        assert_eq!(snapshot.members.len(), 1);
        assert_eq!(snapshot.meals["2024-05-01"].total(), 2.0);
        assert_eq!(snapshot.notice.text, "hello");
        assert_eq!(snapshot.manager.pin, "0000");
    }
}
