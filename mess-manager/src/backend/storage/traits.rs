//! # Storage Traits
//!
//! The document store abstraction the domain layer works against. Any backend
//! that can deliver realtime snapshots of a collection and apply single
//! document writes can sit behind [`DocumentStore`].

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;

/// Raw document fields as stored; values are not trusted to be well typed
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Realtime view of a whole collection, in insertion order
pub type CollectionFeed = watch::Receiver<Vec<Document>>;

/// Realtime view of a singleton settings document (None while absent)
pub type DocumentFeed = watch::Receiver<Option<Document>>;

/// Record collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Members,
    Bazar,
    Meals,
    Deposits,
    Fines,
    BillTracking,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::Members,
        Collection::Bazar,
        Collection::Meals,
        Collection::Deposits,
        Collection::Fines,
        Collection::BillTracking,
    ];

    /// Collections purged by the monthly reset
    pub const TRANSACTIONAL: [Collection; 5] = [
        Collection::Bazar,
        Collection::Meals,
        Collection::Deposits,
        Collection::Fines,
        Collection::BillTracking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Members => "members",
            Collection::Bazar => "bazar",
            Collection::Meals => "meals",
            Collection::Deposits => "deposits",
            Collection::Fines => "fines",
            Collection::BillTracking => "bill_tracking",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Singleton documents under `settings/`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsDoc {
    ManagerConfig,
    FixedBills,
    NoticeConfig,
}

impl SettingsDoc {
    pub const ALL: [SettingsDoc; 3] = [
        SettingsDoc::ManagerConfig,
        SettingsDoc::FixedBills,
        SettingsDoc::NoticeConfig,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingsDoc::ManagerConfig => "manager_config",
            SettingsDoc::FixedBills => "fixed_bills",
            SettingsDoc::NoticeConfig => "notice_config",
        }
    }
}

/// Address of a single document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocPath {
    Record { collection: Collection, id: String },
    Settings(SettingsDoc),
}

impl DocPath {
    pub fn record(collection: Collection, id: impl Into<String>) -> Self {
        DocPath::Record {
            collection,
            id: id.into(),
        }
    }

    pub fn settings(doc: SettingsDoc) -> Self {
        DocPath::Settings(doc)
    }

    /// Document id within its collection
    pub fn id(&self) -> &str {
        match self {
            DocPath::Record { id, .. } => id,
            DocPath::Settings(doc) => doc.as_str(),
        }
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocPath::Record { collection, id } => write!(f, "{}/{}", collection, id),
            DocPath::Settings(doc) => write!(f, "settings/{}", doc.as_str()),
        }
    }
}

/// A stored document: id plus untyped fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.fields.get(key)
    }
}

/// Trait defining the document store the domain writes to and subscribes on
///
/// Errors are `anyhow::Error` wrapping [`super::StoreError`] where the kind
/// matters (permission denied, missing document).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Subscribe to a collection; the receiver already holds the current snapshot
    async fn subscribe_collection(&self, collection: Collection) -> Result<CollectionFeed>;

    /// Subscribe to a settings document
    async fn subscribe_document(&self, doc: SettingsDoc) -> Result<DocumentFeed>;

    /// Read a single document
    async fn get(&self, path: &DocPath) -> Result<Option<Document>>;

    /// Read a whole collection once
    async fn list(&self, collection: Collection) -> Result<Vec<Document>>;

    /// Create a document with a generated id and return the id
    async fn create(&self, collection: Collection, fields: Fields) -> Result<String>;

    /// Merge fields into an existing document; fails with `NotFound` if absent
    async fn update(&self, path: &DocPath, fields: Fields) -> Result<()>;

    /// Write a document, merging into an existing one when `merge` is set,
    /// replacing it otherwise
    async fn upsert(&self, path: &DocPath, fields: Fields, merge: bool) -> Result<()>;

    /// Delete a document; deleting a missing document is not an error
    async fn delete(&self, path: &DocPath) -> Result<()>;

    /// Delete every document in a collection and return how many were removed
    async fn batch_delete(&self, collection: Collection) -> Result<usize>;
}
