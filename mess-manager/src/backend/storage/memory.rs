//! # In-Memory Document Store
//!
//! Keeps every collection and settings document in a `tokio::sync::watch`
//! channel, so a write is a single atomic modification of the channel value
//! and every subscriber sees the new snapshot.
//!
//! Access rules and purge failures can be configured to reproduce how the
//! hosted store behaves when its own rules refuse an operation.
//!
//! With a [`Persistence`] attached, a change is written out before it is
//! published; a failed write leaves the channel untouched and notifies nobody.

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use uuid::Uuid;

use super::error::StoreError;
use super::traits::{
    Collection, CollectionFeed, DocPath, Document, DocumentFeed, DocumentStore, Fields, SettingsDoc,
};

/// Durable copy of the store
pub trait Persistence: Send + Sync {
    /// Write the full new contents of `collection`
    fn write_collection(&self, collection: Collection, documents: &[Document]) -> Result<()>;
    /// Write the new value of a settings document (`None` once deleted)
    fn write_settings(&self, doc: SettingsDoc, document: Option<&Document>) -> Result<()>;
}

struct Inner {
    collections: HashMap<Collection, watch::Sender<Vec<Document>>>,
    settings: HashMap<SettingsDoc, watch::Sender<Option<Document>>>,
    /// Paths refused by access rules; a rule covers the path and everything below it
    denied_paths: Mutex<HashSet<String>>,
    /// Collections whose batch delete fails
    failing_purges: Mutex<HashSet<Collection>>,
    persistence: Option<Arc<dyn Persistence>>,
}

/// In-process realtime document store
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// A store that writes every change to `persistence` before publishing it
    pub fn with_persistence(persistence: Arc<dyn Persistence>) -> Self {
        Self::build(Some(persistence))
    }

    fn build(persistence: Option<Arc<dyn Persistence>>) -> Self {
        let collections = Collection::ALL
            .iter()
            .map(|c| (*c, watch::channel(Vec::new()).0))
            .collect();
        let settings = SettingsDoc::ALL
            .iter()
            .map(|d| (*d, watch::channel(None).0))
            .collect();

        Self {
            inner: Arc::new(Inner {
                collections,
                settings,
                denied_paths: Mutex::new(HashSet::new()),
                failing_purges: Mutex::new(HashSet::new()),
                persistence,
            }),
        }
    }

    /// Refuse every operation on `path` (e.g. `"bazar"` or `"settings/fixed_bills"`)
    pub fn deny(&self, path: impl Into<String>) {
        let path = path.into();
        debug!("Access rule added: deny {}", path);
        lock(&self.inner.denied_paths).insert(path);
    }

    /// Remove a rule added with [`MemoryStore::deny`]
    pub fn allow(&self, path: &str) {
        lock(&self.inner.denied_paths).remove(path);
    }

    /// Make batch deletes of `collection` fail
    pub fn fail_purge(&self, collection: Collection) {
        lock(&self.inner.failing_purges).insert(collection);
    }

    pub fn clear_purge_failures(&self) {
        lock(&self.inner.failing_purges).clear();
    }

    /// Apply `change` to a collection; publish only if it changed something and
    /// the change was persisted. Returns whether it was published.
    fn commit_collection(
        &self,
        collection: Collection,
        change: impl FnOnce(&mut Vec<Document>) -> bool,
    ) -> Result<bool> {
        let mut outcome = Ok(false);
        self.collection_sender(collection).send_if_modified(|documents| {
            let previous = documents.clone();
            if !change(documents) {
                return false;
            }
            if let Some(persistence) = &self.inner.persistence {
                if let Err(e) = persistence.write_collection(collection, documents) {
                    *documents = previous;
                    outcome = Err(e);
                    return false;
                }
            }
            outcome = Ok(true);
            true
        });
        outcome
    }

    fn commit_settings(
        &self,
        doc: SettingsDoc,
        change: impl FnOnce(&mut Option<Document>) -> bool,
    ) -> Result<bool> {
        let mut outcome = Ok(false);
        self.settings_sender(doc).send_if_modified(|current| {
            let previous = current.clone();
            if !change(current) {
                return false;
            }
            if let Some(persistence) = &self.inner.persistence {
                if let Err(e) = persistence.write_settings(doc, current.as_ref()) {
                    *current = previous;
                    outcome = Err(e);
                    return false;
                }
            }
            outcome = Ok(true);
            true
        });
        outcome
    }

    /// Replace a collection wholesale (used when loading persisted data)
    pub fn seed_collection(&self, collection: Collection, documents: Vec<Document>) {
        self.collection_sender(collection).send_replace(documents);
    }

    /// Replace a settings document wholesale
    pub fn seed_settings(&self, doc: SettingsDoc, document: Option<Document>) {
        self.settings_sender(doc).send_replace(document);
    }

    /// Current contents of a collection, bypassing access rules
    pub fn collection_snapshot(&self, collection: Collection) -> Vec<Document> {
        self.collection_sender(collection).borrow().clone()
    }

    /// Current contents of a settings document, bypassing access rules
    pub fn settings_snapshot(&self, doc: SettingsDoc) -> Option<Document> {
        self.settings_sender(doc).borrow().clone()
    }

    pub fn count(&self, collection: Collection) -> usize {
        self.collection_sender(collection).borrow().len()
    }

    fn collection_sender(&self, collection: Collection) -> &watch::Sender<Vec<Document>> {
        &self.inner.collections[&collection]
    }

    fn settings_sender(&self, doc: SettingsDoc) -> &watch::Sender<Option<Document>> {
        &self.inner.settings[&doc]
    }

    fn check_access(&self, path: &str) -> Result<(), StoreError> {
        let denied = lock(&self.inner.denied_paths);
        let refused = denied
            .iter()
            .any(|rule| path == rule || path.starts_with(&format!("{}/", rule)));
        if refused {
            debug!("Access denied by rules: {}", path);
            return Err(StoreError::permission_denied(path));
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn merge_fields(target: &mut Fields, fields: Fields) {
    for (key, value) in fields {
        target.insert(key, value);
    }
}

fn write_fields(target: &mut Fields, fields: Fields, merge: bool) {
    if merge {
        merge_fields(target, fields);
    } else {
        *target = fields;
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn subscribe_collection(&self, collection: Collection) -> Result<CollectionFeed> {
        self.check_access(collection.as_str())?;
        Ok(self.collection_sender(collection).subscribe())
    }

    async fn subscribe_document(&self, doc: SettingsDoc) -> Result<DocumentFeed> {
        self.check_access(&DocPath::settings(doc).to_string())?;
        Ok(self.settings_sender(doc).subscribe())
    }

    async fn get(&self, path: &DocPath) -> Result<Option<Document>> {
        self.check_access(&path.to_string())?;
        let document = match path {
            DocPath::Record { collection, id } => self
                .collection_sender(*collection)
                .borrow()
                .iter()
                .find(|d| &d.id == id)
                .cloned(),
            DocPath::Settings(doc) => self.settings_sender(*doc).borrow().clone(),
        };
        Ok(document)
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Document>> {
        self.check_access(collection.as_str())?;
        Ok(self.collection_snapshot(collection))
    }

    async fn create(&self, collection: Collection, fields: Fields) -> Result<String> {
        self.check_access(collection.as_str())?;
        let id = Uuid::new_v4().simple().to_string();
        let document = Document::new(id.clone(), fields);
        self.commit_collection(collection, |documents| {
            documents.push(document);
            true
        })?;
        debug!("Created {}/{}", collection, id);
        Ok(id)
    }

    async fn update(&self, path: &DocPath, fields: Fields) -> Result<()> {
        self.check_access(&path.to_string())?;
        let found = match path {
            DocPath::Record { collection, id } => {
                self.commit_collection(*collection, |documents| {
                    match documents.iter_mut().find(|d| &d.id == id) {
                        Some(document) => {
                            merge_fields(&mut document.fields, fields);
                            true
                        }
                        None => false,
                    }
                })?
            }
            DocPath::Settings(doc) => self.commit_settings(*doc, |current| match current {
                Some(document) => {
                    merge_fields(&mut document.fields, fields);
                    true
                }
                None => false,
            })?,
        };

        if !found {
            return Err(StoreError::not_found(path.to_string()).into());
        }
        Ok(())
    }

    async fn upsert(&self, path: &DocPath, fields: Fields, merge: bool) -> Result<()> {
        self.check_access(&path.to_string())?;
        match path {
            DocPath::Record { collection, id } => {
                self.commit_collection(*collection, |documents| {
                    match documents.iter_mut().find(|d| &d.id == id) {
                        Some(document) => write_fields(&mut document.fields, fields, merge),
                        None => documents.push(Document::new(id.clone(), fields)),
                    }
                    true
                })?;
            }
            DocPath::Settings(doc) => {
                self.commit_settings(*doc, |current| {
                    match current {
                        Some(document) => write_fields(&mut document.fields, fields, merge),
                        None => *current = Some(Document::new(doc.as_str(), fields)),
                    }
                    true
                })?;
            }
        }
        debug!("Upserted {} (merge: {})", path, merge);
        Ok(())
    }

    async fn delete(&self, path: &DocPath) -> Result<()> {
        self.check_access(&path.to_string())?;
        match path {
            DocPath::Record { collection, id } => {
                self.commit_collection(*collection, |documents| {
                    let before = documents.len();
                    documents.retain(|d| &d.id != id);
                    documents.len() != before
                })?;
            }
            DocPath::Settings(doc) => {
                self.commit_settings(*doc, |current| current.take().is_some())?;
            }
        }
        Ok(())
    }

    async fn batch_delete(&self, collection: Collection) -> Result<usize> {
        self.check_access(collection.as_str())?;
        if lock(&self.inner.failing_purges).contains(&collection) {
            return Err(StoreError::unavailable(format!("batch delete of {} failed", collection)).into());
        }

        let mut deleted = 0;
        self.commit_collection(collection, |documents| {
            deleted = documents.len();
            documents.clear();
            deleted > 0
        })?;
        debug!("Batch deleted {} documents from {}", deleted, collection);
        Ok(deleted)
    }
}
