//! # File Document Store
//!
//! Persists the mess data as JSON files in a single data directory so a
//! household can run the ledger without a hosted database.
//!
//! ## File Structure
//!
//! ```text
//! data/
//! ├── members.json
//! ├── bazar.json
//! ├── meals.json
//! ├── deposits.json
//! ├── fines.json
//! ├── bill_tracking.json
//! └── settings.json      ← manager_config, fixed_bills, notice_config
//! ```
//!
//! Realtime delivery is handled by an inner [`MemoryStore`]. Every mutation is
//! written to its file first (temp file + rename) and published to
//! subscribers only once the write succeeded.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::memory::{MemoryStore, Persistence};
use super::traits::{
    Collection, CollectionFeed, DocPath, Document, DocumentFeed, DocumentStore, Fields, SettingsDoc,
};

const SETTINGS_FILE: &str = "settings.json";

/// Writes collections and settings to the data directory
struct JsonFiles {
    base_directory: PathBuf,
    /// Last persisted contents of the settings file
    settings: Mutex<BTreeMap<String, Fields>>,
}

impl JsonFiles {
    fn collection_file(&self, collection: Collection) -> PathBuf {
        self.base_directory.join(format!("{}.json", collection.as_str()))
    }

    fn settings_file(&self) -> PathBuf {
        self.base_directory.join(SETTINGS_FILE)
    }
}

impl Persistence for JsonFiles {
    fn write_collection(&self, collection: Collection, documents: &[Document]) -> Result<()> {
        let content = serde_json::to_string_pretty(documents)?;
        write_atomic(&self.collection_file(collection), &content)
    }

    fn write_settings(&self, doc: SettingsDoc, document: Option<&Document>) -> Result<()> {
        let mut persisted = self.settings.lock().unwrap_or_else(|p| p.into_inner());
        let mut settings = persisted.clone();
        match document {
            Some(document) => settings.insert(doc.as_str().to_string(), document.fields.clone()),
            None => settings.remove(doc.as_str()),
        };
        let content = serde_json::to_string_pretty(&settings)?;
        write_atomic(&self.settings_file(), &content)?;
        *persisted = settings;
        Ok(())
    }
}

/// JSON-file backed document store
#[derive(Clone)]
pub struct FileStore {
    memory: MemoryStore,
    base_directory: PathBuf,
}

impl FileStore {
    /// Open (or create) a store in `base_directory`, loading any existing files
    pub fn open<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_directory = base_directory.as_ref().to_path_buf();
        if !base_directory.exists() {
            fs::create_dir_all(&base_directory).with_context(|| {
                format!("Failed to create data directory {}", base_directory.display())
            })?;
            info!("Created data directory: {}", base_directory.display());
        }

        let files = JsonFiles {
            base_directory: base_directory.clone(),
            settings: Mutex::new(BTreeMap::new()),
        };
        let collections = load_collections(&files)?;
        let settings = load_settings(&files)?;
        *files.settings.lock().unwrap_or_else(|p| p.into_inner()) = settings.clone();

        let memory = MemoryStore::with_persistence(Arc::new(files));
        for (collection, documents) in collections {
            memory.seed_collection(collection, documents);
        }
        for doc in SettingsDoc::ALL {
            if let Some(fields) = settings.get(doc.as_str()) {
                memory.seed_settings(doc, Some(Document::new(doc.as_str(), fields.clone())));
            }
        }

        info!("Opened file store at {}", base_directory.display());
        Ok(Self {
            memory,
            base_directory,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// The in-memory layer, for configuring access rules
    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }
}

fn load_collections(files: &JsonFiles) -> Result<Vec<(Collection, Vec<Document>)>> {
    let mut loaded = Vec::new();
    for collection in Collection::ALL {
        let path = files.collection_file(collection);
        if !path.exists() {
            continue;
        }
        let content = fs::read_to_string(&path)?;
        let documents: Vec<Document> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        debug!("Loaded {} documents from {}", documents.len(), path.display());
        loaded.push((collection, documents));
    }
    Ok(loaded)
}

fn load_settings(files: &JsonFiles) -> Result<BTreeMap<String, Fields>> {
    let path = files.settings_file();
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let content = fs::read_to_string(&path)?;
    let mut settings: BTreeMap<String, Fields> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    settings.retain(|key, _| SettingsDoc::ALL.iter().any(|doc| doc.as_str() == key));
    Ok(settings)
}

fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content)
        .with_context(|| format!("Failed to write {}", temp_path.display()))?;
    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    debug!("Saved {}", path.display());
    Ok(())
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn subscribe_collection(&self, collection: Collection) -> Result<CollectionFeed> {
        self.memory.subscribe_collection(collection).await
    }

    async fn subscribe_document(&self, doc: SettingsDoc) -> Result<DocumentFeed> {
        self.memory.subscribe_document(doc).await
    }

    async fn get(&self, path: &DocPath) -> Result<Option<Document>> {
        self.memory.get(path).await
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Document>> {
        self.memory.list(collection).await
    }

    async fn create(&self, collection: Collection, fields: Fields) -> Result<String> {
        self.memory.create(collection, fields).await
    }

    async fn update(&self, path: &DocPath, fields: Fields) -> Result<()> {
        self.memory.update(path, fields).await
    }

    async fn upsert(&self, path: &DocPath, fields: Fields, merge: bool) -> Result<()> {
        self.memory.upsert(path, fields, merge).await
    }

    async fn delete(&self, path: &DocPath) -> Result<()> {
        self.memory.delete(path).await
    }

    async fn batch_delete(&self, collection: Collection) -> Result<usize> {
        self.memory.batch_delete(collection).await
    }
}
