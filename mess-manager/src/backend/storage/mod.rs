//! # Storage Module
//!
//! Data persistence for the mess ledger. The hosted realtime document store
//! the household uses is an external collaborator; this module defines the
//! subset of its behaviour the domain relies on ([`DocumentStore`]) plus two
//! implementations:
//!
//! - **memory**: in-process store with realtime delivery over `tokio::sync::watch`
//! - **file**: JSON files in a data directory, realtime delivery delegated to memory
//!
//! Paths are typed: six record collections and three singleton settings
//! documents. Writes are last-write-wins at document level.

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::{MemoryStore, Persistence};
pub use traits::{
    Collection, CollectionFeed, DocPath, Document, DocumentFeed, DocumentStore, Fields, SettingsDoc,
};
