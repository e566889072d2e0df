//! Persistence capability for release group keyword lists.
//!
//! The filter only talks to storage through [`KeywordStore`], so any backend
//! (SQLite, in-memory, a test double) can sit behind it.

use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;

use crate::models::{EntityId, ListKind};

#[derive(Debug, Error)]
pub enum StoreError {
    /// No keywords exist for the requested (entity, kind) pair.
    #[error("no keywords found")]
    NotFound,

    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Keyword list storage keyed by entity and list kind.
pub trait KeywordStore {
    /// Fetch the keywords for one list.
    ///
    /// Backends may report an absent list either as an empty vector or as
    /// [`StoreError::NotFound`].
    fn query(&self, entity: &EntityId, kind: ListKind) -> Result<Vec<String>, StoreError>;

    /// Remove every keyword of one list.
    fn delete_all(&self, entity: &EntityId, kind: ListKind) -> Result<(), StoreError>;

    /// Add a single keyword to one list.
    fn insert(&self, entity: &EntityId, kind: ListKind, keyword: &str) -> Result<(), StoreError>;

    /// Replace one list with exactly `keywords`.
    ///
    /// The default is a plain delete followed by one insert per keyword.
    /// Backends that can should override this to make the pair atomic.
    fn replace(
        &self,
        entity: &EntityId,
        kind: ListKind,
        keywords: &[String],
    ) -> Result<(), StoreError> {
        self.delete_all(entity, kind)?;
        for keyword in keywords {
            self.insert(entity, kind, keyword)?;
        }
        Ok(())
    }
}

impl<S: KeywordStore + ?Sized> KeywordStore for &S {
    fn query(&self, entity: &EntityId, kind: ListKind) -> Result<Vec<String>, StoreError> {
        (**self).query(entity, kind)
    }

    fn delete_all(&self, entity: &EntityId, kind: ListKind) -> Result<(), StoreError> {
        (**self).delete_all(entity, kind)
    }

    fn insert(&self, entity: &EntityId, kind: ListKind, keyword: &str) -> Result<(), StoreError> {
        (**self).insert(entity, kind, keyword)
    }

    fn replace(
        &self,
        entity: &EntityId,
        kind: ListKind,
        keywords: &[String],
    ) -> Result<(), StoreError> {
        (**self).replace(entity, kind, keywords)
    }
}

type ListKey = (EntityId, ListKind);

/// In-memory keyword store.
///
/// A list that was never written, or was deleted and not refilled, is
/// reported as [`StoreError::NotFound`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    lists: Mutex<HashMap<ListKey, Vec<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<ListKey, Vec<String>>>, StoreError> {
        self.lists
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

impl KeywordStore for MemoryStore {
    fn query(&self, entity: &EntityId, kind: ListKind) -> Result<Vec<String>, StoreError> {
        self.lock()?
            .get(&(entity.clone(), kind))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn delete_all(&self, entity: &EntityId, kind: ListKind) -> Result<(), StoreError> {
        self.lock()?.remove(&(entity.clone(), kind));
        Ok(())
    }

    fn insert(&self, entity: &EntityId, kind: ListKind, keyword: &str) -> Result<(), StoreError> {
        self.lock()?
            .entry((entity.clone(), kind))
            .or_default()
            .push(keyword.to_string());
        Ok(())
    }

    fn replace(
        &self,
        entity: &EntityId,
        kind: ListKind,
        keywords: &[String],
    ) -> Result<(), StoreError> {
        // Single lock scope: readers never see the list half replaced.
        let mut lists = self.lock()?;
        let key = (entity.clone(), kind);
        if keywords.is_empty() {
            lists.remove(&key);
        } else {
            lists.insert(key, keywords.to_vec());
        }
        Ok(())
    }
}
