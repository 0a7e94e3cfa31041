use std::sync::{Arc, Mutex};

use super::domain::{Tender, TenderId};
use super::lists::DynamicLists;

/// Storage abstraction so the desk can run against a local file, a relational table, or memory.
///
/// `snapshot` is the whole collection after the change. Stores that persist the collection as
/// one value write it; row-oriented stores only touch the affected record.
pub trait TenderStore: Send + Sync {
    fn load_tenders(&self) -> Result<Vec<Tender>, StoreError>;
    fn upsert_tender(&self, tender: &Tender, snapshot: &[Tender]) -> Result<(), StoreError>;
    fn delete_tender(&self, id: &TenderId, snapshot: &[Tender]) -> Result<(), StoreError>;
    fn load_lists(&self) -> Result<Option<DynamicLists>, StoreError>;
    fn save_lists(&self, lists: &DynamicLists) -> Result<(), StoreError>;
}

/// Error enumeration for persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("stored data is corrupt: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// In-process store keeping the last written collection.
#[derive(Debug, Default, Clone)]
pub struct MemoryTenderStore {
    tenders: Arc<Mutex<Vec<Tender>>>,
    lists: Arc<Mutex<Option<DynamicLists>>>,
}

impl MemoryTenderStore {
    pub fn with_tenders(tenders: Vec<Tender>) -> Self {
        Self {
            tenders: Arc::new(Mutex::new(tenders)),
            lists: Arc::default(),
        }
    }

    pub fn snapshot(&self) -> Vec<Tender> {
        self.tenders.lock().map(|guard| guard.clone()).unwrap_or_default()
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Unavailable("memory store mutex poisoned".to_string())
}

impl TenderStore for MemoryTenderStore {
    fn load_tenders(&self) -> Result<Vec<Tender>, StoreError> {
        Ok(self.tenders.lock().map_err(poisoned)?.clone())
    }

    fn upsert_tender(&self, _tender: &Tender, snapshot: &[Tender]) -> Result<(), StoreError> {
        *self.tenders.lock().map_err(poisoned)? = snapshot.to_vec();
        Ok(())
    }

    fn delete_tender(&self, _id: &TenderId, snapshot: &[Tender]) -> Result<(), StoreError> {
        *self.tenders.lock().map_err(poisoned)? = snapshot.to_vec();
        Ok(())
    }

    fn load_lists(&self) -> Result<Option<DynamicLists>, StoreError> {
        Ok(self.lists.lock().map_err(poisoned)?.clone())
    }

    fn save_lists(&self, lists: &DynamicLists) -> Result<(), StoreError> {
        *self.lists.lock().map_err(poisoned)? = Some(lists.clone());
        Ok(())
    }
}
