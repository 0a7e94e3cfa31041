use chrono::NaiveDate;
use licita::config::{StorageBackend, StorageConfig};
use licita::workflows::tenders::{
    DynamicLists, JsonFileStore, MemoryTenderStore, SqliteTenderStore, StoreError, Tender,
    TenderDesk, TenderId, TenderStore,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type Desk = TenderDesk<ConfiguredStore>;

/// Store selected by `APP_STORAGE`.
#[derive(Debug)]
pub(crate) enum ConfiguredStore {
    Local(JsonFileStore),
    Sqlite(SqliteTenderStore),
    Memory(MemoryTenderStore),
}

impl ConfiguredStore {
    pub(crate) fn open(config: &StorageConfig) -> Result<Self, StoreError> {
        let store = match config.backend {
            StorageBackend::Local => Self::Local(JsonFileStore::open(&config.data_dir)?),
            StorageBackend::Sqlite => Self::Sqlite(SqliteTenderStore::open(&config.sqlite_path)?),
            StorageBackend::Memory => Self::Memory(MemoryTenderStore::default()),
        };
        info!(backend = ?config.backend, "tender store ready");
        Ok(store)
    }

    fn inner(&self) -> &dyn TenderStore {
        match self {
            Self::Local(store) => store,
            Self::Sqlite(store) => store,
            Self::Memory(store) => store,
        }
    }
}

impl TenderStore for ConfiguredStore {
    fn load_tenders(&self) -> Result<Vec<Tender>, StoreError> {
        self.inner().load_tenders()
    }

    fn upsert_tender(&self, tender: &Tender, snapshot: &[Tender]) -> Result<(), StoreError> {
        self.inner().upsert_tender(tender, snapshot)
    }

    fn delete_tender(&self, id: &TenderId, snapshot: &[Tender]) -> Result<(), StoreError> {
        self.inner().delete_tender(id, snapshot)
    }

    fn load_lists(&self) -> Result<Option<DynamicLists>, StoreError> {
        self.inner().load_lists()
    }

    fn save_lists(&self, lists: &DynamicLists) -> Result<(), StoreError> {
        self.inner().save_lists(lists)
    }
}

pub(crate) fn open_desk(config: &StorageConfig) -> Result<Arc<Desk>, licita::error::AppError> {
    let store = ConfiguredStore::open(config)?;
    Ok(Arc::new(TenderDesk::open(Arc::new(store))?))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn memory_backend_needs_no_paths() {
        let config = StorageConfig {
            backend: StorageBackend::Memory,
            data_dir: PathBuf::from("/nonexistent/licita"),
            sqlite_path: PathBuf::from("/nonexistent/licita.db"),
        };
        let desk = open_desk(&config).expect("memory desk opens");
        assert!(desk.tenders().expect("state readable").is_empty());
    }

    #[test]
    fn parse_date_rejects_local_format() {
        assert!(parse_date("2025-03-10").is_ok());
        assert!(parse_date("10/03/2025").is_err());
    }
}
