use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::super::domain::{Tender, TenderId};
use super::super::lists::DynamicLists;
use super::super::repository::{StoreError, TenderStore};

/// Key holding the tender array.
pub const TENDERS_KEY: &str = "qa_tenders";
/// Key holding the dynamic lists object.
pub const LISTS_KEY: &str = "qa_lists";

/// Local key-value persistence: one JSON document per fixed key inside a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let path = self.path_for(key);
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        debug!(path = %path.display(), bytes = raw.len(), "read local store key");
        Ok(Some(serde_json::from_slice(&raw)?))
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let staging = self.dir.join(format!(".{key}.json.tmp"));
        let payload = serde_json::to_vec_pretty(value)?;
        fs::write(&staging, &payload)?;
        fs::rename(&staging, &path)?;
        debug!(path = %path.display(), bytes = payload.len(), "wrote local store key");
        Ok(())
    }
}

impl TenderStore for JsonFileStore {
    fn load_tenders(&self) -> Result<Vec<Tender>, StoreError> {
        Ok(self.read(TENDERS_KEY)?.unwrap_or_default())
    }

    fn upsert_tender(&self, _tender: &Tender, snapshot: &[Tender]) -> Result<(), StoreError> {
        self.write(TENDERS_KEY, snapshot)
    }

    fn delete_tender(&self, _id: &TenderId, snapshot: &[Tender]) -> Result<(), StoreError> {
        self.write(TENDERS_KEY, snapshot)
    }

    fn load_lists(&self) -> Result<Option<DynamicLists>, StoreError> {
        self.read(LISTS_KEY)
    }

    fn save_lists(&self, lists: &DynamicLists) -> Result<(), StoreError> {
        self.write(LISTS_KEY, lists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::tenders::domain::TenderDraft;
    use chrono::Utc;

    #[test]
    fn missing_keys_load_as_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = JsonFileStore::open(dir.path()).expect("store opens");
        assert!(store.load_tenders().expect("loads").is_empty());
        assert!(store.load_lists().expect("loads").is_none());
    }

    #[test]
    fn writes_whole_collection_under_fixed_key() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = JsonFileStore::open(dir.path()).expect("store opens");
        let tender = TenderDraft::default().into_tender(TenderId("f-1".to_string()), Utc::now());

        store
            .upsert_tender(&tender, std::slice::from_ref(&tender))
            .expect("write succeeds");

        let raw = fs::read_to_string(dir.path().join("qa_tenders.json")).expect("file written");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("json array");
        assert_eq!(value.as_array().map(Vec::len), Some(1));
        assert!(!dir.path().join(".qa_tenders.json.tmp").exists());

        store.delete_tender(&tender.id, &[]).expect("delete succeeds");
        assert!(store.load_tenders().expect("loads").is_empty());
    }

    #[test]
    fn corrupt_file_surfaces_as_json_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("qa_lists.json"), b"{not json").expect("seed file");
        let store = JsonFileStore::open(dir.path()).expect("store opens");
        assert!(matches!(store.load_lists(), Err(StoreError::Json(_))));
    }
}
