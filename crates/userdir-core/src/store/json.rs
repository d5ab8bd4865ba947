use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::models::UserRecord;

use super::{remove_by_id, upsert_all, UserStore};

/// Table file name inside the data directory
const TABLE_FILE: &str = "users.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredTable {
    #[serde(rename = "savedAt")]
    saved_at: Option<DateTime<Utc>>,
    users: Vec<UserRecord>,
}

/// User table persisted as a single JSON file.
///
/// Each operation reads the whole table, applies its change and writes it
/// back through a temp file + rename. The internal lock keeps one operation's
/// read-modify-write from interleaving with another's.
pub struct JsonUserStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonUserStore {
    /// Open (creating the directory if needed) the table under `data_dir`.
    /// The table file itself is created on first write.
    ///
    /// Runs synchronously; call it during startup, not from a hot async path.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
        Ok(Self {
            path: data_dir.join(TABLE_FILE),
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When the table was last written, if it ever was
    pub async fn saved_at(&self) -> Result<Option<DateTime<Utc>>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.saved_at)
    }

    async fn load(&self) -> Result<StoredTable> {
        // Only a missing file means an empty table; any other stat error is a failure
        let exists = tokio::fs::try_exists(&self.path)
            .await
            .with_context(|| format!("Failed to access user table: {}", self.path.display()))?;
        if !exists {
            return Ok(StoredTable::default());
        }

        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read user table: {}", self.path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse user table: {}", self.path.display()))
    }

    async fn persist(&self, users: Vec<UserRecord>) -> Result<()> {
        let table = StoredTable {
            saved_at: Some(Utc::now()),
            users,
        };
        let contents = serde_json::to_string_pretty(&table)?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, contents)
            .await
            .with_context(|| format!("Failed to write user table: {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace user table: {}", self.path.display()))?;

        debug!(path = %self.path.display(), count = table.users.len(), "User table saved");
        Ok(())
    }
}

#[async_trait]
impl UserStore for JsonUserStore {
    async fn read_all(&self) -> Result<Vec<UserRecord>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.users)
    }

    async fn bulk_insert(&self, users: &[UserRecord]) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut table = self.load().await?.users;
        upsert_all(&mut table, users);
        self.persist(table).await
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut table = self.load().await?.users;
        if !remove_by_id(&mut table, id) {
            return Ok(false);
        }
        self.persist(table).await?;
        Ok(true)
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.persist(Vec::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_user;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_missing_table_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonUserStore::open(dir.path()).unwrap();

        assert!(store.read_all().await.unwrap().is_empty());
        assert!(store.saved_at().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_then_read_back_same_set() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonUserStore::open(dir.path()).unwrap();
        let written: Vec<UserRecord> = ["A", "B", "C", "D"].iter().map(|id| sample_user(id)).collect();

        store.bulk_insert(&written).await.unwrap();

        let read: HashSet<String> = store
            .read_all()
            .await
            .unwrap()
            .into_iter()
            .map(|u| serde_json::to_string(&u).unwrap())
            .collect();
        let expected: HashSet<String> = written.iter().map(|u| serde_json::to_string(u).unwrap()).collect();
        assert_eq!(read, expected);
        assert!(store.saved_at().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_table_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = JsonUserStore::open(dir.path()).unwrap();
            store.bulk_insert(&[sample_user("A"), sample_user("B")]).await.unwrap();
        }

        let reopened = JsonUserStore::open(dir.path()).unwrap();
        assert_eq!(reopened.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete_existing_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonUserStore::open(dir.path()).unwrap();
        store
            .bulk_insert(&[sample_user("A"), sample_user("B"), sample_user("C")])
            .await
            .unwrap();

        assert!(store.delete("B").await.unwrap());
        assert!(!store.delete("B").await.unwrap());
        assert!(!store.delete("nope").await.unwrap());

        let ids: Vec<String> = store.read_all().await.unwrap().into_iter().map(|u| u.id).collect();
        assert_eq!(ids, vec!["A", "C"]);
    }

    #[tokio::test]
    async fn test_clear_then_insert_replaces_generation() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonUserStore::open(dir.path()).unwrap();
        store.bulk_insert(&[sample_user("OLD1"), sample_user("OLD2")]).await.unwrap();

        store.clear().await.unwrap();
        store.bulk_insert(&[sample_user("NEW1")]).await.unwrap();

        assert_eq!(store.read_all().await.unwrap(), vec![sample_user("NEW1")]);
    }

    #[tokio::test]
    async fn test_corrupt_table_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonUserStore::open(dir.path()).unwrap();
        std::fs::write(store.path(), "[[[").unwrap();

        let err = store.read_all().await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse user table"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_table_is_an_error_not_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonUserStore::open(dir.path()).unwrap();
        // Symlink loop: stat fails with ELOOP rather than NotFound
        std::os::unix::fs::symlink(store.path(), store.path()).unwrap();

        let err = store.read_all().await.unwrap_err();
        assert!(err.to_string().contains("Failed to access user table"));
        assert!(store.delete("A").await.is_err());
        assert!(store.saved_at().await.is_err());
    }

    #[tokio::test]
    async fn test_stored_shape_is_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonUserStore::open(dir.path()).unwrap();
        store.bulk_insert(&[sample_user("A")]).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert!(raw["savedAt"].is_string());
        assert_eq!(raw["users"][0]["firstName"], "FirstA");
    }
}
