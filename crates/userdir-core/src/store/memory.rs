use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::models::UserRecord;

use super::{remove_by_id, upsert_all, UserStore};

/// In-memory user table. Nothing survives the process.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<UserRecord>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `users` already stored
    pub fn with_users(users: Vec<UserRecord>) -> Self {
        Self {
            users: Mutex::new(users),
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn read_all(&self) -> Result<Vec<UserRecord>> {
        Ok(self.users.lock().await.clone())
    }

    async fn bulk_insert(&self, users: &[UserRecord]) -> Result<()> {
        upsert_all(&mut *self.users.lock().await, users);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(remove_by_id(&mut *self.users.lock().await, id))
    }

    async fn clear(&self) -> Result<()> {
        self.users.lock().await.clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.users.lock().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_user;

    #[tokio::test]
    async fn test_memory_store_operations() {
        let store = MemoryUserStore::new();
        assert_eq!(store.count().await.unwrap(), 0);

        store
            .bulk_insert(&[sample_user("A"), sample_user("B"), sample_user("C")])
            .await
            .unwrap();
        assert_eq!(store.count().await.unwrap(), 3);

        assert!(store.delete("B").await.unwrap());
        assert!(!store.delete("B").await.unwrap());

        let ids: Vec<String> = store.read_all().await.unwrap().into_iter().map(|u| u.id).collect();
        assert_eq!(ids, vec!["A", "C"]);

        store.clear().await.unwrap();
        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_with_users() {
        let store = MemoryUserStore::with_users(vec![sample_user("X")]);
        assert_eq!(store.read_all().await.unwrap(), vec![sample_user("X")]);
    }
}
