//! Local persistent user table.
//!
//! `UserStore` is the seam the directory reads and writes through. It is a
//! plain keyed table with no cross-operation transactions: callers that want
//! replace semantics sequence `clear` then `bulk_insert` themselves.
//!
//! - `JsonUserStore`: durable table file in the data directory
//! - `MemoryUserStore`: in-process table for tests and throwaway runs

pub mod json;
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::UserRecord;

pub use json::JsonUserStore;
pub use memory::MemoryUserStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Full table contents in insertion order
    async fn read_all(&self) -> Result<Vec<UserRecord>>;

    /// Insert many records. A record whose id is already stored replaces it in place.
    async fn bulk_insert(&self, users: &[UserRecord]) -> Result<()>;

    /// Remove one record. Returns false (and changes nothing) if the id is absent.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Remove every record
    async fn clear(&self) -> Result<()>;

    async fn count(&self) -> Result<usize> {
        Ok(self.read_all().await?.len())
    }
}

/// Put `incoming` into `table`, replacing records with matching ids in place
/// and appending the rest in order.
pub(crate) fn upsert_all(table: &mut Vec<UserRecord>, incoming: &[UserRecord]) {
    for user in incoming {
        match table.iter_mut().find(|existing| existing.id == user.id) {
            Some(existing) => *existing = user.clone(),
            None => table.push(user.clone()),
        }
    }
}

/// Remove the record with `id`, returning whether anything was removed
pub(crate) fn remove_by_id(table: &mut Vec<UserRecord>, id: &str) -> bool {
    let before = table.len();
    table.retain(|user| user.id != id);
    table.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_user;

    #[test]
    fn test_upsert_all_appends_and_replaces() {
        let mut table = vec![sample_user("A"), sample_user("B")];

        let mut changed_b = sample_user("B");
        changed_b.email = "new-b@example.com".to_string();
        upsert_all(&mut table, &[changed_b.clone(), sample_user("C")]);

        let ids: Vec<&str> = table.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(table[1], changed_b);
    }

    #[test]
    fn test_remove_by_id() {
        let mut table = vec![sample_user("A"), sample_user("B")];
        assert!(remove_by_id(&mut table, "A"));
        assert!(!remove_by_id(&mut table, "A"));
        assert_eq!(table.len(), 1);
    }
}
