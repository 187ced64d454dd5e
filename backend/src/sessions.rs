//! Process-local session store with a size ceiling
//!
//! Every visitor that receives a notice gets a session record, logged in or not. Records
//! are dropped once expired, and when the store is full the record closest to expiry is
//! evicted to make room.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tower_sessions::{
    session::{Id, Record},
    session_store, SessionStore,
};

/// Default number of live sessions kept
pub const DEFAULT_SESSION_CAPACITY: usize = 10_000;

/// In-memory [`SessionStore`] that never holds more than `capacity` records
#[derive(Debug, Clone)]
pub struct BoundedMemoryStore {
    records: Arc<Mutex<HashMap<Id, Record>>>,
    capacity: usize,
}

impl Default for BoundedMemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_CAPACITY)
    }
}

impl BoundedMemoryStore {
    /// Creates an empty store holding at most `capacity` sessions (at least one)
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Number of records currently held, expired ones included until the next write
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Whether no record is held
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    /// Drops expired records, then evicts the soonest-expiring ones until `incoming` fits
    fn make_room(&self, records: &mut HashMap<Id, Record>, incoming: &Id) {
        let now = OffsetDateTime::now_utc();
        records.retain(|_, record| record.expiry_date > now);

        if records.contains_key(incoming) {
            return;
        }
        while records.len() >= self.capacity {
            let Some(oldest) = records
                .values()
                .min_by_key(|record| record.expiry_date)
                .map(|record| record.id)
            else {
                break;
            };
            tracing::debug!("Session store full, evicting the session closest to expiry");
            records.remove(&oldest);
        }
    }
}

#[async_trait]
impl SessionStore for BoundedMemoryStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let mut records = self.records.lock().await;
        while records.contains_key(&record.id) {
            record.id = Id::default();
        }
        self.make_room(&mut records, &record.id);
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let mut records = self.records.lock().await;
        self.make_room(&mut records, &record.id);
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let mut records = self.records.lock().await;
        match records.get(session_id) {
            Some(record) if record.expiry_date > OffsetDateTime::now_utc() => {
                Ok(Some(record.clone()))
            }
            Some(_) => {
                records.remove(session_id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.records.lock().await.remove(session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use time::Duration;

    use super::*;

    fn record(expires_in: Duration) -> Record {
        Record {
            id: Id::default(),
            data: HashMap::default(),
            expiry_date: OffsetDateTime::now_utc() + expires_in,
        }
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let store = BoundedMemoryStore::new(4);
        let saved = record(Duration::hours(1));

        store.save(&saved).await.unwrap();

        let loaded = store.load(&saved.id).await.unwrap();
        assert_eq!(loaded.map(|record| record.id), Some(saved.id));
        store.delete(&saved.id).await.unwrap();
        assert!(store.load(&saved.id).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_expired_records_are_dropped() {
        let store = BoundedMemoryStore::new(4);
        let expired = record(Duration::seconds(-1));
        store.save(&expired).await.unwrap();

        assert!(store.load(&expired.id).await.unwrap().is_none());
        assert_eq!(store.len().await, 0);

        store.save(&record(Duration::seconds(-1))).await.unwrap();
        store.save(&record(Duration::hours(1))).await.unwrap();
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_full_store_evicts_soonest_expiring() {
        let store = BoundedMemoryStore::new(2);
        let soon = record(Duration::minutes(1));
        let later = record(Duration::hours(1));
        let newest = record(Duration::hours(2));

        store.save(&soon).await.unwrap();
        store.save(&later).await.unwrap();
        store.save(&newest).await.unwrap();

        assert_eq!(store.len().await, 2);
        assert!(store.load(&soon.id).await.unwrap().is_none());
        assert!(store.load(&later.id).await.unwrap().is_some());
        assert!(store.load(&newest.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_resaving_a_held_session_evicts_nothing() {
        let store = BoundedMemoryStore::new(2);
        let first = record(Duration::minutes(1));
        let second = record(Duration::hours(1));
        store.save(&first).await.unwrap();
        store.save(&second).await.unwrap();

        store.save(&first).await.unwrap();

        assert_eq!(store.len().await, 2);
    }
}
