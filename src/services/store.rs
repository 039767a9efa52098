//! Record store abstraction
//!
//! The record store is the only persistence boundary. Deliveries and couriers
//! go through the `RecordStore` trait; `InMemoryStore` backs the CLI and the
//! tests and can be seeded from a JSON array, like the dashboard's mock data.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::StoreError;

/// A record with a caller-visible integer identity
pub trait Record: Clone + Send + Sync + 'static {
    /// Fields supplied on creation
    type Draft: Send + 'static;
    /// Partial update
    type Patch: Send + 'static;

    /// Name used in error messages
    const KIND: &'static str;

    fn id(&self) -> i64;

    /// Build the stored record once the store has picked an id
    fn from_draft(id: i64, draft: Self::Draft) -> Self;

    fn apply(&mut self, patch: Self::Patch);
}

/// CRUD boundary for one record type
#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    async fn create(&self, draft: R::Draft) -> Result<R, StoreError>;

    async fn update(&self, id: i64, patch: R::Patch) -> Result<R, StoreError>;

    /// All records in insertion order
    async fn get_all(&self) -> Result<Vec<R>, StoreError>;

    async fn get_by_id(&self, id: i64) -> Result<R, StoreError>;

    /// Returns false when there was nothing to delete
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;

    /// Get store name for logging
    fn name(&self) -> &str;
}

struct Inner<R> {
    records: HashMap<i64, R>,
    /// Insertion order of ids
    order: Vec<i64>,
    next_id: i64,
}

/// Map-backed store with optional simulated latency
pub struct InMemoryStore<R> {
    inner: RwLock<Inner<R>>,
    latency: Duration,
}

impl<R: Record> Default for InMemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> InMemoryStore<R> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Seed the store. Later duplicates of an id replace earlier ones.
    pub fn with_records(records: Vec<R>) -> Self {
        let mut map = HashMap::with_capacity(records.len());
        let mut order = Vec::with_capacity(records.len());
        for record in records {
            let id = record.id();
            if map.insert(id, record).is_none() {
                order.push(id);
            }
        }
        let next_id = order.iter().copied().max().unwrap_or(0) + 1;

        Self {
            inner: RwLock::new(Inner { records: map, order, next_id }),
            latency: Duration::ZERO,
        }
    }

    /// Sleep this long before every call, like a remote API would
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn not_found(id: i64) -> StoreError {
        StoreError::NotFound { kind: R::KIND, id }
    }
}

impl<R: Record + DeserializeOwned> InMemoryStore<R> {
    /// Seed from a JSON array file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file {}", path.display()))?;
        let records: Vec<R> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse seed file {}", path.display()))?;
        debug!("Seeded {} {} records from {}", records.len(), R::KIND, path.display());
        Ok(Self::with_records(records))
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for InMemoryStore<R> {
    async fn create(&self, draft: R::Draft) -> Result<R, StoreError> {
        self.simulate_latency().await;

        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id += 1;

        let record = R::from_draft(id, draft);
        inner.records.insert(id, record.clone());
        inner.order.push(id);
        Ok(record)
    }

    async fn update(&self, id: i64, patch: R::Patch) -> Result<R, StoreError> {
        self.simulate_latency().await;

        let mut inner = self.inner.write();
        let record = inner.records.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        record.apply(patch);
        Ok(record.clone())
    }

    async fn get_all(&self) -> Result<Vec<R>, StoreError> {
        self.simulate_latency().await;

        let inner = self.inner.read();
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.records.get(id).cloned())
            .collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<R, StoreError> {
        self.simulate_latency().await;

        self.inner
            .read()
            .records
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        self.simulate_latency().await;

        let mut inner = self.inner.write();
        if inner.records.remove(&id).is_none() {
            return Ok(false);
        }
        inner.order.retain(|&existing| existing != id);
        Ok(true)
    }

    fn name(&self) -> &str {
        "InMemory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Courier, CourierPatch, CourierStatus, NewCourier};
    use tokio_test::{assert_err, assert_ok};

    fn draft(name: &str) -> NewCourier {
        NewCourier {
            name: name.to_string(),
            phone: None,
            vehicle_type: "bike".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let store: InMemoryStore<Courier> = InMemoryStore::new();

        let first = assert_ok!(store.create(draft("Ana")).await);
        let second = assert_ok!(store.create(draft("Ben")).await);

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_seeded_store_continues_after_max_id() {
        let seed = vec![
            Courier::from_draft(4, draft("Ana")),
            Courier::from_draft(9, draft("Ben")),
        ];
        let store = InMemoryStore::with_records(seed);

        let created = store.create(draft("Cleo")).await.unwrap();
        assert_eq!(created.id, 10);
    }

    #[tokio::test]
    async fn test_get_all_keeps_insertion_order() {
        let seed = vec![
            Courier::from_draft(9, draft("Ana")),
            Courier::from_draft(2, draft("Ben")),
        ];
        let store = InMemoryStore::with_records(seed);
        store.create(draft("Cleo")).await.unwrap();

        let ids: Vec<i64> = store.get_all().await.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![9, 2, 10]);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let store: InMemoryStore<Courier> = InMemoryStore::new();
        let err = assert_err!(store.get_by_id(42).await);
        assert_eq!(err, StoreError::NotFound { kind: "Courier", id: 42 });
    }

    #[tokio::test]
    async fn test_update_applies_patch() {
        let store: InMemoryStore<Courier> = InMemoryStore::new();
        let courier = store.create(draft("Ana")).await.unwrap();

        let updated = store
            .update(
                courier.id,
                CourierPatch {
                    status: Some(CourierStatus::Busy),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status, CourierStatus::Busy);
        assert_eq!(store.get_by_id(courier.id).await.unwrap().status, CourierStatus::Busy);
    }

    #[tokio::test]
    async fn test_update_missing_record() {
        let store: InMemoryStore<Courier> = InMemoryStore::new();
        assert_err!(store.update(3, CourierPatch::default()).await);
    }

    #[tokio::test]
    async fn test_delete_reports_whether_removed() {
        let store: InMemoryStore<Courier> = InMemoryStore::new();
        let courier = store.create(draft("Ana")).await.unwrap();

        assert!(store.delete(courier.id).await.unwrap());
        assert!(!store.delete(courier.id).await.unwrap());
        assert!(store.is_empty());
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let store: InMemoryStore<Courier> = InMemoryStore::new();
        let first = store.create(draft("Ana")).await.unwrap();
        store.delete(first.id).await.unwrap();

        let second = store.create(draft("Ben")).await.unwrap();
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_latency_is_simulated() {
        let store: InMemoryStore<Courier> =
            InMemoryStore::new().with_latency(Duration::from_millis(30));

        let started = std::time::Instant::now();
        store.get_all().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_from_json_file() {
        let path = std::env::temp_dir().join(format!("couriers-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"[{"Id": 3, "name": "Ana", "vehicleType": "van", "status": "offline",
                 "rating": 4.9, "joinedDate": "2023-01-10"}]"#,
        )
        .unwrap();

        let store: InMemoryStore<Courier> = InMemoryStore::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_from_json_file_missing() {
        let result = InMemoryStore::<Courier>::from_json_file(Path::new("/nonexistent/seed.json"));
        assert!(result.is_err());
    }
}
