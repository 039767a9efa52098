//! Courier fleet service

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::StoreError;
use crate::services::store::RecordStore;
use crate::types::{Courier, CourierPatch, CourierStats, CourierStatus, Location, NewCourier};

pub struct CourierService {
    store: Arc<dyn RecordStore<Courier>>,
}

impl CourierService {
    pub fn new(store: Arc<dyn RecordStore<Courier>>) -> Self {
        Self { store }
    }

    pub async fn all(&self) -> Result<Vec<Courier>, StoreError> {
        self.store.get_all().await
    }

    pub async fn get(&self, id: i64) -> Result<Courier, StoreError> {
        self.store.get_by_id(id).await
    }

    pub async fn create(&self, draft: NewCourier) -> Result<Courier, StoreError> {
        let courier = self.store.create(draft).await?;
        info!("Added courier {} ({})", courier.name, courier.id);
        Ok(courier)
    }

    pub async fn update(&self, id: i64, patch: CourierPatch) -> Result<Courier, StoreError> {
        self.store.update(id, patch).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let removed = self.store.delete(id).await?;
        if removed {
            info!("Removed courier {}", id);
        }
        Ok(removed)
    }

    pub async fn available(&self) -> Result<Vec<Courier>, StoreError> {
        let couriers = self.store.get_all().await?;
        Ok(couriers
            .into_iter()
            .filter(|c| c.status == CourierStatus::Available)
            .collect())
    }

    pub async fn update_location(&self, id: i64, location: Location) -> Result<Courier, StoreError> {
        debug!(
            "Courier {} at {:.5},{:.5}",
            id, location.coordinates.lat, location.coordinates.lng
        );
        self.store
            .update(
                id,
                CourierPatch {
                    current_location: Some(location),
                    ..Default::default()
                },
            )
            .await
    }

    pub async fn stats(&self) -> Result<CourierStats, StoreError> {
        let couriers = self.store.get_all().await?;
        let mut stats = CourierStats {
            total: couriers.len(),
            ..Default::default()
        };
        for courier in &couriers {
            match courier.status {
                CourierStatus::Available => stats.available += 1,
                CourierStatus::Busy => stats.busy += 1,
                CourierStatus::Offline => stats.offline += 1,
            }
        }
        Ok(stats)
    }

    /// Case-insensitive match on name and vehicle type
    pub async fn search(&self, query: &str) -> Result<Vec<Courier>, StoreError> {
        let needle = query.trim().to_lowercase();
        let couriers = self.store.get_all().await?;
        if needle.is_empty() {
            return Ok(couriers);
        }

        Ok(couriers
            .into_iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&needle)
                    || c.vehicle_type.to_lowercase().contains(&needle)
            })
            .collect())
    }
}
