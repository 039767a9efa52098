//! Delivery service
//!
//! Dashboard operations on top of the delivery record store: status changes,
//! counters, search and building a courier's route from its active deliveries.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::defaults::DEFAULT_RECENT_LIMIT;
use crate::error::StoreError;
use crate::services::sequencer::build_route;
use crate::services::store::RecordStore;
use crate::types::{
    Delivery, DeliveryPatch, DeliveryStats, DeliveryStatus, NewDelivery, Route, Stop,
};

pub struct DeliveryService {
    store: Arc<dyn RecordStore<Delivery>>,
}

impl DeliveryService {
    pub fn new(store: Arc<dyn RecordStore<Delivery>>) -> Self {
        Self { store }
    }

    pub async fn all(&self) -> Result<Vec<Delivery>, StoreError> {
        self.store.get_all().await
    }

    pub async fn get(&self, id: i64) -> Result<Delivery, StoreError> {
        self.store.get_by_id(id).await
    }

    pub async fn create(&self, draft: NewDelivery) -> Result<Delivery, StoreError> {
        let delivery = self.store.create(draft).await?;
        info!("Created delivery {} ({})", delivery.order_number, delivery.id);
        Ok(delivery)
    }

    pub async fn update(&self, id: i64, patch: DeliveryPatch) -> Result<Delivery, StoreError> {
        self.store.update(id, patch).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let removed = self.store.delete(id).await?;
        if removed {
            info!("Deleted delivery {}", id);
        }
        Ok(removed)
    }

    /// Set the status; entering `delivered` stamps the delivery time
    pub async fn update_status(
        &self,
        id: i64,
        status: DeliveryStatus,
    ) -> Result<Delivery, StoreError> {
        let actual_delivery = (status == DeliveryStatus::Delivered).then(Utc::now);
        let delivery = self
            .store
            .update(
                id,
                DeliveryPatch {
                    status: Some(status),
                    actual_delivery,
                    ..Default::default()
                },
            )
            .await?;
        debug!("Delivery {} is now {}", id, status.as_str());
        Ok(delivery)
    }

    /// One click in the status column
    pub async fn advance_status(&self, id: i64) -> Result<Delivery, StoreError> {
        let current = self.store.get_by_id(id).await?;
        self.update_status(id, current.status.next()).await
    }

    /// Newest first
    pub async fn recent(&self, limit: Option<usize>) -> Result<Vec<Delivery>, StoreError> {
        let mut deliveries = self.store.get_all().await?;
        deliveries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        deliveries.truncate(limit.unwrap_or(DEFAULT_RECENT_LIMIT));
        Ok(deliveries)
    }

    pub async fn stats(&self, today: NaiveDate) -> Result<DeliveryStats, StoreError> {
        let deliveries = self.store.get_all().await?;
        Ok(compute_stats(&deliveries, today))
    }

    /// Case-insensitive match on order number, recipient, street and status
    pub async fn search(&self, query: &str) -> Result<Vec<Delivery>, StoreError> {
        let needle = query.trim().to_lowercase();
        let deliveries = self.store.get_all().await?;
        if needle.is_empty() {
            return Ok(deliveries);
        }

        Ok(deliveries
            .into_iter()
            .filter(|d| {
                [
                    d.order_number.as_str(),
                    d.delivery_address.name.as_str(),
                    d.delivery_address.street.as_str(),
                    d.status.as_str(),
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect())
    }

    pub async fn filter_by_status(
        &self,
        status: DeliveryStatus,
    ) -> Result<Vec<Delivery>, StoreError> {
        let deliveries = self.store.get_all().await?;
        Ok(deliveries.into_iter().filter(|d| d.status == status).collect())
    }

    /// Route over the courier's assigned and in-transit deliveries, earliest
    /// estimated delivery first
    pub async fn route_for_courier(&self, courier_id: i64) -> Result<Route, StoreError> {
        let mut active: Vec<Delivery> = self
            .store
            .get_all()
            .await?
            .into_iter()
            .filter(|d| d.courier_id == Some(courier_id) && d.status.is_active())
            .collect();
        active.sort_by(natural_order);

        let stops: Vec<Stop> = active.iter().filter_map(stop_for).collect();
        let route = build_route(courier_id, stops);
        info!(
            "Route for courier {}: {} stops, {:.1} km",
            courier_id,
            route.len(),
            route.total_distance_km
        );
        Ok(route)
    }
}

/// Known estimated delivery times first, ascending; then id
fn natural_order(a: &Delivery, b: &Delivery) -> Ordering {
    match (a.estimated_delivery, b.estimated_delivery) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then(a.id.cmp(&b.id))
}

fn stop_for(delivery: &Delivery) -> Option<Stop> {
    let (Some(pickup), Some(dropoff)) = (
        delivery.pickup_address.coordinates,
        delivery.delivery_address.coordinates,
    ) else {
        warn!(
            "Delivery {} has no coordinates, leaving it off the route",
            delivery.order_number
        );
        return None;
    };

    Some(Stop {
        id: delivery.id,
        pickup,
        dropoff,
        sequence: 0,
        package_weight: delivery.package.weight,
        status: delivery.status,
    })
}

fn compute_stats(deliveries: &[Delivery], today: NaiveDate) -> DeliveryStats {
    let count = |status: DeliveryStatus| deliveries.iter().filter(|d| d.status == status).count();

    let delivered = count(DeliveryStatus::Delivered);
    let completed_today = deliveries
        .iter()
        .filter(|d| d.status == DeliveryStatus::Delivered)
        .filter(|d| d.actual_delivery.map(|at| at.date_naive()) == Some(today))
        .count();
    let success_rate =
        ((delivered as f64 / deliveries.len().max(1) as f64) * 100.0).round() as u32;

    DeliveryStats {
        active_deliveries: count(DeliveryStatus::Assigned) + count(DeliveryStatus::InTransit),
        completed_today,
        pending_pickups: count(DeliveryStatus::Pending),
        success_rate,
    }
}
