//! Delivery types

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::Coordinates;
use crate::defaults::{DEFAULT_PACKAGE_TYPE, DEFAULT_PACKAGE_WEIGHT_KG};
use crate::services::store::Record;

/// Delivery lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryStatus {
    #[default]
    Pending,
    Assigned,
    InTransit,
    Delivered,
    Failed,
}

impl DeliveryStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Assigned => "assigned",
            DeliveryStatus::InTransit => "in-transit",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Failed => "failed",
        }
    }

    /// Next status in the dispatcher's one-click cycle.
    /// Failed deliveries go back to pending.
    pub const fn next(self) -> Self {
        match self {
            DeliveryStatus::Pending => DeliveryStatus::Assigned,
            DeliveryStatus::Assigned => DeliveryStatus::InTransit,
            DeliveryStatus::InTransit => DeliveryStatus::Delivered,
            DeliveryStatus::Delivered | DeliveryStatus::Failed => DeliveryStatus::Pending,
        }
    }

    /// Assigned or on the road
    pub const fn is_active(self) -> bool {
        matches!(self, DeliveryStatus::Assigned | DeliveryStatus::InTransit)
    }
}

/// Postal address with optional coordinates
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub name: String,
    pub street: String,
    pub city: String,
    pub postcode: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub weight: f64,
    #[serde(default)]
    pub dimensions: Option<String>,
    #[serde(rename = "type")]
    pub package_type: String,
}

impl Default for Package {
    fn default() -> Self {
        Self {
            weight: DEFAULT_PACKAGE_WEIGHT_KG,
            dimensions: None,
            package_type: DEFAULT_PACKAGE_TYPE.to_string(),
        }
    }
}

/// Delivery entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    #[serde(rename = "Id")]
    pub id: i64,
    pub order_number: String,
    pub status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub estimated_delivery: Option<DateTime<Utc>>,
    #[serde(default)]
    pub actual_delivery: Option<DateTime<Utc>>,
    #[serde(default, rename = "courier")]
    pub courier_id: Option<i64>,
    pub pickup_address: Address,
    pub delivery_address: Address,
    #[serde(default)]
    pub package: Package,
}

/// Request to create a delivery
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDelivery {
    pub pickup_address: Address,
    pub delivery_address: Address,
    pub package: Package,
    #[serde(default)]
    pub status: Option<DeliveryStatus>,
    #[serde(default)]
    pub courier_id: Option<i64>,
    #[serde(default)]
    pub estimated_delivery: Option<DateTime<Utc>>,
}

/// Partial update; `None` leaves the field as is
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPatch {
    pub status: Option<DeliveryStatus>,
    pub courier_id: Option<i64>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub actual_delivery: Option<DateTime<Utc>>,
    pub pickup_address: Option<Address>,
    pub delivery_address: Option<Address>,
    pub package: Option<Package>,
}

/// Order numbers look like `SP2026007`
pub fn order_number(id: i64, created_at: DateTime<Utc>) -> String {
    format!("SP{}{:03}", created_at.year(), id)
}

impl Record for Delivery {
    type Draft = NewDelivery;
    type Patch = DeliveryPatch;

    const KIND: &'static str = "Delivery";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_draft(id: i64, draft: NewDelivery) -> Self {
        let created_at = Utc::now();
        Self {
            id,
            order_number: order_number(id, created_at),
            status: draft.status.unwrap_or_default(),
            created_at,
            estimated_delivery: draft.estimated_delivery,
            actual_delivery: None,
            courier_id: draft.courier_id,
            pickup_address: draft.pickup_address,
            delivery_address: draft.delivery_address,
            package: draft.package,
        }
    }

    fn apply(&mut self, patch: DeliveryPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(courier_id) = patch.courier_id {
            self.courier_id = Some(courier_id);
        }
        if let Some(eta) = patch.estimated_delivery {
            self.estimated_delivery = Some(eta);
        }
        if let Some(delivered_at) = patch.actual_delivery {
            self.actual_delivery = Some(delivered_at);
        }
        if let Some(address) = patch.pickup_address {
            self.pickup_address = address;
        }
        if let Some(address) = patch.delivery_address {
            self.delivery_address = address;
        }
        if let Some(package) = patch.package {
            self.package = package;
        }
    }
}

/// Dashboard counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryStats {
    pub active_deliveries: usize,
    pub completed_today: usize,
    pub pending_pickups: usize,
    /// Percentage of delivered records, 0-100
    pub success_rate: u32,
}
