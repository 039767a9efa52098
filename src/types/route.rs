//! Route types

use serde::{Deserialize, Serialize};

use super::{Coordinates, DeliveryStatus};
use crate::defaults::{
    MANUAL_MINUTES_PER_STOP, NATURAL_MINUTES_PER_STOP, OPTIMIZED_MINUTES_PER_STOP,
};
use crate::services::geo::haversine_distance;

/// How the current stop order came about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingMode {
    /// As loaded, e.g. by estimated delivery time
    #[default]
    Natural,
    /// Reordered by hand
    Manual,
    Optimized,
}

impl OrderingMode {
    pub const fn minutes_per_stop(self) -> u32 {
        match self {
            OrderingMode::Natural => NATURAL_MINUTES_PER_STOP,
            OrderingMode::Manual => MANUAL_MINUTES_PER_STOP,
            OrderingMode::Optimized => OPTIMIZED_MINUTES_PER_STOP,
        }
    }
}

/// A delivery waiting to be visited by a courier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    #[serde(rename = "Id")]
    pub id: i64,
    pub pickup: Coordinates,
    pub dropoff: Coordinates,
    /// 1-based position in the route, assigned by the sequencer
    pub sequence: u32,
    pub package_weight: f64,
    pub status: DeliveryStatus,
}

impl Stop {
    /// Pickup to dropoff, km
    pub fn distance_km(&self) -> f64 {
        haversine_distance(&self.pickup, &self.dropoff)
    }
}

/// A courier's stops in visitation order plus derived metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub courier_id: i64,
    pub stops: Vec<Stop>,
    pub mode: OrderingMode,
    pub total_distance_km: f64,
    pub estimated_total_minutes: u32,
    pub time_saved_minutes: u32,
}

impl Route {
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Stop ids in visitation order
    pub fn stop_ids(&self) -> Vec<i64> {
        self.stops.iter().map(|s| s.id).collect()
    }
}
