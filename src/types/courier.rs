//! Courier types

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Location;
use crate::defaults::DEFAULT_COURIER_RATING;
use crate::services::store::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourierStatus {
    #[default]
    Available,
    Busy,
    Offline,
}

/// Courier entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Courier {
    #[serde(rename = "Id")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub vehicle_type: String,
    pub status: CourierStatus,
    #[serde(default)]
    pub active_deliveries: u32,
    #[serde(default)]
    pub completed_deliveries: u32,
    pub rating: f64,
    pub joined_date: NaiveDate,
    #[serde(default)]
    pub current_location: Option<Location>,
}

/// Request to add a courier to the fleet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourier {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub vehicle_type: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourierPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub vehicle_type: Option<String>,
    pub status: Option<CourierStatus>,
    pub active_deliveries: Option<u32>,
    pub completed_deliveries: Option<u32>,
    pub rating: Option<f64>,
    pub current_location: Option<Location>,
}

impl Record for Courier {
    type Draft = NewCourier;
    type Patch = CourierPatch;

    const KIND: &'static str = "Courier";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_draft(id: i64, draft: NewCourier) -> Self {
        Self {
            id,
            name: draft.name,
            phone: draft.phone,
            vehicle_type: draft.vehicle_type,
            status: CourierStatus::Available,
            active_deliveries: 0,
            completed_deliveries: 0,
            rating: DEFAULT_COURIER_RATING,
            joined_date: Utc::now().date_naive(),
            current_location: None,
        }
    }

    fn apply(&mut self, patch: CourierPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(phone) = patch.phone {
            self.phone = Some(phone);
        }
        if let Some(vehicle_type) = patch.vehicle_type {
            self.vehicle_type = vehicle_type;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(active) = patch.active_deliveries {
            self.active_deliveries = active;
        }
        if let Some(completed) = patch.completed_deliveries {
            self.completed_deliveries = completed;
        }
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
        if let Some(location) = patch.current_location {
            self.current_location = Some(location);
        }
    }
}

/// Fleet counters
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourierStats {
    pub total: usize,
    pub available: usize,
    pub busy: usize,
    pub offline: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_courier_defaults() {
        let courier = Courier::from_draft(
            9,
            NewCourier {
                name: "Ada Lovelace".into(),
                phone: None,
                vehicle_type: "bike".into(),
            },
        );

        assert_eq!(courier.status, CourierStatus::Available);
        assert_eq!(courier.active_deliveries, 0);
        assert_eq!(courier.rating, 5.0);
        assert!(courier.current_location.is_none());
    }

    #[test]
    fn test_courier_deserializes_mock_shape() {
        let json = r#"{
            "Id": 2,
            "name": "Sam Carter",
            "vehicleType": "van",
            "status": "busy",
            "activeDeliveries": 3,
            "rating": 4.7,
            "joinedDate": "2024-05-01"
        }"#;
        let courier: Courier = serde_json::from_str(json).unwrap();
        assert_eq!(courier.id, 2);
        assert_eq!(courier.status, CourierStatus::Busy);
        assert_eq!(courier.completed_deliveries, 0);
    }
}
