//! Fallback values used when a record or a CSV row leaves a field out

pub const DEFAULT_PACKAGE_TYPE: &str = "General";
pub const DEFAULT_PACKAGE_WEIGHT_KG: f64 = 1.0;

pub const DEFAULT_PICKUP_NAME: &str = "Main Warehouse";
pub const DEFAULT_PICKUP_STREET: &str = "1 Depot Road";
pub const DEFAULT_PICKUP_CITY: &str = "London";
pub const DEFAULT_PICKUP_POSTCODE: &str = "E1 6AN";

pub const DEFAULT_COURIER_RATING: f64 = 5.0;
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Minutes per stop for each ordering mode
pub const NATURAL_MINUTES_PER_STOP: u32 = 15;
pub const MANUAL_MINUTES_PER_STOP: u32 = 13;
pub const OPTIMIZED_MINUTES_PER_STOP: u32 = 12;

/// Failed rows kept in an import summary
pub const MAX_REPORTED_IMPORT_ERRORS: usize = 10;
