//! Business logic services

pub mod cancellation;
pub mod couriers;
pub mod deliveries;
pub mod geo;
pub mod import_processor;
pub mod progress;
pub mod sequencer;
pub mod store;
pub mod template;
