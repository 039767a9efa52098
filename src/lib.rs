//! Courier dispatch: delivery import, courier fleet and route planning

pub mod config;
pub mod defaults;
pub mod error;
pub mod services;
pub mod types;
