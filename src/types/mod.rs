//! Type definitions

pub mod courier;
pub mod delivery;
pub mod import;
pub mod location;
pub mod route;

pub use courier::*;
pub use delivery::*;
pub use import::*;
pub use location::*;
pub use route::*;
