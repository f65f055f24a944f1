//! HTTP handlers

pub mod gauges;
pub mod health;
pub mod sites;

pub use gauges::{get_primary_latest, list_all_gauges};
pub use health::health_check;
pub use sites::list_sites;
