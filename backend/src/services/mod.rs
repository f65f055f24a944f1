//! Business logic services for the River Gauge backend

pub mod gauge;

pub use gauge::{GaugeService, SiteSnapshot};
