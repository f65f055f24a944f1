//! Domain models for the River Gauge backend

mod gauge;
mod site;
mod status;

pub use gauge::*;
pub use site::*;
pub use status::*;
