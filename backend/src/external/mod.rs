//! External API integrations

pub mod usgs;

pub use usgs::UsgsClient;
