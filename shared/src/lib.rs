//! Shared types and models for the River Gauge backend
//!
//! This crate contains the gauge domain types shared between the backend
//! and any client that consumes its JSON contract.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
