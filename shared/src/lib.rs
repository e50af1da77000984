//! Shared types, models and calculations for the Breastmilk Processing Operations Platform
//!
//! This crate contains the machine-run calculation core and the records
//! shared between the backend and the browser dashboard (via WASM).

pub mod calculations;
pub mod models;
pub mod types;
pub mod validation;

pub use calculations::*;
pub use models::*;
pub use types::*;
pub use validation::*;
