//! HTTP handlers for the Breastmilk Processing Operations Platform

pub mod customer;
pub mod dashboard;
pub mod health;
pub mod machine_run;
pub mod order;

pub use customer::*;
pub use dashboard::*;
pub use health::*;
pub use machine_run::*;
pub use order::*;
