//! Domain models for the Breastmilk Processing Operations Platform

mod customer;
mod machine_run;
mod order;

pub use customer::*;
pub use machine_run::*;
pub use order::*;
