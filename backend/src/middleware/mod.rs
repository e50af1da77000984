//! Request middleware for the Breastmilk Processing Operations Platform

pub mod tenant;

pub use tenant::{tenant_middleware, TenantContext};
