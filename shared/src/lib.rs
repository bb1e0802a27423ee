//! Shared types and models for the Steelworks workshop platform
//!
//! This crate holds the domain vocabulary and the pure business rules
//! (order status derivation, yield math, stock availability) used by the
//! backend and its tests.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
