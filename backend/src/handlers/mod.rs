//! HTTP handlers for the Steelworks workshop platform

pub mod coil;
pub mod health;
pub mod order;
pub mod production;
pub mod reporting;
pub mod sale;
pub mod stock;

pub use coil::*;
pub use health::*;
pub use order::*;
pub use production::*;
pub use reporting::*;
pub use sale::*;
pub use stock::*;
