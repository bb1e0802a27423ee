//! Domain models for the Steelworks workshop platform

mod coil;
mod order;
mod production;
mod sale;
mod stock;

pub use coil::*;
pub use order::*;
pub use production::*;
pub use sale::*;
pub use stock::*;
