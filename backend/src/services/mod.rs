//! Business logic services for the Steelworks workshop platform

pub mod coil;
pub mod order;
pub mod production;
pub mod reporting;
pub mod sale;
pub mod stock;

pub use coil::CoilService;
pub use order::OrderService;
pub use production::ProductionService;
pub use reporting::ReportingService;
pub use sale::SaleService;
pub use stock::StockService;
