//! Stock availability models
//!
//! Stock rows never carry a mutable balance. Availability is always
//! initial minus everything that references the row, computed at read time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of stock a workshop holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockKind {
    Coil,
    Circle,
    Patta,
    Pl,
    Scrap,
}

impl StockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockKind::Coil => "coil",
            StockKind::Circle => "circle",
            StockKind::Patta => "patta",
            StockKind::Pl => "pl",
            StockKind::Scrap => "scrap",
        }
    }

    /// Whether this stock is counted in pieces as well as weight
    pub fn tracks_pieces(&self) -> bool {
        matches!(self, StockKind::Circle | StockKind::Pl)
    }
}

/// Availability snapshot for a single stock row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub initial_qty: i64,
    pub initial_weight_kg: Decimal,
    pub consumed_qty: i64,
    pub consumed_weight_kg: Decimal,
}

impl Availability {
    pub fn available_qty(&self) -> i64 {
        self.initial_qty - self.consumed_qty
    }

    pub fn available_weight_kg(&self) -> Decimal {
        self.initial_weight_kg - self.consumed_weight_kg
    }

    pub fn can_supply(&self, qty: i64, weight_kg: Decimal) -> bool {
        qty <= self.available_qty() && weight_kg <= self.available_weight_kg()
    }

    pub fn is_exhausted(&self) -> bool {
        self.available_weight_kg() <= Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_after_sales() {
        let stock = Availability {
            initial_qty: 120,
            initial_weight_kg: Decimal::from(600),
            consumed_qty: 20,
            consumed_weight_kg: Decimal::from(100),
        };
        assert_eq!(stock.available_qty(), 100);
        assert_eq!(stock.available_weight_kg(), Decimal::from(500));
        assert!(stock.can_supply(100, Decimal::from(500)));
        assert!(!stock.can_supply(101, Decimal::from(10)));
        assert!(!stock.is_exhausted());
    }
}
