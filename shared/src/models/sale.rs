//! Sale models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::StockKind;

/// Product line a sale belongs to; each has its own table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleKind {
    Circle,
    Coil,
    Scrap,
    Pl,
}

impl SaleKind {
    pub const ALL: [SaleKind; 4] = [SaleKind::Circle, SaleKind::Coil, SaleKind::Scrap, SaleKind::Pl];

    pub fn as_str(&self) -> &'static str {
        match self {
            SaleKind::Circle => "circle",
            SaleKind::Coil => "coil",
            SaleKind::Scrap => "scrap",
            SaleKind::Pl => "pl",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            SaleKind::Circle => "circle_sales",
            SaleKind::Coil => "coil_sales",
            SaleKind::Scrap => "scrap_sales",
            SaleKind::Pl => "pl_sales",
        }
    }

    /// Column referencing the stock row sold from, if the kind has one
    pub fn source_column(&self) -> Option<&'static str> {
        match self {
            SaleKind::Circle => Some("circle_stock_id"),
            SaleKind::Coil => Some("coil_id"),
            SaleKind::Scrap => None,
            SaleKind::Pl => Some("pl_stock_id"),
        }
    }

    pub fn stock_kind(&self) -> StockKind {
        match self {
            SaleKind::Circle => StockKind::Circle,
            SaleKind::Coil => StockKind::Coil,
            SaleKind::Scrap => StockKind::Scrap,
            SaleKind::Pl => StockKind::Pl,
        }
    }
}

impl std::fmt::Display for SaleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaleKind::Circle => write!(f, "Circle sale"),
            SaleKind::Coil => write!(f, "Coil sale"),
            SaleKind::Scrap => write!(f, "Scrap sale"),
            SaleKind::Pl => write!(f, "PL sale"),
        }
    }
}

/// Invoice amount for a sale, rounded to paise
pub fn sale_amount(sold_weight_kg: Decimal, rate_per_kg: Decimal) -> Decimal {
    (sold_weight_kg * rate_per_kg).round_dp(2)
}

/// Gross margin as a percentage of revenue; zero when nothing was sold
pub fn margin_percent(revenue: Decimal, cost: Decimal) -> Decimal {
    if revenue.is_zero() {
        Decimal::ZERO
    } else {
        ((revenue - cost) / revenue * Decimal::ONE_HUNDRED).round_dp(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_distinct_table() {
        let mut tables: Vec<_> = SaleKind::ALL.iter().map(|k| k.table()).collect();
        tables.sort();
        tables.dedup();
        assert_eq!(tables.len(), SaleKind::ALL.len());
    }

    #[test]
    fn scrap_has_no_source_row() {
        assert_eq!(SaleKind::Scrap.source_column(), None);
        assert_eq!(SaleKind::Circle.source_column(), Some("circle_stock_id"));
    }

    #[test]
    fn margin() {
        assert_eq!(margin_percent(Decimal::from(200), Decimal::from(150)), Decimal::from(25));
        assert_eq!(margin_percent(Decimal::ZERO, Decimal::from(150)), Decimal::ZERO);
    }
}
