//! Stock and sales tests
//!
//! Tests for derived stock availability including:
//! - Availability after runs and sales
//! - Piece tracking per stock kind
//! - Sale amounts and margins

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{margin_percent, purchase_cost, sale_amount, Availability, SaleKind, StockKind};
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_circle_stock_availability() {
        let stock = Availability {
            initial_qty: 640,
            initial_weight_kg: dec("780"),
            consumed_qty: 200,
            consumed_weight_kg: dec("243.75"),
        };

        assert_eq!(stock.available_qty(), 440);
        assert_eq!(stock.available_weight_kg(), dec("536.25"));
        assert!(stock.can_supply(440, dec("536.25")));
        assert!(!stock.can_supply(441, dec("10")));
        assert!(!stock.can_supply(1, dec("536.26")));
    }

    #[test]
    fn test_exhausted_coil() {
        let coil = Availability {
            initial_weight_kg: dec("5000"),
            consumed_weight_kg: dec("5000"),
            ..Default::default()
        };

        assert!(coil.is_exhausted());
        assert!(!coil.can_supply(0, dec("0.001")));
    }

    /// Undoing a sale restores exactly what it took
    #[test]
    fn test_undo_restores_availability() {
        let before = Availability {
            initial_qty: 100,
            initial_weight_kg: dec("120"),
            consumed_qty: 30,
            consumed_weight_kg: dec("36"),
        };
        let after_undo = Availability {
            consumed_qty: before.consumed_qty - 10,
            consumed_weight_kg: before.consumed_weight_kg - dec("12"),
            ..before
        };

        assert_eq!(after_undo.available_qty() - before.available_qty(), 10);
        assert_eq!(after_undo.available_weight_kg() - before.available_weight_kg(), dec("12"));
    }

    #[test]
    fn test_piece_tracking_by_kind() {
        assert!(StockKind::Circle.tracks_pieces());
        assert!(StockKind::Pl.tracks_pieces());
        assert!(!StockKind::Coil.tracks_pieces());
        assert!(!StockKind::Patta.tracks_pieces());
        assert!(!StockKind::Scrap.tracks_pieces());
    }

    #[test]
    fn test_sale_kind_tables() {
        let tables: Vec<&str> = SaleKind::ALL.iter().map(|k| k.table()).collect();
        assert_eq!(tables, ["circle_sales", "coil_sales", "scrap_sales", "pl_sales"]);
        assert_eq!(SaleKind::Scrap.source_column(), None);
        assert_eq!(SaleKind::Coil.source_column(), Some("coil_id"));
        assert_eq!(SaleKind::Pl.stock_kind(), StockKind::Pl);
    }

    #[test]
    fn test_sale_amount_rounding() {
        assert_eq!(sale_amount(dec("145.555"), dec("82.40")), dec("11993.73"));
        assert_eq!(sale_amount(dec("40"), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_margin() {
        let cost = purchase_cost(dec("1000"), dec("60"));
        assert_eq!(margin_percent(dec("75000"), cost), dec("20"));
        assert_eq!(margin_percent(dec("50000"), cost), dec("-20"));
        assert_eq!(margin_percent(Decimal::ZERO, cost), Decimal::ZERO);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Whatever can be supplied leaves non-negative stock behind
        #[test]
        fn prop_supply_never_oversells(
            initial_qty in 0i64..10_000,
            initial_grams in 1i64..10_000_000,
            qty in 0i64..10_000,
            grams in 1i64..10_000_000,
        ) {
            let stock = Availability {
                initial_qty,
                initial_weight_kg: Decimal::new(initial_grams, 3),
                consumed_qty: 0,
                consumed_weight_kg: Decimal::ZERO,
            };
            let weight = Decimal::new(grams, 3);

            if stock.can_supply(qty, weight) {
                let after = Availability {
                    consumed_qty: qty,
                    consumed_weight_kg: weight,
                    ..stock
                };
                prop_assert!(after.available_qty() >= 0);
                prop_assert!(after.available_weight_kg() >= Decimal::ZERO);
            } else {
                prop_assert!(qty > initial_qty || weight > stock.initial_weight_kg);
            }
        }

        /// Sale amount has at most two decimal places
        #[test]
        fn prop_sale_amount_in_paise(grams in 1i64..10_000_000, paise in 0i64..100_000) {
            let amount = sale_amount(Decimal::new(grams, 3), Decimal::new(paise, 2));
            prop_assert!(amount.scale() <= 2);
            prop_assert!(amount >= Decimal::ZERO);
        }
    }
}
