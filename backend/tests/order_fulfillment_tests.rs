//! Order fulfillment tests
//!
//! Tests for order status derivation including:
//! - Status table for weight, quantity and unbounded targets
//! - Either-target semantics for Fulfilled
//! - Remaining weight never negative
//! - Undoing a sale reduces totals by exactly that sale
//! - Cancel and reinstate guards

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    check_cancel, check_linkable, check_uncancel, derive_status, recompute_status, remaining_qty,
    remaining_weight, validate_order_targets, FulfilledTotals, FulfillmentTarget,
    OrderStatus, OrderTransitionError,
};
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn weight_target(kg: &str) -> FulfillmentTarget {
    FulfillmentTarget {
        ordered_qty: None,
        ordered_weight_kg: Some(dec(kg)),
    }
}

fn qty_target(qty: i64) -> FulfillmentTarget {
    FulfillmentTarget {
        ordered_qty: Some(qty),
        ordered_weight_kg: None,
    }
}

/// Linked sales as `(qty, weight_kg)` rows
fn totals_of(sales: &[(i64, Decimal)]) -> FulfilledTotals {
    FulfilledTotals::sum(sales.iter().copied())
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// 100 kg target at 0 / 40 / 100 / 150 kg
    #[test]
    fn test_weight_target_status_table() {
        let target = weight_target("100");
        let cases = [
            ("0", OrderStatus::Pending),
            ("40", OrderStatus::Partial),
            ("100", OrderStatus::Fulfilled),
            ("150", OrderStatus::Fulfilled),
        ];

        for (kg, expected) in cases {
            let totals = FulfilledTotals::new(0, dec(kg));
            assert_eq!(derive_status(&target, &totals), expected, "at {} kg", kg);
        }
    }

    #[test]
    fn test_quantity_target_status_table() {
        let target = qty_target(500);

        assert_eq!(derive_status(&target, &FulfilledTotals::default()), OrderStatus::Pending);
        assert_eq!(
            derive_status(&target, &FulfilledTotals::new(499, dec("300"))),
            OrderStatus::Partial
        );
        assert_eq!(
            derive_status(&target, &FulfilledTotals::new(500, dec("300"))),
            OrderStatus::Fulfilled
        );
    }

    /// Without any target an order never reaches Fulfilled
    #[test]
    fn test_no_target_is_partial_at_most() {
        let target = FulfillmentTarget::default();

        assert_eq!(derive_status(&target, &FulfilledTotals::default()), OrderStatus::Pending);
        assert_eq!(
            derive_status(&target, &FulfilledTotals::new(10_000, dec("99999"))),
            OrderStatus::Partial
        );
    }

    /// Zero targets count as no target
    #[test]
    fn test_zero_targets_are_unbounded() {
        let target = FulfillmentTarget {
            ordered_qty: Some(0),
            ordered_weight_kg: Some(Decimal::ZERO),
        };

        assert!(target.is_unbounded());
        assert_eq!(
            derive_status(&target, &FulfilledTotals::new(1, dec("1"))),
            OrderStatus::Partial
        );
    }

    /// Meeting the weight target alone fulfills an order that also has a qty target
    #[test]
    fn test_either_target_fulfills() {
        let target = FulfillmentTarget {
            ordered_qty: Some(1000),
            ordered_weight_kg: Some(dec("250")),
        };

        assert_eq!(
            derive_status(&target, &FulfilledTotals::new(10, dec("250"))),
            OrderStatus::Fulfilled
        );
        assert_eq!(
            derive_status(&target, &FulfilledTotals::new(1000, dec("1"))),
            OrderStatus::Fulfilled
        );
        assert_eq!(
            derive_status(&target, &FulfilledTotals::new(999, dec("249.999"))),
            OrderStatus::Partial
        );
    }

    /// A cancelled order is left untouched whatever its sales say
    #[test]
    fn test_cancelled_order_is_frozen() {
        let target = weight_target("100");
        let totals = totals_of(&[(0, dec("150"))]);

        assert_eq!(recompute_status(true, &target, &totals), None);
        assert_eq!(recompute_status(false, &target, &totals), Some(OrderStatus::Fulfilled));
    }

    /// Undo of a sale on a fulfilled order drops it back to Partial
    #[test]
    fn test_undo_reopens_order() {
        let target = weight_target("100");
        let mut sales = vec![(0, dec("60")), (0, dec("45"))];
        assert_eq!(
            recompute_status(false, &target, &totals_of(&sales)),
            Some(OrderStatus::Fulfilled)
        );

        sales.pop();
        assert_eq!(
            recompute_status(false, &target, &totals_of(&sales)),
            Some(OrderStatus::Partial)
        );
        assert_eq!(totals_of(&sales).weight_kg, dec("60"));
    }

    #[test]
    fn test_cancelling_twice_is_refused() {
        assert_eq!(check_cancel(false, Some("customer withdrew")), Ok("customer withdrew"));
        assert_eq!(
            check_cancel(true, Some("customer withdrew")),
            Err(OrderTransitionError::AlreadyCancelled)
        );
    }

    /// Missing remarks are reported before the order's state is considered
    #[test]
    fn test_cancel_requires_remarks_first() {
        assert_eq!(check_cancel(false, None), Err(OrderTransitionError::RemarksRequired));
        assert_eq!(check_cancel(true, Some("  ")), Err(OrderTransitionError::RemarksRequired));
    }

    #[test]
    fn test_uncancel_and_link_guards() {
        assert!(check_uncancel(true).is_ok());
        assert_eq!(check_uncancel(false), Err(OrderTransitionError::NotCancelled));
        assert!(check_linkable(false).is_ok());
        assert_eq!(check_linkable(true), Err(OrderTransitionError::LinkToCancelled));
    }

    #[test]
    fn test_remaining_weight_clamps_at_zero() {
        assert_eq!(remaining_weight(Some(dec("100")), dec("40")), dec("60"));
        assert_eq!(remaining_weight(Some(dec("100")), dec("150")), Decimal::ZERO);
        assert_eq!(remaining_weight(None, dec("20")), Decimal::ZERO);
        assert_eq!(remaining_qty(Some(10), 4), 6);
        assert_eq!(remaining_qty(Some(10), 14), 0);
    }

    #[test]
    fn test_status_strings() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::from_str(status.as_str()).unwrap(), status);
        }
        assert_eq!(OrderStatus::from_str("FULFILLED").unwrap(), OrderStatus::Fulfilled);
        assert!(OrderStatus::from_str("shipped").is_err());
    }

    #[test]
    fn test_cancel_remarks_are_trimmed() {
        assert_eq!(check_cancel(false, Some("  customer withdrew ")).unwrap(), "customer withdrew");
    }

    #[test]
    fn test_negative_targets_rejected() {
        assert!(validate_order_targets(Some(-1), None).is_err());
        assert!(validate_order_targets(None, Some(dec("-0.5"))).is_err());
        assert!(validate_order_targets(Some(0), Some(dec("250"))).is_ok());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn arb_weight() -> impl Strategy<Value = Decimal> {
        (0i64..5_000_000).prop_map(|grams| Decimal::new(grams, 3))
    }

    fn arb_sale() -> impl Strategy<Value = (i64, Decimal)> {
        (0i64..1_000, 1i64..2_000_000).prop_map(|(qty, grams)| (qty, Decimal::new(grams, 3)))
    }

    fn arb_target() -> impl Strategy<Value = FulfillmentTarget> {
        (
            proptest::option::of(0i64..5_000),
            proptest::option::of(arb_weight()),
        )
            .prop_map(|(ordered_qty, ordered_weight_kg)| FulfillmentTarget {
                ordered_qty,
                ordered_weight_kg,
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Remaining weight is never negative
        #[test]
        fn prop_remaining_weight_non_negative(
            ordered in proptest::option::of(arb_weight()),
            fulfilled in arb_weight(),
        ) {
            prop_assert!(remaining_weight(ordered, fulfilled) >= Decimal::ZERO);
        }

        /// Recompute never produces Cancelled
        #[test]
        fn prop_recompute_never_cancels(
            target in arb_target(),
            sales in proptest::collection::vec(arb_sale(), 0..10),
        ) {
            let status = recompute_status(false, &target, &totals_of(&sales));
            prop_assert!(status.is_some());
            prop_assert_ne!(status, Some(OrderStatus::Cancelled));
        }

        /// Pending exactly when nothing is linked
        #[test]
        fn prop_pending_iff_no_sales(
            target in arb_target(),
            sales in proptest::collection::vec(arb_sale(), 0..10),
        ) {
            let status = derive_status(&target, &totals_of(&sales));
            prop_assert_eq!(status == OrderStatus::Pending, sales.is_empty());
        }

        /// Undoing a sale reduces totals by exactly that sale
        #[test]
        fn prop_undo_subtracts_exactly(
            sales in proptest::collection::vec(arb_sale(), 1..10),
            index in any::<proptest::sample::Index>(),
        ) {
            let before = totals_of(&sales);
            let mut remaining = sales.clone();
            let (undone_qty, undone_kg) = remaining.remove(index.index(sales.len()));
            let after = totals_of(&remaining);

            prop_assert_eq!(before.qty - after.qty, undone_qty);
            prop_assert_eq!(before.weight_kg - after.weight_kg, undone_kg);
        }

        /// Adding sales never moves an order backwards
        #[test]
        fn prop_status_monotonic_in_sales(
            target in arb_target(),
            sales in proptest::collection::vec(arb_sale(), 0..10),
            extra in arb_sale(),
        ) {
            let rank = |s: OrderStatus| match s {
                OrderStatus::Pending => 0,
                OrderStatus::Partial => 1,
                OrderStatus::Fulfilled => 2,
                OrderStatus::Cancelled => 3,
            };
            let before = derive_status(&target, &totals_of(&sales));
            let mut more = sales.clone();
            more.push(extra);
            let after = derive_status(&target, &totals_of(&more));

            prop_assert!(rank(after) >= rank(before));
        }

        /// Recompute depends only on the linked sales, not on their order
        #[test]
        fn prop_recompute_idempotent(
            target in arb_target(),
            sales in proptest::collection::vec(arb_sale(), 0..10),
        ) {
            let once = recompute_status(false, &target, &totals_of(&sales));
            let mut reversed = sales.clone();
            reversed.reverse();
            let twice = recompute_status(false, &target, &totals_of(&reversed));
            prop_assert_eq!(once, twice);
        }

        /// A cancelled order is never recomputed, whatever is linked
        #[test]
        fn prop_cancelled_never_recomputed(
            target in arb_target(),
            sales in proptest::collection::vec(arb_sale(), 0..10),
        ) {
            prop_assert_eq!(recompute_status(true, &target, &totals_of(&sales)), None);
        }
    }
}
