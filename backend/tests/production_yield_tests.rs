//! Production run tests
//!
//! Tests for circle, patta and PL runs including:
//! - Yield and process loss figures
//! - Mass balance validation
//! - Run kind naming

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    process_loss, validate_run_weights, validate_thickness, yield_percent, RunKind, RunWeights,
};
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
    fn test_circle_run_yield() {
        let run = RunWeights::new(dec("1250.5"), dec("1012.4"), dec("230"));

        assert_eq!(run.yield_percent(), dec("80.96"));
        assert_eq!(run.process_loss_kg(), dec("8.1"));
        assert!(validate_run_weights(&run).is_ok());
    }

    #[test]
    fn test_zero_input_yield_is_zero() {
        assert_eq!(yield_percent(Decimal::ZERO, dec("10")), Decimal::ZERO);
    }

    /// Loss is clamped when recorded scrap makes the books overshoot
    #[test]
    fn test_process_loss_clamped() {
        assert_eq!(process_loss(dec("100"), dec("80"), dec("25")), Decimal::ZERO);
    }

    #[test]
    fn test_mass_balance_rejected() {
        let run = RunWeights::new(dec("500"), dec("420"), dec("90"));
        assert!(!run.is_balanced());
        assert!(validate_run_weights(&run).is_err());
    }

    #[test]
    fn test_zero_output_rejected() {
        let run = RunWeights::new(dec("500"), Decimal::ZERO, dec("10"));
        assert!(validate_run_weights(&run).is_err());
    }

    #[test]
    fn test_zero_scrap_allowed() {
        let run = RunWeights::new(dec("500"), dec("500"), Decimal::ZERO);
        assert!(validate_run_weights(&run).is_ok());
        assert_eq!(run.yield_percent(), dec("100"));
    }

    #[test]
    fn test_thickness_bounds() {
        assert!(validate_thickness(dec("0.5")).is_ok());
        assert!(validate_thickness(dec("25")).is_ok());
        assert!(validate_thickness(Decimal::ZERO).is_err());
        assert!(validate_thickness(dec("25.01")).is_err());
    }

    #[test]
    fn test_run_kind_tables() {
        assert_eq!(RunKind::Circle.table(), "circle_runs");
        assert_eq!(RunKind::Patta.table(), "patta_runs");
        assert_eq!(RunKind::Pl.table(), "pl_runs");
        assert_eq!(RunKind::Pl.to_string(), "PL");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn arb_balanced_run() -> impl Strategy<Value = RunWeights> {
        (1i64..10_000_000)
            .prop_flat_map(|input| (Just(input), 1i64..=input))
            .prop_flat_map(|(input, output)| (Just(input), Just(output), 0i64..=(input - output)))
            .prop_map(|(input, output, scrap)| {
                RunWeights::new(Decimal::new(input, 3), Decimal::new(output, 3), Decimal::new(scrap, 3))
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Balanced runs pass validation and yield at most 100%
        #[test]
        fn prop_balanced_run_valid(run in arb_balanced_run()) {
            prop_assert!(validate_run_weights(&run).is_ok());
            prop_assert!(run.yield_percent() <= Decimal::ONE_HUNDRED);
            prop_assert!(run.yield_percent() >= Decimal::ZERO);
        }

        /// Output, scrap and loss account for every kilogram of input
        #[test]
        fn prop_mass_is_conserved(run in arb_balanced_run()) {
            let accounted = run.output_weight_kg + run.scrap_weight_kg + run.process_loss_kg();
            prop_assert_eq!(accounted, run.input_weight_kg);
        }

        /// Any run whose outputs exceed its input is rejected
        #[test]
        fn prop_overweight_rejected(run in arb_balanced_run(), extra in 1i64..1_000_000) {
            let over = RunWeights::new(
                run.input_weight_kg,
                run.output_weight_kg + Decimal::new(extra, 3) + (run.input_weight_kg - run.output_weight_kg - run.scrap_weight_kg),
                run.scrap_weight_kg,
            );
            prop_assert!(validate_run_weights(&over).is_err());
        }
    }
}
