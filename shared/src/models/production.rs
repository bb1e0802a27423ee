//! Production run models
//!
//! A run converts one stock item into others:
//! - circle run: coil -> circles (+ scrap)
//! - patta run: coil -> patta strips (+ scrap)
//! - PL run: patta -> PL pieces (+ scrap)
//!
//! Whatever is neither output nor scrap is process loss.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of production run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    Circle,
    Patta,
    Pl,
}

impl RunKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunKind::Circle => "circle",
            RunKind::Patta => "patta",
            RunKind::Pl => "pl",
        }
    }

    /// Table holding runs of this kind
    pub fn table(&self) -> &'static str {
        match self {
            RunKind::Circle => "circle_runs",
            RunKind::Patta => "patta_runs",
            RunKind::Pl => "pl_runs",
        }
    }
}

impl std::fmt::Display for RunKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunKind::Circle => write!(f, "Circle"),
            RunKind::Patta => write!(f, "Patta"),
            RunKind::Pl => write!(f, "PL"),
        }
    }
}

/// Weights recorded for a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunWeights {
    pub input_weight_kg: Decimal,
    pub output_weight_kg: Decimal,
    pub scrap_weight_kg: Decimal,
}

impl RunWeights {
    pub fn new(input_weight_kg: Decimal, output_weight_kg: Decimal, scrap_weight_kg: Decimal) -> Self {
        Self {
            input_weight_kg,
            output_weight_kg,
            scrap_weight_kg,
        }
    }

    pub fn yield_percent(&self) -> Decimal {
        yield_percent(self.input_weight_kg, self.output_weight_kg)
    }

    pub fn process_loss_kg(&self) -> Decimal {
        process_loss(self.input_weight_kg, self.output_weight_kg, self.scrap_weight_kg)
    }

    /// Output and scrap together can never weigh more than what went in
    pub fn is_balanced(&self) -> bool {
        self.output_weight_kg + self.scrap_weight_kg <= self.input_weight_kg
    }
}

/// Yield = (output / input) x 100, rounded to two places. Zero input yields zero.
pub fn yield_percent(input_weight_kg: Decimal, output_weight_kg: Decimal) -> Decimal {
    if input_weight_kg.is_zero() {
        Decimal::ZERO
    } else {
        (output_weight_kg / input_weight_kg * Decimal::ONE_HUNDRED).round_dp(2)
    }
}

/// Weight unaccounted for by output or scrap
pub fn process_loss(input_weight_kg: Decimal, output_weight_kg: Decimal, scrap_weight_kg: Decimal) -> Decimal {
    (input_weight_kg - output_weight_kg - scrap_weight_kg).max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_run_yield() {
        let run = RunWeights::new(Decimal::from(1000), Decimal::from(780), Decimal::from(200));
        assert_eq!(run.yield_percent(), Decimal::from(78));
        assert_eq!(run.process_loss_kg(), Decimal::from(20));
        assert!(run.is_balanced());
    }

    #[test]
    fn overweight_output_is_unbalanced() {
        let run = RunWeights::new(Decimal::from(100), Decimal::from(90), Decimal::from(20));
        assert!(!run.is_balanced());
        assert_eq!(run.process_loss_kg(), Decimal::ZERO);
    }

    #[test]
    fn zero_input() {
        assert_eq!(yield_percent(Decimal::ZERO, Decimal::from(5)), Decimal::ZERO);
    }
}
