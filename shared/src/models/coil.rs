//! Raw coil purchase models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A purchased steel coil, the root input to all production
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coil {
    pub id: Uuid,
    /// Supplier's coil / heat number, unique per workshop
    pub coil_number: String,
    pub grade: String,
    pub thickness_mm: Decimal,
    pub width_mm: Option<Decimal>,
    pub supplier: Option<String>,
    pub purchase_date: NaiveDate,
    pub weight_kg: Decimal,
    pub rate_per_kg: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Coil {
    pub fn purchase_cost(&self) -> Decimal {
        purchase_cost(self.weight_kg, self.rate_per_kg)
    }
}

/// Cost of a purchase, rounded to paise
pub fn purchase_cost(weight_kg: Decimal, rate_per_kg: Decimal) -> Decimal {
    (weight_kg * rate_per_kg).round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn purchase_cost_rounds_to_two_places() {
        let weight = Decimal::from_str("1234.567").unwrap();
        let rate = Decimal::from_str("61.25").unwrap();
        assert_eq!(purchase_cost(weight, rate), Decimal::from_str("75617.23").unwrap());
    }
}
