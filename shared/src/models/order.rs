//! Customer order models and fulfillment rules

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::validate_cancel_remarks;

/// Fulfillment status of a customer order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Partial,
    Fulfilled,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Partial,
        OrderStatus::Fulfilled,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Partial => "Partial",
            OrderStatus::Fulfilled => "Fulfilled",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown order status: {0}")]
pub struct UnknownOrderStatus(pub String);

impl std::str::FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "partial" => Ok(OrderStatus::Partial),
            "fulfilled" => Ok(OrderStatus::Fulfilled),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(UnknownOrderStatus(s.to_string())),
        }
    }
}

/// What the customer asked for. A zero or missing value means "no target".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentTarget {
    pub ordered_qty: Option<i64>,
    pub ordered_weight_kg: Option<Decimal>,
}

impl FulfillmentTarget {
    pub fn qty(&self) -> Option<i64> {
        self.ordered_qty.filter(|q| *q > 0)
    }

    pub fn weight_kg(&self) -> Option<Decimal> {
        self.ordered_weight_kg.filter(|w| *w > Decimal::ZERO)
    }

    pub fn is_unbounded(&self) -> bool {
        self.qty().is_none() && self.weight_kg().is_none()
    }
}

/// Sums of all sales currently linked to an order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfilledTotals {
    pub qty: i64,
    pub weight_kg: Decimal,
}

impl FulfilledTotals {
    pub fn new(qty: i64, weight_kg: Decimal) -> Self {
        Self { qty, weight_kg }
    }

    pub fn has_sales(&self) -> bool {
        self.qty > 0 || self.weight_kg > Decimal::ZERO
    }

    /// Sum `(qty, weight_kg)` pairs of linked sales
    pub fn sum<I>(sales: I) -> Self
    where
        I: IntoIterator<Item = (i64, Decimal)>,
    {
        sales
            .into_iter()
            .fold(Self::default(), |acc, (qty, weight_kg)| {
                Self::new(acc.qty + qty, acc.weight_kg + weight_kg)
            })
    }
}

/// Order lifecycle transitions that are refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OrderTransitionError {
    #[error("Remarks are required to cancel an order")]
    RemarksRequired,
    #[error("Order is already cancelled")]
    AlreadyCancelled,
    #[error("Order is not cancelled")]
    NotCancelled,
    #[error("Sales cannot be linked to a cancelled order")]
    LinkToCancelled,
}

/// Check a cancellation request. Remarks are checked first and returned trimmed.
pub fn check_cancel(
    already_cancelled: bool,
    remarks: Option<&str>,
) -> Result<&str, OrderTransitionError> {
    let remarks =
        validate_cancel_remarks(remarks).map_err(|_| OrderTransitionError::RemarksRequired)?;
    if already_cancelled {
        return Err(OrderTransitionError::AlreadyCancelled);
    }
    Ok(remarks)
}

/// Only a cancelled order can be reinstated
pub fn check_uncancel(cancelled: bool) -> Result<(), OrderTransitionError> {
    if cancelled {
        Ok(())
    } else {
        Err(OrderTransitionError::NotCancelled)
    }
}

/// Sales may be linked to any order that is not cancelled, fulfilled ones included
pub fn check_linkable(cancelled: bool) -> Result<(), OrderTransitionError> {
    if cancelled {
        Err(OrderTransitionError::LinkToCancelled)
    } else {
        Ok(())
    }
}

/// Status a recompute writes back, or `None` when the order is cancelled and
/// must be left untouched
pub fn recompute_status(
    cancelled: bool,
    target: &FulfillmentTarget,
    totals: &FulfilledTotals,
) -> Option<OrderStatus> {
    (!cancelled).then(|| derive_status(target, totals))
}

/// Derive the status of a non-cancelled order from its targets and linked sales.
///
/// Meeting either target is enough for `Fulfilled`. With no target at all an
/// order can only ever be `Pending` or `Partial`.
pub fn derive_status(target: &FulfillmentTarget, totals: &FulfilledTotals) -> OrderStatus {
    if target.is_unbounded() {
        return if totals.has_sales() {
            OrderStatus::Partial
        } else {
            OrderStatus::Pending
        };
    }

    let qty_met = target.qty().is_some_and(|t| totals.qty >= t);
    let weight_met = target.weight_kg().is_some_and(|t| totals.weight_kg >= t);

    if qty_met || weight_met {
        OrderStatus::Fulfilled
    } else if totals.has_sales() {
        OrderStatus::Partial
    } else {
        OrderStatus::Pending
    }
}

/// Weight still owed on an order, clamped at zero for over-fulfilled orders
pub fn remaining_weight(ordered_weight_kg: Option<Decimal>, fulfilled_weight_kg: Decimal) -> Decimal {
    let ordered = ordered_weight_kg.unwrap_or(Decimal::ZERO);
    (ordered - fulfilled_weight_kg).max(Decimal::ZERO)
}

/// Pieces still owed on an order, clamped at zero
pub fn remaining_qty(ordered_qty: Option<i64>, fulfilled_qty: i64) -> i64 {
    (ordered_qty.unwrap_or(0) - fulfilled_qty).max(0)
}
