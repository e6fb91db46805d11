// src/strategy/traits.rs

use std::fmt::Debug;

use serde::Serialize;

use crate::strategy::service_level::SafetyAdjustment;

/// Everything a policy may look at when deciding today's order.
///
/// Built by the engine after expiration and consumption have run.
#[derive(Debug, Clone, Copy)]
pub struct DayView<'a> {
    pub day: u32,
    /// Units on hand at end of day, all non-expired.
    pub on_hand: u64,
    /// Units ordered but not yet arrived.
    pub pending: u64,
    /// Actual demand for days `0..=day`.
    pub usage_history: &'a [u32],
    /// Average daily usage of the planning signal over the whole run.
    pub long_run_usage: f64,
    /// Predicted daily demand for the whole horizon, when ordering from a forecast.
    pub forecast: Option<&'a [f64]>,
    pub safety: SafetyAdjustment,
}

impl DayView<'_> {
    pub fn stock_position(&self) -> u64 {
        self.on_hand + self.pending
    }

    /// Predicted demand for the `days` days after today.
    ///
    /// Falls back to `fallback_rate` per day where no forecast is available.
    pub fn projected_demand(&self, days: u32, fallback_rate: f64) -> f64 {
        let Some(forecast) = self.forecast else {
            return fallback_rate * f64::from(days);
        };
        let start = self.day as usize + 1;
        (start..start + days as usize)
            .map(|d| forecast.get(d).map_or(fallback_rate, |v| v.max(0.0)))
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    Hold,
    /// Forecast-driven reorder point crossed.
    Reorder,
    /// Par-driven top-up on a cadence boundary.
    Routine,
    /// Par-driven top-up outside the cadence because coverage ran short.
    Emergency,
    /// An order was due but stock on hand would outlive its shelf life.
    ShelfLifeSuppressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderDecision {
    pub quantity: u32,
    pub kind: OrderKind,
}

impl OrderDecision {
    pub fn hold() -> Self {
        Self {
            quantity: 0,
            kind: OrderKind::Hold,
        }
    }

    pub fn order(quantity: u32, kind: OrderKind) -> Self {
        if quantity == 0 {
            return Self::hold();
        }
        Self { quantity, kind }
    }

    pub fn is_order(&self) -> bool {
        self.quantity > 0
    }
}

/// Decides, once per simulated day, whether and how much to reorder.
pub trait ReplenishmentPolicy: Debug + Send {
    fn name(&self) -> &'static str;

    fn decide(&mut self, view: &DayView<'_>) -> OrderDecision;
}
