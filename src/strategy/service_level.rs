// src/strategy/service_level.rs

use std::collections::VecDeque;

use serde::Serialize;

/// Days of stockout history the controller looks back over.
pub const STOCKOUT_WINDOW_DAYS: usize = 30;

/// Bump applied to order sizes while the trailing stockout rate misses the
/// service-level target.
const MISSED_TARGET_ORDER_FACTOR: f64 = 1.10;

/// What the controller hands to the policy each day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SafetyAdjustment {
    /// Multiplier on recent consumption used to set the reorder point.
    pub safety_ratio: f64,
    /// Multiplier on the computed order size.
    pub order_factor: f64,
    /// Trailing stockout rate as a fraction of observed days.
    pub stockout_rate: f64,
}

impl SafetyAdjustment {
    pub fn neutral(safety_ratio: f64) -> Self {
        Self {
            safety_ratio,
            order_factor: 1.0,
            stockout_rate: 0.0,
        }
    }
}

/// Rolling window of stockout flags driving reorder thresholds.
///
/// A clean recent record relaxes the safety ratio; a record worse than the
/// service-level target enlarges orders.
#[derive(Debug, Clone)]
pub struct SafetyStockController {
    window: VecDeque<bool>,
    base_ratio: f64,
    service_level_target: f64,
}

impl SafetyStockController {
    pub fn new(base_ratio: f64, service_level_target: f64) -> Self {
        Self {
            window: VecDeque::with_capacity(STOCKOUT_WINDOW_DAYS),
            base_ratio,
            service_level_target,
        }
    }

    pub fn record(&mut self, stockout: bool) {
        if self.window.len() == STOCKOUT_WINDOW_DAYS {
            self.window.pop_front();
        }
        self.window.push_back(stockout);
    }

    /// Share of observed days in the window that were stockouts. Zero before any day is seen.
    pub fn stockout_rate(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        let hits = self.window.iter().filter(|s| **s).count();
        hits as f64 / self.window.len() as f64
    }

    pub fn adjustment(&self) -> SafetyAdjustment {
        let rate = self.stockout_rate();
        let relax = if rate < 0.005 {
            0.7
        } else if rate < 0.01 {
            0.9
        } else {
            1.0
        };
        let tolerated = 1.0 - self.service_level_target;
        let order_factor = if rate > tolerated {
            MISSED_TARGET_ORDER_FACTOR
        } else {
            1.0
        };
        SafetyAdjustment {
            safety_ratio: self.base_ratio * relax,
            order_factor,
            stockout_rate: rate,
        }
    }

    pub fn observed_days(&self) -> usize {
        self.window.len()
    }
}
