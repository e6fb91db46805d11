// src/strategy/implementations.rs

use tracing::trace;

use crate::simulation::config::CategoryPreset;
use crate::strategy::optimization::{
    days_of_coverage, recent_consumption, round_to_pack, whole_units, EPSILON,
};
use crate::strategy::traits::{DayView, OrderDecision, OrderKind, ReplenishmentPolicy};

/// Days added to the lead time when projecting demand for the order trigger.
const LOOKAHEAD_EXTRA_DAYS: u32 = 7;

/// Headroom applied to projected demand before comparing it with stock.
const PROJECTION_SAFETY_FACTOR: f64 = 1.2;

/// Review period assumed when no order cadence is configured.
const DEFAULT_REVIEW_DAYS: u32 = 7;

/// Supplier pack constraints, applied last.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackRules {
    pub moq: Option<u32>,
    pub spq: Option<u32>,
}

impl PackRules {
    pub fn apply(&self, quantity: u32) -> u32 {
        round_to_pack(quantity, self.moq, self.spq)
    }
}

/// Scales an order down as stock on hand approaches its shelf life.
///
/// Returns `None` when ordering should be suppressed outright.
pub fn shelf_life_damping(inventory_age_ratio: f64) -> Option<f64> {
    if inventory_age_ratio > 0.40 {
        None
    } else if inventory_age_ratio > 0.25 {
        Some(0.5)
    } else if inventory_age_ratio > 0.15 {
        Some(0.75)
    } else {
        Some(1.0)
    }
}

// =========================================================================
// 1. Forecast-Driven Policy
// =========================================================================

/// Reorder-point policy sized from recent consumption and category presets.
///
/// Orders when stock falls to the dynamic reorder point and stock plus
/// pipeline will not cover projected demand over the lead time plus a week.
/// With a par cap set, orders never lift stock plus pipeline above it.
#[derive(Debug, Clone)]
pub struct ForecastDrivenPolicy {
    preset: CategoryPreset,
    lead_time_days: u32,
    cadence_days: Option<u32>,
    shelf_life_days: u32,
    pack: PackRules,
    par_cap: Option<f64>,
}

impl ForecastDrivenPolicy {
    pub fn new(
        preset: CategoryPreset,
        lead_time_days: u32,
        cadence_days: Option<u32>,
        shelf_life_days: u32,
        pack: PackRules,
    ) -> Self {
        Self {
            preset,
            lead_time_days,
            cadence_days,
            shelf_life_days: shelf_life_days.max(1),
            pack,
            par_cap: None,
        }
    }

    pub fn capped_at(mut self, par_level: f64) -> Self {
        self.par_cap = Some(par_level.max(0.0));
        self
    }

    fn review_days(&self) -> u32 {
        self.cadence_days.unwrap_or(DEFAULT_REVIEW_DAYS)
    }

    /// Stock level at or below which an order is considered.
    pub fn reorder_point(&self, recent: f64, safety_ratio: f64) -> f64 {
        let horizon = (self.lead_time_days + 3).max(self.review_days());
        recent * safety_ratio * f64::from(horizon)
    }

    /// Order size before shelf-life damping and pack rounding.
    pub fn sized_quantity(&self, recent: f64, order_factor: f64) -> f64 {
        let days_until_reorder = f64::from(self.review_days() + self.lead_time_days);
        let raw = recent
            * days_until_reorder
            * self.preset.order_buffer
            * self.preset.order_multiplier
            * order_factor;
        let cap = recent * self.preset.order_cap_days;
        let floor = recent * f64::from(self.lead_time_days);
        raw.min(cap).max(floor)
    }
}

impl ReplenishmentPolicy for ForecastDrivenPolicy {
    fn name(&self) -> &'static str {
        if self.par_cap.is_some() {
            "forecast_capped"
        } else {
            "forecast_driven"
        }
    }

    fn decide(&mut self, view: &DayView<'_>) -> OrderDecision {
        let recent = recent_consumption(view.usage_history, view.long_run_usage);
        let stock = view.on_hand as f64;
        let position = view.stock_position() as f64;

        let reorder_point = self.reorder_point(recent, view.safety.safety_ratio);
        let lookahead = self.lead_time_days + LOOKAHEAD_EXTRA_DAYS;
        let projected = view.projected_demand(lookahead, recent) * PROJECTION_SAFETY_FACTOR;

        trace!(
            day = view.day,
            recent,
            reorder_point,
            projected,
            stock,
            position,
            "forecast policy check"
        );

        if stock > reorder_point || position >= projected {
            return OrderDecision::hold();
        }

        let mut quantity = self.sized_quantity(recent, view.safety.order_factor);

        let coverage = days_of_coverage(position, recent.max(EPSILON));
        let age_ratio = coverage / f64::from(self.shelf_life_days);
        match shelf_life_damping(age_ratio) {
            Some(factor) => quantity *= factor,
            None => {
                return OrderDecision {
                    quantity: 0,
                    kind: OrderKind::ShelfLifeSuppressed,
                }
            }
        }

        if let Some(par) = self.par_cap {
            quantity = quantity.min(par - position);
        }

        OrderDecision::order(self.pack.apply(whole_units(quantity)), OrderKind::Reorder)
    }
}

// =========================================================================
// 2. Par-Driven Policy
// =========================================================================

/// Tops stock plus pipeline back up to a fixed par level.
///
/// Routine top-ups only happen on cadence days. When coverage drops below
/// lead time plus three days, or stock is gone, it orders immediately.
#[derive(Debug, Clone)]
pub struct ParDrivenPolicy {
    par_level: f64,
    avg_daily_usage: f64,
    median_lead_time: u32,
    cadence_days: u32,
    pack: PackRules,
}

impl ParDrivenPolicy {
    pub fn new(
        par_level: f64,
        avg_daily_usage: f64,
        median_lead_time: u32,
        cadence_days: u32,
        pack: PackRules,
    ) -> Self {
        Self {
            par_level: par_level.max(0.0),
            avg_daily_usage: avg_daily_usage.max(0.0),
            median_lead_time,
            cadence_days: cadence_days.max(1),
            pack,
        }
    }

    pub fn par_level(&self) -> f64 {
        self.par_level
    }
}

impl ReplenishmentPolicy for ParDrivenPolicy {
    fn name(&self) -> &'static str {
        "par_driven"
    }

    fn decide(&mut self, view: &DayView<'_>) -> OrderDecision {
        let available = view.stock_position() as f64;
        if available >= self.par_level {
            return OrderDecision::hold();
        }

        let coverage = days_of_coverage(view.on_hand as f64, self.avg_daily_usage);
        let stocked_out = view.on_hand == 0;
        let emergency = stocked_out || coverage < f64::from(self.median_lead_time + 3);

        if !emergency && view.day % self.cadence_days != 0 {
            return OrderDecision::hold();
        }

        let mut quantity = self.par_level - available;
        if stocked_out || coverage < f64::from(self.median_lead_time) {
            let floor = self.avg_daily_usage * f64::from(self.median_lead_time + 7);
            quantity = quantity.max(floor);
        }

        let kind = if emergency {
            OrderKind::Emergency
        } else {
            OrderKind::Routine
        };
        OrderDecision::order(self.pack.apply(whole_units(quantity)), kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::service_level::SafetyAdjustment;

    fn preset() -> CategoryPreset {
        CategoryPreset {
            order_buffer: 1.25,
            order_multiplier: 1.0,
            order_cap_days: 21.0,
            base_safety_ratio: 1.2,
        }
    }

    fn view<'a>(day: u32, on_hand: u64, pending: u64, history: &'a [u32]) -> DayView<'a> {
        DayView {
            day,
            on_hand,
            pending,
            usage_history: history,
            long_run_usage: 10.0,
            forecast: None,
            safety: SafetyAdjustment::neutral(1.2),
        }
    }

    #[test]
    fn damping_bands() {
        assert_eq!(shelf_life_damping(0.10), Some(1.0));
        assert_eq!(shelf_life_damping(0.20), Some(0.75));
        assert_eq!(shelf_life_damping(0.30), Some(0.5));
        assert_eq!(shelf_life_damping(0.41), None);
    }

    #[test]
    fn forecast_policy_holds_above_reorder_point() {
        let history = vec![10; 20];
        let mut policy = ForecastDrivenPolicy::new(preset(), 3, None, 365, PackRules::default());
        // reorder point = 10 * 1.2 * max(6, 7) = 84
        let decision = policy.decide(&view(19, 85, 0, &history));
        assert_eq!(decision, OrderDecision::hold());
    }

    #[test]
    fn forecast_policy_orders_when_short() {
        let history = vec![10; 20];
        let mut policy = ForecastDrivenPolicy::new(preset(), 3, None, 365, PackRules::default());
        let decision = policy.decide(&view(19, 50, 0, &history));
        // raw = 10 * (7 + 3) * 1.25 = 125, within [30, 210]; coverage 5/365 undamped
        assert_eq!(decision.kind, OrderKind::Reorder);
        assert_eq!(decision.quantity, 125);
    }

    #[test]
    fn forecast_policy_respects_pipeline() {
        let history = vec![10; 20];
        let mut policy = ForecastDrivenPolicy::new(preset(), 3, None, 365, PackRules::default());
        // projected = 10 * 10 * 1.2 = 120; 50 on hand + 80 pending covers it
        let decision = policy.decide(&view(19, 50, 80, &history));
        assert!(!decision.is_order());
    }

    #[test]
    fn short_shelf_life_suppresses_order() {
        let history = vec![10; 20];
        let mut policy = ForecastDrivenPolicy::new(preset(), 3, None, 10, PackRules::default());
        // coverage 5 days over a 10-day shelf life
        let decision = policy.decide(&view(19, 50, 0, &history));
        assert_eq!(decision.kind, OrderKind::ShelfLifeSuppressed);
        assert_eq!(decision.quantity, 0);
    }

    #[test]
    fn par_cap_limits_forecast_order() {
        let history = vec![10; 20];
        let mut policy =
            ForecastDrivenPolicy::new(preset(), 3, None, 365, PackRules::default()).capped_at(90.0);
        let decision = policy.decide(&view(19, 50, 0, &history));
        assert_eq!(decision.quantity, 40);
        assert_eq!(policy.name(), "forecast_capped");
    }

    #[test]
    fn forecast_drives_projection() {
        let history = vec![10; 20];
        let mut policy = ForecastDrivenPolicy::new(preset(), 3, None, 365, PackRules::default());
        let quiet = vec![0.0; 60];
        let mut v = view(19, 50, 0, &history);
        v.forecast = Some(&quiet);
        assert!(!policy.decide(&v).is_order());
    }

    #[test]
    fn par_policy_waits_for_cadence() {
        let mut policy = ParDrivenPolicy::new(320.0, 10.0, 3, 7, PackRules::default());
        let history = vec![10; 2];
        assert!(!policy.decide(&view(1, 80, 230, &history)).is_order());
        let history = vec![10; 8];
        let decision = policy.decide(&view(7, 250, 0, &history));
        assert_eq!(decision.kind, OrderKind::Routine);
        assert_eq!(decision.quantity, 70);
    }

    #[test]
    fn par_policy_emergency_ignores_cadence() {
        let mut policy = ParDrivenPolicy::new(320.0, 10.0, 3, 7, PackRules::default());
        let history = vec![10; 4];
        let decision = policy.decide(&view(3, 0, 0, &history));
        assert_eq!(decision.kind, OrderKind::Emergency);
        assert_eq!(decision.quantity, 320);
    }

    #[test]
    fn par_policy_floor_applies_when_stocked_out() {
        let mut policy = ParDrivenPolicy::new(50.0, 10.0, 3, 7, PackRules::default());
        let history = vec![10; 4];
        let decision = policy.decide(&view(3, 0, 40, &history));
        // par gap is 10 but the floor covers lead time + 7 days
        assert_eq!(decision.quantity, 100);
    }

    #[test]
    fn par_policy_rounds_to_pack() {
        let pack = PackRules {
            moq: Some(200),
            spq: Some(25),
        };
        let mut policy = ParDrivenPolicy::new(320.0, 10.0, 3, 7, pack);
        let history = vec![10; 8];
        let decision = policy.decide(&view(7, 190, 0, &history));
        // gap 130 -> MOQ 200 -> SPQ 200
        assert_eq!(decision.quantity, 200);
    }
}
