// src/simulation/engine.rs

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::error::{Result, SimError};
use crate::io::demand::DemandStats;
use crate::model::ledger::BatchLedger;
use crate::model::queues::OrderPipeline;
use crate::simulation::config::{OrderingMode, SimulationConfig};
use crate::simulation::lead_time::LeadTimeSampler;
use crate::simulation::metrics::SummaryMetrics;
use crate::simulation::rng::SimRng;
use crate::strategy::implementations::{ForecastDrivenPolicy, PackRules, ParDrivenPolicy};
use crate::strategy::optimization::par_level;
use crate::strategy::selector::{select_ordering_policy, PolicyChoice, PolicyInputs, SelectorThresholds};
use crate::strategy::service_level::SafetyStockController;
use crate::strategy::traits::{DayView, OrderKind, ReplenishmentPolicy};

/// Per-day outputs of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyState {
    pub day: u32,
    pub total_onsite: i64,
    pub non_expired_inventory: i64,
    pub expired_today: u32,
    pub newly_added_today: u32,
    pub ordered_today: u32,
    pub demand: u32,
    pub consumed: u32,
    pub unmet: u32,
}

/// Day-by-day history of a run, with column accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailySeries {
    records: Vec<DailyState>,
}

impl DailySeries {
    pub fn from_records(records: Vec<DailyState>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[DailyState] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_onsite_units(&self) -> Vec<i64> {
        self.records.iter().map(|r| r.total_onsite).collect()
    }

    pub fn non_expired_inventory(&self) -> Vec<i64> {
        self.records.iter().map(|r| r.non_expired_inventory).collect()
    }

    pub fn expired_units(&self) -> Vec<u32> {
        self.records.iter().map(|r| r.expired_today).collect()
    }

    pub fn newly_added_units(&self) -> Vec<u32> {
        self.records.iter().map(|r| r.newly_added_today).collect()
    }

    pub fn ordered_units(&self) -> Vec<u32> {
        self.records.iter().map(|r| r.ordered_today).collect()
    }

    pub fn consumed_units(&self) -> Vec<u32> {
        self.records.iter().map(|r| r.consumed).collect()
    }

    fn push(&mut self, state: DailyState) {
        self.records.push(state);
    }
}

/// Everything a finished run reports.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationRun {
    pub policy: PolicyChoice,
    pub initial_stock: u32,
    pub par_level: f64,
    pub series: DailySeries,
    pub summary: SummaryMetrics,
}

/// One scenario: a perishable SKU replenished under one policy for a fixed horizon.
///
/// Each day runs, in order: arrivals, expiration, consumption, the safety
/// stock controller, and the policy decision. The run owns its ledger,
/// pipeline, controller and random source, so separate runs share nothing.
pub struct InventorySimulation {
    config: SimulationConfig,

    // The stock
    ledger: BatchLedger,
    pipeline: OrderPipeline,

    // The brain
    policy: Box<dyn ReplenishmentPolicy>,
    choice: PolicyChoice,
    controller: SafetyStockController,

    // Inputs
    demand: Vec<u32>,
    forecast: Option<Vec<f64>>,
    long_run_usage: f64,
    shelf_life_days: u32,
    lead_time: LeadTimeSampler,
    rng: SimRng,

    initial_stock: u32,
    par_level: f64,
    balance: i64,
    pub current_day: u32,
    pub history: DailySeries,
}

impl InventorySimulation {
    /// Validates the configuration and prepares day 0.
    ///
    /// With a forecast, ordering is planned from it while consumption still
    /// follows `demand`.
    pub fn new(config: SimulationConfig, demand: Vec<u32>, forecast: Option<Vec<f64>>) -> Result<Self> {
        config.validate()?;
        if demand.is_empty() {
            return Err(SimError::EmptyDemand);
        }
        if let Some(f) = &forecast {
            if f.len() != demand.len() {
                return Err(SimError::ForecastLengthMismatch {
                    expected: demand.len(),
                    actual: f.len(),
                });
            }
        }

        let ctx = &config.context;
        let preset = *config.preset()?;
        let lead_time = LeadTimeSampler::from_spec(&ctx.lead_time)?;
        let median_lead_time = ctx.lead_time.median_days();
        let shelf_life_days = ctx.shelf_life.effective_days();

        let stats = match &forecast {
            Some(f) => DemandStats::from_values(f),
            None => DemandStats::from_units(&demand),
        };
        let avg_daily_usage = stats.mean;

        let choice = match ctx.mode {
            OrderingMode::ForecastDriven => PolicyChoice::ForecastDriven,
            OrderingMode::ForecastCapped => PolicyChoice::ForecastCapped,
            OrderingMode::ParDriven => PolicyChoice::ParDriven,
            OrderingMode::Auto => {
                let inputs = PolicyInputs {
                    avg_daily_usage,
                    cv_demand: stats.cv,
                    shelf_life_days,
                    moq_units: ctx.moq_units,
                    criticality: ctx.criticality(),
                    exchange_cadence_days: ctx.order_cadence_days,
                    par_cap_enabled: ctx.par_cap_enabled,
                };
                select_ordering_policy(&inputs, &SelectorThresholds::default())
            }
        };

        let pack = PackRules {
            moq: ctx.moq_units,
            spq: ctx.spq_units,
        };
        let par = par_level(avg_daily_usage, ctx.par_days(), median_lead_time);

        let policy: Box<dyn ReplenishmentPolicy> = match choice {
            PolicyChoice::ParDriven => Box::new(ParDrivenPolicy::new(
                par,
                avg_daily_usage,
                median_lead_time,
                ctx.cadence_days(),
                pack,
            )),
            PolicyChoice::ForecastDriven | PolicyChoice::ForecastCapped => {
                let forecast_policy = ForecastDrivenPolicy::new(
                    preset,
                    median_lead_time,
                    ctx.order_cadence_days,
                    shelf_life_days,
                    pack,
                );
                if choice == PolicyChoice::ForecastCapped {
                    Box::new(forecast_policy.capped_at(par))
                } else {
                    Box::new(forecast_policy)
                }
            }
        };

        let initial_stock = config.initial_stock.unwrap_or_else(|| {
            let units = avg_daily_usage * config.initial_stock_ratio * 30.0;
            units.max(0.0).min(f64::from(u32::MAX)) as u32
        });

        let mut ledger = BatchLedger::new();
        ledger.receive(0, initial_stock, shelf_life_days);

        let controller = SafetyStockController::new(preset.base_safety_ratio, ctx.service_level());
        let rng = SimRng::new(config.seed);

        info!(
            category = %ctx.category,
            mode = %ctx.mode,
            policy = %choice,
            days = demand.len(),
            initial_stock,
            shelf_life_days,
            par_level = par,
            "simulation prepared"
        );

        Ok(Self {
            config,
            ledger,
            pipeline: OrderPipeline::new(),
            policy,
            choice,
            controller,
            demand,
            forecast,
            long_run_usage: avg_daily_usage,
            shelf_life_days,
            lead_time,
            rng,
            initial_stock,
            par_level: par,
            balance: i64::from(initial_stock),
            current_day: 0,
            history: DailySeries::default(),
        })
    }

    pub fn policy(&self) -> PolicyChoice {
        self.choice
    }

    pub fn horizon(&self) -> u32 {
        self.demand.len() as u32
    }

    pub fn ledger(&self) -> &BatchLedger {
        &self.ledger
    }

    pub fn pipeline(&self) -> &OrderPipeline {
        &self.pipeline
    }

    pub fn is_finished(&self) -> bool {
        self.current_day >= self.horizon()
    }

    /// Runs every remaining day and summarizes the result.
    pub fn run(mut self) -> SimulationRun {
        while !self.is_finished() {
            self.step();
        }
        self.finish()
    }

    /// Advances the simulation by one day.
    pub fn step(&mut self) {
        if self.is_finished() {
            return;
        }
        let day = self.current_day;

        // MORNING: deliveries land, then anything at its expiry day is written off.
        let newly_added = self.pipeline.pop_arrival(day);
        if newly_added > 0 {
            self.ledger.receive(day, newly_added, self.shelf_life_days);
        }
        let expired = self.ledger.advance_day(day);

        // DAY: serve demand earliest-expiry first; the shortfall is lost.
        let demand = self.demand[day as usize];
        let used = self.ledger.consume(demand);

        self.balance += i64::from(newly_added) - i64::from(expired) - i64::from(used.served);
        let on_hand = self.ledger.on_hand();
        if self.balance != on_hand as i64 {
            warn!(day, balance = self.balance, on_hand, "inventory balance drifted from ledger");
        }

        let stockout = demand > 0 && on_hand == 0;
        self.controller.record(stockout);

        // EVENING: decide and send the order on its way.
        let view = DayView {
            day,
            on_hand,
            pending: self.pipeline.pending(),
            usage_history: &self.demand[..=day as usize],
            long_run_usage: self.long_run_usage,
            forecast: self.forecast.as_deref(),
            safety: self.controller.adjustment(),
        };
        let decision = self.policy.decide(&view);

        let mut ordered = 0;
        if decision.is_order() {
            let lead = self.lead_time.next(&mut self.rng);
            let arrival = day + lead;
            if arrival < self.horizon() {
                self.pipeline.schedule(arrival, decision.quantity);
                ordered = decision.quantity;
                debug!(
                    day,
                    policy = self.policy.name(),
                    quantity = decision.quantity,
                    kind = ?decision.kind,
                    lead_time = lead,
                    arrival,
                    "order placed"
                );
            } else {
                warn!(day, quantity = decision.quantity, arrival, "order would land past horizon, not placed");
            }
        } else if decision.kind == OrderKind::ShelfLifeSuppressed {
            trace!(day, "order suppressed by shelf-life damping");
        }

        self.record_history(DailyState {
            day,
            total_onsite: self.balance,
            non_expired_inventory: self.balance,
            expired_today: expired,
            newly_added_today: newly_added,
            ordered_today: ordered,
            demand,
            consumed: used.served,
            unmet: used.unmet,
        });
        self.current_day += 1;
    }

    fn record_history(&mut self, state: DailyState) {
        trace!(
            day = state.day,
            on_hand = state.non_expired_inventory,
            expired = state.expired_today,
            added = state.newly_added_today,
            ordered = state.ordered_today,
            "day closed"
        );
        self.history.push(state);
    }

    fn finish(self) -> SimulationRun {
        let summary = SummaryMetrics::from_series(&self.history, self.config.stockout_basis);
        info!(
            policy = %self.choice,
            stockout_rate = summary.stockout_rate,
            expired_rate = summary.expired_rate,
            expired_units = summary.expired_units_total,
            "simulation finished"
        );
        SimulationRun {
            policy: self.choice,
            initial_stock: self.initial_stock,
            par_level: self.par_level,
            series: self.history,
            summary,
        }
    }
}

/// Builds and runs one scenario in a single call.
pub fn simulate_inventory(
    config: SimulationConfig,
    demand: Vec<u32>,
    forecast: Option<Vec<f64>>,
) -> Result<SimulationRun> {
    Ok(InventorySimulation::new(config, demand, forecast)?.run())
}
