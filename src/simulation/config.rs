// src/simulation/config.rs

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::simulation::lead_time::LogNormalLeadTime;
use crate::simulation::metrics::StockoutBasis;

pub const DEFAULT_LEAD_TIME_DAYS: u32 = 5;
pub const DEFAULT_SHELF_LIFE_DAYS: u32 = 730;
pub const DEFAULT_CADENCE_DAYS: u32 = 7;
pub const DEFAULT_PAR_LEVEL_DAYS: u32 = 30;
pub const ROUTINE_SERVICE_LEVEL: f64 = 0.98;
pub const CRITICAL_SERVICE_LEVEL: f64 = 0.995;

/// How the policy engine decides when and how much to reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingMode {
    #[default]
    ForecastDriven,
    ParDriven,
    /// Chosen per SKU at run start by the policy selector.
    Auto,
    /// Forecast-driven, but never ordering past the par level.
    ForecastCapped,
}

impl OrderingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderingMode::ForecastDriven => "forecast_driven",
            OrderingMode::ParDriven => "par_driven",
            OrderingMode::Auto => "auto",
            OrderingMode::ForecastCapped => "forecast_capped",
        }
    }
}

impl fmt::Display for OrderingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderingMode {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "forecast_driven" => Ok(OrderingMode::ForecastDriven),
            "par_driven" => Ok(OrderingMode::ParDriven),
            "auto" => Ok(OrderingMode::Auto),
            "forecast_capped" => Ok(OrderingMode::ForecastCapped),
            other => Err(SimError::UnknownMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criticality {
    Routine,
    Critical,
}

/// Supplier lead time, either fixed or drawn per order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "distribution", rename_all = "snake_case")]
pub enum LeadTimeSpec {
    Fixed { days: u32 },
    LogNormal { median_days: f64, p95_days: f64 },
}

impl LeadTimeSpec {
    /// Lead time used for planning baselines (par level, coverage floors).
    pub fn median_days(&self) -> u32 {
        match *self {
            LeadTimeSpec::Fixed { days } => days,
            LeadTimeSpec::LogNormal { median_days, .. } => median_days.round().max(1.0) as u32,
        }
    }

    pub fn is_stochastic(&self) -> bool {
        matches!(self, LeadTimeSpec::LogNormal { .. })
    }
}

impl Default for LeadTimeSpec {
    fn default() -> Self {
        LeadTimeSpec::Fixed {
            days: DEFAULT_LEAD_TIME_DAYS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShelfLifeMode {
    #[default]
    Labeled,
    /// Labeled life minus the days stock is pulled before its label date.
    Effective,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelfLifeSpec {
    pub labeled_days: u32,
    #[serde(default)]
    pub mode: ShelfLifeMode,
    #[serde(default)]
    pub pull_buffer_days: u32,
}

impl ShelfLifeSpec {
    pub fn labeled(days: u32) -> Self {
        Self {
            labeled_days: days,
            mode: ShelfLifeMode::Labeled,
            pull_buffer_days: 0,
        }
    }

    pub fn effective(days: u32, pull_buffer_days: u32) -> Self {
        Self {
            labeled_days: days,
            mode: ShelfLifeMode::Effective,
            pull_buffer_days,
        }
    }

    /// Shelf life lots are actually given in the ledger. Never below one day.
    pub fn effective_days(&self) -> u32 {
        let days = match self.mode {
            ShelfLifeMode::Labeled => self.labeled_days,
            ShelfLifeMode::Effective => self.labeled_days.saturating_sub(self.pull_buffer_days),
        };
        days.max(1)
    }
}

impl Default for ShelfLifeSpec {
    fn default() -> Self {
        Self::labeled(DEFAULT_SHELF_LIFE_DAYS)
    }
}

/// Per-category sizing knobs for forecast-driven ordering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryPreset {
    pub order_buffer: f64,
    pub order_multiplier: f64,
    /// Largest order, in days of recent consumption.
    pub order_cap_days: f64,
    /// Starting point of the dynamic safety ratio.
    pub base_safety_ratio: f64,
}

/// Versioned table of category presets handed to the policy engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyTable {
    pub version: u32,
    pub presets: BTreeMap<String, CategoryPreset>,
}

impl StrategyTable {
    pub fn preset(&self, category: &str) -> Result<&CategoryPreset> {
        self.presets
            .get(category)
            .ok_or_else(|| SimError::UnknownCategory(category.to_string()))
    }

    fn validate(&self) -> Result<()> {
        for (tag, preset) in &self.presets {
            let values = [
                preset.order_buffer,
                preset.order_multiplier,
                preset.order_cap_days,
                preset.base_safety_ratio,
            ];
            if values.iter().any(|v| !v.is_finite() || *v <= 0.0) {
                return Err(SimError::invalid(
                    "strategy.presets",
                    format!("preset {tag} must have positive finite values"),
                ));
            }
        }
        Ok(())
    }
}

impl Default for StrategyTable {
    fn default() -> Self {
        let rows = [
            // stable, high volume
            ("A", 1.10, 1.00, 21.0, 1.2),
            // intermittent, low volume
            ("B", 1.25, 0.80, 30.0, 1.5),
            // weekday/weekend pattern
            ("C", 1.15, 1.00, 21.0, 1.3),
            // trending
            ("D", 1.20, 1.10, 28.0, 1.4),
            // bursty, critical
            ("E", 1.30, 1.20, 35.0, 1.6),
        ];
        let presets = rows
            .into_iter()
            .map(|(tag, order_buffer, order_multiplier, order_cap_days, base_safety_ratio)| {
                (
                    tag.to_string(),
                    CategoryPreset {
                        order_buffer,
                        order_multiplier,
                        order_cap_days,
                        base_safety_ratio,
                    },
                )
            })
            .collect();
        Self {
            version: 1,
            presets,
        }
    }
}

/// Static replenishment parameters of one SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyContext {
    pub category: String,
    #[serde(default)]
    pub lead_time: LeadTimeSpec,
    #[serde(default)]
    pub shelf_life: ShelfLifeSpec,
    #[serde(default)]
    pub order_cadence_days: Option<u32>,
    #[serde(default)]
    pub moq_units: Option<u32>,
    #[serde(default)]
    pub spq_units: Option<u32>,
    #[serde(default)]
    pub par_level_days: Option<u32>,
    #[serde(default)]
    pub service_level_target: Option<f64>,
    #[serde(default)]
    pub criticality: Option<Criticality>,
    #[serde(default)]
    pub mode: OrderingMode,
    #[serde(default)]
    pub par_cap_enabled: bool,
}

impl PolicyContext {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            lead_time: LeadTimeSpec::default(),
            shelf_life: ShelfLifeSpec::default(),
            order_cadence_days: None,
            moq_units: None,
            spq_units: None,
            par_level_days: None,
            service_level_target: None,
            criticality: None,
            mode: OrderingMode::default(),
            par_cap_enabled: false,
        }
    }

    pub fn with_mode(mut self, mode: OrderingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_lead_time(mut self, lead_time: LeadTimeSpec) -> Self {
        self.lead_time = lead_time;
        self
    }

    pub fn with_shelf_life(mut self, shelf_life: ShelfLifeSpec) -> Self {
        self.shelf_life = shelf_life;
        self
    }

    pub fn with_cadence(mut self, days: u32) -> Self {
        self.order_cadence_days = Some(days);
        self
    }

    pub fn with_moq(mut self, units: u32) -> Self {
        self.moq_units = Some(units);
        self
    }

    pub fn with_spq(mut self, units: u32) -> Self {
        self.spq_units = Some(units);
        self
    }

    pub fn with_par_level_days(mut self, days: u32) -> Self {
        self.par_level_days = Some(days);
        self
    }

    pub fn with_service_level(mut self, target: f64) -> Self {
        self.service_level_target = Some(target);
        self
    }

    pub fn with_criticality(mut self, criticality: Criticality) -> Self {
        self.criticality = Some(criticality);
        self
    }

    pub fn with_par_cap(mut self, enabled: bool) -> Self {
        self.par_cap_enabled = enabled;
        self
    }

    /// Category E is treated as critical unless stated otherwise.
    pub fn criticality(&self) -> Criticality {
        self.criticality.unwrap_or(if self.category == "E" {
            Criticality::Critical
        } else {
            Criticality::Routine
        })
    }

    pub fn service_level(&self) -> f64 {
        self.service_level_target
            .unwrap_or(match self.criticality() {
                Criticality::Critical => CRITICAL_SERVICE_LEVEL,
                Criticality::Routine => ROUTINE_SERVICE_LEVEL,
            })
    }

    pub fn cadence_days(&self) -> u32 {
        self.order_cadence_days.unwrap_or(DEFAULT_CADENCE_DAYS)
    }

    pub fn par_days(&self) -> u32 {
        self.par_level_days.unwrap_or(DEFAULT_PAR_LEVEL_DAYS)
    }

    pub fn validate(&self, table: &StrategyTable) -> Result<()> {
        if self.category.trim().is_empty() {
            return Err(SimError::MissingField("category"));
        }
        table.preset(&self.category)?;

        if self.mode == OrderingMode::ParDriven && self.par_level_days.is_none() {
            return Err(SimError::MissingField("par_level_days"));
        }

        match self.lead_time {
            LeadTimeSpec::Fixed { days } if days == 0 => {
                return Err(SimError::invalid("lead_time.days", "must be at least 1"));
            }
            LeadTimeSpec::LogNormal {
                median_days,
                p95_days,
            } => {
                LogNormalLeadTime::from_quantiles(median_days, p95_days)?;
            }
            _ => {}
        }

        if self.shelf_life.labeled_days == 0 {
            return Err(SimError::invalid(
                "shelf_life.labeled_days",
                "must be at least 1",
            ));
        }
        if self.order_cadence_days == Some(0) {
            return Err(SimError::invalid("order_cadence_days", "must be at least 1"));
        }
        if self.moq_units == Some(0) {
            return Err(SimError::invalid("moq_units", "use null to disable"));
        }
        if self.spq_units == Some(0) {
            return Err(SimError::invalid("spq_units", "use null to disable"));
        }
        let service = self.service_level();
        if !(service > 0.0 && service < 1.0) {
            return Err(SimError::invalid(
                "service_level_target",
                format!("{service} is outside (0, 1)"),
            ));
        }
        Ok(())
    }
}

fn default_initial_stock_ratio() -> f64 {
    2.0
}

/// Everything one run needs besides the demand series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub context: PolicyContext,
    #[serde(default)]
    pub strategy: StrategyTable,
    #[serde(default)]
    pub seed: u64,
    /// Units in the seed lot. Defaults to `initial_stock_ratio` months of average usage.
    #[serde(default)]
    pub initial_stock: Option<u32>,
    #[serde(default = "default_initial_stock_ratio")]
    pub initial_stock_ratio: f64,
    #[serde(default)]
    pub stockout_basis: StockoutBasis,
}

impl SimulationConfig {
    pub fn new(context: PolicyContext) -> Self {
        Self {
            context,
            strategy: StrategyTable::default(),
            seed: 0,
            initial_stock: None,
            initial_stock_ratio: default_initial_stock_ratio(),
            stockout_basis: StockoutBasis::default(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_initial_stock(mut self, units: u32) -> Self {
        self.initial_stock = Some(units);
        self
    }

    pub fn with_strategy(mut self, strategy: StrategyTable) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.strategy.validate()?;
        self.context.validate(&self.strategy)?;
        if !self.initial_stock_ratio.is_finite() || self.initial_stock_ratio < 0.0 {
            return Err(SimError::invalid(
                "initial_stock_ratio",
                "must be a non-negative number",
            ));
        }
        Ok(())
    }

    pub fn preset(&self) -> Result<&CategoryPreset> {
        self.strategy.preset(&self.context.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("forecast_driven", OrderingMode::ForecastDriven)]
    #[case("par_driven", OrderingMode::ParDriven)]
    #[case("auto", OrderingMode::Auto)]
    #[case("forecast_capped", OrderingMode::ForecastCapped)]
    fn mode_strings_round_trip(#[case] raw: &str, #[case] mode: OrderingMode) {
        assert_eq!(raw.parse::<OrderingMode>().unwrap(), mode);
        assert_eq!(mode.to_string(), raw);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(matches!(
            "min_max".parse::<OrderingMode>(),
            Err(SimError::UnknownMode(_))
        ));
    }

    #[test]
    fn effective_shelf_life_subtracts_pull_buffer() {
        assert_eq!(ShelfLifeSpec::effective(180, 30).effective_days(), 150);
        assert_eq!(ShelfLifeSpec::effective(10, 30).effective_days(), 1);
        assert_eq!(ShelfLifeSpec::labeled(180).effective_days(), 180);
    }

    #[test]
    fn unknown_category_fails_validation() {
        let config = SimulationConfig::new(PolicyContext::new("Z"));
        assert!(matches!(
            config.validate(),
            Err(SimError::UnknownCategory(tag)) if tag == "Z"
        ));
    }

    #[test]
    fn par_mode_requires_par_days() {
        let config =
            SimulationConfig::new(PolicyContext::new("A").with_mode(OrderingMode::ParDriven));
        assert!(matches!(
            config.validate(),
            Err(SimError::MissingField("par_level_days"))
        ));
    }

    #[test]
    fn category_e_defaults_to_critical_service_level() {
        let ctx = PolicyContext::new("E");
        assert_eq!(ctx.criticality(), Criticality::Critical);
        assert_eq!(ctx.service_level(), CRITICAL_SERVICE_LEVEL);
        assert_eq!(PolicyContext::new("A").service_level(), ROUTINE_SERVICE_LEVEL);
    }

    #[test]
    fn parses_json_config() {
        let raw = r#"{
            "context": {
                "category": "B",
                "mode": "par_driven",
                "par_level_days": 15,
                "lead_time": { "distribution": "log_normal", "median_days": 5.0, "p95_days": 15.0 },
                "shelf_life": { "labeled_days": 180, "mode": "effective", "pull_buffer_days": 30 },
                "moq_units": 200,
                "spq_units": 25
            },
            "seed": 42
        }"#;
        let config = SimulationConfig::from_json(raw).unwrap();
        assert_eq!(config.context.mode, OrderingMode::ParDriven);
        assert_eq!(config.context.shelf_life.effective_days(), 150);
        assert_eq!(config.context.lead_time.median_days(), 5);
        assert_eq!(config.strategy.version, 1);
        assert_eq!(config.initial_stock_ratio, 2.0);
    }

    #[test]
    fn missing_category_is_a_config_error() {
        let err = SimulationConfig::from_json(r#"{ "context": { "mode": "auto" } }"#).unwrap_err();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn inverted_lead_time_quantiles_are_rejected() {
        let ctx = PolicyContext::new("A").with_lead_time(LeadTimeSpec::LogNormal {
            median_days: 10.0,
            p95_days: 4.0,
        });
        assert!(SimulationConfig::new(ctx).validate().is_err());
    }
}
