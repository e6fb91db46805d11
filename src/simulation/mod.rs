pub mod config;
pub mod engine;
pub mod lead_time;
pub mod metrics;
pub mod rng;
pub mod scenario;

pub use config::{
    CategoryPreset, Criticality, LeadTimeSpec, OrderingMode, PolicyContext, ShelfLifeMode, ShelfLifeSpec,
    SimulationConfig, StrategyTable,
};
pub use engine::{simulate_inventory, DailySeries, DailyState, InventorySimulation, SimulationRun};
pub use lead_time::{LeadTimeSampler, LogNormalLeadTime};
pub use metrics::{ForecastAccuracy, StockoutBasis, SummaryMetrics};
pub use rng::SimRng;
pub use scenario::{evaluate_forecast, generate_scenario, ForecastEvaluation, ScenarioMetadata, ScenarioOutput};
