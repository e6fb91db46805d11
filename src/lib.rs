//! Day-by-day simulation of perishable stock under forecast-driven and
//! par-driven replenishment, scored on waste and stockouts.

pub mod error;
pub mod io;
pub mod model;
pub mod simulation;
pub mod strategy;

pub use error::{Result, SimError};
pub use simulation::{
    evaluate_forecast, generate_scenario, simulate_inventory, InventorySimulation, OrderingMode, PolicyContext,
    SimulationConfig, SimulationRun, SummaryMetrics,
};
pub use strategy::{explain_policy, select_ordering_policy, PolicyChoice, PolicyInputs};
