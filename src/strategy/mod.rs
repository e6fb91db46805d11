pub mod implementations;
pub mod optimization;
pub mod selector;
pub mod service_level;
pub mod traits;

pub use implementations::{ForecastDrivenPolicy, PackRules, ParDrivenPolicy};
pub use selector::{explain_policy, select_ordering_policy, PolicyChoice, PolicyInputs, SelectorThresholds};
pub use service_level::{SafetyAdjustment, SafetyStockController};
pub use traits::{DayView, OrderDecision, OrderKind, ReplenishmentPolicy};
