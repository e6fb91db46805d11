pub mod ledger;
pub mod lot;
pub mod queues;

pub use ledger::{BatchLedger, Consumption};
pub use lot::{Lot, LotId};
pub use queues::OrderPipeline;
