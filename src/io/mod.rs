pub mod demand;

pub use demand::{ArchetypeParams, DemandArchetype, DemandStats, HospitalSize, TrendKind};
