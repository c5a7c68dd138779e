pub mod assessor;

pub use assessor::{DefendedAsset, ThreatAssessor, ThreatMetrics};
