pub mod contract;
pub mod directed_energy;
pub mod kinetic;
pub mod recommend;
pub mod rf_jammer;

pub use contract::{Effector, EffectorError, EffectorHealth};
pub use directed_energy::{DirectedEnergy, DirectedEnergyConfig};
pub use kinetic::{KineticConfig, KineticInterceptor};
pub use recommend::{recommend_best, recommend_score};
pub use rf_jammer::{RfJammer, RfJammerConfig};
