// src/detectors/mod.rs
pub mod classifier;
pub mod cyclic_wash;
pub mod fan_out_fan_in;
pub mod peeling_chain;
pub mod temporal_layering;

pub use classifier::PatternClassifier;
pub use cyclic_wash::CyclicWashDetector;
pub use fan_out_fan_in::FanOutFanInDetector;
pub use peeling_chain::PeelingChainDetector;
pub use temporal_layering::TemporalLayeringDetector;

use crate::graph::TransactionGraph;
use crate::types::{PatternKind, PatternResult};

/// Stateless scoring of one wallet against one laundering archetype.
///
/// Implementations read the graph (including its illicit seed set) and
/// never mutate anything. A wallet with no incident edges must come back
/// with confidence 0, never a panic.
pub trait PatternDetector {
    fn kind(&self) -> PatternKind;

    fn detect(&self, wallet: &str, graph: &TransactionGraph) -> PatternResult;
}
