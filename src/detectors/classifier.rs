// src/detectors/classifier.rs
use crate::detectors::{
    CyclicWashDetector, FanOutFanInDetector, PatternDetector, PeelingChainDetector,
    TemporalLayeringDetector,
};
use crate::graph::TransactionGraph;
use crate::types::{MixedStrategy, PatternClassification, PatternResult};
use tracing::debug;

const RETAIN_THRESHOLD: f64 = 0.3;
const MIXED_SECONDARY_THRESHOLD: f64 = 0.5;

/// Runs every detector against a wallet and merges the results into one
/// verdict: the dominant pattern, a mixed strategy when two patterns are
/// both strong, or normal activity.
pub struct PatternClassifier {
    detectors: Vec<Box<dyn PatternDetector>>,
}

impl PatternClassifier {
    pub fn new() -> Self {
        Self {
            detectors: vec![
                Box::new(FanOutFanInDetector),
                Box::new(PeelingChainDetector),
                Box::new(CyclicWashDetector),
                Box::new(TemporalLayeringDetector),
            ],
        }
    }

    pub fn classify(&self, wallet: &str, graph: &TransactionGraph) -> PatternClassification {
        let mut retained: Vec<PatternResult> = self
            .detectors
            .iter()
            .map(|detector| detector.detect(wallet, graph))
            .filter(|result| result.confidence > RETAIN_THRESHOLD)
            .collect();

        if retained.is_empty() {
            return PatternClassification::Normal;
        }

        // Stable sort keeps detector order for equal confidences.
        retained.sort_by(|a, b| {
            b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal)
        });

        if retained.len() >= 2 && retained[1].confidence > MIXED_SECONDARY_THRESHOLD {
            let secondary = retained.swap_remove(1);
            let primary = retained.swap_remove(0);
            debug!(
                wallet,
                primary = primary.pattern.label(),
                secondary = secondary.pattern.label(),
                "mixed laundering strategy"
            );

            let mut evidence = primary.evidence.clone();
            evidence.extend(secondary.evidence.iter().cloned());

            return PatternClassification::Mixed(MixedStrategy {
                confidence: (primary.confidence + secondary.confidence * 0.3).min(1.0),
                subtype: format!("{}_{}", primary.pattern.label(), secondary.pattern.label()),
                evidence,
                primary,
                secondary,
            });
        }

        PatternClassification::Single(retained.swap_remove(0))
    }
}

impl Default for PatternClassifier {
    fn default() -> Self {
        Self::new()
    }
}
