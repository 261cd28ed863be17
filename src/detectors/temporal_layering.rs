// src/detectors/temporal_layering.rs
use crate::detectors::PatternDetector;
use crate::graph::TransactionGraph;
use crate::types::{PatternKind, PatternResult, PatternSubtype};
use chrono::Timelike;

const MIN_SAMPLES: usize = 5;

/// Time-based obfuscation: rapid bursts, machine-regular intervals, and
/// off-hours activity across everything the wallet touches.
pub struct TemporalLayeringDetector;

impl PatternDetector for TemporalLayeringDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::TemporalLayering
    }

    fn detect(&self, wallet: &str, graph: &TransactionGraph) -> PatternResult {
        let mut timestamps = graph.incident_timestamps(wallet);
        if timestamps.len() < MIN_SAMPLES {
            return PatternResult {
                pattern: PatternKind::TemporalLayering,
                confidence: 0.0,
                subtype: PatternSubtype::InsufficientData,
                evidence: Vec::new(),
            };
        }
        timestamps.sort();

        let deltas: Vec<f64> = timestamps
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).num_seconds() as f64)
            .collect();
        let mean_delta = deltas.iter().sum::<f64>() / deltas.len() as f64;
        let variance =
            deltas.iter().map(|d| (d - mean_delta).powi(2)).sum::<f64>() / deltas.len() as f64;
        let std_delta = variance.sqrt();

        let span_hours =
            (timestamps[timestamps.len() - 1] - timestamps[0]).num_seconds() as f64 / 3600.0;
        let count = timestamps.len();

        let mut confidence = 0.0_f64;
        let mut evidence = Vec::new();

        if span_hours < 24.0 && count > 10 {
            confidence += 0.4;
            evidence.push(format!("Rapid layering: {count} txn in {span_hours:.1} hours"));
        }

        // Near-constant inter-arrival gaps look automated.
        let low_variance = std_delta < mean_delta * 0.2;
        if low_variance && deltas.len() > 5 {
            confidence += 0.3;
            evidence.push(format!(
                "Automated timing: consistent {:.1}min intervals",
                mean_delta / 60.0
            ));
        }

        let off_hours = timestamps.iter().filter(|ts| (2..5).contains(&ts.hour())).count();
        if off_hours as f64 / count as f64 > 0.3 {
            confidence += 0.2;
            evidence.push(format!("Off-hours activity: {off_hours}/{count} txn at 2-5am"));
        }

        let subtype = if span_hours < 6.0 {
            PatternSubtype::RapidBurst
        } else if low_variance {
            PatternSubtype::AutomatedTiming
        } else {
            PatternSubtype::DistributedLayering
        };

        PatternResult {
            pattern: PatternKind::TemporalLayering,
            confidence: confidence.min(1.0),
            subtype,
            evidence,
        }
    }
}
