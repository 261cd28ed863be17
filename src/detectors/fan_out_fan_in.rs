// src/detectors/fan_out_fan_in.rs
use crate::detectors::PatternDetector;
use crate::graph::TransactionGraph;
use crate::types::{PatternKind, PatternResult, PatternSubtype};

/// Smurfing: funds split across many destinations, optionally reaggregated
/// through many sources.
pub struct FanOutFanInDetector;

impl PatternDetector for FanOutFanInDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::FanOutFanIn
    }

    fn detect(&self, wallet: &str, graph: &TransactionGraph) -> PatternResult {
        let out_edges = graph.out_edges(wallet);
        let in_edges = graph.in_edges(wallet);
        let out_count = out_edges.len();
        let in_count = in_edges.len();

        let mut confidence = 0.0_f64;
        let mut evidence = Vec::new();
        let mut subtype = PatternSubtype::SimpleFanOut;

        // High fan-out is the primary indicator.
        if out_count >= 10 {
            confidence += 0.5;
            evidence.push(format!("High fan-out: {out_count} destinations"));
        } else if out_count >= 5 {
            confidence += 0.3;
            evidence.push(format!("Moderate fan-out: {out_count} destinations"));
        }

        // Fan-in alongside fan-out indicates reaggregation.
        if in_count >= 5 && out_count >= 5 {
            confidence += 0.3;
            subtype = PatternSubtype::MultiLayerReaggregation;
            evidence.push(format!(
                "Reaggregation detected: {in_count} sources, {out_count} destinations"
            ));
        } else if in_count >= 3 && out_count >= 5 {
            confidence += 0.2;
            subtype = PatternSubtype::CollectionRedistribution;
            evidence.push(format!(
                "Collection point: {in_count} sources -> {out_count} destinations"
            ));
        }

        // Similar outgoing amounts point at structuring.
        if !out_edges.is_empty() {
            let amounts: Vec<f64> = out_edges.iter().map(|(_, data)| data.total_amount).collect();
            let mean = amounts.iter().sum::<f64>() / amounts.len() as f64;
            if mean > 0.0 {
                let similar = amounts.iter().filter(|amt| (*amt - mean).abs() < mean * 0.2).count();
                if similar as f64 / amounts.len() as f64 > 0.7 {
                    confidence += 0.2;
                    evidence.push(format!(
                        "Structured amounts: {similar}/{} similar",
                        amounts.len()
                    ));
                }
            }
        }

        let illicit_sources = in_edges.iter().filter(|(src, _)| graph.is_illicit(src)).count();
        if illicit_sources > 0 {
            confidence += 0.3;
            evidence.push(format!(
                "Direct connection to {illicit_sources} illicit wallet(s)"
            ));
        }

        PatternResult {
            pattern: PatternKind::FanOutFanIn,
            confidence: confidence.min(1.0),
            subtype,
            evidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic;
    use crate::types::Transaction;
    use chrono::{TimeZone, Utc};

    fn start() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 31, 10, 0, 0).unwrap()
    }

    fn fan_out(graph: &mut TransactionGraph, hub: &str, destinations: usize, amount: f64) {
        let batch = synthetic::smurfing_fan_out(hub, None, destinations, amount, start());
        graph.load_transactions(&batch);
    }

    #[test]
    fn test_zero_edge_wallet_scores_zero() {
        let graph = TransactionGraph::new();
        let result = FanOutFanInDetector.detect("isolated", &graph);
        assert_eq!(result.confidence, 0.0);
        assert!(result.evidence.is_empty());
    }

    #[test]
    fn test_high_fan_out_with_structuring() {
        let mut graph = TransactionGraph::new();
        fan_out(&mut graph, "hub", 12, 100.0);

        let result = FanOutFanInDetector.detect("hub", &graph);
        // 0.5 fan-out + 0.2 structuring (identical amounts).
        assert!((result.confidence - 0.7).abs() < 1e-9);
        assert_eq!(result.subtype, PatternSubtype::SimpleFanOut);
    }

    #[test]
    fn test_reaggregation_subtype() {
        let mut graph = TransactionGraph::new();
        fan_out(&mut graph, "hub", 6, 100.0);
        let inbound: Vec<Transaction> = (0..5)
            .map(|i| Transaction {
                source_wallet: format!("src{i}"),
                dest_wallet: "hub".to_string(),
                amount: 50.0,
                timestamp: start(),
                token_type: "ETH".to_string(),
            })
            .collect();
        graph.load_transactions(&inbound);

        let result = FanOutFanInDetector.detect("hub", &graph);
        assert_eq!(result.subtype, PatternSubtype::MultiLayerReaggregation);
        // 0.3 fan-out + 0.3 reaggregation + 0.2 structuring.
        assert!((result.confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_illicit_inbound_bonus() {
        let mut graph = TransactionGraph::new();
        let batch = synthetic::smurfing_fan_out("mule", Some("0xbad"), 10, 9.9, start());
        graph.load_transactions(&batch);
        graph.mark_illicit(["0xbad"]);

        let result = FanOutFanInDetector.detect("mule", &graph);
        // 0.5 fan-out + 0.2 structuring + 0.3 illicit inbound.
        assert!((result.confidence - 1.0).abs() < 1e-9);
        assert!(result.evidence.iter().any(|e| e.contains("illicit")));
    }
}
