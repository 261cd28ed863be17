// src/detectors/peeling_chain.rs
use crate::detectors::PatternDetector;
use crate::graph::TransactionGraph;
use crate::types::{PatternKind, PatternResult, PatternSubtype};

const MAX_CHAIN_DEPTH: usize = 10;

/// Peeling: value pushed along a chain of wallets, a small amount removed
/// at each hop. The signature is long single-successor chains and a low
/// fan-out with steadily decreasing amounts.
pub struct PeelingChainDetector;

impl PeelingChainDetector {
    /// Length of the single-successor chain starting at `wallet`. A node
    /// extends the chain only while its out-degree is exactly 1.
    fn chain_length(graph: &TransactionGraph, wallet: &str) -> usize {
        let mut current = wallet.to_string();
        let mut depth = 0;
        while depth < MAX_CHAIN_DEPTH {
            let successors = graph.successors(&current);
            if successors.len() != 1 {
                break;
            }
            current = successors[0].to_string();
            depth += 1;
        }
        depth
    }
}

impl PatternDetector for PeelingChainDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::PeelingChain
    }

    fn detect(&self, wallet: &str, graph: &TransactionGraph) -> PatternResult {
        let out_edges = graph.out_edges(wallet);
        if out_edges.is_empty() {
            return PatternResult {
                pattern: PatternKind::PeelingChain,
                confidence: 0.0,
                subtype: PatternSubtype::NoPattern,
                evidence: Vec::new(),
            };
        }

        let mut confidence = 0.0_f64;
        let mut evidence = Vec::new();

        let max_chain = out_edges
            .iter()
            .map(|(dest, _)| Self::chain_length(graph, dest))
            .max()
            .unwrap_or(0);

        if max_chain >= 5 {
            confidence += 0.6;
            evidence.push(format!("Long transaction chain: {max_chain} hops"));
        } else if max_chain >= 3 {
            confidence += 0.3;
            evidence.push(format!("Medium transaction chain: {max_chain} hops"));
        }

        // Peeling typically has very few outputs with strictly shrinking
        // amounts.
        if out_edges.len() <= 3 {
            let mut amounts: Vec<f64> = out_edges.iter().map(|(_, data)| data.total_amount).collect();
            amounts.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
            if amounts.len() >= 2 {
                let decreasing = amounts.windows(2).all(|pair| pair[0] > pair[1] * 1.1);
                if decreasing {
                    confidence += 0.3;
                    evidence.push("Sequential peeling: decreasing amounts detected".to_string());
                }
            }
        }

        if out_edges.len() <= 2 {
            confidence += 0.2;
            evidence.push(format!("Linear progression: {} output(s)", out_edges.len()));
        }

        let subtype = if confidence > 0.5 {
            PatternSubtype::SequentialPeeling
        } else {
            PatternSubtype::LinearProgression
        };

        PatternResult {
            pattern: PatternKind::PeelingChain,
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
    use chrono::{TimeZone, Utc};

    fn start() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 31, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_no_outflow_scores_zero() {
        let graph = TransactionGraph::new();
        let result = PeelingChainDetector.detect("isolated", &graph);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.subtype, PatternSubtype::NoPattern);
    }

    #[test]
    fn test_long_chain_is_sequential_peeling() {
        let mut graph = TransactionGraph::new();
        let batch = synthetic::peeling_chain("peel", 8, 1000.0, 0.06, start());
        graph.load_transactions(&batch);

        let result = PeelingChainDetector.detect("peel0", &graph);
        // Chain below the first hop is >= 5 long and out-degree is 1:
        // 0.6 chain + 0.2 linear progression.
        assert!((result.confidence - 0.8).abs() < 1e-9);
        assert_eq!(result.subtype, PatternSubtype::SequentialPeeling);
    }

    #[test]
    fn test_chain_following_stops_at_branching_node() {
        let mut graph = TransactionGraph::new();
        // a -> b -> c, then c fans out to two wallets, chain ends there.
        let mut batch = synthetic::peeling_chain("w", 3, 100.0, 0.05, start());
        batch.extend(synthetic::smurfing_fan_out("w3", None, 2, 10.0, start()));
        graph.load_transactions(&batch);

        assert_eq!(PeelingChainDetector::chain_length(&graph, "w1"), 2);
    }

    #[test]
    fn test_decreasing_split_bonus() {
        let mut graph = TransactionGraph::new();
        // Two outputs, each followed by its own long tail; amounts shrink
        // by more than 10%.
        let mut batch = synthetic::peeling_chain("a", 6, 500.0, 0.06, start());
        batch.extend(synthetic::peeling_chain("b", 6, 400.0, 0.06, start()));
        // Wire the wallet under test in front of both tails.
        batch.push(crate::types::Transaction {
            source_wallet: "head".to_string(),
            dest_wallet: "a0".to_string(),
            amount: 300.0,
            timestamp: start(),
            token_type: "ETH".to_string(),
        });
        batch.push(crate::types::Transaction {
            source_wallet: "head".to_string(),
            dest_wallet: "b0".to_string(),
            amount: 200.0,
            timestamp: start(),
            token_type: "ETH".to_string(),
        });
        graph.load_transactions(&batch);

        let result = PeelingChainDetector.detect("head", &graph);
        // 0.6 long chain + 0.3 decreasing split + 0.2 low fan-out.
        assert!((result.confidence - 1.0).abs() < 1e-9);
        assert_eq!(result.subtype, PatternSubtype::SequentialPeeling);
    }
}
