// src/detectors/cyclic_wash.rs
use crate::detectors::PatternDetector;
use crate::graph::TransactionGraph;
use crate::types::{PatternKind, PatternResult, PatternSubtype};
use std::collections::HashSet;

/// Wash trading: value routed back to its origin, either directly or
/// through short cycles, often against the same counterparties over and
/// over.
pub struct CyclicWashDetector;

impl PatternDetector for CyclicWashDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::CyclicWash
    }

    fn detect(&self, wallet: &str, graph: &TransactionGraph) -> PatternResult {
        let mut confidence = 0.0_f64;
        let mut evidence = Vec::new();
        let mut cycles_found = 0usize;

        let successors: HashSet<&str> = graph.successors(wallet).into_iter().collect();
        let predecessors: HashSet<&str> = graph.predecessors(wallet).into_iter().collect();

        // Direct round trips: wallet -> X and X -> wallet.
        let round_trips = successors.intersection(&predecessors).count();
        if round_trips > 0 {
            confidence += 0.4;
            cycles_found += round_trips;
            evidence.push(format!("Direct round-trips with {round_trips} wallet(s)"));
        }

        // One 2-hop cycle (wallet -> A -> B -> wallet) is enough; counted once.
        'outer: for first in &successors {
            for second in graph.successors(first) {
                if second == wallet {
                    continue;
                }
                if graph.has_edge(second, wallet) {
                    confidence += 0.3;
                    cycles_found += 1;
                    evidence.push(format!("2-hop cycle detected through {first}"));
                    break 'outer;
                }
            }
        }

        // Repeated destinations across individual transfers.
        let out_edges = graph.out_edges(wallet);
        let outgoing_transfers: usize = out_edges.iter().map(|(_, data)| data.transaction_count).sum();
        if outgoing_transfers > 0 {
            let repeat_ratio = 1.0 - out_edges.len() as f64 / outgoing_transfers as f64;
            if repeat_ratio > 0.5 {
                confidence += 0.3;
                evidence.push(format!(
                    "Repetitive transactions: {:.1}% repeat rate",
                    repeat_ratio * 100.0
                ));
            }
        }

        let subtype = if cycles_found > 0 {
            PatternSubtype::CircularWash
        } else {
            PatternSubtype::RepetitivePattern
        };

        PatternResult {
            pattern: PatternKind::CyclicWash,
            confidence: confidence.min(1.0),
            subtype,
            evidence,
        }
    }
}
