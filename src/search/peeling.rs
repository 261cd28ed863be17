// src/search/peeling.rs
use crate::graph::TransactionGraph;
use crate::types::{PeelingChainRecord, SearchOutcome};
use std::collections::VecDeque;
use tracing::{debug, warn};
use uuid::Uuid;

const PEEL_STEP_THRESHOLD: f64 = 0.95;
const PEEL_RATIO_THRESHOLD: f64 = 0.7;

/// Detect peeling chains starting at a wallet: breadth-first walk
/// accumulating the aggregate amount at each hop, qualifying every path of
/// at least `min_hops` wallets whose amounts keep stepping down.
///
/// Visited state is tracked per path (a path never revisits its own
/// wallets), not globally, so alternate branches through shared wallets
/// are all considered. Total exploration is bounded by `max_queue_states`;
/// exhausting the budget sets the `truncated` flag.
pub fn detect_peeling_chain(
    graph: &TransactionGraph,
    wallet: &str,
    min_hops: usize,
    max_queue_states: usize,
) -> SearchOutcome<PeelingChainRecord> {
    if !graph.contains(wallet) {
        return SearchOutcome::empty();
    }

    let mut records = Vec::new();
    let mut truncated = false;
    let mut states = 0usize;

    let mut queue: VecDeque<(String, Vec<String>, Vec<f64>)> =
        VecDeque::from([(wallet.to_string(), vec![wallet.to_string()], Vec::new())]);

    while let Some((current, path, amounts)) = queue.pop_front() {
        if states >= max_queue_states {
            truncated = true;
            break;
        }
        states += 1;

        if path.len() >= min_hops && is_peeling_sequence(&amounts) {
            let total_peeled = amounts.iter().sum::<f64>() - amounts.last().copied().unwrap_or(0.0);
            records.push(PeelingChainRecord {
                id: Uuid::new_v4(),
                source: wallet.to_string(),
                chain: path.clone(),
                amounts: amounts.clone(),
                total_peeled,
                suspicion_score: peeling_score(&amounts),
            });
        }

        for successor in graph.successors(&current) {
            if path.iter().any(|node| node == successor) {
                continue;
            }
            let Some(edge) = graph.edge(&current, successor) else {
                continue;
            };
            let mut next_path = path.clone();
            next_path.push(successor.to_string());
            let mut next_amounts = amounts.clone();
            next_amounts.push(edge.total_amount);
            queue.push_back((successor.to_string(), next_path, next_amounts));
        }
    }

    if truncated {
        warn!(wallet, states, "peeling chain search hit the exploration budget");
    } else {
        debug!(wallet, states, found = records.len(), "peeling chain search done");
    }

    records.sort_by(|a, b| {
        b.suspicion_score.partial_cmp(&a.suspicion_score).unwrap_or(std::cmp::Ordering::Equal)
    });
    SearchOutcome { records, truncated }
}

/// At least 70% of consecutive amount pairs must drop by more than 5%.
fn is_peeling_sequence(amounts: &[f64]) -> bool {
    if amounts.len() < 3 {
        return false;
    }
    let decreasing = amounts
        .windows(2)
        .filter(|pair| pair[1] < pair[0] * PEEL_STEP_THRESHOLD)
        .count();
    decreasing as f64 >= (amounts.len() - 1) as f64 * PEEL_RATIO_THRESHOLD
}

/// Chain length, a moderate overall peel (10-50% of the opening amount)
/// and a large opening amount each add a bonus, capped at 1.0.
fn peeling_score(amounts: &[f64]) -> f64 {
    if amounts.is_empty() {
        return 0.0;
    }

    let mut score = 0.0_f64;
    if amounts.len() >= 10 {
        score += 0.4;
    } else if amounts.len() >= 5 {
        score += 0.2;
    }

    let first = amounts[0];
    let last = amounts[amounts.len() - 1];
    if first > 0.0 {
        let peel_percentage = (first - last) / first;
        if peel_percentage > 0.1 && peel_percentage < 0.5 {
            score += 0.3;
        }
    }

    if first > 10_000.0 {
        score += 0.3;
    }

    score.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic;
    use crate::types::Transaction;
    use chrono::{Duration, TimeZone, Utc};

    fn start() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 31, 10, 0, 0).unwrap()
    }

    fn chain(amounts: &[f64]) -> Vec<Transaction> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, &amount)| Transaction {
                source_wallet: format!("n{i}"),
                dest_wallet: format!("n{}", i + 1),
                amount,
                timestamp: start() + Duration::minutes(i as i64),
                token_type: "ETH".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_unknown_wallet_yields_empty_outcome() {
        let graph = TransactionGraph::new();
        let outcome = detect_peeling_chain(&graph, "missing", 5, 1000);
        assert!(outcome.records.is_empty());
        assert!(!outcome.truncated);
    }

    #[test]
    fn test_decreasing_chain_is_detected() {
        let mut graph = TransactionGraph::new();
        // n0 -> n1 -> n2 -> n3 -> n4 -> n5 with 6% peels.
        graph.load_transactions(&chain(&[100.0, 94.0, 88.0, 82.0, 76.0]));

        let outcome = detect_peeling_chain(&graph, "n0", 5, 1000);
        assert!(!outcome.truncated);
        assert!(!outcome.records.is_empty());

        let longest = outcome
            .records
            .iter()
            .max_by_key(|record| record.chain.len())
            .expect("at least one record");
        assert_eq!(longest.chain.len(), 6);
        assert!(longest.suspicion_score > 0.0);
        assert!((longest.total_peeled - (100.0 + 94.0 + 88.0 + 82.0)).abs() < 1e-9);
    }

    #[test]
    fn test_flat_chain_is_not_peeling() {
        let mut graph = TransactionGraph::new();
        graph.load_transactions(&chain(&[100.0, 100.0, 100.0, 100.0, 100.0]));

        let outcome = detect_peeling_chain(&graph, "n0", 5, 1000);
        assert!(outcome.records.is_empty());
    }

    #[test]
    fn test_large_initial_amount_bonus() {
        let mut graph = TransactionGraph::new();
        let batch = synthetic::peeling_chain("p", 6, 50_000.0, 0.2, start());
        graph.load_transactions(&batch);

        let outcome = detect_peeling_chain(&graph, "p0", 5, 1000);
        let best = &outcome.records[0];
        // Shortest qualifying path keeps the cumulative peel inside the
        // moderate band: 0.3 peel + 0.3 large initial amount.
        assert!((best.suspicion_score - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_branching_does_not_prune_alternate_chains() {
        let mut graph = TransactionGraph::new();
        // Two peeling branches share the first hop; per-path visited state
        // must keep both.
        let mut batch = chain(&[1000.0, 940.0, 880.0, 820.0]);
        batch.push(Transaction {
            source_wallet: "n1".to_string(),
            dest_wallet: "alt2".to_string(),
            amount: 930.0,
            timestamp: start(),
            token_type: "ETH".to_string(),
        });
        batch.push(Transaction {
            source_wallet: "alt2".to_string(),
            dest_wallet: "alt3".to_string(),
            amount: 870.0,
            timestamp: start(),
            token_type: "ETH".to_string(),
        });
        batch.push(Transaction {
            source_wallet: "alt3".to_string(),
            dest_wallet: "alt4".to_string(),
            amount: 810.0,
            timestamp: start(),
            token_type: "ETH".to_string(),
        });
        graph.load_transactions(&batch);

        let outcome = detect_peeling_chain(&graph, "n0", 5, 10_000);
        let through_main = outcome.records.iter().any(|r| r.chain.contains(&"n4".to_string()));
        let through_alt = outcome.records.iter().any(|r| r.chain.contains(&"alt4".to_string()));
        assert!(through_main && through_alt);
    }

    #[test]
    fn test_budget_truncation_is_flagged() {
        let mut graph = TransactionGraph::new();
        let batch = chain(&[100.0, 94.0, 88.0, 82.0, 76.0]);
        graph.load_transactions(&batch);

        let outcome = detect_peeling_chain(&graph, "n0", 5, 2);
        assert!(outcome.truncated);
        assert!(outcome.records.is_empty());
    }
}
