// src/graph/centrality.rs
use crate::graph::TransactionGraph;
use crate::types::CentralityScores;
use petgraph::algo::kosaraju_scc;
use petgraph::Direction::{Incoming, Outgoing};
use std::collections::VecDeque;

const PAGERANK_DAMPING: f64 = 0.85;
const PAGERANK_MAX_ITER: usize = 100;
const PAGERANK_TOL: f64 = 1e-6;

/// Centrality measures for one wallet, recomputed against the current
/// graph state on every call (the graph may have mutated since the last
/// one). Degenerate inputs — empty graph, absent wallet, too few nodes —
/// yield the all-zero struct rather than an error.
///
/// Closeness is only defined here when the whole graph is strongly
/// connected; otherwise it is reported as 0.
pub fn centrality(graph: &TransactionGraph, wallet: &str) -> CentralityScores {
    let Some(target) = graph.index_of(wallet) else {
        return CentralityScores::default();
    };
    let raw = graph.raw();
    let n = raw.node_count();
    if n < 2 {
        return CentralityScores::default();
    }

    // Dense adjacency over positions 0..n; node indices are stable and we
    // never remove nodes, but positions keep the algorithms index-safe.
    let nodes: Vec<_> = raw.node_indices().collect();
    let position: std::collections::HashMap<_, _> =
        nodes.iter().enumerate().map(|(pos, &idx)| (idx, pos)).collect();
    let successors: Vec<Vec<usize>> = nodes
        .iter()
        .map(|&idx| {
            raw.neighbors_directed(idx, Outgoing)
                .map(|neighbor| position[&neighbor])
                .collect()
        })
        .collect();
    let target_pos = position[&target];

    let degree = {
        let total = raw.neighbors_directed(target, Outgoing).count()
            + raw.neighbors_directed(target, Incoming).count();
        total as f64 / (n - 1) as f64
    };

    let betweenness = brandes_betweenness(&successors, n)[target_pos];
    let pagerank = pagerank(&successors, n)[target_pos];

    let closeness = if kosaraju_scc(raw).len() == 1 {
        inward_closeness(target_pos, &successors, n)
    } else {
        0.0
    };

    CentralityScores { degree, betweenness, pagerank, closeness }
}

/// Brandes' algorithm over the directed, unweighted graph, normalized by
/// (n-1)(n-2).
fn brandes_betweenness(successors: &[Vec<usize>], n: usize) -> Vec<f64> {
    let mut scores = vec![0.0; n];
    if n < 3 {
        return scores;
    }

    for s in 0..n {
        let mut stack = Vec::with_capacity(n);
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0_f64; n];
        let mut dist = vec![-1_i64; n];
        sigma[s] = 1.0;
        dist[s] = 0;

        let mut queue = VecDeque::from([s]);
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for &w in &successors[v] {
                if dist[w] < 0 {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    preds[w].push(v);
                }
            }
        }

        let mut delta = vec![0.0_f64; n];
        while let Some(w) = stack.pop() {
            for &v in &preds[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != s {
                scores[w] += delta[w];
            }
        }
    }

    let scale = 1.0 / ((n - 1) as f64 * (n - 2) as f64);
    for score in &mut scores {
        *score *= scale;
    }
    scores
}

/// Power iteration with uniform teleport and uniform redistribution of
/// dangling mass.
fn pagerank(successors: &[Vec<usize>], n: usize) -> Vec<f64> {
    let uniform = 1.0 / n as f64;
    let mut ranks = vec![uniform; n];

    for _ in 0..PAGERANK_MAX_ITER {
        let mut next = vec![(1.0 - PAGERANK_DAMPING) * uniform; n];
        let mut dangling_mass = 0.0;

        for (v, out) in successors.iter().enumerate() {
            if out.is_empty() {
                dangling_mass += ranks[v];
                continue;
            }
            let share = ranks[v] / out.len() as f64;
            for &w in out {
                next[w] += PAGERANK_DAMPING * share;
            }
        }
        let dangling_share = PAGERANK_DAMPING * dangling_mass * uniform;
        for rank in &mut next {
            *rank += dangling_share;
        }

        let err: f64 = next.iter().zip(&ranks).map(|(a, b)| (a - b).abs()).sum();
        ranks = next;
        if err < n as f64 * PAGERANK_TOL {
            break;
        }
    }
    ranks
}

/// Closeness over inward distances: (n-1) / sum of BFS distances from every
/// other node to the target. Callers only invoke this on a strongly
/// connected graph, so every node is reachable.
fn inward_closeness(target_pos: usize, successors: &[Vec<usize>], n: usize) -> f64 {
    // BFS from the target along reversed edges.
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (v, out) in successors.iter().enumerate() {
        for &w in out {
            predecessors[w].push(v);
        }
    }

    let mut dist = vec![-1_i64; n];
    dist[target_pos] = 0;
    let mut queue = VecDeque::from([target_pos]);
    let mut total = 0_i64;
    while let Some(v) = queue.pop_front() {
        for &w in &predecessors[v] {
            if dist[w] < 0 {
                dist[w] = dist[v] + 1;
                total += dist[w];
                queue.push_back(w);
            }
        }
    }

    if total == 0 {
        return 0.0;
    }
    (n - 1) as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Transaction;
    use chrono::{TimeZone, Utc};

    fn txn(source: &str, dest: &str) -> Transaction {
        Transaction {
            source_wallet: source.to_string(),
            dest_wallet: dest.to_string(),
            amount: 1.0,
            timestamp: Utc.with_ymd_and_hms(2025, 1, 31, 10, 0, 0).unwrap(),
            token_type: "ETH".to_string(),
        }
    }

    #[test]
    fn test_empty_graph_and_absent_wallet_are_all_zero() {
        let graph = TransactionGraph::new();
        assert_eq!(centrality(&graph, "anything"), CentralityScores::default());

        let mut graph = TransactionGraph::new();
        graph.load_transactions(&[txn("A", "B")]);
        assert_eq!(centrality(&graph, "missing"), CentralityScores::default());
    }

    #[test]
    fn test_degree_centrality_of_hub() {
        let mut graph = TransactionGraph::new();
        graph.load_transactions(&[txn("hub", "a"), txn("hub", "b"), txn("hub", "c"), txn("x", "hub")]);

        // 5 nodes, hub touches 4 counterparties.
        let scores = centrality(&graph, "hub");
        assert!((scores.degree - 1.0).abs() < 1e-9);

        let leaf = centrality(&graph, "a");
        assert!((leaf.degree - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_betweenness_of_bridge_node() {
        let mut graph = TransactionGraph::new();
        graph.load_transactions(&[txn("A", "B"), txn("B", "C")]);

        // B carries the single A->C shortest path: raw 1.0, scaled by
        // 1/((n-1)(n-2)) = 1/2 for n = 3.
        let scores = centrality(&graph, "B");
        assert!((scores.betweenness - 0.5).abs() < 1e-9);
        assert_eq!(centrality(&graph, "A").betweenness, 0.0);
    }

    #[test]
    fn test_pagerank_is_a_distribution_and_favors_sinks() {
        let mut graph = TransactionGraph::new();
        graph.load_transactions(&[txn("a", "sink"), txn("b", "sink"), txn("c", "sink")]);

        let total: f64 = ["a", "b", "c", "sink"]
            .iter()
            .map(|wallet| centrality(&graph, wallet).pagerank)
            .sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert!(centrality(&graph, "sink").pagerank > centrality(&graph, "a").pagerank);
    }

    #[test]
    fn test_closeness_zero_unless_strongly_connected() {
        let mut graph = TransactionGraph::new();
        graph.load_transactions(&[txn("A", "B"), txn("B", "C")]);
        assert_eq!(centrality(&graph, "B").closeness, 0.0);

        // 3-cycle is strongly connected; inward distances to each node are
        // 1 and 2, so closeness = 2/3.
        let mut cycle = TransactionGraph::new();
        cycle.load_transactions(&[txn("A", "B"), txn("B", "C"), txn("C", "A")]);
        let scores = centrality(&cycle, "A");
        assert!((scores.closeness - 2.0 / 3.0).abs() < 1e-9);
    }
}
