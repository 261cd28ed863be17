// src/scoring/scalar.rs
use crate::graph::{centrality, TransactionGraph};

const ILLICIT_WEIGHT: f64 = 0.5;
const CENTRALITY_WEIGHT: f64 = 0.2;
const ANOMALY_WEIGHT: f64 = 0.3;

/// Scalar suspicion score in [0, 1]: illicit proximity weighted 50%,
/// centrality 20%, transaction-pattern anomalies 30%.
///
/// Calibrated independently of [`super::suspicion_breakdown`]; the two can
/// diverge for the same wallet and no reconciliation is attempted.
pub fn suspicion_score(graph: &TransactionGraph, wallet: &str) -> f64 {
    let mut score = 0.0;

    // 1. Connection to known illicit wallets.
    let distance = graph.distance_to_illicit(wallet);
    let illicit_connection = match distance {
        0 => 1.0,
        1 => {
            let from_illicit: f64 = graph
                .in_edges(wallet)
                .iter()
                .filter(|(src, _)| graph.is_illicit(src))
                .map(|(_, data)| data.total_amount)
                .sum();
            if from_illicit > 100.0 {
                0.9
            } else if from_illicit > 0.0 {
                0.7
            } else {
                0.5
            }
        }
        2 => 0.3,
        3 => 0.15,
        _ => 0.0,
    };
    score += illicit_connection * ILLICIT_WEIGHT;

    // 2. Centrality composite.
    let scores = centrality(graph, wallet);
    let centrality_composite =
        scores.degree * 0.3 + scores.betweenness * 0.4 + scores.pagerank * 0.3;
    score += centrality_composite * CENTRALITY_WEIGHT;

    // 3. Transaction pattern anomalies.
    score += transaction_anomaly(graph, wallet) * ANOMALY_WEIGHT;

    score.min(1.0)
}

/// Heuristic anomaly score over the wallet's local topology, capped at 1.0.
fn transaction_anomaly(graph: &TransactionGraph, wallet: &str) -> f64 {
    let mut score = 0.0_f64;

    let out_edges = graph.out_edges(wallet);
    let in_edges = graph.in_edges(wallet);
    let total_received: f64 = in_edges.iter().map(|(_, data)| data.total_amount).sum();
    let total_sent: f64 = out_edges.iter().map(|(_, data)| data.total_amount).sum();

    // Receiving and immediately splitting is the classic mule shape.
    if !in_edges.is_empty() && out_edges.len() >= 5 {
        let has_illicit_source = in_edges.iter().any(|(src, _)| graph.is_illicit(src));
        if has_illicit_source {
            score += 0.8;
        } else if total_received > total_sent * 0.8 {
            let avg_out = total_sent / out_edges.len() as f64;
            if avg_out < total_received / 10.0 {
                score += 0.6;
            }
        }
    }

    if out_edges.len() > 10 {
        score += 0.3;
    } else if out_edges.len() > 5 {
        score += 0.15;
    }

    if in_edges.len() > 10 {
        score += 0.3;
    } else if in_edges.len() > 5 {
        score += 0.15;
    }

    // Round trip: any destination that also sends back.
    if out_edges.iter().any(|(dest, _)| graph.has_edge(dest, wallet)) {
        score += 0.2;
    }

    score.min(1.0)
}
