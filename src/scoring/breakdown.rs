// src/scoring/breakdown.rs
use crate::graph::TransactionGraph;
use crate::types::{ScoreComponent, SuspicionBreakdown};

/// Five independently bounded components, summed and capped at 1.0. Each
/// component carries a human-readable description; the struct is handed
/// verbatim to dashboards and the explanation layer.
///
/// This breakdown and [`super::suspicion_score`] are calibrated
/// separately and are not expected to agree numerically.
pub fn suspicion_breakdown(graph: &TransactionGraph, wallet: &str) -> SuspicionBreakdown {
    let out_edges = graph.out_edges(wallet);
    let in_edges = graph.in_edges(wallet);

    // Component 1: fan-out (splitting funds to many destinations).
    let fan_out_count = out_edges.len();
    let fan_out_score = match fan_out_count {
        n if n >= 20 => 0.35,
        n if n >= 10 => 0.25,
        n if n >= 5 => 0.15,
        _ => 0.0,
    };
    let fan_out = ScoreComponent {
        score: fan_out_score,
        details: format!("Wallet sends to {fan_out_count} destinations"),
    };

    // Component 2: fan-in (receiving from many sources).
    let fan_in_count = in_edges.len();
    let fan_in_score = match fan_in_count {
        n if n >= 20 => 0.28,
        n if n >= 10 => 0.20,
        n if n >= 5 => 0.12,
        _ => 0.0,
    };
    let fan_in = ScoreComponent {
        score: fan_in_score,
        details: format!("Wallet receives from {fan_in_count} sources"),
    };

    // Component 3: temporal burst (many transfers in a short window).
    let timestamps = graph.incident_timestamps(wallet);
    let txn_count = timestamps.len();
    let mut span_hours = 0.0;
    let mut temporal_score = 0.0;
    if let (Some(min), Some(max)) = (timestamps.iter().min(), timestamps.iter().max()) {
        span_hours = (*max - *min).num_seconds() as f64 / 3600.0;
        temporal_score = if span_hours < 24.0 && txn_count > 10 {
            0.17
        } else if span_hours < 48.0 && txn_count > 15 {
            0.12
        } else if span_hours < 168.0 && txn_count > 25 {
            0.08
        } else {
            0.0
        };
    }
    let temporal_burst = ScoreComponent {
        score: temporal_score,
        details: format!("{txn_count} transactions within {span_hours:.1} hours"),
    };

    // Component 4: outgoing-amount similarity (structuring).
    let mut path_similarity_score = 0.0;
    if !out_edges.is_empty() {
        let amounts: Vec<f64> = out_edges.iter().map(|(_, data)| data.total_amount).collect();
        let mean = amounts.iter().sum::<f64>() / amounts.len() as f64;
        if mean > 0.0 {
            let similar = amounts.iter().filter(|amt| (*amt - mean).abs() < mean * 0.2).count();
            let similarity_ratio = similar as f64 / amounts.len() as f64;
            if similarity_ratio > 0.7 && amounts.len() >= 5 {
                path_similarity_score = 0.10;
            } else if similarity_ratio > 0.5 && amounts.len() >= 5 {
                path_similarity_score = 0.06;
            }
        }
    }
    let path_similarity = ScoreComponent {
        score: path_similarity_score,
        details: if path_similarity_score > 0.0 {
            "Transaction amounts show structuring pattern".to_string()
        } else {
            "No clear structuring pattern".to_string()
        },
    };

    // Component 5: proximity to known illicit wallets.
    let distance = graph.distance_to_illicit(wallet);
    let (illicit_score, description) = match distance {
        0 => (0.50, "Wallet is known illicit".to_string()),
        1 => {
            let from_illicit: f64 = in_edges
                .iter()
                .filter(|(src, _)| graph.is_illicit(src))
                .map(|(_, data)| data.total_amount)
                .sum();
            if from_illicit > 0.0 {
                let score = if from_illicit > 100.0 { 0.35 } else { 0.25 };
                (score, format!("Direct transfer from illicit wallet ({from_illicit:.2} crypto)"))
            } else {
                (0.20, "Direct transfer to illicit wallet".to_string())
            }
        }
        2 => (0.10, "Two hops from illicit wallet".to_string()),
        3 => (0.05, "Three hops from illicit wallet".to_string()),
        _ => (0.0, "No connection to known illicit wallets".to_string()),
    };
    let illicit_proximity = ScoreComponent { score: illicit_score, details: description };

    let total = fan_out.score
        + fan_in.score
        + temporal_burst.score
        + path_similarity.score
        + illicit_proximity.score;

    SuspicionBreakdown {
        total_suspicion_score: total.min(1.0),
        fan_out,
        fan_in,
        temporal_burst,
        path_similarity,
        illicit_proximity,
    }
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

    fn bounds_hold(breakdown: &SuspicionBreakdown) {
        assert!(breakdown.fan_out.score <= 0.35);
        assert!(breakdown.fan_in.score <= 0.28);
        assert!(breakdown.temporal_burst.score <= 0.17);
        assert!(breakdown.path_similarity.score <= 0.10);
        assert!(breakdown.illicit_proximity.score <= 0.50);
        let sum: f64 = breakdown.components().iter().map(|(_, c)| c.score).sum();
        assert!((breakdown.total_suspicion_score - sum.min(1.0)).abs() < 1e-9);
    }

    #[test]
    fn test_absent_wallet_is_all_zero() {
        let graph = TransactionGraph::new();
        let breakdown = suspicion_breakdown(&graph, "missing");
        assert_eq!(breakdown.total_suspicion_score, 0.0);
        bounds_hold(&breakdown);
    }

    #[test]
    fn test_component_bounds_on_hot_wallet() {
        let mut graph = TransactionGraph::new();
        let mut batch = synthetic::smurfing_fan_out("hub", Some("0xbad"), 25, 100.0, start());
        for i in 0..22 {
            batch.push(Transaction {
                source_wallet: format!("feeder{i}"),
                dest_wallet: "hub".to_string(),
                amount: 40.0,
                timestamp: start() + Duration::minutes(i),
                token_type: "ETH".to_string(),
            });
        }
        graph.load_transactions(&batch);
        graph.mark_illicit(["0xbad"]);

        let breakdown = suspicion_breakdown(&graph, "hub");
        bounds_hold(&breakdown);
        assert_eq!(breakdown.fan_out.score, 0.35);
        assert_eq!(breakdown.fan_in.score, 0.28);
        assert_eq!(breakdown.temporal_burst.score, 0.17);
        assert_eq!(breakdown.path_similarity.score, 0.10);
        assert_eq!(breakdown.illicit_proximity.score, 0.35);
        assert_eq!(breakdown.total_suspicion_score, 1.0);
    }

    #[test]
    fn test_illicit_proximity_tiers() {
        let mut graph = TransactionGraph::new();
        let txn = |source: &str, dest: &str, amount: f64| Transaction {
            source_wallet: source.to_string(),
            dest_wallet: dest.to_string(),
            amount,
            timestamp: start(),
            token_type: "ETH".to_string(),
        };
        // bad -> small -> two -> three, plus sender -> bad with a small amount.
        graph.load_transactions(&[
            txn("bad", "small", 50.0),
            txn("small", "two", 10.0),
            txn("two", "three", 5.0),
            txn("sender", "bad", 10.0),
        ]);
        graph.mark_illicit(["bad"]);

        assert_eq!(suspicion_breakdown(&graph, "bad").illicit_proximity.score, 0.50);
        // Inbound from illicit but only 50 crypto: 0.25 tier.
        assert_eq!(suspicion_breakdown(&graph, "small").illicit_proximity.score, 0.25);
        assert_eq!(suspicion_breakdown(&graph, "sender").illicit_proximity.score, 0.20);
        assert_eq!(suspicion_breakdown(&graph, "two").illicit_proximity.score, 0.10);
        assert_eq!(suspicion_breakdown(&graph, "three").illicit_proximity.score, 0.05);
    }

    #[test]
    fn test_unreachable_illicit_contributes_nothing() {
        let mut graph = TransactionGraph::new();
        graph.load_transactions(&[Transaction {
            source_wallet: "A".to_string(),
            dest_wallet: "B".to_string(),
            amount: 10.0,
            timestamp: start(),
            token_type: "ETH".to_string(),
        }]);
        graph.mark_illicit(["elsewhere"]);

        let breakdown = suspicion_breakdown(&graph, "A");
        assert_eq!(breakdown.illicit_proximity.score, 0.0);
        assert!(breakdown.illicit_proximity.details.contains("No connection"));
    }
}
