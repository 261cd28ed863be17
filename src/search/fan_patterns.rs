// src/search/fan_patterns.rs
use crate::graph::TransactionGraph;
use crate::types::{FanPatternKind, FanPatternRecord, PathMetrics, SearchOutcome};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, warn};
use uuid::Uuid;

/// Detect fan-out/fan-in (smurfing) structures reachable from a wallet.
///
/// A wallet that both receives from a known illicit source and fans out to
/// five or more destinations short-circuits into a single high-confidence
/// record covering all destinations. Otherwise every simple path of at most
/// `max_depth` edges is enumerated and scored, keeping paths with at least
/// `min_intermediaries` distinct intermediate wallets and a score above
/// 0.5, ranked descending.
///
/// Simple-path enumeration is exponential in the worst case, so the walk
/// stops after `max_explored_paths` extensions and reports `truncated`
/// instead of silently returning a partial "nothing found".
pub fn detect_fan_out_fan_in(
    graph: &TransactionGraph,
    wallet: &str,
    max_depth: usize,
    min_intermediaries: usize,
    max_explored_paths: usize,
) -> SearchOutcome<FanPatternRecord> {
    if !graph.contains(wallet) {
        return SearchOutcome::empty();
    }

    if let Some(record) = direct_smurfing(graph, wallet) {
        return SearchOutcome { records: vec![record], truncated: false };
    }

    let mut walk = PathWalk {
        graph,
        max_edges: max_depth,
        min_intermediaries,
        budget: max_explored_paths,
        explored: 0,
        truncated: false,
        records: Vec::new(),
    };
    let mut path = vec![wallet.to_string()];
    walk.extend(&mut path);

    if walk.truncated {
        warn!(
            wallet,
            explored = walk.explored,
            "fan pattern search hit the exploration budget"
        );
    } else {
        debug!(wallet, explored = walk.explored, found = walk.records.len(), "fan pattern search done");
    }

    let mut records = walk.records;
    records.sort_by(|a, b| {
        b.suspicion_score.partial_cmp(&a.suspicion_score).unwrap_or(std::cmp::Ordering::Equal)
    });
    SearchOutcome { records, truncated: walk.truncated }
}

/// Illicit source feeding a wide fan-out: emit one record covering every
/// destination and skip the general enumeration.
fn direct_smurfing(graph: &TransactionGraph, wallet: &str) -> Option<FanPatternRecord> {
    let in_edges = graph.in_edges(wallet);
    let out_edges = graph.out_edges(wallet);
    if in_edges.is_empty() || out_edges.len() < 5 {
        return None;
    }

    let illicit_sources: Vec<_> =
        in_edges.iter().filter(|(src, _)| graph.is_illicit(src)).collect();
    let (first_source, _) = illicit_sources.first()?;

    let total_received: f64 = illicit_sources.iter().map(|(_, data)| data.total_amount).sum();
    let transaction_count: usize = out_edges.iter().map(|(_, data)| data.transaction_count).sum();
    let destinations: Vec<String> = out_edges.iter().map(|(dest, _)| dest.to_string()).collect();

    let mut timestamps: Vec<DateTime<Utc>> = Vec::new();
    for (_, data) in &illicit_sources {
        timestamps.extend(data.transactions.iter().map(|t| t.timestamp));
    }
    for (_, data) in &out_edges {
        timestamps.extend(data.transactions.iter().map(|t| t.timestamp));
    }
    let time_span_hours = match (timestamps.iter().min(), timestamps.iter().max()) {
        (Some(min), Some(max)) => (*max - *min).num_seconds() as f64 / 3600.0,
        _ => 0.0,
    };

    let suspicion_score = if out_edges.len() > 10 { 0.95 } else { 0.9 };

    let mut path = vec![first_source.to_string(), wallet.to_string()];
    path.extend(destinations.iter().cloned());

    Some(FanPatternRecord {
        id: Uuid::new_v4(),
        kind: FanPatternKind::DirectSmurfingFromIllicit,
        source: first_source.to_string(),
        destination: None,
        path,
        intermediaries: vec![wallet.to_string()],
        suspicion_score,
        metrics: PathMetrics {
            total_amount: total_received,
            transaction_count,
            path_length: 2,
            fan_out_count: out_edges.len(),
            time_span_hours,
        },
    })
}

struct PathWalk<'g> {
    graph: &'g TransactionGraph,
    max_edges: usize,
    min_intermediaries: usize,
    budget: usize,
    explored: usize,
    truncated: bool,
    records: Vec<FanPatternRecord>,
}

impl PathWalk<'_> {
    /// Depth-first extension of the current simple path. Every extension
    /// counts against the budget, successful or not.
    fn extend(&mut self, path: &mut Vec<String>) {
        let Some(current) = path.last().cloned() else {
            return;
        };
        for successor in self.graph.successors(&current) {
            if path.iter().any(|node| node == successor) {
                continue;
            }
            if self.explored >= self.budget {
                self.truncated = true;
                return;
            }
            self.explored += 1;

            path.push(successor.to_string());
            self.evaluate(path);
            if path.len() - 1 < self.max_edges {
                self.extend(path);
            }
            path.pop();

            if self.truncated {
                return;
            }
        }
    }

    fn evaluate(&mut self, path: &[String]) {
        if path.len() < 3 {
            return;
        }
        let intermediaries: Vec<String> = {
            let mut seen = HashSet::new();
            path[1..path.len() - 1]
                .iter()
                .filter(|node| seen.insert(node.as_str()))
                .cloned()
                .collect()
        };
        if intermediaries.len() < self.min_intermediaries {
            return;
        }

        let (score, metrics) = score_path(self.graph, path);
        if score <= 0.5 {
            return;
        }

        self.records.push(FanPatternRecord {
            id: Uuid::new_v4(),
            kind: FanPatternKind::MultiHopSmurfing,
            source: path[0].clone(),
            destination: path.last().cloned(),
            path: path.to_vec(),
            intermediaries,
            suspicion_score: score,
            metrics,
        });
    }
}

/// Score one enumerated path: length, volume, transfer count and velocity
/// each add an independent bonus, capped at 1.0.
fn score_path(graph: &TransactionGraph, path: &[String]) -> (f64, PathMetrics) {
    let mut total_amount = 0.0;
    let mut transaction_count = 0;
    let mut first_seen: Option<DateTime<Utc>> = None;
    let mut last_seen: Option<DateTime<Utc>> = None;

    for pair in path.windows(2) {
        if let Some(data) = graph.edge(&pair[0], &pair[1]) {
            total_amount += data.total_amount;
            transaction_count += data.transaction_count;
            for record in &data.transactions {
                first_seen = Some(first_seen.map_or(record.timestamp, |t| t.min(record.timestamp)));
                last_seen = Some(last_seen.map_or(record.timestamp, |t| t.max(record.timestamp)));
            }
        }
    }

    let time_span_hours = match (first_seen, last_seen) {
        (Some(first), Some(last)) => (last - first).num_seconds() as f64 / 3600.0,
        _ => 0.0,
    };

    let mut score = 0.0_f64;
    if path.len() >= 5 {
        score += 0.3;
    } else if path.len() >= 3 {
        score += 0.2;
    }
    if total_amount > 10_000.0 && path.len() >= 3 {
        score += 0.3;
    }
    if transaction_count > 20 {
        score += 0.2;
    }
    if first_seen.is_some() && time_span_hours < 24.0 {
        score += 0.2;
    }

    let metrics = PathMetrics {
        total_amount,
        transaction_count,
        path_length: path.len(),
        fan_out_count: graph.out_degree(&path[0]),
        time_span_hours,
    };
    (score.min(1.0), metrics)
}
