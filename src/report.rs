// src/report.rs
use crate::detectors::PatternClassifier;
use crate::graph::{centrality, TransactionGraph};
use crate::scoring::{suspicion_breakdown, suspicion_score};
use crate::search::{detect_fan_out_fan_in, detect_peeling_chain};
use crate::types::{
    AnalyzerConfig, FanPatternRecord, PatternClassification, PeelingChainRecord,
    SuspicionBreakdown, WalletSummary,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

const TOP_FAN_PATTERNS: usize = 5;
const TOP_PEELING_CHAINS: usize = 3;

/// Binary call on whether a wallet warrants a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Flagged,
    Cleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    fn from_score(score: f64, config: &AnalyzerConfig) -> Self {
        if score >= config.high_risk_threshold {
            RiskLevel::High
        } else if score >= config.medium_risk_threshold {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Full per-wallet report: scalar verdict, breakdown, classification and
/// the top-ranked search records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletAnalysis {
    pub wallet_address: String,
    pub verdict: Verdict,
    pub risk_level: RiskLevel,
    pub suspicion_score: f64,
    pub summary: WalletSummary,
    pub breakdown: SuspicionBreakdown,
    pub pattern: PatternClassification,
    pub smurfing_patterns_detected: usize,
    pub smurfing_patterns: Vec<FanPatternRecord>,
    pub smurfing_truncated: bool,
    pub peeling_chains_detected: usize,
    pub peeling_chains: Vec<PeelingChainRecord>,
    pub peeling_truncated: bool,
}

/// One counterparty of a wallet, with aggregate flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterpartySummary {
    pub wallet: String,
    pub amount: f64,
    pub transaction_count: usize,
}

/// Per-wallet entry of a batch sweep, with the graph context attached for
/// downstream feature extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchWalletReport {
    pub wallet_address: String,
    pub suspicion_score: f64,
    pub classification: PatternClassification,
    pub total_volume: f64,
    pub unique_counterparties: usize,
    pub breakdown: SuspicionBreakdown,
    pub sources: Vec<CounterpartySummary>,
    pub destinations: Vec<CounterpartySummary>,
    pub token_types: Vec<String>,
    pub summary: WalletSummary,
}

/// Comprehensive summary for a wallet. Total over well-typed input: a
/// wallet absent from the graph comes back with zeroed figures and the
/// -1 distance sentinel.
pub fn wallet_summary(graph: &TransactionGraph, wallet: &str) -> WalletSummary {
    WalletSummary {
        wallet_address: wallet.to_string(),
        suspicion_score: suspicion_score(graph, wallet),
        centrality: centrality(graph, wallet),
        total_received: graph.total_received(wallet),
        total_sent: graph.total_sent(wallet),
        unique_senders: graph.in_degree(wallet),
        unique_receivers: graph.out_degree(wallet),
        is_illicit: graph.is_illicit(wallet),
        distance_to_illicit: graph.distance_to_illicit(wallet),
    }
}

pub fn analyze_wallet(
    graph: &TransactionGraph,
    config: &AnalyzerConfig,
    wallet: &str,
) -> WalletAnalysis {
    let summary = wallet_summary(graph, wallet);
    let score = summary.suspicion_score;

    let smurfing = detect_fan_out_fan_in(
        graph,
        wallet,
        config.search.max_depth,
        config.search.min_intermediaries,
        config.search.max_explored_paths,
    );
    let peeling =
        detect_peeling_chain(graph, wallet, config.search.min_hops, config.search.max_queue_states);
    let pattern = PatternClassifier::new().classify(wallet, graph);

    let verdict = if score >= config.flag_threshold { Verdict::Flagged } else { Verdict::Cleared };
    let risk_level = RiskLevel::from_score(score, config);
    debug!(wallet, score, ?risk_level, "wallet analyzed");

    WalletAnalysis {
        wallet_address: wallet.to_string(),
        verdict,
        risk_level,
        suspicion_score: score,
        breakdown: suspicion_breakdown(graph, wallet),
        pattern,
        smurfing_patterns_detected: smurfing.records.len(),
        smurfing_truncated: smurfing.truncated,
        smurfing_patterns: smurfing.records.into_iter().take(TOP_FAN_PATTERNS).collect(),
        peeling_chains_detected: peeling.records.len(),
        peeling_truncated: peeling.truncated,
        peeling_chains: peeling.records.into_iter().take(TOP_PEELING_CHAINS).collect(),
        summary,
    }
}

/// Sweep the named wallets, or every wallet in the graph when none are
/// given.
pub fn analyze_wallets(
    graph: &TransactionGraph,
    config: &AnalyzerConfig,
    wallets: Option<&[String]>,
) -> Vec<BatchWalletReport> {
    let targets: Vec<String> = match wallets {
        Some(list) => list.to_vec(),
        None => graph.wallets().map(str::to_string).collect(),
    };

    targets
        .iter()
        .map(|wallet| {
            let summary = wallet_summary(graph, wallet);
            let classification = PatternClassifier::new().classify(wallet, graph);

            let sources: Vec<CounterpartySummary> = graph
                .in_edges(wallet)
                .iter()
                .map(|(src, data)| CounterpartySummary {
                    wallet: src.to_string(),
                    amount: data.total_amount,
                    transaction_count: data.transaction_count,
                })
                .collect();
            let destinations: Vec<CounterpartySummary> = graph
                .out_edges(wallet)
                .iter()
                .map(|(dest, data)| CounterpartySummary {
                    wallet: dest.to_string(),
                    amount: data.total_amount,
                    transaction_count: data.transaction_count,
                })
                .collect();

            let token_types: BTreeSet<String> = graph
                .in_edges(wallet)
                .iter()
                .chain(graph.out_edges(wallet).iter())
                .flat_map(|(_, data)| data.transactions.iter().map(|t| t.token_type.clone()))
                .collect();

            BatchWalletReport {
                wallet_address: wallet.clone(),
                suspicion_score: summary.suspicion_score,
                classification,
                total_volume: summary.total_received + summary.total_sent,
                unique_counterparties: summary.unique_senders + summary.unique_receivers,
                breakdown: suspicion_breakdown(graph, wallet),
                sources,
                destinations,
                token_types: token_types.into_iter().collect(),
                summary,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic;
    use chrono::{TimeZone, Utc};

    fn start() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 31, 10, 0, 0).unwrap()
    }

    fn mule_graph() -> TransactionGraph {
        let mut graph = TransactionGraph::new();
        let batch = synthetic::smurfing_fan_out("mule", Some("0xbad"), 12, 100.0, start());
        graph.load_transactions(&batch);
        graph.mark_illicit(["0xbad"]);
        graph
    }

    #[test]
    fn test_analysis_of_absent_wallet_is_neutral() {
        let graph = TransactionGraph::new();
        let analysis = analyze_wallet(&graph, &AnalyzerConfig::default(), "ghost");

        assert_eq!(analysis.verdict, Verdict::Cleared);
        assert_eq!(analysis.risk_level, RiskLevel::Low);
        assert_eq!(analysis.suspicion_score, 0.0);
        assert_eq!(analysis.summary.distance_to_illicit, -1);
        assert!(analysis.smurfing_patterns.is_empty());
        assert!(analysis.peeling_chains.is_empty());
    }

    #[test]
    fn test_mule_is_flagged_high_risk() {
        let graph = mule_graph();
        let analysis = analyze_wallet(&graph, &AnalyzerConfig::default(), "mule");

        assert_eq!(analysis.verdict, Verdict::Flagged);
        assert_eq!(analysis.risk_level, RiskLevel::High);
        assert_eq!(analysis.smurfing_patterns_detected, 1);
        assert_eq!(analysis.smurfing_patterns[0].suspicion_score, 0.95);
        assert!(!analysis.summary.is_illicit);
        assert_eq!(analysis.summary.distance_to_illicit, 1);
    }

    #[test]
    fn test_risk_level_thresholds() {
        let config = AnalyzerConfig::default();
        assert_eq!(RiskLevel::from_score(0.85, &config), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0.55, &config), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(0.1, &config), RiskLevel::Low);
    }

    #[test]
    fn test_batch_covers_every_wallet() {
        let graph = mule_graph();
        let reports = analyze_wallets(&graph, &AnalyzerConfig::default(), None);

        // 0xbad + mule + 12 destinations.
        assert_eq!(reports.len(), 14);
        assert!(reports.iter().any(|r| r.wallet_address == "mule"));

        let mule = reports.iter().find(|r| r.wallet_address == "mule").unwrap();
        assert_eq!(mule.sources.len(), 1);
        assert_eq!(mule.destinations.len(), 12);
        assert_eq!(mule.unique_counterparties, 13);
        assert_eq!(mule.token_types, vec!["ETH".to_string()]);
        assert!((mule.total_volume - (1200.0 + 1200.0)).abs() < 1e-9);
    }

    #[test]
    fn test_batch_subset_only_analyzes_named_wallets() {
        let graph = mule_graph();
        let targets = vec!["mule".to_string(), "d0".to_string()];
        let reports = analyze_wallets(&graph, &AnalyzerConfig::default(), Some(&targets));

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].wallet_address, "mule");
        assert_eq!(reports[1].wallet_address, "d0");
    }
}
