// src/lib.rs
//! Transaction-graph risk scoring for wallet-to-wallet value flows.
//!
//! The engine ingests raw transfers into a directed graph with one
//! aggregate edge per ordered wallet pair, then scores wallets against the
//! classic laundering archetypes: fan-out/fan-in smurfing, peeling chains,
//! cyclic wash trading and temporal layering. On top of the per-archetype
//! detectors sit a five-component suspicion breakdown, an independently
//! calibrated scalar score, bounded path searches and a classifier that
//! merges everything into a single verdict.
//!
//! All operations are synchronous and CPU-bound; nothing here does I/O.

pub mod detectors;
pub mod error;
pub mod graph;
pub mod report;
pub mod scoring;
pub mod search;
pub mod synthetic;
pub mod types;

pub use error::{AnalysisError, AnalysisResult};
pub use graph::TransactionGraph;
pub use report::{
    BatchWalletReport, CounterpartySummary, RiskLevel, Verdict, WalletAnalysis,
};
pub use types::*;

use detectors::PatternClassifier;

/// Analysis session over one owned transaction graph.
///
/// The analyzer is a plain value: callers decide its lifetime and share it
/// explicitly instead of going through hidden global state. Mutation
/// (`load_transactions`, `mark_illicit`) takes `&mut self` while every
/// analysis takes `&self`, so within one process the borrow checker
/// enforces the single-writer contract. A long-lived instance shared
/// across threads must sit behind a lock; the engine itself never
/// synchronizes.
///
/// The graph grows without bound as batches are loaded — there is no
/// eviction. Long-running services should cap retained history upstream.
pub struct GraphAnalyzer {
    graph: TransactionGraph,
    config: AnalyzerConfig,
    classifier: PatternClassifier,
}

impl GraphAnalyzer {
    /// Create an analyzer with an empty graph and default thresholds.
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self {
            graph: TransactionGraph::new(),
            config,
            classifier: PatternClassifier::new(),
        }
    }

    /// Load a transaction batch, accumulating onto any previously loaded
    /// state. Malformed records are skipped and counted in the summary.
    pub fn load_transactions(&mut self, batch: &[Transaction]) -> LoadSummary {
        self.graph.load_transactions(batch)
    }

    /// Add known-illicit seed addresses (union with the existing set).
    pub fn mark_illicit<I, S>(&mut self, addresses: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.graph.mark_illicit(addresses)
    }

    pub fn graph(&self) -> &TransactionGraph {
        &self.graph
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Centrality measures for a wallet, recomputed against current state.
    pub fn centrality(&self, wallet: &str) -> CentralityScores {
        graph::centrality(&self.graph, wallet)
    }

    /// Scalar suspicion score in [0, 1].
    pub fn suspicion_score(&self, wallet: &str) -> f64 {
        scoring::suspicion_score(&self.graph, wallet)
    }

    /// Five-component suspicion breakdown with per-component descriptions.
    pub fn suspicion_breakdown(&self, wallet: &str) -> SuspicionBreakdown {
        scoring::suspicion_breakdown(&self.graph, wallet)
    }

    /// Merge all pattern detectors into one verdict.
    pub fn classify_pattern(&self, wallet: &str) -> PatternClassification {
        self.classifier.classify(wallet, &self.graph)
    }

    /// Comprehensive per-wallet summary.
    pub fn wallet_summary(&self, wallet: &str) -> WalletSummary {
        report::wallet_summary(&self.graph, wallet)
    }

    /// Bounded smurfing search from a wallet. The exploration ceiling
    /// comes from the configured [`SearchLimits`].
    pub fn detect_fan_out_fan_in(
        &self,
        wallet: &str,
        max_depth: usize,
        min_intermediaries: usize,
    ) -> SearchOutcome<FanPatternRecord> {
        search::detect_fan_out_fan_in(
            &self.graph,
            wallet,
            max_depth,
            min_intermediaries,
            self.config.search.max_explored_paths,
        )
    }

    /// Bounded peeling-chain search from a wallet.
    pub fn detect_peeling_chain(
        &self,
        wallet: &str,
        min_hops: usize,
    ) -> SearchOutcome<PeelingChainRecord> {
        search::detect_peeling_chain(
            &self.graph,
            wallet,
            min_hops,
            self.config.search.max_queue_states,
        )
    }

    /// Full report for one wallet: verdict, risk level, breakdown,
    /// classification and top-ranked pattern records.
    pub fn analyze_wallet(&self, wallet: &str) -> WalletAnalysis {
        report::analyze_wallet(&self.graph, &self.config, wallet)
    }

    /// Batch sweep over the named wallets, or the whole graph when `None`.
    pub fn analyze_wallets(&self, wallets: Option<&[String]>) -> Vec<BatchWalletReport> {
        report::analyze_wallets(&self.graph, &self.config, wallets)
    }
}

impl Default for GraphAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
