// src/types.rs
use crate::error::AnalysisError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single wallet-to-wallet transfer as ingested from an upstream feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub source_wallet: String,
    pub dest_wallet: String,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "UNKNOWN".to_string()
}

impl Transaction {
    /// Strict validation for callers that want to reject instead of skip.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.source_wallet.is_empty() {
            return Err(AnalysisError::InvalidAddress("empty source wallet".to_string()));
        }
        if self.dest_wallet.is_empty() {
            return Err(AnalysisError::InvalidAddress("empty destination wallet".to_string()));
        }
        if !self.amount.is_finite() {
            return Err(AnalysisError::InvalidTransaction(format!(
                "non-finite amount for {} -> {}",
                self.source_wallet, self.dest_wallet
            )));
        }
        if self.amount < 0.0 {
            return Err(AnalysisError::InvalidTransaction(format!(
                "negative amount {} for {} -> {}",
                self.amount, self.source_wallet, self.dest_wallet
            )));
        }
        Ok(())
    }
}

/// One transfer as retained on an aggregate edge. Insertion order is preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRecord {
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
    pub token_type: String,
}

/// Aggregate of every transfer between one ordered (source, dest) pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EdgeData {
    pub transactions: Vec<TransferRecord>,
    pub total_amount: f64,
    pub transaction_count: usize,
}

/// Counts reported by a `load_transactions` call. Malformed records are
/// skipped, not fatal; `rejected` tells the caller how many were dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub accepted: usize,
    pub rejected: usize,
}

/// Centrality measures for one wallet against the current graph state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CentralityScores {
    pub degree: f64,
    pub betweenness: f64,
    pub pagerank: f64,
    pub closeness: f64,
}

/// Laundering archetypes the detectors score against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternKind {
    FanOutFanIn,
    PeelingChain,
    CyclicWash,
    TemporalLayering,
}

impl PatternKind {
    pub fn label(&self) -> &'static str {
        match self {
            PatternKind::FanOutFanIn => "FAN_OUT_FAN_IN",
            PatternKind::PeelingChain => "PEELING_CHAIN",
            PatternKind::CyclicWash => "CYCLIC_WASH",
            PatternKind::TemporalLayering => "TEMPORAL_LAYERING",
        }
    }
}

/// Variant of a detected pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternSubtype {
    SimpleFanOut,
    MultiLayerReaggregation,
    CollectionRedistribution,
    SequentialPeeling,
    LinearProgression,
    CircularWash,
    RepetitivePattern,
    RapidBurst,
    AutomatedTiming,
    DistributedLayering,
    InsufficientData,
    NoPattern,
}

impl PatternSubtype {
    pub fn label(&self) -> &'static str {
        match self {
            PatternSubtype::SimpleFanOut => "SIMPLE_FAN_OUT",
            PatternSubtype::MultiLayerReaggregation => "MULTI_LAYER_REAGGREGATION",
            PatternSubtype::CollectionRedistribution => "COLLECTION_REDISTRIBUTION",
            PatternSubtype::SequentialPeeling => "SEQUENTIAL_PEELING",
            PatternSubtype::LinearProgression => "LINEAR_PROGRESSION",
            PatternSubtype::CircularWash => "CIRCULAR_WASH",
            PatternSubtype::RepetitivePattern => "REPETITIVE_PATTERN",
            PatternSubtype::RapidBurst => "RAPID_BURST",
            PatternSubtype::AutomatedTiming => "AUTOMATED_TIMING",
            PatternSubtype::DistributedLayering => "DISTRIBUTED_LAYERING",
            PatternSubtype::InsufficientData => "INSUFFICIENT_DATA",
            PatternSubtype::NoPattern => "NONE",
        }
    }
}

/// Output of a single pattern detector. Confidence is a sum of independent
/// bonuses, capped at 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternResult {
    pub pattern: PatternKind,
    pub confidence: f64,
    pub subtype: PatternSubtype,
    pub evidence: Vec<String>,
}

/// Two high-confidence patterns active on the same wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixedStrategy {
    pub confidence: f64,
    pub subtype: String,
    pub evidence: Vec<String>,
    pub primary: PatternResult,
    pub secondary: PatternResult,
}

/// Final verdict merged across all detectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PatternClassification {
    Normal,
    Single(PatternResult),
    Mixed(MixedStrategy),
}

impl PatternClassification {
    pub fn confidence(&self) -> f64 {
        match self {
            PatternClassification::Normal => 0.0,
            PatternClassification::Single(result) => result.confidence,
            PatternClassification::Mixed(mixed) => mixed.confidence,
        }
    }

    /// Display label matching the detector naming scheme.
    pub fn label(&self) -> String {
        match self {
            PatternClassification::Normal => "NORMAL_ACTIVITY".to_string(),
            PatternClassification::Single(result) => result.pattern.label().to_string(),
            PatternClassification::Mixed(_) => "MIXED_STRATEGY".to_string(),
        }
    }
}

/// One component of the suspicion breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub score: f64,
    pub details: String,
}

/// Five independently bounded components, summed and capped at 1.0.
/// The shape is fixed so consumers get the full component set at compile
/// time; `components()` offers the keyed view dashboards expect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspicionBreakdown {
    pub total_suspicion_score: f64,
    pub fan_out: ScoreComponent,
    pub fan_in: ScoreComponent,
    pub temporal_burst: ScoreComponent,
    pub path_similarity: ScoreComponent,
    pub illicit_proximity: ScoreComponent,
}

impl SuspicionBreakdown {
    pub fn components(&self) -> [(&'static str, &ScoreComponent); 5] {
        [
            ("fan_out_score", &self.fan_out),
            ("fan_in_score", &self.fan_in),
            ("temporal_burst_score", &self.temporal_burst),
            ("path_similarity_score", &self.path_similarity),
            ("illicit_proximity_score", &self.illicit_proximity),
        ]
    }
}

/// Comprehensive per-wallet summary. `suspicion_score` is the scalar score,
/// which is calibrated independently of the breakdown total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletSummary {
    pub wallet_address: String,
    pub suspicion_score: f64,
    pub centrality: CentralityScores,
    pub total_received: f64,
    pub total_sent: f64,
    pub unique_senders: usize,
    pub unique_receivers: usize,
    pub is_illicit: bool,
    /// Shortest distance in either direction to a known illicit wallet;
    /// -1 when unreachable.
    pub distance_to_illicit: i64,
}

/// Ranked result list from a bounded graph search. `truncated` is set when
/// the exploration budget was exhausted before the search space was.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome<T> {
    pub records: Vec<T>,
    pub truncated: bool,
}

impl<T> SearchOutcome<T> {
    pub fn empty() -> Self {
        Self { records: Vec::new(), truncated: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FanPatternKind {
    #[serde(rename = "direct_smurfing_from_illicit")]
    DirectSmurfingFromIllicit,
    #[serde(rename = "multi_hop_smurfing")]
    MultiHopSmurfing,
}

/// Aggregate figures for one detected path or fan structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathMetrics {
    pub total_amount: f64,
    pub transaction_count: usize,
    pub path_length: usize,
    pub fan_out_count: usize,
    pub time_span_hours: f64,
}

/// A detected fan-out/fan-in structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanPatternRecord {
    pub id: Uuid,
    pub kind: FanPatternKind,
    pub source: String,
    pub destination: Option<String>,
    pub path: Vec<String>,
    pub intermediaries: Vec<String>,
    pub suspicion_score: f64,
    pub metrics: PathMetrics,
}

/// A detected peeling chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeelingChainRecord {
    pub id: Uuid,
    pub source: String,
    pub chain: Vec<String>,
    pub amounts: Vec<f64>,
    pub total_peeled: f64,
    pub suspicion_score: f64,
}

/// Exploration bounds for the path searches. Simple-path enumeration is
/// exponential in the worst case, so both searches carry an explicit budget
/// on top of the depth cutoff.
#[derive(Debug, Clone)]
pub struct SearchLimits {
    /// Maximum number of edges in an enumerated simple path.
    pub max_depth: usize,
    /// Minimum distinct intermediaries for a multi-hop fan pattern.
    pub min_intermediaries: usize,
    /// Minimum chain length (in nodes) for a peeling chain.
    pub min_hops: usize,
    /// Ceiling on simple paths explored before truncating.
    pub max_explored_paths: usize,
    /// Ceiling on BFS states expanded before truncating.
    pub max_queue_states: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_depth: 4,
            min_intermediaries: 3,
            min_hops: 5,
            max_explored_paths: 100_000,
            max_queue_states: 100_000,
        }
    }
}

/// Analyzer configuration. Defaults mirror the calibrated thresholds used
/// by the scoring model.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub search: SearchLimits,
    /// Scalar score at or above which a wallet is flagged.
    pub flag_threshold: f64,
    /// Scalar score at or above which risk is "high".
    pub high_risk_threshold: f64,
    /// Scalar score at or above which risk is "medium".
    pub medium_risk_threshold: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            search: SearchLimits::default(),
            flag_threshold: 0.6,
            high_risk_threshold: 0.8,
            medium_risk_threshold: 0.5,
        }
    }
}
