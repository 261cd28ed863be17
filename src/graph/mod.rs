// src/graph/mod.rs
pub mod centrality;

pub use centrality::centrality;

use crate::types::{EdgeData, LoadSummary, Transaction, TransferRecord};
use chrono::{DateTime, Utc};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction::{self, Incoming, Outgoing};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, warn};

/// Directed multigraph of wallet-to-wallet value flows, with parallel
/// transfers aggregated into one edge per ordered (source, dest) pair.
///
/// The store is built additively: repeated `load_transactions` calls
/// accumulate onto existing aggregate edges, and nothing is ever evicted.
/// Callers that keep one instance alive across requests own its lifetime
/// and must serialize mutation (single writer) against the read-only
/// analyses.
pub struct TransactionGraph {
    graph: StableDiGraph<String, EdgeData>,
    node_map: HashMap<String, NodeIndex>,
    illicit: HashSet<String>,
}

impl TransactionGraph {
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::new(),
            node_map: HashMap::new(),
            illicit: HashSet::new(),
        }
    }

    fn get_or_add_node(&mut self, addr: &str) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(addr) {
            return idx;
        }
        let idx = self.graph.add_node(addr.to_string());
        self.node_map.insert(addr.to_string(), idx);
        idx
    }

    /// Load a batch of transfers into the graph, upserting the aggregate
    /// edge for each (source, dest) pair.
    ///
    /// Malformed records (empty address, negative or non-finite amount) are
    /// skipped and counted in the returned summary rather than aborting the
    /// batch; callers wanting hard rejection can run
    /// [`Transaction::validate`] first.
    pub fn load_transactions(&mut self, batch: &[Transaction]) -> LoadSummary {
        let mut summary = LoadSummary::default();

        for txn in batch {
            if let Err(err) = txn.validate() {
                warn!(error = %err, "skipping malformed transaction");
                summary.rejected += 1;
                continue;
            }

            let source = self.get_or_add_node(&txn.source_wallet);
            let dest = self.get_or_add_node(&txn.dest_wallet);
            let record = TransferRecord {
                amount: txn.amount,
                timestamp: txn.timestamp,
                token_type: txn.token_type.clone(),
            };

            match self.graph.find_edge(source, dest) {
                Some(edge) => {
                    let data = &mut self.graph[edge];
                    data.transactions.push(record);
                    data.total_amount += txn.amount;
                    data.transaction_count += 1;
                }
                None => {
                    self.graph.add_edge(
                        source,
                        dest,
                        EdgeData {
                            transactions: vec![record],
                            total_amount: txn.amount,
                            transaction_count: 1,
                        },
                    );
                }
            }
            summary.accepted += 1;
        }

        debug!(
            accepted = summary.accepted,
            rejected = summary.rejected,
            wallets = self.node_map.len(),
            "transaction batch loaded"
        );
        summary
    }

    /// Add addresses to the illicit seed set. Repeated calls union with the
    /// existing set; the set is never replaced wholesale.
    pub fn mark_illicit<I, S>(&mut self, addresses: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for addr in addresses {
            self.illicit.insert(addr.into());
        }
    }

    pub fn is_illicit(&self, wallet: &str) -> bool {
        self.illicit.contains(wallet)
    }

    pub fn illicit_wallets(&self) -> &HashSet<String> {
        &self.illicit
    }

    pub fn contains(&self, wallet: &str) -> bool {
        self.node_map.contains_key(wallet)
    }

    pub fn wallet_count(&self) -> usize {
        self.node_map.len()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All wallet addresses currently in the graph.
    pub fn wallets(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(String::as_str)
    }

    /// Outgoing aggregate edges as (destination, edge) pairs.
    pub fn out_edges(&self, wallet: &str) -> Vec<(&str, &EdgeData)> {
        self.directed_edges(wallet, Outgoing)
    }

    /// Incoming aggregate edges as (source, edge) pairs.
    pub fn in_edges(&self, wallet: &str) -> Vec<(&str, &EdgeData)> {
        self.directed_edges(wallet, Incoming)
    }

    fn directed_edges(&self, wallet: &str, dir: Direction) -> Vec<(&str, &EdgeData)> {
        let Some(&idx) = self.node_map.get(wallet) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(idx, dir)
            .map(|edge| {
                let counterparty = match dir {
                    Outgoing => edge.target(),
                    Incoming => edge.source(),
                };
                (self.graph[counterparty].as_str(), edge.weight())
            })
            .collect()
    }

    pub fn successors(&self, wallet: &str) -> Vec<&str> {
        self.neighbors(wallet, Outgoing)
    }

    pub fn predecessors(&self, wallet: &str) -> Vec<&str> {
        self.neighbors(wallet, Incoming)
    }

    fn neighbors(&self, wallet: &str, dir: Direction) -> Vec<&str> {
        let Some(&idx) = self.node_map.get(wallet) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(idx, dir)
            .map(|n| self.graph[n].as_str())
            .collect()
    }

    /// Number of distinct destinations (aggregate out-edges).
    pub fn out_degree(&self, wallet: &str) -> usize {
        self.node_map
            .get(wallet)
            .map(|&idx| self.graph.edges_directed(idx, Outgoing).count())
            .unwrap_or(0)
    }

    /// Number of distinct sources (aggregate in-edges).
    pub fn in_degree(&self, wallet: &str) -> usize {
        self.node_map
            .get(wallet)
            .map(|&idx| self.graph.edges_directed(idx, Incoming).count())
            .unwrap_or(0)
    }

    pub fn edge(&self, source: &str, dest: &str) -> Option<&EdgeData> {
        let &src = self.node_map.get(source)?;
        let &dst = self.node_map.get(dest)?;
        self.graph.find_edge(src, dst).map(|edge| &self.graph[edge])
    }

    pub fn has_edge(&self, source: &str, dest: &str) -> bool {
        self.edge(source, dest).is_some()
    }

    pub fn total_received(&self, wallet: &str) -> f64 {
        self.in_edges(wallet).iter().map(|(_, data)| data.total_amount).sum()
    }

    pub fn total_sent(&self, wallet: &str) -> f64 {
        self.out_edges(wallet).iter().map(|(_, data)| data.total_amount).sum()
    }

    /// Timestamps of every transfer incident to the wallet, in edge order.
    pub fn incident_timestamps(&self, wallet: &str) -> Vec<DateTime<Utc>> {
        let mut timestamps = Vec::new();
        for (_, data) in self.in_edges(wallet).iter().chain(self.out_edges(wallet).iter()) {
            timestamps.extend(data.transactions.iter().map(|t| t.timestamp));
        }
        timestamps
    }

    /// Shortest distance to the nearest illicit seed, following edges in
    /// either direction, or -1 when no illicit wallet is reachable. A
    /// wallet in the seed set is at distance 0.
    pub fn distance_to_illicit(&self, wallet: &str) -> i64 {
        if self.illicit.contains(wallet) {
            return 0;
        }
        if self.illicit.is_empty() {
            return -1;
        }
        let Some(&start) = self.node_map.get(wallet) else {
            return -1;
        };

        let forward = self.nearest_illicit(start, Outgoing);
        let backward = self.nearest_illicit(start, Incoming);
        match (forward, backward) {
            (Some(a), Some(b)) => a.min(b) as i64,
            (Some(a), None) => a as i64,
            (None, Some(b)) => b as i64,
            (None, None) => -1,
        }
    }

    fn nearest_illicit(&self, start: NodeIndex, dir: Direction) -> Option<usize> {
        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([(start, 0usize)]);

        while let Some((node, dist)) = queue.pop_front() {
            for neighbor in self.graph.neighbors_directed(node, dir) {
                if !visited.insert(neighbor) {
                    continue;
                }
                if self.illicit.contains(&self.graph[neighbor]) {
                    return Some(dist + 1);
                }
                queue.push_back((neighbor, dist + 1));
            }
        }
        None
    }

    pub(crate) fn raw(&self) -> &StableDiGraph<String, EdgeData> {
        &self.graph
    }

    pub(crate) fn index_of(&self, wallet: &str) -> Option<NodeIndex> {
        self.node_map.get(wallet).copied()
    }
}

impl Default for TransactionGraph {
    fn default() -> Self {
        Self::new()
    }
}
