// src/synthetic.rs
//! Synthetic transaction batches shaped like the laundering archetypes the
//! engine scores. Used by the test suite and handy for demos and load
//! experiments; generation is deterministic for a given seed.

use crate::types::Transaction;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TOKEN: &str = "ETH";

fn transfer(source: &str, dest: &str, amount: f64, timestamp: DateTime<Utc>) -> Transaction {
    Transaction {
        source_wallet: source.to_string(),
        dest_wallet: dest.to_string(),
        amount,
        timestamp,
        token_type: TOKEN.to_string(),
    }
}

/// A hub splitting funds to `destinations` wallets (`d0`, `d1`, ...), one
/// transfer per minute. With `illicit_source` set, the hub first receives
/// the full amount from that wallet in a single inbound transfer.
pub fn smurfing_fan_out(
    hub: &str,
    illicit_source: Option<&str>,
    destinations: usize,
    amount: f64,
    start: DateTime<Utc>,
) -> Vec<Transaction> {
    let mut batch = Vec::with_capacity(destinations + 1);
    if let Some(source) = illicit_source {
        batch.push(transfer(source, hub, amount * destinations as f64, start));
    }
    for i in 0..destinations {
        batch.push(transfer(hub, &format!("d{i}"), amount, start + Duration::minutes(i as i64)));
    }
    batch
}

/// A linear chain `{prefix}0 -> {prefix}1 -> ...` of `hops` transfers, the
/// amount shrinking by `peel_rate` at every hop.
pub fn peeling_chain(
    prefix: &str,
    hops: usize,
    initial_amount: f64,
    peel_rate: f64,
    start: DateTime<Utc>,
) -> Vec<Transaction> {
    let mut batch = Vec::with_capacity(hops);
    let mut amount = initial_amount;
    for i in 0..hops {
        batch.push(transfer(
            &format!("{prefix}{i}"),
            &format!("{prefix}{}", i + 1),
            amount,
            start + Duration::minutes(i as i64),
        ));
        amount *= 1.0 - peel_rate;
    }
    batch
}

/// A closed cycle through the given wallets, one transfer per hop.
pub fn wash_cycle(wallets: &[&str], amount: f64, start: DateTime<Utc>) -> Vec<Transaction> {
    let mut batch = Vec::with_capacity(wallets.len());
    for (i, window) in wallets.windows(2).enumerate() {
        batch.push(transfer(window[0], window[1], amount, start + Duration::minutes(i as i64)));
    }
    if wallets.len() >= 2 {
        batch.push(transfer(
            wallets[wallets.len() - 1],
            wallets[0],
            amount,
            start + Duration::minutes(wallets.len() as i64),
        ));
    }
    batch
}

/// Unstructured retail-looking traffic between `noise0..noiseN` wallets,
/// spread over thirty days.
pub fn background_noise(
    wallet_count: usize,
    transfers: usize,
    seed: u64,
    start: DateTime<Utc>,
) -> Vec<Transaction> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut batch = Vec::with_capacity(transfers);
    if wallet_count < 2 {
        return batch;
    }
    for _ in 0..transfers {
        let source = rng.gen_range(0..wallet_count);
        let mut dest = rng.gen_range(0..wallet_count);
        while dest == source {
            dest = rng.gen_range(0..wallet_count);
        }
        batch.push(transfer(
            &format!("noise{source}"),
            &format!("noise{dest}"),
            rng.gen_range(1.0..500.0),
            start + Duration::minutes(rng.gen_range(0..60 * 24 * 30)),
        ));
    }
    batch
}
