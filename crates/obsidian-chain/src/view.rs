//! Capability interfaces over the engine's external collaborators.
//!
//! The engine is pure and holds no state of its own: chain, UTXO, storage
//! and time access all flow through these traits, which the caller
//! implements over its own stores. This keeps the consensus code free of
//! process-wide singletons and makes it trivially mockable.

use crate::hash::Hash256;
use crate::index::BlockIndexEntry;
use crate::transaction::{Block, Coin, OutPoint, Transaction};

/// A consistent snapshot of the UTXO set.
pub trait UtxoView {
    /// Fetch the coin `outpoint` refers to, if present in the view.
    fn coin(&self, outpoint: &OutPoint) -> Option<Coin>;
}

/// On-disk block retrieval.
pub trait BlockStore {
    fn block(&self, index: &BlockIndexEntry) -> Option<Block>;
}

/// Indexed transaction lookup.
pub trait TxStore {
    /// Returns the transaction and the hash of its containing block.
    fn transaction(&self, txid: &Hash256) -> Option<(Transaction, Hash256)>;
}

/// Byte offsets of kernel transactions inside their blocks.
///
/// Only the legacy V1 kernel commits to this offset; the index is keyed by
/// height and reports zero for heights it has no record of.
pub trait TxOffsetIndex {
    fn tx_offset(&self, height: u32) -> u32;
}

/// Script verification for the kernel input.
pub trait ScriptVerifier {
    /// Check input `input_index` of `tx` against the previous output held in
    /// `coin`, with no extra verification flags.
    fn verify(&self, coin: &Coin, prev_txid: &Hash256, tx: &Transaction, input_index: usize)
        -> bool;
}

/// Network-adjusted wall clock.
pub trait Clock {
    /// Current network-adjusted time in Unix seconds.
    fn adjusted_time(&self) -> i64;
}
