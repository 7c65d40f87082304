//! Read-only transaction, output and coin views consumed by the engine.

use std::fmt;

use crate::hash::Hash256;

/// Reference to a transaction output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutPoint {
    pub hash: Hash256,
    pub n: u32,
}

impl OutPoint {
    pub fn new(hash: Hash256, n: u32) -> Self {
        OutPoint { hash, n }
    }

    /// The coinbase marker: zero hash, all-ones index.
    pub fn is_null(&self) -> bool {
        self.hash.is_zero() && self.n == u32::MAX
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hash, self.n)
    }
}

/// A transaction output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxOut {
    /// Value in base units (`COIN` subunits per coin).
    pub value: i64,
    pub script_pubkey: Vec<u8>,
}

impl TxOut {
    /// The empty marker output that opens every coinstake.
    pub fn is_empty(&self) -> bool {
        self.value == 0 && self.script_pubkey.is_empty()
    }
}

/// A transaction input.
#[derive(Debug, Clone)]
pub struct TxIn {
    pub prevout: OutPoint,
    pub script_sig: Vec<u8>,
}

/// The parts of a transaction the engine reads.
#[derive(Debug, Clone)]
pub struct Transaction {
    /// Transaction timestamp in Unix seconds.
    pub time: u32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
}

impl Transaction {
    /// A coinstake spends a real previous output into a transaction whose
    /// first output is the empty marker.
    pub fn is_coinstake(&self) -> bool {
        !self.inputs.is_empty()
            && !self.inputs[0].prevout.is_null()
            && self.outputs.len() >= 2
            && self.outputs[0].is_empty()
    }
}

/// The parts of an on-disk block the engine reads.
#[derive(Debug, Clone)]
pub struct Block {
    pub hash: Hash256,
    /// Header timestamp in Unix seconds.
    pub time: u32,
}

/// An unspent output as presented by the UTXO view.
#[derive(Debug, Clone)]
pub struct Coin {
    pub output: TxOut,
    /// Height of the block that created the output.
    pub height: u32,
    pub coinbase: bool,
    pub spent: bool,
}
