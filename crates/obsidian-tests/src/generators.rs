//! Deterministic test-data generators.
//!
//! Everything here is a pure function of its arguments, so chains rebuilt
//! from the same inputs are byte-identical across runs and platforms.

use obsidian_chain::{double_sha256, Hash256, OutPoint, Transaction, TxIn, TxOut};
use obsidian_consensus::{ConsensusParams, COIN};

/// Compact bits whose expanded target dwarfs any 256-bit hash once weighted,
/// so structural tests never depend on hash luck.
pub const HUGE_BITS: u32 = 0x2100ffff;

/// Consensus parameters sized for unit-scale chains, V2 switch at 1000.
pub fn test_params() -> ConsensusParams {
    ConsensusParams {
        stake_min_age: 3_600,
        stake_max_age: 90 * 24 * 3_600,
        modifier_interval: 600,
        target_spacing: 64,
        protocol_v2_height: 1_000,
        coinbase_maturity: 10,
        stake_timestamp_mask: 15,
    }
}

/// Test parameters that keep every height on V1 semantics.
pub fn test_params_v1() -> ConsensusParams {
    ConsensusParams {
        protocol_v2_height: u32::MAX,
        ..test_params()
    }
}

/// Test parameters that put every height on V2 semantics.
pub fn test_params_v2() -> ConsensusParams {
    ConsensusParams {
        protocol_v2_height: 0,
        ..test_params()
    }
}

fn tagged_hash(tag: &[u8], height: u32, time: i64) -> Hash256 {
    let mut data = tag.to_vec();
    data.extend_from_slice(&height.to_le_bytes());
    data.extend_from_slice(&time.to_le_bytes());
    double_sha256(&data)
}

/// Deterministic block hash for a test block.
pub fn block_hash(height: u32, time: i64) -> Hash256 {
    tagged_hash(b"block", height, time)
}

/// Deterministic proof hash for a test proof-of-stake block.
pub fn proof_hash(height: u32, time: i64) -> Hash256 {
    tagged_hash(b"proof", height, time)
}

/// Deterministic transaction id from a seed.
pub fn test_txid(seed: u8) -> Hash256 {
    let mut data = b"tx".to_vec();
    data.push(seed);
    double_sha256(&data)
}

/// The transaction that created a stakeable output.
pub fn funding_tx(time: u32, value: i64) -> Transaction {
    Transaction {
        time,
        inputs: vec![],
        outputs: vec![TxOut {
            value,
            script_pubkey: vec![0x51],
        }],
    }
}

/// A minimal coinstake spending `prevout` at `time`.
pub fn coinstake(prevout: OutPoint, time: u32) -> Transaction {
    Transaction {
        time,
        inputs: vec![TxIn {
            prevout,
            script_sig: vec![0x51],
        }],
        outputs: vec![
            TxOut::default(),
            TxOut {
                value: 2 * COIN,
                script_pubkey: vec![0x51],
            },
        ],
    }
}
