//! # obsidian-consensus
//!
//! Proof-of-stake consensus rules for the Obsidian chain.
//!
//! This crate provides:
//! - Stake-modifier derivation: a 64-bit modifier recomputed once per
//!   modifier interval from 64 pseudo-randomly selected past blocks
//! - Kernel hash validation: the coin-age weighted V1 protocol and the
//!   value-weighted V2 protocol, switched by height
//! - The verification facade used by block connection and the staking loop
//! - Compact-bits target codec and network consensus parameters
//!
//! ## Determinism
//!
//! Every node must reach a bit-identical verdict for identical inputs, so
//! the engine is pure: all chain, UTXO, storage and time access arrives
//! through the capability traits of `obsidian-chain`, kernel streams are
//! serialized with fixed little-endian widths, and target arithmetic uses
//! unbounded integers so oversized products never wrap.
//!
//! ## Stake modifier
//!
//! The modifier scrambles kernel hashes so an output's future proofs cannot
//! be computed when it confirms. One entropy bit is drawn from each of 64
//! blocks selected without replacement over the selection interval; bits are
//! assembled into the new modifier when a block first lands past a
//! modifier-interval boundary.

mod compact;
mod error;
mod kernel;
mod modifier;
mod params;
mod stake;

pub use compact::{compact_to_target, target_to_compact};
pub use error::{ConsensusError, ConsensusResult};
pub use kernel::{
    check_coinstake_timestamp, check_stake_kernel_hash, check_stake_kernel_hash_v1,
    check_stake_kernel_hash_v2, stake_weight, KernelProof,
};
pub use modifier::{
    compute_next_stake_modifier, kernel_stake_modifier, selection_interval,
    selection_interval_section, KernelModifier,
};
pub use params::{
    ConsensusParams, ConsensusParamsConfig, ParamsError, COIN, MODIFIER_INTERVAL_RATIO,
};
pub use stake::{check_kernel, check_proof_of_stake, StakeContext};
