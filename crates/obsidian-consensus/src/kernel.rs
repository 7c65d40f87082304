//! Kernel hash validation.
//!
//! A coinstake is valid when the double-SHA256 of its kernel stream falls at
//! or below the compact difficulty target weighted by the staked output. The
//! stream commits to a stake modifier and to timestamps the staker cannot
//! grind without invalidating the kernel, and deliberately excludes block
//! and transaction hashes, which can be produced in vast quantities.
//!
//! Two protocol versions coexist in chain history. V1 weights the target by
//! coin-day age and hashes with a modifier chosen a selection interval after
//! the kernel input's block. V2 weights by value alone, hashes with the
//! tip's modifier directly, and quantizes coinstake timestamps to a fixed
//! granularity.

use num_bigint::BigUint;
use obsidian_chain::{
    Block, BlockIndexEntry, ChainView, Clock, Hash256, HashWriter, OutPoint, Transaction,
};
use tracing::{debug, trace};

use crate::compact::compact_to_target;
use crate::modifier::kernel_stake_modifier;
use crate::params::{ConsensusParams, COIN};
use crate::{ConsensusError, ConsensusResult};

/// Seconds per coin-day.
const COIN_DAY: i64 = 24 * 60 * 60;

/// Outcome of a passing kernel check.
#[derive(Debug, Clone)]
pub struct KernelProof {
    /// Double-SHA256 over the kernel stream.
    pub hash_proof: Hash256,
    /// Weighted target the hash was measured against.
    pub target: BigUint,
}

/// Kernel weight of an output held over `[interval_begin, interval_end]`.
///
/// Weight starts at zero at the minimum age, so freshly matured coins do not
/// dominate while proof-of-stake difficulty is low, and is capped at the
/// maximum age. Only the upper bound is clamped.
pub fn stake_weight(params: &ConsensusParams, interval_begin: i64, interval_end: i64) -> i64 {
    (interval_end - interval_begin - params.stake_min_age).min(params.stake_max_age)
}

fn kernel_output(tx_prev: &Transaction, prevout: &OutPoint) -> ConsensusResult<i64> {
    tx_prev
        .outputs
        .get(prevout.n as usize)
        .map(|output| output.value)
        .ok_or_else(|| ConsensusError::KernelOutputMissing {
            txid: prevout.hash.to_string(),
            n: prevout.n,
        })
}

fn check_kernel_preconditions(
    params: &ConsensusParams,
    block_from_time: u32,
    tx_prev_time: u32,
    tx_time: u32,
) -> ConsensusResult<()> {
    if tx_time < tx_prev_time {
        return Err(ConsensusError::TimestampViolation {
            tx_time,
            prev_time: tx_prev_time,
        });
    }
    if i64::from(block_from_time) + params.stake_min_age > i64::from(tx_time) {
        return Err(ConsensusError::MinAgeViolation {
            block_time: block_from_time,
            tx_time,
        });
    }
    Ok(())
}

/// Legacy coin-age weighted kernel check.
///
/// The kernel stream commits, in order, to the stake modifier, the kernel
/// block's timestamp, the kernel transaction's byte offset inside that
/// block, the kernel transaction's timestamp, the output index and the
/// coinstake timestamp. The modifier is looked up a selection interval ahead
/// of the kernel block via the forward walk.
#[allow(clippy::too_many_arguments)]
pub fn check_stake_kernel_hash_v1(
    params: &ConsensusParams,
    chain: &dyn ChainView,
    clock: &dyn Clock,
    bits: u32,
    block_from: &Block,
    tx_prev_offset: u32,
    tx_prev: &Transaction,
    prevout: &OutPoint,
    tx_time: u32,
    verbose: bool,
) -> ConsensusResult<KernelProof> {
    check_kernel_preconditions(params, block_from.time, tx_prev.time, tx_time)?;

    let target_per_coin_day = compact_to_target(bits);
    let value_in = kernel_output(tx_prev, prevout)?;

    // Coin-day weight scales the base target. The weight passes through an
    // unsigned 64-bit lane exactly like the legacy arithmetic, so an
    // out-of-range negative weight wraps instead of clamping.
    let weight = stake_weight(params, i64::from(tx_prev.time), i64::from(tx_time));
    let coin_day_weight = BigUint::from(value_in as u64) * BigUint::from(weight as u64)
        / (COIN as u64)
        / (COIN_DAY as u64);
    let target = &coin_day_weight * &target_per_coin_day;

    let kernel_modifier =
        kernel_stake_modifier(params, chain, clock, &block_from.hash, verbose)?;

    let mut writer = HashWriter::new();
    writer.write_u64(kernel_modifier.modifier);
    writer.write_u32(block_from.time);
    writer.write_u32(tx_prev_offset);
    writer.write_u32(tx_prev.time);
    writer.write_u32(prevout.n);
    writer.write_u32(tx_time);
    let hash_proof = writer.finalize();

    trace!(
        "v1 kernel: modifier {:#018x} (height {}) block_from_time={} offset={} hash={}",
        kernel_modifier.modifier,
        kernel_modifier.height,
        block_from.time,
        tx_prev_offset,
        hash_proof
    );

    if BigUint::from_bytes_le(hash_proof.as_bytes()) > target {
        return Err(ConsensusError::AboveTarget { hash_proof, target });
    }

    if verbose {
        debug!("v1 kernel pass: hash={} target={:x}", hash_proof, target);
    }

    Ok(KernelProof { hash_proof, target })
}

/// Value-weighted kernel check used from the V2 switch height onward.
///
/// The byte-offset entropy source is replaced by the kernel prevout's
/// transaction hash, the coin-day term is dropped, and the modifier is read
/// straight from the chain tip.
pub fn check_stake_kernel_hash_v2(
    params: &ConsensusParams,
    prev_index: &BlockIndexEntry,
    bits: u32,
    block_from_time: u32,
    tx_prev: &Transaction,
    prevout: &OutPoint,
    tx_time: u32,
    verbose: bool,
) -> ConsensusResult<KernelProof> {
    check_kernel_preconditions(params, block_from_time, tx_prev.time, tx_time)?;

    let value_in = kernel_output(tx_prev, prevout)?;
    let target = compact_to_target(bits) * BigUint::from(value_in as u64);

    let modifier = prev_index.stake_modifier;

    let mut writer = HashWriter::new();
    writer.write_u64(modifier);
    writer.write_u32(block_from_time);
    writer.write_u32(tx_prev.time);
    writer.write_hash(&prevout.hash);
    writer.write_u32(prevout.n);
    writer.write_u32(tx_time);
    let hash_proof = writer.finalize();

    trace!(
        "v2 kernel: modifier {:#018x} block_from_time={} prevout={} hash={}",
        modifier,
        block_from_time,
        prevout,
        hash_proof
    );

    if BigUint::from_bytes_le(hash_proof.as_bytes()) > target {
        debug!("stake hash {} above target {:x}", hash_proof, target);
        return Err(ConsensusError::AboveTarget { hash_proof, target });
    }

    if verbose {
        debug!("v2 kernel pass: hash={} target={:x}", hash_proof, target);
    }

    Ok(KernelProof { hash_proof, target })
}

/// Route a kernel check to V1 or V2 semantics by the height being connected.
#[allow(clippy::too_many_arguments)]
pub fn check_stake_kernel_hash(
    params: &ConsensusParams,
    chain: &dyn ChainView,
    clock: &dyn Clock,
    prev_index: &BlockIndexEntry,
    bits: u32,
    block_from: &Block,
    tx_prev_offset: u32,
    tx_prev: &Transaction,
    prevout: &OutPoint,
    tx_time: u32,
    verbose: bool,
) -> ConsensusResult<KernelProof> {
    if prev_index.height + 1 > params.protocol_v2_height {
        check_stake_kernel_hash_v2(
            params,
            prev_index,
            bits,
            block_from.time,
            tx_prev,
            prevout,
            tx_time,
            verbose,
        )
    } else {
        check_stake_kernel_hash_v1(
            params,
            chain,
            clock,
            bits,
            block_from,
            tx_prev_offset,
            tx_prev,
            prevout,
            tx_time,
            verbose,
        )
    }
}

/// Whether a coinstake timestamp is acceptable for its enclosing block.
///
/// The coinstake must carry its block's timestamp; from the V2 switch height
/// onward the low mask bits must also be zero, quantizing candidate
/// timestamps to a fixed granularity.
pub fn check_coinstake_timestamp(
    params: &ConsensusParams,
    height: u32,
    block_time: i64,
    tx_time: i64,
) -> bool {
    if height > params.protocol_v2_height {
        block_time == tx_time && (tx_time & i64::from(params.stake_timestamp_mask)) == 0
    } else {
        block_time == tx_time
    }
}
