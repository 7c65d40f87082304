//! Stake-modifier derivation.
//!
//! The stake modifier is a 64-bit value recomputed once per modifier
//! interval rather than once per block. Its purpose is to stop a coin owner
//! from precomputing the proof-of-stake their output will generate at
//! confirmation time: the kernel must hash with a modifier drawn from blocks
//! the owner does not control, and recomputing it on a fixed wall-clock
//! schedule keeps an attacker from gaining extra modifier bits by simply
//! generating a run of blocks.
//!
//! Each bit of a fresh modifier is contributed by one block selected from
//! the preceding selection interval. Selection hashes a candidate's proof
//! hash with the previous modifier, so the 64 winners are unpredictable
//! until the previous modifier is fixed, and a selected-set guarantees a
//! block contributes at most one bit.

use std::collections::HashSet;

use num_bigint::BigUint;
use obsidian_chain::{BlockIndexEntry, ChainView, Clock, Hash256, HashWriter};
use tracing::{debug, trace};

use crate::params::{ConsensusParams, MODIFIER_INTERVAL_RATIO};
use crate::{ConsensusError, ConsensusResult};

/// Duration in seconds of selection-interval section `section`.
///
/// Sections grow toward the end of the window, so early rounds pick from a
/// narrow slice of old blocks and later rounds sweep progressively wider.
pub fn selection_interval_section(params: &ConsensusParams, section: usize) -> i64 {
    assert!(section < 64);
    params.modifier_interval * 63
        / (63 + (63 - section as i64) * (MODIFIER_INTERVAL_RATIO - 1))
}

/// Total duration in seconds of the selection interval: the span of past
/// blocks sampled for one modifier, and the V1 look-ahead distance.
pub fn selection_interval(params: &ConsensusParams) -> i64 {
    (0..64)
        .map(|section| selection_interval_section(params, section))
        .sum()
}

/// Walk back from `index` to the most recent block that generated a
/// modifier.
fn last_stake_modifier<'a>(
    chain: &'a dyn ChainView,
    index: &'a BlockIndexEntry,
) -> ConsensusResult<(u64, i64)> {
    let mut cursor = index;
    while !cursor.generated_stake_modifier {
        cursor = chain
            .prev(cursor)
            .ok_or_else(|| ConsensusError::NoStakeModifier(index.hash.to_string()))?;
    }
    Ok((cursor.stake_modifier, cursor.time))
}

/// Pick the candidate with the lowest selection hash among those not yet
/// selected, preferring candidates with timestamps up to `stop` but falling
/// back to the first unselected one past it.
fn select_block_from_candidates<'a>(
    chain: &'a dyn ChainView,
    sorted_by_timestamp: &[(i64, Hash256)],
    selected: &HashSet<Hash256>,
    stop: i64,
    prev_modifier: u64,
) -> ConsensusResult<&'a BlockIndexEntry> {
    let mut best: Option<(&BlockIndexEntry, BigUint)> = None;

    for (_, hash) in sorted_by_timestamp {
        let index = chain
            .by_hash(hash)
            .ok_or_else(|| ConsensusError::BlockNotIndexed(hash.to_string()))?;
        if best.is_some() && index.time > stop {
            break;
        }
        if selected.contains(&index.hash) {
            continue;
        }

        // Couple the candidate's proof hash to the previous modifier so no
        // block owner can steer which candidate wins.
        let mut writer = HashWriter::new();
        writer.write_hash(&index.hash_proof);
        writer.write_u64(prev_modifier);
        let mut selection = BigUint::from_bytes_le(writer.finalize().as_bytes());

        // Divide proof-of-stake selection hashes by 2^32 so a stake block
        // always beats a work block, preserving energy efficiency.
        if index.proof_of_stake {
            selection >>= 32usize;
        }

        match &best {
            Some((_, best_selection)) if selection >= *best_selection => {}
            _ => best = Some((index, selection)),
        }
    }

    match best {
        Some((index, _)) => Ok(index),
        None => Err(ConsensusError::NoKernelCandidate { stop }),
    }
}

/// Derive the stake modifier for the block following `prev_index`.
///
/// Returns the modifier and whether it was freshly generated. A fresh
/// modifier is produced only when `prev_index` has crossed into a new
/// modifier interval since the last generation; otherwise the current
/// modifier is carried forward unchanged. A `None` predecessor is the
/// genesis case and yields modifier zero, counted as generated.
pub fn compute_next_stake_modifier(
    params: &ConsensusParams,
    chain: &dyn ChainView,
    prev_index: Option<&BlockIndexEntry>,
) -> ConsensusResult<(u64, bool)> {
    let prev_index = match prev_index {
        Some(index) => index,
        None => return Ok((0, true)),
    };

    let (current_modifier, modifier_time) = last_stake_modifier(chain, prev_index)?;
    if modifier_time / params.modifier_interval >= prev_index.time / params.modifier_interval {
        trace!(
            "stake modifier {:#018x} carried forward at height {}",
            current_modifier,
            prev_index.height + 1
        );
        return Ok((current_modifier, false));
    }

    // Gather every ancestor inside the selection window, oldest first.
    let interval = selection_interval(params);
    let start =
        (prev_index.time / params.modifier_interval) * params.modifier_interval - interval;
    let mut candidates: Vec<(i64, Hash256)> =
        Vec::with_capacity((64 * params.modifier_interval / params.target_spacing) as usize);
    let mut cursor = Some(prev_index);
    while let Some(index) = cursor {
        if index.time < start {
            break;
        }
        candidates.push((index.time, index.hash));
        cursor = chain.prev(index);
    }
    candidates.reverse();
    candidates.sort();

    // Select up to 64 blocks, one entropy bit each.
    let mut new_modifier: u64 = 0;
    let mut stop = start;
    let mut selected: HashSet<Hash256> = HashSet::new();
    let rounds = candidates.len().min(64);
    for round in 0..rounds {
        stop += selection_interval_section(params, round);
        let winner =
            select_block_from_candidates(chain, &candidates, &selected, stop, current_modifier)?;
        new_modifier |= u64::from(winner.stake_entropy_bit) << round;
        selected.insert(winner.hash);
        trace!(
            "selection round {}: stop={} bit={} height={}",
            round,
            stop,
            winner.stake_entropy_bit,
            winner.height
        );
    }

    debug!(
        "generated stake modifier {:#018x} for height {}",
        new_modifier,
        prev_index.height + 1
    );
    Ok((new_modifier, true))
}

/// The stake-modifier context chosen for a V1 kernel.
#[derive(Debug, Clone, Copy)]
pub struct KernelModifier {
    pub modifier: u64,
    /// Height of the block that generated it.
    pub height: u32,
    /// Time of the block that generated it.
    pub time: i64,
}

/// Find the modifier used to hash a V1 kernel: the one in effect roughly one
/// selection interval after the kernel input's block, so a staker cannot
/// know it when the output confirms.
///
/// When the walk reaches the tip before the interval closes, the failure is
/// reportable if `verbose` is set or the tip is recent enough by network
/// time that the window cannot have closed anywhere; otherwise it is the
/// soft [`ConsensusError::ModifierNotMatured`], meaning this node is behind
/// the chain and may retry once more blocks arrive.
pub fn kernel_stake_modifier(
    params: &ConsensusParams,
    chain: &dyn ChainView,
    clock: &dyn Clock,
    block_from_hash: &Hash256,
    verbose: bool,
) -> ConsensusResult<KernelModifier> {
    let from = chain
        .by_hash(block_from_hash)
        .ok_or_else(|| ConsensusError::BlockNotIndexed(block_from_hash.to_string()))?;

    let interval = selection_interval(params);
    let mut height = from.height;
    let mut time = from.time;
    let mut cursor = from;

    // Advance until the newest generated modifier lies a full selection
    // interval past the kernel block.
    while time < from.time + interval {
        match chain.next(cursor) {
            Some(next) => {
                cursor = next;
                if cursor.generated_stake_modifier {
                    height = cursor.height;
                    time = cursor.time;
                }
            }
            None => {
                // Reached the best block; the window is still open. The
                // legacy threshold compares the tip's age against network
                // time to decide whether this node is merely behind.
                if verbose
                    || cursor.time + params.stake_min_age - interval > clock.adjusted_time()
                {
                    return Err(ConsensusError::ModifierBeyondTip {
                        from: block_from_hash.to_string(),
                        tip: cursor.hash.to_string(),
                        tip_height: cursor.height,
                    });
                }
                debug!(
                    "kernel modifier window for block {} still open at tip",
                    block_from_hash
                );
                return Err(ConsensusError::ModifierNotMatured);
            }
        }
    }

    Ok(KernelModifier {
        modifier: cursor.stake_modifier,
        height,
        time,
    })
}
