//! Proof-of-stake verification facade.
//!
//! Entry points for the two callers of the kernel engine: block connection
//! verifies a coinstake embedded in an arriving block
//! ([`check_proof_of_stake`]), and the staking loop probes whether an output
//! it holds would satisfy the kernel right now ([`check_kernel`]).
//!
//! All collaborator access is threaded through an explicit [`StakeContext`];
//! the engine owns no process-wide state.

use obsidian_chain::{
    BlockIndexEntry, BlockStore, ChainView, Clock, OutPoint, ScriptVerifier, Transaction,
    TxOffsetIndex, TxStore, UtxoView,
};
use tracing::debug;

use crate::kernel::{check_stake_kernel_hash, KernelProof};
use crate::params::ConsensusParams;
use crate::{ConsensusError, ConsensusResult};

/// The capability handles a stake check needs.
pub struct StakeContext<'a> {
    pub params: &'a ConsensusParams,
    pub chain: &'a dyn ChainView,
    pub utxo: &'a dyn UtxoView,
    pub blocks: &'a dyn BlockStore,
    pub txs: &'a dyn TxStore,
    pub tx_offsets: &'a dyn TxOffsetIndex,
    pub scripts: &'a dyn ScriptVerifier,
    pub clock: &'a dyn Clock,
}

/// Check the kernel hash target and coinstake signature for `tx`, the
/// coinstake of a block being connected on top of `prev_index`.
///
/// Errors carry a [`dos_score`](ConsensusError::dos_score): a kernel miss
/// scores 1, since honest nodes behind the chain can relay such blocks
/// during sync, while structural faults score 100.
pub fn check_proof_of_stake(
    ctx: &StakeContext<'_>,
    prev_index: &BlockIndexEntry,
    tx: &Transaction,
    bits: u32,
) -> ConsensusResult<KernelProof> {
    if !tx.is_coinstake() {
        return Err(ConsensusError::NotCoinstake);
    }

    // Kernel (input 0) must meet the stake hash target.
    let prevout = tx.inputs[0].prevout;

    let coin = ctx.utxo.coin(&prevout).ok_or_else(|| {
        debug!("stake prevout {} missing from the UTXO view", prevout);
        ConsensusError::StakePrevoutMissing(prevout.to_string())
    })?;

    let block_from_index = ctx
        .chain
        .ancestor_at(prev_index, coin.height)
        .ok_or(ConsensusError::KernelBlockMissing(coin.height))?;

    let block_from = ctx
        .blocks
        .block(block_from_index)
        .ok_or_else(|| ConsensusError::BlockNotFound(block_from_index.hash.to_string()))?;

    let (tx_prev, _block_hash) = ctx
        .txs
        .transaction(&prevout.hash)
        .ok_or_else(|| ConsensusError::PrevoutNotInChain(prevout.hash.to_string()))?;

    // Byte offset of the kernel transaction, keyed the legacy way by the
    // predecessor tip height.
    let tx_prev_offset = ctx.tx_offsets.tx_offset(prev_index.height);

    if !ctx.scripts.verify(&coin, &prevout.hash, tx, 0) {
        return Err(ConsensusError::SignatureFailed(prevout.to_string()));
    }

    check_stake_kernel_hash(
        ctx.params,
        ctx.chain,
        ctx.clock,
        prev_index,
        bits,
        &block_from,
        tx_prev_offset,
        &tx_prev,
        &prevout,
        tx.time,
        false,
    )
    .map_err(|err| {
        debug!("kernel check failed on coinstake spending {}: {}", prevout, err);
        err
    })
}

/// Probe whether `prevout` would satisfy the kernel at `tx_time`.
///
/// Lighter entry point used by the staking loop: the same loads as full
/// verification plus a coinbase-maturity guard, with diagnostics off and no
/// signature check (the prober owns the output).
pub fn check_kernel(
    ctx: &StakeContext<'_>,
    prev_index: &BlockIndexEntry,
    bits: u32,
    prevout: &OutPoint,
    tx_time: u32,
) -> ConsensusResult<KernelProof> {
    let coin = ctx
        .utxo
        .coin(prevout)
        .ok_or_else(|| ConsensusError::StakePrevoutMissing(prevout.to_string()))?;

    let depth = i64::from(prev_index.height) + 1 - i64::from(coin.height);
    if depth < i64::from(ctx.params.coinbase_maturity) {
        return Err(ConsensusError::ImmatureKernel {
            depth,
            required: ctx.params.coinbase_maturity,
        });
    }

    let block_from_index = ctx
        .chain
        .ancestor_at(prev_index, coin.height)
        .ok_or(ConsensusError::KernelBlockMissing(coin.height))?;

    if coin.spent {
        return Err(ConsensusError::KernelSpent(prevout.to_string()));
    }

    let block_from = ctx
        .blocks
        .block(block_from_index)
        .ok_or_else(|| ConsensusError::BlockNotFound(block_from_index.hash.to_string()))?;

    let tx_prev_offset = ctx.tx_offsets.tx_offset(prev_index.height);

    let (tx_prev, _block_hash) = ctx
        .txs
        .transaction(&prevout.hash)
        .ok_or_else(|| ConsensusError::PrevoutNotInChain(prevout.hash.to_string()))?;

    check_stake_kernel_hash(
        ctx.params,
        ctx.chain,
        ctx.clock,
        prev_index,
        bits,
        &block_from,
        tx_prev_offset,
        &tx_prev,
        prevout,
        tx_time,
        false,
    )
}
