//! Error types for stake validation.

use num_bigint::BigUint;
use obsidian_chain::Hash256;
use thiserror::Error;

/// Stake validation errors.
#[derive(Error, Debug)]
pub enum ConsensusError {
    /// Proof-of-stake check invoked on a transaction that is not a
    /// coinstake.
    #[error("not a coinstake transaction")]
    NotCoinstake,

    /// The kernel input is absent from the UTXO view.
    #[error("stake prevout {0} does not exist in the UTXO view")]
    StakePrevoutMissing(String),

    /// The block that created the kernel input is not an ancestor of the
    /// chain being extended.
    #[error("block at height {0} for stake prevout cannot be loaded")]
    KernelBlockMissing(u32),

    /// The kernel input's block could not be read from disk.
    #[error("block {0} not found on disk")]
    BlockNotFound(String),

    /// The kernel input's transaction is not indexed on the active chain.
    #[error("stake prevout transaction {0} not in chain")]
    PrevoutNotInChain(String),

    /// The referenced transaction has no output at the kernel index.
    #[error("kernel prevout {txid}:{n} not present in referenced transaction")]
    KernelOutputMissing { txid: String, n: u32 },

    /// The kernel input's scriptSig does not satisfy its scriptPubKey.
    #[error("signature check failed on coinstake input {0}")]
    SignatureFailed(String),

    /// The kernel input has not reached coinbase maturity.
    #[error("kernel input at depth {depth}, {required} required")]
    ImmatureKernel { depth: i64, required: u32 },

    /// The kernel input is already spent.
    #[error("kernel input {0} already spent")]
    KernelSpent(String),

    /// The coinstake claims a timestamp earlier than its kernel input.
    #[error("coinstake time {tx_time} earlier than kernel input time {prev_time}")]
    TimestampViolation { tx_time: u32, prev_time: u32 },

    /// The kernel input is younger than the minimum stake age.
    #[error("min age violation: kernel block time {block_time}, coinstake time {tx_time}")]
    MinAgeViolation { block_time: u32, tx_time: u32 },

    /// The kernel hash does not meet the weighted target.
    #[error("kernel hash {hash_proof} does not meet target {target:x}")]
    AboveTarget { hash_proof: Hash256, target: BigUint },

    /// No generated stake modifier is reachable walking back to genesis.
    #[error("no stake modifier generated at or before block {0}")]
    NoStakeModifier(String),

    /// A block referenced during modifier derivation is not indexed.
    #[error("block {0} not indexed")]
    BlockNotIndexed(String),

    /// A selection round found no eligible candidate block.
    #[error("no eligible modifier candidate at or before {stop}")]
    NoKernelCandidate { stop: i64 },

    /// The modifier selection interval extends past the best block.
    #[error("modifier window for block {from} still open at tip {tip} (height {tip_height})")]
    ModifierBeyondTip {
        from: String,
        tip: String,
        tip_height: u32,
    },

    /// The modifier window is still open but the node is simply behind the
    /// chain; the caller may retry once more blocks arrive.
    #[error("kernel stake modifier not yet matured")]
    ModifierNotMatured,
}

impl ConsensusError {
    /// Misbehavior score a peer earns for relaying data that fails with this
    /// error: 100 flags the peer, 1 tolerates nodes that are merely behind,
    /// 0 is a soft failure worth retrying locally.
    pub fn dos_score(&self) -> u32 {
        match self {
            ConsensusError::NotCoinstake
            | ConsensusError::StakePrevoutMissing(_)
            | ConsensusError::KernelBlockMissing(_)
            | ConsensusError::BlockNotFound(_)
            | ConsensusError::KernelOutputMissing { .. }
            | ConsensusError::SignatureFailed(_)
            | ConsensusError::NoStakeModifier(_)
            | ConsensusError::BlockNotIndexed(_)
            | ConsensusError::NoKernelCandidate { .. } => 100,

            ConsensusError::PrevoutNotInChain(_)
            | ConsensusError::TimestampViolation { .. }
            | ConsensusError::MinAgeViolation { .. }
            | ConsensusError::AboveTarget { .. }
            | ConsensusError::ModifierBeyondTip { .. } => 1,

            ConsensusError::ImmatureKernel { .. }
            | ConsensusError::KernelSpent(_)
            | ConsensusError::ModifierNotMatured => 0,
        }
    }
}

/// Result type for stake validation.
pub type ConsensusResult<T> = Result<T, ConsensusError>;
