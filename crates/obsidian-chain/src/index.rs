//! Block index entries and the active-chain view.

use crate::hash::Hash256;

/// Summary of an accepted block as kept by the block tree.
///
/// The stake fields are fixed when the block is connected and never
/// rewritten afterwards; the engine only ever reads them.
#[derive(Debug, Clone)]
pub struct BlockIndexEntry {
    pub height: u32,
    /// Block timestamp in Unix seconds.
    pub time: i64,
    pub hash: Hash256,
    /// The block's own proof hash: the kernel hash for proof-of-stake
    /// blocks, the block hash for proof-of-work blocks.
    pub hash_proof: Hash256,
    /// Stake modifier in effect for this block.
    pub stake_modifier: u64,
    /// True iff this block's slot crossed a modifier-interval boundary and a
    /// fresh modifier was produced at it.
    pub generated_stake_modifier: bool,
    /// One bit contributed to future stake modifiers; 0 or 1.
    pub stake_entropy_bit: u8,
    pub proof_of_stake: bool,
}

/// Read access to the active chain's block index.
///
/// The index must stay immutable for the duration of an engine call; the
/// caller holds whatever lock makes that true. Mock implementations live in
/// the integration-test harness.
pub trait ChainView {
    /// Look up an entry by block hash.
    fn by_hash<'a>(&'a self, hash: &Hash256) -> Option<&'a BlockIndexEntry>;

    /// The parent of `entry`, or `None` at genesis.
    fn prev<'a>(&'a self, entry: &BlockIndexEntry) -> Option<&'a BlockIndexEntry>;

    /// The canonical child of `entry` on the active chain, or `None` at the
    /// tip.
    fn next<'a>(&'a self, entry: &BlockIndexEntry) -> Option<&'a BlockIndexEntry>;

    /// The ancestor of `entry` at `height`, or `None` when `height` is above
    /// `entry` or the walk falls off the chain.
    fn ancestor_at<'a>(
        &'a self,
        entry: &'a BlockIndexEntry,
        height: u32,
    ) -> Option<&'a BlockIndexEntry> {
        if height > entry.height {
            return None;
        }
        let mut cursor = entry;
        while cursor.height > height {
            cursor = self.prev(cursor)?;
        }
        Some(cursor)
    }
}
