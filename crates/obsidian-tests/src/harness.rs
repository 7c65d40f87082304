//! In-memory collaborators for engine tests.
//!
//! [`MemoryChain`] plays every role the node's block tree, UTXO view,
//! storage layers and clock play in production: it keeps a linear active
//! chain of index entries, the blocks and transactions behind them, and a
//! coin map. Appending a block derives its stake modifier through the
//! engine, the same way block connection does.

use std::collections::HashMap;

use obsidian_chain::{
    Block, BlockIndexEntry, BlockStore, ChainView, Clock, Coin, Hash256, OutPoint,
    ScriptVerifier, Transaction, TxOffsetIndex, TxStore, UtxoView,
};
use obsidian_consensus::{compute_next_stake_modifier, ConsensusParams, StakeContext};

use crate::generators;

/// An in-memory active chain plus the stores hanging off it.
pub struct MemoryChain {
    pub params: ConsensusParams,
    entries: Vec<BlockIndexEntry>,
    by_hash: HashMap<Hash256, usize>,
    blocks: HashMap<Hash256, Block>,
    txs: HashMap<Hash256, (Transaction, Hash256)>,
    coins: HashMap<OutPoint, Coin>,
    tx_offsets: HashMap<u32, u32>,
    /// When set, every script check fails.
    pub reject_scripts: bool,
    /// Network-adjusted time reported to the engine.
    pub now: i64,
}

impl MemoryChain {
    /// Create a chain holding only a genesis block at `genesis_time`.
    pub fn new(params: ConsensusParams, genesis_time: i64) -> Self {
        let mut chain = MemoryChain {
            params,
            entries: Vec::new(),
            by_hash: HashMap::new(),
            blocks: HashMap::new(),
            txs: HashMap::new(),
            coins: HashMap::new(),
            tx_offsets: HashMap::new(),
            reject_scripts: false,
            now: genesis_time,
        };
        chain.push_block(genesis_time, false);
        chain
    }

    /// Append a block to the active chain, deriving its stake modifier the
    /// way block connection does.
    pub fn push_block(&mut self, time: i64, proof_of_stake: bool) -> Hash256 {
        let height = self.entries.len() as u32;
        let hash = generators::block_hash(height, time);
        let hash_proof = if proof_of_stake {
            generators::proof_hash(height, time)
        } else {
            hash
        };
        let (stake_modifier, generated_stake_modifier) =
            compute_next_stake_modifier(&self.params, &*self, self.entries.last())
                .expect("modifier derivation on a well-formed chain");
        let entry = BlockIndexEntry {
            height,
            time,
            hash,
            hash_proof,
            stake_modifier,
            generated_stake_modifier,
            stake_entropy_bit: hash.as_bytes()[0] & 1,
            proof_of_stake,
        };
        self.by_hash.insert(hash, self.entries.len());
        self.blocks.insert(
            hash,
            Block {
                hash,
                time: time as u32,
            },
        );
        self.entries.push(entry);
        self.now = self.now.max(time);
        hash
    }

    /// Extend the chain with `count` blocks spaced `spacing` seconds apart.
    pub fn extend(&mut self, count: usize, spacing: i64, proof_of_stake: bool) {
        for _ in 0..count {
            let time = self.tip().time + spacing;
            self.push_block(time, proof_of_stake);
        }
    }

    pub fn tip(&self) -> &BlockIndexEntry {
        self.entries.last().expect("chain always has a genesis")
    }

    pub fn entry_at(&self, height: u32) -> &BlockIndexEntry {
        &self.entries[height as usize]
    }

    pub fn entries(&self) -> &[BlockIndexEntry] {
        &self.entries
    }

    /// Register a stakeable output created at `height`, returning its
    /// outpoint. The funding transaction lands in the tx store and its first
    /// output in the coin map.
    pub fn add_stake_output(&mut self, seed: u8, tx: Transaction, height: u32) -> OutPoint {
        let txid = generators::test_txid(seed);
        let outpoint = OutPoint::new(txid, 0);
        let output = tx.outputs[0].clone();
        let block_hash = self.entries[height as usize].hash;
        self.txs.insert(txid, (tx, block_hash));
        self.coins.insert(
            outpoint,
            Coin {
                output,
                height,
                coinbase: false,
                spent: false,
            },
        );
        outpoint
    }

    /// Register only the coin, leaving the funding transaction unindexed.
    pub fn add_orphan_coin(&mut self, seed: u8, value: i64, height: u32) -> OutPoint {
        let outpoint = OutPoint::new(generators::test_txid(seed), 0);
        self.coins.insert(
            outpoint,
            Coin {
                output: obsidian_chain::TxOut {
                    value,
                    script_pubkey: vec![0x51],
                },
                height,
                coinbase: false,
                spent: false,
            },
        );
        outpoint
    }

    pub fn mark_spent(&mut self, outpoint: &OutPoint) {
        self.coins
            .get_mut(outpoint)
            .expect("coin to mark spent")
            .spent = true;
    }

    pub fn set_tx_offset(&mut self, height: u32, offset: u32) {
        self.tx_offsets.insert(height, offset);
    }

    /// Drop a block from the on-disk store while keeping its index entry.
    pub fn forget_block(&mut self, hash: &Hash256) {
        self.blocks.remove(hash);
    }

    /// Bundle this chain's capabilities into a stake-check context.
    pub fn context(&self) -> StakeContext<'_> {
        StakeContext {
            params: &self.params,
            chain: self,
            utxo: self,
            blocks: self,
            txs: self,
            tx_offsets: self,
            scripts: self,
            clock: self,
        }
    }
}

impl ChainView for MemoryChain {
    fn by_hash<'a>(&'a self, hash: &Hash256) -> Option<&'a BlockIndexEntry> {
        self.by_hash.get(hash).map(|&i| &self.entries[i])
    }

    fn prev<'a>(&'a self, entry: &BlockIndexEntry) -> Option<&'a BlockIndexEntry> {
        entry
            .height
            .checked_sub(1)
            .and_then(|h| self.entries.get(h as usize))
    }

    fn next<'a>(&'a self, entry: &BlockIndexEntry) -> Option<&'a BlockIndexEntry> {
        self.entries.get(entry.height as usize + 1)
    }
}

impl UtxoView for MemoryChain {
    fn coin(&self, outpoint: &OutPoint) -> Option<Coin> {
        self.coins.get(outpoint).cloned()
    }
}

impl BlockStore for MemoryChain {
    fn block(&self, index: &BlockIndexEntry) -> Option<Block> {
        self.blocks.get(&index.hash).cloned()
    }
}

impl TxStore for MemoryChain {
    fn transaction(&self, txid: &Hash256) -> Option<(Transaction, Hash256)> {
        self.txs.get(txid).cloned()
    }
}

impl TxOffsetIndex for MemoryChain {
    fn tx_offset(&self, height: u32) -> u32 {
        self.tx_offsets.get(&height).copied().unwrap_or(0)
    }
}

impl ScriptVerifier for MemoryChain {
    fn verify(
        &self,
        _coin: &Coin,
        _prev_txid: &Hash256,
        _tx: &Transaction,
        _input_index: usize,
    ) -> bool {
        !self.reject_scripts
    }
}

impl Clock for MemoryChain {
    fn adjusted_time(&self) -> i64 {
        self.now
    }
}
