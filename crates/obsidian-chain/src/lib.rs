//! # obsidian-chain
//!
//! Chain-facing data types and capability traits for the Obsidian
//! proof-of-stake engine.
//!
//! This crate provides:
//! - The chain's 256-bit digest type and double-SHA256 hashing
//! - The canonical little-endian byte stream used for kernel hashing
//! - Block index entries and the active-chain view
//! - Read-only transaction, output and coin views
//! - Capability traits over the external collaborators (UTXO view, block
//!   and transaction storage, script verification, adjusted time)
//!
//! The engine in `obsidian-consensus` is pure: everything it reads arrives
//! through the types and traits defined here, so callers decide where the
//! data actually lives.

mod hash;
mod index;
mod transaction;
mod view;

pub use hash::{double_sha256, Hash256, HashWriter};
pub use index::{BlockIndexEntry, ChainView};
pub use transaction::{Block, Coin, OutPoint, Transaction, TxIn, TxOut};
pub use view::{BlockStore, Clock, ScriptVerifier, TxOffsetIndex, TxStore, UtxoView};
