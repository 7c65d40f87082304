//! Chain digests and the canonical kernel byte stream.
//!
//! Digests are double-SHA256 values kept in the chain's internal byte order
//! (little-endian limbs, matching the legacy wire format). `Display` renders
//! the conventional big-endian hex, so logs read the same as legacy node
//! logs. Ordering compares digests as 256-bit little-endian unsigned
//! integers.

use std::cmp::Ordering;
use std::fmt;

use sha2::{Digest, Sha256};

/// A 256-bit digest in internal (little-endian) byte order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hash256([u8; 32]);

impl Hash256 {
    /// The all-zero digest.
    pub const ZERO: Hash256 = Hash256([0u8; 32]);

    /// Wrap raw digest bytes, already in internal order.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Hash256(bytes)
    }

    /// The digest bytes in internal order.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// Parse the conventional big-endian hex rendering.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let decoded = hex::decode(s)?;
        let mut bytes: [u8; 32] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        bytes.reverse();
        Ok(Hash256(bytes))
    }
}

impl Ord for Hash256 {
    fn cmp(&self, other: &Self) -> Ordering {
        // Numeric comparison: most significant byte is last.
        for i in (0..32).rev() {
            match self.0[i].cmp(&other.0[i]) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Hash256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut reversed = self.0;
        reversed.reverse();
        f.write_str(&hex::encode(reversed))
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({})", self)
    }
}

/// Double-SHA256 of `data`.
pub fn double_sha256(data: &[u8]) -> Hash256 {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    Hash256(second.into())
}

/// Canonical little-endian byte stream feeding the chain's double-SHA256.
///
/// Field widths must match the legacy wire format exactly; kernel hashes are
/// consensus-critical, so a one-byte difference forks the chain.
#[derive(Debug, Default)]
pub struct HashWriter {
    buf: Vec<u8>,
}

impl HashWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u32(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_u64(&mut self, value: u64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Append a digest in its internal byte order.
    pub fn write_hash(&mut self, hash: &Hash256) -> &mut Self {
        self.buf.extend_from_slice(hash.as_bytes());
        self
    }

    /// The bytes written so far.
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Double-SHA256 over the accumulated stream.
    pub fn finalize(&self) -> Hash256 {
        double_sha256(&self.buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_sha256_empty() {
        // sha256d of the empty string, a fixed point every chain client agrees on.
        let digest = double_sha256(b"");
        assert_eq!(
            hex::encode(digest.as_bytes()),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }

    #[test]
    fn test_ordering_is_numeric_little_endian() {
        let mut small = [0u8; 32];
        small[0] = 0xff; // 255
        let mut big = [0u8; 32];
        big[31] = 0x01; // 1 << 248
        assert!(Hash256::from_bytes(small) < Hash256::from_bytes(big));
        assert_eq!(Hash256::ZERO.cmp(&Hash256::ZERO), Ordering::Equal);
    }

    #[test]
    fn test_display_reverses_byte_order() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xab;
        let hash = Hash256::from_bytes(bytes);
        let rendered = hash.to_string();
        assert!(rendered.ends_with("ab"));
        assert_eq!(Hash256::from_hex(&rendered).unwrap(), hash);
    }

    #[test]
    fn test_from_hex_rejects_bad_length() {
        assert!(Hash256::from_hex("abcd").is_err());
    }

    #[test]
    fn test_writer_layout() {
        let mut writer = HashWriter::new();
        writer.write_u64(0x0102030405060708);
        writer.write_u32(0x0a0b0c0d);
        assert_eq!(
            writer.bytes(),
            &[8, 7, 6, 5, 4, 3, 2, 1, 0x0d, 0x0c, 0x0b, 0x0a]
        );
    }

    #[test]
    fn test_writer_is_deterministic() {
        let build = || {
            let mut writer = HashWriter::new();
            writer.write_u64(42).write_u32(7).write_hash(&Hash256::ZERO);
            (writer.bytes().to_vec(), writer.finalize())
        };
        assert_eq!(build(), build());
    }
}
