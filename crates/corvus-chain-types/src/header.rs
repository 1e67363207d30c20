//! Block headers and their canonical serialization.
//!
//! Corvus headers are Bitcoin's 80-byte headers with a 42-word Cuckoo Cycle
//! proof appended once the hard fork activates. Whether the proof is present
//! on the wire is decided by a version bit, not by height, so a header can
//! be serialized and hashed without any chain context.

use sha2::{Digest, Sha256};

/// Number of nonces in a Cuckoo Cycle proof.
pub const CUCKOO_PROOF_SIZE: usize = 42;

/// Version bit marking a header as carrying Cuckoo Cycle PoW.
pub const CUCKOO_HARDFORK_VERSION_MASK: i32 = 0x4000_0000;

/// Size of the legacy header serialization: version, previous block hash,
/// merkle root, time, bits, nonce.
pub const HEADER_BASE_SIZE: usize = 80;

/// A block header.
///
/// `cuckoo_proof` is only meaningful (and only serialized) when the version
/// carries [`CUCKOO_HARDFORK_VERSION_MASK`]; legacy headers keep it zeroed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    /// Block version.
    pub version: i32,
    /// Hash of the previous block header.
    pub prev_block_hash: [u8; 32],
    /// Merkle root of the block's transactions.
    pub merkle_root: [u8; 32],
    /// Block timestamp (seconds since the epoch).
    pub time: u32,
    /// Required difficulty target in compact form.
    pub bits: u32,
    /// PoW nonce.
    pub nonce: u32,
    /// Cuckoo Cycle proof: 42 strictly ascending edge nonces.
    pub cuckoo_proof: [u32; CUCKOO_PROOF_SIZE],
}

impl BlockHeader {
    /// Whether this header claims Cuckoo Cycle PoW.
    pub fn is_cuckoo_pow(&self) -> bool {
        self.version & CUCKOO_HARDFORK_VERSION_MASK == CUCKOO_HARDFORK_VERSION_MASK
    }

    /// The 80-byte prefix of the canonical serialization, all fields
    /// little-endian. The cuckoo proof is never part of this prefix.
    pub fn canonical80(&self) -> [u8; HEADER_BASE_SIZE] {
        let mut out = [0u8; HEADER_BASE_SIZE];
        out[0..4].copy_from_slice(&self.version.to_le_bytes());
        out[4..36].copy_from_slice(&self.prev_block_hash);
        out[36..68].copy_from_slice(&self.merkle_root);
        out[68..72].copy_from_slice(&self.time.to_le_bytes());
        out[72..76].copy_from_slice(&self.bits.to_le_bytes());
        out[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        out
    }

    /// The full canonical serialization: the 80-byte prefix, followed by
    /// the 42 proof words for cuckoo headers.
    pub fn serialize_canonical(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_BASE_SIZE + 4 * CUCKOO_PROOF_SIZE);
        out.extend_from_slice(&self.canonical80());
        if self.is_cuckoo_pow() {
            for word in &self.cuckoo_proof {
                out.extend_from_slice(&word.to_le_bytes());
            }
        }
        out
    }

    /// The whole-header hash: double SHA-256 of the canonical serialization.
    ///
    /// This is the hash compared against the difficulty target, for legacy
    /// and cuckoo headers alike; for the latter it commits to the proof.
    pub fn header_hash(&self) -> [u8; 32] {
        let first = Sha256::digest(self.serialize_canonical());
        Sha256::digest(first).into()
    }

    /// Key material for the Cuckoo Cycle verifier: a single SHA-256 of the
    /// 80-byte prefix. The proof itself is deliberately excluded, since the
    /// proof is a function of this key.
    pub fn cuckoo_pow_key(&self) -> [u8; 32] {
        Sha256::digest(self.canonical80()).into()
    }
}
