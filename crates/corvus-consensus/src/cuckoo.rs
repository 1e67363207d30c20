//! Cuckoo Cycle proof verification.
//!
//! A proof is 42 strictly ascending edge nonces. Each nonce names an edge of
//! an implicit bipartite graph: the two endpoints are derived from a
//! SipHash-2-4 keystream seeded by the header, and the low bit of a node id
//! carries the partition. Verification checks that the 42 edges form one
//! simple cycle. The whole check is O(42^2) scans over a fixed 84-entry
//! scratch array; nothing here allocates.

use crate::siphash::{siphash24, SipHashKeys};
use thiserror::Error;

/// Number of edges a proof must contain (the cycle length).
pub const PROOF_SIZE: usize = 42;

/// Why a proof was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// An edge nonce exceeds the graph's edge mask.
    #[error("edge exceeds the graph size")]
    EdgeTooBig,
    /// The nonce sequence is not strictly ascending.
    #[error("edges not strictly ascending")]
    EdgesNotAscending,
    /// The endpoint multisets do not XOR to zero, so some node has odd
    /// degree and no cycle cover is possible.
    #[error("edge endpoints do not match up")]
    EndpointsMismatch,
    /// Some endpoint is shared by more than two edges.
    #[error("branch in cycle")]
    Branch,
    /// The traversal reached an endpoint no other edge shares.
    #[error("cycle dead ends")]
    DeadEnd,
    /// The traversal closed in fewer than 42 edges.
    #[error("cycle shorter than proof size")]
    ShortCycle,
}

/// Endpoint of an edge: `uorv` selects the partition, which also ends up in
/// the low bit of the node id, keeping the graph bipartite.
pub fn sipnode(keys: &SipHashKeys, nonce: u32, uorv: u32, edge_mask: u32) -> u32 {
    let hash = siphash24(keys, 2 * u64::from(nonce) + u64::from(uorv));
    (((hash as u32) & edge_mask) << 1) | uorv
}

/// Verify a 42-edge cycle proof against 32 bytes of key material.
///
/// Only the first 16 bytes of `key` seed the keystream. `edge_bits` is the
/// log2 of the per-partition edge count and must be below 32.
pub fn verify(
    nonces: &[u32; PROOF_SIZE],
    key: &[u8; 32],
    edge_bits: u32,
) -> Result<(), VerifyError> {
    let edge_mask = (1u32 << edge_bits) - 1;
    let keys = SipHashKeys::from_bytes(key[..16].try_into().unwrap());

    let mut uvs = [0u32; 2 * PROOF_SIZE];
    let mut xor0 = 0u32;
    let mut xor1 = 0u32;
    for n in 0..PROOF_SIZE {
        if nonces[n] > edge_mask {
            return Err(VerifyError::EdgeTooBig);
        }
        if n > 0 && nonces[n] <= nonces[n - 1] {
            return Err(VerifyError::EdgesNotAscending);
        }
        uvs[2 * n] = sipnode(&keys, nonces[n], 0, edge_mask);
        uvs[2 * n + 1] = sipnode(&keys, nonces[n], 1, edge_mask);
        xor0 ^= uvs[2 * n];
        xor1 ^= uvs[2 * n + 1];
    }
    // matching endpoints imply zero xors
    if xor0 | xor1 != 0 {
        return Err(VerifyError::EndpointsMismatch);
    }

    // follow the cycle: from position i, scan the other edges' endpoints in
    // the same partition (steps of 2) for the one sharing uvs[i], then cross
    // that edge via j ^ 1
    let mut n = 0;
    let mut i = 0;
    loop {
        let mut j = i;
        let mut k = i;
        loop {
            k = (k + 2) % (2 * PROOF_SIZE);
            if k == i {
                break;
            }
            if uvs[k] == uvs[i] {
                if j != i {
                    // two other edges share this endpoint
                    return Err(VerifyError::Branch);
                }
                j = k;
            }
        }
        if j == i {
            return Err(VerifyError::DeadEnd);
        }
        i = j ^ 1;
        n += 1;
        if i == 0 {
            break;
        }
    }
    if n == PROOF_SIZE {
        Ok(())
    } else {
        Err(VerifyError::ShortCycle)
    }
}
