//! # corvus-consensus
//!
//! Proof-of-work consensus rules for the Corvus blockchain.
//!
//! This crate provides:
//! - Cuckoo Cycle proof verification (the post-fork PoW)
//! - Legacy double-SHA256 PoW checking
//! - Difficulty retargeting, including the hard-fork reset, the testnet
//!   minimum-difficulty rule and the post-fork emergency retarget
//! - Per-network consensus parameters
//!
//! ## Cuckoo Cycle
//!
//! At `cuckoo_hardfork_height` the chain switches from double-SHA256 PoW to
//! Cuckoo Cycle: a header must carry 42 edge nonces forming a single
//! 42-cycle in a bipartite graph whose edges are derived from a SipHash-2-4
//! keystream seeded by the header's SHA-256 digest. The whole-header hash
//! is still compared against the compact target.
//!
//! ## Difficulty adjustment
//!
//! Ordinary Bitcoin-style retargeting once per interval (target scaled by
//! the measured window, clamped to 4x either way), with two additions: the
//! target resets to the cuckoo limit at the fork boundary, and after the
//! fork a sustained stall (seven blocks spanning more than 36 target
//! spacings) relaxes the target halfway toward the last easier one.
//!
//! Everything here is a pure function over immutable inputs; no locks, no
//! I/O, no global state.

mod chain_params;
pub mod cuckoo;
mod error;
mod pow;
mod siphash;

pub use chain_params::{ConsensusParams, ConsensusParamsConfig, ConsensusParamsError};
pub use error::{ConsensusError, ConsensusResult};
pub use pow::{
    calculate_next_work_required, check_cuckoo_proof_of_work, check_proof_of_work,
    contextual_check_header, next_work_required,
};
pub use siphash::{siphash24, SipHashKeys};
