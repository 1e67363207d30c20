//! # corvus-chain-types
//!
//! Core chain types shared across the Corvus node:
//!
//! - [`ArithU256`]: 256-bit target arithmetic with the Bitcoin-compatible
//!   compact ("nBits") codec, including its negative/overflow flags
//! - [`BlockHeader`]: headers with the post-fork Cuckoo Cycle proof and
//!   their canonical serialization and hashes
//! - [`BlockIndex`]: immutable chain index entries supplying ancestor
//!   lookups and median-time-past to the consensus rules
//!
//! Everything here is a pure value type; nothing touches storage or the
//! network.

mod arith;
mod header;
mod index;

pub use arith::ArithU256;
pub use header::{
    BlockHeader, CUCKOO_HARDFORK_VERSION_MASK, CUCKOO_PROOF_SIZE, HEADER_BASE_SIZE,
};
pub use index::{BlockIndex, MEDIAN_TIME_SPAN};
