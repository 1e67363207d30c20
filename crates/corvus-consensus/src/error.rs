//! Error types for consensus validation.

use thiserror::Error;

/// Consensus validation errors.
#[derive(Error, Debug)]
pub enum ConsensusError {
    /// The proof of work does not satisfy the claimed target.
    #[error("Invalid PoW: {0}")]
    InvalidPow(String),

    /// The header is malformed or inconsistent with its position.
    #[error("Invalid block header: {0}")]
    InvalidHeader(String),

    /// The claimed compact target is not the required one.
    #[error("Invalid difficulty: got {got}, expected {expected}")]
    InvalidDifficulty {
        /// Compact bits the header carries.
        got: String,
        /// Compact bits the retargeter requires.
        expected: String,
    },
}

/// Result type for consensus operations.
pub type ConsensusResult<T> = Result<T, ConsensusError>;
