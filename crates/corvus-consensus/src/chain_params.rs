//! Consensus parameters for the Corvus networks.
//!
//! Static, per-network values: the legacy and post-fork PoW limits, the
//! retargeting window, the testnet/regtest relaxations, and where the
//! Cuckoo Cycle hard fork activates. Nothing here changes at runtime; pass
//! the struct explicitly into the consensus functions.

use corvus_chain_types::ArithU256;
use serde::Deserialize;
use thiserror::Error;

/// Static consensus parameters for one network.
#[derive(Debug, Clone)]
pub struct ConsensusParams {
    /// Highest (easiest) legal target for legacy double-SHA256 PoW.
    pub pow_limit: ArithU256,
    /// Highest (easiest) legal target for Cuckoo Cycle PoW.
    pub cuckoo_pow_limit: ArithU256,
    /// Length of one retargeting window in seconds.
    pub pow_target_timespan: i64,
    /// Target spacing between blocks in seconds.
    pub pow_target_spacing: i64,
    /// Testnet rule: allow minimum-difficulty blocks after a long gap.
    pub pow_allow_min_difficulty_blocks: bool,
    /// Regtest rule: never retarget.
    pub pow_no_retargeting: bool,
    /// Height at which Cuckoo Cycle PoW replaces double-SHA256.
    pub cuckoo_hardfork_height: u32,
    /// Cuckoo graph size parameter; the graph has 2^(size - 1) edges per
    /// partition.
    pub cuckoo_graph_size: u32,
}

impl ConsensusParams {
    /// Blocks per ordinary difficulty adjustment.
    pub fn difficulty_adjustment_interval(&self) -> u32 {
        (self.pow_target_timespan / self.pow_target_spacing) as u32
    }

    /// Edge-bits parameter handed to the cuckoo verifier.
    pub fn edge_bits(&self) -> u32 {
        self.cuckoo_graph_size - 1
    }

    /// Mainnet parameters.
    pub fn mainnet() -> Self {
        Self {
            pow_limit: ArithU256::from_be_hex(
                "00000000ffff0000000000000000000000000000000000000000000000000000",
            ),
            cuckoo_pow_limit: ArithU256::from_be_hex(
                "000fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            ),
            pow_target_timespan: 14 * 24 * 60 * 60, // two weeks
            pow_target_spacing: 10 * 60,
            pow_allow_min_difficulty_blocks: false,
            pow_no_retargeting: false,
            cuckoo_hardfork_height: 514_080, // 255 retarget windows
            cuckoo_graph_size: 29,
        }
    }

    /// Testnet parameters.
    pub fn testnet() -> Self {
        Self {
            pow_limit: ArithU256::from_be_hex(
                "00000000ffff0000000000000000000000000000000000000000000000000000",
            ),
            cuckoo_pow_limit: ArithU256::from_be_hex(
                "000fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            ),
            pow_target_timespan: 14 * 24 * 60 * 60,
            pow_target_spacing: 10 * 60,
            pow_allow_min_difficulty_blocks: true,
            pow_no_retargeting: false,
            cuckoo_hardfork_height: 141_120,
            cuckoo_graph_size: 29,
        }
    }

    /// Regtest parameters: trivial PoW, no retargeting, a tiny cuckoo graph
    /// so proofs can be mined instantly in tests.
    pub fn regtest() -> Self {
        Self {
            pow_limit: ArithU256::from_be_hex(
                "7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            ),
            cuckoo_pow_limit: ArithU256::from_be_hex(
                "7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            ),
            pow_target_timespan: 14 * 24 * 60 * 60,
            pow_target_spacing: 10 * 60,
            pow_allow_min_difficulty_blocks: true,
            pow_no_retargeting: true,
            cuckoo_hardfork_height: 150,
            cuckoo_graph_size: 13,
        }
    }

    /// Build parameters from a configuration file.
    ///
    /// Returns an error naming the specific field that is missing or
    /// invalid.
    pub fn from_config(config: &ConsensusParamsConfig) -> Result<Self, ConsensusParamsError> {
        let pow_limit = parse_limit("pow_limit", config.pow_limit.as_deref())?;
        let cuckoo_pow_limit =
            parse_limit("cuckoo_pow_limit", config.cuckoo_pow_limit.as_deref())?;

        let pow_target_timespan = require("pow_target_timespan", config.pow_target_timespan)?;
        let pow_target_spacing = require("pow_target_spacing", config.pow_target_spacing)?;
        if pow_target_spacing <= 0 {
            return Err(ConsensusParamsError {
                field: "pow_target_spacing",
                message: "must be positive".to_string(),
            });
        }
        if pow_target_timespan <= 0 || pow_target_timespan % pow_target_spacing != 0 {
            return Err(ConsensusParamsError {
                field: "pow_target_timespan",
                message: "must be a positive multiple of pow_target_spacing".to_string(),
            });
        }

        let cuckoo_graph_size = require("cuckoo_graph_size", config.cuckoo_graph_size)?;
        // edge nonces are u32 and a proof needs 42 distinct ascending values
        if !(7..=32).contains(&cuckoo_graph_size) {
            return Err(ConsensusParamsError {
                field: "cuckoo_graph_size",
                message: format!("{} is outside the supported range 7..=32", cuckoo_graph_size),
            });
        }

        Ok(Self {
            pow_limit,
            cuckoo_pow_limit,
            pow_target_timespan,
            pow_target_spacing,
            pow_allow_min_difficulty_blocks: config
                .pow_allow_min_difficulty_blocks
                .unwrap_or(false),
            pow_no_retargeting: config.pow_no_retargeting.unwrap_or(false),
            cuckoo_hardfork_height: require(
                "cuckoo_hardfork_height",
                config.cuckoo_hardfork_height,
            )?,
            cuckoo_graph_size,
        })
    }
}

/// Configuration for loading [`ConsensusParams`] from TOML/JSON.
///
/// All fields are optional so partial configs fail validation with a clear
/// per-field error instead of a deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsensusParamsConfig {
    /// Legacy PoW limit as big-endian hex.
    pub pow_limit: Option<String>,
    /// Cuckoo PoW limit as big-endian hex.
    pub cuckoo_pow_limit: Option<String>,
    /// Retargeting window in seconds.
    pub pow_target_timespan: Option<i64>,
    /// Target block spacing in seconds.
    pub pow_target_spacing: Option<i64>,
    /// Allow minimum-difficulty blocks (testnet).
    pub pow_allow_min_difficulty_blocks: Option<bool>,
    /// Disable retargeting entirely (regtest).
    pub pow_no_retargeting: Option<bool>,
    /// Cuckoo hard-fork activation height.
    pub cuckoo_hardfork_height: Option<u32>,
    /// Cuckoo graph size parameter.
    pub cuckoo_graph_size: Option<u32>,
}

/// Error when constructing [`ConsensusParams`] from configuration.
#[derive(Debug, Clone, Error)]
#[error("consensus params error for '{field}': {message}")]
pub struct ConsensusParamsError {
    /// The field that is missing or invalid.
    pub field: &'static str,
    /// Description of the error.
    pub message: String,
}

fn require<T>(field: &'static str, value: Option<T>) -> Result<T, ConsensusParamsError> {
    value.ok_or_else(|| ConsensusParamsError {
        field,
        message: "required field missing".to_string(),
    })
}

fn parse_limit(
    field: &'static str,
    hex: Option<&str>,
) -> Result<ArithU256, ConsensusParamsError> {
    let hex = hex.ok_or_else(|| ConsensusParamsError {
        field,
        message: "required field missing".to_string(),
    })?;
    let limit = ArithU256::parse_be_hex(hex).ok_or_else(|| ConsensusParamsError {
        field,
        message: format!("invalid hex string: '{}'", hex),
    })?;
    if limit.is_zero() {
        return Err(ConsensusParamsError {
            field,
            message: "limit cannot be zero".to_string(),
        });
    }
    Ok(limit)
}
