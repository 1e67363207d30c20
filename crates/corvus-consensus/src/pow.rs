//! Proof-of-work checks and difficulty retargeting.
//!
//! Two consensus-critical entry points live here:
//!
//! - [`check_proof_of_work`]: is this header's claimed difficulty in range
//!   and satisfied by its hash (and, post-fork, its cuckoo proof)?
//! - [`next_work_required`]: what compact target must the next block carry,
//!   given the chain tail?
//!
//! The retarget arithmetic order (multiply before divide), the 4x clamp,
//! the min-difficulty lookback and the emergency-retarget inequality are
//! all load-bearing; changing any of them forks the chain.

use corvus_chain_types::{ArithU256, BlockHeader, BlockIndex};
use tracing::debug;

use crate::chain_params::ConsensusParams;
use crate::cuckoo;
use crate::error::{ConsensusError, ConsensusResult};

/// Lookback of the emergency retarget rule, in blocks.
const EMERGENCY_RETARGET_BLOCKS: u32 = 6;

/// The emergency rule fires when the lookback window spans more than
/// `spacing * 6` per block, i.e. blocks averaging six times slower than
/// target.
const EMERGENCY_RETARGET_SLOWDOWN: i64 = 6;

/// Check a header's proof of work.
///
/// Decodes and range-checks the claimed target (against the cuckoo limit
/// for post-fork headers), verifies the cuckoo proof when the header
/// carries one, and finally compares the whole-header hash against the
/// target. All failures collapse to `false`; callers that need the reason
/// can invoke the cuckoo verifier directly.
pub fn check_proof_of_work(header: &BlockHeader, params: &ConsensusParams) -> bool {
    let (target, negative, overflow) = ArithU256::from_compact(header.bits);

    let active_limit = if header.is_cuckoo_pow() {
        &params.cuckoo_pow_limit
    } else {
        &params.pow_limit
    };
    if negative || overflow || target.is_zero() || target > *active_limit {
        debug!(bits = format!("{:#010x}", header.bits), "target out of range");
        return false;
    }

    if header.is_cuckoo_pow() && !check_cuckoo_proof_of_work(header, params) {
        return false;
    }

    ArithU256::from_le_bytes(&header.header_hash()) <= target
}

/// Verify the Cuckoo Cycle proof carried by a header.
///
/// The verifier is keyed by a single SHA-256 of the 80-byte header prefix;
/// the proof words themselves are not part of the key.
pub fn check_cuckoo_proof_of_work(header: &BlockHeader, params: &ConsensusParams) -> bool {
    let key = header.cuckoo_pow_key();
    match cuckoo::verify(&header.cuckoo_proof, &key, params.edge_bits()) {
        Ok(()) => true,
        Err(reason) => {
            debug!(%reason, key = hex::encode(key), "cuckoo proof rejected");
            false
        }
    }
}

/// Compute the compact target required of the block following `tip`.
///
/// `next_header_time` is the timestamp of the proposed block; it only
/// matters for the testnet minimum-difficulty rule.
///
/// # Panics
/// Panics if the chain index is missing an ancestor the rules require
/// (shorter than one retarget window at a boundary, or shorter than the
/// emergency lookback past the fork). Those are caller bugs: the index
/// must supply the chain tail it claims to have.
pub fn next_work_required(
    tip: &BlockIndex,
    next_header_time: i64,
    params: &ConsensusParams,
) -> u32 {
    let next_height = tip.height + 1;
    let interval = params.difficulty_adjustment_interval();
    let active_limit = if next_height >= params.cuckoo_hardfork_height {
        &params.cuckoo_pow_limit
    } else {
        &params.pow_limit
    };
    let limit_bits = active_limit.to_compact();

    // only change once per difficulty adjustment interval
    if next_height % interval != 0 {
        if params.pow_allow_min_difficulty_blocks {
            // testnet: a block arriving more than twice the target spacing
            // after the tip may claim the minimum difficulty
            if next_header_time > tip.block_time() + 2 * params.pow_target_spacing {
                return limit_bits;
            }
            // otherwise reach back past the min-difficulty blocks to the
            // last real difficulty
            let mut walk = tip;
            while let Some(prev) = walk.prev.as_deref() {
                if walk.height % interval == 0 || walk.bits != limit_bits {
                    break;
                }
                walk = prev;
            }
            return walk.bits;
        }

        if next_height > params.cuckoo_hardfork_height && tip.bits != limit_bits {
            if let Some(bits) = emergency_retarget(tip, next_height, params) {
                return bits;
            }
        }
        return tip.bits;
    }

    if next_height == params.cuckoo_hardfork_height {
        // fork boundary: reset to the easiest legal target so the new
        // algorithm can find its steady state
        return limit_bits;
    }

    let first_height = tip.height - (interval - 1);
    let first = tip
        .get_ancestor(first_height)
        .expect("chain index is missing the retarget window start");
    calculate_next_work_required(tip, first.block_time(), params)
}

/// One-block emergency relaxation after the fork: when seven consecutive
/// blocks share a target and their median-time-past span exceeds 36 target
/// spacings, ease halfway toward the last easier historical target.
fn emergency_retarget(
    tip: &BlockIndex,
    next_height: u32,
    params: &ConsensusParams,
) -> Option<u32> {
    let anc = tip
        .get_ancestor(next_height - 1 - EMERGENCY_RETARGET_BLOCKS)
        .expect("chain index is missing the emergency retarget lookback");

    let time_past = tip.median_time_past() - anc.median_time_past();
    let retarget_limit = params.pow_target_spacing
        * EMERGENCY_RETARGET_SLOWDOWN
        * i64::from(EMERGENCY_RETARGET_BLOCKS);
    if anc.bits != tip.bits || time_past <= retarget_limit {
        return None;
    }

    let (current, _, _) = ArithU256::from_compact(tip.bits);
    let mut walk = Some(anc);
    let easier = loop {
        let entry = walk.expect("no easier target below the emergency retarget point");
        let (decoded, _, _) = ArithU256::from_compact(entry.bits);
        if decoded > current {
            break decoded;
        }
        walk = entry.prev.as_deref();
    };

    let eased = &(&current + &easier) / 2;
    let bits = eased.to_compact();
    debug!(
        height = next_height,
        span = time_past,
        bits = format!("{:#010x}", bits),
        "emergency retarget"
    );
    Some(bits)
}

/// Ordinary retarget at an interval boundary.
///
/// Scales the tip's target by the ratio of actual to intended window
/// length, clamped to a factor of four either way, and caps the result at
/// the active limit. The multiply happens before the divide to keep the
/// fixed-point step exact.
pub fn calculate_next_work_required(
    tip: &BlockIndex,
    first_block_time: i64,
    params: &ConsensusParams,
) -> u32 {
    if params.pow_no_retargeting {
        return tip.bits;
    }

    let actual_timespan = (tip.block_time() - first_block_time).clamp(
        params.pow_target_timespan / 4,
        params.pow_target_timespan * 4,
    );

    let next_height = tip.height + 1;
    let pow_limit = if next_height >= params.cuckoo_hardfork_height {
        &params.cuckoo_pow_limit
    } else {
        &params.pow_limit
    };

    let (decoded, _, _) = ArithU256::from_compact(tip.bits);
    let scaled = &decoded * actual_timespan as u64;
    let mut new_target = &scaled / params.pow_target_timespan as u64;
    if new_target > *pow_limit {
        new_target = pow_limit.clone();
    }

    let bits = new_target.to_compact();
    debug!(
        height = next_height,
        actual_timespan,
        bits = format!("{:#010x}", bits),
        "difficulty retarget"
    );
    bits
}

/// Contextual header PoW validation for the block following `tip`.
///
/// Enforces that the cuckoo version flag matches the fork schedule, that
/// the claimed compact target is exactly the required one, and that the
/// proof of work itself checks out.
pub fn contextual_check_header(
    header: &BlockHeader,
    tip: &BlockIndex,
    params: &ConsensusParams,
) -> ConsensusResult<()> {
    let next_height = tip.height + 1;

    let cuckoo_active = next_height >= params.cuckoo_hardfork_height;
    if header.is_cuckoo_pow() != cuckoo_active {
        return Err(ConsensusError::InvalidHeader(format!(
            "cuckoo version flag mismatch at height {}: header says {}, fork schedule says {}",
            next_height,
            header.is_cuckoo_pow(),
            cuckoo_active
        )));
    }

    let required = next_work_required(tip, i64::from(header.time), params);
    if header.bits != required {
        return Err(ConsensusError::InvalidDifficulty {
            got: format!("{:#010x}", header.bits),
            expected: format!("{:#010x}", required),
        });
    }

    if !check_proof_of_work(header, params) {
        return Err(ConsensusError::InvalidPow(
            "header hash or cuckoo proof does not satisfy the claimed target".to_string(),
        ));
    }

    Ok(())
}
