//! Chain index entries.
//!
//! The consensus core never sees the block store; it sees immutable index
//! entries linked back toward genesis. The retargeter only ever walks a few
//! blocks back (6 for the emergency rule, one retarget window at most), so
//! ancestor lookup is a plain linear walk rather than a skip list.

use std::sync::Arc;

/// Number of timestamps the median-time-past window covers.
pub const MEDIAN_TIME_SPAN: usize = 11;

/// An immutable chain index entry.
#[derive(Debug, Clone)]
pub struct BlockIndex {
    /// Height of this block in the chain (genesis is 0).
    pub height: u32,
    /// Block timestamp (seconds since the epoch).
    pub time: u32,
    /// Compact difficulty target this block was mined against.
    pub bits: u32,
    /// The previous entry, absent only at genesis.
    pub prev: Option<Arc<BlockIndex>>,
}

impl BlockIndex {
    /// Create an entry linked to its parent.
    pub fn new(height: u32, time: u32, bits: u32, prev: Option<Arc<BlockIndex>>) -> Self {
        Self {
            height,
            time,
            bits,
            prev,
        }
    }

    /// Block timestamp widened for time arithmetic.
    pub fn block_time(&self) -> i64 {
        i64::from(self.time)
    }

    /// The ancestor at an absolute height, or `None` when `height` is above
    /// this entry or the chain is shorter than expected.
    pub fn get_ancestor(&self, height: u32) -> Option<&BlockIndex> {
        if height > self.height {
            return None;
        }
        let mut walk = self;
        while walk.height > height {
            walk = walk.prev.as_deref()?;
        }
        Some(walk)
    }

    /// Median timestamp of the last [`MEDIAN_TIME_SPAN`] entries ending at
    /// this one (fewer near genesis).
    pub fn median_time_past(&self) -> i64 {
        let mut times = Vec::with_capacity(MEDIAN_TIME_SPAN);
        let mut walk = Some(self);
        while let Some(entry) = walk {
            if times.len() == MEDIAN_TIME_SPAN {
                break;
            }
            times.push(entry.block_time());
            walk = entry.prev.as_deref();
        }
        times.sort_unstable();
        times[times.len() / 2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a chain from (time, bits) pairs, genesis first; returns the tip.
    fn build_chain(entries: &[(u32, u32)]) -> Arc<BlockIndex> {
        let mut prev: Option<Arc<BlockIndex>> = None;
        for (height, &(time, bits)) in entries.iter().enumerate() {
            prev = Some(Arc::new(BlockIndex::new(
                height as u32,
                time,
                bits,
                prev.take(),
            )));
        }
        prev.expect("at least one entry")
    }

    #[test]
    fn test_get_ancestor() {
        let tip = build_chain(&[(0, 1), (600, 1), (1200, 1), (1800, 1)]);
        assert_eq!(tip.height, 3);
        assert_eq!(tip.get_ancestor(3).unwrap().time, 1800);
        assert_eq!(tip.get_ancestor(1).unwrap().time, 600);
        assert_eq!(tip.get_ancestor(0).unwrap().time, 0);
        assert!(tip.get_ancestor(4).is_none());
    }

    #[test]
    fn test_median_time_past_short_chain() {
        // three entries: median of {100, 200, 900} is 200
        let tip = build_chain(&[(100, 1), (200, 1), (900, 1)]);
        assert_eq!(tip.median_time_past(), 200);

        // a single entry is its own median
        let genesis = build_chain(&[(42, 1)]);
        assert_eq!(genesis.median_time_past(), 42);
    }

    #[test]
    fn test_median_time_past_window() {
        // 15 blocks at 600s spacing; only the last 11 are in the window,
        // so the median is the 6th-from-last timestamp
        let entries: Vec<(u32, u32)> = (0..15).map(|i| (i * 600, 1)).collect();
        let tip = build_chain(&entries);
        assert_eq!(tip.median_time_past(), i64::from(9 * 600));
    }

    #[test]
    fn test_median_time_past_unsorted_times() {
        // out-of-order timestamps still produce the median of the window
        let tip = build_chain(&[(500, 1), (100, 1), (900, 1), (300, 1), (700, 1)]);
        assert_eq!(tip.median_time_past(), 500);
    }
}
