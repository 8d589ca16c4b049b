use alloc::vec::Vec;
use core::ops::Range;

use bitmaps::Bitmap;

const CHUNK: usize = 64;

/// Per-address-unit "has been observed" flags.
///
/// Flags only ever go from unobserved to observed.
pub(crate) struct ObservedMask {
    chunks: Vec<Bitmap<CHUNK>>,
    len: usize,
}

impl ObservedMask {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            chunks: (0..len.div_ceil(CHUNK)).map(|_| Bitmap::new()).collect(),
            len,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_observed(&self, unit: usize) -> bool {
        unit < self.len && self.chunks[unit / CHUNK].get(unit % CHUNK)
    }

    /// Marks `units` observed. The range must lie within the mask.
    pub(crate) fn mark(&mut self, units: Range<usize>) {
        debug_assert!(units.end <= self.len, "mark past end of mask");
        for unit in units {
            self.chunks[unit / CHUNK].set(unit % CHUNK, true);
        }
    }

    /// Returns the first unit in `units` that has not been observed.
    pub(crate) fn first_unobserved(&self, units: Range<usize>) -> Option<usize> {
        let mut unit = units.start;
        while unit < units.end {
            if unit >= self.len {
                return Some(unit);
            }
            let chunk = &self.chunks[unit / CHUNK];
            if unit % CHUNK == 0 && chunk.is_full() {
                unit += CHUNK;
                continue;
            }
            if !chunk.get(unit % CHUNK) {
                return Some(unit);
            }
            unit += 1;
        }
        None
    }

    /// Number of observed units.
    pub(crate) fn count(&self) -> usize {
        self.chunks.iter().map(|c| c.len()).sum()
    }
}
