/// Render queue index ranges: bands of renderable sort order drawn by scene passes.

use rdst::{RadixKey, RadixSort};
use slotmap::new_key_type;

new_key_type! {
    /// Stable key of a renderable manager registered with a culling manager.
    ///
    /// A renderable manager groups renderables sharing one render queue index.
    pub struct RenderableManagerKey;
}

/// Inclusive band `[minimum, maximum]` of render queue indices
///
/// `renderable_managers` is transient: filled by culling for one frame and
/// cleared at the start of the next `execute`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderQueueIndexRange {
    pub minimum_render_queue_index: u8,
    pub maximum_render_queue_index: u8,
    pub renderable_managers: Vec<RenderableManagerKey>,
}

impl RenderQueueIndexRange {
    pub fn new(minimum_render_queue_index: u8, maximum_render_queue_index: u8) -> Self {
        Self {
            minimum_render_queue_index,
            maximum_render_queue_index,
            renderable_managers: Vec::new(),
        }
    }

    /// Whether `render_queue_index` falls inside this band
    pub fn contains(&self, render_queue_index: u8) -> bool {
        (self.minimum_render_queue_index..=self.maximum_render_queue_index).contains(&render_queue_index)
    }
}

/// Sort key: minimum first, then maximum
#[derive(Clone, Copy)]
struct RangeSortKey {
    minimum: u8,
    maximum: u8,
}

impl RadixKey for RangeSortKey {
    const LEVELS: usize = 2;

    fn get_level(&self, level: usize) -> u8 {
        // Level 0 is the least significant byte
        match level {
            0 => self.maximum,
            _ => self.minimum,
        }
    }
}

/// Merge inclusive `(minimum, maximum)` ranges into sorted, non-overlapping bands
///
/// Overlapping and adjacent ranges are fused: `{0,5} {3,8} {10,12}` gives
/// `{0,8} {10,12}`, and `{0,5} {6,7}` gives `{0,7}`.
pub fn merge_render_queue_index_ranges(ranges: &[(u8, u8)]) -> Vec<RenderQueueIndexRange> {
    let mut keys: Vec<RangeSortKey> = ranges.iter()
        .map(|&(minimum, maximum)| RangeSortKey {
            minimum: minimum.min(maximum),
            maximum: minimum.max(maximum),
        })
        .collect();
    keys.radix_sort_unstable();

    let mut merged: Vec<RenderQueueIndexRange> = Vec::with_capacity(keys.len());
    for key in keys {
        match merged.last_mut() {
            Some(last) if key.minimum as u16 <= last.maximum_render_queue_index as u16 + 1 => {
                last.maximum_render_queue_index = last.maximum_render_queue_index.max(key.maximum);
            }
            _ => merged.push(RenderQueueIndexRange::new(key.minimum, key.maximum)),
        }
    }
    merged
}

#[cfg(test)]
#[path = "render_queue_tests.rs"]
mod tests;
