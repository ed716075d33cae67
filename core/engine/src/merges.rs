//! FILENAME: core/engine/src/merges.rs
//! PURPOSE: The set of merged regions of one sheet and its repair rules.
//! CONTEXT: Merges never overlap and never cover a single cell, so every
//! merge has a unique top-left anchor. The anchor map gives ordered iteration
//! and exact-match removal; an R-tree over the merge rectangles answers point
//! and region queries without walking the whole set.
//!
//! Structural edits (row/column insert and remove) are applied through
//! `insert_at` / `remove_at`. Both return a `MergeEdit` holding the exact
//! regions before and after the change, so that undo can put the previous
//! regions back verbatim instead of running the shift arithmetic in reverse.

use std::collections::BTreeMap;
use std::fmt;

use rstar::{RTree, RTreeObject, AABB};

use crate::coord::{Axis, CellCoord, UNBOUNDED};
use crate::error::{Result, SheetError};
use crate::region::Region;
use crate::sheet_math::shift;

/// The exact effect of one change on the merge set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeEdit {
    /// Regions that were taken out, in their previous shape.
    pub removed: Vec<Region>,
    /// Regions that were put in, in their new shape.
    pub added: Vec<Region>,
    /// The subset of `removed` that has no successor in `added`
    /// (auto-unmerged, or replaced by a larger merge).
    pub dropped: Vec<Region>,
}

impl MergeEdit {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }

    fn replace(&mut self, before: Region, after: Region) {
        self.removed.push(before);
        self.added.push(after);
    }

    fn drop_merge(&mut self, before: Region) {
        self.removed.push(before);
        self.dropped.push(before);
    }
}

/// A merge as stored in the spatial index.
#[derive(Clone)]
struct IndexedMerge {
    region: Region,
    envelope: AABB<[i64; 2]>,
}

impl IndexedMerge {
    fn new(region: Region) -> Self {
        IndexedMerge {
            region,
            envelope: envelope_of(&region),
        }
    }
}

impl PartialEq for IndexedMerge {
    fn eq(&self, other: &Self) -> bool {
        self.region == other.region
    }
}

impl RTreeObject for IndexedMerge {
    type Envelope = AABB<[i64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

fn envelope_of(region: &Region) -> AABB<[i64; 2]> {
    AABB::from_corners(
        [region.top() as i64, region.left() as i64],
        [region.bottom() as i64, region.right() as i64],
    )
}

/// Everything at or past `start` along `axis`.
fn band_from(axis: Axis, start: u32) -> AABB<[i64; 2]> {
    let open = UNBOUNDED as i64;
    match axis {
        Axis::Row => AABB::from_corners([start as i64, 0], [open, open]),
        Axis::Column => AABB::from_corners([0, start as i64], [open, open]),
    }
}

pub struct MergeCollection {
    /// Merges keyed by their top-left cell.
    by_anchor: BTreeMap<CellCoord, Region>,
    /// The same merges, indexed by rectangle.
    index: RTree<IndexedMerge>,
}

impl Default for MergeCollection {
    fn default() -> Self {
        MergeCollection {
            by_anchor: BTreeMap::new(),
            index: RTree::new(),
        }
    }
}

impl fmt::Debug for MergeCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.by_anchor.values()).finish()
    }
}

impl MergeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a merge. Existing merges that lie entirely inside `region` are
    /// replaced by it. A partial overlap with any existing merge is rejected
    /// and leaves the collection unchanged.
    pub fn add(&mut self, region: Region) -> Result<MergeEdit> {
        if region.is_single_cell() {
            return Err(SheetError::SingleCellMerge(region));
        }

        let mut edit = MergeEdit::default();
        for existing in self.intersecting(&region) {
            if !region.contains_region(&existing) {
                return Err(SheetError::OverlappingMerge { region, existing });
            }
            edit.drop_merge(existing);
        }
        edit.added.push(region);

        self.apply(&edit);
        Ok(edit)
    }

    /// Removes the merge covering (row, col), returning it.
    pub fn remove(&mut self, row: u32, col: u32) -> Option<Region> {
        let merge = self.get(row, col)?;
        self.remove_region(&merge);
        Some(merge)
    }

    /// Removes the merge exactly matching `region`.
    pub fn remove_region(&mut self, region: &Region) -> bool {
        if self.by_anchor.get(&region.top_left()) != Some(region) {
            return false;
        }
        self.by_anchor.remove(&region.top_left());
        self.index.remove(&IndexedMerge::new(*region));
        true
    }

    fn insert_merge(&mut self, region: Region) {
        if let Some(previous) = self.by_anchor.insert(region.top_left(), region) {
            self.index.remove(&IndexedMerge::new(previous));
        }
        self.index.insert(IndexedMerge::new(region));
    }

    /// The merge containing (row, col), if any.
    pub fn get(&self, row: u32, col: u32) -> Option<Region> {
        let point = AABB::from_point([row as i64, col as i64]);
        self.index
            .locate_in_envelope_intersecting(&point)
            .next()
            .map(|merge| merge.region)
    }

    pub fn is_inside_merge(&self, row: u32, col: u32) -> bool {
        self.get(row, col).is_some()
    }

    pub fn any(&self) -> bool {
        !self.by_anchor.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_anchor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_anchor.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_anchor.clear();
        self.index = RTree::new();
    }

    /// Merges in anchor order (by row, then column).
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.by_anchor.values()
    }

    pub fn regions(&self) -> Vec<Region> {
        self.by_anchor.values().copied().collect()
    }

    /// Merges overlapping `region`, in anchor order.
    pub fn intersecting(&self, region: &Region) -> Vec<Region> {
        self.located(&envelope_of(region))
    }

    fn located(&self, envelope: &AABB<[i64; 2]>) -> Vec<Region> {
        let mut found: Vec<Region> = self
            .index
            .locate_in_envelope_intersecting(envelope)
            .map(|merge| merge.region)
            .collect();
        found.sort_by_key(|merge| merge.top_left());
        found
    }

    /// Repairs merges after `count` rows/columns were inserted at `index`
    /// along `axis`:
    /// - inserting at or before a merge's first unit moves it;
    /// - inserting after its first unit and up to one past its last unit
    ///   grows it;
    /// - inserting further along leaves it alone.
    ///
    /// A merge that is unbounded along `axis` is never touched.
    pub fn insert_at(&mut self, axis: Axis, index: u32, count: u32) -> MergeEdit {
        let mut edit = MergeEdit::default();
        if count == 0 {
            return edit;
        }
        let delta = count as i64;

        for merge in self.located(&band_from(axis, index.saturating_sub(1))) {
            if merge.is_unbounded(axis) {
                continue;
            }
            let (start, end) = merge.span(axis);
            if index <= start {
                edit.replace(merge, merge.with_span(axis, shift(start, delta), shift(end, delta)));
            } else if index <= end.saturating_add(1) {
                edit.replace(merge, merge.with_span(axis, start, shift(end, delta)));
            }
        }

        log::trace!(
            "merge repair: insert {} {} at {} -> {} changed",
            count,
            axis,
            index,
            edit.added.len()
        );
        self.apply(&edit);
        edit
    }

    /// Repairs merges after the band `index..index + count` was removed along
    /// `axis`. Merges past the band move back, merges straddling it shrink,
    /// and merges that lie entirely inside it are deleted. A bounded merge
    /// that shrinks down to a single cell is deleted as well.
    pub fn remove_at(&mut self, axis: Axis, index: u32, count: u32) -> MergeEdit {
        let mut edit = MergeEdit::default();
        if count == 0 {
            return edit;
        }
        let band_end = index.saturating_add(count - 1);
        let delta = -(count as i64);

        for merge in self.located(&band_from(axis, index)) {
            if merge.is_unbounded(axis) {
                continue;
            }
            let (start, end) = merge.span(axis);
            if end < index {
                continue;
            }
            if start > band_end {
                edit.replace(merge, merge.with_span(axis, shift(start, delta), shift(end, delta)));
                continue;
            }
            if start >= index && end <= band_end {
                edit.drop_merge(merge);
                continue;
            }

            let new_start = start.min(index);
            let new_end = if end > band_end { end - count } else { index - 1 };
            let shrunk = merge.with_span(axis, new_start, new_end);
            if shrunk.is_single_cell() {
                edit.drop_merge(merge);
            } else {
                edit.replace(merge, shrunk);
            }
        }

        log::trace!(
            "merge repair: remove {} {} at {} -> {} changed, {} dropped",
            count,
            axis,
            index,
            edit.added.len(),
            edit.dropped.len()
        );
        self.apply(&edit);
        edit
    }

    /// Undoes `edit`: takes out what it added and restores what it removed,
    /// exactly as they were.
    pub fn revert(&mut self, edit: &MergeEdit) {
        for region in &edit.added {
            self.remove_region(region);
        }
        for region in &edit.removed {
            self.insert_merge(*region);
        }
    }

    /// Re-applies `edit` after a `revert`.
    pub fn apply(&mut self, edit: &MergeEdit) {
        for region in &edit.removed {
            self.remove_region(region);
        }
        for region in &edit.added {
            self.insert_merge(*region);
        }
    }
}
