//! FILENAME: core/engine/src/sheet_math.rs
//! PURPOSE: Small arithmetic helpers for confining and translating regions.
//! CONTEXT: Used by `Region::extend_to` (clamping a dragged corner to a
//! limit), by merge repair (shifting bounds without disturbing the
//! `UNBOUNDED` sentinel) and by the sheet when a span region has to be
//! materialised inside the sheet's actual dimensions.

use crate::coord::UNBOUNDED;
use crate::region::{Region, RegionKind};

/// Projects `value` into `[start, end]`. The bounds may be given in any order.
pub fn clamp(start: u32, end: u32, value: u32) -> u32 {
    let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
    value.max(lo).min(hi)
}

/// Moves `value` by `delta`, saturating at 0 and just below `UNBOUNDED`.
/// The sentinel itself is never moved.
pub fn shift(value: u32, delta: i64) -> u32 {
    if value == UNBOUNDED {
        return value;
    }
    let moved = (value as i64 + delta).clamp(0, UNBOUNDED as i64 - 1);
    moved as u32
}

/// Clamps every bound of `region` into `limit`.
///
/// Unlike `Region::intersection` this always yields a region: a region lying
/// outside the limit collapses onto the nearest edge. The result keeps the
/// span kind only if its open edge survives the clamp.
pub fn confine(region: &Region, limit: &Region) -> Region {
    let top = clamp(limit.top(), limit.bottom(), region.top());
    let bottom = clamp(limit.top(), limit.bottom(), region.bottom());
    let left = clamp(limit.left(), limit.right(), region.left());
    let right = clamp(limit.left(), limit.right(), region.right());

    match region.kind() {
        RegionKind::Rows if left == 0 && right == UNBOUNDED => Region::rows(top, bottom),
        RegionKind::Columns if top == 0 && bottom == UNBOUNDED => Region::columns(left, right),
        _ => Region::new(top, bottom, left, right),
    }
}
