//! FILENAME: core/engine/src/region.rs
//! PURPOSE: Rectangular cell regions, including whole-row and whole-column spans.
//! CONTEXT: A `Region` is an inclusive [top, bottom] x [left, right] interval.
//! Whole-row and whole-column regions are the same struct tagged with a
//! different `RegionKind`; their open edge is the `UNBOUNDED` sentinel so that
//! containment and intersection need no special cases. Only `extend_to` and
//! the span helpers used by merge repair branch on the kind.
//!
//! Bounds are always normalised (top <= bottom, left <= right). The region
//! also remembers which corner it was anchored at, so that repeatedly
//! extending it behaves like dragging a selection from a fixed cell.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::coord::{coord_to_a1, col_to_index, index_to_col, parse_a1, Axis, CellCoord, UNBOUNDED};
use crate::error::SheetError;
use crate::sheet_math::clamp;

/// The closed set of region shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionKind {
    /// A bounded rectangle of cells.
    Cells,
    /// Entire rows: the column range is always [0, UNBOUNDED].
    Rows,
    /// Entire columns: the row range is always [0, UNBOUNDED].
    Columns,
}

/// Which normalised bound holds the fixed corner on each axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Anchor {
    at_bottom: bool,
    at_right: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "RegionRepr")]
pub struct Region {
    kind: RegionKind,
    top: u32,
    bottom: u32,
    left: u32,
    right: u32,
    #[serde(skip)]
    anchor: Anchor,
}

impl Region {
    /// Creates a bounded region from two row and two column bounds given in
    /// any order. The (r0, c0) corner becomes the anchor.
    pub fn new(r0: u32, r1: u32, c0: u32, c1: u32) -> Self {
        Region {
            kind: RegionKind::Cells,
            top: r0.min(r1),
            bottom: r0.max(r1),
            left: c0.min(c1),
            right: c0.max(c1),
            anchor: Anchor {
                at_bottom: r0 > r1,
                at_right: c0 > c1,
            },
        }
    }

    pub fn cell(row: u32, col: u32) -> Self {
        Region::new(row, row, col, col)
    }

    pub fn from_corners(start: CellCoord, end: CellCoord) -> Self {
        Region::new(start.0, end.0, start.1, end.1)
    }

    /// Entire rows `r0..=r1`.
    pub fn rows(r0: u32, r1: u32) -> Self {
        Region {
            kind: RegionKind::Rows,
            top: r0.min(r1),
            bottom: r0.max(r1),
            left: 0,
            right: UNBOUNDED,
            anchor: Anchor {
                at_bottom: r0 > r1,
                at_right: false,
            },
        }
    }

    pub fn row(row: u32) -> Self {
        Region::rows(row, row)
    }

    /// Entire columns `c0..=c1`.
    pub fn columns(c0: u32, c1: u32) -> Self {
        Region {
            kind: RegionKind::Columns,
            top: 0,
            bottom: UNBOUNDED,
            left: c0.min(c1),
            right: c0.max(c1),
            anchor: Anchor {
                at_bottom: false,
                at_right: c0 > c1,
            },
        }
    }

    pub fn column(col: u32) -> Self {
        Region::columns(col, col)
    }

    /// Parses "B2", "B2:C3", "3:4" (whole rows) or "C:D" (whole columns).
    pub fn from_a1(text: &str) -> Option<Region> {
        let (start, end) = match text.split_once(':') {
            Some((start, end)) => (start.trim(), end.trim()),
            None => {
                let (row, col) = parse_a1(text.trim())?;
                return Some(Region::cell(row, col));
            }
        };

        if let (Ok(r0), Ok(r1)) = (start.parse::<u32>(), end.parse::<u32>()) {
            return Some(Region::rows(r0.checked_sub(1)?, r1.checked_sub(1)?));
        }
        if let (Some(c0), Some(c1)) = (col_to_index(start), col_to_index(end)) {
            return Some(Region::columns(c0, c1));
        }
        Some(Region::from_corners(parse_a1(start)?, parse_a1(end)?))
    }

    pub fn kind(&self) -> RegionKind {
        self.kind
    }

    pub fn top(&self) -> u32 {
        self.top
    }

    pub fn bottom(&self) -> u32 {
        self.bottom
    }

    pub fn left(&self) -> u32 {
        self.left
    }

    pub fn right(&self) -> u32 {
        self.right
    }

    pub fn top_left(&self) -> CellCoord {
        (self.top, self.left)
    }

    pub fn bottom_right(&self) -> CellCoord {
        (self.bottom, self.right)
    }

    /// The corner that stays fixed while extending.
    pub fn anchor(&self) -> CellCoord {
        let row = if self.anchor.at_bottom { self.bottom } else { self.top };
        let col = if self.anchor.at_right { self.right } else { self.left };
        (row, col)
    }

    /// Inclusive (start, end) bounds along `axis`.
    pub fn span(&self, axis: Axis) -> (u32, u32) {
        match axis {
            Axis::Row => (self.top, self.bottom),
            Axis::Column => (self.left, self.right),
        }
    }

    /// Whether the region has no end along `axis`.
    pub fn is_unbounded(&self, axis: Axis) -> bool {
        matches!(
            (self.kind, axis),
            (RegionKind::Rows, Axis::Column) | (RegionKind::Columns, Axis::Row)
        )
    }

    /// Number of rows/columns covered along `axis`, or None when unbounded.
    pub fn extent(&self, axis: Axis) -> Option<u32> {
        if self.is_unbounded(axis) {
            return None;
        }
        let (start, end) = self.span(axis);
        Some(end.saturating_sub(start).saturating_add(1))
    }

    pub fn height(&self) -> Option<u32> {
        self.extent(Axis::Row)
    }

    pub fn width(&self) -> Option<u32> {
        self.extent(Axis::Column)
    }

    pub fn is_single_cell(&self) -> bool {
        self.height() == Some(1) && self.width() == Some(1)
    }

    /// Returns a copy with new bounds along `axis`. The open axis of a span
    /// region is left untouched.
    pub(crate) fn with_span(&self, axis: Axis, start: u32, end: u32) -> Region {
        if self.is_unbounded(axis) {
            return *self;
        }
        let mut region = *self;
        match axis {
            Axis::Row => {
                region.top = start.min(end);
                region.bottom = start.max(end);
            }
            Axis::Column => {
                region.left = start.min(end);
                region.right = start.max(end);
            }
        }
        region
    }

    /// Moves the free corner to (row, col) while the anchor stays put, then
    /// re-normalises. With a `limit`, the moved corner is first clamped into
    /// the limit's bounds. Span regions only move along their bounded axis.
    pub fn extend_to(&mut self, row: u32, col: u32, limit: Option<&Region>) {
        let (row, col) = match limit {
            Some(limit) => (
                clamp(limit.top, limit.bottom, row),
                clamp(limit.left, limit.right, col),
            ),
            None => (row, col),
        };
        let (anchor_row, anchor_col) = self.anchor();

        match self.kind {
            RegionKind::Cells => {
                self.set_ordered(Axis::Row, anchor_row, row);
                self.set_ordered(Axis::Column, anchor_col, col);
            }
            RegionKind::Rows => self.set_ordered(Axis::Row, anchor_row, row),
            RegionKind::Columns => self.set_ordered(Axis::Column, anchor_col, col),
        }
    }

    fn set_ordered(&mut self, axis: Axis, fixed: u32, moved: u32) {
        let (start, end) = (fixed.min(moved), fixed.max(moved));
        match axis {
            Axis::Row => {
                self.top = start;
                self.bottom = end;
                self.anchor.at_bottom = fixed > moved;
            }
            Axis::Column => {
                self.left = start;
                self.right = end;
                self.anchor.at_right = fixed > moved;
            }
        }
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.top && row <= self.bottom && col >= self.left && col <= self.right
    }

    pub fn contains_region(&self, other: &Region) -> bool {
        other.top >= self.top
            && other.bottom <= self.bottom
            && other.left >= self.left
            && other.right <= self.right
    }

    pub fn intersects(&self, other: &Region) -> bool {
        !(other.bottom < self.top
            || other.top > self.bottom
            || other.right < self.left
            || other.left > self.right)
    }

    /// The overlapping part of two regions. Two row spans intersect to a row
    /// span and two column spans to a column span; any other pairing is a
    /// bounded rectangle.
    pub fn intersection(&self, other: &Region) -> Option<Region> {
        if !self.intersects(other) {
            return None;
        }
        let kind = match (self.kind, other.kind) {
            (RegionKind::Rows, RegionKind::Rows) => RegionKind::Rows,
            (RegionKind::Columns, RegionKind::Columns) => RegionKind::Columns,
            _ => RegionKind::Cells,
        };
        Some(Region {
            kind,
            top: self.top.max(other.top),
            bottom: self.bottom.min(other.bottom),
            left: self.left.max(other.left),
            right: self.right.min(other.right),
            anchor: Anchor::default(),
        })
    }
}

/// Serialised form of a `Region`. Deserialising goes back through the
/// constructors, so bounds are normalised and the open edge of a span is
/// always `UNBOUNDED` whatever the input says.
#[derive(Deserialize)]
struct RegionRepr {
    kind: RegionKind,
    #[serde(default)]
    top: Option<u32>,
    #[serde(default)]
    bottom: Option<u32>,
    #[serde(default)]
    left: Option<u32>,
    #[serde(default)]
    right: Option<u32>,
}

fn bound(value: Option<u32>, name: &str) -> Result<u32, SheetError> {
    match value {
        Some(UNBOUNDED) => Err(SheetError::InvalidRegion(format!("{} cannot be unbounded", name))),
        Some(value) => Ok(value),
        None => Err(SheetError::InvalidRegion(format!("missing {}", name))),
    }
}

impl TryFrom<RegionRepr> for Region {
    type Error = SheetError;

    fn try_from(repr: RegionRepr) -> Result<Self, Self::Error> {
        Ok(match repr.kind {
            RegionKind::Cells => Region::new(
                bound(repr.top, "top")?,
                bound(repr.bottom, "bottom")?,
                bound(repr.left, "left")?,
                bound(repr.right, "right")?,
            ),
            RegionKind::Rows => Region::rows(bound(repr.top, "top")?, bound(repr.bottom, "bottom")?),
            RegionKind::Columns => {
                Region::columns(bound(repr.left, "left")?, bound(repr.right, "right")?)
            }
        })
    }
}

/// Equality compares shape only; the anchor is editing state.
impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.top == other.top
            && self.bottom == other.bottom
            && self.left == other.left
            && self.right == other.right
    }
}

impl Eq for Region {}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            RegionKind::Rows => write!(f, "{}:{}", self.top as u64 + 1, self.bottom as u64 + 1),
            RegionKind::Columns => {
                write!(f, "{}:{}", index_to_col(self.left), index_to_col(self.right))
            }
            RegionKind::Cells if self.is_single_cell() => write!(f, "{}", coord_to_a1(self.top_left())),
            RegionKind::Cells => write!(
                f,
                "{}:{}",
                coord_to_a1(self.top_left()),
                coord_to_a1(self.bottom_right())
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_normalises_bounds() {
        let region = Region::new(5, 2, 4, 1);
        assert_eq!(region.top_left(), (2, 1));
        assert_eq!(region.bottom_right(), (5, 4));
        assert_eq!(region.anchor(), (5, 4));
        assert_eq!(region.height(), Some(4));
        assert_eq!(region.width(), Some(4));
    }

    #[test]
    fn test_span_regions_have_open_edge() {
        let rows = Region::rows(3, 1);
        assert_eq!(rows.kind(), RegionKind::Rows);
        assert_eq!((rows.top(), rows.bottom()), (1, 3));
        assert_eq!((rows.left(), rows.right()), (0, UNBOUNDED));
        assert_eq!(rows.width(), None);
        assert!(rows.is_unbounded(Axis::Column));
        assert!(!rows.is_unbounded(Axis::Row));

        let cols = Region::column(2);
        assert_eq!(cols.height(), None);
        assert_eq!(cols.width(), Some(1));
        assert!(cols.contains(1_000_000, 2));
        assert!(!cols.contains(0, 3));
    }

    #[test]
    fn test_copy_does_not_alias() {
        let original = Region::new(1, 2, 1, 2);
        let mut copy = original;
        copy.extend_to(6, 6, None);
        assert_eq!(original, Region::new(1, 2, 1, 2));
        assert_eq!(copy, Region::new(1, 6, 1, 6));

        let span = Region::row(4);
        let span_copy = span;
        assert_eq!(span_copy.kind(), RegionKind::Rows);
    }

    #[test]
    fn test_extend_to_moves_free_corner() {
        let mut region = Region::cell(3, 3);
        region.extend_to(5, 6, None);
        assert_eq!(region, Region::new(3, 5, 3, 6));

        // Dragging back past the anchor flips the bounds but keeps (3, 3) fixed.
        region.extend_to(1, 0, None);
        assert_eq!(region, Region::new(1, 3, 0, 3));
        assert_eq!(region.anchor(), (3, 3));

        region.extend_to(4, 4, None);
        assert_eq!(region, Region::new(3, 4, 3, 4));
    }

    #[test]
    fn test_extend_to_respects_limit() {
        let limit = Region::new(0, 9, 0, 4);
        let mut region = Region::cell(2, 2);
        region.extend_to(20, 20, Some(&limit));
        assert_eq!(region, Region::new(2, 9, 2, 4));
    }

    #[test]
    fn test_extend_span_regions_only_on_bounded_axis() {
        let mut rows = Region::row(4);
        rows.extend_to(1, 7, None);
        assert_eq!(rows, Region::rows(1, 4));
        assert_eq!((rows.left(), rows.right()), (0, UNBOUNDED));

        let limit = Region::new(2, 3, 0, 5);
        rows.extend_to(9, 9, Some(&limit));
        assert_eq!(rows, Region::rows(3, 4));

        let mut cols = Region::column(1);
        cols.extend_to(8, 3, None);
        assert_eq!(cols, Region::columns(1, 3));
        assert_eq!((cols.top(), cols.bottom()), (0, UNBOUNDED));
    }

    #[test]
    fn test_intersection() {
        let a = Region::new(0, 4, 0, 4);
        let b = Region::new(3, 6, 2, 8);
        assert!(a.intersects(&b));
        assert_eq!(a.intersection(&b), Some(Region::new(3, 4, 2, 4)));
        assert_eq!(a.intersection(&Region::new(5, 6, 0, 1)), None);

        let rows = Region::rows(2, 5).intersection(&Region::rows(4, 9));
        assert_eq!(rows, Some(Region::rows(4, 5)));

        let cross = Region::row(1).intersection(&Region::column(3));
        assert_eq!(cross, Some(Region::cell(1, 3)));
    }

    #[test]
    fn test_contains_region() {
        let outer = Region::new(1, 5, 1, 5);
        assert!(outer.contains_region(&Region::new(2, 3, 2, 5)));
        assert!(!outer.contains_region(&Region::new(0, 3, 2, 3)));
        assert!(Region::columns(0, 3).contains_region(&Region::new(7, 90, 1, 2)));
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(Region::new(1, 2, 1, 2).to_string(), "B2:C3");
        assert_eq!(Region::cell(0, 0).to_string(), "A1");
        assert_eq!(Region::rows(2, 3).to_string(), "3:4");
        assert_eq!(Region::columns(1, 2).to_string(), "B:C");

        assert_eq!(Region::from_a1("B2:C3"), Some(Region::new(1, 2, 1, 2)));
        assert_eq!(Region::from_a1("C3:B2"), Some(Region::new(1, 2, 1, 2)));
        assert_eq!(Region::from_a1("A1"), Some(Region::cell(0, 0)));
        assert_eq!(Region::from_a1("3:4"), Some(Region::rows(2, 3)));
        assert_eq!(Region::from_a1("B:C"), Some(Region::columns(1, 2)));
        assert_eq!(Region::from_a1("0:2"), None);
        assert_eq!(Region::from_a1("B2:??"), None);
    }

    #[test]
    fn test_with_span_skips_open_axis() {
        let rows = Region::rows(1, 2);
        assert_eq!(rows.with_span(Axis::Column, 3, 4), rows);
        assert_eq!(rows.with_span(Axis::Row, 4, 6), Region::rows(4, 6));
    }

    #[test]
    fn test_serde_round_trip() {
        for region in [Region::new(4, 1, 2, 7), Region::rows(3, 5), Region::column(9)] {
            let json = serde_json::to_string(&region).unwrap();
            let back: Region = serde_json::from_str(&json).unwrap();
            assert_eq!(back, region);
            assert_eq!(back.kind(), region.kind());
        }
    }

    #[test]
    fn test_deserialise_normalises_input() {
        let inverted: Region = serde_json::from_str(
            r#"{"kind":"Cells","top":5,"bottom":1,"left":3,"right":0}"#,
        )
        .unwrap();
        assert_eq!((inverted.top(), inverted.bottom()), (1, 5));
        assert_eq!((inverted.left(), inverted.right()), (0, 3));
        assert_eq!(inverted.height(), Some(5));

        let rows: Region =
            serde_json::from_str(r#"{"kind":"Rows","top":2,"bottom":3,"left":1,"right":4}"#).unwrap();
        assert_eq!(rows, Region::rows(2, 3));
        assert_eq!(rows.right(), UNBOUNDED);
        assert_eq!(rows.width(), None);
    }

    #[test]
    fn test_deserialise_rejects_bad_bounds() {
        let open_cells = format!(
            r#"{{"kind":"Cells","top":0,"bottom":1,"left":0,"right":{}}}"#,
            UNBOUNDED
        );
        assert!(serde_json::from_str::<Region>(&open_cells).is_err());
        assert!(serde_json::from_str::<Region>(r#"{"kind":"Cells","top":0,"bottom":1}"#).is_err());
        assert!(serde_json::from_str::<Region>(r#"{"kind":"Columns","top":0,"bottom":1}"#).is_err());
    }

    #[test]
    fn test_extent_saturates_at_sheet_edge() {
        let wide = Region::new(0, 1, 0, UNBOUNDED);
        assert_eq!(wide.width(), Some(u32::MAX));
        assert!(!wide.is_single_cell());
    }
}
