//! FILENAME: core/engine/src/coord.rs
//! PURPOSE: Cell coordinates, grid axes and A1-style conversions.
//! CONTEXT: Coordinates are 0-based (row, col) pairs. `UNBOUNDED` marks the
//! open edge of a whole-row or whole-column region and is never a real index.
//! Column "A" = 0, "B" = 1, ..., "Z" = 25, "AA" = 26, etc.
//! Row 1 in A1 notation = row 0 internally.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell coordinate as (row, col) with 0-based indices.
pub type CellCoord = (u32, u32);

/// Sentinel for "no end in this dimension".
pub const UNBOUNDED: u32 = u32::MAX;

/// One of the two grid dimensions. Structural edits are written once and
/// parameterised by the axis they act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Row,
    Column,
}

impl Axis {
    /// The component of `coord` that lies along this axis.
    pub fn of(self, coord: CellCoord) -> u32 {
        match self {
            Axis::Row => coord.0,
            Axis::Column => coord.1,
        }
    }

    /// Returns `coord` with the component along this axis replaced.
    pub fn with(self, coord: CellCoord, value: u32) -> CellCoord {
        match self {
            Axis::Row => (value, coord.1),
            Axis::Column => (coord.0, value),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Row => write!(f, "row"),
            Axis::Column => write!(f, "column"),
        }
    }
}

/// Converts a column string (e.g., "A", "AA", "abc") to a 0-based column index.
/// "A" -> 0, "B" -> 1, ..., "Z" -> 25, "AA" -> 26, "AB" -> 27, etc.
///
/// Returns None for an empty string, non-alphabetic characters, or a column
/// past the addressable range.
pub fn col_to_index(col_str: &str) -> Option<u32> {
    if col_str.is_empty() {
        return None;
    }
    let mut result: u32 = 0;
    for c in col_str.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
        result = result.checked_mul(26)?.checked_add(digit)?;
    }
    Some(result - 1)
}

/// Converts a 0-based column index to a column string.
/// 0 -> "A", 1 -> "B", ..., 25 -> "Z", 26 -> "AA", 27 -> "AB", etc.
pub fn index_to_col(mut col_index: u32) -> String {
    let mut result = String::new();
    loop {
        let remainder = col_index % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if col_index < 26 {
            break;
        }
        col_index = col_index / 26 - 1;
    }
    result
}

/// Converts an A1-style reference to a 0-based (row, col) coordinate.
/// "A1" -> (0, 0), "B2" -> (1, 1), "AA100" -> (99, 26)
///
/// # Arguments
/// * `col_str` - The column part (e.g., "A", "AA").
/// * `row_num` - The 1-based row number from the reference.
pub fn a1_to_coord(col_str: &str, row_num: u32) -> Option<CellCoord> {
    let col = col_to_index(col_str)?;
    let row = row_num.checked_sub(1)?;
    Some((row, col))
}

/// Converts a 0-based (row, col) coordinate to an A1-style reference string.
/// (0, 0) -> "A1", (1, 1) -> "B2", (99, 26) -> "AA100"
pub fn coord_to_a1(coord: CellCoord) -> String {
    let (row, col) = coord;
    format!("{}{}", index_to_col(col), row as u64 + 1)
}

/// Parses a single A1 reference such as "C7" into a coordinate.
pub fn parse_a1(reference: &str) -> Option<CellCoord> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    let row_num: u32 = digits.parse().ok()?;
    a1_to_coord(letters, row_num)
}
