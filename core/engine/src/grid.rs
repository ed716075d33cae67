//! FILENAME: core/engine/src/grid.rs
//! PURPOSE: The cell store interface and its default sparse implementation.
//! CONTEXT: The structural core never assumes how values are stored; it reads
//! and writes through `CellStore`. `Grid` is the in-memory store used when the
//! host application does not bring its own. It uses a sparse storage strategy
//! (hash map) so that massive sheets where most cells are empty stay cheap.

use rustc_hash::FxHashMap;

use crate::cell::CellValue;
use crate::coord::CellCoord;
use crate::region::Region;

/// Value storage consumed by the sheet.
pub trait CellStore {
    /// The value at (row, col), `CellValue::Empty` when nothing is stored.
    fn get(&self, row: u32, col: u32) -> CellValue;

    /// Stores a value. Storing `CellValue::Empty` clears the cell.
    fn set(&mut self, row: u32, col: u32, value: CellValue);

    /// Clears every cell inside `region`.
    fn clear(&mut self, region: &Region);

    /// All non-empty cells inside `region`, in no particular order.
    fn cells_in(&self, region: &Region) -> Vec<(CellCoord, CellValue)>;
}

/// The Grid struct holds the state of the spreadsheet data.
/// Row and Col are 0-based indices.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    /// Sparse storage: keys are (row, col). Empty values are never stored.
    cells: FxHashMap<CellCoord, CellValue>,
}

impl Grid {
    /// Creates a new, empty Grid.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl CellStore for Grid {
    fn get(&self, row: u32, col: u32) -> CellValue {
        self.cells.get(&(row, col)).cloned().unwrap_or_default()
    }

    fn set(&mut self, row: u32, col: u32, value: CellValue) {
        if value.is_empty() {
            self.cells.remove(&(row, col));
        } else {
            self.cells.insert((row, col), value);
        }
    }

    fn clear(&mut self, region: &Region) {
        self.cells.retain(|&(row, col), _| !region.contains(row, col));
    }

    fn cells_in(&self, region: &Region) -> Vec<(CellCoord, CellValue)> {
        self.cells
            .iter()
            .filter(|((row, col), _)| region.contains(*row, *col))
            .map(|(&coord, value)| (coord, value.clone()))
            .collect()
    }
}
