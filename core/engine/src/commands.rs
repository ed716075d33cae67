//! FILENAME: core/engine/src/commands.rs
//! PURPOSE: The undoable edits a sheet supports.
//! CONTEXT: Structural commands move cell contents and repair merges in one
//! step. Each command validates before touching anything and snapshots
//! exactly what it overwrites, so `undo` restores the prior state verbatim
//! (including merges that were auto-unmerged or replaced).

use crate::cell::CellValue;
use crate::coord::{coord_to_a1, Axis, CellCoord};
use crate::error::{Result, SheetError};
use crate::events::SheetEvent;
use crate::merges::MergeEdit;
use crate::region::Region;
use crate::sheet::Sheet;
use crate::undo::Command;

fn inserted_event(axis: Axis, index: u32, count: u32) -> SheetEvent {
    match axis {
        Axis::Row => SheetEvent::RowInserted { index, count },
        Axis::Column => SheetEvent::ColumnInserted { index, count },
    }
}

fn removed_event(axis: Axis, index: u32, count: u32) -> SheetEvent {
    match axis {
        Axis::Row => SheetEvent::RowRemoved { index, count },
        Axis::Column => SheetEvent::ColumnRemoved { index, count },
    }
}

fn describe_band(verb: &str, axis: Axis, index: u32, count: u32) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("{} {} {}{} at {}", verb, count, axis, plural, index)
}

/// Clears everything from `index` onwards and returns what was there.
fn take_band(sheet: &mut Sheet, axis: Axis, index: u32) -> Vec<(CellCoord, CellValue)> {
    match sheet.band_from(axis, index) {
        Some(band) => {
            let cells = sheet.store().cells_in(&band);
            sheet.store_mut().clear(&band);
            cells
        }
        None => Vec::new(),
    }
}

/// Writes `cells` back at their recorded coordinates.
fn restore_cells(sheet: &mut Sheet, cells: &[(CellCoord, CellValue)]) {
    let store = sheet.store_mut();
    for ((row, col), value) in cells {
        store.set(*row, *col, value.clone());
    }
}

// ============================================================================
// CELL VALUES
// ============================================================================

#[derive(Debug)]
pub struct SetValueCommand {
    row: u32,
    col: u32,
    value: CellValue,
    previous: CellValue,
}

impl SetValueCommand {
    pub fn new(row: u32, col: u32, value: CellValue) -> Self {
        SetValueCommand {
            row,
            col,
            value,
            previous: CellValue::Empty,
        }
    }
}

impl Command for SetValueCommand {
    fn execute(&mut self, sheet: &mut Sheet) -> Result<()> {
        sheet.check_cell(self.row, self.col)?;
        self.previous = sheet.get_value(self.row, self.col);
        sheet.store_mut().set(self.row, self.col, self.value.clone());
        Ok(())
    }

    fn undo(&mut self, sheet: &mut Sheet) -> Result<()> {
        sheet.store_mut().set(self.row, self.col, self.previous.clone());
        Ok(())
    }

    fn description(&self) -> String {
        format!("Set {}", coord_to_a1((self.row, self.col)))
    }
}

// ============================================================================
// INSERT ROWS / COLUMNS
// ============================================================================

/// Inserts `count` empty rows or columns before `index`.
#[derive(Debug)]
pub struct InsertCommand {
    axis: Axis,
    index: u32,
    count: u32,
    moved: Vec<(CellCoord, CellValue)>,
    merge_edit: MergeEdit,
}

impl InsertCommand {
    pub fn new(axis: Axis, index: u32, count: u32) -> Self {
        InsertCommand {
            axis,
            index,
            count,
            moved: Vec::new(),
            merge_edit: MergeEdit::default(),
        }
    }

    pub fn rows(index: u32, count: u32) -> Self {
        Self::new(Axis::Row, index, count)
    }

    pub fn columns(index: u32, count: u32) -> Self {
        Self::new(Axis::Column, index, count)
    }
}

impl Command for InsertCommand {
    fn execute(&mut self, sheet: &mut Sheet) -> Result<()> {
        let (axis, index, count) = (self.axis, self.index, self.count);
        sheet.check_insert(axis, index, count)?;

        self.moved = take_band(sheet, axis, index);
        let store = sheet.store_mut();
        for (coord, value) in &self.moved {
            let (row, col) = axis.with(*coord, axis.of(*coord) + count);
            store.set(row, col, value.clone());
        }

        self.merge_edit = sheet.merges_mut().insert_at(axis, index, count);
        let dim = sheet.dimension(axis);
        sheet.set_dimension(axis, dim + count);

        sheet.emit(inserted_event(axis, index, count));
        Ok(())
    }

    fn undo(&mut self, sheet: &mut Sheet) -> Result<()> {
        let (axis, index, count) = (self.axis, self.index, self.count);

        take_band(sheet, axis, index);
        restore_cells(sheet, &self.moved);
        sheet.merges_mut().revert(&self.merge_edit);
        let dim = sheet.dimension(axis);
        sheet.set_dimension(axis, dim - count);

        sheet.emit(removed_event(axis, index, count));
        Ok(())
    }

    fn description(&self) -> String {
        describe_band("Insert", self.axis, self.index, self.count)
    }
}

// ============================================================================
// REMOVE ROWS / COLUMNS
// ============================================================================

/// Removes `count` rows or columns starting at `index`, moving everything
/// after them back.
#[derive(Debug)]
pub struct RemoveCommand {
    axis: Axis,
    index: u32,
    count: u32,
    taken: Vec<(CellCoord, CellValue)>,
    merge_edit: MergeEdit,
}

impl RemoveCommand {
    pub fn new(axis: Axis, index: u32, count: u32) -> Self {
        RemoveCommand {
            axis,
            index,
            count,
            taken: Vec::new(),
            merge_edit: MergeEdit::default(),
        }
    }

    pub fn rows(index: u32, count: u32) -> Self {
        Self::new(Axis::Row, index, count)
    }

    pub fn columns(index: u32, count: u32) -> Self {
        Self::new(Axis::Column, index, count)
    }
}

impl Command for RemoveCommand {
    fn execute(&mut self, sheet: &mut Sheet) -> Result<()> {
        let (axis, index, count) = (self.axis, self.index, self.count);
        sheet.check_remove(axis, index, count)?;

        self.taken = take_band(sheet, axis, index);
        let store = sheet.store_mut();
        for (coord, value) in &self.taken {
            let position = axis.of(*coord);
            if position >= index + count {
                let (row, col) = axis.with(*coord, position - count);
                store.set(row, col, value.clone());
            }
        }

        self.merge_edit = sheet.merges_mut().remove_at(axis, index, count);
        let dim = sheet.dimension(axis);
        sheet.set_dimension(axis, dim - count);

        sheet.emit(removed_event(axis, index, count));
        for dropped in &self.merge_edit.dropped {
            sheet.emit(SheetEvent::MergeRemoved(*dropped));
        }
        Ok(())
    }

    fn undo(&mut self, sheet: &mut Sheet) -> Result<()> {
        let (axis, index, count) = (self.axis, self.index, self.count);

        let dim = sheet.dimension(axis);
        sheet.set_dimension(axis, dim + count);
        take_band(sheet, axis, index);
        restore_cells(sheet, &self.taken);
        sheet.merges_mut().revert(&self.merge_edit);

        sheet.emit(inserted_event(axis, index, count));
        for dropped in &self.merge_edit.dropped {
            sheet.emit(SheetEvent::MergeAdded(*dropped));
        }
        Ok(())
    }

    fn description(&self) -> String {
        describe_band("Remove", self.axis, self.index, self.count)
    }
}

// ============================================================================
// MERGES
// ============================================================================

/// Merges a region. Only the top-left cell keeps its content; the other
/// cells are cleared.
#[derive(Debug)]
pub struct MergeCommand {
    region: Region,
    merge_edit: MergeEdit,
    cleared: Vec<(CellCoord, CellValue)>,
}

impl MergeCommand {
    pub fn new(region: Region) -> Self {
        MergeCommand {
            region,
            merge_edit: MergeEdit::default(),
            cleared: Vec::new(),
        }
    }
}

impl Command for MergeCommand {
    fn execute(&mut self, sheet: &mut Sheet) -> Result<()> {
        let region = self.region;
        sheet.check_region(&region)?;
        self.merge_edit = sheet.merges_mut().add(region)?;

        let anchor = region.top_left();
        self.cleared = sheet
            .store()
            .cells_in(&region)
            .into_iter()
            .filter(|(coord, _)| *coord != anchor)
            .collect();
        let store = sheet.store_mut();
        for ((row, col), _) in &self.cleared {
            store.set(*row, *col, CellValue::Empty);
        }

        for replaced in &self.merge_edit.dropped {
            sheet.emit(SheetEvent::MergeRemoved(*replaced));
        }
        sheet.emit(SheetEvent::MergeAdded(region));
        Ok(())
    }

    fn undo(&mut self, sheet: &mut Sheet) -> Result<()> {
        sheet.merges_mut().revert(&self.merge_edit);
        restore_cells(sheet, &self.cleared);

        sheet.emit(SheetEvent::MergeRemoved(self.region));
        for replaced in &self.merge_edit.dropped {
            sheet.emit(SheetEvent::MergeAdded(*replaced));
        }
        Ok(())
    }

    fn description(&self) -> String {
        format!("Merge {}", self.region)
    }
}

/// Removes the merge covering a cell.
#[derive(Debug)]
pub struct UnmergeCommand {
    row: u32,
    col: u32,
    removed: Option<Region>,
}

impl UnmergeCommand {
    pub fn new(row: u32, col: u32) -> Self {
        UnmergeCommand {
            row,
            col,
            removed: None,
        }
    }
}

impl Command for UnmergeCommand {
    fn execute(&mut self, sheet: &mut Sheet) -> Result<()> {
        let region = sheet
            .merges_mut()
            .remove(self.row, self.col)
            .ok_or(SheetError::NoMergeAt { row: self.row, col: self.col })?;
        self.removed = Some(region);
        sheet.emit(SheetEvent::MergeRemoved(region));
        Ok(())
    }

    fn undo(&mut self, sheet: &mut Sheet) -> Result<()> {
        if let Some(region) = self.removed.take() {
            let edit = MergeEdit {
                removed: vec![region],
                added: Vec::new(),
                dropped: vec![region],
            };
            sheet.merges_mut().revert(&edit);
            sheet.emit(SheetEvent::MergeAdded(region));
        }
        Ok(())
    }

    fn description(&self) -> String {
        format!("Unmerge {}", coord_to_a1((self.row, self.col)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptions() {
        assert_eq!(InsertCommand::rows(3, 1).description(), "Insert 1 row at 3");
        assert_eq!(RemoveCommand::columns(0, 2).description(), "Remove 2 columns at 0");
        assert_eq!(MergeCommand::new(Region::new(1, 2, 1, 2)).description(), "Merge B2:C3");
        assert_eq!(UnmergeCommand::new(0, 0).description(), "Unmerge A1");
    }

    #[test]
    fn test_insert_moves_cells_past_index() {
        let mut sheet = Sheet::new(4, 2).unwrap();
        sheet.store_mut().set(0, 0, CellValue::from("keep"));
        sheet.store_mut().set(1, 1, CellValue::from("move"));

        let mut command = InsertCommand::rows(1, 2);
        command.execute(&mut sheet).unwrap();
        assert_eq!(sheet.num_rows(), 6);
        assert_eq!(sheet.get_value(0, 0), CellValue::from("keep"));
        assert!(sheet.get_value(1, 1).is_empty());
        assert_eq!(sheet.get_value(3, 1), CellValue::from("move"));

        command.undo(&mut sheet).unwrap();
        assert_eq!(sheet.num_rows(), 4);
        assert_eq!(sheet.get_value(1, 1), CellValue::from("move"));
        assert!(sheet.get_value(3, 1).is_empty());
    }

    #[test]
    fn test_remove_discards_band_and_restores_it() {
        let mut sheet = Sheet::new(2, 4).unwrap();
        for col in 0..4 {
            sheet.store_mut().set(0, col, CellValue::Number(col as f64));
        }

        let mut command = RemoveCommand::columns(1, 2);
        command.execute(&mut sheet).unwrap();
        assert_eq!(sheet.num_cols(), 2);
        assert_eq!(sheet.get_value(0, 0), CellValue::Number(0.0));
        assert_eq!(sheet.get_value(0, 1), CellValue::Number(3.0));
        assert!(sheet.get_value(0, 3).is_empty());

        command.undo(&mut sheet).unwrap();
        for col in 0..4 {
            assert_eq!(sheet.get_value(0, col), CellValue::Number(col as f64));
        }
    }

    #[test]
    fn test_merge_keeps_only_anchor_content() {
        let mut sheet = Sheet::new(3, 3).unwrap();
        sheet.store_mut().set(0, 0, CellValue::from("anchor"));
        sheet.store_mut().set(1, 1, CellValue::from("hidden"));

        let mut command = MergeCommand::new(Region::new(0, 1, 0, 1));
        command.execute(&mut sheet).unwrap();
        assert_eq!(sheet.get_value(0, 0), CellValue::from("anchor"));
        assert!(sheet.get_value(1, 1).is_empty());

        command.undo(&mut sheet).unwrap();
        assert_eq!(sheet.get_value(1, 1), CellValue::from("hidden"));
        assert!(!sheet.merges().any());
    }

    #[test]
    fn test_merge_outside_sheet_is_rejected() {
        let mut sheet = Sheet::new(3, 3).unwrap();
        let mut command = MergeCommand::new(Region::new(2, 3, 0, 0));
        assert!(matches!(
            command.execute(&mut sheet),
            Err(SheetError::InvalidIndex { axis: Axis::Row, index: 3, .. })
        ));
        assert!(!sheet.merges().any());
    }

    #[test]
    fn test_unmerge_without_merge_fails() {
        let mut sheet = Sheet::new(3, 3).unwrap();
        let mut command = UnmergeCommand::new(1, 1);
        assert!(matches!(
            command.execute(&mut sheet),
            Err(SheetError::NoMergeAt { row: 1, col: 1 })
        ));
    }
}
