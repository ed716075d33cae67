//! FILENAME: core/engine/src/sheet.rs
//! PURPOSE: A sheet: grid dimensions, cell store, merges and edit history.
//! CONTEXT: All mutating entry points go through commands executed on the
//! sheet's own `CommandStack`, so every user-visible edit can be undone as one
//! unit. Commands themselves use the crate-internal helpers below, which
//! mutate without recording history.

use std::fmt;

use crate::cell::CellValue;
use crate::commands::{InsertCommand, MergeCommand, RemoveCommand, SetValueCommand, UnmergeCommand};
use crate::config::SheetConfig;
use crate::coord::Axis;
use crate::error::{Result, SheetError};
use crate::events::{EventCallback, SheetEvent};
use crate::grid::{CellStore, Grid};
use crate::merges::MergeCollection;
use crate::region::Region;
use crate::sheet_math::confine;
use crate::undo::{Command, CommandStack, HistoryOutcome};

pub struct Sheet {
    num_rows: u32,
    num_cols: u32,
    cells: Box<dyn CellStore>,
    merges: MergeCollection,
    config: SheetConfig,
    history: CommandStack,
    on_event: Option<EventCallback>,
}

impl Sheet {
    /// Creates an empty sheet backed by a sparse `Grid`.
    pub fn new(num_rows: u32, num_cols: u32) -> Result<Self> {
        Self::with_config(num_rows, num_cols, SheetConfig::default())
    }

    pub fn with_config(num_rows: u32, num_cols: u32, config: SheetConfig) -> Result<Self> {
        Self::with_store(num_rows, num_cols, config, Box::new(Grid::new()))
    }

    /// Creates a sheet over a host-provided cell store.
    pub fn with_store(
        num_rows: u32,
        num_cols: u32,
        config: SheetConfig,
        cells: Box<dyn CellStore>,
    ) -> Result<Self> {
        config.validate()?;
        for (axis, dim, max) in [
            (Axis::Row, num_rows, config.max_rows),
            (Axis::Column, num_cols, config.max_cols),
        ] {
            if dim == 0 {
                return Err(SheetError::DimensionExhausted { axis });
            }
            if dim > max {
                return Err(SheetError::DimensionOverflow { axis, requested: dim as u64, max });
            }
        }

        Ok(Sheet {
            num_rows,
            num_cols,
            cells,
            merges: MergeCollection::new(),
            history: CommandStack::with_max_size(config.max_history),
            config,
            on_event: None,
        })
    }

    pub fn set_event_callback(&mut self, callback: EventCallback) {
        self.on_event = Some(callback);
    }

    pub fn clear_event_callback(&mut self) {
        self.on_event = None;
    }

    pub fn num_rows(&self) -> u32 {
        self.num_rows
    }

    pub fn num_cols(&self) -> u32 {
        self.num_cols
    }

    pub fn dimension(&self, axis: Axis) -> u32 {
        match axis {
            Axis::Row => self.num_rows,
            Axis::Column => self.num_cols,
        }
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    /// The whole sheet as a bounded region.
    pub fn region(&self) -> Region {
        Region::new(0, self.num_rows - 1, 0, self.num_cols - 1)
    }

    pub fn merges(&self) -> &MergeCollection {
        &self.merges
    }

    /// Direct access to the merge set. Changes made here are not recorded
    /// in the history; use `add_merge` / `remove_merge` for undoable edits.
    pub fn merges_mut(&mut self) -> &mut MergeCollection {
        &mut self.merges
    }

    pub fn store(&self) -> &dyn CellStore {
        self.cells.as_ref()
    }

    /// Direct access to the cell store, bypassing the history.
    pub fn store_mut(&mut self) -> &mut dyn CellStore {
        self.cells.as_mut()
    }

    pub fn get_value(&self, row: u32, col: u32) -> CellValue {
        self.cells.get(row, col)
    }

    pub fn history(&self) -> &CommandStack {
        &self.history
    }

    // ========================================================================
    // UNDOABLE EDITS
    // ========================================================================

    pub fn set_value(&mut self, row: u32, col: u32, value: impl Into<CellValue>) -> Result<()> {
        self.execute(Box::new(SetValueCommand::new(row, col, value.into())))
    }

    pub fn insert_row_at(&mut self, index: u32) -> Result<()> {
        self.insert_rows_at(index, 1)
    }

    pub fn insert_rows_at(&mut self, index: u32, count: u32) -> Result<()> {
        self.execute(Box::new(InsertCommand::rows(index, count)))
    }

    pub fn insert_col_at(&mut self, index: u32) -> Result<()> {
        self.insert_cols_at(index, 1)
    }

    pub fn insert_cols_at(&mut self, index: u32, count: u32) -> Result<()> {
        self.execute(Box::new(InsertCommand::columns(index, count)))
    }

    pub fn remove_row(&mut self, index: u32) -> Result<()> {
        self.remove_rows(index, 1)
    }

    pub fn remove_rows(&mut self, index: u32, count: u32) -> Result<()> {
        self.execute(Box::new(RemoveCommand::rows(index, count)))
    }

    pub fn remove_col(&mut self, index: u32) -> Result<()> {
        self.remove_cols(index, 1)
    }

    pub fn remove_cols(&mut self, index: u32, count: u32) -> Result<()> {
        self.execute(Box::new(RemoveCommand::columns(index, count)))
    }

    pub fn add_merge(&mut self, region: Region) -> Result<()> {
        self.execute(Box::new(MergeCommand::new(region)))
    }

    pub fn remove_merge(&mut self, row: u32, col: u32) -> Result<()> {
        self.execute(Box::new(UnmergeCommand::new(row, col)))
    }

    // ========================================================================
    // HISTORY
    // ========================================================================

    /// Executes `command` and records it on this sheet's history.
    pub fn execute(&mut self, command: Box<dyn Command>) -> Result<()> {
        let mut history = std::mem::take(&mut self.history);
        let result = history.execute_command(command, self);
        self.history = history;
        result
    }

    pub fn undo(&mut self) -> Result<HistoryOutcome> {
        let mut history = std::mem::take(&mut self.history);
        let result = history.undo(self);
        self.history = history;
        result
    }

    pub fn redo(&mut self) -> Result<HistoryOutcome> {
        let mut history = std::mem::take(&mut self.history);
        let result = history.redo(self);
        self.history = history;
        result
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_description(&self) -> Option<String> {
        self.history.undo_description()
    }

    pub fn redo_description(&self) -> Option<String> {
        self.history.redo_description()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    // ========================================================================
    // HELPERS FOR COMMANDS
    // ========================================================================

    pub fn emit(&mut self, event: SheetEvent) {
        if let Some(callback) = self.on_event.as_mut() {
            callback(event);
        }
    }

    pub(crate) fn set_dimension(&mut self, axis: Axis, value: u32) {
        match axis {
            Axis::Row => self.num_rows = value,
            Axis::Column => self.num_cols = value,
        }
    }

    /// Every cell of the sheet at or past `index` along `axis`, or None when
    /// `index` is past the last row/column.
    pub(crate) fn band_from(&self, axis: Axis, index: u32) -> Option<Region> {
        let last = self.dimension(axis).checked_sub(1)?;
        if index > last {
            return None;
        }
        let span = match axis {
            Axis::Row => Region::rows(index, last),
            Axis::Column => Region::columns(index, last),
        };
        Some(confine(&span, &self.region()))
    }

    pub(crate) fn check_cell(&self, row: u32, col: u32) -> Result<()> {
        for (axis, index) in [(Axis::Row, row), (Axis::Column, col)] {
            let dim = self.dimension(axis);
            if index >= dim {
                return Err(SheetError::InvalidIndex { axis, index, limit: dim - 1 });
            }
        }
        Ok(())
    }

    /// The bounded edges of `region` must lie inside the sheet.
    pub(crate) fn check_region(&self, region: &Region) -> Result<()> {
        for axis in [Axis::Row, Axis::Column] {
            if region.is_unbounded(axis) {
                continue;
            }
            let (_, end) = region.span(axis);
            let dim = self.dimension(axis);
            if end >= dim {
                return Err(SheetError::InvalidIndex { axis, index: end, limit: dim - 1 });
            }
        }
        Ok(())
    }

    pub(crate) fn check_insert(&self, axis: Axis, index: u32, count: u32) -> Result<()> {
        if count == 0 {
            return Err(SheetError::InvalidCount { axis });
        }
        let dim = self.dimension(axis);
        if index > dim {
            return Err(SheetError::InvalidIndex { axis, index, limit: dim });
        }
        let max = match axis {
            Axis::Row => self.config.max_rows,
            Axis::Column => self.config.max_cols,
        };
        let requested = dim as u64 + count as u64;
        if requested > max as u64 {
            return Err(SheetError::DimensionOverflow { axis, requested, max });
        }
        Ok(())
    }

    pub(crate) fn check_remove(&self, axis: Axis, index: u32, count: u32) -> Result<()> {
        if count == 0 {
            return Err(SheetError::InvalidCount { axis });
        }
        let dim = self.dimension(axis);
        let last_removed = index as u64 + count as u64 - 1;
        if last_removed >= dim as u64 {
            let index = if index >= dim { index } else { dim };
            return Err(SheetError::InvalidIndex { axis, index, limit: dim - 1 });
        }
        if count >= dim {
            return Err(SheetError::DimensionExhausted { axis });
        }
        Ok(())
    }
}

impl fmt::Debug for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sheet")
            .field("num_rows", &self.num_rows)
            .field("num_cols", &self.num_cols)
            .field("merges", &self.merges)
            .field("history", &self.history.stack_sizes())
            .finish_non_exhaustive()
    }
}
