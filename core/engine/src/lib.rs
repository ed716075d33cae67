//! FILENAME: core/engine/src/lib.rs
//! PURPOSE: Main library entry point for the sheet structure engine.
//! CONTEXT: A sheet is a bounded grid of cells with merged regions. Inserting
//! or removing rows and columns moves cell contents and repairs merges, and
//! every edit goes through an undoable command. Re-exports public types for
//! use by other crates.

pub mod cell;
pub mod commands;
pub mod config;
pub mod coord;
pub mod error;
pub mod events;
pub mod grid;
pub mod merges;
pub mod region;
pub mod sheet;
pub mod sheet_math;
pub mod undo;

// Re-export commonly used types at the crate root
pub use cell::CellValue;
pub use commands::{InsertCommand, MergeCommand, RemoveCommand, SetValueCommand, UnmergeCommand};
pub use config::SheetConfig;
pub use coord::{a1_to_coord, col_to_index, coord_to_a1, index_to_col, parse_a1, Axis, CellCoord, UNBOUNDED};
pub use error::{Result, SheetError};
pub use events::{EventCallback, EventCollector, SheetEvent};
pub use grid::{CellStore, Grid};
pub use merges::{MergeCollection, MergeEdit};
pub use region::{Region, RegionKind};
pub use sheet::Sheet;
pub use undo::{Command, CommandGroup, CommandStack, HistoryOutcome};
