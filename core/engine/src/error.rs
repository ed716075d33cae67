//! FILENAME: core/engine/src/error.rs

use thiserror::Error;

use crate::coord::Axis;
use crate::region::Region;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("{axis} index {index} is out of range (limit {limit})")]
    InvalidIndex { axis: Axis, index: u32, limit: u32 },

    #[error("{axis} count must be at least 1")]
    InvalidCount { axis: Axis },

    #[error("removing would leave the sheet without any {axis}s")]
    DimensionExhausted { axis: Axis },

    #[error("sheet cannot grow to {requested} {axis}s (maximum {max})")]
    DimensionOverflow { axis: Axis, requested: u64, max: u32 },

    #[error("merge {region} overlaps existing merge {existing}")]
    OverlappingMerge { region: Region, existing: Region },

    #[error("merge {0} covers a single cell")]
    SingleCellMerge(Region),

    #[error("invalid region: {0}")]
    InvalidRegion(String),

    #[error("no merge covers ({row}, {col})")]
    NoMergeAt { row: u32, col: u32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("configuration parse error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SheetError>;
