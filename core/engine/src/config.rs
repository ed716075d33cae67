//! FILENAME: core/engine/src/config.rs
//! PURPOSE: Per-sheet limits: undo history depth and maximum grid size.
//! CONTEXT: Every field has a default, so a host can pass a partial JSON
//! object (or none at all). The row/column maxima default to the usual
//! spreadsheet limits and must stay below the `UNBOUNDED` sentinel.

use serde::{Deserialize, Serialize};

use crate::coord::UNBOUNDED;
use crate::error::{Result, SheetError};

/// Maximum number of undo operations to keep in history.
pub const MAX_HISTORY_SIZE: usize = 100;
pub const MAX_ROWS: u32 = 1_048_576;
pub const MAX_COLS: u32 = 16_384;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SheetConfig {
    /// Commands kept on the undo stack before the oldest are dropped.
    pub max_history: usize,
    pub max_rows: u32,
    pub max_cols: u32,
}

impl Default for SheetConfig {
    fn default() -> Self {
        SheetConfig {
            max_history: MAX_HISTORY_SIZE,
            max_rows: MAX_ROWS,
            max_cols: MAX_COLS,
        }
    }
}

impl SheetConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SheetConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_history == 0 {
            return Err(SheetError::InvalidConfig("maxHistory must be at least 1".to_string()));
        }
        if self.max_rows == 0 || self.max_rows >= UNBOUNDED {
            return Err(SheetError::InvalidConfig(format!("maxRows {} is out of range", self.max_rows)));
        }
        if self.max_cols == 0 || self.max_cols >= UNBOUNDED {
            return Err(SheetError::InvalidConfig(format!("maxCols {} is out of range", self.max_cols)));
        }
        Ok(())
    }
}
