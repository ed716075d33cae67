//! FILENAME: core/engine/src/undo.rs
//! PURPOSE: Undo/Redo history stack using the Command Pattern.
//! CONTEXT: Every mutation of a sheet is a `Command` that knows how to apply
//! itself and how to restore exactly what it touched. Commands capture their
//! snapshot each time they execute, so redo is simply a fresh execute. A
//! `CommandGroup` batches several commands into one undoable action.

use std::collections::VecDeque;
use std::fmt;

use crate::config::MAX_HISTORY_SIZE;
use crate::error::Result;
use crate::sheet::Sheet;

/// A reversible change to a sheet.
///
/// `execute` must either succeed completely or leave the sheet untouched;
/// `undo` is only ever called on a command whose last `execute` succeeded
/// and must restore every field that `execute` touched.
pub trait Command: fmt::Debug {
    fn execute(&mut self, sheet: &mut Sheet) -> Result<()>;

    fn undo(&mut self, sheet: &mut Sheet) -> Result<()>;

    /// Human-readable description (e.g., "Insert 1 row at 3").
    fn description(&self) -> String;
}

/// What a call to `undo` / `redo` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryOutcome {
    Undone(String),
    Redone(String),
    NothingToUndo,
    NothingToRedo,
}

/// Several commands applied as a single undoable action.
#[derive(Debug)]
pub struct CommandGroup {
    description: String,
    commands: Vec<Box<dyn Command>>,
}

impl CommandGroup {
    pub fn new(description: impl Into<String>) -> Self {
        CommandGroup {
            description: description.into(),
            commands: Vec::new(),
        }
    }

    pub fn with(mut self, command: impl Command + 'static) -> Self {
        self.commands.push(Box::new(command));
        self
    }

    pub fn push(&mut self, command: Box<dyn Command>) {
        self.commands.push(command);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Command for CommandGroup {
    fn execute(&mut self, sheet: &mut Sheet) -> Result<()> {
        for i in 0..self.commands.len() {
            if let Err(err) = self.commands[i].execute(sheet) {
                // Roll back the part that already ran, even past a failing step.
                for done in self.commands[..i].iter_mut().rev() {
                    if let Err(rollback) = done.undo(sheet) {
                        log::warn!("rollback of '{}' failed: {}", done.description(), rollback);
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }

    fn undo(&mut self, sheet: &mut Sheet) -> Result<()> {
        for command in self.commands.iter_mut().rev() {
            command.undo(sheet)?;
        }
        Ok(())
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}

/// The history stack for undo/redo operations.
#[derive(Debug)]
pub struct CommandStack {
    /// Executed commands that can be undone (most recent at back)
    undo_stack: VecDeque<Box<dyn Command>>,
    /// Commands that were undone and can be redone (most recent at back)
    redo_stack: VecDeque<Box<dyn Command>>,
    /// Maximum size of undo history
    max_size: usize,
}

impl CommandStack {
    pub fn new() -> Self {
        Self::with_max_size(MAX_HISTORY_SIZE)
    }

    pub fn with_max_size(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        CommandStack {
            undo_stack: VecDeque::with_capacity(max_size),
            redo_stack: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Runs `command` against `sheet` and records it. A failed command is not
    /// recorded and leaves the redo history intact.
    pub fn execute_command(&mut self, mut command: Box<dyn Command>, sheet: &mut Sheet) -> Result<()> {
        if let Err(err) = command.execute(sheet) {
            log::warn!("command '{}' rejected: {}", command.description(), err);
            return Err(err);
        }
        log::debug!("executed '{}'", command.description());

        // Clear redo stack when new action is performed
        self.redo_stack.clear();
        self.push_undo(command);
        Ok(())
    }

    pub fn undo(&mut self, sheet: &mut Sheet) -> Result<HistoryOutcome> {
        let Some(mut command) = self.undo_stack.pop_back() else {
            return Ok(HistoryOutcome::NothingToUndo);
        };
        if let Err(err) = command.undo(sheet) {
            log::warn!("undo of '{}' failed: {}", command.description(), err);
            self.undo_stack.push_back(command);
            return Err(err);
        }

        let description = command.description();
        log::debug!("undid '{}'", description);
        while self.redo_stack.len() >= self.max_size {
            self.redo_stack.pop_front();
        }
        self.redo_stack.push_back(command);
        Ok(HistoryOutcome::Undone(description))
    }

    pub fn redo(&mut self, sheet: &mut Sheet) -> Result<HistoryOutcome> {
        let Some(mut command) = self.redo_stack.pop_back() else {
            return Ok(HistoryOutcome::NothingToRedo);
        };
        if let Err(err) = command.execute(sheet) {
            log::warn!("redo of '{}' failed: {}", command.description(), err);
            self.redo_stack.push_back(command);
            return Err(err);
        }

        let description = command.description();
        log::debug!("redid '{}'", description);
        self.push_undo(command);
        Ok(HistoryOutcome::Redone(description))
    }

    fn push_undo(&mut self, command: Box<dyn Command>) {
        // Enforce max size
        while self.undo_stack.len() >= self.max_size {
            if let Some(evicted) = self.undo_stack.pop_front() {
                log::debug!("history full, dropping '{}'", evicted.description());
            }
        }
        self.undo_stack.push_back(command);
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get description of next undo action (for UI).
    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.back().map(|c| c.description())
    }

    /// Get description of next redo action (for UI).
    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.back().map(|c| c.description())
    }

    /// Clear all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Get current stack sizes (for debugging).
    pub fn stack_sizes(&self) -> (usize, usize) {
        (self.undo_stack.len(), self.redo_stack.len())
    }
}

impl Default for CommandStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::SetValueCommand;
    use crate::error::SheetError;
    use crate::CellValue;

    fn sheet() -> Sheet {
        Sheet::new(5, 5).unwrap()
    }

    fn set(row: u32, col: u32, text: &str) -> Box<dyn Command> {
        Box::new(SetValueCommand::new(row, col, CellValue::from(text)))
    }

    /// Always fails, for exercising rollback paths.
    #[derive(Debug)]
    struct Failing;

    impl Command for Failing {
        fn execute(&mut self, _sheet: &mut Sheet) -> Result<()> {
            Err(SheetError::NoMergeAt { row: 0, col: 0 })
        }

        fn undo(&mut self, _sheet: &mut Sheet) -> Result<()> {
            Ok(())
        }

        fn description(&self) -> String {
            "Fail".to_string()
        }
    }

    #[test]
    fn test_single_undo() {
        let mut sheet = sheet();
        let mut stack = CommandStack::new();

        stack.execute_command(set(0, 0, "a"), &mut sheet).unwrap();
        assert!(stack.can_undo());
        assert!(!stack.can_redo());

        let outcome = stack.undo(&mut sheet).unwrap();
        assert!(matches!(outcome, HistoryOutcome::Undone(_)));
        assert!(sheet.get_value(0, 0).is_empty());
        assert!(!stack.can_undo());
        assert!(stack.can_redo());
    }

    #[test]
    fn test_empty_stack_reports_no_op() {
        let mut sheet = sheet();
        let mut stack = CommandStack::new();
        assert_eq!(stack.undo(&mut sheet).unwrap(), HistoryOutcome::NothingToUndo);
        assert_eq!(stack.redo(&mut sheet).unwrap(), HistoryOutcome::NothingToRedo);
    }

    #[test]
    fn test_redo_after_undo() {
        let mut sheet = sheet();
        let mut stack = CommandStack::new();

        stack.execute_command(set(1, 1, "x"), &mut sheet).unwrap();
        stack.undo(&mut sheet).unwrap();
        let outcome = stack.redo(&mut sheet).unwrap();
        assert!(matches!(outcome, HistoryOutcome::Redone(_)));
        assert_eq!(sheet.get_value(1, 1), CellValue::from("x"));
        assert_eq!(stack.stack_sizes(), (1, 0));
    }

    #[test]
    fn test_redo_cleared_on_new_action() {
        let mut sheet = sheet();
        let mut stack = CommandStack::new();

        stack.execute_command(set(0, 0, "a"), &mut sheet).unwrap();
        stack.undo(&mut sheet).unwrap();
        assert!(stack.can_redo());

        // New action should clear redo
        stack.execute_command(set(1, 1, "b"), &mut sheet).unwrap();
        assert!(!stack.can_redo());
        assert_eq!(stack.redo(&mut sheet).unwrap(), HistoryOutcome::NothingToRedo);
    }

    #[test]
    fn test_failed_command_is_not_recorded() {
        let mut sheet = sheet();
        let mut stack = CommandStack::new();

        stack.execute_command(set(0, 0, "a"), &mut sheet).unwrap();
        stack.undo(&mut sheet).unwrap();

        assert!(stack.execute_command(Box::new(Failing), &mut sheet).is_err());
        assert_eq!(stack.stack_sizes(), (0, 1));
    }

    #[test]
    fn test_max_size_enforcement() {
        let mut sheet = sheet();
        let mut stack = CommandStack::with_max_size(3);

        for col in 0..4 {
            stack.execute_command(set(0, col, "v"), &mut sheet).unwrap();
        }
        assert_eq!(stack.stack_sizes().0, 3);
        assert_eq!(stack.undo_description().as_deref(), Some("Set D1"));
    }

    #[test]
    fn test_group_undoes_atomically() {
        let mut sheet = sheet();
        let mut stack = CommandStack::new();

        let group = CommandGroup::new("Paste 2 cells")
            .with(SetValueCommand::new(0, 0, CellValue::from("a")))
            .with(SetValueCommand::new(0, 1, CellValue::from("b")));
        stack.execute_command(Box::new(group), &mut sheet).unwrap();
        assert_eq!(stack.undo_description().as_deref(), Some("Paste 2 cells"));

        stack.undo(&mut sheet).unwrap();
        assert!(sheet.get_value(0, 0).is_empty());
        assert!(sheet.get_value(0, 1).is_empty());
    }

    /// Executes fine but refuses to be undone.
    #[derive(Debug)]
    struct Stuck;

    impl Command for Stuck {
        fn execute(&mut self, _sheet: &mut Sheet) -> Result<()> {
            Ok(())
        }

        fn undo(&mut self, _sheet: &mut Sheet) -> Result<()> {
            Err(SheetError::NoMergeAt { row: 9, col: 9 })
        }

        fn description(&self) -> String {
            "Stuck".to_string()
        }
    }

    #[test]
    fn test_group_rollback_continues_past_failed_undo() {
        let mut sheet = sheet();
        let mut stack = CommandStack::new();

        let group = CommandGroup::new("Partly stuck")
            .with(SetValueCommand::new(0, 0, CellValue::from("a")))
            .with(Stuck)
            .with(Failing);
        let err = stack.execute_command(Box::new(group), &mut sheet).unwrap_err();

        // The original failure is reported, not the rollback one.
        assert!(matches!(err, SheetError::NoMergeAt { row: 0, col: 0 }));
        assert!(sheet.get_value(0, 0).is_empty());
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_group_rolls_back_on_failure() {
        let mut sheet = sheet();
        let mut stack = CommandStack::new();

        let group = CommandGroup::new("Broken")
            .with(SetValueCommand::new(0, 0, CellValue::from("a")))
            .with(Failing);
        assert!(stack.execute_command(Box::new(group), &mut sheet).is_err());
        assert!(sheet.get_value(0, 0).is_empty());
        assert!(!stack.can_undo());
    }
}
