//! FILENAME: core/engine/src/events.rs
//! PURPOSE: Change notifications emitted by the sheet.
//! CONTEXT: Fire-and-forget signals for UI/listener layers. They carry only
//! the index or region that changed, never the moved cell contents. Undo
//! emits the inverse event (undoing an insert announces a removal).

use serde::{Deserialize, Serialize};

use crate::region::Region;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SheetEvent {
    RowInserted { index: u32, count: u32 },
    RowRemoved { index: u32, count: u32 },
    ColumnInserted { index: u32, count: u32 },
    ColumnRemoved { index: u32, count: u32 },
    MergeAdded(Region),
    MergeRemoved(Region),
}

/// Callback type for receiving sheet events.
pub type EventCallback = Box<dyn FnMut(SheetEvent)>;

/// Simple event collector for testing.
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<SheetEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: SheetEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[SheetEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Only the merge notifications, in order.
    pub fn merge_events(&self) -> Vec<&SheetEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, SheetEvent::MergeAdded(_) | SheetEvent::MergeRemoved(_)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_collector_filtering() {
        let mut collector = EventCollector::new();
        collector.push(SheetEvent::RowInserted { index: 1, count: 1 });
        collector.push(SheetEvent::MergeRemoved(Region::new(1, 1, 1, 2)));
        collector.push(SheetEvent::ColumnRemoved { index: 0, count: 2 });

        assert_eq!(collector.len(), 3);
        assert_eq!(
            collector.merge_events(),
            vec![&SheetEvent::MergeRemoved(Region::new(1, 1, 1, 2))]
        );

        collector.clear();
        assert!(collector.is_empty());
    }
}
