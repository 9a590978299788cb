use crate::viewer::Selection;
use std::collections::VecDeque;

/// Cross-component notifications, each with exactly one semantic purpose.
///
/// Components never call each other back directly; they queue an event and
/// the driving loop (CLI or GUI shell) drains the queue after each user
/// operation. Single-threaded cooperative scheduling makes a plain deque
/// sufficient.
#[derive(Clone, Debug, PartialEq)]
pub enum AppEvent {
    /// Camera should recenter on a freshly highlighted residue.
    ZoomRequested {
        selection: Selection,
    },
    /// The heatmap must be redrawn for a new table selection.
    HeatmapRefreshRequested {
        selection_label: String,
    },
    /// The table list should scroll a newly selected key into view.
    ScrollRequested {
        table_key: String,
    },
    /// A fresh trailing excerpt of the remote job log arrived.
    LogUpdated(String),
    /// Recoverable problem the user must see (resolution miss, bad input).
    Warning(String),
    /// Failed operation (fetch failure, broken archive entry).
    Error(String),
    LoadingStarted,
    LoadingFinished,
}

/// FIFO queue of pending [`AppEvent`]s.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<AppEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: AppEvent) {
        self.events.push_back(event);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(AppEvent::Warning(message.into()));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(AppEvent::Error(message.into()));
    }

    pub fn pop(&mut self) -> Option<AppEvent> {
        self.events.pop_front()
    }

    pub fn drain(&mut self) -> Vec<AppEvent> {
        self.events.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Warnings and errors currently queued, for surfacing in one batch.
    pub fn pending_problems(&self) -> Vec<&AppEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::Warning(_) | AppEvent::Error(_)))
            .collect()
    }
}
