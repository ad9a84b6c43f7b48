//! Conversion progress reporting.

use std::path::PathBuf;

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::FileStage;

/// A progress notification from the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Work on an input began.
    FileStarted {
        /// Input file
        path: PathBuf,
        /// Pages to process, when known
        pages: Option<u32>,
    },

    /// Percentage of the current file's pages done, 0 to 100.
    Progress {
        /// Input file
        path: PathBuf,
        /// Completion percentage
        percent: f32,
    },

    /// An input reached a terminal stage.
    FileFinished {
        /// Input file
        path: PathBuf,
        /// Final stage
        stage: FileStage,
    },
}

impl ProgressEvent {
    /// The input the event refers to.
    pub fn path(&self) -> &PathBuf {
        match self {
            ProgressEvent::FileStarted { path, .. }
            | ProgressEvent::Progress { path, .. }
            | ProgressEvent::FileFinished { path, .. } => path,
        }
    }
}

/// Receives progress events. Shared by all workers of a batch.
pub trait ProgressSink: Send + Sync {
    /// Handle one event.
    fn report(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn report(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Forwards events to a single consumer over a channel.
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    tx: Sender<ProgressEvent>,
}

impl ChannelProgress {
    /// Create a sink and the receiver that drains it.
    pub fn channel() -> (Self, Receiver<ProgressEvent>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelProgress {
    fn report(&self, event: ProgressEvent) {
        // consumer gone: nothing left to inform
        let _ = self.tx.send(event);
    }
}
