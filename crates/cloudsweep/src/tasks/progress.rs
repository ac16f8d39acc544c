//! Progress reporting for deletion tasks
//!
//! Tasks report through [`TaskReporter`] so the same executor drives the
//! interactive spinners (via a channel) and plain log output.

use tokio::sync::mpsc;
use tracing::{error, info};

/// Event emitted while a deletion task runs
///
/// Every task emits `Started`, any number of `Progress` events, then
/// exactly one of `Completed` or `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    Started {
        task: usize,
        title: String,
        total: usize,
    },
    Progress {
        task: usize,
        message: String,
    },
    Completed {
        task: usize,
        message: String,
    },
    Failed {
        task: usize,
        error: String,
    },
}

impl TaskEvent {
    /// Index of the task the event belongs to
    pub fn task(&self) -> usize {
        match self {
            TaskEvent::Started { task, .. }
            | TaskEvent::Progress { task, .. }
            | TaskEvent::Completed { task, .. }
            | TaskEvent::Failed { task, .. } => *task,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskEvent::Completed { .. } | TaskEvent::Failed { .. })
    }
}

/// Trait for reporting deletion progress
pub trait TaskReporter: Send + Sync {
    /// A task is about to process `total` items
    fn started(&self, task: usize, title: &str, total: usize);

    /// A sub-step of the task happened
    fn progress(&self, task: usize, message: String);

    /// The task finished all its items
    fn completed(&self, task: usize, message: String);

    /// The task stopped on an error
    fn failed(&self, task: usize, error: String);
}

/// Progress reporter that sends events to the renderer channel
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<TaskEvent>,
}

impl ChannelReporter {
    pub fn new(tx: mpsc::UnboundedSender<TaskEvent>) -> Self {
        Self { tx }
    }

    /// Create a reporter and the receiving end of its channel
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TaskEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Send an event, ignoring errors (renderer may be gone)
    fn send(&self, event: TaskEvent) {
        let _ = self.tx.send(event);
    }
}

impl TaskReporter for ChannelReporter {
    fn started(&self, task: usize, title: &str, total: usize) {
        self.send(TaskEvent::Started {
            task,
            title: title.to_string(),
            total,
        });
    }

    fn progress(&self, task: usize, message: String) {
        self.send(TaskEvent::Progress { task, message });
    }

    fn completed(&self, task: usize, message: String) {
        self.send(TaskEvent::Completed { task, message });
    }

    fn failed(&self, task: usize, error: String) {
        self.send(TaskEvent::Failed { task, error });
    }
}

/// Progress reporter that logs through tracing (for `--plain`)
#[derive(Default)]
pub struct LogReporter;

impl LogReporter {
    pub fn new() -> Self {
        Self
    }
}

impl TaskReporter for LogReporter {
    fn started(&self, task: usize, title: &str, total: usize) {
        info!(task, total, "{title}");
    }

    fn progress(&self, task: usize, message: String) {
        info!(task, "{message}");
    }

    fn completed(&self, task: usize, message: String) {
        info!(task, "{message}");
    }

    fn failed(&self, task: usize, error: String) {
        error!(task, "{error}");
    }
}
