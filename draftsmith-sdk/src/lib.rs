use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Discrete stage of the content generation pipeline, for coarse UI display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStage {
    Searching,
    Planning,
    Writing,
    Saving,
    Completed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Searching => "SEARCHING",
            PipelineStage::Planning => "PLANNING",
            PipelineStage::Writing => "WRITING",
            PipelineStage::Saving => "SAVING",
            PipelineStage::Completed => "COMPLETED",
        }
    }
}

/// Structured progress events emitted by pipeline runs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// Stage started
    StageStarted {
        stage: PipelineStage,
        message: String,
    },
    /// Stage completed
    StageCompleted {
        stage: PipelineStage,
    },
    /// Stage failed
    StageFailed {
        stage: PipelineStage,
        error: String,
    },
    /// Human-readable status line with overall 0-100 progress
    Status {
        stage: PipelineStage,
        progress: u8,
        message: String,
    },
    /// Task started (unit of work within a stage, e.g. one section)
    TaskStarted {
        task_id: String,
        description: String,
    },
    /// Task completed
    TaskCompleted {
        task_id: String,
        result: Option<String>,
    },
    /// Task failed
    TaskFailed {
        task_id: String,
        error: String,
    },
    /// A binary artifact or enrichment landed on a persisted post
    ArtifactStored {
        post_id: String,
        field: String,
        reference: String,
    },
}

/// Event envelope as delivered to subscribers: ordered and timestamped
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub sequence: u64,
    pub timestamp: DateTime<Local>,
    #[serde(flatten)]
    pub event: PipelineEvent,
}

impl ProgressUpdate {
    /// One-line rendering for console consumers
    pub fn render(&self) -> String {
        let ts = self.timestamp.format("%H:%M:%S");
        match &self.event {
            PipelineEvent::StageStarted { stage, message } => {
                format!("[{}] ▶ {} — {}", ts, stage.as_str(), message)
            }
            PipelineEvent::StageCompleted { stage } => {
                format!("[{}] ✓ {} complete", ts, stage.as_str())
            }
            PipelineEvent::StageFailed { stage, error } => {
                format!("[{}] ✗ {} failed: {}", ts, stage.as_str(), error)
            }
            PipelineEvent::Status {
                stage,
                progress,
                message,
            } => format!("[{}] {:>3}% {} — {}", ts, progress, stage.as_str(), message),
            PipelineEvent::TaskStarted {
                task_id,
                description,
            } => format!("[{}]   → {} ({})", ts, description, task_id),
            PipelineEvent::TaskCompleted { task_id, result } => match result {
                Some(r) => format!("[{}]   ✓ {}: {}", ts, task_id, r),
                None => format!("[{}]   ✓ {}", ts, task_id),
            },
            PipelineEvent::TaskFailed { task_id, error } => {
                format!("[{}]   ✗ {}: {}", ts, task_id, error)
            }
            PipelineEvent::ArtifactStored {
                post_id,
                field,
                reference,
            } => format!("[{}] ◆ post {} {} ← {}", ts, post_id, field, reference),
        }
    }
}

/// Clonable handle that pipeline code uses to publish progress.
///
/// Events are fanned out over a tokio broadcast channel; the reporter assigns
/// each event a monotonically increasing sequence number and a timestamp at
/// emit time. When no subscriber is attached events are silently dropped, so
/// the pipeline never blocks on a slow or absent UI.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    tx: broadcast::Sender<ProgressUpdate>,
    sequence: Arc<AtomicU64>,
}

impl ProgressReporter {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Subscribe to the ordered event sequence
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressUpdate> {
        self.tx.subscribe()
    }

    /// Publish an event, stamping sequence and timestamp
    pub fn emit(&self, event: PipelineEvent) {
        let update = ProgressUpdate {
            sequence: self.sequence.fetch_add(1, Ordering::SeqCst),
            timestamp: Local::now(),
            event,
        };
        // A send error just means nobody is listening
        let _ = self.tx.send(update);
    }

    pub fn stage_started(&self, stage: PipelineStage, message: impl Into<String>) {
        self.emit(PipelineEvent::StageStarted {
            stage,
            message: message.into(),
        });
    }

    pub fn stage_completed(&self, stage: PipelineStage) {
        self.emit(PipelineEvent::StageCompleted { stage });
    }

    pub fn stage_failed(&self, stage: PipelineStage, error: impl Into<String>) {
        self.emit(PipelineEvent::StageFailed {
            stage,
            error: error.into(),
        });
    }

    pub fn status(&self, stage: PipelineStage, progress: u8, message: impl Into<String>) {
        self.emit(PipelineEvent::Status {
            stage,
            progress: progress.min(100),
            message: message.into(),
        });
    }

    pub fn artifact_stored(
        &self,
        post_id: impl Into<String>,
        field: impl Into<String>,
        reference: impl Into<String>,
    ) {
        self.emit(PipelineEvent::ArtifactStored {
            post_id: post_id.into(),
            field: field.into(),
            reference: reference.into(),
        });
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Helper macros for task-level reporting

#[macro_export]
macro_rules! log_task_start {
    ($reporter:expr, $task_id:expr, $desc:expr) => {
        $reporter.emit($crate::PipelineEvent::TaskStarted {
            task_id: $task_id.to_string(),
            description: $desc.to_string(),
        });
    };
}

#[macro_export]
macro_rules! log_task_complete {
    ($reporter:expr, $task_id:expr) => {
        $reporter.emit($crate::PipelineEvent::TaskCompleted {
            task_id: $task_id.to_string(),
            result: None,
        });
    };
    ($reporter:expr, $task_id:expr, $result:expr) => {
        $reporter.emit($crate::PipelineEvent::TaskCompleted {
            task_id: $task_id.to_string(),
            result: Some($result.to_string()),
        });
    };
}

#[macro_export]
macro_rules! log_task_failed {
    ($reporter:expr, $task_id:expr, $error:expr) => {
        $reporter.emit($crate::PipelineEvent::TaskFailed {
            task_id: $task_id.to_string(),
            error: $error.to_string(),
        });
    };
}

// ============================================================================
// Console Logging Macros (for CLI consumers)
// ============================================================================

/// Logs the start of a batch of concurrent provider calls.
///
/// Outputs:
/// ```text
/// → Executing Batch 2/3 (2 sections)
/// ```
#[macro_export]
macro_rules! log_batch_start {
    ($batch_num:expr, $total_batches:expr, $num_tasks:expr) => {
        println!(
            "\x1b[36m→ Executing Batch {}/{} ({} sections)\x1b[0m",
            $batch_num, $total_batches, $num_tasks
        );
    };
}

/// Logs the completion of a batch.
#[macro_export]
macro_rules! log_batch_complete {
    ($batch_num:expr) => {
        println!("\x1b[32m✓ Batch {} complete\x1b[0m", $batch_num);
    };
}

/// Logs an informational message.
#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        println!("\x1b[36mℹ {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[36mℹ {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs a warning message.
#[macro_export]
macro_rules! log_warning {
    ($message:expr) => {
        eprintln!("\x1b[33m⚠ Warning: {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        eprintln!("\x1b[33m⚠ Warning: {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs that a file or artifact has been saved.
#[macro_export]
macro_rules! log_file_saved {
    ($path:expr) => {
        println!("\x1b[32m✓ Saved: {}\x1b[0m", $path);
    };
}
