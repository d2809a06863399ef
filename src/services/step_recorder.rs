// Step Recorder
// Optional sinks for pipeline step records; failures never reach the pipeline

use crate::models::StepRecord;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Sink for pipeline step records.
///
/// Implementations must absorb their own failures: `record` has no error channel.
pub trait StepRecorder: Send + Sync {
    fn record(&self, step: StepRecord);
}

/// Per-run step log: owns the monotonic step sequence and stamps each record
/// with the run's trace id before handing it to the recorder.
pub struct StepLog<'a> {
    recorder: &'a dyn StepRecorder,
    trace_id: &'a str,
    next_order: u32,
}

impl<'a> StepLog<'a> {
    pub fn new(recorder: &'a dyn StepRecorder, trace_id: &'a str) -> Self {
        Self {
            recorder,
            trace_id,
            next_order: 1,
        }
    }

    pub fn trace_id(&self) -> &str {
        self.trace_id
    }

    /// Number of steps recorded so far.
    pub fn recorded(&self) -> u32 {
        self.next_order - 1
    }

    pub fn record(&mut self, step_name: &str, success: bool, detail: serde_json::Value) {
        let step = StepRecord {
            trace_id: self.trace_id.to_string(),
            step_order: self.next_order,
            step_name: step_name.to_string(),
            success,
            detail,
            recorded_at: chrono::Utc::now(),
        };
        self.next_order += 1;
        self.recorder.record(step);
    }
}

/// Drops every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRecorder;

impl StepRecorder for NoopRecorder {
    fn record(&self, _step: StepRecord) {}
}

/// Keeps records in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    steps: Mutex<Vec<StepRecord>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> Vec<StepRecord> {
        match self.steps.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl StepRecorder for MemoryRecorder {
    fn record(&self, step: StepRecord) {
        match self.steps.lock() {
            Ok(mut guard) => guard.push(step),
            Err(poisoned) => poisoned.into_inner().push(step),
        }
    }
}

/// Fire-and-forget recorder: records are sent over an unbounded channel and
/// consumed by a background task. A closed channel is logged and ignored.
#[derive(Debug, Clone)]
pub struct ChannelRecorder {
    tx: mpsc::UnboundedSender<StepRecord>,
}

impl ChannelRecorder {
    pub fn new(tx: mpsc::UnboundedSender<StepRecord>) -> Self {
        Self { tx }
    }

    /// Spawn a drain task that logs every record and hands it to `on_step`.
    /// The task ends once every recorder clone is dropped.
    pub fn spawn<F>(mut on_step: F) -> (Self, JoinHandle<usize>)
    where
        F: FnMut(&StepRecord) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<StepRecord>();
        let handle = tokio::spawn(async move {
            let mut drained = 0usize;
            while let Some(step) = rx.recv().await {
                info!(
                    trace_id = %step.trace_id,
                    step_order = step.step_order,
                    step_name = %step.step_name,
                    success = step.success,
                    "[STEP] {}",
                    if step.success { "completed" } else { "failed" }
                );
                on_step(&step);
                drained += 1;
            }
            drained
        });
        (Self { tx }, handle)
    }
}

impl StepRecorder for ChannelRecorder {
    fn record(&self, step: StepRecord) {
        if let Err(e) = self.tx.send(step) {
            warn!(step_name = %e.0.step_name, "[STEP] recorder channel closed, dropping step");
        }
    }
}
