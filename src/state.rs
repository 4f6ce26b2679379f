use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde::Serialize;

use crate::error::BridgeError;
use crate::model::Workspace;
use crate::queue::CommandQueue;

// ── Bridge lifecycle phase ─────────────────────────────────────────

/// The bridge's lifecycle state machine:
/// `Stopped → Starting → Running → Stopping → Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BridgePhase {
    Stopped,
    Starting,
    Running,
    Stopping,
}

// ── Command outcome records ────────────────────────────────────────

/// Retained outcome of one executed command. The remote caller only ever
/// saw "queued"; these records are the host-side diagnostic trail.
#[derive(Debug, Clone, Serialize)]
pub struct CommandRecord {
    pub description: String,
    pub status: &'static str,
    pub message: String,
}

impl CommandRecord {
    pub fn success(description: String, message: String) -> Self {
        Self {
            description,
            status: "success",
            message,
        }
    }

    pub fn failure(description: String, error: &BridgeError) -> Self {
        Self {
            description,
            status: "error",
            message: error.to_string(),
        }
    }
}

/// How many command records are retained.
const RECORD_CAPACITY: usize = 128;

// ── Shared state ───────────────────────────────────────────────────

/// State shared between the listener thread and the owning thread.
///
/// The queue is the mutation handoff; the model mutex is locked by the
/// listener only for read-only queries, per the host's own access model.
pub struct SharedState {
    pub model: Mutex<Workspace>,
    pub queue: CommandQueue,
    /// Scheduler gate. Opened by a successful start, closed by a
    /// successful stop; the poll loop exits when this reads false.
    running: AtomicBool,
    phase: Mutex<BridgePhase>,
    records: Mutex<VecDeque<CommandRecord>>,
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new(Workspace::new())
    }
}

impl SharedState {
    pub fn new(model: Workspace) -> Self {
        Self {
            model: Mutex::new(model),
            queue: CommandQueue::new(),
            running: AtomicBool::new(false),
            phase: Mutex::new(BridgePhase::Stopped),
            records: Mutex::new(VecDeque::with_capacity(RECORD_CAPACITY)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    pub fn phase(&self) -> BridgePhase {
        *self.phase.lock()
    }

    pub fn set_phase(&self, phase: BridgePhase) {
        *self.phase.lock() = phase;
    }

    /// Atomically move `from → to`. Returns false (and leaves the phase
    /// untouched) when the current phase is not `from`; this is what makes
    /// start/stop idempotent under concurrent callers.
    pub fn transition_phase(&self, from: BridgePhase, to: BridgePhase) -> bool {
        let mut phase = self.phase.lock();
        if *phase == from {
            *phase = to;
            true
        } else {
            false
        }
    }

    /// Append to the bounded outcome ring; the oldest record is dropped at
    /// capacity.
    pub fn push_record(&self, record: CommandRecord) {
        let mut records = self.records.lock();
        if records.len() == RECORD_CAPACITY {
            records.pop_front();
        }
        records.push_back(record);
    }

    pub fn recent_records(&self) -> Vec<CommandRecord> {
        self.records.lock().iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_starts_stopped() {
        let state = SharedState::default();
        assert_eq!(state.phase(), BridgePhase::Stopped);
        assert!(!state.is_running());
    }

    #[test]
    fn record_ring_is_bounded() {
        let state = SharedState::default();
        for i in 0..(RECORD_CAPACITY + 10) {
            state.push_record(CommandRecord::success(format!("cmd{i}"), String::new()));
        }
        let records = state.recent_records();
        assert_eq!(records.len(), RECORD_CAPACITY);
        // Oldest entries were dropped.
        assert_eq!(records.first().map(|r| r.description.as_str()), Some("cmd10"));
    }
}
