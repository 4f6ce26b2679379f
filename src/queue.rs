//! The thread-safe handoff between the listener thread and the owning
//! thread. A pure synchronization primitive: no dispatch logic lives here.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::command::BridgeCommand;

/// Unbounded FIFO of pending commands. One listener thread enqueues while
/// the owning thread drains; neither side needs external locking.
#[derive(Debug, Default)]
pub struct CommandQueue {
    inner: Mutex<VecDeque<BridgeCommand>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command. Never blocks beyond the internal lock and never
    /// fails; the queue is unbounded.
    pub fn enqueue(&self, command: BridgeCommand) {
        self.inner.lock().push_back(command);
    }

    /// Remove and return every command present at the instant of the call,
    /// in FIFO order. Returns an empty batch immediately when the queue is
    /// empty.
    pub fn drain_all(&self) -> Vec<BridgeCommand> {
        let mut guard = self.inner.lock();
        guard.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
