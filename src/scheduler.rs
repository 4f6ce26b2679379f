//! The cooperative poller. Runs on the owning thread only: each tick
//! drains the queue and executes the batch serially, then sleeps a fixed
//! short interval. The listener thread never touches the model through
//! this path.

use std::sync::Arc;
use std::time::Duration;

use crate::state::{CommandRecord, SharedState};

/// Default tick interval, mirroring the original 10 ms poll cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

pub struct Scheduler {
    state: Arc<SharedState>,
    interval: Duration,
}

impl Scheduler {
    pub fn new(state: Arc<SharedState>, interval: Duration) -> Self {
        Self { state, interval }
    }

    /// Drain and execute every command currently queued. One failing
    /// command is reported and recorded but never aborts its batch
    /// siblings. Returns the batch size.
    pub fn poll_once(&self) -> usize {
        let batch = self.state.queue.drain_all();
        if batch.is_empty() {
            return 0;
        }
        let count = batch.len();
        let mut model = self.state.model.lock();
        for command in batch {
            let description = command.describe();
            match command.execute(&mut model) {
                Ok(outcome) => {
                    eprintln!("[CadLink] {}", outcome.message);
                    self.state
                        .push_record(CommandRecord::success(description, outcome.message));
                }
                Err(e) => {
                    eprintln!("[CadLink] Error in {description}: {e}");
                    self.state.push_record(CommandRecord::failure(description, &e));
                }
            }
        }
        count
    }

    /// The poll loop. Ticks until the bridge's running gate drops; a
    /// closed gate is the only termination condition — an in-flight tick
    /// always finishes.
    pub fn run(&self) {
        while self.state.is_running() {
            self.poll_once();
            std::thread::sleep(self.interval);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::command::BridgeCommand;
    use serde_json::json;

    fn scheduler() -> (Arc<SharedState>, Scheduler) {
        let state = Arc::new(SharedState::default());
        let sched = Scheduler::new(state.clone(), Duration::from_millis(1));
        (state, sched)
    }

    #[test]
    fn empty_queue_polls_to_zero() {
        let (_state, sched) = scheduler();
        assert_eq!(sched.poll_once(), 0);
    }

    #[test]
    fn batch_executes_in_order() {
        let (state, sched) = scheduler();
        state.queue.enqueue(BridgeCommand::NewDocument { name: "D".into() });
        state.queue.enqueue(BridgeCommand::NewObject {
            document: "D".into(),
            object: "B".into(),
            object_type: "Part::Box".into(),
            properties: match json!({"Length": 20, "Width": 15, "Height": 10}) {
                serde_json::Value::Object(map) => map,
                _ => serde_json::Map::new(),
            },
        });
        state.queue.enqueue(BridgeCommand::DeleteObject {
            document: "D".into(),
            object: "B".into(),
        });
        assert_eq!(sched.poll_once(), 3);

        let model = state.model.lock();
        let doc = model.get_document("D").unwrap();
        assert!(doc.get_object("B").is_none());
    }

    #[test]
    fn failing_command_does_not_abort_siblings() {
        let (state, sched) = scheduler();
        state.queue.enqueue(BridgeCommand::NewDocument { name: "D".into() });
        // References a document that does not exist: fails at execution.
        state.queue.enqueue(BridgeCommand::DeleteObject {
            document: "Ghost".into(),
            object: "X".into(),
        });
        state.queue.enqueue(BridgeCommand::NewObject {
            document: "D".into(),
            object: "B".into(),
            object_type: "Part::Box".into(),
            properties: serde_json::Map::new(),
        });
        sched.poll_once();

        let model = state.model.lock();
        assert!(model.get_document("D").unwrap().get_object("B").is_some());
        drop(model);

        let records = state.recent_records();
        assert_eq!(records.len(), 3);
        let failed: Vec<_> = records.iter().filter(|r| r.status == "error").collect();
        assert_eq!(failed.len(), 1);
        assert!(failed.first().unwrap().description.contains("Ghost"));
    }

    #[test]
    fn run_exits_when_gate_closed() {
        let (state, sched) = scheduler();
        // Gate was never opened: the loop must return immediately.
        sched.run();
        assert!(!state.is_running());
    }

    #[test]
    fn run_drains_then_stops() {
        let (state, sched) = scheduler();
        state.set_running(true);
        state.queue.enqueue(BridgeCommand::NewDocument { name: "D".into() });

        std::thread::scope(|scope| {
            let state = &state;
            scope.spawn(move || {
                // Let a few ticks pass, then close the gate from outside.
                std::thread::sleep(Duration::from_millis(20));
                state.set_running(false);
            });
            sched.run();
        });

        let model = state.model.lock();
        assert!(model.get_document("D").is_some());
    }

    #[test]
    fn outcome_records_carry_messages() {
        let (state, sched) = scheduler();
        state.queue.enqueue(BridgeCommand::RunScript {
            source: "new_document D\nset D Ghost Length 1".into(),
        });
        sched.poll_once();
        let records = state.recent_records();
        assert_eq!(records.first().map(|r| r.status), Some("error"));
        assert!(records.first().unwrap().message.contains("line 2"));
    }

    #[test]
    fn partial_script_state_survives_failure() {
        let (state, sched) = scheduler();
        state.queue.enqueue(BridgeCommand::RunScript {
            source: "new_document D\nbogus".into(),
        });
        sched.poll_once();
        // The failed script still created the document before its bad line.
        assert!(state.model.lock().get_document("D").is_some());
    }
}
