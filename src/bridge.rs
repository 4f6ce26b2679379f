//! Bridge lifecycle: owns the listener's background thread and the
//! scheduler gate. An explicit owned instance — there is no ambient
//! global bridge.

use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::api;
use crate::error::BridgeError;
use crate::state::{BridgePhase, SharedState};

struct ListenerHandle {
    shutdown: oneshot::Sender<()>,
    thread: thread::JoinHandle<()>,
    addr: SocketAddr,
}

/// Start/stop state machine for the network listener. The scheduler's poll
/// loop is gated on `SharedState::is_running`, which only a successful
/// start opens and only a successful stop closes.
pub struct Bridge {
    state: Arc<SharedState>,
    listener: Mutex<Option<ListenerHandle>>,
}

impl Bridge {
    pub fn new(state: Arc<SharedState>) -> Self {
        Self {
            state,
            listener: Mutex::new(None),
        }
    }

    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    /// Open the listener and the scheduler gate. Idempotent: fails with
    /// `AlreadyRunning` unless the bridge is stopped. A setup failure
    /// reverts to `Stopped` without leaving a listener thread behind.
    /// Returns the bound address (useful with port 0).
    pub fn start(&self, addr: SocketAddr) -> Result<SocketAddr, BridgeError> {
        if !self
            .state
            .transition_phase(BridgePhase::Stopped, BridgePhase::Starting)
        {
            return Err(BridgeError::AlreadyRunning);
        }

        match self.spawn_listener(addr) {
            Ok(local) => {
                self.state.set_running(true);
                self.state.set_phase(BridgePhase::Running);
                eprintln!("[CadLink] RPC bridge listening on http://{local}");
                Ok(local)
            }
            Err(e) => {
                self.state.set_phase(BridgePhase::Stopped);
                eprintln!("[CadLink] Failed to start bridge: {e}");
                Err(e)
            }
        }
    }

    /// Bind synchronously so a failed start surfaces here, then hand the
    /// socket to a dedicated thread running a single-threaded runtime.
    fn spawn_listener(&self, addr: SocketAddr) -> Result<SocketAddr, BridgeError> {
        let std_listener = std::net::TcpListener::bind(addr)?;
        std_listener.set_nonblocking(true)?;
        let local = std_listener.local_addr()?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = api::router(self.state.clone());

        let thread = thread::Builder::new()
            .name("cadlink-listener".into())
            .spawn(move || {
                runtime.block_on(async move {
                    let listener = match tokio::net::TcpListener::from_std(std_listener) {
                        Ok(listener) => listener,
                        Err(e) => {
                            eprintln!("[CadLink] Listener setup failed: {e}");
                            return;
                        }
                    };
                    let shutdown = async move {
                        let _ = shutdown_rx.await;
                    };
                    if let Err(e) = axum::serve(listener, app)
                        .with_graceful_shutdown(shutdown)
                        .await
                    {
                        eprintln!("[CadLink] Listener error: {e}");
                    }
                });
            })
            .map_err(|e| BridgeError::Listener {
                message: e.to_string(),
            })?;

        *self.listener.lock() = Some(ListenerHandle {
            shutdown: shutdown_tx,
            thread,
            addr: local,
        });
        Ok(local)
    }

    /// Shut the listener down and close the scheduler gate. Idempotent:
    /// fails with `NotRunning` unless the bridge is running. Best-effort:
    /// a shutdown failure is logged and the bridge stays running.
    pub fn stop(&self) -> Result<(), BridgeError> {
        if !self
            .state
            .transition_phase(BridgePhase::Running, BridgePhase::Stopping)
        {
            return Err(BridgeError::NotRunning);
        }

        if let Some(handle) = self.listener.lock().take() {
            // A send failure means the server already exited; still join.
            let _ = handle.shutdown.send(());
            if handle.thread.join().is_err() {
                eprintln!("[CadLink] Listener thread panicked during shutdown");
                self.state.set_phase(BridgePhase::Running);
                return Err(BridgeError::Listener {
                    message: "listener thread panicked".to_string(),
                });
            }
        }

        self.state.set_running(false);
        self.state.set_phase(BridgePhase::Stopped);
        eprintln!("[CadLink] RPC bridge stopped");
        Ok(())
    }

    /// Mirrors the lifecycle phase for UI-style callers.
    pub fn is_active(&self) -> bool {
        self.state.phase() == BridgePhase::Running
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.lock().as_ref().map(|h| h.addr)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn loopback() -> SocketAddr {
        // Port 0: the OS picks a free port per test.
        SocketAddr::from(([127, 0, 0, 1], 0))
    }

    #[test]
    fn start_stop_cycle() {
        let bridge = Bridge::new(Arc::new(SharedState::default()));
        assert!(!bridge.is_active());

        let addr = bridge.start(loopback()).unwrap();
        assert!(addr.port() > 0);
        assert!(bridge.is_active());
        assert!(bridge.state().is_running());

        bridge.stop().unwrap();
        assert!(!bridge.is_active());
        assert!(!bridge.state().is_running());
    }

    #[test]
    fn double_start_is_rejected() {
        let bridge = Bridge::new(Arc::new(SharedState::default()));
        bridge.start(loopback()).unwrap();
        assert!(matches!(
            bridge.start(loopback()),
            Err(BridgeError::AlreadyRunning)
        ));
        bridge.stop().unwrap();
    }

    #[test]
    fn stop_when_stopped_is_rejected() {
        let bridge = Bridge::new(Arc::new(SharedState::default()));
        assert!(matches!(bridge.stop(), Err(BridgeError::NotRunning)));
    }

    #[test]
    fn bridge_is_restartable() {
        let bridge = Bridge::new(Arc::new(SharedState::default()));
        bridge.start(loopback()).unwrap();
        bridge.stop().unwrap();
        bridge.start(loopback()).unwrap();
        assert!(bridge.is_active());
        bridge.stop().unwrap();
    }

    #[test]
    fn failed_bind_reverts_to_stopped() {
        let first = Bridge::new(Arc::new(SharedState::default()));
        let addr = first.start(loopback()).unwrap();

        // Second bridge on the same port: bind fails, phase reverts.
        let second = Bridge::new(Arc::new(SharedState::default()));
        assert!(matches!(
            second.start(addr),
            Err(BridgeError::Listener { .. })
        ));
        assert!(!second.is_active());
        assert!(!second.state().is_running());
        // And it can still start on a free port afterwards.
        second.start(loopback()).unwrap();
        second.stop().unwrap();
        first.stop().unwrap();
    }
}
