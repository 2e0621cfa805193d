//! Input capture infrastructure for the diagnostic monitor.
//!
//! On Windows, this installs a low-level keyboard hook (WH_KEYBOARD_LL) on a
//! dedicated Win32 message loop thread. Each key-down record is decoded in the
//! hook callback and pushed into an unbounded channel; the observer drains
//! that channel on the interactive task.
//!
//! # Windows-Specific Implementation
//!
//! The hook callback must return quickly or Windows will remove the hook.
//! Nothing beyond decoding happens inside it, and every record is passed on
//! to the next hook in the chain.
//!
//! # Testability
//!
//! The `HookBackend` trait allows unit tests to drive [`KeyEventMonitor`]
//! with [`mock::MockHookBackend`] without requiring Windows hooks.

use rekey_core::input::{DecodedKeyEvent, RawKeyEvent};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// Error type for input capture operations.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to install keyboard hook: {0}")]
    HookInstallFailed(String),
    #[error("a keyboard hook is already installed in this process")]
    AlreadyInstalled,
    #[error("platform not supported: {0}")]
    UnsupportedPlatform(String),
}

/// Receiving half of the monitor's event channel.
pub type KeyEventReceiver = mpsc::UnboundedReceiver<DecodedKeyEvent>;

/// Sending half handed to the hook backend.
///
/// [`EventSink::submit`] never blocks: it decodes the record and queues the
/// snapshot. Records are dropped silently once the receiver is gone.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<DecodedKeyEvent>,
}

impl EventSink {
    /// Decodes `raw` and queues it; returns `true` if a snapshot was queued.
    pub fn submit(&self, raw: &RawKeyEvent) -> bool {
        match raw.decode() {
            Some(event) => self.tx.send(event).is_ok(),
            None => false,
        }
    }
}

/// Platform adapter for the system-wide keyboard listener.
///
/// The production implementation uses Windows hooks; tests use
/// [`mock::MockHookBackend`].
pub trait HookBackend: Send {
    /// Registers the listener. Records it receives go to `sink`.
    fn install(&mut self, sink: EventSink) -> Result<(), CaptureError>;
    /// Deregisters the listener and releases all OS resources.
    fn uninstall(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MonitorState {
    Inactive,
    Active,
}

/// Toggles a [`HookBackend`] on and off and owns its registration.
///
/// `start` and `stop` are idempotent. Dropping an active monitor stops it,
/// so the hook is released on every exit path.
pub struct KeyEventMonitor<B: HookBackend> {
    backend: B,
    sink: EventSink,
    state: MonitorState,
}

impl<B: HookBackend> KeyEventMonitor<B> {
    /// Creates an inactive monitor and the receiver its events arrive on.
    ///
    /// The receiver stays valid across any number of start/stop cycles.
    pub fn new(backend: B) -> (Self, KeyEventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let monitor = Self {
            backend,
            sink: EventSink { tx },
            state: MonitorState::Inactive,
        };
        (monitor, rx)
    }

    /// Installs the listener. A no-op while already active.
    ///
    /// # Errors
    ///
    /// Returns the backend's [`CaptureError`]; the monitor stays inactive.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.state == MonitorState::Active {
            debug!("keyboard monitor already active");
            return Ok(());
        }
        if let Err(e) = self.backend.install(self.sink.clone()) {
            warn!("keyboard monitor failed to start: {e}");
            return Err(e);
        }
        self.state = MonitorState::Active;
        info!("keyboard monitor started");
        Ok(())
    }

    /// Removes the listener. A no-op while inactive.
    pub fn stop(&mut self) {
        if self.state == MonitorState::Inactive {
            return;
        }
        self.backend.uninstall();
        self.state = MonitorState::Inactive;
        info!("keyboard monitor stopped");
    }

    pub fn is_active(&self) -> bool {
        self.state == MonitorState::Active
    }

    /// Access to the backend, e.g. to inspect a mock in tests.
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: HookBackend> Drop for KeyEventMonitor<B> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockHookBackend;
    use super::*;
    use rekey_core::input::KeyTransition;

    fn key_down(scan_code: u16, flags: u8) -> RawKeyEvent {
        RawKeyEvent {
            transition: KeyTransition::KeyDown,
            vk_code: 0,
            scan_code,
            flags,
            time_ms: 0,
        }
    }

    #[test]
    fn test_new_monitor_is_inactive() {
        let (monitor, _rx) = KeyEventMonitor::new(MockHookBackend::new());
        assert!(!monitor.is_active());
        assert_eq!(monitor.backend().install_count(), 0);
    }

    #[test]
    fn test_start_twice_installs_once() {
        // Arrange
        let (mut monitor, _rx) = KeyEventMonitor::new(MockHookBackend::new());

        // Act
        monitor.start().expect("first start");
        monitor.start().expect("second start is a no-op");

        // Assert
        assert!(monitor.is_active());
        assert_eq!(monitor.backend().install_count(), 1);
    }

    #[test]
    fn test_stop_while_inactive_does_not_uninstall() {
        let (mut monitor, _rx) = KeyEventMonitor::new(MockHookBackend::new());
        monitor.stop();
        assert_eq!(monitor.backend().uninstall_count(), 0);
    }

    #[test]
    fn test_stop_after_start_uninstalls_once() {
        let (mut monitor, _rx) = KeyEventMonitor::new(MockHookBackend::new());
        monitor.start().unwrap();
        monitor.stop();
        monitor.stop();
        assert!(!monitor.is_active());
        assert_eq!(monitor.backend().uninstall_count(), 1);
    }

    #[test]
    fn test_failed_install_leaves_monitor_inactive() {
        // Arrange
        let (mut monitor, _rx) = KeyEventMonitor::new(MockHookBackend::failing());

        // Act
        let result = monitor.start();

        // Assert
        assert!(matches!(result, Err(CaptureError::HookInstallFailed(_))));
        assert!(!monitor.is_active());
        monitor.stop();
        assert_eq!(monitor.backend().uninstall_count(), 0);
    }

    #[test]
    fn test_drop_uninstalls_active_monitor() {
        let backend = MockHookBackend::new();
        let counters = backend.counters();
        {
            let (mut monitor, _rx) = KeyEventMonitor::new(backend);
            monitor.start().unwrap();
        }
        assert_eq!(counters.uninstalls(), 1);
    }

    #[test]
    fn test_drop_inactive_monitor_does_not_uninstall() {
        let backend = MockHookBackend::new();
        let counters = backend.counters();
        drop(KeyEventMonitor::new(backend));
        assert_eq!(counters.uninstalls(), 0);
    }

    #[test]
    fn test_restart_reuses_the_same_receiver() {
        // Arrange
        let (mut monitor, mut rx) = KeyEventMonitor::new(MockHookBackend::new());

        // Act
        monitor.start().unwrap();
        monitor.backend().inject(key_down(0x1E, 0));
        monitor.stop();
        monitor.start().unwrap();
        monitor.backend().inject(key_down(0x1D, 0x01));

        // Assert
        assert_eq!(rx.try_recv().unwrap().scan_code, 0x001E);
        assert_eq!(rx.try_recv().unwrap().scan_code, 0xE01D);
        assert_eq!(monitor.backend().install_count(), 2);
    }

    #[test]
    fn test_sink_skips_key_up_records() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = EventSink { tx };
        let up = RawKeyEvent {
            transition: KeyTransition::KeyUp,
            ..key_down(0x1D, 0x81)
        };

        assert!(!sink.submit(&up));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_sink_does_not_block_after_receiver_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = EventSink { tx };
        drop(rx);

        assert!(!sink.submit(&key_down(0x1D, 0)));
    }
}
