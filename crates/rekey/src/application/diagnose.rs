//! DiagnoseUseCase: live display of the scan codes the keyboard produces.
//!
//! A [`DiagnosticSession`] owns the [`KeyEventMonitor`] and the receiving end
//! of its channel. The hook side only decodes and queues; every observer
//! callback runs on the task that awaits [`DiagnosticSession::run_until`].

use std::future::Future;

use rekey_core::DecodedKeyEvent;
use tracing::debug;

use crate::infrastructure::input_capture::{
    CaptureError, HookBackend, KeyEventMonitor, KeyEventReceiver,
};

/// Status text shown while the monitor is active and no key was pressed yet.
pub const STATUS_WAITING: &str = "diagnostic: waiting...";

/// Status text shown after the monitor is turned off.
pub const STATUS_OFF: &str = "diagnostic: off";

/// Formats one decoded key press the way the status line shows it.
pub fn status_line(event: &DecodedKeyEvent, show_flags: bool) -> String {
    format!("diagnostic: {}", event.snapshot(show_flags))
}

pub struct DiagnosticSession<B: HookBackend> {
    monitor: KeyEventMonitor<B>,
    events: KeyEventReceiver,
}

impl<B: HookBackend> DiagnosticSession<B> {
    pub fn new(backend: B) -> Self {
        let (monitor, events) = KeyEventMonitor::new(backend);
        Self { monitor, events }
    }

    /// Turns the monitor on if it is off and off if it is on.
    ///
    /// Returns the new status text.
    ///
    /// # Errors
    ///
    /// Returns the [`CaptureError`] from a failed start; the session stays off.
    pub fn toggle(&mut self) -> Result<&'static str, CaptureError> {
        if self.monitor.is_active() {
            self.monitor.stop();
            Ok(STATUS_OFF)
        } else {
            self.monitor.start()?;
            Ok(STATUS_WAITING)
        }
    }

    pub fn is_active(&self) -> bool {
        self.monitor.is_active()
    }

    pub fn monitor(&self) -> &KeyEventMonitor<B> {
        &self.monitor
    }

    /// Hands each decoded key press to `observer` until `shutdown` resolves.
    ///
    /// Events already queued are delivered before shutdown is honoured.
    /// Returns the number of events delivered.
    pub async fn run_until<F, O>(&mut self, shutdown: F, mut observer: O) -> usize
    where
        F: Future<Output = ()>,
        O: FnMut(DecodedKeyEvent),
    {
        tokio::pin!(shutdown);
        let mut delivered = 0;
        loop {
            tokio::select! {
                biased;
                event = self.events.recv() => match event {
                    Some(event) => {
                        observer(event);
                        delivered += 1;
                    }
                    None => break,
                },
                _ = &mut shutdown => break,
            }
        }
        debug!(delivered, "diagnostic session finished");
        delivered
    }
}
