//! Mock hook backend for unit testing.
//!
//! Allows tests to inject synthetic [`RawKeyEvent`]s and count registrations
//! without requiring a running Windows message loop or OS hooks.

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc, Mutex,
};

use rekey_core::input::RawKeyEvent;

use super::{CaptureError, EventSink, HookBackend};

/// Shared install/uninstall counters that outlive the backend.
#[derive(Debug, Clone, Default)]
pub struct HookCounters {
    installs: Arc<AtomicU32>,
    uninstalls: Arc<AtomicU32>,
}

impl HookCounters {
    pub fn installs(&self) -> u32 {
        self.installs.load(Ordering::SeqCst)
    }

    pub fn uninstalls(&self) -> u32 {
        self.uninstalls.load(Ordering::SeqCst)
    }
}

/// A mock implementation of [`HookBackend`] that allows tests to inject events.
pub struct MockHookBackend {
    sink: Arc<Mutex<Option<EventSink>>>,
    counters: HookCounters,
    fail_install: bool,
}

impl MockHookBackend {
    /// Creates a backend whose installs succeed.
    pub fn new() -> Self {
        Self {
            sink: Arc::new(Mutex::new(None)),
            counters: HookCounters::default(),
            fail_install: false,
        }
    }

    /// Creates a backend that refuses every install, as the OS would without
    /// sufficient privilege.
    pub fn failing() -> Self {
        Self {
            fail_install: true,
            ..Self::new()
        }
    }

    /// Injects a synthetic record, as if delivered by the OS hook.
    ///
    /// Panics if the backend is not installed.
    pub fn inject(&self, event: RawKeyEvent) -> bool {
        let guard = self.sink.lock().expect("lock poisoned");
        match guard.as_ref() {
            Some(sink) => sink.submit(&event),
            None => panic!("MockHookBackend::inject called while not installed"),
        }
    }

    /// Returns a handle that injects into this backend from another thread.
    pub fn injector(&self) -> MockInjector {
        MockInjector {
            sink: Arc::clone(&self.sink),
        }
    }

    pub fn counters(&self) -> HookCounters {
        self.counters.clone()
    }

    pub fn install_count(&self) -> u32 {
        self.counters.installs()
    }

    pub fn uninstall_count(&self) -> u32 {
        self.counters.uninstalls()
    }

    pub fn is_installed(&self) -> bool {
        self.sink.lock().expect("lock poisoned").is_some()
    }
}

impl Default for MockHookBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HookBackend for MockHookBackend {
    fn install(&mut self, sink: EventSink) -> Result<(), CaptureError> {
        if self.fail_install {
            return Err(CaptureError::HookInstallFailed(
                "mock backend configured to fail".to_string(),
            ));
        }
        self.counters.installs.fetch_add(1, Ordering::SeqCst);
        *self.sink.lock().expect("lock poisoned") = Some(sink);
        Ok(())
    }

    fn uninstall(&mut self) {
        self.counters.uninstalls.fetch_add(1, Ordering::SeqCst);
        // Drop the sink so injected records go nowhere
        *self.sink.lock().expect("lock poisoned") = None;
    }
}

/// Cloneable injection handle, standing in for the OS delivery thread.
#[derive(Clone)]
pub struct MockInjector {
    sink: Arc<Mutex<Option<EventSink>>>,
}

impl MockInjector {
    /// Injects `event` if the backend is installed; returns whether a
    /// snapshot was queued.
    pub fn inject(&self, event: RawKeyEvent) -> bool {
        let guard = self.sink.lock().expect("lock poisoned");
        guard.as_ref().is_some_and(|sink| sink.submit(&event))
    }
}
