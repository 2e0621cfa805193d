//! Windows low-level keyboard hook implementation.
//!
//! This module installs a WH_KEYBOARD_LL hook using the Windows API. The hook
//! lives on a dedicated Win32 message-loop thread; uninstalling posts
//! `WM_QUIT` to that thread, which unhooks and exits.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use rekey_core::input::{KeyTransition, RawKeyEvent};
use tracing::{debug, error, warn};
use windows::Win32::Foundation::{HINSTANCE, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PeekMessageW, PostThreadMessageW,
    SetWindowsHookExW, UnhookWindowsHookEx, HC_ACTION, HHOOK, KBDLLHOOKSTRUCT, MSG, PM_NOREMOVE,
    WH_KEYBOARD_LL, WM_KEYDOWN, WM_KEYUP, WM_QUIT, WM_SYSKEYDOWN, WM_SYSKEYUP, WM_USER,
};

use super::{CaptureError, EventSink, HookBackend};

/// Sink used by the hook callback. Set while a backend is installed.
static ACTIVE_SINK: Mutex<Option<EventSink>> = Mutex::new(None);

/// A WH_KEYBOARD_LL hook is process-global; only one backend may hold it.
static HOOK_CLAIMED: AtomicBool = AtomicBool::new(false);

/// Windows low-level keyboard capture backend.
pub struct WindowsHookBackend {
    hook_thread: Option<HookThread>,
}

struct HookThread {
    thread_id: u32,
    handle: JoinHandle<()>,
}

impl WindowsHookBackend {
    /// Creates a new (uninstalled) backend.
    pub fn new() -> Self {
        Self { hook_thread: None }
    }

    fn release_claim() {
        *ACTIVE_SINK.lock().unwrap_or_else(PoisonError::into_inner) = None;
        HOOK_CLAIMED.store(false, Ordering::SeqCst);
    }
}

impl Default for WindowsHookBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HookBackend for WindowsHookBackend {
    fn install(&mut self, sink: EventSink) -> Result<(), CaptureError> {
        if HOOK_CLAIMED.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::AlreadyInstalled);
        }
        *ACTIVE_SINK.lock().unwrap_or_else(PoisonError::into_inner) = Some(sink);

        let (ready_tx, ready_rx) = mpsc::channel::<Result<u32, String>>();
        let handle = match thread::Builder::new()
            .name("rekey-hook-loop".to_string())
            .spawn(move || run_hook_message_loop(ready_tx))
        {
            Ok(handle) => handle,
            Err(e) => {
                Self::release_claim();
                return Err(CaptureError::HookInstallFailed(e.to_string()));
            }
        };

        // The thread reports back once SetWindowsHookExW has returned.
        let outcome = ready_rx
            .recv()
            .unwrap_or_else(|_| Err("hook thread exited before reporting".to_string()));
        match outcome {
            Ok(thread_id) => {
                debug!(thread_id, "WH_KEYBOARD_LL hook installed");
                self.hook_thread = Some(HookThread { thread_id, handle });
                Ok(())
            }
            Err(msg) => {
                let _ = handle.join();
                Self::release_claim();
                Err(CaptureError::HookInstallFailed(msg))
            }
        }
    }

    fn uninstall(&mut self) {
        let Some(hook_thread) = self.hook_thread.take() else {
            return;
        };

        // SAFETY: Posting WM_QUIT to a thread id we obtained from that thread;
        // the thread created its message queue before reporting the id.
        let posted = unsafe {
            PostThreadMessageW(hook_thread.thread_id, WM_QUIT, WPARAM(0), LPARAM(0))
        };
        match posted {
            Ok(()) => {
                if hook_thread.handle.join().is_err() {
                    error!("keyboard hook thread panicked");
                }
            }
            Err(e) => warn!("failed to stop keyboard hook thread: {e}"),
        }
        Self::release_claim();
    }
}

impl Drop for WindowsHookBackend {
    fn drop(&mut self) {
        self.uninstall();
    }
}

/// Owns an installed hook; unhooks when dropped.
struct HookGuard(HHOOK);

impl HookGuard {
    fn install() -> windows::core::Result<Self> {
        // SAFETY: GetModuleHandleW(None) returns the handle of the running
        // executable, which contains `keyboard_hook_proc`.
        let module = unsafe { GetModuleHandleW(None)? };
        // SAFETY: The hook procedure has the HOOKPROC signature and lives for
        // the whole process. The calling thread runs a message loop.
        let hook = unsafe {
            SetWindowsHookExW(
                WH_KEYBOARD_LL,
                Some(keyboard_hook_proc),
                Some(HINSTANCE::from(module)),
                0,
            )?
        };
        Ok(Self(hook))
    }
}

impl Drop for HookGuard {
    fn drop(&mut self) {
        // SAFETY: self.0 is a hook handle returned by SetWindowsHookExW that
        // has not been unhooked yet.
        if let Err(e) = unsafe { UnhookWindowsHookEx(self.0) } {
            warn!("UnhookWindowsHookEx failed: {e}");
        }
    }
}

/// Entry point for the dedicated Win32 message loop thread.
fn run_hook_message_loop(ready: mpsc::Sender<Result<u32, String>>) {
    let mut msg = MSG::default();

    // SAFETY: Plain Win32 calls on the current thread. The peek forces the
    // thread's message queue to exist so PostThreadMessageW cannot miss it.
    let thread_id = unsafe {
        let _ = PeekMessageW(&mut msg, None, WM_USER, WM_USER, PM_NOREMOVE);
        GetCurrentThreadId()
    };

    let hook = match HookGuard::install() {
        Ok(hook) => hook,
        Err(e) => {
            let _ = ready.send(Err(e.to_string()));
            return;
        }
    };
    let _ = ready.send(Ok(thread_id));

    // Win32 message loop – blocks until WM_QUIT is posted
    // SAFETY: Standard Win32 GetMessage/DispatchMessage loop pattern.
    unsafe {
        while GetMessageW(&mut msg, None, 0, 0).0 > 0 {
            DispatchMessageW(&msg);
        }
    }

    drop(hook);
}

fn transition_for(message: u32) -> Option<KeyTransition> {
    match message {
        WM_KEYDOWN => Some(KeyTransition::KeyDown),
        WM_SYSKEYDOWN => Some(KeyTransition::SysKeyDown),
        WM_KEYUP => Some(KeyTransition::KeyUp),
        WM_SYSKEYUP => Some(KeyTransition::SysKeyUp),
        _ => None,
    }
}

/// Low-level keyboard hook callback.
///
/// # Safety
///
/// This function is called by Windows from the hook message loop thread.
/// It must return quickly to avoid hook removal by the OS, and it never
/// swallows a record.
unsafe extern "system" fn keyboard_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code == HC_ACTION as i32 {
        if let Some(transition) = transition_for(w_param.0 as u32) {
            // SAFETY: l_param points to a KBDLLHOOKSTRUCT when n_code == HC_ACTION.
            let kbs = &*(l_param.0 as *const KBDLLHOOKSTRUCT);
            let raw = RawKeyEvent {
                transition,
                vk_code: kbs.vkCode,
                scan_code: kbs.scanCode as u16,
                flags: kbs.flags.0 as u8,
                time_ms: kbs.time,
            };
            // Never wait on the lock here; it is only held briefly during
            // install/uninstall.
            if let Ok(guard) = ACTIVE_SINK.try_lock() {
                if let Some(sink) = guard.as_ref() {
                    sink.submit(&raw);
                }
            }
        }
    }

    // SAFETY: Forward the event to the next hook in the chain.
    CallNextHookEx(None, n_code, w_param, l_param)
}
