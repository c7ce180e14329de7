#![cfg(windows)]

/// Win32 top-level window enumeration.
pub mod enumerate;

/// Operator popups via `MessageBoxW`.
pub mod notify;

/// Process snapshot, working-set queries and termination.
pub mod process;

/// Per-window operations on a raw `HWND`.
pub mod window;

use warden_core::{
    ProcessEntry, ProcessTable, Result, ShowCommand, StyleKind, WindowHandle, WindowSystem,
};

pub use notify::MessageBoxNotifier;

/// The live Win32 process table and window system.
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32Platform;

impl ProcessTable for Win32Platform {
    fn snapshot(&self) -> Result<Vec<ProcessEntry>> {
        process::snapshot()
    }

    fn working_set(&self, pid: u32) -> Result<u64> {
        process::working_set(pid)
    }

    fn terminate(&self, pid: u32) -> Result<()> {
        process::terminate(pid)
    }
}

impl WindowSystem for Win32Platform {
    fn top_level_windows(&self) -> Result<Vec<WindowHandle>> {
        enumerate::top_level_windows()
    }

    fn owner_pid(&self, window: WindowHandle) -> Option<u32> {
        window::owner_pid(window)
    }

    fn style(&self, window: WindowHandle, kind: StyleKind) -> Result<u32> {
        window::style(window, kind)
    }

    fn set_style(&self, window: WindowHandle, kind: StyleKind, bits: u32) -> Result<()> {
        window::set_style(window, kind, bits)
    }

    fn show(&self, window: WindowHandle, command: ShowCommand) -> Result<()> {
        window::show(window, command);
        Ok(())
    }
}
