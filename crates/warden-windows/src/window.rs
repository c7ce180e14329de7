use warden_core::{Error, Result, ShowCommand, StyleKind, WindowHandle};

use windows::Win32::Foundation::{GetLastError, HWND, SetLastError, WIN32_ERROR};
use windows::Win32::UI::WindowsAndMessaging::{
    GWL_EXSTYLE, GWL_STYLE, GetWindowLongPtrW, GetWindowThreadProcessId, SHOW_WINDOW_CMD,
    SetWindowLongPtrW, ShowWindow, WINDOW_LONG_PTR_INDEX,
};

fn hwnd(window: WindowHandle) -> HWND {
    HWND(window.raw() as *mut _)
}

fn index(kind: StyleKind) -> WINDOW_LONG_PTR_INDEX {
    match kind {
        StyleKind::Basic => GWL_STYLE,
        StyleKind::Extended => GWL_EXSTYLE,
    }
}

/// Returns the PID owning `window`, or `None` once the window is gone.
pub fn owner_pid(window: WindowHandle) -> Option<u32> {
    let mut pid = 0u32;
    // SAFETY: GetWindowThreadProcessId only reads window state and
    // returns 0 for an invalid handle.
    let thread = unsafe { GetWindowThreadProcessId(hwnd(window), Some(&mut pid)) };
    (thread != 0).then_some(pid)
}

/// Reads the basic or extended style of `window`.
///
/// A zero style is legitimate, so the last-error value is cleared before
/// the call and checked afterwards.
pub fn style(window: WindowHandle, kind: StyleKind) -> Result<u32> {
    // SAFETY: GetWindowLongPtrW reports an invalid handle through the
    // thread's last-error value.
    let value = unsafe {
        SetLastError(WIN32_ERROR(0));
        GetWindowLongPtrW(hwnd(window), index(kind))
    };
    check_last_error(window, value)?;
    Ok(value as u32)
}

/// Overwrites the basic or extended style of `window`.
pub fn set_style(window: WindowHandle, kind: StyleKind, bits: u32) -> Result<()> {
    // SAFETY: SetWindowLongPtrW returns the previous value, which may be
    // zero; failure is signalled through the last-error value.
    let previous = unsafe {
        SetLastError(WIN32_ERROR(0));
        SetWindowLongPtrW(hwnd(window), index(kind), bits as isize)
    };
    check_last_error(window, previous)
}

/// Applies a visibility command. The return value of `ShowWindow` is the
/// previous visibility, not a success flag, so there is nothing to report.
pub fn show(window: WindowHandle, command: ShowCommand) {
    // SAFETY: ShowWindow tolerates handles that have been destroyed.
    unsafe {
        let _ = ShowWindow(hwnd(window), SHOW_WINDOW_CMD(command.code()));
    }
}

fn check_last_error(window: WindowHandle, value: isize) -> Result<()> {
    if value != 0 {
        return Ok(());
    }
    // SAFETY: reads the calling thread's last-error value.
    let code = unsafe { GetLastError() };
    if code.0 == 0 {
        return Ok(());
    }
    Err(Error::WindowOperation {
        handle: window,
        message: format!("Win32 error {}", code.0),
    })
}
