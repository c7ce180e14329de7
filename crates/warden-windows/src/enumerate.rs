use warden_core::{Error, Result, WindowHandle};

use windows::Win32::Foundation::{HWND, LPARAM};
use windows::Win32::UI::WindowsAndMessaging::EnumWindows;
use windows::core::BOOL;

/// Lists every top-level window, visible or not.
///
/// Hidden windows must be included: they are what `show` and `unhide`
/// act on.
pub fn top_level_windows() -> Result<Vec<WindowHandle>> {
    let mut windows: Vec<WindowHandle> = Vec::new();

    // SAFETY: EnumWindows runs synchronously, so the Vec passed through
    // LPARAM outlives every callback invocation.
    unsafe {
        EnumWindows(Some(collect), LPARAM(&mut windows as *mut _ as isize))
            .map_err(|e| Error::QueryFailure(format!("EnumWindows: {e}")))?;
    }

    Ok(windows)
}

unsafe extern "system" fn collect(hwnd: HWND, lparam: LPARAM) -> BOOL {
    // SAFETY: lparam is the Vec pointer from top_level_windows().
    let windows = unsafe { &mut *(lparam.0 as *mut Vec<WindowHandle>) };
    windows.push(WindowHandle(hwnd.0 as usize));
    BOOL(1)
}
