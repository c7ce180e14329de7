use std::fmt;

use crate::Result;

/// An opaque OS window handle.
///
/// The value is a pointer-sized integer so callers never depend on the
/// `windows` crate. The window itself is owned by the OS; a handle may
/// outlive the window it refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowHandle(pub usize);

impl WindowHandle {
    /// Returns the raw handle value.
    pub fn raw(self) -> usize {
        self.0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

/// Which of the two per-window style bitmasks an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleKind {
    /// The basic style (`GWL_STYLE`).
    Basic,
    /// The extended style (`GWL_EXSTYLE`).
    Extended,
}

/// Visibility commands understood by [`WindowSystem::show`].
///
/// The discriminants are the Win32 `SW_*` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ShowCommand {
    /// `SW_HIDE`
    Hide = 0,
    /// `SW_MINIMIZE`
    Minimize = 6,
    /// `SW_SHOWMINNOACTIVE`, used by `unhide`.
    ShowMinNoActivate = 7,
    /// `SW_SHOWNA`, used by `show`.
    ShowNoActivate = 8,
}

impl ShowCommand {
    /// Returns the raw `SW_*` code.
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Platform window API.
///
/// Each platform crate (e.g. `warden-windows`) provides its own
/// implementation. Enumeration returns a materialized list; push-style OS
/// callbacks stay inside the platform crate.
pub trait WindowSystem: Send + Sync {
    /// Returns every top-level window in OS enumeration order.
    fn top_level_windows(&self) -> Result<Vec<WindowHandle>>;

    /// Returns the PID of the process owning `window`, or `None` if the
    /// handle no longer refers to a window.
    fn owner_pid(&self, window: WindowHandle) -> Option<u32>;

    /// Reads one of the window's style bitmasks.
    fn style(&self, window: WindowHandle, kind: StyleKind) -> Result<u32>;

    /// Overwrites one of the window's style bitmasks.
    fn set_style(&self, window: WindowHandle, kind: StyleKind, bits: u32) -> Result<()>;

    /// Issues a visibility command. Stale handles are a silent no-op.
    fn show(&self, window: WindowHandle, command: ShowCommand) -> Result<()>;
}
