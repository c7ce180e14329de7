use std::sync::Arc;

use tracing::debug;

use crate::Result;
use crate::window::{WindowHandle, WindowSystem};

/// One row of the OS process table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    /// Image name as reported by the OS (e.g. `notepad.exe`).
    pub name: String,
}

/// A process together with its working set, produced once per query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessSample {
    pub pid: u32,
    pub working_set_bytes: u64,
}

/// Platform process API.
pub trait ProcessTable: Send + Sync {
    /// Returns the live process table.
    fn snapshot(&self) -> Result<Vec<ProcessEntry>>;

    /// Returns the resident working set of a process in bytes.
    fn working_set(&self, pid: u32) -> Result<u64>;

    /// Terminates a process without asking it to shut down.
    fn terminate(&self, pid: u32) -> Result<()>;
}

/// Canonical form of a process name: trimmed, lowercase, without `.exe`.
pub fn canonical_name(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    match lower.strip_suffix(".exe") {
        Some(stem) => stem.to_string(),
        None => lower,
    }
}

/// Returns whether an OS image name matches a user-supplied process name.
///
/// Comparison is case-insensitive and the `.exe` suffix is optional on
/// either side, so `notepad`, `Notepad.EXE` and `notepad.exe` are equal.
pub fn name_matches(image: &str, query: &str) -> bool {
    let query = canonical_name(query);
    !query.is_empty() && canonical_name(image) == query
}

/// Resolves process names to PIDs, memory figures and windows.
///
/// Nothing is cached: every call walks the live process table (and, for
/// window lookups, the live window list) from scratch.
pub struct ProcessDirectory {
    processes: Arc<dyn ProcessTable>,
    windows: Arc<dyn WindowSystem>,
}

impl ProcessDirectory {
    pub fn new(processes: Arc<dyn ProcessTable>, windows: Arc<dyn WindowSystem>) -> Self {
        Self { processes, windows }
    }

    /// Returns the PIDs of every process named `name`, in table order.
    pub fn enumerate(&self, name: &str) -> Result<Vec<u32>> {
        Ok(self
            .processes
            .snapshot()?
            .into_iter()
            .filter(|p| name_matches(&p.name, name))
            .map(|p| p.pid)
            .collect())
    }

    /// Returns every process named `name` with its working set.
    ///
    /// Processes whose counters cannot be read (typically access denied)
    /// are left out rather than reported with a bogus zero.
    pub fn find_processes(&self, name: &str) -> Result<Vec<ProcessSample>> {
        let mut samples = Vec::new();
        for pid in self.enumerate(name)? {
            match self.processes.working_set(pid) {
                Ok(working_set_bytes) => samples.push(ProcessSample {
                    pid,
                    working_set_bytes,
                }),
                Err(e) => debug!(pid, "skipping unreadable process: {e}"),
            }
        }
        Ok(samples)
    }

    /// Returns every top-level window owned by a process named `name`.
    ///
    /// Two stages: name to PIDs, then all windows filtered by owning PID.
    /// The result keeps the OS enumeration order.
    pub fn list_window_handles(&self, name: &str) -> Result<Vec<WindowHandle>> {
        let pids = self.enumerate(name)?;
        if pids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .windows
            .top_level_windows()?
            .into_iter()
            .filter(|&w| self.windows.owner_pid(w).is_some_and(|pid| pids.contains(&pid)))
            .collect())
    }

    /// Returns the PID owning `window`.
    pub fn window_owner(&self, window: WindowHandle) -> Option<u32> {
        self.windows.owner_pid(window)
    }

    pub(crate) fn processes(&self) -> &dyn ProcessTable {
        self.processes.as_ref()
    }

    pub(crate) fn windows(&self) -> &dyn WindowSystem {
        self.windows.as_ref()
    }
}
