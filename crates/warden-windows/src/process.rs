use std::mem::size_of;

use tracing::debug;
use warden_core::{Error, ProcessEntry, Result};

use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, PROCESSENTRY32W, Process32FirstW, Process32NextW, TH32CS_SNAPPROCESS,
};
use windows::Win32::System::ProcessStatus::{K32GetProcessMemoryInfo, PROCESS_MEMORY_COUNTERS};
use windows::Win32::System::Threading::{
    OpenProcess, PROCESS_ACCESS_RIGHTS, PROCESS_QUERY_LIMITED_INFORMATION, PROCESS_TERMINATE,
    TerminateProcess,
};

/// Exit code handed to processes killed by `kill`.
const KILLED_EXIT_CODE: u32 = 1;

/// Closes the wrapped handle when dropped.
struct OwnedHandle(HANDLE);

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        // SAFETY: the handle was returned by a successful Open/Create call
        // and is closed exactly once.
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

fn open(pid: u32, access: PROCESS_ACCESS_RIGHTS) -> windows::core::Result<OwnedHandle> {
    // SAFETY: OpenProcess either returns a fresh handle or an error.
    unsafe { OpenProcess(access, false, pid) }.map(OwnedHandle)
}

/// Takes a snapshot of every running process with its image name.
pub fn snapshot() -> Result<Vec<ProcessEntry>> {
    let query_err = |e: windows::core::Error| Error::QueryFailure(format!("process snapshot: {e}"));

    // SAFETY: the snapshot handle is owned and closed by OwnedHandle.
    let snapshot = OwnedHandle(
        unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) }.map_err(query_err)?,
    );

    let mut entry = PROCESSENTRY32W {
        dwSize: size_of::<PROCESSENTRY32W>() as u32,
        ..Default::default()
    };
    let mut processes = Vec::new();

    // SAFETY: entry.dwSize is initialised as both calls require, and the
    // snapshot handle stays open for the whole walk.
    unsafe { Process32FirstW(snapshot.0, &mut entry) }.map_err(query_err)?;
    loop {
        processes.push(ProcessEntry {
            pid: entry.th32ProcessID,
            name: image_name(&entry.szExeFile),
        });
        // SAFETY: see above. The walk ends with ERROR_NO_MORE_FILES.
        if unsafe { Process32NextW(snapshot.0, &mut entry) }.is_err() {
            break;
        }
    }

    Ok(processes)
}

fn image_name(raw: &[u16]) -> String {
    let len = raw.iter().position(|&c| c == 0).unwrap_or(raw.len());
    String::from_utf16_lossy(&raw[..len])
}

/// Returns the working-set size of `pid` in bytes.
pub fn working_set(pid: u32) -> Result<u64> {
    let process = open(pid, PROCESS_QUERY_LIMITED_INFORMATION)
        .map_err(|e| Error::QueryFailure(format!("open process {pid}: {e}")))?;

    let mut counters = PROCESS_MEMORY_COUNTERS::default();
    let size = size_of::<PROCESS_MEMORY_COUNTERS>() as u32;
    // SAFETY: counters is a properly sized, writable PROCESS_MEMORY_COUNTERS.
    let ok = unsafe { K32GetProcessMemoryInfo(process.0, &mut counters, size) };
    if !ok.as_bool() {
        return Err(Error::QueryFailure(format!(
            "memory info for process {pid} unavailable"
        )));
    }

    Ok(counters.WorkingSetSize as u64)
}

/// Terminates `pid`.
pub fn terminate(pid: u32) -> Result<()> {
    let terminate_err = |e: windows::core::Error| Error::Terminate {
        pid,
        message: e.message(),
    };

    let process = open(pid, PROCESS_TERMINATE).map_err(terminate_err)?;
    // SAFETY: the handle was opened with PROCESS_TERMINATE.
    unsafe { TerminateProcess(process.0, KILLED_EXIT_CODE) }.map_err(terminate_err)?;

    debug!(pid, "process terminated");
    Ok(())
}
