//! In-memory platform used by the unit tests.

use std::sync::{Arc, Mutex};

use crate::process::{ProcessDirectory, ProcessEntry, ProcessTable};
use crate::style::WS_VISIBLE;
use crate::window::{ShowCommand, StyleKind, WindowHandle, WindowSystem};
use crate::{Error, Result};

const WS_MINIMIZE: u32 = 0x2000_0000;

#[derive(Default)]
struct FakeProcess {
    pid: u32,
    name: String,
    working_set: u64,
    denied: bool,
}

#[derive(Clone, Copy)]
struct FakeWindow {
    handle: WindowHandle,
    pid: u32,
    style: u32,
    ex_style: u32,
}

#[derive(Default)]
struct State {
    processes: Vec<FakeProcess>,
    windows: Vec<FakeWindow>,
    terminated: Vec<u32>,
    fail_queries: bool,
}

#[derive(Clone, Default)]
pub struct FakePlatform {
    state: Arc<Mutex<State>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn directory(&self) -> ProcessDirectory {
        ProcessDirectory::new(Arc::new(self.clone()), Arc::new(self.clone()))
    }

    pub fn add_process(&self, pid: u32, name: &str, working_set: u64) {
        self.state.lock().unwrap().processes.push(FakeProcess {
            pid,
            name: name.into(),
            working_set,
            denied: false,
        });
    }

    pub fn set_working_set(&self, pid: u32, working_set: u64) {
        let mut state = self.state.lock().unwrap();
        if let Some(p) = state.processes.iter_mut().find(|p| p.pid == pid) {
            p.working_set = working_set;
        }
    }

    pub fn deny_memory(&self, pid: u32) {
        let mut state = self.state.lock().unwrap();
        if let Some(p) = state.processes.iter_mut().find(|p| p.pid == pid) {
            p.denied = true;
        }
    }

    pub fn fail_queries(&self, fail: bool) {
        self.state.lock().unwrap().fail_queries = fail;
    }

    pub fn add_window(&self, handle: usize, pid: u32, style: u32) {
        self.state.lock().unwrap().windows.push(FakeWindow {
            handle: WindowHandle(handle),
            pid,
            style,
            ex_style: 0,
        });
    }

    pub fn close_window(&self, handle: usize) {
        self.state
            .lock()
            .unwrap()
            .windows
            .retain(|w| w.handle != WindowHandle(handle));
    }

    pub fn style_of(&self, handle: usize) -> u32 {
        self.with_window(WindowHandle(handle), |w| w.style)
            .expect("unknown fake window")
    }

    pub fn is_visible(&self, handle: usize) -> bool {
        self.style_of(handle) & WS_VISIBLE != 0
    }

    /// Makes a window visible behind the registry's back.
    pub fn reveal(&self, handle: usize) {
        self.with_window(WindowHandle(handle), |w| w.style |= WS_VISIBLE);
    }

    pub fn terminated(&self) -> Vec<u32> {
        self.state.lock().unwrap().terminated.clone()
    }

    fn with_window<T>(
        &self,
        handle: WindowHandle,
        f: impl FnOnce(&mut FakeWindow) -> T,
    ) -> Option<T> {
        let mut state = self.state.lock().unwrap();
        state.windows.iter_mut().find(|w| w.handle == handle).map(f)
    }
}

impl ProcessTable for FakePlatform {
    fn snapshot(&self) -> Result<Vec<ProcessEntry>> {
        let state = self.state.lock().unwrap();
        if state.fail_queries {
            return Err(Error::QueryFailure("snapshot unavailable".into()));
        }
        Ok(state
            .processes
            .iter()
            .map(|p| ProcessEntry {
                pid: p.pid,
                name: p.name.clone(),
            })
            .collect())
    }

    fn working_set(&self, pid: u32) -> Result<u64> {
        let state = self.state.lock().unwrap();
        match state.processes.iter().find(|p| p.pid == pid) {
            Some(p) if !p.denied => Ok(p.working_set),
            _ => Err(Error::QueryFailure(format!("access denied for {pid}"))),
        }
    }

    fn terminate(&self, pid: u32) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let before = state.processes.len();
        state.processes.retain(|p| p.pid != pid);
        if state.processes.len() == before {
            return Err(Error::Terminate {
                pid,
                message: "no such process".into(),
            });
        }
        state.terminated.push(pid);
        Ok(())
    }
}

impl WindowSystem for FakePlatform {
    fn top_level_windows(&self) -> Result<Vec<WindowHandle>> {
        let state = self.state.lock().unwrap();
        if state.fail_queries {
            return Err(Error::QueryFailure("window list unavailable".into()));
        }
        Ok(state.windows.iter().map(|w| w.handle).collect())
    }

    fn owner_pid(&self, window: WindowHandle) -> Option<u32> {
        self.with_window(window, |w| w.pid)
    }

    fn style(&self, window: WindowHandle, kind: StyleKind) -> Result<u32> {
        self.with_window(window, |w| match kind {
            StyleKind::Basic => w.style,
            StyleKind::Extended => w.ex_style,
        })
        .ok_or(Error::WindowOperation {
            handle: window,
            message: "invalid window handle".into(),
        })
    }

    fn set_style(&self, window: WindowHandle, kind: StyleKind, bits: u32) -> Result<()> {
        self.with_window(window, |w| match kind {
            StyleKind::Basic => w.style = bits,
            StyleKind::Extended => w.ex_style = bits,
        })
        .ok_or(Error::WindowOperation {
            handle: window,
            message: "invalid window handle".into(),
        })
    }

    fn show(&self, window: WindowHandle, command: ShowCommand) -> Result<()> {
        self.with_window(window, |w| match command {
            ShowCommand::Hide => w.style &= !WS_VISIBLE,
            ShowCommand::Minimize => w.style |= WS_MINIMIZE,
            ShowCommand::ShowMinNoActivate => w.style |= WS_VISIBLE | WS_MINIMIZE,
            ShowCommand::ShowNoActivate => w.style |= WS_VISIBLE,
        });
        Ok(())
    }
}
