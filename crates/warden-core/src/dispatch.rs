//! Executes protocol commands against the control layer and the watchdog.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::info;

use crate::command::{Command, HELP};
use crate::config::{self, Config};
use crate::control::WindowControl;
use crate::notify::Notifier;
use crate::process::{ProcessDirectory, ProcessTable};
use crate::reaction::{ReactionScripts, ScriptReactor};
use crate::style;
use crate::watchdog::MemoryWatchdog;
use crate::window::WindowSystem;
use crate::{Error, Result};

/// Where command output goes when nobody is waiting for a [`Reply`]
/// (reaction scripts run on the sampling thread).
pub type Echo = Arc<dyn Fn(&str) + Send + Sync>;

/// The result of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Lines to show the operator (possibly none).
    Output(Vec<String>),
    /// The operator asked to leave the console.
    Exit,
}

impl Reply {
    fn none() -> Self {
        Self::Output(Vec::new())
    }

    fn line(text: impl Into<String>) -> Self {
        Self::Output(vec![text.into()])
    }
}

/// Everything needed to assemble a [`Dispatcher`].
pub struct Parts {
    pub processes: Arc<dyn ProcessTable>,
    pub windows: Arc<dyn WindowSystem>,
    pub notifier: Arc<dyn Notifier>,
    pub config: Config,
    /// Where `save_settings` writes; `None` disables saving.
    pub config_path: Option<PathBuf>,
    pub scripts: ReactionScripts,
    pub echo: Echo,
}

/// Command dispatcher. Owns the control layer and the watchdog, whose
/// transitions are routed back here through a [`ScriptReactor`].
pub struct Dispatcher {
    control: WindowControl,
    watchdog: MemoryWatchdog,
    notifier: Arc<dyn Notifier>,
    config: Mutex<Config>,
    config_path: Option<PathBuf>,
}

impl Dispatcher {
    /// Wires the platform, the watchdog and the reaction scripts together.
    ///
    /// The watchdog is left idle; call `start` (or run the `start`
    /// command) to begin sampling.
    pub fn build(parts: Parts) -> Result<Arc<Self>> {
        let target = parts.config.target()?;
        let directory = Arc::new(ProcessDirectory::new(parts.processes, parts.windows));

        Ok(Arc::new_cyclic(|weak| {
            let reactor = ScriptReactor::new(weak.clone(), parts.scripts, parts.echo);
            Self {
                control: WindowControl::new(directory.clone()),
                watchdog: MemoryWatchdog::new(directory, target, Arc::new(reactor)),
                notifier: parts.notifier,
                config: Mutex::new(parts.config),
                config_path: parts.config_path,
            }
        }))
    }

    pub fn control(&self) -> &WindowControl {
        &self.control
    }

    pub fn watchdog(&self) -> &MemoryWatchdog {
        &self.watchdog
    }

    /// Parses and runs one line. Blank lines produce no output.
    pub fn execute(&self, line: &str) -> Result<Reply> {
        match Command::parse(line)? {
            Some(command) => self.run(command),
            None => Ok(Reply::none()),
        }
    }

    /// Runs a parsed command.
    pub fn run(&self, command: Command) -> Result<Reply> {
        let control = &self.control;
        let reply = match command {
            Command::Help => Reply::Output(
                HELP.iter()
                    .map(|(usage, what)| format!("{usage:<26}{what}"))
                    .collect(),
            ),
            Command::Exit => Reply::Exit,
            Command::Message { kind, text } => {
                self.notifier.popup(kind, &text);
                Reply::none()
            }

            Command::SetProcess(name) => {
                self.watchdog
                    .update_target(|t| t.process_name = name.clone());
                Reply::line(format!("Monitoring {name}"))
            }
            Command::SetMemory(kb) => {
                self.watchdog.update_target(|t| t.memory_limit_kb = kb);
                Reply::line(format!("Memory limit: {kb}K"))
            }
            Command::SetFrequency(hz) => {
                self.watchdog.update_target(|t| t.set_frequency(hz))?;
                Reply::line(format!("Refresh rate: {hz}Hz"))
            }
            Command::SaveSettings => self.save_settings()?,
            Command::Start => {
                self.watchdog.start()?;
                Reply::line("Watchdog started")
            }
            Command::Stop => {
                self.watchdog.stop()?;
                Reply::line("Watchdog stopped")
            }
            Command::Status => self.status(),

            Command::Kill(name) => {
                control.kill(&name)?;
                Reply::none()
            }
            Command::Hide(name) => {
                control.hide(&name)?;
                Reply::none()
            }
            Command::Unhide(name) => {
                control.unhide(&name)?;
                Reply::none()
            }
            Command::Show(name) => {
                control.show(&name)?;
                Reply::none()
            }
            Command::Minimize(name) => {
                control.minimize(&name)?;
                Reply::none()
            }
            Command::Enumerate(name) => Reply::Output(
                control
                    .enumerate(&name)?
                    .into_iter()
                    .map(|pid| format!("PID {pid}"))
                    .collect(),
            ),
            Command::EnumerateWindows(name) => Reply::Output(
                control
                    .enumerate_windows(&name)?
                    .into_iter()
                    .map(|(window, pid)| match pid {
                        Some(pid) => format!("HWND {window} (PID {pid})"),
                        None => format!("HWND {window} (closed)"),
                    })
                    .collect(),
            ),

            Command::Styles(kind) => Reply::Output(style::render(kind)),
            Command::GetStyle { name, kind } => {
                Reply::line(format!("{:X}", control.style(&name, kind)?))
            }
            Command::AddStyle { name, kind, bits } => {
                control.add_style(&name, kind, bits)?;
                Reply::none()
            }
            Command::RemoveStyle { name, kind, bits } => {
                control.remove_style(&name, kind, bits)?;
                Reply::none()
            }
        };
        Ok(reply)
    }

    fn status(&self) -> Reply {
        let status = self.watchdog.status();
        let state = match (status.running, status.in_danger) {
            (true, true) => "running, in danger",
            (true, false) => "running",
            (false, true) => "stopped, in danger",
            (false, false) => "stopped",
        };
        Reply::Output(vec![
            format!("Monitoring {}", status.target.process_name),
            format!("Memory limit: {}K", status.target.memory_limit_kb),
            format!("Refresh rate: {}Hz", status.target.frequency_hz()),
            format!("Watchdog: {state}"),
            format!("Detected processes: {}", status.detected),
        ])
    }

    fn save_settings(&self) -> Result<Reply> {
        let path = self
            .config_path
            .as_ref()
            .ok_or(Error::Config("no config path available".into()))?;

        let mut config = self.config();
        config.record_target(&self.watchdog.target());
        config::save_to(path, &config)?;

        info!(path = %path.display(), "settings saved");
        Ok(Reply::line(format!("Settings saved to {}", path.display())))
    }

    fn config(&self) -> MutexGuard<'_, Config> {
        self.config.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
