pub mod command;
pub mod config;
pub mod control;
pub mod dispatch;
pub mod error;
pub mod log;
pub mod notify;
pub mod process;
pub mod reaction;
pub mod registry;
pub mod style;
pub mod watchdog;
pub mod window;

#[cfg(test)]
mod fake;

pub use command::Command;
pub use config::Config;
pub use control::WindowControl;
pub use dispatch::{Dispatcher, Echo, Parts, Reply};
pub use error::{Error, Result};
pub use notify::{LogNotifier, MessageKind, Notifier};
pub use process::{ProcessDirectory, ProcessEntry, ProcessSample, ProcessTable};
pub use reaction::ReactionScripts;
pub use watchdog::{MemoryWatchdog, MonitoredTarget, Transition, WatchdogObserver};
pub use window::{ShowCommand, StyleKind, WindowHandle, WindowSystem};
