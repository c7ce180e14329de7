//! Picks the OS backend and assembles a dispatcher from the user's config.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};
use warden_core::{Config, Dispatcher, Echo, Parts, Result, config, log};

/// Loads `config.toml`, initialises logging and wires up a dispatcher.
///
/// An unreadable config is reported once logging is up and replaced by
/// the defaults; saving is then disabled so `save_settings` cannot
/// overwrite the user's file. The watchdog is returned idle.
pub fn dispatcher(echo: Echo) -> Result<Arc<Dispatcher>> {
    let mut config_path = config::config_path();
    let (config, load_error) = match config_path.as_deref() {
        Some(path) if path.exists() => match config::try_load_from(path) {
            Ok(config) => (config, None),
            Err(e) => (Config::default(), Some(e)),
        },
        _ => (Config::default(), None),
    };
    log::init(&config.logging);
    if let Some(e) = load_error {
        warn!("{e}; using default settings");
        config_path = None;
    }

    let base = config::config_dir().unwrap_or_else(|| PathBuf::from("."));
    let scripts = config.reactions.resolve(&base);
    debug!(?scripts, "reaction scripts");

    let (processes, windows, notifier) = backend();
    Dispatcher::build(Parts {
        processes,
        windows,
        notifier,
        config,
        config_path,
        scripts,
        echo,
    })
}

#[cfg(windows)]
fn backend() -> (
    Arc<dyn warden_core::ProcessTable>,
    Arc<dyn warden_core::WindowSystem>,
    Arc<dyn warden_core::Notifier>,
) {
    use warden_windows::{MessageBoxNotifier, Win32Platform};

    (
        Arc::new(Win32Platform),
        Arc::new(Win32Platform),
        Arc::new(MessageBoxNotifier),
    )
}

#[cfg(not(windows))]
fn backend() -> (
    Arc<dyn warden_core::ProcessTable>,
    Arc<dyn warden_core::WindowSystem>,
    Arc<dyn warden_core::Notifier>,
) {
    (
        Arc::new(unsupported::Unsupported),
        Arc::new(unsupported::Unsupported),
        Arc::new(warden_core::LogNotifier),
    )
}

/// Stand-in backend for targets without Win32: every OS query fails.
#[cfg(not(windows))]
mod unsupported {
    use warden_core::{
        Error, ProcessEntry, ProcessTable, Result, ShowCommand, StyleKind, WindowHandle,
        WindowSystem,
    };

    const MESSAGE: &str = "process and window control is only available on Windows";

    pub struct Unsupported;

    impl ProcessTable for Unsupported {
        fn snapshot(&self) -> Result<Vec<ProcessEntry>> {
            Err(Error::QueryFailure(MESSAGE.into()))
        }

        fn working_set(&self, _pid: u32) -> Result<u64> {
            Err(Error::QueryFailure(MESSAGE.into()))
        }

        fn terminate(&self, pid: u32) -> Result<()> {
            Err(Error::Terminate {
                pid,
                message: MESSAGE.into(),
            })
        }
    }

    impl WindowSystem for Unsupported {
        fn top_level_windows(&self) -> Result<Vec<WindowHandle>> {
            Err(Error::QueryFailure(MESSAGE.into()))
        }

        fn owner_pid(&self, _window: WindowHandle) -> Option<u32> {
            None
        }

        fn style(&self, window: WindowHandle, _kind: StyleKind) -> Result<u32> {
            Err(Error::WindowOperation {
                handle: window,
                message: MESSAGE.into(),
            })
        }

        fn set_style(&self, window: WindowHandle, _kind: StyleKind, _bits: u32) -> Result<()> {
            Err(Error::WindowOperation {
                handle: window,
                message: MESSAGE.into(),
            })
        }

        fn show(&self, _window: WindowHandle, _command: ShowCommand) -> Result<()> {
            Ok(())
        }
    }
}
