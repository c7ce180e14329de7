use std::path::PathBuf;

use crate::window::WindowHandle;

/// Errors raised by the watchdog and the process/window control layer.
///
/// A name matching no process or window is not an error; the control
/// layer returns an empty result.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The OS process or window table could not be read.
    #[error("process query failed: {0}")]
    QueryFailure(String),

    /// An OS call against a specific window failed.
    #[error("window {handle} operation failed: {message}")]
    WindowOperation {
        handle: WindowHandle,
        message: String,
    },

    /// A process could not be terminated.
    #[error("failed to kill process {pid}: {message}")]
    Terminate { pid: u32, message: String },

    /// A command argument could not be parsed.
    #[error("invalid value '{value}' for {what}")]
    InvalidArgument { what: &'static str, value: String },

    /// A command was issued without a required argument.
    #[error("no {0} was specified")]
    MissingArgument(&'static str),

    /// The command verb is not part of the protocol.
    #[error("invalid command '{0}'. Type help or ? for help.")]
    InvalidCommand(String),

    /// A reaction script is missing or unreadable.
    #[error("failed to read reaction script {}: {source}", path.display())]
    ScriptReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `start` was called while the watchdog was already sampling.
    #[error("watchdog is already running")]
    AlreadyRunning,

    /// `stop` was called while the watchdog was idle.
    #[error("watchdog is not running")]
    NotRunning,

    /// The configuration file could not be located, read or written.
    #[error("config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
