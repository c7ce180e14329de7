//! Reaction scripts: command files executed on watchdog transitions.

use std::path::{Path, PathBuf};
use std::sync::Weak;

use tracing::{error, info, warn};

use crate::dispatch::{Dispatcher, Echo, Reply};
use crate::watchdog::{Transition, WatchdogObserver};
use crate::{Error, Result};

/// Where the two reaction scripts live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionScripts {
    pub danger: PathBuf,
    pub safe: PathBuf,
}

/// Runs every command in a script through `dispatcher`.
///
/// Blank lines and `#` comments are skipped. A failing line is reported
/// through `echo` and the script carries on. The file is read on every
/// call; a missing or unreadable file is [`Error::ScriptReadFailure`].
/// Returns the number of lines that executed successfully.
pub fn run_script(dispatcher: &Dispatcher, path: &Path, echo: &dyn Fn(&str)) -> Result<usize> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::ScriptReadFailure {
        path: path.to_path_buf(),
        source,
    })?;

    let mut executed = 0;
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match dispatcher.execute(line) {
            Ok(Reply::Output(lines)) => {
                executed += 1;
                lines.iter().for_each(|l| echo(l));
            }
            Ok(Reply::Exit) => {
                warn!(script = %path.display(), line = number + 1, "exit ignored in reaction script");
                echo("exit is ignored inside reaction scripts");
            }
            Err(e) => {
                warn!(script = %path.display(), line = number + 1, "{e}");
                echo(&format!("Error: {e}"));
            }
        }
    }
    Ok(executed)
}

/// Watchdog observer that announces each transition and runs the
/// matching script.
///
/// Holds the dispatcher weakly because the dispatcher owns the watchdog
/// that owns this observer.
pub struct ScriptReactor {
    dispatcher: Weak<Dispatcher>,
    scripts: ReactionScripts,
    echo: Echo,
}

impl ScriptReactor {
    pub fn new(dispatcher: Weak<Dispatcher>, scripts: ReactionScripts, echo: Echo) -> Self {
        Self {
            dispatcher,
            scripts,
            echo,
        }
    }
}

impl WatchdogObserver for ScriptReactor {
    fn on_transition(&self, transition: Transition) {
        let Some(dispatcher) = self.dispatcher.upgrade() else {
            return;
        };

        let (banner, script) = match transition {
            Transition::Danger(sample) => (
                format!(
                    "DANGER: PID {} is using {}K",
                    sample.pid,
                    sample.working_set_bytes / 1024
                ),
                &self.scripts.danger,
            ),
            Transition::Safe => ("It's safe now".to_string(), &self.scripts.safe),
        };
        (self.echo)(&banner);

        let echo: &dyn Fn(&str) = &*self.echo;
        match run_script(&dispatcher, script, echo) {
            Ok(executed) => info!(script = %script.display(), executed, "reaction script finished"),
            Err(e) => {
                error!("{e}");
                echo(&format!("Error: {e}"));
            }
        }
    }
}
