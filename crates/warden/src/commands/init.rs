use std::path::Path;

use warden_core::config::{self, Config};

const DANGER_TEMPLATE: &str = "\
# Commands run when the monitored process goes over its memory limit.
# One command per line; blank lines and lines starting with # are skipped.
# Example:
# hide notepad
# warn Notepad is using too much memory
";

const SAFE_TEMPLATE: &str = "\
# Commands run when every monitored process is back under the limit.
# Example:
# show notepad
";

/// Creates `~/.config/warden/` with a default `config.toml` and empty
/// reaction scripts. Existing files are not overwritten.
pub fn execute() {
    let Some(dir) = config::config_dir() else {
        eprintln!("Error: could not determine home directory.");
        std::process::exit(1);
    };

    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("Error: could not create {}: {e}", dir.display());
        std::process::exit(1);
    }

    let defaults = Config::default();
    let config_path = dir.join("config.toml");
    if config_path.exists() {
        println!("Already exists: {}", config_path.display());
    } else {
        match config::save_to(&config_path, &defaults) {
            Ok(()) => println!("Created {}", config_path.display()),
            Err(e) => eprintln!("Error: {e}"),
        }
    }

    let scripts = defaults.reactions.resolve(&dir);
    write_if_missing(&scripts.danger, DANGER_TEMPLATE);
    write_if_missing(&scripts.safe, SAFE_TEMPLATE);
}

/// Writes content to a file only if it doesn't already exist.
fn write_if_missing(path: &Path, content: &str) {
    if path.exists() {
        println!("Already exists: {}", path.display());
        return;
    }

    match std::fs::write(path, content) {
        Ok(()) => println!("Created {}", path.display()),
        Err(e) => eprintln!("Error: could not write {}: {e}", path.display()),
    }
}
