use std::sync::Arc;

use warden_core::Reply;

use crate::platform;

/// Executes one console command; exits non-zero if it fails.
pub fn execute(line: &str) {
    let result = platform::dispatcher(Arc::new(|line: &str| println!("{line}")))
        .and_then(|dispatcher| dispatcher.execute(line));

    match result {
        Ok(Reply::Output(lines)) => lines.iter().for_each(|l| println!("{l}")),
        Ok(Reply::Exit) => {}
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
