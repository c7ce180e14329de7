use std::io::{self, BufRead, Write};
use std::sync::Arc;

use warden_core::Reply;

use crate::platform;

/// Runs the interactive console until `exit` or end of input.
///
/// Transition banners and reaction-script output arrive on the sampling
/// thread and are printed as they happen, between prompts.
pub fn execute(paused: bool) {
    let dispatcher = match platform::dispatcher(Arc::new(|line: &str| println!("{line}"))) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if !paused && let Err(e) = dispatcher.watchdog().start() {
        eprintln!("Error: {e}");
    }
    if let Ok(Reply::Output(lines)) = dispatcher.execute("status") {
        lines.iter().for_each(|l| println!("{l}"));
    }
    println!("Type help or ? for help.");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error: {e}");
                break;
            }
        }

        match dispatcher.execute(&line) {
            Ok(Reply::Output(lines)) => lines.iter().for_each(|l| println!("{l}")),
            Ok(Reply::Exit) => break,
            Err(e) => println!("Error: {e}"),
        }
    }

    if dispatcher.watchdog().is_running() {
        let _ = dispatcher.watchdog().stop();
    }
}
