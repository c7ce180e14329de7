mod commands;
mod platform;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "warden",
    version,
    about = "A process memory watchdog with window control"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive console (the default)
    Run {
        /// Do not start the watchdog until `start` is entered
        #[arg(long)]
        paused: bool,
    },
    /// Execute a single console command and exit
    Exec {
        /// The command line, e.g. `hide notepad`
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Create the default configuration and reaction scripts
    Init,
}

fn main() {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run { paused: false }) {
        Commands::Run { paused } => commands::run::execute(paused),
        Commands::Exec { command } => commands::exec::execute(&command.join(" ")),
        Commands::Init => commands::init::execute(),
    }
}
