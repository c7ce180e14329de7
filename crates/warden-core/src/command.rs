//! The line-oriented command protocol shared by the console and the
//! reaction scripts: `<verb> [arg1] [arg2]`.

use crate::notify::MessageKind;
use crate::style;
use crate::window::StyleKind;
use crate::{Error, Result};

/// A parsed protocol command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Exit,
    Message { kind: MessageKind, text: String },
    SetProcess(String),
    SetMemory(u64),
    SetFrequency(u32),
    SaveSettings,
    Start,
    Stop,
    Status,
    Kill(String),
    Hide(String),
    Unhide(String),
    Show(String),
    Minimize(String),
    Enumerate(String),
    EnumerateWindows(String),
    Styles(StyleKind),
    GetStyle { name: String, kind: StyleKind },
    AddStyle { name: String, kind: StyleKind, bits: u32 },
    RemoveStyle { name: String, kind: StyleKind, bits: u32 },
}

/// Verb reference printed by `help`.
pub const HELP: &[(&str, &str)] = &[
    ("help, ?", "show this list"),
    ("exit, bye, bai", "stop the watchdog and quit"),
    ("msg <text>", "show a popup"),
    ("warn, ! <text>", "show a warning popup"),
    ("info, i <text>", "show an information popup"),
    ("set_process, sp <name>", "set the monitored process"),
    ("set_memory, sm <KB>", "set the memory limit"),
    ("set_frequency, sf <Hz>", "set the sampling frequency"),
    ("save_settings, ss", "write the settings to config.toml"),
    ("start | stop | status", "control the watchdog"),
    ("kill, k <name>", "terminate every process with that name"),
    ("hide, h <name>", "hide the visible windows of a process"),
    ("unhide, uh <name>", "restore hidden windows (minimized)"),
    ("show, s <name>", "restore hidden windows"),
    ("minimize, m <name>", "minimize every window of a process"),
    ("enum, e <name>", "list PIDs"),
    ("enum_windows, ew <name>", "list windows and owning PIDs"),
    ("styles | styles_ex", "print the style bit tables"),
    ("gws | gwsx <name>", "print a window style"),
    ("aws | awsx <name> <hex>", "add style bits"),
    ("rws | rwsx <name> <hex>", "remove style bits"),
];

impl Command {
    /// Parses one line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        let Some(verb) = line.split_whitespace().next() else {
            return Ok(None);
        };
        let rest = line[verb.len()..].trim();
        let mut args = rest.split_whitespace();
        let first = args.next();
        // Extra words are tolerated; the last one is the second argument.
        let second = args.last();

        let name = || first.map(str::to_string).ok_or(Error::MissingArgument("process"));
        let text = |kind| {
            if rest.is_empty() {
                return Err(Error::MissingArgument("message"));
            }
            Ok(Self::Message {
                kind,
                text: rest.to_string(),
            })
        };
        let bits = || {
            second
                .ok_or(Error::MissingArgument("style"))
                .and_then(style::parse_bits)
        };

        let command = match verb {
            "help" | "?" => Self::Help,
            "exit" | "bye" | "bai" => Self::Exit,
            "msg" => text(MessageKind::Plain)?,
            "warn" | "!" => text(MessageKind::Warning)?,
            "info" | "i" => text(MessageKind::Information)?,

            "set_process" | "sp" => Self::SetProcess(name()?),
            "set_memory" | "sm" => Self::SetMemory(number(first, "memory")?),
            "set_frequency" | "sf" => Self::SetFrequency(number(first, "frequency")?),
            "save_settings" | "ss" => Self::SaveSettings,
            "start" => Self::Start,
            "stop" => Self::Stop,
            "status" => Self::Status,

            "kill" | "k" => Self::Kill(name()?),
            "hide" | "h" => Self::Hide(name()?),
            "unhide" | "uh" => Self::Unhide(name()?),
            "show" | "s" => Self::Show(name()?),
            "minimize" | "m" => Self::Minimize(name()?),
            "enum" | "e" => Self::Enumerate(name()?),
            "enum_windows" | "ew" => Self::EnumerateWindows(name()?),

            "styles" => Self::Styles(StyleKind::Basic),
            "styles_ex" => Self::Styles(StyleKind::Extended),
            "get_window_style" | "gws" => Self::GetStyle {
                name: name()?,
                kind: StyleKind::Basic,
            },
            "get_window_style_ex" | "gwsx" => Self::GetStyle {
                name: name()?,
                kind: StyleKind::Extended,
            },
            "add_window_style" | "aws" => Self::AddStyle {
                name: name()?,
                kind: StyleKind::Basic,
                bits: bits()?,
            },
            "add_window_style_ex" | "awsx" => Self::AddStyle {
                name: name()?,
                kind: StyleKind::Extended,
                bits: bits()?,
            },
            "remove_window_style" | "rws" => Self::RemoveStyle {
                name: name()?,
                kind: StyleKind::Basic,
                bits: bits()?,
            },
            "remove_window_style_ex" | "rwsx" => Self::RemoveStyle {
                name: name()?,
                kind: StyleKind::Extended,
                bits: bits()?,
            },

            other => return Err(Error::InvalidCommand(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn number<T: std::str::FromStr>(arg: Option<&str>, what: &'static str) -> Result<T> {
    let value = arg.ok_or(Error::MissingArgument("value"))?;
    value.parse().map_err(|_| Error::InvalidArgument {
        what,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        Command::parse(line).unwrap().unwrap()
    }

    #[test]
    fn blank_lines_are_not_commands() {
        assert_eq!(Command::parse("").unwrap(), None);
        assert_eq!(Command::parse("   \t ").unwrap(), None);
    }

    #[test]
    fn aliases_parse_to_the_same_command() {
        assert_eq!(parse("hide notepad"), parse("h notepad"));
        assert_eq!(parse("unhide x"), Command::Unhide("x".into()));
        assert_eq!(parse("  s   x  "), Command::Show("x".into()));
        assert_eq!(parse("bai"), Command::Exit);
        assert_eq!(parse("?"), Command::Help);
    }

    #[test]
    fn style_commands_take_a_hex_mask() {
        assert_eq!(
            parse("aws game 80000000"),
            Command::AddStyle {
                name: "game".into(),
                kind: StyleKind::Basic,
                bits: 0x8000_0000,
            }
        );
        assert_eq!(
            parse("rwsx game 0x80"),
            Command::RemoveStyle {
                name: "game".into(),
                kind: StyleKind::Extended,
                bits: 0x80,
            }
        );
        assert_eq!(parse("styles_ex"), Command::Styles(StyleKind::Extended));
    }

    #[test]
    fn message_commands_keep_the_rest_of_the_line() {
        assert_eq!(
            parse("! close   it now"),
            Command::Message {
                kind: MessageKind::Warning,
                text: "close   it now".into(),
            }
        );
    }

    #[test]
    fn numeric_arguments_are_validated() {
        assert_eq!(parse("sm 2048"), Command::SetMemory(2048));
        assert_eq!(parse("sf 10"), Command::SetFrequency(10));
        assert!(matches!(
            Command::parse("sm lots"),
            Err(Error::InvalidArgument { what: "memory", .. })
        ));
        assert!(matches!(
            Command::parse("sf -1"),
            Err(Error::InvalidArgument { what: "frequency", .. })
        ));
    }

    #[test]
    fn missing_arguments_are_reported() {
        assert!(matches!(
            Command::parse("kill"),
            Err(Error::MissingArgument("process"))
        ));
        assert!(matches!(
            Command::parse("aws game"),
            Err(Error::MissingArgument("style"))
        ));
        assert!(matches!(
            Command::parse("msg"),
            Err(Error::MissingArgument("message"))
        ));
    }

    #[test]
    fn unknown_verbs_are_invalid_commands() {
        let err = Command::parse("dance now").unwrap_err();

        assert!(matches!(&err, Error::InvalidCommand(v) if v == "dance"));
        assert!(err.to_string().contains("Type help or ? for help"));
    }
}
