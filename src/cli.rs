//! Command-line interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Fallback when `$EDITOR` is not set
const DEFAULT_OPENER: &str = "xdg-open";

/// deej-bind - bind the focused window's audio to a hardware slider
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (detected when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Print the process owning the focused window
    Resolve,
    /// Bind the focused window's process to a slider
    Bind {
        /// Slider index
        slider: u32,
    },
    /// Bind a process name to a slider
    Add {
        /// Process or window name (surrounding whitespace is trimmed)
        #[arg(value_parser = parse_name)]
        name: String,
        /// Slider index
        slider: u32,
    },
    /// Show the current slider bindings
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Read slider lines from stdin and print significant moves
    Monitor,
    /// Open the config file in an editor
    Edit,
}

/// Trim a name given on the command line, rejecting blank ones.
fn parse_name(raw: &str) -> Result<String, String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err("name must not be blank".to_string());
    }
    Ok(name.to_string())
}

/// How to open the config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorCommand {
    pub program: String,
    pub args: Vec<String>,
    /// `$EDITOR` runs in the terminal and is waited for; the desktop opener is not
    pub attached: bool,
}

/// Program and arguments used to open the config file.
pub fn editor_command(config: &str) -> EditorCommand {
    let editor = std::env::var("EDITOR").unwrap_or_default();
    let mut parts = editor.split_whitespace().map(str::to_string);

    match parts.next() {
        Some(program) => {
            let mut args: Vec<String> = parts.collect();
            args.push(config.to_string());
            EditorCommand {
                program,
                args,
                attached: true,
            }
        }
        None => EditorCommand {
            program: DEFAULT_OPENER.to_string(),
            args: vec![config.to_string()],
            attached: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::parse_from(["deej-bind", "bind", "2"]);
        assert_eq!(cli.command, Command::Bind { slider: 2 });

        let cli = Cli::parse_from(["deej-bind", "--config", "/tmp/c.yaml", "add", "game.exe", "1"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.yaml")));
        assert_eq!(
            cli.command,
            Command::Add {
                name: "game.exe".to_string(),
                slider: 1
            }
        );

        let cli = Cli::parse_from(["deej-bind", "add", "  game.exe ", "1"]);
        assert_eq!(
            cli.command,
            Command::Add {
                name: "game.exe".to_string(),
                slider: 1
            }
        );

        let cli = Cli::parse_from(["deej-bind", "list", "--json"]);
        assert_eq!(cli.command, Command::List { json: true });
    }

    #[test]
    fn test_negative_slider_is_rejected() {
        assert!(Cli::try_parse_from(["deej-bind", "bind", "-1"]).is_err());
    }

    #[test]
    fn test_blank_name_is_rejected() {
        assert!(Cli::try_parse_from(["deej-bind", "add", "   ", "1"]).is_err());
    }

    #[test]
    #[serial]
    fn test_editor_from_env() {
        std::env::set_var("EDITOR", "code --wait");
        let editor = editor_command("config.yaml");
        std::env::remove_var("EDITOR");

        assert_eq!(editor.program, "code");
        assert_eq!(editor.args, vec!["--wait", "config.yaml"]);
        assert!(editor.attached);
    }

    #[test]
    #[serial]
    fn test_editor_fallback() {
        std::env::remove_var("EDITOR");
        let editor = editor_command("config.yaml");

        assert_eq!(editor.program, "xdg-open");
        assert_eq!(editor.args, vec!["config.yaml"]);
        assert!(!editor.attached);
    }
}
