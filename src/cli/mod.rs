//! CLI module for callcoach.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Callcoach - Multi-agent sales call analysis
///
/// Analyzes sales call recordings and transcripts, and produces coaching
/// feedback, objection handling advice and an executive summary.
#[derive(Parser, Debug)]
#[command(name = "callcoach")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a call recording or transcript file
    Analyze {
        /// Audio file, or a text transcript with --text
        input: String,

        /// Treat the input as a text transcript regardless of its extension
        #[arg(short, long)]
        text: bool,

        /// Playbook file to use as knowledge context (overrides config)
        #[arg(short, long)]
        knowledge: Option<String>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (default from config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (default from config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from([
            "callcoach", "-vv", "analyze", "call.txt", "--text", "--knowledge", "playbook.md",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Analyze {
                input,
                text,
                knowledge,
                json,
            } => {
                assert_eq!(input, "call.txt");
                assert!(text);
                assert_eq!(knowledge.as_deref(), Some("playbook.md"));
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["callcoach", "serve"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Serve {
                host: None,
                port: None
            }
        ));
    }
}
