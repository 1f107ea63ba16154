use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

/// `postwright` - rewrite Telegram posts through an LLM without losing links.
#[derive(Parser, Debug)]
#[command(name = "postwright")]
#[command(version)]
#[command(about = "Link-preserving LLM rewrites for Telegram posts.", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.postwright/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Strip tracking parameters from URLs
    Canonicalize {
        /// URLs to clean
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Show the tokenized text and token map the model would receive
    Tokenize {
        /// Bot API message JSON, or an array of messages forming an album
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Rewrite a post and print the final text, entities and warnings
    Rewrite {
        /// Bot API message JSON, or an array of messages forming an album
        #[arg(short, long)]
        input: PathBuf,

        /// Replace the configured style rules with the contents of this file
        #[arg(long)]
        instruction: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_rewrite_with_globals() {
        let cli = Cli::try_parse_from([
            "postwright",
            "rewrite",
            "--input",
            "post.json",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.log_level, Level::DEBUG);
        assert!(matches!(
            cli.command,
            Commands::Rewrite { instruction: None, .. }
        ));
    }

    #[test]
    fn canonicalize_requires_a_url() {
        assert!(Cli::try_parse_from(["postwright", "canonicalize"]).is_err());
    }
}
