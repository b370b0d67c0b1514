//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Convert, merge and edit configuration documents (JSON, YAML, TOML, env)
#[derive(Parser, Debug)]
#[command(name = "refmt")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging (repeat for more: -dd, -ddd)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Output format when the output path has no known extension
    #[arg(short = 't', long = "type", global = true, value_name = "TYPE")]
    pub output_type: Option<String>,

    /// Print JSON on a single line
    #[arg(short, long, global = true)]
    pub compact: bool,

    /// Prefix for emitted env variables
    #[arg(short, long, global = true, value_name = "PREFIX")]
    pub prefix: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a document to another format (`-` for stdin/stdout)
    Convert {
        /// Input file
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        /// Output file
        #[arg(value_hint = ValueHint::FilePath)]
        output: PathBuf,
    },

    /// Merge MIXIN into ORIGINAL and write the result
    Merge {
        /// Base document (missing or empty counts as empty)
        #[arg(value_hint = ValueHint::FilePath)]
        original: PathBuf,
        /// Document merged on top
        #[arg(value_hint = ValueHint::FilePath)]
        mixin: PathBuf,
        /// Output file
        #[arg(value_hint = ValueHint::FilePath)]
        output: PathBuf,
    },

    /// Set a dotted key in a document, in place
    Set {
        /// Document to edit (created if missing)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Dotted key, e.g. `db.password[b64]`
        key: String,
        /// New value; empty removes the key
        value: String,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective config
    Show,

    /// Show config file path
    Path,

    /// Create config template
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },
}
