//! Command-line argument parsing.
//!
//! This module defines the command-line interface of the `sp` binary using
//! the `clap` crate.

use clap::Parser;

/// Command-line arguments for the `sp` script panel runner.
///
/// # Examples
///
/// ```rust
/// use clap::Parser;
/// use script_panels_cli::cli_args::Args;
///
/// let args = Args::parse_from(["sp", "whatsyourname", "Ada"]);
/// assert_eq!(args.script_id.as_deref(), Some("whatsyourname"));
/// ```
#[derive(Parser, Debug)]
#[command(term_width = 0)]
pub struct Args {
    /// Path to the script definitions YAML.
    ///
    /// If not provided, defaults to `~/.script-panels/scripts.yml`.
    #[arg(long, short = 'c')]
    pub config_path: Option<String>,

    /// Directory scanned for `*.sh` scripts when there is no definitions file.
    ///
    /// If not provided, defaults to `~/.script-panels/scripts`.
    #[arg(long, short = 'd')]
    pub scripts_dir: Option<String>,

    /// Interpreter used to run scripts. Defaults to `/bin/bash`.
    #[arg(long, short = 'i')]
    pub interpreter: Option<String>,

    /// Working directory for the script process.
    #[arg(long, short = 'w')]
    pub working_directory: Option<String>,

    /// List the available panels and exit.
    #[arg(long, short = 'l', action)]
    pub list: bool,

    /// The panel ID or index to run.
    ///
    /// If not provided, the available panels are listed.
    pub script_id: Option<String>,

    /// The single argument passed to the script.
    ///
    /// If not provided, it is prompted for using the panel's prompt label.
    pub argument: Option<String>,
}
