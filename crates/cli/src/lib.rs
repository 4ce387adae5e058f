//! Script Panels CLI Library
//!
//! This crate provides `sp`, a terminal shell for script panels. It loads the
//! panel definitions, picks one by ID or index, asks for its argument when it
//! was not given, then streams the script's output and final status.
//!
//! # Architecture
//!
//! - [`cli_args`]: Command-line argument parsing
//! - [`selection`]: Finding a panel, listing panels and prompting for the argument
//! - [`shell`]: Streaming a panel run to the terminal
//!
//! # Examples
//!
//! ```bash
//! # List the panels
//! sp --list
//!
//! # Run a panel by ID, or by index
//! sp whatsyourname Ada
//! sp 0 Ada
//!
//! # Prompt for the argument
//! sp whatsyourname
//!
//! # Use another definitions file and interpreter
//! sp -c ./scripts.yml -i /bin/zsh whatsyourname Ada
//! ```

pub mod cli_args;
pub mod selection;
pub mod shell;
