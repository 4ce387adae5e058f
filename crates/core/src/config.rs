//! Configuration path utilities for script panels.
//!
//! This module provides functions for resolving the definitions file, the
//! scripts directory and the interpreter, expanding shell variables like `~`.

use std::path::{Path, PathBuf};

/// Default path for the script definitions file
const DEFAULT_DEFINITIONS_PATH: &str = "~/.script-panels/scripts.yml";
/// Default directory scanned for `*.sh` scripts when no definitions file exists
const DEFAULT_SCRIPTS_DIR: &str = "~/.script-panels/scripts";

/// Default interpreter used to run panel scripts
pub const DEFAULT_INTERPRETER: &str = "/bin/bash";

/// Resolves the script definitions file path.
///
/// If a custom path is provided, uses that path. Otherwise, uses the default
/// definitions path. Shell expansions like `~` are resolved.
///
/// # Examples
///
/// ```
/// use script_panels_core::config::get_definitions_path;
///
/// let default_path = get_definitions_path(&None);
/// let custom_path = get_definitions_path(&Some("/path/to/scripts.yml".to_string()));
/// assert_eq!(custom_path, "/path/to/scripts.yml");
/// ```
pub fn get_definitions_path(definitions_path_arg: &Option<String>) -> String {
    let definitions_path = match definitions_path_arg {
        Some(definitions_path) => definitions_path,
        None => DEFAULT_DEFINITIONS_PATH,
    };

    shellexpand::tilde(definitions_path).to_string()
}

/// Resolves the directory that is scanned for scripts.
///
/// Same rules as [`get_definitions_path`].
pub fn get_scripts_dir(scripts_dir_arg: &Option<String>) -> String {
    let scripts_dir = match scripts_dir_arg {
        Some(scripts_dir) => scripts_dir,
        None => DEFAULT_SCRIPTS_DIR,
    };

    shellexpand::tilde(scripts_dir).to_string()
}

/// Resolves the interpreter, falling back to [`DEFAULT_INTERPRETER`].
pub fn get_interpreter(interpreter_arg: &Option<String>) -> String {
    match interpreter_arg {
        Some(interpreter) => shellexpand::tilde(interpreter).to_string(),
        None => DEFAULT_INTERPRETER.to_string(),
    }
}

/// Expands shell variables in a working directory path.
///
/// Returns None if no working directory is provided.
///
/// # Examples
///
/// ```
/// use script_panels_core::config::expand_working_directory;
///
/// let expanded = expand_working_directory(&Some("~/projects".to_string()));
/// assert!(expanded.is_some());
///
/// assert!(expand_working_directory(&None).is_none());
/// ```
pub fn expand_working_directory(working_directory: &Option<String>) -> Option<String> {
    working_directory
        .as_ref()
        .map(|working_directory| shellexpand::tilde(working_directory).to_string())
}

/// Resolves a script reference from a definitions file.
///
/// `~` is expanded; relative paths are taken relative to `base_dir`, the
/// directory holding the definitions file.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use script_panels_core::config::resolve_script_location;
///
/// let resolved = resolve_script_location("scripts/hello.sh", Path::new("/etc/panels"));
/// assert_eq!(resolved, Path::new("/etc/panels/scripts/hello.sh"));
/// ```
pub fn resolve_script_location(script: &str, base_dir: &Path) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(script).to_string());

    if expanded.is_absolute() {
        expanded
    } else {
        base_dir.join(expanded)
    }
}
