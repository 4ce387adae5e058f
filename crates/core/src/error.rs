use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

fn suggestion_hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(suggestion) => format!(". Did you mean `{suggestion}`?"),
        None => String::new(),
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Script `{}` is not readable: {}", .path, .original)]
    ScriptUnavailable {
        path: String,
        original: std::io::Error,
    },

    #[error("Script `{}` is not a regular file", .0)]
    ScriptNotAFile(String),

    #[error("Could not launch interpreter `{}`: {}", .interpreter, .original)]
    Spawn {
        interpreter: String,
        original: std::io::Error,
    },

    #[error("Error {} {} file at `{}`: {}", .action, .file_description, .path, .original)]
    Yaml {
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    },

    #[error("No scripts were found in the script definition YAML. Is `{}` empty?", .path)]
    EmptyScriptDefinition { path: String },

    #[error("No script definitions at `{}` and no `*.sh` scripts in `{}`", .definitions_path, .scripts_dir)]
    NoScripts {
        definitions_path: String,
        scripts_dir: String,
    },

    #[error("IO error with {} file at path `{}`: {}", .file_description, .path, .original)]
    Io {
        file_description: String,
        path: String,
        original: std::io::Error,
    },

    #[error("Script `{}` resolves outside of the scripts directory `{}`", .name, .scripts_dir)]
    ScriptOutsideDirectory { name: String, scripts_dir: String },

    #[error("No script with ID `{}`{}", .id, suggestion_hint(.suggestion))]
    ScriptNotFound {
        id: String,
        suggestion: Option<String>,
    },

    #[error("STDIO error: {}", .0)]
    Stdio(#[from] std::io::Error),

    #[error("Found a non-unique script ID: `{}`", .0)]
    NonUniqueScriptId(String),

    #[error("Invalid ID: ID may not be empty")]
    EmptyId,

    #[error("Invalid ID `{}`: ID may not contain spaces", .0)]
    IdWithSpace(String),

    #[error("Invalid ID `{}`: ID may not contain a colon", .0)]
    IdWithColon(String),

    #[error("Invalid ID `{}`: ID cannot be purely numeric", .0)]
    NumericId(String),
}

impl Error {
    pub fn empty_script_definition(path: String) -> Self {
        Self::EmptyScriptDefinition { path }
    }

    pub fn yaml_error(
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    ) -> Self {
        Self::Yaml {
            action,
            file_description,
            path,
            original,
        }
    }

    pub fn io_error(file_description: String, path: String, original: std::io::Error) -> Self {
        Self::Io {
            file_description,
            path,
            original,
        }
    }

    pub fn script_unavailable(path: String, original: std::io::Error) -> Self {
        Self::ScriptUnavailable { path, original }
    }

    pub fn spawn_error(interpreter: String, original: std::io::Error) -> Self {
        Self::Spawn {
            interpreter,
            original,
        }
    }
}
