use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Prompt shown next to the argument input when a definition sets none.
pub const DEFAULT_PROMPT_LABEL: &str = "Argument";

fn default_prompt_label() -> String {
    DEFAULT_PROMPT_LABEL.to_string()
}

/// Static description of one panel: which script it wraps and how it asks
/// for the argument.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ScriptDefinition {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub detail_text: String,
    pub script: PathBuf,
    #[serde(default = "default_prompt_label")]
    pub prompt_label: String,
    #[serde(default)]
    pub placeholder_text: String,
}

impl ScriptDefinition {
    /// Builds a definition for a script found on disk, named after its file.
    pub fn from_script_file(script: &Path) -> Self {
        let id = script
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
        let title = script
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| id.clone());

        Self {
            id,
            title,
            detail_text: String::new(),
            script: script.to_path_buf(),
            prompt_label: default_prompt_label(),
            placeholder_text: String::new(),
        }
    }

    pub fn script_path(&self) -> &Path {
        &self.script
    }
}

impl Display for ScriptDefinition {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        if self.detail_text.is_empty() {
            write!(formatter, "{}: {}", self.id, self.title)
        } else {
            write!(
                formatter,
                "{}: {} ({})",
                self.id, self.title, self.detail_text
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_defaults() {
        let yaml = r#"
id: greet
title: "What's your name?"
script: scripts/whatsyourname.sh
"#;
        let definition: ScriptDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(definition.id, "greet");
        assert_eq!(definition.detail_text, "");
        assert_eq!(definition.prompt_label, DEFAULT_PROMPT_LABEL);
        assert_eq!(definition.placeholder_text, "");
        assert_eq!(
            definition.script_path(),
            Path::new("scripts/whatsyourname.sh")
        );
    }

    #[test]
    fn test_from_script_file() {
        let definition = ScriptDefinition::from_script_file(Path::new("/srv/scripts/backup.sh"));
        assert_eq!(definition.id, "backup");
        assert_eq!(definition.title, "backup.sh");
        assert_eq!(definition.prompt_label, DEFAULT_PROMPT_LABEL);
        assert_eq!(definition.script, PathBuf::from("/srv/scripts/backup.sh"));
    }

    #[test]
    fn test_display() {
        let mut definition = ScriptDefinition::from_script_file(Path::new("/tmp/hello.sh"));
        assert_eq!(format!("{definition}"), "hello: hello.sh");

        definition.detail_text = "Says hello".to_string();
        assert_eq!(format!("{definition}"), "hello: hello.sh (Says hello)");
    }
}
