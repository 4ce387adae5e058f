//! File handling and validation for script panel configuration.
//!
//! This module reads script definitions from YAML, discovers scripts in a
//! directory when no definitions file exists, and validates script IDs.

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::{debug, info, warn};

use crate::config::resolve_script_location;
use crate::error::Error::{EmptyId, IdWithColon, IdWithSpace, NonUniqueScriptId, NumericId};
use crate::error::{Error, Result};
use crate::script_definitions::ScriptDefinition;

/// File extension of scripts picked up by [`discover_scripts`].
const SCRIPT_EXTENSION: &str = "sh";

fn get_reader(file_description: &str, path: &str) -> Result<File> {
    match File::open(path) {
        Ok(reader) => Ok(reader),
        Err(e) => Err(Error::io_error(
            file_description.to_string(),
            path.to_string(),
            e,
        )),
    }
}

fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(EmptyId);
    }

    if id.contains(' ') {
        return Err(IdWithSpace(id.to_string()));
    }

    if id.contains(':') {
        return Err(IdWithColon(id.to_string()));
    }

    if id.chars().all(|c| c.is_numeric()) {
        return Err(NumericId(id.to_string()));
    }

    Ok(())
}

fn validate_script_ids(definitions: &[ScriptDefinition]) -> Result<()> {
    let mut ids = HashSet::new();

    for definition in definitions.iter() {
        validate_id(&definition.id)?;

        if !ids.insert(definition.id.clone()) {
            return Err(NonUniqueScriptId(definition.id.clone()));
        }
    }

    Ok(())
}

/// Loads and validates script definitions from a YAML file.
///
/// Script paths are resolved relative to the directory holding the file, so
/// a definitions file can ship next to its scripts.
///
/// # Errors
///
/// Returns an error if:
/// - The definitions file cannot be read
/// - The YAML is malformed or doesn't match the expected structure
/// - The file holds no definitions
/// - Script IDs are invalid or non-unique
///
/// # Examples
///
/// ```no_run
/// use script_panels_core::file_handling::get_script_definitions;
///
/// let definitions = get_script_definitions("/etc/script-panels/scripts.yml")?;
/// println!("Loaded {} panels", definitions.len());
/// # Ok::<(), script_panels_core::error::Error>(())
/// ```
pub fn get_script_definitions(definitions_path: &str) -> Result<Vec<ScriptDefinition>> {
    let reader = get_reader("script definitions", definitions_path)?;

    let parsed: Vec<ScriptDefinition> = serde_yaml::from_reader(reader).map_err(|e| {
        Error::yaml_error(
            "reading".to_string(),
            "script definitions".to_string(),
            definitions_path.to_string(),
            e,
        )
    })?;

    if parsed.is_empty() {
        return Err(Error::empty_script_definition(definitions_path.to_string()));
    }

    validate_script_ids(&parsed)?;

    let base_dir = Path::new(definitions_path)
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    Ok(parsed
        .into_iter()
        .map(|mut definition| {
            definition.script =
                resolve_script_location(&definition.script.to_string_lossy(), &base_dir);
            definition
        })
        .collect())
}

/// Lists the `*.sh` files directly inside `scripts_dir`, sorted by file name.
///
/// Files whose name is not a valid ID, or that resolve outside the
/// directory, are skipped with a warning.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn discover_scripts(scripts_dir: &str) -> Result<Vec<ScriptDefinition>> {
    let entries = std::fs::read_dir(scripts_dir).map_err(|e| {
        Error::io_error("scripts directory".to_string(), scripts_dir.to_string(), e)
    })?;

    let scripts = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .is_some_and(|extension| extension == SCRIPT_EXTENSION)
        })
        .sorted_by_key(|path| path.file_name().map(|name| name.to_os_string()))
        .filter_map(|path| discovered_script(scripts_dir, &path))
        .collect_vec();

    debug!("Discovered {} scripts in `{}`", scripts.len(), scripts_dir);
    validate_script_ids(&scripts)?;
    Ok(scripts)
}

fn discovered_script(scripts_dir: &str, path: &Path) -> Option<ScriptDefinition> {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        warn!("Skipping `{}`: file name is not UTF-8", path.display());
        return None;
    };

    let script = match resolve_script_in_dir(scripts_dir, name) {
        Ok(script) => script,
        Err(e) => {
            warn!("Skipping `{}`: {}", path.display(), e);
            return None;
        }
    };

    let mut definition = ScriptDefinition::from_script_file(path);
    if let Err(e) = validate_id(&definition.id) {
        warn!("Skipping `{}`: {}", path.display(), e);
        return None;
    }

    definition.script = script;
    Some(definition)
}

/// Resolves a script name inside `scripts_dir`, refusing names that escape
/// the directory (`../`, absolute paths, symlinks pointing elsewhere).
///
/// # Errors
///
/// Returns [`Error::ScriptNotFound`] when the script does not exist and
/// [`Error::ScriptOutsideDirectory`] when it resolves outside the directory.
pub fn resolve_script_in_dir(scripts_dir: &str, name: &str) -> Result<PathBuf> {
    let root = Path::new(scripts_dir).canonicalize().map_err(|e| {
        Error::io_error("scripts directory".to_string(), scripts_dir.to_string(), e)
    })?;

    let not_found = || Error::ScriptNotFound {
        id: name.to_string(),
        suggestion: None,
    };

    let candidate = root.join(name).canonicalize().map_err(|_| not_found())?;

    if !candidate.starts_with(&root) {
        return Err(Error::ScriptOutsideDirectory {
            name: name.to_string(),
            scripts_dir: scripts_dir.to_string(),
        });
    }

    if !candidate.is_file() {
        return Err(not_found());
    }

    Ok(candidate)
}

/// Loads the panels to show.
///
/// The definitions file wins when it exists; otherwise every script in
/// `scripts_dir` becomes a panel.
///
/// # Errors
///
/// Returns [`Error::NoScripts`] when neither source yields a panel, or the
/// underlying error when the definitions file is present but invalid.
pub fn load_script_definitions(
    definitions_path: &str,
    scripts_dir: &str,
) -> Result<Vec<ScriptDefinition>> {
    if Path::new(definitions_path).exists() {
        info!("Loading script definitions from `{}`", definitions_path);
        return get_script_definitions(definitions_path);
    }

    let no_scripts = || Error::NoScripts {
        definitions_path: definitions_path.to_string(),
        scripts_dir: scripts_dir.to_string(),
    };

    if !Path::new(scripts_dir).is_dir() {
        return Err(no_scripts());
    }

    info!("No definitions file, discovering scripts in `{}`", scripts_dir);
    let discovered = discover_scripts(scripts_dir)?;

    if discovered.is_empty() {
        return Err(no_scripts());
    }

    Ok(discovered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn write_definitions(yaml_content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{yaml_content}").unwrap();
        temp_file
    }

    #[test]
    fn test_validate_id_valid() {
        assert!(validate_id("valid_id").is_ok());
        assert!(validate_id("test123").is_ok());
        assert!(validate_id("whats-your-name").is_ok());
    }

    #[test]
    fn test_validate_id_invalid() {
        assert!(matches!(validate_id(""), Err(EmptyId)));
        assert!(matches!(validate_id("has space"), Err(IdWithSpace(_))));
        assert!(matches!(validate_id("has:colon"), Err(IdWithColon(_))));
        assert!(matches!(validate_id("123"), Err(NumericId(_))));
    }

    #[test]
    fn test_get_script_definitions_resolves_relative_scripts() {
        let temp_file = write_definitions(
            r#"
- id: "greet"
  title: "What's your name?"
  detail_text: "Says hello."
  script: "scripts/whatsyourname.sh"
  prompt_label: "Name"
  placeholder_text: "Ada"
- id: "absolute"
  title: "Absolute"
  script: "/opt/absolute.sh"
"#,
        );
        let temp_path = temp_file.path().to_str().unwrap();
        let base_dir = temp_file.path().parent().unwrap();

        let definitions = get_script_definitions(temp_path).unwrap();

        assert_eq!(definitions.len(), 2);
        assert_eq!(definitions[0].prompt_label, "Name");
        assert_eq!(definitions[0].placeholder_text, "Ada");
        assert_eq!(
            definitions[0].script,
            base_dir.join("scripts/whatsyourname.sh")
        );
        assert_eq!(definitions[1].script, PathBuf::from("/opt/absolute.sh"));
    }

    #[test]
    fn test_get_script_definitions_empty_file() {
        let temp_file = write_definitions("[]");
        let result = get_script_definitions(temp_file.path().to_str().unwrap());
        assert!(matches!(result, Err(Error::EmptyScriptDefinition { .. })));
    }

    #[test]
    fn test_get_script_definitions_invalid_yaml() {
        let temp_file = write_definitions("invalid: yaml: content: [");
        let result = get_script_definitions(temp_file.path().to_str().unwrap());
        assert!(matches!(result, Err(Error::Yaml { .. })));
    }

    #[test]
    fn test_get_script_definitions_duplicate_ids() {
        let temp_file = write_definitions(
            r#"
- id: "one"
  title: "One"
  script: "a.sh"
- id: "one"
  title: "Another one"
  script: "b.sh"
"#,
        );
        let result = get_script_definitions(temp_file.path().to_str().unwrap());
        assert!(matches!(result, Err(NonUniqueScriptId(_))));
    }

    #[test]
    fn test_get_script_definitions_file_not_found() {
        let result = get_script_definitions("/this/path/does/not/exist.yml");
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn test_discover_scripts_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        for name in ["zeta.sh", "alpha.sh", "notes.txt"] {
            std::fs::write(dir.path().join(name), "echo hi\n").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.sh")).unwrap();

        let scripts = discover_scripts(dir.path().to_str().unwrap()).unwrap();

        let ids: Vec<&str> = scripts.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_discover_scripts_skips_invalid_names() {
        let dir = tempdir().unwrap();
        for name in ["hello.sh", "my script.sh", "123.sh", "a:b.sh"] {
            std::fs::write(dir.path().join(name), "echo hi\n").unwrap();
        }

        let scripts = discover_scripts(dir.path().to_str().unwrap()).unwrap();

        let ids: Vec<&str> = scripts.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["hello"]);
    }

    #[test]
    fn test_discover_scripts_skips_links_leaving_the_directory() {
        let outer = tempdir().unwrap();
        let scripts = outer.path().join("scripts");
        std::fs::create_dir(&scripts).unwrap();
        std::fs::write(outer.path().join("secret.sh"), "echo secret\n").unwrap();
        std::fs::write(scripts.join("hello.sh"), "echo hi\n").unwrap();
        std::os::unix::fs::symlink(outer.path().join("secret.sh"), scripts.join("secret.sh"))
            .unwrap();

        let discovered = discover_scripts(scripts.to_str().unwrap()).unwrap();

        assert_eq!(discovered.len(), 1);
        assert_eq!(discovered[0].id, "hello");
        assert_eq!(
            discovered[0].script,
            scripts.canonicalize().unwrap().join("hello.sh")
        );
    }

    #[test]
    fn test_resolve_script_in_dir() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("hello.sh"), "echo hi\n").unwrap();
        let scripts_dir = dir.path().to_str().unwrap();

        let resolved = resolve_script_in_dir(scripts_dir, "hello.sh").unwrap();
        assert!(resolved.ends_with("hello.sh"));

        assert!(matches!(
            resolve_script_in_dir(scripts_dir, "missing.sh"),
            Err(Error::ScriptNotFound { .. })
        ));
    }

    #[test]
    fn test_resolve_script_in_dir_rejects_escape() {
        let outer = tempdir().unwrap();
        let scripts = outer.path().join("scripts");
        std::fs::create_dir(&scripts).unwrap();
        std::fs::write(outer.path().join("secret.sh"), "echo secret\n").unwrap();

        let result = resolve_script_in_dir(scripts.to_str().unwrap(), "../secret.sh");
        assert!(matches!(result, Err(Error::ScriptOutsideDirectory { .. })));
    }

    #[test]
    fn test_load_script_definitions_prefers_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("discovered.sh"), "echo hi\n").unwrap();
        let definitions = dir.path().join("scripts.yml");
        std::fs::write(
            &definitions,
            "- id: configured\n  title: Configured\n  script: discovered.sh\n",
        )
        .unwrap();

        let loaded = load_script_definitions(
            definitions.to_str().unwrap(),
            dir.path().to_str().unwrap(),
        )
        .unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "configured");
        assert_eq!(loaded[0].script, dir.path().join("discovered.sh"));
    }

    #[test]
    fn test_load_script_definitions_falls_back_to_discovery() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("discovered.sh"), "echo hi\n").unwrap();
        let missing = dir.path().join("missing.yml");

        let loaded =
            load_script_definitions(missing.to_str().unwrap(), dir.path().to_str().unwrap())
                .unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "discovered");
    }

    #[test]
    fn test_load_script_definitions_nothing_found() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.yml");

        let result =
            load_script_definitions(missing.to_str().unwrap(), dir.path().to_str().unwrap());
        assert!(matches!(result, Err(Error::NoScripts { .. })));
    }
}
