//! Picking a panel by ID or index, and asking for its argument.

use std::io::{BufRead, Write};

use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use script_panels_core::error::{Error, Result};
use script_panels_core::script_definitions::ScriptDefinition;

/// Finds a panel by ID, or by 0-based index (IDs are never purely numeric).
///
/// # Errors
///
/// Returns [`Error::ScriptNotFound`] carrying the closest ID as a suggestion.
pub fn find_definition<'a>(
    definitions: &'a [ScriptDefinition],
    id_or_index: &str,
) -> Result<&'a ScriptDefinition> {
    if let Some(definition) = definitions.iter().find(|d| d.id == id_or_index) {
        return Ok(definition);
    }

    if let Some(definition) = id_or_index
        .parse::<usize>()
        .ok()
        .and_then(|index| definitions.get(index))
    {
        return Ok(definition);
    }

    Err(Error::ScriptNotFound {
        id: id_or_index.to_string(),
        suggestion: suggest_id(definitions, id_or_index),
    })
}

/// Best fuzzy match for `pattern` among the panel IDs.
pub fn suggest_id(definitions: &[ScriptDefinition], pattern: &str) -> Option<String> {
    let matcher = SkimMatcherV2::default();

    definitions
        .iter()
        .filter_map(|d| matcher.fuzzy_match(&d.id, pattern).map(|score| (score, &d.id)))
        .max_by_key(|(score, _)| *score)
        .map(|(_, id)| id.clone())
}

/// Prints the panels with their index.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn print_definitions<W: Write>(definitions: &[ScriptDefinition], out: &mut W) -> Result<()> {
    for (index, definition) in definitions.iter().enumerate() {
        queue!(
            out,
            SetForegroundColor(Color::DarkGreen),
            Print(format!("[{index}] ")),
            ResetColor,
            SetAttribute(Attribute::Bold),
            Print(&definition.id),
            SetAttribute(Attribute::Reset),
            Print(format!(" {}\n", definition.title)),
        )?;

        if !definition.detail_text.is_empty() {
            queue!(out, Print(format!("    {}\n", definition.detail_text)))?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Asks for the panel's argument on `input`, using its prompt label and
/// placeholder. Returns the line without its line ending.
///
/// # Errors
///
/// Returns an error if reading or writing fails.
pub fn prompt_for_argument<I: BufRead, W: Write>(
    definition: &ScriptDefinition,
    input: &mut I,
    out: &mut W,
) -> Result<String> {
    queue!(out, Print(&definition.prompt_label))?;

    if !definition.placeholder_text.is_empty() {
        queue!(
            out,
            SetForegroundColor(Color::DarkGrey),
            Print(format!(" (e.g. {})", definition.placeholder_text)),
            ResetColor,
        )?;
    }

    queue!(out, Print(": "))?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
