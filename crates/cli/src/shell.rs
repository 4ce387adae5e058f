//! Terminal presentation of a panel run.
//!
//! Output chunks are written as they arrive, followed by the panel's status
//! line. All panel updates are applied from this single async loop.

use std::io::Write;

use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use log::debug;

use script_panels_core::error::Result;
use script_panels_core::panel::{PanelController, RunRequest, RunState};
use script_panels_core::runner::ScriptRunner;

/// How a panel run ended, from the terminal's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelOutcome {
    /// The argument was empty and nothing ran.
    Invalid,
    /// The script could not be launched.
    Failed,
    /// The script ran and exited with this code.
    Finished(i32),
    /// The event stream ended without a terminal event.
    Interrupted,
}

impl PanelOutcome {
    /// Process exit code for `sp`: the script's own code where possible.
    pub fn exit_code(self) -> u8 {
        match self {
            PanelOutcome::Finished(0) => 0,
            PanelOutcome::Finished(code) => u8::try_from(code.clamp(1, 255)).unwrap_or(1),
            PanelOutcome::Invalid | PanelOutcome::Failed | PanelOutcome::Interrupted => 1,
        }
    }
}

fn print_status<W: Write>(out: &mut W, status: &str, color: Color) -> Result<()> {
    queue!(
        out,
        SetForegroundColor(color),
        Print(status),
        ResetColor,
        Print("\n")
    )?;
    out.flush()?;
    Ok(())
}

/// Runs `panel` with `argument`, streaming its output to `out`.
///
/// # Errors
///
/// Returns an error only if writing to `out` fails; script failures are
/// reported through the returned [`PanelOutcome`].
pub async fn run_panel<R: ScriptRunner, W: Write>(
    panel: &mut PanelController<R>,
    argument: &str,
    out: &mut W,
) -> Result<PanelOutcome> {
    let mut events = match panel.request_run(argument) {
        RunRequest::Invalid => {
            print_status(out, panel.status_text(), Color::Yellow)?;
            return Ok(PanelOutcome::Invalid);
        }
        RunRequest::Failed => {
            print_status(out, panel.status_text(), Color::Red)?;
            return Ok(PanelOutcome::Failed);
        }
        RunRequest::Started(events) => events,
    };

    let mut printed_chunks = 0;
    let mut at_line_start = true;

    while let Some(update) = events.recv().await {
        if !panel.apply(update) {
            continue;
        }

        // The buffer only grows during a run, so print what is new.
        for chunk in &panel.output().chunks()[printed_chunks..] {
            queue!(out, Print(chunk))?;
            at_line_start = chunk.ends_with('\n');
        }
        printed_chunks = panel.output().chunks().len();
        out.flush()?;
    }

    if !at_line_start {
        queue!(out, Print("\n"))?;
    }

    let outcome = match panel.state() {
        RunState::Finished(code) => PanelOutcome::Finished(*code),
        _ => PanelOutcome::Interrupted,
    };
    debug!("Panel `{}` ended with {:?}", panel.definition().id, outcome);

    let color = match outcome {
        PanelOutcome::Finished(0) => Color::Green,
        _ => Color::Red,
    };
    print_status(out, panel.status_text(), color)?;

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code() {
        assert_eq!(PanelOutcome::Finished(0).exit_code(), 0);
        assert_eq!(PanelOutcome::Finished(3).exit_code(), 3);
        assert_eq!(PanelOutcome::Finished(-1).exit_code(), 1);
        assert_eq!(PanelOutcome::Finished(300).exit_code(), 255);
        assert_eq!(PanelOutcome::Invalid.exit_code(), 1);
        assert_eq!(PanelOutcome::Failed.exit_code(), 1);
        assert_eq!(PanelOutcome::Interrupted.exit_code(), 1);
    }
}
