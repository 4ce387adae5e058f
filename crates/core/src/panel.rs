//! The state machine behind one script panel.
//!
//! All state changes go through `&mut self` on [`PanelController`]: the shell
//! calls [`PanelController::request_run`] on user input and feeds every
//! [`RunUpdate`] it receives to [`PanelController::apply`] from the same
//! update path. Runner tasks never touch panel state directly.

use log::{debug, warn};

use crate::runner::{RunEvent, RunEvents, RunHandle, RunId, RunUpdate, ScriptRunner};
use crate::script_definitions::ScriptDefinition;

pub const READY_STATUS: &str = "Ready.";
pub const RUNNING_STATUS: &str = "Running…";
pub const VALIDATION_MESSAGE: &str = "Enter a value before running.";
pub const NO_OUTPUT_MARKER: &str = "(no output)";
/// Shown in the output view before the first run.
pub const OUTPUT_PLACEHOLDER: &str = "Output will appear here.";

#[derive(Debug)]
pub enum RunState<H> {
    Idle,
    Running { run: RunId, handle: H },
    Finished(i32),
    Failed(String),
}

impl<H> RunState<H> {
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running { .. })
    }
}

/// Output of the current run, in arrival order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OutputBuffer {
    chunks: Vec<String>,
}

impl OutputBuffer {
    pub fn push(&mut self, chunk: impl Into<String>) {
        self.chunks.push(chunk.into());
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.iter().all(String::is_empty)
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn text(&self) -> String {
        self.chunks.concat()
    }
}

/// Outcome of [`PanelController::request_run`].
#[derive(Debug)]
pub enum RunRequest {
    /// The argument was empty; nothing was spawned.
    Invalid,
    /// The script is running. The shell must pump these events into
    /// [`PanelController::apply`].
    Started(RunEvents),
    /// The script could not be launched; see the status text.
    Failed,
}

pub struct PanelController<R: ScriptRunner> {
    definition: ScriptDefinition,
    runner: R,
    state: RunState<R::Handle>,
    output: OutputBuffer,
    status: String,
    last_run: RunId,
}

impl<R: ScriptRunner> PanelController<R> {
    pub fn new(definition: ScriptDefinition, runner: R) -> Self {
        Self {
            definition,
            runner,
            state: RunState::Idle,
            output: OutputBuffer::default(),
            status: READY_STATUS.to_string(),
            last_run: RunId::default(),
        }
    }

    pub fn definition(&self) -> &ScriptDefinition {
        &self.definition
    }

    pub fn state(&self) -> &RunState<R::Handle> {
        &self.state
    }

    pub fn output(&self) -> &OutputBuffer {
        &self.output
    }

    pub fn status_text(&self) -> &str {
        &self.status
    }

    pub fn output_text(&self) -> String {
        match self.state {
            RunState::Idle => OUTPUT_PLACEHOLDER.to_string(),
            _ => self.output.text(),
        }
    }

    pub fn is_run_enabled(&self) -> bool {
        !self.state.is_running()
    }

    /// Starts the panel's script with `argument` (trimmed).
    ///
    /// A run already in flight is detached first, so its output can never
    /// reach the fresh buffer.
    pub fn request_run(&mut self, argument: &str) -> RunRequest {
        let argument = argument.trim();

        if argument.is_empty() {
            if self.state.is_running() {
                debug!("Ignoring empty run request on `{}` while running", self.definition.id);
            } else {
                self.status = VALIDATION_MESSAGE.to_string();
            }
            return RunRequest::Invalid;
        }

        self.detach();
        self.output.clear();
        self.status.clear();

        let run = self.last_run.next();
        self.last_run = run;

        match self
            .runner
            .start(run, self.definition.script_path(), argument)
        {
            Ok((handle, events)) => {
                self.state = RunState::Running { run, handle };
                self.status = RUNNING_STATUS.to_string();
                RunRequest::Started(events)
            }
            Err(e) => {
                let reason = e.to_string();
                warn!("Could not run `{}`: {}", self.definition.id, reason);
                self.status = format!("Failed to run script: {reason}");
                self.state = RunState::Failed(reason);
                RunRequest::Failed
            }
        }
    }

    /// Applies one update from the runner. Returns `false` for updates that
    /// belong to a detached or finished run; those are dropped.
    pub fn apply(&mut self, update: RunUpdate) -> bool {
        let current = match &self.state {
            RunState::Running { run, .. } => *run,
            _ => {
                debug!("Dropping update for {} with no run in flight", update.run);
                return false;
            }
        };

        if update.run != current {
            debug!("Dropping stale update for {} (current {})", update.run, current);
            return false;
        }

        match update.event {
            RunEvent::Chunk(text) => self.output.push(text),
            RunEvent::Terminated(exit_code) => {
                if self.output.is_empty() {
                    self.output.push(NO_OUTPUT_MARKER);
                }
                self.status = format!("Finished with status {exit_code}.");
                self.state = RunState::Finished(exit_code);
            }
        }

        true
    }

    /// Detaches any run in flight and returns the panel to its initial state.
    pub fn close(&mut self) {
        self.detach();
        self.output.clear();
        self.status = READY_STATUS.to_string();
    }

    fn detach(&mut self) {
        if let RunState::Running { run, mut handle } =
            std::mem::replace(&mut self.state, RunState::Idle)
        {
            debug!("Detaching {} of `{}`", run, self.definition.id);
            handle.cancel_or_detach();
        }
    }
}

impl<R: ScriptRunner> Drop for PanelController<R> {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::runner::RunSender;
    use std::cell::{Cell, RefCell};
    use std::path::{Path, PathBuf};
    use std::rc::Rc;

    struct FakeStart {
        run: RunId,
        argument: String,
        sender: RunSender,
        cancelled: Rc<Cell<bool>>,
    }

    #[derive(Default, Clone)]
    struct FakeRunner {
        starts: Rc<RefCell<Vec<FakeStart>>>,
        fail: bool,
    }

    struct FakeHandle {
        cancelled: Rc<Cell<bool>>,
    }

    impl RunHandle for FakeHandle {
        fn cancel_or_detach(&mut self) {
            self.cancelled.set(true);
        }
    }

    impl ScriptRunner for FakeRunner {
        type Handle = FakeHandle;

        fn start(
            &self,
            run: RunId,
            script: &Path,
            argument: &str,
        ) -> Result<(FakeHandle, RunEvents)> {
            if self.fail {
                return Err(Error::script_unavailable(
                    script.display().to_string(),
                    std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
                ));
            }

            let (sender, events) = RunEvents::channel(run);
            let cancelled = Rc::new(Cell::new(false));
            self.starts.borrow_mut().push(FakeStart {
                run,
                argument: argument.to_string(),
                sender,
                cancelled: cancelled.clone(),
            });
            Ok((FakeHandle { cancelled }, events))
        }
    }

    fn definition() -> ScriptDefinition {
        ScriptDefinition {
            id: "whatsyourname".to_string(),
            title: "What's your name?".to_string(),
            detail_text: "Says hello.".to_string(),
            script: PathBuf::from("/scripts/whatsyourname.sh"),
            prompt_label: "Name".to_string(),
            placeholder_text: "Ada".to_string(),
        }
    }

    fn controller() -> (PanelController<FakeRunner>, FakeRunner) {
        let runner = FakeRunner::default();
        (PanelController::new(definition(), runner.clone()), runner)
    }

    fn chunk(run: RunId, text: &str) -> RunUpdate {
        RunUpdate {
            run,
            event: RunEvent::Chunk(text.to_string()),
        }
    }

    fn terminated(run: RunId, exit_code: i32) -> RunUpdate {
        RunUpdate {
            run,
            event: RunEvent::Terminated(exit_code),
        }
    }

    #[test]
    fn test_initial_state() {
        let (panel, _) = controller();
        assert!(matches!(panel.state(), RunState::Idle));
        assert_eq!(panel.status_text(), READY_STATUS);
        assert_eq!(panel.output_text(), OUTPUT_PLACEHOLDER);
        assert!(panel.is_run_enabled());
    }

    #[test]
    fn test_empty_arguments_never_spawn() {
        let (mut panel, runner) = controller();

        for argument in ["", " ", "\t\n", "   \r\n  "] {
            assert!(matches!(panel.request_run(argument), RunRequest::Invalid));
            assert!(matches!(panel.state(), RunState::Idle));
            assert_eq!(panel.status_text(), VALIDATION_MESSAGE);
            assert!(panel.is_run_enabled());
        }

        assert!(runner.starts.borrow().is_empty());
    }

    #[test]
    fn test_successful_run() {
        let (mut panel, runner) = controller();

        assert!(matches!(panel.request_run("  Ada "), RunRequest::Started(_)));
        assert!(panel.state().is_running());
        assert!(!panel.is_run_enabled());
        assert_eq!(panel.status_text(), RUNNING_STATUS);
        assert_eq!(panel.output_text(), "");

        let run = runner.starts.borrow()[0].run;
        assert_eq!(runner.starts.borrow()[0].argument, "Ada");

        assert!(panel.apply(chunk(run, "Hello, ")));
        assert!(panel.apply(chunk(run, "Ada!")));
        assert_eq!(panel.output_text(), "Hello, Ada!");
        assert!(!panel.is_run_enabled());

        assert!(panel.apply(terminated(run, 0)));
        assert!(matches!(panel.state(), RunState::Finished(0)));
        assert_eq!(panel.output_text(), "Hello, Ada!");
        assert_eq!(panel.output().chunks(), ["Hello, ", "Ada!"]);
        assert_eq!(panel.status_text(), "Finished with status 0.");
        assert!(panel.is_run_enabled());
    }

    #[test]
    fn test_no_output_marker() {
        let (mut panel, runner) = controller();
        panel.request_run("Ada");
        let run = runner.starts.borrow()[0].run;

        panel.apply(terminated(run, 0));
        assert_eq!(panel.output_text(), NO_OUTPUT_MARKER);
    }

    #[test]
    fn test_no_output_marker_on_non_zero_exit() {
        let (mut panel, runner) = controller();
        panel.request_run("Ada");
        let run = runner.starts.borrow()[0].run;

        panel.apply(terminated(run, 2));
        assert!(matches!(panel.state(), RunState::Finished(2)));
        assert_eq!(panel.output_text(), NO_OUTPUT_MARKER);
        assert_eq!(panel.status_text(), "Finished with status 2.");
    }

    #[test]
    fn test_second_run_supersedes_first() {
        let (mut panel, runner) = controller();

        panel.request_run("first");
        let first = runner.starts.borrow()[0].run;
        panel.apply(chunk(first, "from first\n"));

        panel.request_run("second");
        let second = runner.starts.borrow()[1].run;
        assert_ne!(first, second);
        assert!(runner.starts.borrow()[0].cancelled.get());
        assert!(!runner.starts.borrow()[1].cancelled.get());
        assert_eq!(panel.output_text(), "");
        assert_eq!(panel.status_text(), RUNNING_STATUS);

        // Late events from the first run are dropped.
        assert!(!panel.apply(chunk(first, "late\n")));
        assert!(!panel.apply(terminated(first, 0)));
        assert!(panel.state().is_running());

        panel.apply(chunk(second, "from second\n"));
        panel.apply(terminated(second, 0));
        assert_eq!(panel.output_text(), "from second\n");
    }

    #[test]
    fn test_empty_argument_while_running_keeps_run() {
        let (mut panel, runner) = controller();
        panel.request_run("Ada");

        assert!(matches!(panel.request_run(" "), RunRequest::Invalid));
        assert!(panel.state().is_running());
        assert_eq!(panel.status_text(), RUNNING_STATUS);
        assert!(!runner.starts.borrow()[0].cancelled.get());
    }

    #[test]
    fn test_spawn_failure() {
        let runner = FakeRunner {
            fail: true,
            ..FakeRunner::default()
        };
        let mut panel = PanelController::new(definition(), runner);

        assert!(matches!(panel.request_run("Ada"), RunRequest::Failed));
        assert!(matches!(panel.state(), RunState::Failed(_)));
        assert!(panel.status_text().starts_with("Failed to run script: "));
        assert!(panel.status_text().contains("No such file or directory"));
        assert_eq!(panel.output_text(), "");
        assert!(panel.is_run_enabled());
    }

    #[test]
    fn test_spawn_failure_clears_previous_output() {
        let (mut panel, runner) = controller();
        panel.request_run("Ada");
        let run = runner.starts.borrow()[0].run;
        panel.apply(chunk(run, "old output"));
        panel.apply(terminated(run, 0));

        panel.runner.fail = true;
        panel.request_run("Ada");
        assert!(panel.output().is_empty());
        assert!(matches!(panel.state(), RunState::Failed(_)));
    }

    #[test]
    fn test_updates_without_run_are_dropped() {
        let (mut panel, _) = controller();
        assert!(!panel.apply(chunk(RunId(1), "nobody asked")));
        assert_eq!(panel.output_text(), OUTPUT_PLACEHOLDER);
    }

    #[test]
    fn test_close_detaches() {
        let (mut panel, runner) = controller();
        panel.request_run("Ada");
        let run = runner.starts.borrow()[0].run;

        panel.close();
        assert!(runner.starts.borrow()[0].cancelled.get());
        assert!(matches!(panel.state(), RunState::Idle));
        assert_eq!(panel.status_text(), READY_STATUS);
        assert!(!panel.apply(chunk(run, "late")));
    }

    #[test]
    fn test_drop_detaches() {
        let (mut panel, runner) = controller();
        panel.request_run("Ada");
        drop(panel);
        assert!(runner.starts.borrow()[0].cancelled.get());
    }

    #[tokio::test]
    async fn test_pumping_events_through_channel() {
        let (mut panel, runner) = controller();
        let RunRequest::Started(mut events) = panel.request_run("Ada") else {
            panic!("run did not start");
        };

        {
            let starts = runner.starts.borrow();
            let sender = &starts[0].sender;
            assert!(sender.chunk("Hello, Ada!"));
            assert!(sender.terminated(0));
        }
        runner.starts.borrow_mut().clear();

        while let Some(update) = events.recv().await {
            panel.apply(update);
        }

        assert_eq!(panel.output_text(), "Hello, Ada!");
        assert_eq!(panel.status_text(), "Finished with status 0.");
        assert!(panel.is_run_enabled());
    }
}
