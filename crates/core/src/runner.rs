//! Launching panel scripts and streaming their output.
//!
//! A run is started with [`ScriptRunner::start`], which returns a handle used
//! to detach the run and a [`RunEvents`] receiver. Output is read on a tokio
//! task and only ever travels to the owner through that channel; whoever
//! holds the receiver applies the updates on its own update path.

use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io;
use std::os::fd::OwnedFd;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::io::AsyncReadExt;
use tokio::net::unix::pipe;
use tokio::process::{Child, Command};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::config::DEFAULT_INTERPRETER;
use crate::error::{Error, Result};

const READ_BUFFER_SIZE: usize = 4096;

/// How long output is still read once the interpreter has exited.
const DRAIN_TIMEOUT: Duration = Duration::from_millis(200);

/// Exit code reported when the exit status of a child could not be read.
pub const UNKNOWN_EXIT_CODE: i32 = -1;

/// Identifies one run of one panel. Increases with every start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RunId(pub u64);

impl RunId {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Display for RunId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "run #{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// Merged stdout/stderr text, in the order the process wrote it.
    Chunk(String),
    /// The process exited. Always the last event of a run.
    Terminated(i32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunUpdate {
    pub run: RunId,
    pub event: RunEvent,
}

/// Sending half of a run's event channel.
#[derive(Debug, Clone)]
pub struct RunSender {
    run: RunId,
    sender: UnboundedSender<RunUpdate>,
}

impl RunSender {
    /// Sends a chunk. Returns `false` once the receiving side is gone.
    pub fn chunk(&self, text: impl Into<String>) -> bool {
        self.send(RunEvent::Chunk(text.into()))
    }

    /// Sends the terminal event. Returns `false` once the receiving side is gone.
    pub fn terminated(&self, exit_code: i32) -> bool {
        self.send(RunEvent::Terminated(exit_code))
    }

    fn send(&self, event: RunEvent) -> bool {
        self.sender
            .send(RunUpdate {
                run: self.run,
                event,
            })
            .is_ok()
    }
}

/// Receiving half of a run's event channel. The stream ends after the
/// terminal event, or early when the run is detached.
#[derive(Debug)]
pub struct RunEvents {
    run: RunId,
    receiver: UnboundedReceiver<RunUpdate>,
}

impl RunEvents {
    pub fn channel(run: RunId) -> (RunSender, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (RunSender { run, sender }, Self { run, receiver })
    }

    pub fn run(&self) -> RunId {
        self.run
    }

    pub async fn recv(&mut self) -> Option<RunUpdate> {
        self.receiver.recv().await
    }
}

/// Handle on an in-flight run.
pub trait RunHandle {
    /// Stops delivery of further events and releases the run's resources.
    /// Safe to call after the process has exited, and more than once.
    fn cancel_or_detach(&mut self);
}

/// Launches `<interpreter> <script> <argument>` runs.
pub trait ScriptRunner {
    type Handle: RunHandle;

    /// Starts a run. Failures to launch are reported here, never as events.
    ///
    /// # Errors
    ///
    /// Returns an error if the script is missing or unreadable, or if the
    /// interpreter cannot be spawned.
    fn start(&self, run: RunId, script: &Path, argument: &str)
        -> Result<(Self::Handle, RunEvents)>;
}

/// [`ScriptRunner`] backed by real child processes.
///
/// Each run gets its own process group. stdout and stderr share one pipe, so
/// the chunk stream keeps the order in which the process wrote them.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    interpreter: String,
    working_directory: Option<PathBuf>,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(DEFAULT_INTERPRETER)
    }
}

impl ProcessRunner {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            working_directory: None,
        }
    }

    #[must_use]
    pub fn with_working_directory(mut self, working_directory: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(working_directory.into());
        self
    }
}

fn check_script(script: &Path) -> Result<()> {
    let display = script.display().to_string();
    let file = File::open(script).map_err(|e| Error::script_unavailable(display.clone(), e))?;
    let metadata = file
        .metadata()
        .map_err(|e| Error::script_unavailable(display.clone(), e))?;

    if !metadata.is_file() {
        return Err(Error::ScriptNotAFile(display));
    }

    Ok(())
}

impl ScriptRunner for ProcessRunner {
    type Handle = ProcessHandle;

    fn start(
        &self,
        run: RunId,
        script: &Path,
        argument: &str,
    ) -> Result<(ProcessHandle, RunEvents)> {
        check_script(script)?;

        let (reader, writer) = io::pipe()?;
        let error_writer = writer.try_clone()?;

        let mut command = Command::new(&self.interpreter);
        command
            .arg(script)
            .arg(argument)
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(error_writer)
            .process_group(0)
            .kill_on_drop(true);

        if let Some(working_directory) = &self.working_directory {
            command.current_dir(working_directory);
        }

        let spawned = command.spawn();
        // Closes the parent's write ends, otherwise the pipe never reaches EOF.
        drop(command);

        let child = spawned.map_err(|e| Error::spawn_error(self.interpreter.clone(), e))?;
        let output = pipe::Receiver::from_owned_fd(OwnedFd::from(reader))?;

        // The child leads its own group, so its pid is the group id.
        let process_group = child.id();
        info!(
            "Started {} of `{}` with {} (pid {:?})",
            run,
            script.display(),
            self.interpreter,
            process_group
        );

        let (sender, events) = RunEvents::channel(run);
        let task = tokio::spawn(forward_output(child, output, sender));

        Ok((
            ProcessHandle {
                run,
                process_group,
                task,
            },
            events,
        ))
    }
}

/// Handle on a child process started by [`ProcessRunner`].
///
/// Detaching kills the run's whole process group and aborts the forwarding
/// task, which owns the child.
#[derive(Debug)]
pub struct ProcessHandle {
    run: RunId,
    process_group: Option<u32>,
    task: JoinHandle<()>,
}

impl RunHandle for ProcessHandle {
    fn cancel_or_detach(&mut self) {
        if self.task.is_finished() {
            return;
        }

        debug!("Detaching {}", self.run);
        if let Some(process_group) = self.process_group {
            kill_process_group(process_group);
        }
        self.task.abort();
    }
}

fn kill_process_group(process_group: u32) {
    let Ok(pgid) = libc::pid_t::try_from(process_group) else {
        return;
    };

    // SAFETY: kill(2) takes no pointers. A negative pid addresses the group.
    let rc = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if rc != 0 {
        debug!(
            "Could not kill process group {}: {}",
            pgid,
            io::Error::last_os_error()
        );
    }
}

async fn forward_output(mut child: Child, output: pipe::Receiver, sender: RunSender) {
    let mut pump = OutputPump::new(output, &sender);

    // The exit ends the run, not EOF: background processes may hold the pipe.
    let status = loop {
        tokio::select! {
            open = pump.read_chunk() => {
                if !open {
                    break child.wait().await;
                }
            }
            status = child.wait() => {
                if timeout(DRAIN_TIMEOUT, pump.drain()).await.is_err() {
                    debug!("Output of {} still open after exit", sender.run);
                }
                break status;
            }
        }
    };
    pump.finish();

    let exit_code = match status {
        Ok(status) => exit_code(status),
        Err(e) => {
            warn!("Could not read exit status of {}: {}", sender.run, e);
            UNKNOWN_EXIT_CODE
        }
    };

    info!("{} exited with status {}", sender.run, exit_code);
    sender.terminated(exit_code);
}

/// Reads the merged output pipe and forwards decoded text as chunks.
struct OutputPump<'a> {
    output: pipe::Receiver,
    sender: &'a RunSender,
    decoder: Utf8Decoder,
    buffer: Vec<u8>,
}

impl<'a> OutputPump<'a> {
    fn new(output: pipe::Receiver, sender: &'a RunSender) -> Self {
        Self {
            output,
            sender,
            decoder: Utf8Decoder::default(),
            buffer: vec![0u8; READ_BUFFER_SIZE],
        }
    }

    /// Forwards one read. Returns `false` at end of output, on a read error,
    /// or once nobody is listening. Safe to cancel between reads.
    async fn read_chunk(&mut self) -> bool {
        match self.output.read(&mut self.buffer).await {
            Ok(0) => false,
            Ok(read) => {
                let text = self.decoder.decode(&self.buffer[..read]);
                text.is_empty() || self.sender.chunk(text)
            }
            Err(e) => {
                warn!("Error reading output of {}: {}", self.sender.run, e);
                false
            }
        }
    }

    async fn drain(&mut self) {
        while self.read_chunk().await {}
    }

    fn finish(mut self) {
        let rest = self.decoder.finish();
        if !rest.is_empty() {
            self.sender.chunk(rest);
        }
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(UNKNOWN_EXIT_CODE)
}

/// Incremental UTF-8 decoding of a byte stream.
///
/// A multi-byte sequence split across reads is held back until the rest
/// arrives; invalid bytes become U+FFFD.
#[derive(Debug, Default)]
pub(crate) struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub(crate) fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut text = String::new();

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(valid) => {
                    text.push_str(valid);
                    self.pending.clear();
                    return text;
                }
                Err(e) => {
                    let (valid, rest) = self.pending.split_at(e.valid_up_to());
                    text.push_str(&String::from_utf8_lossy(valid));

                    match e.error_len() {
                        // Incomplete sequence at the end, wait for more bytes.
                        None => {
                            self.pending = rest.to_vec();
                            return text;
                        }
                        Some(invalid) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            self.pending = rest[invalid..].to_vec();
                        }
                    }
                }
            }
        }
    }

    pub(crate) fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).to_string();
        self.pending.clear();
        rest
    }
}
