use std::io::{Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{JoinHandle, spawn};
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use portable_pty::{
    Child, ChildKiller, CommandBuilder, ExitStatus, MasterPty, PtySize, native_pty_system,
};

use super::command::ShellCommand;
use super::keys::translate_key_event;
use super::messages::{format_exit_message, format_start_message};
use crate::host::TerminalSession;

const KEYBOARD_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, thiserror::Error)]
pub enum TerminalError {
    #[error("Terminal input is closed")]
    WriterDisconnected,
    #[error("Unable to open PTY: {0}")]
    PtyError(String),
    #[error("Process error: {0}")]
    Process(String),
    #[error("Console error: {0}")]
    Console(#[from] std::io::Error),
}

/// PTY dimensions in columns and rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalSize {
    cols: u16,
    rows: u16,
}

impl TerminalSize {
    #[must_use]
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols: cols.max(2),
            rows: rows.max(2),
        }
    }

    /// Size of the console itt runs in, 80x24 if it cannot be determined.
    #[must_use]
    pub fn from_console() -> Self {
        let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
        Self::new(cols, rows)
    }
}

impl From<TerminalSize> for PtySize {
    fn from(size: TerminalSize) -> Self {
        Self {
            cols: size.cols,
            rows: size.rows,
            pixel_width: 0,
            pixel_height: 0,
        }
    }
}

type SpawnedPty = (Box<dyn Child + Send + Sync>, Box<dyn MasterPty + Send>);

fn spawn_pty(shell: &ShellCommand, size: TerminalSize) -> Result<SpawnedPty, TerminalError> {
    debug!("Running PTY for shell: {shell:?}");

    let pty_system = native_pty_system();
    let pair = pty_system
        .openpty(size.into())
        .map_err(|e| TerminalError::PtyError(e.to_string()))?;

    let child = pair
        .slave
        .spawn_command(CommandBuilder::from(shell))
        .map_err(|e| TerminalError::Process(e.to_string()))?;

    drop(pair.slave); // This will make the reader close when the child process exits

    Ok((child, pair.master))
}

/// Session output on its way to stdout. Output is held back until the session is shown.
#[derive(Default)]
struct OutputSink {
    visible: AtomicBool,
    pending: Mutex<Vec<u8>>,
}

impl OutputSink {
    fn write(&self, bytes: &[u8]) {
        let mut pending = self.pending.lock();
        if self.visible.load(Ordering::Acquire) {
            write_stdout(bytes);
        } else {
            pending.extend_from_slice(bytes);
        }
    }

    fn reveal(&self, banner: &[u8]) {
        let mut pending = self.pending.lock();
        if self.visible.swap(true, Ordering::AcqRel) {
            return;
        }
        write_stdout(banner);
        write_stdout(&pending);
        pending.clear();
    }
}

fn write_stdout(bytes: &[u8]) {
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = stdout.write_all(bytes).and_then(|()| stdout.flush()) {
        debug!("Failed to write session output: {e}");
    }
}

/// Spawn a thread to read from the PTY and forward output to the sink
///
/// Returns a channel to receive the process exit status
fn spawn_pty_reader(
    mut reader: Box<dyn Read + Send>,
    mut process: Box<dyn Child + Send + Sync>,
    output: Arc<OutputSink>,
) -> crossbeam_channel::Receiver<ExitStatus> {
    let (status_tx, status_rx) = crossbeam_channel::bounded(1);

    spawn(move || {
        let mut buf = [0u8; 1024];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => {
                    debug!("PTY reader EOF");
                    break;
                }
                Ok(n) => output.write(&buf[..n]),
                Err(e) => {
                    // EIO is how Linux reports that the slave side closed
                    debug!("PTY reader stopped: {e:?}");
                    break;
                }
            }
        }

        // Wait for the process to exit
        match process.wait() {
            Ok(status) => {
                let _ = status_tx.send(status);
            }
            Err(e) => {
                error!("Failed to wait for process: {e:?}");
            }
        }
    });

    status_rx
}

#[derive(Debug)]
enum PtyUpdate {
    Resize(TerminalSize),
    Write(Vec<u8>),
    CloseInput,
    KillProcess,
}

fn spawn_pty_writer(
    writer: Box<dyn Write + Send>,
    master: Box<dyn MasterPty + Send>,
    mut killer: Box<dyn ChildKiller + Send + Sync>,
) -> crossbeam_channel::Sender<PtyUpdate> {
    let (pty_tx, pty_rx) = crossbeam_channel::bounded(1000);

    spawn(move || {
        let mut writer = Some(writer);
        loop {
            match pty_rx.recv() {
                Ok(PtyUpdate::Resize(size)) => {
                    if let Err(e) = master.resize(size.into()) {
                        error!("Failed to resize PTY: {e:?}");
                    }
                }
                Ok(PtyUpdate::Write(input)) => match writer.as_mut() {
                    Some(writer) => {
                        if let Err(e) = writer.write_all(&input).and_then(|()| writer.flush()) {
                            error!("Failed to write to PTY: {e:?}");
                        }
                    }
                    None => debug!("Dropping {} bytes written after input closed", input.len()),
                },
                Ok(PtyUpdate::CloseInput) => {
                    // Dropping the writer sends EOF to the shell
                    debug!("Closing PTY input");
                    writer = None;
                }
                Ok(PtyUpdate::KillProcess) => {
                    debug!("Killing process");
                    killer
                        .kill()
                        .unwrap_or_else(|e| debug!("Failed to kill process: {e:?}"));
                }
                Err(_) => {
                    debug!("PTY writer thread EOF");
                    break;
                }
            }
        }
    });

    pty_tx
}

/// Forwards console key presses to a session while it has focus.
///
/// The console is in raw mode for as long as the forwarder lives.
struct KeyboardForwarder {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl KeyboardForwarder {
    fn start(pty_tx: crossbeam_channel::Sender<PtyUpdate>) -> Result<Self, TerminalError> {
        crossterm::terminal::enable_raw_mode()?;
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);

        let handle = spawn(move || {
            while !thread_stop.load(Ordering::Acquire) {
                match event::poll(KEYBOARD_POLL_INTERVAL) {
                    Ok(false) => {}
                    Ok(true) => {
                        let update = match event::read() {
                            Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                                translate_key_event(&key).map(PtyUpdate::Write)
                            }
                            Ok(Event::Resize(cols, rows)) => {
                                Some(PtyUpdate::Resize(TerminalSize::new(cols, rows)))
                            }
                            Ok(_) => None,
                            Err(e) => {
                                error!("Console event error: {e}");
                                break;
                            }
                        };
                        if let Some(update) = update
                            && pty_tx.send(update).is_err()
                        {
                            break;
                        }
                    }
                    Err(e) => {
                        error!("Console event error: {e}");
                        break;
                    }
                }
            }
        });

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }
}

impl Drop for KeyboardForwarder {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("Keyboard forwarding thread panicked");
        }
        if let Err(e) = crossterm::terminal::disable_raw_mode() {
            warn!("Failed to restore console mode: {e}");
        }
    }
}

/// A shell running in a pseudo-terminal on behalf of one task
pub struct PtySession {
    name: String,
    pty_tx: crossbeam_channel::Sender<PtyUpdate>,
    status_rx: crossbeam_channel::Receiver<ExitStatus>,
    output: Arc<OutputSink>,
    preserve_focus: bool,
}

impl PtySession {
    /// Spawn `shell` in a new PTY of the given size.
    ///
    /// # Errors
    ///
    /// Returns `TerminalError::PtyError` if the PTY cannot be opened, or
    /// `TerminalError::Process` if the shell fails to spawn.
    pub fn open(name: &str, shell: &ShellCommand, size: TerminalSize) -> Result<Self, TerminalError> {
        let (process, master) = spawn_pty(shell, size)?;
        let reader = master
            .try_clone_reader()
            .map_err(|e| TerminalError::PtyError(format!("Failed to clone PTY reader: {e}")))?;
        let killer = process.clone_killer();
        let writer = master
            .take_writer()
            .map_err(|e| TerminalError::PtyError(format!("Failed to take PTY writer: {e}")))?;

        let output = Arc::new(OutputSink::default());
        let status_rx = spawn_pty_reader(reader, process, Arc::clone(&output));
        let pty_tx = spawn_pty_writer(writer, master, killer);

        info!("Opened terminal '{name}' running {}", shell.program);
        Ok(Self {
            name: name.to_string(),
            pty_tx,
            status_rx,
            output,
            preserve_focus: true,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn send_pty(&self, update: PtyUpdate) -> Result<(), TerminalError> {
        self.pty_tx
            .send(update)
            .map_err(|_| TerminalError::WriterDisconnected)
    }

    /// Write bytes to stdin of the shell.
    ///
    /// # Errors
    ///
    /// Returns `TerminalError::WriterDisconnected` if the PTY channel is closed.
    pub fn write(&self, input: Vec<u8>) -> Result<(), TerminalError> {
        self.send_pty(PtyUpdate::Write(input))
    }

    /// Close the shell's input, so it exits after the pending commands.
    ///
    /// # Errors
    ///
    /// Returns `TerminalError::WriterDisconnected` if the PTY channel is closed.
    pub fn close_input(&self) -> Result<(), TerminalError> {
        self.send_pty(PtyUpdate::CloseInput)
    }

    /// Kill the shell.
    ///
    /// # Errors
    ///
    /// Returns `TerminalError::WriterDisconnected` if the PTY channel is closed.
    pub fn kill(&self) -> Result<(), TerminalError> {
        self.send_pty(PtyUpdate::KillProcess)
    }

    /// Keep the session running until its shell exits, returning the exit code.
    ///
    /// A session that took focus gets the console keyboard in the meantime; any
    /// other session has its input closed so the shell exits after the command.
    /// Ctrl+C kills the shell.
    ///
    /// # Errors
    ///
    /// Returns `TerminalError::Console` if the console cannot be switched to raw
    /// mode, or `TerminalError::Process` if the exit status cannot be collected.
    pub async fn finish(self) -> Result<u32, TerminalError> {
        let keyboard = if self.preserve_focus {
            self.close_input()?;
            None
        } else {
            Some(KeyboardForwarder::start(self.pty_tx.clone())?)
        };

        let rx = self.status_rx.clone();
        let wait = tokio::task::spawn_blocking(move || rx.recv());
        tokio::pin!(wait);
        let joined = tokio::select! {
            joined = &mut wait => Some(joined),
            _ = tokio::signal::ctrl_c() => None,
        };
        let joined = match joined {
            Some(joined) => joined,
            None => {
                info!("Interrupted, killing '{}'", self.name);
                self.kill()?;
                wait.await
            }
        };
        let status = joined
            .map_err(|e| TerminalError::Process(format!("Task join error: {e}")))?
            .map_err(|_| TerminalError::Process("Process status channel closed".into()));
        drop(keyboard);

        let exit_code = status?.exit_code();
        info!("Terminal '{}' exited with code {exit_code}", self.name);
        self.output.write(&format_exit_message(&self.name, exit_code));
        Ok(exit_code)
    }
}

impl TerminalSession for PtySession {
    fn show(&mut self, preserve_focus: bool) {
        self.preserve_focus = preserve_focus;
        self.output.reveal(&format_start_message(&self.name));
    }

    fn send_text(&mut self, text: &str, execute: bool) -> Result<(), TerminalError> {
        let mut input = text.as_bytes().to_vec();
        if execute {
            input.push(b'\r');
        }
        self.write(input)
    }
}
