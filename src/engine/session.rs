//! The production engine session: one owned R subprocess.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tracing::{debug, info, warn};

use crate::engine::{Engine, EngineConfig, EngineError, RecordMode};

/// Printed after every command so the read loop can tell where one
/// command's output ends. The reply is what the engine echoes for it.
const SENTINEL_COMMAND: &str = "print('---STATCHAIN EOT---')\n";
const SENTINEL_REPLY: &str = "[1] \"---STATCHAIN EOT---\"";

/// Sent once per spawn: dump frames on error instead of stopping the
/// session, and default plotting to the png device.
const SETUP_OPTIONS: &str = "options(error=dump.frames, device=png)";

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// A live engine subprocess and the state riding along with it.
///
/// Construct with [`RSession::spawn`], use through the [`Engine`] trait,
/// and tear down with [`RSession::close`]. Death of the subprocess is
/// detected lazily: the next `execute` fails with [`EngineError::Dead`]
/// and the session stays dead until an explicit [`RSession::restart`].
/// Nothing is retried automatically — engine-side variable names and
/// capture files are not transactional across a restart, so replay is the
/// caller's decision.
#[derive(Debug)]
pub struct RSession {
    config: EngineConfig,
    proc: Option<EngineProcess>,
    counter: u64,
    record_mode: RecordMode,
    transcript: String,
    capture: Option<PathBuf>,
}

#[derive(Debug)]
struct EngineProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    stderr: Lines<BufReader<ChildStderr>>,
    stderr_done: bool,
}

impl RSession {
    /// Spawn the configured engine binary and prime the session.
    ///
    /// Fails with [`EngineError::Unavailable`] when the binary cannot be
    /// spawned. When the config still points at the unqualified default,
    /// the conventional install locations are probed before giving up.
    pub async fn spawn(config: EngineConfig) -> Result<Self, EngineError> {
        let proc = spawn_process(&config)?;
        let record_mode = config.record;
        let mut session = Self {
            config,
            proc: Some(proc),
            counter: 0,
            record_mode,
            transcript: String::new(),
            capture: None,
        };
        session.execute_discard(SETUP_OPTIONS).await?;
        info!(binary = %session.config.binary.display(), "engine session started");
        Ok(session)
    }

    /// Kill any current subprocess and spawn a fresh one with the same
    /// configuration.
    ///
    /// The unique-name counter is not reset, so symbols handed out before
    /// the restart never collide with ones handed out after.
    pub async fn restart(&mut self) -> Result<(), EngineError> {
        self.close().await;
        self.proc = Some(spawn_process(&self.config)?);
        self.capture = None;
        self.execute_discard(SETUP_OPTIONS).await?;
        info!(binary = %self.config.binary.display(), "engine session restarted");
        Ok(())
    }

    /// Liveness probe: subprocess spawned and not yet exited.
    pub fn is_running(&mut self) -> bool {
        match self.proc.as_mut() {
            Some(proc) => matches!(proc.child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Terminate the subprocess. Idempotent; safe on a dead session.
    pub async fn close(&mut self) {
        let Some(proc) = self.proc.take() else {
            return;
        };
        let EngineProcess {
            mut child,
            mut stdin,
            ..
        } = proc;

        // Ask politely; the engine exits on quit once stdin closes.
        let _ = stdin.write_all(b"q()\n").await;
        let _ = stdin.shutdown().await;
        drop(stdin);

        if tokio::time::timeout(SHUTDOWN_GRACE, child.wait()).await.is_err() {
            warn!("engine ignored quit, killing");
            let _ = child.start_kill();
            let _ = child.wait().await;
        }
        debug!("engine session closed");
    }

    /// The configuration this session was spawned with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn teardown(&mut self) {
        if let Some(mut proc) = self.proc.take() {
            let _ = proc.child.start_kill();
            let _ = proc.child.wait().await;
        }
    }
}

#[async_trait]
impl Engine for RSession {
    async fn execute(&mut self, command: &str) -> Result<String, EngineError> {
        let trimmed = command.trim();
        if trimmed.is_empty() || trimmed.contains('\n') || trimmed.contains(';') {
            return Err(EngineError::MalformedCommand {
                command: command.to_string(),
            });
        }
        if self.record_mode.records_commands() {
            self.transcript.push_str(trimmed);
            self.transcript.push('\n');
        }
        debug!(command = trimmed, "engine execute");

        let payload = format!("{trimmed}\n{SENTINEL_COMMAND}");
        let outcome = match self.proc.as_mut() {
            None => return Err(EngineError::Dead),
            Some(proc) => converse(proc, &payload).await,
        };
        match outcome {
            Ok(Some((output, saw_error))) => {
                if self.record_mode.records_output() {
                    self.transcript.push_str(&output);
                }
                if saw_error {
                    return Err(EngineError::Execution { output });
                }
                Ok(output)
            }
            // Broken pipe or closed stream: the process is gone. Surface
            // death and leave resurrection to the caller.
            Ok(None) | Err(_) => {
                self.teardown().await;
                Err(EngineError::Dead)
            }
        }
    }

    fn unique_name(&mut self) -> String {
        self.counter += 1;
        format!("{}{}", self.config.symbol_prefix, self.counter)
    }

    fn set_record_mode(&mut self, mode: RecordMode) -> RecordMode {
        std::mem::replace(&mut self.record_mode, mode)
    }

    fn fetch_interaction(&mut self) -> String {
        std::mem::take(&mut self.transcript)
    }

    async fn start_graphic_output(&mut self) -> Result<PathBuf, EngineError> {
        if self.capture.is_some() {
            return Err(EngineError::CaptureMismatch);
        }
        let path = std::env::temp_dir().join(format!("{}.png", self.unique_name()));
        self.execute_discard(&format!("png(filename='{}')", path.display()))
            .await?;
        self.capture = Some(path.clone());
        Ok(path)
    }

    async fn stop_graphic_output(&mut self) -> Result<PathBuf, EngineError> {
        let path = self.capture.take().ok_or(EngineError::CaptureMismatch)?;
        self.execute_discard("dev.off()").await?;
        Ok(path)
    }
}

/// Run one command round-trip against the subprocess pipes.
///
/// Returns `Ok(None)` when the output stream closed before the sentinel,
/// i.e. the process died mid-command. stderr is folded into the output in
/// arrival order; lines racing the sentinel surface with the next command.
async fn converse(
    proc: &mut EngineProcess,
    payload: &str,
) -> std::io::Result<Option<(String, bool)>> {
    proc.stdin.write_all(payload.as_bytes()).await?;
    proc.stdin.flush().await?;

    let EngineProcess {
        stdout,
        stderr,
        stderr_done,
        ..
    } = proc;

    let mut output = String::new();
    let mut saw_error = false;
    loop {
        tokio::select! {
            line = stdout.next_line() => match line? {
                Some(line) if line == SENTINEL_REPLY => break,
                Some(line) => {
                    if line.starts_with("Error") {
                        saw_error = true;
                    }
                    output.push_str(&line);
                    output.push('\n');
                }
                None => return Ok(None),
            },
            line = stderr.next_line(), if !*stderr_done => match line {
                Ok(Some(line)) => {
                    if line.starts_with("Error") {
                        saw_error = true;
                    }
                    output.push_str(&line);
                    output.push('\n');
                }
                _ => *stderr_done = true,
            },
        }
    }
    Ok(Some((output, saw_error)))
}

fn spawn_process(config: &EngineConfig) -> Result<EngineProcess, EngineError> {
    match try_spawn(&config.binary, &config.args) {
        Ok(proc) => Ok(proc),
        Err(source) => {
            if config.uses_default_binary() {
                for candidate in EngineConfig::fallback_locations() {
                    if !candidate.exists() {
                        continue;
                    }
                    if let Ok(proc) = try_spawn(&candidate, &config.args) {
                        warn!(
                            binary = %candidate.display(),
                            "engine not on PATH, using fallback location"
                        );
                        return Ok(proc);
                    }
                }
            }
            Err(EngineError::Unavailable {
                binary: config.binary.clone(),
                source,
            })
        }
    }
}

fn try_spawn(binary: &std::path::Path, args: &[String]) -> std::io::Result<EngineProcess> {
    let mut child = Command::new(binary)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let take = |name: &str| std::io::Error::other(format!("engine {name} pipe missing"));
    let stdin = child.stdin.take().ok_or_else(|| take("stdin"))?;
    let stdout = child.stdout.take().ok_or_else(|| take("stdout"))?;
    let stderr = child.stderr.take().ok_or_else(|| take("stderr"))?;

    Ok(EngineProcess {
        child,
        stdin,
        stdout: BufReader::new(stdout).lines(),
        stderr: BufReader::new(stderr).lines(),
        stderr_done: false,
    })
}
