//! Engine bridge: one external statistics subprocess behind a typed API.
//!
//! The bridge has three layers:
//!
//! - [`RSession`]: owns the subprocess, speaks the line protocol
//!   (statement out, read until sentinel), records interactions, and
//!   allocates unique engine-side symbols.
//! - [`parse`]: strict typed parsers for the bracketed-index vector text
//!   the engine prints (`[1] 7.889`).
//! - [`Engine`]: the capability trait the computation graph is written
//!   against, so tests can substitute a scripted double for the real
//!   subprocess.
//!
//! The session is an explicitly owned value. There is no process-wide
//! instance: construct one with [`RSession::spawn`], pass it around as
//! `&mut dyn Engine`, and call [`RSession::close`] when done. Exclusive
//! `&mut` access is what guarantees the one-in-flight-command invariant;
//! wrap the session in a mutex only if it must be shared across tasks.

mod config;
pub mod parse;
mod session;

use std::path::PathBuf;

use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;

use crate::graph::Column;

pub use config::EngineConfig;
pub use parse::ParseError;
pub use session::RSession;

// ============================================================================
// Recording
// ============================================================================

/// What [`Engine::execute`] appends to the interaction log.
///
/// The log exists for diagnostics and for capturing the program text of a
/// recomputation; it never affects computed results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordMode {
    /// Record nothing.
    #[default]
    Disabled,
    /// Record the commands sent to the engine.
    CommandsOnly,
    /// Record the output the engine produced.
    OutputOnly,
    /// Record both commands and output.
    Full,
}

impl RecordMode {
    /// True if commands sent to the engine should be logged.
    pub fn records_commands(self) -> bool {
        matches!(self, RecordMode::CommandsOnly | RecordMode::Full)
    }

    /// True if output read back from the engine should be logged.
    pub fn records_output(self) -> bool {
        matches!(self, RecordMode::OutputOnly | RecordMode::Full)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors raised by the engine bridge.
///
/// Parse failures are local to one command and leave the session usable;
/// [`EngineError::Dead`] means the subprocess is gone and only an explicit
/// [`RSession::restart`] brings it back. Nothing here is fatal to the host
/// process.
#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    /// The engine binary could not be located or spawned.
    #[error("engine binary {binary:?} could not be started")]
    #[diagnostic(
        code(statchain::engine::unavailable),
        help("check the configured binary path or set STATCHAIN_ENGINE")
    )]
    Unavailable {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A command was attempted against a terminated subprocess.
    #[error("engine process has exited")]
    #[diagnostic(
        code(statchain::engine::dead),
        help("restart the session with RSession::restart before retrying")
    )]
    Dead,

    /// The engine itself reported an error while evaluating a command.
    #[error("engine reported an evaluation error:\n{output}")]
    #[diagnostic(code(statchain::engine::execution))]
    Execution { output: String },

    /// The command contained an embedded separator and was refused.
    ///
    /// Multiple statements in one `execute` call would desynchronize the
    /// sentinel discipline and hang the read loop.
    #[error("execute() accepts a single statement, got {command:?}")]
    #[diagnostic(code(statchain::engine::malformed_command))]
    MalformedCommand { command: String },

    /// Graphic capture calls were not bracketed start/stop.
    #[error("graphic capture start/stop calls are unbalanced")]
    #[diagnostic(
        code(statchain::engine::capture_mismatch),
        help("bracket exactly one plotting command between start and stop")
    )]
    CaptureMismatch,

    /// Engine output did not match the requested type grammar.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),
}

// ============================================================================
// Capability trait
// ============================================================================

/// The engine capability the computation graph is written against.
///
/// [`RSession`] is the production implementation; tests drive the graph
/// with an in-memory scripted double. All methods take `&mut self`: the
/// engine is a single exclusively-owned resource and at most one command
/// is in flight at a time.
///
/// The typed `execute_*` and `assign_*` helpers are provided methods built
/// on [`Engine::execute`] plus the [`parse`] module, mirroring how callers
/// compose commands: serialize inputs into named variables, run one
/// statement over them, parse the printed result.
#[async_trait]
pub trait Engine: Send {
    /// Send one statement to the engine and return everything it printed
    /// before signalling readiness for the next command.
    ///
    /// Fails with [`EngineError::Dead`] if the subprocess has exited; the
    /// session is never resurrected implicitly. There is no timeout: the
    /// call blocks until the engine answers or dies (an implementation
    /// adding a timeout must surface expiry as [`EngineError::Dead`]).
    async fn execute(&mut self, command: &str) -> Result<String, EngineError>;

    /// Allocate an engine-side symbol never returned before by this
    /// instance. Derived commands compose freely without name collisions.
    fn unique_name(&mut self) -> String;

    /// Switch the interaction recording mode, returning the prior one.
    fn set_record_mode(&mut self, mode: RecordMode) -> RecordMode;

    /// Drain and clear the interaction log recorded so far.
    fn fetch_interaction(&mut self) -> String;

    /// Redirect subsequent plotting output into a fresh file and return
    /// its path. Must be paired with [`Engine::stop_graphic_output`]
    /// around exactly one plotting command.
    async fn start_graphic_output(&mut self) -> Result<PathBuf, EngineError>;

    /// Close the current graphic capture and return the path it wrote to.
    async fn stop_graphic_output(&mut self) -> Result<PathBuf, EngineError>;

    /// [`Engine::execute`], discarding whatever the command printed.
    async fn execute_discard(&mut self, command: &str) -> Result<(), EngineError> {
        self.execute(command).await.map(|_| ())
    }

    /// Execute a command and parse its output as exactly one number.
    async fn execute_number(&mut self, command: &str) -> Result<f64, EngineError> {
        let output = self.execute(command).await?;
        Ok(parse::parse_number(&output)?)
    }

    /// Execute a command and parse its output as exactly one boolean.
    async fn execute_bool(&mut self, command: &str) -> Result<bool, EngineError> {
        let output = self.execute(command).await?;
        Ok(parse::parse_bool(&output)?)
    }

    /// Execute a command and parse its output as exactly one string.
    async fn execute_string(&mut self, command: &str) -> Result<String, EngineError> {
        let output = self.execute(command).await?;
        Ok(parse::parse_string(&output)?)
    }

    /// Execute a command and parse its output as an ordered number vector.
    async fn execute_number_array(&mut self, command: &str) -> Result<Vec<f64>, EngineError> {
        let output = self.execute(command).await?;
        Ok(parse::parse_number_array(&output)?)
    }

    /// Execute a command and parse its output as an ordered boolean vector.
    async fn execute_bool_array(&mut self, command: &str) -> Result<Vec<bool>, EngineError> {
        let output = self.execute(command).await?;
        Ok(parse::parse_bool_array(&output)?)
    }

    /// Execute a command and parse its output as an ordered string vector.
    async fn execute_string_array(&mut self, command: &str) -> Result<Vec<String>, EngineError> {
        let output = self.execute(command).await?;
        Ok(parse::parse_string_array(&output)?)
    }

    /// Run a command and store its result in a fresh unique variable,
    /// returning the variable name.
    async fn execute_save(&mut self, command: &str) -> Result<String, EngineError> {
        let name = self.unique_name();
        self.execute_discard(&format!("{name} = {command}")).await?;
        Ok(name)
    }

    /// Serialize a scalar into a fresh engine variable, returning its name.
    async fn assign_scalar(&mut self, value: f64) -> Result<String, EngineError> {
        let name = self.unique_name();
        self.execute_discard(&format!("{name} = {}", fmt_number(value)))
            .await?;
        Ok(name)
    }

    /// Serialize a string into a fresh engine variable, returning its name.
    async fn assign_string(&mut self, value: &str) -> Result<String, EngineError> {
        let name = self.unique_name();
        self.execute_discard(&format!("{name} = \"{}\"", escape_literal(value)))
            .await?;
        Ok(name)
    }

    /// Serialize a whole column into a fresh engine vector variable,
    /// returning its name.
    async fn assign_column(&mut self, column: &Column) -> Result<String, EngineError> {
        let name = self.unique_name();
        self.execute_discard(&format!("{name} = {}", column.engine_literal()))
            .await?;
        Ok(name)
    }
}

// ============================================================================
// Wire-format helpers
// ============================================================================

/// Render a number the way the engine's own literals spell it.
pub(crate) fn fmt_number(value: f64) -> String {
    if value.is_infinite() {
        if value > 0.0 { "Inf" } else { "-Inf" }.to_string()
    } else {
        // Covers NaN too; the engine accepts the literal NaN.
        value.to_string()
    }
}

/// Escape a string for embedding in a double-quoted engine literal.
pub(crate) fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
