#![allow(dead_code)]

//! Shared fixtures: a scripted in-memory engine and sample tables.

use std::path::PathBuf;

use async_trait::async_trait;

use statchain::{Column, DataTable, Engine, EngineError, RecordMode};

/// An [`Engine`] double answering from a pattern → reply table.
///
/// The first rule whose pattern is a substring of the command wins;
/// unmatched commands (assignments, setup) answer with empty output.
/// Every command is kept in `commands` for order assertions.
pub struct ScriptedEngine {
    rules: Vec<(String, String)>,
    pub commands: Vec<String>,
    counter: u64,
    record: RecordMode,
    transcript: String,
    capture: Option<PathBuf>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            commands: Vec::new(),
            counter: 0,
            record: RecordMode::Disabled,
            transcript: String::new(),
            capture: None,
        }
    }

    pub fn on(mut self, pattern: &str, reply: &str) -> Self {
        self.rules.push((pattern.to_string(), reply.to_string()));
        self
    }

    /// Commands containing `pattern`, in issue order.
    pub fn commands_matching(&self, pattern: &str) -> Vec<&str> {
        self.commands
            .iter()
            .filter(|c| c.contains(pattern))
            .map(String::as_str)
            .collect()
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Engine for ScriptedEngine {
    async fn execute(&mut self, command: &str) -> Result<String, EngineError> {
        if self.record.records_commands() {
            self.transcript.push_str(command);
            self.transcript.push('\n');
        }
        self.commands.push(command.to_string());
        let reply = self
            .rules
            .iter()
            .find(|(pattern, _)| command.contains(pattern.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_default();
        if self.record.records_output() {
            self.transcript.push_str(&reply);
        }
        Ok(reply)
    }

    fn unique_name(&mut self) -> String {
        self.counter += 1;
        format!("t{}", self.counter)
    }

    fn set_record_mode(&mut self, mode: RecordMode) -> RecordMode {
        std::mem::replace(&mut self.record, mode)
    }

    fn fetch_interaction(&mut self) -> String {
        std::mem::take(&mut self.transcript)
    }

    async fn start_graphic_output(&mut self) -> Result<PathBuf, EngineError> {
        if self.capture.is_some() {
            return Err(EngineError::CaptureMismatch);
        }
        let path = PathBuf::from(format!("{}.png", self.unique_name()));
        self.capture = Some(path.clone());
        Ok(path)
    }

    async fn stop_graphic_output(&mut self) -> Result<PathBuf, EngineError> {
        self.capture.take().ok_or(EngineError::CaptureMismatch)
    }
}

/// A small two-column table: numeric `size` and text `grade`.
pub fn sample_table() -> DataTable {
    DataTable::new(
        "samples",
        vec![
            Column::numeric("size", vec![1.0, 2.0, 3.0, 4.0]),
            Column::text("grade", vec!["a".into(), "b".into(), "a".into(), "c".into()]),
        ],
    )
    .expect("fixture column names are unique")
}
