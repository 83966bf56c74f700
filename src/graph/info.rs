//! Typed prompts an operation may require answered before it computes.
//!
//! A kind declares an ordered list of [`InfoPrompt`]s against its parent's
//! data; the caller collects [`InfoAnswer`]s keyed by prompt name. A node
//! with outstanding prompts refuses to compute with
//! [`crate::graph::GraphError::InfoRequired`].

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::graph::GraphError;

/// What shape of answer a prompt expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum PromptKind {
    /// A yes/no toggle.
    Checkbox,
    /// A single number.
    Numeric,
    /// Free text.
    Text,
    /// Exactly one of the listed options.
    Choice { options: Vec<String> },
}

/// One question an operation asks before it can compute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoPrompt {
    /// Stable key the answer is stored under.
    pub name: String,
    /// Human-readable question.
    pub prompt: String,
    /// Expected answer shape.
    pub kind: PromptKind,
}

impl InfoPrompt {
    pub fn checkbox(name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
            kind: PromptKind::Checkbox,
        }
    }

    pub fn numeric(name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
            kind: PromptKind::Numeric,
        }
    }

    pub fn text(name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
            kind: PromptKind::Text,
        }
    }

    pub fn choice(
        name: impl Into<String>,
        prompt: impl Into<String>,
        options: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
            kind: PromptKind::Choice { options },
        }
    }
}

/// A user-supplied answer to one prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum InfoAnswer {
    Bool(bool),
    Number(f64),
    Text(String),
    Choice(String),
}

/// Answers keyed by prompt name. Initially empty on every node.
pub type Answers = FxHashMap<String, InfoAnswer>;

/// Typed lookups into an answer map, for kinds reading their parameters.
///
/// These only fail when a kind asks for an answer it never declared a
/// prompt for (or with the wrong type) — validation against the declared
/// prompts has already run by the time a kind computes.
pub trait AnswerLookup {
    fn bool_of(&self, name: &str) -> Result<bool, GraphError>;
    fn number_of(&self, name: &str) -> Result<f64, GraphError>;
    fn text_of(&self, name: &str) -> Result<&str, GraphError>;
    fn choice_of(&self, name: &str) -> Result<&str, GraphError>;
}

impl AnswerLookup for Answers {
    fn bool_of(&self, name: &str) -> Result<bool, GraphError> {
        match self.get(name) {
            Some(InfoAnswer::Bool(b)) => Ok(*b),
            _ => Err(bad(name)),
        }
    }

    fn number_of(&self, name: &str) -> Result<f64, GraphError> {
        match self.get(name) {
            Some(InfoAnswer::Number(n)) => Ok(*n),
            _ => Err(bad(name)),
        }
    }

    fn text_of(&self, name: &str) -> Result<&str, GraphError> {
        match self.get(name) {
            Some(InfoAnswer::Text(s)) => Ok(s),
            _ => Err(bad(name)),
        }
    }

    fn choice_of(&self, name: &str) -> Result<&str, GraphError> {
        match self.get(name) {
            Some(InfoAnswer::Choice(s)) => Ok(s),
            _ => Err(bad(name)),
        }
    }
}

fn bad(name: &str) -> GraphError {
    GraphError::BadAnswer {
        name: name.to_string(),
    }
}

/// The prompts in `prompts` that `answers` does not satisfy, in order.
pub(crate) fn unanswered(prompts: &[InfoPrompt], answers: &Answers) -> Vec<InfoPrompt> {
    prompts
        .iter()
        .filter(|p| !satisfies(p, answers.get(&p.name)))
        .cloned()
        .collect()
}

fn satisfies(prompt: &InfoPrompt, answer: Option<&InfoAnswer>) -> bool {
    match (&prompt.kind, answer) {
        (PromptKind::Checkbox, Some(InfoAnswer::Bool(_))) => true,
        (PromptKind::Numeric, Some(InfoAnswer::Number(_))) => true,
        (PromptKind::Text, Some(InfoAnswer::Text(_))) => true,
        (PromptKind::Choice { options }, Some(InfoAnswer::Choice(picked))) => {
            options.contains(picked)
        }
        _ => false,
    }
}
