//! Error taxonomy for the computation graph.

use miette::Diagnostic;
use thiserror::Error;

use crate::engine::EngineError;
use crate::graph::info::InfoPrompt;

/// Errors raised by graph edits and recomputation.
///
/// None of these are fatal: info-required errors are answered and retried,
/// structural errors are caller bugs to fix, and engine errors follow the
/// engine's own recovery rules (restart for death, retry for parses).
#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    /// A node was asked to compute before its required prompts were
    /// answered. Carries the node's path so the caller can prompt the
    /// user and retry; no cache was touched.
    #[error(
        "operation '{kind}' at path {path:?} requires {} unanswered prompt(s)",
        .prompts.len()
    )]
    #[diagnostic(
        code(statchain::graph::info_required),
        help("supply answers with set_answers, then recompute")
    )]
    InfoRequired {
        path: Vec<usize>,
        kind: String,
        prompts: Vec<InfoPrompt>,
    },

    /// No node exists at the given path.
    #[error("no operation at path {path:?}")]
    #[diagnostic(code(statchain::graph::node_not_found))]
    NodeNotFound { path: Vec<usize> },

    /// Two columns in one table would share a name.
    #[error("duplicate column name '{name}' in table '{table}'")]
    #[diagnostic(code(statchain::graph::duplicate_name))]
    DuplicateName { table: String, name: String },

    /// A fragment referenced a kind identifier no factory is registered
    /// for.
    #[error("unknown operation kind '{id}'")]
    #[diagnostic(
        code(statchain::graph::unknown_kind),
        help("register the kind with KindRegistry before deserializing")
    )]
    UnknownKind { id: String },

    /// A kind read an answer it never declared, or with the wrong type.
    #[error("answer '{name}' is missing or has the wrong type")]
    #[diagnostic(code(statchain::graph::bad_answer))]
    BadAnswer { name: String },

    /// Kind-specific construction parameters were rejected.
    #[error("invalid parameters for operation kind '{id}': {message}")]
    #[diagnostic(code(statchain::graph::bad_params))]
    BadParams { id: String, message: String },

    /// The engine bridge failed underneath a recomputation.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Engine(#[from] EngineError),

    /// A document fragment could not be encoded or decoded.
    #[error("document fragment could not be processed")]
    #[diagnostic(code(statchain::graph::fragment))]
    Fragment(#[from] serde_json::Error),
}
