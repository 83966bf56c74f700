//! Operation kinds: the polymorphic transformations a node can perform.
//!
//! A kind is the behavioral half of an [`crate::graph::OperationNode`]: it
//! declares a stable string identifier (used for registry lookup and
//! serialization), optional construction parameters, the prompts it needs
//! answered, and exactly one way of producing output — derived columns or
//! a plot artifact, never both.

mod inference;
mod plot;
mod summaries;
mod transform;

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use crate::engine::Engine;
use crate::graph::info::{Answers, InfoPrompt};
use crate::graph::table::SourceView;
use crate::graph::{Column, GraphError};

pub use inference::TTest;
pub use plot::Histogram;
pub use summaries::{FiveNumber, Mean, StdDev, Summation};
pub use transform::{Divide, Passthrough};

/// What a recomputation produced: derived columns, or one plot artifact.
///
/// Mutually exclusive per node kind — a kind either computes columns or
/// plots, decided by [`OperationKind::produces_plot`].
#[derive(Debug, Clone, PartialEq)]
pub enum NodeOutput {
    Columns(Vec<Column>),
    Plot(PathBuf),
}

/// A concrete transformation over a parent data source.
///
/// Implementations are stateless apart from construction parameters; all
/// per-use state lives in the node (answers, cache) or the engine. The
/// graph calls [`OperationKind::compute`] only after every prompt from
/// [`OperationKind::required_info`] is satisfied.
#[async_trait]
pub trait OperationKind: Send + Sync + std::fmt::Debug {
    /// Stable identifier, used for serialization and registry lookup.
    fn id(&self) -> &'static str;

    /// Human-readable name.
    fn label(&self) -> String {
        self.id().to_string()
    }

    /// Kind-specific construction parameters, for serialization.
    fn params(&self) -> Value {
        Value::Null
    }

    /// Ordered prompts that must be answered before computing. May consult
    /// the parent's data, e.g. to offer its column names as options.
    fn required_info(&self, source: SourceView<'_>) -> Vec<InfoPrompt> {
        let _ = source;
        Vec::new()
    }

    /// True if this kind yields a plot artifact instead of columns.
    fn produces_plot(&self) -> bool {
        false
    }

    /// Produce this kind's output from the parent's current data.
    async fn compute(
        &self,
        source: SourceView<'_>,
        answers: &Answers,
        engine: &mut dyn Engine,
    ) -> Result<NodeOutput, GraphError>;

    /// Clone behind the object boundary, so nodes (and whole graph
    /// snapshots) stay cloneable.
    fn boxed_clone(&self) -> Box<dyn OperationKind>;
}

impl Clone for Box<dyn OperationKind> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}

/// One summary row per numeric parent column: upload the column, run a
/// single aggregate over it, collect the scalar. The shape shared by the
/// simple summary kinds.
pub(crate) async fn summarize_numeric_columns(
    source: SourceView<'_>,
    engine: &mut dyn Engine,
    function: &str,
) -> Result<NodeOutput, GraphError> {
    let mut out = Vec::new();
    for column in source.columns.iter().filter(|c| c.is_numeric()) {
        let var = engine.assign_column(column).await?;
        let value = engine.execute_number(&format!("{function}({var})")).await?;
        out.push(Column::numeric(
            format!("{function}({})", column.name()),
            vec![value],
        ));
    }
    Ok(NodeOutput::Columns(out))
}
