//! Per-column summary statistics.

use async_trait::async_trait;

use crate::engine::Engine;
use crate::graph::info::Answers;
use crate::graph::kinds::{NodeOutput, OperationKind, summarize_numeric_columns};
use crate::graph::table::SourceView;
use crate::graph::{Column, GraphError};

/// Arithmetic mean of every numeric parent column.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mean;

impl Mean {
    pub const ID: &'static str = "mean";
}

#[async_trait]
impl OperationKind for Mean {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn label(&self) -> String {
        "Mean".to_string()
    }

    async fn compute(
        &self,
        source: SourceView<'_>,
        _answers: &Answers,
        engine: &mut dyn Engine,
    ) -> Result<NodeOutput, GraphError> {
        summarize_numeric_columns(source, engine, "mean").await
    }

    fn boxed_clone(&self) -> Box<dyn OperationKind> {
        Box::new(*self)
    }
}

/// Sample standard deviation of every numeric parent column.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDev;

impl StdDev {
    pub const ID: &'static str = "std-dev";
}

#[async_trait]
impl OperationKind for StdDev {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn label(&self) -> String {
        "Standard deviation".to_string()
    }

    async fn compute(
        &self,
        source: SourceView<'_>,
        _answers: &Answers,
        engine: &mut dyn Engine,
    ) -> Result<NodeOutput, GraphError> {
        summarize_numeric_columns(source, engine, "sd").await
    }

    fn boxed_clone(&self) -> Box<dyn OperationKind> {
        Box::new(*self)
    }
}

/// Sum of every numeric parent column.
#[derive(Debug, Clone, Copy, Default)]
pub struct Summation;

impl Summation {
    pub const ID: &'static str = "summation";
}

#[async_trait]
impl OperationKind for Summation {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn label(&self) -> String {
        "Summation".to_string()
    }

    async fn compute(
        &self,
        source: SourceView<'_>,
        _answers: &Answers,
        engine: &mut dyn Engine,
    ) -> Result<NodeOutput, GraphError> {
        summarize_numeric_columns(source, engine, "sum").await
    }

    fn boxed_clone(&self) -> Box<dyn OperationKind> {
        Box::new(*self)
    }
}

/// Five-number summary (min, quartiles, max) of every numeric parent
/// column, one five-row column each.
#[derive(Debug, Clone, Copy, Default)]
pub struct FiveNumber;

impl FiveNumber {
    pub const ID: &'static str = "five-number";
}

#[async_trait]
impl OperationKind for FiveNumber {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn label(&self) -> String {
        "Five-number summary".to_string()
    }

    async fn compute(
        &self,
        source: SourceView<'_>,
        _answers: &Answers,
        engine: &mut dyn Engine,
    ) -> Result<NodeOutput, GraphError> {
        let mut out = Vec::new();
        for column in source.columns.iter().filter(|c| c.is_numeric()) {
            let var = engine.assign_column(column).await?;
            // quantile() prints a named vector; as.numeric strips the
            // names down to the bracketed form the parsers accept.
            let values = engine
                .execute_number_array(&format!("as.numeric(quantile({var}))"))
                .await?;
            out.push(Column::numeric(
                format!("quantile({})", column.name()),
                values,
            ));
        }
        Ok(NodeOutput::Columns(out))
    }

    fn boxed_clone(&self) -> Box<dyn OperationKind> {
        Box::new(*self)
    }
}
