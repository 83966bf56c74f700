//! Plot-producing kinds: the cached artifact is a file path, not columns.

use async_trait::async_trait;

use crate::engine::{Engine, EngineError, escape_literal};
use crate::graph::info::{AnswerLookup, Answers, InfoPrompt};
use crate::graph::kinds::{NodeOutput, OperationKind};
use crate::graph::table::SourceView;
use crate::graph::GraphError;

/// Histogram of a chosen numeric parent column.
#[derive(Debug, Clone, Copy, Default)]
pub struct Histogram;

impl Histogram {
    pub const ID: &'static str = "histogram";
}

#[async_trait]
impl OperationKind for Histogram {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn label(&self) -> String {
        "Histogram".to_string()
    }

    fn required_info(&self, source: SourceView<'_>) -> Vec<InfoPrompt> {
        vec![InfoPrompt::choice(
            "column",
            "Column to plot",
            source.numeric_column_names(),
        )]
    }

    fn produces_plot(&self) -> bool {
        true
    }

    async fn compute(
        &self,
        source: SourceView<'_>,
        answers: &Answers,
        engine: &mut dyn Engine,
    ) -> Result<NodeOutput, GraphError> {
        let column_name = answers.choice_of("column")?.to_string();
        let column = source.column(&column_name).ok_or(GraphError::BadAnswer {
            name: "column".to_string(),
        })?;
        let var = engine.assign_column(column).await?;

        // Exactly one plotting command between start and stop.
        let path = engine.start_graphic_output().await?;
        let plotted = engine
            .execute_discard(&format!(
                "hist({var}, main=\"Histogram of {}\")",
                escape_literal(&column_name)
            ))
            .await;
        let finished = engine.stop_graphic_output().await;

        plotted?;
        let end = finished?;
        if end != path {
            return Err(GraphError::Engine(EngineError::CaptureMismatch));
        }
        Ok(NodeOutput::Plot(path))
    }

    fn boxed_clone(&self) -> Box<dyn OperationKind> {
        Box::new(*self)
    }
}
