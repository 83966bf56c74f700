//! Inference operations that prompt for their parameters.

use async_trait::async_trait;

use crate::engine::{Engine, fmt_number};
use crate::graph::info::{AnswerLookup, Answers, InfoPrompt};
use crate::graph::kinds::{NodeOutput, OperationKind};
use crate::graph::table::SourceView;
use crate::graph::{Column, GraphError};

/// One-sample t-test of a chosen parent column against a hypothesized
/// mean. Produces a two-row column: the t statistic and the p-value.
#[derive(Debug, Clone, Copy, Default)]
pub struct TTest;

impl TTest {
    pub const ID: &'static str = "t-test";
}

#[async_trait]
impl OperationKind for TTest {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn label(&self) -> String {
        "One-sample t-test".to_string()
    }

    fn required_info(&self, source: SourceView<'_>) -> Vec<InfoPrompt> {
        vec![
            InfoPrompt::choice(
                "column",
                "Column to test",
                source.numeric_column_names(),
            ),
            InfoPrompt::numeric("mu", "Hypothesized mean"),
        ]
    }

    async fn compute(
        &self,
        source: SourceView<'_>,
        answers: &Answers,
        engine: &mut dyn Engine,
    ) -> Result<NodeOutput, GraphError> {
        let column_name = answers.choice_of("column")?.to_string();
        let mu = answers.number_of("mu")?;
        let column = source.column(&column_name).ok_or(GraphError::BadAnswer {
            name: "column".to_string(),
        })?;

        let var = engine.assign_column(column).await?;
        let mu = fmt_number(mu);
        // The test object prints named members; as.numeric flattens the
        // statistic to the bracketed form, the p-value is already plain.
        let statistic = engine
            .execute_number(&format!("as.numeric(t.test({var}, mu={mu})$statistic)"))
            .await?;
        let p_value = engine
            .execute_number(&format!("t.test({var}, mu={mu})$p.value"))
            .await?;

        Ok(NodeOutput::Columns(vec![Column::numeric(
            format!("t.test({column_name})"),
            vec![statistic, p_value],
        )]))
    }

    fn boxed_clone(&self) -> Box<dyn OperationKind> {
        Box::new(*self)
    }
}
