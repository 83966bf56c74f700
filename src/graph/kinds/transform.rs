//! Column-shaped transformations: the output mirrors the parent's layout.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::engine::Engine;
use crate::graph::info::Answers;
use crate::graph::kinds::{NodeOutput, OperationKind};
use crate::graph::table::SourceView;
use crate::graph::{Column, GraphError};

/// Copies the parent's columns through unchanged.
///
/// Useful as a staging point to hang several siblings off one shared
/// upstream result. Issues no engine commands at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Passthrough {
    pub const ID: &'static str = "passthrough";
}

#[async_trait]
impl OperationKind for Passthrough {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn label(&self) -> String {
        "Passthrough".to_string()
    }

    async fn compute(
        &self,
        source: SourceView<'_>,
        _answers: &Answers,
        _engine: &mut dyn Engine,
    ) -> Result<NodeOutput, GraphError> {
        Ok(NodeOutput::Columns(source.columns.to_vec()))
    }

    fn boxed_clone(&self) -> Box<dyn OperationKind> {
        Box::new(*self)
    }
}

/// Divides every numeric parent column by a fixed divisor.
#[derive(Debug, Clone, Copy)]
pub struct Divide {
    pub divisor: f64,
}

impl Divide {
    pub const ID: &'static str = "divide";

    /// Rebuild from serialized parameters: `{"divisor": <non-zero number>}`.
    pub fn from_params(params: &Value) -> Result<Self, GraphError> {
        let divisor = params
            .get("divisor")
            .and_then(Value::as_f64)
            .ok_or_else(|| GraphError::BadParams {
                id: Self::ID.to_string(),
                message: "missing numeric field 'divisor'".to_string(),
            })?;
        if divisor == 0.0 {
            return Err(GraphError::BadParams {
                id: Self::ID.to_string(),
                message: "divisor must be non-zero".to_string(),
            });
        }
        Ok(Self { divisor })
    }
}

#[async_trait]
impl OperationKind for Divide {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn label(&self) -> String {
        format!("Divide by {}", self.divisor)
    }

    fn params(&self) -> Value {
        json!({ "divisor": self.divisor })
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
            let values = engine
                .execute_number_array(&format!("{var} / {}", self.divisor))
                .await?;
            out.push(Column::numeric(column.name(), values));
        }
        Ok(NodeOutput::Columns(out))
    }

    fn boxed_clone(&self) -> Box<dyn OperationKind> {
        Box::new(*self)
    }
}
