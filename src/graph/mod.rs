//! The computation graph: a tree of data sources and derived operations.
//!
//! A [`DataTable`] of imported columns sits at the root; every other level
//! is an [`OperationNode`] that consumes its parent's columns, asks the
//! engine to compute something from them, and caches the result. Edits
//! mark the affected subtree dirty; reads recompute lazily, always parent
//! before child.
//!
//! Ownership is strictly parent→child. Nodes carry no upward pointers:
//! they are addressed by *paths* of child indices from the root, and all
//! recomputation is driven top-down from the table, which is what makes
//! the parent-before-child ordering structural rather than a convention.

pub mod column;
pub mod errors;
pub mod fragment;
pub mod info;
pub mod kinds;
pub mod node;
pub mod registry;
pub mod table;

pub use column::{CellValue, Column, ColumnError, ColumnMode};
pub use errors::GraphError;
pub use fragment::{Bounds, NodeFragment, TableFragment};
pub use info::{AnswerLookup, Answers, InfoAnswer, InfoPrompt, PromptKind};
pub use kinds::{NodeOutput, OperationKind};
pub use node::OperationNode;
pub use registry::KindRegistry;
pub use table::{DataSource, DataTable, SourceView};
