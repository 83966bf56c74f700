//! Document fragments: the serialized interchange form of a graph.
//!
//! Fragments describe the *shape* of a computation tree — kind
//! identifiers, geometry, parameters, answers, nesting, and the root
//! table's name and imported columns. They are what project files and
//! clipboard copies carry. Cached values are never part of a fragment:
//! a reconstructed tree starts dirty and recomputes on first read.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::graph::info::Answers;
use crate::graph::node::OperationNode;
use crate::graph::registry::KindRegistry;
use crate::graph::table::DataTable;
use crate::graph::{Column, GraphError};

/// Position metadata carried for the editor/export layer. Never affects
/// computation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Serialized shape of one operation node and its subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeFragment {
    /// Stable kind identifier, resolved through a [`KindRegistry`].
    pub kind: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
    #[serde(default)]
    pub bounds: Bounds,
    #[serde(default, skip_serializing_if = "FxHashMap::is_empty")]
    pub answers: Answers,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<NodeFragment>,
}

/// Serialized shape of a whole computation tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableFragment {
    pub name: String,
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<NodeFragment>,
}

impl OperationNode {
    /// Render this node and its subtree as a fragment.
    pub fn to_fragment(&self) -> NodeFragment {
        NodeFragment {
            kind: self.kind.id().to_string(),
            params: self.kind.params(),
            bounds: self.bounds.clone(),
            answers: self.answers.clone(),
            operations: self.children.iter().map(Self::to_fragment).collect(),
        }
    }

    /// Rebuild a node (dirty, uncached) from a fragment.
    pub fn from_fragment(
        fragment: &NodeFragment,
        registry: &KindRegistry,
    ) -> Result<Self, GraphError> {
        let kind = registry.instantiate(&fragment.kind, &fragment.params)?;
        let mut node = OperationNode::new(kind)
            .with_bounds(fragment.bounds.clone())
            .with_answers(fragment.answers.clone());
        for child in &fragment.operations {
            let child = Self::from_fragment(child, registry)?;
            node.attach(child);
        }
        Ok(node)
    }
}

impl DataTable {
    /// Render the whole tree as a fragment.
    pub fn to_fragment(&self) -> TableFragment {
        TableFragment {
            name: self.name().to_string(),
            columns: self.columns().to_vec(),
            operations: self
                .children()
                .iter()
                .map(OperationNode::to_fragment)
                .collect(),
        }
    }

    /// Rebuild a tree from a fragment. Every node starts dirty.
    pub fn from_fragment(
        fragment: &TableFragment,
        registry: &KindRegistry,
    ) -> Result<Self, GraphError> {
        let mut table = DataTable::new(fragment.name.clone(), fragment.columns.clone())?;
        for child in &fragment.operations {
            let node = OperationNode::from_fragment(child, registry)?;
            table.attach(&[], node)?;
        }
        Ok(table)
    }

    /// Serialize the tree to a JSON document.
    pub fn to_json(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string_pretty(&self.to_fragment())?)
    }

    /// Rebuild a tree from a JSON document.
    pub fn from_json(document: &str, registry: &KindRegistry) -> Result<Self, GraphError> {
        let fragment: TableFragment = serde_json::from_str(document)?;
        Self::from_fragment(&fragment, registry)
    }
}
