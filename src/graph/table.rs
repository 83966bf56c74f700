//! The root of a computation tree: imported data plus derived operations.

use crate::engine::Engine;
use crate::graph::info::Answers;
use crate::graph::node::{OperationNode, walk_path};
use crate::graph::{Column, GraphError};

/// Borrowed view of a data source: what a child operation sees of its
/// parent, whether that parent is the root table or another operation.
#[derive(Debug, Clone, Copy)]
pub struct SourceView<'a> {
    /// Name of the source (table name, or the parent operation's kind id).
    pub name: &'a str,
    /// The source's current columns.
    pub columns: &'a [Column],
}

impl<'a> SourceView<'a> {
    /// Look up a column by name (case-sensitive).
    pub fn column(&self, name: &str) -> Option<&'a Column> {
        let columns: &'a [Column] = self.columns;
        columns.iter().find(|c| c.name() == name)
    }

    /// The names of the numeric columns, in order.
    pub fn numeric_column_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.is_numeric())
            .map(|c| c.name().to_string())
            .collect()
    }
}

/// The table capability: anything a child operation can read columns from.
///
/// Implemented by [`DataTable`] (always current) and by
/// [`OperationNode`] (current only when computed and clean).
pub trait DataSource {
    fn source_name(&self) -> &str;

    /// The columns, if current; `None` when the source is stale.
    fn current_columns(&self) -> Option<&[Column]>;

    /// A borrowed view, if current.
    fn view(&self) -> Option<SourceView<'_>> {
        Some(SourceView {
            name: self.source_name(),
            columns: self.current_columns()?,
        })
    }
}

/// A named, ordered list of columns plus the operations derived from it.
///
/// The root of every computation tree is user-imported data; the
/// invariant the whole caching scheme rests on is that these columns
/// never change once imported — only derived (operation) columns are ever
/// recomputed. Consequently there are no column mutators here.
///
/// Child operations are ordered; insertion order is evaluation and
/// display order. Removal severs the whole subtree: ownership is
/// strictly parent→child, so dropping the returned node drops its
/// descendants.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    name: String,
    columns: Vec<Column>,
    children: Vec<OperationNode>,
}

impl DataTable {
    /// Import data as a new root table.
    ///
    /// Column names must be unique within the table (case-insensitive,
    /// matching how the engine treats frame column lookups).
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Self, GraphError> {
        let name = name.into();
        for (i, column) in columns.iter().enumerate() {
            let clash = columns[..i]
                .iter()
                .any(|other| other.name().eq_ignore_ascii_case(column.name()));
            if clash {
                return Err(GraphError::DuplicateName {
                    table: name,
                    name: column.name().to_string(),
                });
            }
        }
        Ok(Self {
            name,
            columns,
            children: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Look up an imported column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// The operations attached directly to the table.
    pub fn children(&self) -> &[OperationNode] {
        &self.children
    }

    /// Attach `node` under the node at `parent_path` (the table itself
    /// for an empty path). Returns the new node's path.
    pub fn attach(
        &mut self,
        parent_path: &[usize],
        node: OperationNode,
    ) -> Result<Vec<usize>, GraphError> {
        let index = if parent_path.is_empty() {
            let mut node = node;
            node.mark_dirty();
            self.children.push(node);
            self.children.len() - 1
        } else {
            self.node_mut(parent_path)?.attach(node)
        };
        let mut path = parent_path.to_vec();
        path.push(index);
        Ok(path)
    }

    /// Detach the node at `path`, returning it together with its whole
    /// subtree. No dangling references remain: the subtree is simply
    /// owned by the caller now (or dropped).
    pub fn detach(&mut self, path: &[usize]) -> Result<OperationNode, GraphError> {
        let not_found = || GraphError::NodeNotFound {
            path: path.to_vec(),
        };
        let (&last, parent_path) = path.split_last().ok_or_else(not_found)?;
        let children = if parent_path.is_empty() {
            &mut self.children
        } else {
            &mut self.node_mut(parent_path)?.children
        };
        if last >= children.len() {
            return Err(not_found());
        }
        Ok(children.remove(last))
    }

    /// The node at `path`.
    pub fn node(&self, path: &[usize]) -> Result<&OperationNode, GraphError> {
        let (&last, parents) = path.split_last().ok_or(GraphError::NodeNotFound {
            path: Vec::new(),
        })?;
        let mut children = &self.children;
        for (depth, &index) in parents.iter().enumerate() {
            let node = children.get(index).ok_or_else(|| GraphError::NodeNotFound {
                path: path[..=depth].to_vec(),
            })?;
            children = &node.children;
        }
        children.get(last).ok_or_else(|| GraphError::NodeNotFound {
            path: path.to_vec(),
        })
    }

    pub(crate) fn node_mut(&mut self, path: &[usize]) -> Result<&mut OperationNode, GraphError> {
        let (&last, parents) = path.split_last().ok_or(GraphError::NodeNotFound {
            path: Vec::new(),
        })?;
        let mut children = &mut self.children;
        for (depth, &index) in parents.iter().enumerate() {
            let node = children
                .get_mut(index)
                .ok_or_else(|| GraphError::NodeNotFound {
                    path: path[..=depth].to_vec(),
                })?;
            children = &mut node.children;
        }
        children.get_mut(last).ok_or_else(|| GraphError::NodeNotFound {
            path: path.to_vec(),
        })
    }

    /// Replace the answers of the node at `path`, invalidating it and its
    /// whole subtree.
    pub fn set_answers(&mut self, path: &[usize], answers: Answers) -> Result<(), GraphError> {
        self.node_mut(path)?.set_answers(answers);
        Ok(())
    }

    /// Bring the node at `path` up to date, lazily.
    ///
    /// Walks down from the root recomputing any dirty ancestor first, so
    /// the target always computes against current data; clean nodes along
    /// the way are not touched. Fails with [`GraphError::InfoRequired`]
    /// (naming the offending node) if anything on the way lacks answers.
    pub async fn check_cache(
        &mut self,
        path: &[usize],
        engine: &mut dyn Engine,
    ) -> Result<(), GraphError> {
        let Self {
            name,
            columns,
            children,
        } = self;
        let source = SourceView {
            name: name.as_str(),
            columns: columns.as_slice(),
        };
        walk_path(children, source, path, Vec::new(), engine, false).await
    }

    /// Eagerly recompute the node at `path` and everything beneath it.
    ///
    /// Ancestors are brought up to date lazily first; the target and its
    /// whole subtree then recompute unconditionally in
    /// parent-before-child, depth-first order. This is how a parameter
    /// edit at the root of a subtree pushes through every downstream
    /// node. An empty path refreshes every operation in the table.
    pub async fn refresh(
        &mut self,
        path: &[usize],
        engine: &mut dyn Engine,
    ) -> Result<(), GraphError> {
        let Self {
            name,
            columns,
            children,
        } = self;
        let source = SourceView {
            name: name.as_str(),
            columns: columns.as_slice(),
        };
        if path.is_empty() {
            for (index, child) in children.iter_mut().enumerate() {
                child
                    .refresh_subtree(source, &mut *engine, vec![index])
                    .await?;
            }
            return Ok(());
        }
        walk_path(children, source, path, Vec::new(), engine, true).await
    }
}

impl DataSource for DataTable {
    fn source_name(&self) -> &str {
        &self.name
    }

    /// Imported data is always current.
    fn current_columns(&self) -> Option<&[Column]> {
        Some(&self.columns)
    }
}
