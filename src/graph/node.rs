//! One step in a transformation chain.

use std::path::Path;

use futures_util::future::BoxFuture;
use tracing::debug;

use crate::engine::{Engine, RecordMode};
use crate::graph::fragment::Bounds;
use crate::graph::info::{self, Answers};
use crate::graph::kinds::{NodeOutput, OperationKind};
use crate::graph::table::{DataSource, SourceView};
use crate::graph::{Column, GraphError};

/// A derived step in the computation tree.
///
/// A node owns its children outright; there are no upward references.
/// It starts dirty and unanswered, caches either derived columns or a
/// plot artifact after a successful recomputation, and goes dirty again
/// whenever its answers change or anything upstream does.
///
/// A node is itself a data source to its children (the "a node is a
/// table" capability): its cached columns are what a child consumes, so
/// its cache is only trustworthy when every ancestor is clean — which the
/// top-down recomputation in [`crate::graph::DataTable`] guarantees.
#[derive(Debug, Clone)]
pub struct OperationNode {
    pub(crate) kind: Box<dyn OperationKind>,
    pub(crate) answers: Answers,
    pub(crate) bounds: Bounds,
    pub(crate) children: Vec<OperationNode>,
    pub(crate) cache: Option<NodeOutput>,
    pub(crate) dirty: bool,
    pub(crate) program: Option<String>,
}

impl OperationNode {
    /// Wrap a kind into a fresh, dirty, unanswered node.
    pub fn new(kind: Box<dyn OperationKind>) -> Self {
        Self {
            kind,
            answers: Answers::default(),
            bounds: Bounds::default(),
            children: Vec::new(),
            cache: None,
            dirty: true,
            program: None,
        }
    }

    /// Convenience constructor for a concrete kind value.
    pub fn from_kind(kind: impl OperationKind + 'static) -> Self {
        Self::new(Box::new(kind))
    }

    #[must_use]
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    #[must_use]
    pub fn with_answers(mut self, answers: Answers) -> Self {
        self.answers = answers;
        self
    }

    pub fn kind(&self) -> &dyn OperationKind {
        self.kind.as_ref()
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Geometry is display metadata; changing it does not dirty the cache.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    pub fn children(&self) -> &[OperationNode] {
        &self.children
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The derived columns, if computed and current.
    pub fn cached_columns(&self) -> Option<&[Column]> {
        if self.dirty {
            return None;
        }
        match &self.cache {
            Some(NodeOutput::Columns(columns)) => Some(columns),
            _ => None,
        }
    }

    /// The plot artifact, if this node plots and is current.
    pub fn plot(&self) -> Option<&Path> {
        if self.dirty {
            return None;
        }
        match &self.cache {
            Some(NodeOutput::Plot(path)) => Some(path),
            _ => None,
        }
    }

    /// The engine commands recorded during the last recomputation.
    pub fn program_text(&self) -> Option<&str> {
        self.program.as_deref()
    }

    /// Replace this node's answers and invalidate it and everything below.
    pub fn set_answers(&mut self, answers: Answers) {
        self.answers = answers;
        self.mark_dirty();
    }

    /// Attach a child at the end of the child list, returning its index.
    ///
    /// The child (and its whole subtree) is invalidated: its parent just
    /// changed, so whatever it had cached is stale.
    pub fn attach(&mut self, mut child: OperationNode) -> usize {
        child.mark_dirty();
        self.children.push(child);
        self.children.len() - 1
    }

    /// Detach and return the child at `index`, severing the subtree.
    pub fn detach(&mut self, index: usize) -> Option<OperationNode> {
        if index < self.children.len() {
            Some(self.children.remove(index))
        } else {
            None
        }
    }

    /// Mark this node and every descendant as needing recomputation.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        for child in &mut self.children {
            child.mark_dirty();
        }
    }

    /// Recompute this node's cache from fresh parent data, if dirty.
    ///
    /// Gate first: outstanding prompts fail with
    /// [`GraphError::InfoRequired`] before any engine traffic, leaving the
    /// cache untouched. On success the engine commands issued are kept as
    /// this node's program text, the recorder is restored, and the node
    /// is clean.
    pub(crate) async fn recompute_if_dirty(
        &mut self,
        source: SourceView<'_>,
        engine: &mut dyn Engine,
        path: &[usize],
    ) -> Result<(), GraphError> {
        if !self.dirty {
            return Ok(());
        }

        let missing = info::unanswered(&self.kind.required_info(source), &self.answers);
        if !missing.is_empty() {
            return Err(GraphError::InfoRequired {
                path: path.to_vec(),
                kind: self.kind.id().to_string(),
                prompts: missing,
            });
        }

        debug!(kind = self.kind.id(), ?path, "recomputing operation");

        // Capture the commands this recomputation issues as the node's
        // program text. The recorder is a single shared channel: whatever
        // the caller had pending is drained here.
        let prior = engine.set_record_mode(RecordMode::CommandsOnly);
        engine.fetch_interaction();
        let result = self.kind.compute(source, &self.answers, engine).await;
        let transcript = engine.fetch_interaction();
        engine.set_record_mode(prior);

        let output = result?;
        self.program = Some(transcript);
        self.cache = Some(output);
        self.dirty = false;
        Ok(())
    }

    /// Eagerly recompute this node and cascade into every child,
    /// parent-before-child, depth-first.
    pub(crate) fn refresh_subtree<'a>(
        &'a mut self,
        source: SourceView<'a>,
        engine: &'a mut dyn Engine,
        path: Vec<usize>,
    ) -> BoxFuture<'a, Result<(), GraphError>> {
        Box::pin(async move {
            self.dirty = true;
            self.recompute_if_dirty(source, &mut *engine, &path).await?;

            let OperationNode {
                kind,
                cache,
                children,
                ..
            } = self;
            let columns: &[Column] = match &*cache {
                Some(NodeOutput::Columns(columns)) => columns.as_slice(),
                _ => &[],
            };
            let name = kind.id();
            for (index, child) in children.iter_mut().enumerate() {
                let mut child_path = path.clone();
                child_path.push(index);
                child
                    .refresh_subtree(SourceView { name, columns }, &mut *engine, child_path)
                    .await?;
            }
            Ok(())
        })
    }
}

/// Descend `path` from `children`, recomputing dirty ancestors on the way
/// so the target always computes against current data.
///
/// With `eager` set, the target itself is forced to recompute and the
/// refresh cascades through its whole subtree; otherwise the target is
/// brought up to date lazily and its children are left alone.
pub(crate) fn walk_path<'a>(
    children: &'a mut Vec<OperationNode>,
    source: SourceView<'a>,
    path: &'a [usize],
    prefix: Vec<usize>,
    engine: &'a mut dyn Engine,
    eager: bool,
) -> BoxFuture<'a, Result<(), GraphError>> {
    Box::pin(async move {
        let Some((&index, rest)) = path.split_first() else {
            return Ok(());
        };
        let mut node_path = prefix;
        node_path.push(index);
        let Some(node) = children.get_mut(index) else {
            return Err(GraphError::NodeNotFound { path: node_path });
        };

        if rest.is_empty() {
            return if eager {
                node.refresh_subtree(source, engine, node_path).await
            } else {
                node.recompute_if_dirty(source, engine, &node_path).await
            };
        }

        node.recompute_if_dirty(source, &mut *engine, &node_path)
            .await?;
        let OperationNode {
            kind,
            cache,
            children: grandchildren,
            ..
        } = node;
        let columns: &[Column] = match &*cache {
            Some(NodeOutput::Columns(columns)) => columns.as_slice(),
            _ => &[],
        };
        walk_path(
            grandchildren,
            SourceView {
                name: kind.id(),
                columns,
            },
            rest,
            node_path,
            engine,
            eager,
        )
        .await
    })
}

impl DataSource for OperationNode {
    fn source_name(&self) -> &str {
        self.kind.id()
    }

    fn current_columns(&self) -> Option<&[Column]> {
        self.cached_columns()
    }
}

/// Structural equality: kind identifier, parameters, answers, and the
/// full child subtree.
///
/// Deliberately excluded: cache contents, dirtiness, program text, and
/// geometry. Also excluded is everything *above* the node — two equal
/// subtrees attached under different tables compare equal even though
/// their computed values would differ with the parent data. Equality here
/// is a statement about the transformation a subtree describes, not about
/// the values it currently holds; callers comparing computed results must
/// compare cached columns explicitly.
impl PartialEq for OperationNode {
    fn eq(&self, other: &Self) -> bool {
        self.kind.id() == other.kind.id()
            && self.kind.params() == other.kind.params()
            && self.answers == other.answers
            && self.children == other.children
    }
}
