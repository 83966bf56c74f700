//! Bounded undo/redo stacks of opaque snapshots.

use std::collections::VecDeque;

/// Two symmetric, bounded stacks of snapshots.
///
/// Steps are opaque to the container; for graph editing the snapshot is
/// typically a cloned [`crate::DataTable`]. Pushing a new undo step
/// clears the redo stack; both stacks trim from the oldest end when they
/// exceed the configured bound (0 = unbounded). Each step may carry a
/// label describing the edit it reverts, surfaced by
/// [`HistoryStack::undo_label`] / [`HistoryStack::redo_label`].
///
/// ```
/// use statchain::HistoryStack;
///
/// let mut history = HistoryStack::bounded(5);
/// history.push_labeled(1, "first edit");
/// history.push(2);
///
/// // Undo hands back the snapshot, filing the current state for redo.
/// assert_eq!(history.undo(3), Some(2));
/// assert_eq!(history.redo(2), Some(3));
/// ```
#[derive(Debug, Clone)]
pub struct HistoryStack<T> {
    undo: VecDeque<Step<T>>,
    redo: VecDeque<Step<T>>,
    limit: usize,
}

#[derive(Debug, Clone)]
struct Step<T> {
    state: T,
    label: Option<String>,
}

impl<T> Default for HistoryStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HistoryStack<T> {
    /// An unbounded history.
    pub fn new() -> Self {
        Self::bounded(0)
    }

    /// A history keeping at most `limit` steps per stack; 0 means
    /// unbounded.
    pub fn bounded(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            limit,
        }
    }

    /// Record a snapshot as the next undo step.
    pub fn push(&mut self, state: T) {
        self.push_step(Step { state, label: None });
    }

    /// Record a snapshot with a label describing the edit it reverts.
    pub fn push_labeled(&mut self, state: T, label: impl Into<String>) {
        self.push_step(Step {
            state,
            label: Some(label.into()),
        });
    }

    fn push_step(&mut self, step: Step<T>) {
        self.undo.push_back(step);
        self.redo.clear();
        trim(&mut self.undo, self.limit);
    }

    /// Step back once, returning the snapshot at that point.
    ///
    /// `current` — the state being undone — becomes the next redo step
    /// (with the undone step's label). Returns `None` without touching
    /// the redo stack when there is nothing to undo; `current` is
    /// dropped in that case, so check [`HistoryStack::has_undo`] first if
    /// the snapshot is expensive.
    pub fn undo(&mut self, current: T) -> Option<T> {
        let step = self.undo.pop_back()?;
        self.redo.push_back(Step {
            state: current,
            label: step.label.clone(),
        });
        trim(&mut self.redo, self.limit);
        Some(step.state)
    }

    /// Step forward once, returning the snapshot at that point.
    ///
    /// The symmetric inverse of [`HistoryStack::undo`]: `current` becomes
    /// the next undo step.
    pub fn redo(&mut self, current: T) -> Option<T> {
        let step = self.redo.pop_back()?;
        self.undo.push_back(Step {
            state: current,
            label: step.label.clone(),
        });
        trim(&mut self.undo, self.limit);
        Some(step.state)
    }

    /// Label of the step an undo would restore, if any.
    pub fn undo_label(&self) -> Option<&str> {
        self.undo.back()?.label.as_deref()
    }

    /// Label of the step a redo would restore, if any.
    pub fn redo_label(&self) -> Option<&str> {
        self.redo.back()?.label.as_deref()
    }

    pub fn has_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn has_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Drop all recorded steps in both directions.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

fn trim<T>(stack: &mut VecDeque<Step<T>>, limit: usize) {
    if limit > 0 {
        while stack.len() > limit {
            stack.pop_front();
        }
    }
}
