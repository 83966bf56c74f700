//! # Statchain: cached statistical transformation chains
//!
//! Statchain lets a caller build a tree of statistical transformations over
//! imported tabular data and have every derived step computed by an external
//! R session, with results cached per node and invalidated automatically as
//! upstream data or parameters change.
//!
//! ## Core Concepts
//!
//! - **Engine bridge**: one owned subprocess ([`RSession`]) behind the
//!   [`Engine`] capability trait — line protocol, sentinel discipline,
//!   typed output parsing, unique symbol allocation, interaction recording,
//!   graphic capture.
//! - **Computation graph**: a [`DataTable`] root owning ordered
//!   [`OperationNode`] children; nodes recompute lazily in parent-before-child
//!   order and gate on answered [`graph::InfoPrompt`]s.
//! - **History**: [`HistoryStack`], a bounded undo/redo container for
//!   snapshotting graph edits.
//!
//! ## Quick Start
//!
//! Building and editing a graph needs no live engine; computation does.
//!
//! ```
//! use statchain::graph::kinds::{Divide, Mean};
//! use statchain::{Column, DataTable, HistoryStack, OperationNode};
//!
//! # fn main() -> Result<(), statchain::GraphError> {
//! let mut table = DataTable::new(
//!     "scores",
//!     vec![Column::numeric("raw", vec![12.0, 9.5, 14.0])],
//! )?;
//!
//! // Edits are tree edits; nothing talks to the engine yet.
//! let mean = table.attach(&[], OperationNode::from_kind(Mean))?;
//! table.attach(&mean, OperationNode::from_kind(Divide { divisor: 2.0 }))?;
//!
//! // Snapshot for undo before the next edit.
//! let mut history = HistoryStack::bounded(10);
//! history.push_labeled(table.clone(), "attach divide step");
//!
//! assert!(table.node(&mean)?.is_dirty());
//! # Ok(())
//! # }
//! ```
//!
//! Driving the computation requires an [`RSession`] (or any [`Engine`]
//! implementation):
//!
//! ```rust,no_run
//! use statchain::{Engine, EngineConfig, RSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), statchain::EngineError> {
//!     let mut engine = RSession::spawn(EngineConfig::default()).await?;
//!     let mean = engine.execute_number("mean(c(1, 2, 3))").await?;
//!     assert_eq!(mean, 2.0);
//!     engine.close().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency model
//!
//! One logical flow drives the graph: every recomputation and every engine
//! command is awaited to completion before the next begins, and the engine
//! is held by `&mut` for the duration of a call, so at most one command is
//! ever in flight. Callers that share a session across tasks must add their
//! own mutual exclusion (e.g. `tokio::sync::Mutex<RSession>`).

pub mod engine;
pub mod graph;
pub mod history;
pub mod telemetry;

pub use engine::{Engine, EngineConfig, EngineError, ParseError, RSession, RecordMode};
pub use graph::{
    Column, DataSource, DataTable, GraphError, KindRegistry, NodeOutput, OperationKind,
    OperationNode,
};
pub use history::HistoryStack;
