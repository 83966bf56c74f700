//! Kind registry: stable string identifiers to factories.
//!
//! Deserialization and UI-driven creation both go through here instead of
//! any dynamic type lookup: a closed set of built-ins is registered at
//! construction and embedders may register their own kinds on top.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::trace;

use crate::graph::GraphError;
use crate::graph::kinds::{
    Divide, FiveNumber, Histogram, Mean, OperationKind, Passthrough, StdDev, Summation, TTest,
};

/// Builds one kind instance from its serialized parameters.
pub type KindFactory =
    Arc<dyn Fn(&Value) -> Result<Box<dyn OperationKind>, GraphError> + Send + Sync>;

/// Factory for a kind with no construction parameters.
fn stateless<K: OperationKind + Default + 'static>() -> KindFactory {
    Arc::new(|_| {
        let kind: Box<dyn OperationKind> = Box::new(K::default());
        Ok(kind)
    })
}

/// Maps stable kind identifiers to factory functions.
#[derive(Clone)]
pub struct KindRegistry {
    factories: FxHashMap<String, KindFactory>,
}

impl Default for KindRegistry {
    /// A registry holding every built-in kind.
    fn default() -> Self {
        let mut registry = Self::new();
        registry
            .register(Mean::ID, stateless::<Mean>())
            .register(StdDev::ID, stateless::<StdDev>())
            .register(Summation::ID, stateless::<Summation>())
            .register(FiveNumber::ID, stateless::<FiveNumber>())
            .register(Passthrough::ID, stateless::<Passthrough>())
            .register(TTest::ID, stateless::<TTest>())
            .register(Histogram::ID, stateless::<Histogram>())
            .register(
                Divide::ID,
                Arc::new(|params| {
                    let kind: Box<dyn OperationKind> = Box::new(Divide::from_params(params)?);
                    Ok(kind)
                }),
            );
        registry
    }
}

impl KindRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            factories: FxHashMap::default(),
        }
    }

    /// Register a factory for a kind identifier, replacing any previous
    /// registration for the same identifier.
    pub fn register(&mut self, id: impl Into<String>, factory: KindFactory) -> &mut Self {
        self.factories.insert(id.into(), factory);
        self
    }

    /// Builder-style registration.
    #[must_use]
    pub fn with_kind(mut self, id: impl Into<String>, factory: KindFactory) -> Self {
        self.register(id, factory);
        self
    }

    /// Build a kind from its identifier and serialized parameters.
    pub fn instantiate(
        &self,
        id: &str,
        params: &Value,
    ) -> Result<Box<dyn OperationKind>, GraphError> {
        trace!(id, "instantiating operation kind");
        let factory = self
            .factories
            .get(id)
            .ok_or_else(|| GraphError::UnknownKind { id: id.to_string() })?;
        factory(params)
    }

    /// The registered identifiers, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
