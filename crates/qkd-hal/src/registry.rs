//! Backend registry for managing available backends.
//!
//! The [`BackendRegistry`] is the single place backends are constructed by
//! name. Callers own the handles it returns and pass them explicitly to the
//! sources and channels that need them.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::backend::{Backend, BackendConfig, BackendFactory};
use crate::error::{HalError, HalResult};

/// Factory function type for built-in backends.
type BuiltinFactory = Box<dyn Fn(BackendConfig) -> HalResult<Box<dyn Backend>> + Send + Sync>;

/// Central registry for execution backends.
pub struct BackendRegistry {
    /// Backend factories keyed by name.
    builtins: FxHashMap<String, BuiltinFactory>,
}

impl BackendRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            builtins: FxHashMap::default(),
        }
    }

    /// Register a built-in backend factory.
    pub fn register<B>(&mut self, name: impl Into<String>)
    where
        B: BackendFactory + Backend + 'static,
    {
        let name = name.into();
        debug!("Registering built-in backend: {}", name);
        self.builtins.insert(
            name,
            Box::new(|config| {
                let backend = B::from_config(config)?;
                Ok(Box::new(backend))
            }),
        );
    }

    /// Register a backend factory with a custom constructor.
    pub fn register_factory(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(BackendConfig) -> HalResult<Box<dyn Backend>> + Send + Sync + 'static,
    ) {
        let name = name.into();
        debug!("Registering factory backend: {}", name);
        self.builtins.insert(name, Box::new(factory));
    }

    /// Create a backend by name.
    pub fn create(&self, name: &str, config: BackendConfig) -> HalResult<Box<dyn Backend>> {
        if let Some(factory) = self.builtins.get(name) {
            return factory(config);
        }

        Err(HalError::BackendUnavailable(format!(
            "No backend registered with name '{name}'"
        )))
    }

    /// Create a shareable backend by name.
    pub fn create_shared(&self, name: &str, config: BackendConfig) -> HalResult<Arc<dyn Backend>> {
        self.create(name, config).map(Arc::from)
    }

    /// List all available backend names.
    pub fn available_backends(&self) -> Vec<String> {
        let mut names: Vec<_> = self.builtins.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a backend is available by name.
    pub fn has_backend(&self, name: &str) -> bool {
        self.builtins.contains_key(name)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the operational backend with the shortest queue.
///
/// Backends whose availability check fails or reports offline are skipped;
/// an unknown queue depth ranks behind every known one. Fails with
/// [`HalError::BackendUnavailable`] when none is operational.
pub async fn least_busy(candidates: &[Arc<dyn Backend>]) -> HalResult<Arc<dyn Backend>> {
    let checks = futures::future::join_all(candidates.iter().map(|b| b.availability())).await;

    let mut best: Option<(u32, &Arc<dyn Backend>)> = None;
    for (backend, check) in candidates.iter().zip(checks) {
        match check {
            Ok(avail) if avail.is_available => {
                let depth = avail.queue_depth.unwrap_or(u32::MAX);
                if best.is_none_or(|(d, _)| depth < d) {
                    best = Some((depth, backend));
                }
            }
            Ok(avail) => debug!(
                "Skipping offline backend {}: {}",
                backend.name(),
                avail.status_message.unwrap_or_default()
            ),
            Err(e) => warn!("Availability check failed for {}: {}", backend.name(), e),
        }
    }

    best.map(|(_, b)| Arc::clone(b)).ok_or_else(|| {
        HalError::BackendUnavailable(format!(
            "none of {} candidate backends is operational",
            candidates.len()
        ))
    })
}
