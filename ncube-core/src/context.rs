use core::fmt;
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::{CubeRegistry, ExpressionHost, ResourceFetcher, Sha1Digest};

/// An opaque handle to whatever an [`ExpressionHost`] produced by compiling
/// some source (spec §6 compile-artifact cache; spec Non-goals excludes
/// specifying what compilation actually produces).
pub struct CompiledArtifact(Box<dyn Any + Send + Sync>);

impl CompiledArtifact {
    /// Wraps an arbitrary host-defined compiled representation.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Box::new(value))
    }

    /// Downcasts back to the host's concrete compiled type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl fmt::Debug for CompiledArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CompiledArtifact(..)")
    }
}

/// The explicit context object a binder/executor call threads through
/// instead of reaching for process-wide globals (spec §9 "global mutable
/// state must be encapsulated in explicit context objects", §5
/// concurrency).
///
/// Bundles the three external collaborators plus the compile-artifact
/// cache, which is the one piece of state spec §5 calls out as needing
/// mutual exclusion on writes across concurrently executing cubes.
#[derive(Clone, Debug)]
pub struct NCubeContext {
    registry: Arc<dyn CubeRegistry>,
    expression_host: Arc<dyn ExpressionHost>,
    resource_fetcher: Arc<dyn ResourceFetcher>,
    compiled: Arc<RwLock<HashMap<Sha1Digest, Arc<CompiledArtifact>>>>,
}

impl NCubeContext {
    /// Creates a context around the three collaborator implementations, with
    /// an empty compile cache.
    pub fn new(
        registry: Arc<dyn CubeRegistry>,
        expression_host: Arc<dyn ExpressionHost>,
        resource_fetcher: Arc<dyn ResourceFetcher>,
    ) -> Self {
        Self {
            registry,
            expression_host,
            resource_fetcher,
            compiled: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// The cube registry, for cross-cube reference resolution.
    pub fn registry(&self) -> &dyn CubeRegistry {
        self.registry.as_ref()
    }

    /// The expression host, for EXPRESSION/TEMPLATE/METHOD cell dispatch.
    pub fn expression_host(&self) -> &dyn ExpressionHost {
        self.expression_host.as_ref()
    }

    /// The resource fetcher, for URL-backed expression source.
    pub fn resource_fetcher(&self) -> &dyn ResourceFetcher {
        self.resource_fetcher.as_ref()
    }

    /// Returns the cached compiled artifact for `digest`, if present.
    ///
    /// Acquires the cache's read lock; panics only if the lock is poisoned
    /// by a prior panicking writer, matching the `RwLock` convention used
    /// elsewhere in this crate.
    pub fn cached(&self, digest: &Sha1Digest) -> Option<Arc<CompiledArtifact>> {
        self.compiled.read().expect("compile cache lock poisoned").get(digest).cloned()
    }

    /// Inserts (or replaces) the compiled artifact for `digest`.
    pub fn cache(&self, digest: Sha1Digest, artifact: Arc<CompiledArtifact>) {
        self.compiled
            .write()
            .expect("compile cache lock poisoned")
            .insert(digest, artifact);
    }
}
