// file: src/trace/traced.rs
// description: cache wrapper emitting attribution spans around every operation
// reference: wrap-call-forward pattern over the reference cache

use crate::cache::{Actor, CacheResponse, CacheStats, GetOptions, RefCache, RefEntryInfo};
use crate::cache::policy::AccessPolicy;
use crate::error::Result;
use crate::trace::attributes::{TraceBackend, attributes_for};
use serde_json::Value;
use std::sync::Arc;
use tracing::{Span, debug, info_span};

/// Forwards every call to the inner cache while opening a span that
/// carries user/session attribution and hit/miss status.
#[derive(Clone)]
pub struct TracedCache {
    inner: Arc<RefCache>,
    backend: TraceBackend,
    tags: Vec<String>,
}

impl TracedCache {
    pub fn new(inner: Arc<RefCache>, backend: TraceBackend, tags: Vec<String>) -> Self {
        Self {
            inner,
            backend,
            tags,
        }
    }

    /// The wrapped cache. Admin tools operate on this directly.
    pub fn inner(&self) -> &Arc<RefCache> {
        &self.inner
    }

    pub fn backend(&self) -> &TraceBackend {
        &self.backend
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn set(
        &self,
        key: &str,
        value: Value,
        namespace: &str,
        policy: AccessPolicy,
        tool_name: Option<&str>,
    ) -> RefEntryInfo {
        let span = self.cache_span("set", Some(namespace));
        let _guard = span.enter();

        let info = self.inner.set(key, value, namespace, policy, tool_name);
        span.record("hit", true);
        debug!(ref_id = %info.ref_id, "traced cache set");
        info
    }

    pub fn store(&self, key: &str, value: Value, namespace: &str, tool_name: &str) -> CacheResponse {
        let span = self.cache_span("store", Some(namespace));
        let _guard = span.enter();

        let response = self.inner.store(key, value, namespace, tool_name);
        span.record("hit", true);
        debug!(ref_id = %response.ref_id, inlined = response.inlined, "traced cache store");
        response
    }

    pub fn get(&self, ref_id: &str, actor: Actor, options: GetOptions) -> Result<CacheResponse> {
        let span = self.cache_span("get", None);
        let _guard = span.enter();

        let result = self.inner.get(ref_id, actor, options);
        span.record("hit", result.is_ok());
        if let Err(err) = &result {
            debug!(ref_id = %ref_id, error = %err, "traced cache get miss");
        }
        result
    }

    pub fn resolve(&self, ref_id: &str, actor: Actor) -> Result<Value> {
        let span = self.cache_span("resolve", None);
        let _guard = span.enter();

        let result = self.inner.resolve(ref_id, actor);
        span.record("hit", result.is_ok());
        if let Err(err) = &result {
            debug!(ref_id = %ref_id, error = %err, "traced cache resolve miss");
        }
        result
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }

    fn cache_span(&self, op: &str, namespace: Option<&str>) -> Span {
        let attrs = attributes_for(namespace, &self.tags);
        info_span!(
            "cache_op",
            op = %op,
            cache = %self.inner.name(),
            user_id = attrs.user_id.as_deref().unwrap_or(""),
            session_id = attrs.session_id.as_deref().unwrap_or(""),
            namespace = namespace.unwrap_or(""),
            tags = %attrs.tags.join(","),
            backend_enabled = self.backend.is_enabled(),
            hit = tracing::field::Empty,
        )
    }
}

/// Span wrapping a single tool invocation, carrying the same
/// attribution fields as cache spans.
pub fn tool_span(tool: &str, tags: &[String]) -> Span {
    let attrs = attributes_for(None, tags);
    info_span!(
        "tool_call",
        tool = %tool,
        user_id = attrs.user_id.as_deref().unwrap_or(""),
        session_id = attrs.session_id.as_deref().unwrap_or(""),
        tags = %attrs.tags.join(","),
    )
}

/// Shutdown hook. Span data is written synchronously by the
/// subscriber, so this only marks the flush point in the log.
pub fn flush_traces() {
    debug!("trace flush complete");
}
