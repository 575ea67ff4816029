// file: src/cache/store.rs
// description: in-memory reference cache with ttl, namespaces and access policies
// reference: keyed value store returning opaque reference ids

use crate::cache::policy::{AccessPolicy, Actor};
use crate::cache::preview::{self, PreviewConfig, PreviewStrategy};
use crate::error::{RefServeError, Result};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

/// Metadata returned when a value is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefEntryInfo {
    pub ref_id: String,
    pub key: String,
    pub namespace: String,
    pub tool_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub ttl_secs: u64,
}

/// Structured response for cache reads. Mirrors the tool output shape:
/// a preview (or page) plus enough metadata to navigate the full value.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheResponse {
    pub ref_id: String,
    pub preview: Value,
    pub preview_strategy: String,
    pub total_items: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_size: Option<usize>,
    /// True when the preview carries the complete value.
    pub inlined: bool,
}

/// Aggregate statistics for the admin surface.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheStats {
    pub name: String,
    pub entries: usize,
    pub namespaces: BTreeMap<String, usize>,
    pub default_ttl_secs: u64,
}

/// Read options for `RefCache::get`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetOptions {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub max_size: Option<usize>,
}

const DEFAULT_PAGE_SIZE: usize = 20;

struct CacheEntry {
    key: String,
    namespace: String,
    value: Value,
    policy: AccessPolicy,
    tool_name: Option<String>,
    created_at: DateTime<Utc>,
    stored: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.stored.elapsed() > self.ttl
    }
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    // (namespace, key) -> ref_id, so re-setting a key reuses its reference
    by_key: HashMap<(String, String), String>,
}

/// In-memory reference cache. Values are addressed by opaque ref ids,
/// checked against per-entry access policies, and reduced to previews
/// on read. Expired entries are treated as absent on access and
/// reclaimed by `purge_expired`.
pub struct RefCache {
    name: String,
    default_ttl: Duration,
    preview_config: PreviewConfig,
    state: RwLock<CacheState>,
}

impl RefCache {
    pub fn new(name: &str, default_ttl: Duration, preview_config: PreviewConfig) -> Self {
        Self {
            name: name.to_string(),
            default_ttl,
            preview_config,
            state: RwLock::new(CacheState::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn preview_config(&self) -> PreviewConfig {
        self.preview_config
    }

    /// Store a value under (namespace, key) with the given policy.
    pub fn set(
        &self,
        key: &str,
        value: Value,
        namespace: &str,
        policy: AccessPolicy,
        tool_name: Option<&str>,
    ) -> RefEntryInfo {
        self.set_with_ttl(key, value, namespace, policy, tool_name, self.default_ttl)
    }

    pub fn set_with_ttl(
        &self,
        key: &str,
        value: Value,
        namespace: &str,
        policy: AccessPolicy,
        tool_name: Option<&str>,
        ttl: Duration,
    ) -> RefEntryInfo {
        let mut state = self.state.write().expect("cache lock poisoned");

        let map_key = (namespace.to_string(), key.to_string());
        let ref_id = state
            .by_key
            .get(&map_key)
            .cloned()
            .unwrap_or_else(|| format!("ref-{}", Uuid::new_v4().simple()));

        let entry = CacheEntry {
            key: key.to_string(),
            namespace: namespace.to_string(),
            value,
            policy,
            tool_name: tool_name.map(str::to_string),
            created_at: Utc::now(),
            stored: Instant::now(),
            ttl,
        };

        debug!(ref_id = %ref_id, namespace = %namespace, key = %key, "cache set");

        state.by_key.insert(map_key, ref_id.clone());
        let info = RefEntryInfo {
            ref_id: ref_id.clone(),
            key: entry.key.clone(),
            namespace: entry.namespace.clone(),
            tool_name: entry.tool_name.clone(),
            created_at: entry.created_at,
            ttl_secs: entry.ttl.as_secs(),
        };
        state.entries.insert(ref_id, entry);
        info
    }

    /// Store a tool result in a namespace with the open policy, returning
    /// an inline response for small values and a preview for large ones.
    /// The value is cached either way so later reads can paginate it.
    pub fn store(&self, key: &str, value: Value, namespace: &str, tool_name: &str) -> CacheResponse {
        let info = self.set(key, value.clone(), namespace, AccessPolicy::open(), Some(tool_name));

        let max_size = self.preview_config.max_size;
        let total_items = preview::item_count(&value);
        let original_size = preview::estimate_size(&value);

        if preview::fits(&value, max_size) {
            return CacheResponse {
                ref_id: info.ref_id,
                preview: value,
                preview_strategy: self.preview_config.default_strategy.as_str().to_string(),
                total_items,
                page: None,
                total_pages: None,
                original_size: Some(original_size),
                preview_size: Some(original_size),
                inlined: true,
            };
        }

        let built = preview::build_preview(&value, self.preview_config.default_strategy, max_size);
        CacheResponse {
            ref_id: info.ref_id,
            preview: built.value,
            preview_strategy: built.strategy.as_str().to_string(),
            total_items,
            page: None,
            total_pages: None,
            original_size: Some(original_size),
            preview_size: Some(built.size),
            inlined: false,
        }
    }

    /// Read a reference as the given actor, returning a preview or a
    /// page of the stored value. Requires READ permission.
    pub fn get(&self, ref_id: &str, actor: Actor, options: GetOptions) -> Result<CacheResponse> {
        let state = self.state.read().expect("cache lock poisoned");
        let entry = Self::live_entry(&state, ref_id)?;

        if !entry.policy.can_read(actor) {
            debug!(ref_id = %ref_id, ?actor, "cache read denied");
            return Err(RefServeError::AccessDenied {
                ref_id: ref_id.to_string(),
            });
        }

        let max_size = options.max_size.unwrap_or(self.preview_config.max_size);
        let total_items = preview::item_count(&entry.value);
        let original_size = preview::estimate_size(&entry.value);

        if options.page.is_some() || options.page_size.is_some() {
            let page = options.page.unwrap_or(1);
            let page_size = options.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
            let sliced = preview::paginate(&entry.value, page, page_size)?;
            let preview_size = preview::estimate_size(&sliced.value);

            return Ok(CacheResponse {
                ref_id: ref_id.to_string(),
                preview: sliced.value,
                preview_strategy: PreviewStrategy::Paginate.as_str().to_string(),
                total_items,
                page: Some(sliced.page),
                total_pages: Some(sliced.total_pages),
                original_size: Some(original_size),
                preview_size: Some(preview_size),
                inlined: false,
            });
        }

        let built =
            preview::build_preview(&entry.value, self.preview_config.default_strategy, max_size);
        let inlined = built.size >= original_size;
        Ok(CacheResponse {
            ref_id: ref_id.to_string(),
            preview: built.value,
            preview_strategy: built.strategy.as_str().to_string(),
            total_items,
            page: None,
            total_pages: None,
            original_size: Some(original_size),
            preview_size: Some(built.size),
            inlined,
        })
    }

    /// Return the complete stored value. Requires READ permission;
    /// the System actor bypasses policy for private computation.
    pub fn resolve(&self, ref_id: &str, actor: Actor) -> Result<Value> {
        let state = self.state.read().expect("cache lock poisoned");
        let entry = Self::live_entry(&state, ref_id)?;

        if !entry.policy.can_read(actor) {
            debug!(ref_id = %ref_id, ?actor, "cache resolve denied");
            return Err(RefServeError::AccessDenied {
                ref_id: ref_id.to_string(),
            });
        }

        Ok(entry.value.clone())
    }

    /// Drop expired entries, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let mut state = self.state.write().expect("cache lock poisoned");

        let expired: Vec<String> = state
            .entries
            .iter()
            .filter(|(_, e)| e.is_expired())
            .map(|(id, _)| id.clone())
            .collect();

        for ref_id in &expired {
            if let Some(entry) = state.entries.remove(ref_id) {
                state.by_key.remove(&(entry.namespace, entry.key));
            }
        }

        if !expired.is_empty() {
            debug!(count = expired.len(), "purged expired cache entries");
        }
        expired.len()
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.read().expect("cache lock poisoned");

        let mut namespaces: BTreeMap<String, usize> = BTreeMap::new();
        for entry in state.entries.values() {
            if !entry.is_expired() {
                *namespaces.entry(entry.namespace.clone()).or_default() += 1;
            }
        }

        CacheStats {
            name: self.name.clone(),
            entries: namespaces.values().sum(),
            namespaces,
            default_ttl_secs: self.default_ttl.as_secs(),
        }
    }

    pub fn namespaces(&self) -> Vec<String> {
        self.stats().namespaces.into_keys().collect()
    }

    pub fn len(&self) -> usize {
        self.stats().entries
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn live_entry<'a>(state: &'a CacheState, ref_id: &str) -> Result<&'a CacheEntry> {
        match state.entries.get(ref_id) {
            Some(entry) if !entry.is_expired() => Ok(entry),
            _ => Err(RefServeError::NotFound {
                ref_id: ref_id.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn cache() -> RefCache {
        RefCache::new(
            "test-cache",
            Duration::from_secs(3600),
            PreviewConfig::default(),
        )
    }

    fn large_items(n: usize) -> Value {
        json!(
            (0..n)
                .map(|i| json!({ "id": i, "name": format!("item_{}", i), "value": i * 10 }))
                .collect::<Vec<_>>()
        )
    }

    #[test]
    fn test_set_and_resolve_round_trip() {
        let cache = cache();
        let info = cache.set(
            "greeting",
            json!("hello"),
            "public",
            AccessPolicy::open(),
            Some("hello"),
        );

        assert!(info.ref_id.starts_with("ref-"));
        let value = cache.resolve(&info.ref_id, Actor::Agent).unwrap();
        assert_eq!(value, json!("hello"));
    }

    #[test]
    fn test_same_key_reuses_ref_id() {
        let cache = cache();
        let first = cache.set("k", json!(1), "public", AccessPolicy::open(), None);
        let second = cache.set("k", json!(2), "public", AccessPolicy::open(), None);

        assert_eq!(first.ref_id, second.ref_id);
        assert_eq!(cache.resolve(&first.ref_id, Actor::User).unwrap(), json!(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_same_key_different_namespace_gets_new_ref() {
        let cache = cache();
        let a = cache.set("k", json!(1), "public", AccessPolicy::open(), None);
        let b = cache.set("k", json!(1), "user:secrets", AccessPolicy::secret(), None);
        assert_ne!(a.ref_id, b.ref_id);
    }

    #[test]
    fn test_get_unknown_ref_is_not_found() {
        let cache = cache();
        let err = cache
            .get("ref-missing", Actor::Agent, GetOptions::default())
            .unwrap_err();
        assert!(matches!(err, RefServeError::NotFound { .. }));
    }

    #[test]
    fn test_secret_denies_agent_but_resolves_as_system() {
        let cache = cache();
        let info = cache.set(
            "secret_pi",
            json!(3.14),
            "user:secrets",
            AccessPolicy::secret(),
            Some("store_secret"),
        );

        let err = cache.resolve(&info.ref_id, Actor::Agent).unwrap_err();
        assert!(matches!(err, RefServeError::AccessDenied { .. }));

        let err = cache
            .get(&info.ref_id, Actor::Agent, GetOptions::default())
            .unwrap_err();
        assert!(matches!(err, RefServeError::AccessDenied { .. }));

        let value = cache.resolve(&info.ref_id, Actor::System).unwrap();
        assert_eq!(value, json!(3.14));
    }

    #[test]
    fn test_store_inlines_small_results() {
        let cache = cache();
        let value = json!([{ "id": 0, "name": "item_0" }]);
        let response = cache.store("generate_items:1:item", value.clone(), "public", "generate_items");

        assert!(response.inlined);
        assert_eq!(response.preview, value);
        assert_eq!(response.total_items, 1);
    }

    #[test]
    fn test_store_previews_large_results() {
        let cache = cache();
        let response = cache.store(
            "generate_items:500:item",
            large_items(500),
            "public",
            "generate_items",
        );

        assert!(!response.inlined);
        assert_eq!(response.total_items, 500);
        assert!(response.preview.as_array().unwrap().len() < 500);
        assert!(response.preview_size.unwrap() < response.original_size.unwrap());
    }

    #[test]
    fn test_get_paginates_cached_value() {
        let cache = cache();
        let stored = cache.store("items", large_items(45), "public", "generate_items");

        let response = cache
            .get(
                &stored.ref_id,
                Actor::Agent,
                GetOptions {
                    page: Some(3),
                    page_size: Some(20),
                    max_size: None,
                },
            )
            .unwrap();

        assert_eq!(response.page, Some(3));
        assert_eq!(response.total_pages, Some(3));
        assert_eq!(response.preview.as_array().unwrap().len(), 5);
        assert_eq!(response.preview_strategy, "paginate");
    }

    #[test]
    fn test_get_defaults_page_size_when_only_page_given() {
        let cache = cache();
        let stored = cache.store("items", large_items(45), "public", "generate_items");

        let response = cache
            .get(
                &stored.ref_id,
                Actor::Agent,
                GetOptions {
                    page: Some(1),
                    page_size: None,
                    max_size: None,
                },
            )
            .unwrap();

        assert_eq!(response.preview.as_array().unwrap().len(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_max_size_override_shrinks_preview() {
        let cache = cache();
        let stored = cache.store("items", large_items(200), "public", "generate_items");

        let wide = cache
            .get(
                &stored.ref_id,
                Actor::Agent,
                GetOptions {
                    max_size: Some(128),
                    ..Default::default()
                },
            )
            .unwrap();
        let narrow = cache
            .get(
                &stored.ref_id,
                Actor::Agent,
                GetOptions {
                    max_size: Some(8),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(narrow.preview_size.unwrap() < wide.preview_size.unwrap());
    }

    #[test]
    fn test_ttl_expiry_and_purge() {
        let cache = cache();
        let info = cache.set_with_ttl(
            "ephemeral",
            json!(1),
            "public",
            AccessPolicy::open(),
            None,
            Duration::from_millis(0),
        );
        std::thread::sleep(Duration::from_millis(5));

        let err = cache.resolve(&info.ref_id, Actor::User).unwrap_err();
        assert!(matches!(err, RefServeError::NotFound { .. }));

        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_stats_counts_live_entries_per_namespace() {
        let cache = cache();
        cache.set("a", json!(1), "public", AccessPolicy::open(), None);
        cache.set("b", json!(2), "public", AccessPolicy::open(), None);
        cache.set("s", json!(3), "user:secrets", AccessPolicy::secret(), None);

        let stats = cache.stats();
        assert_eq!(stats.entries, 3);
        assert_eq!(stats.namespaces.get("public"), Some(&2));
        assert_eq!(stats.namespaces.get("user:secrets"), Some(&1));
        assert_eq!(cache.namespaces(), vec!["public", "user:secrets"]);
    }
}
