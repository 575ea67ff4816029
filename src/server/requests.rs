// file: src/server/requests.rs
// description: schema-validated tool argument and response types
// reference: field bounds are enforced after deserialization

use crate::cache::{CacheResponse, CacheStats};
use crate::error::Result;
use crate::trace::{ContextState, TraceAttributes, TraceBackend};
use crate::utils::telemetry::HealthReport;
use crate::utils::validation::Validator;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_hello_name() -> String {
    "World".to_string()
}

fn default_item_count() -> usize {
    10
}

fn default_item_prefix() -> String {
    "item".to_string()
}

fn default_multiplier() -> f64 {
    1.0
}

fn default_enabled() -> bool {
    true
}

/// Arguments for the greeting tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HelloRequest {
    /// The name to greet.
    #[serde(default = "default_hello_name")]
    pub name: String,
}

/// Arguments for item generation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GenerateItemsRequest {
    /// Number of items to generate (1 to 10000).
    #[serde(default = "default_item_count")]
    pub count: usize,
    /// Prefix for item names.
    #[serde(default = "default_item_prefix")]
    pub prefix: String,
}

impl GenerateItemsRequest {
    pub fn validate(&self) -> Result<()> {
        Validator::validate_item_count(self.count)
    }
}

/// Arguments for storing a secret value.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoreSecretRequest {
    /// Name for the secret, used as the cache key (1 to 100 characters).
    pub name: String,
    /// The secret numeric value.
    pub value: f64,
}

impl StoreSecretRequest {
    pub fn validate(&self) -> Result<()> {
        Validator::validate_secret_name(&self.name)
    }
}

/// Arguments for computing with a stored secret.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ComputeSecretRequest {
    /// Reference ID of the secret value.
    pub secret_ref: String,
    /// Multiplier to apply to the secret value.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

impl ComputeSecretRequest {
    pub fn validate(&self) -> Result<()> {
        Validator::validate_ref_id(&self.secret_ref)
    }
}

/// Arguments for cache queries.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheQueryRequest {
    /// Reference ID to look up.
    pub ref_id: String,
    /// Page number for pagination (1-indexed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    /// Number of items per page (at most 100).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    /// Maximum preview size in approximate tokens. Overrides the
    /// server default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<usize>,
}

impl CacheQueryRequest {
    pub fn validate(&self) -> Result<()> {
        Validator::validate_ref_id(&self.ref_id)?;
        Validator::validate_cache_query(self.page, self.page_size, self.max_size)
    }
}

/// Arguments for toggling test context mode.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EnableTestContextRequest {
    /// Whether to enable test context mode.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// Arguments for setting mock context values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SetTestContextRequest {
    /// User identity (e.g. "alice", "bob").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Organization identity (e.g. "acme", "globex").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
    /// Session identifier for grouping traces.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Agent identity (e.g. "claude", "gpt4").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

/// Greeting tool response.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HelloResponse {
    pub message: String,
    pub server: String,
}

/// Permissions summary attached to stored secrets.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PermissionsSummary {
    pub user: String,
    pub agent: String,
}

/// Response from storing a secret.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoreSecretResponse {
    pub ref_id: String,
    pub name: String,
    pub message: String,
    pub permissions: PermissionsSummary,
}

/// Response from private computation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ComputeSecretResponse {
    pub result: f64,
    pub multiplier: f64,
    pub secret_ref: String,
    pub message: String,
}

/// The documented error shape for invalid or inaccessible references.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheErrorResponse {
    pub error: String,
    pub message: String,
    pub ref_id: String,
}

impl CacheErrorResponse {
    pub fn inaccessible(ref_id: &str) -> Self {
        Self {
            error: "Invalid or inaccessible reference".to_string(),
            message: "Reference not found, expired, or access denied".to_string(),
            ref_id: ref_id.to_string(),
        }
    }
}

/// Cache lookups either succeed with a preview or report the
/// documented error shape; both are ordinary tool results.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CacheLookupResponse {
    Hit(CacheResponse),
    Error(CacheErrorResponse),
}

/// Response from toggling test context mode.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TestContextResponse {
    pub test_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextState>,
    pub trace_enabled: bool,
    pub message: String,
}

/// Response from setting mock context values.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SetContextResponse {
    pub context: ContextState,
    pub trace_attributes: TraceAttributes,
    pub message: String,
}

/// Response from resetting the mock context.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResetContextResponse {
    pub context: ContextState,
    pub message: String,
}

/// Trace status report.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TraceInfoResponse {
    pub trace_enabled: bool,
    pub backend: TraceBackend,
    pub test_mode_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_context: Option<ContextState>,
    pub trace_attributes: TraceAttributes,
    pub message: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HealthResponse {
    pub server: String,
    pub cache: String,
    pub trace_enabled: bool,
    pub test_mode: bool,
    pub report: HealthReport,
}

/// Admin: cache statistics.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AdminStatsResponse {
    pub stats: CacheStats,
}

/// Admin: namespace listing.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AdminNamespacesResponse {
    pub namespaces: Vec<String>,
}

/// Admin: expired-entry purge result.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AdminPurgeResponse {
    pub purged: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_generate_items_defaults() {
        let request: GenerateItemsRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(request.count, 10);
        assert_eq!(request.prefix, "item");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_generate_items_count_bounds() {
        let request: GenerateItemsRequest =
            serde_json::from_value(json!({ "count": 10001 })).unwrap();
        assert!(request.validate().is_err());

        let request: GenerateItemsRequest = serde_json::from_value(json!({ "count": 0 })).unwrap();
        assert!(request.validate().is_err());

        let request: GenerateItemsRequest =
            serde_json::from_value(json!({ "count": 10000 })).unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_store_secret_name_bounds() {
        let request = StoreSecretRequest {
            name: "x".repeat(101),
            value: 1.0,
        };
        assert!(request.validate().is_err());

        let request = StoreSecretRequest {
            name: "api_key_hash".to_string(),
            value: 12345.0,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_cache_query_bounds() {
        let request: CacheQueryRequest = serde_json::from_value(json!({
            "ref_id": "ref-abc",
            "page": 0
        }))
        .unwrap();
        assert!(request.validate().is_err());

        let request: CacheQueryRequest = serde_json::from_value(json!({
            "ref_id": "ref-abc",
            "page": 2,
            "page_size": 100
        }))
        .unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_compute_secret_defaults_multiplier() {
        let request: ComputeSecretRequest =
            serde_json::from_value(json!({ "secret_ref": "ref-abc" })).unwrap();
        assert_eq!(request.multiplier, 1.0);
    }

    #[test]
    fn test_cache_error_response_shape() {
        let response = CacheErrorResponse::inaccessible("ref-gone");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "error": "Invalid or inaccessible reference",
                "message": "Reference not found, expired, or access denied",
                "ref_id": "ref-gone"
            })
        );
    }

    #[test]
    fn test_cache_lookup_response_serializes_untagged() {
        let response = CacheLookupResponse::Error(CacheErrorResponse::inaccessible("ref-x"));
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("error").is_some());
        assert!(value.get("preview").is_none());
    }
}
