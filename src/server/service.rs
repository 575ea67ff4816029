// file: src/server/service.rs
// description: MCP service exposing the cached tool surface
// reference: https://docs.rs/rmcp

use crate::cache::{Actor, GetOptions, PreviewConfig, PreviewStrategy, RefCache};
use crate::cache::policy::AccessPolicy;
use crate::config::Config;
use crate::error::RefServeError;
use crate::server::prompts;
use crate::server::requests::*;
use crate::trace::{
    ContextUpdate, MockContext, TraceBackend, TracedCache, attributes_for, enable_test_mode,
    is_test_mode_enabled, tool_span,
};
use crate::utils::telemetry::{HealthCheck, HealthReport};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::tool::Parameters;
use rmcp::model::{
    GetPromptRequestParam, GetPromptResult, Implementation, ListPromptsResult,
    PaginatedRequestParam, Prompt, PromptMessage, PromptMessageRole, ProtocolVersion,
    ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, Json, RoleServer, ServerHandler, tool, tool_handler, tool_router};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const TEMPLATE_GUIDE_PROMPT: &str = "template_guide";
const TRACE_GUIDE_PROMPT: &str = "trace_guide";

#[derive(Clone)]
pub struct RefServeMcp {
    config: Arc<Config>,
    cache: TracedCache,
    tags: Vec<String>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl RefServeMcp {
    pub fn new(config: Config) -> crate::error::Result<Self> {
        let preview_config = PreviewConfig {
            max_size: config.cache.preview_max_size,
            default_strategy: PreviewStrategy::parse(&config.cache.preview_strategy)?,
        };

        let base = Arc::new(RefCache::new(
            &config.server.name,
            Duration::from_secs(config.cache.default_ttl_secs),
            preview_config,
        ));

        let backend = TraceBackend::from_env(config.trace.disabled);
        let cache = TracedCache::new(base, backend, config.trace.tags.clone());

        Ok(Self {
            tags: config.trace.tags.clone(),
            config: Arc::new(config),
            cache,
            tool_router: Self::tool_router(),
        })
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect()
    }

    pub fn cache(&self) -> &TracedCache {
        &self.cache
    }

    /// Admin gate for the `admin_`-prefixed tools. Always denies here;
    /// replace with real auth when embedding this server.
    fn is_admin(&self) -> bool {
        false
    }

    fn require_admin(&self) -> std::result::Result<(), McpError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(McpError::invalid_request(
                "admin access required: admin tools are disabled by default",
                None,
            ))
        }
    }

    fn map_validation(err: RefServeError) -> McpError {
        McpError::invalid_params(err.to_string(), None)
    }

    #[tool(description = "Say hello to someone. A simple example tool that does not use caching.")]
    async fn hello(
        &self,
        params: Parameters<HelloRequest>,
    ) -> std::result::Result<Json<HelloResponse>, McpError> {
        let _span = tool_span("hello", &self.tags).entered();
        let request = params.0;
        info!("MCP: greeting {}", request.name);

        Ok(Json(HelloResponse {
            message: format!("Hello, {}!", request.name),
            server: self.config.server.name.clone(),
        }))
    }

    #[tool(
        description = "Generate a list of items. Large results are cached in the public namespace and returned as a reference with a preview; use get_cached_result to paginate."
    )]
    async fn generate_items(
        &self,
        params: Parameters<GenerateItemsRequest>,
    ) -> std::result::Result<Json<crate::cache::CacheResponse>, McpError> {
        let _span = tool_span("generate_items", &self.tags).entered();
        let request = params.0;
        request.validate().map_err(Self::map_validation)?;

        info!(
            "MCP: generating {} items with prefix '{}'",
            request.count, request.prefix
        );

        let items: Vec<serde_json::Value> = (0..request.count)
            .map(|i| {
                json!({
                    "id": i,
                    "name": format!("{}_{}", request.prefix, i),
                    "value": i * 10,
                })
            })
            .collect();

        let key = format!("generate_items:{}:{}", request.count, request.prefix);
        let response = self.cache.store(
            &key,
            serde_json::Value::Array(items),
            &self.config.cache.public_namespace,
            "generate_items",
        );

        Ok(Json(response))
    }

    #[tool(
        description = "Store a secret value that agents cannot read, only use in computations. Users keep full access; agents get EXECUTE only. The value is not logged."
    )]
    async fn store_secret(
        &self,
        params: Parameters<StoreSecretRequest>,
    ) -> std::result::Result<Json<StoreSecretResponse>, McpError> {
        let _span = tool_span("store_secret", &self.tags).entered();
        let request = params.0;
        request.validate().map_err(Self::map_validation)?;

        info!("MCP: storing secret '{}'", request.name);

        let policy = AccessPolicy::secret();
        let info = self.cache.set(
            &format!("secret_{}", request.name),
            json!(request.value),
            "user:secrets",
            policy,
            Some("store_secret"),
        );

        Ok(Json(StoreSecretResponse {
            ref_id: info.ref_id,
            name: request.name.clone(),
            message: format!(
                "Secret '{}' stored. Use compute_with_secret to use it.",
                request.name
            ),
            permissions: PermissionsSummary {
                user: policy.user_permissions.describe().to_string(),
                agent: policy.agent_permissions.describe().to_string(),
            },
        }))
    }

    #[tool(
        description = "Compute using a secret value without revealing it. The secret is multiplied by the provided multiplier server-side; the agent never sees the value."
    )]
    async fn compute_with_secret(
        &self,
        params: Parameters<ComputeSecretRequest>,
    ) -> std::result::Result<Json<ComputeSecretResponse>, McpError> {
        let _span = tool_span("compute_with_secret", &self.tags).entered();
        let request = params.0;
        request.validate().map_err(Self::map_validation)?;

        info!("MCP: computing with secret {}", request.secret_ref);

        // Resolved as System so EXECUTE-only references stay usable
        // without being readable by the caller.
        let secret = self
            .cache
            .resolve(&request.secret_ref, Actor::System)
            .map_err(|_| {
                McpError::invalid_params(
                    format!("Secret reference '{}' not found", request.secret_ref),
                    None,
                )
            })?;

        let secret_value = secret.as_f64().ok_or_else(|| {
            McpError::invalid_params(
                format!("Reference '{}' does not hold a numeric value", request.secret_ref),
                None,
            )
        })?;

        Ok(Json(ComputeSecretResponse {
            result: secret_value * request.multiplier,
            multiplier: request.multiplier,
            secret_ref: request.secret_ref,
            message: "Computed using secret value (value not revealed)".to_string(),
        }))
    }

    #[tool(
        description = "Retrieve a cached result, optionally with pagination. Returns a preview of the cached value, or a page when page/page_size are given; max_size overrides the preview budget."
    )]
    async fn get_cached_result(
        &self,
        params: Parameters<CacheQueryRequest>,
    ) -> std::result::Result<Json<CacheLookupResponse>, McpError> {
        let _span = tool_span("get_cached_result", &self.tags).entered();
        let request = params.0;
        request.validate().map_err(Self::map_validation)?;

        info!("MCP: cache lookup for {}", request.ref_id);

        let options = GetOptions {
            page: request.page,
            page_size: request.page_size,
            max_size: request.max_size,
        };

        match self.cache.get(&request.ref_id, Actor::Agent, options) {
            Ok(response) => Ok(Json(CacheLookupResponse::Hit(response))),
            Err(err) if err.is_reference_error() => Ok(Json(CacheLookupResponse::Error(
                CacheErrorResponse::inaccessible(&request.ref_id),
            ))),
            Err(err) => Err(Self::map_validation(err)),
        }
    }

    #[tool(
        description = "Enable or disable test context mode for attribution demos. When enabled, traces include user_id, session_id and metadata from the mock context."
    )]
    async fn enable_test_context(
        &self,
        params: Parameters<EnableTestContextRequest>,
    ) -> std::result::Result<Json<TestContextResponse>, McpError> {
        let _span = tool_span("enable_test_context", &self.tags).entered();
        let enabled = params.0.enabled;
        enable_test_mode(enabled);
        info!("MCP: test context mode set to {}", enabled);

        let trace_enabled = self.cache.backend().is_enabled();
        if enabled {
            Ok(Json(TestContextResponse {
                test_mode: true,
                context: Some(MockContext::current_state()),
                trace_enabled,
                message:
                    "Test context mode enabled. Traces will include user/session from the mock context."
                        .to_string(),
            }))
        } else {
            Ok(Json(TestContextResponse {
                test_mode: false,
                context: None,
                trace_enabled,
                message: "Test context mode disabled. Context will come from the real transport."
                    .to_string(),
            }))
        }
    }

    #[tool(
        description = "Set test context values for attribution demos. Changes affect the user_id, session_id and metadata attached to traces. Auto-enables test mode."
    )]
    async fn set_test_context(
        &self,
        params: Parameters<SetTestContextRequest>,
    ) -> std::result::Result<Json<SetContextResponse>, McpError> {
        let _span = tool_span("set_test_context", &self.tags).entered();
        let request = params.0;

        if !is_test_mode_enabled() {
            enable_test_mode(true);
        }

        MockContext::update(ContextUpdate {
            user_id: request.user_id,
            org_id: request.org_id,
            agent_id: request.agent_id,
            session_id: request.session_id,
        });

        info!("MCP: test context updated");

        Ok(Json(SetContextResponse {
            context: MockContext::current_state(),
            trace_attributes: attributes_for(None, &self.tags),
            message: "Context updated. Next tool calls will use these trace attributes."
                .to_string(),
        }))
    }

    #[tool(description = "Reset the test context to default demo values.")]
    async fn reset_test_context(&self) -> std::result::Result<Json<ResetContextResponse>, McpError> {
        let _span = tool_span("reset_test_context", &self.tags).entered();
        MockContext::reset();
        info!("MCP: test context reset");

        Ok(Json(ResetContextResponse {
            context: MockContext::current_state(),
            message: "Context reset to default demo values.".to_string(),
        }))
    }

    #[tool(
        description = "Get information about trace attribution status and the current mock context, for debugging."
    )]
    async fn get_trace_info(&self) -> std::result::Result<Json<TraceInfoResponse>, McpError> {
        let _span = tool_span("get_trace_info", &self.tags).entered();
        let backend = self.cache.backend().clone();
        let test_mode = is_test_mode_enabled();

        Ok(Json(TraceInfoResponse {
            trace_enabled: backend.is_enabled(),
            test_mode_enabled: test_mode,
            current_context: test_mode.then(MockContext::current_state),
            trace_attributes: attributes_for(None, &self.tags),
            message: backend.status_message(),
            backend,
        }))
    }

    #[tool(description = "Check server health status, including cache and trace components.")]
    async fn health_check(&self) -> std::result::Result<Json<HealthResponse>, McpError> {
        let _span = tool_span("health_check", &self.tags).entered();

        let stats = self.cache.stats();
        let backend = self.cache.backend();

        let checks = vec![
            HealthCheck::healthy("cache"),
            if backend.is_enabled() {
                HealthCheck::healthy("trace")
            } else {
                HealthCheck::degraded("trace", backend.status_message())
            },
            HealthCheck::healthy("context"),
        ];

        Ok(Json(HealthResponse {
            server: self.config.server.name.clone(),
            cache: stats.name,
            trace_enabled: backend.is_enabled(),
            test_mode: is_test_mode_enabled(),
            report: HealthReport::new(checks, env!("CARGO_PKG_VERSION").to_string()),
        }))
    }

    #[tool(description = "Admin: aggregate cache statistics. Requires admin access.")]
    async fn admin_cache_stats(
        &self,
    ) -> std::result::Result<Json<AdminStatsResponse>, McpError> {
        let _span = tool_span("admin_cache_stats", &self.tags).entered();
        self.require_admin()?;

        Ok(Json(AdminStatsResponse {
            stats: self.cache.inner().stats(),
        }))
    }

    #[tool(description = "Admin: list cache namespaces. Requires admin access.")]
    async fn admin_list_namespaces(
        &self,
    ) -> std::result::Result<Json<AdminNamespacesResponse>, McpError> {
        let _span = tool_span("admin_list_namespaces", &self.tags).entered();
        self.require_admin()?;

        Ok(Json(AdminNamespacesResponse {
            namespaces: self.cache.inner().namespaces(),
        }))
    }

    #[tool(description = "Admin: drop expired cache entries. Requires admin access.")]
    async fn admin_purge_expired(
        &self,
    ) -> std::result::Result<Json<AdminPurgeResponse>, McpError> {
        let _span = tool_span("admin_purge_expired", &self.tags).entered();
        self.require_admin()?;

        Ok(Json(AdminPurgeResponse {
            purged: self.cache.inner().purge_expired(),
        }))
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for RefServeMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .build(),
            server_info: Implementation {
                name: self.config.server.name.clone(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(prompts::server_instructions(&self.config)),
        }
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListPromptsResult, McpError> {
        Ok(ListPromptsResult {
            next_cursor: None,
            prompts: vec![
                Prompt::new(
                    TEMPLATE_GUIDE_PROMPT,
                    Some("Guide for using this MCP server's tool surface"),
                    None,
                ),
                Prompt::new(
                    TRACE_GUIDE_PROMPT,
                    Some("Guide for trace attribution and the test context workflow"),
                    None,
                ),
            ],
        })
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<GetPromptResult, McpError> {
        let text = match request.name.as_str() {
            TEMPLATE_GUIDE_PROMPT => prompts::template_guide(),
            TRACE_GUIDE_PROMPT => prompts::trace_guide(),
            other => {
                return Err(McpError::invalid_params(
                    format!("Unknown prompt: {}", other),
                    None,
                ));
            }
        };

        Ok(GetPromptResult {
            description: None,
            messages: vec![PromptMessage::new_text(PromptMessageRole::User, text)],
        })
    }
}
