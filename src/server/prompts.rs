// file: src/server/prompts.rs
// description: server instructions and guide prompts
// reference: prompt text served over the MCP prompts capability

use crate::config::Config;

/// Usage notes appended to the server instructions, describing how
/// reference ids, previews and pagination fit together.
pub fn cache_instructions() -> String {
    "Cache usage:\n\
     - Large tool results are cached and returned as a `ref_id` plus a preview.\n\
     - Pass a `ref_id` to get_cached_result to fetch a preview, or add `page` and\n\
       `page_size` to walk the full value.\n\
     - Pass `max_size` to get_cached_result to grow or shrink the preview budget.\n\
     - References expire after the configured TTL; expired or unknown references\n\
       produce an 'Invalid or inaccessible reference' response."
        .to_string()
}

/// Full instruction block for the MCP handshake.
pub fn server_instructions(config: &Config) -> String {
    format!(
        "A reference-caching MCP tool server with trace attribution.\n\
         \n\
         All tool calls are traced with:\n\
         - User ID and Session ID from context (for filtering/aggregation)\n\
         - Full context metadata (org_id, agent_id, cache_namespace)\n\
         - Cache operation spans with hit/miss tracking\n\
         \n\
         Enable test mode with enable_test_context to simulate different users.\n\
         \n\
         Available tools:\n\
         - hello: Simple greeting tool (no caching)\n\
         - generate_items: Generate a list of items (cached in the {public} namespace)\n\
         - store_secret: Store a secret value for private computation\n\
         - compute_with_secret: Use a secret in computation without revealing it\n\
         - get_cached_result: Retrieve or paginate through cached results\n\
         - enable_test_context: Enable/disable test context for attribution demos\n\
         - set_test_context: Set test context values for user attribution\n\
         - reset_test_context: Reset test context to defaults\n\
         - get_trace_info: Get current trace attribution status\n\
         - health_check: Check server health status\n\
         \n\
         {cache}",
        public = config.cache.public_namespace,
        cache = cache_instructions()
    )
}

/// Guide for using this server's tool surface.
pub fn template_guide() -> String {
    format!(
        "# Refserve Guide\n\
         \n\
         ## Quick Start\n\
         \n\
         1. **Simple Tool**\n\
            Use `hello` for a basic greeting:\n\
            - `hello(\"World\")` -> \"Hello, World!\"\n\
         \n\
         2. **Generate Items (Caching Demo)**\n\
            Use `generate_items` to create a list:\n\
            - `generate_items(count=100, prefix=\"widget\")`\n\
            - Returns ref_id + preview for large results\n\
            - Cached in the public namespace (shared)\n\
         \n\
         3. **Paginate Results**\n\
            Use `get_cached_result` to navigate large results:\n\
            - `get_cached_result(ref_id, page=2, page_size=20)`\n\
         \n\
         ## Private Computation\n\
         \n\
         Store values that agents can use but not see:\n\
         \n\
         ```\n\
         # Store a secret\n\
         store_secret(\"api_key_hash\", 12345.0)\n\
         # Returns ref_id for the secret\n\
         \n\
         # Use in computation (agent never sees the value)\n\
         compute_with_secret(ref_id, multiplier=2.0)\n\
         # Returns the result\n\
         ```\n\
         \n\
         ---\n\
         \n\
         {}",
        cache_instructions()
    )
}

/// Guide for trace attribution setup and the test context workflow.
pub fn trace_guide() -> String {
    "# Trace Attribution Guide\n\
     \n\
     ## Setup\n\
     \n\
     Set environment variables before starting the server:\n\
     \n\
     ```bash\n\
     export LANGFUSE_PUBLIC_KEY=\"pk-lf-...\"\n\
     export LANGFUSE_SECRET_KEY=\"sk-lf-...\"\n\
     export LANGFUSE_HOST=\"https://cloud.langfuse.com\"  # Optional\n\
     ```\n\
     \n\
     ## Context Propagation\n\
     \n\
     1. **User Attribution**\n\
        - `user_id`: tracks which user made the request\n\
        - `session_id`: groups related requests into sessions\n\
        - `metadata`: additional context (org_id, agent_id, cache_namespace)\n\
     \n\
     2. **Testing Context**\n\
        Enable test mode to simulate different users:\n\
        ```\n\
        enable_test_context(true)\n\
        set_test_context(user_id=\"alice\", org_id=\"acme\", session_id=\"chat-001\")\n\
        ```\n\
     \n\
     3. **Cache Operations**\n\
        Cache set/get/resolve operations create child spans that inherit\n\
        user_id and session_id for complete attribution.\n\
     \n\
     ## Example Workflow\n\
     \n\
     1. enable_test_context(true), then set_test_context(user_id=\"alice\")\n\
     2. generate_items(count=100) - traced with user attribution\n\
     3. get_cached_result(ref_id) - same user in the trace\n\
     4. get_trace_info() - verify attribution is active\n\
     \n\
     ## Notes\n\
     \n\
     - Use meaningful user_id and session_id values\n\
     - Check get_trace_info() to verify tracing is working\n\
     - Traces are flushed on server shutdown"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instructions_list_every_tool() {
        let config = Config::default_config();
        let text = server_instructions(&config);

        for tool in [
            "hello",
            "generate_items",
            "store_secret",
            "compute_with_secret",
            "get_cached_result",
            "enable_test_context",
            "set_test_context",
            "reset_test_context",
            "get_trace_info",
            "health_check",
        ] {
            assert!(text.contains(tool), "missing tool in instructions: {}", tool);
        }
    }

    #[test]
    fn test_guides_mention_key_workflows() {
        assert!(template_guide().contains("get_cached_result"));
        assert!(template_guide().contains("compute_with_secret"));
        assert!(trace_guide().contains("LANGFUSE_PUBLIC_KEY"));
        assert!(trace_guide().contains("set_test_context"));
    }
}
