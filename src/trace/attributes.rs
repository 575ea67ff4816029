// file: src/trace/attributes.rs
// description: trace backend detection and attribution attribute assembly
// reference: backend credentials are read from the environment only

use crate::trace::context::{MockContext, is_test_mode_enabled};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;

pub const PUBLIC_KEY_VAR: &str = "LANGFUSE_PUBLIC_KEY";
pub const SECRET_KEY_VAR: &str = "LANGFUSE_SECRET_KEY";
pub const HOST_VAR: &str = "LANGFUSE_HOST";
pub const DEFAULT_HOST: &str = "https://cloud.langfuse.com";

/// Tracing backend configuration detected from the environment.
/// Credentials only gate whether attribution is emitted; nothing in
/// this crate talks to the backend directly.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TraceBackend {
    pub host: String,
    pub public_key_set: bool,
    pub secret_key_set: bool,
    /// Set from config to force attribution off.
    pub disabled: bool,
}

impl TraceBackend {
    pub fn from_env(disabled: bool) -> Self {
        Self {
            host: env::var(HOST_VAR).unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            public_key_set: env::var(PUBLIC_KEY_VAR).is_ok_and(|v| !v.is_empty()),
            secret_key_set: env::var(SECRET_KEY_VAR).is_ok_and(|v| !v.is_empty()),
            disabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled && self.public_key_set && self.secret_key_set
    }

    pub fn status_message(&self) -> String {
        if self.is_enabled() {
            "Traces carry user/session attribution for the configured backend".to_string()
        } else {
            format!(
                "Set {} and {} to enable trace attribution",
                PUBLIC_KEY_VAR, SECRET_KEY_VAR
            )
        }
    }
}

/// Attribution attached to spans: identity, session, metadata, tags.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TraceAttributes {
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub metadata: BTreeMap<String, String>,
    pub tags: Vec<String>,
}

/// Assemble attribution for an operation. Identity fields come from
/// the mock context while test mode is enabled; otherwise they are
/// absent (a real deployment would take them from the transport
/// authentication layer).
pub fn attributes_for(namespace: Option<&str>, base_tags: &[String]) -> TraceAttributes {
    let mut metadata = BTreeMap::new();
    let mut tags: Vec<String> = base_tags.to_vec();

    if let Some(ns) = namespace {
        metadata.insert("cache_namespace".to_string(), ns.to_string());
    }

    if !is_test_mode_enabled() {
        return TraceAttributes {
            user_id: None,
            session_id: None,
            metadata,
            tags,
        };
    }

    let state = MockContext::current_state();
    metadata.insert("org_id".to_string(), state.org_id);
    metadata.insert("agent_id".to_string(), state.agent_id);
    tags.push("test-context".to_string());

    TraceAttributes {
        user_id: Some(state.user_id),
        session_id: Some(state.session_id),
        metadata,
        tags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::context::{ContextUpdate, MockContext, TEST_GUARD, enable_test_mode};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_backend_disabled_without_credentials() {
        let backend = TraceBackend {
            host: DEFAULT_HOST.to_string(),
            public_key_set: false,
            secret_key_set: false,
            disabled: false,
        };
        assert!(!backend.is_enabled());
        assert!(backend.status_message().contains(PUBLIC_KEY_VAR));
    }

    #[test]
    fn test_backend_requires_both_keys() {
        let backend = TraceBackend {
            host: DEFAULT_HOST.to_string(),
            public_key_set: true,
            secret_key_set: false,
            disabled: false,
        };
        assert!(!backend.is_enabled());
    }

    #[test]
    fn test_backend_config_kill_switch() {
        let backend = TraceBackend {
            host: DEFAULT_HOST.to_string(),
            public_key_set: true,
            secret_key_set: true,
            disabled: true,
        };
        assert!(!backend.is_enabled());
    }

    #[test]
    fn test_attributes_empty_outside_test_mode() {
        let _guard = TEST_GUARD.lock().unwrap();
        enable_test_mode(false);

        let attrs = attributes_for(Some("public"), &["refserve".to_string()]);
        assert_eq!(attrs.user_id, None);
        assert_eq!(attrs.session_id, None);
        assert_eq!(
            attrs.metadata.get("cache_namespace"),
            Some(&"public".to_string())
        );
        assert_eq!(attrs.tags, vec!["refserve".to_string()]);
    }

    #[test]
    fn test_attributes_filled_in_test_mode() {
        let _guard = TEST_GUARD.lock().unwrap();
        MockContext::reset();
        MockContext::update(ContextUpdate {
            user_id: Some("alice".to_string()),
            org_id: Some("acme".to_string()),
            session_id: Some("chat-001".to_string()),
            ..Default::default()
        });
        enable_test_mode(true);

        let attrs = attributes_for(Some("user:secrets"), &[]);
        assert_eq!(attrs.user_id, Some("alice".to_string()));
        assert_eq!(attrs.session_id, Some("chat-001".to_string()));
        assert_eq!(attrs.metadata.get("org_id"), Some(&"acme".to_string()));
        assert_eq!(
            attrs.metadata.get("cache_namespace"),
            Some(&"user:secrets".to_string())
        );
        assert!(attrs.tags.contains(&"test-context".to_string()));

        enable_test_mode(false);
        MockContext::reset();
    }
}
