// file: src/trace/context.rs
// description: process-wide mock context for attribution demos
// reference: demo-only global state, not for concurrent production use

use lazy_static::lazy_static;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

/// Fabricated attribution values attached to traces while test mode
/// is enabled. Lives in process memory only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ContextState {
    pub user_id: String,
    pub org_id: String,
    pub agent_id: String,
    pub session_id: String,
}

impl ContextState {
    fn demo_defaults() -> Self {
        Self {
            user_id: "demo-user".to_string(),
            org_id: "demo-org".to_string(),
            agent_id: "demo-agent".to_string(),
            session_id: format!("session-{}", Uuid::new_v4().simple()),
        }
    }
}

/// Partial update applied by the context management tools. `None`
/// fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ContextUpdate {
    pub user_id: Option<String>,
    pub org_id: Option<String>,
    pub agent_id: Option<String>,
    pub session_id: Option<String>,
}

lazy_static! {
    static ref STATE: RwLock<ContextState> = RwLock::new(ContextState::demo_defaults());
}

static TEST_MODE: AtomicBool = AtomicBool::new(false);

pub fn enable_test_mode(enabled: bool) {
    TEST_MODE.store(enabled, Ordering::SeqCst);
}

pub fn is_test_mode_enabled() -> bool {
    TEST_MODE.load(Ordering::SeqCst)
}

/// Accessors for the global mock context.
pub struct MockContext;

impl MockContext {
    pub fn current_state() -> ContextState {
        STATE.read().expect("context lock poisoned").clone()
    }

    pub fn update(update: ContextUpdate) {
        let mut state = STATE.write().expect("context lock poisoned");
        if let Some(user_id) = update.user_id {
            state.user_id = user_id;
        }
        if let Some(org_id) = update.org_id {
            state.org_id = org_id;
        }
        if let Some(agent_id) = update.agent_id {
            state.agent_id = agent_id;
        }
        if let Some(session_id) = update.session_id {
            state.session_id = session_id;
        }
    }

    pub fn set_session_id(session_id: &str) {
        Self::update(ContextUpdate {
            session_id: Some(session_id.to_string()),
            ..Default::default()
        });
    }

    /// Restore the default demo identities and mint a fresh session id.
    pub fn reset() {
        let mut state = STATE.write().expect("context lock poisoned");
        *state = ContextState::demo_defaults();
    }
}

#[cfg(test)]
lazy_static! {
    // Tests from several modules mutate the same global context;
    // serialize them to keep assertions stable.
    pub(crate) static ref TEST_GUARD: std::sync::Mutex<()> = std::sync::Mutex::new(());
}
