// file: src/trace/mod.rs
// description: trace attribution: mock context, backend detection, cache wrapper
// reference: internal module structure

pub mod attributes;
pub mod context;
pub mod traced;

pub use attributes::{TraceAttributes, TraceBackend, attributes_for};
pub use context::{ContextState, ContextUpdate, MockContext, enable_test_mode, is_test_mode_enabled};
pub use traced::{TracedCache, flush_traces, tool_span};
