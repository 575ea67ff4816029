// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod cache;
pub mod config;
pub mod error;
pub mod scaffold;
pub mod server;
pub mod trace;
pub mod utils;

pub use cache::{AccessPolicy, Actor, CacheResponse, CacheStats, GetOptions, Permission, PreviewConfig, PreviewStrategy, RefCache};
pub use config::{CacheConfig, Config, ScaffoldConfig, ServerConfig, TraceConfig};
pub use error::{RefServeError, Result};
pub use scaffold::{GeneratedProject, ScaffoldOptions, TemplateVariant, VariantConfig};
pub use server::RefServeMcp;
pub use trace::{MockContext, TraceBackend, TracedCache, flush_traces};
pub use utils::{HealthCheck, HealthReport, HealthStatus, OperationTimer, Validator};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let _config = Config::default_config();
        let _policy = AccessPolicy::secret();
    }
}
