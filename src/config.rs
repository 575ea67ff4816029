// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{RefServeError, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub trace: TraceConfig,
    pub scaffold: ScaffoldConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub name: String,
    pub transport: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    pub default_ttl_secs: u64,
    pub preview_max_size: usize,
    pub preview_strategy: String,
    pub public_namespace: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TraceConfig {
    /// Force attribution off even when backend credentials are present.
    pub disabled: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScaffoldConfig {
    pub default_variant: String,
    pub default_author: String,
    /// Abort generation when dependency fetch fails.
    pub critical_fetch: bool,
    /// Abort generation when git init fails.
    pub critical_git_init: bool,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(Path::new("config/default.toml")));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("REFSERVE")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| RefServeError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| RefServeError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            server: ServerConfig {
                name: "refserve".to_string(),
                transport: "stdio".to_string(),
                host: "127.0.0.1".to_string(),
                port: 8000,
            },
            cache: CacheConfig {
                default_ttl_secs: 3600,
                preview_max_size: 64,
                preview_strategy: "sample".to_string(),
                public_namespace: "public".to_string(),
            },
            trace: TraceConfig {
                disabled: false,
                tags: vec!["refserve".to_string(), "refcache".to_string()],
            },
            scaffold: ScaffoldConfig {
                default_variant: "standard".to_string(),
                default_author: "Your Name".to_string(),
                critical_fetch: true,
                critical_git_init: true,
            },
        }
    }

    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(RefServeError::Config(
                "server.port must be greater than 0".to_string(),
            ));
        }

        match self.server.transport.as_str() {
            "stdio" | "sse" => {}
            other => {
                return Err(RefServeError::Config(format!(
                    "server.transport must be 'stdio' or 'sse', got '{}'",
                    other
                )));
            }
        }

        if self.cache.default_ttl_secs == 0 {
            return Err(RefServeError::Config(
                "cache.default_ttl_secs must be greater than 0".to_string(),
            ));
        }

        if self.cache.preview_max_size == 0 {
            return Err(RefServeError::Config(
                "cache.preview_max_size must be greater than 0".to_string(),
            ));
        }

        match self.cache.preview_strategy.as_str() {
            "sample" | "truncate" | "paginate" => {}
            other => {
                return Err(RefServeError::Config(format!(
                    "cache.preview_strategy must be 'sample', 'truncate' or 'paginate', got '{}'",
                    other
                )));
            }
        }

        match self.scaffold.default_variant.as_str() {
            "minimal" | "standard" | "full" | "custom" => {}
            other => {
                return Err(RefServeError::Config(format!(
                    "scaffold.default_variant must be a known variant, got '{}'",
                    other
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default_config();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut config = Config::default_config();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_transport() {
        let mut config = Config::default_config();
        config.server.transport = "websocket".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_strategy() {
        let mut config = Config::default_config();
        config.cache.preview_strategy = "summarize".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(
            file,
            r#"
[server]
name = "test-server"
transport = "sse"
host = "0.0.0.0"
port = 9000

[cache]
default_ttl_secs = 60
preview_max_size = 32
preview_strategy = "truncate"
public_namespace = "shared"

[trace]
disabled = true
tags = ["test"]

[scaffold]
default_variant = "minimal"
default_author = "Tester"
critical_fetch = false
critical_git_init = false
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.server.name, "test-server");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.cache.preview_strategy, "truncate");
        assert!(config.trace.disabled);
        assert!(!config.scaffold.critical_fetch);
    }
}
