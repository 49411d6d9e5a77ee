use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::identity::UserId;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ScopedMemoryConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub transport: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub default_user_id: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
    pub dedup_threshold: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    /// Empty means the provider's default, see [`EmbeddingConfig::model_name`].
    pub model: String,
    pub cache_dir: String,
    pub base_url: String,
    pub api_key: String,
}

/// How the server talks to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Session-oriented streamable HTTP with a server event stream.
    Sse,
    /// Stateless request/response streamable HTTP.
    StreamableHttp,
    /// Local pipe. No headers, so only explicit ids or the process default apply.
    Stdio,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sse => "sse",
            Self::StreamableHttp => "streamable-http",
            Self::Stdio => "stdio",
        }
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sse" => Ok(Self::Sse),
            "streamable-http" => Ok(Self::StreamableHttp),
            "stdio" => Ok(Self::Stdio),
            other => Err(format!(
                "unknown transport: {other}. Supported: sse, streamable-http, stdio"
            )),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "sse".into(),
            host: "0.0.0.0".into(),
            port: 8050,
            log_level: "info".into(),
            default_user_id: "default".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_data_dir()
            .join("memory.db")
            .to_string_lossy()
            .into_owned();
        Self {
            db_path,
            dedup_threshold: 0.95,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        let cache_dir = default_data_dir()
            .join("models")
            .to_string_lossy()
            .into_owned();
        Self {
            provider: "local".into(),
            model: String::new(),
            cache_dir,
            base_url: "https://api.openai.com/v1".into(),
            api_key: String::new(),
        }
    }
}

/// Model used by the `local` provider.
pub const LOCAL_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";

/// Model used by the `openai` provider when none is configured.
pub const OPENAI_EMBEDDING_MODEL: &str = "text-embedding-3-small";

impl EmbeddingConfig {
    /// The configured model, or the provider's default when none is set.
    pub fn model_name(&self) -> &str {
        match self.model.trim() {
            "" if self.provider == "openai" => OPENAI_EMBEDDING_MODEL,
            "" => LOCAL_EMBEDDING_MODEL,
            model => model,
        }
    }
}

/// Returns `~/.scoped-memory/`, or `./.scoped-memory/` when there is no home directory.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".scoped-memory")
}

/// Returns the default config file path: `~/.scoped-memory/config.toml`
pub fn default_config_path() -> PathBuf {
    default_data_dir().join("config.toml")
}

impl ScopedMemoryConfig {
    /// Load config from the default TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            ScopedMemoryConfig::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides. Names follow the mem0 MCP server deployments
    /// (`TRANSPORT`, `HOST`, `PORT`, `DEFAULT_USER_ID`, `LLM_*`, ...).
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("TRANSPORT") {
            self.server.transport = val;
        }
        if let Ok(val) = std::env::var("HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("PORT") {
            self.server.port = val
                .trim()
                .parse()
                .with_context(|| format!("invalid PORT value: {val}"))?;
        }
        if let Ok(val) = std::env::var("LOG_LEVEL") {
            self.server.log_level = val.to_lowercase();
        }
        if let Ok(val) = std::env::var("DEFAULT_USER_ID") {
            self.server.default_user_id = val;
        }
        if let Ok(val) = std::env::var("MEMORY_DB_PATH") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("LLM_PROVIDER") {
            self.embedding.provider = val;
        }
        if let Ok(val) = std::env::var("EMBEDDING_MODEL_CHOICE") {
            self.embedding.model = val;
        }
        if let Ok(val) = std::env::var("LLM_BASE_URL") {
            self.embedding.base_url = val;
        }
        if let Ok(val) = std::env::var("LLM_API_KEY") {
            self.embedding.api_key = val;
        }
        Ok(())
    }

    /// Reject settings the server cannot start with.
    pub fn validate(&self) -> Result<()> {
        self.transport()?;
        self.default_user_id()?;
        if !(self.storage.dedup_threshold > 0.0 && self.storage.dedup_threshold <= 1.0) {
            bail!(
                "storage.dedup_threshold must be in (0, 1], got {}",
                self.storage.dedup_threshold
            );
        }
        match self.embedding.provider.as_str() {
            "local" | "openai" => {}
            other => bail!("unknown embedding provider: {other}. Supported: local, openai"),
        }
        let embedding = &self.embedding;
        if embedding.provider == "openai" && embedding.model_name() == LOCAL_EMBEDDING_MODEL {
            bail!(
                "embedding.model {LOCAL_EMBEDDING_MODEL} only runs with the local provider; \
                 set EMBEDDING_MODEL_CHOICE to a remote model"
            );
        }
        Ok(())
    }

    pub fn transport(&self) -> Result<Transport> {
        self.server
            .transport
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
    }

    /// The process-wide fallback identity. Must be non-blank.
    pub fn default_user_id(&self) -> Result<UserId> {
        UserId::parse(&self.server.default_user_id)
            .context("server.default_user_id must not be empty")
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
