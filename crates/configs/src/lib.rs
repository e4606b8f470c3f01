use std::path::PathBuf;

use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub unlock: UnlockConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// Directory served as static files.
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
    /// When set, `/healthz` and `/metrics` are served on this address.
    #[serde(default)]
    pub metrics_addr: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            worker_threads: None,
            public_dir: default_public_dir(),
            metrics_addr: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: default_data_dir(), file_name: default_file_name() }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UnlockConfig {
    /// Shared secret for the admin endpoints. Unset forbids them all.
    #[serde(default)]
    pub manual_unlock_secret: Option<String>,
    /// Hosted checkout page handed out by `/api/checkout`.
    #[serde(default)]
    pub lemon_checkout_url: Option<String>,
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 10000 }
fn default_public_dir() -> String { "public".into() }
fn default_data_dir() -> String { "data".into() }
fn default_file_name() -> String { "unlocks.json".into() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`) when present, otherwise start from
    /// defaults; then apply environment overrides and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) => match e.downcast_ref::<std::io::Error>() {
                Some(io) if io.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
                _ => return Err(e),
            },
        };
        cfg.apply_env(|key| std::env::var(key).ok());
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Overlay environment variables; `lookup` is injectable for tests.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| keys.iter().find_map(|k| lookup(*k).filter(|v| !v.trim().is_empty()));

        if let Some(host) = first(&["HOST", "SERVER_HOST"]) {
            self.server.host = host;
        }
        if let Some(port) = first(&["PORT", "SERVER_PORT"]).and_then(|p| p.trim().parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(w) = first(&["TOKIO_WORKER_THREADS"]).and_then(|v| v.trim().parse::<usize>().ok()) {
            self.server.worker_threads = Some(w);
        }
        if let Some(dir) = first(&["PUBLIC_DIR"]) {
            self.server.public_dir = dir;
        }
        if let Some(addr) = first(&["METRICS_ADDR"]) {
            self.server.metrics_addr = Some(addr);
        }
        if let Some(dir) = first(&["DATA_DIR"]) {
            self.storage.data_dir = dir;
        }
        if let Some(secret) = first(&["MANUAL_UNLOCK_SECRET"]) {
            self.unlock.manual_unlock_secret = Some(secret);
        }
        if let Some(url) = first(&["LEMON_CHECKOUT_URL"]) {
            self.unlock.lemon_checkout_url = Some(url);
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        self.unlock.normalize();
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if self.worker_threads == Some(0) {
            self.worker_threads = None;
        }
        if let Some(addr) = &self.metrics_addr {
            addr.parse::<std::net::SocketAddr>()
                .map_err(|e| anyhow!("server.metrics_addr {addr:?} is not a socket address: {e}"))?;
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<std::net::SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        if self.data_dir.trim().is_empty() {
            return Err(anyhow!("storage.data_dir must not be empty"));
        }
        let name = self.file_name.trim();
        if name.is_empty() || name.contains('/') || name.contains('\\') {
            return Err(anyhow!("storage.file_name must be a plain file name"));
        }
        Ok(())
    }

    /// Full path of the unlock document.
    pub fn document_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(self.file_name.trim())
    }
}

impl UnlockConfig {
    fn normalize(&mut self) {
        // blank values behave like unset ones
        if self.manual_unlock_secret.as_deref().is_some_and(|s| s.is_empty()) {
            self.manual_unlock_secret = None;
        }
        if self.lemon_checkout_url.as_deref().is_some_and(|s| s.trim().is_empty()) {
            self.lemon_checkout_url = None;
        }
    }
}
