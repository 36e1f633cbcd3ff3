use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub observability: ObservabilityConfig,

    pub gallery: GalleryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text
    pub json_logs: bool,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/showreel.db".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    /// Origins allowed to call the API with credentials. `*` allows any
    /// origin but disables credentials.
    pub cors_allowed_origins: Vec<String>,

    /// Maximum accepted request body size in bytes (default: 16 KiB)
    pub body_limit_bytes: usize,

    /// Directory served for any path outside `/api`
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            cors_allowed_origins: vec!["http://localhost:5173".to_string()],
            body_limit_bytes: 16 * 1024,
            static_dir: "public".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

/// Timing and sizing knobs for the hover-preview gallery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Pointer must rest this long before an item starts loading
    pub hover_delay_ms: u64,

    /// Pointer must stay away this long before playback stops
    pub leave_delay_ms: u64,

    /// Reload attempts after a media error before the item is marked unavailable
    pub retry_attempts: u32,

    /// Base delay for the first reload; doubles on every further attempt
    pub retry_delay_ms: u64,

    /// A play request that has not settled by then counts as failed
    pub play_timeout_ms: u64,

    /// Loading without a ready or error signal for this long counts as a media error
    pub load_timeout_ms: u64,

    /// Maximum number of media elements kept alive
    pub cache_capacity: usize,

    /// Fraction of the item that must be visible before its thumbnail shows
    pub lazy_threshold: f32,

    /// Extra pixels around the viewport that already count as visible
    pub root_margin_px: f32,

    pub preload_batch_size: usize,

    pub preload_batch_delay_ms: u64,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            hover_delay_ms: 100,
            leave_delay_ms: 50,
            retry_attempts: 1,
            retry_delay_ms: 500,
            play_timeout_ms: 10_000,
            load_timeout_ms: 8_000,
            cache_capacity: 10,
            lazy_threshold: 0.1,
            root_margin_px: 50.0,
            preload_batch_size: 2,
            preload_batch_delay_ms: 200,
        }
    }
}

impl Config {
    /// Loads the first config file found, then applies environment overrides.
    pub fn load() -> Result<Self> {
        // A missing .env file is the normal case outside development
        dotenvy::dotenv().ok();

        let mut config = Self::load_file()?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Overrides file settings with `PORT`, `CORS_ORIGIN` and `DATABASE_URL`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(port) = lookup("PORT").and_then(|p| p.trim().parse().ok()) {
            self.server.port = port;
        }

        if let Some(origins) = lookup("CORS_ORIGIN") {
            let origins: Vec<String> = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
            if !origins.is_empty() {
                self.server.cors_allowed_origins = origins;
            }
        }

        if let Some(url) = lookup("DATABASE_URL").filter(|u| !u.trim().is_empty()) {
            self.general.database_path = url;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("showreel").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".showreel").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.database_path.trim().is_empty() {
            anyhow::bail!("Database path cannot be empty");
        }

        if self.server.port == 0 {
            anyhow::bail!("Server port must be > 0");
        }

        if !(0.0..=1.0).contains(&self.gallery.lazy_threshold) {
            anyhow::bail!(
                "gallery.lazy_threshold must be between 0 and 1, got {}",
                self.gallery.lazy_threshold
            );
        }

        if self.gallery.cache_capacity == 0 {
            anyhow::bail!("gallery.cache_capacity must be > 0");
        }

        if self.gallery.load_timeout_ms == 0 {
            anyhow::bail!("gallery.load_timeout_ms must be > 0");
        }

        Ok(())
    }
}
