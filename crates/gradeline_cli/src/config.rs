//! Configuration file support for gradeline.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Legacy environment variables (`CANVAS_BASE_URL`, `CANVAS_ACCESS_TOKEN`,
//!    `CANVAS_PAGE_SIZE`)
//! 3. Environment variables prefixed with `GRADELINE_`, with `__` between
//!    section and key (e.g. `GRADELINE_CANVAS__ACCESS_TOKEN`)
//! 4. Config file (./gradeline.toml, then ~/.config/gradeline/config.toml)
//! 5. Built-in defaults
//!
//! Example config file:
//! ```toml
//! [canvas]
//! base_url = "https://lms.example.edu/api/v1"
//! access_token = "..."  # or use GRADELINE_CANVAS__ACCESS_TOKEN
//! page_size = 100
//! timeout_secs = 30
//!
//! [rate_limit]
//! requests = 10
//! per_seconds = 1
//! burst = 10
//!
//! [report]
//! time_zone = "Australia/Perth"
//! concurrency = 1
//! date_overrides = "course-section"  # or "any-set-id"
//! page_retries = 0
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::builder::DefaultState;
use config::{Config as ConfigBuilder, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use gradeline::{
    ClientConfig, DateOverrideMatch, RateLimitPolicy, ReportOptions, RetryConfig,
    parse_time_zone,
};
use serde::Deserialize;

/// Legacy variable names and the keys they set.
const LEGACY_ENV: [(&str, &str); 3] = [
    ("CANVAS_BASE_URL", "canvas.base_url"),
    ("CANVAS_ACCESS_TOKEN", "canvas.access_token"),
    ("CANVAS_PAGE_SIZE", "canvas.page_size"),
];

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LMS connection.
    pub canvas: CanvasConfig,
    /// Client-side request budget.
    pub rate_limit: RateLimitConfig,
    /// Report defaults.
    pub report: ReportConfig,
}

/// LMS connection settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// API root including `/api/v1`.
    pub base_url: Option<String>,
    /// Personal access token.
    pub access_token: Option<String>,
    pub page_size: u32,
    pub timeout_secs: u64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            access_token: None,
            page_size: gradeline::config::DEFAULT_PAGE_SIZE,
            timeout_secs: gradeline::config::DEFAULT_REQUEST_TIMEOUT.as_secs(),
        }
    }
}

/// Token bucket settings: `requests` per `per_seconds`, bursting to `burst`.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub requests: u32,
    pub per_seconds: u64,
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        let policy = RateLimitPolicy::default();
        Self {
            requests: policy.requests,
            per_seconds: policy.per.as_secs(),
            burst: policy.burst,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// IANA zone report timestamps are rendered in.
    pub time_zone: String,
    /// Courses processed at once.
    pub concurrency: usize,
    pub date_overrides: DateOverrideMatch,
    /// Retries per failed page or lookup; 0 disables retrying.
    pub page_retries: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            time_zone: gradeline::dates::DEFAULT_TIME_ZONE.name().to_string(),
            concurrency: 1,
            date_overrides: DateOverrideMatch::default(),
            page_retries: 0,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/gradeline/config.toml)
    /// 3. Local config file (./gradeline.toml)
    /// 4. Environment variables with GRADELINE_ prefix
    /// 5. Legacy CANVAS_* environment variables
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("gradeline.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./gradeline.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // GRADELINE_CANVAS__BASE_URL -> canvas.base_url
        builder = builder.add_source(
            Environment::with_prefix("GRADELINE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let loaded = with_legacy_env(builder, |name| std::env::var(name).ok())
            .and_then(|builder| builder.build())
            .and_then(|settings| settings.try_deserialize::<Config>());

        match loaded {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config: {}", e);
                Config::default()
            }
        }
    }

    /// Apply command-line connection flags on top of the loaded values.
    pub fn apply_connection_overrides(
        &mut self,
        base_url: Option<String>,
        access_token: Option<String>,
        page_size: Option<u32>,
    ) {
        if base_url.is_some() {
            self.canvas.base_url = base_url;
        }
        if access_token.is_some() {
            self.canvas.access_token = access_token;
        }
        if let Some(page_size) = page_size {
            self.canvas.page_size = page_size;
        }
    }

    /// Connection settings for the library client.
    ///
    /// Fails when the base URL or the token is not configured anywhere.
    pub fn client_config(&self) -> Result<ClientConfig, String> {
        let base_url = self
            .canvas
            .base_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                "No LMS base URL configured. Set GRADELINE_CANVAS__BASE_URL, \
                 [canvas] base_url, or pass --base-url."
                    .to_string()
            })?;
        let access_token = self
            .canvas
            .access_token
            .clone()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                "No access token configured. Set GRADELINE_CANVAS__ACCESS_TOKEN, \
                 [canvas] access_token, or pass --access-token."
                    .to_string()
            })?;

        Ok(ClientConfig::new(base_url, access_token)
            .with_page_size(self.canvas.page_size)
            .with_rate_limit(self.rate_limit_policy())
            .with_request_timeout(Duration::from_secs(self.canvas.timeout_secs)))
    }

    pub fn rate_limit_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy {
            requests: self.rate_limit.requests,
            per: Duration::from_secs(self.rate_limit.per_seconds),
            burst: self.rate_limit.burst,
        }
    }

    /// Report options with command-line overrides applied.
    pub fn report_options(
        &self,
        concurrency: Option<usize>,
        time_zone: Option<&str>,
    ) -> gradeline::error::Result<ReportOptions> {
        let time_zone = parse_time_zone(time_zone.unwrap_or(&self.report.time_zone))?;
        Ok(ReportOptions {
            concurrency: concurrency.unwrap_or(self.report.concurrency).max(1),
            date_overrides: self.report.date_overrides,
            time_zone,
        })
    }

    /// Retry policy for pages and single lookups, `None` when disabled.
    pub fn retry_config(&self, retries: Option<usize>) -> Option<RetryConfig> {
        match retries.unwrap_or(self.report.page_retries) {
            0 => None,
            max_retries => Some(RetryConfig {
                max_retries,
                ..RetryConfig::default()
            }),
        }
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "gradeline").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

/// Layer the legacy `CANVAS_*` variables over `builder`.
fn with_legacy_env(
    mut builder: config::ConfigBuilder<DefaultState>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<config::ConfigBuilder<DefaultState>, ConfigError> {
    for (name, key) in LEGACY_ENV {
        let Some(value) = lookup(name).filter(|v| !v.is_empty()) else {
            continue;
        };
        tracing::debug!(variable = name, "Using legacy environment variable");
        builder = if key == "canvas.page_size" {
            let page_size: i64 = value.trim().parse().map_err(|_| {
                ConfigError::Message(format!("{name} must be a positive integer, got {value:?}"))
            })?;
            builder.set_override(key, page_size)?
        } else {
            builder.set_override(key, value)?
        };
    }
    Ok(builder)
}
