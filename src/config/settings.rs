//! Application configuration settings
//!
//! Defines all configuration structures and loading logic

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server configuration
    pub server: ServerConfig,
    /// Upstream completion API configuration
    pub upstream: UpstreamConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen host
    pub host: String,
    /// Listen port
    pub port: u16,
}

/// Upstream completion API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Bearer API key
    pub api_key: String,
    /// API base URL
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Request timeout in seconds
    pub timeout: u64,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens per reply
    pub max_tokens: u32,
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Allowed origins for CORS
    pub allowed_origins: Vec<String>,
    /// Deployment environment (development/production)
    pub environment: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

impl Settings {
    /// Create a new configuration instance from the environment
    pub fn new() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let settings = Self {
            server: ServerConfig {
                host: get_env_or_default("SERVER_HOST", "0.0.0.0"),
                port: get_env_or_default("SERVER_PORT", "8080")
                    .parse()
                    .context("Invalid port number")?,
            },
            upstream: UpstreamConfig {
                api_key: std::env::var("UPSTREAM_API_KEY")
                    .context("UPSTREAM_API_KEY environment variable not set")?,
                base_url: get_env_or_default(
                    "UPSTREAM_BASE_URL",
                    "https://api.groq.com/openai/v1",
                ),
                model: get_env_or_default("UPSTREAM_MODEL", "llama-3.3-70b-versatile"),
                timeout: get_env_or_default("UPSTREAM_TIMEOUT", "30")
                    .parse()
                    .context("Invalid timeout value")?,
                temperature: get_env_or_default("UPSTREAM_TEMPERATURE", "0.7")
                    .parse()
                    .context("Invalid temperature value")?,
                max_tokens: get_env_or_default("UPSTREAM_MAX_TOKENS", "500")
                    .parse()
                    .context("Invalid max tokens value")?,
            },
            security: SecurityConfig {
                allowed_origins: get_env_or_default("ALLOWED_ORIGINS", "http://localhost:3000")
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                environment: get_env_or_default("APP_ENV", "production"),
            },
            logging: LoggingConfig {
                level: get_env_or_default("RUST_LOG", "info"),
                format: get_env_or_default("LOG_FORMAT", "text"),
            },
        };

        // Validate configuration
        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration validity
    fn validate(&self) -> Result<()> {
        // Validate port range
        if self.server.port == 0 {
            anyhow::bail!("Port number cannot be 0");
        }

        // Validate API key - accept various formats across providers
        if self.upstream.api_key.is_empty() {
            anyhow::bail!("Upstream API key cannot be empty");
        }

        if self.upstream.api_key.contains(char::is_whitespace) {
            anyhow::bail!("Upstream API key cannot contain whitespace characters");
        }

        if self.upstream.api_key.len() < 8 {
            anyhow::bail!("Upstream API key must be at least 8 characters long");
        }

        // Validate URL format
        if !self.upstream.base_url.starts_with("http") {
            anyhow::bail!("Invalid upstream base URL format, should start with 'http'");
        }

        // Validate timeout
        if self.upstream.timeout == 0 {
            anyhow::bail!("Timeout value cannot be 0");
        }

        // Validate generation parameters
        if !(0.0..=2.0).contains(&self.upstream.temperature) {
            anyhow::bail!("Temperature must be between 0.0 and 2.0");
        }

        if self.upstream.max_tokens == 0 {
            anyhow::bail!("Max tokens cannot be 0");
        }

        // Validate environment flag
        let valid_environments = ["development", "production"];
        if !valid_environments.contains(&self.security.environment.as_str()) {
            anyhow::bail!("Invalid environment: {}", self.security.environment);
        }

        // A production deployment needs an explicit origin allow-list
        if !self.is_dev_mode() && self.security.allowed_origins.is_empty() {
            anyhow::bail!("Allowed origins cannot be empty in production");
        }

        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!("Invalid log level: {}", self.logging.level);
        }

        // Validate log format
        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.logging.format);
        }

        Ok(())
    }

    /// Check if in development mode
    ///
    /// In development every CORS origin is allowed.
    pub fn is_dev_mode(&self) -> bool {
        self.security.environment == "development"
    }
}

/// Get environment variable or default value
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
