//! Configuration module
//!
//! Configuration is read from the environment (a `.env` file is honored), with defaults for
//! every option, and checked once at startup by [`Config::validate`].

use std::env;

use crate::models::FileCategory;

// Common constants
const SERVER_PORT: u16 = 5000;
const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const UPLOAD_BODY_LIMIT_BYTES: usize = 64 * 1024 * 1024;
const CLAMAV_HOST: &str = "clamav";
const CLAMAV_PORT: u16 = 3310;
const CLAMAV_TIMEOUT_SECS: u64 = 30;
const IMAGE_MIN_DIMENSION: u32 = 10;
const IMAGE_MAX_DIMENSION: u32 = 10_000;

/// Extensions and expected media type prefixes for one file category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryPolicy {
    pub category: FileCategory,
    pub extensions: Vec<String>,
    pub mime_prefixes: Vec<String>,
}

impl CategoryPolicy {
    pub fn defaults_for(category: FileCategory) -> Self {
        Self {
            category,
            extensions: category
                .default_extensions()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            mime_prefixes: category
                .default_mime_prefixes()
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// HTTP service configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub server_port: u16,
    pub environment: String,
    pub upload_body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            upload_body_limit_bytes: UPLOAD_BODY_LIMIT_BYTES,
        }
    }
}

/// Scanning pipeline configuration
#[derive(Clone, Debug)]
pub struct ScanConfig {
    pub max_file_size_bytes: u64,
    pub clamav_host: String,
    pub clamav_port: u16,
    /// Combined connect + read budget for one daemon exchange
    pub clamav_timeout_secs: u64,
    /// Checked in order; the first category whose extensions and prefixes match wins.
    pub categories: Vec<CategoryPolicy>,
    pub image_min_dimension: u32,
    pub image_max_dimension: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: MAX_FILE_SIZE_BYTES,
            clamav_host: CLAMAV_HOST.to_string(),
            clamav_port: CLAMAV_PORT,
            clamav_timeout_secs: CLAMAV_TIMEOUT_SECS,
            categories: FileCategory::ALL
                .iter()
                .map(|c| CategoryPolicy::defaults_for(*c))
                .collect(),
            image_min_dimension: IMAGE_MIN_DIMENSION,
            image_max_dimension: IMAGE_MAX_DIMENSION,
        }
    }
}

impl ScanConfig {
    pub fn category_policy(&self, category: FileCategory) -> Option<&CategoryPolicy> {
        self.categories.iter().find(|p| p.category == category)
    }

    pub fn clamav_address(&self) -> String {
        format!("{}:{}", self.clamav_host, self.clamav_port)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_BYTES must be greater than 0"));
        }
        if self.clamav_host.trim().is_empty() {
            return Err(anyhow::anyhow!("CLAMAV_HOST must not be empty"));
        }
        if self.clamav_port == 0 {
            return Err(anyhow::anyhow!("CLAMAV_PORT must be greater than 0"));
        }
        if self.clamav_timeout_secs == 0 {
            return Err(anyhow::anyhow!("CLAMAV_TIMEOUT_SECS must be greater than 0"));
        }
        if self.image_min_dimension > self.image_max_dimension {
            return Err(anyhow::anyhow!(
                "IMAGE_MIN_DIMENSION ({}) must not exceed IMAGE_MAX_DIMENSION ({})",
                self.image_min_dimension,
                self.image_max_dimension
            ));
        }

        for policy in &self.categories {
            if policy.extensions.is_empty() {
                return Err(anyhow::anyhow!(
                    "No extensions configured for category '{}'",
                    policy.category
                ));
            }
            if policy.mime_prefixes.iter().all(|p| p.is_empty()) {
                return Err(anyhow::anyhow!(
                    "No media type prefixes configured for category '{}'",
                    policy.category
                ));
            }
        }

        Ok(())
    }

    fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ScanConfig::default();

        let categories = FileCategory::ALL
            .iter()
            .map(|category| {
                let prefix = category.as_str().to_uppercase();
                let fallback = CategoryPolicy::defaults_for(*category);
                CategoryPolicy {
                    category: *category,
                    extensions: lookup(&format!("{}_EXTENSIONS", prefix))
                        .map(|s| parse_list(&s))
                        .map(|list| {
                            list.into_iter()
                                .map(|e| e.trim_start_matches('.').to_string())
                                .collect()
                        })
                        .unwrap_or(fallback.extensions),
                    mime_prefixes: lookup(&format!("{}_MIME_PREFIXES", prefix))
                        .map(|s| parse_list(&s))
                        .unwrap_or(fallback.mime_prefixes),
                }
            })
            .collect();

        Self {
            max_file_size_bytes: lookup("MAX_FILE_SIZE_BYTES")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.max_file_size_bytes),
            clamav_host: lookup("CLAMAV_HOST")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.clamav_host),
            clamav_port: lookup("CLAMAV_PORT")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.clamav_port),
            clamav_timeout_secs: lookup("CLAMAV_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.clamav_timeout_secs),
            categories,
            image_min_dimension: lookup("IMAGE_MIN_DIMENSION")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.image_min_dimension),
            image_max_dimension: lookup("IMAGE_MAX_DIMENSION")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.image_max_dimension),
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub scan: ScanConfig,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.server.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let server = ServerConfig {
            server_port: match lookup("PORT") {
                Some(port) => port
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
                None => SERVER_PORT,
            },
            environment,
            upload_body_limit_bytes: lookup("UPLOAD_BODY_LIMIT_BYTES")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(UPLOAD_BODY_LIMIT_BYTES),
        };

        let config = Config {
            server,
            scan: ScanConfig::from_lookup(&lookup),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.server.upload_body_limit_bytes == 0 {
            return Err(anyhow::anyhow!("UPLOAD_BODY_LIMIT_BYTES must be greater than 0"));
        }
        self.scan.validate()
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
