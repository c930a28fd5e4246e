//! Configuration resolution for wardrobe-tryon
//!
//! **Priority:** command line → environment → TOML file → compiled defaults
//!
//! Missing credentials never stop startup. The affected collaborator reports
//! "not configured" when first used and `/health` reports `degraded`.

use chrono::Duration as ChronoDuration;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use wardrobe_common::config::{env_non_empty, load_toml_config, ConfigFileLocator, LoggingConfig};
use wardrobe_common::{Error, Result};

use crate::services::FacadeSettings;

/// Module name; also the TOML file stem
pub const MODULE_NAME: &str = "wardrobe-tryon";

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5830";
pub const DEFAULT_DASHSCOPE_BASE_URL: &str = "https://dashscope.aliyuncs.com/api/v1";
pub const DEFAULT_TRYON_MODEL: &str = "aitryon";

/// Longest accepted model cache lifetime
pub const MAX_SESSION_TTL_DAYS: i64 = 3650;

/// Full service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP listen address
    pub bind_address: String,
    /// Directory holding user uploads (served under `/uploads/`)
    pub upload_folder: PathBuf,
    pub logging: LoggingConfig,
    pub dashscope: DashScopeSettings,
    pub oss: OssSettings,
    pub timeouts: TimeoutSettings,
    pub session: SessionSettings,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            upload_folder: PathBuf::from("uploads"),
            logging: LoggingConfig::default(),
            dashscope: DashScopeSettings::default(),
            oss: OssSettings::default(),
            timeouts: TimeoutSettings::default(),
            session: SessionSettings::default(),
        }
    }
}

/// Imaging provider settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashScopeSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl Default for DashScopeSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_DASHSCOPE_BASE_URL.to_string(),
            model: DEFAULT_TRYON_MODEL.to_string(),
        }
    }
}

/// Object storage settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OssSettings {
    pub access_key_id: Option<String>,
    pub access_key_secret: Option<String>,
    pub bucket: Option<String>,
    /// Region endpoint host, e.g. `oss-cn-beijing.aliyuncs.com`
    pub endpoint: Option<String>,
    /// Custom domain bound to the bucket, e.g. `https://img.example.com`;
    /// replaces `https://<bucket>.<endpoint>` for uploads and published URLs
    pub public_base_url: Option<String>,
    pub key_prefix: String,
}

impl Default for OssSettings {
    fn default() -> Self {
        Self {
            access_key_id: None,
            access_key_secret: None,
            bucket: None,
            endpoint: None,
            public_base_url: None,
            key_prefix: "tryon/".to_string(),
        }
    }
}

/// Upper bounds on outbound calls, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    pub submit_secs: u64,
    pub poll_secs: u64,
    pub publish_secs: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            submit_secs: 60,
            poll_secs: 10,
            publish_secs: 60,
        }
    }
}

impl TimeoutSettings {
    pub fn submit(&self) -> Duration {
        wardrobe_common::time::secs_to_duration(self.submit_secs)
    }

    pub fn poll(&self) -> Duration {
        wardrobe_common::time::secs_to_duration(self.poll_secs)
    }

    pub fn publish(&self) -> Duration {
        wardrobe_common::time::secs_to_duration(self.publish_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Model cache lifetime, reset on every remember
    pub ttl_days: i64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self { ttl_days: 7 }
    }
}

/// Values supplied on the command line (or their clap-bound env vars)
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub bind_address: Option<String>,
    pub upload_folder: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl ServiceConfig {
    /// First existing TOML file among the standard locations
    pub fn config_file() -> Option<PathBuf> {
        ConfigFileLocator::new(MODULE_NAME).locate()
    }

    /// Resolve using an explicit TOML path (or none)
    ///
    /// Runs before the tracing subscriber exists; call
    /// [`log_credential_status`](Self::log_credential_status) once it does.
    pub fn resolve_from(toml_path: Option<&Path>, cli: &CliOverrides) -> Result<Self> {
        let mut config: ServiceConfig = load_toml_config(toml_path)?;
        config.apply_env();
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Environment overrides for provider and storage credentials
    pub fn apply_env(&mut self) {
        let overrides: [(&str, &mut Option<String>); 6] = [
            ("DASHSCOPE_API_KEY", &mut self.dashscope.api_key),
            ("ALIYUN_OSS_ACCESS_KEY_ID", &mut self.oss.access_key_id),
            ("ALIYUN_OSS_ACCESS_KEY_SECRET", &mut self.oss.access_key_secret),
            ("ALIYUN_OSS_BUCKET_NAME", &mut self.oss.bucket),
            ("ALIYUN_OSS_ENDPOINT", &mut self.oss.endpoint),
            ("ALIYUN_OSS_PUBLIC_BASE_URL", &mut self.oss.public_base_url),
        ];
        for (name, slot) in overrides {
            if let Some(value) = env_non_empty(name) {
                if slot.is_some() {
                    info!("{} overrides value from TOML config", name);
                }
                *slot = Some(value);
            }
        }

        if let Some(url) = env_non_empty("DASHSCOPE_BASE_URL") {
            self.dashscope.base_url = url;
        }
    }

    pub fn apply_cli(&mut self, cli: &CliOverrides) {
        if let Some(bind) = &cli.bind_address {
            self.bind_address = bind.clone();
        }
        if let Some(folder) = &cli.upload_folder {
            self.upload_folder = folder.clone();
        }
        if let Some(level) = &cli.log_level {
            self.logging.level = level.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.bind_address.trim().is_empty() {
            return Err(Error::Config("bind_address cannot be empty".to_string()));
        }
        let t = &self.timeouts;
        if t.submit_secs == 0 || t.poll_secs == 0 || t.publish_secs == 0 {
            return Err(Error::Config("timeouts must be at least 1 second".to_string()));
        }
        if self.session.ttl_days <= 0 {
            return Err(Error::Config("session.ttl_days must be positive".to_string()));
        }
        if self.session.ttl_days > MAX_SESSION_TTL_DAYS {
            return Err(Error::Config(format!(
                "session.ttl_days must be at most {}",
                MAX_SESSION_TTL_DAYS
            )));
        }
        Ok(())
    }

    pub fn session_ttl(&self) -> ChronoDuration {
        ChronoDuration::days(self.session.ttl_days)
    }

    pub fn facade_settings(&self) -> FacadeSettings {
        FacadeSettings {
            key_prefix: self.oss.key_prefix.clone(),
            model: self.dashscope.model.clone(),
            session_ttl: self.session_ttl(),
            upload_root: Some(self.upload_folder.clone()),
        }
    }

    /// `EnvFilter` directives used when `RUST_LOG` is unset
    pub fn default_log_filter(&self) -> String {
        format!(
            "wardrobe_tryon={level},wardrobe_common={level},tower_http=info",
            level = self.logging.level
        )
    }

    /// Warn about missing credentials
    pub fn log_credential_status(&self) {
        if self.dashscope.api_key.is_none() {
            warn!("DashScope API key not configured; try-on submission will fail. Set DASHSCOPE_API_KEY or [dashscope] api_key");
        }
        let oss = &self.oss;
        if oss.access_key_id.is_none()
            || oss.access_key_secret.is_none()
            || oss.bucket.is_none()
            || oss.endpoint.is_none()
        {
            warn!("OSS credentials incomplete; local images cannot be published. Set ALIYUN_OSS_* or [oss] section");
        }
    }
}
