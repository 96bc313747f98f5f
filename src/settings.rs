use chrono::NaiveDate;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, path::PathBuf, str::FromStr, time::Duration};

use crate::use_cases::discovery::{CaptureWindow, DiscoverySettings};

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    #[serde(alias = "test")]
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" | "test" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Postgres connection string. When absent the API serves the bundled
    /// content from memory.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Allowed CORS origin(s), comma separated.
    #[serde(default = "default_client_url")]
    pub client_url: String,

    #[serde(default = "default_admin_email")]
    pub admin_email: String,

    /// Signs the contact auto-reply.
    #[serde(default = "default_owner_name")]
    pub owner_name: String,

    #[serde(default)]
    pub email_host: Option<String>,

    #[serde(default = "default_email_port")]
    pub email_port: u16,

    #[serde(default)]
    pub email_secure: bool,

    #[serde(default)]
    pub email_user: Option<String>,

    #[serde(default)]
    pub email_pass: Option<String>,

    #[serde(default = "default_email_from")]
    pub email_from: String,

    /// Sandbox root for the image listing endpoints.
    #[serde(default = "default_images_root")]
    pub images_root: PathBuf,

    /// Static asset host probed by legacy gallery discovery. Discovery is
    /// disabled while this is unset.
    #[serde(default)]
    pub asset_base_url: Option<String>,

    #[serde(default = "default_probe_timeout_ms")]
    pub discovery_probe_timeout_ms: u64,

    #[serde(default = "default_batch_size")]
    pub discovery_batch_size: usize,

    #[serde(default = "default_batch_delay_ms")]
    pub discovery_batch_delay_ms: u64,

    /// Day, hour and minutes covered by timestamped capture names
    /// (`WhatsApp Image <date> at <hh.mm.ss>`).
    #[serde(default = "default_capture_date")]
    pub discovery_capture_date: String,

    #[serde(default = "default_capture_hour")]
    pub discovery_capture_hour: u32,

    /// Comma separated minutes, e.g. `9,10,38`.
    #[serde(default = "default_capture_minutes")]
    pub discovery_capture_minutes: String,

    #[serde(default = "default_contact_rate_limit")]
    pub contact_rate_limit: u64,

    #[serde(default = "default_contact_rate_window_secs")]
    pub contact_rate_window_secs: u64,

    #[serde(default)]
    pub trust_x_forwarded_for: bool,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Portfolio-API".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_client_url() -> String {
    "http://localhost:5173".to_string()
}
fn default_admin_email() -> String {
    "owner@example.com".to_string()
}
fn default_owner_name() -> String {
    "Portfolio Owner".to_string()
}
fn default_email_port() -> u16 {
    587
}
fn default_email_from() -> String {
    "\"Portfolio\" <noreply@example.com>".to_string()
}
fn default_images_root() -> PathBuf {
    PathBuf::from("public/images")
}
fn default_probe_timeout_ms() -> u64 {
    80
}
fn default_batch_size() -> usize {
    200
}
fn default_batch_delay_ms() -> u64 {
    1
}
fn default_capture_date() -> String {
    "2026-01-06".to_string()
}
fn default_capture_hour() -> u32 {
    20
}
fn default_capture_minutes() -> String {
    "9,10,11,12,13,14,38,39".to_string()
}
fn default_contact_rate_limit() -> u64 {
    0
}
fn default_contact_rate_window_secs() -> u64 {
    3600
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            env: default_env(),
            name: default_name(),
            port: default_port(),
            host: default_host(),
            worker_count: default_worker_count(),
            database_url: None,
            client_url: default_client_url(),
            admin_email: default_admin_email(),
            owner_name: default_owner_name(),
            email_host: None,
            email_port: default_email_port(),
            email_secure: false,
            email_user: None,
            email_pass: None,
            email_from: default_email_from(),
            images_root: default_images_root(),
            asset_base_url: None,
            discovery_probe_timeout_ms: default_probe_timeout_ms(),
            discovery_batch_size: default_batch_size(),
            discovery_batch_delay_ms: default_batch_delay_ms(),
            discovery_capture_date: default_capture_date(),
            discovery_capture_hour: default_capture_hour(),
            discovery_capture_minutes: default_capture_minutes(),
            contact_rate_limit: default_contact_rate_limit(),
            contact_rate_window_secs: default_contact_rate_window_secs(),
            trust_x_forwarded_for: false,
        }
    }
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .try_parsing(true)
                    .ignore_empty(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if let Some(url) = &self.database_url {
            if url.trim().is_empty() {
                errors.push("DATABASE_URL cannot be blank when set".to_string());
            }
        }
        if self.cors_origins().is_empty() {
            errors.push("CLIENT_URL must name at least one origin".to_string());
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production".to_string());
        }
        if !self.admin_email.contains('@') {
            errors.push("ADMIN_EMAIL must be an email address".to_string());
        }
        if self.discovery_batch_size == 0 {
            errors.push("DISCOVERY_BATCH_SIZE must be positive".to_string());
        }
        if let Err(e) = self.capture_window() {
            errors.push(e);
        }
        if self.contact_rate_limit > 0 && self.contact_rate_window_secs == 0 {
            errors.push("CONTACT_RATE_WINDOW_SECS must be positive when a rate limit is set".to_string());
        }
        if let Some(base) = &self.asset_base_url {
            if url::Url::parse(base).is_err() {
                errors.push(format!("ASSET_BASE_URL is not a valid URL: {base}"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn is_development(&self) -> bool {
        self.env == AppEnvironment::Development
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.client_url
            .split(',')
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Outside production, mail is only logged unless an SMTP host is set.
    pub fn uses_log_mailer(&self) -> bool {
        !self.is_production() && self.email_host.is_none()
    }

    pub fn capture_window(&self) -> Result<CaptureWindow, String> {
        let date = NaiveDate::parse_from_str(self.discovery_capture_date.trim(), "%Y-%m-%d")
            .map_err(|_| format!("DISCOVERY_CAPTURE_DATE must be YYYY-MM-DD: {}", self.discovery_capture_date))?;
        if self.discovery_capture_hour > 23 {
            return Err("DISCOVERY_CAPTURE_HOUR must be between 0 and 23".to_string());
        }
        let minutes = self
            .discovery_capture_minutes
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(|m| m.parse::<u32>().ok().filter(|m| *m < 60))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| format!("DISCOVERY_CAPTURE_MINUTES is invalid: {}", self.discovery_capture_minutes))?;

        Ok(CaptureWindow { date, hour: self.discovery_capture_hour, minutes })
    }

    /// Discovery settings, or `None` while no asset host is configured.
    pub fn discovery(&self) -> Option<DiscoverySettings> {
        let base_url = self.asset_base_url.clone()?;
        let capture = self.capture_window().ok()?;
        Some(DiscoverySettings {
            base_url,
            batch_size: self.discovery_batch_size.max(1),
            probe_timeout: Duration::from_millis(self.discovery_probe_timeout_ms),
            batch_delay: Duration::from_millis(self.discovery_batch_delay_ms),
            capture,
        })
    }

    pub fn contact_rate_window(&self) -> Duration {
        Duration::from_secs(self.contact_rate_window_secs)
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for Option<String> {
    fn redact(&self) -> &str {
        match self.as_deref() {
            None | Some("") => "[MISSING]",
            Some(_) => "[REDACTED]",
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("database_url", &self.database_url.redact())
            .field("client_url", &self.client_url)
            .field("admin_email", &self.admin_email)
            .field("email_host", &self.email_host)
            .field("email_port", &self.email_port)
            .field("email_secure", &self.email_secure)
            .field("email_user", &self.email_user)
            .field("email_pass", &self.email_pass.redact())
            .field("email_from", &self.email_from)
            .field("images_root", &self.images_root)
            .field("asset_base_url", &self.asset_base_url)
            .field("contact_rate_limit", &self.contact_rate_limit)
            .field("contact_rate_window_secs", &self.contact_rate_window_secs)
            .finish()
    }
}
