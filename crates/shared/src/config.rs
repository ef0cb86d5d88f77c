//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Authentication policy.
    #[serde(default)]
    pub auth: AuthSettings,
    /// Media storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Outbound email configuration.
    #[serde(default)]
    pub email: EmailConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration as read from config sources.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token lifetime in seconds.
    #[serde(default = "default_access_token_lifetime")]
    pub access_token_lifetime_secs: u64,
    /// Email verification token lifetime in seconds.
    #[serde(default = "default_action_token_lifetime")]
    pub verify_token_lifetime_secs: u64,
    /// Password reset token lifetime in seconds.
    #[serde(default = "default_action_token_lifetime")]
    pub reset_token_lifetime_secs: u64,
}

fn default_access_token_lifetime() -> u64 {
    3600
}

fn default_action_token_lifetime() -> u64 {
    3600
}

/// Authentication policy.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthSettings {
    /// Refuse logins from users who have not verified their email.
    #[serde(default)]
    pub require_verified: bool,
}

/// Media storage configuration.
///
/// `provider` selects the backend: `imagekit` (default) or `local_fs`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Backend name.
    pub provider: String,
    /// ImageKit private API key.
    pub private_key: String,
    /// ImageKit public API key. Accepted so existing environments keep
    /// parsing; uploads only authenticate with the private key.
    pub public_key: String,
    /// ImageKit URL endpoint. Accepted like `public_key`; stored URLs come
    /// from the upload response.
    pub url_endpoint: String,
    /// ImageKit upload API endpoint.
    pub upload_endpoint: String,
    /// Root directory for the `local_fs` backend.
    pub local_root: String,
    /// Public base URL for files written by the `local_fs` backend.
    pub public_base_url: String,
    /// Upper bound for one outbound upload, in seconds.
    pub upload_timeout_secs: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: "imagekit".to_string(),
            private_key: String::new(),
            public_key: String::new(),
            url_endpoint: String::new(),
            upload_endpoint: "https://upload.imagekit.io/api/v1/files/upload".to_string(),
            local_root: "./uploads".to_string(),
            public_base_url: "http://localhost:8000/media".to_string(),
            upload_timeout_secs: 30,
        }
    }
}

/// Email (SMTP) configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// Whether emails are actually sent. When false, tokens are logged instead.
    pub enabled: bool,
    /// SMTP host.
    pub smtp_host: String,
    /// SMTP port.
    pub smtp_port: u16,
    /// SMTP username.
    pub smtp_username: String,
    /// SMTP password.
    pub smtp_password: String,
    /// Sender address.
    pub from_email: String,
    /// Sender display name.
    pub from_name: String,
    /// Frontend base URL used to build links in emails.
    pub frontend_url: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: "noreply@glimpse.local".to_string(),
            from_name: "Glimpse".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
        }
    }
}

/// Legacy environment variables honoured on top of `GLIMPSE__*`.
const LEGACY_OVERRIDES: [(&str, &str); 4] = [
    ("DATABASE_URL", "database.url"),
    ("IMAGE_KIT_PRIVATE", "storage.private_key"),
    ("IMAGE_KIT_PUBLIC", "storage.public_key"),
    ("IMAGE_URL", "storage.url_endpoint"),
];

impl AppConfig {
    /// Loads configuration from config files and the environment.
    ///
    /// Later sources win: `config/default`, `config/{RUN_MODE}`, `GLIMPSE__*`
    /// variables, then the legacy variables in [`LEGACY_OVERRIDES`].
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("GLIMPSE")
                    .separator("__")
                    .try_parsing(true),
            );

        for (var, key) in LEGACY_OVERRIDES {
            builder = builder.set_override_option(key, std::env::var(var).ok())?;
        }

        builder.build()?.try_deserialize()
    }
}
