//! [`Config`]-related definitions.

use std::time;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use serde::Deserialize;
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Service configuration.
    pub service: Service,

    /// Postgres configuration.
    pub postgres: Postgres,

    /// Redis configuration.
    pub redis: Redis,

    /// OAuth providers configuration.
    pub oauth: Oauth,

    /// Session delivery configuration.
    pub session: Session,

    /// External URLs configuration.
    pub urls: Urls,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize::<Self>()?
            .validated()
    }

    /// Checks the invariants no [`Config`] is allowed to violate.
    ///
    /// # Errors
    ///
    /// Returns an error if any signing secret is empty.
    fn validated(self) -> Result<Self, ConfigError> {
        if self.service.jwt_secret.is_empty() {
            return Err(ConfigError::Message(
                "`service.jwt_secret` must not be empty".into(),
            ));
        }
        if self.service.legacy_jwt_secret.as_deref() == Some("") {
            return Err(ConfigError::Message(
                "`service.legacy_jwt_secret` must not be empty".into(),
            ));
        }
        Ok(self)
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Service configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// [JWT] secret of the session tokens issued by this server.
    ///
    /// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
    #[default("secret".to_owned())]
    pub jwt_secret: String,

    /// [JWT] secret shared with the legacy server.
    ///
    /// Falls back to the `jwt_secret` when omitted.
    ///
    /// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
    pub legacy_jwt_secret: Option<String>,

    /// `iss` claim of the issued session tokens.
    #[default("typing-platform".to_owned())]
    pub issuer: String,

    /// `aud` claim of the issued session tokens.
    #[default("typing-platform-web".to_owned())]
    pub audience: String,

    /// Lifetime of regular session tokens.
    #[default(time::Duration::from_secs(60 * 60))]
    #[serde(with = "humantime_serde")]
    pub session_ttl: time::Duration,

    /// Lifetime of session tokens issued for migrated legacy sessions.
    #[default(time::Duration::from_secs(60 * 60 * 24 * 7))]
    #[serde(with = "humantime_serde")]
    pub legacy_session_ttl: time::Duration,

    /// Lifetime of one-time authorization codes and migration tokens.
    #[default(time::Duration::from_secs(60 * 5))]
    #[serde(with = "humantime_serde")]
    pub temporary_ttl: time::Duration,

    /// Lifetime of server-side session records.
    #[default(time::Duration::from_secs(60 * 60 * 24))]
    #[serde(with = "humantime_serde")]
    pub session_record_ttl: time::Duration,

    /// Lifetime of replay-protection markers of consumed migration tokens.
    #[default(time::Duration::from_secs(60 * 60 * 24))]
    #[serde(with = "humantime_serde")]
    pub replay_ttl: time::Duration,
}

impl From<Service> for service::Config {
    fn from(value: Service) -> Self {
        let Service {
            jwt_secret,
            legacy_jwt_secret,
            issuer,
            audience,
            session_ttl,
            legacy_session_ttl,
            temporary_ttl,
            session_record_ttl,
            replay_ttl,
        } = value;

        let legacy_secret =
            legacy_jwt_secret.unwrap_or_else(|| jwt_secret.clone());

        Self {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                jwt_secret.as_bytes(),
            ),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                jwt_secret.as_bytes(),
            ),
            legacy_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                legacy_secret.as_bytes(),
            ),
            legacy_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                legacy_secret.as_bytes(),
            ),
            issuer,
            audience,
            session_ttl,
            legacy_session_ttl,
            temporary_ttl,
            session_record_ttl,
            replay_ttl,
        }
    }
}

/// Postgres configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default("postgres".to_owned())]
    pub password: String,

    /// Database name to connect to.
    #[default("postgres".to_owned())]
    pub dbname: String,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
        } = value;

        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password),
            dbname: Some(dbname),
            ..Self::default()
        }
    }
}

/// Redis configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Redis {
    /// URL to connect to.
    #[default("redis://127.0.0.1:6379".to_owned())]
    pub url: String,
}

impl From<Redis> for service::infra::redis::Config {
    fn from(value: Redis) -> Self {
        Self { url: value.url }
    }
}

/// OAuth providers configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Oauth {
    /// Google OAuth configuration.
    pub google: Google,
}

/// Google OAuth configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Google {
    /// OAuth client ID.
    pub client_id: String,

    /// OAuth client secret.
    pub client_secret: String,

    /// Redirect URI registered for the OAuth client.
    #[default("http://localhost:8080/api/auth/google/callback".to_owned())]
    pub redirect_uri: String,

    /// Authorization endpoint users are sent to.
    #[default("https://accounts.google.com/o/oauth2/v2/auth".to_owned())]
    pub auth_url: String,

    /// Endpoint exchanging authorization codes for access tokens.
    #[default("https://oauth2.googleapis.com/token".to_owned())]
    pub token_url: String,

    /// Endpoint returning the authenticated user's profile.
    #[default(
        "https://openidconnect.googleapis.com/v1/userinfo".to_owned()
    )]
    pub userinfo_url: String,
}

/// Session delivery configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Session {
    /// How session tokens are delivered to clients.
    pub mode: SessionMode,

    /// Session cookie configuration.
    ///
    /// Only meaningful in the [`SessionMode::Cookie`] mode.
    pub cookie: Cookie,
}

/// Way of delivering session tokens to clients.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// Tokens are returned in response bodies and expected back in the
    /// `Authorization: Bearer` header.
    #[default]
    Bearer,

    /// Tokens are set as an HTTP-only cookie and never exposed in response
    /// bodies.
    Cookie,
}

/// Session cookie configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cookie {
    /// Name of the cookie.
    #[default("session".to_owned())]
    pub name: String,

    /// Indicator whether the cookie is sent over HTTPS only.
    #[default(true)]
    pub secure: bool,

    /// Domain the cookie is scoped to.
    pub domain: Option<String>,
}

/// External URLs configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Urls {
    /// Base URL of the frontend application.
    #[default("http://localhost:3000".to_owned())]
    pub frontend: String,

    /// Base URL of the legacy application.
    #[default("http://localhost:3001".to_owned())]
    pub legacy: String,
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use super::Config;

    #[test]
    fn rejects_empty_signing_secrets() {
        let mut conf = Config::default();
        conf.service.jwt_secret = String::new();
        assert!(conf.validated().is_err());

        let mut conf = Config::default();
        conf.service.legacy_jwt_secret = Some(String::new());
        assert!(conf.validated().is_err());

        assert!(Config::default().validated().is_ok());
    }
}
