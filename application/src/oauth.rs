//! Google OAuth client.

use derive_more::{Display, Error, From};
use serde::Deserialize;
use service::domain::{
    oauth::{Profile, Provider, Uid},
    user::{DisplayName, Email},
};
use url::Url;

use crate::config;

/// Name of the Google OAuth [`Provider`].
const PROVIDER: &str = "google";

/// Client of the Google OAuth authorization code flow.
#[derive(Clone, Debug)]
pub struct Google {
    /// HTTP client performing requests to Google.
    http: reqwest::Client,

    /// Configuration of this [`Google`] client.
    conf: config::Google,
}

impl Google {
    /// Creates a new [`Google`] client with the provided configuration.
    #[must_use]
    pub fn new(conf: config::Google) -> Self {
        Self {
            http: reqwest::Client::new(),
            conf,
        }
    }

    /// Builds the authorization [`Url`] users are redirected to.
    ///
    /// The provided `state` is echoed back by Google on the callback.
    ///
    /// # Errors
    ///
    /// Errors if the configured authorization endpoint is not a valid URL.
    pub fn authorize_url(
        &self,
        state: &str,
    ) -> Result<Url, tracerr::Traced<ExchangeError>> {
        Url::parse_with_params(
            &self.conf.auth_url,
            [
                ("client_id", self.conf.client_id.as_str()),
                ("redirect_uri", self.conf.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", "openid email profile"),
                ("state", state),
            ],
        )
        .map_err(tracerr::from_and_wrap!())
    }

    /// Exchanges the authorization `code` for the [`Profile`] of the
    /// authenticated user.
    ///
    /// # Errors
    ///
    /// Errors if Google rejects the exchange, or the returned profile misses
    /// the required fields.
    pub async fn exchange(
        &self,
        code: &str,
    ) -> Result<Profile, tracerr::Traced<ExchangeError>> {
        use ExchangeError as E;

        let token = self
            .http
            .post(&self.conf.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", &self.conf.client_id),
                ("client_secret", &self.conf.client_secret),
                ("redirect_uri", &self.conf.redirect_uri),
            ])
            .send()
            .await
            .map_err(tracerr::from_and_wrap!(=> E))?
            .error_for_status()
            .map_err(tracerr::from_and_wrap!(=> E))?
            .json::<TokenResponse>()
            .await
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let info = self
            .http
            .get(&self.conf.userinfo_url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(tracerr::from_and_wrap!(=> E))?
            .error_for_status()
            .map_err(tracerr::from_and_wrap!(=> E))?
            .json::<UserInfo>()
            .await
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let email = info
            .email
            .and_then(Email::new)
            .ok_or(E::MissingUserInfo)
            .map_err(tracerr::wrap!())?;
        let uid = Uid::new(info.sub)
            .ok_or(E::MissingUserInfo)
            .map_err(tracerr::wrap!())?;
        let provider = Provider::new(PROVIDER)
            .unwrap_or_else(|| unreachable!("`{PROVIDER}` is a valid name"));

        Ok(Profile {
            provider,
            uid,
            email,
            name: info.name.and_then(DisplayName::new),
        })
    }
}

/// Response of the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    /// Access token authorizing userinfo requests.
    access_token: String,
}

/// Response of the userinfo endpoint.
#[derive(Debug, Deserialize)]
struct UserInfo {
    /// Stable Google account identifier.
    sub: String,

    /// Email address of the account.
    email: Option<String>,

    /// Human-readable name of the account.
    name: Option<String>,
}

/// Error of exchanging an authorization code for a [`Profile`].
#[derive(Debug, Display, Error, From)]
pub enum ExchangeError {
    /// HTTP request to Google failed.
    #[display("HTTP request to Google failed: {_0}")]
    Http(reqwest::Error),

    /// Google returned a profile without the required fields.
    #[display("Google returned a profile without the required fields")]
    MissingUserInfo,

    /// Configured endpoint is not a valid URL.
    #[display("configured endpoint is not a valid URL: {_0}")]
    Url(url::ParseError),
}

impl ExchangeError {
    /// Returns the error code to redirect the user to the frontend with.
    #[must_use]
    pub fn redirect_code(&self) -> &'static str {
        match self {
            Self::MissingUserInfo => "missing_user_info",
            Self::Http(_) | Self::Url(_) => "google_auth_failed",
        }
    }
}
