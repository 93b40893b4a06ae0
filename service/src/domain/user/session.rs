//! [`User`]'s session definitions.

use base64::Engine as _;
#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, Error as StdError, From, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::User;
use crate::domain::{oauth, user};

/// Payload of a [`User`]'s session [`Token`].
///
/// Carries everything the frontend needs to render the signed-in [`User`]
/// without an extra lookup.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Claims {
    /// ID of the [`User`] this session belongs to.
    #[serde(rename = "sub")]
    pub user_id: user::Id,

    /// [`Email`] of the [`User`].
    ///
    /// [`Email`]: user::Email
    pub email: user::Email,

    /// [`DisplayName`] of the [`User`].
    ///
    /// [`DisplayName`]: user::DisplayName
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<user::DisplayName>,

    /// Indicator whether the [`User`] is an administrator.
    #[serde(default)]
    pub admin: bool,

    /// [`Rating`] of the [`User`].
    ///
    /// [`Rating`]: user::Rating
    #[serde(default)]
    pub rating: user::Rating,

    /// Name of the external provider the [`User`] last authenticated with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<oauth::Provider>,

    /// Unique ID of this session, marking the [`Token`] as used once it's
    /// consumed by a one-time operation.
    pub jti: Jti,

    /// Issuer of the [`Token`].
    #[serde(rename = "iss")]
    pub issuer: String,

    /// Audience the [`Token`] is intended for.
    #[serde(rename = "aud")]
    pub audience: String,

    /// [`DateTime`] when this session was issued.
    #[serde(rename = "iat", with = "common::datetime::serde::unix_timestamp")]
    pub issued_at: IssueDateTime,

    /// [`DateTime`] when this session expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

/// Encoded session token of a [`User`], in JWT format.
#[derive(
    AsRef,
    Clone,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[as_ref(str, String)]
#[from(&str, String)]
#[serde(transparent)]
pub struct Token(String);

/// Unique ID of a [`User`]'s session.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    PartialEq,
    Serialize,
)]
#[serde(transparent)]
pub struct Jti(Uuid);

impl Jti {
    /// Generates a new random [`Jti`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Jti {
    fn default() -> Self {
        Self::new()
    }
}

/// Class of a [`User`]'s session, deciding how long it lives.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Lifetime {
    /// Regular interactive session.
    #[default]
    Standard,

    /// Long-lived session bridged from the legacy system.
    Extended,
}

/// Authorization to create a [`User`]'s session, stashed behind a one-time
/// [`AuthCode`].
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct Grant {
    /// ID of the [`User`] the session is granted to.
    pub user_id: user::Id,

    /// [`Lifetime`] of the granted session.
    #[serde(default)]
    pub lifetime: Lifetime,
}

/// One-time code exchangeable for a [`User`]'s session [`Token`].
///
/// Opaque to clients, safe to pass through URLs.
#[derive(AsRef, Clone, Debug, Display, Eq, From, Hash, Into, PartialEq)]
#[as_ref(str, String)]
#[from(&str, String)]
pub struct AuthCode(String);

impl AuthCode {
    /// Number of random bytes backing an [`AuthCode`].
    const ENTROPY_BYTES: usize = 32;

    /// Generates a new random [`AuthCode`].
    ///
    /// # Errors
    ///
    /// Errors if randomness cannot be obtained.
    pub fn generate() -> Result<Self, GenerationError> {
        let mut bytes = [0_u8; Self::ENTROPY_BYTES];
        getrandom::getrandom(&mut bytes).map_err(GenerationError)?;
        Ok(Self(
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes),
        ))
    }
}

/// Error of generating an [`AuthCode`].
#[derive(Clone, Copy, Debug, Display, StdError)]
#[display("Failed to obtain randomness: {_0}")]
pub struct GenerationError(getrandom::Error);

/// [`DateTime`] when a [`User`]'s session was issued.
pub type IssueDateTime = DateTimeOf<(Claims, unit::Issuance)>;

/// [`DateTime`] when a [`User`]'s session expires.
pub type ExpirationDateTime = DateTimeOf<(Claims, unit::Expiration)>;

#[cfg(test)]
mod auth_code_spec {
    use super::AuthCode;

    #[test]
    fn generated_codes_are_unique_and_url_safe() {
        let a = AuthCode::generate().unwrap();
        let b = AuthCode::generate().unwrap();

        assert_ne!(a, b);
        for code in [&a, &b] {
            let code: &str = code.as_ref();
            assert!(code
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        }
    }
}

#[cfg(test)]
mod claims_spec {
    use common::DateTimeOf;

    use crate::domain::user::Rating;

    use super::{Claims, Jti};

    #[test]
    fn round_trips_through_json() {
        let claims = Claims {
            user_id: 7.into(),
            email: "user@example.com".parse().unwrap(),
            name: Some("Player One".parse().unwrap()),
            admin: false,
            rating: Rating::DEFAULT,
            provider: Some("google".parse().unwrap()),
            jti: Jti::new(),
            issuer: "typing-platform".into(),
            audience: "typing-platform-web".into(),
            issued_at: DateTimeOf::from_unix_timestamp(1_700_000_000)
                .unwrap(),
            expires_at: DateTimeOf::from_unix_timestamp(1_700_003_600)
                .unwrap(),
        };

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["sub"], 7);
        assert_eq!(json["iat"], 1_700_000_000_i64);
        assert_eq!(json["exp"], 1_700_003_600_i64);

        let decoded: Claims = serde_json::from_value(json).unwrap();
        assert_eq!(decoded.user_id, claims.user_id);
        assert_eq!(decoded.jti, claims.jti);
        assert_eq!(decoded.expires_at, claims.expires_at);
    }
}
