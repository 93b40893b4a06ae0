//! Legacy migration token definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use serde::{Deserialize, Serialize};

use crate::domain::{oauth, user};
#[cfg(doc)]
use crate::domain::User;

/// Payload of a migration token minted by the legacy system.
///
/// Legacy tokens predate the current claim layout, so everything but the
/// [`User`] reference and expiry is optional and defaulted.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Claims {
    /// ID of the [`User`] in the legacy system.
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

    /// [`Rating`] of the [`User`] in the legacy system.
    ///
    /// Absent in tokens minted before ratings existed.
    ///
    /// [`Rating`]: user::Rating
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<user::Rating>,

    /// Name of the external provider the [`User`] authenticated with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<oauth::Provider>,

    /// [`DateTime`] when the [`User`] was created in the legacy system.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "common::datetime::serde::opt_unix_timestamp"
    )]
    pub created_at: Option<user::CreationDateTime>,

    /// Unique ID of the token, marking it as used once it's redeemed.
    ///
    /// Absent in tokens minted before replay protection existed. Such
    /// tokens cannot be replay-checked and are redeemed as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<super::user::session::Jti>,

    /// [`DateTime`] when the token was issued.
    #[serde(
        default,
        rename = "iat",
        skip_serializing_if = "Option::is_none",
        with = "common::datetime::serde::opt_unix_timestamp"
    )]
    pub issued_at: Option<IssueDateTime>,

    /// [`DateTime`] when the token expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

impl Claims {
    /// Returns the [`Rating`] carried by these [`Claims`], falling back to
    /// [`Rating::MIGRATION_DEFAULT`] when absent.
    ///
    /// [`Rating`]: user::Rating
    /// [`Rating::MIGRATION_DEFAULT`]: user::Rating::MIGRATION_DEFAULT
    #[must_use]
    pub fn rating_or_default(&self) -> user::Rating {
        self.rating.unwrap_or(user::Rating::MIGRATION_DEFAULT)
    }
}

/// [`DateTime`] when a migration token was issued.
pub type IssueDateTime = DateTimeOf<(Claims, unit::Issuance)>;

/// [`DateTime`] when a migration token expires.
pub type ExpirationDateTime = DateTimeOf<(Claims, unit::Expiration)>;

#[cfg(test)]
mod claims_spec {
    use super::Claims;
    use crate::domain::user::Rating;

    #[test]
    fn minimal_legacy_payload_deserializes_with_defaults() {
        let claims: Claims = serde_json::from_value(serde_json::json!({
            "user_id": 42,
            "email": "old@example.com",
            "exp": 1_700_000_000_i64,
        }))
        .unwrap();

        assert_eq!(claims.user_id, 42.into());
        assert!(!claims.admin);
        assert!(claims.rating.is_none());
        assert_eq!(claims.rating_or_default(), Rating::MIGRATION_DEFAULT);
        assert!(claims.jti.is_none());
        assert!(claims.created_at.is_none());
    }

    #[test]
    fn full_payload_preserves_every_claim() {
        let claims: Claims = serde_json::from_value(serde_json::json!({
            "user_id": 42,
            "email": "old@example.com",
            "name": "Old Timer",
            "admin": true,
            "rating": 1350,
            "provider": "google",
            "created_at": 1_600_000_000_i64,
            "jti": "8c1a2f8e-4c44-4e47-9f3b-6d0a4e62f2aa",
            "iat": 1_699_000_000_i64,
            "exp": 1_700_000_000_i64,
        }))
        .unwrap();

        assert!(claims.admin);
        assert_eq!(claims.rating, Rating::new(1350));
        assert!(claims.jti.is_some());
        assert!(claims.created_at.is_some());
        assert!(claims.issued_at.is_some());
    }
}
