//! [`User`] definitions.

pub mod session;

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{
    AsRef, Display, Error as StdError, From, FromStr, Into,
};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use secrecy::{zeroize::Zeroize, CloneableSecret};
use serde::{Deserialize, Serialize};

use crate::domain::oauth;

/// Platform user.
#[derive(Clone, Debug, From)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`Email`] of this [`User`].
    ///
    /// Uniquely identifies at most one [`User`].
    pub email: Email,

    /// [`DisplayName`] of this [`User`].
    pub display_name: Option<DisplayName>,

    /// [`PasswordHash`] of this [`User`].
    ///
    /// [`None`] for [`User`]s created via OAuth or legacy migration, which
    /// have no password.
    pub password_hash: Option<PasswordHash>,

    /// [`Rating`] of this [`User`].
    pub rating: Rating,

    /// Indicator whether this [`User`] is a guest.
    pub guest: bool,

    /// Indicator whether this [`User`] is an administrator.
    pub admin: bool,

    /// Name of the external provider this [`User`] last authenticated with.
    pub provider: Option<oauth::Provider>,

    /// [`DateTime`] when this [`User`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`User`] was updated last time.
    pub updated_at: UpdateDateTime,
}

/// New [`User`] to be persisted.
///
/// The [`Id`] is assigned by the database on insertion.
#[derive(Clone, Debug)]
pub struct NewUser {
    /// [`Email`] of the [`User`].
    pub email: Email,

    /// [`DisplayName`] of the [`User`].
    pub display_name: Option<DisplayName>,

    /// [`PasswordHash`] of the [`User`].
    pub password_hash: Option<PasswordHash>,

    /// [`Rating`] of the [`User`].
    pub rating: Rating,

    /// Indicator whether the [`User`] is a guest.
    pub guest: bool,

    /// Indicator whether the [`User`] is an administrator.
    pub admin: bool,

    /// Name of the external provider the [`User`] authenticated with.
    pub provider: Option<oauth::Provider>,

    /// [`DateTime`] when the [`User`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when the [`User`] was updated last time.
    pub updated_at: UpdateDateTime,
}

/// ID of a [`User`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(i32);

/// Email address of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[as_ref(str, String)]
#[serde(transparent)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `address` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format:
        /// - Exactly one `@`;
        /// - Non-empty local part without whitespace;
        /// - Domain with at least one dot and no whitespace.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$")
                .expect("valid regex")
        });

        let address = address.as_ref();
        address.len() <= 320 && REGEX.is_match(address)
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

impl TryFrom<String> for Email {
    type Error = &'static str;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl<'de> Deserialize<'de> for Email {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .try_into()
            .map_err(serde::de::Error::custom)
    }
}

/// Display name of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
#[as_ref(str, String)]
#[serde(transparent)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct DisplayName(String);

impl DisplayName {
    /// Creates a new [`DisplayName`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`DisplayName`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`DisplayName`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 255
    }
}

impl FromStr for DisplayName {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `DisplayName`")
    }
}

impl<'de> Deserialize<'de> for DisplayName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

/// Rating of a [`User`].
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[serde(transparent)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Rating(i32);

impl Rating {
    /// Default [`Rating`] assigned to a newly created [`User`].
    pub const DEFAULT: Self = Self(1200);

    /// Default [`Rating`] assumed for a migrated [`User`] whose migration
    /// token carries no rating claim.
    pub const MIGRATION_DEFAULT: Self = Self(1000);

    /// Creates a new [`Rating`] if the given `value` is non-negative.
    #[must_use]
    pub fn new(value: i32) -> Option<Self> {
        (value >= 0).then_some(Self(value))
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i32> for Rating {
    type Error = &'static str;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or("`Rating` cannot be negative")
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        i32::deserialize(deserializer)?
            .try_into()
            .map_err(serde::de::Error::custom)
    }
}

/// Password of a [`User`].
#[derive(Clone, Debug, Display, Eq, From, PartialEq)]
#[from(&str, String)]
pub struct Password(String);

impl Password {
    /// Creates a new [`Password`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `password` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// Creates a new [`Password`] if the given `password` is valid.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        Self::check(&password).then_some(Self(password))
    }

    /// Checks whether the given `password` is a valid [`Password`].
    fn check(password: impl AsRef<str>) -> bool {
        let password = password.as_ref();
        password.len() > 1 && password.len() <= 128
    }
}

impl FromStr for Password {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Password`")
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// Password hash of a [`User`], in [PHC string format].
///
/// [PHC string format]: https://github.com/P-H-C/phc-string-format
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Creates a new [`PasswordHash`] of the given [`Password`], salted with
    /// fresh randomness.
    ///
    /// # Errors
    ///
    /// Errors if randomness cannot be obtained, or the hashing itself fails.
    pub fn new(password: &Password) -> Result<Self, HashingError> {
        use argon2::PasswordHasher as _;

        let mut salt = [0_u8; 16];
        getrandom::getrandom(&mut salt).map_err(HashingError::Randomness)?;
        let salt = password_hash::SaltString::encode_b64(&salt)
            .map_err(HashingError::Hashing)?;

        Ok(Self(
            argon2::Argon2::default()
                .hash_password(password.0.as_bytes(), &salt)
                .map_err(HashingError::Hashing)?
                .to_string(),
        ))
    }

    /// Verifies whether the given [`Password`] matches this [`PasswordHash`].
    ///
    /// Malformed hashes verify as `false` rather than erroring, to keep
    /// authentication failures uniform.
    #[must_use]
    pub fn verify(&self, password: &Password) -> bool {
        use argon2::PasswordVerifier as _;

        password_hash::PasswordHash::new(&self.0).is_ok_and(|parsed| {
            argon2::Argon2::default()
                .verify_password(password.0.as_bytes(), &parsed)
                .is_ok()
        })
    }
}

/// Error of creating a [`PasswordHash`].
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum HashingError {
    /// Failed to obtain randomness for the salt.
    #[display("Failed to obtain randomness: {_0}")]
    Randomness(getrandom::Error),

    /// Hashing algorithm failure.
    #[display("Failed to hash a `Password`: {_0}")]
    Hashing(password_hash::Error),
}

/// [`DateTime`] when a [`User`] was created.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;

/// [`DateTime`] when a [`User`] was updated last time.
pub type UpdateDateTime = DateTimeOf<(User, unit::Update)>;

#[cfg(test)]
mod email_spec {
    use super::Email;

    #[test]
    fn accepts_plain_addresses() {
        for addr in ["test@example.com", "a.b+c@mail.co.jp"] {
            assert!(Email::new(addr).is_some(), "rejected `{addr}`");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for addr in ["", "no-at.example.com", "two@@example.com", "a@b", "s p@a.ce"]
        {
            assert!(Email::new(addr).is_none(), "accepted `{addr}`");
        }
    }
}

#[cfg(test)]
mod password_hash_spec {
    use super::{Password, PasswordHash};

    #[test]
    fn verifies_own_password_only() {
        let password = Password::new("password123").unwrap();
        let hash = PasswordHash::new(&password).unwrap();

        assert!(hash.verify(&password));
        assert!(!hash.verify(&Password::new("password124").unwrap()));
    }

    #[test]
    fn salts_are_unique() {
        let password = Password::new("password123").unwrap();

        assert_ne!(
            PasswordHash::new(&password).unwrap(),
            PasswordHash::new(&password).unwrap(),
        );
    }
}
