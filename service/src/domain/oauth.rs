//! External OAuth [`Identity`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

use crate::domain::user;
#[cfg(doc)]
use crate::domain::User;

/// Link between a [`User`] and an account at an external OAuth provider.
///
/// The ([`Provider`], [`Uid`]) pair uniquely identifies at most one
/// [`Identity`].
#[derive(Clone, Debug)]
pub struct Identity {
    /// ID of this [`Identity`].
    pub id: Id,

    /// ID of the [`User`] this [`Identity`] belongs to.
    pub user_id: user::Id,

    /// [`Provider`] this [`Identity`] comes from.
    pub provider: Provider,

    /// [`Uid`] of the account at the [`Provider`].
    pub uid: Uid,

    /// [`Email`] reported by the [`Provider`] for this [`Identity`].
    ///
    /// [`Email`]: user::Email
    pub email: user::Email,

    /// [`DateTime`] when this [`Identity`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Identity`] was updated last time.
    pub updated_at: UpdateDateTime,
}

/// New [`Identity`] to be persisted.
///
/// The [`Id`] is assigned by the database on insertion.
#[derive(Clone, Debug)]
pub struct NewIdentity {
    /// ID of the [`User`] the [`Identity`] belongs to.
    pub user_id: user::Id,

    /// [`Provider`] the [`Identity`] comes from.
    pub provider: Provider,

    /// [`Uid`] of the account at the [`Provider`].
    pub uid: Uid,

    /// [`Email`] reported by the [`Provider`].
    ///
    /// [`Email`]: user::Email
    pub email: user::Email,

    /// [`DateTime`] when the [`Identity`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when the [`Identity`] was updated last time.
    pub updated_at: UpdateDateTime,
}

/// New [`User`] bundled with the [`Identity`] linking them to the provider
/// account, to be persisted atomically.
#[derive(Clone, Debug)]
pub struct NewAccount {
    /// [`User`] to create.
    pub user: user::NewUser,

    /// [`Provider`] the account comes from.
    pub provider: Provider,

    /// [`Uid`] of the account at the [`Provider`].
    pub uid: Uid,
}

/// Profile of a [`User`] as reported by an external OAuth [`Provider`].
#[derive(Clone, Debug)]
pub struct Profile {
    /// [`Provider`] that authenticated the [`User`].
    pub provider: Provider,

    /// [`Uid`] of the account at the [`Provider`].
    pub uid: Uid,

    /// [`Email`] of the account.
    ///
    /// [`Email`]: user::Email
    pub email: user::Email,

    /// Display name of the account, if the [`Provider`] reports one.
    pub name: Option<user::DisplayName>,
}

/// ID of an [`Identity`].
#[derive(
    Clone,
    Copy,
    Debug,
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

/// Name of an external OAuth provider (e.g. `google`).
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[as_ref(str, String)]
#[serde(transparent)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Provider(String);

impl Provider {
    /// Creates a new [`Provider`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Provider`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        !name.is_empty()
            && name.len() <= 64
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    }
}

impl FromStr for Provider {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Provider`")
    }
}

impl<'de> Deserialize<'de> for Provider {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

/// Unique ID of an account at an external OAuth [`Provider`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[as_ref(str, String)]
#[serde(transparent)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Uid(String);

impl Uid {
    /// Creates a new [`Uid`] if the given `uid` is valid.
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Option<Self> {
        let uid = uid.into();
        (!uid.is_empty() && uid.len() <= 255).then_some(Self(uid))
    }
}

impl FromStr for Uid {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Uid`")
    }
}

impl<'de> Deserialize<'de> for Uid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

/// [`DateTime`] when an [`Identity`] was created.
pub type CreationDateTime = DateTimeOf<(Identity, unit::Creation)>;

/// [`DateTime`] when an [`Identity`] was updated last time.
pub type UpdateDateTime = DateTimeOf<(Identity, unit::Update)>;
