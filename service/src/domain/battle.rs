//! [`TypingMatch`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

use crate::domain::user;
#[cfg(doc)]
use crate::domain::User;

/// Single typing battle of a [`User`], optionally against an opponent.
#[derive(Clone, Debug)]
pub struct TypingMatch {
    /// ID of this [`TypingMatch`].
    pub id: Id,

    /// ID of the [`User`] who played this [`TypingMatch`].
    pub user_id: user::Id,

    /// ID of the opponent [`User`], if any.
    pub enemy_user_id: Option<user::Id>,

    /// Score achieved in this [`TypingMatch`].
    pub score: i32,

    /// Typing accuracy achieved in this [`TypingMatch`], in percent.
    pub accuracy: f64,

    /// Typing speed achieved in this [`TypingMatch`], in keys per second.
    pub type_speed: f64,

    /// Number of mistyped keys in this [`TypingMatch`].
    pub miss_count: i32,

    /// Duration of this [`TypingMatch`], in seconds.
    pub battle_time: f64,

    /// Current [`Status`] of this [`TypingMatch`].
    pub status: Status,

    /// [`DateTime`] when this [`TypingMatch`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`TypingMatch`] was updated last time.
    pub updated_at: UpdateDateTime,
}

/// New [`TypingMatch`] to be persisted.
///
/// Starts with zeroed results in the [`Status::Started`] state. The [`Id`] is
/// assigned by the database on insertion.
#[derive(Clone, Debug)]
pub struct NewMatch {
    /// ID of the [`User`] who plays the [`TypingMatch`].
    pub user_id: user::Id,

    /// ID of the opponent [`User`], if any.
    pub enemy_user_id: Option<user::Id>,

    /// [`DateTime`] when the [`TypingMatch`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when the [`TypingMatch`] was updated last time.
    pub updated_at: UpdateDateTime,
}

/// Final results of a [`TypingMatch`], reported when it finishes.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct Outcome {
    /// Score achieved in the [`TypingMatch`].
    pub score: i32,

    /// Typing accuracy achieved in the [`TypingMatch`], in percent.
    pub accuracy: f64,

    /// Typing speed achieved in the [`TypingMatch`], in keys per second.
    pub type_speed: f64,

    /// Number of mistyped keys in the [`TypingMatch`].
    pub miss_count: i32,

    /// Duration of the [`TypingMatch`], in seconds.
    pub battle_time: f64,
}

/// ID of a [`TypingMatch`].
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

/// Status of a [`TypingMatch`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// [`TypingMatch`] is in progress.
    Started,

    /// [`TypingMatch`] has finished and its results are final.
    Finished,
}

impl Status {
    /// Returns the database representation of this [`Status`].
    #[must_use]
    pub fn as_i16(self) -> i16 {
        match self {
            Self::Started => 0,
            Self::Finished => 1,
        }
    }

    /// Parses a [`Status`] out of its database representation.
    #[must_use]
    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(Self::Started),
            1 => Some(Self::Finished),
            _ => None,
        }
    }
}

#[cfg(feature = "postgres")]
impl postgres_types::FromSql<'_> for Status {
    postgres_types::accepts!(INT2);

    fn from_sql(
        ty: &postgres_types::Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn std::error::Error + Sync + Send>> {
        Self::from_i16(i16::from_sql(ty, raw)?)
            .ok_or_else(|| "unknown `Status` discriminant".into())
    }
}

#[cfg(feature = "postgres")]
impl postgres_types::ToSql for Status {
    postgres_types::accepts!(INT2);
    postgres_types::to_sql_checked!();

    fn to_sql(
        &self,
        ty: &postgres_types::Type,
        w: &mut postgres_types::private::BytesMut,
    ) -> Result<
        postgres_types::IsNull,
        Box<dyn std::error::Error + Sync + Send>,
    > {
        self.as_i16().to_sql(ty, w)
    }
}

/// [`DateTime`] when a [`TypingMatch`] was created.
pub type CreationDateTime = DateTimeOf<(TypingMatch, unit::Creation)>;

/// [`DateTime`] when a [`TypingMatch`] was updated last time.
pub type UpdateDateTime = DateTimeOf<(TypingMatch, unit::Update)>;
