//! [`Query`] collection over the rating leaderboard.

use common::operations::By;
use derive_more::{Display, From, Into};
use serde::Serialize;

use crate::domain::{user, User};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a page of the leaderboard, best [`Rating`] first.
///
/// Ties are broken by the smaller [`user::Id`], keeping the ordering total.
///
/// [`Rating`]: user::Rating
pub type Leaderboard = DatabaseQuery<By<Vec<User>, Top>>;

/// Queries the [`Rank`] a [`User`] currently holds, if they exist.
pub type RankOf = DatabaseQuery<By<Option<Rank>, user::Id>>;

/// Selector of a leaderboard page.
#[derive(Clone, Copy, Debug)]
pub struct Top {
    /// Maximum number of [`User`]s to return.
    pub limit: i64,

    /// Number of leading [`User`]s to skip.
    pub offset: i64,
}

/// 1-based position of a [`User`] on the leaderboard.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, Into, Ord, PartialEq, PartialOrd,
    Serialize,
)]
#[serde(transparent)]
pub struct Rank(i64);
