//! [`Query`] collection related to [`TypingMatch`]es.

use common::operations::By;

use crate::domain::{battle, user, TypingMatch};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`TypingMatch`] by its [`battle::Id`].
pub type ById = DatabaseQuery<By<Option<TypingMatch>, battle::Id>>;

/// Queries the recent [`TypingMatch`]es of a [`User`], newest first.
///
/// [`User`]: crate::domain::User
pub type ForUser = DatabaseQuery<By<Vec<TypingMatch>, History>>;

/// Selector of a [`User`]'s recent [`TypingMatch`]es.
///
/// [`User`]: crate::domain::User
#[derive(Clone, Copy, Debug)]
pub struct History {
    /// ID of the [`User`] whose matches to return.
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,

    /// Maximum number of [`TypingMatch`]es to return.
    pub limit: i64,
}
