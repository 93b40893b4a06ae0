//! Leaderboard API handlers.

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use service::{
    command::{update_user_rating, Command as _, UpdateUserRating},
    domain::user,
    query::{rankings, user as user_query},
};

use crate::{define_error, error::AsError, Error, Service};

use super::UserBody;

/// Maximum size of a leaderboard (or history) page.
pub(super) const MAX_PAGE_SIZE: i64 = 100;

/// Default size of a leaderboard (or history) page.
pub(super) const DEFAULT_PAGE_SIZE: i64 = 50;

/// Request of the [`list`] handler.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct ListRequest {
    /// Maximum number of entries to return.
    pub count: Option<i64>,

    /// Number of leading entries to skip.
    pub offset: Option<i64>,
}

/// Single entry of the leaderboard.
#[derive(Debug, Serialize)]
pub struct Entry {
    /// 1-based position of the [`User`] on the leaderboard.
    ///
    /// [`User`]: service::domain::User
    pub rank: i64,

    /// [`User`] holding the position.
    ///
    /// [`User`]: service::domain::User
    pub user: UserBody,
}

/// `GET /api/ranking` handler.
///
/// # Errors
///
/// Errors if the leaderboard cannot be loaded.
pub async fn list(
    Extension(service): Extension<Service>,
    Query(req): Query<ListRequest>,
) -> Result<Json<Vec<Entry>>, Error> {
    let limit = req
        .count
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = req.offset.unwrap_or(0).max(0);

    let users = service
        .execute(rankings::Leaderboard::by(rankings::Top { limit, offset }))
        .await
        .map_err(|e| e.into_error())?;

    Ok(Json(
        users
            .into_iter()
            .enumerate()
            .map(|(i, user)| Entry {
                rank: offset + i64::try_from(i).unwrap_or(i64::MAX) + 1,
                user: user.into(),
            })
            .collect(),
    ))
}

/// Response of the [`user_rank`] handler.
#[derive(Debug, Serialize)]
pub struct RankBody {
    /// 1-based position of the [`User`] on the leaderboard.
    ///
    /// [`User`]: service::domain::User
    pub rank: rankings::Rank,

    /// [`User`] holding the position.
    ///
    /// [`User`]: service::domain::User
    pub user: UserBody,
}

/// `GET /api/ranking/user/:id` handler.
///
/// # Errors
///
/// Errors if the [`User`] does not exist.
///
/// [`User`]: service::domain::User
pub async fn user_rank(
    Extension(service): Extension<Service>,
    Path(id): Path<user::Id>,
) -> Result<Json<RankBody>, Error> {
    let user = service
        .execute(user_query::ById::by(id))
        .await
        .map_err(|e| e.into_error())?
        .ok_or(RankingError::UserNotFound)
        .map_err(RankingError::into_error)?;

    let rank = service
        .execute(rankings::RankOf::by(id))
        .await
        .map_err(|e| e.into_error())?
        .ok_or(RankingError::UserNotFound)
        .map_err(RankingError::into_error)?;

    Ok(Json(RankBody {
        rank,
        user: user.into(),
    }))
}

/// Request of the [`update_rating`] handler.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct UpdateRequest {
    /// New rating of the [`User`].
    ///
    /// [`User`]: service::domain::User
    pub new_rating: i32,
}

/// `PUT /api/ranking/user/:id` handler.
///
/// # Errors
///
/// Errors if the [`User`] does not exist, or the rating is out of range.
///
/// [`User`]: service::domain::User
pub async fn update_rating(
    Extension(service): Extension<Service>,
    Path(id): Path<user::Id>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<UserBody>, Error> {
    let rating = user::Rating::new(req.new_rating)
        .ok_or(RankingError::InvalidRating)
        .map_err(RankingError::into_error)?;

    let user = service
        .execute(UpdateUserRating {
            user_id: id,
            rating,
        })
        .await
        .map_err(|e| e.into_error())?;

    Ok(Json(user.into()))
}

impl AsError for update_user_rating::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use update_user_rating::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::UserNotExists(_) => Some(RankingError::UserNotFound.into()),
        }
    }
}

define_error! {
    enum RankingError {
        #[code = "INVALID_RATING"]
        #[status = BAD_REQUEST]
        #[message = "Rating is out of range"]
        InvalidRating,

        #[code = "USER_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "User not found"]
        UserNotFound,
    }
}
