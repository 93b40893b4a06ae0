//! Typing battle API handlers.

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use serde::Deserialize;
use service::{
    command::{
        finish_battle, start_battle, Command as _, FinishBattle, StartBattle,
    },
    domain::{battle as battle_domain, user},
    query::battle as battle_query,
};

use crate::{define_error, error::AsError, Auth, Error, Service};

use super::{
    ranking::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
    MatchBody,
};

/// Request of the [`start`] handler.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct StartRequest {
    /// ID of the opponent [`User`], if any.
    ///
    /// [`User`]: service::domain::User
    pub enemy_user_id: Option<user::Id>,
}

/// `POST /api/battle` handler.
///
/// # Errors
///
/// Errors if the opponent does not exist.
pub async fn start(
    auth: Auth,
    Extension(service): Extension<Service>,
    Json(req): Json<StartRequest>,
) -> Result<Json<MatchBody>, Error> {
    service
        .execute(StartBattle {
            user_id: auth.user.id,
            enemy_user_id: req.enemy_user_id,
        })
        .await
        .map(|m| Json(m.into()))
        .map_err(|e| e.into_error())
}

/// `POST /api/battle/:id/finish` handler.
///
/// # Errors
///
/// Errors if the match does not exist, is not played by the authenticated
/// [`User`], or has been finished already.
///
/// [`User`]: service::domain::User
pub async fn finish(
    auth: Auth,
    Extension(service): Extension<Service>,
    Path(id): Path<battle_domain::Id>,
    Json(outcome): Json<battle_domain::Outcome>,
) -> Result<Json<MatchBody>, Error> {
    service
        .execute(FinishBattle {
            id,
            user_id: auth.user.id,
            outcome,
        })
        .await
        .map(|m| Json(m.into()))
        .map_err(|e| e.into_error())
}

/// Request of the [`history`] handler.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct HistoryRequest {
    /// Maximum number of matches to return.
    pub limit: Option<i64>,
}

/// `GET /api/battle/me` handler.
///
/// # Errors
///
/// Errors if the history cannot be loaded.
pub async fn history(
    auth: Auth,
    Extension(service): Extension<Service>,
    Query(req): Query<HistoryRequest>,
) -> Result<Json<Vec<MatchBody>>, Error> {
    let limit = req
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let matches = service
        .execute(battle_query::ForUser::by(battle_query::History {
            user_id: auth.user.id,
            limit,
        }))
        .await
        .map_err(|e| e.into_error())?;

    Ok(Json(matches.into_iter().map(Into::into).collect()))
}

impl AsError for start_battle::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use start_battle::ExecutionError as E;

        match self {
            E::UserNotExists(_) => Some(BattleError::UserNotFound.into()),
            E::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for finish_battle::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use finish_battle::ExecutionError as E;

        match self {
            E::AlreadyFinished(_) => {
                Some(BattleError::MatchAlreadyFinished.into())
            }
            E::MatchNotExists(_) => Some(BattleError::MatchNotFound.into()),
            E::NotParticipant => Some(BattleError::NotParticipant.into()),
            E::Db(e) => e.try_as_error(),
        }
    }
}

define_error! {
    enum BattleError {
        #[code = "USER_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "User not found"]
        UserNotFound,

        #[code = "MATCH_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "Match not found"]
        MatchNotFound,

        #[code = "MATCH_ALREADY_FINISHED"]
        #[status = CONFLICT]
        #[message = "Match has been finished already"]
        MatchAlreadyFinished,

        #[code = "FORBIDDEN"]
        #[status = FORBIDDEN]
        #[message = "Match is played by another user"]
        NotParticipant,
    }
}
