//! REST API definitions.

pub mod auth;
pub mod battle;
pub mod ranking;

use axum::{
    routing::{get, post},
    Router,
};
use serde::Serialize;
use service::domain::{battle as battle_domain, oauth, user, TypingMatch, User};

/// Builds the [`Router`] of the whole REST API.
pub fn router() -> Router {
    Router::new().nest(
        "/api",
        Router::new()
            .route("/auth/login", post(auth::login))
            .route("/auth/google/login", get(auth::google_login))
            .route("/auth/google/callback", get(auth::google_callback))
            .route("/auth/exchange-code", post(auth::exchange_code))
            .route("/auth/cross-domain-login", get(auth::cross_domain_login))
            .route("/auth/redirect-to-legacy", get(auth::redirect_to_legacy))
            .route("/auth/me", get(auth::me))
            .route("/auth/logout", post(auth::logout))
            .route("/ranking", get(ranking::list))
            .route(
                "/ranking/user/:id",
                get(ranking::user_rank).put(ranking::update_rating),
            )
            .route("/battle", post(battle::start))
            .route("/battle/:id/finish", post(battle::finish))
            .route("/battle/me", get(battle::history)),
    )
}

/// Serialized representation of a [`User`].
#[derive(Debug, Serialize)]
pub struct UserBody {
    /// ID of the [`User`].
    pub id: user::Id,

    /// Email address of the [`User`].
    pub email: user::Email,

    /// Display name of the [`User`], if any.
    pub display_name: Option<user::DisplayName>,

    /// Current rating of the [`User`].
    pub rating: user::Rating,

    /// Indicator whether the [`User`] is a guest.
    pub guest: bool,

    /// Indicator whether the [`User`] is an administrator.
    pub admin: bool,

    /// OAuth provider the [`User`] signed up with, if any.
    pub provider: Option<oauth::Provider>,

    /// [RFC 3339] timestamp of when the [`User`] was created.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    pub created_at: String,
}

impl From<User> for UserBody {
    fn from(user: User) -> Self {
        let User {
            id,
            email,
            display_name,
            password_hash: _,
            rating,
            guest,
            admin,
            provider,
            created_at,
            updated_at: _,
        } = user;

        Self {
            id,
            email,
            display_name,
            rating,
            guest,
            admin,
            provider,
            created_at: created_at.to_rfc3339(),
        }
    }
}

/// Serialized representation of a [`TypingMatch`].
#[derive(Debug, Serialize)]
pub struct MatchBody {
    /// ID of the [`TypingMatch`].
    pub id: battle_domain::Id,

    /// ID of the [`User`] who plays the [`TypingMatch`].
    pub user_id: user::Id,

    /// ID of the opponent [`User`], if any.
    pub enemy_user_id: Option<user::Id>,

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

    /// Current status of the [`TypingMatch`].
    pub status: battle_domain::Status,

    /// [RFC 3339] timestamp of when the [`TypingMatch`] was created.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    pub created_at: String,
}

impl From<TypingMatch> for MatchBody {
    fn from(m: TypingMatch) -> Self {
        let TypingMatch {
            id,
            user_id,
            enemy_user_id,
            score,
            accuracy,
            type_speed,
            miss_count,
            battle_time,
            status,
            created_at,
            updated_at: _,
        } = m;

        Self {
            id,
            user_id,
            enemy_user_id,
            score,
            accuracy,
            type_speed,
            miss_count,
            battle_time,
            status,
            created_at: created_at.to_rfc3339(),
        }
    }
}
