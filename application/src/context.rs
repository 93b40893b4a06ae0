//! [`Auth`]-related definitions.

use std::sync::Arc;

use axum::{
    async_trait, extract::FromRequestParts, http::request::Parts,
    RequestPartsExt as _,
};
use axum_extra::{
    extract::CookieJar,
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use service::{
    command::{authorize_user_session, AuthorizeUserSession, Command as _},
    domain::{user::session, User},
};

use crate::{config, define_error, error::AsError, Error, Service};

/// Authenticated session of the current request.
#[derive(Clone, Debug)]
pub struct Auth {
    /// [`User`] owning the session.
    pub user: User,

    /// Claims of the presented session token.
    pub claims: session::Claims,

    /// Session token the request was authenticated with.
    pub token: session::Token,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Auth {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let session_conf = parts
            .extensions
            .get::<Arc<config::Session>>()
            .cloned()
            .ok_or_else(|| {
                Error::internal(&"missing `config::Session` extension")
            })?;

        let token = extract_token(parts, &session_conf)
            .await?
            .ok_or(AuthError::AuthorizationRequired)
            .map_err(AuthError::into_error)?;

        let service = parts
            .extensions
            .get::<Service>()
            .cloned()
            .ok_or_else(|| Error::internal(&"missing `Service` extension"))?;

        let out = service
            .execute(AuthorizeUserSession {
                token: token.clone(),
            })
            .await
            .map_err(|e| e.into_error())?;

        Ok(Self {
            user: out.user,
            claims: out.claims,
            token,
        })
    }
}

/// Extracts the session token from the request, according to the configured
/// [`config::SessionMode`].
///
/// The `Authorization: Bearer` header always wins, with the session cookie as
/// a fallback in the [`config::SessionMode::Cookie`] mode.
async fn extract_token(
    parts: &mut Parts,
    conf: &config::Session,
) -> Result<Option<session::Token>, Error> {
    match parts.extract::<TypedHeader<Authorization<Bearer>>>().await {
        Ok(TypedHeader(Authorization(bearer))) => {
            return Ok(Some(bearer.token().into()));
        }
        Err(rejection) if rejection.is_missing() => {}
        Err(rejection) => return Err(rejection.into_error()),
    }

    if conf.mode == config::SessionMode::Cookie {
        let jar = parts
            .extract::<CookieJar>()
            .await
            .map_err(|e| Error::internal(&e))?;
        return Ok(jar
            .get(&conf.cookie.name)
            .map(|cookie| cookie.value().into()));
    }

    Ok(None)
}

impl AsError for authorize_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use authorize_user_session::ExecutionError as E;

        match self {
            E::JsonWebTokenDecodeError(_) | E::UserNotExists(_) => {
                Some(AuthError::InvalidToken.into())
            }
            E::Db(e) => e.try_as_error(),
        }
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,

        #[code = "INVALID_TOKEN"]
        #[status = UNAUTHORIZED]
        #[message = "Invalid or expired token"]
        InvalidToken,
    }
}
