//! Authentication API handlers.

use std::sync::Arc;

use axum::{
    extract::Query,
    response::{IntoResponse as _, Redirect, Response},
    Extension, Json,
};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};
use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use service::{
    command::{
        bridge_legacy_session, create_user_session, delete_user_session,
        issue_auth_code, issue_legacy_token, redeem_auth_code,
        resolve_oauth_identity, BridgeLegacySession, Command as _,
        CreateUserSession, DeleteUserSession, IssueAuthCode, IssueLegacyToken,
        RedeemAuthCode, ResolveOauthIdentity,
    },
    domain::{
        user::{self, session},
        RedirectTarget,
    },
};
use url::Url;

use crate::{
    config, define_error,
    error::AsError,
    oauth::{ExchangeError, Google},
    Auth, Error, Service,
};

use super::UserBody;

/// Request of the [`login`] handler.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address to sign in with.
    pub email: user::Email,

    /// Password to sign in with.
    pub password: String,
}

/// `POST /api/auth/login` handler.
///
/// # Errors
///
/// Errors if the credentials don't match an existing [`User`].
///
/// [`User`]: service::domain::User
pub async fn login(
    Extension(service): Extension<Service>,
    Extension(conf): Extension<Arc<config::Session>>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, Error> {
    let LoginRequest { email, password } = req;

    let password = user::Password::new(password)
        .ok_or(LoginError::InvalidCredentials)
        .map_err(LoginError::into_error)?;

    let out = service
        .execute(CreateUserSession::ByCredentials {
            email,
            password: SecretBox::new(Box::new(password)),
        })
        .await
        .map_err(|e| e.into_error())?;

    Ok(session_response(&conf, out))
}

/// Request of the [`google_login`] and [`redirect_to_legacy`] handlers.
#[derive(Debug, Deserialize)]
pub struct ReturnUrlRequest {
    /// URL to return the user to afterwards.
    pub return_url: Option<String>,
}

/// `GET /api/auth/google/login` handler.
///
/// Redirects the user to the Google authorization endpoint, smuggling the
/// sanitized return URL through the OAuth `state` parameter.
///
/// # Errors
///
/// Errors if the authorization URL cannot be built.
pub async fn google_login(
    Extension(google): Extension<Arc<Google>>,
    Query(req): Query<ReturnUrlRequest>,
) -> Result<Redirect, Error> {
    let target = RedirectTarget::sanitize(req.return_url.as_deref());
    let url = google
        .authorize_url(target.as_ref())
        .map_err(|e| e.into_error())?;
    Ok(Redirect::temporary(url.as_str()))
}

/// Request of the [`google_callback`] handler.
#[derive(Debug, Deserialize)]
pub struct GoogleCallbackRequest {
    /// Authorization code returned by Google.
    pub code: Option<String>,

    /// `state` parameter echoed back by Google.
    pub state: Option<String>,

    /// Error code returned by Google instead of an authorization code.
    pub error: Option<String>,
}

/// `GET /api/auth/google/callback` handler.
///
/// Always responds with a redirect to the frontend: on success the [`User`]
/// is signed in per the configured [`config::SessionMode`], on failure the
/// login page receives an error code.
///
/// [`User`]: service::domain::User
pub async fn google_callback(
    Extension(service): Extension<Service>,
    Extension(google): Extension<Arc<Google>>,
    Extension(conf): Extension<Arc<config::Session>>,
    Extension(urls): Extension<Arc<config::Urls>>,
    Query(req): Query<GoogleCallbackRequest>,
) -> Response {
    let GoogleCallbackRequest { code, state, error } = req;

    let target = RedirectTarget::sanitize(state.as_deref());

    let Some(code) = code.filter(|_| error.is_none()) else {
        return error_redirect(&urls, "google_auth_failed").into_response();
    };

    let profile = match google.exchange(&code).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!("Google OAuth exchange failed: {e}");
            return error_redirect(&urls, e.as_ref().redirect_code())
                .into_response();
        }
    };

    let user = match service.execute(ResolveOauthIdentity { profile }).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("failed to resolve an OAuth identity: {e}");
            return error_redirect(&urls, "oauth_processing_failed")
                .into_response();
        }
    };

    match signed_in_redirect(
        &service,
        &conf,
        &urls,
        user.id,
        session::Lifetime::Standard,
        &target,
    )
    .await
    {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("failed to establish a session: {e}");
            error_redirect(&urls, "oauth_processing_failed").into_response()
        }
    }
}

/// Builds a [`Redirect`] to the frontend login page carrying the provided
/// error `code`.
fn error_redirect(urls: &config::Urls, code: &str) -> Redirect {
    Redirect::temporary(&format!("{}/login?error={code}", urls.frontend))
}

/// Signs the [`User`] in per the configured [`config::SessionMode`] and
/// redirects to the frontend.
///
/// In the [`config::SessionMode::Bearer`] mode the frontend callback page
/// receives a one-time authorization code to exchange; in the
/// [`config::SessionMode::Cookie`] mode the session cookie is set right away
/// and the redirect carries no code.
///
/// [`User`]: service::domain::User
async fn signed_in_redirect(
    service: &Service,
    conf: &config::Session,
    urls: &config::Urls,
    user_id: user::Id,
    lifetime: session::Lifetime,
    target: &RedirectTarget,
) -> Result<Response, Error> {
    match conf.mode {
        config::SessionMode::Bearer => {
            let issued = service
                .execute(IssueAuthCode { user_id, lifetime })
                .await
                .map_err(|e| e.into_error())?;

            let url = Url::parse_with_params(
                &format!("{}/auth/callback", urls.frontend),
                [
                    ("code", AsRef::<str>::as_ref(&issued.code)),
                    ("return_url", target.as_ref()),
                ],
            )
            .map_err(|e| Error::internal(&e))?;

            Ok(Redirect::temporary(url.as_str()).into_response())
        }
        config::SessionMode::Cookie => {
            let out = service
                .execute(CreateUserSession::ByUserId { user_id, lifetime })
                .await
                .map_err(|e| e.into_error())?;

            let url = format!("{}{}", urls.frontend, AsRef::<str>::as_ref(target));
            Ok((
                CookieJar::new().add(session_cookie(conf, out.token)),
                Redirect::temporary(&url),
            )
                .into_response())
        }
    }
}

/// Request of the [`exchange_code`] handler.
#[derive(Debug, Deserialize)]
pub struct ExchangeCodeRequest {
    /// One-time authorization code to redeem.
    pub code: String,
}

/// `POST /api/auth/exchange-code` handler.
///
/// # Errors
///
/// Errors if the code is expired, already redeemed, or never issued.
pub async fn exchange_code(
    Extension(service): Extension<Service>,
    Extension(conf): Extension<Arc<config::Session>>,
    Json(req): Json<ExchangeCodeRequest>,
) -> Result<Response, Error> {
    let out = service
        .execute(RedeemAuthCode {
            code: req.code.into(),
        })
        .await
        .map_err(|e| e.into_error())?;

    Ok(session_response(&conf, out))
}

/// Request of the [`cross_domain_login`] handler.
#[derive(Debug, Deserialize)]
pub struct CrossDomainLoginRequest {
    /// Migration token minted by the legacy system.
    pub token: String,

    /// URL to return the user to afterwards.
    pub return_url: Option<String>,
}

/// `GET /api/auth/cross-domain-login` handler.
///
/// Bridges a migration token minted by the legacy system into an account on
/// this one, and signs the [`User`] in per the configured
/// [`config::SessionMode`], redirecting to the frontend.
///
/// # Errors
///
/// Errors if the migration token is invalid, expired, or already used.
///
/// [`User`]: service::domain::User
pub async fn cross_domain_login(
    Extension(service): Extension<Service>,
    Extension(conf): Extension<Arc<config::Session>>,
    Extension(urls): Extension<Arc<config::Urls>>,
    Query(req): Query<CrossDomainLoginRequest>,
) -> Result<Response, Error> {
    let CrossDomainLoginRequest { token, return_url } = req;

    let out = service
        .execute(BridgeLegacySession {
            token: token.into(),
        })
        .await
        .map_err(|e| e.into_error())?;

    let target = RedirectTarget::sanitize(return_url.as_deref());
    signed_in_redirect(
        &service,
        &conf,
        &urls,
        out.user.id,
        session::Lifetime::Extended,
        &target,
    )
    .await
}

/// `GET /api/auth/redirect-to-legacy` handler.
///
/// Issues a short-lived migration token for the authenticated [`User`] and
/// redirects to the verification page of the legacy system carrying it.
///
/// # Errors
///
/// Errors if the request is not authenticated, or the token cannot be issued.
///
/// [`User`]: service::domain::User
pub async fn redirect_to_legacy(
    auth: Auth,
    Extension(service): Extension<Service>,
    Extension(urls): Extension<Arc<config::Urls>>,
    Query(req): Query<ReturnUrlRequest>,
) -> Result<Redirect, Error> {
    let out = service
        .execute(IssueLegacyToken {
            user_id: auth.user.id,
        })
        .await
        .map_err(|e| e.into_error())?;

    let target = RedirectTarget::sanitize(req.return_url.as_deref());
    let url = Url::parse_with_params(
        &format!("{}/auth/verify", urls.legacy),
        [
            ("token", AsRef::<str>::as_ref(&out.token)),
            ("redirect", target.as_ref()),
        ],
    )
    .map_err(|e| Error::internal(&e))?;

    Ok(Redirect::temporary(url.as_str()))
}

/// Response of the [`me`] handler.
#[derive(Debug, Serialize)]
pub struct MeBody {
    /// Authenticated [`User`].
    ///
    /// [`User`]: service::domain::User
    pub user: UserBody,

    /// [RFC 3339] timestamp of when the session expires.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    pub expires_at: String,
}

/// `GET /api/auth/me` handler.
pub async fn me(auth: Auth) -> Json<MeBody> {
    Json(MeBody {
        expires_at: auth.claims.expires_at.to_rfc3339(),
        user: auth.user.into(),
    })
}

/// Response of the [`logout`] handler.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct LogoutBody {
    /// Acknowledgment of the sign-out.
    pub ok: bool,
}

/// `POST /api/auth/logout` handler.
///
/// # Errors
///
/// Errors if the request is not authenticated.
pub async fn logout(
    auth: Auth,
    Extension(service): Extension<Service>,
    Extension(conf): Extension<Arc<config::Session>>,
) -> Result<Response, Error> {
    service
        .execute(DeleteUserSession {
            user_id: auth.user.id,
        })
        .await
        .map_err(|e| e.into_error())?;

    let body = Json(LogoutBody { ok: true });
    Ok(if conf.mode == config::SessionMode::Cookie {
        let mut cookie = Cookie::from(conf.cookie.name.clone());
        cookie.set_path("/");
        (CookieJar::new().remove(cookie), body).into_response()
    } else {
        body.into_response()
    })
}

/// Response carrying a created session.
#[derive(Debug, Serialize)]
struct SessionBody {
    /// [`User`] the session belongs to.
    ///
    /// [`User`]: service::domain::User
    user: UserBody,

    /// [RFC 3339] timestamp of when the session expires.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    expires_at: String,

    /// Session token, absent in the [`config::SessionMode::Cookie`] mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<session::Token>,
}

/// Builds the [`Response`] delivering a created session according to the
/// configured [`config::SessionMode`].
fn session_response(
    conf: &config::Session,
    out: create_user_session::Output,
) -> Response {
    let create_user_session::Output {
        token,
        user,
        expires_at,
    } = out;

    let body = SessionBody {
        user: user.into(),
        expires_at: expires_at.to_rfc3339(),
        token: None,
    };

    match conf.mode {
        config::SessionMode::Bearer => Json(SessionBody {
            token: Some(token),
            ..body
        })
        .into_response(),
        config::SessionMode::Cookie => {
            (CookieJar::new().add(session_cookie(conf, token)), Json(body))
                .into_response()
        }
    }
}

/// Builds the session [`Cookie`] carrying the given [`session::Token`].
fn session_cookie(
    conf: &config::Session,
    token: session::Token,
) -> Cookie<'static> {
    let mut cookie = Cookie::new(conf.cookie.name.clone(), String::from(token));
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(conf.cookie.secure);
    cookie.set_same_site(SameSite::Lax);
    if let Some(domain) = &conf.cookie.domain {
        cookie.set_domain(domain.clone());
    }
    cookie
}

impl AsError for create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use create_user_session::ExecutionError as E;

        match self {
            E::UserNotExists(_) | E::WrongCredentials => {
                Some(LoginError::InvalidCredentials.into())
            }
            E::Cache(e) => e.try_as_error(),
            E::Db(e) => e.try_as_error(),
            E::JsonWebTokenEncodeError(_) => None,
        }
    }
}

impl AsError for redeem_auth_code::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use redeem_auth_code::ExecutionError as E;

        match self {
            E::UnknownCode => Some(CodeError::ExpiredOrInvalidCode.into()),
            E::Cache(e) => e.try_as_error(),
            E::Session(e) => e.try_as_error(),
        }
    }
}

impl AsError for bridge_legacy_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use bridge_legacy_session::ExecutionError as E;

        match self {
            E::JsonWebTokenDecodeError(_) => {
                Some(TokenError::InvalidToken.into())
            }
            E::TokenAlreadyUsed => Some(TokenError::TokenAlreadyUsed.into()),
            E::Cache(e) => e.try_as_error(),
            E::Db(e) => e.try_as_error(),
            E::Session(e) => e.try_as_error(),
        }
    }
}

impl AsError for resolve_oauth_identity::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use resolve_oauth_identity::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::UserNotExists(_) => None,
        }
    }
}

impl AsError for issue_auth_code::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use issue_auth_code::ExecutionError as E;

        match self {
            E::Cache(e) => e.try_as_error(),
            E::Db(e) => e.try_as_error(),
            E::Generation(_) | E::UserNotExists(_) => None,
        }
    }
}

impl AsError for issue_legacy_token::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use issue_legacy_token::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::JsonWebTokenEncodeError(_) | E::UserNotExists(_) => None,
        }
    }
}

impl AsError for delete_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use delete_user_session::ExecutionError as E;

        match self {
            E::Cache(e) => e.try_as_error(),
        }
    }
}

impl AsError for ExchangeError {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

define_error! {
    enum LoginError {
        #[code = "INVALID_CREDENTIALS"]
        #[status = UNAUTHORIZED]
        #[message = "Invalid credentials"]
        InvalidCredentials,
    }
}

define_error! {
    enum CodeError {
        #[code = "EXPIRED_OR_INVALID_CODE"]
        #[status = UNAUTHORIZED]
        #[message = "Expired or invalid authorization code"]
        ExpiredOrInvalidCode,
    }
}

define_error! {
    enum TokenError {
        #[code = "INVALID_TOKEN"]
        #[status = UNAUTHORIZED]
        #[message = "Invalid or expired token"]
        InvalidToken,

        #[code = "TOKEN_ALREADY_USED"]
        #[status = UNAUTHORIZED]
        #[message = "Token has already been used"]
        TokenAlreadyUsed,
    }
}

#[cfg(test)]
mod bridge_error_spec {
    use service::command::bridge_legacy_session;

    use crate::error::AsError as _;

    #[test]
    fn undecodable_migration_token_is_401() {
        let e = bridge_legacy_session::ExecutionError::JsonWebTokenDecodeError(
            jsonwebtoken::errors::ErrorKind::ExpiredSignature.into(),
        );

        let error = e.try_as_error().unwrap();
        assert_eq!(error.status_code, http::StatusCode::UNAUTHORIZED);
        assert_eq!(error.code, "INVALID_TOKEN");
    }

    #[test]
    fn replayed_migration_token_is_401() {
        let e = bridge_legacy_session::ExecutionError::TokenAlreadyUsed;

        let error = e.try_as_error().unwrap();
        assert_eq!(error.status_code, http::StatusCode::UNAUTHORIZED);
        assert_eq!(error.code, "TOKEN_ALREADY_USED");
    }
}
