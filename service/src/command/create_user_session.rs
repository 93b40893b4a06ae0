//! [`Command`] for creating a [`User`]'s session.

use common::{
    operations::{By, Insert, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Email, Password};
use crate::{
    domain::{
        user::{self, session},
        User,
    },
    infra::{
        cache::{self, Entry, SessionOf},
        database, Cache, Database,
    },
    Service,
};

use super::Command;

/// [`Command`] for creating a [`User`]'s session.
#[derive(Clone, Debug)]
pub enum CreateUserSession {
    /// Create a new session by [`User`] credentials.
    ByCredentials {
        /// [`Email`] of a [`User`].
        email: user::Email,

        /// [`Password`] of a [`User`].
        password: SecretBox<user::Password>,
    },

    /// Create a new session for an already authenticated [`User`].
    ByUserId {
        /// ID of the [`User`].
        user_id: user::Id,

        /// [`session::Lifetime`] of the session to create.
        lifetime: session::Lifetime,
    },
}

/// Output of [`CreateUserSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Token`] of the created session.
    ///
    /// [`Token`]: session::Token
    pub token: session::Token,

    /// [`User`] whose session has been created.
    pub user: User,

    /// [`DateTime`] when the session expires.
    ///
    /// [`DateTime`]: common::DateTime
    pub expires_at: session::ExpirationDateTime,
}

impl<Db, C> Command<CreateUserSession> for Service<Db, C>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'e> Database<
            Select<By<Option<User>, &'e user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        >,
    C: Cache<
        Insert<Entry<SessionOf, session::Token>>,
        Ok = (),
        Err = Traced<cache::Error>,
    >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use CreateUserSession as Cmd;
        use ExecutionError as E;

        let (user, lifetime) = match cmd {
            Cmd::ByCredentials { email, password } => {
                let user = self
                    .database()
                    .execute(Select(By::new(&email)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::WrongCredentials)
                    .map_err(tracerr::wrap!())?;

                let verified = user
                    .password_hash
                    .as_ref()
                    .is_some_and(|h| h.verify(password.expose_secret()));
                if !verified {
                    return Err(tracerr::new!(E::WrongCredentials));
                }

                (user, session::Lifetime::Standard)
            }
            Cmd::ByUserId { user_id, lifetime } => {
                let user = self
                    .database()
                    .execute(Select(By::new(user_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::UserNotExists(user_id))
                    .map_err(tracerr::wrap!())?;

                (user, lifetime)
            }
        };

        let ttl = match lifetime {
            session::Lifetime::Standard => self.config().session_ttl,
            session::Lifetime::Extended => self.config().legacy_session_ttl,
        };
        // Claims serialize `exp` as whole seconds, so the reported expiry
        // must not keep sub-second precision.
        let now = DateTime::now();
        let expires_at = (now + ttl).trunc_seconds().coerce();

        let claims = session::Claims {
            user_id: user.id,
            email: user.email.clone(),
            name: user.display_name.clone(),
            admin: user.admin,
            rating: user.rating,
            provider: user.provider.clone(),
            jti: session::Jti::new(),
            issuer: self.config().issuer.clone(),
            audience: self.config().audience.clone(),
            issued_at: now.coerce(),
            expires_at,
        };
        let token = session::Token::from(
            jsonwebtoken::encode(
                &jsonwebtoken::Header::default(),
                &claims,
                &self.config().jwt_encoding_key,
            )
            .map_err(tracerr::from_and_wrap!(=> E))?,
        );

        self.cache()
            .execute(Insert(Entry {
                key: SessionOf(user.id),
                value: token.clone(),
                ttl: self.config().session_record_ttl,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(Output {
            token,
            user,
            expires_at,
        })
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Cache`] error.
    #[display("`Cache` operation failed: {_0}")]
    Cache(cache::Error),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),

    /// [`CreateUserSession::ByCredentials`] contains wrong credentials.
    #[display("Wrong `User` credentials")]
    WrongCredentials,
}
