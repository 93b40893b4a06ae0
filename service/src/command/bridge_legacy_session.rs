//! [`Command`] for bridging a legacy migration token into a session.

use common::{
    operations::{By, Consume, Insert},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        migration,
        user::{self, session},
        User,
    },
    infra::{
        cache::{self, Entry},
        database, Cache, Database,
    },
    Service,
};

use super::{create_user_session, Command, CreateUserSession};

/// [`Command`] for bridging a migration token minted by the legacy system
/// into a long-lived session on this one.
///
/// The [`User`] carried by the token is upserted by their [`Email`], so both
/// first-time migrations and returning visitors land on the same account.
/// Tokens carrying a `jti` are consumed at most once.
///
/// [`Email`]: user::Email
#[derive(Clone, Debug, From)]
pub struct BridgeLegacySession {
    /// Migration [`Token`] minted by the legacy system.
    ///
    /// [`Token`]: session::Token
    pub token: session::Token,
}

impl<Db, C> Command<BridgeLegacySession> for Service<Db, C>
where
    Db: Database<
        Insert<By<User, user::NewUser>>,
        Ok = User,
        Err = Traced<database::Error>,
    >,
    C: Cache<
        Consume<Entry<session::Jti>>,
        Ok = bool,
        Err = Traced<cache::Error>,
    >,
    Self: Command<
        CreateUserSession,
        Ok = create_user_session::Output,
        Err = Traced<create_user_session::ExecutionError>,
    >,
{
    type Ok = create_user_session::Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: BridgeLegacySession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let BridgeLegacySession { token } = cmd;

        let claims = jsonwebtoken::decode::<migration::Claims>(
            token.as_ref(),
            &self.config().legacy_decoding_key,
            &self.config().legacy_validation(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        // Tokens minted before replay protection carry no `jti` and cannot
        // be checked.
        if let Some(jti) = claims.jti {
            let fresh = self
                .cache()
                .execute(Consume(Entry {
                    key: jti,
                    value: (),
                    ttl: self.config().replay_ttl,
                }))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if !fresh {
                return Err(tracerr::new!(E::TokenAlreadyUsed));
            }
        }

        let now = DateTime::now();
        let rating = claims.rating_or_default();
        let user = self
            .database()
            .execute(Insert(By::new(user::NewUser {
                email: claims.email,
                display_name: claims.name,
                password_hash: None,
                rating,
                guest: false,
                admin: claims.admin,
                provider: claims.provider,
                created_at: claims.created_at.unwrap_or_else(|| now.coerce()),
                updated_at: now.coerce(),
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        log::info!("bridged a legacy session for `User(id: {})`", user.id);

        self.execute(CreateUserSession::ByUserId {
            user_id: user.id,
            lifetime: session::Lifetime::Extended,
        })
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`BridgeLegacySession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Cache`] error.
    #[display("`Cache` operation failed: {_0}")]
    Cache(cache::Error),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),

    /// Session creation error.
    #[display("Failed to create a session: {_0}")]
    Session(create_user_session::ExecutionError),

    /// Migration token has already been consumed.
    #[display("Migration token has already been used")]
    TokenAlreadyUsed,
}
