//! [`Command`] for issuing a token understood by the legacy system.

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        migration,
        user::{self, session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for issuing a short-lived migration token the legacy system
/// accepts, letting a signed-in [`User`] hop back to it.
#[derive(Clone, Copy, Debug, From)]
pub struct IssueLegacyToken {
    /// ID of the [`User`] to issue the token for.
    pub user_id: user::Id,
}

/// Output of [`IssueLegacyToken`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Issued migration [`Token`].
    ///
    /// [`Token`]: session::Token
    pub token: session::Token,

    /// [`DateTime`] when the token expires.
    ///
    /// [`DateTime`]: common::DateTime
    pub expires_at: migration::ExpirationDateTime,
}

impl<Db, C> Command<IssueLegacyToken> for Service<Db, C>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: IssueLegacyToken,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let IssueLegacyToken { user_id } = cmd;

        let user = self
            .database()
            .execute(Select(By::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        // Claims serialize `exp` as whole seconds, so the reported expiry
        // must not keep sub-second precision.
        let now = DateTime::now();
        let expires_at =
            (now + self.config().temporary_ttl).trunc_seconds().coerce();
        let claims = migration::Claims {
            user_id: user.id,
            email: user.email,
            name: user.display_name,
            admin: user.admin,
            rating: Some(user.rating),
            provider: user.provider,
            created_at: Some(user.created_at),
            jti: Some(session::Jti::new()),
            issued_at: Some(now.coerce()),
            expires_at,
        };
        let token = session::Token::from(
            jsonwebtoken::encode(
                &jsonwebtoken::Header::default(),
                &claims,
                &self.config().legacy_encoding_key,
            )
            .map_err(tracerr::from_and_wrap!(=> E))?,
        );

        Ok(Output { token, expires_at })
    }
}

/// Error of [`IssueLegacyToken`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
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
}
