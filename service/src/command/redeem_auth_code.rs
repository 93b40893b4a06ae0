//! [`Command`] for redeeming a one-time [`AuthCode`].
//!
//! [`AuthCode`]: session::AuthCode

use common::operations::{By, Take};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::user::session,
    infra::{cache, Cache},
    Service,
};

use super::{create_user_session, Command, CreateUserSession};

/// [`Command`] for redeeming a one-time [`AuthCode`] into a session of the
/// [`User`] it was issued for.
///
/// The [`AuthCode`] is taken out of the [`Cache`] atomically, so out of
/// multiple concurrent redemptions of the same code at most one succeeds.
///
/// [`AuthCode`]: session::AuthCode
/// [`User`]: crate::domain::User
#[derive(Clone, Debug, From)]
pub struct RedeemAuthCode {
    /// [`AuthCode`] to redeem.
    ///
    /// [`AuthCode`]: session::AuthCode
    pub code: session::AuthCode,
}

impl<Db, C> Command<RedeemAuthCode> for Service<Db, C>
where
    C: Cache<
        Take<By<Option<session::Grant>, session::AuthCode>>,
        Ok = Option<session::Grant>,
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
        cmd: RedeemAuthCode,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RedeemAuthCode { code } = cmd;

        let session::Grant { user_id, lifetime } = self
            .cache()
            .execute(Take(By::new(code)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UnknownCode)
            .map_err(tracerr::wrap!())?;

        self.execute(CreateUserSession::ByUserId { user_id, lifetime })
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`RedeemAuthCode`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Cache`] error.
    #[display("`Cache` operation failed: {_0}")]
    Cache(cache::Error),

    /// Session creation error.
    #[display("Failed to create a session: {_0}")]
    Session(create_user_session::ExecutionError),

    /// [`AuthCode`] is unknown: expired, already redeemed, or never issued.
    ///
    /// [`AuthCode`]: session::AuthCode
    #[display("Unknown `AuthCode`")]
    UnknownCode,
}
