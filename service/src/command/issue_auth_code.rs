//! [`Command`] for issuing a one-time [`AuthCode`].
//!
//! [`AuthCode`]: session::AuthCode

use std::time::Duration;

use common::operations::{By, Insert, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, session},
        User,
    },
    infra::{
        cache::{self, Entry},
        database, Cache, Database,
    },
    Service,
};

use super::Command;

/// [`Command`] for issuing a one-time [`AuthCode`] redeemable for a session
/// of the [`User`].
///
/// The code is safe to pass across origins through a URL: it's opaque,
/// short-lived and consumed by the first redemption.
///
/// [`AuthCode`]: session::AuthCode
#[derive(Clone, Copy, Debug)]
pub struct IssueAuthCode {
    /// ID of the [`User`] to issue the [`AuthCode`] for.
    ///
    /// [`AuthCode`]: session::AuthCode
    pub user_id: user::Id,

    /// [`session::Lifetime`] of the session the [`AuthCode`] grants.
    ///
    /// [`AuthCode`]: session::AuthCode
    pub lifetime: session::Lifetime,
}

/// Output of [`IssueAuthCode`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Issued [`AuthCode`].
    ///
    /// [`AuthCode`]: session::AuthCode
    pub code: session::AuthCode,

    /// [`Duration`] the [`AuthCode`] stays redeemable for.
    ///
    /// [`AuthCode`]: session::AuthCode
    pub expires_in: Duration,
}

impl<Db, C> Command<IssueAuthCode> for Service<Db, C>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
    C: Cache<
        Insert<Entry<session::AuthCode, session::Grant>>,
        Ok = (),
        Err = Traced<cache::Error>,
    >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: IssueAuthCode) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let IssueAuthCode { user_id, lifetime } = cmd;

        drop(
            self.database()
                .execute(Select(By::new(user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::UserNotExists(user_id))
                .map_err(tracerr::wrap!())?,
        );

        let code = session::AuthCode::generate()
            .map_err(tracerr::from_and_wrap!(=> E))?;
        let expires_in = self.config().temporary_ttl;

        self.cache()
            .execute(Insert(Entry {
                key: code.clone(),
                value: session::Grant { user_id, lifetime },
                ttl: expires_in,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(Output { code, expires_in })
    }
}

/// Error of [`IssueAuthCode`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Cache`] error.
    #[display("`Cache` operation failed: {_0}")]
    Cache(cache::Error),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Failed to generate an [`AuthCode`].
    ///
    /// [`AuthCode`]: session::AuthCode
    #[display("Failed to generate an `AuthCode`: {_0}")]
    Generation(session::GenerationError),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}
