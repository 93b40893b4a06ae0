//! [`Command`] for deleting a [`User`]'s session record.
//!
//! [`User`]: crate::domain::User

use common::operations::Delete;
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::user,
    infra::{
        cache::{self, SessionOf},
        Cache,
    },
    Service,
};

use super::Command;

/// [`Command`] for deleting the active session record of a [`User`].
///
/// Outstanding tokens stay valid until their expiry, this only drops the
/// server-side record.
///
/// [`User`]: crate::domain::User
#[derive(Clone, Copy, Debug, From)]
pub struct DeleteUserSession {
    /// ID of the [`User`] whose session record to delete.
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,
}

impl<Db, C> Command<DeleteUserSession> for Service<Db, C>
where
    C: Cache<Delete<SessionOf>, Ok = (), Err = Traced<cache::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteUserSession { user_id } = cmd;

        self.cache()
            .execute(Delete(SessionOf(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`DeleteUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Cache`] error.
    #[display("`Cache` operation failed: {_0}")]
    Cache(cache::Error),
}
