//! [`Command`] for updating a [`User`]'s [`Rating`].
//!
//! [`Rating`]: user::Rating

use common::{
    operations::{By, Select, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating the [`Rating`] of a [`User`].
///
/// [`Rating`]: user::Rating
#[derive(Clone, Copy, Debug)]
pub struct UpdateUserRating {
    /// ID of the [`User`] whose [`Rating`] to update.
    ///
    /// [`Rating`]: user::Rating
    pub user_id: user::Id,

    /// New [`Rating`] of the [`User`].
    ///
    /// [`Rating`]: user::Rating
    pub rating: user::Rating,
}

impl<Db, C> Command<UpdateUserRating> for Service<Db, C>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Update<User>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateUserRating,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateUserRating { user_id, rating } = cmd;

        let mut user = self
            .database()
            .execute(Select(By::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        user.rating = rating;
        user.updated_at = DateTime::now().coerce();

        self.database()
            .execute(Update(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(user)
    }
}

/// Error of [`UpdateUserRating`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}
