//! [`Command`] for starting a [`TypingMatch`].

use common::{
    operations::{By, Insert, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{battle, user, TypingMatch, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for starting a new [`TypingMatch`].
#[derive(Clone, Copy, Debug)]
pub struct StartBattle {
    /// ID of the [`User`] starting the [`TypingMatch`].
    pub user_id: user::Id,

    /// ID of the opponent [`User`], if any.
    pub enemy_user_id: Option<user::Id>,
}

impl<Db, C> Command<StartBattle> for Service<Db, C>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Insert<battle::NewMatch>,
            Ok = TypingMatch,
            Err = Traced<database::Error>,
        >,
{
    type Ok = TypingMatch;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: StartBattle) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let StartBattle {
            user_id,
            enemy_user_id,
        } = cmd;

        for id in [Some(user_id), enemy_user_id].into_iter().flatten() {
            drop(
                self.database()
                    .execute(Select(By::new(id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::UserNotExists(id))
                    .map_err(tracerr::wrap!())?,
            );
        }

        let now = DateTime::now();
        self.database()
            .execute(Insert(battle::NewMatch {
                user_id,
                enemy_user_id,
                created_at: now.coerce(),
                updated_at: now.coerce(),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`StartBattle`] [`Command`] execution.
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
