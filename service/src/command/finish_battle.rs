//! [`Command`] for finishing a [`TypingMatch`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{battle, user, TypingMatch},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for finishing a [`TypingMatch`] with its final results.
///
/// Only the [`User`] who plays the [`TypingMatch`] may finish it, and only
/// once.
///
/// [`User`]: crate::domain::User
#[derive(Clone, Copy, Debug)]
pub struct FinishBattle {
    /// ID of the [`TypingMatch`] to finish.
    pub id: battle::Id,

    /// ID of the [`User`] reporting the results.
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,

    /// Final results of the [`TypingMatch`].
    pub outcome: battle::Outcome,
}

impl<Db, C> Command<FinishBattle> for Service<Db, C>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<TypingMatch, battle::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<TypingMatch>, battle::Id>>,
            Ok = Option<TypingMatch>,
            Err = Traced<database::Error>,
        > + Database<
            Update<TypingMatch>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = TypingMatch;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: FinishBattle) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let FinishBattle {
            id,
            user_id,
            outcome,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent finishes of the same `TypingMatch`.
        tx.execute(Lock(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut m = tx
            .execute(Select(By::<Option<TypingMatch>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::MatchNotExists(id))
            .map_err(tracerr::wrap!())?;

        if m.user_id != user_id {
            return Err(tracerr::new!(E::NotParticipant));
        }
        if m.status == battle::Status::Finished {
            return Err(tracerr::new!(E::AlreadyFinished(id)));
        }

        let battle::Outcome {
            score,
            accuracy,
            type_speed,
            miss_count,
            battle_time,
        } = outcome;
        m.score = score;
        m.accuracy = accuracy;
        m.type_speed = type_speed;
        m.miss_count = miss_count;
        m.battle_time = battle_time;
        m.status = battle::Status::Finished;
        m.updated_at = DateTime::now().coerce();

        tx.execute(Update(m.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(m)
    }
}

/// Error of [`FinishBattle`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`TypingMatch`] has been finished already.
    #[display("`TypingMatch(id: {_0})` has been finished already")]
    #[from(ignore)]
    AlreadyFinished(#[error(not(source))] battle::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`TypingMatch`] with the provided ID does not exist.
    #[display("`TypingMatch(id: {_0})` does not exist")]
    #[from(ignore)]
    MatchNotExists(#[error(not(source))] battle::Id),

    /// Reporting [`User`] doesn't play the [`TypingMatch`].
    ///
    /// [`User`]: crate::domain::User
    #[display("`User` doesn't play the `TypingMatch`")]
    NotParticipant,
}
