//! [`TypingMatch`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{battle, TypingMatch},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    query,
};

/// Columns of the `typing_matches` table, in the order [`from_row`] expects
/// them.
const COLUMNS: &str = "\
    id, user_id, enemy_user_id, \
    score, accuracy, type_speed, miss_count, battle_time, \
    status, created_at, updated_at";

/// Reconstructs a [`TypingMatch`] out of a `typing_matches` table [`Row`].
fn from_row(row: &Row) -> TypingMatch {
    TypingMatch {
        id: row.get("id"),
        user_id: row.get("user_id"),
        enemy_user_id: row.get("enemy_user_id"),
        score: row.get("score"),
        accuracy: row.get("accuracy"),
        type_speed: row.get("type_speed"),
        miss_count: row.get("miss_count"),
        battle_time: row.get("battle_time"),
        status: row.get("status"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Insert<battle::NewMatch>> for Postgres<C>
where
    C: Connection,
{
    type Ok = TypingMatch;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(new): Insert<battle::NewMatch>,
    ) -> Result<Self::Ok, Self::Err> {
        let battle::NewMatch {
            user_id,
            enemy_user_id,
            created_at,
            updated_at,
        } = new;

        let sql = format!(
            "INSERT INTO typing_matches (\
                 user_id, enemy_user_id, created_at, updated_at\
             ) \
             VALUES (\
                 $1::INT4, $2::INT4, $3::TIMESTAMPTZ, $4::TIMESTAMPTZ\
             ) \
             RETURNING {COLUMNS}",
        );
        let row = self
            .query_opt(&sql, &[&user_id, &enemy_user_id, &created_at, &updated_at])
            .await
            .map_err(tracerr::wrap!())?
            .expect("`INSERT .. RETURNING` always yields a row");
        Ok(from_row(&row))
    }
}

impl<C> Database<Lock<By<TypingMatch, battle::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<TypingMatch, battle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM typing_matches \
            WHERE id = $1::INT4 \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<Option<TypingMatch>, battle::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<TypingMatch>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<TypingMatch>, battle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM typing_matches \
             WHERE id = $1::INT4 \
             LIMIT 1",
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| from_row(&row)))
    }
}

impl<C> Database<Update<TypingMatch>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(m): Update<TypingMatch>,
    ) -> Result<Self::Ok, Self::Err> {
        let TypingMatch {
            id,
            user_id: _,
            enemy_user_id,
            score,
            accuracy,
            type_speed,
            miss_count,
            battle_time,
            status,
            created_at: _,
            updated_at,
        } = m;

        const SQL: &str = "\
            UPDATE typing_matches \
            SET enemy_user_id = $2::INT4, \
                score = $3::INT4, \
                accuracy = $4::FLOAT8, \
                type_speed = $5::FLOAT8, \
                miss_count = $6::INT4, \
                battle_time = $7::FLOAT8, \
                status = $8::INT2, \
                updated_at = $9::TIMESTAMPTZ \
            WHERE id = $1::INT4";
        self.exec(
            SQL,
            &[
                &id,
                &enemy_user_id,
                &score,
                &accuracy,
                &type_speed,
                &miss_count,
                &battle_time,
                &status,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Select<By<Vec<TypingMatch>, query::battle::History>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<TypingMatch>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<TypingMatch>, query::battle::History>>,
    ) -> Result<Self::Ok, Self::Err> {
        let query::battle::History { user_id, limit } = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM typing_matches \
             WHERE user_id = $1::INT4 OR enemy_user_id = $1::INT4 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2::INT8",
        );
        Ok(self
            .query(&sql, &[&user_id, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}
