//! [`User`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    query::rankings,
};

/// Columns of the `users` table, in the order [`from_row`] expects them.
pub(super) const COLUMNS: &str = "\
    id, email, display_name, password_hash, \
    rating, guest, admin, provider, \
    created_at, updated_at";

/// Reconstructs a [`User`] out of a `users` table [`Row`].
pub(super) fn from_row(row: &Row) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        display_name: row.get("display_name"),
        password_hash: row.get("password_hash"),
        rating: row.get("rating"),
        guest: row.get("guest"),
        admin: row.get("admin"),
        provider: row.get("provider"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Select<By<Option<User>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM users \
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

impl<'e, C> Database<Select<By<Option<User>, &'e user::Email>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'e user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM users \
             WHERE email = $1::VARCHAR \
             LIMIT 1",
        );
        Ok(self
            .query_opt(&sql, &[email])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| from_row(&row)))
    }
}

impl<C> Database<Insert<user::NewUser>> for Postgres<C>
where
    C: Connection,
{
    type Ok = User;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(new): Insert<user::NewUser>,
    ) -> Result<Self::Ok, Self::Err> {
        let user::NewUser {
            email,
            display_name,
            password_hash,
            rating,
            guest,
            admin,
            provider,
            created_at,
            updated_at,
        } = new;

        let sql = format!(
            "INSERT INTO users (\
                 email, display_name, password_hash, \
                 rating, guest, admin, provider, \
                 created_at, updated_at\
             ) \
             VALUES (\
                 $1::VARCHAR, $2::VARCHAR, $3::VARCHAR, \
                 $4::INT4, $5::BOOL, $6::BOOL, $7::VARCHAR, \
                 $8::TIMESTAMPTZ, $9::TIMESTAMPTZ\
             ) \
             RETURNING {COLUMNS}",
        );
        let row = self
            .query_opt(
                &sql,
                &[
                    &email,
                    &display_name,
                    &password_hash,
                    &rating,
                    &guest,
                    &admin,
                    &provider,
                    &created_at,
                    &updated_at,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?
            .expect("`INSERT .. RETURNING` always yields a row");
        Ok(from_row(&row))
    }
}

impl<C> Database<Insert<By<User, user::NewUser>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = User;
    type Err = Traced<database::Error>;

    /// Upserts the [`user::NewUser`] keyed by its [`user::Email`].
    ///
    /// An already existing [`User`] keeps their password and guest flag,
    /// while profile fields are refreshed from the [`user::NewUser`].
    async fn execute(
        &self,
        Insert(by): Insert<By<User, user::NewUser>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user::NewUser {
            email,
            display_name,
            password_hash,
            rating,
            guest,
            admin,
            provider,
            created_at,
            updated_at,
        } = by.into_inner();

        let sql = format!(
            "INSERT INTO users (\
                 email, display_name, password_hash, \
                 rating, guest, admin, provider, \
                 created_at, updated_at\
             ) \
             VALUES (\
                 $1::VARCHAR, $2::VARCHAR, $3::VARCHAR, \
                 $4::INT4, $5::BOOL, $6::BOOL, $7::VARCHAR, \
                 $8::TIMESTAMPTZ, $9::TIMESTAMPTZ\
             ) \
             ON CONFLICT (email) DO UPDATE \
             SET display_name = \
                     COALESCE(EXCLUDED.display_name, users.display_name), \
                 rating = EXCLUDED.rating, \
                 admin = EXCLUDED.admin, \
                 provider = COALESCE(EXCLUDED.provider, users.provider), \
                 created_at = LEAST(users.created_at, EXCLUDED.created_at), \
                 updated_at = EXCLUDED.updated_at \
             RETURNING {COLUMNS}",
        );
        let row = self
            .query_opt(
                &sql,
                &[
                    &email,
                    &display_name,
                    &password_hash,
                    &rating,
                    &guest,
                    &admin,
                    &provider,
                    &created_at,
                    &updated_at,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?
            .expect("`INSERT .. RETURNING` always yields a row");
        Ok(from_row(&row))
    }
}

impl<C> Database<Update<User>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let User {
            id,
            email,
            display_name,
            password_hash,
            rating,
            guest,
            admin,
            provider,
            created_at: _,
            updated_at,
        } = user;

        const SQL: &str = "\
            UPDATE users \
            SET email = $2::VARCHAR, \
                display_name = $3::VARCHAR, \
                password_hash = $4::VARCHAR, \
                rating = $5::INT4, \
                guest = $6::BOOL, \
                admin = $7::BOOL, \
                provider = $8::VARCHAR, \
                updated_at = $9::TIMESTAMPTZ \
            WHERE id = $1::INT4";
        self.exec(
            SQL,
            &[
                &id,
                &email,
                &display_name,
                &password_hash,
                &rating,
                &guest,
                &admin,
                &provider,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Select<By<Vec<User>, rankings::Top>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<User>, rankings::Top>>,
    ) -> Result<Self::Ok, Self::Err> {
        let rankings::Top { limit, offset } = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM users \
             WHERE NOT guest \
             ORDER BY rating DESC, id ASC \
             LIMIT $1::INT8 OFFSET $2::INT8",
        );
        Ok(self
            .query(&sql, &[&limit, &offset])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Option<rankings::Rank>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<rankings::Rank>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<rankings::Rank>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        // Ties are broken by the smaller ID, matching the `Top` ordering.
        const SQL: &str = "\
            SELECT 1 + (\
                       SELECT COUNT(*) \
                       FROM users AS o \
                       WHERE NOT o.guest \
                         AND (o.rating > u.rating \
                              OR (o.rating = u.rating AND o.id < u.id))\
                   ) AS rank \
            FROM users AS u \
            WHERE u.id = $1::INT4";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| row.get::<_, i64>("rank").into()))
    }
}
