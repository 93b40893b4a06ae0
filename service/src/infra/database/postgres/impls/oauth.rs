//! OAuth [`Identity`]-related [`Database`] implementations.
//!
//! [`Identity`]: oauth::Identity

use common::operations::{By, Insert, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{oauth, User},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Columns of the `oauth_identities` table, in the order [`from_row`] expects
/// them.
const COLUMNS: &str =
    "id, user_id, provider, uid, email, created_at, updated_at";

/// Reconstructs an [`oauth::Identity`] out of an `oauth_identities` table
/// [`Row`].
fn from_row(row: &Row) -> oauth::Identity {
    oauth::Identity {
        id: row.get("id"),
        user_id: row.get("user_id"),
        provider: row.get("provider"),
        uid: row.get("uid"),
        email: row.get("email"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<'p, 'u, C>
    Database<
        Select<
            By<Option<oauth::Identity>, (&'p oauth::Provider, &'u oauth::Uid)>,
        >,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<oauth::Identity>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<oauth::Identity>, (&'p oauth::Provider, &'u oauth::Uid)>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let (provider, uid) = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM oauth_identities \
             WHERE provider = $1::VARCHAR \
               AND uid = $2::VARCHAR \
             LIMIT 1",
        );
        Ok(self
            .query_opt(&sql, &[provider, uid])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| from_row(&row)))
    }
}

impl<C> Database<Insert<oauth::NewIdentity>> for Postgres<C>
where
    C: Connection,
{
    type Ok = oauth::Identity;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(new): Insert<oauth::NewIdentity>,
    ) -> Result<Self::Ok, Self::Err> {
        let oauth::NewIdentity {
            user_id,
            provider,
            uid,
            email,
            created_at,
            updated_at,
        } = new;

        let sql = format!(
            "INSERT INTO oauth_identities (\
                 user_id, provider, uid, email, created_at, updated_at\
             ) \
             VALUES (\
                 $1::INT4, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, \
                 $5::TIMESTAMPTZ, $6::TIMESTAMPTZ\
             ) \
             RETURNING {COLUMNS}",
        );
        let row = self
            .query_opt(
                &sql,
                &[&user_id, &provider, &uid, &email, &created_at, &updated_at],
            )
            .await
            .map_err(tracerr::wrap!())?
            .expect("`INSERT .. RETURNING` always yields a row");
        Ok(from_row(&row))
    }
}

impl<C> Database<Update<oauth::Identity>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(identity): Update<oauth::Identity>,
    ) -> Result<Self::Ok, Self::Err> {
        let oauth::Identity {
            id,
            user_id: _,
            provider: _,
            uid: _,
            email,
            created_at: _,
            updated_at,
        } = identity;

        const SQL: &str = "\
            UPDATE oauth_identities \
            SET email = $2::VARCHAR, \
                updated_at = $3::TIMESTAMPTZ \
            WHERE id = $1::INT4";
        self.exec(SQL, &[&id, &email, &updated_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Insert<oauth::NewAccount>> for Postgres<C>
where
    C: Connection,
{
    type Ok = (User, oauth::Identity);
    type Err = Traced<database::Error>;

    /// Creates the [`User`] and the [`oauth::Identity`] linking them to the
    /// provider account in a single atomic statement.
    async fn execute(
        &self,
        Insert(new): Insert<oauth::NewAccount>,
    ) -> Result<Self::Ok, Self::Err> {
        let oauth::NewAccount {
            user,
            provider,
            uid,
        } = new;

        const SQL: &str = "\
            WITH created_user AS (\
                INSERT INTO users (\
                    email, display_name, password_hash, \
                    rating, guest, admin, provider, \
                    created_at, updated_at\
                ) \
                VALUES (\
                    $1::VARCHAR, $2::VARCHAR, $3::VARCHAR, \
                    $4::INT4, $5::BOOL, $6::BOOL, $7::VARCHAR, \
                    $8::TIMESTAMPTZ, $9::TIMESTAMPTZ\
                ) \
                RETURNING id, email, display_name, password_hash, \
                          rating, guest, admin, provider, \
                          created_at, updated_at\
            ), created_identity AS (\
                INSERT INTO oauth_identities (\
                    user_id, provider, uid, email, created_at, updated_at\
                ) \
                SELECT id, $10::VARCHAR, $11::VARCHAR, email, \
                       created_at, updated_at \
                FROM created_user \
                RETURNING id, user_id, provider, uid, email, \
                          created_at, updated_at\
            ) \
            SELECT u.id, u.email, u.display_name, u.password_hash, \
                   u.rating, u.guest, u.admin, u.provider, \
                   u.created_at, u.updated_at, \
                   i.id AS identity_id, \
                   i.provider AS identity_provider, \
                   i.uid, \
                   i.email AS identity_email, \
                   i.created_at AS identity_created_at, \
                   i.updated_at AS identity_updated_at \
            FROM created_user AS u, created_identity AS i";
        let row = self
            .query_opt(
                SQL,
                &[
                    &user.email,
                    &user.display_name,
                    &user.password_hash,
                    &user.rating,
                    &user.guest,
                    &user.admin,
                    &user.provider,
                    &user.created_at,
                    &user.updated_at,
                    &provider,
                    &uid,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?
            .expect("`INSERT .. RETURNING` always yields a row");

        let created = super::user::from_row(&row);
        Ok((
            created,
            oauth::Identity {
                id: row.get("identity_id"),
                user_id: row.get("id"),
                provider: row.get("identity_provider"),
                uid: row.get("uid"),
                email: row.get("identity_email"),
                created_at: row.get("identity_created_at"),
                updated_at: row.get("identity_updated_at"),
            },
        ))
    }
}
