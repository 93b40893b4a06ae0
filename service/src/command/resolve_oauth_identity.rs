//! [`Command`] for resolving an external OAuth identity into a [`User`].

use common::{
    operations::{By, Insert, Select, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{oauth, user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] resolving an [`oauth::Profile`] into the [`User`] it belongs
/// to, creating the [`User`] on their first sign-in.
///
/// Resolution is idempotent: repeated sign-ins with the same provider account
/// always land on the same [`User`].
#[derive(Clone, Debug, From)]
pub struct ResolveOauthIdentity {
    /// [`oauth::Profile`] reported by the provider.
    pub profile: oauth::Profile,
}

impl<Db, C> Command<ResolveOauthIdentity> for Service<Db, C>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'e> Database<
            Select<By<Option<User>, &'e user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'p, 'u> Database<
            Select<
                By<
                    Option<oauth::Identity>,
                    (&'p oauth::Provider, &'u oauth::Uid),
                >,
            >,
            Ok = Option<oauth::Identity>,
            Err = Traced<database::Error>,
        > + Database<
            Insert<oauth::NewIdentity>,
            Ok = oauth::Identity,
            Err = Traced<database::Error>,
        > + Database<
            Insert<oauth::NewAccount>,
            Ok = (User, oauth::Identity),
            Err = Traced<database::Error>,
        > + Database<
            Update<oauth::Identity>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<User>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ResolveOauthIdentity,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ResolveOauthIdentity { profile } = cmd;

        let identity = self
            .database()
            .execute(Select(By::new((&profile.provider, &profile.uid))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if let Some(identity) = identity {
            let user = self
                .database()
                .execute(Select(By::new(identity.user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::UserNotExists(identity.user_id))
                .map_err(tracerr::wrap!())?;
            self.refresh_identity_email(identity, &profile.email).await?;
            return self.refresh_user(user, &profile).await;
        }

        let user = self
            .database()
            .execute(Select(By::new(&profile.email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if let Some(user) = user {
            self.link_identity(&user, &profile).await?;
            return self.refresh_user(user, &profile).await;
        }

        let now = DateTime::now();
        let (user, identity) = self
            .database()
            .execute(Insert(oauth::NewAccount {
                user: user::NewUser {
                    email: profile.email,
                    display_name: profile.name,
                    password_hash: None,
                    rating: user::Rating::DEFAULT,
                    guest: false,
                    admin: false,
                    provider: Some(profile.provider.clone()),
                    created_at: now.coerce(),
                    updated_at: now.coerce(),
                },
                provider: profile.provider,
                uid: profile.uid,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        log::info!(
            "created `User(id: {})` on their first `{}` sign-in",
            user.id,
            identity.provider,
        );
        Ok(user)
    }
}

impl<Db, C> Service<Db, C>
where
    Db: Database<
            Insert<oauth::NewIdentity>,
            Ok = oauth::Identity,
            Err = Traced<database::Error>,
        > + Database<
            Update<oauth::Identity>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<User>, Ok = (), Err = Traced<database::Error>>,
{
    /// Links the provider account of the [`oauth::Profile`] to the [`User`].
    ///
    /// A concurrent sign-in may have linked it already, which counts as
    /// success.
    async fn link_identity(
        &self,
        user: &User,
        profile: &oauth::Profile,
    ) -> Result<(), Traced<ExecutionError>> {
        let now = DateTime::now();
        match self
            .database()
            .execute(Insert(oauth::NewIdentity {
                user_id: user.id,
                provider: profile.provider.clone(),
                uid: profile.uid.clone(),
                email: profile.email.clone(),
                created_at: now.coerce(),
                updated_at: now.coerce(),
            }))
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if e.as_ref().is_unique_violation(None) => Ok(()),
            Err(e) => {
                Err(e).map_err(tracerr::map_from_and_wrap!(=> ExecutionError))
            }
        }
    }

    /// Refreshes the cached [`Email`] of the [`oauth::Identity`] when the
    /// provider reports a new one.
    ///
    /// [`Email`]: user::Email
    async fn refresh_identity_email(
        &self,
        mut identity: oauth::Identity,
        email: &user::Email,
    ) -> Result<(), Traced<ExecutionError>> {
        if identity.email == *email {
            return Ok(());
        }

        identity.email = email.clone();
        identity.updated_at = DateTime::now().coerce();
        self.database()
            .execute(Update(identity))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))
    }

    /// Stamps the [`User`] with the provider they authenticated through and
    /// the [`Email`] the provider reports, if either changed.
    ///
    /// When the reported [`Email`] already belongs to another account, the
    /// [`User`] keeps their current one.
    ///
    /// [`Email`]: user::Email
    async fn refresh_user(
        &self,
        mut user: User,
        profile: &oauth::Profile,
    ) -> Result<User, Traced<ExecutionError>> {
        let provider_changed =
            user.provider.as_ref() != Some(&profile.provider);
        let email_changed = user.email != profile.email;
        if !provider_changed && !email_changed {
            return Ok(user);
        }

        let current_email = user.email.clone();
        user.provider = Some(profile.provider.clone());
        user.email = profile.email.clone();
        user.updated_at = DateTime::now().coerce();

        match self.database().execute(Update(user.clone())).await {
            Ok(()) => Ok(user),
            Err(e) if email_changed && e.as_ref().is_unique_violation(None) => {
                user.email = current_email;
                self.database()
                    .execute(Update(user.clone()))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))?;
                Ok(user)
            }
            Err(e) => {
                Err(e).map_err(tracerr::map_from_and_wrap!(=> ExecutionError))
            }
        }
    }
}

/// Error of [`ResolveOauthIdentity`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] an [`oauth::Identity`] points at does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}
