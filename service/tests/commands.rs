//! [`Command`] execution against in-memory infrastructure.
//!
//! [`Command`]: service::Command

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use common::{
    operations::{By, Commit, Consume, Delete, Insert, Lock, Select, Take,
        Transact, Update},
    DateTime, Handler,
};
use secrecy::SecretBox;
use serde::{de::DeserializeOwned, Serialize};
use service::{
    command::{
        bridge_legacy_session, create_user_session, finish_battle,
        redeem_auth_code, AuthorizeUserSession, BridgeLegacySession, Command,
        CreateUserSession, DeleteUserSession, FinishBattle, IssueAuthCode,
        IssueLegacyToken, RedeemAuthCode, ResolveOauthIdentity, StartBattle,
        UpdateUserRating,
    },
    domain::{
        battle, oauth,
        user::{self, session},
        TypingMatch, User,
    },
    infra::{
        cache::{self, Entry, Key},
        database,
    },
    Service,
};
use tracerr::Traced;

/// In-memory database fake.
#[derive(Clone, Debug, Default)]
struct FakeDb {
    users: Arc<Mutex<Vec<User>>>,
    identities: Arc<Mutex<Vec<oauth::Identity>>>,
    matches: Arc<Mutex<Vec<TypingMatch>>>,
}

impl FakeDb {
    fn insert_user(&self, new: user::NewUser) -> User {
        let mut users = self.users.lock().unwrap();
        let user = User {
            id: i32::try_from(users.len() + 1).unwrap().into(),
            email: new.email,
            display_name: new.display_name,
            password_hash: new.password_hash,
            rating: new.rating,
            guest: new.guest,
            admin: new.admin,
            provider: new.provider,
            created_at: new.created_at,
            updated_at: new.updated_at,
        };
        users.push(user.clone());
        user
    }

    fn insert_identity(&self, new: oauth::NewIdentity) -> oauth::Identity {
        let mut identities = self.identities.lock().unwrap();
        let identity = oauth::Identity {
            id: i32::try_from(identities.len() + 1).unwrap().into(),
            user_id: new.user_id,
            provider: new.provider,
            uid: new.uid,
            email: new.email,
            created_at: new.created_at,
            updated_at: new.updated_at,
        };
        identities.push(identity.clone());
        identity
    }
}

impl Handler<Select<By<Option<User>, user::Id>>> for FakeDb {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }
}

impl<'e> Handler<Select<By<Option<User>, &'e user::Email>>> for FakeDb {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'e user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == *email)
            .cloned())
    }
}

impl Handler<Insert<user::NewUser>> for FakeDb {
    type Ok = User;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(new): Insert<user::NewUser>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.insert_user(new))
    }
}

impl Handler<Insert<By<User, user::NewUser>>> for FakeDb {
    type Ok = User;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(by): Insert<By<User, user::NewUser>>,
    ) -> Result<Self::Ok, Self::Err> {
        let new = by.into_inner();

        let existing = self
            .users
            .lock()
            .unwrap()
            .iter_mut()
            .find(|u| u.email == new.email)
            .map(|u| {
                if new.display_name.is_some() {
                    u.display_name = new.display_name.clone();
                }
                u.rating = new.rating;
                u.admin = new.admin;
                if new.provider.is_some() {
                    u.provider = new.provider.clone();
                }
                u.created_at = u.created_at.min(new.created_at);
                u.updated_at = new.updated_at;
                u.clone()
            });

        Ok(match existing {
            Some(user) => user,
            None => self.insert_user(new),
        })
    }
}

impl Handler<Update<User>> for FakeDb {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut users = self.users.lock().unwrap();
        if let Some(u) = users.iter_mut().find(|u| u.id == user.id) {
            *u = user;
        }
        Ok(())
    }
}

impl<'p, 'u> Handler<
    Select<By<Option<oauth::Identity>, (&'p oauth::Provider, &'u oauth::Uid)>>,
> for FakeDb
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
        Ok(self
            .identities
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.provider == *provider && i.uid == *uid)
            .cloned())
    }
}

impl Handler<Update<oauth::Identity>> for FakeDb {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(identity): Update<oauth::Identity>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut identities = self.identities.lock().unwrap();
        if let Some(i) = identities.iter_mut().find(|i| i.id == identity.id) {
            *i = identity;
        }
        Ok(())
    }
}

impl Handler<Insert<oauth::NewIdentity>> for FakeDb {
    type Ok = oauth::Identity;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(new): Insert<oauth::NewIdentity>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.insert_identity(new))
    }
}

impl Handler<Insert<oauth::NewAccount>> for FakeDb {
    type Ok = (User, oauth::Identity);
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(new): Insert<oauth::NewAccount>,
    ) -> Result<Self::Ok, Self::Err> {
        let user = self.insert_user(new.user);
        let identity = self.insert_identity(oauth::NewIdentity {
            user_id: user.id,
            provider: new.provider,
            uid: new.uid,
            email: user.email.clone(),
            created_at: user.created_at.coerce(),
            updated_at: user.updated_at.coerce(),
        });
        Ok((user, identity))
    }
}

impl Handler<Insert<battle::NewMatch>> for FakeDb {
    type Ok = TypingMatch;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(new): Insert<battle::NewMatch>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut matches = self.matches.lock().unwrap();
        let m = TypingMatch {
            id: i32::try_from(matches.len() + 1).unwrap().into(),
            user_id: new.user_id,
            enemy_user_id: new.enemy_user_id,
            score: 0,
            accuracy: 0.0,
            type_speed: 0.0,
            miss_count: 0,
            battle_time: 0.0,
            status: battle::Status::Started,
            created_at: new.created_at,
            updated_at: new.updated_at,
        };
        matches.push(m.clone());
        Ok(m)
    }
}

impl Handler<Select<By<Option<TypingMatch>, battle::Id>>> for FakeDb {
    type Ok = Option<TypingMatch>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<TypingMatch>, battle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .matches
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }
}

impl Handler<Lock<By<TypingMatch, battle::Id>>> for FakeDb {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<TypingMatch, battle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Handler<Update<TypingMatch>> for FakeDb {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(m): Update<TypingMatch>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut matches = self.matches.lock().unwrap();
        if let Some(stored) = matches.iter_mut().find(|s| s.id == m.id) {
            *stored = m;
        }
        Ok(())
    }
}

impl Handler<Transact> for FakeDb {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Handler<Commit> for FakeDb {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

/// In-memory cache fake.
#[derive(Clone, Debug, Default)]
struct FakeCache {
    store: Arc<Mutex<HashMap<String, String>>>,
}

impl FakeCache {
    fn contains(&self, key: &str) -> bool {
        self.store.lock().unwrap().contains_key(key)
    }
}

impl<K, V> Handler<Insert<Entry<K, V>>> for FakeCache
where
    K: Key + Send,
    V: Serialize + Send,
{
    type Ok = ();
    type Err = Traced<cache::Error>;

    async fn execute(
        &self,
        Insert(entry): Insert<Entry<K, V>>,
    ) -> Result<Self::Ok, Self::Err> {
        let payload = serde_json::to_string(&entry.value).unwrap();
        drop(self.store.lock().unwrap().insert(entry.key.render(), payload));
        Ok(())
    }
}

impl<K, V> Handler<Take<By<Option<V>, K>>> for FakeCache
where
    K: Key + Send,
    V: DeserializeOwned,
{
    type Ok = Option<V>;
    type Err = Traced<cache::Error>;

    async fn execute(
        &self,
        Take(by): Take<By<Option<V>, K>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .store
            .lock()
            .unwrap()
            .remove(&by.into_inner().render())
            .map(|payload| serde_json::from_str(&payload).unwrap()))
    }
}

impl<K> Handler<Consume<Entry<K>>> for FakeCache
where
    K: Key + Send,
{
    type Ok = bool;
    type Err = Traced<cache::Error>;

    async fn execute(
        &self,
        Consume(entry): Consume<Entry<K>>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut store = self.store.lock().unwrap();
        let key = entry.key.render();
        if store.contains_key(&key) {
            return Ok(false);
        }
        drop(store.insert(key, "1".into()));
        Ok(true)
    }
}

impl<K> Handler<Delete<K>> for FakeCache
where
    K: Key + Send,
{
    type Ok = ();
    type Err = Traced<cache::Error>;

    async fn execute(&self, Delete(key): Delete<K>) -> Result<Self::Ok, Self::Err> {
        drop(self.store.lock().unwrap().remove(&key.render()));
        Ok(())
    }
}

const SECRET: &[u8] = b"test-secret";
const LEGACY_SECRET: &[u8] = b"legacy-test-secret";

fn test_config() -> service::Config {
    service::Config {
        jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(SECRET),
        jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(SECRET),
        legacy_decoding_key: jsonwebtoken::DecodingKey::from_secret(
            LEGACY_SECRET,
        ),
        legacy_encoding_key: jsonwebtoken::EncodingKey::from_secret(
            LEGACY_SECRET,
        ),
        issuer: "typing-platform".into(),
        audience: "typing-platform-web".into(),
        session_ttl: Duration::from_secs(60 * 60),
        legacy_session_ttl: Duration::from_secs(60 * 60 * 24 * 7),
        temporary_ttl: Duration::from_secs(60 * 5),
        session_record_ttl: Duration::from_secs(60 * 60 * 24),
        replay_ttl: Duration::from_secs(60 * 60 * 24),
    }
}

type TestService = Service<FakeDb, FakeCache>;

fn test_service() -> (TestService, FakeDb, FakeCache) {
    let db = FakeDb::default();
    let cache = FakeCache::default();
    (Service::new(test_config(), db.clone(), cache.clone()), db, cache)
}

fn seed_user(db: &FakeDb, email: &str, password: &str) -> User {
    let password = user::Password::new(password).unwrap();
    let now = DateTime::now();
    db.insert_user(user::NewUser {
        email: email.parse().unwrap(),
        display_name: Some("Player One".parse().unwrap()),
        password_hash: Some(user::PasswordHash::new(&password).unwrap()),
        rating: user::Rating::DEFAULT,
        guest: false,
        admin: false,
        provider: None,
        created_at: now.coerce(),
        updated_at: now.coerce(),
    })
}

fn secret(password: &str) -> SecretBox<user::Password> {
    SecretBox::new(Box::new(user::Password::new(password).unwrap()))
}

#[tokio::test]
async fn login_rejects_wrong_credentials() {
    let (service, db, _) = test_service();
    drop(seed_user(&db, "alice@example.com", "correct horse"));

    let err = service
        .execute(CreateUserSession::ByCredentials {
            email: "alice@example.com".parse().unwrap(),
            password: secret("battery staple"),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        create_user_session::ExecutionError::WrongCredentials,
    ));

    let err = service
        .execute(CreateUserSession::ByCredentials {
            email: "nobody@example.com".parse().unwrap(),
            password: secret("correct horse"),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        create_user_session::ExecutionError::WrongCredentials,
    ));
}

#[tokio::test]
async fn login_session_authorizes_back_to_the_same_user() {
    let (service, db, cache) = test_service();
    let user = seed_user(&db, "alice@example.com", "correct horse");

    let out = service
        .execute(CreateUserSession::ByCredentials {
            email: "alice@example.com".parse().unwrap(),
            password: secret("correct horse"),
        })
        .await
        .unwrap();
    assert!(cache.contains(&format!("session:{}", user.id)));

    let authorized = service
        .execute(AuthorizeUserSession {
            token: out.token.clone(),
        })
        .await
        .unwrap();
    assert_eq!(authorized.user.id, user.id);
    assert_eq!(authorized.claims.user_id, user.id);
    assert_eq!(authorized.claims.email, user.email);
    assert_eq!(authorized.claims.rating, user.rating);
    assert_eq!(authorized.claims.issuer, "typing-platform");
    assert_eq!(authorized.claims.audience, "typing-platform-web");
    // `exp` survives the whole-seconds round-trip through the token.
    assert_eq!(authorized.claims.expires_at, out.expires_at);
}

#[tokio::test]
async fn authorization_rejects_expired_tokens() {
    let (service, db, _) = test_service();
    let user = seed_user(&db, "alice@example.com", "correct horse");

    let claims = session::Claims {
        user_id: user.id,
        email: user.email.clone(),
        name: None,
        admin: false,
        rating: user::Rating::DEFAULT,
        provider: None,
        jti: session::Jti::new(),
        issuer: "typing-platform".into(),
        audience: "typing-platform-web".into(),
        issued_at: DateTime::from_unix_timestamp(1_700_000_000)
            .unwrap()
            .coerce(),
        expires_at: DateTime::from_unix_timestamp(1_700_003_600)
            .unwrap()
            .coerce(),
    };
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(SECRET),
    )
    .unwrap();

    let err = service
        .execute(AuthorizeUserSession {
            token: token.into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        service::command::authorize_user_session::ExecutionError
            ::JsonWebTokenDecodeError(_),
    ));
}

#[tokio::test]
async fn auth_code_redeems_exactly_once() {
    let (service, db, _) = test_service();
    let user = seed_user(&db, "alice@example.com", "correct horse");

    let issued = service
        .execute(IssueAuthCode {
            user_id: user.id,
            lifetime: session::Lifetime::Standard,
        })
        .await
        .unwrap();

    let out = service
        .execute(RedeemAuthCode {
            code: issued.code.clone(),
        })
        .await
        .unwrap();
    assert_eq!(out.user.id, user.id);

    let err = service
        .execute(RedeemAuthCode { code: issued.code })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        redeem_auth_code::ExecutionError::UnknownCode,
    ));
}

#[tokio::test]
async fn legacy_bridge_creates_user_with_defaults_and_blocks_replay() {
    let (service, _, _) = test_service();

    let exp = DateTime::now().unix_timestamp() + 300;
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &serde_json::json!({
            "user_id": 7,
            "email": "old@example.com",
            "jti": "8c1a2f8e-4c44-4e47-9f3b-6d0a4e62f2aa",
            "exp": exp,
        }),
        &jsonwebtoken::EncodingKey::from_secret(LEGACY_SECRET),
    )
    .unwrap();

    let out = service
        .execute(BridgeLegacySession {
            token: token.as_str().into(),
        })
        .await
        .unwrap();
    assert_eq!(out.user.email, "old@example.com".parse().unwrap());
    assert_eq!(out.user.rating, user::Rating::MIGRATION_DEFAULT);
    // `Extended` lifetime stretches the session to the legacy TTL.
    let ttl = out.expires_at - DateTime::now().coerce();
    assert!(ttl > Duration::from_secs(60 * 60 * 24 * 6));

    let err = service
        .execute(BridgeLegacySession {
            token: token.into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        bridge_legacy_session::ExecutionError::TokenAlreadyUsed,
    ));
}

#[tokio::test]
async fn legacy_bridge_upserts_returning_users_by_email() {
    let (service, _, _) = test_service();

    let exp = DateTime::now().unix_timestamp() + 300;
    let mint = |jti: &str, rating: i64| {
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &serde_json::json!({
                "user_id": 7,
                "email": "old@example.com",
                "rating": rating,
                "jti": jti,
                "exp": exp,
            }),
            &jsonwebtoken::EncodingKey::from_secret(LEGACY_SECRET),
        )
        .unwrap()
    };

    let first = service
        .execute(BridgeLegacySession {
            token: mint("11111111-1111-4111-8111-111111111111", 1000).into(),
        })
        .await
        .unwrap();
    let second = service
        .execute(BridgeLegacySession {
            token: mint("22222222-2222-4222-8222-222222222222", 1350).into(),
        })
        .await
        .unwrap();

    assert_eq!(first.user.id, second.user.id);
    assert_eq!(second.user.rating, user::Rating::new(1350).unwrap());
}

#[tokio::test]
async fn oauth_resolution_is_idempotent() {
    let (service, _, _) = test_service();

    let profile = oauth::Profile {
        provider: "google".parse().unwrap(),
        uid: "109876543210".parse().unwrap(),
        email: "alice@example.com".parse().unwrap(),
        name: Some("Alice".parse().unwrap()),
    };

    let first = service
        .execute(ResolveOauthIdentity {
            profile: profile.clone(),
        })
        .await
        .unwrap();
    assert_eq!(first.rating, user::Rating::DEFAULT);
    assert_eq!(first.provider, Some("google".parse().unwrap()));

    let second = service
        .execute(ResolveOauthIdentity { profile })
        .await
        .unwrap();
    assert_eq!(first.id, second.id);
}

#[tokio::test]
async fn oauth_resolution_refreshes_a_changed_email() {
    let (service, db, _) = test_service();

    let profile = oauth::Profile {
        provider: "google".parse().unwrap(),
        uid: "109876543210".parse().unwrap(),
        email: "alice@example.com".parse().unwrap(),
        name: None,
    };
    let first = service
        .execute(ResolveOauthIdentity {
            profile: profile.clone(),
        })
        .await
        .unwrap();

    let renamed = service
        .execute(ResolveOauthIdentity {
            profile: oauth::Profile {
                email: "alice@new.example.com".parse().unwrap(),
                ..profile
            },
        })
        .await
        .unwrap();

    assert_eq!(renamed.id, first.id);
    assert_eq!(renamed.email, "alice@new.example.com".parse().unwrap());
    let identity = db.identities.lock().unwrap()[0].clone();
    assert_eq!(identity.email, renamed.email);
}

#[tokio::test]
async fn oauth_resolution_links_to_an_existing_email_account() {
    let (service, db, _) = test_service();
    let user = seed_user(&db, "alice@example.com", "correct horse");

    let resolved = service
        .execute(ResolveOauthIdentity {
            profile: oauth::Profile {
                provider: "google".parse().unwrap(),
                uid: "109876543210".parse().unwrap(),
                email: "alice@example.com".parse().unwrap(),
                name: None,
            },
        })
        .await
        .unwrap();

    assert_eq!(resolved.id, user.id);
    assert_eq!(resolved.provider, Some("google".parse().unwrap()));
    assert_eq!(db.identities.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn battle_finishes_only_once_and_only_by_its_player() {
    let (service, db, _) = test_service();
    let alice = seed_user(&db, "alice@example.com", "correct horse");
    let bob = seed_user(&db, "bob@example.com", "correct horse");

    let m = service
        .execute(StartBattle {
            user_id: alice.id,
            enemy_user_id: Some(bob.id),
        })
        .await
        .unwrap();
    assert_eq!(m.status, battle::Status::Started);

    let outcome = battle::Outcome {
        score: 420,
        accuracy: 97.5,
        type_speed: 5.2,
        miss_count: 3,
        battle_time: 61.4,
    };

    let err = service
        .execute(FinishBattle {
            id: m.id,
            user_id: bob.id,
            outcome,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        finish_battle::ExecutionError::NotParticipant,
    ));

    let finished = service
        .execute(FinishBattle {
            id: m.id,
            user_id: alice.id,
            outcome,
        })
        .await
        .unwrap();
    assert_eq!(finished.status, battle::Status::Finished);
    assert_eq!(finished.score, 420);

    let err = service
        .execute(FinishBattle {
            id: m.id,
            user_id: alice.id,
            outcome,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        finish_battle::ExecutionError::AlreadyFinished(_),
    ));
}

#[tokio::test]
async fn logout_drops_the_session_record() {
    let (service, db, cache) = test_service();
    let user = seed_user(&db, "alice@example.com", "correct horse");

    drop(
        service
            .execute(CreateUserSession::ByUserId {
                user_id: user.id,
                lifetime: session::Lifetime::Standard,
            })
            .await
            .unwrap(),
    );
    let key = format!("session:{}", user.id);
    assert!(cache.contains(&key));

    service
        .execute(DeleteUserSession { user_id: user.id })
        .await
        .unwrap();
    assert!(!cache.contains(&key));
}

#[tokio::test]
async fn rating_update_is_persisted() {
    let (service, db, _) = test_service();
    let user = seed_user(&db, "alice@example.com", "correct horse");

    let updated = service
        .execute(UpdateUserRating {
            user_id: user.id,
            rating: user::Rating::new(1500).unwrap(),
        })
        .await
        .unwrap();
    assert_eq!(updated.rating, user::Rating::new(1500).unwrap());

    let stored = db.users.lock().unwrap()[0].clone();
    assert_eq!(stored.rating, updated.rating);
}

#[tokio::test]
async fn legacy_token_carries_the_full_user_snapshot() {
    let (service, db, _) = test_service();
    let user = seed_user(&db, "alice@example.com", "correct horse");

    let out = service
        .execute(IssueLegacyToken { user_id: user.id })
        .await
        .unwrap();

    let mut validation =
        jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_aud = false;
    let decoded = jsonwebtoken::decode::<service::domain::migration::Claims>(
        out.token.as_ref(),
        &jsonwebtoken::DecodingKey::from_secret(LEGACY_SECRET),
        &validation,
    )
    .unwrap()
    .claims;

    assert_eq!(decoded.user_id, user.id);
    assert_eq!(decoded.email, user.email);
    assert_eq!(decoded.rating, Some(user.rating));
    assert!(decoded.jti.is_some());
    assert_eq!(decoded.expires_at, out.expires_at);
}
