//! [`Cache`]-related implementations.

pub mod redis;

use std::time::Duration;

use derive_more::{Display, Error as StdError, From};

use crate::domain::{user, user::session};
#[cfg(doc)]
use crate::domain::User;

pub use self::redis::Redis;

/// Cache operation.
pub use common::Handler as Cache;

/// [`Cache`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// [`Redis`] error.
    #[display("`Redis` error: {_0}")]
    Redis(redis::Error),

    /// Cached value (de)serialization error.
    #[display("Failed to (de)serialize a cached value: {_0}")]
    Codec(serde_json::Error),
}

/// Typed key of a [`Cache`] entry.
pub trait Key {
    /// Namespace the key lives under.
    const NAMESPACE: &'static str;

    /// Returns the part of the key identifying the concrete entry.
    fn fragment(&self) -> String;

    /// Renders the full namespaced key.
    fn render(&self) -> String {
        format!("{}:{}", Self::NAMESPACE, self.fragment())
    }
}

impl Key for session::AuthCode {
    const NAMESPACE: &'static str = "auth_code";

    fn fragment(&self) -> String {
        let code: &str = self.as_ref();
        code.into()
    }
}

impl Key for session::Jti {
    const NAMESPACE: &'static str = "used_token";

    fn fragment(&self) -> String {
        self.to_string()
    }
}

/// [`Key`] of the active session record of a [`User`].
#[derive(Clone, Copy, Debug, From)]
pub struct SessionOf(pub user::Id);

impl Key for SessionOf {
    const NAMESPACE: &'static str = "session";

    fn fragment(&self) -> String {
        self.0.to_string()
    }
}

/// Value to be stored in a [`Cache`] under the given [`Key`] for the given
/// TTL.
#[derive(Clone, Copy, Debug)]
pub struct Entry<K, V = ()> {
    /// [`Key`] the value is stored under.
    pub key: K,

    /// Value to store.
    pub value: V,

    /// [`Duration`] the entry lives for.
    pub ttl: Duration,
}

#[cfg(test)]
mod key_spec {
    use super::{Key as _, SessionOf};
    use crate::domain::user::session::AuthCode;

    #[test]
    fn renders_namespaced_keys() {
        assert_eq!(
            AuthCode::from("c0ffee").render(),
            "auth_code:c0ffee",
        );
        assert_eq!(SessionOf(7.into()).render(), "session:7");
    }
}
