//! Redis [`Cache`] implementation.

use common::operations::{By, Consume, Delete, Insert, Take};
use derive_more::Debug;
use redis::aio::ConnectionManager;
use serde::{de::DeserializeOwned, Serialize};
use smart_default::SmartDefault;
use tracerr::Traced;

use crate::infra::cache::{self, Entry, Key};
#[cfg(doc)]
use crate::infra::Cache;

pub use redis::RedisError as Error;

/// Redis [`Cache`] client.
#[derive(Clone, Debug)]
pub struct Redis {
    /// Multiplexed connection with automatic reconnection.
    #[debug(skip)]
    conn: ConnectionManager,
}

impl Redis {
    /// Creates a new [`Redis`] client with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If failed to connect to the Redis server.
    pub async fn new(conf: &Config) -> Result<Self, Traced<cache::Error>> {
        let client = redis::Client::open(conf.url.as_str())
            .map_err(tracerr::from_and_wrap!(=> cache::Error))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(tracerr::from_and_wrap!(=> cache::Error))?;
        Ok(Self { conn })
    }

    /// Returns a handle to the underlying connection.
    fn conn(&self) -> ConnectionManager {
        self.conn.clone()
    }
}

/// [`Redis`] client configuration.
#[derive(Clone, Debug, serde::Deserialize, SmartDefault)]
#[serde(default)]
pub struct Config {
    /// URL of the Redis server to connect to.
    #[default = "redis://127.0.0.1:6379"]
    pub url: String,
}

impl<K, V> cache::Cache<Insert<Entry<K, V>>> for Redis
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
        let payload = serde_json::to_string(&entry.value)
            .map_err(tracerr::from_and_wrap!(=> cache::Error))?;

        let () = redis::cmd("SET")
            .arg(entry.key.render())
            .arg(payload)
            .arg("EX")
            .arg(entry.ttl.as_secs())
            .query_async(&mut self.conn())
            .await
            .map_err(tracerr::from_and_wrap!(=> cache::Error))?;
        Ok(())
    }
}

impl<K, V> cache::Cache<Take<By<Option<V>, K>>> for Redis
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
        let raw: Option<String> = redis::cmd("GETDEL")
            .arg(by.into_inner().render())
            .query_async(&mut self.conn())
            .await
            .map_err(tracerr::from_and_wrap!(=> cache::Error))?;

        raw.map(|payload| serde_json::from_str(&payload))
            .transpose()
            .map_err(tracerr::from_and_wrap!(=> cache::Error))
    }
}

impl<K> cache::Cache<Consume<Entry<K>>> for Redis
where
    K: Key + Send,
{
    type Ok = bool;
    type Err = Traced<cache::Error>;

    async fn execute(
        &self,
        Consume(entry): Consume<Entry<K>>,
    ) -> Result<Self::Ok, Self::Err> {
        // `SET NX` replies nil when the marker already exists, making the
        // first consumer the only one seeing `OK`.
        let reply: Option<String> = redis::cmd("SET")
            .arg(entry.key.render())
            .arg("1")
            .arg("NX")
            .arg("EX")
            .arg(entry.ttl.as_secs())
            .query_async(&mut self.conn())
            .await
            .map_err(tracerr::from_and_wrap!(=> cache::Error))?;
        Ok(reply.is_some())
    }
}

impl<K> cache::Cache<Delete<K>> for Redis
where
    K: Key + Send,
{
    type Ok = ();
    type Err = Traced<cache::Error>;

    async fn execute(
        &self,
        Delete(key): Delete<K>,
    ) -> Result<Self::Ok, Self::Err> {
        let _: u64 = redis::cmd("DEL")
            .arg(key.render())
            .query_async(&mut self.conn())
            .await
            .map_err(tracerr::from_and_wrap!(=> cache::Error))?;
        Ok(())
    }
}
