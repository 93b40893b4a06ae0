//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;

use std::time::Duration;

use derive_more::Debug;

#[cfg(doc)]
use infra::{Cache, Database};

pub use self::{command::Command, query::Query};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] encoding key for session tokens.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_encoding_key: jsonwebtoken::EncodingKey,

    /// [JWT] decoding key for session tokens.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// [JWT] decoding key for migration tokens minted by the legacy system.
    ///
    /// May be backed by the same secret as [`Config::jwt_decoding_key`] when
    /// both systems share it.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub legacy_decoding_key: jsonwebtoken::DecodingKey,

    /// [JWT] encoding key for tokens handed to the legacy system.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub legacy_encoding_key: jsonwebtoken::EncodingKey,

    /// Value of the `iss` claim stamped into (and required of) session
    /// tokens.
    pub issuer: String,

    /// Value of the `aud` claim stamped into (and required of) session
    /// tokens.
    pub audience: String,

    /// [`Duration`] a standard session lives for.
    pub session_ttl: Duration,

    /// [`Duration`] a session bridged from the legacy system lives for.
    pub legacy_session_ttl: Duration,

    /// [`Duration`] short-lived artifacts (one-time codes, handoff tokens)
    /// live for.
    pub temporary_ttl: Duration,

    /// [`Duration`] the active session record of a user is kept for.
    pub session_record_ttl: Duration,

    /// [`Duration`] a consumed one-time token is remembered for, blocking
    /// its replay.
    pub replay_ttl: Duration,
}

impl Config {
    /// Returns the [`jsonwebtoken::Validation`] applied to session tokens.
    ///
    /// No clock leeway is tolerated, and both `iss` and `aud` are required
    /// to match this [`Config`].
    #[must_use]
    pub fn session_validation(&self) -> jsonwebtoken::Validation {
        let mut validation =
            jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation
    }

    /// Returns the [`jsonwebtoken::Validation`] applied to migration tokens.
    ///
    /// Legacy tokens carry no `iss`/`aud` claims, so only the signature and
    /// expiry are checked, with no clock leeway.
    #[must_use]
    pub fn legacy_validation(&self) -> jsonwebtoken::Validation {
        let mut validation =
            jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation
    }
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db, C> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`Cache`] of this [`Service`].
    cache: C,
}

impl<Db, C> Service<Db, C> {
    /// Creates a new [`Service`] with the provided parameters.
    pub fn new(config: Config, database: Db, cache: C) -> Self {
        Self {
            config,
            database,
            cache,
        }
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`Cache`] of this [`Service`].
    #[must_use]
    pub fn cache(&self) -> &C {
        &self.cache
    }
}
