//! Domain definitions.

pub mod battle;
pub mod migration;
pub mod oauth;
pub mod redirect;
pub mod user;

pub use self::{
    battle::TypingMatch, redirect::RedirectTarget, user::User,
};
