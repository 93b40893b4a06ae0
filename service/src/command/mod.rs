//! [`Command`] definition.

pub mod authorize_user_session;
pub mod bridge_legacy_session;
pub mod create_user_session;
pub mod delete_user_session;
pub mod finish_battle;
pub mod issue_auth_code;
pub mod issue_legacy_token;
pub mod redeem_auth_code;
pub mod resolve_oauth_identity;
pub mod start_battle;
pub mod update_user_rating;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession,
    bridge_legacy_session::BridgeLegacySession,
    create_user_session::CreateUserSession,
    delete_user_session::DeleteUserSession, finish_battle::FinishBattle,
    issue_auth_code::IssueAuthCode, issue_legacy_token::IssueLegacyToken,
    redeem_auth_code::RedeemAuthCode,
    resolve_oauth_identity::ResolveOauthIdentity, start_battle::StartBattle,
    update_user_rating::UpdateUserRating,
};
