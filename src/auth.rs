//! Credential levels and the per-resource access gate.

use tracing::debug;

use crate::error::{Error, Result};
use crate::resource::Resource;

/// Credential level a client runs at, fixed at construction. Build a new
/// client to change level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    /// Unauthenticated guest session
    Guest,
    /// Authenticated account session
    User,
}

/// Reject resources the current credential level cannot reach. Runs before
/// any request is built, so a denial never touches the network.
pub(crate) fn ensure_allowed(level: AccessLevel, resource: Resource) -> Result<()> {
    if level == AccessLevel::Guest && !resource.guest_allowed() {
        debug!(%resource, "access denied at guest level");
        return Err(Error::AccessDenied { resource });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guest_reaches_public_lookups() {
        assert!(ensure_allowed(AccessLevel::Guest, Resource::TweetDetail).is_ok());
        assert!(ensure_allowed(AccessLevel::Guest, Resource::UserByScreenName).is_ok());
        assert!(ensure_allowed(AccessLevel::Guest, Resource::UserTweets).is_ok());
    }

    #[test]
    fn guest_is_denied_account_resources() {
        for resource in [
            Resource::HomeTimeline,
            Resource::SearchTimeline,
            Resource::Followers,
            Resource::Following,
            Resource::CreateTweet,
        ] {
            let err = ensure_allowed(AccessLevel::Guest, resource).unwrap_err();
            assert!(matches!(err, Error::AccessDenied { resource: r } if r == resource));
        }
    }

    #[test]
    fn user_reaches_everything() {
        for resource in [
            Resource::TweetDetail,
            Resource::HomeTimeline,
            Resource::CreateTweet,
            Resource::Followers,
        ] {
            assert!(ensure_allowed(AccessLevel::User, resource).is_ok());
        }
    }
}
