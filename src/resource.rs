//! Resource kinds exposed by the GraphQL surface.

use std::fmt;

/// A GraphQL operation the client knows how to issue.
///
/// Read kinds flow through [`crate::Client::fetch`]; write kinds flow
/// through [`crate::Client::post`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Single tweet lookup by id
    TweetDetail,
    /// Single user lookup by handle
    UserByScreenName,
    /// Single user lookup by numeric id
    UserById,
    /// A user's primary timeline
    UserTweets,
    /// A user's timeline including replies
    UserTweetsAndReplies,
    /// The authenticated account's home timeline
    HomeTimeline,
    /// Tweet search
    SearchTimeline,
    /// Accounts following a user
    Followers,
    /// Accounts a user follows
    Following,
    /// Publish a tweet
    CreateTweet,
    /// Delete a tweet
    DeleteTweet,
    /// Like a tweet
    FavoriteTweet,
    /// Remove a like
    UnfavoriteTweet,
}

impl Resource {
    /// GraphQL operation name, as it appears in the endpoint path.
    #[must_use]
    pub const fn operation_name(self) -> &'static str {
        match self {
            Self::TweetDetail => "TweetDetail",
            Self::UserByScreenName => "UserByScreenName",
            Self::UserById => "UserByRestId",
            Self::UserTweets => "UserTweets",
            Self::UserTweetsAndReplies => "UserTweetsAndReplies",
            Self::HomeTimeline => "HomeLatestTimeline",
            Self::SearchTimeline => "SearchTimeline",
            Self::Followers => "Followers",
            Self::Following => "Following",
            Self::CreateTweet => "CreateTweet",
            Self::DeleteTweet => "DeleteTweet",
            Self::FavoriteTweet => "FavoriteTweet",
            Self::UnfavoriteTweet => "UnfavoriteTweet",
        }
    }

    /// Persisted-query id paired with the operation name in the endpoint
    /// path. Rotates when the platform redeploys; override the base URL to
    /// pin a capture.
    #[must_use]
    pub(crate) const fn query_id(self) -> &'static str {
        match self {
            Self::TweetDetail => "xOhkmRac04YFZmOzU9PJHg",
            Self::UserByScreenName => "G3KGOASz96M-Qu0nwmGXNg",
            Self::UserById => "tD8zKvQzwY3kdx5yz6YmOw",
            Self::UserTweets => "E3opETHurmVJflFsUBVuUQ",
            Self::UserTweetsAndReplies => "bt4TKuFz4T7Ckk-VvQVSow",
            Self::HomeTimeline => "HCosKfLNW1AcOo3la3mMgg",
            Self::SearchTimeline => "nK1dw4oV3k4w5TdtcAdSww",
            Self::Followers => "EAqBhgcGr_qPOzhS4Q3scQ",
            Self::Following => "JPZiqKjET7_M1r5Tlr8pyA",
            Self::CreateTweet => "SoVnbfCycZ7fERGCwpZkYA",
            Self::DeleteTweet => "VaenaVgh5q5ih7kvyVjgtg",
            Self::FavoriteTweet => "lI07N6Otwv1PhnEgXILM7A",
            Self::UnfavoriteTweet => "ZYKSe-w7KEslx3JhSIk5LA",
        }
    }

    /// Whether this kind mutates state. Write kinds are issued as POSTs and
    /// never go through entity extraction.
    #[must_use]
    pub const fn is_write(self) -> bool {
        matches!(
            self,
            Self::CreateTweet | Self::DeleteTweet | Self::FavoriteTweet | Self::UnfavoriteTweet
        )
    }

    /// Whether a guest-level session may issue this kind. Single-entity
    /// lookups and a user's primary timeline are public; everything else
    /// needs an authenticated account.
    #[must_use]
    pub const fn guest_allowed(self) -> bool {
        matches!(
            self,
            Self::TweetDetail | Self::UserByScreenName | Self::UserById | Self::UserTweets
        )
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operation_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_are_never_guest_allowed() {
        for resource in [
            Resource::CreateTweet,
            Resource::DeleteTweet,
            Resource::FavoriteTweet,
            Resource::UnfavoriteTweet,
        ] {
            assert!(resource.is_write());
            assert!(!resource.guest_allowed());
        }
    }

    #[test]
    fn public_lookups_are_guest_allowed() {
        assert!(Resource::TweetDetail.guest_allowed());
        assert!(Resource::UserByScreenName.guest_allowed());
        assert!(Resource::UserTweets.guest_allowed());
        assert!(!Resource::HomeTimeline.guest_allowed());
        assert!(!Resource::SearchTimeline.guest_allowed());
        assert!(!Resource::Followers.guest_allowed());
    }

    #[test]
    fn display_uses_the_operation_name() {
        assert_eq!(Resource::UserById.to_string(), "UserByRestId");
        assert_eq!(Resource::HomeTimeline.to_string(), "HomeLatestTimeline");
    }
}
