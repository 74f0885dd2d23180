//! Pulls raw entity fragments and the pagination cursor out of a response
//! tree.
//!
//! Each readable resource kind maps to the discriminator pair(s) naming its
//! entities, plus an optional unwrap for kinds whose matches are containers
//! around the entity rather than the entity itself (timeline items hold the
//! tweet under `tweet_results.result`).

use serde_json::Value;
use tracing::trace;

use crate::resource::Resource;
use crate::search::search;

/// Discriminator pair with an optional container unwrap.
struct Tag {
    key: &'static str,
    target: &'static str,
    unwrap: Option<fn(&Value) -> Option<&Value>>,
}

struct Plan {
    tags: &'static [Tag],
    collection: bool,
}

static TWEET_TAGS: [Tag; 1] = [Tag {
    key: "__typename",
    target: "Tweet",
    unwrap: None,
}];

static USER_TAGS: [Tag; 1] = [Tag {
    key: "__typename",
    target: "User",
    unwrap: None,
}];

static TIMELINE_TWEET_TAGS: [Tag; 1] = [Tag {
    key: "__typename",
    target: "TimelineTweet",
    unwrap: Some(unwrap_timeline_tweet),
}];

static TIMELINE_USER_TAGS: [Tag; 1] = [Tag {
    key: "__typename",
    target: "TimelineUser",
    unwrap: Some(unwrap_timeline_user),
}];

// Search results mix tweet and user modules in one timeline.
static SEARCH_TAGS: [Tag; 2] = [
    Tag {
        key: "__typename",
        target: "TimelineTweet",
        unwrap: Some(unwrap_timeline_tweet),
    },
    Tag {
        key: "__typename",
        target: "TimelineUser",
        unwrap: Some(unwrap_timeline_user),
    },
];

fn unwrap_timeline_tweet(item: &Value) -> Option<&Value> {
    let result = item.get("tweet_results").and_then(|r| r.get("result"))?;
    // Tweets under moderation come wrapped one level deeper.
    match result.get("__typename").and_then(Value::as_str) {
        Some("TweetWithVisibilityResults") => result.get("tweet"),
        _ => Some(result),
    }
}

fn unwrap_timeline_user(item: &Value) -> Option<&Value> {
    item.get("user_results").and_then(|r| r.get("result"))
}

fn plan_for(resource: Resource) -> Plan {
    match resource {
        Resource::TweetDetail => Plan {
            tags: &TWEET_TAGS,
            collection: false,
        },
        Resource::UserByScreenName | Resource::UserById => Plan {
            tags: &USER_TAGS,
            collection: false,
        },
        Resource::UserTweets | Resource::UserTweetsAndReplies | Resource::HomeTimeline => Plan {
            tags: &TIMELINE_TWEET_TAGS,
            collection: true,
        },
        Resource::SearchTimeline => Plan {
            tags: &SEARCH_TAGS,
            collection: true,
        },
        Resource::Followers | Resource::Following => Plan {
            tags: &TIMELINE_USER_TAGS,
            collection: true,
        },
        Resource::CreateTweet
        | Resource::DeleteTweet
        | Resource::FavoriteTweet
        | Resource::UnfavoriteTweet => {
            unreachable!("write resources carry no extractable entities")
        }
    }
}

/// Locate every entity fragment for `resource` in `body`, in document
/// traversal order, together with the next-page cursor. The cursor is the
/// `value` of the first `cursorType == "Bottom"` marker found; collections
/// without one, and single-entity kinds, return the empty string.
pub(crate) fn extract(body: &Value, resource: Resource) -> (Vec<Value>, String) {
    let plan = plan_for(resource);

    let mut fragments = Vec::new();
    for tag in plan.tags {
        for matched in search(body, tag.key, tag.target) {
            let entity = match tag.unwrap {
                Some(unwrap) => unwrap(matched),
                None => Some(matched),
            };
            match entity {
                Some(entity) => fragments.push(entity.clone()),
                None => trace!(%resource, "container fragment held no entity"),
            }
        }
    }

    let next_cursor = if plan.collection {
        bottom_cursor(body)
    } else {
        String::new()
    };

    (fragments, next_cursor)
}

fn bottom_cursor(body: &Value) -> String {
    search(body, "cursorType", "Bottom")
        .first()
        .and_then(|marker| marker.get("value"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
