//! Domain entities and the fragment deserializer.
//!
//! Fragments located by tree search are still untrusted: the platform
//! routinely embeds partial objects (tombstones, withheld tweets, suspended
//! accounts) alongside well-formed ones. A fragment that fails its shape
//! check is dropped, never escalated, so one bad entry cannot abort a page.

use serde_json::Value;
use tracing::debug;

/// A tweet, as extracted from a GraphQL response fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tweet {
    /// Stable tweet id (`rest_id`)
    pub id: String,

    /// Tweet text
    pub text: String,

    /// Creation timestamp, as the platform formats it
    pub created_at: Option<String>,

    /// Language (BCP47)
    pub lang: Option<String>,

    /// Conversation the tweet belongs to
    pub conversation_id: Option<String>,

    /// Tweet this one replies to
    pub in_reply_to_status_id: Option<String>,

    /// Author's numeric id
    pub author_id: Option<String>,

    /// Author's handle
    pub author_screen_name: Option<String>,

    /// Retweet count
    pub retweet_count: u64,

    /// Reply count
    pub reply_count: u64,

    /// Like count
    pub like_count: u64,

    /// Quote count
    pub quote_count: u64,
}

impl Tweet {
    /// Build a tweet from a raw fragment. Returns `None` unless the
    /// fragment carries the tweet tag and a non-empty stable id.
    pub(crate) fn from_fragment(fragment: &Value) -> Option<Self> {
        if typename(fragment) != Some("Tweet") {
            return None;
        }
        let id = fragment.get("rest_id").and_then(Value::as_str)?;
        if id.is_empty() {
            return None;
        }

        let legacy = fragment.get("legacy");
        let text = field_str(legacy, "full_text")
            // Older payload shape keeps the text at the top level.
            .or_else(|| fragment.get("text").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_default();

        let author = fragment
            .get("core")
            .and_then(|core| core.get("user_results"))
            .and_then(|results| results.get("result"));

        Some(Self {
            id: id.to_string(),
            text,
            created_at: field_str(legacy, "created_at"),
            lang: field_str(legacy, "lang"),
            conversation_id: field_str(legacy, "conversation_id_str"),
            in_reply_to_status_id: field_str(legacy, "in_reply_to_status_id_str"),
            author_id: author
                .and_then(|a| a.get("rest_id"))
                .and_then(Value::as_str)
                .map(str::to_string),
            author_screen_name: author
                .and_then(|a| field_str(a.get("legacy"), "screen_name")),
            retweet_count: field_count(legacy, "retweet_count"),
            reply_count: field_count(legacy, "reply_count"),
            like_count: field_count(legacy, "favorite_count"),
            quote_count: field_count(legacy, "quote_count"),
        })
    }
}

/// An account, as extracted from a GraphQL response fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Numeric account id (`rest_id`)
    pub id: u64,

    /// Opaque GraphQL node id. The platform's id namespace is split: both
    /// this and the numeric id must be present for a well-formed account.
    pub node_id: String,

    /// Handle, without the leading @
    pub screen_name: String,

    /// Display name
    pub name: String,

    /// Bio
    pub description: String,

    /// Creation timestamp, as the platform formats it
    pub created_at: Option<String>,

    /// Followers count
    pub followers_count: u64,

    /// Following count
    pub following_count: u64,

    /// Tweet count
    pub statuses_count: u64,

    /// Whether the account is verified
    pub verified: bool,

    /// Whether the account is protected
    pub protected: bool,
}

impl User {
    /// Build a user from a raw fragment. Returns `None` unless the fragment
    /// carries the user tag, the opaque node id, and a numeric account id.
    pub(crate) fn from_fragment(fragment: &Value) -> Option<Self> {
        if typename(fragment) != Some("User") {
            return None;
        }
        let node_id = fragment.get("id").and_then(Value::as_str)?;
        if node_id.is_empty() {
            return None;
        }
        let id = numeric_id(fragment.get("rest_id")?)?;

        let legacy = fragment.get("legacy");

        Some(Self {
            id,
            node_id: node_id.to_string(),
            screen_name: field_str(legacy, "screen_name").unwrap_or_default(),
            name: field_str(legacy, "name").unwrap_or_default(),
            description: field_str(legacy, "description").unwrap_or_default(),
            created_at: field_str(legacy, "created_at"),
            followers_count: field_count(legacy, "followers_count"),
            following_count: field_count(legacy, "friends_count"),
            statuses_count: field_count(legacy, "statuses_count"),
            verified: fragment
                .get("is_blue_verified")
                .and_then(Value::as_bool)
                .or_else(|| legacy.and_then(|l| l.get("verified")).and_then(Value::as_bool))
                .unwrap_or(false),
            protected: legacy
                .and_then(|l| l.get("protected"))
                .and_then(Value::as_bool)
                .unwrap_or(false),
        })
    }
}

/// Either of the two entity shapes a response can carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    Tweet(Tweet),
    User(User),
}

impl Entity {
    fn from_fragment(fragment: &Value) -> Option<Self> {
        match typename(fragment) {
            Some("Tweet") => Tweet::from_fragment(fragment).map(Self::Tweet),
            Some("User") => User::from_fragment(fragment).map(Self::User),
            _ => None,
        }
    }

    /// The tweet inside, if this entity is one.
    #[must_use]
    pub fn into_tweet(self) -> Option<Tweet> {
        match self {
            Self::Tweet(tweet) => Some(tweet),
            Self::User(_) => None,
        }
    }

    /// The user inside, if this entity is one.
    #[must_use]
    pub fn into_user(self) -> Option<User> {
        match self {
            Self::User(user) => Some(user),
            Self::Tweet(_) => None,
        }
    }
}

/// Convert raw fragments into typed entities, keeping encounter order.
/// Fragments that fail their shape check are skipped.
pub(crate) fn deserialize(fragments: &[Value]) -> Vec<Entity> {
    let mut entities = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        match Entity::from_fragment(fragment) {
            Some(entity) => entities.push(entity),
            None => debug!(
                typename = typename(fragment).unwrap_or("<untagged>"),
                "skipping malformed fragment"
            ),
        }
    }
    entities
}

/// One page of a paginated fetch: the entities in encounter order plus the
/// cursor for the next page, empty when the collection is exhausted.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Entities, in the order the response carried them
    pub entities: Vec<Entity>,

    /// Opaque next-page cursor; empty means no further page
    pub next_cursor: String,
}

impl Page {
    /// Iterate over the tweets in this page.
    pub fn tweets(&self) -> impl Iterator<Item = &Tweet> {
        self.entities.iter().filter_map(|entity| match entity {
            Entity::Tweet(tweet) => Some(tweet),
            Entity::User(_) => None,
        })
    }

    /// Iterate over the users in this page.
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.entities.iter().filter_map(|entity| match entity {
            Entity::User(user) => Some(user),
            Entity::Tweet(_) => None,
        })
    }
}

fn typename(fragment: &Value) -> Option<&str> {
    fragment.get("__typename").and_then(Value::as_str)
}

fn field_str(object: Option<&Value>, key: &str) -> Option<String> {
    object?
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn field_count(object: Option<&Value>, key: &str) -> u64 {
    object
        .and_then(|o| o.get(key))
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

fn numeric_id(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tweet_with_only_required_fields_gets_defaults() {
        let fragment = json!({ "__typename": "Tweet", "rest_id": "123", "text": "hi" });
        let tweet = Tweet::from_fragment(&fragment).unwrap();
        assert_eq!(tweet.id, "123");
        assert_eq!(tweet.text, "hi");
        assert_eq!(tweet.like_count, 0);
        assert!(tweet.created_at.is_none());
        assert!(tweet.author_id.is_none());
    }

    #[test]
    fn tweet_reads_legacy_fields_and_author() {
        let fragment = json!({
            "__typename": "Tweet",
            "rest_id": "42",
            "core": { "user_results": { "result": {
                "__typename": "User",
                "rest_id": "7",
                "legacy": { "screen_name": "alice" }
            } } },
            "legacy": {
                "full_text": "hello there",
                "created_at": "Wed Oct 10 20:19:24 +0000 2018",
                "lang": "en",
                "favorite_count": 12,
                "retweet_count": 3
            }
        });

        let tweet = Tweet::from_fragment(&fragment).unwrap();
        assert_eq!(tweet.text, "hello there");
        assert_eq!(tweet.like_count, 12);
        assert_eq!(tweet.retweet_count, 3);
        assert_eq!(tweet.author_id.as_deref(), Some("7"));
        assert_eq!(tweet.author_screen_name.as_deref(), Some("alice"));
    }

    #[test]
    fn tweet_without_stable_id_is_rejected() {
        assert!(Tweet::from_fragment(&json!({ "__typename": "Tweet", "text": "hi" })).is_none());
        assert!(
            Tweet::from_fragment(&json!({ "__typename": "Tweet", "rest_id": "" })).is_none()
        );
    }

    #[test]
    fn user_requires_both_halves_of_the_id_namespace() {
        let complete = json!({
            "__typename": "User",
            "id": "VXNlcjo0NA==",
            "rest_id": "44",
            "legacy": { "screen_name": "bob", "followers_count": 10 }
        });
        let user = User::from_fragment(&complete).unwrap();
        assert_eq!(user.id, 44);
        assert_eq!(user.node_id, "VXNlcjo0NA==");
        assert_eq!(user.screen_name, "bob");
        assert_eq!(user.followers_count, 10);

        let missing_numeric = json!({ "__typename": "User", "id": "VXNlcjo0NA==" });
        assert!(User::from_fragment(&missing_numeric).is_none());

        let missing_node = json!({ "__typename": "User", "rest_id": "44" });
        assert!(User::from_fragment(&missing_node).is_none());
    }

    #[test]
    fn numeric_rest_id_also_accepted_as_a_number() {
        let fragment = json!({ "__typename": "User", "id": "VXNlcjo5", "rest_id": 9 });
        assert_eq!(User::from_fragment(&fragment).unwrap().id, 9);
    }

    #[test]
    fn malformed_fragment_is_dropped_and_siblings_survive() {
        let fragments = vec![
            json!({ "__typename": "User", "id": "VXNlcjox", "rest_id": "1",
                "legacy": { "screen_name": "good" } }),
            json!({ "__typename": "User", "id": "VXNlcjoy" }),
            json!({ "__typename": "Tweet", "rest_id": "3", "text": "kept" }),
            json!({ "__typename": "TimelineCursor" }),
        ];

        let entities = deserialize(&fragments);
        assert_eq!(entities.len(), 2);
        assert!(matches!(&entities[0], Entity::User(u) if u.screen_name == "good"));
        assert!(matches!(&entities[1], Entity::Tweet(t) if t.id == "3"));
    }

    #[test]
    fn page_splits_entities_by_shape() {
        let page = Page {
            entities: vec![
                Entity::Tweet(
                    Tweet::from_fragment(
                        &json!({ "__typename": "Tweet", "rest_id": "1", "text": "t" }),
                    )
                    .unwrap(),
                ),
                Entity::User(
                    User::from_fragment(
                        &json!({ "__typename": "User", "id": "VXNlcjoy", "rest_id": "2" }),
                    )
                    .unwrap(),
                ),
            ],
            next_cursor: String::new(),
        };

        assert_eq!(page.tweets().count(), 1);
        assert_eq!(page.users().count(), 1);
    }
}
