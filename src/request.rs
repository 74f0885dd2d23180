//! Request construction for GraphQL operations.
//!
//! Reads are GETs with `variables`/`features` JSON in the query string;
//! writes are POSTs carrying the same payload in the body. The descriptor
//! is opaque to the rest of the pipeline, which only hands it to the
//! transport layer.

use reqwest::Method;
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::resource::Resource;

/// Arguments for a fetch or post call. Kinds ignore the fields they do not
/// use.
#[derive(Debug, Clone, Default)]
pub struct Params {
    /// Tweet or user id, for kinds targeting one
    pub id: Option<String>,

    /// User handle, without the leading @
    pub screen_name: Option<String>,

    /// Search query
    pub query: Option<String>,

    /// Tweet text, for publishing
    pub text: Option<String>,

    /// Page size
    pub count: Option<u32>,

    /// Cursor from a previous page of the same kind and arguments
    pub cursor: Option<String>,
}

/// An encoded request, ready for the transport layer.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// HTTP method
    pub method: Method,

    /// Full endpoint URL
    pub url: String,

    /// Query string pairs (GET operations)
    pub query: Vec<(String, String)>,

    /// JSON body (POST operations)
    pub body: Option<Value>,
}

/// Encode `resource` + `params` into a request descriptor.
pub(crate) fn build(
    base_url: &str,
    resource: Resource,
    params: &Params,
) -> Result<RequestDescriptor> {
    let count = params.count.unwrap_or(20);
    let mut variables = match resource {
        Resource::TweetDetail => json!({
            "focalTweetId": require(&params.id, "id")?,
            "with_rux_injections": false,
            "withCommunity": true,
            "withVoice": true,
        }),
        Resource::UserByScreenName => json!({
            "screen_name": require(&params.screen_name, "screen_name")?,
        }),
        Resource::UserById => json!({
            "userId": require(&params.id, "id")?,
        }),
        Resource::UserTweets | Resource::UserTweetsAndReplies => json!({
            "userId": require(&params.id, "id")?,
            "count": count,
            "includePromotedContent": false,
            "withVoice": true,
        }),
        Resource::HomeTimeline => json!({
            "count": count,
            "includePromotedContent": false,
            "latestControlAvailable": true,
        }),
        Resource::SearchTimeline => json!({
            "rawQuery": require(&params.query, "query")?,
            "count": count,
            "querySource": "typed_query",
            "product": "Latest",
        }),
        Resource::Followers | Resource::Following => json!({
            "userId": require(&params.id, "id")?,
            "count": count,
            "includePromotedContent": false,
        }),
        Resource::CreateTweet => json!({
            "tweet_text": require(&params.text, "text")?,
            "dark_request": false,
            "media": { "media_entities": [], "possibly_sensitive": false },
            "semantic_annotation_ids": [],
        }),
        Resource::DeleteTweet => json!({
            "tweet_id": require(&params.id, "id")?,
            "dark_request": false,
        }),
        Resource::FavoriteTweet | Resource::UnfavoriteTweet => json!({
            "tweet_id": require(&params.id, "id")?,
        }),
    };

    if let Some(cursor) = params.cursor.as_deref().filter(|c| !c.is_empty()) {
        variables["cursor"] = json!(cursor);
    }

    let url = format!(
        "{}/graphql/{}/{}",
        base_url,
        resource.query_id(),
        resource.operation_name()
    );

    if resource.is_write() {
        let mut body = json!({
            "variables": variables,
            "queryId": resource.query_id(),
        });
        if resource == Resource::CreateTweet {
            body["features"] = features();
        }
        Ok(RequestDescriptor {
            method: Method::POST,
            url,
            query: Vec::new(),
            body: Some(body),
        })
    } else {
        Ok(RequestDescriptor {
            method: Method::GET,
            url,
            query: vec![
                ("variables".to_string(), variables.to_string()),
                ("features".to_string(), features().to_string()),
            ],
            body: None,
        })
    }
}

/// Feature switches the GraphQL endpoints insist on receiving. The set the
/// web client sends changes over time; these are the ones the supported
/// operations currently require.
fn features() -> Value {
    json!({
        "responsive_web_graphql_exclude_directive_enabled": true,
        "responsive_web_graphql_timeline_navigation_enabled": true,
        "creator_subscriptions_tweet_preview_api_enabled": true,
        "verified_phone_label_enabled": false,
        "longform_notetweets_consumption_enabled": true,
        "longform_notetweets_rich_text_read_enabled": true,
        "freedom_of_speech_not_reach_fetch_enabled": true,
        "standardized_nudges_misinfo": true,
        "tweet_awards_web_tipping_enabled": false,
        "responsive_web_enhance_cards_enabled": false,
    })
}

fn require<'a>(field: &'a Option<String>, name: &'static str) -> Result<&'a str> {
    field
        .as_deref()
        .filter(|value| !value.is_empty())
        .ok_or(Error::MissingParam(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tweet_detail_is_a_get_with_inline_variables() {
        let params = Params {
            id: Some("123".into()),
            ..Default::default()
        };
        let descriptor = build("https://api.x.com", Resource::TweetDetail, &params).unwrap();

        assert_eq!(descriptor.method, Method::GET);
        assert!(descriptor.url.ends_with("/TweetDetail"));
        assert!(descriptor.body.is_none());

        let variables: Value =
            serde_json::from_str(&descriptor.query[0].1).unwrap();
        assert_eq!(variables["focalTweetId"], "123");
    }

    #[test]
    fn missing_required_parameter_is_rejected() {
        let err = build("https://api.x.com", Resource::TweetDetail, &Params::default())
            .unwrap_err();
        assert!(matches!(err, Error::MissingParam("id")));

        let err = build("https://api.x.com", Resource::SearchTimeline, &Params::default())
            .unwrap_err();
        assert!(matches!(err, Error::MissingParam("query")));
    }

    #[test]
    fn cursor_is_forwarded_into_variables() {
        let params = Params {
            id: Some("7".into()),
            cursor: Some("abc|".into()),
            ..Default::default()
        };
        let descriptor = build("https://api.x.com", Resource::UserTweets, &params).unwrap();
        let variables: Value = serde_json::from_str(&descriptor.query[0].1).unwrap();
        assert_eq!(variables["cursor"], "abc|");
    }

    #[test]
    fn empty_cursor_is_not_forwarded() {
        let params = Params {
            id: Some("7".into()),
            cursor: Some(String::new()),
            ..Default::default()
        };
        let descriptor = build("https://api.x.com", Resource::UserTweets, &params).unwrap();
        let variables: Value = serde_json::from_str(&descriptor.query[0].1).unwrap();
        assert!(variables.get("cursor").is_none());
    }

    #[test]
    fn create_tweet_is_a_post_with_query_id_in_the_body() {
        let params = Params {
            text: Some("hello".into()),
            ..Default::default()
        };
        let descriptor = build("https://api.x.com", Resource::CreateTweet, &params).unwrap();

        assert_eq!(descriptor.method, Method::POST);
        assert!(descriptor.query.is_empty());

        let body = descriptor.body.unwrap();
        assert_eq!(body["variables"]["tweet_text"], "hello");
        assert_eq!(body["queryId"], Resource::CreateTweet.query_id());
        assert!(body["features"].is_object());
    }

    #[test]
    fn delete_tweet_sends_no_feature_switches() {
        let params = Params {
            id: Some("9".into()),
            ..Default::default()
        };
        let descriptor = build("https://api.x.com", Resource::DeleteTweet, &params).unwrap();
        let body = descriptor.body.unwrap();
        assert_eq!(body["variables"]["tweet_id"], "9");
        assert!(body.get("features").is_none());
    }
}
