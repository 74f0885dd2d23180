//! GraphQL API client.
//!
//! Owns the transport (reqwest), the lazily-activated guest session, and the
//! fetch pipeline: gate, request, extract, deserialize, page.

use std::fmt;
use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde_json::{json, Value};
use tokio::sync::OnceCell;
use tracing::{debug, instrument, warn};

use crate::auth::{ensure_allowed, AccessLevel};
use crate::config::{Config, RateLimitInfo, WEB_BEARER_TOKEN};
use crate::entities::{self, Entity, Page, Tweet, User};
use crate::error::{Error, Result};
use crate::extract::extract;
use crate::request::{self, Params, RequestDescriptor};
use crate::resource::Resource;

/// Observer for platform error payloads.
///
/// Installed via [`Client::with_error_inspector`]; sees the HTTP status and
/// decoded payload of every API-level failure before the error propagates.
/// Inspection only: the original error is returned to the caller regardless.
pub trait ErrorInspector: Send + Sync {
    /// Called once per failed API response.
    fn on_api_error(&self, status: u16, payload: &Value);
}

/// GraphQL API client.
///
/// One instance is safe to share across tasks; the only mutable state is
/// the guest token, which is activated at most once.
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    access: AccessLevel,
    bearer_token: String,
    auth_token: Option<String>,
    csrf_token: Option<String>,
    guest_token: OnceCell<String>,
    inspector: Option<Box<dyn ErrorInspector>>,
    max_retries: u32,
    initial_delay_ms: u64,
    max_delay_ms: u64,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("access", &self.access)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a new client from configuration. The credential level is
    /// fixed here: a stored auth token runs the client at user level,
    /// otherwise it runs as a guest.
    pub fn new(config: &Config) -> Result<Self> {
        if config.auth_token.is_some() != config.csrf_token.is_some() {
            return Err(Error::Config(
                "auth_token and csrf_token must be supplied together".into(),
            ));
        }

        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone());
        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }

        let access = if config.auth_token.is_some() {
            AccessLevel::User
        } else {
            AccessLevel::Guest
        };

        Ok(Self {
            http: builder.build()?,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            access,
            bearer_token: config
                .bearer_token
                .clone()
                .unwrap_or_else(|| WEB_BEARER_TOKEN.to_string()),
            auth_token: config.auth_token.clone(),
            csrf_token: config.csrf_token.clone(),
            guest_token: OnceCell::new(),
            inspector: None,
            max_retries: config.retry.max_attempts,
            initial_delay_ms: config.retry.initial_delay_ms,
            max_delay_ms: config.retry.max_delay_ms,
        })
    }

    /// Install an error payload inspector.
    #[must_use]
    pub fn with_error_inspector(mut self, inspector: Box<dyn ErrorInspector>) -> Self {
        self.inspector = Some(inspector);
        self
    }

    /// Credential level this client was constructed at.
    #[must_use]
    pub const fn access_level(&self) -> AccessLevel {
        self.access
    }

    // ─────────────────────────────────────────────────────────────────────
    // Pipeline
    // ─────────────────────────────────────────────────────────────────────

    /// Fetch one page of a readable resource.
    ///
    /// Checks the access gate, issues the request, extracts the tagged
    /// fragments, and deserializes them. Calling this with a write kind is
    /// a programming error.
    #[instrument(skip(self, params), fields(resource = %resource))]
    pub async fn fetch(&self, resource: Resource, params: &Params) -> Result<Page> {
        ensure_allowed(self.access, resource)?;
        let descriptor = request::build(&self.base_url, resource, params)?;
        let body = self.execute(&descriptor).await?;

        let (fragments, next_cursor) = extract(&body, resource);
        let entities = entities::deserialize(&fragments);
        debug!(
            fragments = fragments.len(),
            entities = entities.len(),
            has_next = !next_cursor.is_empty(),
            "fetched page"
        );

        Ok(Page {
            entities,
            next_cursor,
        })
    }

    /// Issue a write operation. Reports `true` on success; a transport
    /// failure propagates as the error it was.
    #[instrument(skip(self, params), fields(resource = %resource))]
    pub async fn post(&self, resource: Resource, params: &Params) -> Result<bool> {
        ensure_allowed(self.access, resource)?;
        let descriptor = request::build(&self.base_url, resource, params)?;
        self.execute(&descriptor).await?;
        Ok(true)
    }

    /// Follow cursors until `max_items` entities are collected or the
    /// collection is exhausted.
    pub async fn fetch_all(
        &self,
        resource: Resource,
        params: &Params,
        max_items: usize,
    ) -> Result<Vec<Entity>> {
        let mut params = params.clone();
        let mut out = Vec::new();
        loop {
            let page = self.fetch(resource, &params).await?;
            let exhausted = page.entities.is_empty() || page.next_cursor.is_empty();
            out.extend(page.entities);
            if out.len() >= max_items {
                out.truncate(max_items);
                break;
            }
            if exhausted {
                break;
            }
            params.cursor = Some(page.next_cursor);
        }
        Ok(out)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Transport
    // ─────────────────────────────────────────────────────────────────────

    async fn execute(&self, descriptor: &RequestDescriptor) -> Result<Value> {
        let mut delay = Duration::from_millis(self.initial_delay_ms);
        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(
                attempt = attempts,
                method = %descriptor.method,
                url = %descriptor.url,
                "issuing API request"
            );

            match self.send(descriptor).await {
                Ok(response) => match self.handle_response(response).await {
                    Ok(body) => return Ok(body),
                    Err(e) if e.is_retryable() && attempts < self.max_retries => {
                        if let Some(retry_after) = e.retry_after() {
                            delay = retry_after;
                        }
                        warn!(
                            attempt = attempts,
                            delay_ms = delay.as_millis(),
                            error = %e,
                            "retrying API request"
                        );
                        tokio::time::sleep(delay).await;
                        delay = std::cmp::min(delay * 2, Duration::from_millis(self.max_delay_ms));
                    }
                    Err(e) => return Err(e),
                },
                Err(Error::Http(e))
                    if (e.is_timeout() || e.is_connect()) && attempts < self.max_retries =>
                {
                    warn!(
                        attempt = attempts,
                        delay_ms = delay.as_millis(),
                        error = %e,
                        "retrying after connection error"
                    );
                    tokio::time::sleep(delay).await;
                    delay = std::cmp::min(delay * 2, Duration::from_millis(self.max_delay_ms));
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send(&self, descriptor: &RequestDescriptor) -> Result<Response> {
        let mut req = self
            .http
            .request(descriptor.method.clone(), &descriptor.url)
            .header("Authorization", format!("Bearer {}", self.bearer_token));

        if !descriptor.query.is_empty() {
            req = req.query(&descriptor.query);
        }
        if let Some(body) = &descriptor.body {
            req = req.json(body);
        }

        req = match self.access {
            AccessLevel::User => {
                let auth = self.auth_token.as_deref().unwrap_or_default();
                let csrf = self.csrf_token.as_deref().unwrap_or_default();
                req.header("Cookie", format!("auth_token={auth}; ct0={csrf}"))
                    .header("x-csrf-token", csrf)
            }
            AccessLevel::Guest => req.header("x-guest-token", self.guest_token().await?),
        };

        req.send().await.map_err(Error::Http)
    }

    /// Guest token for this client, activating one on first use. Concurrent
    /// first callers share a single activation request.
    async fn guest_token(&self) -> Result<&str> {
        self.guest_token
            .get_or_try_init(|| self.activate_guest_token())
            .await
            .map(String::as_str)
    }

    async fn activate_guest_token(&self) -> Result<String> {
        debug!("activating guest session");
        let response = self
            .http
            .post(format!("{}/1.1/guest/activate.json", self.base_url))
            .header("Authorization", format!("Bearer {}", self.bearer_token))
            .send()
            .await?;

        let body = self.handle_response(response).await?;
        body.get("guest_token")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::Auth("activation response carried no guest_token".into()))
    }

    async fn handle_response(&self, response: Response) -> Result<Value> {
        let status = response.status();

        let rate_limit = RateLimitInfo::from_headers(response.headers());
        if rate_limit.is_exhausted() {
            debug!(reset = ?rate_limit.reset, "rate limit exhausted");
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = rate_limit
                .time_until_reset()
                .map_or(60, |d| d.as_secs());
            return Err(Error::RateLimited { retry_after });
        }

        let bytes = response.bytes().await?;

        if status.is_success() {
            serde_json::from_slice(&bytes).map_err(Error::from)
        } else {
            let payload: Value = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                json!({ "errors": [{ "message": String::from_utf8_lossy(&bytes) }] })
            });
            if let Some(inspector) = &self.inspector {
                inspector.on_api_error(status.as_u16(), &payload);
            }

            let (message, code) = platform_error(&payload);
            Err(Error::Api {
                status: status.as_u16(),
                message,
                code,
                retry_after: rate_limit.time_until_reset().map(|d| d.as_secs()),
            })
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Read operations
    // ─────────────────────────────────────────────────────────────────────

    /// Get a tweet by id.
    pub async fn tweet_detail(&self, tweet_id: &str) -> Result<Option<Tweet>> {
        let params = Params {
            id: Some(tweet_id.to_string()),
            ..Params::default()
        };
        let page = self.fetch(Resource::TweetDetail, &params).await?;
        Ok(page.entities.into_iter().find_map(Entity::into_tweet))
    }

    /// Get a user by handle.
    pub async fn user_by_screen_name(&self, screen_name: &str) -> Result<Option<User>> {
        let params = Params {
            screen_name: Some(screen_name.to_string()),
            ..Params::default()
        };
        let page = self.fetch(Resource::UserByScreenName, &params).await?;
        Ok(page.entities.into_iter().find_map(Entity::into_user))
    }

    /// Get a user by numeric id.
    pub async fn user_by_id(&self, user_id: &str) -> Result<Option<User>> {
        let params = Params {
            id: Some(user_id.to_string()),
            ..Params::default()
        };
        let page = self.fetch(Resource::UserById, &params).await?;
        Ok(page.entities.into_iter().find_map(Entity::into_user))
    }

    /// Get a page of a user's timeline.
    pub async fn user_tweets(
        &self,
        user_id: &str,
        count: Option<u32>,
        cursor: Option<&str>,
    ) -> Result<Page> {
        self.fetch(Resource::UserTweets, &timeline_params(Some(user_id), count, cursor))
            .await
    }

    /// Get a page of a user's timeline, replies included.
    pub async fn user_tweets_and_replies(
        &self,
        user_id: &str,
        count: Option<u32>,
        cursor: Option<&str>,
    ) -> Result<Page> {
        self.fetch(
            Resource::UserTweetsAndReplies,
            &timeline_params(Some(user_id), count, cursor),
        )
        .await
    }

    /// Get a page of the home timeline.
    pub async fn home_timeline(&self, count: Option<u32>, cursor: Option<&str>) -> Result<Page> {
        self.fetch(Resource::HomeTimeline, &timeline_params(None, count, cursor))
            .await
    }

    /// Search tweets.
    pub async fn search(
        &self,
        query: &str,
        count: Option<u32>,
        cursor: Option<&str>,
    ) -> Result<Page> {
        let params = Params {
            query: Some(query.to_string()),
            count,
            cursor: cursor.map(str::to_string),
            ..Params::default()
        };
        self.fetch(Resource::SearchTimeline, &params).await
    }

    /// Get a page of a user's followers.
    pub async fn followers(
        &self,
        user_id: &str,
        count: Option<u32>,
        cursor: Option<&str>,
    ) -> Result<Page> {
        self.fetch(Resource::Followers, &timeline_params(Some(user_id), count, cursor))
            .await
    }

    /// Get a page of the accounts a user follows.
    pub async fn following(
        &self,
        user_id: &str,
        count: Option<u32>,
        cursor: Option<&str>,
    ) -> Result<Page> {
        self.fetch(Resource::Following, &timeline_params(Some(user_id), count, cursor))
            .await
    }

    // ─────────────────────────────────────────────────────────────────────
    // Write operations
    // ─────────────────────────────────────────────────────────────────────

    /// Publish a tweet.
    pub async fn create_tweet(&self, text: &str) -> Result<bool> {
        let params = Params {
            text: Some(text.to_string()),
            ..Params::default()
        };
        self.post(Resource::CreateTweet, &params).await
    }

    /// Delete a tweet.
    pub async fn delete_tweet(&self, tweet_id: &str) -> Result<bool> {
        self.post(Resource::DeleteTweet, &id_params(tweet_id)).await
    }

    /// Like a tweet.
    pub async fn favorite_tweet(&self, tweet_id: &str) -> Result<bool> {
        self.post(Resource::FavoriteTweet, &id_params(tweet_id)).await
    }

    /// Remove a like.
    pub async fn unfavorite_tweet(&self, tweet_id: &str) -> Result<bool> {
        self.post(Resource::UnfavoriteTweet, &id_params(tweet_id))
            .await
    }
}

fn timeline_params(id: Option<&str>, count: Option<u32>, cursor: Option<&str>) -> Params {
    Params {
        id: id.map(str::to_string),
        count,
        cursor: cursor.map(str::to_string),
        ..Params::default()
    }
}

fn id_params(id: &str) -> Params {
    Params {
        id: Some(id.to_string()),
        ..Params::default()
    }
}

fn platform_error(payload: &Value) -> (String, Option<i32>) {
    let first = payload.get("errors").and_then(|errors| errors.get(0));
    let message = first
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    let code = first
        .and_then(|e| e.get("code"))
        .and_then(Value::as_i64)
        .and_then(|c| i32::try_from(c).ok());
    (message, code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_token_without_csrf_is_rejected() {
        let config = Config {
            auth_token: Some("tok".into()),
            ..Config::default()
        };
        assert!(matches!(Client::new(&config), Err(Error::Config(_))));
    }

    #[test]
    fn credential_level_follows_stored_token() {
        let guest = Client::new(&Config::default()).unwrap();
        assert_eq!(guest.access_level(), AccessLevel::Guest);

        let user = Client::new(&Config {
            auth_token: Some("tok".into()),
            csrf_token: Some("ct0".into()),
            ..Config::default()
        })
        .unwrap();
        assert_eq!(user.access_level(), AccessLevel::User);
    }

    #[test]
    fn platform_error_reads_the_first_entry() {
        let payload = serde_json::json!({
            "errors": [
                { "message": "Rate limit exceeded", "code": 88 },
                { "message": "secondary", "code": 99 }
            ]
        });
        let (message, code) = platform_error(&payload);
        assert_eq!(message, "Rate limit exceeded");
        assert_eq!(code, Some(88));
    }

    #[test]
    fn platform_error_tolerates_unshaped_payloads() {
        let (message, code) = platform_error(&serde_json::json!({ "detail": "nope" }));
        assert_eq!(message, "unknown error");
        assert_eq!(code, None);
    }
}
