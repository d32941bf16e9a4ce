//! Blocking Twitter v1.1 client: OAuth 1.0a signed requests with rate-limit waiting.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use reqwest::Method;
use reqwest::blocking::{Client, Response};
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;

use super::oauth::OAuthSigner;
use super::rate_limit::wait_until_reset;
use super::{ApiError, ApiResult, Credentials, RateLimitTracker, SocialApi};
use crate::utils::config::{API_BASE_URL, FOLLOWER_IDS_PAGE_SIZE};
use crate::{CandidateUser, PostId, PostItem, UserId};

const FOLLOWER_IDS: &str = "followers/ids.json";
const USERS_SHOW: &str = "users/show.json";
const USER_TIMELINE: &str = "statuses/user_timeline.json";
const STATUS_UPDATE: &str = "statuses/update.json";

/// `created_at` layout used by v1.1 payloads, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

#[derive(Debug, Deserialize)]
struct FollowerIdsPage {
    ids: Vec<UserId>,
    #[serde(default)]
    next_cursor: i64,
}

#[derive(Debug, Default, Deserialize)]
struct Entities {
    #[serde(default)]
    hashtags: Vec<Hashtag>,
}

#[derive(Debug, Deserialize)]
struct Hashtag {
    text: String,
}

#[derive(Debug, Deserialize)]
struct TimelineTweet {
    id: PostId,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    full_text: Option<String>,
    #[serde(default)]
    entities: Entities,
    created_at: String,
}

/// Parse a v1.1 `created_at` timestamp.
pub fn parse_created_at(s: &str) -> ApiResult<DateTime<Utc>> {
    DateTime::parse_from_str(s, CREATED_AT_FORMAT)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| ApiError::Parse(format!("created_at {s:?}: {e}")))
}

/// Parse a `statuses/user_timeline` body into post items (API order preserved).
pub fn parse_timeline(body: &str) -> ApiResult<Vec<PostItem>> {
    let tweets: Vec<TimelineTweet> = serde_json::from_str(body)?;
    tweets
        .into_iter()
        .map(|t| {
            Ok(PostItem {
                id: t.id,
                text: t.full_text.or(t.text).unwrap_or_default(),
                hashtags: t.entities.hashtags.into_iter().map(|h| h.text).collect(),
                created_at: parse_created_at(&t.created_at)?,
            })
        })
        .collect()
}

/// Parse a `users/show` body.
pub fn parse_profile(body: &str) -> ApiResult<CandidateUser> {
    Ok(serde_json::from_str(body)?)
}

fn header_num<T: std::str::FromStr>(resp: &Response, name: &str) -> Option<T> {
    resp.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}

pub struct TwitterClient {
    http: Client,
    signer: OAuthSigner,
    limits: RateLimitTracker,
    base_url: String,
    follower_pages: usize,
}

impl TwitterClient {
    /// Build a client that reads up to `follower_pages` pages of follower ids per listing.
    pub fn new(creds: Credentials, follower_pages: usize) -> ApiResult<Self> {
        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            signer: OAuthSigner::new(creds),
            limits: RateLimitTracker::new(),
            base_url: API_BASE_URL.to_string(),
            follower_pages: follower_pages.max(1),
        })
    }

    /// Per-endpoint rate-limit windows seen so far.
    pub fn rate_limits(&self) -> &RateLimitTracker {
        &self.limits
    }

    /// Point the client at another API root (e.g. a local mock).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Send a signed request, waiting out rate limits. Returns the body of a 2xx response.
    fn request(
        &self,
        method: Method,
        endpoint: &'static str,
        params: &[(String, String)],
    ) -> ApiResult<String> {
        let url = format!("{}/{}", self.base_url, endpoint);
        loop {
            self.limits.wait_if_exhausted(endpoint);
            let auth = self.signer.header(method.as_str(), &url, params)?;
            let builder = if method == Method::POST {
                self.http.post(&url).form(params)
            } else {
                self.http.get(&url).query(params)
            };
            let resp = builder.header(AUTHORIZATION, auth).send()?;

            let reset = header_num::<i64>(&resp, "x-rate-limit-reset");
            self.limits.record(
                endpoint,
                header_num::<u32>(&resp, "x-rate-limit-remaining"),
                reset,
            );

            let status = resp.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let wait = wait_until_reset(Utc::now().timestamp(), reset);
                warn!(
                    "429 from {endpoint}; sleeping {}s before retrying",
                    wait.as_secs()
                );
                std::thread::sleep(wait);
                continue;
            }
            let body = resp.text()?;
            if !status.is_success() {
                return Err(ApiError::from_status(status.as_u16(), body));
            }
            return Ok(body);
        }
    }
}

fn param(k: &str, v: impl ToString) -> (String, String) {
    (k.to_string(), v.to_string())
}

impl SocialApi for TwitterClient {
    fn list_follower_ids(&self, account: &str) -> ApiResult<Vec<UserId>> {
        let mut ids = Vec::new();
        let mut cursor: i64 = -1;
        for page_no in 0..self.follower_pages {
            let params = [
                param("screen_name", account),
                param("cursor", cursor),
                param("count", FOLLOWER_IDS_PAGE_SIZE),
            ];
            let body = self.request(Method::GET, FOLLOWER_IDS, &params)?;
            let page: FollowerIdsPage = serde_json::from_str(&body)?;
            debug!(
                "Follower page {} of @{account}: {} ids",
                page_no + 1,
                page.ids.len()
            );
            ids.extend(page.ids);
            if page.next_cursor == 0 {
                break;
            }
            cursor = page.next_cursor;
        }
        Ok(ids)
    }

    fn get_profile(&self, id: UserId) -> ApiResult<CandidateUser> {
        let body = self.request(Method::GET, USERS_SHOW, &[param("user_id", id)])?;
        parse_profile(&body)
    }

    fn get_posts(
        &self,
        user_id: UserId,
        page_size: usize,
        max_id: Option<PostId>,
    ) -> ApiResult<Vec<PostItem>> {
        let mut params = vec![
            param("user_id", user_id),
            param("count", page_size),
            param("tweet_mode", "extended"),
        ];
        if let Some(max_id) = max_id {
            params.push(param("max_id", max_id));
        }
        let body = self.request(Method::GET, USER_TIMELINE, &params)?;
        parse_timeline(&body)
    }

    fn post_status(&self, text: &str) -> ApiResult<()> {
        self.request(Method::POST, STATUS_UPDATE, &[param("status", text)])?;
        Ok(())
    }
}
