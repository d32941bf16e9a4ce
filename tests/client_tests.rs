//! TwitterClient against a mock HTTP server: paging, 429 retry, header bookkeeping, status
//! mapping, and form posts.
//!
//! The client is blocking, so tests are plain `#[test]` functions that own a runtime for the
//! mock server and call the client outside of it.

use followharvest::api::rate_limit::RateWindow;
use followharvest::api::{ApiError, Credentials, SocialApi, TwitterClient};
use followharvest::engine::{HarvestContext, harvest_posts};
use followharvest::store::{Collection, DocumentStore, SqliteStore};
use followharvest::{HarvestOutcome, Opts};
use tokio::runtime::Runtime;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

struct Harness {
    server: MockServer,
    rt: Runtime,
}

impl Harness {
    fn new() -> Self {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        Self { server, rt }
    }

    fn mount(&self, mock: Mock) {
        self.rt.block_on(mock.mount(&self.server));
    }

    fn requests(&self) -> Vec<Request> {
        self.rt
            .block_on(self.server.received_requests())
            .unwrap()
    }

    fn client(&self, follower_pages: usize) -> TwitterClient {
        TwitterClient::new(creds(), follower_pages)
            .unwrap()
            .with_base_url(self.server.uri())
    }
}

fn creds() -> Credentials {
    Credentials {
        consumer_key: "ck".to_string(),
        consumer_secret: "cs".to_string(),
        access_key: "ak".to_string(),
        access_secret: "as".to_string(),
    }
}

fn query(r: &Request, key: &str) -> Option<String> {
    r.url
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

fn authorization(r: &Request) -> String {
    r.headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

const PROFILE: &str = r#"{"id": 12, "location": "Boston, MA", "statuses_count": 800,
    "followers_count": 5, "description": "hi", "lang": "en",
    "time_zone": "Eastern Time (US & Canada)"}"#;

// --- followers/ids ---

#[test]
fn test_follower_ids_retry_429_then_follow_cursor() {
    let h = Harness::new();
    h.mount(
        Mock::given(method("GET"))
            .and(path("/followers/ids.json"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("x-rate-limit-reset", "0")
                    .set_body_string(r#"{"errors":[{"code":88}]}"#),
            )
            .up_to_n_times(1),
    );
    h.mount(
        Mock::given(method("GET"))
            .and(path("/followers/ids.json"))
            .and(query_param("cursor", "-1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"ids":[1,2],"next_cursor":77}"#),
            ),
    );
    h.mount(
        Mock::given(method("GET"))
            .and(path("/followers/ids.json"))
            .and(query_param("cursor", "77"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"ids":[3],"next_cursor":0}"#),
            ),
    );
    let client = h.client(5);

    assert_eq!(client.list_follower_ids("seed").unwrap(), vec![1, 2, 3]);

    let reqs = h.requests();
    let cursors: Vec<_> = reqs.iter().map(|r| query(r, "cursor")).collect();
    assert_eq!(
        cursors,
        vec![
            Some("-1".to_string()),
            Some("-1".to_string()),
            Some("77".to_string())
        ]
    );
    for r in &reqs {
        assert_eq!(query(r, "screen_name").as_deref(), Some("seed"));
        assert!(authorization(r).starts_with("OAuth "));
    }
}

#[test]
fn test_follower_ids_capped_at_configured_pages() {
    let h = Harness::new();
    h.mount(
        Mock::given(method("GET"))
            .and(path("/followers/ids.json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"ids":[1,2],"next_cursor":77}"#),
            ),
    );
    let client = h.client(1);

    assert_eq!(client.list_follower_ids("seed").unwrap(), vec![1, 2]);
    assert_eq!(h.requests().len(), 1);
}

// --- users/show ---

#[test]
fn test_profile_records_rate_limit_headers() {
    let h = Harness::new();
    h.mount(
        Mock::given(method("GET"))
            .and(path("/users/show.json"))
            .and(query_param("user_id", "12"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-rate-limit-remaining", "899")
                    .insert_header("x-rate-limit-reset", "4102444800")
                    .set_body_string(PROFILE),
            ),
    );
    let client = h.client(1);

    let c = client.get_profile(12).unwrap();
    assert_eq!(c.id, 12);
    assert_eq!(c.time_zone.as_deref(), Some("Eastern Time (US & Canada)"));
    assert_eq!(
        client.rate_limits().window("users/show.json"),
        Some(RateWindow {
            remaining: 899,
            reset_epoch: 4102444800,
        })
    );
}

#[test]
fn test_error_statuses_map_to_variants() {
    let h = Harness::new();
    h.mount(
        Mock::given(method("GET"))
            .and(path("/users/show.json"))
            .and(query_param("user_id", "1"))
            .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"errors":[{"code":50}]}"#)),
    );
    h.mount(
        Mock::given(method("GET"))
            .and(path("/users/show.json"))
            .and(query_param("user_id", "2"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops")),
    );
    h.mount(
        Mock::given(method("GET"))
            .and(path("/followers/ids.json"))
            .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"errors":[{"code":32}]}"#)),
    );
    let client = h.client(1);

    assert!(matches!(client.get_profile(1), Err(ApiError::NotFound(_))));
    assert!(matches!(
        client.list_follower_ids("seed"),
        Err(ApiError::Unauthorized(_))
    ));
    match client.get_profile(2) {
        Err(ApiError::Status { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "oops");
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

// --- statuses/user_timeline ---

#[test]
fn test_forbidden_timeline_skips_harvest() {
    let h = Harness::new();
    h.mount(
        Mock::given(method("GET"))
            .and(path("/statuses/user_timeline.json"))
            .respond_with(
                ResponseTemplate::new(403).set_body_string(r#"{"error":"Not authorized."}"#),
            ),
    );
    let client = h.client(1);

    assert!(matches!(
        client.get_posts(7, 200, None),
        Err(ApiError::Forbidden(_))
    ));

    let store = SqliteStore::open_in_memory().unwrap();
    let opts = Opts::default();
    let ctx = HarvestContext::new(&client, &store, &opts);
    let outcome = harvest_posts(&ctx, 7).unwrap();
    assert!(matches!(outcome, HarvestOutcome::Skipped { .. }));
    assert_eq!(store.count(Collection::Tweets).unwrap(), 0);
}

#[test]
fn test_timeline_pages_with_max_id_and_extended_text() {
    let h = Harness::new();
    h.mount(
        Mock::given(method("GET"))
            .and(path("/statuses/user_timeline.json"))
            .and(query_param("tweet_mode", "extended"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"id": 500, "full_text": "the whole post #vote",
                     "created_at": "Sat Oct 01 12:00:00 +0000 2016",
                     "entities": {"hashtags": [{"text": "vote"}]}}]"#,
            ))
            .up_to_n_times(1),
    );
    h.mount(
        Mock::given(method("GET"))
            .and(path("/statuses/user_timeline.json"))
            .and(query_param("max_id", "499"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]")),
    );
    let client = h.client(1);
    let store = SqliteStore::open_in_memory().unwrap();
    let opts = Opts::default();
    let ctx = HarvestContext::new(&client, &store, &opts);

    assert_eq!(
        harvest_posts(&ctx, 7).unwrap(),
        HarvestOutcome::Harvested { posts: 1 }
    );
    let reqs = h.requests();
    assert_eq!(reqs.len(), 2);
    assert_eq!(query(&reqs[0], "user_id").as_deref(), Some("7"));
    assert_eq!(query(&reqs[0], "max_id"), None);
    assert_eq!(query(&reqs[1], "max_id").as_deref(), Some("499"));

    let body = store.get(Collection::Tweets, "500").unwrap().unwrap();
    assert_eq!(body["message"], "the whole post #vote");
    assert_eq!(body["hashtags"], serde_json::json!(["vote"]));
}

// --- statuses/update ---

#[test]
fn test_post_status_is_form_post() {
    let h = Harness::new();
    h.mount(
        Mock::given(method("POST"))
            .and(path("/statuses/update.json"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string("status=hourly+ok"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}")),
    );
    let client = h.client(1);

    client.post_status("hourly ok").unwrap();

    let reqs = h.requests();
    assert_eq!(reqs.len(), 1);
    assert!(authorization(&reqs[0]).starts_with("OAuth "));
}
