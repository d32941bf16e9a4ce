//! Shared fixtures: a scripted API, a fake clock, and candidate/post builders.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use followharvest::api::{ApiError, ApiResult, SocialApi};
use followharvest::engine::Clock;
use followharvest::{CandidateUser, PostId, PostItem, UserId};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

/// A candidate that passes every profile criterion.
pub fn qualifying(id: UserId) -> CandidateUser {
    CandidateUser {
        id,
        location: "Austin, TX".to_string(),
        statuses_count: 500,
        followers_count: 42,
        description: format!("user {id}"),
        lang: Some("en".to_string()),
        time_zone: Some("Central Time (US & Canada)".to_string()),
    }
}

/// A candidate that fails the criteria (too few posts).
pub fn irrelevant(id: UserId) -> CandidateUser {
    CandidateUser {
        statuses_count: 3,
        ..qualifying(id)
    }
}

/// `n` posts with strictly descending ids starting at `newest_id`.
pub fn posts(newest_id: PostId, n: usize) -> Vec<PostItem> {
    let date = Utc.with_ymd_and_hms(2016, 10, 1, 12, 0, 0).unwrap();
    (0..n as u64)
        .map(|i| PostItem {
            id: newest_id - i,
            text: format!("post {}", newest_id - i),
            hashtags: vec!["vote".to_string(), format!("tag{i}")],
            created_at: date,
        })
        .collect()
}

/// Consecutive timeline pages with the given sizes, ids continuing across pages.
pub fn pages_of(sizes: &[usize]) -> Vec<Vec<PostItem>> {
    let mut next_id: PostId = 1_000_000;
    sizes
        .iter()
        .map(|&n| {
            let page = posts(next_id, n);
            next_id -= n as u64;
            page
        })
        .collect()
}

/// In-memory [`SocialApi`] driven by scripts, recording every call.
#[derive(Default)]
pub struct ScriptedApi {
    /// One entry per `list_follower_ids` call; the last entry repeats. `Err` strings become network errors.
    pub follower_lists: RefCell<VecDeque<Result<Vec<UserId>, String>>>,
    pub profiles: HashMap<UserId, CandidateUser>,
    /// Per-user timeline pages, served in order; `Err` strings become `Forbidden`. Exhausted → empty page.
    pub pages: RefCell<HashMap<UserId, VecDeque<Result<Vec<PostItem>, String>>>>,
    pub follower_calls: Cell<usize>,
    pub profile_calls: RefCell<Vec<UserId>>,
    pub post_calls: RefCell<Vec<(UserId, Option<PostId>)>>,
    pub statuses: RefCell<Vec<String>>,
    pub fail_status: Cell<bool>,
}

impl ScriptedApi {
    pub fn with_followers(followers: Vec<UserId>) -> Self {
        let api = Self::default();
        api.follower_lists.borrow_mut().push_back(Ok(followers));
        api
    }

    pub fn profile(mut self, c: CandidateUser) -> Self {
        self.profiles.insert(c.id, c);
        self
    }

    pub fn timeline(self, user: UserId, pages: Vec<Vec<PostItem>>) -> Self {
        self.pages
            .borrow_mut()
            .insert(user, pages.into_iter().map(Ok).collect());
        self
    }

    pub fn timeline_script(self, user: UserId, script: Vec<Result<Vec<PostItem>, String>>) -> Self {
        self.pages.borrow_mut().insert(user, script.into());
        self
    }

    pub fn post_calls_for(&self, user: UserId) -> Vec<Option<PostId>> {
        self.post_calls
            .borrow()
            .iter()
            .filter(|(u, _)| *u == user)
            .map(|(_, m)| *m)
            .collect()
    }
}

impl SocialApi for ScriptedApi {
    fn list_follower_ids(&self, _account: &str) -> ApiResult<Vec<UserId>> {
        self.follower_calls.set(self.follower_calls.get() + 1);
        let mut lists = self.follower_lists.borrow_mut();
        let entry = if lists.len() > 1 {
            lists.pop_front()
        } else {
            lists.front().cloned()
        };
        match entry {
            Some(Ok(ids)) => Ok(ids),
            Some(Err(msg)) => Err(ApiError::Network(msg)),
            None => Ok(Vec::new()),
        }
    }

    fn get_profile(&self, id: UserId) -> ApiResult<CandidateUser> {
        self.profile_calls.borrow_mut().push(id);
        self.profiles
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("user {id}")))
    }

    fn get_posts(
        &self,
        user_id: UserId,
        _page_size: usize,
        max_id: Option<PostId>,
    ) -> ApiResult<Vec<PostItem>> {
        self.post_calls.borrow_mut().push((user_id, max_id));
        let next = self
            .pages
            .borrow_mut()
            .get_mut(&user_id)
            .and_then(|q| q.pop_front());
        match next {
            Some(Ok(page)) => Ok(page),
            Some(Err(msg)) => Err(ApiError::Forbidden(msg)),
            None => Ok(Vec::new()),
        }
    }

    fn post_status(&self, text: &str) -> ApiResult<()> {
        if self.fail_status.get() {
            return Err(ApiError::Status {
                status: 503,
                message: "over capacity".to_string(),
            });
        }
        self.statuses.borrow_mut().push(text.to_string());
        Ok(())
    }
}

/// Clock that only moves when told to (or when slept on).
pub struct FakeClock {
    base: Instant,
    offset: Cell<Duration>,
    pub sleeps: RefCell<Vec<Duration>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Cell::new(Duration::ZERO),
            sleeps: RefCell::new(Vec::new()),
        }
    }

    pub fn advance(&self, d: Duration) {
        self.offset.set(self.offset.get() + d);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.base + self.offset.get()
    }

    fn sleep(&self, d: Duration) {
        self.sleeps.borrow_mut().push(d);
        self.advance(d);
    }
}
