//! Remote API capability and its Twitter v1.1 implementation.

pub mod error;
pub mod oauth;
pub mod rate_limit;
pub mod twitter;

pub use error::{ApiError, ApiResult};
pub use oauth::Credentials;
pub use rate_limit::RateLimitTracker;
pub use twitter::TwitterClient;

use crate::{CandidateUser, PostId, PostItem, UserId};

/// What the harvesting core needs from the social network.
///
/// Implementations block (sleep) on rate limits and only return once a request could proceed.
pub trait SocialApi {
    /// Follower ids of `account`, in API order.
    fn list_follower_ids(&self, account: &str) -> ApiResult<Vec<UserId>>;

    /// Full profile for `id`.
    fn get_profile(&self, id: UserId) -> ApiResult<CandidateUser>;

    /// One timeline page, newest first. `max_id` bounds the page to posts with id <= max_id.
    fn get_posts(
        &self,
        user_id: UserId,
        page_size: usize,
        max_id: Option<PostId>,
    ) -> ApiResult<Vec<PostItem>>;

    /// Publish a status from the authenticated account.
    fn post_status(&self, text: &str) -> ApiResult<()>;
}
