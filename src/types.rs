//! Public and internal types for the harvester: API-side shapes, stored records, and options.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

use crate::store::Collection;
use crate::utils::config::PackagePaths;

/// Remote user identifier.
pub type UserId = u64;

/// Remote post identifier. Also the pagination cursor (`max_id`).
pub type PostId = u64;

/// Treat JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(d).map(Option::unwrap_or_default)
}

/// A user profile fetched for evaluation. Never persisted as-is.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct CandidateUser {
    pub id: UserId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub statuses_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub followers_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Language tag, e.g. `en`.
    #[serde(default)]
    pub lang: Option<String>,
    /// Timezone label. `None` when the user never set one.
    #[serde(default)]
    pub time_zone: Option<String>,
}

/// One post as returned by a timeline page.
#[derive(Clone, Debug, PartialEq)]
pub struct PostItem {
    pub id: PostId,
    pub text: String,
    /// Hashtag texts in the order they appear.
    pub hashtags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Persisted subset of [`CandidateUser`]. Keyed by `id` in the `users` collection.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StoredUser {
    pub id: UserId,
    pub location: String,
    pub nb_tweets: u64,
    pub nb_followers: u64,
    pub description: String,
}

impl From<&CandidateUser> for StoredUser {
    fn from(c: &CandidateUser) -> Self {
        Self {
            id: c.id,
            location: c.location.clone(),
            nb_tweets: c.statuses_count,
            nb_followers: c.followers_count,
            description: c.description.clone(),
        }
    }
}

/// Persisted post. Keyed by `tweet_id` in the `tweets` collection; `user_id` points at a [`StoredUser`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StoredPost {
    pub tweet_id: PostId,
    pub user_id: UserId,
    pub message: String,
    pub hashtags: Vec<String>,
    pub date: DateTime<Utc>,
}

impl StoredPost {
    pub fn from_item(user_id: UserId, item: &PostItem) -> Self {
        Self {
            tweet_id: item.id,
            user_id,
            message: item.text.clone(),
            hashtags: item.hashtags.clone(),
            date: item.created_at,
        }
    }
}

impl crate::store::Record for StoredUser {
    const COLLECTION: Collection = Collection::Users;

    fn key(&self) -> String {
        self.id.to_string()
    }
}

impl crate::store::Record for StoredPost {
    const COLLECTION: Collection = Collection::Tweets;

    fn key(&self) -> String {
        self.tweet_id.to_string()
    }
}

/// Result of harvesting one user's timeline.
///
/// `Skipped` means the API refused or failed mid-pagination and nothing was written;
/// `Harvested { posts: 0 }` means the user simply has no posts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HarvestOutcome {
    Harvested { posts: usize },
    Skipped { reason: String },
}

impl HarvestOutcome {
    /// Number of posts written (0 when skipped).
    pub fn posts(&self) -> usize {
        match self {
            HarvestOutcome::Harvested { posts } => *posts,
            HarvestOutcome::Skipped { .. } => 0,
        }
    }
}

/// Runtime settings. Quota and page size are compile-time constants in [`crate::utils::config`].
#[derive(Clone, Debug)]
pub struct Opts {
    /// Account whose followers are walked.
    pub seed_account: String,
    /// Document store path.
    pub db_path: PathBuf,
    /// JSON credentials file (consumer/access key pairs).
    pub credentials_path: PathBuf,
    /// Debug-level logging for this crate.
    pub verbose: bool,
    /// Post the hourly status summary to the account (it is always logged).
    pub status_updates: bool,
    /// How many 5000-id pages of followers to read per walk pass.
    pub follower_pages: usize,
}

impl Default for Opts {
    fn default() -> Self {
        let paths = PackagePaths::get();
        Self {
            seed_account: "Twitter".to_string(),
            db_path: PathBuf::from(paths.db_filename()),
            credentials_path: PathBuf::from("access.json"),
            verbose: false,
            status_updates: true,
            follower_pages: 1,
        }
    }
}
