//! Application configuration constants.
//! Quota, paging, and timing in one place.

use std::sync::OnceLock;
use std::time::Duration;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    db_filename: String,
    settings_filename: String,
    env_prefix: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                db_filename: format!("{pkg}.db"),
                settings_filename: format!(".{pkg}.toml"),
                env_prefix: pkg.to_uppercase(),
            }
        })
    }

    pub fn db_filename(&self) -> &str {
        &self.db_filename
    }

    pub fn settings_filename(&self) -> &str {
        &self.settings_filename
    }

    /// Environment variable name for `suffix`, e.g. `FOLLOWHARVEST_CREDENTIALS`.
    pub fn env_var(&self, suffix: &str) -> String {
        format!("{}_{}", self.env_prefix, suffix)
    }
}

// ---- Harvesting ----

/// Accepted users per walk before the walker returns.
pub const TARGET_QUOTA: usize = 5000;

/// Posts requested per timeline page (API maximum).
pub const PAGE_SIZE: usize = 200;

/// Follower ids requested per `followers/ids` page (API maximum).
pub const FOLLOWER_IDS_PAGE_SIZE: usize = 5000;

// ---- Driver timing ----

/// Minimum time between two status summaries.
pub const STATUS_INTERVAL: Duration = Duration::from_secs(3600);

/// Cooldown after a failed walk.
pub const BACKOFF_INTERVAL: Duration = Duration::from_secs(60);

// ---- API ----

/// REST root for the v1.1 API.
pub const API_BASE_URL: &str = "https://api.twitter.com/1.1";

/// Wait applied on HTTP 429 when no reset header came back.
pub const RATE_LIMIT_FALLBACK_WAIT: Duration = Duration::from_secs(60);

/// Slack added to the advertised reset time before retrying.
pub const RATE_LIMIT_RESET_SLACK: Duration = Duration::from_secs(1);

/// Status text limit.
pub const STATUS_MAX_CHARS: usize = 280;

// ---- Database ----

/// Documents per chunk inside one `insert_many` transaction.
pub const DB_INSERT_BATCH_SIZE: usize = 1000;
