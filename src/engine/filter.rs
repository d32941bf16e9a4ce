//! Candidate filter: profile thresholds plus a dedup check against the store.

use anyhow::Result;

use crate::CandidateUser;
use crate::store::{Collection, DocumentStore};

/// Minimum post count (exclusive) for a candidate to qualify.
pub const MIN_STATUSES: u64 = 100;

/// Pure profile check: non-empty location, > 100 posts, a US timezone, English.
pub fn meets_criteria(c: &CandidateUser) -> bool {
    !c.location.is_empty()
        && c.statuses_count > MIN_STATUSES
        && c.time_zone.as_deref().is_some_and(|tz| tz.contains("US"))
        && c.lang.as_deref() == Some("en")
}

/// True if `c` meets the criteria and has no stored user record yet. Read-only.
pub fn accepts(c: &CandidateUser, store: &dyn DocumentStore) -> Result<bool> {
    if !meets_criteria(c) {
        return Ok(false);
    }
    Ok(!store.find_by_id(Collection::Users, &c.id.to_string())?)
}
