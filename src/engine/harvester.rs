//! Post harvester: page through a user's timeline with `max_id` until an empty page, then
//! store everything in one batch.

use anyhow::Result;
use log::{debug, info, warn};

use crate::api::{ApiResult, SocialApi};
use crate::engine::HarvestContext;
use crate::store::{Collection, Record};
use crate::utils::config::PAGE_SIZE;
use crate::{HarvestOutcome, PostItem, StoredPost, UserId};

/// Cursor for the page after one ending in `last`: its id minus one.
fn next_cursor(last: &PostItem) -> u64 {
    last.id.saturating_sub(1)
}

/// Fetch the full available timeline for `user_id`, newest first.
///
/// An empty page ends pagination; the cursor only moves when a page had items.
pub fn collect_timeline(api: &dyn SocialApi, user_id: UserId) -> ApiResult<Vec<PostItem>> {
    let mut all = api.get_posts(user_id, PAGE_SIZE, None)?;
    let Some(last) = all.last() else {
        return Ok(all);
    };
    let mut oldest = next_cursor(last);
    let mut page_no = 1_usize;

    loop {
        let page = api.get_posts(user_id, PAGE_SIZE, Some(oldest))?;
        page_no += 1;
        if let Some(last) = page.last() {
            oldest = next_cursor(last);
        }
        let n = page.len();
        all.extend(page);
        debug!(
            "User {user_id}: page {page_no} returned {n} posts ({} so far)",
            all.len()
        );
        if n == 0 {
            break;
        }
    }
    Ok(all)
}

/// Harvest and store every available post of `user_id`.
///
/// API failures abandon the user (`Skipped`, nothing written). Store failures propagate.
pub fn harvest_posts(ctx: &HarvestContext<'_>, user_id: UserId) -> Result<HarvestOutcome> {
    let items = match collect_timeline(ctx.api, user_id) {
        Ok(items) => items,
        Err(e) => {
            warn!("User {user_id}: harvest skipped: {e}");
            return Ok(HarvestOutcome::Skipped {
                reason: e.to_string(),
            });
        }
    };
    if items.is_empty() {
        debug!("User {user_id}: no posts");
        return Ok(HarvestOutcome::Harvested { posts: 0 });
    }

    let docs = items
        .iter()
        .map(|item| StoredPost::from_item(user_id, item).to_document())
        .collect::<Result<Vec<_>>>()?;
    let written = ctx.store.insert_many(Collection::Tweets, &docs)?;
    info!("User {user_id}: {written} posts added");
    Ok(HarvestOutcome::Harvested { posts: written })
}
