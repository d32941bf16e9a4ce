//! Follower walker: evaluate the seed account's followers until `target_quota` users are ingested.

use anyhow::{Context, Result, bail};
use log::{debug, info};

use crate::engine::HarvestContext;
use crate::engine::filter::accepts;
use crate::engine::harvester::harvest_posts;
use crate::store::{ClaimOutcome, Collection, Record};
use crate::{HarvestOutcome, StoredUser};

/// Walk followers, re-reading the list from the start on each pass, until `target_quota`
/// users have been accepted. Returns the accepted count.
///
/// Errors from profile fetches or the store propagate; recovery belongs to the driver.
pub fn walk(ctx: &HarvestContext<'_>, target_quota: usize) -> Result<usize> {
    let seed = ctx.opts.seed_account.as_str();
    let mut accepted = 0_usize;

    while accepted < target_quota {
        let followers = ctx
            .api
            .list_follower_ids(seed)
            .with_context(|| format!("list followers of @{seed}"))?;
        if followers.is_empty() {
            bail!("@{seed} returned no followers");
        }
        debug!("Walking {} followers of @{seed}", followers.len());

        for id in followers {
            if accepted >= target_quota {
                break;
            }
            let candidate = ctx
                .api
                .get_profile(id)
                .with_context(|| format!("fetch profile {id}"))?;
            if !accepts(&candidate, ctx.store)? {
                info!("User {id}: irrelevant user");
                continue;
            }

            let user = StoredUser::from(&candidate).to_document()?;
            if ctx.store.claim(Collection::Users, &user)? == ClaimOutcome::AlreadyPresent {
                info!("User {id}: already claimed, skipping");
                continue;
            }

            let outcome = harvest_posts(ctx, id)?;
            accepted += 1;
            match outcome {
                HarvestOutcome::Harvested { posts } => {
                    info!("User {id} inserted with {posts} posts ({accepted}/{target_quota})")
                }
                HarvestOutcome::Skipped { .. } => {
                    info!("User {id} inserted without posts ({accepted}/{target_quota})")
                }
            }
        }
    }
    Ok(accepted)
}
