//! Process entry: settings, logging, credentials, store, client, then the driver loop.

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::Path;

use crate::api::TwitterClient;
use crate::engine::{Driver, HarvestContext, SystemClock};
use crate::store::SqliteStore;
use crate::utils::config::TARGET_QUOTA;
use crate::utils::{load_credentials, load_opts, setup_logging};

/// Start harvesting with settings from `dir`. Only returns on a startup error.
pub fn handle_run(dir: &Path) -> Result<()> {
    let opts = load_opts(dir)?;
    setup_logging(opts.verbose);
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );

    let creds = load_credentials(&opts.credentials_path)?;
    let store = SqliteStore::open(&opts.db_path)?;
    let api = TwitterClient::new(creds, opts.follower_pages).context("build API client")?;
    info!(
        "Harvesting followers of @{} into {} (quota {TARGET_QUOTA} per walk)",
        opts.seed_account,
        opts.db_path.display()
    );

    let ctx = HarvestContext::new(&api, &store, &opts);
    Driver::new(&ctx, SystemClock, TARGET_QUOTA).run()
}
