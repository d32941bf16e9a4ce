//! Explicit harvest context: the API and store handles plus settings, built once at startup.

use crate::Opts;
use crate::api::SocialApi;
use crate::store::DocumentStore;

/// Shared handles passed by reference into the walker, harvester, and driver.
pub struct HarvestContext<'a> {
    pub api: &'a dyn SocialApi,
    pub store: &'a dyn DocumentStore,
    pub opts: &'a Opts,
}

impl<'a> HarvestContext<'a> {
    pub fn new(api: &'a dyn SocialApi, store: &'a dyn DocumentStore, opts: &'a Opts) -> Self {
        Self { api, store, opts }
    }
}
