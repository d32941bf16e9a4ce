//! Credentials loading: a JSON file holding the consumer and access key pairs.

use anyhow::{Context, Result, bail};
use log::info;
use std::path::Path;

use crate::api::Credentials;

/// Read and validate the credentials file. Any failure here is fatal at startup.
pub fn load_credentials(path: &Path) -> Result<Credentials> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("read credentials file {}", path.display()))?;
    let creds: Credentials = serde_json::from_str(&s)
        .with_context(|| format!("parse credentials file {}", path.display()))?;
    let missing: Vec<&str> = [
        ("consumer_key", &creds.consumer_key),
        ("consumer_secret", &creds.consumer_secret),
        ("access_key", &creds.access_key),
        ("access_secret", &creds.access_secret),
    ]
    .into_iter()
    .filter(|(_, v)| v.trim().is_empty())
    .map(|(k, _)| k)
    .collect();
    if !missing.is_empty() {
        bail!(
            "credentials file {} has empty fields: {}",
            path.display(),
            missing.join(", ")
        );
    }
    info!("Credentials loaded from {}", path.display());
    Ok(creds)
}
