//! Load `.followharvest.toml` and environment overrides into [`Opts`].
//!
//! Precedence: built-in defaults, then the file's `[settings]` section, then environment
//! (`FOLLOWHARVEST_*`, also read from `.env` in the same directory).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::Opts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub struct SettingsToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    seed_account: Option<String>,
    db_path: Option<String>,
    credentials: Option<String>,
    verbose: Option<bool>,
    status_updates: Option<bool>,
    follower_pages: Option<usize>,
}

/// Load the settings file from `dir`. `Ok(None)` when there is no file; a file that exists
/// but cannot be read or parsed is an error.
pub fn load_settings_toml(dir: &Path) -> Result<Option<SettingsToml>> {
    let path = dir.join(PackagePaths::get().settings_filename());
    if !path.is_file() {
        return Ok(None);
    }
    let s = std::fs::read_to_string(&path)
        .with_context(|| format!("read settings file {}", path.display()))?;
    let file = toml::from_str(&s)
        .with_context(|| format!("parse settings file {}", path.display()))?;
    Ok(Some(file))
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $opts:expr, $sec_field:ident => $opts_field:ident) => {
        if let Some(v) = $sec.$sec_field.clone() {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file settings to opts (only fields present in the file).
pub fn apply_file_to_opts(file: &SettingsToml, opts: &mut Opts) {
    let sec = &file.settings;
    apply_file_opt!(sec, opts, seed_account => seed_account);
    if let Some(ref p) = sec.db_path {
        opts.db_path = PathBuf::from(p);
    }
    if let Some(ref p) = sec.credentials {
        opts.credentials_path = PathBuf::from(p);
    }
    apply_file_opt!(sec, opts, verbose => verbose);
    apply_file_opt!(sec, opts, status_updates => status_updates);
    apply_file_opt!(sec, opts, follower_pages => follower_pages);
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Apply `FOLLOWHARVEST_{CREDENTIALS,DB_PATH,SEED_ACCOUNT,VERBOSE}` from `lookup`.
pub fn apply_env_to_opts<F>(opts: &mut Opts, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let paths = PackagePaths::get();
    let get = |suffix: &str| {
        lookup(&paths.env_var(suffix))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };
    if let Some(p) = get("CREDENTIALS") {
        opts.credentials_path = PathBuf::from(p);
    }
    if let Some(p) = get("DB_PATH") {
        opts.db_path = PathBuf::from(p);
    }
    if let Some(s) = get("SEED_ACCOUNT") {
        opts.seed_account = s;
    }
    if let Some(v) = get("VERBOSE").as_deref().and_then(parse_flag) {
        opts.verbose = v;
    }
}

/// Build opts for a run from `dir`: defaults → settings file → `.env` / process environment.
pub fn load_opts(dir: &Path) -> Result<Opts> {
    let mut opts = Opts::default();
    if let Some(file) = load_settings_toml(dir)? {
        apply_file_to_opts(&file, &mut opts);
    }
    let env_path = dir.join(".env");
    if env_path.is_file() {
        let _ = dotenvy::from_path(&env_path);
    }
    apply_env_to_opts(&mut opts, |k| std::env::var(k).ok());
    Ok(opts)
}
