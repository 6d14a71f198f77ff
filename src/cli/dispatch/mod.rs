use crate::{
    cli::{
        actions::{shell, Action},
        commands::{ARG_API_URL, ARG_NO_SESSION_FILE, ARG_SESSION_FILE, ARG_TIMEOUT},
    },
    portal::{
        config::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECONDS},
        cookies::default_session_file,
        PortalConfig,
    },
};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// # Errors
/// Returns an error if the API URL or timeout is invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let api_url = matches
        .get_one::<String>(ARG_API_URL)
        .map_or(DEFAULT_API_URL, String::as_str);
    let timeout = matches
        .get_one::<u64>(ARG_TIMEOUT)
        .copied()
        .unwrap_or(DEFAULT_TIMEOUT_SECONDS);

    let mut config = PortalConfig::new(api_url, timeout).context("invalid portal configuration")?;

    let session_file = if matches.get_flag(ARG_NO_SESSION_FILE) {
        None
    } else {
        matches
            .get_one::<PathBuf>(ARG_SESSION_FILE)
            .cloned()
            .or_else(default_session_file)
    };
    if let Some(path) = session_file {
        config = config.with_session_file(path);
    }

    Ok(Action::Shell(shell::Args { config }))
}
