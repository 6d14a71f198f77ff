//! Shared plumbing for talking to the portal API: configuration, the HTTP
//! transport and its error type, and build metadata.
//!
//! The session cookie lives in the transport's jar. With a session file the
//! jar is carried across restarts; either way a restart is a full reload and
//! goes through reconciliation again.

pub mod api;
#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub(crate) mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}
pub mod config;
pub mod cookies;
pub mod errors;

pub use api::ApiClient;
pub use config::PortalConfig;
pub use cookies::SessionJar;
pub use errors::ApiError;

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

/// Short form of the commit hash for banners and logs.
#[must_use]
pub fn short_commit_hash() -> &'static str {
    if GIT_COMMIT_HASH.len() > 7 {
        &GIT_COMMIT_HASH[0..7]
    } else {
        GIT_COMMIT_HASH
    }
}
