use crate::cli::{
    actions::Action,
    commands::{
        self,
        logging::{ARG_LOG_JSON, ARG_VERBOSITY},
    },
    dispatch::handler,
    telemetry,
};
use anyhow::Result;

/// Start the CLI
///
/// # Errors
/// Returns an error if logging can't be initialized or the arguments are invalid.
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    let verbosity = matches.get_one::<u8>(ARG_VERBOSITY).copied().unwrap_or(0);
    telemetry::init(
        Some(telemetry::verbosity_level(verbosity)),
        matches.get_flag(ARG_LOG_JSON),
    )?;

    handler(&matches)
}
