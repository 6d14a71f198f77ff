//! Accounts: registration, the admin listing and status toggling.

pub mod client;
pub mod listing;
pub mod types;
