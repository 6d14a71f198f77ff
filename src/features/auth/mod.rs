//! Session continuity: the API calls, the session store and the access gate.

pub mod client;
pub mod guards;
pub mod state;
pub mod types;
