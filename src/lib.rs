//! Client core for the tax declaration portal: session reconciliation, access
//! gating, shared field validation and the form submit lifecycle, plus the
//! interactive terminal front end built on top of them.

pub mod cli;
pub mod features;
pub mod portal;
