//! Feature modules. Each one owns its wire types and API calls; `forms`
//! builds the submit lifecycle on top of them.

pub mod auth;
pub mod declarations;
pub mod forms;
pub mod users;
pub mod validation;
