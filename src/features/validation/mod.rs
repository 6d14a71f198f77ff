//! Client-side validation shared by every form: the per-field error map and
//! the rules that fill it. Validation runs wholesale on submit and rebuilds
//! the map from scratch each time.

mod fields;
pub mod rules;

pub use fields::FieldErrors;
pub use rules::PasswordViolation;
