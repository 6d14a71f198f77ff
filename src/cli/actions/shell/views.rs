//! Plain-text rendering of the portal's views.

use crate::features::{
    auth::state::SessionState,
    declarations::types::Declaration,
    forms::FieldSpec,
    users::listing::ListingView,
    validation::FieldErrors,
};
use std::fmt::Write;

#[must_use]
pub fn whoami(state: &SessionState) -> String {
    match state {
        SessionState::Verifying => "Checking access...".to_string(),
        SessionState::Anonymous => "Not signed in.".to_string(),
        SessionState::Authenticated(session) => {
            let role = if session.is_admin { "administrator" } else { "user" };
            format!(
                "{} <{}> ({role}, id {})",
                session.display_name, session.email, session.user_id
            )
        }
    }
}

#[must_use]
pub fn home(state: &SessionState) -> String {
    match state.session() {
        Some(session) => format!(
            "Welcome back, {}. Type `help` to see what you can do.",
            session.display_name
        ),
        None => "Welcome to the tax portal. `login`, `register` or `forgot-password` to start."
            .to_string(),
    }
}

#[must_use]
pub fn declarations(list: &[Declaration]) -> String {
    if list.is_empty() {
        return "No declarations yet. Use `declare` to file one.".to_string();
    }
    let mut out = format!(
        "{:<6} {:<6} {:>16} {:>16} {:<14} {:<10}\n",
        "ID", "YEAR", "INCOME", "DEDUCTIONS", "STATUS", "CREATED"
    );
    for declaration in list {
        let created = declaration
            .created_at
            .as_deref()
            .map_or("-", |value| value.get(..10).unwrap_or(value));
        let _ = writeln!(
            out,
            "{:<6} {:<6} {:>16.2} {:>16.2} {:<14} {:<10}",
            declaration.id.to_string(),
            declaration.fiscal_year,
            declaration.total_income,
            declaration.deductions.unwrap_or(0.0),
            declaration.status.as_deref().unwrap_or("-"),
            created
        );
    }
    out.trim_end().to_string()
}

#[must_use]
pub fn users(view: &ListingView) -> String {
    let mut out = String::new();
    if view.users.is_empty() {
        out.push_str("No users found.");
    } else {
        let _ = writeln!(
            out,
            "{:<6} {:<28} {:<32} {:<10} {:<6}",
            "ID", "NAME", "EMAIL", "STATUS", "ADMIN"
        );
        for user in &view.users {
            let _ = writeln!(
                out,
                "{:<6} {:<28} {:<32} {:<10} {:<6}",
                user.id.to_string(),
                user.display_name,
                user.email,
                user.status.as_deref().unwrap_or("-"),
                if user.is_admin { "yes" } else { "no" }
            );
        }
    }

    let mut footer = format!("page {}", view.query.page);
    if let Some(pages) = view.pages {
        let _ = write!(footer, " of {pages}");
    }
    if let Some(total) = view.total {
        let _ = write!(footer, ", {total} users");
    }
    if !view.query.search.is_empty() {
        let _ = write!(footer, ", search \"{}\"", view.query.search);
    }
    if view.has_more {
        footer.push_str(", `next` for more");
    }
    if view.query.page > 1 {
        footer.push_str(", `prev` to go back");
    }
    let _ = write!(out, "\n{footer}");
    out.trim_start_matches('\n').to_string()
}

/// Field errors in form order, labelled the way the prompts are.
#[must_use]
pub fn field_errors(fields: &[FieldSpec], errors: &FieldErrors) -> String {
    let mut out = String::new();
    for spec in fields {
        if let Some(message) = errors.get(spec.name) {
            let _ = writeln!(out, "  {}: {message}", spec.label);
        }
    }
    for (field, message) in errors.iter() {
        if !fields.iter().any(|spec| spec.name == field) {
            let _ = writeln!(out, "  {field}: {message}");
        }
    }
    out.trim_end().to_string()
}
