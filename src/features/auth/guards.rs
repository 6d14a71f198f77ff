//! Access gating for views. The decision is a pure function of the session
//! state and the capability a view requires; real access control still lives
//! on the API, this only keeps users away from views they can't use.

use crate::features::auth::state::SessionState;
use std::fmt;

/// Access level a view requires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    None,
    Authenticated,
    Admin,
    /// Only reachable without a session: login, registration, password reset.
    Guest,
}

/// Views of the portal. Each one declares the capability it needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Home,
    Login,
    Register,
    ResetPassword,
    Dashboard,
    NewDeclaration,
    AdminUsers,
    AdminCreateUser,
    AdminEditUser,
}

impl View {
    #[must_use]
    pub fn required_capability(self) -> Capability {
        match self {
            Self::Home => Capability::None,
            Self::Login | Self::Register | Self::ResetPassword => Capability::Guest,
            Self::Dashboard | Self::NewDeclaration => Capability::Authenticated,
            Self::AdminUsers | Self::AdminCreateUser | Self::AdminEditUser => Capability::Admin,
        }
    }

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::ResetPassword => "/reset-password",
            Self::Dashboard => "/dashboard",
            Self::NewDeclaration => "/nueva-declaracion",
            Self::AdminUsers => "/admin/users",
            Self::AdminCreateUser => "/admin/users/new",
            Self::AdminEditUser => "/admin/update-user",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.path())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateDecision {
    /// Reconciliation has not finished; render a neutral placeholder.
    Pending,
    Allow,
    RedirectToLogin,
    RedirectToDefault,
}

/// Decides whether a view with the given requirement may render.
#[must_use]
pub fn decide(state: &SessionState, required: Capability) -> GateDecision {
    let session = match state {
        SessionState::Verifying => return GateDecision::Pending,
        SessionState::Anonymous => None,
        SessionState::Authenticated(session) => Some(session),
    };

    match (required, session) {
        (Capability::None, _) | (Capability::Guest, None) => GateDecision::Allow,
        (Capability::Authenticated | Capability::Admin, None) => GateDecision::RedirectToLogin,
        (Capability::Authenticated, Some(_)) => GateDecision::Allow,
        (Capability::Admin, Some(session)) if session.is_admin => GateDecision::Allow,
        (Capability::Admin | Capability::Guest, Some(_)) => GateDecision::RedirectToDefault,
    }
}

/// Landing view for a signed-in user.
#[must_use]
pub fn default_view(state: &SessionState) -> View {
    if state.is_admin() {
        View::AdminUsers
    } else if state.session().is_some() {
        View::Dashboard
    } else {
        View::Home
    }
}

/// What the caller should do with a navigation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    Pending,
    Render(View),
}

/// Minimal navigation history. Gate redirects replace the current entry so
/// going back never lands on a view the user was denied.
#[derive(Clone, Debug)]
pub struct History {
    entries: Vec<View>,
}

impl Default for History {
    fn default() -> Self {
        Self {
            entries: vec![View::Home],
        }
    }
}

impl History {
    #[must_use]
    pub fn current(&self) -> View {
        self.entries.last().copied().unwrap_or(View::Home)
    }

    #[must_use]
    pub fn entries(&self) -> &[View] {
        &self.entries
    }

    /// Navigates to `target` and applies the gate. A redirect is followed
    /// once, replacing the entry that was denied.
    pub fn navigate(&mut self, target: View, state: &SessionState) -> Navigation {
        match decide(state, target.required_capability()) {
            GateDecision::Pending => Navigation::Pending,
            GateDecision::Allow => {
                self.push(target);
                Navigation::Render(target)
            }
            GateDecision::RedirectToLogin => {
                self.push(target);
                self.replace(View::Login);
                Navigation::Render(View::Login)
            }
            GateDecision::RedirectToDefault => {
                let fallback = default_view(state);
                self.push(target);
                self.replace(fallback);
                Navigation::Render(fallback)
            }
        }
    }

    /// Navigates without leaving the current entry behind, e.g. after login
    /// or logout.
    pub fn replace_with(&mut self, target: View, state: &SessionState) -> Navigation {
        let before = self.entries.len();
        let navigation = self.navigate(target, state);
        if self.entries.len() > before && before > 0 {
            self.entries.remove(before - 1);
            self.entries.dedup();
        }
        navigation
    }

    /// The server refused the current view even though the gate let it
    /// through (403 on an admin call). The entry is replaced with the landing
    /// view of a signed-in non-admin.
    pub fn refused(&mut self) -> View {
        self.replace(View::Dashboard);
        View::Dashboard
    }

    /// Steps back one entry, skipping anything the current state no longer
    /// allows.
    pub fn back(&mut self, state: &SessionState) -> View {
        while self.entries.len() > 1 {
            self.entries.pop();
            let candidate = self.current();
            if decide(state, candidate.required_capability()) == GateDecision::Allow {
                return candidate;
            }
        }
        self.entries = vec![View::Home];
        View::Home
    }

    fn push(&mut self, view: View) {
        if self.entries.last() != Some(&view) {
            self.entries.push(view);
        }
    }

    fn replace(&mut self, view: View) {
        self.entries.pop();
        self.push(view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::types::{UserId, UserSession};

    fn signed_in(is_admin: bool) -> SessionState {
        SessionState::Authenticated(UserSession {
            user_id: UserId::Number(1),
            display_name: "Ana Pérez".to_string(),
            email: "ana@example.com".to_string(),
            is_admin,
        })
    }

    const ALL: [Capability; 4] = [
        Capability::None,
        Capability::Authenticated,
        Capability::Admin,
        Capability::Guest,
    ];

    #[test]
    fn verifying_never_redirects() {
        for capability in ALL {
            assert_eq!(
                decide(&SessionState::Verifying, capability),
                GateDecision::Pending
            );
        }
        let mut history = History::default();
        assert_eq!(
            history.navigate(View::AdminUsers, &SessionState::Verifying),
            Navigation::Pending
        );
        assert_eq!(history.entries(), &[View::Home]);
    }

    #[test]
    fn decision_table() {
        use GateDecision::{Allow, RedirectToDefault, RedirectToLogin};

        let anonymous = SessionState::Anonymous;
        let member = signed_in(false);
        let admin = signed_in(true);
        let expected = [
            (&anonymous, [Allow, RedirectToLogin, RedirectToLogin, Allow]),
            (&member, [Allow, Allow, RedirectToDefault, RedirectToDefault]),
            (&admin, [Allow, Allow, Allow, RedirectToDefault]),
        ];

        for (state, row) in expected {
            for (capability, decision) in ALL.into_iter().zip(row) {
                assert_eq!(decide(state, capability), decision, "{state:?} {capability:?}");
            }
        }
    }

    #[test]
    fn default_view_depends_on_role() {
        assert_eq!(default_view(&signed_in(true)), View::AdminUsers);
        assert_eq!(default_view(&signed_in(false)), View::Dashboard);
        assert_eq!(default_view(&SessionState::Anonymous), View::Home);
    }

    #[test]
    fn redirect_replaces_denied_entry() {
        let mut history = History::default();
        let navigation = history.navigate(View::AdminUsers, &SessionState::Anonymous);
        assert_eq!(navigation, Navigation::Render(View::Login));
        assert_eq!(history.entries(), &[View::Home, View::Login]);
        assert_eq!(history.back(&SessionState::Anonymous), View::Home);
    }

    #[test]
    fn member_on_admin_route_lands_on_dashboard() {
        let member = signed_in(false);
        let mut history = History::default();
        assert_eq!(
            history.navigate(View::AdminUsers, &member),
            Navigation::Render(View::Dashboard)
        );
        assert!(!history.entries().contains(&View::AdminUsers));
    }

    #[test]
    fn replace_with_drops_the_login_entry() {
        let admin = signed_in(true);
        let mut history = History::default();
        history.navigate(View::Login, &SessionState::Anonymous);
        history.replace_with(View::AdminUsers, &admin);
        assert_eq!(history.entries(), &[View::Home, View::AdminUsers]);
    }

    #[test]
    fn edit_user_is_admin_only() {
        assert_eq!(View::AdminEditUser.required_capability(), Capability::Admin);
        let mut history = History::default();
        assert_eq!(
            history.navigate(View::AdminEditUser, &signed_in(false)),
            Navigation::Render(View::Dashboard)
        );
    }

    #[test]
    fn replace_with_does_not_stack_the_same_view() {
        let admin = signed_in(true);
        let mut history = History::default();
        history.navigate(View::AdminUsers, &admin);
        history.navigate(View::AdminEditUser, &admin);
        history.replace_with(View::AdminUsers, &admin);
        assert_eq!(history.entries(), &[View::Home, View::AdminUsers]);
    }

    #[test]
    fn refused_view_is_replaced_by_dashboard() {
        let admin = signed_in(true);
        let mut history = History::default();
        history.navigate(View::AdminUsers, &admin);
        assert_eq!(history.refused(), View::Dashboard);
        assert_eq!(history.entries(), &[View::Home, View::Dashboard]);
        assert_eq!(history.back(&admin), View::Home);
    }

    #[test]
    fn back_skips_views_no_longer_allowed() {
        let member = signed_in(false);
        let mut history = History::default();
        history.navigate(View::Dashboard, &member);
        history.navigate(View::NewDeclaration, &member);
        assert_eq!(history.back(&SessionState::Anonymous), View::Home);
    }
}
