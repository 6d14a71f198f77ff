//! Session state for the portal client. The store reconciles with the server
//! once at startup and is then changed only through `establish`, `clear` and
//! `revoke`. Only non-sensitive identity metadata is kept in memory; the
//! session cookie itself stays in the transport's jar, which is saved when a
//! session is confirmed and emptied whenever the session ends.

use crate::{
    features::auth::{client, types::UserSession},
    portal::{ApiClient, ApiError},
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, MutexGuard, PoisonError,
};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Where the client stands with respect to the server's session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Startup reconciliation is in flight; nothing is known yet.
    Verifying,
    Authenticated(UserSession),
    Anonymous,
}

impl SessionState {
    #[must_use]
    pub fn is_verifying(&self) -> bool {
        matches!(self, Self::Verifying)
    }

    #[must_use]
    pub fn session(&self) -> Option<&UserSession> {
        match self {
            Self::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    /// Tri-state view of authentication: `None` while verifying.
    #[must_use]
    pub fn authenticated(&self) -> Option<bool> {
        match self {
            Self::Verifying => None,
            Self::Authenticated(_) => Some(true),
            Self::Anonymous => Some(false),
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.session().is_some_and(|session| session.is_admin)
    }
}

/// Result of startup reconciliation, kept apart from `SessionState` so an
/// unreachable server can be told from a plain "not logged in".
#[derive(Debug)]
pub enum ReconcileOutcome {
    Authenticated,
    Anonymous,
    Unreachable(ApiError),
    AlreadyReconciled,
}

#[derive(Debug)]
pub struct SessionStore {
    api: ApiClient,
    state: watch::Sender<SessionState>,
    reconciled: AtomicBool,
    logout: Mutex<Option<watch::Receiver<bool>>>,
}

enum LogoutTicket {
    Leader(watch::Sender<bool>),
    Follower(watch::Receiver<bool>),
}

impl SessionStore {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let (state, _) = watch::channel(SessionState::Verifying);
        Self {
            api,
            state,
            reconciled: AtomicBool::new(false),
            logout: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Not ground truth until reconciliation finished; see `SessionState::authenticated`.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().authenticated().unwrap_or(false)
    }

    /// False whenever there is no session.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.state.borrow().is_admin()
    }

    /// Waits until the state has left `Verifying` and returns it.
    pub async fn wait_resolved(&self) -> SessionState {
        let mut receiver = self.state.subscribe();
        let resolved = receiver
            .wait_for(|state| !state.is_verifying())
            .await
            .map(|state| state.clone());
        resolved.unwrap_or_else(|_| self.state())
    }

    /// Asks the server who we are. Runs once per process; later calls return
    /// `AlreadyReconciled` without touching the network. Every failure path
    /// resolves to `Anonymous`, including the future being dropped early.
    #[instrument(skip(self))]
    pub async fn reconcile(&self) -> ReconcileOutcome {
        if self.reconciled.swap(true, Ordering::SeqCst) {
            warn!("session reconciliation already ran");
            return ReconcileOutcome::AlreadyReconciled;
        }

        let mut pending = PendingReconcile {
            store: self,
            next: SessionState::Anonymous,
        };

        match client::fetch_session(&self.api).await {
            Ok(Some(session)) => {
                info!(user_id = %session.user_id, admin = session.is_admin, "active session found");
                pending.next = SessionState::Authenticated(session);
                self.save_cookies();
                ReconcileOutcome::Authenticated
            }
            Ok(None) => {
                debug!("no active session");
                self.forget_cookies();
                ReconcileOutcome::Anonymous
            }
            Err(err) => {
                warn!(error = %err, "session check failed, continuing as anonymous");
                ReconcileOutcome::Unreachable(err)
            }
        }
    }

    /// Records the session returned by a successful login. Replaces whatever
    /// was there before.
    pub fn establish(&self, session: UserSession) {
        info!(user_id = %session.user_id, admin = session.is_admin, "session established");
        self.state.send_replace(SessionState::Authenticated(session));
        self.save_cookies();
    }

    /// Writes the cookie jar to the session file, if there is one. Failures
    /// are logged; the in-memory session is unaffected.
    pub fn save_cookies(&self) {
        if let Err(err) = self.api.jar().save() {
            warn!(error = %err, "could not save session cookies");
        }
    }

    fn forget_cookies(&self) {
        if let Err(err) = self.api.jar().clear() {
            warn!(error = %err, "could not clear saved session cookies");
        }
    }

    /// Logs out. The server call is best effort; the local session is always
    /// dropped afterwards, even if the call fails or this future is dropped.
    /// Overlapping calls share the first one's server request.
    #[instrument(skip(self))]
    pub async fn clear(&self) {
        let done = match self.logout_ticket() {
            LogoutTicket::Follower(mut done) => {
                debug!("logout already in progress, waiting for it");
                // An error only means the leader finished without signalling.
                let _ = done.wait_for(|finished| *finished).await;
                return;
            }
            LogoutTicket::Leader(done) => done,
        };

        let _finish = LocalLogout { store: self, done };

        match client::logout(&self.api).await {
            Ok(()) => info!("server session closed"),
            Err(err) => warn!(error = %err, "server logout failed, clearing local session anyway"),
        }
    }

    /// Drops the session after the server rejected it (401 on a later call).
    pub fn revoke(&self) -> bool {
        let revoked = self.state.send_if_modified(|state| {
            if matches!(state, SessionState::Authenticated(_)) {
                *state = SessionState::Anonymous;
                true
            } else {
                false
            }
        });
        if revoked {
            self.forget_cookies();
            warn!("server no longer recognizes the session, cleared locally");
        }
        revoked
    }

    /// Revokes on 401; returns whether the session was dropped.
    pub fn handle_denial(&self, err: &ApiError) -> bool {
        err.is_unauthorized() && self.revoke()
    }

    fn logout_ticket(&self) -> LogoutTicket {
        let mut slot = lock(&self.logout);
        if let Some(done) = slot.as_ref() {
            return LogoutTicket::Follower(done.clone());
        }
        let (done, receiver) = watch::channel(false);
        *slot = Some(receiver);
        LogoutTicket::Leader(done)
    }

    fn resolve_verifying(&self, next: SessionState) {
        self.state.send_if_modified(|state| {
            if state.is_verifying() {
                *state = next;
                true
            } else {
                false
            }
        });
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Applies the reconciliation result on drop, so a cancelled check still
/// leaves `Verifying`. Only `Verifying` is ever replaced.
struct PendingReconcile<'a> {
    store: &'a SessionStore,
    next: SessionState,
}

impl Drop for PendingReconcile<'_> {
    fn drop(&mut self) {
        let next = std::mem::replace(&mut self.next, SessionState::Anonymous);
        self.store.resolve_verifying(next);
    }
}

/// Final step of a logout: clear local state, then release waiters.
struct LocalLogout<'a> {
    store: &'a SessionStore,
    done: watch::Sender<bool>,
}

impl Drop for LocalLogout<'_> {
    fn drop(&mut self) {
        self.store.state.send_replace(SessionState::Anonymous);
        self.store.forget_cookies();
        *lock(&self.store.logout) = None;
        self.done.send_replace(true);
        info!("local session cleared");
    }
}
