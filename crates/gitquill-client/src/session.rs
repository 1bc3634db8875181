//! Authenticated session state.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::error::Error;
use crate::types::UserProfile;

/// Token and user identity of the current session.
///
/// A user is only ever present alongside a token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    access_token: Option<String>,
    user: Option<UserProfile>,
}

impl Session {
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// Token and profile are both loaded.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some() && self.user.is_some()
    }

    /// The loaded user is `owner`.
    pub fn is_owner(&self, owner: &str) -> bool {
        self.user.as_ref().is_some_and(|u| u.login == owner)
    }
}

/// Where the authorization flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthPhase {
    #[default]
    Anonymous,
    Redirecting,
    AwaitingCallback,
    Exchanging,
    FetchingProfile,
    Authenticated,
    Error,
}

/// Mutable session state shared by every clone of the client.
///
/// Locks are never held across an `.await`.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    session: Mutex<Session>,
    phase: Mutex<AuthPhase>,
    last_error: Mutex<Option<Error>>,
    loading: AtomicUsize,
}

impl SessionState {
    pub(crate) fn snapshot(&self) -> Session {
        self.session.lock().clone()
    }

    pub(crate) fn token(&self) -> Option<String> {
        self.session.lock().access_token.clone()
    }

    pub(crate) fn has_user(&self) -> bool {
        self.session.lock().user.is_some()
    }

    pub(crate) fn login(&self) -> Option<String> {
        self.session.lock().user.as_ref().map(|u| u.login.clone())
    }

    pub(crate) fn set_token(&self, token: String) {
        self.session.lock().access_token = Some(token);
    }

    /// Attach the profile fetched with `token`.
    ///
    /// Refused unless `token` is still the session's token.
    pub(crate) fn set_user(&self, token: &str, user: UserProfile) -> bool {
        let mut session = self.session.lock();
        if session.access_token.as_deref() != Some(token) {
            return false;
        }
        session.user = Some(user);
        true
    }

    pub(crate) fn clear(&self) {
        let mut session = self.session.lock();
        session.access_token = None;
        session.user = None;
    }

    /// [`clear`](Self::clear), only while `token` is the session's token.
    pub(crate) fn clear_if_token(&self, token: &str) -> bool {
        let mut session = self.session.lock();
        if session.access_token.as_deref() != Some(token) {
            return false;
        }
        session.access_token = None;
        session.user = None;
        true
    }

    pub(crate) fn phase(&self) -> AuthPhase {
        *self.phase.lock()
    }

    pub(crate) fn set_phase(&self, phase: AuthPhase) {
        *self.phase.lock() = phase;
    }

    pub(crate) fn last_error(&self) -> Option<Error> {
        self.last_error.lock().clone()
    }

    pub(crate) fn record_error(&self, error: Error) {
        *self.last_error.lock() = Some(error);
    }

    pub(crate) fn clear_error(&self) {
        *self.last_error.lock() = None;
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst) > 0
    }

    pub(crate) fn begin_loading(&self) -> LoadingGuard<'_> {
        self.loading.fetch_add(1, Ordering::SeqCst);
        LoadingGuard {
            counter: &self.loading,
        }
    }
}

/// Keeps the loading flag raised until dropped.
///
/// Guards nest: the flag is clear once every guard is gone.
#[must_use]
pub(crate) struct LoadingGuard<'a> {
    counter: &'a AtomicUsize,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}
