//! Session
//!
//! The signed-in user for one UI session, passed explicitly to the components that need it.
//! Observers registered on the session are told about every identity change.

use std::fmt;

use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::debug;

use crate::access::{Access, Plan, Requirement, Role, UserIdentity, evaluate};

/// Session errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The operation needs a signed-in user.
    #[error("no user is signed in")]
    NotAuthenticated,
}

/// Identity change published to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent<'s> {
    /// A user signed in, replacing any previous user
    SignedIn(&'s UserIdentity),
    /// The user signed out
    SignedOut,
    /// The signed-in user's profile changed
    ProfileUpdated(&'s UserIdentity),
}

/// Receives session change notifications.
pub trait SessionObserver {
    /// Called after the session changes.
    fn on_session_event(&mut self, event: &SessionEvent<'_>);
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_session_event(&mut self, _event: &SessionEvent<'_>) {}
}

/// Profile fields to change. Unset fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New display name
    pub full_name: Option<String>,
    /// New role
    pub role: Option<Role>,
    /// New plan
    pub plan: Option<Plan>,
    /// Replacement permission set
    pub permissions: Option<FxHashSet<String>>,
}

/// One UI session.
#[derive(Default)]
pub struct Session {
    user: Option<UserIdentity>,
    observers: Vec<Box<dyn SessionObserver>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Session {
    /// Create a signed-out session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer.
    pub fn subscribe(&mut self, observer: impl SessionObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// The signed-in user
    pub fn user(&self) -> Option<&UserIdentity> {
        self.user.as_ref()
    }

    /// Whether a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Replace the signed-in user.
    pub fn sign_in(&mut self, user: UserIdentity) {
        debug!(user = %user.id, role = %user.role, plan = %user.plan, "session signed in");

        let user = &*self.user.insert(user);

        for observer in &mut self.observers {
            observer.on_session_event(&SessionEvent::SignedIn(user));
        }
    }

    /// Sign the current user out. Does nothing if no one is signed in.
    pub fn sign_out(&mut self) {
        let Some(user) = self.user.take() else {
            return;
        };

        debug!(user = %user.id, "session signed out");

        for observer in &mut self.observers {
            observer.on_session_event(&SessionEvent::SignedOut);
        }
    }

    /// Apply `update` to the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotAuthenticated`] if no user is signed in.
    pub fn update_profile(&mut self, update: ProfileUpdate) -> Result<&UserIdentity, SessionError> {
        let user = self.user.as_mut().ok_or(SessionError::NotAuthenticated)?;

        if let Some(full_name) = update.full_name {
            user.full_name = full_name;
        }

        if let Some(role) = update.role {
            user.role = role;
        }

        if let Some(plan) = update.plan {
            user.plan = plan;
        }

        if let Some(permissions) = update.permissions {
            user.permissions = permissions;
        }

        let user = &*user;

        for observer in &mut self.observers {
            observer.on_session_event(&SessionEvent::ProfileUpdated(user));
        }

        Ok(user)
    }

    /// Check `requirement` against the signed-in user.
    pub fn evaluate(&self, requirement: &Requirement) -> Access {
        evaluate(self.user(), requirement)
    }
}
