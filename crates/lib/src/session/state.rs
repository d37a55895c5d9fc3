//! Session and ownership state types
//!
//! The machine has two states: `Anonymous` (no session) and
//! `Authenticated(Session, ViewTarget)`. Both are represented here as plain
//! data; the transitions live on
//! [`SessionController`](super::SessionController).

use serde::{Deserialize, Serialize};

use crate::identity::UserId;

/// Proof of the current user's authenticated identity.
///
/// Exists only while the auth service vouches for it: created on login or
/// session restoration, cleared on logout. The controller never persists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,

    /// Login email address
    pub email: String,

    /// Display name from the profile directory, when one is registered
    pub display_name: Option<String>,
}

impl Session {
    /// Name shown for the signed-in user, falling back to the email address
    /// when no display name is registered.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

/// The identity whose character collection is currently displayed,
/// independent of who is logged in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewTarget {
    pub owner_id: UserId,

    /// Display name of the library owner, when known
    pub owner_display_name: Option<String>,
}

impl ViewTarget {
    /// The view target pointing at the session owner's own library.
    pub fn own(session: &Session) -> Self {
        Self {
            owner_id: session.user_id.clone(),
            owner_display_name: session.display_name.clone(),
        }
    }
}

/// Derived edit permission.
///
/// Recomputed from the current Session and ViewTarget on every change;
/// never stored, never cached stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Permission {
    /// Whether mutating actions against the displayed library are allowed
    pub can_edit: bool,
}

impl Permission {
    /// Pure function of the current session and view target:
    /// `can_edit` iff a session is present and it owns the displayed library.
    pub fn compute(session: Option<&Session>, view: Option<&ViewTarget>) -> Self {
        let can_edit = match (session, view) {
            (Some(session), Some(view)) => session.user_id == view.owner_id,
            _ => false,
        };
        Self { can_edit }
    }
}

/// The (Session, ViewTarget, Permission) tuple delivered to observers on
/// every state change.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    pub session: Option<Session>,
    pub view: Option<ViewTarget>,
    pub permission: Permission,
}

impl StateSnapshot {
    /// Whether the machine is in the `Authenticated` state.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the displayed library belongs to the signed-in user.
    pub fn is_own_library(&self) -> bool {
        self.permission.can_edit
    }
}
