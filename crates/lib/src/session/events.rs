//! Controller-to-renderer event plumbing
//!
//! The renderer owns all presentation (showing/hiding controls, toasts,
//! dialogs); the controller only emits events describing state it has
//! already committed. Callbacks are invoked synchronously, in registration
//! order, with no controller lock held.

use std::sync::Arc;

use crate::{identity::UserId, store::Character};

use super::state::StateSnapshot;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Events consumed by the surrounding UI layer.
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Session, view target, or derived permission changed.
    /// Carries the full new tuple so the renderer never reads stale state.
    StateChanged(StateSnapshot),

    /// A collection load scoped to `owner` completed.
    ///
    /// Loads superseded by a later view change are discarded and never
    /// produce this event, so the most recent event always matches the
    /// current view target.
    CollectionLoaded {
        owner: UserId,
        characters: Vec<Character>,
    },

    /// A user-facing notice. Toast rendering is the embedder's concern.
    Notice { kind: NoticeKind, message: String },

    /// The renderer should present the login prompt.
    LoginPromptRequested,

    /// The login dialog can be dismissed after a successful sign-in.
    LoginDialogClosed,
}

impl UiEvent {
    /// Convenience predicate for error notices.
    pub fn is_error_notice(&self) -> bool {
        matches!(
            self,
            UiEvent::Notice {
                kind: NoticeKind::Error,
                ..
            }
        )
    }
}

/// Callback invoked for every emitted event.
pub type EventCallback = Arc<dyn Fn(&UiEvent) + Send + Sync>;
