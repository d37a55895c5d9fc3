//! Session & ownership controller
//!
//! Single source of truth for "who is logged in" and "whose library is on
//! screen", and the sole authority for whether edit affordances are shown.
//! Collaborators ([`AuthService`], [`ProfileDirectory`], [`CharacterStore`])
//! are injected at construction; there is no ordering dependency on any
//! external initialization.
//!
//! The machine: `Anonymous` and `Authenticated(Session, ViewTarget)`. Every
//! transition recomputes [`Permission`] and is pushed to subscribers as a
//! [`UiEvent::StateChanged`] carrying the full new tuple. Collection loads
//! are tagged with the view epoch that requested them; a load that resolves
//! after a newer view change is discarded, so the last view change always
//! wins.

use std::sync::{
    Arc, Mutex, RwLock,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use crate::{
    Result,
    auth::{AuthError, AuthService, Credentials, NewAccount},
    directory::ProfileDirectory,
    identity::{CharacterId, UserId},
    store::{Character, CharacterDraft, CharacterStore},
};

pub mod errors;
pub mod events;
pub mod state;

pub use errors::SessionError;
pub use events::{EventCallback, NoticeKind, UiEvent};
pub use state::{Permission, Session, StateSnapshot, ViewTarget};


/// Construction-time options for the controller.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControllerOptions {
    /// Allow selecting a view target (read-only browsing) without a session.
    /// Off by default: anonymous visitors get the login prompt.
    pub allow_anonymous_browsing: bool,
}

/// Mutable controller state: the (Session, ViewTarget) pair.
///
/// Only ever mutated under the state lock, and only by the controller's own
/// operations. Locks are never held across await points.
#[derive(Debug, Default)]
struct ControllerState {
    session: Option<Session>,
    view: Option<ViewTarget>,
}

impl ControllerState {
    fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            session: self.session.clone(),
            view: self.view.clone(),
            permission: Permission::compute(self.session.as_ref(), self.view.as_ref()),
        }
    }
}

/// Internal state for SessionController
///
/// SessionController itself is a cheap-to-clone handle wrapping
/// `Arc<ControllerInner>`.
struct ControllerInner {
    auth: Arc<dyn AuthService>,
    directory: Arc<dyn ProfileDirectory>,
    store: Arc<dyn CharacterStore>,
    options: ControllerOptions,
    state: RwLock<ControllerState>,
    /// Subscribed renderers
    observers: Mutex<Vec<EventCallback>>,
    /// Re-entrancy guard: set while a login/registration is in flight
    login_in_flight: AtomicBool,
    /// Bumped on every view change; collection loads tagged with an older
    /// value are discarded when they resolve (last write wins)
    view_epoch: AtomicU64,
}

impl std::fmt::Debug for ControllerInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerInner")
            .field("options", &self.options)
            .field("state", &self.state)
            .field(
                "observers",
                &format!("<{} observers>", self.observers.lock().unwrap().len()),
            )
            .field("view_epoch", &self.view_epoch)
            .finish()
    }
}

/// Session & ownership controller.
///
/// Owns authentication state and the identity of the library being viewed,
/// and derives the edit permission from the relationship between the two.
/// Cheap to clone; all methods take `&self`.
///
/// ## Example
///
/// ```
/// # use std::sync::Arc;
/// # use dramatis::{SessionController, backend::memory::InMemory};
/// # #[tokio::main]
/// # async fn main() -> dramatis::Result<()> {
/// let backend = Arc::new(InMemory::new());
/// backend.add_account("ana", "ana@example.com", "hunter2")?;
///
/// let controller =
///     SessionController::new(backend.clone(), backend.clone(), backend.clone());
/// let session = controller.login("ana@example.com", "hunter2").await?;
/// assert!(controller.permission().can_edit);
/// assert_eq!(session.label(), "ana");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct SessionController {
    inner: Arc<ControllerInner>,
}

impl SessionController {
    /// Create a controller with the given collaborators and default options.
    pub fn new(
        auth: Arc<dyn AuthService>,
        directory: Arc<dyn ProfileDirectory>,
        store: Arc<dyn CharacterStore>,
    ) -> Self {
        Self::with_options(auth, directory, store, ControllerOptions::default())
    }

    /// Create a controller with explicit [`ControllerOptions`].
    pub fn with_options(
        auth: Arc<dyn AuthService>,
        directory: Arc<dyn ProfileDirectory>,
        store: Arc<dyn CharacterStore>,
        options: ControllerOptions,
    ) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                auth,
                directory,
                store,
                options,
                state: RwLock::new(ControllerState::default()),
                observers: Mutex::new(Vec::new()),
                login_in_flight: AtomicBool::new(false),
                view_epoch: AtomicU64::new(0),
            }),
        }
    }

    // === Subscription ===

    /// Register a renderer callback.
    ///
    /// The callback fires for every [`UiEvent`], synchronously and in
    /// registration order, after the state it describes has been committed.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&UiEvent) + Send + Sync + 'static,
    {
        self.inner.observers.lock().unwrap().push(Arc::new(callback));
    }

    // === State accessors ===

    /// Current (Session, ViewTarget, Permission) tuple.
    pub fn snapshot(&self) -> StateSnapshot {
        self.inner.state.read().unwrap().snapshot()
    }

    /// Current session, if authenticated.
    pub fn session(&self) -> Option<Session> {
        self.inner.state.read().unwrap().session.clone()
    }

    /// Current view target, if one is selected.
    pub fn view_target(&self) -> Option<ViewTarget> {
        self.inner.state.read().unwrap().view.clone()
    }

    /// Recompute the edit permission from the current state.
    ///
    /// Pure with respect to controller state; called by the renderer before
    /// showing edit controls, and internally before accepting any mutation.
    pub fn permission(&self) -> Permission {
        let state = self.inner.state.read().unwrap();
        Permission::compute(state.session.as_ref(), state.view.as_ref())
    }

    // === Authentication ===

    /// Ask the auth service for an existing session at startup.
    ///
    /// On success the machine enters `Authenticated` with the view target
    /// pointing at the user's own library and the collection load is
    /// triggered. Restore failures never block startup: they degrade to
    /// `Anonymous` with a login prompt and a warning in the log.
    pub async fn restore_session(&self) -> Result<Option<Session>> {
        match self.inner.auth.current_session().await {
            Ok(Some(user)) => {
                tracing::info!(user_id = %user.user_id, "restored existing session");
                let session = self.resolve_session(user).await;
                self.enter_authenticated(session.clone()).await;
                Ok(Some(session))
            }
            Ok(None) => {
                self.emit(&UiEvent::LoginPromptRequested);
                Ok(None)
            }
            Err(err) => {
                tracing::warn!(error = %err, "session restore failed, starting anonymous");
                self.emit(&UiEvent::LoginPromptRequested);
                Ok(None)
            }
        }
    }

    /// Check credentials with the auth service and enter `Authenticated`.
    ///
    /// Both fields must be non-empty. On success: session and view target
    /// are set to the user's own identity, the login dialog is dismissed,
    /// and the collection reload is triggered. On failure the prior state is
    /// left untouched (never partially authenticated) and a
    /// taxonomy-specific error notice is emitted; retry happens only by
    /// explicit resubmission.
    ///
    /// A call that arrives while another login or registration is still in
    /// flight is ignored and returns [`SessionError::LoginInFlight`].
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        if email.trim().is_empty() || password.is_empty() {
            self.notify_error("Enter both email and password");
            return Err(SessionError::MissingCredentials.into());
        }

        let Some(_guard) = InFlightGuard::acquire(&self.inner.login_in_flight) else {
            tracing::debug!("login already in flight, ignoring duplicate submission");
            return Err(SessionError::LoginInFlight.into());
        };

        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        match self.inner.auth.sign_in(credentials).await {
            Ok(user) => {
                tracing::info!(user_id = %user.user_id, "signed in");
                let session = self.resolve_session(user).await;
                self.emit(&UiEvent::LoginDialogClosed);
                self.notify_success("Signed in");
                self.enter_authenticated(session.clone()).await;
                Ok(session)
            }
            Err(err) => {
                tracing::warn!(error = %err, "login failed");
                self.notify_error(login_failure_notice(&err));
                Err(err.into())
            }
        }
    }

    /// Create an account and enter `Authenticated` as the new user.
    ///
    /// Shares the in-flight guard with [`login`](Self::login); duplicate
    /// submissions are ignored the same way.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<Session> {
        if username.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            self.notify_error("Fill in username, email, and password");
            return Err(SessionError::MissingCredentials.into());
        }

        let Some(_guard) = InFlightGuard::acquire(&self.inner.login_in_flight) else {
            tracing::debug!("registration already in flight, ignoring duplicate submission");
            return Err(SessionError::LoginInFlight.into());
        };

        let account = NewAccount {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        match self.inner.auth.sign_up(account).await {
            Ok(user) => {
                tracing::info!(user_id = %user.user_id, "account created");
                let session = self.resolve_session(user).await;
                self.emit(&UiEvent::LoginDialogClosed);
                self.notify_success("Account created");
                self.enter_authenticated(session.clone()).await;
                Ok(session)
            }
            Err(err) => {
                tracing::warn!(error = %err, "registration failed");
                self.notify_error(login_failure_notice(&err));
                Err(err.into())
            }
        }
    }

    /// Sign out and return to `Anonymous`.
    ///
    /// Session and view target are cleared unconditionally, even when the
    /// auth service reports an error for the sign-out call itself.
    pub async fn logout(&self) -> Result<()> {
        if let Err(err) = self.inner.auth.sign_out().await {
            tracing::warn!(error = %err, "sign-out reported an error, clearing session anyway");
        }

        let snapshot = {
            let mut state = self.inner.state.write().unwrap();
            state.session = None;
            state.view = None;
            // Orphan any in-flight collection loads along with the state.
            self.bump_epoch();
            state.snapshot()
        };
        self.emit(&UiEvent::StateChanged(snapshot));
        self.emit(&UiEvent::LoginPromptRequested);
        self.notify_success("Signed out");
        Ok(())
    }

    // === Library ownership ===

    /// Redirect the view to another user's library.
    ///
    /// Does not touch the session. Requires authentication unless
    /// [`ControllerOptions::allow_anonymous_browsing`] is set. The reload is
    /// tagged with the new view epoch; if this call is superseded before its
    /// reload resolves, the superseded result is dropped. A failed reload
    /// leaves the view target in place and emits an error notice: ownership
    /// state and data-loading state are decoupled.
    pub async fn select_view_target(
        &self,
        owner_id: UserId,
        owner_display_name: Option<String>,
    ) -> Result<()> {
        let (snapshot, epoch) = {
            let mut state = self.inner.state.write().unwrap();
            if state.session.is_none() && !self.inner.options.allow_anonymous_browsing {
                return Err(SessionError::NotAuthenticated.into());
            }
            state.view = Some(ViewTarget {
                owner_id: owner_id.clone(),
                owner_display_name,
            });
            // The epoch moves together with the view so an in-flight load
            // can never outrun the state it belongs to.
            (state.snapshot(), self.bump_epoch())
        };
        self.emit(&UiEvent::StateChanged(snapshot));
        self.reload_collection(epoch, owner_id).await;
        Ok(())
    }

    /// Point the view back at the signed-in user's own library.
    pub async fn return_to_own_library(&self) -> Result<()> {
        let (snapshot, owner, epoch) = {
            let mut state = self.inner.state.write().unwrap();
            let Some(session) = state.session.as_ref() else {
                return Err(SessionError::NotAuthenticated.into());
            };
            let view = ViewTarget::own(session);
            let owner = view.owner_id.clone();
            state.view = Some(view);
            (state.snapshot(), owner, self.bump_epoch())
        };
        self.emit(&UiEvent::StateChanged(snapshot));
        self.reload_collection(epoch, owner).await;
        Ok(())
    }

    /// List the public libraries available to browse.
    ///
    /// Snapshot of the profile directory for the picker; a directory failure
    /// degrades to an error notice and an empty list rather than tearing
    /// down the dialog.
    pub async fn list_public_libraries(&self) -> Vec<crate::directory::DirectoryEntry> {
        match self.inner.directory.list_profiles().await {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(error = %err, "profile directory listing failed");
                self.notify_error(format!("Could not load public libraries: {err}"));
                Vec::new()
            }
        }
    }

    // === Mutations (permission-gated) ===

    /// Create a character in the signed-in user's library.
    ///
    /// The edit permission is recomputed here, immediately before the store
    /// write, regardless of what the renderer showed.
    pub async fn create_character(&self, draft: CharacterDraft) -> Result<Character> {
        let owner = self.authorize_edit()?;
        match self.inner.store.insert_character(&owner, draft).await {
            Ok(character) => {
                self.notify_success(format!("Character \"{}\" created", character.name));
                let epoch = self.bump_epoch();
                self.reload_collection(epoch, owner).await;
                Ok(character)
            }
            Err(err) => {
                tracing::warn!(error = %err, "character create failed");
                self.notify_error(format!("Could not create the character: {err}"));
                Err(err.into())
            }
        }
    }

    /// Save a full character record (attributes, relations, gallery).
    pub async fn save_character(&self, character: &Character) -> Result<()> {
        let owner = self.authorize_edit()?;
        if character.owner != owner {
            tracing::error!(
                record_owner = %character.owner,
                session_owner = %owner,
                "attempted to save a character owned by another user"
            );
            self.notify_error("You do not have permission to edit this character");
            return Err(SessionError::PermissionDenied.into());
        }
        match self.inner.store.update_character(&owner, character).await {
            Ok(()) => {
                self.notify_success("Character saved");
                let epoch = self.bump_epoch();
                self.reload_collection(epoch, owner).await;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "character save failed");
                self.notify_error(format!("Could not save the character: {err}"));
                Err(err.into())
            }
        }
    }

    /// Delete a character from the signed-in user's library.
    pub async fn delete_character(&self, id: &CharacterId) -> Result<()> {
        let owner = self.authorize_edit()?;
        match self.inner.store.delete_character(&owner, id).await {
            Ok(()) => {
                self.notify_success("Character deleted");
                let epoch = self.bump_epoch();
                self.reload_collection(epoch, owner).await;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "character delete failed");
                self.notify_error(format!("Could not delete the character: {err}"));
                Err(err.into())
            }
        }
    }

    // === Internals ===

    /// Build a [`Session`] from an authenticated user, resolving the display
    /// name through the profile directory. A failed lookup falls back to the
    /// email address; it never fails the login.
    async fn resolve_session(&self, user: crate::auth::AuthUser) -> Session {
        let display_name = match self.inner.directory.lookup_profile(&user.user_id).await {
            Ok(Some(profile)) => Some(profile.username),
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(user_id = %user.user_id, error = %err, "profile lookup failed");
                None
            }
        };
        Session {
            user_id: user.user_id,
            email: user.email,
            display_name,
        }
    }

    /// Commit the `Authenticated(session, own-library)` state and trigger
    /// the scoped collection load.
    async fn enter_authenticated(&self, session: Session) {
        let view = ViewTarget::own(&session);
        let owner = view.owner_id.clone();
        let (snapshot, epoch) = {
            let mut state = self.inner.state.write().unwrap();
            state.session = Some(session);
            state.view = Some(view);
            (state.snapshot(), self.bump_epoch())
        };
        self.emit(&UiEvent::StateChanged(snapshot));
        self.reload_collection(epoch, owner).await;
    }

    /// Fetch the collection for `owner` and publish it, unless a newer view
    /// change superseded this load while it was in flight.
    async fn reload_collection(&self, epoch: u64, owner: UserId) {
        let result = self.inner.store.list_characters(&owner).await;

        if self.inner.view_epoch.load(Ordering::Acquire) != epoch {
            tracing::debug!(%owner, epoch, "discarding superseded collection load");
            return;
        }

        match result {
            Ok(characters) => {
                tracing::debug!(%owner, count = characters.len(), "collection loaded");
                self.emit(&UiEvent::CollectionLoaded { owner, characters });
            }
            Err(err) => {
                tracing::warn!(%owner, error = %err, "collection load failed");
                self.notify_error(format!("Could not load characters: {err}"));
            }
        }
    }

    /// Recompute the permission and return the session owner id, or reject.
    ///
    /// The defensive rejection path means the renderer let a mutation
    /// through that the permission should have hidden, so it is logged as an
    /// error in addition to the notice.
    fn authorize_edit(&self) -> Result<UserId> {
        let owner = {
            let state = self.inner.state.read().unwrap();
            match (state.session.as_ref(), state.view.as_ref()) {
                (Some(session), Some(view)) if session.user_id == view.owner_id => {
                    Some(session.user_id.clone())
                }
                _ => None,
            }
        };
        match owner {
            Some(owner) => Ok(owner),
            None => {
                tracing::error!("mutation attempted without edit permission");
                self.notify_error("You do not have permission to edit this library");
                Err(SessionError::PermissionDenied.into())
            }
        }
    }

    fn bump_epoch(&self) -> u64 {
        self.inner.view_epoch.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Deliver an event to every observer.
    fn emit(&self, event: &UiEvent) {
        // Clone the callbacks so observer code runs without the lock held.
        let observers: Vec<EventCallback> = self.inner.observers.lock().unwrap().clone();
        for observer in observers {
            observer(event);
        }
    }

    fn notify_success(&self, message: impl Into<String>) {
        self.emit(&UiEvent::Notice {
            kind: NoticeKind::Success,
            message: message.into(),
        });
    }

    fn notify_error(&self, message: impl Into<String>) {
        self.emit(&UiEvent::Notice {
            kind: NoticeKind::Error,
            message: message.into(),
        });
    }
}

/// RAII guard for the login re-entrancy flag.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    /// Claim the flag; `None` when an operation is already in flight.
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then_some(Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// User-facing message for a failed login/registration, one per taxonomy
/// entry.
fn login_failure_notice(err: &AuthError) -> String {
    match err {
        AuthError::InvalidCredentials => "Incorrect email or password".to_string(),
        AuthError::EmailUnconfirmed { .. } => {
            "Please confirm your email address before signing in".to_string()
        }
        AuthError::AlreadyRegistered { .. } => {
            "An account with that email already exists".to_string()
        }
        AuthError::Network { reason } => {
            format!("Could not reach the sign-in service: {reason}")
        }
        AuthError::Unknown { reason } => format!("Sign-in failed: {reason}"),
    }
}
