//! Shared fixtures for the integration suite.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use tokio::sync::Notify;

use dramatis::{
    Character, CharacterDraft, ControllerOptions, NoticeKind, SessionController, UiEvent, UserId,
    auth::{AuthError, AuthService, AuthUser, Credentials, NewAccount},
    backend::memory::InMemory,
    identity::CharacterId,
    store::{CharacterStore, StoreError},
};

/// A controller wired to a seeded in-memory backend plus an event recorder.
pub struct TestEnv {
    pub backend: Arc<InMemory>,
    pub controller: SessionController,
    pub events: EventLog,
}

/// Build a controller over a fresh in-memory backend.
pub fn env() -> TestEnv {
    env_with(ControllerOptions::default())
}

pub fn env_with(options: ControllerOptions) -> TestEnv {
    let backend = Arc::new(InMemory::new());
    let controller = SessionController::with_options(
        backend.clone(),
        backend.clone(),
        backend.clone(),
        options,
    );
    let events = EventLog::default();
    events.attach(&controller);
    TestEnv {
        backend,
        controller,
        events,
    }
}

/// Records every [`UiEvent`] a controller emits.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<UiEvent>>>);

impl EventLog {
    pub fn attach(&self, controller: &SessionController) {
        let sink = self.0.clone();
        controller.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
    }

    pub fn events(&self) -> Vec<UiEvent> {
        self.0.lock().unwrap().clone()
    }

    /// Owners of completed collection loads, in emission order.
    pub fn loaded_owners(&self) -> Vec<UserId> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                UiEvent::CollectionLoaded { owner, .. } => Some(owner),
                _ => None,
            })
            .collect()
    }

    /// The most recently published collection, if any.
    pub fn last_collection(&self) -> Option<(UserId, Vec<Character>)> {
        self.events()
            .into_iter()
            .rev()
            .find_map(|event| match event {
                UiEvent::CollectionLoaded { owner, characters } => Some((owner, characters)),
                _ => None,
            })
    }

    pub fn error_notices(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                UiEvent::Notice {
                    kind: NoticeKind::Error,
                    message,
                } => Some(message),
                _ => None,
            })
            .collect()
    }
}

/// Store wrapper whose `list_characters` blocks, per owner, until released.
/// Used to control completion order of in-flight collection loads.
pub struct GatedStore {
    inner: Arc<dyn CharacterStore>,
    gates: Mutex<HashMap<UserId, Arc<Notify>>>,
}

impl GatedStore {
    pub fn new(inner: Arc<dyn CharacterStore>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            gates: Mutex::new(HashMap::new()),
        })
    }

    /// Gate list calls for `owner`; the returned handle releases one call
    /// per `notify_one`.
    pub fn gate(&self, owner: &UserId) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(owner.clone(), gate.clone());
        gate
    }
}

#[async_trait]
impl CharacterStore for GatedStore {
    async fn list_characters(&self, owner: &UserId) -> Result<Vec<Character>, StoreError> {
        let gate = self.gates.lock().unwrap().get(owner).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.inner.list_characters(owner).await
    }

    async fn insert_character(
        &self,
        owner: &UserId,
        draft: CharacterDraft,
    ) -> Result<Character, StoreError> {
        self.inner.insert_character(owner, draft).await
    }

    async fn update_character(
        &self,
        owner: &UserId,
        character: &Character,
    ) -> Result<(), StoreError> {
        self.inner.update_character(owner, character).await
    }

    async fn delete_character(&self, owner: &UserId, id: &CharacterId) -> Result<(), StoreError> {
        self.inner.delete_character(owner, id).await
    }
}

/// Store wrapper that fails `list_characters` for selected owners.
pub struct FailingStore {
    inner: Arc<dyn CharacterStore>,
    fail_for: Mutex<HashSet<UserId>>,
}

impl FailingStore {
    pub fn new(inner: Arc<dyn CharacterStore>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fail_for: Mutex::new(HashSet::new()),
        })
    }

    pub fn fail_owner(&self, owner: &UserId) {
        self.fail_for.lock().unwrap().insert(owner.clone());
    }
}

#[async_trait]
impl CharacterStore for FailingStore {
    async fn list_characters(&self, owner: &UserId) -> Result<Vec<Character>, StoreError> {
        if self.fail_for.lock().unwrap().contains(owner) {
            return Err(StoreError::Unavailable {
                reason: "injected failure".to_string(),
            });
        }
        self.inner.list_characters(owner).await
    }

    async fn insert_character(
        &self,
        owner: &UserId,
        draft: CharacterDraft,
    ) -> Result<Character, StoreError> {
        self.inner.insert_character(owner, draft).await
    }

    async fn update_character(
        &self,
        owner: &UserId,
        character: &Character,
    ) -> Result<(), StoreError> {
        self.inner.update_character(owner, character).await
    }

    async fn delete_character(&self, owner: &UserId, id: &CharacterId) -> Result<(), StoreError> {
        self.inner.delete_character(owner, id).await
    }
}

/// Auth wrapper whose `sign_in` blocks until released, to overlap a second
/// submission with one already in flight.
pub struct GatedAuth {
    inner: Arc<dyn AuthService>,
    gate: Notify,
}

impl GatedAuth {
    pub fn new(inner: Arc<dyn AuthService>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            gate: Notify::new(),
        })
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl AuthService for GatedAuth {
    async fn current_session(&self) -> Result<Option<AuthUser>, AuthError> {
        self.inner.current_session().await
    }

    async fn sign_in(&self, credentials: Credentials) -> Result<AuthUser, AuthError> {
        self.gate.notified().await;
        self.inner.sign_in(credentials).await
    }

    async fn sign_up(&self, account: NewAccount) -> Result<AuthUser, AuthError> {
        self.inner.sign_up(account).await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.inner.sign_out().await
    }
}
