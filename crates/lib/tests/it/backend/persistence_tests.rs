//! Persistence round-trips through the controller: a saved backend restores
//! the signed-in session and collections the way local storage would.

use std::sync::Arc;

use dramatis::{CharacterDraft, SessionController, backend::memory::InMemory};

use crate::helpers::{EventLog, env};

#[tokio::test]
async fn test_saved_state_restores_session_and_collection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dramatis.json");

    let ana = {
        let fx = env();
        let ana = fx.backend.add_account("ana", "ana@x.com", "pw").unwrap();
        fx.controller.login("ana@x.com", "pw").await.unwrap();
        fx.controller
            .create_character(CharacterDraft::new("Iris"))
            .await
            .unwrap();
        fx.backend.save_to_file(&path).unwrap();
        ana
    };

    // Fresh process: load the file, restore the session at startup.
    let backend = Arc::new(InMemory::load_from_file(&path).unwrap());
    let controller = SessionController::new(backend.clone(), backend.clone(), backend.clone());
    let events = EventLog::default();
    events.attach(&controller);

    let session = controller.restore_session().await.unwrap().unwrap();
    assert_eq!(session.user_id, ana);
    assert_eq!(session.label(), "ana");
    assert!(controller.permission().can_edit);

    let (owner, characters) = events.last_collection().unwrap();
    assert_eq!(owner, ana);
    assert_eq!(characters[0].name, "Iris");
}

#[tokio::test]
async fn test_logged_out_state_persists_as_anonymous() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dramatis.json");

    {
        let fx = env();
        fx.backend.add_account("ana", "ana@x.com", "pw").unwrap();
        fx.controller.login("ana@x.com", "pw").await.unwrap();
        fx.controller.logout().await.unwrap();
        fx.backend.save_to_file(&path).unwrap();
    }

    let backend = Arc::new(InMemory::load_from_file(&path).unwrap());
    let controller = SessionController::new(backend.clone(), backend.clone(), backend.clone());
    assert!(controller.restore_session().await.unwrap().is_none());
    assert!(controller.session().is_none());
}
