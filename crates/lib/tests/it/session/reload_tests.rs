//! Collection reload ordering: last view selection wins, and data-loading
//! failures never corrupt the ownership state.

use dramatis::{CharacterDraft, SessionController, store::CharacterStore};

use crate::helpers::{EventLog, FailingStore, GatedStore, env};

#[tokio::test]
async fn test_latest_view_selection_wins_under_reordered_completion() {
    let fx = env();
    let ana = fx.backend.add_account("ana", "ana@x.com", "pw").unwrap();
    let bob = fx.backend.add_account("bob", "bob@x.com", "pw").unwrap();
    let cleo = fx.backend.add_account("cleo", "cleo@x.com", "pw").unwrap();
    fx.backend
        .insert_character(&bob, CharacterDraft::new("Bram"))
        .await
        .unwrap();
    fx.backend
        .insert_character(&cleo, CharacterDraft::new("Cora"))
        .await
        .unwrap();

    let store = GatedStore::new(fx.backend.clone());
    let controller =
        SessionController::new(fx.backend.clone(), fx.backend.clone(), store.clone());
    let events = EventLog::default();
    events.attach(&controller);

    controller.login("ana@x.com", "pw").await.unwrap();

    let gate_bob = store.gate(&bob);
    let gate_cleo = store.gate(&cleo);

    // Browse to bob's library, then to cleo's before bob's reload resolves.
    let first = {
        let controller = controller.clone();
        let bob = bob.clone();
        tokio::spawn(async move { controller.select_view_target(bob, None).await })
    };
    tokio::task::yield_now().await;
    let second = {
        let controller = controller.clone();
        let cleo = cleo.clone();
        tokio::spawn(async move { controller.select_view_target(cleo, None).await })
    };
    tokio::task::yield_now().await;

    // Complete the loads out of order: the later selection resolves first,
    // the superseded one afterwards.
    gate_cleo.notify_one();
    second.await.unwrap().unwrap();
    gate_bob.notify_one();
    first.await.unwrap().unwrap();

    let loaded = events.loaded_owners();
    assert_eq!(loaded.first(), Some(&ana));
    assert_eq!(loaded.last(), Some(&cleo));
    // The superseded load for bob never surfaced.
    assert!(!loaded.contains(&bob));

    let (owner, characters) = events.last_collection().unwrap();
    assert_eq!(owner, cleo);
    assert_eq!(characters[0].name, "Cora");
    assert_eq!(controller.view_target().unwrap().owner_id, cleo);
}

#[tokio::test]
async fn test_reload_failure_keeps_view_target_and_notifies() {
    let fx = env();
    fx.backend.add_account("ana", "ana@x.com", "pw").unwrap();
    let bob = fx.backend.add_account("bob", "bob@x.com", "pw").unwrap();

    let store = FailingStore::new(fx.backend.clone());
    store.fail_owner(&bob);
    let controller =
        SessionController::new(fx.backend.clone(), fx.backend.clone(), store.clone());
    let events = EventLog::default();
    events.attach(&controller);

    controller.login("ana@x.com", "pw").await.unwrap();

    // The selection itself succeeds even though the reload fails.
    controller
        .select_view_target(bob.clone(), Some("bob".to_string()))
        .await
        .unwrap();

    assert_eq!(controller.view_target().unwrap().owner_id, bob);
    assert!(!controller.permission().can_edit);
    assert!(!events.loaded_owners().contains(&bob));
    assert!(
        events
            .error_notices()
            .iter()
            .any(|m| m.contains("Could not load characters"))
    );
}

#[tokio::test]
async fn test_mutations_refresh_the_own_collection() {
    let fx = env();
    fx.backend.add_account("ana", "ana@x.com", "pw").unwrap();
    fx.controller.login("ana@x.com", "pw").await.unwrap();

    let character = fx
        .controller
        .create_character(CharacterDraft::new("Iris"))
        .await
        .unwrap();

    let (_, characters) = fx.events.last_collection().unwrap();
    assert_eq!(characters.len(), 1);

    fx.controller.delete_character(&character.id).await.unwrap();
    let (_, characters) = fx.events.last_collection().unwrap();
    assert!(characters.is_empty());
}
