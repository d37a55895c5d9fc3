//! Login/logout sequences and the session-presence invariant.

use dramatis::{Error, SessionController, UiEvent, session::SessionError};

use crate::helpers::{GatedAuth, env};

#[tokio::test]
async fn test_session_present_iff_last_terminal_call_was_successful_login() {
    let fx = env();
    fx.backend.add_account("ana", "ana@x.com", "pw").unwrap();

    // Anonymous at startup.
    assert!(fx.controller.session().is_none());

    // Failed login is not a terminal success.
    assert!(fx.controller.login("ana@x.com", "nope").await.is_err());
    assert!(fx.controller.session().is_none());

    fx.controller.login("ana@x.com", "pw").await.unwrap();
    assert!(fx.controller.session().is_some());

    // Another failed login does not tear down the existing session.
    assert!(fx.controller.login("ana@x.com", "nope").await.is_err());
    assert!(fx.controller.session().is_some());

    fx.controller.logout().await.unwrap();
    assert!(fx.controller.session().is_none());

    fx.controller.login("ana@x.com", "pw").await.unwrap();
    fx.controller.logout().await.unwrap();
    fx.controller.logout().await.unwrap();
    assert!(fx.controller.session().is_none());
}

#[tokio::test]
async fn test_every_transition_recomputes_permission_in_events() {
    let fx = env();
    fx.backend.add_account("ana", "ana@x.com", "pw").unwrap();
    let bob = fx.backend.add_account("bob", "bob@x.com", "pw").unwrap();

    fx.controller.login("ana@x.com", "pw").await.unwrap();
    fx.controller
        .select_view_target(bob, Some("bob".to_string()))
        .await
        .unwrap();
    fx.controller.return_to_own_library().await.unwrap();
    fx.controller.logout().await.unwrap();

    // Every StateChanged event carries a permission consistent with its own
    // session/view pair.
    for event in fx.events.events() {
        if let UiEvent::StateChanged(snapshot) = event {
            let expected = match (&snapshot.session, &snapshot.view) {
                (Some(session), Some(view)) => session.user_id == view.owner_id,
                _ => false,
            };
            assert_eq!(snapshot.permission.can_edit, expected);
        }
    }
}

#[tokio::test]
async fn test_duplicate_login_submission_is_ignored_while_in_flight() {
    let fx = env();
    fx.backend.add_account("ana", "ana@x.com", "pw").unwrap();

    let auth = GatedAuth::new(fx.backend.clone());
    let controller = SessionController::new(auth.clone(), fx.backend.clone(), fx.backend.clone());

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.login("ana@x.com", "pw").await })
    };
    tokio::task::yield_now().await;

    // Second click while the first call is suspended at the auth service.
    let err = controller.login("ana@x.com", "pw").await.unwrap_err();
    assert!(matches!(err, Error::Session(SessionError::LoginInFlight)));

    auth.release();
    let session = first.await.unwrap().unwrap();
    assert_eq!(session.email, "ana@x.com");
    assert!(controller.session().is_some());

    // The guard is released once the call lands; a fresh login works.
    controller.logout().await.unwrap();
    auth.release();
    controller.login("ana@x.com", "pw").await.unwrap();
}

#[tokio::test]
async fn test_restore_session_from_shared_auth_state() {
    let fx = env();
    let ana = fx.backend.add_account("ana", "ana@x.com", "pw").unwrap();
    fx.controller.login("ana@x.com", "pw").await.unwrap();

    // A second controller (fresh page load) over the same auth service.
    let controller = SessionController::new(
        fx.backend.clone(),
        fx.backend.clone(),
        fx.backend.clone(),
    );
    let restored = controller.restore_session().await.unwrap().unwrap();
    assert_eq!(restored.user_id, ana);
    assert_eq!(controller.view_target().unwrap().owner_id, ana);
    assert!(controller.permission().can_edit);
}
