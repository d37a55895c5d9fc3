//! In-memory backend behavior through the controller.

use std::sync::Arc;

use async_trait::async_trait;
use dramatis::{
    SessionController, UserId,
    directory::{DirectoryEntry, DirectoryError, Profile, ProfileDirectory},
};

use crate::helpers::{EventLog, env};

#[tokio::test]
async fn test_public_library_picker_lists_profiles_sorted() {
    let fx = env();
    fx.backend.add_account("zoe", "zoe@x.com", "pw").unwrap();
    fx.backend.add_account("ana", "ana@x.com", "pw").unwrap();
    fx.backend.add_account("mel", "mel@x.com", "pw").unwrap();

    let entries = fx.controller.list_public_libraries().await;
    let names: Vec<&str> = entries.iter().map(|e| e.username.as_str()).collect();
    assert_eq!(names, vec!["ana", "mel", "zoe"]);
}

#[tokio::test]
async fn test_display_name_falls_back_to_email_without_profile() {
    // A directory that knows nobody: the session label degrades to the
    // login email instead of failing the login.
    struct EmptyDirectory;

    #[async_trait]
    impl ProfileDirectory for EmptyDirectory {
        async fn lookup_profile(
            &self,
            _user_id: &UserId,
        ) -> Result<Option<Profile>, DirectoryError> {
            Ok(None)
        }

        async fn list_profiles(&self) -> Result<Vec<DirectoryEntry>, DirectoryError> {
            Ok(Vec::new())
        }
    }

    let fx = env();
    fx.backend.add_account("ana", "ana@x.com", "pw").unwrap();
    let controller = SessionController::new(
        fx.backend.clone(),
        Arc::new(EmptyDirectory),
        fx.backend.clone(),
    );
    let session = controller.login("ana@x.com", "pw").await.unwrap();
    assert_eq!(session.display_name, None);
    assert_eq!(session.label(), "ana@x.com");
}

#[tokio::test]
async fn test_directory_failure_degrades_to_empty_picker_with_notice() {
    struct BrokenDirectory;

    #[async_trait]
    impl ProfileDirectory for BrokenDirectory {
        async fn lookup_profile(
            &self,
            _user_id: &UserId,
        ) -> Result<Option<Profile>, DirectoryError> {
            Err(DirectoryError::Unavailable {
                reason: "injected failure".to_string(),
            })
        }

        async fn list_profiles(&self) -> Result<Vec<DirectoryEntry>, DirectoryError> {
            Err(DirectoryError::Unavailable {
                reason: "injected failure".to_string(),
            })
        }
    }

    let fx = env();
    fx.backend.add_account("ana", "ana@x.com", "pw").unwrap();
    let controller = SessionController::new(
        fx.backend.clone(),
        Arc::new(BrokenDirectory),
        fx.backend.clone(),
    );
    let events = EventLog::default();
    events.attach(&controller);

    // Login survives the broken directory (display name falls back).
    controller.login("ana@x.com", "pw").await.unwrap();

    let entries = controller.list_public_libraries().await;
    assert!(entries.is_empty());
    assert!(
        events
            .error_notices()
            .iter()
            .any(|m| m.contains("public libraries"))
    );
}
