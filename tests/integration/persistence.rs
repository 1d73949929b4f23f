/// Data and reminders surviving a restart
use addiction_tracker::*;

#[tokio::test]
async fn test_restart_restores_data_and_reminders() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("tracker.db");
    let user = UserId::new();

    let coffee_id = {
        let server = AddictionTrackerServer::with_database(db_path.clone(), user)
            .await
            .expect("Failed to create first server");

        let coffee = server
            .addictions()
            .create(NewAddiction {
                name: "Coffee".to_string(),
                level: Some(6),
                ..Default::default()
            })
            .await
            .unwrap();
        server.entries().create(NewEntry::now(coffee.id), None).await.unwrap();
        server.reminders().cancel_all().await.unwrap();
        coffee.id
    };

    let server = AddictionTrackerServer::with_database(db_path, user)
        .await
        .expect("Failed to create second server");

    let addictions = server.addictions().list().await.unwrap();
    assert_eq!(addictions.len(), 1);
    assert_eq!(addictions[0].level.value(), 6);

    let streak = server.streaks().get_streak(&coffee_id).await.unwrap().unwrap();
    assert_eq!(streak.current_streak, 1);

    // Signing in on startup brings the reminder back with a fresh id
    assert_eq!(server.reminders().registry().active_count().await, 1);
    assert_eq!(
        server.reminders().registry().notification_id(&coffee_id).await,
        Some(1000)
    );
}

#[tokio::test]
async fn test_users_do_not_see_each_other() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("tracker.db");

    let alice = AddictionTrackerServer::with_database(db_path.clone(), UserId::new())
        .await
        .unwrap();
    alice
        .addictions()
        .create(NewAddiction {
            name: "Chocolate".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    alice.reminders().cancel_all().await.unwrap();
    drop(alice);

    let bob = AddictionTrackerServer::with_database(db_path, UserId::new())
        .await
        .unwrap();
    assert!(bob.addictions().list().await.unwrap().is_empty());
    assert!(bob.entries().list(None).await.unwrap().is_empty());
}

#[test]
fn test_config_keeps_local_user_next_to_database() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let overrides = || ConfigOverrides {
        database: Some(dir.path().join("tracker.db")),
        ..Default::default()
    };

    let first = AppConfig::resolve(overrides()).unwrap();
    let second = AppConfig::resolve(overrides()).unwrap();

    assert_eq!(first.user_id, second.user_id);
    assert!(dir.path().join("user_id").exists());
    assert_eq!(first.photo_dir, dir.path().join("photos"));
}

#[test]
fn test_storage_interface() {
    let temp_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let storage = SqliteStorage::new(temp_file.path().to_path_buf()).expect("Failed to create storage");

    let _: &dyn TrackerStorage = &storage;
    assert!(storage.list_addictions(&UserId::new()).unwrap().is_empty());
}
