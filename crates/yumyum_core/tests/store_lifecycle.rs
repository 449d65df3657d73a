use std::fs;
use std::sync::Arc;
use yumyum_core::{
    DataStore, DietRecord, EntityKind, FoodItem, MealType, RepoError, Repository, StoreError,
    StorePhase,
};

#[test]
fn empty_directory_scenario_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let store = DataStore::new();
    store.start(dir.path()).unwrap();
    assert_eq!(store.phase(), StorePhase::Ready);

    for (_, count) in store.counts().unwrap() {
        assert_eq!(count, 0);
    }
    assert!(store.diets().unwrap().find_all().is_empty());

    let mut record = DietRecord::new(1, "2024-05-03", MealType::Dinner);
    record.foods.push(FoodItem::new("salmon", 180, 370));
    let stored = store.diets().unwrap().save(record).unwrap();
    assert_eq!(stored.id, Some(1));
    assert_eq!(store.diets().unwrap().find_by_id(1), Some(stored.clone()));

    let report = store.stop().unwrap();
    assert!(report.is_clean());
    assert_eq!(report.persisted.len(), EntityKind::ALL.len());
    assert_eq!(store.phase(), StorePhase::Stopped);

    let restarted = DataStore::new();
    restarted.start(dir.path()).unwrap();
    assert_eq!(restarted.diets().unwrap().find_all(), vec![stored]);
}

#[test]
fn stopped_store_can_start_again_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let store = DataStore::new();
    store.start(dir.path()).unwrap();
    store
        .follows()
        .unwrap()
        .save(yumyum_core::Follow::new(1, 2))
        .unwrap();
    store.stop().unwrap();

    store.start(dir.path()).unwrap();

    assert_eq!(store.follows().unwrap().len(), 1);
    assert_eq!(store.data_dir().as_deref(), Some(dir.path()));
}

#[test]
fn repository_access_outside_ready_fails_loudly() {
    let dir = tempfile::tempdir().unwrap();
    let store = DataStore::new();
    assert!(matches!(
        store.posts(),
        Err(StoreError::NotReady(StorePhase::Uninitialized))
    ));

    store.start(dir.path()).unwrap();
    store.stop().unwrap();

    assert!(matches!(
        store.accounts(),
        Err(StoreError::NotReady(StorePhase::Stopped))
    ));
    assert!(matches!(
        store.save_accounts(),
        Err(StoreError::NotReady(StorePhase::Stopped))
    ));
}

#[test]
fn repository_reference_held_across_stop_rejects_writes() {
    let dir = tempfile::tempdir().unwrap();
    let store = DataStore::new();
    store.start(dir.path()).unwrap();
    let follows = store.follows().unwrap();
    let kept = follows.save(yumyum_core::Follow::new(1, 2)).unwrap();

    store.stop().unwrap();

    assert!(matches!(
        follows.save(yumyum_core::Follow::new(3, 4)),
        Err(RepoError::Closed(EntityKind::Follow))
    ));
    assert!(matches!(
        follows.delete(kept.id.unwrap()),
        Err(RepoError::Closed(_))
    ));
    assert!(matches!(follows.unfollow(1, 2), Err(RepoError::Closed(_))));

    store.start(dir.path()).unwrap();
    assert_eq!(follows.find_all(), vec![kept]);
    assert!(follows.save(yumyum_core::Follow::new(3, 4)).is_ok());
}

#[test]
fn double_start_and_double_stop_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = DataStore::new();
    store.start(dir.path()).unwrap();

    let err = store.start(dir.path()).unwrap_err();
    assert!(matches!(
        err,
        StoreError::InvalidTransition {
            from: StorePhase::Ready,
            action: "start"
        }
    ));

    store.stop().unwrap();
    assert!(matches!(
        store.stop(),
        Err(StoreError::InvalidTransition { .. })
    ));
}

#[test]
fn per_kind_save_writes_only_that_kind() {
    let dir = tempfile::tempdir().unwrap();
    let store = DataStore::new();
    store.start(dir.path()).unwrap();
    store
        .follows()
        .unwrap()
        .save(yumyum_core::Follow::new(3, 4))
        .unwrap();

    assert_eq!(store.save_follows().unwrap(), 1);

    assert!(dir.path().join("follows.json").exists());
    assert!(!dir.path().join("posts.json").exists());
}

#[test]
fn corrupt_snapshot_fails_start_and_leaves_store_uninitialized() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("posts.json"), "[{]").unwrap();
    let store = DataStore::new();

    let err = store.start(dir.path()).unwrap_err();

    match err {
        StoreError::Load(inner) => assert_eq!(inner.kind(), EntityKind::Post),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.phase(), StorePhase::Uninitialized);
    assert_eq!(
        fs::read_to_string(dir.path().join("posts.json")).unwrap(),
        "[{]"
    );
}

#[test]
fn one_failing_kind_does_not_block_the_others() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(DataStore::new());
    store.start(dir.path()).unwrap();
    store
        .posts()
        .unwrap()
        .save(yumyum_core::Post {
            id: None,
            author_id: 1,
            title: "still saved".to_string(),
            content: String::new(),
            created_at_ms: 0,
        })
        .unwrap();

    // A directory squatting on the temp path makes the accounts write fail.
    fs::create_dir(dir.path().join("accounts.tmp")).unwrap();

    let report = store.stop().unwrap();

    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        &report.failures[0],
        RepoError::Io {
            kind: EntityKind::Account,
            ..
        }
    ));
    assert_eq!(report.persisted.len(), EntityKind::ALL.len() - 1);
    assert!(dir.path().join("posts.json").exists());
    assert_eq!(store.phase(), StorePhase::Stopped);
}
