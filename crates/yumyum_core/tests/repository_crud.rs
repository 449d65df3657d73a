use std::collections::HashSet;
use yumyum_core::{
    Account, DietRecord, DietRepository, FoodItem, MealType, Post, PostRepository, Profile,
    ProfileRepository, RepoError, Repository,
};

#[test]
fn save_assigns_sequential_ids_starting_at_one() {
    let repo = DietRepository::new();

    let first = repo.save(breakfast(7)).unwrap();
    let second = repo.save(breakfast(7)).unwrap();

    assert_eq!(first.id, Some(1));
    assert_eq!(second.id, Some(2));
    assert_eq!(repo.find_by_id(1).unwrap(), first);
}

#[test]
fn save_with_known_id_replaces_the_whole_record() {
    let repo = PostRepository::new();
    let stored = repo.save(post(1, "draft")).unwrap();

    let mut replacement = post(2, "final");
    replacement.id = stored.id;
    let updated = repo.save(replacement).unwrap();

    assert_eq!(updated.id, stored.id);
    assert_eq!(repo.find_all(), vec![updated]);
}

#[test]
fn find_all_returns_an_independent_copy() {
    let repo = PostRepository::new();
    repo.save(post(1, "one")).unwrap();

    let mut snapshot = repo.find_all();
    snapshot[0].title = "mutated".to_string();
    snapshot.clear();

    assert_eq!(repo.find_all().len(), 1);
    assert_eq!(repo.find_by_id(1).unwrap().title, "one");
}

#[test]
fn missing_ids_are_not_errors() {
    let repo = PostRepository::new();
    assert!(repo.find_by_id(404).is_none());
    assert!(!repo.delete(404).unwrap());
}

#[test]
fn delete_twice_behaves_like_delete_once() {
    let repo = PostRepository::new();
    let kept = repo.save(post(1, "kept")).unwrap();
    let doomed = repo.save(post(1, "doomed")).unwrap();

    assert!(repo.delete(doomed.id.unwrap()).unwrap());
    let after_first = repo.find_all();
    assert!(!repo.delete(doomed.id.unwrap()).unwrap());

    assert_eq!(repo.find_all(), after_first);
    assert_eq!(after_first, vec![kept]);
}

#[test]
fn ids_stay_unique_across_mixed_saves_and_deletes() {
    let repo = PostRepository::new();
    for round in 0..20 {
        let stored = repo.save(post(round, "entry")).unwrap();
        if round % 3 == 0 {
            repo.delete(stored.id.unwrap()).unwrap();
        }
        let mut stray = post(round, "stray id");
        stray.id = Some(1000 + round);
        repo.save(stray).unwrap();
    }

    let ids = repo
        .find_all()
        .into_iter()
        .map(|p| p.id.unwrap())
        .collect::<Vec<_>>();
    let unique = ids.iter().copied().collect::<HashSet<_>>();
    assert_eq!(ids.len(), unique.len());
    assert!(ids.iter().all(|id| *id < 1000));
}

#[test]
fn malformed_entities_are_rejected_and_not_stored() {
    let accounts = yumyum_core::AccountRepository::new();
    let err = accounts
        .save(Account::new("no-at-sign", "kim"))
        .unwrap_err();
    match err {
        RepoError::Validation(validation) => assert_eq!(validation.field, "email"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(accounts.is_empty());

    let diets = DietRepository::new();
    let mut bad = breakfast(1);
    bad.foods.push(FoodItem::new("  ", 1, 1));
    assert!(matches!(diets.save(bad), Err(RepoError::Validation(_))));
    assert!(diets.is_empty());
}

#[test]
fn profiles_can_be_stored_at_their_account_id() {
    let repo = ProfileRepository::new();
    let mut profile = Profile::new(12);
    profile.id = Some(12);
    profile.goal = "gain muscle".to_string();

    repo.save(profile).unwrap();
    let next = repo.save(Profile::new(13)).unwrap();

    assert_eq!(repo.find_by_id(12).unwrap().goal, "gain muscle");
    assert_eq!(next.id, Some(13));
}

fn breakfast(account_id: u64) -> DietRecord {
    let mut record = DietRecord::new(account_id, "2024-05-02", MealType::Breakfast);
    record.foods.push(FoodItem::new("yogurt", 150, 90));
    record
}

fn post(author_id: u64, title: &str) -> Post {
    Post {
        id: None,
        author_id,
        title: title.to_string(),
        content: "body".to_string(),
        created_at_ms: 1_714_600_000_000,
    }
}
