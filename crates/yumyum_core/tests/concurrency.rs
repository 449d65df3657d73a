use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use yumyum_core::{DataStore, Exercise, FoodItem, Repository};

const THREADS: u64 = 8;
const SAVES_PER_THREAD: u64 = 50;

#[test]
fn concurrent_saves_never_lose_updates() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(DataStore::new());
    store.start(dir.path()).unwrap();

    let handles = (0..THREADS)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for n in 0..SAVES_PER_THREAD {
                    store
                        .exercises()
                        .unwrap()
                        .save(exercise(worker, n as u32))
                        .unwrap();
                }
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.join().unwrap();
    }

    let all = store.exercises().unwrap().find_all();
    let ids = all.iter().map(|e| e.id.unwrap()).collect::<HashSet<_>>();
    assert_eq!(all.len() as u64, THREADS * SAVES_PER_THREAD);
    assert_eq!(ids.len(), all.len());
    for worker in 0..THREADS {
        assert_eq!(
            store.exercises().unwrap().find_by_account(worker).len() as u64,
            SAVES_PER_THREAD
        );
    }
}

#[test]
fn readers_never_observe_partial_food_lists() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(DataStore::new());
    store.start(dir.path()).unwrap();
    let mut record = yumyum_core::DietRecord::new(1, "2024-05-04", yumyum_core::MealType::Lunch);
    record.foods = vec![FoodItem::new("a", 1, 1), FoodItem::new("b", 1, 1)];
    let id = store.diets().unwrap().save(record).unwrap().id.unwrap();

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for _ in 0..200 {
                let mut replacement = store.diets().unwrap().find_by_id(id).unwrap();
                replacement.foods = vec![FoodItem::new("c", 2, 2), FoodItem::new("d", 2, 2)];
                store.diets().unwrap().save(replacement).unwrap();
                let mut back = store.diets().unwrap().find_by_id(id).unwrap();
                back.foods = vec![FoodItem::new("a", 1, 1), FoodItem::new("b", 1, 1)];
                store.diets().unwrap().save(back).unwrap();
            }
        })
    };

    for _ in 0..200 {
        let seen = store.diets().unwrap().find_by_id(id).unwrap();
        assert_eq!(seen.foods.len(), 2);
        assert_eq!(seen.foods[0].grams, seen.foods[1].grams);
    }
    writer.join().unwrap();
}

#[test]
fn persist_during_live_writes_produces_a_loadable_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(DataStore::new());
    store.start(dir.path()).unwrap();

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for n in 0..100 {
                store.exercises().unwrap().save(exercise(1, n)).unwrap();
            }
        })
    };
    for _ in 0..10 {
        store.save_exercises().unwrap();
    }
    writer.join().unwrap();
    store.stop().unwrap();

    let reloaded = DataStore::new();
    reloaded.start(dir.path()).unwrap();
    assert_eq!(reloaded.exercises().unwrap().len(), 100);
}

fn exercise(account_id: u64, n: u32) -> Exercise {
    Exercise {
        id: None,
        account_id,
        date: "2024-05-05".to_string(),
        name: format!("set {n}"),
        duration_minutes: 10 + n,
        calories_burned: 5 * n,
    }
}
