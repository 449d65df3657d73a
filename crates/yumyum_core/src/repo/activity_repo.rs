//! Diet and exercise narrow mutators.
//!
//! # Invariants
//! - Food items are addressed by their position in `DietRecord::foods`.
//! - All mutations go through `FileRepository::update_with`, so they are
//!   validated and serialized with every other write to the collection.

use crate::codec::Codec;
use crate::model::diet::{DietRecord, Exercise, FoodItem};
use crate::model::entity::EntityId;
use crate::repo::file_repo::{FileRepository, RepoResult};

impl<C: Codec<DietRecord>> FileRepository<DietRecord, C> {
    /// Diet records logged by one account, in insertion order.
    pub fn find_by_account(&self, account_id: EntityId) -> Vec<DietRecord> {
        self.find_where(|record| record.account_id == account_id)
    }

    /// Appends one food item; returns the updated record, or `None` when the
    /// diet record does not exist.
    pub fn add_food_item(
        &self,
        diet_id: EntityId,
        item: FoodItem,
    ) -> RepoResult<Option<DietRecord>> {
        self.update_with(diet_id, |record| {
            record.foods.push(item);
            record.clone()
        })
    }

    /// Removes the food item at `food_index`.
    ///
    /// Returns `false` when the record or the index does not exist.
    pub fn delete_food_item(&self, diet_id: EntityId, food_index: usize) -> RepoResult<bool> {
        let removed = self.update_with(diet_id, |record| {
            if food_index < record.foods.len() {
                record.foods.remove(food_index);
                true
            } else {
                false
            }
        })?;
        Ok(removed.unwrap_or(false))
    }
}

impl<C: Codec<Exercise>> FileRepository<Exercise, C> {
    pub fn find_by_account(&self, account_id: EntityId) -> Vec<Exercise> {
        self.find_where(|exercise| exercise.account_id == account_id)
    }
}
