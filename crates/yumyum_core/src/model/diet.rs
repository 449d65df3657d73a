//! Diet and exercise log records.

use super::entity::{require_date, require_non_blank, Entity, EntityId, EntityKind, ValidationError};
use serde::{Deserialize, Serialize};

/// Meal slot a diet record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

/// One eaten food inside a diet record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    pub grams: u32,
    pub calories: u32,
}

impl FoodItem {
    pub fn new(name: impl Into<String>, grams: u32, calories: u32) -> Self {
        Self {
            name: name.into(),
            grams,
            calories,
        }
    }
}

/// A meal logged by one account on one day.
///
/// `foods` keeps insertion order; index-based mutators rely on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub account_id: EntityId,
    /// `YYYY-MM-DD`.
    pub date: String,
    pub meal: MealType,
    #[serde(default)]
    pub foods: Vec<FoodItem>,
}

impl DietRecord {
    pub fn new(account_id: EntityId, date: impl Into<String>, meal: MealType) -> Self {
        Self {
            id: None,
            account_id,
            date: date.into(),
            meal,
            foods: Vec::new(),
        }
    }

    pub fn total_calories(&self) -> u32 {
        self.foods.iter().map(|food| food.calories).sum()
    }
}

impl Entity for DietRecord {
    const KIND: EntityKind = EntityKind::Diet;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_date(Self::KIND, "date", &self.date)?;
        for food in &self.foods {
            require_non_blank(Self::KIND, "foods.name", &food.name)?;
        }
        Ok(())
    }
}

/// A workout session logged by one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub account_id: EntityId,
    /// `YYYY-MM-DD`.
    pub date: String,
    pub name: String,
    pub duration_minutes: u32,
    #[serde(default)]
    pub calories_burned: u32,
}

impl Entity for Exercise {
    const KIND: EntityKind = EntityKind::Exercise;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank(Self::KIND, "name", &self.name)?;
        require_date(Self::KIND, "date", &self.date)
    }
}
