use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use uuid::Uuid;

/// One of the four meal slots of a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snacks,
}

impl MealSlot {
    /// Slots in the order a day is walked
    pub const ALL: [MealSlot; 4] = [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Dinner,
        MealSlot::Snacks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
            MealSlot::Snacks => "snacks",
        }
    }
}

impl Display for MealSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MealSlot::ALL
            .into_iter()
            .find(|slot| slot.as_str() == s)
            .ok_or_else(|| format!("unknown meal slot: {s}"))
    }
}

/// Recipe references held by the slots of one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Meals {
    pub breakfast: Option<Uuid>,
    pub lunch: Option<Uuid>,
    pub dinner: Option<Uuid>,
    pub snacks: Option<Uuid>,
}

impl Meals {
    pub fn get(&self, slot: MealSlot) -> Option<Uuid> {
        match slot {
            MealSlot::Breakfast => self.breakfast,
            MealSlot::Lunch => self.lunch,
            MealSlot::Dinner => self.dinner,
            MealSlot::Snacks => self.snacks,
        }
    }

    pub fn set(&mut self, slot: MealSlot, recipe_id: Option<Uuid>) {
        match slot {
            MealSlot::Breakfast => self.breakfast = recipe_id,
            MealSlot::Lunch => self.lunch = recipe_id,
            MealSlot::Dinner => self.dinner = recipe_id,
            MealSlot::Snacks => self.snacks = recipe_id,
        }
    }

    /// Occupied slots in breakfast, lunch, dinner, snacks order
    pub fn filled(&self) -> impl Iterator<Item = (MealSlot, Uuid)> + '_ {
        MealSlot::ALL
            .into_iter()
            .filter_map(|slot| self.get(slot).map(|id| (slot, id)))
    }

    /// Drops every reference to `recipe_id`
    pub fn forget(&mut self, recipe_id: Uuid) {
        for slot in MealSlot::ALL {
            if self.get(slot) == Some(recipe_id) {
                self.set(slot, None);
            }
        }
    }
}

/// The meals planned for one labelled day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: String,
    pub meals: Meals,
}

/// A user's plan: at most one entry per day label, kept in insertion order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MealPlan {
    pub days: Vec<DayPlan>,
}

impl MealPlan {
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn day(&self, label: &str) -> Option<&DayPlan> {
        self.days.iter().find(|d| d.day == label)
    }

    /// Replaces the meals of an existing day or appends a new one
    pub fn upsert(&mut self, day: DayPlan) {
        match self.days.iter_mut().find(|d| d.day == day.day) {
            Some(existing) => existing.meals = day.meals,
            None => self.days.push(day),
        }
    }

    /// Removes a day, returning whether it existed
    pub fn remove(&mut self, label: &str) -> bool {
        let before = self.days.len();
        self.days.retain(|d| d.day != label);
        self.days.len() != before
    }

    /// Every referenced recipe id, deduplicated, in first-seen order
    pub fn recipe_ids(&self) -> Vec<Uuid> {
        let mut ids = Vec::new();
        for (_, id) in self.days.iter().flat_map(|d| d.meals.filled()) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}
