//! Recipe records returned by the recipe directory.

use serde::{Deserialize, Serialize};

/// One ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub amount: String,
    /// Measure and name joined, as printed on the card.
    pub original: String,
}

/// One numbered preparation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeStep {
    pub number: usize,
    pub step: String,
}

/// A full recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub image: String,
    pub ready_in_minutes: u32,
    pub servings: u32,
    pub source_url: String,
    pub summary: String,
    pub dish_types: Vec<String>,
    pub cuisines: Vec<String>,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<RecipeStep>,
    pub category: String,
    pub area: String,
    pub youtube: String,
}

/// A recipe found by ingredient, with the searched ingredients it does and does not use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientMatch {
    pub id: String,
    pub title: String,
    pub image: String,
    pub used_ingredients: Vec<String>,
    pub missed_ingredients: Vec<String>,
    pub used_ingredient_count: usize,
    pub missed_ingredient_count: usize,
}

/// Payload of a `recipe_results` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RecipeListing {
    Recipes(Vec<Recipe>),
    Matches(Vec<IngredientMatch>),
}

impl RecipeListing {
    pub fn len(&self) -> usize {
        match self {
            Self::Recipes(r) => r.len(),
            Self::Matches(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
