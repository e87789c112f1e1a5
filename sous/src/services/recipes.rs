//! TheMealDB client.
//!
//! TheMealDB returns flat meal records with numbered `strIngredientN` /
//! `strMeasureN` slots and a single instructions blob. [`meal_to_recipe`]
//! reshapes them into [`Recipe`].

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::{trim_base, RecipeDirectory};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{Ingredient, IngredientMatch, Recipe, RecipeStep};

const SERVICE: &str = "recipes";

/// Most recipes returned by one search.
pub const MAX_RESULTS: usize = 6;

/// TheMealDB has up to twenty ingredient slots per meal.
const INGREDIENT_SLOTS: usize = 20;

/// Instruction lines this short are headings or numbering, not steps.
const MIN_STEP_CHARS: usize = 10;

const DEFAULT_READY_MINUTES: u32 = 30;
const DEFAULT_SERVINGS: u32 = 4;

type Meal = Map<String, Value>;

#[derive(Debug, Deserialize)]
struct MealsResponse {
    /// `null` when nothing matched.
    #[serde(default)]
    meals: Option<Vec<Meal>>,
}

pub struct MealDb {
    client: reqwest::Client,
    base_url: String,
}

impl MealDb {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
        }
    }

    async fn meals(&self, endpoint: &str, key: &str, value: &str) -> ServiceResult<Vec<Meal>> {
        let url = format!(
            "{}/{endpoint}?{key}={}",
            self.base_url,
            urlencoding::encode(value)
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ServiceError::http(SERVICE))?;
        let response = ServiceError::check(SERVICE, response).await?;
        let parsed: MealsResponse = response.json().await.map_err(ServiceError::http(SERVICE))?;
        Ok(parsed.meals.unwrap_or_default())
    }
}

#[async_trait]
impl RecipeDirectory for MealDb {
    async fn search(&self, query: &str, cuisine: Option<&str>) -> ServiceResult<Vec<Recipe>> {
        let cuisine = cuisine.map(str::to_lowercase);
        let recipes: Vec<Recipe> = self
            .meals("search.php", "s", query)
            .await?
            .iter()
            .filter(|meal| {
                cuisine
                    .as_deref()
                    .is_none_or(|c| field(meal, "strArea").to_lowercase().contains(c))
            })
            .take(MAX_RESULTS)
            .map(meal_to_recipe)
            .collect();
        info!(query, found = recipes.len(), "recipe search");
        Ok(recipes)
    }

    async fn lookup(&self, recipe_id: &str) -> ServiceResult<Option<Recipe>> {
        let meals = self.meals("lookup.php", "i", recipe_id).await?;
        Ok(meals.first().map(meal_to_recipe))
    }

    async fn by_ingredients(&self, ingredients: &[String]) -> ServiceResult<Vec<IngredientMatch>> {
        let mut wanted: Vec<&str> = Vec::new();
        for ingredient in ingredients.iter().map(|i| i.trim()).filter(|i| !i.is_empty()) {
            if !wanted.contains(&ingredient) {
                wanted.push(ingredient);
            }
        }

        let mut matches: Vec<IngredientMatch> = Vec::new();
        let mut by_id: HashMap<String, usize> = HashMap::new();
        for ingredient in &wanted {
            let meals = self.meals("filter.php", "i", ingredient).await?;
            debug!(ingredient, meals = meals.len(), "ingredient filter");
            for meal in &meals {
                let id = field(meal, "idMeal");
                let index = *by_id.entry(id.clone()).or_insert_with(|| {
                    matches.push(IngredientMatch {
                        id,
                        title: field(meal, "strMeal"),
                        image: field(meal, "strMealThumb"),
                        used_ingredients: Vec::new(),
                        missed_ingredients: Vec::new(),
                        used_ingredient_count: 0,
                        missed_ingredient_count: 0,
                    });
                    matches.len() - 1
                });
                let entry = &mut matches[index];
                entry.used_ingredients.push((*ingredient).to_string());
                entry.used_ingredient_count += 1;
            }
        }

        // Stable, so equally good matches keep first-seen order.
        matches.sort_by(|a, b| b.used_ingredient_count.cmp(&a.used_ingredient_count));
        matches.truncate(MAX_RESULTS);
        for entry in &mut matches {
            entry.missed_ingredients = wanted
                .iter()
                .filter(|w| !entry.used_ingredients.iter().any(|u| u == *w))
                .map(|w| (*w).to_string())
                .collect();
            entry.missed_ingredient_count = entry.missed_ingredients.len();
        }
        info!(ingredients = wanted.len(), found = matches.len(), "recipes by ingredients");
        Ok(matches)
    }
}

/// Trimmed string field, empty when missing or null.
fn field(meal: &Meal, key: &str) -> String {
    meal.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

fn ingredients(meal: &Meal) -> Vec<Ingredient> {
    (1..=INGREDIENT_SLOTS)
        .filter_map(|slot| {
            let name = field(meal, &format!("strIngredient{slot}"));
            if name.is_empty() {
                return None;
            }
            let amount = field(meal, &format!("strMeasure{slot}"));
            let original = format!("{amount} {name}").trim().to_string();
            Some(Ingredient {
                name,
                amount,
                original,
            })
        })
        .collect()
}

/// Numbered steps from an instructions blob, one per substantial line.
pub fn parse_steps(instructions: &str) -> Vec<RecipeStep> {
    instructions
        .lines()
        .map(str::trim)
        .filter(|line| line.chars().count() > MIN_STEP_CHARS)
        .enumerate()
        .map(|(i, line)| RecipeStep {
            number: i + 1,
            step: line.to_string(),
        })
        .collect()
}

fn meal_to_recipe(meal: &Meal) -> Recipe {
    let category = field(meal, "strCategory");
    let area = field(meal, "strArea");
    let title = Some(field(meal, "strMeal"))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Unknown Recipe".to_string());
    let summary = ["Delicious", area.as_str(), category.as_str(), "recipe"]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    Recipe {
        id: field(meal, "idMeal"),
        title,
        image: field(meal, "strMealThumb"),
        ready_in_minutes: DEFAULT_READY_MINUTES,
        servings: DEFAULT_SERVINGS,
        source_url: field(meal, "strSource"),
        summary,
        dish_types: lowercase_tag(&category),
        cuisines: lowercase_tag(&area),
        ingredients: ingredients(meal),
        instructions: parse_steps(&field(meal, "strInstructions")),
        category,
        area,
        youtube: field(meal, "strYoutube"),
    }
}

fn lowercase_tag(value: &str) -> Vec<String> {
    if value.is_empty() {
        Vec::new()
    } else {
        vec![value.to_lowercase()]
    }
}
