//! Ingredient substitution catalog.

/// Common ingredients and their stand-ins, in lookup order.
const CATALOG: &[(&str, &[&str])] = &[
    (
        "butter",
        &[
            "Equal amount of vegetable oil or melted coconut oil",
            "3/4 the amount of applesauce (for baking)",
            "Equal amount of margarine",
        ],
    ),
    (
        "eggs",
        &[
            "1/4 cup applesauce per egg (for baking)",
            "1 tbsp ground flaxseed + 3 tbsp water per egg (let sit 5 mins)",
            "1/4 cup mashed banana per egg (adds sweetness)",
        ],
    ),
    (
        "milk",
        &[
            "Equal amount of plant-based milk (almond, soy, oat)",
            "Equal amount of water + 1 tbsp lemon juice or vinegar",
            "3/4 cup evaporated milk + 1/4 cup water",
        ],
    ),
    (
        "flour",
        &[
            "Equal amount of almond flour (for gluten-free)",
            "3/4 amount of oat flour",
            "1:1 gluten-free flour blend",
        ],
    ),
    (
        "sugar",
        &[
            "3/4 amount of honey (reduce liquid by 1/4 cup)",
            "3/4 amount of maple syrup (reduce liquid by 3 tbsp)",
            "Equal amount of stevia blend or monk fruit sweetener",
        ],
    ),
    (
        "heavy cream",
        &[
            "3/4 cup milk + 1/4 cup melted butter",
            "Equal amount of coconut cream",
            "Equal amount of Greek yogurt (for non-whipped uses)",
        ],
    ),
    (
        "sour cream",
        &[
            "Equal amount of Greek yogurt",
            "Equal amount of cottage cheese blended smooth",
            "1 cup milk + 1 tbsp lemon juice or vinegar",
        ],
    ),
    (
        "onion",
        &[
            "Equal amount of shallots",
            "1 tbsp onion powder per medium onion",
            "Equal amount of leeks (white and light green parts)",
        ],
    ),
    (
        "garlic",
        &[
            "1/8 tsp garlic powder per clove",
            "1/2 tsp garlic flakes per clove",
            "Equal amount of shallots (milder flavor)",
        ],
    ),
];

/// A catalog hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    /// Catalog key in title case, e.g. `"Heavy Cream"`.
    pub canonical_name: String,
    pub substitutes: Vec<String>,
}

/// First catalog entry whose key contains the query or is contained in it.
///
/// Matching is case-insensitive substring containment only; misspellings do
/// not match. A blank query matches nothing.
pub fn lookup(ingredient: &str) -> Option<Substitution> {
    let query = ingredient.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }

    CATALOG
        .iter()
        .find(|(key, _)| key.contains(query.as_str()) || query.contains(key))
        .map(|(key, subs)| Substitution {
            canonical_name: title_case(key),
            substitutes: subs.iter().map(|s| (*s).to_string()).collect(),
        })
}

/// Message for a lookup miss.
pub fn not_found_message(ingredient: &str) -> String {
    format!(
        "No substitutions found for '{ingredient}'. Try common ingredients like butter, eggs, milk, flour, sugar, etc."
    )
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
