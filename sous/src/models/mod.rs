//! Data models shared across the assistant.

mod message;
mod recipe;
mod session;
mod video;

pub use message::{ChatMessage, MessageRole};
pub use recipe::{Ingredient, IngredientMatch, Recipe, RecipeListing, RecipeStep};
pub use session::Session;
pub use video::{Video, VideoSearch};
