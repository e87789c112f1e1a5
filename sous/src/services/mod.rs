//! External collaborators behind narrow async traits.
//!
//! The dispatcher only sees the traits below. Each has one HTTP
//! implementation; tests swap in doubles.

mod encyclopedia;
mod oracle;
mod recipes;
mod speech;
mod videos;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ServiceConfig;
use crate::error::ServiceResult;
use crate::models::{ChatMessage, IngredientMatch, Recipe, VideoSearch};

pub use encyclopedia::Wikipedia;
pub use oracle::ChatOracle;
pub use recipes::MealDb;
pub use speech::HttpSpeech;
pub use videos::YoutubeSearch;

/// The language model.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Reply to `message` given the conversation so far. May be prose or a
    /// JSON tool call; callers must treat it as untrusted text.
    async fn complete(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> ServiceResult<String>;
}

/// Text to speech.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Encoded audio (MP3) for `text`.
    async fn synthesize(&self, text: &str, voice: &str) -> ServiceResult<Vec<u8>>;
}

/// Recipe database. No match is an empty result, not an error.
#[async_trait]
pub trait RecipeDirectory: Send + Sync {
    /// Recipes whose name matches `query`, optionally restricted to a cuisine.
    async fn search(&self, query: &str, cuisine: Option<&str>) -> ServiceResult<Vec<Recipe>>;

    async fn lookup(&self, recipe_id: &str) -> ServiceResult<Option<Recipe>>;

    /// Recipes using any of `ingredients`, best coverage first.
    async fn by_ingredients(&self, ingredients: &[String]) -> ServiceResult<Vec<IngredientMatch>>;
}

/// Video search.
#[async_trait]
pub trait VideoDirectory: Send + Sync {
    async fn search(&self, query: &str) -> ServiceResult<VideoSearch>;
}

/// Short encyclopedia summaries.
#[async_trait]
pub trait Encyclopedia: Send + Sync {
    /// A couple of sentences about `query`, or `None` if there is no article.
    async fn summary(&self, query: &str) -> ServiceResult<Option<String>>;
}

/// Every collaborator the dispatcher talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub oracle: Arc<dyn Oracle>,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub recipes: Arc<dyn RecipeDirectory>,
    pub videos: Arc<dyn VideoDirectory>,
    pub encyclopedia: Arc<dyn Encyclopedia>,
}

impl Collaborators {
    /// HTTP collaborators sharing one client.
    pub fn from_config(config: &ServiceConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .user_agent(concat!("sous/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            oracle: Arc::new(ChatOracle::new(
                client.clone(),
                &config.llm_base_url,
                config.llm_api_key.clone(),
                &config.llm_model,
            )),
            speech: Arc::new(HttpSpeech::new(
                client.clone(),
                &config.tts_base_url,
                config.tts_api_key.clone(),
                &config.tts_model,
            )),
            recipes: Arc::new(MealDb::new(client.clone(), &config.recipe_base_url)),
            videos: Arc::new(YoutubeSearch::new(
                client.clone(),
                &config.youtube_base_url,
                config.youtube_api_key.clone(),
            )),
            encyclopedia: Arc::new(Wikipedia::new(client, &config.wikipedia_base_url)),
        })
    }
}

/// Base URL without a trailing slash.
fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
