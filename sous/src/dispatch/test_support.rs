//! Collaborator doubles and a dispatcher harness for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::{Dispatcher, DispatcherOptions};
use crate::error::{ServiceError, ServiceResult};
use crate::events::{Envelope, EventBus, ServerEvent};
use crate::models::{ChatMessage, IngredientMatch, Recipe, VideoSearch};
use crate::services::{
    Collaborators, Encyclopedia, Oracle, RecipeDirectory, SpeechSynthesizer, VideoDirectory,
};
use crate::session::SessionStore;
use crate::timers::TimerRegistry;

/// Replies with scripted answers in order, then fails.
#[derive(Default)]
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<(usize, String)>>,
}

impl ScriptedOracle {
    /// `(history length, message)` for every call so far.
    pub fn calls(&self) -> Vec<(usize, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn complete(&self, _: &str, history: &[ChatMessage], message: &str) -> ServiceResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push((history.len(), message.to_string()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ServiceError::malformed("oracle", "script exhausted"))
    }
}

#[derive(Default)]
pub struct RecordingSpeech {
    fail: bool,
    spoken: Mutex<Vec<String>>,
}

impl RecordingSpeech {
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for RecordingSpeech {
    async fn synthesize(&self, text: &str, _voice: &str) -> ServiceResult<Vec<u8>> {
        if self.fail {
            return Err(ServiceError::malformed("speech", "offline"));
        }
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(vec![1, 2, 3])
    }
}

pub struct FakeRecipes {
    recipes: Vec<Recipe>,
    failing: Mutex<bool>,
    ingredient_queries: Mutex<Vec<Vec<String>>>,
}

impl FakeRecipes {
    pub fn fail(&self) {
        *self.failing.lock().unwrap() = true;
    }

    pub fn ingredient_queries(&self) -> Vec<Vec<String>> {
        self.ingredient_queries.lock().unwrap().clone()
    }

    fn check(&self) -> ServiceResult<()> {
        if *self.failing.lock().unwrap() {
            Err(ServiceError::malformed("recipes", "offline"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RecipeDirectory for FakeRecipes {
    async fn search(&self, _query: &str, _cuisine: Option<&str>) -> ServiceResult<Vec<Recipe>> {
        self.check()?;
        Ok(self.recipes.clone())
    }

    async fn lookup(&self, recipe_id: &str) -> ServiceResult<Option<Recipe>> {
        self.check()?;
        Ok(self.recipes.iter().find(|r| r.id == recipe_id).cloned())
    }

    async fn by_ingredients(&self, ingredients: &[String]) -> ServiceResult<Vec<IngredientMatch>> {
        self.check()?;
        self.ingredient_queries
            .lock()
            .unwrap()
            .push(ingredients.to_vec());
        Ok(vec![IngredientMatch {
            id: "1".to_string(),
            title: "Everything Bowl".to_string(),
            image: String::new(),
            used_ingredients: ingredients.to_vec(),
            missed_ingredients: Vec::new(),
            used_ingredient_count: ingredients.len(),
            missed_ingredient_count: 0,
        }])
    }
}

pub struct FakeVideos(VideoSearch);

#[async_trait]
impl VideoDirectory for FakeVideos {
    async fn search(&self, _query: &str) -> ServiceResult<VideoSearch> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
pub struct FakeEncyclopedia(Mutex<Option<String>>);

impl FakeEncyclopedia {
    pub fn set(&self, summary: Option<&str>) {
        *self.0.lock().unwrap() = summary.map(String::from);
    }
}

#[async_trait]
impl Encyclopedia for FakeEncyclopedia {
    async fn summary(&self, _query: &str) -> ServiceResult<Option<String>> {
        Ok(self.0.lock().unwrap().clone())
    }
}

pub fn sample_recipe(id: &str, title: &str) -> Recipe {
    Recipe {
        id: id.to_string(),
        title: title.to_string(),
        image: String::new(),
        ready_in_minutes: 30,
        servings: 4,
        source_url: String::new(),
        summary: "Delicious Italian Pasta recipe".to_string(),
        dish_types: vec!["pasta".to_string()],
        cuisines: vec!["italian".to_string()],
        ingredients: Vec::new(),
        instructions: Vec::new(),
        category: "Pasta".to_string(),
        area: "Italian".to_string(),
        youtube: String::new(),
    }
}

/// Wire names of `events`, in order.
pub fn names(events: &[ServerEvent]) -> Vec<&'static str> {
    events.iter().map(ServerEvent::name).collect()
}

pub struct Harness {
    pub dispatcher: Dispatcher,
    pub events: EventBus,
    pub oracle: Arc<ScriptedOracle>,
    pub speech: Arc<RecordingSpeech>,
    pub recipes: Arc<FakeRecipes>,
    pub encyclopedia: Arc<FakeEncyclopedia>,
    rx: Mutex<broadcast::Receiver<Envelope>>,
}

impl Harness {
    pub fn new<'a>(replies: impl IntoIterator<Item = &'a str>) -> Self {
        Self::builder(replies).build()
    }

    pub fn builder<'a>(replies: impl IntoIterator<Item = &'a str>) -> HarnessBuilder {
        HarnessBuilder {
            replies: replies.into_iter().map(String::from).collect(),
            failing_speech: false,
            videos: VideoSearch::default(),
            recipes: vec![sample_recipe("52771", "Spicy Arrabiata Penne")],
            summary: None,
        }
    }

    /// Every event published since the last drain.
    pub fn drain(&self) -> Vec<ServerEvent> {
        let mut rx = self.rx.lock().unwrap();
        std::iter::from_fn(|| rx.try_recv().ok())
            .map(|envelope| envelope.event)
            .collect()
    }
}

pub struct HarnessBuilder {
    replies: VecDeque<String>,
    failing_speech: bool,
    videos: VideoSearch,
    recipes: Vec<Recipe>,
    summary: Option<String>,
}

impl HarnessBuilder {
    pub fn failing_speech(mut self) -> Self {
        self.failing_speech = true;
        self
    }

    pub fn videos(mut self, videos: VideoSearch) -> Self {
        self.videos = videos;
        self
    }

    pub fn recipes(mut self, recipes: Vec<Recipe>) -> Self {
        self.recipes = recipes;
        self
    }

    pub fn summary(mut self, summary: Option<&str>) -> Self {
        self.summary = summary.map(String::from);
        self
    }

    pub fn build(self) -> Harness {
        let oracle = Arc::new(ScriptedOracle {
            replies: Mutex::new(self.replies),
            calls: Mutex::default(),
        });
        let speech = Arc::new(RecordingSpeech {
            fail: self.failing_speech,
            spoken: Mutex::default(),
        });
        let recipes = Arc::new(FakeRecipes {
            recipes: self.recipes,
            failing: Mutex::new(false),
            ingredient_queries: Mutex::default(),
        });
        let encyclopedia = Arc::new(FakeEncyclopedia(Mutex::new(self.summary)));

        let collaborators = Collaborators {
            oracle: oracle.clone(),
            speech: speech.clone(),
            recipes: recipes.clone(),
            videos: Arc::new(FakeVideos(self.videos)),
            encyclopedia: encyclopedia.clone(),
        };
        let events = EventBus::new();
        let rx = Mutex::new(events.subscribe());
        let dispatcher = Dispatcher::new(
            collaborators,
            Arc::new(TimerRegistry::new()),
            Arc::new(SessionStore::new()),
            events.clone(),
            DispatcherOptions::default(),
        );

        Harness {
            dispatcher,
            events,
            oracle,
            speech,
            recipes,
            encyclopedia,
            rx,
        }
    }
}
