//! One handler per [`Tool`] variant.

use chrono::Local;
use tracing::{debug, error, warn};

use super::Dispatcher;
use crate::error::ServiceError;
use crate::events::ServerEvent;
use crate::models::RecipeListing;
use crate::timers::{DeleteOutcome, TimerIdentifier, TimerView};
use crate::tools::units::{self, format_amount, ConversionOutcome};
use crate::tools::{clock, substitutions, Tool};

pub const RECIPE_NOT_FOUND: &str = "Sorry, I couldn't find that recipe.";
const NO_VIDEO: &str = "Sorry, I can't find that video number. Please search for recipes first.";
const NO_TIMERS: &str = "No active timers";

/// Reply and events produced by one tool run.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub reply: String,
    pub events: Vec<ServerEvent>,
}

impl Outcome {
    pub fn reply(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            events: Vec::new(),
        }
    }

    #[must_use]
    fn with(mut self, event: ServerEvent) -> Self {
        self.events.push(event);
        self
    }
}

/// Reply used when a collaborator fails while running `tool`.
const fn apology(tool: &Tool) -> &'static str {
    match tool {
        Tool::SearchYoutube { .. } => "Sorry, I had trouble searching for videos.",
        Tool::SearchWikipedia { .. } => "Sorry, I had trouble looking that up.",
        Tool::SearchRecipes { .. } => "Sorry, I had trouble searching for recipes.",
        Tool::RecipeByIngredients { .. } => {
            "Sorry, I had trouble finding recipes with those ingredients."
        }
        Tool::GetRecipeDetails { .. } => "Sorry, I had trouble getting the recipe details.",
        _ => "Sorry, I had trouble with that request",
    }
}

fn timers_list(timers: Vec<TimerView>) -> ServerEvent {
    let message = timers.is_empty().then(|| NO_TIMERS.to_string());
    ServerEvent::TimersList { timers, message }
}

impl Dispatcher {
    /// Run `tool`, turning collaborator failures into an apology and an
    /// `error` event.
    pub(super) async fn execute(&self, session_id: &str, tool: Tool) -> Outcome {
        let name = tool.name();
        let sorry = apology(&tool);
        match self.run(session_id, tool).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(session_id, tool = name, error = %e, "tool failed");
                Outcome::reply(sorry).with(ServerEvent::error(e.to_string()))
            }
        }
    }

    async fn run(&self, session_id: &str, tool: Tool) -> Result<Outcome, ServiceError> {
        let outcome = match tool {
            Tool::GetCurrentTime => {
                Outcome::reply(format!("It's {}.", clock::format_time(&Local::now())))
            }
            Tool::GetTodayDate => {
                Outcome::reply(format!("Today is {}.", clock::format_date(&Local::now())))
            }
            Tool::SearchWikipedia { query } => self.search_wikipedia(&query).await?,
            Tool::SearchYoutube { query } => self.search_youtube(session_id, &query).await?,
            Tool::PlayYoutubeVideo { result_number } => {
                self.play_video(session_id, result_number).await
            }
            Tool::SetTimer {
                duration_minutes,
                timer_name,
            } => self.set_timer(duration_minutes, timer_name.as_deref()).await,
            Tool::DeleteTimer { identifier } => self.delete_timer(&identifier).await,
            Tool::ListTimers => self.list_timers().await,
            Tool::ConvertUnits {
                amount,
                from_unit,
                to_unit,
            } => convert_units(amount, &from_unit, &to_unit),
            Tool::RecipeSubstitution {
                ingredient,
                quantity,
            } => recipe_substitution(&ingredient, quantity),
            Tool::SearchRecipes {
                query,
                diet,
                cuisine,
            } => {
                if let Some(diet) = diet {
                    debug!(%diet, "diet filter is not supported by the recipe directory");
                }
                self.search_recipes(&query, cuisine.as_deref()).await?
            }
            Tool::RecipeByIngredients { ingredients } => {
                self.recipes_by_ingredients(&ingredients).await?
            }
            Tool::GetRecipeDetails { recipe_id } => self.recipe_details_reply(&recipe_id).await?,
        };
        Ok(outcome)
    }

    async fn search_wikipedia(&self, query: &str) -> Result<Outcome, ServiceError> {
        let summary = self.collaborators.encyclopedia.summary(query).await?;
        Ok(Outcome::reply(summary.unwrap_or_else(|| {
            format!("Could not find information on Wikipedia for '{query}'.")
        })))
    }

    async fn search_youtube(&self, session_id: &str, query: &str) -> Result<Outcome, ServiceError> {
        let search = self.collaborators.videos.search(query).await?;
        let videos = search.videos;
        self.sessions.set_results(session_id, videos.clone()).await;

        let reply = if videos.is_empty() {
            "Sorry, I couldn't find any recipe videos for that query.".to_string()
        } else {
            format!("Here are the top recipe results I found for {query}.")
        };
        Ok(Outcome::reply(reply).with(ServerEvent::YoutubeResults { videos }))
    }

    async fn play_video(&self, session_id: &str, result_number: Option<i64>) -> Outcome {
        let video = match result_number {
            Some(n) => self.sessions.search_result(session_id, n).await,
            None => None,
        };
        let Some(video) = video else {
            debug!(session_id, ?result_number, "no such search result");
            return Outcome::reply(NO_VIDEO);
        };

        Outcome::reply(format!(
            "Playing recipe video number {}.",
            video.result_number
        ))
        .with(ServerEvent::PlayVideo {
            video_id: video.video_id,
            title: video.title,
            result_number: video.result_number,
        })
    }

    async fn set_timer(&self, duration_minutes: f64, timer_name: Option<&str>) -> Outcome {
        let timer = match self.timers.set(duration_minutes, timer_name).await {
            Ok(timer) => timer,
            Err(e) => {
                warn!(error = %e, "timer rejected");
                return Outcome::reply(
                    "I can only set timers longer than zero and up to one week.",
                )
                .with(ServerEvent::error(e.to_string()));
            }
        };

        let duration = format_amount(duration_minutes);
        let reply = match timer_name {
            Some(name) => format!(
                "Perfect! I've set a **{name} timer** for **{duration} minutes**. I'll let you know when it's done!"
            ),
            None => format!(
                "Timer set for **{duration} minutes**. I'll alert you when the time is up!"
            ),
        };

        Outcome::reply(reply)
            .with(ServerEvent::TimerSet {
                message: format!("Timer '{}' set for {duration} minutes", timer.name),
                timer: timer.view(format!("{duration} minutes")),
            })
            .with(timers_list(self.timers.views().await))
    }

    async fn delete_timer(&self, identifier: &TimerIdentifier) -> Outcome {
        let (reply, event) = match self.timers.delete(identifier).await {
            DeleteOutcome::Deleted { name, .. } => {
                let message = format!("Timer '{name}' deleted successfully");
                (
                    message.clone(),
                    ServerEvent::TimerDeleted {
                        message: Some(message),
                        error: None,
                    },
                )
            }
            DeleteOutcome::NotFound => {
                let error = format!("Timer '{identifier}' not found");
                (
                    error.clone(),
                    ServerEvent::TimerDeleted {
                        message: None,
                        error: Some(error),
                    },
                )
            }
        };
        Outcome::reply(reply)
            .with(event)
            .with(timers_list(self.timers.views().await))
    }

    async fn list_timers(&self) -> Outcome {
        let timers = self.timers.views().await;
        let reply = match timers.len() {
            0 => NO_TIMERS.to_string(),
            count => {
                let names: Vec<&str> = timers.iter().map(|t| t.name.as_str()).collect();
                let plural = if count == 1 { "" } else { "s" };
                format!("You have {count} active timer{plural}: {}", names.join(", "))
            }
        };
        Outcome::reply(reply).with(timers_list(timers))
    }

    async fn search_recipes(&self, query: &str, cuisine: Option<&str>) -> Result<Outcome, ServiceError> {
        let recipes = self.collaborators.recipes.search(query, cuisine).await?;
        if recipes.is_empty() {
            return Ok(Outcome::reply(
                "Sorry, I couldn't find any recipes matching your request.",
            ));
        }
        Ok(Outcome::reply(format!(
            "I found {} recipes for you. Check the recipe section below!",
            recipes.len()
        ))
        .with(ServerEvent::RecipeResults {
            recipes: RecipeListing::Recipes(recipes),
        }))
    }

    async fn recipes_by_ingredients(&self, ingredients: &str) -> Result<Outcome, ServiceError> {
        let wanted: Vec<String> = ingredients
            .split(',')
            .map(str::trim)
            .filter(|i| !i.is_empty())
            .map(String::from)
            .collect();
        let matches = if wanted.is_empty() {
            Vec::new()
        } else {
            self.collaborators.recipes.by_ingredients(&wanted).await?
        };

        if matches.is_empty() {
            return Ok(Outcome::reply(
                "Sorry, I couldn't find any recipes with those ingredients.",
            ));
        }
        Ok(Outcome::reply(format!(
            "I found {} recipes you can make with those ingredients. Check the recipe section!",
            matches.len()
        ))
        .with(ServerEvent::RecipeResults {
            recipes: RecipeListing::Matches(matches),
        }))
    }

    async fn recipe_details_reply(&self, recipe_id: &str) -> Result<Outcome, ServiceError> {
        let Some(recipe) = self.collaborators.recipes.lookup(recipe_id.trim()).await? else {
            return Ok(Outcome::reply(RECIPE_NOT_FOUND).with(ServerEvent::RecipeDetails {
                success: false,
                recipe: None,
                message: Some(RECIPE_NOT_FOUND.to_string()),
            }));
        };
        Ok(
            Outcome::reply(format!("Here are the details for {}.", recipe.title)).with(
                ServerEvent::RecipeDetails {
                    success: true,
                    recipe: Some(Box::new(recipe)),
                    message: None,
                },
            ),
        )
    }
}

fn convert_units(amount: f64, from_unit: &str, to_unit: &str) -> Outcome {
    match units::convert(amount, from_unit, to_unit) {
        ConversionOutcome::Converted(conversion) => {
            let result = conversion.display();
            let converted_amount = Some(conversion.converted_amount);
            Outcome::reply(format!(
                "**{} {from_unit}** converts to **{result}**. Perfect for your recipe!",
                format_amount(amount)
            ))
            .with(ServerEvent::ConversionResult {
                result,
                converted_amount,
                amount,
                from_unit: from_unit.to_string(),
                to_unit: to_unit.to_string(),
                error: None,
            })
        }
        ConversionOutcome::UnsupportedUnit { supported } => {
            let message = ConversionOutcome::unsupported_message(&supported);
            Outcome::reply(message.clone()).with(ServerEvent::ConversionResult {
                result: String::new(),
                converted_amount: None,
                amount,
                from_unit: from_unit.to_string(),
                to_unit: to_unit.to_string(),
                error: Some(message),
            })
        }
    }
}

fn recipe_substitution(ingredient: &str, quantity: Option<String>) -> Outcome {
    let Some(found) = substitutions::lookup(ingredient) else {
        let message = substitutions::not_found_message(ingredient);
        return Outcome::reply(message.clone()).with(ServerEvent::SubstitutionResult {
            ingredient: None,
            substitutions: Vec::new(),
            quantity: None,
            error: Some(message),
        });
    };

    let subs = &found.substitutes;
    let reply = if subs.len() == 1 {
        format!(
            "Great news! You can substitute **{ingredient}** with **{}**. That should work perfectly in your recipe!",
            subs[0]
        )
    } else {
        let shown = subs.iter().take(3).cloned().collect::<Vec<_>>().join(", ");
        let more = if subs.len() > 3 { "..." } else { "" };
        format!(
            "I found **{} substitution options** for **{ingredient}**: {shown}{more}. Any of these should work!",
            subs.len()
        )
    };

    Outcome::reply(reply).with(ServerEvent::SubstitutionResult {
        ingredient: Some(found.canonical_name),
        substitutions: found.substitutes,
        quantity: Some(quantity.unwrap_or_else(|| "as needed".to_string())),
        error: None,
    })
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::events::ServerEvent;
    use std::time::Duration;

    async fn run(harness: &Harness, session: &str, command: &str) -> (String, Vec<ServerEvent>) {
        let report = harness.dispatcher.handle_command(session, command).await;
        (report.reply, harness.drain())
    }

    #[tokio::test]
    async fn test_set_timer_defaults_and_lists() {
        let harness = Harness::new([r#"{"tool_name": "set_timer", "parameters": {}}"#]);
        let (reply, events) = run(&harness, "s", "set a timer").await;

        assert_eq!(
            reply,
            "Timer set for **5 minutes**. I'll alert you when the time is up!"
        );
        assert_eq!(names(&events), vec!["timer_set", "timers_list", "final_text", "ai_audio"]);
        match &events[0] {
            ServerEvent::TimerSet { timer, message } => {
                assert_eq!(timer.id, 1);
                assert_eq!(timer.name, "Timer 1");
                assert_eq!(timer.remaining, "5 minutes");
                assert_eq!(message, "Timer 'Timer 1' set for 5 minutes");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_timer_duration_is_refused() {
        let harness = Harness::new([r#"{"tool_name": "set_timer", "parameters": {"duration_minutes": -3}}"#]);
        let (reply, events) = run(&harness, "s", "negative timer").await;

        assert!(reply.starts_with("I can only set timers"));
        assert_eq!(names(&events)[0], "error");
        assert!(harness.dispatcher.timers().list().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_timer_by_name_is_case_insensitive() {
        let harness = Harness::new([
            r#"{"tool_name": "set_timer", "parameters": {"duration_minutes": 10, "timer_name": "Pasta"}}"#,
            "delete timer pasta",
            "delete timer pasta",
        ]);
        run(&harness, "s", "pasta timer").await;

        let (reply, events) = run(&harness, "s", "delete timer pasta").await;
        assert_eq!(reply, "Timer 'Pasta' deleted successfully");
        match &events[1] {
            ServerEvent::TimersList { timers, message } => {
                assert!(timers.is_empty());
                assert_eq!(message.as_deref(), Some("No active timers"));
            }
            other => panic!("unexpected {other:?}"),
        }

        let (reply, events) = run(&harness, "s", "delete timer pasta").await;
        assert_eq!(reply, "Timer 'pasta' not found");
        match &events[0] {
            ServerEvent::TimerDeleted { message, error } => {
                assert!(message.is_none());
                assert_eq!(error.as_deref(), Some("Timer 'pasta' not found"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_timer_is_gone_and_not_deletable() {
        let harness = Harness::new([
            r#"{"tool_name": "set_timer", "parameters": {"duration_minutes": 1, "timer_name": "eggs"}}"#,
            r#"{"tool_name": "list_timers", "parameters": {}}"#,
            "please delete timer 1",
        ]);
        run(&harness, "s", "eggs").await;
        tokio::time::advance(Duration::from_secs(61)).await;

        let (reply, _) = run(&harness, "s", "timers?").await;
        assert_eq!(reply, "No active timers");
        let (reply, _) = run(&harness, "s", "delete 1").await;
        assert_eq!(reply, "Timer '1' not found");
    }

    #[tokio::test]
    async fn test_list_timers_reply() {
        let harness = Harness::new([r#"{"tool_name": "list_timers", "parameters": {}}"#]);
        harness.dispatcher.timers().set(5.0, Some("rice")).await.unwrap();
        harness.dispatcher.timers().set(8.0, Some("beans")).await.unwrap();

        let (reply, _) = run(&harness, "s", "what timers").await;
        assert_eq!(reply, "You have 2 active timers: rice, beans");
    }

    #[tokio::test]
    async fn test_conversion_reply_and_event() {
        let harness = Harness::new(["convert 2 cups to tablespoons"]);
        let (reply, events) = run(&harness, "s", "2 cups in tbsp?").await;

        assert_eq!(
            reply,
            "**2 cup** converts to **2 cup = 32.00 tablespoon**. Perfect for your recipe!"
        );
        match &events[0] {
            ServerEvent::ConversionResult {
                result,
                converted_amount,
                error,
                ..
            } => {
                assert_eq!(result, "2 cup = 32.00 tablespoon");
                assert!((converted_amount.unwrap() - 31.9988).abs() < 1e-3);
                assert!(error.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unsupported_unit_lists_units() {
        let harness = Harness::new([
            r#"{"tool_name": "convert_units", "parameters": {"amount": 1, "from_unit": "smidgen", "to_unit": "cup"}}"#,
        ]);
        let (reply, events) = run(&harness, "s", "smidgen").await;

        assert!(reply.starts_with("Unit not supported. Available units: "));
        assert!(reply.contains("tablespoon"));
        match &events[0] {
            ServerEvent::ConversionResult {
                converted_amount,
                error,
                ..
            } => {
                assert_eq!(error.as_ref(), Some(&reply));
                assert!(converted_amount.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_substitution_replies() {
        let harness = Harness::new([
            r#"{"tool_name": "recipe_substitution", "parameters": {"ingredient": "butter"}}"#,
            r#"{"tool_name": "recipe_substitution", "parameters": {"ingredient": "buttr"}}"#,
        ]);

        let (reply, events) = run(&harness, "s", "no butter").await;
        assert!(reply.starts_with("I found **3 substitution options** for **butter**: "));
        match &events[0] {
            ServerEvent::SubstitutionResult {
                ingredient,
                quantity,
                substitutions,
                ..
            } => {
                assert_eq!(ingredient.as_deref(), Some("Butter"));
                assert_eq!(quantity.as_deref(), Some("as needed"));
                assert_eq!(substitutions.len(), 3);
            }
            other => panic!("unexpected {other:?}"),
        }

        let (reply, _) = run(&harness, "s", "no buttr").await;
        assert!(reply.starts_with("No substitutions found for 'buttr'"));
    }

    #[tokio::test]
    async fn test_play_without_search_asks_to_search_first() {
        let harness = Harness::new([
            r#"{"tool_name": "play_youtube_video", "parameters": {"result_number": 7}}"#,
            r#"{"tool_name": "play_youtube_video", "parameters": {}}"#,
        ]);
        let (reply, events) = run(&harness, "s", "play 7").await;
        assert_eq!(reply, "Sorry, I can't find that video number. Please search for recipes first.");
        assert_eq!(names(&events), vec!["final_text", "ai_audio"]);

        let (reply, _) = run(&harness, "s", "play").await;
        assert!(reply.starts_with("Sorry, I can't find that video number"));
    }

    #[tokio::test]
    async fn test_recipe_search_and_failure() {
        let harness = Harness::builder([
            r#"{"tool_name": "search_recipes", "parameters": {"query": "penne"}}"#,
            r#"{"tool_name": "search_recipes", "parameters": {"query": "penne"}}"#,
        ])
        .recipes(vec![sample_recipe("52771", "Spicy Arrabiata Penne")])
        .build();

        let (reply, events) = run(&harness, "s", "penne recipes").await;
        assert_eq!(reply, "I found 1 recipes for you. Check the recipe section below!");
        assert_eq!(events[0].name(), "recipe_results");

        harness.recipes.fail();
        let (reply, events) = run(&harness, "s", "penne recipes").await;
        assert_eq!(reply, "Sorry, I had trouble searching for recipes.");
        assert_eq!(names(&events), vec!["error", "final_text", "ai_audio"]);
    }

    #[tokio::test]
    async fn test_recipe_by_ingredients() {
        let harness = Harness::new([
            r#"{"tool_name": "recipe_by_ingredients", "parameters": {"ingredients": "chicken, rice"}}"#,
            r#"{"tool_name": "recipe_by_ingredients", "parameters": {"ingredients": " , "}}"#,
        ]);

        let (reply, _) = run(&harness, "s", "chicken and rice").await;
        assert_eq!(
            reply,
            "I found 1 recipes you can make with those ingredients. Check the recipe section!"
        );
        assert_eq!(harness.recipes.ingredient_queries(), vec![vec!["chicken", "rice"]]);

        let (reply, _) = run(&harness, "s", "nothing").await;
        assert_eq!(reply, "Sorry, I couldn't find any recipes with those ingredients.");
    }

    #[tokio::test]
    async fn test_recipe_details_tool() {
        let harness = Harness::new([
            r#"{"tool_name": "get_recipe_details", "parameters": {"recipe_id": "52771"}}"#,
            r#"{"tool_name": "get_recipe_details", "parameters": {"recipe_id": "0"}}"#,
        ]);
        let (reply, events) = run(&harness, "s", "details").await;
        assert_eq!(reply, "Here are the details for Spicy Arrabiata Penne.");
        assert_eq!(events[0].name(), "recipe_details");

        let (reply, _) = run(&harness, "s", "details").await;
        assert_eq!(reply, "Sorry, I couldn't find that recipe.");
    }

    #[tokio::test]
    async fn test_wikipedia_summary() {
        let harness = Harness::builder([
            r#"{"tool_name": "search_wikipedia", "parameters": {"query": "miso"}}"#,
            r#"{"tool_name": "search_wikipedia", "parameters": {"query": "miso"}}"#,
        ])
        .summary(Some("Miso is a fermented paste."))
        .build();

        let (reply, _) = run(&harness, "s", "what is miso").await;
        assert_eq!(reply, "Miso is a fermented paste.");

        harness.encyclopedia.set(None);
        let (reply, _) = run(&harness, "s", "what is miso").await;
        assert_eq!(reply, "Could not find information on Wikipedia for 'miso'.");
    }

    #[tokio::test]
    async fn test_clock_tools() {
        let harness = Harness::new(["what's the time", "what's the date"]);
        let (reply, _) = run(&harness, "s", "time?").await;
        assert!(reply.starts_with("It's ") && (reply.ends_with("AM.") || reply.ends_with("PM.")));

        let (reply, _) = run(&harness, "s", "date?").await;
        assert!(reply.starts_with("Today is "));
    }
}
