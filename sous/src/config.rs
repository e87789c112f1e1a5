//! Settings for the external collaborators and the dispatcher.

use std::time::Duration;

use clap::Args;

/// Collaborator endpoints, credentials and dispatcher limits.
///
/// Every field can also be set from the environment. Missing API keys are
/// not fatal; the affected collaborator fails each call instead.
#[derive(Args, Debug, Clone)]
pub struct ServiceConfig {
    // === Language model ===
    /// API key for the chat completion endpoint
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub llm_api_key: Option<String>,

    /// Base URL of an OpenAI-compatible chat completion API
    #[arg(long, env = "SOUS_LLM_BASE_URL", default_value = "https://api.groq.com/openai/v1")]
    pub llm_base_url: String,

    /// Model asked to answer each command
    #[arg(long, env = "SOUS_LLM_MODEL", default_value = "llama-3.1-8b-instant")]
    pub llm_model: String,

    // === Speech ===
    /// API key for the speech endpoint
    #[arg(long, env = "A4F_API_KEY", hide_env_values = true)]
    pub tts_api_key: Option<String>,

    /// Base URL of an OpenAI-compatible speech API
    #[arg(long, env = "SOUS_TTS_BASE_URL", default_value = "https://api.a4f.co/v1")]
    pub tts_base_url: String,

    /// Speech model
    #[arg(long, env = "SOUS_TTS_MODEL", default_value = "tts-1")]
    pub tts_model: String,

    /// Voice used for spoken replies
    #[arg(long, env = "SOUS_VOICE", default_value = "nova")]
    pub voice: String,

    // === Lookups ===
    /// YouTube Data API key; without it video searches return a search link
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub youtube_api_key: Option<String>,

    /// Base URL of the YouTube Data API
    #[arg(long, env = "SOUS_YOUTUBE_BASE_URL", default_value = "https://www.googleapis.com/youtube/v3")]
    pub youtube_base_url: String,

    /// Base URL of TheMealDB
    #[arg(long, env = "SOUS_RECIPE_BASE_URL", default_value = "https://www.themealdb.com/api/json/v1/1")]
    pub recipe_base_url: String,

    /// Base URL of the Wikipedia REST API
    #[arg(long, env = "SOUS_WIKIPEDIA_BASE_URL", default_value = "https://en.wikipedia.org/api/rest_v1")]
    pub wikipedia_base_url: String,

    // === Limits ===
    /// Minutes of inactivity before a session is forgotten
    #[arg(long, env = "SOUS_SESSION_IDLE_MINUTES", default_value = "60")]
    pub session_idle_minutes: u64,

    /// Commands processed at the same time
    #[arg(long, env = "SOUS_MAX_CONCURRENT_COMMANDS", default_value = "8")]
    pub max_concurrent_commands: usize,

    /// Timeout for every outbound HTTP request, in seconds
    #[arg(long, env = "SOUS_HTTP_TIMEOUT_SECS", default_value = "10")]
    pub http_timeout_secs: u64,
}

impl ServiceConfig {
    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_minutes.saturating_mul(60))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        config: ServiceConfig,
    }

    #[test]
    fn test_defaults_and_overrides() {
        let harness = Harness::parse_from(["sous", "--voice", "alloy", "--session-idle-minutes", "5"]);
        let config = harness.config;

        assert_eq!(config.voice, "alloy");
        assert_eq!(config.session_idle(), Duration::from_secs(300));
        assert_eq!(config.max_concurrent_commands, 8);
        assert_eq!(config.http_timeout(), Duration::from_secs(10));
        assert_eq!(config.recipe_base_url, "https://www.themealdb.com/api/json/v1/1");
    }
}
