//! YouTube Data API search, degrading to a plain search link.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use super::{trim_base, VideoDirectory};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{Video, VideoSearch};

const SERVICE: &str = "videos";
const MAX_RESULTS: usize = 3;
const REDIRECT_ID: &str = "search_redirect";
const LOGO: &str =
    "https://upload.wikimedia.org/wikipedia/commons/thumb/b/b8/YouTube_Logo_2017.svg/1280px-YouTube_Logo_2017.svg.png";

/// Terms that already make a query recipe-focused.
const RECIPE_TERMS: [&str; 4] = ["recipe", "cooking", "how to make", "how to cook"];

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    id: ItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemId {
    #[serde(default)]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    #[serde(default)]
    high: Option<Thumbnail>,
    #[serde(default)]
    medium: Option<Thumbnail>,
    #[serde(default)]
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

/// `query`, with " recipe" appended unless it already reads like one.
pub fn recipe_query(query: &str) -> String {
    let lower = query.to_lowercase();
    if RECIPE_TERMS.iter().any(|term| lower.contains(term)) {
        query.to_string()
    } else {
        format!("{query} recipe")
    }
}

pub struct YoutubeSearch {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl YoutubeSearch {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
            api_key,
        }
    }

    async fn api_search(&self, query: &str, api_key: &str) -> ServiceResult<Vec<Video>> {
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("maxResults", "3"),
                ("q", query),
                ("key", api_key),
            ])
            .send()
            .await
            .map_err(ServiceError::http(SERVICE))?;
        let response = ServiceError::check(SERVICE, response).await?;
        let parsed: SearchResponse = response.json().await.map_err(ServiceError::http(SERVICE))?;

        let entries = parsed.items.into_iter().filter_map(|item| {
            let video_id = item.id.video_id.filter(|id| !id.is_empty())?;
            let thumbs = item.snippet.thumbnails;
            let thumbnail = thumbs
                .high
                .or(thumbs.medium)
                .or(thumbs.default)
                .map(|t| t.url)
                .unwrap_or_default();
            let title = Some(item.snippet.title)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Unknown Title".to_string());
            Some((title, video_id, thumbnail))
        });
        Ok(VideoSearch::numbered(entries.take(MAX_RESULTS)).videos)
    }
}

/// A single result linking to YouTube's own search page.
fn redirect(query: &str) -> VideoSearch {
    let search_url = format!(
        "https://www.youtube.com/results?search_query={}",
        urlencoding::encode(query)
    );
    VideoSearch {
        videos: vec![Video {
            result_number: 1,
            title: format!("Search YouTube for: {query}"),
            video_id: REDIRECT_ID.to_string(),
            thumbnail: LOGO.to_string(),
            search_url: Some(search_url.clone()),
        }],
        fallback: true,
        search_url: Some(search_url),
    }
}

#[async_trait]
impl VideoDirectory for YoutubeSearch {
    async fn search(&self, query: &str) -> ServiceResult<VideoSearch> {
        let query = recipe_query(query);

        let Some(api_key) = self.api_key.as_deref() else {
            info!(%query, "no video API key, returning search link");
            return Ok(redirect(&query));
        };

        match self.api_search(&query, api_key).await {
            Ok(videos) if !videos.is_empty() => {
                info!(%query, found = videos.len(), "video search");
                Ok(VideoSearch {
                    videos,
                    fallback: false,
                    search_url: None,
                })
            }
            Ok(_) => {
                info!(%query, "no videos found, returning search link");
                Ok(redirect(&query))
            }
            Err(e) => {
                warn!(%query, error = %e, "video search failed, returning search link");
                Ok(redirect(&query))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_recipe_query() {
        assert_eq!(recipe_query("lasagna"), "lasagna recipe");
        assert_eq!(recipe_query("Lasagna Recipe"), "Lasagna Recipe");
        assert_eq!(recipe_query("how to cook rice"), "how to cook rice");
    }

    #[tokio::test]
    async fn test_api_results_are_numbered() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "pancakes recipe"))
            .and(query_param("key", "k"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"id": {"videoId": "a1"}, "snippet": {"title": "Fluffy", "thumbnails": {"high": {"url": "h"}}}},
                    {"id": {"kind": "youtube#channel"}, "snippet": {"title": "Channel"}},
                    {"id": {"videoId": "b2"}, "snippet": {"title": "", "thumbnails": {"default": {"url": "d"}}}}
                ]
            })))
            .mount(&server)
            .await;

        let search = YoutubeSearch::new(reqwest::Client::new(), &server.uri(), Some("k".into()));
        let result = search.search("pancakes").await.unwrap();

        assert!(!result.fallback);
        assert_eq!(result.videos.len(), 2);
        assert_eq!(result.videos[0].result_number, 1);
        assert_eq!(result.videos[0].video_id, "a1");
        assert_eq!(result.videos[0].thumbnail, "h");
        assert_eq!(result.videos[1].result_number, 2);
        assert_eq!(result.videos[1].title, "Unknown Title");
    }

    #[tokio::test]
    async fn test_without_key_returns_search_link() {
        let search = YoutubeSearch::new(reqwest::Client::new(), "http://127.0.0.1:9", None);
        let result = search.search("tacos").await.unwrap();

        assert!(result.fallback);
        assert_eq!(result.videos.len(), 1);
        assert_eq!(result.videos[0].video_id, "search_redirect");
        assert_eq!(
            result.search_url.as_deref(),
            Some("https://www.youtube.com/results?search_query=tacos%20recipe")
        );
    }

    #[tokio::test]
    async fn test_api_failure_degrades_to_search_link() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let search = YoutubeSearch::new(reqwest::Client::new(), &server.uri(), Some("k".into()));
        let result = search.search("tacos").await.unwrap();
        assert!(result.fallback);
        assert_eq!(result.videos[0].video_id, "search_redirect");
    }
}
