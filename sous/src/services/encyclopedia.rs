//! Wikipedia page summaries.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use super::{trim_base, Encyclopedia};
use crate::error::{ServiceError, ServiceResult};

const SERVICE: &str = "encyclopedia";
const SUMMARY_SENTENCES: usize = 2;

#[derive(Debug, Deserialize)]
struct PageSummary {
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    extract: String,
}

pub struct Wikipedia {
    client: reqwest::Client,
    base_url: String,
}

impl Wikipedia {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
        }
    }
}

/// The first `count` sentences of `text`.
fn first_sentences(text: &str, count: usize) -> String {
    let mut end = text.len();
    let mut seen = 0;
    for (i, _) in text.match_indices(". ") {
        seen += 1;
        if seen == count {
            end = i + 1;
            break;
        }
    }
    text[..end].trim().to_string()
}

#[async_trait]
impl Encyclopedia for Wikipedia {
    async fn summary(&self, query: &str) -> ServiceResult<Option<String>> {
        let title = query.trim().replace(' ', "_");
        if title.is_empty() {
            return Ok(None);
        }

        let response = self
            .client
            .get(format!(
                "{}/page/summary/{}",
                self.base_url,
                urlencoding::encode(&title)
            ))
            .send()
            .await
            .map_err(ServiceError::http(SERVICE))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = ServiceError::check(SERVICE, response).await?;
        let page: PageSummary = response.json().await.map_err(ServiceError::http(SERVICE))?;

        if page.kind == "disambiguation" || page.extract.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(first_sentences(&page.extract, SUMMARY_SENTENCES)))
    }
}
