//! Video search results.

use serde::{Deserialize, Serialize};

/// One entry of a video search, numbered by its position in that search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    /// 1-based position in the search that produced it.
    pub result_number: usize,
    pub title: String,
    pub video_id: String,
    pub thumbnail: String,
    /// Direct results-page link, only set on degraded results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_url: Option<String>,
}

/// Outcome of a video search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSearch {
    pub videos: Vec<Video>,
    /// True when the directory could not search and returned a direct link instead.
    #[serde(default)]
    pub fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_url: Option<String>,
}

impl VideoSearch {
    /// Build a result list, numbering entries from 1 in the given order.
    pub fn numbered(entries: impl IntoIterator<Item = (String, String, String)>) -> Self {
        let videos = entries
            .into_iter()
            .enumerate()
            .map(|(i, (title, video_id, thumbnail))| Video {
                result_number: i + 1,
                title,
                video_id,
                thumbnail,
                search_url: None,
            })
            .collect();
        Self {
            videos,
            fallback: false,
            search_url: None,
        }
    }
}
