use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical drama card projected from a raw upstream catalog object.
///
/// Fields pass through verbatim from the upstream payload; missing fields
/// default to empty/zero. `play_count` is kept as a raw JSON value because
/// the upstream sends it as a string on some endpoints and a number on
/// others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DramaCard {
    #[serde(default)]
    pub book_id: String,
    #[serde(default)]
    pub book_name: String,
    #[serde(default)]
    pub book_cover: String,
    #[serde(default)]
    pub introduction: String,
    #[serde(default)]
    pub play_count: Value,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub total_chapter_num: i64,
    #[serde(default)]
    pub chapter_img: String,
    #[serde(default)]
    pub cdn_list: Vec<CdnEntry>,
    #[serde(default)]
    pub video_path: String,
}

/// One CDN mirror with its per-resolution playback options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CdnEntry {
    /// 1 marks the mirror the upstream wants players to prefer
    #[serde(default)]
    pub is_default: i64,
    #[serde(default)]
    pub video_path_list: Vec<QualityOption>,
}

/// A single playback rendition (e.g. 540p, 720p, 1080p)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct QualityOption {
    #[serde(default)]
    pub quality: i64,
    #[serde(default)]
    pub is_default: i64,
    #[serde(default)]
    pub is_vip_equity: bool,
    #[serde(default)]
    pub video_path: String,
}

/// Quality decision for a single title: the full rendition list of the
/// chosen CDN plus the rendition playback should start on.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct QualitySelection {
    pub qualities: Vec<QualityOption>,
    pub default: Option<QualityOption>,
}

/// One page's combined result across independent upstream sources,
/// keyed by source name (`vip`, `latest`, `trending`, `foryou`, `search`).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct AggregateFeed {
    pub sections: HashMap<String, Vec<DramaCard>>,
}

impl AggregateFeed {
    /// Cards for a named source; sources that degraded report as empty
    pub fn section(&self, name: &str) -> &[DramaCard] {
        self.sections.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}
