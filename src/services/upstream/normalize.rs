//! Card & Quality Normalization
//!
//! Projects raw upstream catalog objects into the canonical [`DramaCard`]
//! schema and resolves the playback quality for a single title. Both
//! functions are pure over abstract JSON values.

use serde_json::Value;

use crate::models::{CdnEntry, DramaCard, QualityOption, QualitySelection};

/// Standard-definition rendition preferred when the upstream flags no default
const STANDARD_QUALITY: i64 = 720;

/// Project a raw catalog object into a canonical card.
///
/// Returns `None` when `raw` is not an object; such entries are filtered
/// out of listings rather than padded with defaults. Scalar fields pass
/// through as-is and absent fields default to empty/zero; array fields
/// that fail to deserialize degrade to empty.
pub fn normalize_card(raw: &Value) -> Option<DramaCard> {
    let obj = raw.as_object()?;

    let string_field = |key: &str| -> String {
        obj.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    Some(DramaCard {
        book_id: string_field("bookId"),
        book_name: string_field("bookName"),
        book_cover: string_field("bookCover"),
        introduction: string_field("introduction"),
        play_count: obj.get("playCount").cloned().unwrap_or(Value::Null),
        tags: obj
            .get("tags")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default(),
        total_chapter_num: obj
            .get("totalChapterNum")
            .and_then(Value::as_i64)
            .unwrap_or(0),
        chapter_img: string_field("chapterImg"),
        cdn_list: obj
            .get("cdnList")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default(),
        video_path: string_field("videoPath"),
    })
}

/// Resolve the rendition list and starting rendition for a title.
///
/// CDN pick: the entry flagged `is_default == 1`, else the first. Rendition
/// pick within it: explicit default flag, else the 720 rendition, else the
/// first, else none. The order is a compatibility contract with the player.
pub fn pick_default_quality(cdn_list: &[CdnEntry]) -> QualitySelection {
    let Some(first) = cdn_list.first() else {
        return QualitySelection::default();
    };

    let cdn = cdn_list
        .iter()
        .find(|c| c.is_default == 1)
        .unwrap_or(first);
    let list = &cdn.video_path_list;

    let default = list
        .iter()
        .find(|v| v.is_default == 1)
        .or_else(|| list.iter().find(|v| v.quality == STANDARD_QUALITY))
        .or_else(|| list.first())
        .cloned();

    QualitySelection {
        qualities: list.clone(),
        default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn option(quality: i64, is_default: i64) -> QualityOption {
        QualityOption {
            quality,
            is_default,
            is_vip_equity: false,
            video_path: format!("https://cdn.example.com/{quality}.m3u8"),
        }
    }

    #[test]
    fn test_non_object_yields_no_card() {
        assert_eq!(normalize_card(&Value::Null), None);
        assert_eq!(normalize_card(&json!(42)), None);
        assert_eq!(normalize_card(&json!("bookId")), None);
        assert_eq!(normalize_card(&json!([{"bookId": "x"}])), None);
    }

    #[test]
    fn test_sparse_object_defaults_to_empty() {
        let card = normalize_card(&json!({"bookId": "x"})).unwrap();
        assert_eq!(card.book_id, "x");
        assert_eq!(card.book_name, "");
        assert!(card.tags.is_empty());
        assert!(card.cdn_list.is_empty());
        assert_eq!(card.total_chapter_num, 0);
        assert_eq!(card.play_count, Value::Null);
    }

    #[test]
    fn test_play_count_passes_through_either_type() {
        let as_string = normalize_card(&json!({"playCount": "1.2M"})).unwrap();
        assert_eq!(as_string.play_count, json!("1.2M"));

        let as_number = normalize_card(&json!({"playCount": 1200000})).unwrap();
        assert_eq!(as_number.play_count, json!(1200000));
    }

    #[test]
    fn test_full_projection() {
        let raw = json!({
            "bookId": "41000112973",
            "bookName": "Moonlit Contract",
            "bookCover": "https://img.example.com/cover.jpg",
            "introduction": "A deal signed at midnight.",
            "playCount": "5.4M",
            "tags": ["Romance", "CEO"],
            "totalChapterNum": 72,
            "chapterImg": "https://img.example.com/ch1.jpg",
            "videoPath": "https://cdn.example.com/72.m3u8",
            "cdnList": [
                {"isDefault": 1, "videoPathList": [
                    {"quality": 720, "isDefault": 1, "isVipEquity": false,
                     "videoPath": "https://cdn.example.com/720.m3u8"}
                ]}
            ],
            "ignoredExtraField": true
        });

        let card = normalize_card(&raw).unwrap();
        assert_eq!(card.book_name, "Moonlit Contract");
        assert_eq!(card.tags, vec!["Romance", "CEO"]);
        assert_eq!(card.total_chapter_num, 72);
        assert_eq!(card.cdn_list.len(), 1);
        assert_eq!(card.cdn_list[0].video_path_list[0].quality, 720);
    }

    #[test]
    fn test_malformed_array_degrades_to_empty() {
        let card = normalize_card(&json!({"tags": "Romance", "cdnList": 7})).unwrap();
        assert!(card.tags.is_empty());
        assert!(card.cdn_list.is_empty());
    }

    #[test]
    fn test_empty_cdn_list_selects_nothing() {
        let selection = pick_default_quality(&[]);
        assert!(selection.qualities.is_empty());
        assert!(selection.default.is_none());
    }

    #[test]
    fn test_explicit_default_flag_wins() {
        let cdn = CdnEntry {
            is_default: 1,
            video_path_list: vec![option(480, 0), option(1080, 1), option(720, 0)],
        };
        let selection = pick_default_quality(&[cdn]);
        assert_eq!(selection.default.unwrap().quality, 1080);
    }

    #[test]
    fn test_falls_to_720_without_flag() {
        let cdn = CdnEntry {
            is_default: 0,
            video_path_list: vec![option(480, 0), option(720, 0), option(1080, 0)],
        };
        let selection = pick_default_quality(&[cdn]);
        // 1080 appears later but 720 is the canonical standard rendition
        assert_eq!(selection.default.unwrap().quality, 720);
        assert_eq!(selection.qualities.len(), 3);
    }

    #[test]
    fn test_falls_to_first_without_720() {
        let cdn = CdnEntry {
            is_default: 0,
            video_path_list: vec![option(540, 0), option(1080, 0)],
        };
        let selection = pick_default_quality(&[cdn]);
        assert_eq!(selection.default.unwrap().quality, 540);
    }

    #[test]
    fn test_flagged_cdn_preferred_over_first() {
        let mirrors = vec![
            CdnEntry {
                is_default: 0,
                video_path_list: vec![option(480, 0)],
            },
            CdnEntry {
                is_default: 1,
                video_path_list: vec![option(720, 0)],
            },
        ];
        let selection = pick_default_quality(&mirrors);
        assert_eq!(selection.default.unwrap().quality, 720);
    }

    #[test]
    fn test_empty_rendition_list_selects_none() {
        let cdn = CdnEntry {
            is_default: 1,
            video_path_list: vec![],
        };
        let selection = pick_default_quality(&[cdn]);
        assert!(selection.default.is_none());
    }
}
