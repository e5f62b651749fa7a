use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Media kind reported by the bookmark service.
///
/// Unknown kinds deserialize to [`RaindropType::Other`] rather than failing
/// the whole item list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RaindropType {
    Link,
    Article,
    Video,
    #[serde(other)]
    Other,
}

impl Default for RaindropType {
    fn default() -> Self {
        RaindropType::Link
    }
}

/// One bookmark as fetched from the service.
///
/// Only the fields the pipeline consumes; everything else in the wire payload
/// is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Raindrop {
    /// The service sends numeric ids; we hold them as opaque strings.
    #[serde(rename = "_id", deserialize_with = "id_from_number_or_string")]
    pub id: String,
    pub link: String,
    #[serde(rename = "type", default)]
    pub kind: RaindropType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created: DateTime<Utc>,
    #[serde(rename = "lastUpdate", default)]
    pub last_update: Option<DateTime<Utc>>,
}

fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Num(i64),
        Str(String),
    }

    Ok(match IdRepr::deserialize(deserializer)? {
        IdRepr::Num(n) => n.to_string(),
        IdRepr::Str(s) => s,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_numeric_id_and_wire_field_names() {
        let raindrop: Raindrop = serde_json::from_value(serde_json::json!({
            "_id": 9001,
            "link": "https://example.com/post",
            "type": "article",
            "title": "A Post",
            "excerpt": "short teaser",
            "tags": ["rust"],
            "created": "2025-11-02T10:00:00Z",
            "lastUpdate": "2025-11-03T08:30:00Z"
        }))
        .expect("deserialize raindrop");

        assert_eq!(raindrop.id, "9001");
        assert_eq!(raindrop.kind, RaindropType::Article);
        assert_eq!(raindrop.excerpt.as_deref(), Some("short teaser"));
        assert!(raindrop.last_update.is_some());
    }

    #[test]
    fn unknown_type_maps_to_other() {
        let raindrop: Raindrop = serde_json::from_value(serde_json::json!({
            "_id": 1,
            "link": "https://example.com",
            "type": "audio",
            "created": "2025-11-02T10:00:00Z"
        }))
        .expect("deserialize raindrop");

        assert_eq!(raindrop.kind, RaindropType::Other);
    }

    #[test]
    fn missing_optional_fields_default() {
        let raindrop: Raindrop = serde_json::from_value(serde_json::json!({
            "_id": "abc",
            "link": "https://example.com",
            "created": "2025-11-02T10:00:00Z"
        }))
        .expect("deserialize raindrop");

        assert_eq!(raindrop.id, "abc");
        assert_eq!(raindrop.kind, RaindropType::Link);
        assert!(raindrop.tags.is_empty());
        assert!(raindrop.note.is_none());
    }
}
