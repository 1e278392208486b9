use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// The media kinds held in the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Album,
    Film,
    Book,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Album => "album",
            MediaKind::Film => "film",
            MediaKind::Book => "book",
        }
    }

    pub fn parse(value: &str) -> Option<MediaKind> {
        match value {
            "album" => Some(MediaKind::Album),
            "film" => Some(MediaKind::Film),
            "book" => Some(MediaKind::Book),
            _ => None,
        }
    }
}

/// How a streaming source offers a film. Providers report more kinds than
/// these (rental, purchase, ads); everything beyond subscription and free
/// collapses to [SourceKind::Other] and is filtered out before persisting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Sub,
    Free,
    #[default]
    Other,
}

impl<'de> Deserialize<'de> for SourceKind {
    fn deserialize<D>(deserializer: D) -> Result<SourceKind, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(match value.as_str() {
            "sub" => SourceKind::Sub,
            "free" => SourceKind::Free,
            _ => SourceKind::Other,
        })
    }
}

/// One place a film can be watched. Provider-fed sources carry a numeric id;
/// hand-entered ones often only have a name, which is why source identity is
/// checked by id or name fragment everywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamingSource {
    #[serde(default, alias = "sourceId")]
    pub source_id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: SourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
}

/// Typed read view over a film document. Only the fields the sync jobs work
/// with are materialized; the rest of the document travels untouched in
/// [MediaItem::data].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilmRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub streaming_sources: Vec<StreamingSource>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub manual_streaming_sources: Vec<StreamingSource>,
    #[serde(default)]
    pub in_library: bool,
    #[serde(default)]
    pub sources_last_synced: Option<DateTime<Utc>>,
}

/// The fields a sync job may change on a film. Everything left as None is
/// untouched in the stored document.
#[derive(Debug, Default)]
pub struct FilmPatch {
    pub streaming_sources: Option<Vec<StreamingSource>>,
    pub manual_streaming_sources: Option<Vec<StreamingSource>>,
    pub sources_last_synced: Option<DateTime<Utc>>,
    pub imdb_id: Option<String>,
    pub external_url: Option<String>,
}

impl FilmPatch {
    /// Merges the patch into a film's JSON document, leaving every other
    /// field as it was.
    pub fn apply_to(&self, data: &mut serde_json::Value) -> Result<()> {
        let document = data
            .as_object_mut()
            .ok_or_else(|| anyhow!("film record does not hold a JSON object"))?;

        if let Some(sources) = &self.streaming_sources {
            document.insert("streaming_sources".to_string(), serde_json::to_value(sources)?);
        }
        if let Some(sources) = &self.manual_streaming_sources {
            document.insert(
                "manual_streaming_sources".to_string(),
                serde_json::to_value(sources)?,
            );
        }
        if let Some(synced) = &self.sources_last_synced {
            document.insert(
                "sources_last_synced".to_string(),
                serde_json::Value::String(synced.to_rfc3339()),
            );
        }
        if let Some(imdb_id) = &self.imdb_id {
            document.insert("imdb_id".to_string(), serde_json::Value::String(imdb_id.clone()));
        }
        if let Some(url) = &self.external_url {
            document.insert("external_url".to_string(), serde_json::Value::String(url.clone()));
        }
        Ok(())
    }
}

/// A library entry: the raw JSON document plus the two fields every item
/// must have.
#[derive(Debug, Clone, Serialize)]
pub struct MediaItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub data: serde_json::Value,
}

impl MediaItem {
    /// Validates a client-supplied document into an item. Requires a
    /// non-empty string `id` and a known `type`.
    pub fn from_value(data: serde_json::Value) -> Result<MediaItem> {
        let id = data
            .get("id")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("media item is missing an id"))?
            .to_string();
        let kind_str = data
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("media item is missing a type"))?;
        let kind = MediaKind::parse(kind_str)
            .ok_or_else(|| anyhow!("unknown media type: {kind_str}"))?;
        Ok(MediaItem { id, kind, data })
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let value = Option::<T>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn film_record_parses_a_full_document() {
        let document = json!({
            "id": "watchmode:film:1295263",
            "type": "film",
            "title": "Nights of Cabiria",
            "year": 1957,
            "external_id": "1295263",
            "imdb_id": "tt0050783",
            "runtime": 110,
            "awards": "Won 1 Oscar",
            "streaming_sources": [
                {"source_id": 26, "name": "Prime Video", "type": "sub", "web_url": "https://example.com"}
            ],
            "manual_streaming_sources": [
                {"name": "Criterion Channel", "type": "sub"}
            ],
            "in_library": true,
            "sources_last_synced": "2026-01-15T10:00:00Z"
        });

        let film: FilmRecord = serde_json::from_value(document).unwrap();
        assert_eq!(film.title, "Nights of Cabiria");
        assert_eq!(film.year, Some(1957));
        assert_eq!(film.external_id.as_deref(), Some("1295263"));
        assert_eq!(film.streaming_sources.len(), 1);
        assert_eq!(film.streaming_sources[0].source_id, Some(26));
        assert_eq!(film.streaming_sources[0].kind, SourceKind::Sub);
        assert_eq!(film.manual_streaming_sources[0].source_id, None);
        assert!(film.in_library);
        assert!(film.sources_last_synced.is_some());
    }

    #[test]
    fn film_record_tolerates_sparse_documents() {
        let film: FilmRecord = serde_json::from_value(json!({
            "id": "watchmode:film:1",
            "type": "film",
            "title": "Sparse",
            "streaming_sources": null
        }))
        .unwrap();
        assert_eq!(film.year, None);
        assert!(film.streaming_sources.is_empty());
        assert!(film.manual_streaming_sources.is_empty());
        assert!(!film.in_library);
    }

    #[test]
    fn unknown_source_kinds_collapse_to_other() {
        let source: StreamingSource =
            serde_json::from_value(json!({"source_id": 349, "name": "iTunes", "type": "rent"}))
                .unwrap();
        assert_eq!(source.kind, SourceKind::Other);
    }

    #[test]
    fn source_id_alias_is_accepted() {
        let source: StreamingSource =
            serde_json::from_value(json!({"sourceId": 203, "name": "Criterion Channel", "type": "sub"}))
                .unwrap();
        assert_eq!(source.source_id, Some(203));
    }

    #[test]
    fn patch_preserves_unrelated_fields() {
        let mut document = json!({
            "id": "watchmode:film:1",
            "type": "film",
            "title": "Some Film",
            "awards": "Won 1 BAFTA",
            "metascore": 88
        });

        let patch = FilmPatch {
            imdb_id: Some("tt0000001".to_string()),
            external_url: Some("https://www.imdb.com/title/tt0000001".to_string()),
            ..Default::default()
        };
        patch.apply_to(&mut document).unwrap();

        assert_eq!(document["imdb_id"], "tt0000001");
        assert_eq!(document["awards"], "Won 1 BAFTA");
        assert_eq!(document["metascore"], 88);
        assert_eq!(document["title"], "Some Film");
    }

    #[test]
    fn media_item_serializes_with_its_kind() {
        let item = MediaItem::from_value(json!({"id": "b1", "type": "book", "title": "X"})).unwrap();
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["type"], "book");
        assert_eq!(value["data"]["title"], "X");
    }

    #[test]
    fn media_item_validation_rejects_bad_documents() {
        assert!(MediaItem::from_value(json!({"type": "film"})).is_err());
        assert!(MediaItem::from_value(json!({"id": "x"})).is_err());
        assert!(MediaItem::from_value(json!({"id": "x", "type": "podcast"})).is_err());
        assert!(MediaItem::from_value(json!({"id": "", "type": "film"})).is_err());

        let item = MediaItem::from_value(json!({"id": "b1", "type": "book"})).unwrap();
        assert_eq!(item.kind, MediaKind::Book);
    }
}
