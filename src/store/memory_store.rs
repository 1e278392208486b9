use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{FilmPatch, FilmRecord, MediaItem, MediaKind, MediaStore};

/// In-memory [MediaStore] used by the job tests, where spinning up a
/// database file per case would only slow things down. The refresh-queue
/// ordering matches the sqlite store; plain listings come back in id order.
#[derive(Default)]
pub struct MemoryMediaStore {
    items: Mutex<BTreeMap<String, MediaItem>>,
}

impl MemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn films(&self) -> Vec<FilmRecord> {
        let items = self.items.lock().unwrap();
        items
            .values()
            .filter(|item| item.kind == MediaKind::Film)
            .filter_map(|item| {
                let mut film: FilmRecord =
                    serde_json::from_value(item.data.clone()).ok()?;
                film.id = item.id.clone();
                Some(film)
            })
            .collect()
    }
}

impl MediaStore for MemoryMediaStore {
    fn list_items(&self) -> Result<Vec<MediaItem>> {
        let items = self.items.lock().unwrap();
        Ok(items.values().cloned().collect())
    }

    fn get_item(&self, id: &str) -> Result<Option<MediaItem>> {
        let items = self.items.lock().unwrap();
        Ok(items.get(id).cloned())
    }

    fn upsert_item(&self, item: &MediaItem) -> Result<()> {
        let mut items = self.items.lock().unwrap();
        items.insert(item.id.clone(), item.clone());
        Ok(())
    }

    fn delete_item(&self, id: &str) -> Result<bool> {
        let mut items = self.items.lock().unwrap();
        Ok(items.remove(id).is_some())
    }

    fn list_films(&self) -> Result<Vec<FilmRecord>> {
        Ok(self.films())
    }

    fn films_needing_source_refresh(&self, limit: usize) -> Result<Vec<FilmRecord>> {
        let mut films: Vec<FilmRecord> = self
            .films()
            .into_iter()
            .filter(|film| film.external_id.is_some())
            .collect();
        films.sort_by(|a, b| match (&a.sources_last_synced, &b.sources_last_synced) {
            (None, None) => a.id.cmp(&b.id),
            (None, Some(_)) => std::cmp::Ordering::Less,
            (Some(_), None) => std::cmp::Ordering::Greater,
            (Some(x), Some(y)) => x.cmp(y).then_with(|| a.id.cmp(&b.id)),
        });
        films.truncate(limit);
        Ok(films)
    }

    fn films_missing_imdb_id(&self, limit: usize) -> Result<Vec<FilmRecord>> {
        let mut films: Vec<FilmRecord> = self
            .films()
            .into_iter()
            .filter(|film| film.imdb_id.is_none() && film.external_id.is_some())
            .collect();
        films.truncate(limit);
        Ok(films)
    }

    fn update_film(&self, id: &str, patch: &FilmPatch) -> Result<()> {
        let mut items = self.items.lock().unwrap();
        let item = items
            .get_mut(id)
            .filter(|item| item.kind == MediaKind::Film)
            .with_context(|| format!("No film record with id {}", id))?;
        patch.apply_to(&mut item.data)
    }
}
