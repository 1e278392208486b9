use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use super::{FilmPatch, FilmRecord, MediaItem, MediaKind, MediaStore};

// Offset on top of PRAGMA user_version so an unrelated sqlite file (which
// reports version 0) is rejected instead of being mistaken for an old
// library database.
const BASE_DB_VERSION: i64 = 31000;
const SCHEMA_VERSION: i64 = 1;

// One row per library item. The document in `data` is authoritative; the
// other columns are materialized from it at write time so the job queries
// can filter and order without parsing JSON.
const SCHEMA_V1: &str = "
CREATE TABLE medialist (
    id TEXT PRIMARY KEY,
    kind TEXT NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    year INTEGER,
    external_id TEXT,
    imdb_id TEXT,
    sources_last_synced TEXT,
    data TEXT NOT NULL
);
CREATE INDEX idx_medialist_kind ON medialist (kind);
CREATE INDEX idx_medialist_refresh ON medialist (kind, sources_last_synced);
";

pub struct SqliteMediaStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteMediaStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref();
        let is_new_db = !path.exists();

        let conn = Connection::open(path).context("Failed to open media database")?;

        if is_new_db {
            info!("Creating new media database at {:?}", path);
            conn.execute_batch(SCHEMA_V1)
                .context("Failed to create media database schema")?;
            conn.execute(
                &format!("PRAGMA user_version = {}", BASE_DB_VERSION + SCHEMA_VERSION),
                [],
            )?;
        } else {
            let raw_version: i64 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
            let db_version = raw_version - BASE_DB_VERSION;
            if db_version < 1 || db_version > SCHEMA_VERSION {
                bail!(
                    "Media database version {} is not supported (expected 1..={})",
                    db_version,
                    SCHEMA_VERSION
                );
            }
            conn.prepare(
                "SELECT id, kind, title, year, external_id, imdb_id, sources_last_synced, data
                 FROM medialist LIMIT 1",
            )
            .context("Media database schema validation failed")?;
        }

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<MediaItem> {
        let kind_str: String = row.get("kind")?;
        let data_str: String = row.get("data")?;
        Ok(MediaItem {
            id: row.get("id")?,
            kind: MediaKind::parse(&kind_str).unwrap_or(MediaKind::Film),
            data: serde_json::from_str(&data_str).unwrap_or(serde_json::Value::Null),
        })
    }

    fn write_item(conn: &Connection, item: &MediaItem) -> Result<()> {
        let data = serde_json::to_string(&item.data)?;
        let title = item.data.get("title").and_then(|v| v.as_str()).unwrap_or("");
        let year = item.data.get("year").and_then(|v| v.as_i64());
        let external_id = item.data.get("external_id").and_then(|v| v.as_str());
        let imdb_id = item.data.get("imdb_id").and_then(|v| v.as_str());
        let sources_last_synced = item
            .data
            .get("sources_last_synced")
            .and_then(|v| v.as_str());

        conn.execute(
            "INSERT INTO medialist (id, kind, title, year, external_id, imdb_id, sources_last_synced, data)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                 kind = excluded.kind,
                 title = excluded.title,
                 year = excluded.year,
                 external_id = excluded.external_id,
                 imdb_id = excluded.imdb_id,
                 sources_last_synced = excluded.sources_last_synced,
                 data = excluded.data",
            params![
                item.id,
                item.kind.as_str(),
                title,
                year,
                external_id,
                imdb_id,
                sources_last_synced,
                data
            ],
        )?;
        Ok(())
    }

    /// Runs a film query returning (id, data) rows and parses each document,
    /// skipping rows whose data no longer parses rather than failing the
    /// whole listing.
    fn query_films(
        conn: &Connection,
        sql: &str,
        query_params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<FilmRecord>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(query_params, |row| {
            let id: String = row.get("id")?;
            let data: String = row.get("data")?;
            Ok((id, data))
        })?;

        let mut films = Vec::new();
        for row in rows {
            let (id, data) = row?;
            match serde_json::from_str::<FilmRecord>(&data) {
                Ok(mut film) => {
                    // The row key is authoritative over whatever the
                    // document says.
                    film.id = id;
                    films.push(film);
                }
                Err(err) => {
                    warn!("Skipping film record {} with unreadable data: {}", id, err);
                }
            }
        }
        Ok(films)
    }
}

impl MediaStore for SqliteMediaStore {
    fn list_items(&self) -> Result<Vec<MediaItem>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, kind, data FROM medialist
             ORDER BY (year IS NULL) DESC, year DESC, id",
        )?;
        let rows = stmt.query_map([], Self::row_to_item)?;
        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    fn get_item(&self, id: &str) -> Result<Option<MediaItem>> {
        let conn = self.conn.lock().unwrap();
        let item = conn
            .query_row(
                "SELECT id, kind, data FROM medialist WHERE id = ?1",
                params![id],
                Self::row_to_item,
            )
            .optional()?;
        Ok(item)
    }

    fn upsert_item(&self, item: &MediaItem) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        Self::write_item(&conn, item)
    }

    fn delete_item(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM medialist WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    fn list_films(&self) -> Result<Vec<FilmRecord>> {
        let conn = self.conn.lock().unwrap();
        Self::query_films(
            &conn,
            "SELECT id, data FROM medialist WHERE kind = 'film' ORDER BY id",
            &[],
        )
    }

    fn films_needing_source_refresh(&self, limit: usize) -> Result<Vec<FilmRecord>> {
        let conn = self.conn.lock().unwrap();
        Self::query_films(
            &conn,
            "SELECT id, data FROM medialist
             WHERE kind = 'film' AND external_id IS NOT NULL
             ORDER BY (sources_last_synced IS NULL) DESC, sources_last_synced ASC, id
             LIMIT ?1",
            &[&(limit as i64)],
        )
    }

    fn films_missing_imdb_id(&self, limit: usize) -> Result<Vec<FilmRecord>> {
        let conn = self.conn.lock().unwrap();
        Self::query_films(
            &conn,
            "SELECT id, data FROM medialist
             WHERE kind = 'film' AND imdb_id IS NULL AND external_id IS NOT NULL
             ORDER BY id
             LIMIT ?1",
            &[&(limit as i64)],
        )
    }

    fn update_film(&self, id: &str, patch: &FilmPatch) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let data_str: Option<String> = conn
            .query_row(
                "SELECT data FROM medialist WHERE id = ?1 AND kind = 'film'",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        let data_str = data_str.with_context(|| format!("No film record with id {}", id))?;

        let mut data: serde_json::Value = serde_json::from_str(&data_str)
            .with_context(|| format!("Film record {} holds unreadable data", id))?;
        patch
            .apply_to(&mut data)
            .with_context(|| format!("Failed to patch film record {}", id))?;

        let item = MediaItem {
            id: id.to_string(),
            kind: MediaKind::Film,
            data,
        };
        Self::write_item(&conn, &item)
    }
}
