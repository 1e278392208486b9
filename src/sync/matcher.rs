use std::collections::HashMap;

use super::{normalize_title, CatalogEntry};
use crate::store::FilmRecord;

/// A catalog entry paired with the library record it resolved to.
#[derive(Debug)]
pub struct FilmMatch<'a> {
    pub entry: &'a CatalogEntry,
    pub record: &'a FilmRecord,
}

#[derive(Debug)]
pub struct MatchOutcome<'a> {
    pub matches: Vec<FilmMatch<'a>>,
    pub unmatched: Vec<&'a CatalogEntry>,
}

/// Resolves scraped catalog entries against the film library.
///
/// Records are bucketed by normalized title, then each entry is matched
/// against its bucket on strict year equality, where two absent years also
/// count as equal. When an entry carries no year and strict matching finds
/// nothing, the entry still matches if its bucket holds exactly one record;
/// with two or more same-title records the entry stays unmatched rather than
/// guessing between editions.
pub fn match_films<'a>(
    entries: &'a [CatalogEntry],
    records: &'a [FilmRecord],
) -> MatchOutcome<'a> {
    let mut by_title: HashMap<String, Vec<&FilmRecord>> = HashMap::new();
    for record in records {
        by_title
            .entry(normalize_title(&record.title))
            .or_default()
            .push(record);
    }

    let mut matches = Vec::new();
    let mut unmatched = Vec::new();
    for entry in entries {
        let candidates = by_title
            .get(&normalize_title(&entry.title))
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let mut resolved = candidates
            .iter()
            .find(|record| record.year == entry.year)
            .copied();
        if resolved.is_none() && entry.year.is_none() && candidates.len() == 1 {
            resolved = Some(candidates[0]);
        }

        match resolved {
            Some(record) => matches.push(FilmMatch { entry, record }),
            None => unmatched.push(entry),
        }
    }
    MatchOutcome { matches, unmatched }
}
