use crate::store::{FilmRecord, StreamingSource};

/// Checks whether any source in the list refers to the given service, either
/// by exact source id or by a case-insensitive fragment of the service name.
/// The two keys cover both provider-fed sources (which carry ids) and
/// hand-entered ones (which often only have a name).
pub fn has_source(
    sources: &[StreamingSource],
    source_id: Option<i64>,
    name_fragment: &str,
) -> bool {
    let fragment = name_fragment.to_lowercase();
    sources.iter().any(|source| {
        (source_id.is_some() && source.source_id == source_id)
            || source.name.to_lowercase().contains(&fragment)
    })
}

/// Appends a curated source to a record's manual list, unless the manual
/// list already refers to that service. Only the manual list counts for the
/// membership test: provider-fed sources come and go with each refresh, and
/// the curated annotation must not depend on them. Returns the new manual
/// list to persist, or None when the record should be skipped.
pub fn add_manual_source(
    record: &FilmRecord,
    source: &StreamingSource,
    name_fragment: &str,
) -> Option<Vec<StreamingSource>> {
    if has_source(&record.manual_streaming_sources, source.source_id, name_fragment) {
        return None;
    }
    let mut updated = record.manual_streaming_sources.clone();
    updated.push(source.clone());
    Some(updated)
}

/// Drops every manual source referring to the given service, matched by the
/// same two keys as [has_source]. Provider-fed sources are left alone, they
/// are owned by the refresh cycle. Returns the pruned manual list, or None
/// when nothing referred to the service.
pub fn remove_manual_source(
    record: &FilmRecord,
    source_id: i64,
    name_fragment: &str,
) -> Option<Vec<StreamingSource>> {
    let fragment = name_fragment.to_lowercase();
    let remaining: Vec<StreamingSource> = record
        .manual_streaming_sources
        .iter()
        .filter(|source| {
            source.source_id != Some(source_id)
                && !source.name.to_lowercase().contains(&fragment)
        })
        .cloned()
        .collect();
    if remaining.len() == record.manual_streaming_sources.len() {
        None
    } else {
        Some(remaining)
    }
}

/// Compares a record's provider-fed sources with a fresh provider response.
/// The lists count as unchanged when they have the same length and the same
/// multiset of source ids; name or url edits alone do not trigger an update.
pub fn provider_sources_changed(
    current: &[StreamingSource],
    refreshed: &[StreamingSource],
) -> bool {
    if current.len() != refreshed.len() {
        return true;
    }
    let mut current_ids: Vec<Option<i64>> = current.iter().map(|s| s.source_id).collect();
    let mut refreshed_ids: Vec<Option<i64>> = refreshed.iter().map(|s| s.source_id).collect();
    current_ids.sort_unstable();
    refreshed_ids.sort_unstable();
    current_ids != refreshed_ids
}
