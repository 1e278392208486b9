use lazy_static::lazy_static;
use regex::Regex;

use super::SyncError;

lazy_static! {
    // Catalog rows render as markdown table lines:
    // | ![](poster) | [Title](link) | Director | Country | Year |
    static ref CATALOG_ROW: Regex = Regex::new(
        r"^\|\s*!?\[.*?\]\(.*?\)\s*\|\s*\[(.*?)\]\(.*?\)\s*\|\s*(.*?)\s*\|\s*(.*?)\s*\|\s*(.*?)\s*\|\s*$"
    )
    .unwrap();
    static ref CONTRIBUTOR_SEPARATOR: Regex = Regex::new(r"(?i),?\s+and\s+").unwrap();
}

/// One film row parsed out of the scraped catalog page.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub title: String,
    pub year: Option<i32>,
    pub contributor_last_name: String,
}

/// Extracts film entries from the markdown rendering of the catalog page.
///
/// Only table rows shaped like the catalog listing are picked up; headers,
/// separator lines and surrounding prose are ignored. A page that renders to
/// whitespace is reported as [SyncError::EmptyContent] so a broken scrape is
/// never mistaken for an empty catalog, but a page with no matching rows
/// parses to an empty list.
pub fn parse_catalog_rows(markdown: &str) -> Result<Vec<CatalogEntry>, SyncError> {
    if markdown.trim().is_empty() {
        return Err(SyncError::EmptyContent);
    }

    let mut entries = Vec::new();
    for line in markdown.lines() {
        let trimmed = line.trim();
        if !trimmed.starts_with('|') {
            continue;
        }
        let captures = match CATALOG_ROW.captures(trimmed) {
            Some(captures) => captures,
            None => continue,
        };
        entries.push(CatalogEntry {
            title: captures[1].trim().to_string(),
            year: parse_year(captures[4].trim()),
            contributor_last_name: contributor_last_name(captures[2].trim()),
        });
    }
    Ok(entries)
}

/// Keeps the digits of the year cell and parses them as a positive number.
/// Cells like "1948" and "c. 1948" both yield 1948; blank or dash-only cells
/// yield None.
fn parse_year(cell: &str) -> Option<i32> {
    let digits: String = cell.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse::<i32>().ok().filter(|year| *year > 0)
}

/// Reduces a contributor cell to the first credited person's last name.
///
/// Co-credits joined with "and" keep only the first person. "Last, First"
/// ordering is honored, otherwise the final whitespace-separated token is
/// taken. Trailing periods and spaces are dropped.
fn contributor_last_name(cell: &str) -> String {
    if cell.is_empty() {
        return String::new();
    }
    let first = CONTRIBUTOR_SEPARATOR.split(cell).next().unwrap_or(cell).trim();
    let last_name = match first.split_once(',') {
        Some((before_comma, _)) => before_comma.trim(),
        None => first.split_whitespace().last().unwrap_or(""),
    };
    last_name
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace())
        .to_string()
}
