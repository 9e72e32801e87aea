//! List-query parsing and pagination metadata.
//!
//! Query values arrive as raw strings so that a non-numeric `page` is a
//! validation failure (422 with a field→message map) rather than a framework
//! deserialization rejection. All failures for one request are collected into
//! a single map before the query is rejected.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Upper bound for `page`.
pub const MAX_PAGE: i64 = 10_000_000;
/// Upper bound for `page_size`.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Sort values a caller may request. A leading `-` flips the direction.
const SORT_SAFELIST: &[&str] = &[
    "id", "title", "year", "runtime", "-id", "-title", "-year", "-runtime",
];

/// Unparsed list query parameters, exactly as they appeared on the URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFilters {
    pub title: Option<String>,
    pub genres: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort: Option<String>,
}

/// Validated list parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    pub title: String,
    pub genres: Vec<String>,
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
}

impl Filters {
    /// Parses and validates `raw`, collecting every failure into a
    /// field→message map.
    pub fn parse(raw: RawFilters) -> Result<Self, BTreeMap<String, String>> {
        let mut errors = BTreeMap::new();

        let page = parse_integer(raw.page, 1, "page", &mut errors);
        let page_size = parse_integer(raw.page_size, 20, "page_size", &mut errors);

        if !errors.contains_key("page") && !(1..=MAX_PAGE).contains(&page) {
            errors.insert(
                "page".to_string(),
                "must be between 1 and 10,000,000".to_string(),
            );
        }
        if !errors.contains_key("page_size") && !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            errors.insert(
                "page_size".to_string(),
                "must be between 1 and 100".to_string(),
            );
        }

        let sort = raw.sort.filter(|s| !s.is_empty()).unwrap_or_else(|| "id".to_string());
        if !SORT_SAFELIST.contains(&sort.as_str()) {
            errors.insert("sort".to_string(), "invalid sort value".to_string());
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let genres = raw
            .genres
            .map(|g| {
                g.split(',')
                    .map(|genre| genre.trim().to_string())
                    .filter(|genre| !genre.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            title: raw.title.unwrap_or_default(),
            genres,
            page,
            page_size,
            sort,
        })
    }

    /// The column to sort by, with the direction prefix stripped. Only ever
    /// one of the safelisted values, so it is safe to interpolate into SQL.
    pub fn sort_column(&self) -> &str {
        self.sort.trim_start_matches('-')
    }

    pub fn sort_direction(&self) -> &str {
        if self.sort.starts_with('-') { "DESC" } else { "ASC" }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

fn parse_integer(
    raw: Option<String>,
    default: i64,
    field: &str,
    errors: &mut BTreeMap<String, String>,
) -> i64 {
    match raw {
        None => default,
        Some(value) if value.is_empty() => default,
        Some(value) => match value.trim().parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                errors.insert(field.to_string(), "must be an integer value".to_string());
                default
            }
        },
    }
}

/// Pagination metadata included alongside list responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub current_page: i64,
    pub page_size: i64,
    pub first_page: i64,
    pub last_page: i64,
    pub total_records: i64,
}

impl Metadata {
    /// Empty input yields the zero value rather than a page range of `1..=0`.
    pub fn calculate(total_records: i64, page: i64, page_size: i64) -> Self {
        if total_records == 0 {
            return Self::default();
        }
        Self {
            current_page: page,
            page_size,
            first_page: 1,
            last_page: (total_records + page_size - 1) / page_size,
            total_records,
        }
    }
}
