//! Everything that decides *which* posts are being looked at: the filter dimensions, the page
//! cursor, and the single place where both are turned into request parameters.
//!
//! Filter semantics work like the posts service's: if a field is unset, its filter isn't sent, so
//! the server doesn't apply it.
pub mod filters;
pub mod page;
pub mod params;

pub use filters::{ContentType, FilterEdit, FilterError, FilterState, SortKey, SortOrder};
pub use page::{PageSize, PageState};
pub use params::{ParamSet, ParamValue};

use chrono::{offset::Utc, DateTime, NaiveDate, TimeZone};
use serde::Deserialize;

/// A view's starting point, as written in a URL-style query string such as
/// `channel_id=5&content_type=photo&page=2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed {
    pub filters: FilterState,
    pub page: Option<u32>,
    pub page_size: Option<PageSize>,
}

impl Seed {
    /// The cursor this seed asks for, falling back to `default_size`.
    pub fn page_state(&self, default_size: PageSize) -> PageState {
        PageState::resume(
            self.page.unwrap_or(1),
            self.page_size.unwrap_or(default_size),
        )
    }
}

// Everything arrives as text so each field can produce its own FilterError.
#[derive(Debug, Default, Deserialize)]
struct RawSeed {
    channel_id: Option<i64>,
    content_type: Option<String>,
    date_from: Option<String>,
    date_to: Option<String>,
    keywords: Option<String>,
    search: Option<String>,
    sort_by: Option<String>,
    sort_order: Option<String>,
    page: Option<u32>,
    page_size: Option<u32>,
}

/// Parse a query string into a seed. Every field goes through the same edits and validation an
/// operator's interactive change would.
pub fn parse_seed(query: &str) -> Result<Seed, FilterError> {
    let query = query.trim_start_matches('?');
    let raw: RawSeed = if query.is_empty() {
        RawSeed::default()
    } else {
        serde_qs::from_str(query).map_err(|e| FilterError::Malformed(e.to_string()))?
    };

    let mut edits = vec![
        FilterEdit::Channel(raw.channel_id),
        FilterEdit::Keywords(raw.keywords),
        FilterEdit::Search(raw.search),
    ];
    if let Some(content_type) = raw.content_type {
        edits.push(FilterEdit::ContentType(Some(content_type.parse()?)));
    }
    if let Some(from) = raw.date_from {
        edits.push(FilterEdit::DateFrom(Some(parse_instant("date_from", &from)?)));
    }
    if let Some(to) = raw.date_to {
        edits.push(FilterEdit::DateTo(Some(parse_instant("date_to", &to)?)));
    }
    if let Some(sort_by) = raw.sort_by {
        edits.push(FilterEdit::SortBy(sort_by.parse()?));
    }
    if let Some(sort_order) = raw.sort_order {
        edits.push(FilterEdit::SortOrder(sort_order.parse()?));
    }

    let mut filters = FilterState::default();
    for edit in edits {
        filters = filters.apply(edit)?;
    }
    let page_size = raw.page_size.map(PageSize::new).transpose()?;
    Ok(Seed {
        filters,
        page: raw.page,
        page_size,
    })
}

/// Accepts RFC 3339 timestamps, or a bare `YYYY-MM-DD` meaning midnight UTC.
pub fn parse_instant(field: &'static str, value: &str) -> Result<DateTime<Utc>, FilterError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| Utc.from_utc_datetime(&midnight))
        .ok_or_else(|| FilterError::UnknownValue {
            field,
            value: value.to_owned(),
        })
}
