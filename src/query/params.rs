//! The one place filters become request parameters. Listing and export both go through
//! `filter_params`, so the two requests can't disagree about what "the current filters" means.
use crate::export::ExportFormat;
use crate::query::filters::FilterState;
use crate::query::page::PageState;
use anyhow::anyhow;
use chrono::{offset::Utc, DateTime, SecondsFormat};
use serde::Serialize;
use std::collections::BTreeMap;

pub const CHANNEL_ID: &str = "channel_id";
pub const CONTENT_TYPE: &str = "content_type";
pub const DATE_FROM: &str = "date_from";
pub const DATE_TO: &str = "date_to";
pub const KEYWORDS: &str = "keywords";
pub const SEARCH: &str = "search";
pub const SORT_BY: &str = "sort_by";
pub const SORT_ORDER: &str = "sort_order";
pub const PAGE: &str = "page";
pub const PAGE_SIZE: &str = "page_size";
pub const EXPORT_FORMAT: &str = "export_format";
pub const COLUMNS: &str = "columns";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Text(String),
}

impl ParamValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(n) => Some(*n),
            ParamValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            ParamValue::Int(_) => None,
        }
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        ParamValue::Int(n)
    }
}

impl From<u32> for ParamValue {
    fn from(n: u32) -> Self {
        ParamValue::Int(i64::from(n))
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

/// Request parameters. Absent filters have no key at all; there is never an empty or null value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParamSet(BTreeMap<&'static str, ParamValue>);

impl ParamSet {
    fn insert(&mut self, key: &'static str, value: impl Into<ParamValue>) {
        self.0.insert(key, value.into());
    }

    fn insert_opt<V: Into<ParamValue>>(&mut self, key: &'static str, value: Option<V>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn values(&self) -> impl Iterator<Item = &ParamValue> + '_ {
        self.0.values()
    }

    /// A copy without the given keys.
    pub fn without(&self, keys: &[&str]) -> ParamSet {
        ParamSet(
            self.0
                .iter()
                .filter(|(k, _)| !keys.contains(*k))
                .map(|(k, v)| (*k, v.clone()))
                .collect(),
        )
    }

    /// Percent-encoded `key=value&...`, keys in sorted order.
    pub fn to_query_string(&self) -> anyhow::Result<String> {
        // serde_qs errors aren't Sync, so only their message survives.
        serde_qs::to_string(self).map_err(|e| anyhow!("couldn't encode query string: {}", e))
    }
}

/// Every timestamp sent to the server goes through here: UTC, millisecond precision, `Z` suffix.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn filter_params(filters: &FilterState) -> ParamSet {
    let mut params = ParamSet::default();
    params.insert_opt(CHANNEL_ID, filters.channel_id());
    params.insert_opt(CONTENT_TYPE, filters.content_type().map(|c| c.as_str()));
    params.insert_opt(DATE_FROM, filters.date_from().as_ref().map(format_timestamp));
    params.insert_opt(DATE_TO, filters.date_to().as_ref().map(format_timestamp));
    params.insert_opt(KEYWORDS, filters.keywords());
    params.insert_opt(SEARCH, filters.search());
    params
}

/// Parameters for one page of the listing endpoint.
pub fn listing_params(filters: &FilterState, page: &PageState) -> ParamSet {
    let mut params = filter_params(filters);
    params.insert(SORT_BY, filters.sort_by().as_str());
    params.insert(SORT_ORDER, filters.sort_order().as_str());
    params.insert(PAGE, page.page());
    params.insert(PAGE_SIZE, page.page_size().get());
    params
}

/// Parameters for the export endpoint: the same filters, no cursor, since exports return the
/// whole matching set. `columns` narrows the exported columns; empty means all of them.
pub fn export_params(filters: &FilterState, format: ExportFormat, columns: &[String]) -> ParamSet {
    let mut params = filter_params(filters);
    params.insert(EXPORT_FORMAT, format.as_str());
    let columns: Vec<&str> = columns
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect();
    if !columns.is_empty() {
        params.insert(COLUMNS, columns.join(","));
    }
    params
}
