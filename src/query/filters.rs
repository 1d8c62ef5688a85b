//! The operator's filter dimensions and sort choice.
//!
//! A `FilterState` is only ever replaced, never mutated in place: every edit produces a new value,
//! so the view can compare old and new states to decide whether the page cursor is still valid.
use chrono::{offset::Utc, DateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares a closed set of values together with the exact strings the posts service uses.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = FilterError;

            fn from_str(s: &str) -> Result<Self, FilterError> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(FilterError::UnknownValue {
                        field: stringify!($name),
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

wire_enum!(
    /// Kinds of post content the content-type filter can narrow to.
    ContentType {
        Text => "text",
        Photo => "photo",
        Video => "video",
        Document => "document",
        Link => "link",
    }
);

wire_enum!(
    /// Server-side sort keys.
    SortKey {
        Date => "date",
        Views => "views",
        Likes => "likes",
        EngagementRate => "engagement_rate",
    }
);

wire_enum!(
    SortOrder {
        Asc => "asc",
        Desc => "desc",
    }
);

impl Default for SortKey {
    fn default() -> Self {
        SortKey::Date
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Desc
    }
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Why a filter edit (or a page size) was refused. These are raised before any request is built
/// and never touch the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// `date_from` would end up after `date_to`.
    InvertedDateRange {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
    InvalidChannel(i64),
    UnsupportedPageSize(u32),
    UnknownValue { field: &'static str, value: String },
    Malformed(String),
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::InvertedDateRange { from, to } => write!(
                f,
                "start date {} is after end date {}",
                from.to_rfc3339(),
                to.to_rfc3339()
            ),
            FilterError::InvalidChannel(id) => write!(f, "{} is not a valid channel id", id),
            FilterError::UnsupportedPageSize(n) => {
                write!(f, "page size {} is not one of 25, 50 or 100", n)
            }
            FilterError::UnknownValue { field, value } => {
                write!(f, "{:?} is not a valid {}", value, field)
            }
            FilterError::Malformed(reason) => write!(f, "malformed query: {}", reason),
        }
    }
}

impl std::error::Error for FilterError {}

/// One operator edit: a single field replaced, everything else kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEdit {
    Channel(Option<i64>),
    ContentType(Option<ContentType>),
    DateFrom(Option<DateTime<Utc>>),
    DateTo(Option<DateTime<Utc>>),
    /// Comma-separated terms. Blank means no keyword filter.
    Keywords(Option<String>),
    /// Free text. Blank means no search.
    Search(Option<String>),
    SortBy(SortKey),
    SortOrder(SortOrder),
}

/// The active filter dimensions plus the requested sort. Optional fields that are `None` place no
/// constraint on the result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterState {
    channel_id: Option<i64>,
    content_type: Option<ContentType>,
    date_from: Option<DateTime<Utc>>,
    date_to: Option<DateTime<Utc>>,
    keywords: Option<String>,
    search: Option<String>,
    sort_by: SortKey,
    sort_order: SortOrder,
}

impl FilterState {
    /// The state a freshly opened view starts with.
    pub fn reset() -> Self {
        Self::default()
    }

    pub fn channel_id(&self) -> Option<i64> {
        self.channel_id
    }

    pub fn content_type(&self) -> Option<ContentType> {
        self.content_type
    }

    pub fn date_from(&self) -> Option<DateTime<Utc>> {
        self.date_from
    }

    pub fn date_to(&self) -> Option<DateTime<Utc>> {
        self.date_to
    }

    pub fn keywords(&self) -> Option<&str> {
        self.keywords.as_deref()
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn sort_by(&self) -> SortKey {
        self.sort_by
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Returns a new state with the edit applied. If the result would be invalid, the edit is
    /// refused and `self` is left as the current valid state.
    pub fn apply(&self, edit: FilterEdit) -> Result<FilterState, FilterError> {
        let mut next = self.clone();
        match edit {
            FilterEdit::Channel(Some(id)) if id <= 0 => return Err(FilterError::InvalidChannel(id)),
            FilterEdit::Channel(id) => next.channel_id = id,
            FilterEdit::ContentType(content_type) => next.content_type = content_type,
            FilterEdit::DateFrom(from) => next.date_from = from,
            FilterEdit::DateTo(to) => next.date_to = to,
            FilterEdit::Keywords(keywords) => {
                next.keywords = keywords.as_deref().and_then(normalize_keywords)
            }
            FilterEdit::Search(search) => next.search = search.filter(|s| !s.trim().is_empty()),
            FilterEdit::SortBy(key) => next.sort_by = key,
            FilterEdit::SortOrder(order) => next.sort_order = order,
        }
        next.validate()?;
        Ok(next)
    }

    /// What a click on a column's sort arrow does: the current key flips direction, a new key
    /// starts descending.
    pub fn toggle_sort(&self, key: SortKey) -> FilterState {
        let mut next = self.clone();
        if self.sort_by == key {
            next.sort_order = self.sort_order.flipped();
        } else {
            next.sort_by = key;
            next.sort_order = SortOrder::Desc;
        }
        next
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(FilterError::InvertedDateRange { from, to });
            }
        }
        Ok(())
    }

    /// Whether a "clear filters" control is worth showing. Search and sort don't count.
    pub fn has_active_filters(&self) -> bool {
        self.channel_id.is_some()
            || self.content_type.is_some()
            || self.date_from.is_some()
            || self.date_to.is_some()
            || self.keywords.is_some()
    }
}

/// `" cats, ,dogs "` becomes `"cats,dogs"`. Returns None if no terms are left.
fn normalize_keywords(raw: &str) -> Option<String> {
    let terms: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .collect();
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(","))
    }
}
