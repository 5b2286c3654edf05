/*!
The search request model used by [`FT.SEARCH`](https://redis.io/commands/ft.search/).

Only the index name and query text are required. Every modifier is optional
and independent; see [`encode::search`][crate::encode::search] for the order
in which they're sent.
*/

/// Flags that modify how the query itself is interpreted.
///
/// Flags which change the shape of the reply (such as `NOCONTENT` or
/// `WITHSCORES`) aren't offered, because the reply decoder wouldn't
/// understand the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchFlag {
    /// `VERBATIM`: don't expand query terms with stemming.
    Verbatim,

    /// `NOSTOPWORDS`: don't filter stop-words from the query.
    NoStopWords,
}

impl SearchFlag {
    /// The wire name of this flag.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SearchFlag::Verbatim => "VERBATIM",
            SearchFlag::NoStopWords => "NOSTOPWORDS",
        }
    }
}

/// `FILTER field min max`: limit results to a numeric range.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericFilter {
    /// A field declared `NUMERIC` in the index.
    pub field: String,

    /// The lower bound. May be [`f64::NEG_INFINITY`].
    pub min: f64,

    /// The upper bound. May be [`f64::INFINITY`].
    pub max: f64,

    /// If true, neither bound is included in the range.
    pub exclusive: bool,
}

impl NumericFilter {
    /// An inclusive range filter.
    #[must_use]
    pub fn new(field: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            field: field.into(),
            min,
            max,
            exclusive: false,
        }
    }
}

/// The distance unit of a [`GeoFilter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GeoUnit {
    /// `m`
    #[default]
    Meters,

    /// `km`
    Kilometers,

    /// `mi`
    Miles,

    /// `ft`
    Feet,
}

impl GeoUnit {
    /// The wire name of this unit.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            GeoUnit::Meters => "m",
            GeoUnit::Kilometers => "km",
            GeoUnit::Miles => "mi",
            GeoUnit::Feet => "ft",
        }
    }
}

/// `GEOFILTER field lon lat radius unit`: limit results to a radius.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFilter {
    /// A field declared `GEO` in the index.
    pub field: String,

    /// Longitude of the center.
    pub longitude: f64,

    /// Latitude of the center.
    pub latitude: f64,

    /// The radius, in `unit`s.
    pub radius: f64,

    /// The radius unit; meters if unset.
    pub unit: Option<GeoUnit>,
}

/// `SUMMARIZE`: return only the fragments of fields that contain matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summarize {
    /// Fields to summarize; all returned fields if empty.
    pub fields: Vec<String>,

    /// Number of fragments to return.
    pub fragments: Option<u32>,

    /// Number of context words in each fragment.
    pub length: Option<u32>,

    /// The string dividing fragments.
    pub separator: Option<String>,
}

/// `TAGS open close`: the markup wrapped around highlighted terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightTags {
    /// Inserted before each match.
    pub open: String,

    /// Inserted after each match.
    pub close: String,
}

/// `HIGHLIGHT`: wrap matched terms in markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Highlight {
    /// Fields to highlight; all returned fields if empty.
    pub fields: Vec<String>,

    /// Markup to use; the server's default (`<b>`, `</b>`) if unset, or if
    /// either tag is empty.
    pub tags: Option<HighlightTags>,
}

/// The direction of a [`SortBy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// `ASC`
    #[default]
    Ascending,

    /// `DESC`
    Descending,
}

impl SortOrder {
    /// The wire name of this order.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

/// `SORTBY field ASC|DESC`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortBy {
    /// A field declared `SORTABLE` in the index.
    pub field: String,

    /// Sort direction.
    pub order: SortOrder,
}

/// `LIMIT offset num`: the pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Limit {
    /// Zero-based index of the first hit to return.
    pub offset: u64,

    /// Maximum number of hits to return.
    pub num: u64,
}

/**
A full-text search against an index.

# Example

```
use seredisearch::query::{SearchRequest, SortOrder};

let request = SearchRequest::new("cities", "Popayan")
    .sort_by("population", SortOrder::Descending)
    .limit(0, 5);

assert_eq!(request.index, "cities");
assert_eq!(request.limit.map(|limit| limit.num), Some(5));
```
*/
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRequest {
    /// The index to search. Required.
    pub index: String,

    /// The query text. Required.
    pub query: String,

    /// Query interpretation flags.
    pub flags: Vec<SearchFlag>,

    /// Numeric range filters; all of them must match.
    pub filters: Vec<NumericFilter>,

    /// A geographic radius filter.
    pub geo_filter: Option<GeoFilter>,

    /// Limit results to these keys.
    pub in_keys: Vec<String>,

    /// Limit matches to these fields.
    pub in_fields: Vec<String>,

    /// Return only these fields of each document.
    pub return_fields: Vec<String>,

    /// Fragment summarization of returned fields.
    pub summarize: Option<Summarize>,

    /// Highlighting of matched terms.
    pub highlight: Option<Highlight>,

    /// Maximum number of unmatched terms allowed between phrase terms.
    pub slop: Option<u32>,

    /// Stemming language for query expansion.
    pub language: Option<String>,

    /// A custom query expander.
    pub expander: Option<String>,

    /// A custom scoring function.
    pub scorer: Option<String>,

    /// An arbitrary payload exposed to custom scoring functions.
    pub payload: Option<String>,

    /// Result ordering.
    pub sort_by: Option<SortBy>,

    /// Pagination. The server returns the first 10 hits if unset.
    pub limit: Option<Limit>,
}

impl SearchRequest {
    /// Create a search request with no modifiers.
    #[must_use]
    pub fn new(index: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            query: query.into(),
            ..Self::default()
        }
    }

    /// Add a query flag.
    #[must_use]
    pub fn flag(mut self, flag: SearchFlag) -> Self {
        self.flags.push(flag);
        self
    }

    /// Add a numeric range filter.
    #[must_use]
    pub fn filter(mut self, filter: NumericFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set the result ordering.
    #[must_use]
    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(SortBy {
            field: field.into(),
            order,
        });
        self
    }

    /// Set the pagination window.
    #[must_use]
    pub fn limit(mut self, offset: u64, num: u64) -> Self {
        self.limit = Some(Limit { offset, num });
        self
    }
}
