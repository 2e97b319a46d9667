use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Params accepted by a `_search` request, sent as a JSON body
///
/// More [info](https://docs.couchdb.org/en/stable/ddocs/search.html)
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SearchParams {
    /// Database name, part of the request path
    #[serde(skip)]
    pub(crate) db: String,
    /// Design document name, part of the request path
    #[serde(skip)]
    pub(crate) ddoc: String,
    /// Search index name, part of the request path
    #[serde(skip)]
    pub(crate) index: String,
    /// Lucene query to run against the index
    pub(crate) query: String,
    /// Opaque string used for paging through result sets, passed back in the next query to get the next page of results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) bookmark: Option<String>,
    /// Field names to facet counts on. The response contains counts for each unique value of each named field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) counts: Option<Vec<String>>,
    /// Field by which to group search matches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) group_field: Option<String>,
    /// Maximum group count when `group_field` is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) group_limit: Option<i64>,
    /// Sort order for the groups when `group_field` is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) group_sort: Option<Value>,
    /// Which fields are highlighted in the search results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) highlight_fields: Option<Vec<String>>,
    /// Number of fragments returned in highlights. Default is `1`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) highlight_number: Option<i64>,
    /// Number of characters in each highlight fragment. Default is `100`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) highlight_size: Option<i64>,
    /// Include the full content of the documents in the response. Default is `false`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) include_docs: Option<bool>,
    /// JSON array of field names to include in search results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) include_fields: Option<Vec<String>>,
    /// Limit the number of the returned rows to the specified number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) limit: Option<i64>,
    /// Ranges for faceted numeric search fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) ranges: Option<Value>,
    /// Sort order for the search matches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) sort: Option<Value>,
    /// Do not wait for the index to finish building before returning results. Accepts `ok`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) stale: Option<String>,
}

impl SearchParams {
    pub fn new<A, B, C, D>(db: A, ddoc: B, index: C, query: D) -> Self
    where
        A: Into<String>,
        B: Into<String>,
        C: Into<String>,
        D: Into<String>,
    {
        Self {
            db: db.into(),
            ddoc: ddoc.into(),
            index: index.into(),
            query: query.into(),
            ..Self::default()
        }
    }

    /// Opaque string used for paging through result sets, passed back in the next query to get the next page of results
    pub fn bookmark<A>(mut self, value: A) -> Self
    where
        A: Into<String>,
    {
        self.bookmark = Some(value.into());
        self
    }

    /// Field names to facet counts on. Changes the response shape, rejected when paginating
    pub fn counts(mut self, values: Vec<&str>) -> Self {
        self.counts = Some(values.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Field by which to group search matches. Changes the response shape, rejected when paginating
    pub fn group_field<A>(mut self, value: A) -> Self
    where
        A: Into<String>,
    {
        self.group_field = Some(value.into());
        self
    }

    /// Maximum group count when `group_field` is set
    pub fn group_limit(mut self, value: i64) -> Self {
        self.group_limit = Some(value);
        self
    }

    /// Sort order for the groups when `group_field` is set
    pub fn group_sort(mut self, value: Value) -> Self {
        self.group_sort = Some(value);
        self
    }

    /// Which fields are highlighted in the search results
    pub fn highlight_fields(mut self, values: Vec<&str>) -> Self {
        self.highlight_fields = Some(values.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Number of fragments returned in highlights. Default is `1`
    pub fn highlight_number(mut self, value: i64) -> Self {
        self.highlight_number = Some(value);
        self
    }

    /// Number of characters in each highlight fragment. Default is `100`
    pub fn highlight_size(mut self, value: i64) -> Self {
        self.highlight_size = Some(value);
        self
    }

    /// Include the full content of the documents in the response. Default is `false`
    pub fn include_docs(mut self, enable: bool) -> Self {
        self.include_docs = Some(enable);
        self
    }

    /// JSON array of field names to include in search results
    pub fn include_fields(mut self, values: Vec<&str>) -> Self {
        self.include_fields = Some(values.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Limit the number of the returned rows to the specified number
    pub fn limit(mut self, value: i64) -> Self {
        self.limit = Some(value);
        self
    }

    /// Ranges for faceted numeric search fields. Changes the response shape, rejected when paginating
    pub fn ranges(mut self, value: Value) -> Self {
        self.ranges = Some(value);
        self
    }

    /// Sort order for the search matches
    pub fn sort(mut self, value: Value) -> Self {
        self.sort = Some(value);
        self
    }

    /// Do not wait for the index to finish building before returning results. Accepts `ok`
    pub fn stale<A>(mut self, value: A) -> Self
    where
        A: Into<String>,
    {
        self.stale = Some(value.into());
        self
    }
}

/// One row of a `_search` response
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SearchRow {
    /// ID of the matching document
    pub id: String,
    /// Stored fields of the match
    #[serde(default)]
    pub fields: Value,
    /// Highlighted fragments if highlighting was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<Value>,
    /// Document body if `include_docs=true` was provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SearchResult {
    /// Number of matches for the query
    pub total_rows: Option<i64>,
    /// Opaque string used for paging through result sets, passed back in the next query to get the next page of results
    pub bookmark: Option<String>,
    /// Vector of rows
    pub rows: Vec<SearchRow>,
}
