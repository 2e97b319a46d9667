use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Query documents using a declarative JSON querying syntax
///
/// ## Example of a query obj
/// ```json
/// {
///    "selector": {
///        "year": {"$gt": 2010}
///    },
///    "fields": ["_id", "_rev", "year", "title"],
///    "sort": [{"year": "asc"}],
///    "limit": 2,
///    "skip": 0,
///    "execution_stats": true
/// }
/// ```
/// The same query as Rust types:
/// ```ignore
/// let params = FindParams::new("movies", serde_json::json!({"year": {"$gt": 2010}}))
///     .fields(vec!["_id", "_rev", "year", "title"])
///     .sort(vec![SortType::Json(serde_json::json!({"year": "asc"}))])
///     .limit(2)
///     .skip(0)
///     .execution_stats(true);
/// ```
/// for more info about `_find` and its `selector` queries: https://docs.couchdb.org/en/stable/api/database/find.html#db-find
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct FindParams {
    /// Database name, part of the request path
    #[serde(skip)]
    pub(crate) db: String,
    /// Selectors are expressed as a JSON object describing documents of interest. Within this structure, you can apply conditional logic using specially named fields.
    pub(crate) selector: Value,
    /// The `sort` field contains a list of field name and direction pairs, expressed as a basic array.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) sort: Option<Vec<SortType>>,
    /// JSON array specifying which fields of each object should be returned. If it is omitted, the entire object is returned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) fields: Option<Vec<String>>,
    /// Maximum number of results returned. Default is `25`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) limit: Option<i64>,
    /// Skip the first `n` results, where `n` is the value specified
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) skip: Option<i64>,
    /// Instruct a query to use a specific index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) use_index: Option<Vec<String>>,
    /// Include conflicted documents if `true`. Intended use is to easily find conflicted documents, without an index or view. Default is `false`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) conflicts: Option<bool>,
    /// Read quorum needed for the result. This defaults to 1, in which case the document found in the index is returned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) r: Option<i64>,
    /// A string that enables you to specify which page of results you require. Used for paging through result sets.
    ///
    /// Every query returns an opaque string under the bookmark key that can then be passed back in a query to get the next page of results.
    /// If any part of the selector query changes between requests, the results are undefined, Default `null`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) bookmark: Option<String>,
    /// Whether to update the index prior to returning the result. Default is `true`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) update: Option<bool>,
    /// Whether or not the view results should be returned from a `stable` set of shards
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) stable: Option<bool>,
    /// Include execution statistics in the query response, Default `false`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) execution_stats: Option<bool>,
}

impl FindParams {
    pub fn new<S>(db: S, selector: Value) -> Self
    where
        S: Into<String>,
    {
        Self {
            db: db.into(),
            selector,
            ..Self::default()
        }
    }

    /// Selectors are expressed as a JSON object describing documents of interest. Within this structure, you can apply conditional logic using specially named fields.
    ///
    /// Elementary selector syntax requires you to specify one or more fields, and the corresponding values required for those fields.
    /// You can create more complex selector expressions by combining operators.
    /// For best performance, it is best to combine `combination` or `array logical` operators, such as `$regex`,
    /// with an equality operators such as `$eq`, `$gt`, `$gte`, `$lt`, and `$lte` (but not `$ne`).
    ///
    /// ## Example simple selector
    /// ```json
    /// {
    ///     "selector": {
    ///         "title": "Live And Let Die"
    ///     },
    ///     "fields": [
    ///         "title",
    ///         "cast"
    ///     ]
    /// }
    /// ```
    pub fn selector(mut self, selector: Value) -> Self {
        self.selector = selector;
        self
    }

    /// The `sort` field contains a list of field name and direction pairs, expressed as a basic array.
    ///
    /// The direction value is `asc` for ascending, and `desc` for descending. If you omit the direction value, the default `asc` is used.
    /// ## Example sorting by 2 fields
    /// ```json
    /// [{"fieldName1": "desc"}, {"fieldName2": "desc" }]
    /// ```
    pub fn sort(mut self, values: Vec<SortType>) -> Self {
        self.sort = Some(values);
        self
    }

    /// JSON array specifying which fields of each object should be returned. If it is omitted, the entire object is returned
    pub fn fields(mut self, values: Vec<&str>) -> Self {
        self.fields = Some(values.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Maximum number of results returned. Default is `25`
    pub fn limit(mut self, max_docs: i64) -> Self {
        self.limit = Some(max_docs);
        self
    }

    /// Skip the first `n` results, where `n` is the value specified
    pub fn skip(mut self, docs_to_skip: i64) -> Self {
        self.skip = Some(docs_to_skip);
        self
    }

    /// Instruct a query to use a specific index.
    pub fn use_index(mut self, index_to_use: Vec<String>) -> Self {
        self.use_index = Some(index_to_use);
        self
    }

    /// Include conflicted documents if `true`. Intended use is to easily find conflicted documents, without an index or view. Default is `false`
    pub fn conflicts(mut self, enable: bool) -> Self {
        self.conflicts = Some(enable);
        self
    }

    /// Read quorum needed for the result. This defaults to 1, in which case the document found in the index is returned.
    ///
    /// If set to a higher value, each document is read from at least that many replicas before it is returned in the results.
    /// This is likely to take more time than using only the document stored locally with the index.
    /// Default `1`.
    pub fn r(mut self, quorum_num: i64) -> Self {
        self.r = Some(quorum_num);
        self
    }

    /// A string that enables you to specify which page of results you require. Used for paging through result sets.
    ///
    /// Every query returns an opaque string under the bookmark key that can then be passed back in a query to get the next page of results.
    /// If any part of the selector query changes between requests, the results are undefined, Default `null`
    pub fn bookmark(mut self, value: String) -> Self {
        self.bookmark = Some(value);
        self
    }

    /// Whether to update the index prior to returning the result. Default is `true`.
    pub fn update(mut self, enable: bool) -> Self {
        self.update = Some(enable);
        self
    }

    /// Whether or not the view results should be returned from a `stable` set of shards
    pub fn stable(mut self, enable: bool) -> Self {
        self.stable = Some(enable);
        self
    }

    /// Include execution statistics in the query response, Default `false`
    pub fn execution_stats(mut self, enable: bool) -> Self {
        self.execution_stats = Some(enable);
        self
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
/// Sorting can accept an array of strings or json
pub enum SortType {
    String(String),
    Json(Value),
}

impl Default for SortType {
    fn default() -> Self {
        Self::String(String::default())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FindResult {
    /// Vector of documents matching the search. In each matching document, the fields specified in the fields part of the request body are listed, along with their values.
    pub docs: Vec<Value>,
    /// Opaque string used for paging through result sets, passed back in the next query to get the next page of results
    pub bookmark: Option<String>,
    /// Execution warnings
    pub warning: Option<String>,
    /// Execution stats
    pub execution_stats: Option<ExecutionStats>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExecutionStats {
    pub total_keys_examined: i64,
    pub total_docs_examined: i64,
    pub total_quorum_docs_examined: i64,
    pub results_returned: i64,
    pub execution_time_ms: f64,
}
