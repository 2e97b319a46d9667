use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Params accepted by `_all_docs` and `_design_docs`, sent as a JSON body
///
/// More [info](https://docs.couchdb.org/en/stable/api/database/bulk-api.html#post--db-_all_docs)
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AllDocsParams {
    /// Database name, part of the request path
    #[serde(skip)]
    pub(crate) db: String,
    /// Include encoding information in attachment stubs if `include_docs` is `true` and the particular attachment is compressed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) att_encoding_info: Option<bool>,
    /// Include the Base64-encoded content of attachments in the documents that are included if `include_docs` is `true`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) attachments: Option<bool>,
    /// Includes conflicts information in response. Ignored if isn't `true`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) conflicts: Option<bool>,
    /// Return the documents in descending order by key. Default is `false`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) descending: Option<bool>,
    /// Stop returning records when the specified key is reached
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) end_key: Option<String>,
    /// Include the full content of the documents in the return. Default is `false`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) include_docs: Option<bool>,
    /// Specifies whether the specified end key should be included in the result. Default is `true`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) inclusive_end: Option<bool>,
    /// Return only documents that match the specified key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) key: Option<String>,
    /// Return only documents that match the specified keys
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) keys: Option<Vec<String>>,
    /// Limit the number of the returned documents to the specified number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) limit: Option<i64>,
    /// Skip this number of records before starting to return the results. Default is `0`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) skip: Option<i64>,
    /// Return records starting with the specified key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) start_key: Option<String>,
    /// Response includes an `update_seq` value indicating which sequence id of the underlying database the view reflects
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) update_seq: Option<bool>,
}

impl AllDocsParams {
    pub fn new<S>(db: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            db: db.into(),
            ..Self::default()
        }
    }

    /// Include encoding information in attachment stubs if `include_docs` is `true` and the particular attachment is compressed
    pub fn att_encoding_info(mut self, enable: bool) -> Self {
        self.att_encoding_info = Some(enable);
        self
    }

    /// Include the Base64-encoded content of attachments in the documents that are included if `include_docs` is `true`
    pub fn attachments(mut self, enable: bool) -> Self {
        self.attachments = Some(enable);
        self
    }

    /// Includes conflicts information in response. Ignored if isn't `true`
    pub fn conflicts(mut self, enable: bool) -> Self {
        self.conflicts = Some(enable);
        self
    }

    /// Return the documents in descending order by key. Default is `false`
    pub fn descending(mut self, enable: bool) -> Self {
        self.descending = Some(enable);
        self
    }

    /// Stop returning records when the specified key is reached
    pub fn end_key<A>(mut self, value: A) -> Self
    where
        A: Into<String>,
    {
        self.end_key = Some(value.into());
        self
    }

    /// Include the full content of the documents in the return. Default is `false`
    pub fn include_docs(mut self, enable: bool) -> Self {
        self.include_docs = Some(enable);
        self
    }

    /// Specifies whether the specified end key should be included in the result. Default is `true`
    pub fn inclusive_end(mut self, enable: bool) -> Self {
        self.inclusive_end = Some(enable);
        self
    }

    /// Return only documents that match the specified key
    pub fn key<A>(mut self, value: A) -> Self
    where
        A: Into<String>,
    {
        self.key = Some(value.into());
        self
    }

    /// Return only documents that match the specified keys
    pub fn keys(mut self, values: Vec<&str>) -> Self {
        self.keys = Some(values.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Limit the number of the returned documents to the specified number
    pub fn limit(mut self, value: i64) -> Self {
        self.limit = Some(value);
        self
    }

    /// Skip this number of records before starting to return the results. Default is `0`
    pub fn skip(mut self, value: i64) -> Self {
        self.skip = Some(value);
        self
    }

    /// Return records starting with the specified key
    pub fn start_key<A>(mut self, value: A) -> Self
    where
        A: Into<String>,
    {
        self.start_key = Some(value.into());
        self
    }

    /// Response includes an `update_seq` value indicating which sequence id of the underlying database the view reflects
    pub fn update_seq(mut self, enable: bool) -> Self {
        self.update_seq = Some(enable);
        self
    }
}

/// Params accepted by a `_view` request, sent as a JSON body
///
/// More [info](https://docs.couchdb.org/en/stable/api/ddoc/views.html#post--db-_design-ddoc-_view-view)
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ViewParams {
    /// Database name, part of the request path
    #[serde(skip)]
    pub(crate) db: String,
    /// Design document name, part of the request path
    #[serde(skip)]
    pub(crate) ddoc: String,
    /// View name, part of the request path
    #[serde(skip)]
    pub(crate) view: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) att_encoding_info: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) attachments: Option<bool>,
    /// Includes conflicts information in response. Ignored if isn't `true`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) conflicts: Option<bool>,
    /// Return the rows in descending order by key. Default is `false`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) descending: Option<bool>,
    /// Stop returning records when the specified key is reached
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) end_key: Option<Value>,
    /// Stop returning records when the specified document ID is reached. Ignored if `end_key` is not set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) end_key_doc_id: Option<String>,
    /// Group the results using the reduce function to a group or single row. Implies `reduce` is `true` and the maximum `group_level`. Default is `false`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) group: Option<bool>,
    /// Specify the group level to be used. Implies `group` is `true`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) group_level: Option<i64>,
    /// Include the associated document with each row. Default is `false`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) include_docs: Option<bool>,
    /// Specifies whether the specified end key should be included in the result. Default is `true`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) inclusive_end: Option<bool>,
    /// Return only rows that match the specified key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) key: Option<Value>,
    /// Return only rows where the key matches one of the specified keys
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) keys: Option<Vec<Value>>,
    /// Limit the number of the returned rows to the specified number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) limit: Option<i64>,
    /// Use the reduction function. Default is `true` when a reduce function is defined
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) reduce: Option<bool>,
    /// Skip this number of rows before starting to return the results. Default is `0`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) skip: Option<i64>,
    /// Whether or not the view results should be returned from a stable set of shards. Default is `false`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) stable: Option<bool>,
    /// Return records starting with the specified key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) start_key: Option<Value>,
    /// Return records starting with the specified document ID. Ignored if `start_key` is not set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) start_key_doc_id: Option<String>,
    /// Whether or not the view in question should be updated prior to responding to the user. Accepts `true`, `false` and `lazy`. Default is `true`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) update: Option<String>,
    /// Response includes an `update_seq` value indicating which sequence id of the underlying database the view reflects
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) update_seq: Option<bool>,
}

impl ViewParams {
    pub fn new<A, B, C>(db: A, ddoc: B, view: C) -> Self
    where
        A: Into<String>,
        B: Into<String>,
        C: Into<String>,
    {
        Self {
            db: db.into(),
            ddoc: ddoc.into(),
            view: view.into(),
            ..Self::default()
        }
    }

    pub fn att_encoding_info(mut self, enable: bool) -> Self {
        self.att_encoding_info = Some(enable);
        self
    }

    pub fn attachments(mut self, enable: bool) -> Self {
        self.attachments = Some(enable);
        self
    }

    /// Includes conflicts information in response. Ignored if isn't `true`
    pub fn conflicts(mut self, enable: bool) -> Self {
        self.conflicts = Some(enable);
        self
    }

    /// Return the rows in descending order by key. Default is `false`
    pub fn descending(mut self, enable: bool) -> Self {
        self.descending = Some(enable);
        self
    }

    /// Stop returning records when the specified key is reached
    pub fn end_key(mut self, value: Value) -> Self {
        self.end_key = Some(value);
        self
    }

    /// Stop returning records when the specified document ID is reached. Ignored if `end_key` is not set
    pub fn end_key_doc_id<A>(mut self, value: A) -> Self
    where
        A: Into<String>,
    {
        self.end_key_doc_id = Some(value.into());
        self
    }

    /// Group the results using the reduce function to a group or single row. Default is `false`
    pub fn group(mut self, enable: bool) -> Self {
        self.group = Some(enable);
        self
    }

    /// Specify the group level to be used. Implies `group` is `true`
    pub fn group_level(mut self, value: i64) -> Self {
        self.group_level = Some(value);
        self
    }

    /// Include the associated document with each row. Default is `false`
    pub fn include_docs(mut self, enable: bool) -> Self {
        self.include_docs = Some(enable);
        self
    }

    /// Specifies whether the specified end key should be included in the result. Default is `true`
    pub fn inclusive_end(mut self, enable: bool) -> Self {
        self.inclusive_end = Some(enable);
        self
    }

    /// Return only rows that match the specified key
    pub fn key(mut self, value: Value) -> Self {
        self.key = Some(value);
        self
    }

    /// Return only rows where the key matches one of the specified keys
    pub fn keys(mut self, values: Vec<Value>) -> Self {
        self.keys = Some(values);
        self
    }

    /// Limit the number of the returned rows to the specified number
    pub fn limit(mut self, value: i64) -> Self {
        self.limit = Some(value);
        self
    }

    /// Use the reduction function. Default is `true` when a reduce function is defined
    pub fn reduce(mut self, enable: bool) -> Self {
        self.reduce = Some(enable);
        self
    }

    /// Skip this number of rows before starting to return the results. Default is `0`
    pub fn skip(mut self, value: i64) -> Self {
        self.skip = Some(value);
        self
    }

    /// Whether or not the view results should be returned from a stable set of shards. Default is `false`
    pub fn stable(mut self, enable: bool) -> Self {
        self.stable = Some(enable);
        self
    }

    /// Return records starting with the specified key
    pub fn start_key(mut self, value: Value) -> Self {
        self.start_key = Some(value);
        self
    }

    /// Return records starting with the specified document ID. Ignored if `start_key` is not set
    pub fn start_key_doc_id<A>(mut self, value: A) -> Self
    where
        A: Into<String>,
    {
        self.start_key_doc_id = Some(value.into());
        self
    }

    /// Whether or not the view in question should be updated prior to responding to the user. Accepts `true`, `false` and `lazy`. Default is `true`
    pub fn update<A>(mut self, value: A) -> Self
    where
        A: Into<String>,
    {
        self.update = Some(value.into());
        self
    }

    /// Response includes an `update_seq` value indicating which sequence id of the underlying database the view reflects
    pub fn update_seq(mut self, enable: bool) -> Self {
        self.update_seq = Some(enable);
        self
    }
}

/// One row of an `_all_docs`, `_design_docs` or `_view` response
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ViewRow {
    /// ID of the document the row was emitted for. Reduced rows carry no id
    #[serde(default)]
    pub id: String,
    /// Emitted key, the document ID itself for `_all_docs`
    #[serde(default)]
    pub key: Value,
    /// Emitted value, `{"rev": ..}` for `_all_docs`
    #[serde(default)]
    pub value: Value,
    /// Document body if `include_docs=true` was provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ViewResult {
    /// Number of documents in the database/view
    pub total_rows: Option<i64>,
    /// Offset where the row list started
    pub offset: Option<i64>,
    /// Vector of rows
    pub rows: Vec<ViewRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_seq: Option<String>,
}
