use std::borrow::Borrow;

use bevy_reflect::Reflect;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One batch of changes made to documents in the database, in time order of
/// application, as returned by the database's `_changes` resource.
///
/// Only the most recent change for a given document is guaranteed to be provided,
/// for example if a document has had fields added, and then deleted, an API client
/// checking for changes will not necessarily receive the intermediate state of
/// added documents.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChangesResult {
    /// A vector of changes made to a database
    pub results: Vec<ChangesItem>,
    /// Last change update sequence, the point to resume from
    pub last_seq: String,
    /// Count of remaining items in the feed
    pub pending: i64,
}
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChangesItem {
    /// Update sequence
    pub seq: String,
    /// Document ID
    pub id: String,
    /// Vector of document's leaves with single field `rev`
    pub changes: Vec<Change>,
    /// `true` if the document is deleted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    /// include doc body if `include_docs=true` is provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<Value>,
}
/// Document leaves with single field `rev`
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Change {
    /// Revision of the document
    pub rev: String,
}

/// Feed options
#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Feed {
    /// Equal to a regular Request/Response
    Normal,
    LongPoll,
    /// A continuous connection in a Stream fashion between CouchDB and the client
    Continuous,
    EventSource,
}

impl std::fmt::Display for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Feed::Normal => write!(f, "normal"),
            Feed::LongPoll => write!(f, "longpoll"),
            Feed::Continuous => write!(f, "continuous"),
            Feed::EventSource => write!(f, "eventsource"),
        }
    }
}

impl Default for Feed {
    fn default() -> Self {
        Self::Normal
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Style {
    MainOnly,
    AllDocs,
}

impl std::fmt::Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Style::MainOnly => write!(f, "main_only"),
            Style::AllDocs => write!(f, "all_docs"),
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::MainOnly
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Filter {
    /// `filter=_selector`
    ///
    /// This filter accepts only changes for documents which match a specified selector,
    /// defined using the same selector syntax used for `_find`.
    Selector,
    /// This filter accepts only changes for documents which ID in specified in doc_ids query parameter or payload's object array
    DocIds,
    /// The `_design` filter accepts only changes for any design document within the requested database.
    Design,
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Filter::Selector => write!(f, "_selector"),
            Filter::DocIds => write!(f, "_doc_ids"),
            Filter::Design => write!(f, "_design"),
        }
    }
}

/// Parameters accepted by [`ChangesFollower`](crate::changes::ChangesFollower).
///
/// `feed`, `timeout`, `heartbeat`, `last_event_id` and `descending` can be set
/// but never pass validation, the follower owns the feed protocol and a
/// descending feed cannot be resumed from its last sequence. `filter` is only
/// accepted as `_selector`.
#[derive(Debug, Clone, Default)]
pub struct PostChangesParams {
    /// Database name
    pub(crate) db: String,
    /// Include encoding information in attachment stubs if `include_docs` is `true` and the particular attachment is compressed.
    pub(crate) att_encoding_info: bool,
    /// Include the Base64-encoded content of attachments in the documents that are included if `include_docs` is `true`.
    pub(crate) attachments: bool,
    /// Includes conflicts information in response. Ignored if isn't `true`
    pub(crate) conflicts: bool,
    pub(crate) descending: bool,
    /// Document IDs to filter the feed by, sent in the request body
    pub(crate) doc_ids: Vec<String>,
    /// Fields of each document to return, sent in the request body
    pub(crate) fields: Vec<String>,
    pub(crate) feed: String,
    /// Reference to a filter function that will filter the whole stream emitting only filtered events.
    pub(crate) filter: String,
    pub(crate) heartbeat: i64,
    /// Include the associated document with each result. If there are conflicts, only the winning revision is returned. Default is `false`
    pub(crate) include_docs: bool,
    pub(crate) last_event_id: String,
    /// Limit the total number of result rows delivered by the follower
    pub(crate) limit: i64,
    /// Selector to filter the feed by, sent in the request body
    pub(crate) selector: Value,
    /// Tells CouchDB to only calculate the update seq with every Nth result returned.
    pub(crate) seq_interval: i64,
    /// Start the results from the change immediately after the given update sequence
    pub(crate) since: String,
    /// Specifies how many revisions are returned in the changes array.
    pub(crate) style: String,
    pub(crate) timeout: i64,
    /// Allows to use view functions as filters.
    pub(crate) view: String,
}

impl PostChangesParams {
    pub fn new<S>(db: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            db: db.into(),
            selector: Value::Null,
            ..Self::default()
        }
    }

    /// Include encoding information in attachment stubs if `include_docs` is `true` and the particular attachment is compressed.
    ///
    /// Ignored if `include_docs` isn't `true`. Default is `false`.
    pub fn att_encoding_info(mut self, enable: bool) -> Self {
        self.att_encoding_info = enable;
        self
    }

    /// Include the Base64-encoded content of attachments in the documents that are included if `include_docs` is `true`.
    ///
    /// Ignored if `include_docs` isn't `true`. Default is `false`.
    pub fn attachments(mut self, enable: bool) -> Self {
        self.attachments = enable;
        self
    }

    /// Includes conflicts information in response. Ignored if isn't `true`
    pub fn conflicts(mut self, enable: bool) -> Self {
        self.conflicts = enable;
        self
    }

    /// Return the change results in descending sequence order. Rejected by the
    /// follower, a descending feed has no sequence to resume from.
    pub fn descending(mut self, enable: bool) -> Self {
        self.descending = enable;
        self
    }

    /// Changes for the documents with the given IDs only, sent in the request body
    pub fn doc_ids(mut self, doc_ids: Vec<&str>) -> Self {
        self.doc_ids = doc_ids.iter().map(|s| s.to_string()).collect();
        self
    }

    /// JSON array specifying which fields of each object should be returned, sent in the request body
    pub fn fields(mut self, values: Vec<&str>) -> Self {
        self.fields = values.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Feed mode. Rejected by the follower, which owns the feed protocol.
    pub fn feed<T>(mut self, feed: T) -> Self
    where
        T: Borrow<Feed>,
    {
        self.feed = feed.borrow().to_string();
        self
    }

    /// Reference to a filter function that will filter the whole stream emitting only filtered events.
    ///
    /// The follower only accepts [`Filter::Selector`]
    pub fn filter<T>(mut self, filter: T) -> Self
    where
        T: Borrow<Filter>,
    {
        self.filter = filter.borrow().to_string();
        self
    }

    /// Period in milliseconds after which an empty line is sent in the results.
    /// Rejected by the follower.
    pub fn heartbeat(mut self, value: i64) -> Self {
        self.heartbeat = value;
        self
    }

    /// Include the associated document with each result. If there are conflicts, only the winning revision is returned. Default is `false`
    pub fn include_docs(mut self, enable: bool) -> Self {
        self.include_docs = enable;
        self
    }

    /// ID of the last event received. Rejected by the follower, resumption is
    /// sequence based.
    pub fn last_event_id<A>(mut self, value: A) -> Self
    where
        A: Into<String>,
    {
        self.last_event_id = value.into();
        self
    }

    /// Limit the total number of result rows the follower delivers before it
    /// stops the feed
    pub fn limit(mut self, value: i64) -> Self {
        self.limit = value;
        self
    }

    /// Selector to filter the feed by, defined using the same selector syntax
    /// used for `_find`, sent in the request body. Requires [`Filter::Selector`]
    pub fn selector(mut self, selector: Value) -> Self {
        self.selector = selector;
        self
    }

    /// When fetching changes in a batch, setting the seq_interval parameter tells CouchDB to only calculate the update seq with every Nth result returned.
    ///
    /// By setting `seq_interval=<batch size>`, where `<batch size>` is the number of results requested per batch, load can be reduced on the source CouchDB database;
    /// computing the seq value across many shards (esp. in highly-sharded databases) is expensive in a heavily loaded CouchDB cluster.
    pub fn seq_interval(mut self, value: i64) -> Self {
        self.seq_interval = value;
        self
    }

    /// Start the results from the change immediately after the given update sequence
    pub fn since<A>(mut self, value: A) -> Self
    where
        A: Into<String>,
    {
        self.since = value.into();
        self
    }

    /// Specifies how many revisions are returned in the changes array. The default, `main_only`, will only return the current "winning" revision;
    ///
    /// `all_docs` will return all leaf revisions (including conflicts and deleted former conflicts).
    pub fn style<T>(mut self, style: T) -> Self
    where
        T: Borrow<Style>,
    {
        self.style = style.borrow().to_string();
        self
    }

    /// Maximum period in milliseconds to wait for a change before the response
    /// is sent. Rejected by the follower, which owns the long poll timeout.
    pub fn timeout(mut self, value: i64) -> Self {
        self.timeout = value;
        self
    }

    /// Allows to use view functions as filters. Documents counted as "passed" for view filter in case if map function emits at least one record for them.
    pub fn view<A>(mut self, value: A) -> Self
    where
        A: Into<String>,
    {
        self.view = value.into();
        self
    }
}

/// Wire side query params for a single `_changes` request. Built by the
/// follower from [`PostChangesParams`], there are no slots for the options the
/// follower forbids except `feed` and `timeout` which the follower itself sets.
#[derive(Debug, Serialize, Deserialize, Reflect, Clone, Default)]
pub struct ChangesRequestParams {
    pub(crate) att_encoding_info: bool,
    pub(crate) attachments: bool,
    pub(crate) conflicts: bool,
    pub(crate) feed: String,
    pub(crate) filter: String,
    pub(crate) include_docs: bool,
    pub(crate) limit: i64,
    pub(crate) seq_interval: i64,
    pub(crate) since: String,
    pub(crate) style: String,
    pub(crate) timeout: i64,
    pub(crate) view: String,
}

/// One fully assembled `_changes` request: target database, query string
/// params and JSON body
#[derive(Debug, Clone)]
pub struct ChangesRequest {
    pub(crate) db: String,
    pub(crate) query: ChangesRequestParams,
    pub(crate) body: Value,
}
