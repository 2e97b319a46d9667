//! Scripted [`CouchClient`] used by the tests in place of a live node.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::database::types::{
    AllDocsParams, Change, ChangesItem, ChangesRequest, ChangesResult, DBInfo, FindParams,
    FindResult, SearchParams, SearchResult, SearchRow, ViewParams, ViewResult, ViewRow,
};
use crate::database::CouchClient;
use crate::error::{CouchDBError, LoungeError};

type ChangesFallback = Box<dyn Fn() -> Result<ChangesResult, LoungeError> + Send + Sync>;

/// Plays queued responses back one request at a time and records every
/// request it served. An exhausted queue answers with a terminal `400` so a
/// test that over-consumes fails instead of spinning.
#[derive(Default)]
pub(crate) struct FakeCouch {
    timeout: Option<Duration>,
    pub(crate) info: Mutex<VecDeque<Result<DBInfo, LoungeError>>>,
    pub(crate) info_calls: Mutex<usize>,
    pub(crate) changes: Mutex<VecDeque<Result<ChangesResult, LoungeError>>>,
    pub(crate) changes_fallback: Mutex<Option<ChangesFallback>>,
    pub(crate) changes_seen: Mutex<Vec<ChangesRequest>>,
    pub(crate) views: Mutex<VecDeque<Result<ViewResult, LoungeError>>>,
    pub(crate) all_docs_seen: Mutex<Vec<AllDocsParams>>,
    pub(crate) view_seen: Mutex<Vec<ViewParams>>,
    pub(crate) finds: Mutex<VecDeque<Result<FindResult, LoungeError>>>,
    pub(crate) find_seen: Mutex<Vec<FindParams>>,
    pub(crate) searches: Mutex<VecDeque<Result<SearchResult, LoungeError>>>,
    pub(crate) search_seen: Mutex<Vec<SearchParams>>,
    pub(crate) partitions_seen: Mutex<Vec<String>>,
}

impl FakeCouch {
    pub(crate) fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn with_timeout(timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            timeout: Some(timeout),
            ..Self::default()
        })
    }

    pub(crate) fn push_info(&self, result: Result<DBInfo, LoungeError>) {
        self.info.lock().unwrap().push_back(result);
    }

    pub(crate) fn push_changes(&self, result: Result<ChangesResult, LoungeError>) {
        self.changes.lock().unwrap().push_back(result);
    }

    pub(crate) fn set_changes_fallback<F>(&self, fallback: F)
    where
        F: Fn() -> Result<ChangesResult, LoungeError> + Send + Sync + 'static,
    {
        *self.changes_fallback.lock().unwrap() = Some(Box::new(fallback));
    }

    pub(crate) fn push_view(&self, result: Result<ViewResult, LoungeError>) {
        self.views.lock().unwrap().push_back(result);
    }

    pub(crate) fn push_find(&self, result: Result<FindResult, LoungeError>) {
        self.finds.lock().unwrap().push_back(result);
    }

    pub(crate) fn push_search(&self, result: Result<SearchResult, LoungeError>) {
        self.searches.lock().unwrap().push_back(result);
    }
}

fn exhausted() -> LoungeError {
    LoungeError::CouchError(
        CouchDBError {
            error: "script_exhausted".to_string(),
            reason: "the test queued fewer responses than the code requested".to_string(),
        },
        400,
    )
}

#[async_trait]
impl CouchClient for Arc<FakeCouch> {
    fn read_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn get_database_information(&self, _db: &str) -> Result<DBInfo, LoungeError> {
        *self.info_calls.lock().unwrap() += 1;
        self.info.lock().unwrap().pop_front().unwrap_or_else(|| Err(exhausted()))
    }

    async fn post_changes(&self, request: &ChangesRequest) -> Result<ChangesResult, LoungeError> {
        self.changes_seen.lock().unwrap().push(request.clone());
        let scripted = self.changes.lock().unwrap().pop_front();
        match scripted {
            Some(result) => result,
            None => match self.changes_fallback.lock().unwrap().as_ref() {
                Some(fallback) => fallback(),
                None => Err(exhausted()),
            },
        }
    }

    async fn post_all_docs(&self, params: &AllDocsParams) -> Result<ViewResult, LoungeError> {
        self.all_docs_seen.lock().unwrap().push(params.clone());
        self.views.lock().unwrap().pop_front().unwrap_or_else(|| Err(exhausted()))
    }

    async fn post_design_docs(&self, params: &AllDocsParams) -> Result<ViewResult, LoungeError> {
        self.all_docs_seen.lock().unwrap().push(params.clone());
        self.views.lock().unwrap().pop_front().unwrap_or_else(|| Err(exhausted()))
    }

    async fn post_find(&self, params: &FindParams) -> Result<FindResult, LoungeError> {
        self.find_seen.lock().unwrap().push(params.clone());
        self.finds.lock().unwrap().pop_front().unwrap_or_else(|| Err(exhausted()))
    }

    async fn post_search(&self, params: &SearchParams) -> Result<SearchResult, LoungeError> {
        self.search_seen.lock().unwrap().push(params.clone());
        self.searches.lock().unwrap().pop_front().unwrap_or_else(|| Err(exhausted()))
    }

    async fn post_view(&self, params: &ViewParams) -> Result<ViewResult, LoungeError> {
        self.view_seen.lock().unwrap().push(params.clone());
        self.views.lock().unwrap().pop_front().unwrap_or_else(|| Err(exhausted()))
    }

    async fn post_partition_all_docs(
        &self,
        partition: &str,
        params: &AllDocsParams,
    ) -> Result<ViewResult, LoungeError> {
        self.partitions_seen.lock().unwrap().push(partition.to_string());
        self.post_all_docs(params).await
    }

    async fn post_partition_find(
        &self,
        partition: &str,
        params: &FindParams,
    ) -> Result<FindResult, LoungeError> {
        self.partitions_seen.lock().unwrap().push(partition.to_string());
        self.post_find(params).await
    }

    async fn post_partition_search(
        &self,
        partition: &str,
        params: &SearchParams,
    ) -> Result<SearchResult, LoungeError> {
        self.partitions_seen.lock().unwrap().push(partition.to_string());
        self.post_search(params).await
    }

    async fn post_partition_view(
        &self,
        partition: &str,
        params: &ViewParams,
    ) -> Result<ViewResult, LoungeError> {
        self.partitions_seen.lock().unwrap().push(partition.to_string());
        self.post_view(params).await
    }
}

pub(crate) fn unauthorized() -> LoungeError {
    LoungeError::CouchError(
        CouchDBError {
            error: "unauthorized".to_string(),
            reason: "You are not authorized to access this db.".to_string(),
        },
        401,
    )
}

pub(crate) fn unavailable() -> LoungeError {
    LoungeError::CouchError(
        CouchDBError {
            error: "service_unavailable".to_string(),
            reason: "try again later".to_string(),
        },
        503,
    )
}

/// A batch of `rows` changes all stamped with `last_seq`
pub(crate) fn some_batch(last_seq: &str, rows: usize, pending: i64) -> ChangesResult {
    let results = (0..rows)
        .map(|row| ChangesItem {
            seq: last_seq.to_string(),
            id: format!("doc-{}", row),
            changes: vec![Change {
                rev: "1-abc".to_string(),
            }],
            deleted: None,
            doc: None,
        })
        .collect();
    ChangesResult {
        results,
        last_seq: last_seq.to_string(),
        pending,
    }
}

/// A batch the server answers with when a long poll times out quietly
pub(crate) fn empty_batch(last_seq: &str, pending: i64) -> ChangesResult {
    ChangesResult {
        results: vec![],
        last_seq: last_seq.to_string(),
        pending,
    }
}

pub(crate) fn view_row(id: &str, key: Value) -> ViewRow {
    ViewRow {
        id: id.to_string(),
        key,
        value: json!({ "rev": "1-abc" }),
        doc: None,
    }
}

pub(crate) fn view_page(rows: Vec<ViewRow>) -> ViewResult {
    ViewResult {
        total_rows: Some(rows.len() as i64),
        offset: Some(0),
        rows,
        update_seq: None,
    }
}

pub(crate) fn docs_page(docs: usize, bookmark: Option<&str>) -> FindResult {
    FindResult {
        docs: (0..docs).map(|doc| json!({ "_id": format!("doc-{}", doc), "_rev": "1-abc" })).collect(),
        bookmark: bookmark.map(|bookmark| bookmark.to_string()),
        warning: None,
        execution_stats: None,
    }
}

pub(crate) fn search_page(rows: usize, bookmark: Option<&str>) -> SearchResult {
    SearchResult {
        total_rows: Some(rows as i64),
        bookmark: bookmark.map(|bookmark| bookmark.to_string()),
        rows: (0..rows)
            .map(|row| SearchRow {
                id: format!("doc-{}", row),
                fields: json!({}),
                highlights: None,
                doc: None,
            })
            .collect(),
    }
}
