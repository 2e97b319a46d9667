use async_trait::async_trait;
use serde_json::Value;

use crate::database::types::{
    AllDocsParams, FindParams, SearchParams, SearchRow, ViewParams, ViewRow,
};
use crate::database::CouchClient;
use crate::error::LoungeError;

/// One fetched page in the shape the shared iterator consumes
pub struct Page<R> {
    pub(crate) rows: Vec<R>,
    pub(crate) bookmark: Option<String>,
}

/// One paginated operation: how to execute a request, pull the rows out of
/// the result and thread the cursor into the next request.
///
/// Bookmark driven operations thread the server issued bookmark, key driven
/// ones set `LOOKAHEAD` and resume from the key and document ID of the first
/// undelivered row.
#[async_trait]
pub trait PagedQuery: Clone + Send + Sync + 'static {
    type Row: Send + 'static;
    /// Key cursor operations fetch one row beyond the page size to learn
    /// whether another page exists without a probe request
    const LOOKAHEAD: bool = false;
    /// Whether adjacent pages must be checked for an ambiguous boundary
    const BOUNDARY_CHECK: bool = false;

    /// Reject params which cannot be combined with pagination
    fn validate(&self) -> Result<(), LoungeError> {
        Ok(())
    }
    /// User supplied page size, if any
    fn limit(&self) -> Option<i64>;
    /// Rows to request on the next call
    fn set_limit(&mut self, limit: i64);
    /// Execute the operation and extract the rows
    async fn fetch(&self, client: &dyn CouchClient) -> Result<Page<Self::Row>, LoungeError>;
    /// Thread the cursor of the fetched page into the params of the next
    /// request. `next` is the popped look-ahead row of key driven operations.
    fn advance(&mut self, bookmark: Option<&str>, next: Option<&Self::Row>);
    /// Error message when the rows joining two pages cannot be told apart
    fn boundary(_last: &Self::Row, _next: &Self::Row) -> Option<String> {
        None
    }
}

fn invalid_param(name: &str, hint: &str) -> LoungeError {
    LoungeError::InvalidArgument(format!(
        "The param '{}' is invalid when using pagination.{}",
        name, hint
    ))
}

/// `key`/`keys` make paging pointless for `_all_docs`, a key is the document ID
fn docs_key_rejections(params: &AllDocsParams) -> Result<(), LoungeError> {
    if params.keys.is_some() {
        return Err(invalid_param("keys", ""));
    }
    if params.key.is_some() {
        return Err(invalid_param(
            "key",
            " No need to paginate as 'key' returns a single result for an ID.",
        ));
    }
    Ok(())
}

fn view_key_rejections(params: &ViewParams) -> Result<(), LoungeError> {
    if params.keys.is_some() {
        return Err(invalid_param("keys", ""));
    }
    if params.key.is_some() {
        return Err(invalid_param(
            "key",
            " Use 'start_key' and 'end_key' instead.",
        ));
    }
    Ok(())
}

/// Facets and grouping change the response shape so that bookmark paging no
/// longer applies
fn search_facet_rejections(params: &SearchParams) -> Result<(), LoungeError> {
    let mut invalid = vec![];
    if params.counts.is_some() {
        invalid.push("counts");
    }
    if params.group_field.is_some() {
        invalid.push("group_field");
    }
    if params.group_limit.is_some() {
        invalid.push("group_limit");
    }
    if params.group_sort.is_some() {
        invalid.push("group_sort");
    }
    if params.ranges.is_some() {
        invalid.push("ranges");
    }
    match invalid.len() {
        0 => Ok(()),
        1 => Err(invalid_param(invalid[0], "")),
        _ => {
            let names = invalid
                .iter()
                .map(|name| format!("'{}'", name))
                .collect::<Vec<String>>()
                .join(", ");
            Err(LoungeError::InvalidArgument(format!(
                "The params {} are invalid when using pagination.",
                names
            )))
        }
    }
}

fn view_boundary(last: &ViewRow, next: &ViewRow) -> Option<String> {
    if last.id == next.id && last.key == next.key {
        Some(format!(
            "Cannot paginate on a boundary containing identical keys '{}' and document IDs '{}'",
            next.key, next.id
        ))
    } else {
        None
    }
}

fn advance_start_key(params: &mut AllDocsParams, next: Option<&ViewRow>) {
    if let Some(row) = next {
        params.start_key = row.key.as_str().map(|key| key.to_string());
        // skip is only honored once, on the first page
        params.skip = None;
    }
}

fn advance_view_keys(params: &mut ViewParams, next: Option<&ViewRow>) {
    if let Some(row) = next {
        params.start_key = Some(row.key.clone());
        params.start_key_doc_id = Some(row.id.clone());
        params.skip = None;
    }
}

/// `_all_docs`, key cursor. Keys are document IDs so a duplicated boundary
/// cannot happen and no check is performed.
#[derive(Debug, Clone)]
pub struct AllDocsPages(pub(crate) AllDocsParams);

#[async_trait]
impl PagedQuery for AllDocsPages {
    type Row = ViewRow;
    const LOOKAHEAD: bool = true;

    fn validate(&self) -> Result<(), LoungeError> {
        docs_key_rejections(&self.0)
    }
    fn limit(&self) -> Option<i64> {
        self.0.limit
    }
    fn set_limit(&mut self, limit: i64) {
        self.0.limit = Some(limit);
    }
    async fn fetch(&self, client: &dyn CouchClient) -> Result<Page<ViewRow>, LoungeError> {
        let result = client.post_all_docs(&self.0).await?;
        Ok(Page {
            rows: result.rows,
            bookmark: None,
        })
    }
    fn advance(&mut self, _bookmark: Option<&str>, next: Option<&ViewRow>) {
        advance_start_key(&mut self.0, next);
    }
}

/// `_design_docs`, key cursor
#[derive(Debug, Clone)]
pub struct DesignDocsPages(pub(crate) AllDocsParams);

#[async_trait]
impl PagedQuery for DesignDocsPages {
    type Row = ViewRow;
    const LOOKAHEAD: bool = true;

    fn validate(&self) -> Result<(), LoungeError> {
        docs_key_rejections(&self.0)
    }
    fn limit(&self) -> Option<i64> {
        self.0.limit
    }
    fn set_limit(&mut self, limit: i64) {
        self.0.limit = Some(limit);
    }
    async fn fetch(&self, client: &dyn CouchClient) -> Result<Page<ViewRow>, LoungeError> {
        let result = client.post_design_docs(&self.0).await?;
        Ok(Page {
            rows: result.rows,
            bookmark: None,
        })
    }
    fn advance(&mut self, _bookmark: Option<&str>, next: Option<&ViewRow>) {
        advance_start_key(&mut self.0, next);
    }
}

/// `_all_docs` of one partition, key cursor
#[derive(Debug, Clone)]
pub struct PartitionAllDocsPages {
    pub(crate) partition: String,
    pub(crate) params: AllDocsParams,
}

#[async_trait]
impl PagedQuery for PartitionAllDocsPages {
    type Row = ViewRow;
    const LOOKAHEAD: bool = true;

    fn validate(&self) -> Result<(), LoungeError> {
        docs_key_rejections(&self.params)
    }
    fn limit(&self) -> Option<i64> {
        self.params.limit
    }
    fn set_limit(&mut self, limit: i64) {
        self.params.limit = Some(limit);
    }
    async fn fetch(&self, client: &dyn CouchClient) -> Result<Page<ViewRow>, LoungeError> {
        let result = client
            .post_partition_all_docs(&self.partition, &self.params)
            .await?;
        Ok(Page {
            rows: result.rows,
            bookmark: None,
        })
    }
    fn advance(&mut self, _bookmark: Option<&str>, next: Option<&ViewRow>) {
        advance_start_key(&mut self.params, next);
    }
}

/// `_view`, key cursor with the boundary check
#[derive(Debug, Clone)]
pub struct ViewPages(pub(crate) ViewParams);

#[async_trait]
impl PagedQuery for ViewPages {
    type Row = ViewRow;
    const LOOKAHEAD: bool = true;
    const BOUNDARY_CHECK: bool = true;

    fn validate(&self) -> Result<(), LoungeError> {
        view_key_rejections(&self.0)
    }
    fn limit(&self) -> Option<i64> {
        self.0.limit
    }
    fn set_limit(&mut self, limit: i64) {
        self.0.limit = Some(limit);
    }
    async fn fetch(&self, client: &dyn CouchClient) -> Result<Page<ViewRow>, LoungeError> {
        let result = client.post_view(&self.0).await?;
        Ok(Page {
            rows: result.rows,
            bookmark: None,
        })
    }
    fn advance(&mut self, _bookmark: Option<&str>, next: Option<&ViewRow>) {
        advance_view_keys(&mut self.0, next);
    }
    fn boundary(last: &ViewRow, next: &ViewRow) -> Option<String> {
        view_boundary(last, next)
    }
}

/// `_view` of one partition, key cursor with the boundary check
#[derive(Debug, Clone)]
pub struct PartitionViewPages {
    pub(crate) partition: String,
    pub(crate) params: ViewParams,
}

#[async_trait]
impl PagedQuery for PartitionViewPages {
    type Row = ViewRow;
    const LOOKAHEAD: bool = true;
    const BOUNDARY_CHECK: bool = true;

    fn validate(&self) -> Result<(), LoungeError> {
        view_key_rejections(&self.params)
    }
    fn limit(&self) -> Option<i64> {
        self.params.limit
    }
    fn set_limit(&mut self, limit: i64) {
        self.params.limit = Some(limit);
    }
    async fn fetch(&self, client: &dyn CouchClient) -> Result<Page<ViewRow>, LoungeError> {
        let result = client
            .post_partition_view(&self.partition, &self.params)
            .await?;
        Ok(Page {
            rows: result.rows,
            bookmark: None,
        })
    }
    fn advance(&mut self, _bookmark: Option<&str>, next: Option<&ViewRow>) {
        advance_view_keys(&mut self.params, next);
    }
    fn boundary(last: &ViewRow, next: &ViewRow) -> Option<String> {
        view_boundary(last, next)
    }
}

/// `_find`, bookmark cursor
#[derive(Debug, Clone)]
pub struct FindPages(pub(crate) FindParams);

#[async_trait]
impl PagedQuery for FindPages {
    type Row = Value;

    fn limit(&self) -> Option<i64> {
        self.0.limit
    }
    fn set_limit(&mut self, limit: i64) {
        self.0.limit = Some(limit);
    }
    async fn fetch(&self, client: &dyn CouchClient) -> Result<Page<Value>, LoungeError> {
        let result = client.post_find(&self.0).await?;
        Ok(Page {
            rows: result.docs,
            bookmark: result.bookmark,
        })
    }
    fn advance(&mut self, bookmark: Option<&str>, _next: Option<&Value>) {
        if let Some(bookmark) = bookmark {
            self.0.bookmark = Some(bookmark.to_string());
        }
        // skip is only honored once, on the first page
        self.0.skip = None;
    }
}

/// `_find` of one partition, bookmark cursor
#[derive(Debug, Clone)]
pub struct PartitionFindPages {
    pub(crate) partition: String,
    pub(crate) params: FindParams,
}

#[async_trait]
impl PagedQuery for PartitionFindPages {
    type Row = Value;

    fn limit(&self) -> Option<i64> {
        self.params.limit
    }
    fn set_limit(&mut self, limit: i64) {
        self.params.limit = Some(limit);
    }
    async fn fetch(&self, client: &dyn CouchClient) -> Result<Page<Value>, LoungeError> {
        let result = client
            .post_partition_find(&self.partition, &self.params)
            .await?;
        Ok(Page {
            rows: result.docs,
            bookmark: result.bookmark,
        })
    }
    fn advance(&mut self, bookmark: Option<&str>, _next: Option<&Value>) {
        if let Some(bookmark) = bookmark {
            self.params.bookmark = Some(bookmark.to_string());
        }
        self.params.skip = None;
    }
}

/// `_search`, bookmark cursor. Facets and grouping are rejected, they change
/// the response shape.
#[derive(Debug, Clone)]
pub struct SearchPages(pub(crate) SearchParams);

#[async_trait]
impl PagedQuery for SearchPages {
    type Row = SearchRow;

    fn validate(&self) -> Result<(), LoungeError> {
        search_facet_rejections(&self.0)
    }
    fn limit(&self) -> Option<i64> {
        self.0.limit
    }
    fn set_limit(&mut self, limit: i64) {
        self.0.limit = Some(limit);
    }
    async fn fetch(&self, client: &dyn CouchClient) -> Result<Page<SearchRow>, LoungeError> {
        let result = client.post_search(&self.0).await?;
        Ok(Page {
            rows: result.rows,
            bookmark: result.bookmark,
        })
    }
    fn advance(&mut self, bookmark: Option<&str>, _next: Option<&SearchRow>) {
        if let Some(bookmark) = bookmark {
            self.0.bookmark = Some(bookmark.to_string());
        }
    }
}

/// `_search` of one partition, bookmark cursor. Partition search indexes do
/// not support facets, there is nothing to reject.
#[derive(Debug, Clone)]
pub struct PartitionSearchPages {
    pub(crate) partition: String,
    pub(crate) params: SearchParams,
}

#[async_trait]
impl PagedQuery for PartitionSearchPages {
    type Row = SearchRow;

    fn limit(&self) -> Option<i64> {
        self.params.limit
    }
    fn set_limit(&mut self, limit: i64) {
        self.params.limit = Some(limit);
    }
    async fn fetch(&self, client: &dyn CouchClient) -> Result<Page<SearchRow>, LoungeError> {
        let result = client
            .post_partition_search(&self.partition, &self.params)
            .await?;
        Ok(Page {
            rows: result.rows,
            bookmark: result.bookmark,
        })
    }
    fn advance(&mut self, bookmark: Option<&str>, _next: Option<&SearchRow>) {
        if let Some(bookmark) = bookmark {
            self.params.bookmark = Some(bookmark.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(id: &str, key: Value) -> ViewRow {
        ViewRow {
            id: id.to_string(),
            key,
            value: json!({ "rev": "1-abc" }),
            doc: None,
        }
    }

    #[test]
    fn all_docs_rejects_key_and_keys() {
        let err = AllDocsPages(AllDocsParams::new("my_db").key("a"))
            .validate()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The param 'key' is invalid when using pagination. No need to paginate as 'key' returns a single result for an ID."
        );

        let err = AllDocsPages(AllDocsParams::new("my_db").keys(vec!["a", "b"]))
            .validate()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The param 'keys' is invalid when using pagination."
        );
    }

    #[test]
    fn views_point_at_the_range_params_instead_of_key() {
        let err = ViewPages(ViewParams::new("my_db", "ddoc", "by_year").key(json!(2021)))
            .validate()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The param 'key' is invalid when using pagination. Use 'start_key' and 'end_key' instead."
        );
    }

    #[test]
    fn search_rejects_every_facet_param_at_once() {
        let params = SearchParams::new("my_db", "ddoc", "idx", "*:*")
            .counts(vec!["type"])
            .ranges(json!({ "price": { "cheap": "[0 TO 100]" } }));
        let err = SearchPages(params).validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "The params 'counts', 'ranges' are invalid when using pagination."
        );

        let single = SearchParams::new("my_db", "ddoc", "idx", "*:*").group_field("type");
        let err = SearchPages(single).validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "The param 'group_field' is invalid when using pagination."
        );
    }

    #[test]
    fn partition_search_keeps_facets() {
        let params = SearchParams::new("my_db", "ddoc", "idx", "*:*").counts(vec!["type"]);
        let paged = PartitionSearchPages {
            partition: "p1".to_string(),
            params,
        };
        assert!(paged.validate().is_ok());
    }

    #[test]
    fn find_threads_the_bookmark_and_drops_skip() {
        let mut paged = FindPages(FindParams::new("my_db", json!({ "year": 2021 })).skip(10));
        paged.advance(Some("bm-1"), None);
        assert_eq!(paged.0.bookmark.as_deref(), Some("bm-1"));
        assert_eq!(paged.0.skip, None);
    }

    #[test]
    fn views_resume_from_the_popped_row() {
        let mut paged = ViewPages(ViewParams::new("my_db", "ddoc", "by_year").skip(3));
        let popped = row("doc-9", json!([2021, "a"]));
        paged.advance(None, Some(&popped));
        assert_eq!(paged.0.start_key, Some(json!([2021, "a"])));
        assert_eq!(paged.0.start_key_doc_id.as_deref(), Some("doc-9"));
        assert_eq!(paged.0.skip, None);
    }

    #[test]
    fn all_docs_resume_from_the_popped_id() {
        let mut paged = AllDocsPages(AllDocsParams::new("my_db").skip(3));
        let popped = row("doc-9", json!("doc-9"));
        paged.advance(None, Some(&popped));
        assert_eq!(paged.0.start_key.as_deref(), Some("doc-9"));
        assert_eq!(paged.0.skip, None);
    }

    #[test]
    fn identical_rows_make_an_ambiguous_boundary() {
        let last = row("a", json!(1));
        let next = row("a", json!(1));
        assert_eq!(
            view_boundary(&last, &next).unwrap(),
            "Cannot paginate on a boundary containing identical keys '1' and document IDs 'a'"
        );

        // same key under a different document is a fine boundary
        assert!(view_boundary(&row("a", json!(1)), &row("b", json!(1))).is_none());
        // deep equality on structured keys
        let last = row("a", json!({ "year": 2021 }));
        let next = row("a", json!({ "year": 2021 }));
        assert!(view_boundary(&last, &next).is_some());
    }
}
