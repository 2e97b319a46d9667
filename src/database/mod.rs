pub mod types;
use std::time::Duration;

use crate::error::{CouchDBError, LoungeError};
use crate::{Lounge, ParseQueryParams};
use types::{
    AllDocsParams, ChangesRequest, ChangesResult, DBInfo, FindParams, FindResult, SearchParams,
    SearchResult, ViewParams, ViewResult,
};

use async_trait::async_trait;
use serde_json::Value;

/// The request operations consumed by the changes follower and the pagination
/// engine. [`Lounge`] is the real implementation, tests script their own.
///
/// Implementations must be safe to share between independent iterators, every
/// method only borrows `&self`.
#[async_trait]
pub trait CouchClient: Send + Sync {
    /// Read timeout the client was configured with, `None` when requests can
    /// wait on the server indefinitely
    fn read_timeout(&self) -> Option<Duration> {
        None
    }

    /// Get database information
    ///
    /// More [info](https://docs.couchdb.org/en/stable/api/database/common.html#get--db)
    async fn get_database_information(&self, db: &str) -> Result<DBInfo, LoungeError>;

    /// Request one batch from the database's `_changes` resource
    ///
    /// More [info](https://docs.couchdb.org/en/stable/api/database/changes.html)
    async fn post_changes(&self, request: &ChangesRequest) -> Result<ChangesResult, LoungeError>;

    /// List documents stored on database using the `_all_docs` view
    ///
    /// More [info](https://docs.couchdb.org/en/stable/api/database/bulk-api.html#post--db-_all_docs)
    async fn post_all_docs(&self, params: &AllDocsParams) -> Result<ViewResult, LoungeError>;

    /// List design documents using the `_design_docs` view
    ///
    /// More [info](https://docs.couchdb.org/en/stable/api/database/bulk-api.html#post--db-_design_docs)
    async fn post_design_docs(&self, params: &AllDocsParams) -> Result<ViewResult, LoungeError>;

    /// Find documents using a declarative JSON querying syntax
    ///
    /// More [info](https://docs.couchdb.org/en/stable/api/database/find.html#db-find)
    async fn post_find(&self, params: &FindParams) -> Result<FindResult, LoungeError>;

    /// Query a search index
    async fn post_search(&self, params: &SearchParams) -> Result<SearchResult, LoungeError>;

    /// Query a view of a design document
    ///
    /// More [info](https://docs.couchdb.org/en/stable/api/ddoc/views.html#post--db-_design-ddoc-_view-view)
    async fn post_view(&self, params: &ViewParams) -> Result<ViewResult, LoungeError>;

    /// List documents of a single partition using the `_all_docs` view
    async fn post_partition_all_docs(
        &self,
        partition: &str,
        params: &AllDocsParams,
    ) -> Result<ViewResult, LoungeError>;

    /// Find documents of a single partition
    async fn post_partition_find(
        &self,
        partition: &str,
        params: &FindParams,
    ) -> Result<FindResult, LoungeError>;

    /// Query a search index over a single partition
    async fn post_partition_search(
        &self,
        partition: &str,
        params: &SearchParams,
    ) -> Result<SearchResult, LoungeError>;

    /// Query a view of a design document over a single partition
    async fn post_partition_view(
        &self,
        partition: &str,
        params: &ViewParams,
    ) -> Result<ViewResult, LoungeError>;
}

#[async_trait]
impl CouchClient for Lounge {
    fn read_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn get_database_information(&self, db: &str) -> Result<DBInfo, LoungeError> {
        let url = format!("{}/{}", self.url, db);
        let response = self.client.get(url.as_str()).send().await?;
        // check the status code if it's in range from 200-299
        let status = response.status().is_success();
        let status_code = response.status().as_u16();
        // parse the response body
        let body = response.json::<Value>().await?;

        match status {
            true => {
                let body: DBInfo = serde_json::from_value(body)?;
                Ok(body)
            }
            false => {
                let body: CouchDBError = serde_json::from_value(body)?;
                Err(LoungeError::CouchError(body, status_code))
            }
        }
    }

    async fn post_changes(&self, request: &ChangesRequest) -> Result<ChangesResult, LoungeError> {
        let formated_url = format!(
            "{}/{}/_changes?{}",
            self.url,
            request.db,
            request.query.parse_params()
        );
        let response = self
            .client
            .post(&formated_url)
            .json(&request.body)
            .send()
            .await?;
        // check the status code if it's in range from 200-299
        let status = response.status().is_success();
        let status_code = response.status().as_u16();
        // parse the response body
        let body = response.json::<Value>().await?;
        match status {
            true => {
                let body: ChangesResult = serde_json::from_value(body)?;
                Ok(body)
            }
            false => {
                let body: CouchDBError = serde_json::from_value(body)?;
                Err(LoungeError::CouchError(body, status_code))
            }
        }
    }

    async fn post_all_docs(&self, params: &AllDocsParams) -> Result<ViewResult, LoungeError> {
        let formated_url = format!("{}/{}/_all_docs", self.url, params.db);
        self.query_rows(&formated_url, params).await
    }

    async fn post_design_docs(&self, params: &AllDocsParams) -> Result<ViewResult, LoungeError> {
        let formated_url = format!("{}/{}/_design_docs", self.url, params.db);
        self.query_rows(&formated_url, params).await
    }

    async fn post_find(&self, params: &FindParams) -> Result<FindResult, LoungeError> {
        let formated_url = format!("{}/{}/_find", self.url, params.db);
        self.query_rows(&formated_url, params).await
    }

    async fn post_search(&self, params: &SearchParams) -> Result<SearchResult, LoungeError> {
        let formated_url = format!(
            "{}/{}/_design/{}/_search/{}",
            self.url, params.db, params.ddoc, params.index
        );
        self.query_rows(&formated_url, params).await
    }

    async fn post_view(&self, params: &ViewParams) -> Result<ViewResult, LoungeError> {
        let formated_url = format!(
            "{}/{}/_design/{}/_view/{}",
            self.url, params.db, params.ddoc, params.view
        );
        self.query_rows(&formated_url, params).await
    }

    async fn post_partition_all_docs(
        &self,
        partition: &str,
        params: &AllDocsParams,
    ) -> Result<ViewResult, LoungeError> {
        let formated_url = format!(
            "{}/{}/_partition/{}/_all_docs",
            self.url, params.db, partition
        );
        self.query_rows(&formated_url, params).await
    }

    async fn post_partition_find(
        &self,
        partition: &str,
        params: &FindParams,
    ) -> Result<FindResult, LoungeError> {
        let formated_url = format!("{}/{}/_partition/{}/_find", self.url, params.db, partition);
        self.query_rows(&formated_url, params).await
    }

    async fn post_partition_search(
        &self,
        partition: &str,
        params: &SearchParams,
    ) -> Result<SearchResult, LoungeError> {
        let formated_url = format!(
            "{}/{}/_partition/{}/_design/{}/_search/{}",
            self.url, params.db, partition, params.ddoc, params.index
        );
        self.query_rows(&formated_url, params).await
    }

    async fn post_partition_view(
        &self,
        partition: &str,
        params: &ViewParams,
    ) -> Result<ViewResult, LoungeError> {
        let formated_url = format!(
            "{}/{}/_partition/{}/_design/{}/_view/{}",
            self.url, params.db, partition, params.ddoc, params.view
        );
        self.query_rows(&formated_url, params).await
    }
}

impl Lounge {
    /// POST a query body to a rows returning endpoint and parse the result
    async fn query_rows<P, R>(&self, url: &str, params: &P) -> Result<R, LoungeError>
    where
        P: serde::Serialize + Sync,
        R: serde::de::DeserializeOwned,
    {
        let response = self.client.post(url).json(params).send().await?;
        // check the status code if it's in range from 200-299
        let status = response.status().is_success();
        let status_code = response.status().as_u16();
        // parse the response body
        let body = response.json::<Value>().await?;

        match status {
            true => {
                let body: R = serde_json::from_value(body)?;
                Ok(body)
            }
            false => {
                let body: CouchDBError = serde_json::from_value(body)?;
                Err(LoungeError::CouchError(body, status_code))
            }
        }
    }
}
