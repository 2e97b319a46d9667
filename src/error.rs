use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoungeError {
    #[error("unable to connect to db")]
    InvalidUrlOrPort(#[from] reqwest::Error),
    #[error("Status Code: {1}, Meaning: {}, the reason is: {}", .0.error, .0.reason)]
    CouchError(CouchDBError, u16),
    #[error("Unable to parse json: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("{0}")]
    GenericCouchdbError(Value),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    IllegalState(String),
    #[error("{0}")]
    BoundaryFailure(String),
}

impl LoungeError {
    /// Status codes which indicate a misconfigured request or failed
    /// authentication, retrying those can never succeed. Every other
    /// failure is transient.
    pub fn is_terminal(&self) -> bool {
        match self {
            LoungeError::CouchError(_, status) => matches!(*status, 400 | 401 | 403 | 404),
            _ => false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CouchDBError {
    pub error: String,
    pub reason: String,
}
