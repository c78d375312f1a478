//! Error types shared by the REST storage implementation.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`RestDaoError`] failures.
pub type RestResult<T> = Result<T, RestDaoError>;

/// Failures that can occur while talking to the REST backend.
#[derive(Debug, Error)]
pub enum RestDaoError {
    /// Required environment variable is missing.
    #[error("missing REST backend environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build REST backend client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request could not be sent.
    #[error("failed to send REST backend request to `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The backend answered with an unexpected status code.
    #[error("unexpected REST backend response status {status} for `{path}`: {body}")]
    RequestStatus {
        path: String,
        status: StatusCode,
        body: String,
    },
    /// Response payload could not be parsed into JSON rows.
    #[error("failed to decode REST backend response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// An insert returned no representation of the new row.
    #[error("REST backend returned no row for insert into `{path}`")]
    EmptyInsert { path: String },
}
