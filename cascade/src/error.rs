use thiserror::Error;

/// Failure modes of a single fetch, as surfaced to the user.
///
/// An empty option list or result set is *not* an error; it is reported
/// through the flow's informational messages instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The backend could not be reached at all.
    #[error("network error: {0}")]
    Transport(String),

    /// The backend answered with a non-2xx status.
    #[error("HTTP error! status: {status}. Details: {body}")]
    Http { status: u16, body: String },

    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The response body could not be decoded into the expected shape.
    #[error("invalid response payload: {0}")]
    Decode(String),

    /// A structured `{error}` message returned by the backend.
    #[error("{0}")]
    Backend(String),
}
