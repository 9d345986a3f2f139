/// Errors raised while talking to the identity provider.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The provider client could not be built from its configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport failure, including the request timeout.
    #[error("{operation} request failed: {source}")]
    Http {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered with a non-success status.
    #[error("{operation} rejected with status {status}: {detail}")]
    Provider {
        operation: &'static str,
        status: u16,
        detail: String,
    },

    /// The provider answered 2xx but the body was not the expected JSON.
    #[error("{operation} returned an undecodable body: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The body decoded, but a field this crate relies on was empty.
    #[error("{operation} response has an empty `{field}`")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },
}
