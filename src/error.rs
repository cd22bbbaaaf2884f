//! Error types for the server client and the fragment contract

use thiserror::Error;

/// Failures talking to the corpus server
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: &'static str, status: u16 },

    #[error("could not decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// A server fragment that does not have the shape the page model expects
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FragmentError {
    #[error("fragment has {found} top-level nodes, node {index} is required")]
    MissingNode { index: usize, found: usize },

    #[error("top-level node {index} is not an element")]
    NotAnElement { index: usize },

    #[error("expected an <li> example element, found <{tag}>")]
    NotAListItem { tag: String },

    #[error("example element has no id attribute")]
    MissingId,

    #[error("fragment contains no <li> example element")]
    NoListItem,
}
