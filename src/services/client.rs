//! HTTP client for the corpus server
//!
//! Every endpoint is a GET with query-string parameters. List endpoints
//! answer JSON arrays; the example, pick and search endpoints answer HTML.

use crate::error::ClientError;
use serde_json::Value;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!("lingcorp-tui/", env!("CARGO_PKG_VERSION"));

/// Operations the controllers need from the corpus server
pub trait CorpusClient: Send + Sync {
    /// Text identifiers for the text selector (`/texts`)
    fn texts(&self) -> Result<Vec<String>, ClientError>;

    /// Ordered example identifiers of a text (`/textrecords`)
    fn text_records(&self, text_id: &str) -> Result<Vec<String>, ClientError>;

    /// Rendered fragment of one example (`/example`)
    fn example(&self, example_id: &str) -> Result<String, ClientError>;

    /// Persist an edited field value (`/update`)
    fn update(&self, target: &str, value: &str) -> Result<(), ClientError>;

    /// Persist a dropdown choice, returning the re-rendered fragment (`/pick`)
    fn pick(&self, target: &str, choice: &str) -> Result<String, ClientError>;

    /// Ask the server to write its export (`/export`)
    fn export(&self) -> Result<(), ClientError>;

    /// Data files available for concordance search (`/data`)
    fn data_files(&self) -> Result<Vec<String>, ClientError>;

    /// Run a concordance query against one data file (`/search`)
    fn search(&self, query: &str, filename: &str) -> Result<String, ClientError>;
}

pub struct HttpCorpusClient {
    base: Url,
    http: reqwest::blocking::Client,
}

impl HttpCorpusClient {
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let mut base = Url::parse(server_url.trim()).map_err(|source| ClientError::InvalidUrl {
            url: server_url.to_string(),
            source,
        })?;
        // endpoints are joined relative to the base path
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self { base, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn get(&self, endpoint: &'static str, params: &[(&str, &str)]) -> Result<String, ClientError> {
        let url = self
            .base
            .join(endpoint)
            .map_err(|source| ClientError::InvalidUrl {
                url: format!("{}{}", self.base, endpoint),
                source,
            })?;

        tracing::debug!(endpoint, ?params, "GET");
        let response = self
            .http
            .get(url)
            .query(params)
            .send()
            .map_err(|source| ClientError::Transport { endpoint, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        response
            .text()
            .map_err(|source| ClientError::Transport { endpoint, source })
    }

    fn get_list(&self, endpoint: &'static str, params: &[(&str, &str)]) -> Result<Vec<String>, ClientError> {
        let body = self.get(endpoint, params)?;
        parse_list(endpoint, &body)
    }
}

/// Decode a JSON list of identifiers. The server answers `None` when it has
/// no data, which reads as an empty list.
pub fn parse_list(endpoint: &'static str, body: &str) -> Result<Vec<String>, ClientError> {
    let body = body.trim();
    if body.is_empty() || body == "None" {
        tracing::warn!(endpoint, "server has no data, treating as empty list");
        return Ok(Vec::new());
    }

    let values: Vec<Value> =
        serde_json::from_str(body).map_err(|source| ClientError::Decode { endpoint, source })?;

    Ok(values
        .into_iter()
        .map(|v| match v {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect())
}

/// Encode a search parameter as a JSON string literal
pub fn json_param(value: &str) -> String {
    Value::from(value).to_string()
}

impl CorpusClient for HttpCorpusClient {
    fn texts(&self) -> Result<Vec<String>, ClientError> {
        self.get_list("texts", &[])
    }

    fn text_records(&self, text_id: &str) -> Result<Vec<String>, ClientError> {
        self.get_list("textrecords", &[("textID", text_id)])
    }

    fn example(&self, example_id: &str) -> Result<String, ClientError> {
        self.get("example", &[("id", example_id)])
    }

    fn update(&self, target: &str, value: &str) -> Result<(), ClientError> {
        let body = self.get("update", &[("value", value), ("target", target)])?;
        if let Ok(receipt) = serde_json::from_str::<Value>(&body) {
            if let Some(record) = receipt.get("updated").and_then(Value::as_str) {
                tracing::debug!(record, target, "record updated");
            }
        }
        Ok(())
    }

    fn pick(&self, target: &str, choice: &str) -> Result<String, ClientError> {
        self.get("pick", &[("target", target), ("choice", choice)])
    }

    fn export(&self) -> Result<(), ClientError> {
        self.get("export", &[]).map(|_| ())
    }

    fn data_files(&self) -> Result<Vec<String>, ClientError> {
        self.get_list("data", &[])
    }

    fn search(&self, query: &str, filename: &str) -> Result<String, ClientError> {
        let query = json_param(query);
        let filename = json_param(filename);
        self.get("search", &[("query", &query), ("filename", &filename)])
    }
}
