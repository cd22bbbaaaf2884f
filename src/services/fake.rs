//! In-memory corpus server for controller tests

use crate::error::ClientError;
use crate::services::client::{json_param, CorpusClient};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Texts,
    TextRecords(String),
    Example(String),
    Update { target: String, value: String },
    Pick { target: String, choice: String },
    Export,
    DataFiles,
    /// Parameters as they would go on the wire
    Search { query: String, filename: String },
}

#[derive(Default)]
pub struct FakeClient {
    pub texts: Vec<String>,
    pub records: HashMap<String, Vec<String>>,
    pub examples: Mutex<HashMap<String, String>>,
    pub picks: HashMap<String, String>,
    pub files: Vec<String>,
    pub search_body: String,
    /// Endpoints that fail with HTTP 500
    pub failing: HashSet<&'static str>,
    calls: Mutex<Vec<Call>>,
}

/// Fragment in the server's shape: whitespace node, then the example
pub fn record(id: &str, word: &str, gloss: &str) -> String {
    format!(
        "\n<li class=\"example\" id=\"{id}\">\n  <div class=\"obj\">{word}</div>\n  <div class=\"ann\"><input id=\"{id}_gls_0\" value=\"{gloss}\" placeholder=\"gls\">\n    <div class=\"dropdown\"><button class=\"dropdown-toggle\">{word}</button>\n      <ul class=\"dropdown-menu\"><li><a id=\"{id}_ana_0_0\">{gloss}</a></li><li><a id=\"{id}_ana_0_1\">?</a></li></ul>\n    </div>\n  </div>\n  <input id=\"{id}_oft\" value=\"\" placeholder=\"translation\">\n</li>\n"
    )
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// A text `t1` with the given example ids, each with a rendered record
    pub fn with_text(ids: &[&str]) -> Self {
        let mut fake = Self::new();
        fake.texts = vec!["t1".to_string()];
        fake.records
            .insert("t1".to_string(), ids.iter().map(|s| s.to_string()).collect());
        fake.examples = Mutex::new(
            ids.iter()
                .map(|id| (id.to_string(), record(id, "ni", "1SG")))
                .collect(),
        );
        fake
    }

    pub fn set_example(&self, id: &str, html: String) {
        self.examples.lock().unwrap().insert(id.to_string(), html);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record_call(&self, endpoint: &'static str, call: Call) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(call);
        if self.failing.contains(endpoint) {
            return Err(ClientError::Status {
                endpoint,
                status: 500,
            });
        }
        Ok(())
    }
}

impl CorpusClient for FakeClient {
    fn texts(&self) -> Result<Vec<String>, ClientError> {
        self.record_call("texts", Call::Texts)?;
        Ok(self.texts.clone())
    }

    fn text_records(&self, text_id: &str) -> Result<Vec<String>, ClientError> {
        self.record_call("textrecords", Call::TextRecords(text_id.to_string()))?;
        Ok(self.records.get(text_id).cloned().unwrap_or_default())
    }

    fn example(&self, example_id: &str) -> Result<String, ClientError> {
        self.record_call("example", Call::Example(example_id.to_string()))?;
        Ok(self
            .examples
            .lock()
            .unwrap()
            .get(example_id)
            .cloned()
            .unwrap_or_default())
    }

    fn update(&self, target: &str, value: &str) -> Result<(), ClientError> {
        self.record_call(
            "update",
            Call::Update {
                target: target.to_string(),
                value: value.to_string(),
            },
        )
    }

    fn pick(&self, target: &str, choice: &str) -> Result<String, ClientError> {
        self.record_call(
            "pick",
            Call::Pick {
                target: target.to_string(),
                choice: choice.to_string(),
            },
        )?;
        Ok(self.picks.get(target).cloned().unwrap_or_default())
    }

    fn export(&self) -> Result<(), ClientError> {
        self.record_call("export", Call::Export)
    }

    fn data_files(&self) -> Result<Vec<String>, ClientError> {
        self.record_call("data", Call::DataFiles)?;
        Ok(self.files.clone())
    }

    fn search(&self, query: &str, filename: &str) -> Result<String, ClientError> {
        self.record_call(
            "search",
            Call::Search {
                query: json_param(query),
                filename: json_param(filename),
            },
        )?;
        Ok(self.search_body.clone())
    }
}
