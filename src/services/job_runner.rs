//! Background job runner service
//!
//! Runs corpus server requests off the UI thread. Each job reports one or
//! more [`JobMessage`]s over a channel that the event loop drains on every
//! tick. Messages carry the ticket they were issued with so the app can drop
//! completions that are no longer current.

use crate::model::example::Example;
use crate::model::fragment::Fragment;
use crate::model::results::ResultsView;
use crate::model::sequence::{RequestKey, Ticket};
use crate::services::client::CorpusClient;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

/// A request to the corpus server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    ListTexts,
    LoadText {
        text_id: String,
    },
    /// Persist a field on blur, no re-render
    UpdateField {
        target: String,
        value: String,
    },
    /// Persist a field on Enter, then re-render its example
    CommitField {
        target: String,
        value: String,
        example_id: String,
    },
    PickChoice {
        target: String,
        choice: String,
        example_id: String,
    },
    Export,
    ListFiles,
    Search {
        query: String,
        filename: String,
    },
}

impl Request {
    /// The view state this request's completion writes to
    pub fn key(&self) -> RequestKey {
        match self {
            Request::ListTexts => RequestKey::Texts,
            Request::LoadText { .. } => RequestKey::Text,
            Request::UpdateField { target, .. } => RequestKey::Field(target.clone()),
            Request::CommitField { example_id, .. } | Request::PickChoice { example_id, .. } => {
                RequestKey::Example(example_id.clone())
            }
            Request::Export => RequestKey::Export,
            Request::ListFiles => RequestKey::Files,
            Request::Search { .. } => RequestKey::Search,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Request::ListTexts => "list texts",
            Request::LoadText { .. } => "load text",
            Request::UpdateField { .. } => "update",
            Request::CommitField { .. } => "update",
            Request::PickChoice { .. } => "pick",
            Request::Export => "export",
            Request::ListFiles => "list data files",
            Request::Search { .. } => "search",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    TextsListed(Vec<String>),
    /// Ids of a text were fetched, the example list must be cleared
    TextCleared { text_id: String, total: usize },
    ExampleAppended(Example),
    /// One example of a text could not be fetched or parsed; the load goes on
    ExampleSkipped { example_id: String, error: String },
    TextLoaded { text_id: String, count: usize, skipped: usize },
    FieldSaved { target: String },
    ExampleRefreshed { example_id: String, example: Example },
    ChoicePicked { example_id: String, example: Example },
    Exported,
    FilesListed(Vec<String>),
    SearchCompleted {
        query: String,
        filename: String,
        results: ResultsView,
    },
    Failed { request: &'static str, error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobMessage {
    pub ticket: Ticket,
    pub outcome: Outcome,
}

/// Where jobs execute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// One worker thread per request
    Background,
    /// On the calling thread, results still delivered through `poll`
    #[cfg(test)]
    Inline,
}

/// Job runner service for corpus server requests
pub struct JobRunner {
    client: Arc<dyn CorpusClient>,
    dispatch: Dispatch,
    sender: Sender<JobMessage>,
    receiver: Receiver<JobMessage>,
}

impl JobRunner {
    pub fn new(client: Arc<dyn CorpusClient>, dispatch: Dispatch) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            client,
            dispatch,
            sender,
            receiver,
        }
    }

    pub fn submit(&self, ticket: Ticket, request: Request) {
        tracing::debug!(?ticket, request = request.name(), "submitting job");
        match self.dispatch {
            Dispatch::Background => {
                let client = Arc::clone(&self.client);
                let tx = self.sender.clone();
                thread::spawn(move || {
                    Self::run(client.as_ref(), &ticket, request, &tx);
                });
            }
            #[cfg(test)]
            Dispatch::Inline => {
                Self::run(self.client.as_ref(), &ticket, request, &self.sender);
            }
        }
    }

    /// Drain every message that has arrived since the last poll
    pub fn poll(&self) -> Vec<JobMessage> {
        let mut messages = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(message) => messages.push(message),
                Err(mpsc::TryRecvError::Empty) => break,
                // we hold a sender ourselves, so this only happens on teardown
                Err(mpsc::TryRecvError::Disconnected) => break,
            }
        }
        messages
    }

    fn run(client: &dyn CorpusClient, ticket: &Ticket, request: Request, tx: &Sender<JobMessage>) {
        let send = |outcome: Outcome| {
            let _ = tx.send(JobMessage {
                ticket: ticket.clone(),
                outcome,
            });
        };

        let name = request.name();
        if let Err(error) = Self::execute(client, request, &send) {
            tracing::warn!(request = name, %error, "request failed");
            send(Outcome::Failed {
                request: name,
                error: error.to_string(),
            });
        }
    }

    fn fetch_appended(client: &dyn CorpusClient, id: &str) -> anyhow::Result<Example> {
        let markup = client.example(id)?;
        Ok(Fragment::parse(&markup).appended()?)
    }

    fn execute(
        client: &dyn CorpusClient,
        request: Request,
        send: &dyn Fn(Outcome),
    ) -> anyhow::Result<()> {
        match request {
            Request::ListTexts => {
                send(Outcome::TextsListed(client.texts()?));
            }
            Request::LoadText { text_id } => {
                let ids = client.text_records(&text_id)?;
                tracing::info!(%text_id, records = ids.len(), "loading text");
                send(Outcome::TextCleared {
                    text_id: text_id.clone(),
                    total: ids.len(),
                });
                // sequential so examples arrive in server order
                let mut count = 0;
                for id in &ids {
                    match Self::fetch_appended(client, id) {
                        Ok(example) => {
                            count += 1;
                            send(Outcome::ExampleAppended(example));
                            tracing::trace!(example = %id, loaded = count, "appended");
                        }
                        Err(error) => {
                            tracing::warn!(example = %id, %error, "skipping example");
                            send(Outcome::ExampleSkipped {
                                example_id: id.clone(),
                                error: error.to_string(),
                            });
                        }
                    }
                }
                send(Outcome::TextLoaded {
                    text_id,
                    count,
                    skipped: ids.len() - count,
                });
            }
            Request::UpdateField { target, value } => {
                client.update(&target, &value)?;
                send(Outcome::FieldSaved { target });
            }
            Request::CommitField {
                target,
                value,
                example_id,
            } => {
                client.update(&target, &value)?;
                let markup = client.example(&example_id)?;
                let example = Fragment::parse(&markup).replacement()?;
                send(Outcome::ExampleRefreshed { example_id, example });
            }
            Request::PickChoice {
                target,
                choice,
                example_id,
            } => {
                let markup = client.pick(&target, &choice)?;
                let example = Fragment::parse(&markup).replacement()?;
                send(Outcome::ChoicePicked { example_id, example });
            }
            Request::Export => {
                client.export()?;
                send(Outcome::Exported);
            }
            Request::ListFiles => {
                send(Outcome::FilesListed(client.data_files()?));
            }
            Request::Search { query, filename } => {
                let markup = client.search(&query, &filename)?;
                send(Outcome::SearchCompleted {
                    query,
                    filename,
                    results: ResultsView::from_response(&markup),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::sequence::Sequencer;
    use crate::services::fake::{Call, FakeClient};
    use std::time::{Duration, Instant};

    fn submit(runner: &JobRunner, seq: &mut Sequencer, request: Request) -> Ticket {
        let ticket = seq.issue(request.key());
        runner.submit(ticket.clone(), request);
        ticket
    }

    #[test]
    fn test_load_text_streams_in_order() {
        let fake = Arc::new(FakeClient::with_text(&["e1", "e2", "e3"]));
        let runner = JobRunner::new(fake.clone(), Dispatch::Inline);
        let mut seq = Sequencer::new();

        let ticket = submit(
            &runner,
            &mut seq,
            Request::LoadText {
                text_id: "t1".to_string(),
            },
        );
        let messages = runner.poll();

        assert!(messages.iter().all(|m| m.ticket == ticket));
        let outcomes: Vec<_> = messages.into_iter().map(|m| m.outcome).collect();
        assert!(matches!(&outcomes[0], Outcome::TextCleared { total: 3, .. }));
        let ids: Vec<_> = outcomes
            .iter()
            .filter_map(|o| match o {
                Outcome::ExampleAppended(ex) => Some(ex.id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(ids, vec!["e1", "e2", "e3"]);
        assert!(matches!(outcomes.last(), Some(Outcome::TextLoaded { count: 3, .. })));

        assert_eq!(
            fake.calls(),
            vec![
                Call::TextRecords("t1".to_string()),
                Call::Example("e1".to_string()),
                Call::Example("e2".to_string()),
                Call::Example("e3".to_string()),
            ]
        );
    }

    #[test]
    fn test_load_skips_failed_example_and_continues() {
        let fake = FakeClient::with_text(&["e1", "e2", "e3"]);
        fake.set_example("e2", "None".to_string());
        let runner = JobRunner::new(Arc::new(fake), Dispatch::Inline);
        let mut seq = Sequencer::new();

        submit(
            &runner,
            &mut seq,
            Request::LoadText {
                text_id: "t1".to_string(),
            },
        );
        let outcomes: Vec<_> = runner.poll().into_iter().map(|m| m.outcome).collect();

        assert_eq!(outcomes.len(), 5);
        assert!(matches!(&outcomes[1], Outcome::ExampleAppended(ex) if ex.id == "e1"));
        assert!(matches!(&outcomes[2], Outcome::ExampleSkipped { example_id, .. } if example_id == "e2"));
        assert!(matches!(&outcomes[3], Outcome::ExampleAppended(ex) if ex.id == "e3"));
        assert!(matches!(
            &outcomes[4],
            Outcome::TextLoaded { count: 2, skipped: 1, .. }
        ));
    }

    #[test]
    fn test_commit_fetches_example_after_update() {
        let fake = Arc::new(FakeClient::with_text(&["e1"]));
        let runner = JobRunner::new(fake.clone(), Dispatch::Inline);
        let mut seq = Sequencer::new();

        submit(
            &runner,
            &mut seq,
            Request::CommitField {
                target: "e1_gls_0".to_string(),
                value: "dog".to_string(),
                example_id: "e1".to_string(),
            },
        );

        assert_eq!(
            fake.calls(),
            vec![
                Call::Update {
                    target: "e1_gls_0".to_string(),
                    value: "dog".to_string()
                },
                Call::Example("e1".to_string()),
            ]
        );
        let messages = runner.poll();
        assert!(matches!(
            &messages[0].outcome,
            Outcome::ExampleRefreshed { example_id, example } if example_id == "e1" && example.id == "e1"
        ));
    }

    #[test]
    fn test_failed_update_skips_refresh() {
        let mut fake = FakeClient::with_text(&["e1"]);
        fake.failing.insert("update");
        let fake = Arc::new(fake);
        let runner = JobRunner::new(fake.clone(), Dispatch::Inline);
        let mut seq = Sequencer::new();

        submit(
            &runner,
            &mut seq,
            Request::CommitField {
                target: "e1_gls_0".to_string(),
                value: "dog".to_string(),
                example_id: "e1".to_string(),
            },
        );

        assert_eq!(fake.calls().len(), 1);
        assert!(matches!(
            runner.poll()[0].outcome,
            Outcome::Failed { request: "update", .. }
        ));
    }

    #[test]
    fn test_pick_with_malformed_fragment_fails() {
        let mut fake = FakeClient::new();
        fake.picks
            .insert("e1_ana_0_0".to_string(), "<li id=\"e1\">no leading node</li>".to_string());
        let runner = JobRunner::new(Arc::new(fake), Dispatch::Inline);
        let mut seq = Sequencer::new();

        submit(
            &runner,
            &mut seq,
            Request::PickChoice {
                target: "e1_ana_0_0".to_string(),
                choice: "1SG".to_string(),
                example_id: "e1".to_string(),
            },
        );

        assert!(matches!(
            &runner.poll()[0].outcome,
            Outcome::Failed { request: "pick", error } if error.contains("node 1")
        ));
    }

    #[test]
    fn test_background_dispatch_delivers_through_poll() {
        let mut fake = FakeClient::new();
        fake.files = vec!["a.csv".to_string()];
        let runner = JobRunner::new(Arc::new(fake), Dispatch::Background);
        let mut seq = Sequencer::new();
        submit(&runner, &mut seq, Request::ListFiles);

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut messages = Vec::new();
        while messages.is_empty() && Instant::now() < deadline {
            messages = runner.poll();
            thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(
            messages[0].outcome,
            Outcome::FilesListed(vec!["a.csv".to_string()])
        );
    }

    #[test]
    fn test_request_keys() {
        assert_eq!(
            Request::UpdateField {
                target: "e1_oft".into(),
                value: String::new()
            }
            .key(),
            RequestKey::Field("e1_oft".into())
        );
        assert_eq!(
            Request::PickChoice {
                target: "e1_ana_0_0".into(),
                choice: "x".into(),
                example_id: "e1".into()
            }
            .key(),
            RequestKey::Example("e1".into())
        );
        assert_eq!(Request::Export.key(), RequestKey::Export);
    }
}
