//! Request sequencing
//!
//! Every request is stamped with a monotonically increasing number and the
//! target it writes to. A completion is applied only if its ticket is still
//! the latest issued for that target, so the last request issued wins no
//! matter which response arrives last.

use std::collections::HashMap;

/// The piece of view state a request writes to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequestKey {
    Texts,
    /// The example list of the loaded text
    Text,
    Example(String),
    Field(String),
    Files,
    Search,
    Export,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub key: RequestKey,
    pub seq: u64,
}

#[derive(Debug, Default)]
pub struct Sequencer {
    next: u64,
    latest: HashMap<RequestKey, u64>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self, key: RequestKey) -> Ticket {
        self.next += 1;
        self.latest.insert(key.clone(), self.next);
        Ticket { key, seq: self.next }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.latest.get(&ticket.key) == Some(&ticket.seq)
    }

    /// Forget every outstanding example ticket, e.g. when the list is cleared
    pub fn invalidate_examples(&mut self) {
        self.latest
            .retain(|key, _| !matches!(key, RequestKey::Example(_)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_ticket_wins() {
        let mut seq = Sequencer::new();
        let first = seq.issue(RequestKey::Search);
        let second = seq.issue(RequestKey::Search);

        assert!(!seq.is_current(&first));
        assert!(seq.is_current(&second));
    }

    #[test]
    fn test_targets_are_independent() {
        let mut seq = Sequencer::new();
        let a = seq.issue(RequestKey::Example("r1".into()));
        let b = seq.issue(RequestKey::Example("r2".into()));
        let text = seq.issue(RequestKey::Text);

        assert!(seq.is_current(&a));
        assert!(seq.is_current(&b));
        assert!(seq.is_current(&text));
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_invalidate_examples() {
        let mut seq = Sequencer::new();
        let ex = seq.issue(RequestKey::Example("r1".into()));
        let files = seq.issue(RequestKey::Files);
        seq.invalidate_examples();

        assert!(!seq.is_current(&ex));
        assert!(seq.is_current(&files));
    }
}
