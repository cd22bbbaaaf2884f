//! Single-active list selection
//!
//! Backs both the text selector and the data-file list. The active entry and
//! the current selection are one field, so they can never disagree.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    items: Vec<String>,
    active: Option<usize>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entries, leaving nothing active
    pub fn replace(&mut self, items: Vec<String>) {
        self.items = items;
        self.active = None;
    }

    /// Replace the entries and make the first one active
    pub fn replace_and_activate_first(&mut self, items: Vec<String>) {
        self.active = if items.is_empty() { None } else { Some(0) };
        self.items = items;
    }

    /// Make the entry at `idx` the one active entry
    pub fn select_index(&mut self, idx: usize) -> Option<&str> {
        if idx < self.items.len() {
            self.active = Some(idx);
        }
        self.active_item()
    }

    /// Make the entry named `item` active. Unknown names change nothing.
    pub fn select(&mut self, item: &str) -> bool {
        match self.items.iter().position(|i| i == item) {
            Some(idx) => {
                self.active = Some(idx);
                true
            }
            None => false,
        }
    }

    pub fn active_item(&self) -> Option<&str> {
        self.active
            .and_then(|idx| self.items.get(idx))
            .map(String::as_str)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn is_active(&self, idx: usize) -> bool {
        self.active == Some(idx)
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
