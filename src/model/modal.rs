//! Overlays on top of the page
//!
//! Only the top modal takes input. Dialog contents (scroll position, the
//! options of a dropdown) live in the dialog components; the stack records
//! which overlay is open and what it is about.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    QuitConfirm,
    Help,
    /// Analysis options of one dropdown in example `example_id`
    Choices {
        example_id: String,
        selected_index: usize,
    },
}

#[derive(Debug, Default)]
pub struct ModalStack {
    stack: Vec<Modal>,
}

impl ModalStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, modal: Modal) {
        self.stack.push(modal);
    }

    pub fn pop(&mut self) -> Option<Modal> {
        self.stack.pop()
    }

    pub fn top(&self) -> Option<&Modal> {
        self.stack.last()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Close help if it is on top, open it otherwise. Returns true when help
    /// is now open.
    pub fn toggle_help(&mut self) -> bool {
        if self.top() == Some(&Modal::Help) {
            self.stack.pop();
            false
        } else {
            self.stack.push(Modal::Help);
            true
        }
    }

    /// Mirror the choice dialog's highlighted option
    pub fn sync_choice(&mut self, index: usize) {
        if let Some(Modal::Choices { selected_index, .. }) = self.stack.last_mut() {
            *selected_index = index;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choices(selected_index: usize) -> Modal {
        Modal::Choices {
            example_id: "rec1".to_string(),
            selected_index,
        }
    }

    #[test]
    fn test_only_top_is_visible() {
        let mut stack = ModalStack::new();
        assert!(stack.top().is_none());

        stack.push(Modal::QuitConfirm);
        stack.push(choices(0));
        assert_eq!(stack.top(), Some(&choices(0)));

        assert_eq!(stack.pop(), Some(choices(0)));
        assert_eq!(stack.pop(), Some(Modal::QuitConfirm));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_toggle_help() {
        let mut stack = ModalStack::new();
        assert!(stack.toggle_help());
        assert_eq!(stack.top(), Some(&Modal::Help));
        assert!(!stack.toggle_help());
        assert!(stack.is_empty());

        // help under another dialog opens a second copy on top
        stack.push(Modal::Help);
        stack.push(Modal::QuitConfirm);
        assert!(stack.toggle_help());
        assert_eq!(stack.top(), Some(&Modal::Help));
    }

    #[test]
    fn test_sync_choice_only_touches_choices() {
        let mut stack = ModalStack::new();
        stack.push(choices(0));
        stack.sync_choice(2);
        assert_eq!(stack.top(), Some(&choices(2)));

        stack.push(Modal::QuitConfirm);
        stack.sync_choice(5);
        assert_eq!(stack.top(), Some(&Modal::QuitConfirm));
    }
}
