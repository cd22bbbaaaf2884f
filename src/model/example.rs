//! Page model for annotated examples
//!
//! An example is one corpus record rendered by the server as an `<li>`
//! fragment. The page model keeps the pieces the client interacts with:
//! display text, editable fields and choice controls, in document order.

use unicode_width::UnicodeWidthStr;

/// Width used for a field whose width was never fitted (browser default size)
pub const DEFAULT_INPUT_WIDTH: u16 = 20;

/// An editable annotation field (`<input>`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputField {
    /// Server-side target of the field, e.g. `rec12_gls_3`
    pub id: String,
    pub value: String,
    pub placeholder: Option<String>,
    /// Fitted width in terminal cells, `None` until fitted
    pub width: Option<u16>,
    /// Value when the field was last focused or sent; the field only
    /// reports a change when `value` differs from it
    baseline: String,
}

impl InputField {
    pub fn new(id: impl Into<String>, value: impl Into<String>, placeholder: Option<String>) -> Self {
        let value = value.into();
        Self {
            id: id.into(),
            baseline: value.clone(),
            value,
            placeholder: placeholder.filter(|p| !p.is_empty()),
            width: None,
        }
    }

    /// Differs from the value it had on focus
    pub fn is_dirty(&self) -> bool {
        self.value != self.baseline
    }

    /// The current value was handed to the server
    pub fn mark_sent(&mut self) {
        self.baseline = self.value.clone();
    }

    /// Resize the field to its content plus one cell.
    ///
    /// An empty field that shows a placeholder keeps its current width.
    pub fn fit(&mut self) {
        if !self.value.is_empty() || self.placeholder.is_none() {
            let cells = self.value.width().min(u16::MAX as usize - 1) as u16;
            self.width = Some(cells + 1);
        }
    }

    /// Width to render the field with
    pub fn display_width(&self) -> u16 {
        self.width.unwrap_or(DEFAULT_INPUT_WIDTH)
    }

    /// Append a typed character (the `input` event)
    pub fn push(&mut self, c: char) {
        self.value.push(c);
        self.fit();
    }

    /// Delete the last character (the `input` event)
    pub fn pop(&mut self) {
        self.value.pop();
        self.fit();
    }
}

/// One option of a choice control (`.dropdown-menu li a`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Pick target, e.g. `rec12_ana_3_3`
    pub id: String,
    /// Link text exactly as served; sent back verbatim as the choice
    pub text: String,
}

/// A dropdown of analysis choices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceControl {
    pub label: String,
    pub choices: Vec<Choice>,
}

/// A piece of an example in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Input(InputField),
    Choice(ChoiceControl),
    LineBreak,
}

impl Segment {
    pub fn is_control(&self) -> bool {
        matches!(self, Segment::Input(_) | Segment::Choice(_))
    }
}

/// A rendered example (`<li class="example" id=...>`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    pub id: String,
    pub segments: Vec<Segment>,
}

impl Example {
    pub fn new(id: impl Into<String>, segments: Vec<Segment>) -> Self {
        Self {
            id: id.into(),
            segments,
        }
    }

    pub fn control_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_control()).count()
    }

    /// The n-th interactive control
    pub fn control(&self, n: usize) -> Option<&Segment> {
        self.segments.iter().filter(|s| s.is_control()).nth(n)
    }

    pub fn control_mut(&mut self, n: usize) -> Option<&mut Segment> {
        self.segments.iter_mut().filter(|s| s.is_control()).nth(n)
    }

    pub fn inputs(&self) -> impl Iterator<Item = &InputField> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Input(field) => Some(field),
            _ => None,
        })
    }

    #[cfg(test)]
    pub fn input(&self, id: &str) -> Option<&InputField> {
        self.inputs().find(|field| field.id == id)
    }

    pub fn fit_all(&mut self) {
        for segment in &mut self.segments {
            if let Segment::Input(field) = segment {
                field.fit();
            }
        }
    }

    /// Split the segments into display lines
    pub fn lines(&self) -> Vec<Vec<&Segment>> {
        let mut lines = vec![Vec::new()];
        for segment in &self.segments {
            match segment {
                Segment::LineBreak => lines.push(Vec::new()),
                other => {
                    if let Some(line) = lines.last_mut() {
                        line.push(other);
                    }
                }
            }
        }
        lines.retain(|line| !line.is_empty());
        lines
    }
}

/// The ordered example list of the loaded text (`#examples`)
#[derive(Debug, Clone, Default)]
pub struct ExampleList {
    items: Vec<Example>,
}

impl ExampleList {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn append(&mut self, example: Example) {
        self.items.push(example);
    }

    /// Replace the example with `example_id` in place.
    ///
    /// Returns false when the example is no longer in the list.
    pub fn replace(&mut self, example_id: &str, example: Example) -> bool {
        match self.position(example_id) {
            Some(idx) => {
                self.items[idx] = example;
                true
            }
            None => false,
        }
    }

    pub fn position(&self, example_id: &str) -> Option<usize> {
        self.items.iter().position(|ex| ex.id == example_id)
    }

    pub fn get(&self, idx: usize) -> Option<&Example> {
        self.items.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Example> {
        self.items.get_mut(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Example> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Re-apply auto-sizing to every input on the page
    pub fn fit_all(&mut self) {
        for example in &mut self.items {
            example.fit_all();
        }
    }
}
