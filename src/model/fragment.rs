//! Server fragment parsing
//!
//! The server renders each example as an HTML fragment whose top-level node
//! list starts with a whitespace text node followed by the `<li>` element.
//! Replacement responses are validated against that shape; anything else is
//! reported as a [`FragmentError`].

use crate::error::FragmentError;
use crate::model::example::{Choice, ChoiceControl, Example, InputField, Segment};
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;

/// Position of the replacement element in a fragment's top-level node list
pub const REPLACEMENT_NODE_INDEX: usize = 1;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static CHOICE_LINKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".dropdown-menu li a").unwrap());

static CHOICE_LABEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".dropdown-toggle, button").unwrap());

/// Elements that start a new display line
const BLOCK_TAGS: &[&str] = &["div", "p", "tr", "table", "ul", "ol"];

/// Elements whose content is never displayed
const SKIPPED_TAGS: &[&str] = &["script", "style", "audio", "source", "template"];

/// A parsed HTML fragment returned by the server
pub struct Fragment {
    html: Html,
}

impl Fragment {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_fragment(markup),
        }
    }

    /// Number of top-level nodes, text nodes included
    pub fn node_count(&self) -> usize {
        self.html.root_element().children().count()
    }

    /// The example at node index 1, used to replace an example in place
    pub fn replacement(&self) -> Result<Example, FragmentError> {
        let node = self
            .html
            .root_element()
            .children()
            .nth(REPLACEMENT_NODE_INDEX)
            .ok_or(FragmentError::MissingNode {
                index: REPLACEMENT_NODE_INDEX,
                found: self.node_count(),
            })?;
        let element = ElementRef::wrap(node).ok_or(FragmentError::NotAnElement {
            index: REPLACEMENT_NODE_INDEX,
        })?;
        example_from_element(element)
    }

    /// The first top-level `<li>`, used when appending during a text load
    pub fn appended(&self) -> Result<Example, FragmentError> {
        let element = self
            .html
            .root_element()
            .children()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "li")
            .ok_or(FragmentError::NoListItem)?;
        example_from_element(element)
    }
}

fn example_from_element(element: ElementRef<'_>) -> Result<Example, FragmentError> {
    let tag = element.value().name();
    if tag != "li" {
        return Err(FragmentError::NotAListItem {
            tag: tag.to_string(),
        });
    }
    let id = element
        .value()
        .attr("id")
        .filter(|id| !id.is_empty())
        .ok_or(FragmentError::MissingId)?;

    let mut segments = Vec::new();
    walk(element, &mut segments);
    trim_breaks(&mut segments);

    let mut example = Example::new(id, segments);
    example.fit_all();
    Ok(example)
}

fn walk(element: ElementRef<'_>, out: &mut Vec<Segment>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let collapsed = WHITESPACE.replace_all(text, " ");
                let trimmed = collapsed.trim();
                if !trimmed.is_empty() {
                    out.push(Segment::Text(trimmed.to_string()));
                }
            }
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(child) {
                    visit_element(element, out);
                }
            }
            _ => {}
        }
    }
}

fn visit_element(element: ElementRef<'_>, out: &mut Vec<Segment>) {
    let el = element.value();
    let name = el.name();

    if SKIPPED_TAGS.contains(&name) {
        return;
    }

    match name {
        "input" => {
            let Some(id) = el.attr("id") else {
                return;
            };
            out.push(Segment::Input(InputField::new(
                id,
                el.attr("value").unwrap_or_default(),
                el.attr("placeholder").map(str::to_string),
            )));
        }
        "br" => out.push(Segment::LineBreak),
        _ if el.classes().any(|c| c == "dropdown") => {
            out.push(Segment::Choice(choice_control(element)));
        }
        _ if BLOCK_TAGS.contains(&name) => {
            push_break(out);
            walk(element, out);
            push_break(out);
        }
        _ => walk(element, out),
    }
}

fn choice_control(element: ElementRef<'_>) -> ChoiceControl {
    let label = element
        .select(&CHOICE_LABEL)
        .next()
        .map(text_content)
        .unwrap_or_default();

    let choices = element
        .select(&CHOICE_LINKS)
        .filter_map(|link| {
            let id = link.value().attr("id")?;
            Some(Choice {
                id: id.to_string(),
                text: link.text().collect(),
            })
        })
        .collect();

    ChoiceControl { label, choices }
}

/// Whitespace-collapsed text of an element
pub fn text_content(element: ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    WHITESPACE.replace_all(raw.trim(), " ").into_owned()
}

fn push_break(out: &mut Vec<Segment>) {
    if !matches!(out.last(), None | Some(Segment::LineBreak)) {
        out.push(Segment::LineBreak);
    }
}

fn trim_breaks(segments: &mut Vec<Segment>) {
    while matches!(segments.last(), Some(Segment::LineBreak)) {
        segments.pop();
    }
    let leading = segments
        .iter()
        .take_while(|s| matches!(s, Segment::LineBreak))
        .count();
    segments.drain(..leading);
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = r##"
<li class="example" id="rec7">
  <div class="obj">ni   ta
    <input id="rec7_obj" value="ni ta">
  </div>
  <div class="ann">
    <input id="rec7_gls_0" value="1SG" placeholder="gls">
    <div class="dropdown">
      <button class="btn dropdown-toggle" type="button">ni <span class="caret"></span></button>
      <ul class="dropdown-menu">
        <li><a id="rec7_ana_0_0" href="#"> 1SG </a></li>
        <li><a id="rec7_ana_0_1" href="#">2SG</a></li>
      </ul>
    </div>
  </div>
  <p><input id="rec7_oft" value="" placeholder="translation"></p>
  <audio src="/audio/rec7.wav"></audio>
</li>
"##;

    #[test]
    fn test_replacement_reads_node_one() {
        let fragment = Fragment::parse(RECORD);
        assert!(fragment.node_count() >= 2);

        let example = fragment.replacement().unwrap();
        assert_eq!(example.id, "rec7");
    }

    #[test]
    fn test_segments_in_document_order() {
        let example = Fragment::parse(RECORD).replacement().unwrap();

        let ids: Vec<_> = example.inputs().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["rec7_obj", "rec7_gls_0", "rec7_oft"]);

        assert_eq!(example.segments.first(), Some(&Segment::Text("ni ta".to_string())));
        assert_eq!(example.control_count(), 4);
        assert!(matches!(example.control(2), Some(Segment::Choice(_))));
    }

    #[test]
    fn test_dropdown_becomes_choice_control() {
        let example = Fragment::parse(RECORD).replacement().unwrap();
        let control = example
            .segments
            .iter()
            .find_map(|s| match s {
                Segment::Choice(c) => Some(c),
                _ => None,
            })
            .unwrap();

        assert_eq!(control.label, "ni");
        assert_eq!(control.choices.len(), 2);
        assert_eq!(control.choices[0].id, "rec7_ana_0_0");
        // sent back untrimmed
        assert_eq!(control.choices[0].text, " 1SG ");
        assert_eq!(control.choices[1].text, "2SG");
    }

    #[test]
    fn test_inputs_are_fitted_on_parse() {
        let example = Fragment::parse(RECORD).replacement().unwrap();
        assert_eq!(example.input("rec7_gls_0").unwrap().width, Some(4));
        assert_eq!(example.input("rec7_oft").unwrap().width, None);
        assert_eq!(
            example.input("rec7_oft").unwrap().placeholder.as_deref(),
            Some("translation")
        );
    }

    #[test]
    fn test_audio_is_skipped_and_breaks_trimmed() {
        let example = Fragment::parse(RECORD).replacement().unwrap();
        assert!(!matches!(example.segments.last(), Some(Segment::LineBreak)));
        assert!(!matches!(example.segments.first(), Some(Segment::LineBreak)));
        assert!(example.lines().len() >= 3);
    }

    #[test]
    fn test_replacement_without_leading_text_node() {
        // node 0 is the li itself, node 1 is missing
        let fragment = Fragment::parse(r#"<li class="example" id="rec1">a</li>"#);
        assert_eq!(
            fragment.replacement(),
            Err(FragmentError::MissingNode { index: 1, found: 1 })
        );
    }

    #[test]
    fn test_replacement_rejects_non_element() {
        let fragment = Fragment::parse(r#"<b>x</b>trailing text"#);
        assert_eq!(
            fragment.replacement(),
            Err(FragmentError::NotAnElement { index: 1 })
        );
    }

    #[test]
    fn test_replacement_rejects_other_tags() {
        let fragment = Fragment::parse("\n<span id=\"rec1\">a</span>");
        assert_eq!(
            fragment.replacement(),
            Err(FragmentError::NotAListItem {
                tag: "span".to_string()
            })
        );
    }

    #[test]
    fn test_replacement_requires_id() {
        let fragment = Fragment::parse("\n<li class=\"example\">a</li>");
        assert_eq!(fragment.replacement(), Err(FragmentError::MissingId));
    }

    #[test]
    fn test_appended_takes_first_list_item() {
        let fragment = Fragment::parse(r#"<li class="example" id="rec2">word</li>"#);
        let example = fragment.appended().unwrap();
        assert_eq!(example.id, "rec2");
        assert_eq!(example.segments, vec![Segment::Text("word".to_string())]);

        assert_eq!(
            Fragment::parse("None").appended(),
            Err(FragmentError::NoListItem)
        );
    }
}
