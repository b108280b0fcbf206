//! The UI surface containers act upon.
//!
//! Containers never touch markup directly once it is rendered: they replace
//! the body, query elements by their `data-testid`, register listeners and
//! show modals through [`Document`]. Events reach the containers through
//! their `dispatch` methods.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use anyhow::{bail, Result};
use scraper::{Html, Selector};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventKind {
    Click,
    Change,
    Submit,
}

/// Snapshot of a rendered element
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub test_id: String,
    pub text: String,
    attributes: BTreeMap<String, String>,
}

impl Element {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

// Detached elements, for driving handlers without a rendered page
#[cfg(test)]
impl Element {
    pub fn new(test_id: &str) -> Self {
        Self {
            test_id: test_id.to_string(),
            text: String::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }
}

/// A file picked in a file input
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub name: String,
    pub url: String,
}

/// Values of a submitted form, keyed by field test id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    values: BTreeMap<String, String>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, test_id: &str, value: &str) -> Self {
        self.values.insert(test_id.to_string(), value.to_string());
        self
    }

    /// Trimmed value of a field, empty when the field is absent
    pub fn value(&self, test_id: &str) -> &str {
        self.values.get(test_id).map(|v| v.trim()).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Click(Element),
    Change {
        target: Element,
        file: Option<SelectedFile>,
    },
    Submit {
        target: Element,
        form: FormData,
    },
}

pub trait Document {
    fn body(&self) -> String;

    /// Replace the whole body. Listeners on the previous markup are dropped.
    fn set_body(&self, markup: String);

    /// Every element carrying `data-testid="<test_id>"`, in document order
    fn query_all(&self, test_id: &str) -> Vec<Element>;

    fn listen(&self, test_id: &str, kind: EventKind);

    /// Fill the body of the modal with the given id and show it
    fn show_modal(&self, id: &str, content: String) -> Result<()>;

    /// Rendered width in pixels of the element with the given id
    fn width_of(&self, id: &str) -> Option<u32>;

    fn clear_input(&self, test_id: &str);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Modal {
    pub content: String,
    pub visible: bool,
}

struct DocumentState {
    body: String,
    listeners: BTreeSet<(String, EventKind)>,
    modals: BTreeMap<String, Modal>,
    cleared_inputs: Vec<String>,
}

/// In-process document backed by a markup string.
pub struct MemoryDocument {
    state: RefCell<DocumentState>,
    viewport_width: u32,
}

impl MemoryDocument {
    pub fn new(viewport_width: u32) -> Self {
        Self {
            state: RefCell::new(DocumentState {
                body: String::new(),
                listeners: BTreeSet::new(),
                modals: BTreeMap::new(),
                cleared_inputs: Vec::new(),
            }),
            viewport_width,
        }
    }

    fn is_listening(&self, test_id: &str, kind: EventKind) -> bool {
        self.state
            .borrow()
            .listeners
            .contains(&(test_id.to_string(), kind))
    }

    fn nth(&self, test_id: &str, index: usize) -> Option<Element> {
        self.query_all(test_id).into_iter().nth(index)
    }

    /// Click the n-th element with the given test id. Returns the event
    /// when the element exists and a click listener is registered.
    pub fn click(&self, test_id: &str, index: usize) -> Option<UiEvent> {
        if !self.is_listening(test_id, EventKind::Click) {
            return None;
        }
        self.nth(test_id, index).map(UiEvent::Click)
    }

    pub fn change_file(&self, test_id: &str, file: SelectedFile) -> Option<UiEvent> {
        if !self.is_listening(test_id, EventKind::Change) {
            return None;
        }
        self.nth(test_id, 0).map(|target| UiEvent::Change {
            target,
            file: Some(file),
        })
    }

    pub fn submit(&self, test_id: &str, form: FormData) -> Option<UiEvent> {
        if !self.is_listening(test_id, EventKind::Submit) {
            return None;
        }
        self.nth(test_id, 0).map(|target| UiEvent::Submit { target, form })
    }

    pub fn modal(&self, id: &str) -> Option<Modal> {
        self.state.borrow().modals.get(id).cloned()
    }

    fn contains(&self, selector: &str) -> bool {
        let Ok(selector) = Selector::parse(selector) else {
            return false;
        };
        let html = Html::parse_document(&self.state.borrow().body);
        let found = html.select(&selector).next().is_some();
        found
    }
}

#[cfg(test)]
impl MemoryDocument {
    pub fn with_body(viewport_width: u32, markup: String) -> Self {
        let document = Self::new(viewport_width);
        document.set_body(markup);
        document
    }

    /// Test ids of the inputs cleared so far, oldest first
    pub fn cleared_inputs(&self) -> Vec<String> {
        self.state.borrow().cleared_inputs.clone()
    }
}

impl Document for MemoryDocument {
    fn body(&self) -> String {
        self.state.borrow().body.clone()
    }

    fn set_body(&self, markup: String) {
        let mut state = self.state.borrow_mut();
        state.body = markup;
        state.listeners.clear();
        state.modals.clear();
    }

    fn query_all(&self, test_id: &str) -> Vec<Element> {
        let selector = match Selector::parse(&format!(r#"[data-testid="{test_id}"]"#)) {
            Ok(selector) => selector,
            Err(err) => {
                tracing::warn!(test_id, error = %err, "invalid test id selector");
                return Vec::new();
            }
        };

        let html = Html::parse_document(&self.state.borrow().body);
        let elements = html
            .select(&selector)
            .map(|element| Element {
                test_id: test_id.to_string(),
                text: element.text().collect::<String>().trim().to_string(),
                attributes: element
                    .value()
                    .attrs()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect(),
            })
            .collect();
        elements
    }

    fn listen(&self, test_id: &str, kind: EventKind) {
        self.state
            .borrow_mut()
            .listeners
            .insert((test_id.to_string(), kind));
    }

    fn show_modal(&self, id: &str, content: String) -> Result<()> {
        if !self.contains(&format!("#{id}")) {
            bail!("no modal with id {id} in the document");
        }
        self.state.borrow_mut().modals.insert(
            id.to_string(),
            Modal {
                content,
                visible: true,
            },
        );
        Ok(())
    }

    fn width_of(&self, id: &str) -> Option<u32> {
        self.contains(&format!("#{id}")).then_some(self.viewport_width)
    }

    fn clear_input(&self, test_id: &str) {
        self.state
            .borrow_mut()
            .cleared_inputs
            .push(test_id.to_string());
    }
}
