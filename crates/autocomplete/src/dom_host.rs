//! [`Host`] over the in-memory document.
//!
//! The list becomes an `<ol class="mp_list">` right after the input, one `<li>`
//! per row. Row markup is stored as a text child; nothing here parses HTML.
//! Invisibility is the `hidden` attribute throughout.

use dom::dom_utils::{
    attr, closest_ancestor, has_attr, has_class, insert_after, parent_of, remove, set_attr,
    set_class,
};
use dom::{Document, Id, Node, elem, text};
use input_core::{InputId, InputValueStore};

use crate::host::{Host, HostError, row_dom_id};
use crate::list::ResultsList;

pub const LIST_CLASS: &str = "mp_list";
pub const LABEL_CLASS: &str = "mp_label";
pub const BUSY_CLASS: &str = "mp_busy";

#[derive(Clone, Debug)]
pub struct DomHost {
    doc: Document,
    input: Id,
    values: InputValueStore,
    list: Option<Id>,
    list_dom_id: String,
}

impl DomHost {
    /// Bind to the `<input>` whose `id` attribute is `input_dom_id`. The
    /// input's `value` attribute seeds the live value.
    pub fn new(doc: Document, input_dom_id: &str) -> Result<Self, HostError> {
        let node = doc
            .by_dom_id(input_dom_id)
            .filter(|n| n.is_element("input"))
            .ok_or(HostError::MissingInput)?;
        let input = node.id();
        let initial = attr(node, "value").unwrap_or_default().to_string();

        let mut values = InputValueStore::new();
        values.ensure_initial(InputId::from(input.0), initial);

        Ok(Self {
            doc,
            input,
            values,
            list: None,
            list_dom_id: String::new(),
        })
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn input_id(&self) -> Id {
        self.input
    }

    fn key(&self) -> InputId {
        InputId::from(self.input.0)
    }

    fn input_node(&self) -> Option<&Node> {
        self.doc.get(self.input)
    }

    fn input_node_mut(&mut self) -> Option<&mut Node> {
        self.doc.get_mut(self.input)
    }

    fn by_dom_id_mut(&mut self, dom_id: &str) -> Option<&mut Node> {
        let id = self.doc.by_dom_id(dom_id).map(Node::id)?;
        self.doc.get_mut(id)
    }

    // -- Typing ---

    /// Insert at the caret, as a keystroke would.
    pub fn type_text(&mut self, s: &str) {
        let key = self.key();
        self.values.insert_text(key, s);
    }

    pub fn backspace(&mut self) {
        let key = self.key();
        self.values.backspace(key);
    }

    pub fn is_focused(&self) -> bool {
        self.values.focused() == Some(self.key())
    }

    /// Drop device focus. The widget learns about it through `on_blur`.
    pub fn blur(&mut self) {
        let key = self.key();
        self.values.blur(key);
    }

    // -- Inspection ---

    pub fn list_element(&self) -> Option<&Node> {
        self.list.and_then(|id| self.doc.get(id))
    }

    pub fn list_is_visible(&self) -> bool {
        self.list_element().is_some_and(|n| !has_attr(n, "hidden"))
    }

    pub fn row_elements(&self) -> &[Node] {
        self.list_element().map(Node::children).unwrap_or_default()
    }

    pub fn is_busy(&self) -> bool {
        parent_of(self.doc.root(), self.input)
            .and_then(|p| self.doc.get(p))
            .is_some_and(|p| has_class(p, BUSY_CLASS))
    }

    pub fn label_is_visible(&self, label: &str) -> bool {
        self.doc
            .by_dom_id(label)
            .is_some_and(|n| !has_attr(n, "hidden"))
    }
}

impl Host for DomHost {
    fn value(&self) -> String {
        self.values.get(self.key()).unwrap_or_default().to_string()
    }

    fn set_value(&mut self, value: &str) {
        let key = self.key();
        self.values.set(key, value);
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.input_node()
            .and_then(|n| attr(n, name))
            .map(str::to_string)
    }

    fn set_attr(&mut self, name: &str, value: Option<&str>) {
        if let Some(node) = self.input_node_mut() {
            set_attr(node, name, value);
        }
    }

    fn set_input_class(&mut self, class: &str, on: bool) {
        if let Some(node) = self.input_node_mut() {
            set_class(node, class, on);
        }
    }

    fn form_action(&self) -> Option<String> {
        closest_ancestor(self.doc.root(), self.input, "form")
            .and_then(|form| attr(form, "action"))
            .filter(|a| !a.is_empty())
            .map(str::to_string)
    }

    fn attach_list(&mut self, list_id: &str) -> Result<(), HostError> {
        if self.input_node().is_none() {
            return Err(HostError::MissingInput);
        }
        let ol = self.doc.adopt(elem(
            "ol",
            &[("class", LIST_CLASS), ("id", list_id), ("role", "listbox"), ("hidden", "")],
            Vec::new(),
        ));
        let ol_id = ol.id();
        if !insert_after(self.doc.root_mut(), self.input, ol) {
            return Err(HostError::NoInsertionPoint);
        }
        self.list = Some(ol_id);
        self.list_dom_id = list_id.to_string();
        Ok(())
    }

    fn detach_list(&mut self) {
        if let Some(id) = self.list.take() {
            remove(self.doc.root_mut(), id);
        }
    }

    fn render_list(&mut self, list: &ResultsList) {
        let Some(ol_id) = self.list else {
            return;
        };

        let mut rows = Vec::with_capacity(list.len());
        for (i, row) in list.rows().iter().enumerate() {
            let highlighted = list.highlighted() == Some(i);
            let mut classes = vec![row.kind.class()];
            if row.selectable {
                classes.push("mp_selectable");
            }
            if highlighted {
                classes.push("mp_highlighted");
            }
            let class = classes.join(" ");
            let dom_id = row_dom_id(&self.list_dom_id, i);

            let mut attributes = vec![
                ("class", class.as_str()),
                ("id", dom_id.as_str()),
                ("role", "option"),
            ];
            if highlighted {
                attributes.push(("aria-selected", "true"));
            }
            if row.hidden {
                attributes.push(("hidden", ""));
            }
            let li = elem("li", &attributes, vec![text(&row.html)]);
            rows.push(self.doc.adopt(li));
        }

        if let Some(ol) = self.doc.get_mut(ol_id) {
            if let Some(children) = ol.children_mut() {
                *children = rows;
            }
            let hidden = if list.is_visible() { None } else { Some("") };
            set_attr(ol, "hidden", hidden);
        }
    }

    fn label_exists(&self, label: &str) -> bool {
        self.doc.by_dom_id(label).is_some()
    }

    fn set_label_visible(&mut self, label: &str, visible: bool) {
        if let Some(node) = self.by_dom_id_mut(label) {
            set_attr(node, "hidden", if visible { None } else { Some("") });
        }
    }

    fn set_label_marked(&mut self, label: &str, marked: bool) {
        if let Some(node) = self.by_dom_id_mut(label) {
            set_class(node, LABEL_CLASS, marked);
        }
    }

    fn set_busy(&mut self, busy: bool) {
        let parent = parent_of(self.doc.root(), self.input);
        if let Some(node) = parent.and_then(|p| self.doc.get_mut(p)) {
            set_class(node, BUSY_CLASS, busy);
        }
    }

    fn focus_input(&mut self) {
        let key = self.key();
        self.values.focus(key);
    }
}
