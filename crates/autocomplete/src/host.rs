use std::fmt;

use crate::list::ResultsList;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostError {
    /// The input is not attached anywhere the list could follow it.
    NoInsertionPoint,
    /// The bound input element no longer exists.
    MissingInput,
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::NoInsertionPoint => f.write_str("no place to insert the results list"),
            HostError::MissingInput => f.write_str("bound input element is missing"),
        }
    }
}

impl std::error::Error for HostError {}

/// Everything the widget needs from the page around its input.
///
/// The widget owns exactly one host. It never assumes a particular DOM or
/// toolkit; [`DomHost`](crate::DomHost) is the in-memory implementation.
pub trait Host {
    fn value(&self) -> String;
    fn set_value(&mut self, value: &str);

    fn attr(&self, name: &str) -> Option<String>;
    /// `None` removes the attribute.
    fn set_attr(&mut self, name: &str, value: Option<&str>);
    fn set_input_class(&mut self, class: &str, on: bool);

    /// `action` of the nearest enclosing form, if any.
    fn form_action(&self) -> Option<String>;

    /// Insert an empty, hidden list element with DOM id `list_id` directly
    /// after the input.
    fn attach_list(&mut self, list_id: &str) -> Result<(), HostError>;
    fn detach_list(&mut self);
    /// Mirror the list model into the page.
    fn render_list(&mut self, list: &ResultsList);

    fn label_exists(&self, label: &str) -> bool;
    fn set_label_visible(&mut self, label: &str, visible: bool);
    /// Toggle the `mp_label` marker class on the label.
    fn set_label_marked(&mut self, label: &str, marked: bool);

    /// Busy indicator on the input's container while a request runs.
    fn set_busy(&mut self, busy: bool);

    /// Move device focus to the input. The host must not call back into the
    /// widget from here; the widget handles the resulting focus itself.
    fn focus_input(&mut self);
}

/// DOM id of the `index`th row of the list with DOM id `list_id`.
pub fn row_dom_id(list_id: &str, index: usize) -> String {
    format!("{list_id}_{index}")
}
