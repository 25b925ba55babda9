use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::time::Instant;

use bus::{Notification, Subscribers, WidgetEvent};
use core_types::{InstanceId, Item, Key};
use net::Transport;

use crate::focus::{FocusOutcome, FocusState};
use crate::host::{Host, HostError, row_dom_id};
use crate::list::ResultsList;
use crate::options::{OptionValue, Options};
use crate::render::{render_error, render_min_chars, render_success};
use crate::request::{RequestCoordinator, RequestStep};
use crate::selection::{
    Selection, highlight, highlight_first, highlight_last, highlight_next, highlight_prev,
};
use crate::timer::Clock;

pub const INPUT_CLASS: &str = "mp_input";

/// Input attributes the widget overrides and puts back on destroy.
const MANAGED_ATTRS: [&str; 7] = [
    "autocomplete",
    "role",
    "aria-autocomplete",
    "aria-owns",
    "aria-expanded",
    "aria-activedescendant",
    "aria-labelledby",
];

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
pub enum WidgetError {
    /// The list could not be placed next to the input.
    NoInsertionPoint(HostError),
}

impl fmt::Display for WidgetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetError::NoInsertionPoint(e) => write!(f, "cannot create autocomplete: {e}"),
        }
    }
}

impl std::error::Error for WidgetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WidgetError::NoInsertionPoint(e) => Some(e),
        }
    }
}

/// What the host should do with the key event after the widget saw it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyOutcome {
    pub prevent_default: bool,
}

/// One autocomplete instance bound to one input.
///
/// Every entry point runs to completion on the UI thread and then mirrors the
/// list into the host. Timers and transport replies are only acted on inside
/// [`Widget::pump`].
pub struct Widget<H: Host> {
    id: InstanceId,
    list_id: String,
    host: H,
    options: Options,
    /// `options.url`, or the form action when that is unset.
    url: Option<String>,
    /// Last value the widget acted on; keyup compares against it.
    value: String,
    selection: Selection,
    focus: FocusState,
    requests: RequestCoordinator,
    list: ResultsList,
    subscribers: Subscribers,
    clock: Rc<dyn Clock>,
    saved_attrs: Vec<(&'static str, Option<String>)>,
    /// Label element currently carrying the marker class.
    marked_label: Option<String>,
}

impl<H: Host> Widget<H> {
    pub fn create(
        mut host: H,
        options: Options,
        transport: Box<dyn Transport>,
        clock: Rc<dyn Clock>,
    ) -> Result<Self, WidgetError> {
        let id = NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed);
        let list_id = format!("mp_list_{id}");
        host.attach_list(&list_id)
            .map_err(WidgetError::NoInsertionPoint)?;

        let saved_attrs = MANAGED_ATTRS
            .iter()
            .map(|name| (*name, host.attr(name)))
            .collect();
        host.set_input_class(INPUT_CLASS, true);
        host.set_attr("autocomplete", Some("off"));
        host.set_attr("role", Some("combobox"));
        host.set_attr("aria-autocomplete", Some("list"));
        host.set_attr("aria-owns", Some(&list_id));

        let value = host.value();
        let mut widget = Self {
            id,
            list_id,
            host,
            options,
            url: None,
            value,
            selection: Selection::default(),
            focus: FocusState::new(),
            requests: RequestCoordinator::new(transport),
            list: ResultsList::new(),
            subscribers: Subscribers::new(),
            clock,
            saved_attrs,
            marked_label: None,
        };

        widget.derive_label();
        if let Some(item) = widget.options.selected.clone() {
            widget.select_item(item, None, true);
        }
        widget.derive_url();
        widget.sync();

        log::debug!(
            target: "autocomplete",
            "created instance {} (url {:?})",
            widget.id,
            widget.url
        );
        Ok(widget)
    }

    /// Tear the instance down and hand the host back with its input as it
    /// was before `create`.
    pub fn destroy(mut self) -> H {
        self.cancel_pending();
        self.focus.reset();
        self.host.detach_list();
        for (name, value) in std::mem::take(&mut self.saved_attrs) {
            self.host.set_attr(name, value.as_deref());
        }
        self.host.set_input_class(INPUT_CLASS, false);
        if let Some(label) = self.marked_label.take() {
            self.host.set_label_marked(&label, false);
        }
        log::debug!(target: "autocomplete", "destroyed instance {}", self.id);
        self.host
    }

    // -- Accessors ---

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn list_id(&self) -> &str {
        &self.list_id
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn list(&self) -> &ResultsList {
        &self.list
    }

    pub fn selected(&self) -> Option<&Item> {
        self.selection.get()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn is_focused(&self) -> bool {
        self.focus.is_real()
    }

    /// A request is out; the host should keep pumping until it settles.
    pub fn is_waiting(&self) -> bool {
        self.requests.in_flight().is_some()
    }

    pub fn subscribe(&mut self) -> Receiver<Notification> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.add(tx);
        rx
    }

    // -- Public API ---

    /// Set the value without searching. A value equal to the current one is
    /// ignored entirely.
    pub fn change(&mut self, q: &str) {
        if q == self.value {
            return;
        }
        self.host.set_value(q);
        self.note_change(q);
        if self.focus.is_pseudo() {
            self.cancel_pending();
            self.list.hide_and_clear();
        } else {
            self.toggle_label();
        }
        self.sync();
    }

    /// Optionally set the value, then focus the input. The focus is what
    /// starts the request.
    pub fn search(&mut self, q: Option<&str>) {
        if let Some(q) = q {
            self.host.set_value(q);
        }
        self.host.focus_input();
        self.on_focus();
    }

    /// Commit `item` as the selection. `None` deselects and empties the input.
    pub fn select(&mut self, item: Option<Item>, row: Option<usize>, initial: bool) {
        match item {
            Some(item) => self.select_item(item, row, initial),
            None => self.deselect(),
        }
        self.sync();
    }

    pub fn option(&self, name: &str) -> Option<OptionValue> {
        if name == "url" {
            return Some(OptionValue::Url(self.url.clone()));
        }
        self.options.get(name)
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn set_option(&mut self, value: OptionValue) {
        log::debug!(target: "autocomplete", "set option {value:?}");
        match value {
            OptionValue::Label(label) => {
                if let Some(old) = self.marked_label.take() {
                    self.host.set_label_marked(&old, false);
                }
                self.options.label = label;
                self.derive_label();
            }
            OptionValue::Url(url) => {
                self.options.url = url;
                self.derive_url();
            }
            OptionValue::Selected(item) => {
                self.options.selected = item.clone();
                match item {
                    Some(item) => self.select_item(item, None, true),
                    None => self.deselect(),
                }
            }
            OptionValue::Required(required) => {
                self.options.required = required;
                if required && self.selection.is_empty() && !self.focus.is_pseudo() {
                    self.reset_value();
                    self.toggle_label();
                }
            }
            OptionValue::Cache(cache) => {
                log::debug!(target: "autocomplete.cache", "cache now {cache:?}");
                self.options.cache = cache;
            }
            other => self.options.apply(other),
        }
        self.sync();
    }

    // -- Event Loop ---

    /// Fire due timers and act on transport replies.
    pub fn pump(&mut self) {
        let now = self.clock.now();
        if self.focus.poll_blur(now) {
            self.dismiss();
        }
        let steps = self.requests.poll(now, &self.options, self.url.as_deref());
        for step in steps {
            self.apply_step(step);
        }
        self.sync();
    }

    /// Earliest pending timer, for hosts that sleep between frames.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.requests.deadline(), self.focus.blur_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // -- Input Events ---

    pub fn on_focus(&mut self) {
        match self.focus.on_input_focus() {
            FocusOutcome::Ignored => return,
            FocusOutcome::Resumed => self.toggle_label(),
            FocusOutcome::Entered => {
                self.toggle_label();
                self.emit(WidgetEvent::Focus);
                let q = self.host.value();
                self.request(q);
            }
        }
        self.sync();
    }

    pub fn on_blur(&mut self) {
        self.focus.on_input_blur(self.clock.now());
    }

    pub fn on_keydown(&mut self, key: Key) -> KeyOutcome {
        let visible = self.list.is_visible();
        let mut prevent_default = false;

        match key {
            Key::Up => {
                prevent_default = true;
                self.list.show();
                highlight_prev(&mut self.list);
            }
            Key::Down => {
                prevent_default = true;
                self.list.show();
                highlight_next(&mut self.list);
            }
            Key::Home if visible => {
                prevent_default = true;
                highlight_first(&mut self.list);
            }
            Key::End if visible => {
                prevent_default = true;
                highlight_last(&mut self.list);
            }
            Key::Enter => {
                prevent_default = visible || !self.options.submit_on_enter;
                if visible {
                    self.commit_highlight();
                }
            }
            Key::Tab => {
                if visible {
                    self.commit_highlight();
                }
            }
            Key::Escape => {
                self.cancel_pending();
                self.list.hide();
            }
            _ => {}
        }

        self.sync();
        KeyOutcome { prevent_default }
    }

    /// Request when the value moved since the last request or change.
    pub fn on_keyup(&mut self) {
        let q = self.host.value();
        if q != self.value {
            self.request(q);
        }
        self.sync();
    }

    /// Hide or reveal one row, e.g. for client-side filtering. A hidden row
    /// loses the highlight.
    pub fn set_row_hidden(&mut self, index: usize, hidden: bool) {
        self.list.set_row_hidden(index, hidden);
        if hidden {
            self.list.unhighlight(index);
        }
        self.sync();
    }

    // -- Mouse Events ---

    pub fn on_list_mousedown(&mut self) {
        self.focus.on_list_mousedown();
    }

    pub fn on_row_mouseover(&mut self, index: usize) {
        if highlight(&mut self.list, index) {
            self.sync();
        }
    }

    pub fn on_row_mouseout(&mut self, index: usize) {
        if self.list.row(index).is_some_and(|r| r.is_navigable()) {
            self.list.unhighlight(index);
            self.sync();
        }
    }

    pub fn on_row_mouseup(&mut self, index: usize) {
        let Some(item) = self
            .list
            .row(index)
            .filter(|r| r.is_navigable())
            .and_then(|r| r.item.clone())
        else {
            return;
        };

        self.select_item(item, Some(index), false);
        if !self.focus.is_real() {
            self.focus.note_mouse_selection();
        }
        self.host.focus_input();
        self.on_focus();
        self.sync();
    }

    pub fn on_document_mouseup(&mut self) {
        if self.focus.on_document_mouseup(self.list.is_visible()) {
            self.dismiss();
            self.sync();
        }
    }

    // -- Internals ---

    fn emit(&mut self, event: WidgetEvent) {
        log::trace!(
            target: "autocomplete",
            "{} -> {}",
            self.id,
            event.kind().host_event_name()
        );
        if let Some(callback) = self.options.callback(event.kind()).cloned() {
            let host: &mut dyn Host = &mut self.host;
            callback(host, &event);
        }
        self.subscribers.publish(&Notification {
            instance: self.id,
            event,
        });
    }

    /// Push the list model and the state-derived attributes into the host.
    fn sync(&mut self) {
        self.host.render_list(&self.list);
        let expanded = if self.list.is_visible() { "true" } else { "false" };
        self.host.set_attr("aria-expanded", Some(expanded));
        let active = self
            .list
            .highlighted()
            .map(|i| row_dom_id(&self.list_id, i));
        self.host.set_attr("aria-activedescendant", active.as_deref());
    }

    fn apply_step(&mut self, step: RequestStep) {
        match step {
            RequestStep::MinChars { q } => {
                if let Some(event) = render_min_chars(&mut self.list, &self.options, &q) {
                    self.emit(event);
                }
            }
            RequestStep::CacheHit { q, payload } | RequestStep::Success { q, payload } => {
                let event =
                    render_success(&mut self.list, &self.options, &self.selection, &q, payload);
                self.emit(event);
            }
            RequestStep::Dispatched { q, .. } => {
                self.emit(WidgetEvent::RequestBefore { q });
                self.host.set_busy(true);
            }
            RequestStep::Failure { q, error } => {
                let event = render_error(&mut self.list, &self.options, &q, error);
                self.emit(event);
            }
            RequestStep::Finished { q, status } => {
                self.host.set_busy(false);
                self.emit(WidgetEvent::RequestAfter { q, status });
            }
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(step) = self.requests.cancel_pending() {
            self.apply_step(step);
        }
    }

    fn request(&mut self, q: String) {
        self.cancel_pending();
        if q != self.value {
            self.note_change(&q);
        }
        let due = self.clock.now() + self.options.delay;
        self.requests.schedule(q, due);
    }

    /// The value moved: forget the selection and announce it.
    fn note_change(&mut self, q: &str) {
        self.selection.clear();
        self.value = q.to_string();
        self.emit(WidgetEvent::Change {
            value: q.to_string(),
        });
    }

    fn reset_value(&mut self) {
        if self.value.is_empty() && self.host.value().is_empty() {
            return;
        }
        self.host.set_value("");
        self.note_change("");
    }

    fn select_item(&mut self, item: Item, row: Option<usize>, initial: bool) {
        log::debug!(target: "autocomplete", "select row {row:?} (initial: {initial})");
        self.selection.set(Some(item.clone()));
        if self.options.hide_on_select {
            self.list.hide();
        }
        self.emit(WidgetEvent::Select { item, row, initial });

        // The callback rewrote the input: adopt the new value and drop the
        // now stale rows.
        let current = self.host.value();
        if current != self.value {
            self.value = current;
            self.list.hide_and_clear();
        }
    }

    fn deselect(&mut self) {
        self.selection.clear();
        self.reset_value();
        self.toggle_label();
    }

    fn commit_highlight(&mut self) {
        if let Some(index) = self.list.highlighted()
            && let Some(item) = self.list.row(index).and_then(|r| r.item.clone())
        {
            self.select_item(item, Some(index), false);
        }
    }

    fn dismiss(&mut self) {
        log::debug!(target: "autocomplete.focus", "dismiss instance {}", self.id);
        self.cancel_pending();
        self.list.hide_and_clear();
        if self.options.required && self.selection.is_empty() {
            self.reset_value();
        }
        self.toggle_label();
        self.emit(WidgetEvent::Blur);
    }

    fn toggle_label(&mut self) {
        let Some(label) = self.options.label.clone() else {
            return;
        };
        if !self.host.label_exists(&label) {
            return;
        }
        let hidden = self.focus.is_pseudo() || !self.host.value().is_empty();
        self.host.set_label_visible(&label, !hidden);
    }

    fn derive_label(&mut self) {
        let saved = self
            .saved_attrs
            .iter()
            .find(|(name, _)| *name == "aria-labelledby")
            .and_then(|(_, v)| v.clone());

        match self.options.label.clone() {
            Some(label) if self.host.label_exists(&label) => {
                self.host.set_label_marked(&label, true);
                self.host.set_attr("aria-labelledby", Some(&label));
                self.marked_label = Some(label);
                self.toggle_label();
            }
            _ => self.host.set_attr("aria-labelledby", saved.as_deref()),
        }
    }

    fn derive_url(&mut self) {
        self.url = self
            .options
            .url
            .clone()
            .filter(|u| !u.is_empty())
            .or_else(|| self.host.form_action());
        if self.url.is_none() {
            log::debug!(target: "autocomplete", "instance {} has no url", self.id);
        }
    }
}

impl<H: Host + fmt::Debug> fmt::Debug for Widget<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("id", &self.id)
            .field("list_id", &self.list_id)
            .field("host", &self.host)
            .field("url", &self.url)
            .field("value", &self.value)
            .field("selection", &self.selection)
            .field("focus", &self.focus)
            .field("list", &self.list)
            .finish_non_exhaustive()
    }
}
