//! Widget configuration.
//!
//! [`Options`] is built once with the `with_*` methods and handed to
//! `Widget::create`. After that, single options are read and replaced through
//! [`OptionValue`], which names every option and carries its typed value.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use bus::{EventKind, WidgetEvent};
use core_types::{Item, Params, item_label};
use net::TransportError;
use serde_json::Value;

use crate::cache::CacheOption;
use crate::host::Host;
use crate::selection::Compare;

/// Event callback. Receives the host so it can read or rewrite the input.
pub type Callback = Rc<dyn Fn(&mut dyn Host, &WidgetEvent)>;
/// Reshape a raw payload before rendering.
pub type DataHook = Rc<dyn Fn(Value) -> Value>;
pub type ItemHook = Rc<dyn Fn(&Item) -> String>;
/// Message hooks return `None` (or an empty string) to suppress the row.
pub type ErrorHook = Rc<dyn Fn(&TransportError) -> Option<String>>;
pub type MinCharsHook = Rc<dyn Fn(usize) -> Option<String>>;
pub type NoResultsHook = Rc<dyn Fn(&str) -> Option<String>>;

/// Which result rows take part in navigation and selection.
#[derive(Clone, Default)]
pub enum Selectable {
    #[default]
    All,
    Predicate(Rc<dyn Fn(&Item) -> bool>),
}

impl Selectable {
    pub fn accepts(&self, item: &Item) -> bool {
        match self {
            Selectable::All => true,
            Selectable::Predicate(f) => f(item),
        }
    }
}

impl fmt::Debug for Selectable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selectable::All => f.write_str("All"),
            Selectable::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn default_format_item() -> ItemHook {
    Rc::new(|item: &Item| item_label(item).map(escape_html).unwrap_or_default())
}

fn default_format_error() -> ErrorHook {
    Rc::new(|_: &TransportError| {
        Some("<em>Your search could not be completed at this time.</em>".to_string())
    })
}

fn default_format_min_chars() -> MinCharsHook {
    Rc::new(|min_chars: usize| {
        Some(format!(
            "<em>Your search must be at least <strong>{min_chars}</strong> characters.</em>"
        ))
    })
}

fn default_format_no_results() -> NoResultsHook {
    Rc::new(|q: &str| {
        Some(format!(
            "<em>No results for <strong>{}</strong>.</em>",
            escape_html(q)
        ))
    })
}

/// Default `onSelect`: put the item's title (or name) into the input.
fn default_on_select() -> Callback {
    Rc::new(|host: &mut dyn Host, event: &WidgetEvent| {
        if let WidgetEvent::Select { item, .. } = event
            && let Some(label) = item_label(item)
        {
            host.set_value(label);
        }
    })
}

#[derive(Clone)]
pub struct Options {
    pub cache: CacheOption,
    pub compare: Compare,
    /// Static query-string pairs sent with every request.
    pub data: Params,
    /// Debounce between the last keystroke and the request.
    pub delay: Duration,
    pub format_data: Option<DataHook>,
    pub format_error: Option<ErrorHook>,
    pub format_item: ItemHook,
    pub format_min_chars: Option<MinCharsHook>,
    pub format_no_results: Option<NoResultsHook>,
    pub hide_on_select: bool,
    /// DOM id of an overlaid label element.
    pub label: Option<String>,
    pub min_chars: usize,
    pub param: String,
    /// Clear the input when the list is dismissed without a selection.
    pub required: bool,
    pub selectable: Selectable,
    pub selected: Option<Item>,
    /// Endpoint. `None` falls back to the enclosing form's `action`.
    pub url: Option<String>,
    /// Highlight the first selectable row when nothing else matched.
    pub auto_highlight: bool,
    /// Let Enter through to the form when the list is hidden.
    pub submit_on_enter: bool,
    callbacks: HashMap<EventKind, Callback>,
}

impl Default for Options {
    fn default() -> Self {
        let mut callbacks = HashMap::new();
        callbacks.insert(EventKind::Select, default_on_select());
        Self {
            cache: CacheOption::Shared,
            compare: Compare::Off,
            data: Vec::new(),
            delay: Duration::from_millis(250),
            format_data: None,
            format_error: Some(default_format_error()),
            format_item: default_format_item(),
            format_min_chars: Some(default_format_min_chars()),
            format_no_results: Some(default_format_no_results()),
            hide_on_select: true,
            label: None,
            min_chars: 1,
            param: "q".to_string(),
            required: false,
            selectable: Selectable::All,
            selected: None,
            url: None,
            auto_highlight: true,
            submit_on_enter: false,
            callbacks,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = param.into();
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.push((key.into(), value.into()));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    pub fn with_cache(mut self, cache: impl Into<CacheOption>) -> Self {
        self.cache = cache.into();
        self
    }

    pub fn with_compare(mut self, compare: Compare) -> Self {
        self.compare = compare;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_selected(mut self, item: Item) -> Self {
        self.selected = Some(item);
        self
    }

    pub fn with_selectable(mut self, selectable: Selectable) -> Self {
        self.selectable = selectable;
        self
    }

    pub fn with_hide_on_select(mut self, hide: bool) -> Self {
        self.hide_on_select = hide;
        self
    }

    pub fn with_auto_highlight(mut self, on: bool) -> Self {
        self.auto_highlight = on;
        self
    }

    pub fn with_submit_on_enter(mut self, on: bool) -> Self {
        self.submit_on_enter = on;
        self
    }

    pub fn with_format_data(mut self, hook: impl Fn(Value) -> Value + 'static) -> Self {
        self.format_data = Some(Rc::new(hook));
        self
    }

    pub fn with_format_item(mut self, hook: impl Fn(&Item) -> String + 'static) -> Self {
        self.format_item = Rc::new(hook);
        self
    }

    pub fn with_format_error(
        mut self,
        hook: impl Fn(&TransportError) -> Option<String> + 'static,
    ) -> Self {
        self.format_error = Some(Rc::new(hook));
        self
    }

    pub fn with_format_min_chars(
        mut self,
        hook: impl Fn(usize) -> Option<String> + 'static,
    ) -> Self {
        self.format_min_chars = Some(Rc::new(hook));
        self
    }

    pub fn with_format_no_results(
        mut self,
        hook: impl Fn(&str) -> Option<String> + 'static,
    ) -> Self {
        self.format_no_results = Some(Rc::new(hook));
        self
    }

    /// Register the callback for `kind`, replacing any previous one
    /// (including the default `onSelect`).
    pub fn on(
        mut self,
        kind: EventKind,
        f: impl Fn(&mut dyn Host, &WidgetEvent) + 'static,
    ) -> Self {
        self.callbacks.insert(kind, Rc::new(f));
        self
    }

    pub fn callback(&self, kind: EventKind) -> Option<&Callback> {
        self.callbacks.get(&kind)
    }

    pub fn set_callback(&mut self, kind: EventKind, f: Option<Callback>) {
        match f {
            Some(f) => self.callbacks.insert(kind, f),
            None => self.callbacks.remove(&kind),
        };
    }

    /// Read one option by its public name. Unknown names yield `None`.
    pub fn get(&self, name: &str) -> Option<OptionValue> {
        if let Some(kind) = EventKind::from_callback_key(name) {
            return Some(OptionValue::Callback(kind, self.callback(kind).cloned()));
        }
        let value = match name {
            "autoHighlight" => OptionValue::AutoHighlight(self.auto_highlight),
            "cache" => OptionValue::Cache(self.cache.clone()),
            "compare" => OptionValue::Compare(self.compare.clone()),
            "data" => OptionValue::Data(self.data.clone()),
            "delay" => OptionValue::Delay(self.delay),
            "formatData" => OptionValue::FormatData(self.format_data.clone()),
            "formatError" => OptionValue::FormatError(self.format_error.clone()),
            "formatItem" => OptionValue::FormatItem(self.format_item.clone()),
            "formatMinChars" => OptionValue::FormatMinChars(self.format_min_chars.clone()),
            "formatNoResults" => OptionValue::FormatNoResults(self.format_no_results.clone()),
            "hideOnSelect" => OptionValue::HideOnSelect(self.hide_on_select),
            "label" => OptionValue::Label(self.label.clone()),
            "minChars" => OptionValue::MinChars(self.min_chars),
            "param" => OptionValue::Param(self.param.clone()),
            "required" => OptionValue::Required(self.required),
            "selectable" => OptionValue::Selectable(self.selectable.clone()),
            "selected" => OptionValue::Selected(self.selected.clone()),
            "submitOnEnter" => OptionValue::SubmitOnEnter(self.submit_on_enter),
            "url" => OptionValue::Url(self.url.clone()),
            _ => return None,
        };
        Some(value)
    }

    /// Store `value` in its slot. Derived state is the widget's business.
    pub fn apply(&mut self, value: OptionValue) {
        match value {
            OptionValue::AutoHighlight(v) => self.auto_highlight = v,
            OptionValue::Cache(v) => self.cache = v,
            OptionValue::Callback(kind, f) => self.set_callback(kind, f),
            OptionValue::Compare(v) => self.compare = v,
            OptionValue::Data(v) => self.data = v,
            OptionValue::Delay(v) => self.delay = v,
            OptionValue::FormatData(v) => self.format_data = v,
            OptionValue::FormatError(v) => self.format_error = v,
            OptionValue::FormatItem(v) => self.format_item = v,
            OptionValue::FormatMinChars(v) => self.format_min_chars = v,
            OptionValue::FormatNoResults(v) => self.format_no_results = v,
            OptionValue::HideOnSelect(v) => self.hide_on_select = v,
            OptionValue::Label(v) => self.label = v,
            OptionValue::MinChars(v) => self.min_chars = v,
            OptionValue::Param(v) => self.param = v,
            OptionValue::Required(v) => self.required = v,
            OptionValue::Selectable(v) => self.selectable = v,
            OptionValue::Selected(v) => self.selected = v,
            OptionValue::SubmitOnEnter(v) => self.submit_on_enter = v,
            OptionValue::Url(v) => self.url = v,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut callbacks: Vec<_> = self.callbacks.keys().map(|k| k.callback_key()).collect();
        callbacks.sort_unstable();
        f.debug_struct("Options")
            .field("cache", &self.cache)
            .field("compare", &self.compare)
            .field("data", &self.data)
            .field("delay", &self.delay)
            .field("hide_on_select", &self.hide_on_select)
            .field("label", &self.label)
            .field("min_chars", &self.min_chars)
            .field("param", &self.param)
            .field("required", &self.required)
            .field("selectable", &self.selectable)
            .field("selected", &self.selected)
            .field("url", &self.url)
            .field("auto_highlight", &self.auto_highlight)
            .field("submit_on_enter", &self.submit_on_enter)
            .field("callbacks", &callbacks)
            .finish_non_exhaustive()
    }
}

/// One option with its value, for `Widget::option` / `Widget::set_option`.
#[derive(Clone)]
pub enum OptionValue {
    AutoHighlight(bool),
    Cache(CacheOption),
    Callback(EventKind, Option<Callback>),
    Compare(Compare),
    Data(Params),
    Delay(Duration),
    FormatData(Option<DataHook>),
    FormatError(Option<ErrorHook>),
    FormatItem(ItemHook),
    FormatMinChars(Option<MinCharsHook>),
    FormatNoResults(Option<NoResultsHook>),
    HideOnSelect(bool),
    Label(Option<String>),
    MinChars(usize),
    Param(String),
    Required(bool),
    Selectable(Selectable),
    Selected(Option<Item>),
    SubmitOnEnter(bool),
    Url(Option<String>),
}

impl OptionValue {
    /// The public option name this value belongs to.
    pub fn name(&self) -> &'static str {
        match self {
            OptionValue::AutoHighlight(_) => "autoHighlight",
            OptionValue::Cache(_) => "cache",
            OptionValue::Callback(kind, _) => kind.callback_key(),
            OptionValue::Compare(_) => "compare",
            OptionValue::Data(_) => "data",
            OptionValue::Delay(_) => "delay",
            OptionValue::FormatData(_) => "formatData",
            OptionValue::FormatError(_) => "formatError",
            OptionValue::FormatItem(_) => "formatItem",
            OptionValue::FormatMinChars(_) => "formatMinChars",
            OptionValue::FormatNoResults(_) => "formatNoResults",
            OptionValue::HideOnSelect(_) => "hideOnSelect",
            OptionValue::Label(_) => "label",
            OptionValue::MinChars(_) => "minChars",
            OptionValue::Param(_) => "param",
            OptionValue::Required(_) => "required",
            OptionValue::Selectable(_) => "selectable",
            OptionValue::Selected(_) => "selected",
            OptionValue::SubmitOnEnter(_) => "submitOnEnter",
            OptionValue::Url(_) => "url",
        }
    }
}

impl fmt::Debug for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::AutoHighlight(v) => write!(f, "AutoHighlight({v})"),
            OptionValue::Cache(v) => write!(f, "Cache({v:?})"),
            OptionValue::Callback(kind, cb) => {
                write!(f, "Callback({kind:?}, {})", if cb.is_some() { "Some(..)" } else { "None" })
            }
            OptionValue::Compare(v) => write!(f, "Compare({v:?})"),
            OptionValue::Data(v) => write!(f, "Data({v:?})"),
            OptionValue::Delay(v) => write!(f, "Delay({v:?})"),
            OptionValue::HideOnSelect(v) => write!(f, "HideOnSelect({v})"),
            OptionValue::Label(v) => write!(f, "Label({v:?})"),
            OptionValue::MinChars(v) => write!(f, "MinChars({v})"),
            OptionValue::Param(v) => write!(f, "Param({v:?})"),
            OptionValue::Required(v) => write!(f, "Required({v})"),
            OptionValue::Selectable(v) => write!(f, "Selectable({v:?})"),
            OptionValue::Selected(v) => write!(f, "Selected({v:?})"),
            OptionValue::SubmitOnEnter(v) => write!(f, "SubmitOnEnter({v})"),
            OptionValue::Url(v) => write!(f, "Url({v:?})"),
            hook => write!(f, "{}(..)", hook.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_match_documented_values() {
        let opts = Options::default();
        assert_eq!(opts.delay, Duration::from_millis(250));
        assert_eq!(opts.min_chars, 1);
        assert_eq!(opts.param, "q");
        assert!(opts.hide_on_select);
        assert!(!opts.required);
        assert!(opts.cache.is_enabled());
        assert!(opts.callback(EventKind::Select).is_some());
        assert!(opts.callback(EventKind::Change).is_none());
    }

    #[test]
    fn unknown_option_names_read_as_none() {
        let opts = Options::default();
        assert!(opts.get("colour").is_none());
        assert!(opts.get("onchange").is_none());
    }

    #[test]
    fn get_reflects_apply() {
        let mut opts = Options::default();
        opts.apply(OptionValue::MinChars(3));
        opts.apply(OptionValue::Url(Some("/s".into())));
        assert!(matches!(opts.get("minChars"), Some(OptionValue::MinChars(3))));
        assert!(matches!(opts.get("url"), Some(OptionValue::Url(Some(u))) if u == "/s"));
    }

    #[test]
    fn callbacks_are_addressed_by_their_key() {
        let mut opts = Options::default();
        assert!(matches!(
            opts.get("onSelect"),
            Some(OptionValue::Callback(EventKind::Select, Some(_)))
        ));
        opts.apply(OptionValue::Callback(EventKind::Select, None));
        assert!(matches!(
            opts.get("onSelect"),
            Some(OptionValue::Callback(EventKind::Select, None))
        ));
    }

    #[test]
    fn option_names_round_trip_through_get() {
        let opts = Options::default();
        for name in [
            "autoHighlight", "cache", "compare", "data", "delay", "formatData", "formatError",
            "formatItem", "formatMinChars", "formatNoResults", "hideOnSelect", "label",
            "minChars", "onBlur", "param", "required", "selectable", "selected",
            "submitOnEnter", "url",
        ] {
            let value = opts.get(name).unwrap_or_else(|| panic!("{name} missing"));
            assert_eq!(value.name(), name);
        }
    }

    #[test]
    fn default_formatters() {
        let opts = Options::default();
        assert_eq!((opts.format_item)(&json!({"name": "<b>"})), "&lt;b&gt;");
        let no_results = opts.format_no_results.as_ref().unwrap();
        assert_eq!(
            no_results("a&b").as_deref(),
            Some("<em>No results for <strong>a&amp;b</strong>.</em>")
        );
        let min_chars = opts.format_min_chars.as_ref().unwrap();
        assert!(min_chars(3).unwrap().contains("<strong>3</strong>"));
    }

    #[test]
    fn selectable_predicate_filters_items() {
        let sel = Selectable::Predicate(Rc::new(|item: &Item| item["enabled"] == json!(true)));
        assert!(sel.accepts(&json!({"enabled": true})));
        assert!(!sel.accepts(&json!({"enabled": false})));
        assert!(Selectable::All.accepts(&json!(null)));
    }
}
