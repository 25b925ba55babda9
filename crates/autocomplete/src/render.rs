//! Turns request outcomes into list rows.
//!
//! Each entry point rebuilds the list from scratch and returns the event the
//! widget should announce, if any. Message rows are optional: a formatting
//! hook that is unset or yields nothing (or an empty string) suppresses the
//! row, and the list is hidden instead.

use bus::WidgetEvent;
use core_types::Item;
use net::TransportError;
use serde_json::Value;

use crate::list::{ResultsList, Row, RowKind};
use crate::options::Options;
use crate::selection::{Selection, auto_highlight};

/// `true` for payloads that mean "no results": null, scalars other than
/// non-empty strings, and empty arrays/objects.
pub fn payload_is_empty(payload: &Value) -> bool {
    match payload {
        Value::Null | Value::Bool(_) | Value::Number(_) => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Items in payload order.
///
/// Arrays yield their elements; objects yield the values under `"0"`, `"1"`,
/// ... Both stop at the first missing or null entry.
pub fn payload_items(payload: &Value) -> Vec<Item> {
    match payload {
        Value::Array(a) => a.iter().take_while(|v| !v.is_null()).cloned().collect(),
        Value::Object(o) => (0..)
            .map_while(|i: usize| o.get(&i.to_string()).filter(|v| !v.is_null()))
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}

fn message(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.is_empty())
}

fn show_message(list: &mut ResultsList, kind: RowKind, text: Option<String>) {
    match message(text) {
        Some(html) => {
            list.push(Row::message(kind, html));
            list.show();
        }
        None => list.hide(),
    }
}

pub fn render_success(
    list: &mut ResultsList,
    options: &Options,
    selection: &Selection,
    q: &str,
    raw: Value,
) -> WidgetEvent {
    list.clear();

    let data = match &options.format_data {
        Some(reshape) => reshape(raw),
        None => raw,
    };

    if payload_is_empty(&data) {
        let text = options.format_no_results.as_ref().and_then(|f| f(q));
        show_message(list, RowKind::NoResults, text);
        return WidgetEvent::NoResults { q: q.to_string() };
    }

    let items = payload_items(&data);
    for item in &items {
        let html = (options.format_item)(item);
        let selectable = options.selectable.accepts(item);
        list.push(Row::item(html, item.clone(), selectable));
    }

    let highlighted = auto_highlight(
        list,
        &options.compare,
        selection.get(),
        options.auto_highlight,
    );
    list.show();

    log::trace!(
        target: "autocomplete.render",
        "{} rows for {q:?}, highlight {highlighted:?}",
        list.len()
    );
    WidgetEvent::Results { items }
}

pub fn render_error(
    list: &mut ResultsList,
    options: &Options,
    q: &str,
    error: TransportError,
) -> WidgetEvent {
    list.clear();
    let text = options.format_error.as_ref().and_then(|f| f(&error));
    show_message(list, RowKind::Error, text);
    WidgetEvent::Error {
        q: q.to_string(),
        error,
    }
}

/// An empty query hides and empties the list without a message or event.
pub fn render_min_chars(list: &mut ResultsList, options: &Options, q: &str) -> Option<WidgetEvent> {
    if q.is_empty() {
        list.hide_and_clear();
        return None;
    }
    list.clear();
    let text = options
        .format_min_chars
        .as_ref()
        .and_then(|f| f(options.min_chars));
    show_message(list, RowKind::MinChars, text);
    Some(WidgetEvent::MinChars {
        min_chars: options.min_chars,
    })
}
