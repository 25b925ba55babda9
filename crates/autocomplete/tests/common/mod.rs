#![allow(dead_code)]

use std::rc::Rc;
use std::sync::mpsc::Receiver;

use autocomplete::{
    DomHost, EventKind, Host, Key, KeyOutcome, ManualClock, Notification, Options, Widget,
    WidgetEvent,
};
use dom::{Document, elem, text};
use net::TransportError;
use net::testing::RecordingTransport;
use serde_json::Value;

pub const DELAY_MS: u64 = 250;

/// `<form action="/cities"><div class="field"><label id="city_label">City</label><input id="city"></div></form>`
pub fn page() -> Document {
    page_with_input(&[("id", "city"), ("type", "text")])
}

pub fn page_with_input(input_attrs: &[(&str, &str)]) -> Document {
    Document::new(vec![elem(
        "form",
        &[("action", "/cities")],
        vec![elem(
            "div",
            &[("class", "field")],
            vec![
                elem("label", &[("id", "city_label")], vec![text("City")]),
                elem("input", input_attrs, Vec::new()),
            ],
        )],
    )])
}

pub struct Rig {
    pub widget: Widget<DomHost>,
    pub clock: ManualClock,
    pub transport: RecordingTransport,
    events: Receiver<Notification>,
}

pub fn rig(options: Options) -> Rig {
    rig_on(page(), options)
}

pub fn rig_on(doc: Document, options: Options) -> Rig {
    let host = DomHost::new(doc, "city").expect("page has the input");
    let clock = ManualClock::new();
    let transport = RecordingTransport::new();
    let mut widget = Widget::create(
        host,
        options,
        Box::new(transport.clone()),
        Rc::new(clock.clone()),
    )
    .expect("widget attaches");
    let events = widget.subscribe();
    Rig {
        widget,
        clock,
        transport,
        events,
    }
}

impl Rig {
    pub fn host(&self) -> &DomHost {
        self.widget.host()
    }

    pub fn focus(&mut self) {
        self.widget.host_mut().focus_input();
        self.widget.on_focus();
    }

    pub fn blur(&mut self) {
        self.widget.host_mut().blur();
        self.widget.on_blur();
    }

    /// One keydown/keyup pair per character.
    pub fn type_str(&mut self, s: &str) {
        for c in s.chars() {
            self.widget.on_keydown(Key::Other);
            self.widget.host_mut().type_text(&c.to_string());
            self.widget.on_keyup();
        }
    }

    pub fn backspace(&mut self) {
        self.widget.on_keydown(Key::Other);
        self.widget.host_mut().backspace();
        self.widget.on_keyup();
    }

    pub fn key(&mut self, key: Key) -> KeyOutcome {
        let outcome = self.widget.on_keydown(key);
        self.widget.on_keyup();
        outcome
    }

    pub fn advance(&mut self, ms: u64) {
        self.clock.advance_ms(ms);
        self.widget.pump();
    }

    /// Let the debounce timer run out.
    pub fn settle(&mut self) {
        self.advance(DELAY_MS);
    }

    pub fn reply(&mut self, request_id: u64, payload: Value) {
        assert!(
            self.transport.respond_ok(request_id, payload),
            "request {request_id} was never sent"
        );
        self.widget.pump();
    }

    pub fn fail(&mut self, request_id: u64, error: TransportError) {
        assert!(self.transport.respond_err(request_id, error));
        self.widget.pump();
    }

    /// Focus, type `q`, wait out the debounce and answer with `payload`.
    pub fn search(&mut self, q: &str, payload: Value) {
        self.focus();
        self.type_str(q);
        self.settle();
        let sent = self.transport.last().expect("a request went out");
        self.reply(sent.request_id, payload);
    }

    pub fn events(&self) -> Vec<WidgetEvent> {
        self.events.try_iter().map(|n| n.event).collect()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events().iter().map(WidgetEvent::kind).collect()
    }

    pub fn row_classes(&self) -> Vec<String> {
        self.host()
            .row_elements()
            .iter()
            .map(|r| dom::dom_utils::attr(r, "class").unwrap_or_default().to_string())
            .collect()
    }
}
