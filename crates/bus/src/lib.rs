use core_types::{InstanceId, Item};
use net::TransportError;
use std::sync::mpsc::Sender;

/// Prefix of the host-visible event names (`marcopolochange`, ...).
pub const EVENT_PREFIX: &str = "marcopolo";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Change,
    Focus,
    Results,
    NoResults,
    MinChars,
    RequestBefore,
    RequestAfter,
    Error,
    Select,
    Blur,
}

/// Event kind -> (event name, option key of its callback).
///
/// Callback keys are spelled out rather than derived from the event name.
pub const EVENT_TABLE: &[(EventKind, &str, &str)] = &[
    (EventKind::Change, "change", "onChange"),
    (EventKind::Focus, "focus", "onFocus"),
    (EventKind::Results, "results", "onResults"),
    (EventKind::NoResults, "noResults", "onNoResults"),
    (EventKind::MinChars, "minChars", "onMinChars"),
    (EventKind::RequestBefore, "requestBefore", "onRequestBefore"),
    (EventKind::RequestAfter, "requestAfter", "onRequestAfter"),
    (EventKind::Error, "error", "onError"),
    (EventKind::Select, "select", "onSelect"),
    (EventKind::Blur, "blur", "onBlur"),
];

impl EventKind {
    pub const ALL: [EventKind; 10] = [
        EventKind::Change,
        EventKind::Focus,
        EventKind::Results,
        EventKind::NoResults,
        EventKind::MinChars,
        EventKind::RequestBefore,
        EventKind::RequestAfter,
        EventKind::Error,
        EventKind::Select,
        EventKind::Blur,
    ];

    fn entry(self) -> &'static (EventKind, &'static str, &'static str) {
        // Every variant has a row; the table test keeps that true.
        EVENT_TABLE
            .iter()
            .find(|(k, _, _)| *k == self)
            .unwrap_or(&EVENT_TABLE[0])
    }

    pub fn name(self) -> &'static str {
        self.entry().1
    }

    pub fn callback_key(self) -> &'static str {
        self.entry().2
    }

    pub fn from_callback_key(key: &str) -> Option<Self> {
        EVENT_TABLE
            .iter()
            .find(|(_, _, k)| *k == key)
            .map(|(kind, _, _)| *kind)
    }

    /// Name under which hosts see the event, e.g. `marcopolonoresults`.
    pub fn host_event_name(self) -> String {
        format!("{EVENT_PREFIX}{}", self.name().to_ascii_lowercase())
    }
}

/// How a request ended, as reported by `requestAfter`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestStatus {
    Success,
    Error,
    Aborted,
}

#[derive(Clone, Debug, PartialEq)]
pub enum WidgetEvent {
    Change {
        value: String,
    },
    Focus,
    Results {
        items: Vec<Item>,
    },
    NoResults {
        q: String,
    },
    MinChars {
        min_chars: usize,
    },
    RequestBefore {
        q: String,
    },
    RequestAfter {
        q: String,
        status: RequestStatus,
    },
    Error {
        q: String,
        error: TransportError,
    },
    Select {
        item: Item,
        row: Option<usize>,
        initial: bool,
    },
    Blur,
}

impl WidgetEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            WidgetEvent::Change { .. } => EventKind::Change,
            WidgetEvent::Focus => EventKind::Focus,
            WidgetEvent::Results { .. } => EventKind::Results,
            WidgetEvent::NoResults { .. } => EventKind::NoResults,
            WidgetEvent::MinChars { .. } => EventKind::MinChars,
            WidgetEvent::RequestBefore { .. } => EventKind::RequestBefore,
            WidgetEvent::RequestAfter { .. } => EventKind::RequestAfter,
            WidgetEvent::Error { .. } => EventKind::Error,
            WidgetEvent::Select { .. } => EventKind::Select,
            WidgetEvent::Blur => EventKind::Blur,
        }
    }
}

/// A widget event tagged with the instance that raised it.
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub instance: InstanceId,
    pub event: WidgetEvent,
}

/// Fan-out of notifications to every live subscriber.
#[derive(Debug, Default)]
pub struct Subscribers {
    senders: Vec<Sender<Notification>>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, tx: Sender<Notification>) {
        self.senders.push(tx);
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    /// Send to all subscribers, forgetting those whose receiver was dropped.
    pub fn publish(&mut self, notification: &Notification) {
        self.senders
            .retain(|tx| tx.send(notification.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::mpsc;

    #[test]
    fn every_kind_has_exactly_one_table_row() {
        for kind in EventKind::ALL {
            let rows = EVENT_TABLE.iter().filter(|(k, _, _)| *k == kind).count();
            assert_eq!(rows, 1, "{kind:?}");
        }
        let keys: HashSet<_> = EVENT_TABLE.iter().map(|(_, _, k)| *k).collect();
        assert_eq!(keys.len(), EVENT_TABLE.len());
    }

    #[test]
    fn callback_keys_round_trip() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_callback_key(kind.callback_key()), Some(kind));
        }
        assert_eq!(EventKind::from_callback_key("onSelect"), Some(EventKind::Select));
        assert_eq!(EventKind::from_callback_key("onselect"), None);
    }

    #[test]
    fn host_event_names_are_prefixed_and_lowercase() {
        assert_eq!(EventKind::NoResults.host_event_name(), "marcopolonoresults");
        assert_eq!(EventKind::RequestAfter.host_event_name(), "marcopolorequestafter");
    }

    #[test]
    fn dropped_receivers_are_pruned() {
        let mut subs = Subscribers::new();
        let (tx1, rx1) = mpsc::channel();
        let (tx2, rx2) = mpsc::channel();
        subs.add(tx1);
        subs.add(tx2);
        drop(rx2);

        subs.publish(&Notification {
            instance: 1,
            event: WidgetEvent::Focus,
        });
        assert_eq!(subs.len(), 1);
        assert_eq!(rx1.try_recv().unwrap().event, WidgetEvent::Focus);
    }
}
