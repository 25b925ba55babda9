//! Autocomplete for a single text input.
//!
//! A [`Widget`] binds to one input through a [`Host`], debounces what the user
//! types, asks a [`Transport`](net::Transport) for matches (or a cache), and
//! keeps a results list with one highlighted row and one committed
//! selection.
//!
//! Nothing here blocks or spawns. The host forwards input events and calls
//! [`Widget::pump`] from its loop; that is where timers fire and replies land.

mod cache;
mod dom_host;
mod focus;
mod host;
mod list;
mod options;
mod render;
mod request;
mod selection;
mod timer;
mod widget;

pub use cache::{CacheOption, ResultCache, SharedCache};
pub use dom_host::{BUSY_CLASS, DomHost, LABEL_CLASS, LIST_CLASS};
pub use focus::{BLUR_DISMISS_DELAY, FocusOutcome, FocusState};
pub use host::{Host, HostError, row_dom_id};
pub use list::{ResultsList, Row, RowKind};
pub use options::{
    Callback, DataHook, ErrorHook, ItemHook, MinCharsHook, NoResultsHook, OptionValue, Options,
    Selectable,
};
pub use render::{payload_is_empty, payload_items};
pub use request::{RequestCoordinator, RequestStep};
pub use selection::{Compare, Selection};
pub use timer::{Clock, ManualClock, SystemClock, Timer};
pub use widget::{INPUT_CLASS, KeyOutcome, Widget, WidgetError};

pub use bus::{EventKind, Notification, RequestStatus, WidgetEvent};
pub use core_types::{Item, Key, Params};
