//! Typeahead: an autocomplete widget core.
//!
//! The pieces live in workspace crates; this package re-exports the surface a
//! host needs to bind a widget to an input.

pub use autocomplete::*;
pub use net::{
    FetchReply, FetchRequest, Transport, TransportError, TransportErrorKind, UreqTransport,
};
