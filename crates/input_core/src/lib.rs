//! # input_core
//!
//! UI-agnostic value and focus state for text inputs.
//!
//! - [`InputId`]: opaque identifier for an input element
//! - [`InputValueStore`]: values, carets and which input holds device focus
//!
//! No graphics, layout or DOM types appear here; hosts map their own element
//! ids onto [`InputId`] at the boundary.

mod id;
mod store;
mod text;

pub use id::InputId;
pub use store::InputValueStore;
pub use text::{
    clamp_to_char_boundary, filter_single_line, next_cursor_boundary, prev_cursor_boundary,
};
