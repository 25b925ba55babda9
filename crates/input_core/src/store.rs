//! Value store for text inputs.
//!
//! The store knows nothing about layout: hosts translate keystrokes into
//! `insert_text`/`backspace` calls and read the value back out.

use crate::id::InputId;
use crate::text::{clamp_to_char_boundary, filter_single_line, prev_cursor_boundary};
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
struct InputState {
    value: String,
    /// Incremented on every value change.
    value_rev: u64,
    /// Byte index into `value`, always on a char boundary.
    caret: usize,
}

/// Values, carets and device focus for a set of inputs.
///
/// ```
/// use input_core::{InputId, InputValueStore};
///
/// let mut store = InputValueStore::new();
/// let id = InputId::from_raw(1);
///
/// store.ensure_initial(id, "ber".to_string());
/// store.insert_text(id, "lin");
/// assert_eq!(store.get(id), Some("berlin"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct InputValueStore {
    values: HashMap<InputId, InputState>,
    focused: Option<InputId>,
}

impl InputValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, id: InputId) -> bool {
        self.values.contains_key(&id)
    }

    pub fn get(&self, id: InputId) -> Option<&str> {
        self.values.get(&id).map(|s| s.value.as_str())
    }

    pub fn caret(&self, id: InputId) -> Option<usize> {
        self.values.get(&id).map(|s| s.caret)
    }

    pub fn value_revision(&self, id: InputId) -> u64 {
        self.values.get(&id).map(|s| s.value_rev).unwrap_or(0)
    }

    /// Insert `initial` if no entry exists yet.
    pub fn ensure_initial(&mut self, id: InputId, initial: String) {
        self.values.entry(id).or_insert_with(|| InputState {
            caret: initial.len(),
            value: initial,
            value_rev: 0,
        });
    }

    /// Overwrite the value and put the caret at the end.
    ///
    /// Returns `true` if the value actually changed.
    pub fn set(&mut self, id: InputId, value: &str) -> bool {
        let value = filter_single_line(value);
        let st = self.values.entry(id).or_default();
        st.caret = value.len();
        if st.value == value {
            return false;
        }
        st.value = value.into_owned();
        st.value_rev = st.value_rev.wrapping_add(1);
        true
    }

    /// Insert text at the caret. Newlines are dropped.
    pub fn insert_text(&mut self, id: InputId, s: &str) {
        let s = filter_single_line(s);
        if s.is_empty() {
            return;
        }
        let st = self.values.entry(id).or_default();
        let caret = clamp_to_char_boundary(&st.value, st.caret);
        st.value.insert_str(caret, &s);
        st.caret = caret + s.len();
        st.value_rev = st.value_rev.wrapping_add(1);
    }

    /// Delete the character before the caret.
    pub fn backspace(&mut self, id: InputId) {
        let Some(st) = self.values.get_mut(&id) else {
            return;
        };
        let caret = clamp_to_char_boundary(&st.value, st.caret);
        if caret == 0 {
            return;
        }
        let prev = prev_cursor_boundary(&st.value, caret);
        st.value.drain(prev..caret);
        st.caret = prev;
        st.value_rev = st.value_rev.wrapping_add(1);
    }

    pub fn focused(&self) -> Option<InputId> {
        self.focused
    }

    /// Give device focus to `id`. Returns `false` if it already had it.
    pub fn focus(&mut self, id: InputId) -> bool {
        if self.focused == Some(id) {
            return false;
        }
        self.focused = Some(id);
        if let Some(st) = self.values.get_mut(&id) {
            st.caret = clamp_to_char_boundary(&st.value, st.caret);
        }
        true
    }

    /// Drop device focus from `id`. Returns `false` if it didn't have it.
    pub fn blur(&mut self, id: InputId) -> bool {
        if self.focused != Some(id) {
            return false;
        }
        self.focused = None;
        true
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.focused = None;
    }
}
