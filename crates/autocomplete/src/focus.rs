//! Real vs. pseudo focus.
//!
//! `real` is true exactly while the input holds device focus. `pseudo` is true
//! from the first interaction (focus, or a press on the list) until the widget
//! is dismissed. A click on a list row blurs the input before the row's
//! mouseup arrives, so the blur only schedules a dismiss check; a pending
//! press on the list cancels it.

use std::time::{Duration, Instant};

use crate::timer::Timer;

/// How long a blur waits before deciding whether to dismiss.
pub const BLUR_DISMISS_DELAY: Duration = Duration::from_millis(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusOutcome {
    /// The input already had focus.
    Ignored,
    /// Focus returned after a mouse selection. No new request.
    Resumed,
    /// A fresh focus-in. The widget should announce it and request.
    Entered,
}

#[derive(Debug, Default)]
pub struct FocusState {
    real: bool,
    pseudo: bool,
    mousedown_on_list: bool,
    selected_via_mouseup: bool,
    blur_check: Timer<()>,
}

impl FocusState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_real(&self) -> bool {
        self.real
    }

    pub fn is_pseudo(&self) -> bool {
        self.pseudo
    }

    pub fn mousedown_on_list(&self) -> bool {
        self.mousedown_on_list
    }

    pub fn blur_deadline(&self) -> Option<Instant> {
        self.blur_check.deadline()
    }

    pub fn on_input_focus(&mut self) -> FocusOutcome {
        if self.real {
            return FocusOutcome::Ignored;
        }
        self.real = true;
        self.pseudo = true;

        if self.selected_via_mouseup {
            self.selected_via_mouseup = false;
            log::trace!(target: "autocomplete.focus", "focus after mouse selection");
            FocusOutcome::Resumed
        } else {
            FocusOutcome::Entered
        }
    }

    pub fn on_input_blur(&mut self, now: Instant) {
        self.real = false;
        self.blur_check.arm(now + BLUR_DISMISS_DELAY, ());
    }

    pub fn on_list_mousedown(&mut self) {
        self.mousedown_on_list = true;
    }

    /// A row was picked with the mouse; the next focus-in is its echo.
    pub fn note_mouse_selection(&mut self) {
        self.selected_via_mouseup = true;
    }

    /// Returns `true` when the click landed outside while the list was up
    /// and the input is not focused, i.e. the widget should dismiss.
    pub fn on_document_mouseup(&mut self, list_visible: bool) -> bool {
        self.mousedown_on_list = false;
        if !self.real && list_visible {
            self.pseudo = false;
            self.blur_check.clear();
            return true;
        }
        false
    }

    /// Run the deferred blur check. Returns `true` if the widget should dismiss.
    pub fn poll_blur(&mut self, now: Instant) -> bool {
        if self.blur_check.fire(now).is_none() {
            return false;
        }
        if self.mousedown_on_list {
            log::trace!(target: "autocomplete.focus", "blur deferred: press on list");
            return false;
        }
        if self.real || !self.pseudo {
            return false;
        }
        self.pseudo = false;
        true
    }

    /// Forget everything, timers included.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
