//! Highlight navigation and the logical selection.
//!
//! Navigation only ever lands on navigable rows (selectable and not hidden)
//! and wraps at both ends.

use core_types::Item;

use crate::list::ResultsList;

/// How a previously selected item is recognised in a fresh result set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Compare {
    #[default]
    Off,
    /// Whole-item equality (string results).
    Equal,
    /// Equality of one field of object results.
    Key(String),
}

impl Compare {
    pub fn is_on(&self) -> bool {
        !matches!(self, Compare::Off)
    }

    pub fn matches(&self, item: &Item, selected: &Item) -> bool {
        match self {
            Compare::Off => false,
            Compare::Equal => item == selected,
            Compare::Key(key) => match (item.get(key), selected.get(key)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

/// The item the user (or the `selected` option) committed to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    selected: Option<Item>,
}

impl Selection {
    pub fn get(&self) -> Option<&Item> {
        self.selected.as_ref()
    }

    pub fn set(&mut self, item: Option<Item>) {
        self.selected = item;
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_none()
    }
}

/// Highlight `index` if it is navigable. Returns whether the highlight moved there.
pub fn highlight(list: &mut ResultsList, index: usize) -> bool {
    if !list.row(index).is_some_and(|r| r.is_navigable()) {
        return false;
    }
    list.set_highlight(Some(index));
    true
}

pub fn highlight_first(list: &mut ResultsList) {
    let first = list.navigable().next();
    if let Some(first) = first {
        list.set_highlight(Some(first));
    }
}

pub fn highlight_last(list: &mut ResultsList) {
    let last = list.navigable().next_back();
    if let Some(last) = last {
        list.set_highlight(Some(last));
    }
}

/// Move to the nearest navigable row above the highlight, wrapping to the
/// last one. With nothing highlighted this lands on the last row.
pub fn highlight_prev(list: &mut ResultsList) {
    let prev = list
        .highlighted()
        .and_then(|cur| list.navigable().rev().find(|i| *i < cur));
    match prev {
        Some(i) => list.set_highlight(Some(i)),
        None => highlight_last(list),
    }
}

/// Move to the nearest navigable row below the highlight, wrapping to the
/// first one. With nothing highlighted this lands on the first row.
pub fn highlight_next(list: &mut ResultsList) {
    let next = list
        .highlighted()
        .and_then(|cur| list.navigable().find(|i| *i > cur));
    match next {
        Some(i) => list.set_highlight(Some(i)),
        None => highlight_first(list),
    }
}

/// Pick the highlight for a freshly rendered list.
///
/// The first navigable row matching `selected` under `compare` wins; otherwise
/// the first navigable row when `fallback_first` is set.
pub fn auto_highlight(
    list: &mut ResultsList,
    compare: &Compare,
    selected: Option<&Item>,
    fallback_first: bool,
) -> Option<usize> {
    let matched = match selected {
        Some(sel) if compare.is_on() => list.rows().iter().position(|row| {
            row.is_navigable()
                && row
                    .item
                    .as_ref()
                    .is_some_and(|item| compare.matches(item, sel))
        }),
        _ => None,
    };

    match matched {
        Some(i) => list.set_highlight(Some(i)),
        None if fallback_first => highlight_first(list),
        None => list.set_highlight(None),
    }
    list.highlighted()
}
