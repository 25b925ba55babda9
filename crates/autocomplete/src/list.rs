use core_types::Item;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowKind {
    Item,
    NoResults,
    Error,
    MinChars,
}

impl RowKind {
    pub fn class(self) -> &'static str {
        match self {
            RowKind::Item => "mp_item",
            RowKind::NoResults => "mp_no_results",
            RowKind::Error => "mp_error",
            RowKind::MinChars => "mp_min_chars",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub kind: RowKind,
    /// Markup produced by the formatting hook.
    pub html: String,
    /// The result this row was built from. Only `RowKind::Item` rows carry one.
    pub item: Option<Item>,
    pub selectable: bool,
    pub hidden: bool,
}

impl Row {
    pub fn item(html: String, item: Item, selectable: bool) -> Self {
        Self {
            kind: RowKind::Item,
            html,
            item: Some(item),
            selectable,
            hidden: false,
        }
    }

    pub fn message(kind: RowKind, html: String) -> Self {
        Self {
            kind,
            html,
            item: None,
            selectable: false,
            hidden: false,
        }
    }

    /// Participates in keyboard/mouse navigation.
    pub fn is_navigable(&self) -> bool {
        self.selectable && !self.hidden
    }
}

/// The rendered results list: ordered rows, visibility and the single
/// highlight slot.
///
/// The highlight is one `Option<usize>`, so two rows can never be highlighted
/// at once.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultsList {
    rows: Vec<Row>,
    visible: bool,
    highlighted: Option<usize>,
}

impl ResultsList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn highlighted_row(&self) -> Option<&Row> {
        self.highlighted.and_then(|i| self.rows.get(i))
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Drop all rows (and the highlight). Visibility is left alone.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.highlighted = None;
    }

    /// Make the list visible, but only if it has rows. Returns the new visibility.
    pub fn show(&mut self) -> bool {
        if !self.rows.is_empty() {
            self.visible = true;
        }
        self.visible
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn hide_and_clear(&mut self) {
        self.hide();
        self.clear();
    }

    /// Replace the highlight. Out-of-range indices clear it.
    pub fn set_highlight(&mut self, index: Option<usize>) {
        self.highlighted = index.filter(|i| *i < self.rows.len());
    }

    /// Remove the highlight from `index` if it is the highlighted row.
    pub fn unhighlight(&mut self, index: usize) {
        if self.highlighted == Some(index) {
            self.highlighted = None;
        }
    }

    /// Hide or reveal a single row (host-side filtering). Hidden rows are
    /// skipped by navigation.
    pub fn set_row_hidden(&mut self, index: usize, hidden: bool) {
        if let Some(row) = self.rows.get_mut(index) {
            row.hidden = hidden;
        }
    }

    /// Indices of selectable, visible rows in order.
    pub fn navigable(&self) -> impl DoubleEndedIterator<Item = usize> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_navigable())
            .map(|(i, _)| i)
    }
}
