//! Searchable single/multi select.
//!
//! [`SelectState`] is a controlled widget: it owns only transient menu state
//! (open flag, search text, highlight, menu position). The current selection
//! is supplied by the caller through [`SelectState::set_selection`], and every
//! user action that would change it returns the proposed [`Selection`]
//! instead of applying it. The caller decides whether to store it.
//!
//! ```ignore
//! if let KeyResult::Changed(selection) = select.handle_key(SelectKey::Enter) {
//!     draft.voice = selection.first_value().map(str::to_string);
//!     select.set_selection(selection);
//! }
//! ```

use super::overlay::{menu_position, Bounds, MenuPosition, ScrollOffset};

/// Text shown in place of an empty filtered list.
pub const NO_OPTIONS: &str = "No options";

/// One selectable entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// Identity used for membership tests; must be unique within a list.
    pub value: String,
    /// Display text, also the search target.
    pub label: String,
    pub icon: Option<String>,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Label prefixed with the icon, if any.
    pub fn display(&self) -> String {
        match &self.icon {
            Some(icon) => format!("{} {}", icon, self.label),
            None => self.label.clone(),
        }
    }
}

/// Current value of a select, shaped by its mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Single(Option<SelectOption>),
    /// Ordered by the time each option was picked.
    Multi(Vec<SelectOption>),
}

impl Selection {
    pub fn empty(is_multi: bool) -> Self {
        if is_multi {
            Selection::Multi(Vec::new())
        } else {
            Selection::Single(None)
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Selection::Single(opt) => opt.is_none(),
            Selection::Multi(items) => items.is_empty(),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        match self {
            Selection::Single(opt) => opt.as_ref().is_some_and(|o| o.value == value),
            Selection::Multi(items) => items.iter().any(|o| o.value == value),
        }
    }

    pub fn options(&self) -> Vec<&SelectOption> {
        match self {
            Selection::Single(opt) => opt.iter().collect(),
            Selection::Multi(items) => items.iter().collect(),
        }
    }

    pub fn values(&self) -> Vec<String> {
        self.options().into_iter().map(|o| o.value.clone()).collect()
    }

    pub fn first_value(&self) -> Option<&str> {
        self.options().first().map(|o| o.value.as_str())
    }
}

/// Mode flags fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectConfig {
    pub is_multi: bool,
    pub is_searchable: bool,
    /// Render the menu on the top layer, positioned from the anchor.
    pub overlay: bool,
    pub placeholder: String,
}

impl SelectConfig {
    pub fn single(placeholder: impl Into<String>) -> Self {
        Self {
            is_multi: false,
            is_searchable: true,
            overlay: true,
            placeholder: placeholder.into(),
        }
    }

    pub fn multi(placeholder: impl Into<String>) -> Self {
        Self {
            is_multi: true,
            ..Self::single(placeholder)
        }
    }

    pub fn searchable(mut self, searchable: bool) -> Self {
        self.is_searchable = searchable;
        self
    }

    pub fn overlay(mut self, overlay: bool) -> Self {
        self.overlay = overlay;
        self
    }
}

/// Keys the select understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectKey {
    Up,
    Down,
    Enter,
    Escape,
    Backspace,
    Char(char),
}

/// Outcome of a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult {
    /// Not handled; let the surrounding screen act on it.
    Ignored,
    /// Handled, selection unchanged.
    Consumed,
    /// Handled and the caller should adopt this selection.
    Changed(Selection),
}

/// What the closed control shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlDisplay<'a> {
    Placeholder(&'a str),
    Single(&'a SelectOption),
    Chips(&'a [SelectOption]),
}

#[derive(Debug, Clone)]
pub struct SelectState {
    config: SelectConfig,
    options: Vec<SelectOption>,
    selection: Selection,
    open: bool,
    search: String,
    highlight: Option<usize>,
    menu: Option<MenuPosition>,
}

impl SelectState {
    pub fn new(config: SelectConfig, options: Vec<SelectOption>) -> Self {
        let selection = Selection::empty(config.is_multi);
        Self {
            config,
            options,
            selection,
            open: false,
            search: String::new(),
            highlight: None,
            menu: None,
        }
    }

    pub fn config(&self) -> &SelectConfig {
        &self.config
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    /// Replace the option list, e.g. after a fetch completes.
    pub fn set_options(&mut self, options: Vec<SelectOption>) {
        self.options = options;
        self.highlight = None;
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Adopt a selection from the owner. A value of the wrong shape is
    /// converted to this select's mode.
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = match (self.config.is_multi, selection) {
            (true, Selection::Single(opt)) => Selection::Multi(opt.into_iter().collect()),
            (false, Selection::Multi(items)) => Selection::Single(items.into_iter().next()),
            (_, s) => s,
        };
    }

    /// Select options by value, ignoring values not in the list.
    pub fn set_selected_values<S: AsRef<str>>(&mut self, values: &[S]) {
        let picked: Vec<SelectOption> = values
            .iter()
            .filter_map(|v| self.options.iter().find(|o| o.value == v.as_ref()).cloned())
            .collect();
        self.set_selection(Selection::Multi(picked));
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Index into [`Self::filtered`], `None` when nothing is highlighted.
    pub fn highlight(&self) -> Option<usize> {
        self.highlight
    }

    /// Overlay position computed when the menu last opened.
    pub fn menu_position(&self) -> Option<MenuPosition> {
        self.menu
    }

    /// Options whose label contains the search text, ignoring case.
    pub fn filtered(&self) -> Vec<&SelectOption> {
        let needle = self.search.to_lowercase();
        self.options
            .iter()
            .filter(|o| needle.is_empty() || o.label.to_lowercase().contains(&needle))
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Open / close
    // ─────────────────────────────────────────────────────────────────────────

    /// Activate the closed control. `anchor` is where the control was drawn.
    pub fn toggle_open(&mut self, anchor: Bounds, scroll: ScrollOffset) {
        if self.open {
            self.close();
        } else {
            self.open = true;
            self.search.clear();
            self.highlight = None;
            self.menu = self.config.overlay.then(|| menu_position(anchor, scroll));
        }
    }

    /// Close and discard search text and highlight. Selection is untouched.
    pub fn close(&mut self) {
        self.open = false;
        self.search.clear();
        self.highlight = None;
        self.menu = None;
    }

    /// A pointer went down somewhere that is neither the control nor the menu.
    pub fn pointer_down_outside(&mut self) {
        if self.open {
            self.close();
        }
    }

    /// Route a pointer-down by position. Returns true when it closed the menu.
    pub fn pointer_down(&mut self, x: i32, y: i32, control: Bounds, menu: Option<Bounds>) -> bool {
        if !self.open {
            return false;
        }
        let inside = control.contains(x, y) || menu.is_some_and(|m| m.contains(x, y));
        if !inside {
            self.close();
        }
        !inside
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Search
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_search(&mut self, text: impl Into<String>) {
        if !self.open || !self.config.is_searchable {
            return;
        }
        self.search = text.into();
        self.highlight = None;
    }

    pub fn push_search(&mut self, c: char) {
        let mut text = self.search.clone();
        text.push(c);
        self.set_search(text);
    }

    pub fn pop_search(&mut self) {
        let mut text = self.search.clone();
        if text.pop().is_some() {
            self.set_search(text);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Choosing
    // ─────────────────────────────────────────────────────────────────────────

    /// Pick the option at `index` in the filtered list.
    pub fn choose(&mut self, index: usize) -> Option<Selection> {
        let option = self.filtered().get(index).map(|o| (*o).clone())?;

        if self.config.is_multi {
            let next = self.toggled(option);
            self.search.clear();
            self.highlight = None;
            Some(next)
        } else {
            self.close();
            Some(Selection::Single(Some(option)))
        }
    }

    /// Pick by value, as when clicking a rendered row.
    pub fn choose_value(&mut self, value: &str) -> Option<Selection> {
        let index = self.filtered().iter().position(|o| o.value == value)?;
        self.choose(index)
    }

    /// Remove affordance on a chip. Does not open the menu.
    pub fn remove_chip(&self, value: &str) -> Option<Selection> {
        let Selection::Multi(items) = &self.selection else {
            return None;
        };
        let option = items.iter().find(|o| o.value == value)?.clone();
        Some(self.toggled(option))
    }

    fn toggled(&self, option: SelectOption) -> Selection {
        let mut items = match &self.selection {
            Selection::Multi(items) => items.clone(),
            Selection::Single(opt) => opt.iter().cloned().collect(),
        };
        if let Some(pos) = items.iter().position(|o| o.value == option.value) {
            items.remove(pos);
        } else {
            items.push(option);
        }
        Selection::Multi(items)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Keyboard
    // ─────────────────────────────────────────────────────────────────────────

    /// Keyboard handling while the menu is open. Closed menus ignore keys.
    pub fn handle_key(&mut self, key: SelectKey) -> KeyResult {
        if !self.open {
            return KeyResult::Ignored;
        }

        let len = self.filtered().len();
        match key {
            SelectKey::Down => {
                if len > 0 {
                    self.highlight = Some(match self.highlight {
                        None => 0,
                        Some(i) => (i + 1).min(len - 1),
                    });
                }
                KeyResult::Consumed
            }
            SelectKey::Up => {
                if len > 0 {
                    self.highlight = Some(self.highlight.map_or(0, |i| i.saturating_sub(1)));
                }
                KeyResult::Consumed
            }
            SelectKey::Enter => {
                let chosen = match self.highlight {
                    Some(i) => self.choose(i),
                    None => None,
                };
                match chosen {
                    Some(selection) => KeyResult::Changed(selection),
                    None => KeyResult::Consumed,
                }
            }
            SelectKey::Escape => {
                self.close();
                KeyResult::Consumed
            }
            SelectKey::Backspace if self.config.is_searchable => {
                self.pop_search();
                KeyResult::Consumed
            }
            SelectKey::Char(c) if self.config.is_searchable => {
                self.push_search(c);
                KeyResult::Consumed
            }
            _ => KeyResult::Ignored,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Closed control
    // ─────────────────────────────────────────────────────────────────────────

    pub fn display(&self) -> ControlDisplay<'_> {
        match &self.selection {
            Selection::Single(Some(opt)) => ControlDisplay::Single(opt),
            Selection::Multi(items) if !items.is_empty() => ControlDisplay::Chips(items),
            _ => ControlDisplay::Placeholder(&self.config.placeholder),
        }
    }

    /// Flat text for the closed control.
    pub fn display_text(&self) -> String {
        match self.display() {
            ControlDisplay::Placeholder(p) => p.to_string(),
            ControlDisplay::Single(opt) => opt.display(),
            ControlDisplay::Chips(items) => items
                .iter()
                .map(SelectOption::display)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fruit() -> Vec<SelectOption> {
        vec![
            SelectOption::new("A", "Apple"),
            SelectOption::new("B", "Banana"),
            SelectOption::new("C", "Cherry"),
        ]
    }

    fn opened(config: SelectConfig) -> SelectState {
        let mut select = SelectState::new(config, fruit());
        select.toggle_open(Bounds::new(0, 0, 20, 1), ScrollOffset::default());
        select
    }

    fn values(selection: &Selection) -> Vec<String> {
        selection.values()
    }

    fn assert_highlight_in_range(select: &SelectState) {
        if let Some(i) = select.highlight() {
            assert!(i < select.filtered().len());
        }
    }

    #[test]
    fn test_search_filters_case_insensitively() {
        let mut select = opened(SelectConfig::single("Pick"));
        select.set_search("an");
        let labels: Vec<_> = select.filtered().iter().map(|o| o.value.clone()).collect();
        assert_eq!(labels, vec!["B"]);

        select.set_search("AN");
        assert_eq!(select.filtered().len(), 1);

        select.set_search("");
        assert_eq!(select.filtered().len(), 3);
    }

    #[test]
    fn test_filter_matches_definition_for_many_terms() {
        let mut select = opened(SelectConfig::single("Pick"));
        for term in ["", "a", "e", "rr", "x", "APP", "nana", "y"] {
            select.set_search(term);
            let expected: Vec<_> = fruit()
                .into_iter()
                .filter(|o| o.label.to_lowercase().contains(&term.to_lowercase()))
                .collect();
            let got: Vec<_> = select.filtered().into_iter().cloned().collect();
            assert_eq!(got, expected, "term {:?}", term);
            assert_eq!(select.highlight(), None);
        }
    }

    #[test]
    fn test_multi_toggle_appends_then_removes() {
        let mut select = opened(SelectConfig::multi("Tools"));
        select.set_selection(Selection::Multi(vec![SelectOption::new("A", "Apple")]));

        let next = select.choose_value("B").unwrap();
        assert_eq!(values(&next), vec!["A", "B"]);
        select.set_selection(next);
        assert!(select.is_open());

        let next = select.choose_value("A").unwrap();
        assert_eq!(values(&next), vec!["B"]);
    }

    #[test]
    fn test_multi_double_pick_is_identity_and_never_duplicates() {
        let mut select = opened(SelectConfig::multi("Tools"));
        for value in ["C", "C"] {
            let next = select.choose_value(value).unwrap();
            let vals = values(&next);
            let mut dedup = vals.clone();
            dedup.dedup();
            assert_eq!(vals, dedup);
            select.set_selection(next);
        }
        assert!(select.selection().is_empty());
    }

    #[test]
    fn test_multi_pick_clears_search_and_highlight() {
        let mut select = opened(SelectConfig::multi("Tools"));
        select.set_search("ch");
        select.handle_key(SelectKey::Down);
        let result = select.handle_key(SelectKey::Enter);
        assert!(matches!(result, KeyResult::Changed(Selection::Multi(ref v)) if v.len() == 1));
        assert_eq!(select.search(), "");
        assert_eq!(select.highlight(), None);
        assert!(select.is_open());
    }

    #[test]
    fn test_single_pick_closes_and_shows_label() {
        let mut select = SelectState::new(SelectConfig::single("Select agent"), fruit());
        assert_eq!(select.display_text(), "Select agent");

        select.toggle_open(Bounds::default(), ScrollOffset::default());
        let next = select.choose_value("C").unwrap();
        assert_eq!(next, Selection::Single(Some(SelectOption::new("C", "Cherry"))));
        assert!(!select.is_open());
        assert_eq!(select.search(), "");
        assert_eq!(select.highlight(), None);

        select.set_selection(next);
        assert_eq!(select.display_text(), "Cherry");
    }

    #[test]
    fn test_single_pick_always_yields_one_option() {
        for value in ["A", "B", "C"] {
            let mut select = opened(SelectConfig::single("Pick"));
            match select.choose_value(value) {
                Some(Selection::Single(Some(opt))) => assert_eq!(opt.value, value),
                other => panic!("unexpected {:?}", other),
            }
            assert!(!select.is_open());
        }
    }

    #[test]
    fn test_arrow_keys_clamp() {
        let mut select = opened(SelectConfig::single("Pick"));
        for _ in 0..10 {
            assert_eq!(select.handle_key(SelectKey::Down), KeyResult::Consumed);
            assert_highlight_in_range(&select);
        }
        assert_eq!(select.highlight(), Some(2));

        for _ in 0..10 {
            select.handle_key(SelectKey::Up);
            assert_highlight_in_range(&select);
        }
        assert_eq!(select.highlight(), Some(0));
    }

    #[test]
    fn test_arrows_on_empty_filter_keep_no_highlight() {
        let mut select = opened(SelectConfig::single("Pick"));
        select.set_search("zzz");
        assert!(select.filtered().is_empty());
        select.handle_key(SelectKey::Down);
        select.handle_key(SelectKey::Up);
        assert_eq!(select.highlight(), None);
        assert_eq!(select.handle_key(SelectKey::Enter), KeyResult::Consumed);
    }

    #[test]
    fn test_typing_resets_highlight() {
        let mut select = opened(SelectConfig::single("Pick"));
        select.handle_key(SelectKey::Down);
        select.handle_key(SelectKey::Down);
        assert_eq!(select.highlight(), Some(1));

        select.handle_key(SelectKey::Char('e'));
        assert_eq!(select.search(), "e");
        assert_eq!(select.highlight(), None);

        select.handle_key(SelectKey::Backspace);
        assert_eq!(select.search(), "");
        assert_eq!(select.highlight(), None);
    }

    #[test]
    fn test_escape_and_outside_click_preserve_selection() {
        let initial = Selection::Single(Some(SelectOption::new("A", "Apple")));

        let mut select = opened(SelectConfig::single("Pick"));
        select.set_selection(initial.clone());
        select.set_search("ch");
        select.handle_key(SelectKey::Down);
        assert_eq!(select.handle_key(SelectKey::Escape), KeyResult::Consumed);
        assert!(!select.is_open());
        assert_eq!(select.search(), "");
        assert_eq!(select.highlight(), None);
        assert_eq!(select.selection(), &initial);

        let mut select = opened(SelectConfig::single("Pick"));
        select.set_selection(initial.clone());
        select.set_search("ch");
        select.handle_key(SelectKey::Down);
        let control = Bounds::new(0, 0, 20, 1);
        assert!(select.pointer_down(50, 50, control, None));
        assert_eq!(select.search(), "");
        assert_eq!(select.highlight(), None);
        assert_eq!(select.selection(), &initial);
    }

    #[test]
    fn test_pointer_inside_menu_keeps_open() {
        let mut select = opened(SelectConfig::single("Pick"));
        let control = Bounds::new(0, 0, 20, 1);
        let menu = select.menu_position().map(|m| m.bounds(4));
        assert!(!select.pointer_down(5, 2, control, menu));
        assert!(select.is_open());
    }

    #[test]
    fn test_closed_select_ignores_keys() {
        let mut select = SelectState::new(SelectConfig::single("Pick"), fruit());
        assert_eq!(select.handle_key(SelectKey::Down), KeyResult::Ignored);
        assert_eq!(select.highlight(), None);
    }

    #[test]
    fn test_remove_chip_does_not_open() {
        let mut select = SelectState::new(SelectConfig::multi("Tools"), fruit());
        select.set_selected_values(&["A", "C"]);
        let next = select.remove_chip("A").unwrap();
        assert_eq!(values(&next), vec!["C"]);
        assert!(!select.is_open());
    }

    #[test]
    fn test_overlay_position_computed_on_open() {
        let mut select = SelectState::new(SelectConfig::single("Pick"), fruit());
        select.toggle_open(Bounds::new(4, 10, 30, 3), ScrollOffset { x: 0, y: 2 });
        let pos = select.menu_position().unwrap();
        assert_eq!((pos.top, pos.left, pos.width), (15, 4, 30));

        select.close();
        assert!(select.menu_position().is_none());

        let mut inline = SelectState::new(SelectConfig::single("Pick").overlay(false), fruit());
        inline.toggle_open(Bounds::new(4, 10, 30, 3), ScrollOffset::default());
        assert!(inline.menu_position().is_none());
    }

    #[test]
    fn test_empty_option_list_is_fine() {
        let mut select = SelectState::new(SelectConfig::multi("None"), Vec::new());
        select.toggle_open(Bounds::default(), ScrollOffset::default());
        assert!(select.filtered().is_empty());
        assert!(select.choose(0).is_none());
        assert_eq!(select.display_text(), "None");
    }

    #[test]
    fn test_non_searchable_ignores_typing() {
        let mut select = opened(SelectConfig::single("Pick").searchable(false));
        assert_eq!(select.handle_key(SelectKey::Char('a')), KeyResult::Ignored);
        assert_eq!(select.search(), "");
    }
}
