//! Type definitions for the selector and its state machine.
//!
//! [`SelectorState`] is a plain value: [`SelectorState::apply_event`] returns
//! the next state without touching the terminal, so the whole keystroke
//! handling can be tested without any I/O.

use std::ops::Range;

use itertools::Itertools;

/// A keystroke, decoded from the raw bytes read from the terminal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// Down arrow or Tab
    Down,
    /// Up arrow or Shift-Tab
    Up,
    /// Carriage return, line feed or both
    Confirm,
    Escape,
    /// Ctrl-C
    Interrupt,
    /// Backspace or Delete
    Backspace,
    /// Printable text to append to the search
    Text(String),
    /// Anything else, such as left/right arrows. Never produced by the decoder.
    Ignored,
}

/// How the selector ended, if it has.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    Pending,
    /// Index into the full option list
    Confirmed(usize),
    Cancelled,
}

/// What the user picked.
///
/// On cancellation `value` still holds the option that was highlighted at
/// that moment, or `None` if the search matched nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Choice {
    pub value: Option<String>,
    pub confirmed: bool,
}

impl Choice {
    /// The value, but only if the user confirmed it.
    #[must_use]
    pub fn confirmed_value(self) -> Option<String> {
        if self.confirmed {
            self.value
        } else {
            None
        }
    }
}

/// Indexes of the options containing `search_text`, ignoring case.
///
/// An empty search matches every option. The original order is kept.
#[must_use]
pub fn filter_options(options: &[String], search_text: &str) -> Vec<usize> {
    let needle = search_text.to_lowercase();
    options
        .iter()
        .positions(|option| option.to_lowercase().contains(&needle))
        .collect()
}

/// Complete state of one selector invocation.
#[derive(Clone, PartialEq, Debug)]
pub struct SelectorState<'a> {
    options: &'a [String],
    search_text: String,
    /// Indexes into `options` matching the search
    filtered: Vec<usize>,
    /// Index into `filtered`
    selected_index: usize,
    /// Row of the selected item within the viewport
    selected_line: usize,
    viewport_height: usize,
    termination: Termination,
}

impl<'a> SelectorState<'a> {
    #[must_use]
    pub fn new(options: &'a [String], viewport_height: usize) -> Self {
        Self {
            options,
            search_text: String::new(),
            filtered: filter_options(options, ""),
            selected_index: 0,
            selected_line: 0,
            viewport_height: viewport_height.max(1),
            termination: Termination::Pending,
        }
    }

    #[must_use]
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    #[must_use]
    pub fn filtered(&self) -> &[usize] {
        &self.filtered
    }

    #[must_use]
    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    #[must_use]
    pub fn selected_line(&self) -> usize {
        self.selected_line
    }

    #[must_use]
    pub fn termination(&self) -> Termination {
        self.termination
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.termination != Termination::Pending
    }

    /// The option at `position` in the filtered list.
    #[must_use]
    pub fn filtered_option(&self, position: usize) -> Option<&'a str> {
        let options = self.options;
        self.filtered
            .get(position)
            .map(|&index| options[index].as_str())
    }

    /// The option under the cursor.
    #[must_use]
    pub fn highlighted(&self) -> Option<&'a str> {
        self.filtered_option(self.selected_index)
    }

    /// Positions in the filtered list currently inside the viewport.
    #[must_use]
    pub fn visible_range(&self) -> Range<usize> {
        if self.filtered.is_empty() {
            return 0..0;
        }
        let start = self.selected_index - self.selected_line;
        let end = (start + self.viewport_height).min(self.filtered.len());
        start..end
    }

    /// One-based position of the cursor for the status line, 0 when nothing matches.
    #[must_use]
    pub fn position(&self) -> usize {
        (self.selected_index + 1).min(self.filtered.len())
    }

    #[must_use]
    pub fn choice(&self) -> Choice {
        match self.termination {
            Termination::Confirmed(index) => Choice {
                value: Some(self.options[index].clone()),
                confirmed: true,
            },
            Termination::Pending | Termination::Cancelled => Choice {
                value: self.highlighted().map(ToString::to_string),
                confirmed: false,
            },
        }
    }

    /// Returns the state after `event`. A finished state never changes.
    #[must_use]
    pub fn apply_event(&self, event: &InputEvent) -> Self {
        let mut next = self.clone();
        if self.is_finished() {
            return next;
        }

        match event {
            InputEvent::Down => next.move_down(),
            InputEvent::Up => next.move_up(),
            InputEvent::Confirm => {
                if let Some(&index) = next.filtered.get(next.selected_index) {
                    next.termination = Termination::Confirmed(index);
                }
            }
            InputEvent::Escape | InputEvent::Interrupt => {
                next.termination = Termination::Cancelled;
            }
            InputEvent::Backspace => {
                if next.search_text.pop().is_some() {
                    next.refilter();
                }
            }
            InputEvent::Text(text) => {
                next.search_text.push_str(text);
                next.refilter();
            }
            InputEvent::Ignored => {}
        }

        next
    }

    fn move_down(&mut self) {
        if self.filtered.is_empty() {
            return;
        }

        if self.selected_index + 1 < self.filtered.len() {
            self.selected_index += 1;
            if self.selected_line + 1 < self.viewport_height {
                self.selected_line += 1;
            }
        } else {
            self.selected_index = 0;
            self.selected_line = 0;
        }
    }

    fn move_up(&mut self) {
        if self.filtered.is_empty() {
            return;
        }

        if self.selected_index > 0 {
            self.selected_index -= 1;
            self.selected_line = self.selected_line.saturating_sub(1);
        } else {
            // Wrap to the last item, drawn on the last physical row
            self.selected_index = self.filtered.len() - 1;
            self.selected_line = self.viewport_height.min(self.filtered.len()) - 1;
        }
    }

    fn refilter(&mut self) {
        self.filtered = filter_options(self.options, &self.search_text);
        self.selected_index = 0;
        self.selected_line = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    fn text(value: &str) -> InputEvent {
        InputEvent::Text(value.to_string())
    }

    fn apply_all<'a>(state: SelectorState<'a>, events: &[InputEvent]) -> SelectorState<'a> {
        events
            .iter()
            .fold(state, |state, event| state.apply_event(event))
    }

    #[test]
    fn test_empty_search_matches_everything_in_order() {
        let options = options(&["alpha", "beta", "gamma"]);
        assert_eq!(filter_options(&options, ""), vec![0, 1, 2]);
        assert_eq!(SelectorState::new(&options, 5).filtered(), &[0, 1, 2]);
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let options = options(&["Apple", "banana", "APRICOT", "grape"]);
        assert_eq!(filter_options(&options, "ap"), vec![0, 2, 3]);
        assert_eq!(filter_options(&options, "AN"), vec![1]);
        assert_eq!(filter_options(&options, "xyz"), Vec::<usize>::new());
    }

    #[test]
    fn test_filter_is_deterministic() {
        let options = options(&["one", "two", "three", "twenty"]);
        assert_eq!(filter_options(&options, "tw"), filter_options(&options, "tw"));
        assert_eq!(filter_options(&options, "tw"), vec![1, 3]);
    }

    #[test]
    fn test_down_wraps_from_last_to_first() {
        let options = options(&["alpha", "beta", "gamma"]);
        let state = apply_all(
            SelectorState::new(&options, 5),
            &[InputEvent::Down, InputEvent::Down],
        );
        assert_eq!(state.highlighted(), Some("gamma"));

        let state = state.apply_event(&InputEvent::Down);
        assert_eq!(state.selected_index(), 0);
        assert_eq!(state.selected_line(), 0);
        assert_eq!(state.highlighted(), Some("alpha"));
    }

    #[test]
    fn test_up_wraps_from_first_to_last() {
        let options = options(&["alpha", "beta", "gamma"]);
        let state = SelectorState::new(&options, 5).apply_event(&InputEvent::Up);
        assert_eq!(state.highlighted(), Some("gamma"));
        assert_eq!(state.selected_index(), 2);
        // Fewer options than rows: pinned to the last drawn row
        assert_eq!(state.selected_line(), 2);
        assert_eq!(state.visible_range(), 0..3);
    }

    #[test]
    fn test_up_wrap_in_long_list_shows_the_tail() {
        let options: Vec<String> = (0..8).map(|i| format!("option {i}")).collect();
        let state = SelectorState::new(&options, 5).apply_event(&InputEvent::Up);
        assert_eq!(state.selected_index(), 7);
        assert_eq!(state.selected_line(), 4);
        assert_eq!(state.visible_range(), 3..8);
    }

    #[test]
    fn test_viewport_scrolls_with_selection() {
        let options: Vec<String> = (0..8).map(|i| format!("option {i}")).collect();
        let down = vec![InputEvent::Down; 6];
        let state = apply_all(SelectorState::new(&options, 5), &down);
        assert_eq!(state.selected_index(), 6);
        assert_eq!(state.selected_line(), 4);
        assert_eq!(state.visible_range(), 2..7);

        let state = state.apply_event(&InputEvent::Up);
        assert_eq!(state.selected_index(), 5);
        assert_eq!(state.selected_line(), 3);
        assert_eq!(state.visible_range(), 2..7);
    }

    #[test]
    fn test_text_resets_selection_and_refilters() {
        let options = options(&["apple", "banana", "apricot"]);
        let state = apply_all(
            SelectorState::new(&options, 5),
            &[InputEvent::Down, text("a"), text("p")],
        );
        assert_eq!(state.search_text(), "ap");
        assert_eq!(state.filtered(), &[0, 2]);
        assert_eq!(state.selected_index(), 0);
        assert_eq!(state.selected_line(), 0);
    }

    #[test]
    fn test_backspace_on_empty_search_is_idempotent() {
        let options = options(&["alpha", "beta"]);
        let state = SelectorState::new(&options, 5).apply_event(&InputEvent::Down);
        let once = state.apply_event(&InputEvent::Backspace);
        let twice = once.apply_event(&InputEvent::Backspace);
        assert_eq!(once, state);
        assert_eq!(twice, state);
    }

    #[test]
    fn test_backspace_removes_last_character() {
        let options = options(&["alpha", "beta", "zeta"]);
        let state = apply_all(
            SelectorState::new(&options, 5),
            &[text("ze"), InputEvent::Backspace],
        );
        assert_eq!(state.search_text(), "z");
        assert_eq!(state.filtered(), &[2]);

        let state = state.apply_event(&InputEvent::Backspace);
        assert_eq!(state.search_text(), "");
        assert_eq!(state.filtered(), &[0, 1, 2]);
    }

    #[test]
    fn test_backspace_removes_whole_multibyte_character() {
        let options = options(&["café", "cafe"]);
        let state = apply_all(
            SelectorState::new(&options, 5),
            &[text("café"), InputEvent::Backspace],
        );
        assert_eq!(state.search_text(), "caf");
        assert_eq!(state.filtered(), &[0, 1]);
    }

    #[test]
    fn test_empty_result_is_safe_to_navigate() {
        let options = options(&["apple", "banana"]);
        let state = SelectorState::new(&options, 5).apply_event(&text("xyz"));
        assert!(state.filtered().is_empty());
        assert_eq!(state.position(), 0);
        assert_eq!(state.visible_range(), 0..0);

        let moved = apply_all(state.clone(), &[InputEvent::Down, InputEvent::Up]);
        assert_eq!(moved, state);
        assert_eq!(moved.highlighted(), None);
    }

    #[test]
    fn test_confirm_on_empty_result_is_blocked() {
        let options = options(&["apple", "banana"]);
        let state = SelectorState::new(&options, 5).apply_event(&text("xyz"));
        let confirmed = state.apply_event(&InputEvent::Confirm);
        assert_eq!(confirmed.termination(), Termination::Pending);
        assert!(!confirmed.is_finished());
    }

    #[test]
    fn test_confirm_records_index_into_full_list() {
        let options = options(&["apple", "banana", "apricot"]);
        let state = apply_all(
            SelectorState::new(&options, 5),
            &[text("ap"), InputEvent::Down, InputEvent::Confirm],
        );
        assert_eq!(state.termination(), Termination::Confirmed(2));
        assert_eq!(
            state.choice(),
            Choice {
                value: Some("apricot".to_string()),
                confirmed: true
            }
        );
    }

    #[test]
    fn test_escape_keeps_highlighted_value() {
        let options = options(&["alpha", "beta", "gamma"]);
        let state = apply_all(
            SelectorState::new(&options, 5),
            &[text("be"), InputEvent::Escape],
        );
        assert_eq!(state.termination(), Termination::Cancelled);
        let choice = state.choice();
        assert_eq!(choice.value.as_deref(), Some("beta"));
        assert!(!choice.confirmed);
        assert_eq!(choice.confirmed_value(), None);
    }

    #[test]
    fn test_finished_state_ignores_further_events() {
        let options = options(&["alpha", "beta"]);
        let state = SelectorState::new(&options, 5).apply_event(&InputEvent::Interrupt);
        assert_eq!(state.termination(), Termination::Cancelled);
        assert_eq!(state.apply_event(&InputEvent::Down), state);
        assert_eq!(state.apply_event(&InputEvent::Confirm), state);
    }

    #[test]
    fn test_zero_viewport_height_is_raised_to_one() {
        let options = options(&["alpha", "beta"]);
        let state = SelectorState::new(&options, 0).apply_event(&InputEvent::Down);
        assert_eq!(state.visible_range(), 1..2);
    }
}
