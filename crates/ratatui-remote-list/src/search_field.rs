use crate::input::InputEvent;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::theme::Theme;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use unicode_width::UnicodeWidthChar;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchFieldAction {
    None,
    /// The value changed; forward it to the search path.
    Changed,
    /// The field gave up focus through the keyboard (Esc on an empty field).
    Left,
}

/// Single-line search input: value, char cursor, focus flag. Esc clears a dirty field;
/// Esc on an empty field leaves it (the clear/back affordances of a search box).
///
/// The field never performs I/O; the owner reads [`value`](Self::value) after a `Changed`
/// action and decides what to do with it.
#[derive(Clone, Debug, Default)]
pub struct SearchField {
    value: String,
    cursor: usize, // char index within value
    focused: bool,
}

impl SearchField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn handle_event(&mut self, event: InputEvent) -> SearchFieldAction {
        if !self.focused {
            return SearchFieldAction::None;
        }
        match event {
            InputEvent::Key(key) => self.handle_key(key),
            InputEvent::Paste(text) => {
                if text.is_empty() {
                    SearchFieldAction::None
                } else {
                    for c in text.chars().filter(|c| !c.is_control()) {
                        self.insert(c);
                    }
                    SearchFieldAction::Changed
                }
            }
            _ => SearchFieldAction::None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> SearchFieldAction {
        match key.code {
            KeyCode::Char(c) if key.is_plain() => {
                self.insert(c);
                SearchFieldAction::Changed
            }
            KeyCode::Backspace => {
                if self.cursor == 0 {
                    return SearchFieldAction::None;
                }
                self.cursor -= 1;
                let at = self.byte_at(self.cursor);
                self.value.remove(at);
                SearchFieldAction::Changed
            }
            KeyCode::Delete => {
                let at = self.byte_at(self.cursor);
                if at >= self.value.len() {
                    return SearchFieldAction::None;
                }
                self.value.remove(at);
                SearchFieldAction::Changed
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                SearchFieldAction::None
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.value.chars().count());
                SearchFieldAction::None
            }
            KeyCode::Home => {
                self.cursor = 0;
                SearchFieldAction::None
            }
            KeyCode::End => {
                self.cursor = self.value.chars().count();
                SearchFieldAction::None
            }
            KeyCode::Esc => {
                if self.value.is_empty() {
                    self.focused = false;
                    SearchFieldAction::Left
                } else {
                    self.clear();
                    SearchFieldAction::Changed
                }
            }
            _ => SearchFieldAction::None,
        }
    }

    fn insert(&mut self, c: char) {
        let at = self.byte_at(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    fn byte_at(&self, char_idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_idx)
            .map(|(b, _)| b)
            .unwrap_or(self.value.len())
    }

    /// Display column of the cursor, in terminal cells.
    fn cursor_col(&self) -> usize {
        self.value
            .chars()
            .take(self.cursor)
            .map(|c| UnicodeWidthChar::width(c).unwrap_or(0))
            .sum()
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme, placeholder: &str) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        buf.set_style(area, theme.field);

        // Scroll horizontally so the cursor stays on screen.
        let avail = area.width as usize;
        let start_col = if self.focused {
            self.cursor_col().saturating_sub(avail.saturating_sub(1))
        } else {
            0
        };

        if self.value.is_empty() && !placeholder.is_empty() {
            buf.set_stringn(area.x, area.y, placeholder, avail, theme.text_muted);
        } else {
            let visible = slice_by_cols(&self.value, start_col, avail);
            buf.set_stringn(area.x, area.y, &visible, avail, theme.field);
        }

        if self.focused {
            let cursor_x = (self.cursor_col() - start_col).min(avail - 1) as u16;
            let cell_area = Rect::new(area.x + cursor_x, area.y, 1, 1);
            buf.set_style(cell_area, theme.field_cursor);
        }
    }
}

fn slice_by_cols(input: &str, start_col: usize, max_cols: usize) -> String {
    let mut col = 0usize;
    let mut out_cols = 0usize;
    let mut out = String::new();
    for c in input.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if w == 0 {
            continue;
        }
        if col + w <= start_col {
            col += w;
            continue;
        }
        if out_cols + w > max_cols {
            break;
        }
        out.push(c);
        col += w;
        out_cols += w;
    }
    out
}
