use crate::cache::PageCache;
use crate::cache::PageKey;
use crate::controller::RemoteListController;
use crate::input::InputEvent;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::query::PAGE_SIZE;
use crate::search_field::SearchField;
use crate::search_field::SearchFieldAction;
use crate::theme::Theme;
use ratatui::buffer::Buffer;
use ratatui::layout::Position;
use ratatui::layout::Rect;
use std::time::Duration;
use std::time::Instant;
use unicode_width::UnicodeWidthStr;

/// How long the result list stays up after the search field loses focus. A click on a list
/// row steals focus from the field first; the delay lets that click land before the list
/// disappears.
pub const HIDE_DELAY: Duration = Duration::from_millis(500);

#[derive(Clone, Debug)]
pub struct PickerOptions {
    /// Shown in the empty search field.
    pub placeholder: String,
    pub submit_label: String,
    pub cancel_label: String,
    /// Keep the result list visible regardless of the field's focus.
    pub permanent: bool,
    /// Rows of the result-list viewport.
    pub list_height: u16,
}

impl Default for PickerOptions {
    fn default() -> Self {
        Self {
            placeholder: "type here".into(),
            submit_label: "submit".into(),
            cancel_label: "cancel".into(),
            permanent: false,
            list_height: 10,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickerAction {
    None,
    Redraw,
}

type RowText<T> = Box<dyn Fn(&T) -> String>;
type OnSelect<T> = Box<dyn FnMut(Option<&T>)>;
type OnSubmit<T> = Box<dyn FnMut(&T)>;
type OnCancel = Box<dyn FnMut()>;

/// A selection field for one item out of a large remote collection: a search field plus an
/// incrementally loaded result list, driven by a [`RemoteListController`].
///
/// Three states:
/// - searching: the field is live; the list shows while the field is focused (or always,
///   with [`PickerOptions::permanent`]), and for [`HIDE_DELAY`] after it loses focus;
/// - list hidden: searching, but unfocused past the delay;
/// - selected: one item is held; field and list are replaced by a summary toolbar with
///   clear and (if configured) submit affordances.
///
/// Keystrokes reach the controller through its debounced search, so the host must call
/// [`tick`](Self::tick) regularly (or sleep until [`deadline`](Self::deadline)). Page
/// loading is host-driven too: after every state change, [`missing_page`](Self::missing_page)
/// says what to fetch, the host runs the controller's future, and hands the result to
/// [`insert_page`](Self::insert_page), which silently drops results that became stale
/// while in flight.
pub struct PickerView<T> {
    controller: RemoteListController<T>,
    cache: PageCache<T>,
    options: PickerOptions,
    field: SearchField,
    row_text: RowText<T>,
    selected_text: RowText<T>,
    on_select: Option<OnSelect<T>>,
    on_submit: Option<OnSubmit<T>>,
    on_cancel: Option<OnCancel>,
    selected: Option<T>,
    show_list: bool,
    hide_at: Option<Instant>,
    cursor: usize,
    scroll_top: usize,
    // Hit areas from the last render.
    field_area: Rect,
    list_area: Rect,
    clear_area: Rect,
    submit_area: Rect,
    cancel_area: Rect,
}

impl<T: Clone> PickerView<T> {
    pub fn new(
        controller: RemoteListController<T>,
        row_text: impl Fn(&T) -> String + 'static,
        selected_text: impl Fn(&T) -> String + 'static,
    ) -> Self {
        Self {
            controller,
            cache: PageCache::new(),
            options: PickerOptions::default(),
            field: SearchField::new(),
            row_text: Box::new(row_text),
            selected_text: Box::new(selected_text),
            on_select: None,
            on_submit: None,
            on_cancel: None,
            selected: None,
            show_list: false,
            hide_at: None,
            cursor: 0,
            scroll_top: 0,
            field_area: Rect::default(),
            list_area: Rect::default(),
            clear_area: Rect::default(),
            submit_area: Rect::default(),
            cancel_area: Rect::default(),
        }
    }

    pub fn with_options(mut self, options: PickerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn on_select(mut self, f: impl FnMut(Option<&T>) + 'static) -> Self {
        self.on_select = Some(Box::new(f));
        self
    }

    /// Submission is only possible when this callback is set.
    pub fn on_submit(mut self, f: impl FnMut(&T) + 'static) -> Self {
        self.on_submit = Some(Box::new(f));
        self
    }

    /// Cancellation is only possible when this callback is set.
    pub fn on_cancel(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_cancel = Some(Box::new(f));
        self
    }

    pub fn options(&self) -> &PickerOptions {
        &self.options
    }

    pub fn controller(&self) -> &RemoteListController<T> {
        &self.controller
    }

    /// Mutating query state through this bumps the controller version, which makes every
    /// cached page invisible; the next [`missing_page`](Self::missing_page) starts over.
    pub fn controller_mut(&mut self) -> &mut RemoteListController<T> {
        &mut self.controller
    }

    pub fn selection(&self) -> Option<&T> {
        self.selected.as_ref()
    }

    /// Controlled-selection override, e.g. to preload an existing value. Applies in any
    /// state and does not invoke the select callback.
    pub fn set_selection(&mut self, item: T) {
        self.selected = Some(item);
        self.show_list = false;
        self.hide_at = None;
    }

    pub fn search_value(&self) -> &str {
        self.field.value()
    }

    pub fn list_visible(&self) -> bool {
        self.selected.is_none() && (self.options.permanent || self.show_list)
    }

    /// Rows currently available under the controller's version: the concatenation of
    /// consecutive cached pages starting at page 1.
    pub fn row_count(&self) -> usize {
        let version = self.controller.version();
        let mut count = 0;
        for page in 1u32.. {
            match self.cache.get(PageKey::new(page, version)) {
                Some(items) => count += items.len(),
                None => break,
            }
        }
        count
    }

    fn row(&self, index: usize) -> Option<&T> {
        let version = self.controller.version();
        let mut index = index;
        for page in 1u32.. {
            let items = self.cache.get(PageKey::new(page, version))?;
            if index < items.len() {
                return items.get(index);
            }
            index -= items.len();
        }
        None
    }

    /// The next page the host should fetch, if any: the first uncached page under the
    /// current version, as long as the viewport can still consume rows and the controller's
    /// page bound (or a short page) doesn't say we are done.
    pub fn missing_page(&self) -> Option<PageKey> {
        if !self.list_visible() {
            return None;
        }
        let version = self.controller.version();
        let mut have = 0usize;
        let mut page = 1u32;
        while let Some(items) = self.cache.get(PageKey::new(page, version)) {
            have += items.len();
            page += 1;
        }
        if let Some(max) = self.controller.max_pages() {
            if page > max {
                return None;
            }
        }
        if page > 1 {
            // A short page means the collection ended even if no bound is known yet.
            let prev = self.cache.get(PageKey::new(page - 1, version));
            if prev.is_some_and(|items| (items.len() as u64) < PAGE_SIZE) {
                return None;
            }
        }
        let wanted = self.scroll_top + self.options.list_height.max(1) as usize + 1;
        (have < wanted).then_some(PageKey::new(page, version))
    }

    /// Store a fetched page. Returns `false` (and stores nothing) when the key's version is
    /// no longer current: the fetch raced a refresh and its result must never show up.
    pub fn insert_page(&mut self, key: PageKey, items: Vec<T>) -> bool {
        if key.version != self.controller.version() {
            return false;
        }
        self.cache.insert(key, items);
        self.cache.prune(key.version);
        true
    }

    /// Poll pending deadlines: the controller's debounced search and the delayed list hide.
    /// Returns `true` when something changed and the host should redraw (and re-check
    /// [`missing_page`](Self::missing_page)).
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut redraw = self.controller.poll_search(now);
        if redraw {
            self.cursor = 0;
            self.scroll_top = 0;
        }
        if let Some(due) = self.hide_at {
            if due <= now {
                self.hide_at = None;
                self.show_list = false;
                redraw = true;
            }
        }
        redraw
    }

    /// Earliest pending deadline, for hosts that sleep instead of polling every frame.
    pub fn deadline(&self) -> Option<Instant> {
        match (self.controller.search_deadline(), self.hide_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn handle_event(&mut self, event: InputEvent, now: Instant) -> PickerAction {
        match event {
            InputEvent::FocusGained => {
                if self.selected.is_none() {
                    self.focus_field();
                    PickerAction::Redraw
                } else {
                    PickerAction::None
                }
            }
            InputEvent::FocusLost => {
                if self.field.is_focused() {
                    self.field.blur();
                    self.schedule_hide(now);
                    PickerAction::Redraw
                } else {
                    PickerAction::None
                }
            }
            InputEvent::Click { x, y } => self.handle_click(x, y, now),
            InputEvent::Key(key) => self.handle_key(key, now),
            InputEvent::Paste(_) => {
                if self.selected.is_some() {
                    PickerAction::None
                } else {
                    self.forward_to_field(event, now)
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> PickerAction {
        if self.selected.is_some() {
            return match key.code {
                KeyCode::Enter => self.submit(),
                KeyCode::Esc | KeyCode::Backspace => self.clear_selection(),
                _ => PickerAction::None,
            };
        }
        if self.list_visible() {
            match key.code {
                KeyCode::Up => return self.move_cursor(-1),
                KeyCode::Down => return self.move_cursor(1),
                KeyCode::PageUp => return self.move_cursor(-(self.options.list_height as i64)),
                KeyCode::PageDown => return self.move_cursor(self.options.list_height as i64),
                KeyCode::Enter => return self.activate(self.cursor),
                _ => {}
            }
        }
        self.forward_to_field(InputEvent::Key(key), now)
    }

    fn handle_click(&mut self, x: u16, y: u16, now: Instant) -> PickerAction {
        let at = Position::new(x, y);
        if self.selected.is_some() {
            if self.clear_area.contains(at) {
                return self.clear_selection();
            }
            if self.submit_area.contains(at) {
                return self.submit();
            }
            return PickerAction::None;
        }
        if self.field_area.contains(at) {
            self.focus_field();
            return PickerAction::Redraw;
        }
        if self.cancel_area.contains(at) {
            return self.cancel();
        }
        if self.list_visible() && self.list_area.contains(at) {
            let index = self.scroll_top + (y - self.list_area.y) as usize;
            if self.row(index).is_some() {
                self.cursor = index;
                return self.activate(index);
            }
        }
        PickerAction::None
    }

    fn forward_to_field(&mut self, event: InputEvent, now: Instant) -> PickerAction {
        match self.field.handle_event(event) {
            SearchFieldAction::Changed => {
                // The user is typing: the list stays up and the new value goes through the
                // debounced path so request storms collapse to one fetch.
                self.show_list = true;
                self.hide_at = None;
                self.cursor = 0;
                self.scroll_top = 0;
                self.controller
                    .debounced_search(self.field.value().to_string(), now);
                PickerAction::Redraw
            }
            SearchFieldAction::Left => {
                self.schedule_hide(now);
                PickerAction::Redraw
            }
            SearchFieldAction::None => PickerAction::None,
        }
    }

    fn focus_field(&mut self) {
        self.field.focus();
        self.show_list = true;
        self.hide_at = None;
    }

    fn schedule_hide(&mut self, now: Instant) {
        // The list itself stays visible until the deadline passes in `tick`, so a click on
        // a row still lands.
        if !self.options.permanent {
            self.hide_at = Some(now + HIDE_DELAY);
        }
    }

    fn activate(&mut self, index: usize) -> PickerAction {
        let Some(item) = self.row(index).cloned() else {
            return PickerAction::None;
        };
        if let Some(cb) = &mut self.on_select {
            cb(Some(&item));
        }
        self.selected = Some(item);
        self.show_list = false;
        self.hide_at = None;
        // Selecting clears the search text; clearing the selection later does not bring it
        // back.
        self.field.clear();
        PickerAction::Redraw
    }

    pub fn clear_selection(&mut self) -> PickerAction {
        if self.selected.is_none() {
            return PickerAction::None;
        }
        if let Some(cb) = &mut self.on_select {
            cb(None);
        }
        self.selected = None;
        PickerAction::Redraw
    }

    fn submit(&mut self) -> PickerAction {
        if self.on_submit.is_none() {
            return PickerAction::None;
        }
        let Some(item) = self.selected.take() else {
            return PickerAction::None;
        };
        if let Some(cb) = &mut self.on_submit {
            cb(&item);
        }
        // Re-synchronize the list state for the next pick.
        self.controller.set_search(Some(String::new()));
        self.controller.refresh();
        self.cache.clear();
        self.cursor = 0;
        self.scroll_top = 0;
        PickerAction::Redraw
    }

    fn cancel(&mut self) -> PickerAction {
        if self.selected.is_some() {
            return PickerAction::None;
        }
        let Some(cb) = &mut self.on_cancel else {
            return PickerAction::None;
        };
        cb();
        PickerAction::Redraw
    }

    fn move_cursor(&mut self, delta: i64) -> PickerAction {
        let count = self.row_count();
        if count == 0 {
            return PickerAction::None;
        }
        let next = (self.cursor as i64 + delta).clamp(0, count as i64 - 1) as usize;
        if next == self.cursor {
            return PickerAction::None;
        }
        self.cursor = next;
        self.ensure_cursor_visible();
        PickerAction::Redraw
    }

    fn ensure_cursor_visible(&mut self) {
        let height = self.options.list_height.max(1) as usize;
        if self.cursor < self.scroll_top {
            self.scroll_top = self.cursor;
        } else if self.cursor >= self.scroll_top + height {
            self.scroll_top = self.cursor + 1 - height;
        }
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        self.field_area = Rect::default();
        self.list_area = Rect::default();
        self.clear_area = Rect::default();
        self.submit_area = Rect::default();
        self.cancel_area = Rect::default();
        if area.width == 0 || area.height == 0 {
            return;
        }

        let toolbar = Rect::new(area.x, area.y, area.width, 1);
        match self.selected.as_ref().map(|item| (self.selected_text)(item)) {
            Some(title) => self.render_selected(toolbar, buf, theme, &title),
            None => {
                self.render_search_row(toolbar, buf, theme);
                self.render_list(area, buf, theme);
            }
        }
    }

    fn render_selected(&mut self, toolbar: Rect, buf: &mut Buffer, theme: &Theme, title: &str) {
        buf.set_style(toolbar, theme.toolbar);
        self.clear_area = Rect::new(toolbar.x, toolbar.y, 3.min(toolbar.width), 1);
        buf.set_stringn(toolbar.x, toolbar.y, "[x]", toolbar.width as usize, theme.accent);

        let mut title_x = toolbar.x.saturating_add(4);
        let mut title_width = toolbar.width.saturating_sub(4);
        if self.on_submit.is_some() {
            let label = format!("[{}]", self.options.submit_label);
            let label_width = UnicodeWidthStr::width(label.as_str()) as u16;
            if toolbar.width > label_width {
                let x = toolbar.x + toolbar.width - label_width;
                self.submit_area = Rect::new(x, toolbar.y, label_width, 1);
                buf.set_stringn(x, toolbar.y, &label, label_width as usize, theme.accent);
                title_width = title_width.saturating_sub(label_width + 1);
            }
        }
        if title_width > 0 && title_x < toolbar.x + toolbar.width {
            title_x = title_x.min(toolbar.x + toolbar.width - 1);
            buf.set_stringn(title_x, toolbar.y, title, title_width as usize, theme.toolbar);
        }
    }

    fn render_search_row(&mut self, toolbar: Rect, buf: &mut Buffer, theme: &Theme) {
        let mut field_width = toolbar.width;
        if self.on_cancel.is_some() {
            let label = format!("[{}]", self.options.cancel_label);
            let label_width = UnicodeWidthStr::width(label.as_str()) as u16;
            if toolbar.width > label_width {
                let x = toolbar.x + toolbar.width - label_width;
                self.cancel_area = Rect::new(x, toolbar.y, label_width, 1);
                buf.set_stringn(x, toolbar.y, &label, label_width as usize, theme.accent);
                field_width = toolbar.width - label_width - 1;
            }
        }
        self.field_area = Rect::new(toolbar.x, toolbar.y, field_width, 1);
        self.field
            .render(self.field_area, buf, theme, &self.options.placeholder);
    }

    fn render_list(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        if !self.list_visible() || area.height <= 1 {
            return;
        }
        let height = self.options.list_height.min(area.height - 1);
        if height == 0 {
            return;
        }
        self.list_area = Rect::new(area.x, area.y + 1, area.width, height);

        let count = self.row_count();
        let mut y = self.list_area.y;
        for offset in 0..height as usize {
            let index = self.scroll_top + offset;
            let Some(item) = self.row(index) else {
                break;
            };
            let row_area = Rect::new(self.list_area.x, y, self.list_area.width, 1);
            let style = if index == self.cursor {
                theme.row_cursor
            } else {
                theme.text_primary
            };
            buf.set_style(row_area, style);
            let text = (self.row_text)(item);
            buf.set_stringn(row_area.x, y, &text, row_area.width as usize, style);
            y += 1;
        }

        // One muted line while more rows are on their way.
        let shown = count.saturating_sub(self.scroll_top).min(height as usize);
        if self.missing_page().is_some() && (shown as u16) < height {
            buf.set_stringn(
                self.list_area.x,
                self.list_area.y + shown as u16,
                "…",
                self.list_area.width as usize,
                theme.text_muted,
            );
        }
    }
}
