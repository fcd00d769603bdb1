use ratatui::style::Modifier;
use ratatui::style::Style;

#[derive(Clone, Debug)]
pub struct Theme {
    pub text_primary: Style,
    pub text_muted: Style,
    pub accent: Style,
    /// Search field background/text while focused.
    pub field: Style,
    /// The single cell under the text cursor.
    pub field_cursor: Style,
    /// The list row under the cursor.
    pub row_cursor: Style,
    /// The toolbar row shown while an item is selected.
    pub toolbar: Style,
}

impl Default for Theme {
    fn default() -> Self {
        use ratatui::style::Stylize;

        Self {
            text_primary: Style::default(),
            text_muted: Style::default().dark_gray(),
            accent: Style::default().cyan(),
            field: Style::default(),
            field_cursor: Style::default().add_modifier(Modifier::REVERSED),
            row_cursor: Style::default().add_modifier(Modifier::REVERSED),
            toolbar: Style::default().add_modifier(Modifier::BOLD),
        }
    }
}
