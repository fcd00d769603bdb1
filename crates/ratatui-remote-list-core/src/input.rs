#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl KeyModifiers {
    pub fn none() -> Self {
        Self::default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCode {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Tab,
    Esc,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyEvent {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::none(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: KeyModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c))
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c)).with_modifiers(KeyModifiers {
            shift: false,
            ctrl: true,
            alt: false,
        })
    }

    pub fn is_plain(&self) -> bool {
        !self.modifiers.ctrl && !self.modifiers.alt
    }
}

/// Events the remote-list widgets react to.
///
/// Focus events matter here: the picker's list visibility is driven by whether the search
/// field has focus, so hosts embedding the widgets in a larger layout should forward their
/// own notion of focus as [`InputEvent::FocusGained`] / [`InputEvent::FocusLost`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    /// Primary-button press at terminal cell (x, y).
    Click { x: u16, y: u16 },
    Paste(String),
    FocusGained,
    FocusLost,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_constructor_sets_only_ctrl() {
        let k = KeyEvent::ctrl('d');
        assert!(k.modifiers.ctrl);
        assert!(!k.modifiers.shift);
        assert!(!k.modifiers.alt);
        assert!(!k.is_plain());
        assert!(KeyEvent::char('d').is_plain());
    }
}
