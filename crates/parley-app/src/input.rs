//! Terminal-agnostic keyboard input and the command table.

/// Keyboard input abstraction.
///
/// Decouples application logic from terminal libraries so the controller can
/// be driven by injected keys in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Character typed with Ctrl held.
    Ctrl(char),
    /// Function key (F1 is `F(1)`).
    F(u8),
    /// Enter/Return key.
    Enter,
    /// Backspace key.
    Backspace,
    /// Escape key.
    Esc,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
    /// Up arrow key.
    Up,
    /// Down arrow key.
    Down,
}

/// User-facing commands, independent of the keys bound to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Activate the tab to the left.
    MoveFocusLeft,
    /// Activate the tab to the right.
    MoveFocusRight,
    /// Move the list selection up.
    MoveSelectionUp,
    /// Move the list selection down.
    MoveSelectionDown,
    /// Open the conversation for the highlighted row.
    ConfirmSelection,
    /// Submit the input buffer to the current peer.
    SendInput,
    /// Scroll the transcript towards older lines.
    ScrollTranscriptUp,
    /// Scroll the transcript towards newer lines.
    ScrollTranscriptDown,
    /// Remove the last character of the input buffer.
    DeleteLastCharacter,
    /// Shut down the session.
    Quit,
    /// Append a character to the input buffer.
    Insert(char),
}

impl Command {
    /// Default key bindings. Unbound keys map to `None`.
    pub fn from_key(key: KeyInput) -> Option<Self> {
        match key {
            KeyInput::Left => Some(Self::MoveFocusLeft),
            KeyInput::Right => Some(Self::MoveFocusRight),
            KeyInput::Up => Some(Self::MoveSelectionUp),
            KeyInput::Down => Some(Self::MoveSelectionDown),
            KeyInput::F(1) => Some(Self::ConfirmSelection),
            KeyInput::Enter | KeyInput::Ctrl('s') => Some(Self::SendInput),
            KeyInput::Ctrl('j') => Some(Self::ScrollTranscriptUp),
            KeyInput::Ctrl('k') => Some(Self::ScrollTranscriptDown),
            KeyInput::Backspace => Some(Self::DeleteLastCharacter),
            KeyInput::Ctrl('c') | KeyInput::Esc => Some(Self::Quit),
            KeyInput::Char(c) if !c.is_control() => Some(Self::Insert(c)),
            KeyInput::Char(_) | KeyInput::Ctrl(_) | KeyInput::F(_) => None,
        }
    }
}

/// Key help shown in the header line.
pub const KEY_HELP: &str = "←/→ switch tab  ↑/↓ select  F1 open chat  \
                            Enter/C-s send  C-j/C-k scroll  C-c quit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_bind_focus_and_selection() {
        assert_eq!(Command::from_key(KeyInput::Left), Some(Command::MoveFocusLeft));
        assert_eq!(Command::from_key(KeyInput::Right), Some(Command::MoveFocusRight));
        assert_eq!(Command::from_key(KeyInput::Up), Some(Command::MoveSelectionUp));
        assert_eq!(Command::from_key(KeyInput::Down), Some(Command::MoveSelectionDown));
    }

    #[test]
    fn send_has_two_bindings() {
        assert_eq!(Command::from_key(KeyInput::Enter), Some(Command::SendInput));
        assert_eq!(Command::from_key(KeyInput::Ctrl('s')), Some(Command::SendInput));
    }

    #[test]
    fn printable_characters_insert() {
        assert_eq!(Command::from_key(KeyInput::Char('é')), Some(Command::Insert('é')));
        assert_eq!(Command::from_key(KeyInput::Char(' ')), Some(Command::Insert(' ')));
        assert_eq!(Command::from_key(KeyInput::Char('\u{7}')), None);
    }

    #[test]
    fn unbound_keys_ignored() {
        assert_eq!(Command::from_key(KeyInput::F(2)), None);
        assert_eq!(Command::from_key(KeyInput::Ctrl('x')), None);
    }
}
