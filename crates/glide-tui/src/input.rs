use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// Input action that can be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Next,
    Prev,
    First,
    Last,
    ToggleLoop,
    ToggleAutoplay,
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        // Quit
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Esc, _) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        // Slide navigation
        (KeyCode::Char('l'), KeyModifiers::NONE) => Action::Next,
        (KeyCode::Right, _) => Action::Next,
        (KeyCode::Char('j'), KeyModifiers::NONE) => Action::Next,
        (KeyCode::Char('h'), KeyModifiers::NONE) => Action::Prev,
        (KeyCode::Left, _) => Action::Prev,
        (KeyCode::Char('k'), KeyModifiers::NONE) => Action::Prev,

        // Jump to ends
        (KeyCode::Char('g'), KeyModifiers::NONE) | (KeyCode::Home, _) => Action::First,
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => Action::Last,

        // Modes
        (KeyCode::Char('o'), KeyModifiers::NONE) => Action::ToggleLoop,
        (KeyCode::Char('a'), KeyModifiers::NONE) | (KeyCode::Char(' '), _) => {
            Action::ToggleAutoplay
        }

        _ => Action::None,
    }
}

/// Pointer phase of a left-button mouse event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// Map a mouse event to a pointer phase and cell coordinates.
///
/// Only the left button drives gestures.
pub fn pointer_event(mouse: MouseEvent) -> Option<(PointerPhase, u16, u16)> {
    let phase = match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => PointerPhase::Down,
        MouseEventKind::Drag(MouseButton::Left) => PointerPhase::Move,
        MouseEventKind::Up(MouseButton::Left) => PointerPhase::Up,
        _ => return None,
    };
    Some((phase, mouse.column, mouse.row))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(handle_key_event(key(KeyCode::Right)), Action::Next);
        assert_eq!(handle_key_event(key(KeyCode::Char('l'))), Action::Next);
        assert_eq!(handle_key_event(key(KeyCode::Left)), Action::Prev);
        assert_eq!(handle_key_event(key(KeyCode::Char('h'))), Action::Prev);
        assert_eq!(handle_key_event(key(KeyCode::Home)), Action::First);
        assert_eq!(
            handle_key_event(KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT)),
            Action::Last
        );
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(handle_key_event(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(handle_key_event(key(KeyCode::Esc)), Action::Quit);
        assert_eq!(
            handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
    }

    #[test]
    fn test_mode_toggles() {
        assert_eq!(handle_key_event(key(KeyCode::Char('o'))), Action::ToggleLoop);
        assert_eq!(handle_key_event(key(KeyCode::Char(' '))), Action::ToggleAutoplay);
        assert_eq!(handle_key_event(key(KeyCode::Char('z'))), Action::None);
    }

    #[test]
    fn test_pointer_event_left_button_only() {
        let mouse = |kind| MouseEvent {
            kind,
            column: 12,
            row: 3,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(
            pointer_event(mouse(MouseEventKind::Down(MouseButton::Left))),
            Some((PointerPhase::Down, 12, 3))
        );
        assert_eq!(
            pointer_event(mouse(MouseEventKind::Drag(MouseButton::Left))),
            Some((PointerPhase::Move, 12, 3))
        );
        assert_eq!(pointer_event(mouse(MouseEventKind::Down(MouseButton::Right))), None);
        assert_eq!(pointer_event(mouse(MouseEventKind::Moved)), None);
    }
}
