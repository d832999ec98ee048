//! Cursor movement shared by the table screens.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::TableState;

/// Apply a navigation key to `state` for a table of `len` rows.
/// Returns whether the key was a navigation key.
pub fn navigate(state: &mut TableState, len: usize, key: KeyEvent) -> bool {
    if len == 0 {
        state.select(None);
        return matches!(
            key.code,
            KeyCode::Char('j' | 'k' | 'g' | 'G') | KeyCode::Up | KeyCode::Down
        );
    }
    let current = state.selected().unwrap_or(0).min(len - 1);
    let next = match (key.modifiers, key.code) {
        (_, KeyCode::Char('j') | KeyCode::Down) => (current + 1).min(len - 1),
        (_, KeyCode::Char('k') | KeyCode::Up) => current.saturating_sub(1),
        (_, KeyCode::Char('g') | KeyCode::Home) => 0,
        (_, KeyCode::Char('G') | KeyCode::End) => len - 1,
        (KeyModifiers::CONTROL, KeyCode::Char('d')) | (_, KeyCode::PageDown) => {
            (current + 10).min(len - 1)
        }
        (KeyModifiers::CONTROL, KeyCode::Char('u')) | (_, KeyCode::PageUp) => {
            current.saturating_sub(10)
        }
        _ => return false,
    };
    state.select(Some(next));
    true
}

/// Keep the selection inside `len` rows after the data changed.
pub fn clamp(state: &mut TableState, len: usize) {
    match (len, state.selected()) {
        (0, _) => state.select(None),
        (_, None) => state.select(Some(0)),
        (_, Some(i)) if i >= len => state.select(Some(len - 1)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn movement_stays_in_bounds() {
        let mut state = TableState::default();
        assert!(navigate(&mut state, 3, key(KeyCode::Char('k'))));
        assert_eq!(state.selected(), Some(0));
        navigate(&mut state, 3, key(KeyCode::Char('G')));
        assert_eq!(state.selected(), Some(2));
        navigate(&mut state, 3, key(KeyCode::Char('j')));
        assert_eq!(state.selected(), Some(2));
        assert!(!navigate(&mut state, 3, key(KeyCode::Char('x'))));
    }

    #[test]
    fn clamp_follows_shrinking_data() {
        let mut state = TableState::default();
        state.select(Some(5));
        clamp(&mut state, 2);
        assert_eq!(state.selected(), Some(1));
        clamp(&mut state, 0);
        assert_eq!(state.selected(), None);
        clamp(&mut state, 4);
        assert_eq!(state.selected(), Some(0));
    }
}
