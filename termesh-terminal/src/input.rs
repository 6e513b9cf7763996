//! Key mapping from terminal events to light commands.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use termesh_core::LightCommand;

/// What the input thread should do with a key event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    Quit,
    Light(LightCommand),
}

/// Check if key should quit the viewer.
pub fn should_quit(key: KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Map a key event to an action. Releases and repeats are ignored.
pub fn handle_key_event(key: KeyEvent) -> Option<InputAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if should_quit(key) {
        return Some(InputAction::Quit);
    }

    let command = match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            LightCommand::for_key(c)
        }
        // Any other key still stops the orbit
        _ => LightCommand::StopOrbit,
    };
    Some(InputAction::Light(command))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn test_quit_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Esc)),
            Some(InputAction::Quit)
        );
        assert_eq!(
            handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(InputAction::Quit)
        );
        // Plain 'q' is a light key, not quit
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('q'))),
            Some(InputAction::Light(LightCommand::SetAngle(0.0)))
        );
    }

    #[test]
    fn test_light_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('8'))),
            Some(InputAction::Light(LightCommand::SetAngle(7.0 / 8.0 * TAU)))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('/'))),
            Some(InputAction::Light(LightCommand::SetAngle(0.9 * TAU)))
        );
    }

    #[test]
    fn test_other_keys_stop_orbit() {
        for code in [KeyCode::Left, KeyCode::Enter, KeyCode::Char('0'), KeyCode::Char('M')] {
            assert_eq!(
                handle_key_event(KeyEvent::from(code)),
                Some(InputAction::Light(LightCommand::StopOrbit))
            );
        }
        assert_eq!(
            handle_key_event(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL)),
            Some(InputAction::Light(LightCommand::StopOrbit))
        );
    }

    #[test]
    fn test_release_ignored() {
        let release = KeyEvent::new_with_kind(
            KeyCode::Char('1'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        );
        assert_eq!(handle_key_event(release), None);
    }
}
