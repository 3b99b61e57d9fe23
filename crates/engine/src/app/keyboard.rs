use std::collections::HashSet;

use winit::event::ElementState;
use winit::keyboard::{KeyCode, PhysicalKey};

use super::input::ActionStates;
use super::{InputAction, InputSnapshot};

const TOGGLE_SOUND_KEY: PhysicalKey = PhysicalKey::Code(KeyCode::KeyX);

/// WASD and the arrows move, space acts, escape quits.
fn bound_action(key: PhysicalKey) -> Option<InputAction> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    let action = match code {
        KeyCode::KeyW | KeyCode::ArrowUp => InputAction::MoveUp,
        KeyCode::KeyS | KeyCode::ArrowDown => InputAction::MoveDown,
        KeyCode::KeyA | KeyCode::ArrowLeft => InputAction::MoveLeft,
        KeyCode::KeyD | KeyCode::ArrowRight => InputAction::MoveRight,
        KeyCode::Space => InputAction::Action,
        KeyCode::Escape => InputAction::Quit,
        _ => return None,
    };
    Some(action)
}

/// Keyboard state between ticks. Press edges latch until the next snapshot.
#[derive(Debug, Default)]
pub(crate) struct Keyboard {
    held: HashSet<PhysicalKey>,
    actions: ActionStates,
    pressed: bool,
    toggle_sound: bool,
    quit: bool,
}

impl Keyboard {
    pub(crate) fn quit_requested(&self) -> bool {
        self.quit
    }

    pub(crate) fn request_quit(&mut self) {
        self.quit = true;
    }

    pub(crate) fn key(&mut self, key: PhysicalKey, state: ElementState) {
        let down = state == ElementState::Pressed;
        if let Some(action) = bound_action(key) {
            self.actions.set(action, down);
            if down && action == InputAction::Quit {
                self.request_quit();
            }
        }
        if !down {
            self.held.remove(&key);
        } else if self.held.insert(key) {
            // auto-repeat of a held key is not a new press
            self.pressed = true;
            self.toggle_sound |= key == TOGGLE_SOUND_KEY;
        }
    }

    /// Releases never reach an unfocused window, so focus loss drops
    /// everything held.
    pub(crate) fn release_all(&mut self) {
        self.held.clear();
        self.actions = ActionStates::default();
    }

    pub(crate) fn snapshot(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.quit,
            self.actions,
            self.held.len() as u32,
            self.pressed,
            self.toggle_sound,
        );
        self.pressed = false;
        self.toggle_sound = false;
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_W: PhysicalKey = PhysicalKey::Code(KeyCode::KeyW);

    fn press(keyboard: &mut Keyboard, key: PhysicalKey) {
        keyboard.key(key, ElementState::Pressed);
    }

    fn release(keyboard: &mut Keyboard, key: PhysicalKey) {
        keyboard.key(key, ElementState::Released);
    }

    #[test]
    fn press_edge_lasts_one_tick() {
        let mut keyboard = Keyboard::default();
        press(&mut keyboard, KEY_W);

        let first = keyboard.snapshot();
        let second = keyboard.snapshot();

        assert!(first.key_pressed());
        assert!(!second.key_pressed());
        assert!(second.any_key_down());
        assert!(second.is_down(InputAction::MoveUp));
    }

    #[test]
    fn auto_repeat_does_not_toggle_sound_twice() {
        let mut keyboard = Keyboard::default();

        press(&mut keyboard, TOGGLE_SOUND_KEY);
        let first = keyboard.snapshot();
        press(&mut keyboard, TOGGLE_SOUND_KEY);
        let repeat = keyboard.snapshot();
        release(&mut keyboard, TOGGLE_SOUND_KEY);
        press(&mut keyboard, TOGGLE_SOUND_KEY);
        let again = keyboard.snapshot();

        assert!(first.toggle_sound_pressed());
        assert!(!repeat.toggle_sound_pressed());
        assert!(again.toggle_sound_pressed());
    }

    #[test]
    fn unbound_keys_still_count_as_held() {
        let mut keyboard = Keyboard::default();
        press(&mut keyboard, PhysicalKey::Code(KeyCode::KeyQ));

        let snapshot = keyboard.snapshot();

        assert!(snapshot.any_key_down());
        assert!(snapshot.key_pressed());
        assert!(!snapshot.is_down(InputAction::Action));
    }

    #[test]
    fn arrows_and_space_map_to_actions() {
        let mut keyboard = Keyboard::default();
        press(&mut keyboard, PhysicalKey::Code(KeyCode::ArrowLeft));
        press(&mut keyboard, PhysicalKey::Code(KeyCode::Space));
        press(&mut keyboard, PhysicalKey::Code(KeyCode::KeyD));
        release(&mut keyboard, PhysicalKey::Code(KeyCode::KeyD));

        let snapshot = keyboard.snapshot();

        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert!(snapshot.is_down(InputAction::Action));
        assert!(!snapshot.is_down(InputAction::MoveRight));
    }

    #[test]
    fn escape_requests_quit() {
        let mut keyboard = Keyboard::default();
        press(&mut keyboard, PhysicalKey::Code(KeyCode::Escape));

        assert!(keyboard.quit_requested());
        assert!(keyboard.snapshot().quit_requested());
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut keyboard = Keyboard::default();
        press(&mut keyboard, KEY_W);
        keyboard.release_all();

        let snapshot = keyboard.snapshot();

        assert!(!snapshot.any_key_down());
        assert!(!snapshot.is_down(InputAction::MoveUp));
    }
}
