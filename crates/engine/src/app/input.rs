#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Action,
    Quit,
}

const ACTION_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Action => 4,
            InputAction::Quit => 5,
        }
    }
}

/// Keyboard state sampled once per simulation tick.
///
/// Held actions report level state. `key_pressed` and `toggle_sound_pressed`
/// are edges: true only on the first tick after the press.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    keys_down: u32,
    key_pressed: bool,
    toggle_sound_pressed: bool,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        keys_down: u32,
        key_pressed: bool,
        toggle_sound_pressed: bool,
    ) -> Self {
        Self {
            quit_requested,
            actions,
            keys_down,
            key_pressed,
            toggle_sound_pressed,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    /// True while any key at all is held, mapped or not.
    pub fn any_key_down(&self) -> bool {
        self.keys_down > 0
    }

    /// True on the tick a key went down.
    pub fn key_pressed(&self) -> bool {
        self.key_pressed
    }

    pub fn toggle_sound_pressed(&self) -> bool {
        self.toggle_sound_pressed
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        if is_down {
            self.keys_down = self.keys_down.max(1);
        }
        self
    }

    pub fn with_key_pressed(mut self, pressed: bool) -> Self {
        self.key_pressed = pressed;
        if pressed {
            self.keys_down = self.keys_down.max(1);
        }
        self
    }

    pub fn with_toggle_sound_pressed(mut self, pressed: bool) -> Self {
        self.toggle_sound_pressed = pressed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_action_and_any_key_state() {
        let snapshot = InputSnapshot::empty().with_action_down(InputAction::MoveLeft, true);
        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert!(!snapshot.is_down(InputAction::MoveRight));
        assert!(snapshot.any_key_down());
        assert!(!snapshot.key_pressed());
    }

    #[test]
    fn empty_snapshot_reports_nothing_held() {
        let snapshot = InputSnapshot::empty();
        assert!(!snapshot.any_key_down());
        assert!(!snapshot.quit_requested());
        assert!(!snapshot.toggle_sound_pressed());
    }
}
