use engine::{Game, GameCommand, InputSnapshot, Surface};
use tracing::{error, info};

use crate::session::Session;
use crate::states::{initial_state, GameState};

/// Runs one game state per tick and swaps in whatever it hands over.
pub(crate) struct StateMachine {
    session: Session,
    state: Box<dyn GameState>,
}

impl StateMachine {
    pub(crate) fn new(session: Session) -> Self {
        Self {
            session,
            state: initial_state(),
        }
    }
}

impl Game for StateMachine {
    fn tick(&mut self, input: &InputSnapshot) -> GameCommand {
        if input.quit_requested() {
            return GameCommand::Quit;
        }
        if input.toggle_sound_pressed() {
            self.session.notifier.toggle_mute();
        }

        match self.state.execute(&mut self.session, input) {
            Ok(Some(next)) => {
                self.state = next;
                GameCommand::Continue
            }
            Ok(None) => GameCommand::Continue,
            Err(err) => {
                error!(state = self.state.name(), error = %err, "state_failed");
                GameCommand::Abort(err.to_string())
            }
        }
    }

    fn frame(&self) -> &Surface {
        &self.session.screen
    }

    fn state_name(&self) -> &'static str {
        self.state.name()
    }

    fn shutdown(&mut self) {
        info!(
            state = self.state.name(),
            coins = self.session.registry.coins(),
            keys = self.session.registry.keys(),
            "game_shutdown"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{AssetCache, AssetKind};
    use tempfile::TempDir;

    use crate::app::config::GameConfig;
    use crate::notify::recording::RecordingSink;
    use crate::player::PLAYER_SHEET;

    fn machine(dir: &TempDir, sink: RecordingSink) -> StateMachine {
        let mut assets = AssetCache::new(dir.path(), 2, None);
        assets.insert(
            AssetKind::Sprite,
            PLAYER_SHEET,
            Surface::filled(96, 128, [1, 1, 1, 255]),
        );
        let session = Session::new(GameConfig::default(), assets, Box::new(sink))
            .expect("session builds");
        StateMachine::new(session)
    }

    #[test]
    fn starts_on_title_with_a_view_sized_frame() {
        let dir = TempDir::new().expect("temp dir");
        let sink = RecordingSink::default();
        let mut game = machine(&dir, sink.clone());

        assert_eq!(game.state_name(), "title");
        assert_eq!(game.tick(&InputSnapshot::empty()), GameCommand::Continue);
        assert_eq!(game.frame().width(), 640);
        assert_eq!(game.frame().height(), 512);
        assert_eq!(sink.events.borrow().len(), 1);
    }

    #[test]
    fn toggle_sound_flips_the_sink() {
        let dir = TempDir::new().expect("temp dir");
        let mut game = machine(&dir, RecordingSink::default());

        game.tick(&InputSnapshot::empty().with_toggle_sound_pressed(true));

        assert!(!game.session.notifier.toggle_mute(), "second toggle unmutes");
    }

    #[test]
    fn missing_start_map_aborts_the_loop() {
        let dir = TempDir::new().expect("temp dir");
        let mut game = machine(&dir, RecordingSink::default());
        game.tick(&InputSnapshot::empty());

        let command = game.tick(&InputSnapshot::empty().with_key_pressed(true));

        match command {
            GameCommand::Abort(reason) => assert!(reason.contains("central"), "{reason}"),
            other => panic!("expected abort, got {other:?}"),
        }
        assert_eq!(game.state_name(), "title");
    }
}
