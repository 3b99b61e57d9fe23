/// Walks the player a fixed number of steps onto a freshly entered map.
pub(crate) struct ShowPlayerState {
    facing: Direction,
    next: Option<PlayState>,
    target: u32,
    ticks: u32,
}

impl ShowPlayerState {
    fn new(facing: Direction, play: PlayState, target: u32) -> Self {
        Self {
            facing,
            next: Some(play),
            target,
            ticks: 0,
        }
    }
}

impl GameState for ShowPlayerState {
    fn name(&self) -> &'static str {
        "show_player"
    }

    fn execute(&mut self, session: &mut Session, _input: &InputSnapshot) -> Result<NextState, GameError> {
        if self.ticks > self.target {
            return Ok(self.next.take().map(|play| Box::new(play) as Box<dyn GameState>));
        }
        let (ux, uy) = self.facing.delta();
        if let Some(play) = self.next.as_mut() {
            play.show_player(session, ux * MOVE_UNIT, uy * MOVE_UNIT);
        }
        self.ticks += 1;
        Ok(None)
    }
}
