pub(crate) struct EndGameState {
    image: Surface,
    ticks: u32,
    latch: AnyKeyLatch,
}

impl EndGameState {
    fn new(screen: &Surface) -> Self {
        Self {
            image: screen.clone(),
            ticks: 0,
            latch: AnyKeyLatch::default(),
        }
    }
}

impl GameState for EndGameState {
    fn name(&self) -> &'static str {
        "end_game"
    }

    fn execute(&mut self, session: &mut Session, input: &InputSnapshot) -> Result<NextState, GameError> {
        if self.ticks < WIPE_TICKS {
            let (xs, ys) = view_step(session);
            let border = self.ticks as i32 + 1;
            draw_wipe(&mut session.screen, &self.image, border * xs, border * ys, true);
        } else if self.ticks == WIPE_TICKS {
            draw_banner(session, END_GAME_BANNER, None);
        } else if self.latch.pressed(input) {
            return Ok(Some(Box::new(TitleState::new())));
        } else {
            return Ok(None);
        }
        self.ticks += 1;
        Ok(None)
    }
}
