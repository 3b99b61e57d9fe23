pub(crate) struct GameOverState {
    image: Surface,
    ticks: u32,
    latch: AnyKeyLatch,
}

impl GameOverState {
    fn new(screen: &Surface) -> Self {
        Self {
            image: screen.clone(),
            ticks: 0,
            latch: AnyKeyLatch::default(),
        }
    }
}

impl GameState for GameOverState {
    fn name(&self) -> &'static str {
        "game_over"
    }

    fn execute(&mut self, session: &mut Session, input: &InputSnapshot) -> Result<NextState, GameError> {
        let (xs, ys) = view_step(session);
        let border = self.ticks as i32 + 1;
        match self.ticks {
            t if t < WIPE_TICKS => {
                draw_wipe(&mut session.screen, &self.image, border * xs, border * ys, true);
            }
            WIPE_TICKS => draw_banner(session, GAME_OVER_TOP_BANNER, Some(32 * SCALAR)),
            t if t == WIPE_TICKS * 2 => {
                let y = session.view_size().1 - 42 * SCALAR;
                draw_banner(session, GAME_OVER_BOTTOM_BANNER, Some(y));
            }
            t if t > WIPE_TICKS * 2 => {
                if self.latch.pressed(input) {
                    info!("game_restarted");
                    return Ok(Some(Box::new(start_game(session)?)));
                }
                return Ok(None);
            }
            _ => {}
        }
        self.ticks += 1;
        Ok(None)
    }
}
