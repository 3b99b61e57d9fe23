pub(crate) struct TitleState {
    shown: bool,
    latch: AnyKeyLatch,
}

impl TitleState {
    pub(crate) fn new() -> Self {
        Self {
            shown: false,
            latch: AnyKeyLatch::default(),
        }
    }
}

impl GameState for TitleState {
    fn name(&self) -> &'static str {
        "title"
    }

    fn execute(&mut self, session: &mut Session, input: &InputSnapshot) -> Result<NextState, GameError> {
        if !self.shown {
            session.notify(Notification::Music(MusicTrack::Title));
            session.screen.fill(BLACK);
            draw_banner(session, TITLE_BANNER, None);
            self.shown = true;
        }
        if self.latch.pressed(input) {
            return Ok(Some(Box::new(start_game(session)?)));
        }
        Ok(None)
    }
}
