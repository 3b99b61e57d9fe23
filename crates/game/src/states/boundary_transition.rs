/// Slides the old view out and the neighbouring map in across `edge`.
pub(crate) struct BoundaryTransitionState {
    transition: BoundaryTransition,
    old: Surface,
    new: Surface,
    next: Option<PlayState>,
    ticks: u32,
}

impl BoundaryTransitionState {
    fn new(transition: BoundaryTransition, screen: &Surface) -> Self {
        Self {
            transition,
            old: screen.clone(),
            new: Surface::new(screen.width(), screen.height()),
            next: None,
            ticks: 0,
        }
    }

    fn arrive(&mut self, session: &mut Session) -> Result<(), GameError> {
        let edge = self.transition.edge;
        let map = session.load_map(&self.transition.map)?;
        session.player.turn(edge);
        hide_player(&mut session.player, edge, self.transition.modifier, &map);

        let arrival = Arrival::Replay(ReplayTransition {
            map: self.transition.map.clone(),
            position: session.player.body.position(),
            level: session.player.level(),
            facing: edge,
            boundary: Some(edge),
            first_map: false,
        });
        let mut play = PlayState::new(session, map, &arrival);
        std::mem::swap(&mut self.new, &mut session.screen);
        play.draw_view(session, 0);
        std::mem::swap(&mut self.new, &mut session.screen);
        self.next = Some(play);
        Ok(())
    }

    fn slide(&self, session: &mut Session) {
        let (width, height) = session.view_size();
        let (xs, ys) = view_step(session);
        let sx = self.ticks as i32 * xs * 2;
        let sy = self.ticks as i32 * ys * 2;
        let screen = &mut session.screen;
        match self.transition.edge {
            Direction::Up => {
                screen.blit_region(&self.old, Rect::new(0, 0, width, height - sy), 0, sy);
                screen.blit_region(&self.new, Rect::new(0, height - sy, width, sy), 0, 0);
            }
            Direction::Down => {
                screen.blit_region(&self.old, Rect::new(0, sy, width, height - sy), 0, 0);
                screen.blit_region(&self.new, Rect::new(0, 0, width, sy), 0, height - sy);
            }
            Direction::Left => {
                screen.blit_region(&self.old, Rect::new(0, 0, width - sx, height), sx, 0);
                screen.blit_region(&self.new, Rect::new(width - sx, 0, sx, height), 0, 0);
            }
            Direction::Right => {
                screen.blit_region(&self.old, Rect::new(sx, 0, width - sx, height), 0, 0);
                screen.blit_region(&self.new, Rect::new(0, 0, sx, height), width - sx, 0);
            }
        }
    }
}

impl GameState for BoundaryTransitionState {
    fn name(&self) -> &'static str {
        "boundary_transition"
    }

    fn execute(&mut self, session: &mut Session, _input: &InputSnapshot) -> Result<NextState, GameError> {
        if self.ticks == 0 {
            self.arrive(session)?;
        } else if self.ticks < WIPE_TICKS {
            self.slide(session);
        } else {
            let edge = self.transition.edge;
            return Ok(self.next.take().map(|play| {
                Box::new(ShowPlayerState::new(edge, play, boundary_ticks(edge))) as Box<dyn GameState>
            }));
        }
        self.ticks += 1;
        Ok(None)
    }
}
