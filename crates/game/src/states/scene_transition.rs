/// Closes the view to black, loads the arrival map at the midpoint and
/// opens onto it.
pub(crate) struct SceneTransitionState {
    arrival: Arrival,
    /// The last play frame, then the first frame of the new map.
    image: Surface,
    next: Option<PlayState>,
    ticks: u32,
}

impl SceneTransitionState {
    fn new(arrival: Arrival, screen: &Surface) -> Self {
        Self {
            arrival,
            image: screen.clone(),
            next: None,
            ticks: 0,
        }
    }

    fn arrive(&mut self, session: &mut Session) -> Result<(), GameError> {
        let map = session.load_map(self.arrival.map_name())?;
        let facing = match &self.arrival {
            Arrival::Replay(replay) => {
                let (px, py) = replay.position;
                session.player.place_at(px, py, replay.level, &map);
                replay.facing
            }
            Arrival::Scene(scene) => {
                session.player.place_at_tile(scene.tile, scene.level, &map);
                if let Some(edge) = scene.boundary {
                    hide_player(&mut session.player, edge, 0, &map);
                }
                scene.facing
            }
        };
        session.player.set_facing(facing, &map);

        let mut play = PlayState::new(session, map, &self.arrival);
        std::mem::swap(&mut self.image, &mut session.screen);
        play.draw_view(session, 0);
        std::mem::swap(&mut self.image, &mut session.screen);
        self.next = Some(play);
        Ok(())
    }

    fn finish(&mut self, session: &Session) -> NextState {
        let play = self.next.take()?;
        if self.arrival.first_map() {
            return Some(Box::new(play));
        }
        let facing = session.player.facing();
        let ticks = match self.arrival.boundary() {
            Some(_) => boundary_ticks(facing),
            None => DOORWAY_TICKS,
        };
        Some(Box::new(ShowPlayerState::new(facing, play, ticks)))
    }
}

impl GameState for SceneTransitionState {
    fn name(&self) -> &'static str {
        "scene_transition"
    }

    fn execute(&mut self, session: &mut Session, _input: &InputSnapshot) -> Result<NextState, GameError> {
        let (xs, ys) = view_step(session);
        let ticks = self.ticks as i32;
        if self.ticks < WIPE_TICKS {
            draw_wipe(&mut session.screen, &self.image, (ticks + 1) * xs, (ticks + 1) * ys, true);
        } else if self.ticks == WIPE_TICKS {
            self.arrive(session)?;
        } else if self.ticks < WIPE_TICKS * 2 {
            let border = WIPE_TICKS as i32 * 2 - ticks;
            draw_wipe(&mut session.screen, &self.image, border * xs, border * ys, false);
        } else {
            return Ok(self.finish(session));
        }
        self.ticks += 1;
        Ok(None)
    }
}
