/// Where a lost life resumes: the exact arrival position on this map and
/// the world records as they were then.
struct Checkpoint {
    arrival: Arrival,
    registry: RegistrySnapshot,
}

/// Free play on one map.
pub(crate) struct PlayState {
    map: RpgMap,
    sprites: Vec<Entity>,
    checkpoint: Checkpoint,
}

impl PlayState {
    fn new(session: &mut Session, mut map: RpgMap, arrival: &Arrival) -> Self {
        let view_size = session.view_size();
        let sprites = build_sprites(&mut map, &session.registry, &mut session.assets, view_size);
        let replay = ReplayTransition {
            map: map.name().to_string(),
            position: session.player.body.position(),
            level: session.player.level(),
            facing: session.player.facing(),
            boundary: arrival.boundary(),
            first_map: arrival.first_map(),
        };
        let checkpoint = Checkpoint {
            arrival: Arrival::Replay(replay),
            registry: session.registry.snapshot(),
        };
        session.notify(Notification::CheckpointReached);

        let mut play = Self {
            map,
            sprites,
            checkpoint,
        };
        let view = play.view(session);
        for sprite in &mut play.sprites {
            sprite.in_view = sprite.body.map_rect.intersects(&view);
        }
        info!(map = play.map.name(), sprites = play.sprites.len(), "map_entered");
        play
    }

    fn view(&self, session: &Session) -> Rect {
        let (width, height) = session.view_size();
        view_rect(self.map.pixel_rect(), session.player.body.map_rect, width, height)
    }

    /// Steps the player without input or edge checks and redraws without
    /// the HUD.
    fn show_player(&mut self, session: &mut Session, dx: i32, dy: i32) {
        let level = session.player.level();
        let facing = session.player.facing();
        session.player.wrap_movement(level, facing, dx, dy, &self.map);
        self.draw_view(session, 0);
    }

    /// Updates sprites by `increment` animation ticks and composes the
    /// screen. The HUD is drawn only on live ticks.
    fn draw_view(&mut self, session: &mut Session, increment: u32) {
        let view = self.view(session);
        let player = Observer {
            base_rect: session.player.base_rect(),
            level: session.player.level(),
        };
        let mut ctx = UpdateContext {
            map: &mut self.map,
            registry: &mut session.registry,
            notifier: session.notifier.as_mut(),
            player,
        };
        for sprite in &mut self.sprites {
            sprite.update(view, &mut ctx, increment);
        }
        self.sprites.retain(|sprite| !sprite.to_remove);

        self.map.draw_background(&mut session.screen, view);
        let mut items = Vec::with_capacity(self.sprites.len() + 1);
        items.push(DrawItem {
            z: session.player.body.z,
            image: session.player.frames.current(),
            map_rect: session.player.body.map_rect,
        });
        items.extend(self.sprites.iter().filter(|sprite| sprite.in_view).map(|sprite| DrawItem {
            z: sprite.body.z,
            image: sprite.frames.current(),
            map_rect: sprite.body.map_rect,
        }));
        sort_by_depth(&mut items);
        draw_items(&mut session.screen, view, &items);

        if increment > 0 {
            session
                .hud
                .draw(&mut session.screen, session.registry.coins(), session.registry.keys());
        }
    }

    /// Pickups are collected; a baddie costs a life and ends the tick.
    fn handle_collisions(&mut self, session: &mut Session) -> Option<Event> {
        let footprint = session.player.base_rect();
        let level = session.player.level();
        for sprite in self
            .sprites
            .iter_mut()
            .filter(|sprite| sprite.in_view && sprite.touches(&footprint, level))
        {
            if sprite.kind.is_baddie() {
                session.notify(Notification::LifeLost);
                let game_over = session.hud.lose_life();
                info!(uid = %sprite.uid, lives = session.hud.lives(), game_over, "life_lost");
                return Some(Event::LifeLost { game_over });
            }
            if let Some(notification) = sprite.collect(&mut session.registry) {
                session.notify(notification);
            }
        }
        None
    }

    fn handle_action(&mut self, session: &mut Session) {
        let reach = session.player.action_reach();
        let level = session.player.level();
        let door = self.sprites.iter_mut().find(|sprite| {
            sprite.in_view && sprite.kind == SpriteKind::Door && sprite.touches(&reach, level)
        });
        if let Some(door) = door {
            if door.try_open(&mut session.registry) {
                session.notify(Notification::DoorOpening);
                info!(uid = %door.uid, keys = session.registry.keys(), "door_opening");
            }
        }
    }

    fn follow(&mut self, session: &mut Session, event: Event) -> Box<dyn GameState> {
        debug!(map = self.map.name(), ?event, "play_event");
        match event {
            Event::Boundary(transition) => {
                session.notify(Notification::MapTransition);
                Box::new(BoundaryTransitionState::new(transition, &session.screen))
            }
            Event::Scene(scene) => {
                session.notify(Notification::MapTransition);
                Box::new(SceneTransitionState::new(Arrival::Scene(scene), &session.screen))
            }
            Event::LifeLost { game_over: true } => Box::new(GameOverState::new(&session.screen)),
            Event::LifeLost { game_over: false } => {
                session.registry.restore(&self.checkpoint.registry);
                Box::new(SceneTransitionState::new(
                    self.checkpoint.arrival.clone(),
                    &session.screen,
                ))
            }
            Event::EndGame => {
                session.notify(Notification::EndGame);
                Box::new(EndGameState::new(&session.screen))
            }
        }
    }
}

impl GameState for PlayState {
    fn name(&self) -> &'static str {
        "play"
    }

    fn execute(&mut self, session: &mut Session, input: &InputSnapshot) -> Result<NextState, GameError> {
        let trigger = self
            .map
            .tile_event(session.player.level(), &session.player.base_rect())
            .cloned();
        if let Some(event) = trigger {
            return Ok(Some(self.follow(session, event)));
        }
        if let Some(event) = self.handle_collisions(session) {
            return Ok(Some(self.follow(session, event)));
        }

        let outcome = session.player.handle_movement(direction_bits(input), &self.map);
        if outcome.stepped {
            session.notify(Notification::Footstep);
        }
        if let Some(event) = outcome.event {
            return Ok(Some(self.follow(session, event)));
        }

        if input.is_down(InputAction::Action) {
            self.handle_action(session);
        }
        self.draw_view(session, 1);
        Ok(None)
    }
}
