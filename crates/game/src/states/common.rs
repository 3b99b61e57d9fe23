fn boundary_ticks(edge: Direction) -> u32 {
    if edge.is_vertical() {
        BOUNDARY_TICKS_VERTICAL
    } else {
        BOUNDARY_TICKS_HORIZONTAL
    }
}

/// Pixels per wipe step along each axis.
fn view_step(session: &Session) -> (i32, i32) {
    let (width, height) = session.view_size();
    (width / VIEW_STEPS, height / VIEW_STEPS)
}

/// Shows `image` inside a black border `bx` wide and `by` high. Without
/// `clear` only the inner region is redrawn.
fn draw_wipe(screen: &mut Surface, image: &Surface, bx: i32, by: i32, clear: bool) {
    if clear {
        screen.fill(BLACK);
    }
    let region = image.rect().inset(bx, by);
    if !region.is_empty() {
        screen.blit_region(image, region, bx, by);
    }
}

/// Draws an optional banner centred horizontally, at `y` or centred
/// vertically.
fn draw_banner(session: &mut Session, name: &str, y: Option<i32>) {
    let Some(banner) = session.assets.optional_image(AssetKind::Banner, name) else {
        return;
    };
    let (width, height) = session.view_size();
    let x = (width - banner.width() as i32) / 2;
    let y = y.unwrap_or((height - banner.height() as i32) / 2);
    session.screen.blit(&banner, x, y);
}

/// Parks the player just outside `edge` of `map`, shifted by `modifier`
/// tiles, ready to walk in.
fn hide_player(player: &mut Player, edge: Direction, modifier: i32, map: &RpgMap) {
    let bounds = map.pixel_rect();
    let (mut px, mut py) = player.body.position();
    px += modifier * TILE_SIZE;
    py += modifier * TILE_SIZE;
    match edge {
        Direction::Up => py = bounds.bottom(),
        Direction::Down => py = bounds.top() - player.body.map_rect.height,
        Direction::Left => px = bounds.right(),
        Direction::Right => px = bounds.left() - player.body.map_rect.width,
    }
    player.place_at(px, py, player.level(), map);
}

/// Any-key prompt that ignores keys already held when it appears.
#[derive(Debug, Default)]
struct AnyKeyLatch {
    armed: bool,
}

impl AnyKeyLatch {
    fn pressed(&mut self, input: &InputSnapshot) -> bool {
        if !input.any_key_down() {
            self.armed = true;
            return false;
        }
        self.armed && input.key_pressed()
    }
}

/// Resets lives and world records and drops the player on the start tile.
fn start_game(session: &mut Session) -> Result<PlayState, GameError> {
    let start = session.config.start.clone();
    session.registry = Registry::default();
    session.hud.reset(session.config.lives);
    let map = session.load_map(&start.map)?;

    session.player.reset(start.facing);
    session.player.place_at_tile(start.tile, start.level, &map);
    session.player.set_facing(start.facing, &map);
    session.notify(Notification::Music(MusicTrack::Main));
    info!(map = %start.map, lives = session.hud.lives(), "game_started");

    let arrival = Arrival::Replay(ReplayTransition {
        map: start.map.clone(),
        position: session.player.body.position(),
        level: session.player.level(),
        facing: start.facing,
        boundary: None,
        first_map: true,
    });
    Ok(PlayState::new(session, map, &arrival))
}
