use engine::Rect;

/// Window of the map shown on screen: centred on `focus`, then pushed back
/// inside `map`. Along an axis where the map is smaller than the view the
/// map is centred instead.
pub(crate) fn view_rect(map: Rect, focus: Rect, width: i32, height: i32) -> Rect {
    let x = clamp_axis(
        focus.left() - (width - focus.width) / 2,
        map.left(),
        map.width,
        width,
    );
    let y = clamp_axis(
        focus.top() - (height - focus.height) / 2,
        map.top(),
        map.height,
        height,
    );
    Rect::new(x, y, width, height)
}

fn clamp_axis(start: i32, map_start: i32, map_len: i32, view_len: i32) -> i32 {
    if map_len <= view_len {
        return map_start - (view_len - map_len) / 2;
    }
    start.clamp(map_start, map_start + map_len - view_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: Rect = Rect::new(0, 0, 2000, 1000);

    #[test]
    fn view_centres_on_focus_inside_map() {
        let view = view_rect(MAP, Rect::new(1000, 500, 20, 40), 640, 512);
        assert_eq!(view, Rect::new(690, 264, 640, 512));
    }

    #[test]
    fn view_is_pushed_back_inside_map() {
        assert_eq!(view_rect(MAP, Rect::new(5, 5, 20, 40), 640, 512).top_left(), (0, 0));
        assert_eq!(
            view_rect(MAP, Rect::new(1990, 990, 20, 40), 640, 512).top_left(),
            (1360, 488)
        );
    }

    #[test]
    fn small_map_is_centred() {
        let view = view_rect(Rect::new(0, 0, 320, 256), Rect::new(0, 0, 20, 40), 640, 512);
        assert_eq!(view.top_left(), (-160, -128));
    }
}
