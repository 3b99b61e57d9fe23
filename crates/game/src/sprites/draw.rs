use engine::{Rect, Surface};

/// One image to composite, positioned in map space.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DrawItem<'a> {
    pub(crate) z: i32,
    pub(crate) image: &'a Surface,
    pub(crate) map_rect: Rect,
}

/// Back to front by z. Equal depths keep insertion order.
pub(crate) fn sort_by_depth(items: &mut [DrawItem<'_>]) {
    items.sort_by_key(|item| item.z);
}

pub(crate) fn draw_items(target: &mut Surface, view: Rect, items: &[DrawItem<'_>]) {
    for item in items {
        target.blit(
            item.image,
            item.map_rect.left() - view.left(),
            item.map_rect.top() - view.top(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(items: &[DrawItem<'_>]) -> Vec<Rect> {
        items.iter().map(|item| item.map_rect).collect()
    }

    #[test]
    fn sorting_twice_keeps_the_same_order() {
        let image = Surface::new(1, 1);
        let mut items: Vec<DrawItem<'_>> = [(40, 0), (10, 1), (40, 2), (10, 3), (25, 4)]
            .into_iter()
            .map(|(z, id)| DrawItem {
                z,
                image: &image,
                map_rect: Rect::new(id, 0, 1, 1),
            })
            .collect();

        sort_by_depth(&mut items);
        let first = order(&items);
        sort_by_depth(&mut items);

        assert_eq!(first, order(&items));
        let ids: Vec<i32> = first.iter().map(|rect| rect.x).collect();
        assert_eq!(ids, vec![1, 3, 4, 0, 2]);
    }

    #[test]
    fn nearer_items_are_drawn_over_farther_ones() {
        let back = Surface::filled(2, 2, [0, 0, 255, 255]);
        let front = Surface::filled(2, 2, [255, 0, 0, 255]);
        let mut items = vec![
            DrawItem {
                z: 50,
                image: &front,
                map_rect: Rect::new(10, 10, 2, 2),
            },
            DrawItem {
                z: 20,
                image: &back,
                map_rect: Rect::new(10, 10, 2, 2),
            },
        ];
        let mut target = Surface::new(4, 4);

        sort_by_depth(&mut items);
        draw_items(&mut target, Rect::new(9, 9, 4, 4), &items);

        assert_eq!(target.pixel(1, 1), Some([255, 0, 0, 255]));
    }
}
