use crate::world::constants::SCALAR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum SpriteKind {
    Flames,
    Coin,
    Key,
    Door,
    Beetle,
    Wasp,
}

/// Art and geometry shared by every entity of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct KindProfile {
    pub(crate) sheet: &'static str,
    pub(crate) columns: u32,
    pub(crate) rows: u32,
    /// Offset of the image from its spawn tile corner, in pixels.
    pub(crate) offset: (i32, i32),
    pub(crate) base_width: Option<i32>,
    pub(crate) maskable: bool,
}

impl SpriteKind {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "flames" => Some(SpriteKind::Flames),
            "coin" => Some(SpriteKind::Coin),
            "key" => Some(SpriteKind::Key),
            "door" => Some(SpriteKind::Door),
            "beetle" => Some(SpriteKind::Beetle),
            "wasp" => Some(SpriteKind::Wasp),
            _ => None,
        }
    }

    pub(crate) const fn name(self) -> &'static str {
        match self {
            SpriteKind::Flames => "flames",
            SpriteKind::Coin => "coin",
            SpriteKind::Key => "key",
            SpriteKind::Door => "door",
            SpriteKind::Beetle => "beetle",
            SpriteKind::Wasp => "wasp",
        }
    }

    /// Touching a baddie costs a life.
    pub(crate) const fn is_baddie(self) -> bool {
        matches!(self, SpriteKind::Beetle | SpriteKind::Wasp)
    }

    pub(crate) const fn profile(self) -> KindProfile {
        match self {
            SpriteKind::Flames => KindProfile {
                sheet: "flame-frames.png",
                columns: 4,
                rows: 1,
                offset: (4 * SCALAR, 2 * SCALAR),
                base_width: None,
                maskable: false,
            },
            SpriteKind::Coin => KindProfile {
                sheet: "coin-frames.png",
                columns: 4,
                rows: 1,
                offset: (2 * SCALAR, 2 * SCALAR),
                base_width: Some(8 * SCALAR),
                maskable: false,
            },
            SpriteKind::Key => KindProfile {
                sheet: "key-frames.png",
                columns: 6,
                rows: 1,
                offset: (2 * SCALAR, 2 * SCALAR),
                base_width: Some(8 * SCALAR),
                maskable: false,
            },
            SpriteKind::Door => KindProfile {
                sheet: "door-frames.png",
                columns: 8,
                rows: 1,
                offset: (0, 0),
                base_width: Some(4 * SCALAR),
                maskable: false,
            },
            SpriteKind::Beetle => KindProfile {
                sheet: "beetle-frames.png",
                columns: 4,
                rows: 4,
                offset: (4 * SCALAR, 2 * SCALAR),
                base_width: None,
                maskable: true,
            },
            SpriteKind::Wasp => KindProfile {
                sheet: "wasp-frames.png",
                columns: 4,
                rows: 4,
                offset: (4 * SCALAR, 2 * SCALAR),
                base_width: None,
                maskable: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_name() {
        for kind in [
            SpriteKind::Flames,
            SpriteKind::Coin,
            SpriteKind::Key,
            SpriteKind::Door,
            SpriteKind::Beetle,
            SpriteKind::Wasp,
        ] {
            assert_eq!(SpriteKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(SpriteKind::from_name("dragon"), None);
    }

    #[test]
    fn only_moving_kinds_are_masked() {
        assert!(SpriteKind::Wasp.profile().maskable);
        assert!(!SpriteKind::Coin.profile().maskable);
        assert!(SpriteKind::Beetle.is_baddie());
        assert!(!SpriteKind::Door.is_baddie());
    }
}
