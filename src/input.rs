//! Pointer normalisation.

/// Bounding rectangle of the container in client coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContainerRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Pointer position relative to the container, both axes in `[-1, 1]` with
/// `y` pointing up. The centre of the container is the origin.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
}

impl PointerState {
    /// Normalise a client position against `rect`. Returns `None` for an
    /// empty rectangle.
    pub fn from_client(client: (f64, f64), rect: &ContainerRect) -> Option<Self> {
        if !(rect.width > 0.0 && rect.height > 0.0) {
            return None;
        }
        let x = (client.0 - rect.left) / rect.width * 2.0 - 1.0;
        let y = -((client.1 - rect.top) / rect.height * 2.0 - 1.0);
        Some(Self {
            x: (x as f32).clamp(-1.0, 1.0),
            y: (y as f32).clamp(-1.0, 1.0),
        })
    }

    /// Move to the normalised `client` position. Leaves the state untouched
    /// and returns `false` when `rect` is empty.
    pub fn update(&mut self, client: (f64, f64), rect: &ContainerRect) -> bool {
        match Self::from_client(client, rect) {
            Some(next) => {
                *self = next;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECT: ContainerRect = ContainerRect {
        left: 100.0,
        top: 50.0,
        width: 400.0,
        height: 200.0,
    };

    #[test]
    fn corners_map_to_unit_square() {
        let top_left = PointerState::from_client((100.0, 50.0), &RECT);
        assert_eq!(top_left, Some(PointerState { x: -1.0, y: 1.0 }));
        let bottom_right = PointerState::from_client((500.0, 250.0), &RECT);
        assert_eq!(bottom_right, Some(PointerState { x: 1.0, y: -1.0 }));
        let centre = PointerState::from_client((300.0, 150.0), &RECT);
        assert_eq!(centre, Some(PointerState { x: 0.0, y: 0.0 }));
    }

    #[test]
    fn outside_positions_are_clamped() {
        let far = PointerState::from_client((-1000.0, 9000.0), &RECT);
        assert_eq!(far, Some(PointerState { x: -1.0, y: -1.0 }));
    }

    #[test]
    fn empty_rect_is_ignored() {
        let mut pointer = PointerState { x: 0.25, y: -0.5 };
        let empty = ContainerRect {
            width: 0.0,
            ..RECT
        };
        assert!(!pointer.update((120.0, 60.0), &empty));
        assert_eq!(pointer, PointerState { x: 0.25, y: -0.5 });
    }
}
