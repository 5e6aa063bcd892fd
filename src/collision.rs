/// Axis-aligned bounding boxes and the single overlap test every
/// higher-level check is built from.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Square of side `2 * half_extent` centred on `(cx, cy)`.
    pub fn centered(cx: f32, cy: f32, half_extent: f32) -> Self {
        Self {
            x: cx - half_extent,
            y: cy - half_extent,
            w: half_extent * 2.0,
            h: half_extent * 2.0,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// Anything that occupies a rectangle in the arena.
pub trait Bounded {
    fn bounds(&self) -> Rect;

    fn center(&self) -> (f32, f32) {
        self.bounds().center()
    }
}

impl Bounded for Rect {
    fn bounds(&self) -> Rect {
        *self
    }
}

/// True iff the two rectangles overlap. Touching edges do not count.
pub fn intersects(a: &impl Bounded, b: &impl Bounded) -> bool {
    let a = a.bounds();
    let b = b.bounds();
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

/// Squared distance between two centres.
pub fn center_distance_sq(a: &impl Bounded, b: &impl Bounded) -> f32 {
    let (ax, ay) = a.center();
    let (bx, by) = b.center();
    (ax - bx).powi(2) + (ay - by).powi(2)
}
