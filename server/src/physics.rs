use shared::Position;

///Represents an axis-aligned rectangle in screen space.
/// `x`/`y` is the top-left corner, y grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    ///Returns a square of side `size` anchored at `pos`.
    pub fn square(pos: Position, size: i32) -> Self {
        Rect::new(pos.x, pos.y, size, size)
    }

    pub fn top_left(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    ///Returns the rectangle moved by the given delta.
    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    ///Checks for AABB (Axis-Aligned Bounding Box) intersection.
    /// Rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.right() <= other.x
            || other.right() <= self.x
            || self.bottom() <= other.y
            || other.bottom() <= self.y)
    }
}
