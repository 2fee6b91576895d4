//! Geometry primitives shared across the window manager core.

/// A point in output-layout coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A size in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Window geometry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width as i32 / 2, self.y + self.height as i32 / 2)
    }

    /// Does this rectangle contain the given point? Edges are inclusive on
    /// the top/left and exclusive on the bottom/right.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x + self.width as i32
            && point.y < self.y + self.height as i32
    }

    /// Linear interpolation between two rectangles, `t` in `[0, 1]`.
    pub fn interpolate(from: Rect, to: Rect, t: f64) -> Rect {
        let t = t.clamp(0.0, 1.0);
        let lerp_i = |a: i32, b: i32| a + ((b - a) as f64 * t).round() as i32;
        let lerp_u =
            |a: u32, b: u32| (a as f64 + (b as f64 - a as f64) * t).round().max(1.0) as u32;
        Rect {
            x: lerp_i(from.x, to.x),
            y: lerp_i(from.y, to.y),
            width: lerp_u(from.width, to.width),
            height: lerp_u(from.height, to.height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_edges() {
        let rect = Rect::new(10, 10, 100, 50);
        assert!(rect.contains(Point::new(10, 10)));
        assert!(rect.contains(Point::new(109, 59)));
        assert!(!rect.contains(Point::new(110, 10)));
        assert!(!rect.contains(Point::new(10, 60)));
        assert!(!rect.contains(Point::new(9, 10)));
    }

    #[test]
    fn test_interpolate_endpoints() {
        let from = Rect::new(0, 0, 10, 10);
        let to = Rect::new(100, 50, 200, 150);
        assert_eq!(Rect::interpolate(from, to, 0.0), from);
        assert_eq!(Rect::interpolate(from, to, 1.0), to);
        let mid = Rect::interpolate(from, to, 0.5);
        assert_eq!(mid, Rect::new(50, 25, 105, 80));
    }
}
