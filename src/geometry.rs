//! Integer pixel geometry used by the snapping engine
//!
//! All coordinates are model-space pixels. Intervals are half-open:
//! `[begin, begin + length)`. The `Transposer` swaps x and y so the
//! per-axis algorithms can be written once against the x axis.

use crate::snapping::Axis;

/// A 2D point in model coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The point with x and y swapped
    pub fn transposed(self) -> Self {
        Self {
            x: self.y,
            y: self.x,
        }
    }
}

/// A 2D size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn transposed(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_point_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Right edge x-coordinate (exclusive)
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate (exclusive)
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn location(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Move the right edge, keeping the left edge fixed
    pub fn set_right(&mut self, right: i32) {
        self.width = right - self.x;
    }

    /// Move the bottom edge, keeping the top edge fixed
    pub fn set_bottom(&mut self, bottom: i32) {
        self.height = bottom - self.y;
    }

    /// Move the left edge, keeping the right edge fixed
    pub fn set_left(&mut self, left: i32) {
        self.width = self.right() - left;
        self.x = left;
    }

    /// Move the top edge, keeping the bottom edge fixed
    pub fn set_top(&mut self, top: i32) {
        self.height = self.bottom() - top;
        self.y = top;
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Grow the rectangle by `margin` on every side
    pub fn expanded(&self, margin: i32) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            self.width + 2 * margin,
            self.height + 2 * margin,
        )
    }

    /// Horizontal extent as an interval
    pub fn x_span(&self) -> Interval {
        Interval::new(self.x, self.width)
    }

    /// Vertical extent as an interval
    pub fn y_span(&self) -> Interval {
        Interval::new(self.y, self.height)
    }

    /// Extent along the given axis
    pub fn span(&self, axis: Axis) -> Interval {
        match axis {
            Axis::Horizontal => self.x_span(),
            Axis::Vertical => self.y_span(),
        }
    }

    pub fn transposed(self) -> Rect {
        Rect::new(self.y, self.x, self.height, self.width)
    }
}

/// A half-open 1-D interval `[begin, begin + length)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interval {
    pub begin: i32,
    pub length: i32,
}

impl Interval {
    pub fn new(begin: i32, length: i32) -> Self {
        Self { begin, length }
    }

    /// Interval of `2 * radius` centered on `center`
    pub fn around(center: i32, radius: i32) -> Self {
        Self::new(center - radius, 2 * radius)
    }

    /// End coordinate (exclusive)
    pub fn end(&self) -> i32 {
        self.begin + self.length
    }

    pub fn center(&self) -> i32 {
        self.begin + self.length / 2
    }

    pub fn contains(&self, position: i32) -> bool {
        position >= self.begin && position < self.end()
    }

    pub fn intersects(&self, other: &Interval) -> bool {
        self.begin < other.end() && other.begin < self.end()
    }

    /// Overlapping part of two intervals; zero-length when disjoint
    pub fn intersection(&self, other: &Interval) -> Interval {
        let begin = self.begin.max(other.begin);
        let end = self.end().min(other.end());
        Interval::new(begin, (end - begin).max(0))
    }

    /// Distance from this interval to a position; zero when inside
    pub fn distance(&self, position: i32) -> i32 {
        if position < self.begin {
            self.begin - position
        } else if position >= self.end() {
            position - self.end()
        } else {
            0
        }
    }

    /// Whether this interval starts before `other`
    pub fn is_leading_of(&self, other: &Interval) -> bool {
        self.begin < other.begin
    }

    /// Whether this interval ends after `other`
    pub fn is_trailing_of(&self, other: &Interval) -> bool {
        self.end() > other.end()
    }

    /// Grow the interval by `amount` on both ends
    pub fn expanded(&self, amount: i32) -> Interval {
        Interval::new(self.begin - amount, self.length + 2 * amount)
    }
}

/// Conditionally swaps x and y so axis-specific code can treat the working
/// axis as horizontal. Transposing twice restores the original value.
#[derive(Debug, Clone, Copy)]
pub struct Transposer {
    active: bool,
}

impl Transposer {
    /// A transposer that maps the given axis onto x
    pub fn for_axis(axis: Axis) -> Self {
        Self {
            active: axis == Axis::Vertical,
        }
    }

    pub fn rect(&self, r: Rect) -> Rect {
        if self.active {
            r.transposed()
        } else {
            r
        }
    }

    pub fn point(&self, p: Point) -> Point {
        if self.active {
            p.transposed()
        } else {
            p
        }
    }

    pub fn size(&self, s: Size) -> Size {
        if self.active {
            s.transposed()
        } else {
            s
        }
    }
}
