//! Pure geometry: grid snapping, center/corner conversion, point rotation and
//! point-in-rotated-rectangle tests.
//!
//! Angles are in degrees with a clockwise-positive convention: [`rotate`]
//! turns a point by the *negative* of the given angle in standard math
//! orientation. Positions are in canvas pixels with y growing downward.
//!
//! Half-dimension offsets use integer floor division, so [`center`] and
//! [`top_left`] are only inverse for even sizes.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

/// A point in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Per-side padding applied to a rectangle before rotation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    /// No padding on any side.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// The same padding on all four sides.
    #[must_use]
    pub fn uniform(v: f64) -> Self {
        Self { top: v, right: v, bottom: v, left: v }
    }
}

/// Axis-aligned rectangle stored as absolute edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Bounds {
    #[must_use]
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self { top, right, bottom, left }
    }

    /// Inverted sentinel that any real rectangle expands. `is_empty` is true.
    #[must_use]
    pub fn empty() -> Self {
        Self { top: f64::MAX, right: f64::MIN, bottom: f64::MIN, left: f64::MAX }
    }

    /// Rectangle from a top-left corner and a size.
    #[must_use]
    pub fn from_origin(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { top, right: left + width, bottom: top + height, left }
    }

    /// Rectangle spanned by two arbitrary corner points.
    #[must_use]
    pub fn spanning(a: Point, b: Point) -> Self {
        Self { top: a.y.min(b.y), right: a.x.max(b.x), bottom: a.y.max(b.y), left: a.x.min(b.x) }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.left > self.right || self.top > self.bottom
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Grow to include `other`.
    pub fn expand(&mut self, other: &Bounds) {
        self.left = self.left.min(other.left);
        self.top = self.top.min(other.top);
        self.right = self.right.max(other.right);
        self.bottom = self.bottom.max(other.bottom);
    }

    /// Shift all four edges.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.left += dx;
        self.right += dx;
        self.top += dy;
        self.bottom += dy;
    }

    /// Inclusive overlap: touching edges count as overlapping.
    #[must_use]
    pub fn overlaps(&self, other: &Bounds) -> bool {
        !(self.right < other.left || self.left > other.right || self.bottom < other.top || self.top > other.bottom)
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }
}

/// Four corners of a (possibly rotated) rectangle: top-left, top-right,
/// bottom-right, bottom-left, in that order before rotation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Corners {
    pub p1: Point,
    pub p2: Point,
    pub p3: Point,
    pub p4: Point,
}

/// A rectangle described by its center, un-rotated size and rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatedRect {
    pub center: Point,
    pub width: u32,
    pub height: u32,
    /// Degrees, clockwise-positive.
    pub rotation: f64,
}

/// How [`contains_point_with`] compares the quad area with the summed
/// triangle areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainmentTest {
    /// Bitwise float equality. Reliable for axis-aligned integer geometry
    /// only: rotated corners of a non-square rect carry rounding error, so
    /// even the rect's own center can test as outside.
    Exact,
    /// Equality within a small relative epsilon.
    #[default]
    Tolerant,
}

/// Relative tolerance used by [`ContainmentTest::Tolerant`].
const AREA_EPSILON: f64 = 1e-9;

/// Snap `point` to the center of the grid cell that contains it.
///
/// A zero `cell_size` disables snapping.
#[must_use]
pub fn snap_to_grid(point: Point, cell_size: u32) -> Point {
    if cell_size == 0 {
        return point;
    }
    let cell = f64::from(cell_size);
    let half = f64::from(cell_size / 2);
    Point {
        x: (point.x / cell).floor() * cell + half,
        y: (point.y / cell).floor() * cell + half,
    }
}

/// Center of a `width` x `height` box whose top-left corner is `top_left`.
#[must_use]
pub fn center(top_left: Point, width: u32, height: u32) -> Point {
    Point { x: top_left.x + f64::from(width / 2), y: top_left.y + f64::from(height / 2) }
}

/// Top-left corner of a `width` x `height` box centered on `center`.
#[must_use]
pub fn top_left(center: Point, width: u32, height: u32) -> Point {
    Point { x: center.x - f64::from(width / 2), y: center.y - f64::from(height / 2) }
}

/// Rotate `point` around `center` by `angle_deg` (clockwise-positive).
#[must_use]
pub fn rotate(point: Point, center: Point, angle_deg: f64) -> Point {
    let (s, c) = (-angle_deg).to_radians().sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    Point { x: dx * c - dy * s + center.x, y: dx * s + dy * c + center.y }
}

/// Corners of `rect` grown by `padding`, then rotated around its center.
#[must_use]
pub fn corners(rect: &RotatedRect, padding: Padding) -> Corners {
    let lt = top_left(rect.center, rect.width, rect.height);
    let w = f64::from(rect.width);
    let h = f64::from(rect.height);

    let p1 = Point::new(lt.x - padding.left, lt.y - padding.top);
    let p2 = Point::new(lt.x + w + padding.right, lt.y - padding.top);
    let p3 = Point::new(lt.x + w + padding.right, lt.y + h + padding.bottom);
    let p4 = Point::new(lt.x - padding.left, lt.y + h + padding.bottom);

    Corners {
        p1: rotate(p1, rect.center, rect.rotation),
        p2: rotate(p2, rect.center, rect.rotation),
        p3: rotate(p3, rect.center, rect.rotation),
        p4: rotate(p4, rect.center, rect.rotation),
    }
}

/// Whether `point` lies inside or on the edge of `rect`.
#[must_use]
pub fn contains_point(rect: &RotatedRect, point: Point) -> bool {
    contains_point_with(rect, point, Padding::zero(), ContainmentTest::default())
}

/// Point-in-convex-quad test by area decomposition.
///
/// The quad area (two triangles) is compared with the sum of the four
/// triangles formed by `point` and each edge.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn contains_point_with(rect: &RotatedRect, point: Point, padding: Padding, test: ContainmentTest) -> bool {
    let p = corners(rect, padding);
    let quad = triangle_area(p.p1, p.p2, p.p3) + triangle_area(p.p3, p.p4, p.p1);
    let parts = triangle_area(point, p.p1, p.p2)
        + triangle_area(point, p.p2, p.p3)
        + triangle_area(point, p.p3, p.p4)
        + triangle_area(point, p.p4, p.p1);

    match test {
        ContainmentTest::Exact => quad == parts,
        ContainmentTest::Tolerant => (quad - parts).abs() <= AREA_EPSILON * quad.max(1.0),
    }
}

fn triangle_area(a: Point, b: Point, c: Point) -> f64 {
    ((a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y)) / 2.0).abs()
}
