//! Core value types shared by shapes, alignment and routing

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};
use std::str::FromStr;

use super::error::LayoutError;

/// Tolerance used when deciding whether a vector is degenerate
pub const EPSILON: f64 = 1e-9;

/// A 2D point (or vector) in screen coordinates, y pointing down
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Euclidean length when the point is read as a vector
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(&self, other: Point) -> f64 {
        (*self - other).length()
    }

    /// Unit vector in the same direction, or `None` for a zero vector
    pub fn normalized(&self) -> Option<Point> {
        let len = self.length();
        if len < EPSILON {
            None
        } else {
            Some(Point::new(self.x / len, self.y / len))
        }
    }

    pub fn is_zero(&self) -> bool {
        self.length() < EPSILON
    }

    /// Round both coordinates to the nearest integer
    pub fn rounded(&self) -> Point {
        Point::new(self.x.round(), self.y.round())
    }

    /// Screen angle in degrees, clockwise from +x
    pub fn angle_degrees(&self) -> f64 {
        self.y.atan2(self.x).to_degrees()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Signed clockwise angle (degrees, in `[0, 360)`) that rotates `from` onto `to`.
///
/// Returns 0 when either vector is degenerate.
pub fn signed_angle(from: Point, to: Point) -> f64 {
    if from.is_zero() || to.is_zero() {
        return 0.0;
    }
    normalize_degrees(to.angle_degrees() - from.angle_degrees())
}

/// Fold an angle into `[0, 360)`
pub fn normalize_degrees(angle: f64) -> f64 {
    let folded = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if folded >= 360.0 - EPSILON {
        0.0
    } else {
        folded
    }
}

/// Axis-aligned bounding box stored as extrema
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl BoundingBox {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Smallest box containing every point; `None` for an empty slice
    pub fn from_points(points: &[Point]) -> Option<BoundingBox> {
        let first = points.first()?;
        let mut bounds = BoundingBox::new(first.x, first.x, first.y, first.y);
        for p in &points[1..] {
            bounds = bounds.expand_to_include(*p);
        }
        Some(bounds)
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    /// Inclusive containment test, tolerant of floating point noise on the edges
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x_min - EPSILON
            && point.x <= self.x_max + EPSILON
            && point.y >= self.y_min - EPSILON
            && point.y <= self.y_max + EPSILON
    }

    /// Compute the union of two bounding boxes (smallest box containing both)
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            self.x_min.min(other.x_min),
            self.x_max.max(other.x_max),
            self.y_min.min(other.y_min),
            self.y_max.max(other.y_max),
        )
    }

    pub fn expand_to_include(&self, point: Point) -> BoundingBox {
        BoundingBox::new(
            self.x_min.min(point.x),
            self.x_max.max(point.x),
            self.y_min.min(point.y),
            self.y_max.max(point.y),
        )
    }

    /// Extrema as the `(x_min, x_max, y_min, y_max)` tuple
    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.x_min, self.x_max, self.y_min, self.y_max)
    }
}

/// Cardinal direction used for exit directions and anchor hints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Top,
    Bottom,
}

impl Direction {
    /// Probe order used by exit-direction detection
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Top,
        Direction::Bottom,
    ];

    /// Unit vector in screen coordinates (top is -y)
    pub fn unit(self) -> Point {
        match self {
            Direction::Left => Point::new(-1.0, 0.0),
            Direction::Right => Point::new(1.0, 0.0),
            Direction::Top => Point::new(0.0, -1.0),
            Direction::Bottom => Point::new(0.0, 1.0),
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Top | Direction::Bottom)
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Top => Direction::Bottom,
            Direction::Bottom => Direction::Top,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Top => "top",
            Direction::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            "top" => Ok(Direction::Top),
            "bottom" => Ok(Direction::Bottom),
            other => Err(LayoutError::invalid_orientation(
                other,
                "expected one of left, right, top, bottom",
            )),
        }
    }
}

/// Selects a reference point/vector on a shape
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Orientation {
    Side(Direction),
    /// The shape center; a point with no separation distance
    Cen,
    /// A named anchor generated by `make_anchors`
    Anchor(String),
}

impl Orientation {
    pub fn anchor(name: impl Into<String>) -> Self {
        Orientation::Anchor(name.into())
    }

    pub fn is_cardinal(&self) -> bool {
        !matches!(self, Orientation::Anchor(_))
    }
}

impl From<Direction> for Orientation {
    fn from(dir: Direction) -> Self {
        Orientation::Side(dir)
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Side(dir) => write!(f, "{}", dir),
            Orientation::Cen => f.write_str("cen"),
            Orientation::Anchor(name) => f.write_str(name),
        }
    }
}

impl FromStr for Orientation {
    type Err = LayoutError;

    /// Cardinal keys and `cen` map to their variants; any other
    /// non-empty key is taken as an anchor name and checked on lookup.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Err(LayoutError::invalid_orientation(s, "empty orientation key")),
            "cen" => Ok(Orientation::Cen),
            "left" | "right" | "top" | "bottom" => Ok(Orientation::Side(s.parse()?)),
            name => Ok(Orientation::Anchor(name.to_string())),
        }
    }
}
