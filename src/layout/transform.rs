//! Shape transformations: rotation about a pivot, translation and scale.
//!
//! ## Rotation Convention
//!
//! Coordinates follow the screen convention (y pointing down) and rotation
//! angles are clockwise positive, in degrees:
//! - 0° = no rotation
//! - 90° = right becomes down
//! - 180° = upside down
//! - 270° = right becomes up
//!
//! A shape point `p` maps to `rotate(p, rotation_center, rotate) + translate`.
//! Scale is not part of that mapping: it multiplies the shape's size
//! parameters before any point is generated.

use super::types::Point;

/// A 2D rotation around a center point.
#[derive(Debug, Clone, Copy)]
pub struct RotationTransform {
    /// Rotation angle in degrees (clockwise positive)
    pub angle_degrees: f64,
    /// Center point of rotation
    pub center: Point,
}

impl RotationTransform {
    pub fn new(angle_degrees: f64, center: Point) -> Self {
        Self {
            angle_degrees,
            center,
        }
    }

    /// Check if this is effectively a no-op (0° rotation).
    pub fn is_identity(&self) -> bool {
        self.angle_degrees.abs() < f64::EPSILON
    }

    /// The rotation undoing this one around the same center
    pub fn inverse(&self) -> Self {
        Self::new(-self.angle_degrees, self.center)
    }

    /// Rotate a point around the center.
    ///
    /// With the y axis pointing down, clockwise rotation uses:
    /// ```text
    /// x' = cx + (x - cx) * cos(θ) - (y - cy) * sin(θ)
    /// y' = cy + (x - cx) * sin(θ) + (y - cy) * cos(θ)
    /// ```
    pub fn transform_point(&self, point: Point) -> Point {
        if self.is_identity() {
            return point;
        }

        let (sin_a, cos_a) = self.angle_degrees.to_radians().sin_cos();
        let dx = point.x - self.center.x;
        let dy = point.y - self.center.y;

        Point {
            x: self.center.x + dx * cos_a - dy * sin_a,
            y: self.center.y + dx * sin_a + dy * cos_a,
        }
    }

    /// Rotate a free vector (no pivot involved)
    pub fn transform_vector(&self, vector: Point) -> Point {
        RotationTransform::new(self.angle_degrees, Point::zero()).transform_point(vector)
    }
}

/// Rotation, translation and scale applied to a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transformation {
    /// Clockwise rotation in degrees
    pub rotate: f64,
    pub translate: Point,
    /// Multiplier for the shape's size parameters
    pub scale: f64,
}

impl Transformation {
    /// Neutral transformation: no rotation, no offset, unit scale
    pub fn identity() -> Self {
        Self {
            rotate: 0.0,
            translate: Point::zero(),
            scale: 1.0,
        }
    }

    /// Merge a partial update, keeping every field the update leaves unset
    pub fn merge(&self, update: &TransformationUpdate) -> Transformation {
        Transformation {
            rotate: update.rotate.unwrap_or(self.rotate),
            translate: update.translate.unwrap_or(self.translate),
            scale: update.scale.unwrap_or(self.scale),
        }
    }

    /// Map a local shape point to its on-screen position
    pub fn apply(&self, rotation_center: Point, point: Point) -> Point {
        RotationTransform::new(self.rotate, rotation_center).transform_point(point) + self.translate
    }

    /// Map an on-screen position back into the shape's local frame
    pub fn invert(&self, rotation_center: Point, point: Point) -> Point {
        RotationTransform::new(self.rotate, rotation_center)
            .inverse()
            .transform_point(point - self.translate)
    }
}

impl Default for Transformation {
    fn default() -> Self {
        Self::identity()
    }
}

/// Partial update for [`Transformation`]; `None` keeps the current value
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransformationUpdate {
    pub rotate: Option<f64>,
    pub translate: Option<Point>,
    pub scale: Option<f64>,
}

impl TransformationUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rotate(mut self, degrees: f64) -> Self {
        self.rotate = Some(degrees);
        self
    }

    pub fn with_translate(mut self, offset: Point) -> Self {
        self.translate = Some(offset);
        self
    }

    pub fn with_scale(mut self, factor: f64) -> Self {
        self.scale = Some(factor);
        self
    }
}
