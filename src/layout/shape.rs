//! Shape primitives and their anchor/orientation algebra
//!
//! A [`Shape`] is one of three variants (rectangle, circle, isosceles
//! triangle) plus the state every variant shares: a [`Transformation`], an
//! optional rotation center, a set of named anchors, labels and a
//! decoration record.
//!
//! Geometry is kept in the shape's *local* frame (its declared dimensions,
//! scaled but neither rotated nor translated). On-screen positions are
//! obtained by rotating about the rotation center and then translating.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use super::error::LayoutError;
use super::transform::{RotationTransform, Transformation, TransformationUpdate};
use super::types::{normalize_degrees, BoundingBox, Direction, Orientation, Point, EPSILON};

/// Which primitive a dimension tuple describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeVariant {
    Rectangle,
    Circle,
    Triangle,
}

impl ShapeVariant {
    /// Number of entries in this variant's `dim` tuple
    pub fn dim_len(self) -> usize {
        match self {
            ShapeVariant::Rectangle => 4,
            ShapeVariant::Circle => 3,
            ShapeVariant::Triangle => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeVariant::Rectangle => "rectangle",
            ShapeVariant::Circle => "circle",
            ShapeVariant::Triangle => "triangle",
        }
    }
}

/// Variant-specific dimensions, before scale is applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeKind {
    /// `dim = [x, y, w, h]`, `(x, y)` being the top-left corner
    Rectangle {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    /// `dim = [x, y, diameter]`, `(x, y)` being the top-left of the bounding square
    Circle { x: f64, y: f64, diameter: f64 },
    /// `dim = [x, y, edge_length, apex_angle_deg]`
    ///
    /// The apex points up; `(x, y)` is the top-left of the bounding box and
    /// `edge` is the length of the two equal legs.
    IsoscelesTriangle {
        x: f64,
        y: f64,
        edge: f64,
        apex_angle: f64,
    },
}

impl ShapeKind {
    /// Build a kind from its ordered dimension tuple
    pub fn from_dim(variant: ShapeVariant, dim: &[f64]) -> Result<Self, LayoutError> {
        if dim.len() != variant.dim_len() {
            return Err(LayoutError::invalid_dimensions(
                variant.as_str(),
                format!(
                    "expected {} values in dim, found {}",
                    variant.dim_len(),
                    dim.len()
                ),
            ));
        }
        let kind = match variant {
            ShapeVariant::Rectangle => ShapeKind::Rectangle {
                x: dim[0],
                y: dim[1],
                width: dim[2],
                height: dim[3],
            },
            ShapeVariant::Circle => ShapeKind::Circle {
                x: dim[0],
                y: dim[1],
                diameter: dim[2],
            },
            ShapeVariant::Triangle => ShapeKind::IsoscelesTriangle {
                x: dim[0],
                y: dim[1],
                edge: dim[2],
                apex_angle: dim[3],
            },
        };
        kind.validate()?;
        Ok(kind)
    }

    pub fn variant(&self) -> ShapeVariant {
        match self {
            ShapeKind::Rectangle { .. } => ShapeVariant::Rectangle,
            ShapeKind::Circle { .. } => ShapeVariant::Circle,
            ShapeKind::IsoscelesTriangle { .. } => ShapeVariant::Triangle,
        }
    }

    /// The ordered dimension tuple
    pub fn dim(&self) -> Vec<f64> {
        match *self {
            ShapeKind::Rectangle {
                x,
                y,
                width,
                height,
            } => vec![x, y, width, height],
            ShapeKind::Circle { x, y, diameter } => vec![x, y, diameter],
            ShapeKind::IsoscelesTriangle {
                x,
                y,
                edge,
                apex_angle,
            } => vec![x, y, edge, apex_angle],
        }
    }

    /// Reject non-finite values and sizes that collapse the shape
    pub fn validate(&self) -> Result<(), LayoutError> {
        let name = self.variant().as_str();
        if self.dim().iter().any(|v| !v.is_finite()) {
            return Err(LayoutError::invalid_dimensions(
                name,
                "dimensions must be finite",
            ));
        }
        match *self {
            ShapeKind::Rectangle { width, height, .. } if width <= 0.0 || height <= 0.0 => Err(
                LayoutError::invalid_dimensions(name, "width and height must be positive"),
            ),
            ShapeKind::Circle { diameter, .. } if diameter <= 0.0 => Err(
                LayoutError::invalid_dimensions(name, "diameter must be positive"),
            ),
            ShapeKind::IsoscelesTriangle { edge, .. } if edge <= 0.0 => Err(
                LayoutError::invalid_dimensions(name, "edge length must be positive"),
            ),
            ShapeKind::IsoscelesTriangle { apex_angle, .. }
                if apex_angle <= 0.0 || apex_angle >= 180.0 =>
            {
                Err(LayoutError::invalid_dimensions(
                    name,
                    "apex angle must lie strictly between 0 and 180 degrees",
                ))
            }
            _ => Ok(()),
        }
    }

    /// Same shape with its size parameters multiplied by `factor`
    fn scaled(&self, factor: f64) -> ShapeKind {
        match *self {
            ShapeKind::Rectangle {
                x,
                y,
                width,
                height,
            } => ShapeKind::Rectangle {
                x,
                y,
                width: width * factor,
                height: height * factor,
            },
            ShapeKind::Circle { x, y, diameter } => ShapeKind::Circle {
                x,
                y,
                diameter: diameter * factor,
            },
            ShapeKind::IsoscelesTriangle {
                x,
                y,
                edge,
                apex_angle,
            } => ShapeKind::IsoscelesTriangle {
                x,
                y,
                edge: edge * factor,
                apex_angle,
            },
        }
    }
}

/// Apex, base-left and base-right corners of a triangle in its local frame
fn triangle_corners(x: f64, y: f64, edge: f64, apex_angle: f64) -> [Point; 3] {
    let half = (apex_angle / 2.0).to_radians();
    let half_base = edge * half.sin();
    let height = edge * half.cos();
    [
        Point::new(x + half_base, y),
        Point::new(x, y + height),
        Point::new(x + 2.0 * half_base, y + height),
    ]
}

/// Parameters `t` in `[0, 1]` for evenly spaced anchors along one side
fn anchor_spacing(count: usize, include_corner: bool) -> Vec<f64> {
    if include_corner {
        (0..count).map(|i| i as f64 / (count - 1) as f64).collect()
    } else {
        (0..count)
            .map(|i| (i + 1) as f64 / (count + 1) as f64)
            .collect()
    }
}

fn lerp(from: Point, to: Point, t: f64) -> Point {
    from + (to - from) * t
}

fn add_side(
    anchors: &mut BTreeMap<String, Point>,
    spacing: &[f64],
    side: &str,
    from: Point,
    to: Point,
) {
    for (i, t) in spacing.iter().enumerate() {
        anchors.insert(format!("anchor_{}_{}", side, i), lerp(from, to, *t));
    }
}

/// Label attached to a shape, positioned by the rendering layer
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeLabel {
    pub text: String,
    pub anchor: String,
    pub orientation: Orientation,
}

/// Style fields driven by the telemetry layer
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Decoration {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    pub opacity: Option<f64>,
}

impl Decoration {
    /// Merge another decoration, with other taking precedence
    pub fn merge(&self, other: &Decoration) -> Decoration {
        Decoration {
            fill: other.fill.clone().or_else(|| self.fill.clone()),
            stroke: other.stroke.clone().or_else(|| self.stroke.clone()),
            stroke_width: other.stroke_width.or(self.stroke_width),
            opacity: other.opacity.or(self.opacity),
        }
    }
}

/// A single geometric entity of a synoptic diagram
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    kind: ShapeKind,
    rotation_center: Option<Point>,
    transformation: Transformation,
    anchors: BTreeMap<String, Point>,
    anchors_stale: bool,
    labels: Vec<ShapeLabel>,
    decoration: Decoration,
}

impl Shape {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            rotation_center: None,
            transformation: Transformation::identity(),
            anchors: BTreeMap::new(),
            anchors_stale: false,
            labels: vec![],
            decoration: Decoration::default(),
        }
    }

    pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(ShapeKind::Rectangle {
            x,
            y,
            width,
            height,
        })
    }

    pub fn circle(x: f64, y: f64, diameter: f64) -> Self {
        Self::new(ShapeKind::Circle { x, y, diameter })
    }

    pub fn triangle(x: f64, y: f64, edge: f64, apex_angle: f64) -> Self {
        Self::new(ShapeKind::IsoscelesTriangle {
            x,
            y,
            edge,
            apex_angle,
        })
    }

    /// Build a validated shape from an ordered dimension tuple
    pub fn from_dim(variant: ShapeVariant, dim: &[f64]) -> Result<Self, LayoutError> {
        Ok(Self::new(ShapeKind::from_dim(variant, dim)?))
    }

    pub fn with_transformation(mut self, update: TransformationUpdate) -> Self {
        self.update_transformation(update);
        self
    }

    pub fn with_rotation_center(mut self, center: Point) -> Self {
        self.rotation_center = Some(center);
        self
    }

    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    /// Replace the dimensions; anchors stay stale until regenerated
    pub fn set_kind(&mut self, kind: ShapeKind) {
        self.kind = kind;
        self.mark_anchors_stale();
    }

    pub fn dim(&self) -> Vec<f64> {
        self.kind.dim()
    }

    /// Dimensions with the current scale applied
    fn sized(&self) -> ShapeKind {
        self.kind.scaled(self.transformation.scale)
    }

    // ---- transformation -------------------------------------------------

    pub fn transformation(&self) -> &Transformation {
        &self.transformation
    }

    /// Merge a partial transformation update; unset fields are kept
    pub fn update_transformation(&mut self, update: TransformationUpdate) {
        let merged = self.transformation.merge(&update);
        if merged.scale != self.transformation.scale {
            self.mark_anchors_stale();
        }
        self.transformation = merged;
    }

    /// Add an offset to the current translation
    pub fn translate(&mut self, offset: Point) {
        self.transformation.translate += offset;
    }

    /// Add a clockwise angle (degrees) to the current rotation
    pub fn rotate(&mut self, degrees: f64) {
        self.transformation.rotate = normalize_degrees(self.transformation.rotate + degrees);
    }

    /// Set the scale factor; anchors stay stale until regenerated
    pub fn scale(&mut self, factor: f64) {
        self.update_transformation(TransformationUpdate::new().with_scale(factor));
    }

    /// Neutral rotation and translation; scale is left untouched
    pub fn reset(&mut self) {
        self.update_transformation(
            TransformationUpdate::new()
                .with_rotate(0.0)
                .with_translate(Point::zero()),
        );
    }

    /// Pivot used for rotation, defaulting to the un-translated center
    pub fn rotation_center(&self) -> Point {
        self.rotation_center
            .unwrap_or_else(|| self.compute_center_from_dim(false))
    }

    pub fn set_rotation_center(&mut self, center: Option<Point>) {
        self.rotation_center = center;
    }

    /// Map a local point to its on-screen position
    pub fn to_screen(&self, local: Point) -> Point {
        self.transformation.apply(self.rotation_center(), local)
    }

    fn rotation(&self) -> RotationTransform {
        RotationTransform::new(self.transformation.rotate, self.rotation_center())
    }

    // ---- geometry -------------------------------------------------------

    /// Geometric center, optionally offset by the current translation.
    ///
    /// Rotation is not applied; see [`Shape::center`] for the on-screen center.
    pub fn compute_center_from_dim(&self, apply_translate: bool) -> Point {
        let center = match self.sized() {
            ShapeKind::Rectangle {
                x,
                y,
                width,
                height,
            } => Point::new(x + width / 2.0, y + height / 2.0),
            ShapeKind::Circle { x, y, diameter } => {
                let r = diameter / 2.0;
                Point::new(x + r, y + r)
            }
            ShapeKind::IsoscelesTriangle {
                x,
                y,
                edge,
                apex_angle,
            } => {
                let [p1, _, p3] = triangle_corners(x, y, edge, apex_angle);
                // circumradius of the isosceles triangle
                let r = edge * edge / (2.0 * (p3.y - p1.y).abs());
                Point::new(p1.x, p1.y + r)
            }
        };
        if apply_translate {
            center + self.transformation.translate
        } else {
            center
        }
    }

    /// On-screen center (rotated about the pivot, then translated)
    pub fn center(&self) -> Point {
        self.to_screen(self.compute_center_from_dim(false))
    }

    /// Points that define the outline in the local frame
    fn local_defining_points(&self) -> Vec<Point> {
        match self.sized() {
            ShapeKind::Rectangle {
                x,
                y,
                width,
                height,
            } => vec![
                Point::new(x, y),
                Point::new(x + width, y),
                Point::new(x + width, y + height),
                Point::new(x, y + height),
            ],
            ShapeKind::Circle { x, y, diameter } => {
                let r = diameter / 2.0;
                let (cx, cy) = (x + r, y + r);
                vec![
                    Point::new(cx + r, cy),
                    Point::new(cx, cy + r),
                    Point::new(cx - r, cy),
                    Point::new(cx, cy - r),
                ]
            }
            ShapeKind::IsoscelesTriangle {
                x,
                y,
                edge,
                apex_angle,
            } => triangle_corners(x, y, edge, apex_angle).to_vec(),
        }
    }

    /// Transformed corners (rectangle, triangle) or cardinal points (circle)
    pub fn defining_points(&self) -> Vec<Point> {
        self.local_defining_points()
            .into_iter()
            .map(|p| self.to_screen(p))
            .collect()
    }

    /// Un-rotated, un-translated bounding box
    fn local_bounds(&self) -> BoundingBox {
        let points = self.local_defining_points();
        BoundingBox::from_points(&points).unwrap_or_else(|| {
            let c = self.compute_center_from_dim(false);
            BoundingBox::new(c.x, c.x, c.y, c.y)
        })
    }

    /// Axis-aligned bounding box after rotation and translation
    pub fn calculate_shape_boundary(&self) -> BoundingBox {
        let points = self.defining_points();
        BoundingBox::from_points(&points).unwrap_or_else(|| {
            let c = self.center();
            BoundingBox::new(c.x, c.x, c.y, c.y)
        })
    }

    /// Point containment against the shape's un-rotated hit region.
    ///
    /// Circles use a per-axis radius test, so their hit region is the
    /// bounding square rather than the disc.
    pub fn check_pos(&self, x: f64, y: f64) -> bool {
        let local = self
            .transformation
            .invert(self.rotation_center(), Point::new(x, y));
        match self.sized() {
            ShapeKind::Rectangle {
                x,
                y,
                width,
                height,
            } => BoundingBox::new(x, x + width, y, y + height).contains(local),
            ShapeKind::Circle { diameter, .. } => {
                let c = self.compute_center_from_dim(false);
                let r = diameter / 2.0;
                (local.x - c.x).abs() <= r + EPSILON && (local.y - c.y).abs() <= r + EPSILON
            }
            ShapeKind::IsoscelesTriangle { .. } => self.local_bounds().contains(local),
        }
    }

    // ---- anchors --------------------------------------------------------

    /// Regenerate the named anchor set.
    ///
    /// Rectangles get `count` anchors per side named
    /// `anchor_{top|left|bottom|right}_{i}`, triangles `anchor_{left|right|bottom}_{i}`
    /// along the two legs and the base, circles `anchor_arc_{i}` evenly spaced
    /// by angle starting at +x and turning clockwise.
    pub fn make_anchors(&mut self, count: usize, include_corner: bool) -> Result<(), LayoutError> {
        if count == 0 {
            return Err(LayoutError::anchor_count(
                count,
                include_corner,
                "at least one anchor per side is required",
            ));
        }
        if include_corner && count <= 2 {
            return Err(LayoutError::anchor_count(
                count,
                include_corner,
                "including corners needs more than two anchors per side",
            ));
        }

        let spacing = anchor_spacing(count, include_corner);
        let mut anchors = BTreeMap::new();

        match self.sized() {
            ShapeKind::Rectangle {
                x,
                y,
                width,
                height,
            } => {
                let tl = Point::new(x, y);
                let tr = Point::new(x + width, y);
                let bl = Point::new(x, y + height);
                let br = Point::new(x + width, y + height);
                add_side(&mut anchors, &spacing, "top", tl, tr);
                add_side(&mut anchors, &spacing, "left", tl, bl);
                add_side(&mut anchors, &spacing, "bottom", bl, br);
                add_side(&mut anchors, &spacing, "right", tr, br);
            }
            ShapeKind::IsoscelesTriangle {
                x,
                y,
                edge,
                apex_angle,
            } => {
                let [apex, base_left, base_right] = triangle_corners(x, y, edge, apex_angle);
                add_side(&mut anchors, &spacing, "left", apex, base_left);
                add_side(&mut anchors, &spacing, "right", apex, base_right);
                add_side(&mut anchors, &spacing, "bottom", base_left, base_right);
            }
            ShapeKind::Circle { diameter, .. } => {
                let c = self.compute_center_from_dim(false);
                let r = diameter / 2.0;
                for i in 0..count {
                    let angle = (360.0 * i as f64 / count as f64).to_radians();
                    anchors.insert(
                        format!("anchor_arc_{}", i),
                        Point::new(c.x + r * angle.cos(), c.y + r * angle.sin()),
                    );
                }
            }
        }

        tracing::trace!(
            shape = %self,
            count,
            include_corner,
            generated = anchors.len(),
            "anchors regenerated"
        );
        self.anchors = anchors;
        self.anchors_stale = false;
        Ok(())
    }

    fn mark_anchors_stale(&mut self) {
        if !self.anchors.is_empty() {
            self.anchors_stale = true;
        }
    }

    /// Whether the anchors predate the current size
    pub fn anchors_stale(&self) -> bool {
        self.anchors_stale
    }

    /// Local (un-transformed) anchor points by name
    pub fn anchors(&self) -> &BTreeMap<String, Point> {
        &self.anchors
    }

    pub fn anchor_names(&self) -> Vec<String> {
        self.anchors.keys().cloned().collect()
    }

    /// Local position of a named anchor
    pub fn local_anchor(&self, name: &str) -> Result<Point, LayoutError> {
        if self.anchors_stale {
            return Err(LayoutError::StaleAnchors {
                shape: self.to_string(),
            });
        }
        self.anchors
            .get(name)
            .copied()
            .ok_or_else(|| LayoutError::unknown_anchor(self.to_string(), name, self.anchor_names()))
    }

    /// On-screen position of a named anchor
    pub fn anchor_position(&self, name: &str) -> Result<Point, LayoutError> {
        Ok(self.to_screen(self.local_anchor(name)?))
    }

    // ---- orientation ----------------------------------------------------

    /// Length of the vector from the center to an orientation point.
    ///
    /// Cardinal sides measure to the local bounding box, `cen` is 1, and a
    /// named anchor measures to the anchor unless a direction hint is given,
    /// in which case it is also 1.
    ///
    /// For an obtuse apex the circumcenter sits below the base, so `bottom`
    /// is the distance back up to the base line.
    pub fn calculate_orientation_length(
        &self,
        orientation: &Orientation,
        hint: Option<Direction>,
    ) -> Result<f64, LayoutError> {
        match orientation {
            Orientation::Cen => Ok(1.0),
            Orientation::Side(dir) => {
                let bounds = self.local_bounds();
                let c = self.compute_center_from_dim(false);
                let length = match dir {
                    Direction::Left => c.x - bounds.x_min,
                    Direction::Right => bounds.x_max - c.x,
                    Direction::Top => c.y - bounds.y_min,
                    Direction::Bottom => bounds.y_max - c.y,
                };
                Ok(length.abs())
            }
            Orientation::Anchor(name) => {
                let anchor = self.local_anchor(name)?;
                if hint.is_some() {
                    Ok(1.0)
                } else {
                    Ok(anchor.distance(self.compute_center_from_dim(false)))
                }
            }
        }
    }

    /// Origin point and unit vector for an orientation, on screen.
    ///
    /// `cen` yields a zero vector. A named anchor with a hint starts at the
    /// anchor and points along the (rotated) hint; without one it starts at
    /// the center and points toward the anchor.
    pub fn calculate_orientation_vector(
        &self,
        orientation: &Orientation,
        hint: Option<Direction>,
    ) -> Result<(Point, Point), LayoutError> {
        let rotation = self.rotation();
        match orientation {
            Orientation::Cen => Ok((self.center(), Point::zero())),
            Orientation::Side(dir) => Ok((self.center(), rotation.transform_vector(dir.unit()))),
            Orientation::Anchor(name) => {
                let anchor = self.anchor_position(name)?;
                match hint {
                    Some(dir) => Ok((anchor, rotation.transform_vector(dir.unit()))),
                    None => {
                        let center = self.center();
                        let unit = (anchor - center).normalized().unwrap_or_default();
                        Ok((center, unit))
                    }
                }
            }
        }
    }

    // ---- labels & decoration -------------------------------------------

    pub fn add_label(
        &mut self,
        text: impl Into<String>,
        anchor: impl Into<String>,
        orientation: Orientation,
    ) {
        self.labels.push(ShapeLabel {
            text: text.into(),
            anchor: anchor.into(),
            orientation,
        });
    }

    pub fn labels(&self) -> &[ShapeLabel] {
        &self.labels
    }

    /// On-screen position of each label's anchor, in label order
    pub fn label_positions(&self) -> Result<Vec<(&ShapeLabel, Point)>, LayoutError> {
        self.labels
            .iter()
            .map(|label| Ok((label, self.anchor_position(&label.anchor)?)))
            .collect()
    }

    pub fn decoration(&self) -> &Decoration {
        &self.decoration
    }

    /// Merge a partial decoration update
    pub fn update_decoration(&mut self, update: &Decoration) {
        self.decoration = self.decoration.merge(update);
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> = self.dim().iter().map(|v| v.to_string()).collect();
        write!(f, "{} [{}]", self.kind.variant().as_str(), dims.join(", "))
    }
}
