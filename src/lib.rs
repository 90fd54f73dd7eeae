//! Synoptic Geometry - shape primitives, relative alignment and connector
//! routing for synoptic diagrams
//!
//! A diagram is a [`Composite`]: rectangles, circles and isosceles
//! triangles positioned relative to one another by alignment rules, with
//! orthogonal connectors routed between their anchors. The engine only
//! produces geometry (points, polylines, bounding boxes); painting it is
//! left to the caller.
//!
//! # Example
//!
//! ```rust
//! use synoptic_geometry::load_composite;
//!
//! let composite = load_composite(r#"
//!     [[shapes]]
//!     kind = "rectangle"
//!     dim = [0, 0, 10, 10]
//!
//!     [[shapes]]
//!     kind = "rectangle"
//!     dim = [0, 0, 10, 10]
//!
//!     [[align]]
//!     shapes = [0, 1]
//!     orientations = ["right", "left"]
//!     gap = 30
//!     gap_mode = "absolute"
//!
//!     [[connect]]
//!     shapes = [0, 1]
//!     anchors = ["anchor_right_0", "anchor_left_0"]
//! "#).unwrap();
//!
//! let path = &composite.lines().unwrap()[0].path;
//! assert_eq!(path.first().map(|p| (p.x, p.y)), Some((10.0, 5.0)));
//! assert_eq!(path.last().map(|p| (p.x, p.y)), Some((40.0, 5.0)));
//! ```

pub mod definition;
pub mod error;
pub mod layout;

pub use definition::DiagramDefinition;
pub use error::{DefinitionError, Span};
pub use layout::{
    align_two_shapes, route_connector, AlignmentRule, AnchorArgs, BoundingBox, Composite,
    ConnectionRule, Connector, Direction, Gap, LayoutConfig, LayoutError, Orientation, Point,
    RoutingMode, Shape, ShapeKind, ShapeVariant, TransformationUpdate,
};

/// Parse a TOML diagram definition and build its composite
pub fn load_composite(source: &str) -> Result<Composite, DefinitionError> {
    source.parse::<DiagramDefinition>()?.build()
}
