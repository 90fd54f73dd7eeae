//! Geometry and layout engine
//!
//! Shapes carry their own transformation and anchor set. The alignment
//! engine positions one shape against another, the router draws
//! orthogonal connectors between anchors, and a [`Composite`] owns a set
//! of shapes plus the rules tying them together.

pub mod align;
pub mod composite;
pub mod config;
pub mod error;
pub mod routing;
pub mod shape;
pub mod transform;
pub mod types;

pub use align::{align_two_shapes, Gap};
pub use composite::{AlignmentRule, Composite, ConnectionRule, Connector};
pub use config::{AnchorArgs, LayoutConfig};
pub use error::LayoutError;
pub use routing::{exit_direction, route_connector, RoutingMode};
pub use shape::{Decoration, Shape, ShapeKind, ShapeLabel, ShapeVariant};
pub use transform::{RotationTransform, Transformation, TransformationUpdate};
pub use types::*;
