//! Composite: an ordered set of shapes plus the rules that lay them out
//!
//! Shapes live in a `Vec` owned by the composite and are addressed by
//! index. Alignment rules run in declared order, then every connection
//! rule is routed against the final geometry.

use super::align::{align_two_shapes, Gap};
use super::config::{AnchorArgs, LayoutConfig};
use super::error::LayoutError;
use super::routing::{route_connector, RoutingMode};
use super::shape::Shape;
use super::types::{BoundingBox, Direction, Orientation, Point};

/// Position `target` relative to `reference`
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentRule {
    pub reference: usize,
    pub target: usize,
    /// Reference orientation, target orientation
    pub orientations: [Orientation; 2],
    pub gap: Gap,
    /// Direction hints for named-anchor orientations
    pub hints: [Option<Direction>; 2],
}

impl AlignmentRule {
    pub fn new(
        reference: usize,
        target: usize,
        ref_orientation: impl Into<Orientation>,
        target_orientation: impl Into<Orientation>,
    ) -> Self {
        Self {
            reference,
            target,
            orientations: [ref_orientation.into(), target_orientation.into()],
            gap: Gap::default(),
            hints: [None, None],
        }
    }

    pub fn with_gap(mut self, gap: Gap) -> Self {
        self.gap = gap;
        self
    }

    pub fn with_hints(mut self, ref_hint: Option<Direction>, target_hint: Option<Direction>) -> Self {
        self.hints = [ref_hint, target_hint];
        self
    }
}

/// Draw a connector between an anchor on each of two shapes
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionRule {
    pub shapes: [usize; 2],
    pub anchors: [String; 2],
    pub mode: RoutingMode,
}

impl ConnectionRule {
    pub fn new(
        from: usize,
        from_anchor: impl Into<String>,
        to: usize,
        to_anchor: impl Into<String>,
    ) -> Self {
        Self {
            shapes: [from, to],
            anchors: [from_anchor.into(), to_anchor.into()],
            mode: RoutingMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: RoutingMode) -> Self {
        self.mode = mode;
        self
    }
}

/// A routed polyline produced by one connection rule
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub shapes: [usize; 2],
    pub anchors: [String; 2],
    pub mode: RoutingMode,
    pub path: Vec<Point>,
}

/// Shapes, layout rules and the connectors computed from them
#[derive(Debug, Clone)]
pub struct Composite {
    shapes: Vec<Shape>,
    anchor_args: Vec<AnchorArgs>,
    alignment_pattern: Vec<AlignmentRule>,
    connection_pattern: Vec<ConnectionRule>,
    ref_shape_index: usize,
    config: LayoutConfig,
    lines: Vec<Connector>,
    generation: u64,
    built_generation: Option<u64>,
}

impl Composite {
    /// Validate the rules, generate anchors and build the layout.
    ///
    /// An empty `anchor_args` gives every shape `config.default_anchors`;
    /// otherwise it must have one entry per shape.
    pub fn new(
        shapes: Vec<Shape>,
        anchor_args: Vec<AnchorArgs>,
        alignment_pattern: Vec<AlignmentRule>,
        connection_pattern: Vec<ConnectionRule>,
        ref_shape_index: usize,
        config: LayoutConfig,
    ) -> Result<Self, LayoutError> {
        config.validate()?;
        let anchor_args = if anchor_args.is_empty() {
            vec![config.default_anchors; shapes.len()]
        } else if anchor_args.len() != shapes.len() {
            return Err(LayoutError::arity(
                "composite",
                "anchor_args",
                shapes.len(),
                anchor_args.len(),
            ));
        } else {
            anchor_args
        };

        validate_rules(
            shapes.len(),
            &alignment_pattern,
            &connection_pattern,
            ref_shape_index,
        )?;

        let mut composite = Self {
            shapes,
            anchor_args,
            alignment_pattern,
            connection_pattern,
            ref_shape_index,
            config,
            lines: vec![],
            generation: 0,
            built_generation: None,
        };
        composite.regenerate_anchors()?;
        composite.build_composite()?;
        Ok(composite)
    }

    /// Run every alignment rule, then route every connection rule
    pub fn build_composite(&mut self) -> Result<(), LayoutError> {
        self.built_generation = None;
        self.align_shapes()?;
        self.make_line_connection()?;
        self.built_generation = Some(self.generation);
        tracing::debug!(
            generation = self.generation,
            shapes = self.shapes.len(),
            connectors = self.lines.len(),
            "composite built"
        );
        Ok(())
    }

    /// Apply the alignment rules in declared order
    pub fn align_shapes(&mut self) -> Result<(), LayoutError> {
        let len = self.shapes.len();
        for (i, rule) in self.alignment_pattern.iter().enumerate() {
            let (reference, target) = pair_mut(&mut self.shapes, rule.reference, rule.target)
                .ok_or_else(|| LayoutError::index_out_of_range(format!("align[{}]", i), rule.target, len))?;
            tracing::debug!(
                rule = i,
                reference = rule.reference,
                target = rule.target,
                "applying alignment rule"
            );
            align_two_shapes(
                reference,
                target,
                [&rule.orientations[0], &rule.orientations[1]],
                rule.gap,
                rule.hints,
            )?;
        }
        Ok(())
    }

    /// Route every connection rule against the current geometry
    pub fn make_line_connection(&mut self) -> Result<(), LayoutError> {
        let mut lines = Vec::with_capacity(self.connection_pattern.len());
        for (i, rule) in self.connection_pattern.iter().enumerate() {
            let [a, b] = rule.shapes;
            let shape = |index: usize| {
                self.shapes.get(index).ok_or_else(|| {
                    LayoutError::index_out_of_range(format!("connect[{}]", i), index, self.shapes.len())
                })
            };
            let path = route_connector(
                [shape(a)?, shape(b)?],
                [&rule.anchors[0], &rule.anchors[1]],
                self.config.stub_length,
                rule.mode,
                &self.config,
            )?;
            lines.push(Connector {
                shapes: rule.shapes,
                anchors: rule.anchors.clone(),
                mode: rule.mode,
                path,
            });
        }
        self.lines = lines;
        Ok(())
    }

    /// Move the reference shape and rebuild
    pub fn translate(&mut self, offset: Point) -> Result<(), LayoutError> {
        self.touch();
        self.shapes[self.ref_shape_index].translate(offset);
        self.build_composite()
    }

    /// Rotate the reference shape (clockwise degrees) and rebuild
    pub fn rotate(&mut self, degrees: f64) -> Result<(), LayoutError> {
        self.touch();
        self.shapes[self.ref_shape_index].rotate(degrees);
        self.build_composite()
    }

    /// Reset every shape, scale the reference shape, regenerate anchors
    /// and rebuild
    pub fn scale(&mut self, factor: f64) -> Result<(), LayoutError> {
        self.touch();
        for shape in &mut self.shapes {
            shape.reset();
        }
        self.shapes[self.ref_shape_index].scale(factor);
        self.regenerate_anchors()?;
        self.build_composite()
    }

    fn regenerate_anchors(&mut self) -> Result<(), LayoutError> {
        for (shape, args) in self.shapes.iter_mut().zip(&self.anchor_args) {
            shape.make_anchors(args.count, args.include_corner)?;
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.generation += 1;
    }

    /// Connectors from the last build.
    ///
    /// Fails with [`LayoutError::StaleLayout`] when the composite was
    /// mutated since then.
    pub fn lines(&self) -> Result<&[Connector], LayoutError> {
        match self.built_generation {
            Some(built) if built == self.generation => Ok(&self.lines),
            built => Err(LayoutError::StaleLayout {
                built: built.unwrap_or(0),
                current: self.generation,
            }),
        }
    }

    /// Connectors, rebuilding first if the layout is stale
    pub fn lines_or_rebuild(&mut self) -> Result<&[Connector], LayoutError> {
        if self.built_generation != Some(self.generation) {
            self.build_composite()?;
        }
        Ok(&self.lines)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape(&self, index: usize) -> Option<&Shape> {
        self.shapes.get(index)
    }

    /// Mutable access to one shape; the stored layout becomes stale
    pub fn shape_mut(&mut self, index: usize) -> Option<&mut Shape> {
        if index >= self.shapes.len() {
            return None;
        }
        self.touch();
        self.shapes.get_mut(index)
    }

    pub fn ref_shape_index(&self) -> usize {
        self.ref_shape_index
    }

    pub fn reference_shape(&self) -> &Shape {
        &self.shapes[self.ref_shape_index]
    }

    pub fn anchor_args(&self) -> &[AnchorArgs] {
        &self.anchor_args
    }

    pub fn alignment_pattern(&self) -> &[AlignmentRule] {
        &self.alignment_pattern
    }

    pub fn connection_pattern(&self) -> &[ConnectionRule] {
        &self.connection_pattern
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Index of the topmost (last declared) shape containing the point
    pub fn shape_at(&self, x: f64, y: f64) -> Option<usize> {
        self.shapes.iter().rposition(|shape| shape.check_pos(x, y))
    }

    /// Union of every shape's on-screen bounding box
    pub fn boundary(&self) -> Option<BoundingBox> {
        self.shapes
            .iter()
            .map(Shape::calculate_shape_boundary)
            .reduce(|acc, b| acc.union(&b))
    }
}

/// Borrow `reference` immutably and `target` mutably from the same slice
fn pair_mut(shapes: &mut [Shape], reference: usize, target: usize) -> Option<(&Shape, &mut Shape)> {
    if reference == target || reference >= shapes.len() || target >= shapes.len() {
        return None;
    }
    if reference < target {
        let (head, tail) = shapes.split_at_mut(target);
        Some((&head[reference], &mut tail[0]))
    } else {
        let (head, tail) = shapes.split_at_mut(reference);
        Some((&tail[0], &mut head[target]))
    }
}

fn validate_rules(
    len: usize,
    alignment_pattern: &[AlignmentRule],
    connection_pattern: &[ConnectionRule],
    ref_shape_index: usize,
) -> Result<(), LayoutError> {
    if ref_shape_index >= len {
        return Err(LayoutError::index_out_of_range("reference", ref_shape_index, len));
    }

    for (i, rule) in alignment_pattern.iter().enumerate() {
        let name = format!("align[{}]", i);
        for index in [rule.reference, rule.target] {
            if index >= len {
                return Err(LayoutError::index_out_of_range(name, index, len));
            }
        }
        if rule.target == ref_shape_index {
            return Err(LayoutError::circular(vec![
                format!("{} moves reference shape {}", name, rule.target),
                format!("shape {} anchors the whole composite", rule.target),
            ]));
        }
        // a rule may only read shapes no later rule will move
        if let Some(j) = alignment_pattern[i..]
            .iter()
            .position(|later| later.target == rule.reference)
        {
            return Err(LayoutError::circular(vec![
                format!("{} reads shape {}", name, rule.reference),
                format!("align[{}] moves shape {}", i + j, rule.reference),
            ]));
        }
    }

    for (i, rule) in connection_pattern.iter().enumerate() {
        for index in rule.shapes {
            if index >= len {
                return Err(LayoutError::index_out_of_range(format!("connect[{}]", i), index, len));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::transform::TransformationUpdate;
    use pretty_assertions::assert_eq;

    fn bar() -> Shape {
        Shape::rectangle(0.0, 0.0, 180.0, 20.0)
    }

    fn stack_rule(reference: usize, target: usize) -> AlignmentRule {
        AlignmentRule::new(reference, target, Direction::Bottom, Direction::Top)
            .with_gap(Gap::Fractional(1.0))
    }

    fn stacked() -> Composite {
        Composite::new(
            vec![bar(), bar(), bar()],
            vec![],
            vec![stack_rule(0, 1), stack_rule(1, 2)],
            vec![ConnectionRule::new(0, "anchor_bottom_0", 1, "anchor_top_0")],
            0,
            LayoutConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_pair_mut() {
        let mut shapes = vec![bar(), Shape::circle(0.0, 0.0, 4.0)];
        let (reference, target) = pair_mut(&mut shapes, 1, 0).unwrap();
        assert_eq!(reference.dim(), vec![0.0, 0.0, 4.0]);
        target.translate(Point::new(1.0, 0.0));
        assert_eq!(shapes[0].transformation().translate, Point::new(1.0, 0.0));
        assert!(pair_mut(&mut shapes, 1, 1).is_none());
        assert!(pair_mut(&mut shapes, 0, 2).is_none());
    }

    #[test]
    fn test_build_positions_and_connects() {
        let composite = stacked();
        let centers: Vec<Point> = composite.shapes().iter().map(Shape::center).collect();
        assert_eq!(
            centers,
            vec![
                Point::new(90.0, 10.0),
                Point::new(90.0, 50.0),
                Point::new(90.0, 90.0)
            ]
        );
        let lines = composite.lines().unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0].path,
            vec![
                Point::new(90.0, 20.0),
                Point::new(90.0, 30.0),
                Point::new(90.0, 40.0)
            ]
        );
    }

    #[test]
    fn test_translate_moves_everything_through_rules() {
        let mut composite = stacked();
        composite.translate(Point::new(5.0, 7.0)).unwrap();
        assert_eq!(composite.generation(), 1);
        assert_eq!(composite.shapes()[2].center(), Point::new(95.0, 97.0));
        assert_eq!(composite.lines().unwrap()[0].path[0], Point::new(95.0, 27.0));
    }

    #[test]
    fn test_rotate_reference() {
        let mut composite = stacked();
        composite.rotate(180.0).unwrap();
        // the stack now grows upward from the reference
        let second = composite.shapes()[1].center();
        assert!((second.x - 90.0).abs() < 1e-6);
        assert!((second.y + 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_scale_rebuilds_with_fresh_anchors() {
        let mut composite = stacked();
        composite.translate(Point::new(100.0, 0.0)).unwrap();
        composite.scale(2.0).unwrap();
        let reference = composite.reference_shape();
        assert_eq!(reference.transformation().translate, Point::zero());
        assert!(!reference.anchors_stale());
        // reference is now 360x40: (20 + 10) doubled by the gap
        assert_eq!(composite.shapes()[1].center(), Point::new(180.0, 80.0));
        assert_eq!(composite.lines().unwrap()[0].path[0], Point::new(180.0, 40.0));
    }

    #[test]
    fn test_stale_layout_after_shape_mut() {
        let mut composite = stacked();
        composite
            .shape_mut(0)
            .unwrap()
            .translate(Point::new(0.0, 10.0));
        assert_eq!(
            composite.lines().unwrap_err(),
            LayoutError::StaleLayout {
                built: 0,
                current: 1
            }
        );
        let lines = composite.lines_or_rebuild().unwrap();
        assert_eq!(lines[0].path[0], Point::new(90.0, 30.0));
        assert!(composite.lines().is_ok());
    }

    #[test]
    fn test_shape_at_prefers_topmost() {
        let composite = Composite::new(
            vec![bar(), Shape::rectangle(10.0, 5.0, 10.0, 10.0)],
            vec![],
            vec![],
            vec![],
            0,
            LayoutConfig::default(),
        )
        .unwrap();
        assert_eq!(composite.shape_at(15.0, 10.0), Some(1));
        assert_eq!(composite.shape_at(100.0, 10.0), Some(0));
        assert_eq!(composite.shape_at(500.0, 10.0), None);
    }

    #[test]
    fn test_rejects_rule_reading_later_target() {
        let err = Composite::new(
            vec![bar(), bar(), bar()],
            vec![],
            vec![stack_rule(1, 2), stack_rule(0, 1)],
            vec![],
            0,
            LayoutConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LayoutError::CircularConstraint { .. }));
    }

    #[test]
    fn test_rejects_rule_moving_reference_shape() {
        let err = Composite::new(
            vec![bar(), bar()],
            vec![],
            vec![stack_rule(1, 0)],
            vec![],
            0,
            LayoutConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LayoutError::CircularConstraint { .. }));
    }

    #[test]
    fn test_rejects_self_alignment() {
        let err = Composite::new(
            vec![bar(), bar()],
            vec![],
            vec![stack_rule(1, 1)],
            vec![],
            0,
            LayoutConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LayoutError::CircularConstraint { .. }));
    }

    #[test]
    fn test_rejects_invalid_routing_config() {
        let err = Composite::new(
            vec![bar(), bar()],
            vec![],
            vec![stack_rule(0, 1)],
            vec![],
            0,
            LayoutConfig::default().with_overshoot_margin(-1.0),
        )
        .unwrap_err();
        assert_eq!(
            err,
            LayoutError::invalid_config("overshoot_margin", -1.0, "must not be negative")
        );
    }

    #[test]
    fn test_rejects_bad_indices_and_arity() {
        let out_of_range = Composite::new(
            vec![bar()],
            vec![],
            vec![],
            vec![ConnectionRule::new(0, "anchor_top_0", 3, "anchor_top_0")],
            0,
            LayoutConfig::default(),
        )
        .unwrap_err();
        assert_eq!(out_of_range, LayoutError::index_out_of_range("connect[0]", 3, 1));

        let arity = Composite::new(
            vec![bar(), bar()],
            vec![AnchorArgs::default()],
            vec![],
            vec![],
            0,
            LayoutConfig::default(),
        )
        .unwrap_err();
        assert_eq!(arity, LayoutError::arity("composite", "anchor_args", 2, 1));

        let reference = Composite::new(vec![bar()], vec![], vec![], vec![], 4, LayoutConfig::default())
            .unwrap_err();
        assert!(matches!(reference, LayoutError::IndexOutOfRange { index: 4, .. }));
    }

    #[test]
    fn test_free_shape_may_be_read() {
        // shape 2 is never targeted, so reading it from the first rule is fine
        let lowered = bar().with_transformation(
            TransformationUpdate::new().with_translate(Point::new(0.0, 200.0)),
        );
        let composite = Composite::new(
            vec![bar(), bar(), lowered],
            vec![],
            vec![stack_rule(2, 1)],
            vec![],
            0,
            LayoutConfig::default(),
        )
        .unwrap();
        assert_eq!(composite.shapes()[1].center(), Point::new(90.0, 250.0));
    }
}
