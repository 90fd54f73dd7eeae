//! Property tests for shape transformations and connector routing.

use proptest::prelude::*;

use synoptic_geometry::{
    route_connector, LayoutConfig, Point, RoutingMode, Shape, TransformationUpdate,
};

const SIDES: [&str; 4] = ["top", "left", "bottom", "right"];
const ANGLES: [f64; 6] = [0.0, 37.5, 90.0, 180.0, 270.0, 359.9];

fn any_shape() -> impl Strategy<Value = Shape> {
    prop_oneof![
        (-200.0..200.0f64, -200.0..200.0f64, 1.0..80.0f64, 1.0..80.0f64)
            .prop_map(|(x, y, w, h)| Shape::rectangle(x, y, w, h)),
        (-200.0..200.0f64, -200.0..200.0f64, 1.0..80.0f64)
            .prop_map(|(x, y, d)| Shape::circle(x, y, d)),
        (-200.0..200.0f64, -200.0..200.0f64, 1.0..80.0f64, 5.0..85.0f64)
            .prop_map(|(x, y, e, apex)| Shape::triangle(x, y, e, apex)),
    ]
}

/// A rectangle with anchors, placed anywhere and at any rotation
fn placed_rectangle() -> impl Strategy<Value = Shape> {
    (
        -100.0..100.0f64,
        -100.0..100.0f64,
        10.0..60.0f64,
        10.0..60.0f64,
        0.0..360.0f64,
        1usize..4,
    )
        .prop_map(|(x, y, w, h, rotate, count)| {
            let mut shape = Shape::rectangle(x, y, w, h)
                .with_transformation(TransformationUpdate::new().with_rotate(rotate));
            shape.make_anchors(count, false).unwrap();
            shape
        })
}

fn anchor_name(side: usize, index: usize, count: usize) -> String {
    format!("anchor_{}_{}", SIDES[side % 4], index % count)
}

proptest! {
    #[test]
    fn reset_is_idempotent(
        shape in any_shape(),
        rotate in -720.0..720.0f64,
        dx in -50.0..50.0f64,
        dy in -50.0..50.0f64,
        scale in 0.5..3.0f64,
    ) {
        let mut shape = shape.with_transformation(
            TransformationUpdate::new()
                .with_rotate(rotate)
                .with_translate(Point::new(dx, dy))
                .with_scale(scale),
        );
        shape.reset();
        let once = shape.clone();
        shape.reset();
        prop_assert_eq!(&shape, &once);
        prop_assert_eq!(shape.transformation().rotate, 0.0);
        prop_assert_eq!(shape.transformation().translate, Point::zero());
        prop_assert_eq!(shape.transformation().scale, scale);
        prop_assert_eq!(shape.compute_center_from_dim(true), shape.compute_center_from_dim(false));
    }

    #[test]
    fn boundary_is_well_formed(shape in any_shape(), dx in -50.0..50.0f64) {
        for angle in ANGLES {
            let mut rotated = shape.clone();
            rotated.update_transformation(
                TransformationUpdate::new()
                    .with_rotate(angle)
                    .with_translate(Point::new(dx, -dx)),
            );
            let bounds = rotated.calculate_shape_boundary();
            prop_assert!(bounds.x_min <= bounds.x_max);
            prop_assert!(bounds.y_min <= bounds.y_max);
            prop_assert!(bounds.contains(rotated.center()));
        }
    }

    #[test]
    fn connector_endpoints_are_the_anchors(
        a in placed_rectangle(),
        b in placed_rectangle(),
        side_a in 0usize..4,
        side_b in 0usize..4,
        index in 0usize..3,
        stub in 1.0..20.0f64,
        direct in any::<bool>(),
    ) {
        let name_a = anchor_name(side_a, index, a.anchors().len() / 4);
        let name_b = anchor_name(side_b, index, b.anchors().len() / 4);
        let mode = RoutingMode::from_direct(direct);
        let path = route_connector([&a, &b], [&name_a, &name_b], stub, mode, &LayoutConfig::default())
            .unwrap();

        let first = a.anchor_position(&name_a).unwrap().rounded();
        let last = b.anchor_position(&name_b).unwrap().rounded();
        prop_assert_eq!(path.first(), Some(&first));
        prop_assert_eq!(path.last(), Some(&last));
    }

    #[test]
    fn routed_connectors_are_orthogonal(
        a in placed_rectangle(),
        b in placed_rectangle(),
        side_a in 0usize..4,
        side_b in 0usize..4,
        index in 0usize..3,
        stub in 1.0..20.0f64,
        margin in 0.0..30.0f64,
    ) {
        let name_a = anchor_name(side_a, index, a.anchors().len() / 4);
        let name_b = anchor_name(side_b, index, b.anchors().len() / 4);
        let config = LayoutConfig::default().with_overshoot_margin(margin);
        let path = route_connector([&a, &b], [&name_a, &name_b], stub, RoutingMode::Orthogonal, &config)
            .unwrap();

        prop_assert!(path.len() <= 8);
        for pair in path.windows(2) {
            let shares_axis = pair[0].x == pair[1].x || pair[0].y == pair[1].y;
            prop_assert!(shares_axis, "diagonal segment {} -> {}", pair[0], pair[1]);
            prop_assert_ne!(pair[0], pair[1]);
        }
    }
}
