//! Connector routing between two shape anchors

use super::config::{non_negative, positive, LayoutConfig};
use super::error::LayoutError;
use super::shape::Shape;
use super::types::{BoundingBox, Direction, Point};

/// Routing mode for connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutingMode {
    /// Anchor, stub, stub, anchor; the middle segment may be diagonal
    Direct,
    /// Axis-aligned segments stepping around the shapes' bounding boxes
    #[default]
    Orthogonal,
}

impl RoutingMode {
    pub fn from_direct(direct: bool) -> Self {
        if direct {
            RoutingMode::Direct
        } else {
            RoutingMode::Orthogonal
        }
    }
}

/// One end of a connector: the anchor, its exit direction and the stub tip
#[derive(Debug, Clone, Copy, PartialEq)]
struct Terminal {
    anchor: Point,
    exit: Direction,
    stub: Point,
}

/// Find the axis direction in which a connector leaves `shape` at `anchor`.
///
/// Probes left, right, top and bottom at `config.probe_step`; among the
/// probes outside the shape, the one closest to the shape's center wins.
pub fn exit_direction(
    shape: &Shape,
    anchor: &str,
    config: &LayoutConfig,
) -> Result<Direction, LayoutError> {
    positive("probe_step", config.probe_step)?;
    let position = shape.anchor_position(anchor)?;
    let center = shape.center();

    let mut best: Option<(Direction, f64)> = None;
    for dir in Direction::ALL {
        let probe = position + dir.unit() * config.probe_step;
        let inside = shape.check_pos(probe.x, probe.y);
        tracing::trace!(anchor, direction = %dir, probe = %probe, inside, "exit probe");
        if inside {
            continue;
        }
        let distance = probe.distance(center);
        match best {
            Some((_, d)) if d <= distance => {}
            _ => best = Some((dir, distance)),
        }
    }

    best.map(|(dir, _)| dir)
        .ok_or_else(|| LayoutError::no_exit(anchor, position))
}

fn terminal(
    shape: &Shape,
    anchor: &str,
    stub_length: f64,
    config: &LayoutConfig,
) -> Result<Terminal, LayoutError> {
    let position = shape.anchor_position(anchor)?;
    let exit = exit_direction(shape, anchor, config)?;
    Ok(Terminal {
        anchor: position,
        exit,
        stub: position + exit.unit() * stub_length,
    })
}

/// Compute the polyline joining anchor `anchors[0]` of `shapes[0]` to
/// anchor `anchors[1]` of `shapes[1]`.
///
/// The first point is the first anchor and the last point the second one.
/// Points are rounded to integers and consecutive duplicates dropped.
pub fn route_connector(
    shapes: [&Shape; 2],
    anchors: [&str; 2],
    stub_length: f64,
    mode: RoutingMode,
    config: &LayoutConfig,
) -> Result<Vec<Point>, LayoutError> {
    config.validate()?;
    non_negative("stub_length", stub_length)?;
    if stub_length == 0.0 {
        tracing::warn!("connector stub length is zero");
    }

    let a = terminal(shapes[0], anchors[0], stub_length, config)?;
    let b = terminal(shapes[1], anchors[1], stub_length, config)?;

    let raw = match mode {
        RoutingMode::Direct => vec![a.anchor, a.stub, b.stub, b.anchor],
        RoutingMode::Orthogonal => {
            let bbox = shapes[0]
                .calculate_shape_boundary()
                .union(&shapes[1].calculate_shape_boundary());
            route_orthogonal(&a, &b, &bbox, config.overshoot_margin)
        }
    };

    let path = finalize(raw);
    tracing::debug!(
        from = anchors[0],
        to = anchors[1],
        exits = %format!("{}/{}", a.exit, b.exit),
        ?mode,
        points = path.len(),
        "routed connector"
    );
    Ok(path)
}

/// Round to integers and drop consecutive duplicates
fn finalize(points: Vec<Point>) -> Vec<Point> {
    let mut path: Vec<Point> = Vec::with_capacity(points.len());
    for point in points.into_iter().map(|p| p.rounded()) {
        if path.last() != Some(&point) {
            path.push(point);
        }
    }
    path
}

/// Push a stub along its own axis until it clears `bbox` by `margin`;
/// a stub already past that line stays where it is
fn extend_beyond(terminal: &Terminal, bbox: &BoundingBox, margin: f64) -> Point {
    let stub = terminal.stub;
    match terminal.exit {
        Direction::Left => Point::new(stub.x.min(bbox.x_min - margin), stub.y),
        Direction::Right => Point::new(stub.x.max(bbox.x_max + margin), stub.y),
        Direction::Top => Point::new(stub.x, stub.y.min(bbox.y_min - margin)),
        Direction::Bottom => Point::new(stub.x, stub.y.max(bbox.y_max + margin)),
    }
}

fn route_orthogonal(a: &Terminal, b: &Terminal, bbox: &BoundingBox, margin: f64) -> Vec<Point> {
    if a.exit == b.exit {
        route_same_side(a, b, bbox, margin)
    } else if a.exit.is_vertical() != b.exit.is_vertical() {
        if a.exit.is_vertical() {
            route_perpendicular(a, b, bbox, margin)
        } else {
            let mut path = route_perpendicular(b, a, bbox, margin);
            path.reverse();
            path
        }
    } else {
        route_opposite(a, b, bbox, margin)
    }
}

/// Both stubs leave on the same side: run a lane beyond that side
fn route_same_side(a: &Terminal, b: &Terminal, bbox: &BoundingBox, margin: f64) -> Vec<Point> {
    let (sa, sb) = (a.stub, b.stub);
    let (lane_a, lane_b) = match a.exit {
        Direction::Top => {
            let y = (bbox.y_min - margin).min(sa.y).min(sb.y);
            (Point::new(sa.x, y), Point::new(sb.x, y))
        }
        Direction::Bottom => {
            let y = (bbox.y_max + margin).max(sa.y).max(sb.y);
            (Point::new(sa.x, y), Point::new(sb.x, y))
        }
        Direction::Left => {
            let x = (bbox.x_min - margin).min(sa.x).min(sb.x);
            (Point::new(x, sa.y), Point::new(x, sb.y))
        }
        Direction::Right => {
            let x = (bbox.x_max + margin).max(sa.x).max(sb.x);
            (Point::new(x, sa.y), Point::new(x, sb.y))
        }
    };
    vec![a.anchor, sa, lane_a, lane_b, sb, b.anchor]
}

/// `vertical` exits top or bottom, `horizontal` exits left or right
fn route_perpendicular(
    vertical: &Terminal,
    horizontal: &Terminal,
    bbox: &BoundingBox,
    margin: f64,
) -> Vec<Point> {
    let (sa, sb) = (vertical.stub, horizontal.stub);
    let corner = Point::new(sa.x, sb.y);

    let vertical_ok = match vertical.exit {
        Direction::Top => corner.y <= sa.y,
        _ => corner.y >= sa.y,
    };
    let horizontal_ok = match horizontal.exit {
        Direction::Left => corner.x <= sb.x,
        _ => corner.x >= sb.x,
    };

    if vertical_ok && horizontal_ok {
        return vec![vertical.anchor, sa, corner, sb, horizontal.anchor];
    }

    let ea = extend_beyond(vertical, bbox, margin);
    let eb = extend_beyond(horizontal, bbox, margin);
    let bridge = Point::new(eb.x, ea.y);
    vec![vertical.anchor, sa, ea, bridge, eb, sb, horizontal.anchor]
}

/// Stubs leave on opposite sides (left/right or top/bottom)
fn route_opposite(a: &Terminal, b: &Terminal, bbox: &BoundingBox, margin: f64) -> Vec<Point> {
    let (sa, sb) = (a.stub, b.stub);
    let facing = match a.exit {
        Direction::Right => sa.x <= sb.x,
        Direction::Left => sa.x >= sb.x,
        Direction::Bottom => sa.y <= sb.y,
        Direction::Top => sa.y >= sb.y,
    };

    if facing {
        return if a.exit.is_vertical() {
            let mid = (sa.y + sb.y) / 2.0;
            vec![
                a.anchor,
                sa,
                Point::new(sa.x, mid),
                Point::new(sb.x, mid),
                sb,
                b.anchor,
            ]
        } else {
            let mid = (sa.x + sb.x) / 2.0;
            vec![
                a.anchor,
                sa,
                Point::new(mid, sa.y),
                Point::new(mid, sb.y),
                sb,
                b.anchor,
            ]
        };
    }

    let ea = extend_beyond(a, bbox, margin);
    let eb = extend_beyond(b, bbox, margin);

    let (out_a, out_b) = if a.exit.is_vertical() {
        let left = (bbox.x_min - margin).min(ea.x).min(eb.x);
        let right = (bbox.x_max + margin).max(ea.x).max(eb.x);
        let x = if (ea.x - left).abs() + (eb.x - left).abs()
            < (right - ea.x).abs() + (right - eb.x).abs()
        {
            left
        } else {
            right
        };
        (Point::new(x, ea.y), Point::new(x, eb.y))
    } else {
        let top = (bbox.y_min - margin).min(ea.y).min(eb.y);
        let bottom = (bbox.y_max + margin).max(ea.y).max(eb.y);
        let y = if (ea.y - top).abs() + (eb.y - top).abs()
            < (bottom - ea.y).abs() + (bottom - eb.y).abs()
        {
            top
        } else {
            bottom
        };
        (Point::new(ea.x, y), Point::new(eb.x, y))
    };

    vec![a.anchor, sa, ea, out_a, out_b, eb, sb, b.anchor]
}
