//! Relative alignment of one shape against another
//!
//! The target is reset, then translated so that its origin point sits at
//! `reference point + unit * magnitude`, and rotated about that origin so
//! that its chosen side faces the reference.

use super::error::LayoutError;
use super::shape::Shape;
use super::transform::TransformationUpdate;
use super::types::{signed_angle, Direction, Orientation, Point};

/// How a gap widens the separation between two aligned shapes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gap {
    /// Multiplies the combined orientation lengths by `1 + gap`
    Fractional(f64),
    /// Adds a flat distance to the combined orientation lengths
    Absolute(f64),
}

impl Gap {
    /// Apply the gap to the combined orientation lengths
    pub fn apply(self, magnitude: f64) -> f64 {
        match self {
            Gap::Fractional(gap) => magnitude * (1.0 + gap),
            Gap::Absolute(gap) => magnitude + gap,
        }
    }
}

impl Default for Gap {
    fn default() -> Self {
        Gap::Fractional(0.0)
    }
}

/// Position `target` next to `reference`.
///
/// `orientations` selects the reference side and the target side that
/// should face it; `hints` are the optional direction hints used when an
/// orientation is a named anchor. On error the target is left untouched.
pub fn align_two_shapes(
    reference: &Shape,
    target: &mut Shape,
    orientations: [&Orientation; 2],
    gap: Gap,
    hints: [Option<Direction>; 2],
) -> Result<(), LayoutError> {
    let [ref_orientation, target_orientation] = orientations;
    let [ref_hint, target_hint] = hints;

    let (center_ref, unit) = reference.calculate_orientation_vector(ref_orientation, ref_hint)?;

    let mut staged = target.clone();
    staged.reset();

    let magnitude = gap.apply(
        reference.calculate_orientation_length(ref_orientation, ref_hint)?
            + staged.calculate_orientation_length(target_orientation, target_hint)?,
    );

    let origin = match target_orientation {
        Orientation::Side(_) | Orientation::Cen => staged.compute_center_from_dim(false),
        Orientation::Anchor(name) => {
            staged.local_anchor(name)? + target_hint.unwrap_or(Direction::Left).unit()
        }
    };

    let new_center = center_ref + unit * magnitude;
    let delta = new_center - origin;

    // orientation of the target before it moves
    let (_, target_unit) = staged.calculate_orientation_vector(target_orientation, target_hint)?;
    let angle = signed_angle(target_unit, -unit);

    staged.set_rotation_center(Some(origin));
    staged.update_transformation(
        TransformationUpdate::new()
            .with_rotate(angle)
            .with_translate(delta),
    );

    tracing::debug!(
        reference = %reference,
        target = %staged,
        ref_orientation = %ref_orientation,
        target_orientation = %target_orientation,
        magnitude,
        angle,
        translate = %delta,
        "aligned shape"
    );

    *target = staged;
    Ok(())
}

/// Distance between the reference point and the target origin after
/// alignment, as predicted from the orientation lengths
pub fn expected_separation(
    reference: &Shape,
    target: &Shape,
    orientations: [&Orientation; 2],
    gap: Gap,
    hints: [Option<Direction>; 2],
) -> Result<f64, LayoutError> {
    Ok(gap.apply(
        reference.calculate_orientation_length(orientations[0], hints[0])?
            + target.calculate_orientation_length(orientations[1], hints[1])?,
    ))
}

/// On-screen position of the point the alignment pins in place on `target`
pub fn aligned_origin(
    target: &Shape,
    orientation: &Orientation,
    hint: Option<Direction>,
) -> Result<Point, LayoutError> {
    match orientation {
        Orientation::Side(_) | Orientation::Cen => Ok(target.center()),
        Orientation::Anchor(name) => {
            let local = target.local_anchor(name)? + hint.unwrap_or(Direction::Left).unit();
            Ok(target.to_screen(local))
        }
    }
}
