//! Error types for the geometry and layout engine

use thiserror::Error;

use super::types::Point;

/// Errors that can occur while building, aligning or routing shapes
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    /// Anchor generation called with an unusable count
    #[error("invalid anchor count {count} (include_corner: {include_corner}): {reason}")]
    InvalidAnchorCount {
        count: usize,
        include_corner: bool,
        reason: String,
    },

    /// Reference to an anchor the shape does not have
    #[error("invalid anchor '{anchor}' on {shape} (valid anchors: {valid_anchors})")]
    UnknownAnchor {
        shape: String,
        anchor: String,
        valid_anchors: String,
    },

    /// Orientation or direction key that does not parse
    #[error("invalid orientation '{key}': {reason}")]
    InvalidOrientation { key: String, reason: String },

    /// Dimension tuple with the wrong arity or a degenerate size
    #[error("invalid dimensions for {shape}: {reason}")]
    InvalidDimensions { shape: String, reason: String },

    /// A rule's parallel lists do not have the expected length
    #[error("{rule}: '{field}' must have {expected} entries, found {found}")]
    RuleArity {
        rule: String,
        field: String,
        expected: usize,
        found: usize,
    },

    /// A rule names a shape index outside the composite
    #[error("{rule}: shape index {index} out of range (composite has {len} shapes)")]
    IndexOutOfRange {
        rule: String,
        index: usize,
        len: usize,
    },

    /// Alignment rules whose declared order cannot be applied in one pass
    #[error("circular constraint dependency: {}", cycle.join(" -> "))]
    CircularConstraint { cycle: Vec<String> },

    /// Routing parameter that is not finite or out of range
    #[error("invalid layout config: {field} = {value} ({reason})")]
    InvalidConfig {
        field: String,
        value: f64,
        reason: String,
    },

    /// No probe direction leaves the shape from this anchor
    #[error("no free exit direction for anchor '{anchor}' at {position}")]
    NoExitDirection { anchor: String, position: Point },

    /// Anchors were read after the shape's size changed
    #[error("anchors of {shape} are stale; call make_anchors after changing its size")]
    StaleAnchors { shape: String },

    /// Composite lines read after a mutation without a rebuild
    #[error("composite layout is stale (built for generation {built}, now at {current})")]
    StaleLayout { built: u64, current: u64 },
}

impl LayoutError {
    /// Create an invalid anchor count error
    pub fn anchor_count(count: usize, include_corner: bool, reason: impl Into<String>) -> Self {
        Self::InvalidAnchorCount {
            count,
            include_corner,
            reason: reason.into(),
        }
    }

    /// Create an unknown anchor error listing the anchors that do exist
    pub fn unknown_anchor(
        shape: impl Into<String>,
        anchor: impl Into<String>,
        valid_anchors: Vec<String>,
    ) -> Self {
        let valid_anchors = if valid_anchors.is_empty() {
            "none generated".to_string()
        } else {
            valid_anchors.join(", ")
        };
        Self::UnknownAnchor {
            shape: shape.into(),
            anchor: anchor.into(),
            valid_anchors,
        }
    }

    pub fn invalid_orientation(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOrientation {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_dimensions(shape: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            shape: shape.into(),
            reason: reason.into(),
        }
    }

    /// Create a mismatched-length error for a rule field
    pub fn arity(
        rule: impl Into<String>,
        field: impl Into<String>,
        expected: usize,
        found: usize,
    ) -> Self {
        Self::RuleArity {
            rule: rule.into(),
            field: field.into(),
            expected,
            found,
        }
    }

    pub fn index_out_of_range(rule: impl Into<String>, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange {
            rule: rule.into(),
            index,
            len,
        }
    }

    /// Create a circular constraint error
    pub fn circular(cycle: Vec<String>) -> Self {
        Self::CircularConstraint { cycle }
    }

    pub fn invalid_config(field: impl Into<String>, value: f64, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            value,
            reason: reason.into(),
        }
    }

    pub fn no_exit(anchor: impl Into<String>, position: Point) -> Self {
        Self::NoExitDirection {
            anchor: anchor.into(),
            position,
        }
    }

    /// Whether the error is a caller contract violation rather than a
    /// geometric degeneracy or stale read
    pub fn is_configuration(&self) -> bool {
        !matches!(
            self,
            Self::NoExitDirection { .. } | Self::StaleAnchors { .. } | Self::StaleLayout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_anchor_display() {
        let err = LayoutError::unknown_anchor(
            "rectangle",
            "anchor_top_9",
            vec!["anchor_top_0".to_string(), "anchor_top_1".to_string()],
        );
        let msg = err.to_string();
        assert!(msg.contains("anchor_top_9"));
        assert!(msg.contains("anchor_top_0, anchor_top_1"));
    }

    #[test]
    fn test_unknown_anchor_without_anchors() {
        let err = LayoutError::unknown_anchor("circle", "anchor_arc_0", vec![]);
        assert!(err.to_string().contains("none generated"));
    }

    #[test]
    fn test_circular_constraint_display() {
        let err = LayoutError::circular(vec!["1".to_string(), "2".to_string(), "1".to_string()]);
        assert!(err.to_string().contains("1 -> 2 -> 1"));
    }

    #[test]
    fn test_arity_display() {
        let err = LayoutError::arity("align[0]", "orientations", 2, 3);
        assert_eq!(
            err.to_string(),
            "align[0]: 'orientations' must have 2 entries, found 3"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(LayoutError::arity("connect[1]", "anchors", 2, 1).is_configuration());
        assert!(LayoutError::invalid_config("probe_step", 0.0, "must be positive").is_configuration());
        assert!(!LayoutError::no_exit("anchor_arc_1", Point::new(1.0, 2.0)).is_configuration());
        assert!(!LayoutError::StaleLayout { built: 1, current: 2 }.is_configuration());
    }
}
