//! Configuration for alignment and connector routing

use serde::Deserialize;

use super::error::LayoutError;

/// Anchor generation arguments for one shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnchorArgs {
    /// Anchors per side (per circle for circles)
    #[serde(default = "default_anchor_count")]
    pub count: usize,
    /// Whether the corners are included in the spacing
    #[serde(default)]
    pub include_corner: bool,
}

fn default_anchor_count() -> usize {
    1
}

impl AnchorArgs {
    pub fn new(count: usize, include_corner: bool) -> Self {
        Self {
            count,
            include_corner,
        }
    }
}

impl Default for AnchorArgs {
    fn default() -> Self {
        Self::new(default_anchor_count(), false)
    }
}

/// Configuration options for layout computation
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Length of the straight segment leaving each anchor
    pub stub_length: f64,

    /// Clearance added beyond the combined bounding box when a route detours
    pub overshoot_margin: f64,

    /// Distance of the probe points used to find an anchor's exit direction
    pub probe_step: f64,

    /// Anchor arguments for shapes that do not declare their own
    pub default_anchors: AnchorArgs,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            stub_length: 10.0,
            overshoot_margin: 10.0,
            probe_step: 1.0,
            default_anchors: AnchorArgs::default(),
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connector stub length
    pub fn with_stub_length(mut self, length: f64) -> Self {
        self.stub_length = length;
        self
    }

    /// Set the detour clearance around combined bounding boxes
    pub fn with_overshoot_margin(mut self, margin: f64) -> Self {
        self.overshoot_margin = margin;
        self
    }

    /// Set the exit-direction probe distance
    pub fn with_probe_step(mut self, step: f64) -> Self {
        self.probe_step = step;
        self
    }

    pub fn with_default_anchors(mut self, anchors: AnchorArgs) -> Self {
        self.default_anchors = anchors;
        self
    }

    /// Reject routing values that are not finite or out of range
    pub fn validate(&self) -> Result<(), LayoutError> {
        non_negative("stub_length", self.stub_length)?;
        non_negative("overshoot_margin", self.overshoot_margin)?;
        positive("probe_step", self.probe_step)
    }
}

pub(crate) fn non_negative(field: &str, value: f64) -> Result<(), LayoutError> {
    if !value.is_finite() {
        return Err(LayoutError::invalid_config(field, value, "must be finite"));
    }
    if value < 0.0 {
        return Err(LayoutError::invalid_config(field, value, "must not be negative"));
    }
    Ok(())
}

pub(crate) fn positive(field: &str, value: f64) -> Result<(), LayoutError> {
    non_negative(field, value)?;
    if value == 0.0 {
        return Err(LayoutError::invalid_config(field, value, "must be positive"));
    }
    Ok(())
}
