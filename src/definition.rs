//! Diagram definitions loaded from TOML
//!
//! A definition lists shapes, alignment rules and connection rules. Every
//! string key (orientation, direction hint, gap mode) is parsed into its
//! enum here, and every rule is checked against the shapes it names before
//! a [`Composite`] is built.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use toml::Spanned;

use crate::error::{DefinitionError, Span};
use crate::layout::{
    AlignmentRule, AnchorArgs, Composite, ConnectionRule, Decoration, Direction, Gap,
    LayoutConfig, LayoutError, Orientation, RoutingMode, Shape, ShapeVariant,
};

/// TOML structure for deserializing definitions
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlDefinition {
    #[serde(default)]
    reference: usize,
    routing: Option<TomlRouting>,
    #[serde(default)]
    shapes: Vec<TomlShape>,
    #[serde(default)]
    align: Vec<TomlAlign>,
    #[serde(default)]
    connect: Vec<TomlConnect>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlRouting {
    stub_length: Option<Spanned<f64>>,
    overshoot_margin: Option<Spanned<f64>>,
    probe_step: Option<Spanned<f64>>,
    default_anchors: Option<AnchorArgs>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlShape {
    kind: ShapeVariant,
    dim: Spanned<Vec<f64>>,
    anchors: Option<Spanned<AnchorArgs>>,
    #[serde(default)]
    labels: Vec<Spanned<TomlLabel>>,
    fill: Option<String>,
    stroke: Option<String>,
    stroke_width: Option<f64>,
    opacity: Option<f64>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlLabel {
    text: String,
    anchor: String,
    #[serde(default = "default_label_orientation")]
    orientation: String,
}

fn default_label_orientation() -> String {
    "top".to_string()
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum GapMode {
    #[default]
    Fractional,
    Absolute,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlAlign {
    shapes: Spanned<Vec<usize>>,
    orientations: Spanned<Vec<String>>,
    #[serde(default)]
    gap: f64,
    #[serde(default)]
    gap_mode: GapMode,
    hints: Option<Spanned<Vec<String>>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConnect {
    shapes: Spanned<Vec<usize>>,
    anchors: Spanned<Vec<String>>,
    #[serde(default)]
    direct: bool,
}

/// A validated diagram, ready to become a [`Composite`]
#[derive(Debug, Clone)]
pub struct DiagramDefinition {
    pub shapes: Vec<Shape>,
    pub anchor_args: Vec<AnchorArgs>,
    pub alignment_pattern: Vec<AlignmentRule>,
    pub connection_pattern: Vec<ConnectionRule>,
    pub reference: usize,
    pub config: LayoutConfig,
    /// Span of each entry's defining field, keyed `shapes[i]`, `align[i]` and `connect[i]`
    spans: BTreeMap<String, Span>,
}

impl DiagramDefinition {
    /// Load a definition from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, DefinitionError> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }

    /// Source span of an entry such as `align[0]`
    pub fn span_of(&self, entry: &str) -> Option<Span> {
        self.spans.get(entry).cloned()
    }

    /// Build the composite this definition describes
    pub fn build(&self) -> Result<Composite, DefinitionError> {
        Composite::new(
            self.shapes.clone(),
            self.anchor_args.clone(),
            self.alignment_pattern.clone(),
            self.connection_pattern.clone(),
            self.reference,
            self.config.clone(),
        )
        .map_err(|error| {
            let span = self.span_for(&error);
            DefinitionError::layout(error, span)
        })
    }

    /// Best-effort source location for an error raised while building
    fn span_for(&self, error: &LayoutError) -> Option<Span> {
        let entry = match error {
            LayoutError::IndexOutOfRange { rule, .. } | LayoutError::RuleArity { rule, .. } => {
                rule.as_str()
            }
            LayoutError::CircularConstraint { cycle } => {
                cycle.first()?.split_whitespace().next()?
            }
            _ => return None,
        };
        self.span_of(entry)
    }
}

impl FromStr for DiagramDefinition {
    type Err = DefinitionError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let parsed: TomlDefinition = toml::from_str(source)?;

        let mut config = LayoutConfig::default();
        let mut routing_spans: BTreeMap<&str, Span> = BTreeMap::new();
        if let Some(routing) = parsed.routing {
            if let Some(stub_length) = routing.stub_length {
                routing_spans.insert("stub_length", stub_length.span());
                config = config.with_stub_length(*stub_length.get_ref());
            }
            if let Some(margin) = routing.overshoot_margin {
                routing_spans.insert("overshoot_margin", margin.span());
                config = config.with_overshoot_margin(*margin.get_ref());
            }
            if let Some(step) = routing.probe_step {
                routing_spans.insert("probe_step", step.span());
                config = config.with_probe_step(*step.get_ref());
            }
            if let Some(anchors) = routing.default_anchors {
                config = config.with_default_anchors(anchors);
            }
        }
        config.validate().map_err(|error| {
            let span = match &error {
                LayoutError::InvalidConfig { field, .. } => routing_spans.get(field.as_str()).cloned(),
                _ => None,
            };
            DefinitionError::layout(error, span)
        })?;

        let mut spans = BTreeMap::new();
        let mut shapes = Vec::with_capacity(parsed.shapes.len());
        let mut anchor_args = Vec::with_capacity(parsed.shapes.len());
        for (i, raw) in parsed.shapes.into_iter().enumerate() {
            let dim_span = raw.dim.span();
            spans.insert(format!("shapes[{}]", i), dim_span.clone());

            let mut shape = Shape::from_dim(raw.kind, raw.dim.get_ref()).map_err(at(&dim_span))?;

            let (args, args_span) = match raw.anchors {
                Some(anchors) => (*anchors.get_ref(), anchors.span()),
                None => (config.default_anchors, dim_span.clone()),
            };
            shape
                .make_anchors(args.count, args.include_corner)
                .map_err(at(&args_span))?;

            for entry in raw.labels {
                let span = entry.span();
                let label = entry.into_inner();
                let orientation = label
                    .orientation
                    .parse::<Orientation>()
                    .map_err(at(&span))?;
                shape.local_anchor(&label.anchor).map_err(at(&span))?;
                shape.add_label(label.text, label.anchor, orientation);
            }
            shape.update_decoration(&Decoration {
                fill: raw.fill,
                stroke: raw.stroke,
                stroke_width: raw.stroke_width,
                opacity: raw.opacity,
            });

            shapes.push(shape);
            anchor_args.push(args);
        }

        let mut alignment_pattern = Vec::with_capacity(parsed.align.len());
        for (i, raw) in parsed.align.into_iter().enumerate() {
            let name = format!("align[{}]", i);
            spans.insert(name.clone(), raw.shapes.span());
            alignment_pattern.push(alignment_rule(&name, raw, &shapes)?);
        }

        let mut connection_pattern = Vec::with_capacity(parsed.connect.len());
        for (i, raw) in parsed.connect.into_iter().enumerate() {
            let name = format!("connect[{}]", i);
            spans.insert(name.clone(), raw.shapes.span());
            connection_pattern.push(connection_rule(&name, raw, &shapes)?);
        }

        tracing::debug!(
            shapes = shapes.len(),
            align = alignment_pattern.len(),
            connect = connection_pattern.len(),
            reference = parsed.reference,
            "loaded diagram definition"
        );

        Ok(DiagramDefinition {
            shapes,
            anchor_args,
            alignment_pattern,
            connection_pattern,
            reference: parsed.reference,
            config,
            spans,
        })
    }
}

/// Attach a source span to a layout error
fn at(span: &Span) -> impl Fn(LayoutError) -> DefinitionError + '_ {
    move |error| DefinitionError::layout(error, Some(span.clone()))
}

fn pair<T: Clone>(rule: &str, field: &str, values: &Spanned<Vec<T>>) -> Result<[T; 2], DefinitionError> {
    match values.get_ref().as_slice() {
        [a, b] => Ok([a.clone(), b.clone()]),
        other => Err(DefinitionError::layout(
            LayoutError::arity(rule, field, 2, other.len()),
            Some(values.span()),
        )),
    }
}

fn shape_ref<'a>(rule: &str, shapes: &'a [Shape], index: usize) -> Result<&'a Shape, LayoutError> {
    shapes
        .get(index)
        .ok_or_else(|| LayoutError::index_out_of_range(rule, index, shapes.len()))
}

fn parse_hint(value: &str) -> Result<Option<Direction>, LayoutError> {
    match value {
        "none" => Ok(None),
        other => other.parse().map(Some),
    }
}

fn alignment_rule(
    name: &str,
    raw: TomlAlign,
    shapes: &[Shape],
) -> Result<AlignmentRule, DefinitionError> {
    let [reference, target] = pair(name, "shapes", &raw.shapes)?;
    let [ref_key, target_key] = pair(name, "orientations", &raw.orientations)?;
    let hints = match &raw.hints {
        Some(hints) => {
            let [a, b] = pair(name, "hints", hints)?;
            let span = hints.span();
            [
                parse_hint(&a).map_err(at(&span))?,
                parse_hint(&b).map_err(at(&span))?,
            ]
        }
        None => [None, None],
    };

    let orientation_span = raw.orientations.span();
    let orientations = [
        ref_key.parse::<Orientation>().map_err(at(&orientation_span))?,
        target_key.parse::<Orientation>().map_err(at(&orientation_span))?,
    ];
    for (index, orientation) in [reference, target].into_iter().zip(&orientations) {
        let shape = shape_ref(name, shapes, index).map_err(at(&raw.shapes.span()))?;
        if let Orientation::Anchor(anchor) = orientation {
            shape.local_anchor(anchor).map_err(at(&orientation_span))?;
        }
    }

    let gap = match raw.gap_mode {
        GapMode::Fractional => Gap::Fractional(raw.gap),
        GapMode::Absolute => Gap::Absolute(raw.gap),
    };

    Ok(AlignmentRule {
        reference,
        target,
        orientations,
        gap,
        hints,
    })
}

fn connection_rule(
    name: &str,
    raw: TomlConnect,
    shapes: &[Shape],
) -> Result<ConnectionRule, DefinitionError> {
    let indices = pair(name, "shapes", &raw.shapes)?;
    let anchors = pair(name, "anchors", &raw.anchors)?;
    for (index, anchor) in indices.iter().zip(&anchors) {
        shape_ref(name, shapes, *index)
            .map_err(at(&raw.shapes.span()))?
            .local_anchor(anchor)
            .map_err(at(&raw.anchors.span()))?;
    }
    Ok(ConnectionRule {
        shapes: indices,
        anchors,
        mode: RoutingMode::from_direct(raw.direct),
    })
}
