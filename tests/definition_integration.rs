//! Integration tests for loading TOML diagram definitions

use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;

use synoptic_geometry::{
    load_composite, BoundingBox, DefinitionError, DiagramDefinition, LayoutError, Orientation,
    Point,
};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn approx(a: Point, b: Point) -> bool {
    a.distance(b) < 1e-6
}

#[test]
fn test_beamline_fixture_layout() {
    let definition = DiagramDefinition::from_file(&fixture("beamline.toml")).unwrap();
    assert_eq!(definition.reference, 0);
    assert_eq!(definition.config.stub_length, 5.0);
    assert_eq!(definition.anchor_args[1].count, 4);

    let composite = definition.build().unwrap();
    let centers: Vec<Point> = composite.shapes().iter().map(|s| s.center()).collect();
    assert!(approx(centers[0], Point::new(20.0, 10.0)));
    assert!(approx(centers[1], Point::new(70.0, 10.0)));
    assert!(approx(centers[2], Point::new(115.0, 10.0)));

    assert_eq!(
        composite.boundary(),
        Some(BoundingBox::new(0.0, 130.0, -5.0, 25.0))
    );

    let path = &composite.lines().unwrap()[0].path;
    let expected: Vec<Point> = [(40.0, 10.0), (45.0, 10.0), (50.0, 10.0), (55.0, 10.0), (60.0, 10.0)]
        .iter()
        .map(|&(x, y)| Point::new(x, y))
        .collect();
    assert_eq!(path, &expected);
}

#[test]
fn test_beamline_fixture_decoration_and_labels() {
    let composite = DiagramDefinition::from_file(&fixture("beamline.toml"))
        .unwrap()
        .build()
        .unwrap();

    let source = &composite.shapes()[0];
    assert_eq!(source.decoration().fill.as_deref(), Some("#3366cc"));
    assert_eq!(source.labels()[0].text, "Source");

    let stage = &composite.shapes()[2];
    assert_eq!(stage.decoration().stroke.as_deref(), Some("#222222"));
    assert_eq!(stage.decoration().stroke_width, Some(2.0));

    let shutter = &composite.shapes()[1];
    assert_eq!(shutter.labels()[0].orientation, Orientation::Cen);
    let positions = shutter.label_positions().unwrap();
    assert!(approx(positions[0].1, Point::new(70.0, 0.0)));
}

#[test]
fn test_beamline_translation_moves_everything() {
    let mut composite = DiagramDefinition::from_file(&fixture("beamline.toml"))
        .unwrap()
        .build()
        .unwrap();
    composite.translate(Point::new(10.0, -10.0)).unwrap();

    assert!(approx(composite.shapes()[2].center(), Point::new(125.0, 0.0)));
    let path = &composite.lines().unwrap()[0].path;
    assert_eq!(path.first(), Some(&Point::new(50.0, 0.0)));
    assert_eq!(path.last(), Some(&Point::new(70.0, 0.0)));
}

#[test]
fn test_missing_file_is_io_error() {
    let result = DiagramDefinition::from_file(&fixture("does_not_exist.toml"));
    assert!(matches!(result, Err(DefinitionError::Io(_))));
}

#[test]
fn test_align_arity_error_is_formatted_at_rule() {
    let source = r#"
[[shapes]]
kind = "rectangle"
dim = [0, 0, 10, 10]

[[shapes]]
kind = "rectangle"
dim = [0, 0, 10, 10]

[[align]]
shapes = [0, 1]
orientations = ["right", "left", "top"]
"#;
    let err = load_composite(source).unwrap_err();
    assert_eq!(
        err.layout_error(),
        Some(&LayoutError::arity("align[0]", "orientations", 2, 3))
    );
    let span = err.span().unwrap();
    assert_eq!(&source[span], r#"["right", "left", "top"]"#);

    let report = err.format(source, "broken.toml");
    assert!(report.contains("broken.toml"));
    assert!(report.contains("'orientations' must have 2 entries, found 3"));
}

#[test]
fn test_wrong_dim_length_is_reported() {
    let source = "[[shapes]]\nkind = \"triangle\"\ndim = [0, 0, 10]\n";
    let err = source.parse::<DiagramDefinition>().unwrap_err();
    assert!(matches!(
        err.layout_error(),
        Some(LayoutError::InvalidDimensions { .. })
    ));
    assert_eq!(&source[err.span().unwrap()], "[0, 0, 10]");
}

#[test]
fn test_reference_out_of_range() {
    let source = "reference = 3\n\n[[shapes]]\nkind = \"circle\"\ndim = [0, 0, 10]\n";
    let err = load_composite(source).unwrap_err();
    assert!(matches!(
        err.layout_error(),
        Some(LayoutError::IndexOutOfRange { index: 3, len: 1, .. })
    ));
}
