//! Error types for loading diagram definitions

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::layout::LayoutError;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Errors that can occur when loading a diagram definition
#[derive(Error, Debug)]
pub enum DefinitionError {
    #[error("failed to read diagram definition: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse diagram definition: {0}")]
    Toml(#[from] toml::de::Error),

    /// A geometric or rule error, with the span of the offending entry when known
    #[error("{error}")]
    Layout {
        error: LayoutError,
        span: Option<Span>,
    },
}

impl DefinitionError {
    pub fn layout(error: LayoutError, span: Option<Span>) -> Self {
        DefinitionError::Layout { error, span }
    }

    /// The layout error behind this definition error, if any
    pub fn layout_error(&self) -> Option<&LayoutError> {
        match self {
            DefinitionError::Layout { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Location of the error in the definition source
    pub fn span(&self) -> Option<Span> {
        match self {
            DefinitionError::Io(_) => None,
            DefinitionError::Toml(err) => err.span(),
            DefinitionError::Layout { span, .. } => span.clone(),
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let message = match self {
            DefinitionError::Toml(err) => err.message().to_string(),
            other => other.to_string(),
        };
        let Some(span) = self.span() else {
            return format!("Error: {}", message);
        };

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(&message)
            .with_label(
                Label::new((filename, span))
                    .with_message(&message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8(buf).unwrap_or_else(|_| format!("Error: {}", message)),
            Err(_) => format!("Error: {}", message),
        }
    }
}

impl From<LayoutError> for DefinitionError {
    fn from(error: LayoutError) -> Self {
        DefinitionError::layout(error, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_points_at_span() {
        let source = "[[align]]\nshapes = [0, 1, 2]\n";
        let err = DefinitionError::layout(LayoutError::arity("align[0]", "shapes", 2, 3), Some(10..28));
        let report = err.format(source, "diagram.toml");
        assert!(report.contains("diagram.toml"));
        assert!(report.contains("'shapes' must have 2 entries, found 3"));
    }

    #[test]
    fn test_format_without_span() {
        let err = DefinitionError::from(LayoutError::circular(vec!["a".into(), "b".into()]));
        assert_eq!(
            err.format("", "diagram.toml"),
            "Error: circular constraint dependency: a -> b"
        );
    }

    #[test]
    fn test_toml_error_keeps_span() {
        let source = "reference = [";
        let err: DefinitionError = toml::from_str::<toml::Table>(source).unwrap_err().into();
        assert!(err.span().is_some());
        assert!(err.layout_error().is_none());
    }
}
