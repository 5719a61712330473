//! Engine error types

use std::fmt::Display;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode, SourceSpan};
use thiserror::Error;

/// Main engine error type
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Template error in {}: {}", .0.name(), .0.message)]
    Template(#[from] TemplateError),

    #[error("Reference error: {0}")]
    Reference(#[from] kubeact_core::CoreError),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Error kind for categorizing template errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TemplateErrorKind {
    UndefinedVariable,
    UnknownFilter,
    UnknownFunction,
    SyntaxError,
    InvalidOperation,
    Other,
}

impl TemplateErrorKind {
    /// Last segment of the diagnostic code
    pub fn to_code_string(&self) -> &'static str {
        match self {
            Self::UndefinedVariable => "undefined_variable",
            Self::UnknownFilter => "unknown_filter",
            Self::UnknownFunction => "unknown_function",
            Self::SyntaxError => "syntax",
            Self::InvalidOperation => "invalid_operation",
            Self::Other => "render",
        }
    }

    fn help(&self) -> Option<&'static str> {
        match self {
            Self::UndefinedVariable => {
                Some("templates can read ctx, secrets and parameters; use --lenient to render missing values as empty")
            }
            Self::UnknownFilter => Some(
                "available filters: toyaml, tojson, b64encode, b64decode, quote, nindent, required, sha256",
            ),
            Self::SyntaxError => Some(
                "global tags are <$= $>, <$% %$>, <$# #$>; local tags are <%= %>, <%% %%>, <%# #%>",
            ),
            _ => None,
        }
    }
}

/// Template-specific error with source information
///
/// The diagnostic code is `kubeact::template::<kind>`.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct TemplateError {
    /// Error message
    pub message: String,

    /// Error kind for categorization
    pub kind: TemplateErrorKind,

    /// Template source code
    pub src: NamedSource<String>,

    /// Error location in source
    pub span: Option<SourceSpan>,
}

impl TemplateError {
    /// Create a new template error from a MiniJinja error
    pub fn from_minijinja(err: minijinja::Error, template_name: &str, template_source: &str) -> Self {
        let kind = match err.kind() {
            minijinja::ErrorKind::UndefinedError => TemplateErrorKind::UndefinedVariable,
            minijinja::ErrorKind::UnknownFilter => TemplateErrorKind::UnknownFilter,
            minijinja::ErrorKind::UnknownFunction => TemplateErrorKind::UnknownFunction,
            minijinja::ErrorKind::SyntaxError => TemplateErrorKind::SyntaxError,
            minijinja::ErrorKind::InvalidOperation => TemplateErrorKind::InvalidOperation,
            _ => TemplateErrorKind::Other,
        };

        let message = err
            .to_string()
            .replace("undefined value", "undefined variable");
        let span = err
            .line()
            .and_then(|line| calculate_span(template_source, line));

        Self {
            message,
            kind,
            src: NamedSource::new(template_name, template_source.to_string()),
            span,
        }
    }

    /// Name of the template (usually the manifest path)
    pub fn name(&self) -> &str {
        self.src.name()
    }
}

impl Diagnostic for TemplateError {
    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        Some(Box::new(format!(
            "kubeact::template::{}",
            self.kind.to_code_string()
        )))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        self.kind
            .help()
            .map(|help| Box::new(help) as Box<dyn Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.src)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span?;
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some("error occurred here".to_string()),
            span,
        ))))
    }
}

/// Span covering the given 1-based line
fn calculate_span(source: &str, line: usize) -> Option<SourceSpan> {
    let mut offset = 0;
    for (index, text) in source.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            let len = text.trim_end_matches('\n').len();
            return Some(SourceSpan::new(offset.into(), len));
        }
        offset += text.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_span() {
        let source = "a: 1\nb: {{ x }}\nc: 3";
        let span = calculate_span(source, 2).unwrap();

        assert_eq!(span.offset(), 5);
        assert_eq!(span.len(), 10);
        assert!(calculate_span(source, 9).is_none());
    }

    #[test]
    fn test_diagnostic_code_follows_kind() {
        let mut env = minijinja::Environment::new();
        env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);
        let source = "a: 1\nb: {{ missing.field }}\n";
        let err = env
            .render_str(source, minijinja::context! {})
            .unwrap_err();

        let err = TemplateError::from_minijinja(err, "cm.yaml", source);

        assert_eq!(err.kind, TemplateErrorKind::UndefinedVariable);
        assert_eq!(err.name(), "cm.yaml");
        assert_eq!(
            err.code().unwrap().to_string(),
            "kubeact::template::undefined_variable"
        );
        assert!(err.help().unwrap().to_string().contains("ctx, secrets and parameters"));
        assert_eq!(err.labels().unwrap().count(), 1);
    }
}
