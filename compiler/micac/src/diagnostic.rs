//! Source-annotated error reports.

use ariadne::{Config, Label, Report, ReportKind, Source};
use mica_flow::BuildError;
use mica_ir::Span;
use mica_parse::ParseError;
use mica_types::ResolveError;

/// One error to show against the source text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
    pub label: Option<String>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Diagnostic {
            message: message.into(),
            span,
            label: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl From<&ParseError> for Diagnostic {
    fn from(err: &ParseError) -> Self {
        Diagnostic::new(format!("parse error: {err}"), err.span)
    }
}

impl From<&ResolveError> for Diagnostic {
    fn from(err: &ResolveError) -> Self {
        let label = match err {
            ResolveError::UnresolvedName { .. } => "not found in this scope",
            ResolveError::ValReassigned { .. } => "assignment to a `val`",
        };
        Diagnostic::new(err.to_string(), err.span()).with_label(label)
    }
}

impl From<&BuildError> for Diagnostic {
    fn from(err: &BuildError) -> Self {
        let span = err.span().unwrap_or(Span::DUMMY);
        let diagnostic = Diagnostic::new(err.to_string(), span);
        match err {
            BuildError::Unsupported { .. } => {
                diagnostic.with_label("not supported by the flow builder")
            }
            BuildError::Malformed(_) => diagnostic,
        }
    }
}

/// Render `diagnostics` against `source` as plain text.
///
/// `path` names the file in report headers. Spans past the end of the
/// source are clamped so a stale span cannot break rendering.
pub fn render(path: &str, source: &str, diagnostics: &[Diagnostic], color: bool) -> String {
    let mut out = Vec::new();
    for diagnostic in diagnostics {
        let end = (diagnostic.span.end as usize).min(source.len());
        let start = (diagnostic.span.start as usize).min(end);
        let mut label = Label::new((path, start..end));
        if let Some(text) = &diagnostic.label {
            label = label.with_message(text);
        }
        let report = Report::build(ReportKind::Error, path, start)
            .with_config(Config::default().with_color(color))
            .with_message(&diagnostic.message)
            .with_label(label)
            .finish();
        // Writing into a Vec cannot fail.
        let _ = report.write((path, Source::from(source)), &mut out);
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests;
