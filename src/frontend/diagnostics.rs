use std::fmt::Write as _;

use super::position::Span;

/// A reported error with its source span.
///
/// Diagnostics are accumulated by the lexer/parser and returned by the
/// evaluator; the driver renders them against the retained source lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }

    /// Renders the diagnostic: the offending source line(s), carets under
    /// the span, then `line:column: message`.
    pub fn render(&self, lines: &[String]) -> String {
        let mut out = String::new();
        let start = self.span.start;
        let first = start.line;
        let last = self.span.end.line.max(first);

        for line_no in first..=last {
            if let Some(text) = lines.get(line_no.wrapping_sub(1)) {
                out.push_str(text);
                out.push('\n');
            }
        }

        if let Some(text) = lines.get(last.wrapping_sub(1)) {
            let len = text.chars().count();
            let caret_start = if last == first {
                start.column.min(len)
            } else {
                0
            };
            let caret_end = self.span.end.column.min(len).max(caret_start + 1);
            for _ in 0..caret_start {
                out.push(' ');
            }
            for _ in caret_start..caret_end {
                out.push('^');
            }
            out.push('\n');
        }

        let _ = writeln!(out, "{}: {}", start, self.message);
        out
    }
}
