use serde::Serialize;

use super::lexer::Span;

#[derive(Clone, Debug, Serialize)]
pub struct Diagnostic {
    pub message: String,
    pub span: Option<Span>,
    pub hint: Option<String>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            message: message.into(),
            span,
            hint: None,
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct Diagnostics {
    pub items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn push(&mut self, message: impl Into<String>, span: Option<Span>) {
        self.items.push(Diagnostic::new(message, span));
    }

    pub fn push_with_hint(
        &mut self,
        message: impl Into<String>,
        span: Option<Span>,
        hint: Option<String>,
    ) {
        let mut diag = Diagnostic::new(message, span);
        diag.hint = hint;
        self.items.push(diag);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub fn format_diagnostic(diag: &Diagnostic, source: &str) -> String {
    let mut out = if let Some(span) = &diag.span {
        let line = span.line;
        let col = span.column;
        let line_text = source.lines().nth(line.saturating_sub(1)).unwrap_or("");
        format!(
            "error:{}:{}: {}\n  {}\n  {}^",
            line,
            col,
            diag.message,
            line_text,
            " ".repeat(col.saturating_sub(1))
        )
    } else {
        format!("error: {}", diag.message)
    };
    if let Some(hint) = &diag.hint {
        out.push_str("\n  hint: ");
        out.push_str(hint);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{format_diagnostic, Diagnostic, Diagnostics};
    use crate::frontend::lexer::Span;

    #[test]
    fn caret_points_at_the_column() {
        let diag = Diagnostic::new(
            "unterminated string literal",
            Some(Span {
                start: 4,
                end: 4,
                line: 1,
                column: 5,
            }),
        );
        let rendered = format_diagnostic(&diag, "x = 'abc");
        assert!(rendered.starts_with("error:1:5: unterminated string literal"));
        assert!(rendered.ends_with("    ^"));
    }

    #[test]
    fn hints_render_on_their_own_line() {
        let mut diags = Diagnostics::default();
        diags.push_with_hint(
            "unterminated heredoc; expected terminator `END`",
            None,
            Some("line 3 reads `ENDX`; the opener expects `END`".to_string()),
        );
        let rendered = format_diagnostic(&diags.items[0], "");
        assert!(rendered.contains("\n  hint: line 3 reads `ENDX`"));
    }
}
