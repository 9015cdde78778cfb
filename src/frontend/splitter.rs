use log::debug;
use serde::Serialize;

use super::boundary::boundary_implied;
use super::lexer::{Symbol, TokenKind};
use super::stream::TokenStream;

/// One segmented statement: the absolute indices of its first and last
/// default-channel tokens, plus the line it starts on.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatementSpan {
    pub first: usize,
    pub last: usize,
    pub line: usize,
}

/// Segment the default channel into statements. An explicit `;` closes the
/// statement in progress; otherwise, before treating the current token as a
/// continuation, the boundary guard is consulted, and a positive answer
/// closes the statement instead. The guard only applies at bracket depth
/// zero: inside parentheses, brackets, braces, templates, and
/// interpolations, a line break continues the enclosing construct.
pub fn split_statements(stream: &mut TokenStream) -> Vec<StatementSpan> {
    let mut statements = Vec::new();
    let mut depth: usize = 0;
    let mut open: Option<(usize, usize)> = None;
    let mut last = 0usize;
    loop {
        if stream.is_at_end() {
            if let Some((first, line)) = open.take() {
                statements.push(StatementSpan { first, last, line });
            }
            break;
        }
        let index = stream.current_index();
        let line = stream.current().span.line;
        if depth == 0 && open.is_some() && boundary_implied(stream) {
            if let Some((first, opened_at)) = open.take() {
                debug!(
                    "implied boundary before token {} closes statement at line {}",
                    index, opened_at
                );
                statements.push(StatementSpan {
                    first,
                    last,
                    line: opened_at,
                });
            }
        }
        if depth == 0 && matches!(stream.current().kind, TokenKind::Symbol(Symbol::Semi)) {
            if let Some((first, opened_at)) = open.take() {
                statements.push(StatementSpan {
                    first,
                    last: index,
                    line: opened_at,
                });
            }
            stream.bump();
            continue;
        }
        match &stream.current().kind {
            TokenKind::Symbol(Symbol::LParen)
            | TokenKind::Symbol(Symbol::LBracket)
            | TokenKind::Symbol(Symbol::LBrace)
            | TokenKind::InterpOpen
            | TokenKind::TemplateStart
            | TokenKind::HeredocTemplateStart => depth += 1,
            TokenKind::Symbol(Symbol::RParen)
            | TokenKind::Symbol(Symbol::RBracket)
            | TokenKind::Symbol(Symbol::RBrace)
            | TokenKind::InterpClose
            | TokenKind::TemplateEnd
            | TokenKind::HeredocTemplateEnd => depth = depth.saturating_sub(1),
            _ => {}
        }
        if open.is_none() {
            open = Some((index, line));
        }
        last = index;
        stream.bump();
    }
    statements
}

#[cfg(test)]
mod tests {
    use super::{split_statements, StatementSpan};
    use crate::frontend::lexer::Lexer;
    use crate::frontend::stream::TokenStream;

    fn split(input: &str) -> Vec<StatementSpan> {
        let (tokens, _) = Lexer::new(input).lex_all();
        let mut stream = TokenStream::new(tokens);
        split_statements(&mut stream)
    }

    #[test]
    fn line_breaks_split_statements() {
        let stmts = split("a = 1\nb = 2");
        assert_eq!(
            stmts,
            vec![
                StatementSpan { first: 0, last: 2, line: 1 },
                StatementSpan { first: 4, last: 6, line: 2 },
            ]
        );
    }

    #[test]
    fn line_break_inside_parens_continues_the_statement() {
        let stmts = split("a = (1 +\n2)");
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].line, 1);
    }

    #[test]
    fn explicit_semicolons_split_on_one_line() {
        let stmts = split("a = 1; b = 2");
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0].line, 1);
        assert_eq!(stmts[1].line, 1);
    }

    #[test]
    fn stray_semicolons_produce_no_empty_statements() {
        let stmts = split(";;\na = 1;;");
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn heredoc_literal_ends_a_statement_without_a_terminator() {
        let stmts = split("x = <<'E'\nbody\nE\ny = 2");
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0].first, 0);
        assert_eq!(stmts[0].last, 2);
        assert_eq!(stmts[1].line, 4);
    }

    #[test]
    fn heredoc_template_end_closes_like_a_line_break() {
        let stmts = split("x = <<\"D\"\nhi $(n)\nD\ny = 2");
        assert_eq!(stmts.len(), 2);
    }

    #[test]
    fn template_interpolation_line_breaks_do_not_split() {
        let stmts = split("x = \"a$(\n1 + 2\n)b\"");
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn empty_input_has_no_statements() {
        assert!(split("").is_empty());
        assert!(split("\n\n").is_empty());
    }
}
