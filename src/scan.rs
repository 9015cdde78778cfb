use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use crate::frontend::boundary::boundary_implied;
use crate::frontend::diagnostic::{format_diagnostic, Diagnostic};
use crate::frontend::lexer::{Lexer, Token};
use crate::frontend::splitter::{split_statements, StatementSpan};
use crate::frontend::stream::TokenStream;

/// Everything one pass over a source produces: the full token list, the
/// statement segmentation, and any scanner diagnostics.
#[derive(Debug, Serialize)]
pub struct Analysis {
    pub tokens: Vec<Token>,
    pub statements: Vec<StatementSpan>,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn scan_source(source: &str) -> Analysis {
    let (tokens, diags) = Lexer::new(source).lex_all();
    let mut stream = TokenStream::new(tokens);
    let statements = split_statements(&mut stream);
    Analysis {
        tokens: stream.into_tokens(),
        statements,
        diagnostics: diags.items,
    }
}

pub fn scan_file(path: &Path) -> Result<(String, Analysis), String> {
    let source = fs::read_to_string(path)
        .map_err(|e| format!("{}: {}", path.display(), e))?;
    let analysis = scan_source(&source);
    Ok((source, analysis))
}

/// Absolute indices of the default-channel tokens that sit right after an
/// implied boundary. `Eof` is included so a boundary at end of input shows.
pub fn implied_boundary_indices(tokens: &[Token]) -> Vec<usize> {
    let mut stream = TokenStream::new(tokens.to_vec());
    let mut out = Vec::new();
    loop {
        if boundary_implied(&stream) {
            out.push(stream.current_index());
        }
        if stream.is_at_end() {
            break;
        }
        stream.bump();
    }
    out
}

pub fn render_diagnostics(analysis: &Analysis, source: &str) -> String {
    let mut out = String::new();
    for diag in &analysis.diagnostics {
        out.push_str(&format_diagnostic(diag, source));
        out.push('\n');
    }
    out
}

pub fn json_dump(analysis: &Analysis) -> anyhow::Result<String> {
    serde_json::to_string_pretty(analysis).context("serialize analysis")
}

pub fn write_json_dump(path: &Path, analysis: &Analysis) -> anyhow::Result<()> {
    let payload = json_dump(analysis)?;
    fs::write(path, payload).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{implied_boundary_indices, json_dump, render_diagnostics, scan_source};

    #[test]
    fn scan_counts_statements_across_lines() {
        let analysis = scan_source("a = 1\nb = 2\nc = 3");
        assert_eq!(analysis.statements.len(), 3);
        assert!(analysis.diagnostics.is_empty());
    }

    #[test]
    fn boundary_indices_follow_line_terminators() {
        let analysis = scan_source("a\nb");
        assert_eq!(implied_boundary_indices(&analysis.tokens), vec![2]);
    }

    #[test]
    fn boundary_shows_at_end_of_input() {
        let analysis = scan_source("a\n");
        let indices = implied_boundary_indices(&analysis.tokens);
        assert_eq!(indices.len(), 1);
    }

    #[test]
    fn heredoc_statements_survive_the_round_trip() {
        let analysis = scan_source("x = <<'E'\none\ntwo\nE\ny = 2");
        assert_eq!(analysis.statements.len(), 2);
        assert!(analysis.diagnostics.is_empty());
    }

    #[test]
    fn json_dump_carries_tokens_and_statements() {
        let analysis = scan_source("a = 1");
        let dump = json_dump(&analysis).expect("dump");
        assert!(dump.contains("\"tokens\""));
        assert!(dump.contains("\"statements\""));
        assert!(dump.contains("\"diagnostics\""));
    }

    #[test]
    fn diagnostics_render_with_source_context() {
        let analysis = scan_source("x = 'abc");
        assert_eq!(analysis.diagnostics.len(), 1);
        let rendered = render_diagnostics(&analysis, "x = 'abc");
        assert!(rendered.contains("unterminated string literal"));
        assert!(rendered.contains("x = 'abc"));
    }
}
