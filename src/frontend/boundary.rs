use super::lexer::TokenKind;

/// The narrow view of a token stream the boundary check needs: where the
/// cursor is, and what kind sits at any absolute index in the full list.
pub trait Lookahead {
    fn current_index(&self) -> usize;
    fn kind_at(&self, index: usize) -> Option<&TokenKind>;
}

/// Kinds that imply a statement boundary when they sit immediately before
/// the current token. Heredoc closings count alongside line terminators: a
/// heredoc body ends a statement the way a line break does, and the language
/// does not require an explicit terminator after one.
pub fn is_boundary_kind(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::LineTerminator
            | TokenKind::HeredocLiteral(_)
            | TokenKind::HeredocTemplateEnd
    )
}

/// Whether a statement boundary is implied at the current position, judged
/// by the token immediately preceding it in the full, unfiltered list. The
/// lookup deliberately bypasses the default-channel cursor so suppressed
/// line terminators stay visible.
///
/// Pure read: never advances the stream, never fails, and depends only on
/// the preceding token's kind. At the very first token there is nothing
/// before the cursor, so no boundary can be implied.
pub fn boundary_implied(stream: &impl Lookahead) -> bool {
    let cur = stream.current_index();
    if cur == 0 {
        return false;
    }
    stream.kind_at(cur - 1).map_or(false, is_boundary_kind)
}
