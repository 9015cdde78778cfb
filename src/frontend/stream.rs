use super::boundary::Lookahead;
use super::lexer::{Channel, Span, Token, TokenKind};

/// Owned token sequence with a cursor over the default channel. The vector
/// keeps every emitted token, hidden channel included, so absolute-index
/// lookups see line terminators the grammar never consumes.
pub struct TokenStream {
    tokens: Vec<Token>,
    idx: usize,
}

impl TokenStream {
    /// The stream always ends with an `Eof` token on the default channel, so
    /// the cursor has somewhere to rest. Input that lacks one gets it
    /// appended with the next contiguous index.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        let needs_eof = !tokens
            .iter()
            .any(|t| matches!(t.kind, TokenKind::Eof) && t.channel == Channel::Default);
        if needs_eof {
            let (line, column, start) = tokens
                .last()
                .map(|t| (t.span.line, t.span.column, t.span.end))
                .unwrap_or((1, 1, 0));
            let index = tokens.len();
            tokens.push(Token {
                kind: TokenKind::Eof,
                channel: Channel::Default,
                span: Span {
                    start,
                    end: start,
                    line,
                    column,
                },
                index,
            });
        }
        let mut stream = Self { tokens, idx: 0 };
        stream.skip_hidden();
        stream
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// The token under the cursor, always on the default channel.
    pub fn current(&self) -> &Token {
        &self.tokens[self.idx]
    }

    /// Absolute index of the current token in the full list.
    pub fn current_index(&self) -> usize {
        self.idx
    }

    /// Random access into the full, unfiltered list.
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn is_at_end(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    /// Advance to the next default-channel token. Stays put at `Eof`.
    pub fn bump(&mut self) {
        if self.is_at_end() {
            return;
        }
        self.idx += 1;
        self.skip_hidden();
    }

    fn skip_hidden(&mut self) {
        while self.idx < self.tokens.len() - 1
            && self.tokens[self.idx].channel == Channel::Hidden
        {
            self.idx += 1;
        }
    }
}

impl Lookahead for TokenStream {
    fn current_index(&self) -> usize {
        self.idx
    }

    fn kind_at(&self, index: usize) -> Option<&TokenKind> {
        self.tokens.get(index).map(|t| &t.kind)
    }
}
