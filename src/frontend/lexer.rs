use log::{debug, trace};
use serde::Serialize;

use super::diagnostic::Diagnostics;
use super::suggest::nearest_terminator;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum TokenKind {
    Ident(String),
    IntLit(String),
    FloatLit(String),
    StrLit(String),
    TemplateStart,
    TemplatePart(String),
    TemplateEnd,
    InterpOpen,
    InterpClose,
    HeredocLiteral(String),
    HeredocTemplateStart,
    HeredocTemplateEnd,
    LineTerminator,
    Comment,
    Keyword(Keyword),
    Symbol(Symbol),
    Unknown(char),
    Eof,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum Keyword {
    Let,
    Fn,
    If,
    Else,
    While,
    For,
    In,
    Return,
    Break,
    Continue,
    True,
    False,
    Nil,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum Symbol {
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semi,
    Colon,
    Dot,
    Arrow,
    FatArrow,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Eq,
    EqEq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
    AndAnd,
    OrOr,
    Amp,
    Pipe,
    Question,
}

/// Which stream a token belongs to. The grammar walks `Default` tokens only;
/// `Hidden` tokens stay addressable through full-list lookups.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum Channel {
    Default,
    Hidden,
}

#[derive(Clone, Debug, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub channel: Channel,
    pub span: Span,
    /// Zero-based position in emission order, contiguous across both channels.
    pub index: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum FrameKind {
    DoubleQuote,
    Heredoc,
}

/// One level of string/heredoc nesting. `parens` is zero while the lexer is
/// inside the frame's text and counts open parentheses while inside a `$(`
/// interpolation, so nested `(`/`)` do not close the interpolation early.
#[derive(Debug)]
struct TemplateFrame {
    kind: FrameKind,
    delimiter: Option<String>,
    parens: u32,
    open_span: Span,
    near_misses: Vec<(String, usize)>,
}

pub struct Lexer {
    src: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    frames: Vec<TemplateFrame>,
    diags: Diagnostics,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            src: input.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            frames: Vec::new(),
            diags: Diagnostics::default(),
        }
    }

    pub fn lex_all(mut self) -> (Vec<Token>, Diagnostics) {
        let mut tokens: Vec<Token> = Vec::new();
        loop {
            let mut tok = self.next_token();
            tok.index = tokens.len();
            trace!("tok[{}] {:?} ({:?})", tok.index, tok.kind, tok.channel);
            let is_eof = matches!(tok.kind, TokenKind::Eof);
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        (tokens, self.diags)
    }

    fn next_token(&mut self) -> Token {
        if let Some(frame) = self.frames.last() {
            if frame.parens == 0 {
                return self.template_text_token();
            }
        }
        self.normal_token()
    }

    fn normal_token(&mut self) -> Token {
        self.skip_blanks();
        let start = self.pos;
        let (line, column) = (self.line, self.col);
        let ch = match self.peek() {
            Some(c) => c,
            None => {
                self.report_unterminated_frames();
                return self.token(TokenKind::Eof, Channel::Default, start, line, column);
            }
        };
        if is_line_terminator(ch) {
            self.consume_line_terminator();
            return self.token(TokenKind::LineTerminator, Channel::Hidden, start, line, column);
        }
        if ch == '#' {
            while let Some(c) = self.peek() {
                if is_line_terminator(c) {
                    break;
                }
                self.advance();
            }
            return self.token(TokenKind::Comment, Channel::Hidden, start, line, column);
        }
        if is_ident_start(ch) {
            let ident = self.read_while(is_ident_continue);
            let kind = match ident.as_str() {
                "let" => TokenKind::Keyword(Keyword::Let),
                "fn" => TokenKind::Keyword(Keyword::Fn),
                "if" => TokenKind::Keyword(Keyword::If),
                "else" => TokenKind::Keyword(Keyword::Else),
                "while" => TokenKind::Keyword(Keyword::While),
                "for" => TokenKind::Keyword(Keyword::For),
                "in" => TokenKind::Keyword(Keyword::In),
                "return" => TokenKind::Keyword(Keyword::Return),
                "break" => TokenKind::Keyword(Keyword::Break),
                "continue" => TokenKind::Keyword(Keyword::Continue),
                "true" => TokenKind::Keyword(Keyword::True),
                "false" => TokenKind::Keyword(Keyword::False),
                "nil" => TokenKind::Keyword(Keyword::Nil),
                _ => TokenKind::Ident(ident),
            };
            return self.token(kind, Channel::Default, start, line, column);
        }
        if ch.is_ascii_digit() {
            let number = self.read_number();
            let kind = if number.contains('.') {
                TokenKind::FloatLit(number)
            } else {
                TokenKind::IntLit(number)
            };
            return self.token(kind, Channel::Default, start, line, column);
        }
        let kind = match ch {
            '\'' => self.read_str_lit(),
            '"' => {
                self.advance();
                self.push_frame(FrameKind::DoubleQuote, None, start, line, column);
                TokenKind::TemplateStart
            }
            '<' if self.peek_at(1) == Some('<') && self.peek_at(2) == Some('\'') => {
                self.read_heredoc_literal()
            }
            '<' if self.peek_at(1) == Some('<') && self.peek_at(2) == Some('"') => {
                self.read_heredoc_template_start(start, line, column)
            }
            '(' => {
                self.advance();
                if let Some(frame) = self.frames.last_mut() {
                    frame.parens += 1;
                }
                TokenKind::Symbol(Symbol::LParen)
            }
            ')' => {
                self.advance();
                match self.frames.last_mut() {
                    Some(frame) if frame.parens == 1 => {
                        frame.parens = 0;
                        TokenKind::InterpClose
                    }
                    Some(frame) => {
                        frame.parens = frame.parens.saturating_sub(1);
                        TokenKind::Symbol(Symbol::RParen)
                    }
                    None => TokenKind::Symbol(Symbol::RParen),
                }
            }
            '{' => {
                self.advance();
                TokenKind::Symbol(Symbol::LBrace)
            }
            '}' => {
                self.advance();
                TokenKind::Symbol(Symbol::RBrace)
            }
            '[' => {
                self.advance();
                TokenKind::Symbol(Symbol::LBracket)
            }
            ']' => {
                self.advance();
                TokenKind::Symbol(Symbol::RBracket)
            }
            ',' => {
                self.advance();
                TokenKind::Symbol(Symbol::Comma)
            }
            ';' => {
                self.advance();
                TokenKind::Symbol(Symbol::Semi)
            }
            ':' => {
                self.advance();
                TokenKind::Symbol(Symbol::Colon)
            }
            '.' => {
                self.advance();
                TokenKind::Symbol(Symbol::Dot)
            }
            '-' => {
                self.advance();
                if self.peek() == Some('>') {
                    self.advance();
                    TokenKind::Symbol(Symbol::Arrow)
                } else {
                    TokenKind::Symbol(Symbol::Minus)
                }
            }
            '=' => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Symbol(Symbol::EqEq)
                } else if self.peek() == Some('>') {
                    self.advance();
                    TokenKind::Symbol(Symbol::FatArrow)
                } else {
                    TokenKind::Symbol(Symbol::Eq)
                }
            }
            '!' => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Symbol(Symbol::NotEq)
                } else {
                    TokenKind::Symbol(Symbol::Bang)
                }
            }
            '<' => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Symbol(Symbol::Lte)
                } else {
                    TokenKind::Symbol(Symbol::Lt)
                }
            }
            '>' => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Symbol(Symbol::Gte)
                } else {
                    TokenKind::Symbol(Symbol::Gt)
                }
            }
            '&' => {
                self.advance();
                if self.peek() == Some('&') {
                    self.advance();
                    TokenKind::Symbol(Symbol::AndAnd)
                } else {
                    TokenKind::Symbol(Symbol::Amp)
                }
            }
            '|' => {
                self.advance();
                if self.peek() == Some('|') {
                    self.advance();
                    TokenKind::Symbol(Symbol::OrOr)
                } else {
                    TokenKind::Symbol(Symbol::Pipe)
                }
            }
            '+' => {
                self.advance();
                TokenKind::Symbol(Symbol::Plus)
            }
            '*' => {
                self.advance();
                TokenKind::Symbol(Symbol::Star)
            }
            '/' => {
                self.advance();
                TokenKind::Symbol(Symbol::Slash)
            }
            '%' => {
                self.advance();
                TokenKind::Symbol(Symbol::Percent)
            }
            '?' => {
                self.advance();
                TokenKind::Symbol(Symbol::Question)
            }
            other => {
                self.advance();
                TokenKind::Unknown(other)
            }
        };
        self.token(kind, Channel::Default, start, line, column)
    }

    /// Lex one token of template text: a text chunk, an interpolation opener,
    /// or the closing token of the innermost frame.
    fn template_text_token(&mut self) -> Token {
        let start = self.pos;
        let (line, column) = (self.line, self.col);
        let frame_kind = self.frames.last().map(|f| f.kind);
        let delimiter = self
            .frames
            .last()
            .and_then(|f| f.delimiter.clone())
            .unwrap_or_default();
        let mut buf = String::new();
        loop {
            if frame_kind == Some(FrameKind::Heredoc)
                && self.at_line_start()
                && self.line_is_terminator(&delimiter)
            {
                if !buf.is_empty() {
                    break;
                }
                self.consume_terminator_line();
                self.pop_frame();
                return self.token(
                    TokenKind::HeredocTemplateEnd,
                    Channel::Default,
                    start,
                    line,
                    column,
                );
            }
            match self.peek() {
                None => {
                    if !buf.is_empty() {
                        break;
                    }
                    self.report_unterminated_frames();
                    return self.token(TokenKind::Eof, Channel::Default, start, line, column);
                }
                Some('"') if frame_kind == Some(FrameKind::DoubleQuote) => {
                    if !buf.is_empty() {
                        break;
                    }
                    self.advance();
                    self.pop_frame();
                    return self.token(TokenKind::TemplateEnd, Channel::Default, start, line, column);
                }
                Some('$') if self.peek_at(1) == Some('(') => {
                    if !buf.is_empty() {
                        break;
                    }
                    self.advance();
                    self.advance();
                    if let Some(frame) = self.frames.last_mut() {
                        frame.parens = 1;
                    }
                    return self.token(TokenKind::InterpOpen, Channel::Default, start, line, column);
                }
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        Some(esc) => {
                            self.advance();
                            buf.push(match esc {
                                'n' => '\n',
                                't' => '\t',
                                'r' => '\r',
                                '\\' => '\\',
                                '"' => '"',
                                '$' => '$',
                                other => other,
                            });
                        }
                        None => buf.push('\\'),
                    }
                }
                Some(c) => {
                    buf.push(c);
                    self.advance();
                }
            }
        }
        self.token(TokenKind::TemplatePart(buf), Channel::Default, start, line, column)
    }

    fn read_str_lit(&mut self) -> TokenKind {
        self.advance();
        let mut s = String::new();
        loop {
            match self.peek() {
                None => {
                    self.diags
                        .push("unterminated string literal", Some(self.span_here()));
                    break;
                }
                Some(c) if is_line_terminator(c) => {
                    self.diags
                        .push("unterminated string literal", Some(self.span_here()));
                    break;
                }
                Some('\'') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        Some('\'') => {
                            self.advance();
                            s.push('\'');
                        }
                        Some('\\') => {
                            self.advance();
                            s.push('\\');
                        }
                        Some(other) => {
                            self.advance();
                            s.push('\\');
                            s.push(other);
                        }
                        None => s.push('\\'),
                    }
                }
                Some(c) => {
                    self.advance();
                    s.push(c);
                }
            }
        }
        TokenKind::StrLit(s)
    }

    /// Read a whole `<<'NAME'` heredoc as one token: opener, body lines, and
    /// the terminator line through its newline.
    fn read_heredoc_literal(&mut self) -> TokenKind {
        let open_span = self.span_here();
        self.advance();
        self.advance();
        self.advance();
        let delimiter = match self.read_delimited_name('\'') {
            Some(name) => name,
            None => {
                self.diags.push("malformed heredoc opener", Some(open_span));
                self.skip_to_line_end();
                return TokenKind::Unknown('<');
            }
        };
        debug!("heredoc literal opened, terminator `{}`", delimiter);
        if !self.finish_opener_line(&open_span) {
            self.diags.push(
                format!("unterminated heredoc; expected terminator `{}`", delimiter),
                Some(open_span),
            );
            return TokenKind::HeredocLiteral(String::new());
        }
        let mut lines: Vec<String> = Vec::new();
        let mut near_misses: Vec<(String, usize)> = Vec::new();
        let mut margin = 0;
        loop {
            if self.pos >= self.src.len() {
                let hint = nearest_terminator(&delimiter, &near_misses).map(|(word, at)| {
                    format!("line {} reads `{}`; the opener expects `{}`", at, word, delimiter)
                });
                self.diags.push_with_hint(
                    format!("unterminated heredoc; expected terminator `{}`", delimiter),
                    Some(open_span),
                    hint,
                );
                break;
            }
            let text = self.peek_line();
            if text.trim() == delimiter {
                let lead: usize = text.chars().take_while(|c| is_blank(*c)).count();
                let prefix: String = text.chars().take(lead).collect();
                margin = indent_columns(&prefix);
                self.consume_terminator_line();
                break;
            }
            record_near_miss(&mut near_misses, text.trim(), self.line);
            let count = text.chars().count();
            for _ in 0..count {
                self.advance();
            }
            if self.pos < self.src.len() {
                self.consume_line_terminator();
            }
            lines.push(text);
        }
        let mut body = String::new();
        for text in &lines {
            body.push_str(&strip_indent(text, margin));
            body.push('\n');
        }
        TokenKind::HeredocLiteral(body)
    }

    fn read_heredoc_template_start(
        &mut self,
        start: usize,
        line: usize,
        column: usize,
    ) -> TokenKind {
        let open_span = self.span_here();
        self.advance();
        self.advance();
        self.advance();
        let delimiter = match self.read_delimited_name('"') {
            Some(name) => name,
            None => {
                self.diags.push("malformed heredoc opener", Some(open_span));
                self.skip_to_line_end();
                return TokenKind::Unknown('<');
            }
        };
        if !self.finish_opener_line(&open_span) {
            self.diags.push(
                format!("unterminated heredoc; expected terminator `{}`", delimiter),
                Some(open_span),
            );
            return TokenKind::HeredocTemplateStart;
        }
        self.push_frame(FrameKind::Heredoc, Some(delimiter), start, line, column);
        TokenKind::HeredocTemplateStart
    }

    /// Delimiter name between the opener's quotes. `None` when the closing
    /// quote is missing before the line ends or the name is empty.
    fn read_delimited_name(&mut self, quote: char) -> Option<String> {
        let mut name = String::new();
        loop {
            match self.peek() {
                None => return None,
                Some(c) if is_line_terminator(c) => return None,
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some(c) => {
                    name.push(c);
                    self.advance();
                }
            }
        }
        if name.is_empty() { None } else { Some(name) }
    }

    /// Consume the rest of the opener line including its newline. False at
    /// end of input, when no body can follow.
    fn finish_opener_line(&mut self, open_span: &Span) -> bool {
        self.skip_blanks();
        match self.peek() {
            None => false,
            Some(c) if is_line_terminator(c) => {
                self.consume_line_terminator();
                true
            }
            Some(_) => {
                self.diags
                    .push("heredoc opener must end its line", Some(open_span.clone()));
                self.skip_to_line_end();
                if self.pos < self.src.len() {
                    self.consume_line_terminator();
                    true
                } else {
                    false
                }
            }
        }
    }

    fn push_frame(
        &mut self,
        kind: FrameKind,
        delimiter: Option<String>,
        start: usize,
        line: usize,
        column: usize,
    ) {
        debug!(
            "template frame push {:?} depth={} line={}",
            kind,
            self.frames.len() + 1,
            line
        );
        self.frames.push(TemplateFrame {
            kind,
            delimiter,
            parens: 0,
            open_span: Span {
                start,
                end: self.pos,
                line,
                column,
            },
            near_misses: Vec::new(),
        });
    }

    fn pop_frame(&mut self) {
        if let Some(frame) = self.frames.pop() {
            debug!("template frame pop {:?} depth={}", frame.kind, self.frames.len());
        }
    }

    /// True when the rest of the current line, trimmed, equals `delimiter`.
    /// A word-shaped line that does not match is recorded as a near-miss for
    /// the unterminated-heredoc hint.
    fn line_is_terminator(&mut self, delimiter: &str) -> bool {
        let text = self.peek_line();
        if text.trim() == delimiter {
            return true;
        }
        let trimmed = text.trim().to_string();
        let at = self.line;
        if let Some(frame) = self.frames.last_mut() {
            record_near_miss(&mut frame.near_misses, &trimmed, at);
        }
        false
    }

    /// Consume the whole terminator line, newline included, so the heredoc
    /// token itself is what precedes whatever the grammar looks at next.
    fn consume_terminator_line(&mut self) {
        self.skip_to_line_end();
        if self.pos < self.src.len() {
            self.consume_line_terminator();
        }
    }

    fn report_unterminated_frames(&mut self) {
        while let Some(frame) = self.frames.pop() {
            match frame.kind {
                FrameKind::Heredoc => {
                    let delimiter = frame.delimiter.unwrap_or_default();
                    let hint = nearest_terminator(&delimiter, &frame.near_misses).map(
                        |(word, at)| {
                            format!(
                                "line {} reads `{}`; the opener expects `{}`",
                                at, word, delimiter
                            )
                        },
                    );
                    self.diags.push_with_hint(
                        format!("unterminated heredoc; expected terminator `{}`", delimiter),
                        Some(frame.open_span),
                        hint,
                    );
                }
                FrameKind::DoubleQuote => {
                    let message = if frame.parens > 0 {
                        "unterminated interpolation in template string"
                    } else {
                        "unterminated template string"
                    };
                    self.diags.push(message, Some(frame.open_span));
                }
            }
        }
    }

    fn token(
        &self,
        kind: TokenKind,
        channel: Channel,
        start: usize,
        line: usize,
        column: usize,
    ) -> Token {
        Token {
            kind,
            channel,
            span: Span {
                start,
                end: self.pos,
                line,
                column,
            },
            index: 0,
        }
    }

    fn span_here(&self) -> Span {
        Span {
            start: self.pos,
            end: self.pos,
            line: self.line,
            column: self.col,
        }
    }

    fn skip_blanks(&mut self) {
        while let Some(c) = self.peek() {
            if is_blank(c) {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_to_line_end(&mut self) {
        while let Some(c) = self.peek() {
            if is_line_terminator(c) {
                break;
            }
            self.advance();
        }
    }

    /// The rest of the current line, not consumed, without its terminator.
    fn peek_line(&self) -> String {
        let mut text = String::new();
        let mut i = self.pos;
        while let Some(&c) = self.src.get(i) {
            if is_line_terminator(c) {
                break;
            }
            text.push(c);
            i += 1;
        }
        text
    }

    fn at_line_start(&self) -> bool {
        match self.pos.checked_sub(1).and_then(|i| self.src.get(i)) {
            None => true,
            Some(&c) => is_line_terminator(c),
        }
    }

    fn consume_line_terminator(&mut self) {
        if self.peek() == Some('\r') && self.peek_at(1) == Some('\n') {
            self.advance();
        }
        self.advance();
    }

    fn read_number(&mut self) -> String {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '.' {
                s.push(c);
                self.advance();
            } else {
                break;
            }
        }
        s
    }

    fn read_while<F>(&mut self, f: F) -> String
    where
        F: Fn(char) -> bool,
    {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if !f(c) {
                break;
            }
            s.push(c);
            self.advance();
        }
        s
    }

    fn advance(&mut self) {
        let Some(&c) = self.src.get(self.pos) else {
            return;
        };
        self.pos += 1;
        if c == '\n' || c == '\u{2028}' || c == '\u{2029}' {
            self.line += 1;
            self.col = 1;
        } else if c == '\r' {
            // A CR that is part of CRLF defers the line bump to the LF.
            if self.peek() != Some('\n') {
                self.line += 1;
                self.col = 1;
            }
        } else {
            self.col += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.src.get(self.pos + offset).copied()
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn is_blank(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\u{000b}' | '\u{000c}' | '\u{00a0}')
}

fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn record_near_miss(misses: &mut Vec<(String, usize)>, word: &str, line: usize) {
    if word.is_empty() || !word.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return;
    }
    if misses.iter().any(|(w, _)| w == word) {
        return;
    }
    misses.push((word.to_string(), line));
}

/// Column width of a whitespace prefix, tabs expanding to multiples of 8.
fn indent_columns(prefix: &str) -> usize {
    let mut col = 0;
    for c in prefix.chars() {
        if c == '\t' {
            col = (col / 8 + 1) * 8;
        } else {
            col += 1;
        }
    }
    col
}

/// Strip `margin` columns of indentation from a line, expanding tabs to the
/// next multiple of 8. A tab straddling the margin is replaced by the spaces
/// that fall past it.
fn strip_indent(line: &str, margin: usize) -> String {
    if margin == 0 || line.is_empty() {
        return line.to_string();
    }
    let mut col = 0;
    let mut chars = line.chars().peekable();
    while col < margin {
        match chars.peek() {
            Some(&' ') => {
                chars.next();
                col += 1;
            }
            Some(&'\t') => {
                chars.next();
                let next_tab = (col / 8 + 1) * 8;
                if next_tab > margin {
                    let mut rest = " ".repeat(next_tab - margin);
                    rest.extend(chars);
                    return rest;
                }
                col = next_tab;
            }
            _ => break,
        }
    }
    chars.collect()
}

#[cfg(test)]
mod tests {
    use super::{Channel, Keyword, Lexer, Symbol, TokenKind};

    fn kinds(input: &str) -> Vec<TokenKind> {
        let (tokens, diags) = Lexer::new(input).lex_all();
        assert!(diags.is_empty(), "unexpected diagnostics: {:?}", diags.items);
        tokens
            .into_iter()
            .filter(|t| t.channel == Channel::Default)
            .map(|t| t.kind)
            .filter(|k| !matches!(k, TokenKind::Eof))
            .collect()
    }

    fn all_kinds(input: &str) -> Vec<(TokenKind, Channel)> {
        let (tokens, _) = Lexer::new(input).lex_all();
        tokens.into_iter().map(|t| (t.kind, t.channel)).collect()
    }

    #[test]
    fn idents_keywords_and_symbols() {
        assert_eq!(
            kinds("let x = 42"),
            vec![
                TokenKind::Keyword(Keyword::Let),
                TokenKind::Ident("x".to_string()),
                TokenKind::Symbol(Symbol::Eq),
                TokenKind::IntLit("42".to_string()),
            ]
        );
    }

    #[test]
    fn newline_is_a_hidden_line_terminator() {
        let all = all_kinds("a\nb");
        assert_eq!(
            all,
            vec![
                (TokenKind::Ident("a".to_string()), Channel::Default),
                (TokenKind::LineTerminator, Channel::Hidden),
                (TokenKind::Ident("b".to_string()), Channel::Default),
                (TokenKind::Eof, Channel::Default),
            ]
        );
    }

    #[test]
    fn crlf_lexes_as_one_line_terminator() {
        let all = all_kinds("a\r\nb");
        let terminators = all
            .iter()
            .filter(|(k, _)| matches!(k, TokenKind::LineTerminator))
            .count();
        assert_eq!(terminators, 1);
    }

    #[test]
    fn unicode_line_separator_is_a_line_terminator() {
        let all = all_kinds("a\u{2028}b");
        assert!(matches!(all[1].0, TokenKind::LineTerminator));
        assert_eq!(all[1].1, Channel::Hidden);
    }

    #[test]
    fn comments_stay_on_the_hidden_channel() {
        let all = all_kinds("a # trailing words\nb");
        assert_eq!(all[1], (TokenKind::Comment, Channel::Hidden));
        assert!(matches!(all[2].0, TokenKind::LineTerminator));
    }

    #[test]
    fn token_indices_are_contiguous_across_channels() {
        let (tokens, _) = Lexer::new("a # c\nb\n").lex_all();
        for (expected, tok) in tokens.iter().enumerate() {
            assert_eq!(tok.index, expected);
        }
    }

    #[test]
    fn single_quoted_string_with_escapes() {
        assert_eq!(
            kinds(r"'it\'s \\ fine'"),
            vec![TokenKind::StrLit("it's \\ fine".to_string())]
        );
    }

    #[test]
    fn template_with_interpolation() {
        assert_eq!(
            kinds("\"a$(x + 1)b\""),
            vec![
                TokenKind::TemplateStart,
                TokenKind::TemplatePart("a".to_string()),
                TokenKind::InterpOpen,
                TokenKind::Ident("x".to_string()),
                TokenKind::Symbol(Symbol::Plus),
                TokenKind::IntLit("1".to_string()),
                TokenKind::InterpClose,
                TokenKind::TemplatePart("b".to_string()),
                TokenKind::TemplateEnd,
            ]
        );
    }

    #[test]
    fn interpolation_tracks_nested_parens() {
        assert_eq!(
            kinds("\"$(f(1))\""),
            vec![
                TokenKind::TemplateStart,
                TokenKind::InterpOpen,
                TokenKind::Ident("f".to_string()),
                TokenKind::Symbol(Symbol::LParen),
                TokenKind::IntLit("1".to_string()),
                TokenKind::Symbol(Symbol::RParen),
                TokenKind::InterpClose,
                TokenKind::TemplateEnd,
            ]
        );
    }

    #[test]
    fn template_nested_inside_interpolation() {
        assert_eq!(
            kinds("\"x$(\"y\")z\""),
            vec![
                TokenKind::TemplateStart,
                TokenKind::TemplatePart("x".to_string()),
                TokenKind::InterpOpen,
                TokenKind::TemplateStart,
                TokenKind::TemplatePart("y".to_string()),
                TokenKind::TemplateEnd,
                TokenKind::InterpClose,
                TokenKind::TemplatePart("z".to_string()),
                TokenKind::TemplateEnd,
            ]
        );
    }

    #[test]
    fn escaped_dollar_does_not_open_interpolation() {
        assert_eq!(
            kinds("\"a\\$(b\""),
            vec![
                TokenKind::TemplateStart,
                TokenKind::TemplatePart("a$(b".to_string()),
                TokenKind::TemplateEnd,
            ]
        );
    }

    #[test]
    fn heredoc_literal_is_one_token() {
        let src = "let x = <<'END'\nhello\nworld\nEND\n";
        assert_eq!(
            kinds(src),
            vec![
                TokenKind::Keyword(Keyword::Let),
                TokenKind::Ident("x".to_string()),
                TokenKind::Symbol(Symbol::Eq),
                TokenKind::HeredocLiteral("hello\nworld\n".to_string()),
            ]
        );
    }

    #[test]
    fn heredoc_literal_dedents_by_terminator_margin() {
        let src = "<<'END'\n    one\n      two\n    END\n";
        assert_eq!(
            kinds(src),
            vec![TokenKind::HeredocLiteral("one\n  two\n".to_string())]
        );
    }

    #[test]
    fn heredoc_template_emits_start_parts_and_end() {
        let src = "<<\"DOC\"\nhello $(name)!\nDOC\n";
        assert_eq!(
            kinds(src),
            vec![
                TokenKind::HeredocTemplateStart,
                TokenKind::TemplatePart("hello ".to_string()),
                TokenKind::InterpOpen,
                TokenKind::Ident("name".to_string()),
                TokenKind::InterpClose,
                TokenKind::TemplatePart("!\n".to_string()),
                TokenKind::HeredocTemplateEnd,
            ]
        );
    }

    #[test]
    fn heredoc_terminator_validates_against_innermost_frame() {
        let src = "<<\"OUTER\"\na$(<<\"INNER\"\nb\nINNER\n)c\nOUTER\n";
        let found = kinds(src);
        let ends = found
            .iter()
            .filter(|k| matches!(k, TokenKind::HeredocTemplateEnd))
            .count();
        assert_eq!(ends, 2);
        assert!(matches!(found.last(), Some(TokenKind::HeredocTemplateEnd)));
    }

    #[test]
    fn unterminated_heredoc_reports_with_near_miss_hint() {
        let src = "<<'END'\nbody\nENDX\n";
        let (tokens, diags) = Lexer::new(src).lex_all();
        assert!(matches!(tokens[0].kind, TokenKind::HeredocLiteral(_)));
        assert_eq!(diags.items.len(), 1);
        assert!(diags.items[0].message.contains("expected terminator `END`"));
        let hint = diags.items[0].hint.as_deref().unwrap_or("");
        assert!(hint.contains("ENDX"), "hint was: {}", hint);
    }

    #[test]
    fn unterminated_template_string_reports() {
        let (_, diags) = Lexer::new("\"abc").lex_all();
        assert_eq!(diags.items.len(), 1);
        assert!(diags.items[0].message.contains("unterminated template string"));
    }

    #[test]
    fn heredoc_opener_must_end_its_line() {
        let src = "<<'END' junk\nbody\nEND\n";
        let (tokens, diags) = Lexer::new(src).lex_all();
        assert!(diags.items[0].message.contains("must end its line"));
        assert!(matches!(
            tokens[0].kind,
            TokenKind::HeredocLiteral(ref b) if b == "body\n"
        ));
    }

    #[test]
    fn stray_characters_become_unknown_tokens() {
        assert_eq!(kinds("@"), vec![TokenKind::Unknown('@')]);
    }

    #[test]
    fn line_numbers_follow_heredoc_bodies() {
        let src = "<<'E'\na\nb\nE\nx";
        let (tokens, _) = Lexer::new(src).lex_all();
        let x = tokens
            .iter()
            .find(|t| matches!(t.kind, TokenKind::Ident(ref s) if s == "x"))
            .expect("ident x");
        assert_eq!(x.span.line, 5);
    }
}
