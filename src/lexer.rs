use std::{collections::VecDeque, iter::Peekable, ops::Range};

use crate::{
    token::{Span, Spanned, Token, TokenKind, KEYWORDS},
    util::BreakableIteratorExt,
};

/// Tab characters advance the indentation width to the next multiple of this.
pub const TAB_WIDTH: u32 = 8;

/// Lexes the whole source, stopping at the first lexical error.
///
/// The returned buffer always ends with a [`TokenKind::Eof`] token.
pub fn lex(src: &str) -> Result<Vec<Token>, Spanned<Error>> {
    let mut tokens = Vec::with_capacity(src.len() / 3 + 8);
    for token in Lexer::new(src).up_to(Token::is_terminal) {
        let span = token.span();
        match token.kind {
            TokenKind::Error(error) => return Err(span.wrap(error)),
            _ => tokens.push(token),
        }
    }
    Ok(tokens)
}

/// The Plasma lexer.
///
/// Produces tokens lazily. Once the end of input (or an error) is reached, the
/// iterator keeps yielding [`TokenKind::Eof`], so callers decide where to stop
/// (see [`Token::is_terminal`]). Lexing is restartable: a fresh [`Lexer::new`]
/// over the same source yields the same tokens.
#[derive(Clone)]
pub struct Lexer<'src> {
    src: &'src str,
    iter: Peekable<std::str::Chars<'src>>,
    cursor: usize,
    current_lo: usize,
    /// Indentation widths of the enclosing blocks, never empty.
    indents: Vec<u32>,
    /// Tokens already produced but not yet yielded (dedent runs, end of input).
    pending: VecDeque<Token>,
    at_line_start: bool,
    /// Parenthesis nesting; line breaks are insignificant while non-zero.
    depth: u32,
    finished: bool,
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if let Some(token) = self.pending.pop_front() {
            return Some(token);
        }
        if self.finished {
            let eof = Span::new_of_length(self.src.len(), 0);
            return Some(Token::new(TokenKind::Eof, eof));
        }
        Some(self.scan())
    }
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src str) -> Lexer<'src> {
        Lexer {
            src,
            iter: src.chars().peekable(),
            cursor: 0,
            current_lo: 0,
            indents: vec![0],
            pending: VecDeque::new(),
            at_line_start: true,
            depth: 0,
            finished: false,
        }
    }
}

impl Lexer<'_> {
    fn scan(&mut self) -> Token {
        if self.at_line_start && self.depth == 0 {
            if let Some(token) = self.indentation() {
                return token;
            }
        }
        self.skip_trivia();
        let kind = self.scan_token_kind();
        self.produce(kind)
    }

    /// Tries to scan the current character.
    fn scan_token_kind(&mut self) -> TokenKind {
        use TokenKind::*;
        match self.mark_advance() {
            '\0' if self.cursor == self.current_lo => self.end_of_input(),
            '\n' => {
                self.at_line_start = true;
                Newline
            }
            '+' => Plus,
            '-' => Minus,
            '*' => Star,
            '/' => Slash,
            '=' => match self.peek() {
                '=' => self.advance_with(EqEq),
                _ => Assign,
            },
            '!' => match self.peek() {
                '=' => self.advance_with(NotEq),
                _ => Error(self::Error::UnexpectedChar('!')),
            },
            '<' => match self.peek() {
                '=' => self.advance_with(LessEq),
                _ => Less,
            },
            '>' => match self.peek() {
                '=' => self.advance_with(GreaterEq),
                _ => Greater,
            },
            ':' => Colon,
            ';' => Semicolon,
            ',' => Comma,
            '(' => {
                self.depth += 1;
                LParen
            }
            ')' => {
                self.depth = self.depth.saturating_sub(1);
                RParen
            }
            '"' => self.string(),
            c if c.is_ascii_alphabetic() || c == '_' => self.identifier_or_keyword(),
            c if c.is_ascii_digit() => self.number(),
            c => Error(self::Error::UnexpectedChar(c)),
        }
    }

    /// Measures the leading whitespace of the next non-blank line and produces
    /// the indent or dedent tokens it implies.
    ///
    /// Blank and comment-only lines are consumed without any effect on the
    /// indentation stack.
    fn indentation(&mut self) -> Option<Token> {
        let width = loop {
            let mut width = 0;
            loop {
                match self.peek() {
                    ' ' => width += 1,
                    '\t' => width = (width / TAB_WIDTH + 1) * TAB_WIDTH,
                    _ => break,
                }
                self.advance();
            }
            match self.peek() {
                '\n' | '\r' => {
                    self.advance();
                }
                '/' if self.rest().starts_with("//") => self.comment(),
                // The end of input is handled by the regular scanner.
                '\0' if self.cursor >= self.src.len() => return None,
                _ => break width,
            }
        };
        self.at_line_start = false;

        let span = Span::new_of_length(self.cursor, 0);
        let top = self.top_indent();
        if width > top {
            self.indents.push(width);
            return Some(Token::new(TokenKind::Indent, span));
        }
        while self.top_indent() > width {
            self.indents.pop();
            self.pending.push_back(Token::new(TokenKind::Dedent, span));
        }
        if self.top_indent() != width {
            self.pending.clear();
            self.finished = true;
            let error = TokenKind::Error(Error::InconsistentDedent);
            return Some(Token::new(error, span));
        }
        self.pending.pop_front()
    }

    fn end_of_input(&mut self) -> TokenKind {
        let span = Span::new_of_length(self.src.len(), 0);
        if !self.at_line_start {
            self.at_line_start = true;
            self.pending.push_back(Token::new(TokenKind::Newline, span));
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            self.pending.push_back(Token::new(TokenKind::Dedent, span));
        }
        self.finished = true;
        self.pending.push_back(Token::new(TokenKind::Eof, span));
        self.pending
            .pop_front()
            .map_or(TokenKind::Eof, |token| token.kind)
    }

    /// Skips spaces, comments, and (inside parentheses) line breaks.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '\n' if self.depth > 0 => {
                    self.advance();
                }
                '/' if self.rest().starts_with("//") => self.comment(),
                _ => break,
            }
        }
    }

    /// Skips a `//` comment, leaving the line break (if any) unconsumed.
    fn comment(&mut self) {
        loop {
            match self.peek() {
                '\n' => break,
                '\0' if self.cursor >= self.src.len() => break,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Lexes a string literal. There are no escape sequences: the literal ends
    /// at the next quotation mark, line breaks included.
    fn string(&mut self) -> TokenKind {
        loop {
            match self.advance() {
                '"' => return TokenKind::StrLiteral(self.substr_bounded(1, -1).into()),
                '\0' if self.cursor >= self.src.len() => {
                    return TokenKind::Error(Error::UnterminatedString);
                }
                _ => (),
            }
        }
    }

    fn identifier_or_keyword(&mut self) -> TokenKind {
        let valid_identifier_suffix = |c: char| c.is_ascii_alphanumeric() || c == '_';
        while valid_identifier_suffix(self.peek()) {
            self.advance();
        }
        let substr = self.substr();
        match KEYWORDS.get(substr).cloned() {
            Some(keyword) => keyword,
            None => TokenKind::Identifier(substr.into()),
        }
    }

    fn number(&mut self) -> TokenKind {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        let is_decimal = self.peek() == '.'
            && self.rest()[1..].starts_with(|c: char| c.is_ascii_digit());
        if is_decimal {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
            return match self.substr().parse::<f64>() {
                Ok(value) if value.is_finite() => TokenKind::FloatLiteral(value),
                _ => TokenKind::Error(Error::InvalidNumber),
            };
        }
        match self.substr().parse() {
            Ok(value) => TokenKind::IntLiteral(value),
            Err(_) => TokenKind::Error(Error::InvalidNumber),
        }
    }
}

impl Lexer<'_> {
    /// Starts a new token "mark" and advances the iterator.
    fn mark_advance(&mut self) -> char {
        self.current_lo = self.cursor;
        self.advance()
    }

    /// Returns the next character and advances the iterator.
    fn advance(&mut self) -> char {
        self.iter
            .next()
            .inspect(|c| self.cursor += c.len_utf8())
            .unwrap_or('\0')
    }

    /// Advances and returns the provided value.
    fn advance_with<T>(&mut self, value: T) -> T {
        self.advance();
        value
    }

    /// Returns the next character without advancing the iterator.
    fn peek(&mut self) -> char {
        self.iter.peek().copied().unwrap_or('\0')
    }

    /// Returns the unconsumed part of the source.
    fn rest(&self) -> &str {
        &self.src[self.cursor..]
    }

    fn top_indent(&self) -> u32 {
        self.indents.last().copied().unwrap_or(0)
    }

    /// Returns the current range.
    fn range(&self) -> Range<usize> {
        self.current_lo..self.cursor
    }

    /// Returns the substring of the current marked bounds.
    fn substr(&self) -> &str {
        &self.src[self.range()]
    }

    /// Returns a substring with custom bounds increments.
    ///
    /// Callers must ensure the adjusted bounds stay within the current token.
    fn substr_bounded(&self, lo: usize, hi: isize) -> &str {
        let Range { start, end } = self.range();
        let end = end.saturating_add_signed(hi);
        &self.src[start + lo..end]
    }

    /// Produces a token using the marked bounds.
    fn produce(&mut self, kind: TokenKind) -> Token {
        if matches!(kind, TokenKind::Error(_)) {
            self.pending.clear();
            self.finished = true;
        }
        Token::new(kind, Span::new_of_bounds(self.range()))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    UnexpectedChar(char),
    UnterminatedString,
    /// A dedent to a width that no enclosing block was indented to.
    InconsistentDedent,
    /// A numeric literal that doesn't fit its type.
    InvalidNumber,
}

impl Error {
    pub fn code(self) -> &'static str {
        match self {
            Error::UnexpectedChar(_) => "UnexpectedChar",
            Error::UnterminatedString => "UnterminatedString",
            Error::InconsistentDedent => "InconsistentDedent",
            Error::InvalidNumber => "InvalidNumber",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn kinds(src: &str) -> Vec<TokenKind> {
        lex(src)
            .expect("failed to lex")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Identifier(name.into())
    }

    #[test]
    fn tests_with_span() {
        use TokenKind::*;
        let cases = cases!(match .. {
            "int x = 42;" => [
                (Int, 0..3),
                (ident("x"), 4..5),
                (Assign, 6..7),
                (IntLiteral(42), 8..10),
                (Semicolon, 10..11),
                (Newline, 11..11),
                (Eof, 11..11),
            ],
            "void f():\n    pass;\n" => [
                (Void, 0..4),
                (ident("f"), 5..6),
                (LParen, 6..7),
                (RParen, 7..8),
                (Colon, 8..9),
                (Newline, 9..10),
                (Indent, 14..14),
                (Pass, 14..18),
                (Semicolon, 18..19),
                (Newline, 19..20),
                (Dedent, 20..20),
                (Eof, 20..20),
            ],
            "a<=b>=c!=d==e<f>g" => [
                (ident("a"), 0..1),
                (LessEq, 1..3),
                (ident("b"), 3..4),
                (GreaterEq, 4..6),
                (ident("c"), 6..7),
                (NotEq, 7..9),
                (ident("d"), 9..10),
                (EqEq, 10..12),
                (ident("e"), 12..13),
                (Less, 13..14),
                (ident("f"), 14..15),
                (Greater, 15..16),
                (ident("g"), 16..17),
                (Newline, 17..17),
                (Eof, 17..17),
            ],
            r#"str s = "hi there";"# => [
                (Str, 0..3),
                (ident("s"), 4..5),
                (Assign, 6..7),
                (StrLiteral("hi there".into()), 8..18),
                (Semicolon, 18..19),
                (Newline, 19..19),
                (Eof, 19..19),
            ],
        });

        for (input, tokens) in cases {
            let lexed = lex(input).expect("failed to lex");
            assert_eq!(&lexed, tokens);
        }
    }

    #[test]
    fn test_literals() {
        use TokenKind::*;
        assert_eq!(
            kinds("1 007 3.25 0.5 true false"),
            [
                IntLiteral(1),
                IntLiteral(7),
                FloatLiteral(3.25),
                FloatLiteral(0.5),
                True,
                False,
                Newline,
                Eof,
            ]
        );
        // A trailing dot does not make a decimal.
        assert_eq!(
            lex("1.").unwrap_err(),
            Span::new_of_length(1, 1).wrap(super::Error::UnexpectedChar('.'))
        );
    }

    #[test]
    fn test_keywords_and_identifiers() {
        use TokenKind::*;
        assert_eq!(
            kinds("for i in range elif _tmp x1 Int"),
            [
                For,
                ident("i"),
                In,
                Range,
                Elif,
                ident("_tmp"),
                ident("x1"),
                ident("Int"),
                Newline,
                Eof,
            ]
        );
    }

    #[test]
    fn test_nested_blocks() {
        use TokenKind::*;
        let src = indoc! {"
            void f():
                if true:
                    pass;
                pass;
        "};
        assert_eq!(
            kinds(src),
            [
                Void,
                ident("f"),
                LParen,
                RParen,
                Colon,
                Newline,
                Indent,
                If,
                True,
                Colon,
                Newline,
                Indent,
                Pass,
                Semicolon,
                Newline,
                Dedent,
                Pass,
                Semicolon,
                Newline,
                Dedent,
                Eof,
            ]
        );
    }

    #[test]
    fn test_blank_and_comment_lines_are_skipped() {
        use TokenKind::*;
        let src = "void f():\n\n      // deeper comment\n    pass; // trailing\n// top comment\n\n";
        assert_eq!(
            kinds(src),
            [
                Void,
                ident("f"),
                LParen,
                RParen,
                Colon,
                Newline,
                Indent,
                Pass,
                Semicolon,
                Newline,
                Dedent,
                Eof,
            ]
        );
    }

    #[test]
    fn test_comments_may_contain_nul() {
        use TokenKind::*;
        assert_eq!(
            kinds("pass; // a\0b\n// \0\npass; // end\0"),
            [Pass, Semicolon, Newline, Pass, Semicolon, Newline, Eof]
        );
    }

    #[test]
    fn test_line_breaks_inside_parentheses() {
        use TokenKind::*;
        let src = "int x = f(1,\n        2);\n";
        assert_eq!(
            kinds(src),
            [
                Int,
                ident("x"),
                Assign,
                ident("f"),
                LParen,
                IntLiteral(1),
                Comma,
                IntLiteral(2),
                RParen,
                Semicolon,
                Newline,
                Eof,
            ]
        );
    }

    #[test]
    fn test_indents_balance_dedents() {
        let src = indoc! {"
            int f(int n):
                while n > 0:
                    if n == 1:
                        return 1;
                    n = n - 1;
                return 0;
            int g():
                return 2;
        "};
        let tokens = kinds(src);
        let indents = tokens.iter().filter(|k| **k == TokenKind::Indent).count();
        let dedents = tokens.iter().filter(|k| **k == TokenKind::Dedent).count();
        assert_eq!(indents, 4);
        assert_eq!(indents, dedents);
    }

    #[test]
    fn test_lexing_is_restartable() {
        let src = "void f():\n    int x = 1;\n    x = x + 2;\n";
        let first: Vec<_> = Lexer::new(src).up_to(Token::is_terminal).collect();
        let second: Vec<_> = Lexer::new(src).up_to(Token::is_terminal).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut lexer = Lexer::new("x");
        let kinds: Vec<_> = lexer.by_ref().take(4).map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            [ident("x"), TokenKind::Newline, TokenKind::Eof, TokenKind::Eof]
        );
    }

    #[test]
    fn test_inconsistent_dedent() {
        let src = "void f():\n    if true:\n        pass;\n  pass;\n";
        assert_eq!(
            lex(src).unwrap_err(),
            Span::new_of_length(39, 0).wrap(Error::InconsistentDedent)
        );
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            lex("int x = 1 $ 2;").unwrap_err(),
            Span::new_of_length(10, 1).wrap(Error::UnexpectedChar('$'))
        );
        assert_eq!(
            lex("str s = \"open\nstill open").unwrap_err(),
            Span::new_of_length(8, 16).wrap(Error::UnterminatedString)
        );
        assert_eq!(
            lex("int x = 99999999999999999999;").unwrap_err(),
            Span::new_of_length(8, 20).wrap(Error::InvalidNumber)
        );
        assert_eq!(
            lex("bool b = a ! c;").unwrap_err(),
            Span::new_of_length(11, 1).wrap(Error::UnexpectedChar('!'))
        );
    }

    #[test]
    fn test_error_stops_the_stream() {
        let tokens: Vec<_> = Lexer::new("a $ b").take(4).map(|t| t.kind).collect();
        assert_eq!(
            tokens,
            [
                ident("a"),
                TokenKind::Error(Error::UnexpectedChar('$')),
                TokenKind::Eof,
                TokenKind::Eof,
            ]
        );
    }

    macro_rules! cases {
        (match .. {
            $($str:expr => [$(($kind:expr, $range:expr)),* $(,)?]),* $(,)?
        }) => {{
            &[$((
                $str,
                vec![
                    $(Token::new($kind, Span::new_of_bounds($range.start..$range.end))),*
                ],
            )),*]
        }};
    }
    use cases;
}
