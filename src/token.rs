use std::{fmt, ops::Range};

use crate::lexer;

#[derive(Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    lo: usize,
    len: u32,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Token {
        Token {
            kind,
            len: span.len,
            lo: span.lo,
        }
    }

    pub fn span(&self) -> Span {
        Span {
            len: self.len,
            lo: self.lo,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Whether the lexer stops producing meaningful tokens after this one.
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, TokenKind::Eof | TokenKind::Error(_))
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({:?}, {})", self.kind, self.span())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    pub len: u32,
    pub lo: usize,
}

impl Span {
    pub fn new_of_bounds(Range { start: lo, end: hi }: Range<usize>) -> Span {
        debug_assert!(hi >= lo);
        Self::new_of_length(lo, u32::try_from(hi - lo).unwrap_or(u32::MAX))
    }

    pub fn new_of_length(lo: usize, len: u32) -> Span {
        Span { len, lo }
    }

    pub fn hi(&self) -> usize {
        self.lo + self.len as usize
    }

    /// Returns a span which starts at `self` and ends at `other`.
    pub fn to(self, other: Span) -> Span {
        Span::new_of_bounds(self.lo..other.hi().max(self.lo))
    }

    pub fn wrap<T>(self, inner: T) -> Spanned<T> {
        Spanned { span: self, inner }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({self}, len: {})", self.len)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lo = self.lo;
        let hi = self.hi();
        write!(f, "{lo}..{hi}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Spanned<T> {
    pub span: Span,
    pub inner: T,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Int,
    Float,
    Str,
    Bool,
    Void,
    If,
    Elif,
    Else,
    While,
    For,
    In,
    Range,
    Return,
    Pass,
    Not,

    True,
    False,

    Plus,
    Minus,
    Star,
    Slash,
    EqEq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    /// `=`
    Assign,
    Colon,
    Semicolon,
    Comma,
    LParen,
    RParen,

    Identifier(Box<str>),
    IntLiteral(i64),
    FloatLiteral(f64),
    StrLiteral(Box<str>),

    Newline,
    Indent,
    Dedent,
    Eof,
    Error(lexer::Error),
}

impl TokenKind {
    /// Whether this token names one of the primitive types.
    pub fn is_type(&self) -> bool {
        use TokenKind::*;
        matches!(self, Int | Float | Str | Bool | Void)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TokenKind::*;
        let symbol = match self {
            Int => "int",
            Float => "float",
            Str => "str",
            Bool => "bool",
            Void => "void",
            If => "if",
            Elif => "elif",
            Else => "else",
            While => "while",
            For => "for",
            In => "in",
            Range => "range",
            Return => "return",
            Pass => "pass",
            Not => "not",
            True => "true",
            False => "false",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            EqEq => "==",
            NotEq => "!=",
            Less => "<",
            LessEq => "<=",
            Greater => ">",
            GreaterEq => ">=",
            Assign => "=",
            Colon => ":",
            Semicolon => ";",
            Comma => ",",
            LParen => "(",
            RParen => ")",
            Identifier(name) => return write!(f, "identifier `{name}`"),
            IntLiteral(value) => return write!(f, "integer `{value}`"),
            FloatLiteral(value) => return write!(f, "float `{value:?}`"),
            StrLiteral(value) => return write!(f, "string {value:?}"),
            Newline => return f.write_str("end of line"),
            Indent => return f.write_str("indent"),
            Dedent => return f.write_str("dedent"),
            Eof => return f.write_str("end of file"),
            Error(_) => return f.write_str("invalid token"),
        };
        write!(f, "`{symbol}`")
    }
}

pub static KEYWORDS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "int" => TokenKind::Int,
    "float" => TokenKind::Float,
    "str" => TokenKind::Str,
    "bool" => TokenKind::Bool,
    "void" => TokenKind::Void,
    "if" => TokenKind::If,
    "elif" => TokenKind::Elif,
    "else" => TokenKind::Else,
    "while" => TokenKind::While,
    "for" => TokenKind::For,
    "in" => TokenKind::In,
    "range" => TokenKind::Range,
    "return" => TokenKind::Return,
    "pass" => TokenKind::Pass,
    "not" => TokenKind::Not,
    "true" => TokenKind::True,
    "false" => TokenKind::False,
};
