use std::fmt;

use crate::token::TokenKind;

/// The closed set of Plasma types. Type equality is nominal: there are no
/// implicit conversions between any two of them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Float,
    Str,
    Bool,
    Void,
}

impl Type {
    /// Maps a type keyword token into its type.
    pub fn from_keyword(kind: &TokenKind) -> Option<Type> {
        let ty = match kind {
            TokenKind::Int => Type::Int,
            TokenKind::Float => Type::Float,
            TokenKind::Str => Type::Str,
            TokenKind::Bool => Type::Bool,
            TokenKind::Void => Type::Void,
            _ => return None,
        };
        Some(ty)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    pub fn name(self) -> &'static str {
        match self {
            Type::Int => "int",
            Type::Float => "float",
            Type::Str => "str",
            Type::Bool => "bool",
            Type::Void => "void",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
