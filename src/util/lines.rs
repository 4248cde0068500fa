use std::fmt;

use crate::token::Span;

/// A 1-based line and column. Columns count characters, not bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Maps byte offsets of a source string to line/column positions.
pub struct LineIndex<'src> {
    src: &'src str,
    /// Byte offset of the start of each line.
    starts: Vec<usize>,
}

impl<'src> LineIndex<'src> {
    pub fn new(src: &'src str) -> LineIndex<'src> {
        let starts = std::iter::once(0)
            .chain(src.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        LineIndex { src, starts }
    }

    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.src.len());
        let line = match self.starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let start = self.starts[line];
        let column = self.src[start..offset].chars().count() + 1;
        Position {
            line: u32::try_from(line + 1).unwrap_or(u32::MAX),
            column: u32::try_from(column).unwrap_or(u32::MAX),
        }
    }

    pub fn span_start(&self, span: Span) -> Position {
        self.position(span.lo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions() {
        let src = "int x = 1;\n\n  é = 2;\n";
        let index = LineIndex::new(src);
        let pos = |line, column| Position { line, column };

        assert_eq!(index.position(0), pos(1, 1));
        assert_eq!(index.position(4), pos(1, 5));
        assert_eq!(index.position(10), pos(1, 11));
        assert_eq!(index.position(11), pos(2, 1));
        assert_eq!(index.position(12), pos(3, 1));
        // `é` is two bytes wide, but a single column.
        assert_eq!(index.position(16), pos(3, 4));
        assert_eq!(index.position(src.len()), pos(4, 1));
    }
}
