//! Source location tracking.
//!
//! A [`Position`] is the `(file, row, column)` triple every token and
//! diagnostic anchors to: row is 1-based, column is 0-based within the
//! original source line (matching `find_col` in the reference lexer).

use std::fmt;
use std::rc::Rc;

/// A source position: file name, 1-based row, 0-based column.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub file: Rc<str>,
    pub row: u32,
    pub column: u32,
}

impl Position {
    #[inline]
    pub fn new(file: impl Into<Rc<str>>, row: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            row,
            column,
        }
    }

    /// A dummy position for tests and tokens with no real source origin.
    pub fn dummy() -> Self {
        Self::new("<dummy>", 0, 0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.row, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_diagnostic_header_format() {
        let pos = Position::new("main.pile", 3, 7);
        assert_eq!(pos.to_string(), "main.pile:3:7");
    }

    #[test]
    fn dummy_is_stable() {
        assert_eq!(Position::dummy(), Position::dummy());
    }
}
