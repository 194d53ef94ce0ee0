//! Token types produced by the [`Lexer`](crate::Lexer).

use pilec_util::Position;

/// The classification a lexeme was assigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Int,
    Float,
    String,
    Word,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TokenKind::Int => "int",
            TokenKind::Float => "float",
            TokenKind::String => "string",
            TokenKind::Word => "word",
        };
        f.write_str(s)
    }
}

/// A single lexeme together with its classification and source position.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub lexeme: String,
    pub kind: TokenKind,
    pub pos: Position,
}

impl Token {
    pub fn new(lexeme: impl Into<String>, kind: TokenKind, pos: Position) -> Self {
        Self {
            lexeme: lexeme.into(),
            kind,
            pos,
        }
    }
}

/// Classify a whitespace-delimited word: integers and floats parse via
/// their standard Rust literal grammar; anything else is a bare word.
///
/// Integer-ness is checked on the lexeme's shape (an optional sign followed
/// by only ASCII digits), not by whether it fits in an `i64` — the
/// reference classifies against Python's arbitrary-precision `int()`, so a
/// literal with more digits than `i64` can hold (e.g. a 25-digit constant)
/// is still an `Int` token here, not a `Float`. How such a value is
/// represented once it reaches IR emission is a separate, later concern.
pub fn classify_token(text: &str) -> TokenKind {
    if looks_like_int(text) {
        TokenKind::Int
    } else if text.parse::<f64>().is_ok() {
        TokenKind::Float
    } else {
        TokenKind::Word
    }
}

fn looks_like_int(text: &str) -> bool {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
