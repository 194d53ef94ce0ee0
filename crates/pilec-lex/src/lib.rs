//! pilec-lex - Lexical analysis for Pile source.
//!
//! ============================================================================
//! LEXICAL ANALYSIS
//! ============================================================================
//!
//! Lexing is the first phase of compilation: it turns a stream of characters
//! into a stream of tokens. Formally, the lexer is a function
//!
//!   L: Σ* → T*
//!
//! where Σ is the source alphabet and T is the set of tokens. Pile's grammar
//! has no precedence, no nesting, and no multi-character operators beyond
//! the reserved words, so the lexer doesn't need a state-transition table or
//! lookahead beyond "read one whitespace-delimited chunk" — it is a
//! direct-coded, single-pass, line-at-a-time scanner.
//!
//! ============================================================================
//! TOKEN CATEGORIES
//! ============================================================================
//!
//! Pile has exactly four token kinds ([`TokenKind`]), no keyword table:
//!
//! - INT — a lexeme that parses as an integer literal: `42`, `-7`
//! - FLOAT — a lexeme that parses as a float literal once int parsing has
//!   failed: `3.14`, `-0.5`
//! - STRING — a double-quoted run, `"like this"`, closed on the same line
//!   (an unclosed quote is a lexer error, not silently misparsed — see
//!   `pilec_util::ErrorKind::SyntaxError`)
//! - WORD — everything else: operators (`+`, `>`, `!`), control words
//!   (`if`, `while`, `do`, `else`, `end`) and stack words (`dup`, `drop`,
//!   `swap`, `over`, `rot`, `dump`) are all `Word` tokens at this phase;
//!   which one a given word *means* is entirely pilec_par's job — the
//!   lexer does no keyword lookup at all.
//!
//! Classification ([`crate::token::classify_token`]) is int-then-float-then-
//! word, exactly mirroring the reference scanner: a lexeme is an `Int` if it
//! parses as one, else a `Float` if it parses as one, else a bare `Word`.
//!
//! ============================================================================
//! WORKED EXAMPLE
//! ============================================================================
//!
//! ```text
//! Source (one line): 2 3 + dump // add and print
//!
//! Comment-stripped:  2 3 + dump
//! Lexemes:           "2"  "3"  "+"  "dump"
//! Tokens:            Int(2)  Int(3)  Word("+")  Word("dump")
//!                     each tagged with (file, row, column)
//! ```
//!
//! ============================================================================
//! POSITION TRACKING
//! ============================================================================
//!
//! Every token carries a [`Position`](pilec_util::Position): file name,
//! 1-based row, 0-based column of the lexeme's first character within its
//! source line. Diagnostics anchor to this triple so `pilec: error at
//! file:row:col:` can point exactly at the offending token.

mod lexer;
mod token;

pub use lexer::Lexer;
pub use token::{Token, TokenKind};
