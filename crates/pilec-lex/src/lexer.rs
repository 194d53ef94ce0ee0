use std::collections::VecDeque;
use std::rc::Rc;

use pilec_util::{DiagnosticBuilder, Position, Result};

use crate::token::{classify_token, Token, TokenKind};

/// Scans a source file into [`Token`]s, one line at a time.
///
/// Iteration stops as soon as a line fails to scan (an unterminated string);
/// the failing [`Result::Err`] is the last item the iterator yields.
pub struct Lexer<'a> {
    file: Rc<str>,
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    pending: VecDeque<Token>,
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(file: impl Into<Rc<str>>, source: &'a str) -> Self {
        Self {
            file: file.into(),
            lines: source.lines().enumerate(),
            pending: VecDeque::new(),
            done: false,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(Ok(token));
            }
            if self.done {
                return None;
            }
            match self.lines.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some((idx, raw_line)) => {
                    let row = idx as u32 + 1;
                    match lex_line(&self.file, row, raw_line) {
                        Ok(tokens) => self.pending.extend(tokens),
                        Err(err) => {
                            self.done = true;
                            return Some(Err(err));
                        }
                    }
                }
            }
        }
    }
}

/// Find the first index at or after `col` where `pred` holds, or the end of
/// `chars` if it never does.
fn find_col(chars: &[char], mut col: usize, pred: impl Fn(char) -> bool) -> usize {
    while col < chars.len() && !pred(chars[col]) {
        col += 1;
    }
    col
}

/// Comments run to the end of the line starting at the first `//`,
/// including one that happens to fall inside a quoted string — matching the
/// line-oriented reference scanner this is ported from.
fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn lex_line(file: &Rc<str>, row: u32, raw_line: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = strip_comment(raw_line).chars().collect();
    let mut col = find_col(&chars, 0, |c| !c.is_whitespace());
    let mut tokens = Vec::new();

    while col < chars.len() {
        if chars[col] == '"' {
            let end = find_col(&chars, col + 1, |c| c == '"');
            if end >= chars.len() {
                let pos = Position::new(file.clone(), row, col as u32);
                return Err(DiagnosticBuilder::syntax_error(pos, "unterminated string literal")
                    .note("strings must be closed with a matching '\"' on the same line")
                    .build()
                    .into());
            }
            let value: String = chars[col + 1..end].iter().collect();
            let pos = Position::new(file.clone(), row, col as u32);
            tokens.push(Token::new(value, TokenKind::String, pos));
            col = find_col(&chars, end + 1, |c| !c.is_whitespace());
        } else {
            let end = find_col(&chars, col, |c| c.is_whitespace());
            let value: String = chars[col..end].iter().collect();
            let pos = Position::new(file.clone(), row, col as u32);
            let kind = classify_token(&value);
            tokens.push(Token::new(value, kind, pos));
            col = find_col(&chars, end, |c| !c.is_whitespace());
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(source: &str) -> Result<Vec<Token>> {
        Lexer::new("test.pile", source).collect()
    }

    #[test]
    fn classifies_ints_floats_words() {
        let tokens = lex_all("1 2.5 dup +").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TokenKind::Int, TokenKind::Float, TokenKind::Word, TokenKind::Word]
        );
    }

    #[test]
    fn integer_wider_than_i64_is_still_classified_as_int() {
        let tokens = lex_all("123456789012345678901234567890").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Int);
    }

    #[test]
    fn strings_keep_interior_whitespace() {
        let tokens = lex_all(r#""hello world" dump"#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].lexeme, "hello world");
    }

    #[test]
    fn comments_strip_to_end_of_line() {
        let tokens = lex_all("1 2 + // three").unwrap();
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn unterminated_string_is_a_syntax_error() {
        let err = lex_all(r#""never closed"#).unwrap_err();
        assert!(err.to_string().contains("syntax error"));
        assert!(err.to_string().contains("unterminated string literal"));
    }

    #[test]
    fn positions_are_row_and_column_accurate() {
        let tokens = lex_all("  42 foo").unwrap();
        assert_eq!(tokens[0].pos.row, 1);
        assert_eq!(tokens[0].pos.column, 2);
        assert_eq!(tokens[1].pos.column, 5);
    }

    #[test]
    fn rows_are_one_based_across_lines() {
        let tokens = lex_all("1\n2\n3").unwrap();
        let rows: Vec<_> = tokens.iter().map(|t| t.pos.row).collect();
        assert_eq!(rows, vec![1, 2, 3]);
    }
}
