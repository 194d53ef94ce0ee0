//! Type checking and structured-control-flow validation.
//!
//! The parser walks the token stream exactly once. It keeps two stacks:
//! a *type stack* mirroring the values the generated program will push and
//! pop at runtime, and a *block stack* tracking which `if`/`while` control
//! structure is currently open. Every token becomes one [`Node`]; the type
//! and block stacks are pure bookkeeping used only to catch errors early.

use pilec_lex::{Token, TokenKind};
use pilec_util::{CompileError, DiagnosticBuilder, Position, Result};

use crate::node::{Node, TypeTag};

const BINOP: &[(TypeTag, usize)] = &[(TypeTag::Integer, 2), (TypeTag::Float, 2)];
const TEROP: &[(TypeTag, usize)] = &[(TypeTag::Integer, 3), (TypeTag::Float, 3)];
const UNOP: &[(TypeTag, usize)] = &[
    (TypeTag::Integer, 1),
    (TypeTag::Float, 1),
    (TypeTag::String, 1),
    (TypeTag::Bool, 1),
];
const BITWISE: &[(TypeTag, usize)] = &[(TypeTag::Integer, 2), (TypeTag::Bool, 2)];
const SHIFT: &[(TypeTag, usize)] = &[(TypeTag::Integer, 2)];
const BOOL_ONLY: &[(TypeTag, usize)] = &[(TypeTag::Bool, 1)];

/// What an operator pushes back onto the type stack after it is checked.
enum OpResult {
    /// Push `n` copies of the value that was on top before the pop.
    Keep(usize),
    /// Push a single value of a fixed type, ignoring the popped ones.
    Fixed(TypeTag),
    /// Push nothing.
    Discard,
}

/// The kind of structured block currently open, tracked on the block stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BlockKind {
    If,
    While,
    Do,
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BlockKind::If => "if",
            BlockKind::While => "while",
            BlockKind::Do => "do",
        };
        f.write_str(s)
    }
}

/// Type-checks a token stream, yielding one [`Node`] per token.
///
/// Consuming the iterator to completion performs the end-of-program checks
/// (unterminated blocks, leftover stack values) as one final item.
pub struct Parser<I> {
    tokens: I,
    types: Vec<TypeTag>,
    blocks: Vec<BlockKind>,
    last_pos: Option<Position>,
    finished: bool,
}

impl<I> Parser<I> {
    pub fn new(tokens: I) -> Self {
        Self {
            tokens,
            types: Vec::new(),
            blocks: Vec::new(),
            last_pos: None,
            finished: false,
        }
    }
}

impl<I: Iterator<Item = Result<Token>>> Iterator for Parser<I> {
    type Item = Result<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.tokens.next() {
            Some(Ok(token)) => {
                self.last_pos = Some(token.pos.clone());
                match self.process(&token) {
                    Ok(()) => Some(Ok(Node::new(token))),
                    Err(err) => {
                        self.finished = true;
                        Some(Err(err))
                    }
                }
            }
            Some(Err(err)) => {
                self.finished = true;
                Some(Err(err))
            }
            None => {
                self.finished = true;
                self.finalize().map(Err)
            }
        }
    }
}

impl<I> Parser<I> {
    fn process(&mut self, token: &Token) -> Result<()> {
        match token.kind {
            TokenKind::Int => {
                self.types.push(TypeTag::Integer);
                return Ok(());
            }
            TokenKind::Float => {
                self.types.push(TypeTag::Float);
                return Ok(());
            }
            TokenKind::String => {
                self.types.push(TypeTag::String);
                return Ok(());
            }
            TokenKind::Word => {}
        }

        match token.lexeme.as_str() {
            "+" | "-" | "*" | "/" | "%" => self.check_op(token, BINOP, OpResult::Keep(1)),
            ">" | "<" | ">=" | "<=" | "!=" | "=" => {
                self.check_op(token, BINOP, OpResult::Fixed(TypeTag::Bool))
            }
            "|" | "&" => self.check_op(token, BITWISE, OpResult::Keep(1)),
            ">>" | "<<" => self.check_op(token, SHIFT, OpResult::Keep(1)),
            "!" => self.check_op(token, UNOP, OpResult::Keep(1)),
            "drop" => self.check_op(token, UNOP, OpResult::Discard),
            "dup" => self.check_op(token, UNOP, OpResult::Keep(2)),
            "swap" => self.check_op(token, BINOP, OpResult::Keep(2)),
            "over" => self.check_op(token, BINOP, OpResult::Keep(3)),
            "rot" => self.check_op(token, TEROP, OpResult::Keep(3)),
            "dump" => self.check_op(token, UNOP, OpResult::Discard),
            "if" => {
                self.check_op(token, BOOL_ONLY, OpResult::Discard)?;
                self.blocks.push(BlockKind::If);
                Ok(())
            }
            "while" => {
                self.blocks.push(BlockKind::While);
                Ok(())
            }
            "else" => match self.blocks.last() {
                Some(BlockKind::If) => Ok(()),
                Some(other) => Err(syntax_error(
                    token.pos.clone(),
                    format!("`{}` block does not support else", other),
                )),
                None => Err(syntax_error(
                    token.pos.clone(),
                    "started `else` block without a proper beginning.",
                )),
            },
            "do" => {
                self.check_op(token, BOOL_ONLY, OpResult::Discard)?;
                match self.blocks.pop() {
                    Some(BlockKind::While) => {
                        self.blocks.push(BlockKind::Do);
                        Ok(())
                    }
                    Some(other) => Err(syntax_error(
                        token.pos.clone(),
                        format!("started `do` block using `{}` instead of `while`", other),
                    )),
                    None => Err(syntax_error(
                        token.pos.clone(),
                        "started `do` block without `while` first",
                    )),
                }
            }
            "end" => {
                if self.blocks.pop().is_none() {
                    return Err(syntax_error(token.pos.clone(), "block ended without a beginning"));
                }
                Ok(())
            }
            // Anything else is a bare word: whether it names a real
            // operation is a question for code generation, not parsing.
            _ => Ok(()),
        }
    }

    fn check_op(&mut self, token: &Token, expected: &[(TypeTag, usize)], result: OpResult) -> Result<()> {
        let arity = expected[0].1;
        if self.types.len() < arity {
            let plural = if arity > 1 { "s" } else { "" };
            let got = if self.types.is_empty() {
                "no".to_string()
            } else {
                self.types.len().to_string()
            };
            return Err(DiagnosticBuilder::stack_underflow(
                token.pos.clone(),
                format!(
                    "`{}` operation needs {} stack value{} to be performed but got {} values",
                    token.lexeme, arity, plural, got
                ),
            )
            .build()
            .into());
        }

        let popped: Vec<TypeTag> = (0..arity).map(|_| self.types.pop().unwrap()).collect();
        let matches = expected
            .iter()
            .any(|(ty, n)| *n == arity && popped.iter().all(|p| p == ty));

        if !matches {
            let plural = if arity > 1 { "s" } else { "" };
            let values = popped.iter().map(|t| t.name()).collect::<Vec<_>>().join(", ");
            let expected_str = expected
                .iter()
                .map(|(ty, n)| format!("({})", vec![ty.name(); *n].join(", ")))
                .collect::<Vec<_>>()
                .join(" or ");
            return Err(DiagnosticBuilder::type_mismatch(
                token.pos.clone(),
                format!(
                    "`{}` operation got mismatched type{} ({}) but operation expects {}",
                    token.lexeme, plural, values, expected_str
                ),
            )
            .build()
            .into());
        }

        match result {
            OpResult::Keep(count) => {
                for _ in 0..count {
                    self.types.push(popped[0]);
                }
            }
            OpResult::Fixed(ty) => self.types.push(ty),
            OpResult::Discard => {}
        }
        Ok(())
    }

    fn finalize(&mut self) -> Option<CompileError> {
        let pos = self.last_pos.clone()?;

        if let Some(block) = self.blocks.pop() {
            return Some(
                DiagnosticBuilder::syntax_error(pos, format!("unterminated `{}` block", block))
                    .note("use `end` to finish a block")
                    .build()
                    .into(),
            );
        }

        if !self.types.is_empty() {
            let n = self.types.len();
            let plural = if n == 1 { "" } else { "s" };
            return Some(
                DiagnosticBuilder::stack_overflow(
                    pos,
                    format!(
                        "the program ended with {} remaining value{} on top of the stack with no handling",
                        n, plural
                    ),
                )
                .note("use `drop` to ignore values")
                .build()
                .into(),
            );
        }

        None
    }
}

fn syntax_error(pos: Position, message: impl Into<String>) -> CompileError {
    DiagnosticBuilder::syntax_error(pos, message).build().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;
    use pilec_lex::Lexer;

    fn parse_all(source: &str) -> Result<Vec<Node>> {
        let lexer = Lexer::new("test.pile", source);
        Parser::new(lexer).collect()
    }

    #[test]
    fn arithmetic_on_two_ints_is_fine() {
        assert!(parse_all("1 2 + drop").is_ok());
    }

    #[test]
    fn stack_underflow_is_reported() {
        let err = parse_all("+").unwrap_err();
        assert!(err.to_string().contains("stack underflow"));
    }

    #[test]
    fn mixed_types_are_a_type_mismatch() {
        let err = parse_all(r#"1 "two" + drop"#).unwrap_err();
        assert!(err.to_string().contains("type mismatch"));
    }

    #[test]
    fn comparison_pushes_bool_for_if() {
        assert!(parse_all("1 2 > if 1 dump end").is_ok());
    }

    #[test]
    fn else_without_if_is_a_syntax_error() {
        let err = parse_all("1 1 = else end drop").unwrap_err();
        assert!(err.to_string().contains("syntax error"));
    }

    #[test]
    fn do_without_while_is_a_syntax_error() {
        let err = parse_all("1 1 = do end drop").unwrap_err();
        assert!(err.to_string().contains("without `while` first"));
    }

    #[test]
    fn do_closing_an_if_block_names_the_mismatch() {
        let err = parse_all("1 1 = if 1 1 = do end end drop").unwrap_err();
        assert!(err.to_string().contains("instead of `while`"));
    }

    #[test]
    fn unterminated_block_is_reported_at_end_of_program() {
        let err = parse_all("1 1 = if 1 dump").unwrap_err();
        assert!(err.to_string().contains("unterminated `if` block"));
    }

    #[test]
    fn leftover_stack_value_is_a_stack_overflow() {
        let err = parse_all("1 2 3").unwrap_err();
        assert!(err.to_string().contains("stack overflow"));
    }

    #[test]
    fn dup_doubles_top_of_stack() {
        assert!(parse_all("1 dup + drop").is_ok());
    }

    #[test]
    fn unknown_word_is_left_for_code_generation_to_reject() {
        let nodes = parse_all("frobnicate").unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].kind, NodeKind::Symbol);
    }
}
