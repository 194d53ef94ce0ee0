//! pilec-par - Type checking and structured-control-flow validation.
//!
//! ============================================================================
//! ABSTRACT MACHINE
//! ============================================================================
//!
//! Pile has no syntax tree. A program is a flat sequence of tokens that push,
//! pop and rearrange values on an implicit stack at runtime; this crate's job
//! is to prove, without running anything, that every one of those operations
//! will see the operand counts and types it expects. It does this by running
//! the same stack discipline the real program will run, but over *types*
//! instead of values — a virtual machine with one register file:
//!
//!   stack : TypeTag*            (values the program will have at this point)
//!   blocks : BlockKind*         (the control structures still open)
//!
//! Formally, for a token sequence t1..tn, checking succeeds iff there exists
//! a sequence of stack states s0, s1, .., sn (s0 = ∅) such that each ti's
//! operator signature is satisfiable by si-1 and produces si, and sn = ∅
//! with blocks = ∅ (every value consumed, every block closed). The checker
//! doesn't search for such a sequence — Pile's operators are unambiguous, so
//! each step has exactly one possible transition, and the checker just walks
//! forward applying it, failing the moment a step has none.
//!
//! ============================================================================
//! OPERAND SIGNATURES
//! ============================================================================
//!
//! Every stack-consuming word falls into one of a handful of shapes (see the
//! `BINOP`/`TEROP`/`UNOP`/`BITWISE`/`SHIFT`/`BOOL_ONLY` tables in
//! `parser.rs`): an accepted type, the number of operands of that type it
//! consumes, and what it leaves behind (a fixed type, some number of copies
//! of what was already there, or nothing). `check_op` is the one function
//! that enforces this for every operator; it is the load-bearing piece of
//! the whole crate, and its arity/type-mismatch diagnostics are ported
//! directly from the reference checker rather than redesigned.
//!
//! ============================================================================
//! BLOCK NESTING
//! ============================================================================
//!
//! `if`/`else`/`end` and `while`/`do`/`end` are checked the same way a
//! bracket matcher checks parentheses, except the bracket *kind* matters:
//! closing a `while` block with `end` before its matching `do` has run is a
//! syntax error, and so is an `end` with nothing open at all. The block
//! stack exists purely to report these mismatches with the name of the
//! block that was actually open, rather than a generic "unexpected token".
//!
//! ============================================================================
//! WORKED EXAMPLE
//! ============================================================================
//!
//! ```text
//! Tokens:  0  while  dup  3  <  do  dup  dump  1  +  end  drop
//!
//! stack after each token (Integer = I, Bool = B):
//!   0        -> [I]
//!   while    -> [I]            (blocks: [While])
//!   dup      -> [I, I]
//!   3        -> [I, I, I]
//!   <        -> [I, B]
//!   do       -> [I]            (blocks: [While, Do] — `<` checked, consumed)
//!   dup      -> [I, I]
//!   dump     -> [I]
//!   1        -> [I, I]
//!   +        -> [I]
//!   end      -> [I]            (blocks: [])
//!   drop     -> []
//! ```
//!
//! The program ends with an empty stack and no open blocks: well-typed.

mod node;
mod parser;

pub use node::{Node, NodeKind, TypeTag};
pub use parser::Parser;
