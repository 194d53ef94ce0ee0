//! Lowering a type-checked node stream to a single LLVM module.
//!
//! The operand stack is a `Vec` of pointers to `alloca`'d scratch cells, one
//! per live value — not SSA registers — so that joins at `if`/`while` merge
//! points never need `phi` nodes. This mirrors the reference emitter, which
//! keeps the same representation for the same reason.

use std::collections::HashMap;

use inkwell::basic_block::BasicBlock;
use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::{Linkage, Module};
use inkwell::values::{BasicValueEnum, FunctionValue, PointerValue};
use inkwell::{FloatPredicate, IntPredicate};

use pilec_lex::Token;
use pilec_par::{Node, NodeKind};
use pilec_util::{CompileError, DiagnosticBuilder, Result as CompileResult};

use crate::error::{CodeGenError, Result};
use crate::types::GenType;

#[derive(Clone, Copy)]
struct Cell<'ctx> {
    ptr: PointerValue<'ctx>,
    ty: GenType,
}

enum Frame<'ctx> {
    If {
        false_bb: BasicBlock<'ctx>,
        merge_bb: BasicBlock<'ctx>,
        has_else: bool,
    },
    While {
        head_bb: BasicBlock<'ctx>,
        body_bb: BasicBlock<'ctx>,
        merge_bb: BasicBlock<'ctx>,
    },
}

/// Drives an [`inkwell::builder::Builder`] over a node stream, producing a
/// module with a single `main() -> i32` function.
pub struct Emitter<'ctx> {
    context: &'ctx Context,
    module: Module<'ctx>,
    builder: Builder<'ctx>,
    main_fn: FunctionValue<'ctx>,
    stack: Vec<Cell<'ctx>>,
    frames: Vec<Frame<'ctx>>,
    printf: Option<FunctionValue<'ctx>>,
    format_strings: HashMap<&'static str, PointerValue<'ctx>>,
    global_count: u32,
}

impl<'ctx> Emitter<'ctx> {
    pub fn new(context: &'ctx Context, module_name: &str) -> Self {
        let module = context.create_module(module_name);
        let builder = context.create_builder();
        let fn_type = context.i32_type().fn_type(&[], false);
        let main_fn = module.add_function("main", fn_type, None);
        let entry = context.append_basic_block(main_fn, "entry");
        builder.position_at_end(entry);

        Self {
            context,
            module,
            builder,
            main_fn,
            stack: Vec::new(),
            frames: Vec::new(),
            printf: None,
            format_strings: HashMap::new(),
            global_count: 0,
        }
    }

    /// Consume a node stream, emitting IR for every node, then terminate
    /// `main` with `ret i32 0`.
    pub fn emit<I>(&mut self, nodes: I) -> Result<()>
    where
        I: IntoIterator<Item = CompileResult<Node>>,
    {
        for node in nodes {
            let node = node?;
            self.process(&node)?;
        }
        self.builder
            .build_return(Some(&self.context.i32_type().const_int(0, false)))
            .map_err(verification)?;
        Ok(())
    }

    pub fn into_module(self) -> Module<'ctx> {
        self.module
    }

    fn process(&mut self, node: &Node) -> Result<()> {
        match node.kind {
            NodeKind::Int => self.push_int(&node.token),
            NodeKind::Float => self.push_float(&node.token),
            NodeKind::String => self.push_string(&node.token),
            NodeKind::Symbol => self.process_symbol(&node.token),
        }
    }

    fn process_symbol(&mut self, token: &Token) -> Result<()> {
        match token.lexeme.as_str() {
            "+" | "-" | "*" | "/" | "%" | "|" | "&" | ">>" | "<<" => self.arithmetic(token),
            ">" | "<" | ">=" | "<=" | "!=" | "=" => self.compare(token),
            "!" => self.bitwise_not(),
            "dup" => self.dup(),
            "drop" => self.drop(),
            "over" => self.over(),
            "swap" => self.swap(),
            "rot" => self.rot(),
            "dump" => self.dump(),
            "if" => self.start_if(),
            "else" => self.else_branch(),
            "while" => self.start_while(),
            "do" => self.do_branch(),
            "end" => self.end_block(),
            word => Err(CodeGenError::Compile(CompileError::from(
                DiagnosticBuilder::word_error(
                    token.pos.clone(),
                    format!("unknown operation or defined identifier `{}`", word),
                )
                .build(),
            ))),
        }
    }

    // -- literals --------------------------------------------------------

    fn push_int(&mut self, token: &Token) -> Result<()> {
        // The checker only guarantees the lexeme looks like an integer, not
        // that it fits in 32 bits; wrap rather than collapse out-of-range
        // literals to zero.
        let value = token.lexeme.parse::<i128>().map(|v| v as i32).unwrap_or(0);
        let ptr = self.alloca_cell(GenType::Int, "int")?;
        let constant = self.context.i32_type().const_int(value as u64, true);
        self.store(ptr, constant.into())?;
        self.stack.push(Cell { ptr, ty: GenType::Int });
        Ok(())
    }

    fn push_float(&mut self, token: &Token) -> Result<()> {
        let value = token.lexeme.parse::<f32>().unwrap_or(0.0);
        let ptr = self.alloca_cell(GenType::Float, "float")?;
        let constant = self.context.f32_type().const_float(value as f64);
        self.store(ptr, constant.into())?;
        self.stack.push(Cell { ptr, ty: GenType::Float });
        Ok(())
    }

    fn push_string(&mut self, token: &Token) -> Result<()> {
        let global_ptr = self.global_cstring(token.lexeme.as_bytes(), "str")?;
        let ptr = self.alloca_cell(GenType::Str, "strcell")?;
        self.store(ptr, global_ptr.into())?;
        self.stack.push(Cell { ptr, ty: GenType::Str });
        Ok(())
    }

    // -- stack manipulators, exactly mirroring the reference's pointer
    // juggling: `dup`/`over` peek without consuming, `swap`/`rot` splice a
    // specific slot out from under the top and re-push it as a fresh cell --

    fn dup(&mut self) -> Result<()> {
        let top = self.peek(1)?;
        let value = self.load(top)?;
        let ptr = self.alloca_cell(top.ty, "dup")?;
        self.store(ptr, value)?;
        self.stack.push(Cell { ptr, ty: top.ty });
        Ok(())
    }

    fn drop(&mut self) -> Result<()> {
        self.pop()?;
        Ok(())
    }

    fn over(&mut self) -> Result<()> {
        let second = self.peek(2)?;
        let value = self.load(second)?;
        let ptr = self.alloca_cell(second.ty, "over")?;
        self.store(ptr, value)?;
        self.stack.push(Cell { ptr, ty: second.ty });
        Ok(())
    }

    fn swap(&mut self) -> Result<()> {
        self.splice_and_repush(2, "swap")
    }

    fn rot(&mut self) -> Result<()> {
        self.splice_and_repush(3, "rot")
    }

    fn splice_and_repush(&mut self, depth_from_top: usize, name: &str) -> Result<()> {
        let len = self.stack.len();
        if len < depth_from_top {
            return Err(verification(format!(
                "`{}` needs {} values on the operand stack",
                name, depth_from_top
            )));
        }
        let removed = self.stack.remove(len - depth_from_top);
        let value = self.load(removed)?;
        let ptr = self.alloca_cell(removed.ty, name)?;
        self.store(ptr, value)?;
        self.stack.push(Cell { ptr, ty: removed.ty });
        Ok(())
    }

    // -- arithmetic / comparison / bitwise --------------------------------

    fn arithmetic(&mut self, token: &Token) -> Result<()> {
        let b_cell = self.pop()?;
        let a_cell = self.peek(1)?;
        let b = self.load(b_cell)?;
        let a = self.load(a_cell)?;
        let result = self.binary_value(&token.lexeme, a_cell.ty, a, b)?;
        self.store(a_cell.ptr, result)?;
        Ok(())
    }

    fn binary_value(
        &self,
        op: &str,
        ty: GenType,
        a: BasicValueEnum<'ctx>,
        b: BasicValueEnum<'ctx>,
    ) -> Result<BasicValueEnum<'ctx>> {
        let is_float = matches!(ty, GenType::Float);
        let value = match (op, is_float) {
            ("+", true) => self.builder.build_float_add(a.into_float_value(), b.into_float_value(), "fadd").map_err(verification)?.into(),
            ("+", false) => self.builder.build_int_add(a.into_int_value(), b.into_int_value(), "add").map_err(verification)?.into(),
            ("-", true) => self.builder.build_float_sub(a.into_float_value(), b.into_float_value(), "fsub").map_err(verification)?.into(),
            ("-", false) => self.builder.build_int_sub(a.into_int_value(), b.into_int_value(), "sub").map_err(verification)?.into(),
            ("*", true) => self.builder.build_float_mul(a.into_float_value(), b.into_float_value(), "fmul").map_err(verification)?.into(),
            ("*", false) => self.builder.build_int_mul(a.into_int_value(), b.into_int_value(), "mul").map_err(verification)?.into(),
            ("/", true) => self.builder.build_float_div(a.into_float_value(), b.into_float_value(), "fdiv").map_err(verification)?.into(),
            ("/", false) => self.builder.build_int_signed_div(a.into_int_value(), b.into_int_value(), "sdiv").map_err(verification)?.into(),
            ("%", true) => self.builder.build_float_rem(a.into_float_value(), b.into_float_value(), "frem").map_err(verification)?.into(),
            ("%", false) => self.builder.build_int_signed_rem(a.into_int_value(), b.into_int_value(), "srem").map_err(verification)?.into(),
            ("|", _) => self.builder.build_or(a.into_int_value(), b.into_int_value(), "or").map_err(verification)?.into(),
            ("&", _) => self.builder.build_and(a.into_int_value(), b.into_int_value(), "and").map_err(verification)?.into(),
            (">>", _) => self
                .builder
                .build_right_shift(a.into_int_value(), b.into_int_value(), false, "shr")
                .map_err(verification)?
                .into(),
            ("<<", _) => self.builder.build_left_shift(a.into_int_value(), b.into_int_value(), "shl").map_err(verification)?.into(),
            _ => return Err(verification(format!("unsupported operator `{}`", op))),
        };
        Ok(value)
    }

    fn compare(&mut self, token: &Token) -> Result<()> {
        let b_cell = self.pop()?;
        let a_cell = self.pop()?;
        let b = self.load(b_cell)?;
        let a = self.load(a_cell)?;
        let is_float = matches!(a_cell.ty, GenType::Float);
        let result = if is_float {
            let pred = match token.lexeme.as_str() {
                ">" => FloatPredicate::OGT,
                "<" => FloatPredicate::OLT,
                ">=" => FloatPredicate::OGE,
                "<=" => FloatPredicate::OLE,
                "!=" => FloatPredicate::ONE,
                "=" => FloatPredicate::OEQ,
                other => return Err(verification(format!("unsupported comparison `{}`", other))),
            };
            self.builder
                .build_float_compare(pred, a.into_float_value(), b.into_float_value(), "fcmp")
                .map_err(verification)?
        } else {
            let pred = match token.lexeme.as_str() {
                ">" => IntPredicate::SGT,
                "<" => IntPredicate::SLT,
                ">=" => IntPredicate::SGE,
                "<=" => IntPredicate::SLE,
                "!=" => IntPredicate::NE,
                "=" => IntPredicate::EQ,
                other => return Err(verification(format!("unsupported comparison `{}`", other))),
            };
            self.builder
                .build_int_compare(pred, a.into_int_value(), b.into_int_value(), "icmp")
                .map_err(verification)?
        };
        let ptr = self.alloca_cell(GenType::Bool, "cmp")?;
        self.store(ptr, result.into())?;
        self.stack.push(Cell { ptr, ty: GenType::Bool });
        Ok(())
    }

    // The checker accepts `!` on all four types (see `UNOP` in pilec-par),
    // matching the reference's `not_()`, which calls `builder.not_(a)`
    // without inspecting `a`'s type at all. But `builder.not_` (an xor
    // against all-ones) is itself only defined for integer operands in the
    // underlying IR builder — the reference would raise there for a float
    // or string operand, it just defers the failure from "checked" to
    // "building IR". This lowering reproduces that outcome instead of
    // silently inventing semantics for "not a string": well-typed per the
    // checker, but still a failure when it's actually lowered. See
    // DESIGN.md's Deviations section.
    fn bitwise_not(&mut self) -> Result<()> {
        let top = self.peek(1)?;
        if !matches!(top.ty, GenType::Int | GenType::Bool) {
            return Err(verification(format!(
                "`!` has no integer representation to invert for a {:?} operand",
                top.ty
            )));
        }
        let value = self.load(top)?;
        let result = self.builder.build_not(value.into_int_value(), "not").map_err(verification)?;
        self.store(top.ptr, result.into())?;
        Ok(())
    }

    // -- debug print -------------------------------------------------------

    fn dump(&mut self) -> Result<()> {
        let cell = self.pop()?;
        let mut value = self.load(cell)?;
        let fmt = match cell.ty {
            GenType::Int | GenType::Bool => "%d\n",
            GenType::Float => "%f\n",
            GenType::Str => "%s\n",
        };
        let fmt_ptr = self.format_string(fmt)?;
        match cell.ty {
            GenType::Bool => {
                value = self
                    .builder
                    .build_int_z_extend(value.into_int_value(), self.context.i32_type(), "zext")
                    .map_err(verification)?
                    .into();
            }
            GenType::Float => {
                value = self
                    .builder
                    .build_float_ext(value.into_float_value(), self.context.f64_type(), "fpext")
                    .map_err(verification)?
                    .into();
            }
            GenType::Int | GenType::Str => {}
        }
        let printf = self.printf_fn();
        self.builder
            .build_call(printf, &[fmt_ptr.into(), value.into()], "printf_call")
            .map_err(verification)?;
        Ok(())
    }

    fn printf_fn(&mut self) -> FunctionValue<'ctx> {
        if let Some(f) = self.printf {
            return f;
        }
        let ptr_ty = crate::types::str_pointer_type(self.context);
        let fn_type = self.context.i32_type().fn_type(&[ptr_ty.into()], true);
        let f = self.module.add_function("printf", fn_type, Some(Linkage::External));
        self.printf = Some(f);
        f
    }

    // -- structured control flow -------------------------------------------

    fn start_if(&mut self) -> Result<()> {
        let cell = self.pop()?;
        let cond = self.load(cell)?.into_int_value();
        let true_bb = self.context.append_basic_block(self.main_fn, "if_true");
        let false_bb = self.context.append_basic_block(self.main_fn, "if_false");
        let merge_bb = self.context.append_basic_block(self.main_fn, "if_end");
        self.builder.build_conditional_branch(cond, true_bb, false_bb).map_err(verification)?;
        self.frames.push(Frame::If { false_bb, merge_bb, has_else: false });
        self.builder.position_at_end(true_bb);
        Ok(())
    }

    fn else_branch(&mut self) -> Result<()> {
        match self.frames.last_mut() {
            Some(Frame::If { false_bb, merge_bb, has_else }) => {
                let (false_bb, merge_bb) = (*false_bb, *merge_bb);
                *has_else = true;
                self.builder.build_unconditional_branch(merge_bb).map_err(verification)?;
                self.builder.position_at_end(false_bb);
                Ok(())
            }
            _ => Err(verification("`else` outside an `if` block")),
        }
    }

    fn start_while(&mut self) -> Result<()> {
        let head_bb = self.context.append_basic_block(self.main_fn, "while_head");
        let body_bb = self.context.append_basic_block(self.main_fn, "while_body");
        let merge_bb = self.context.append_basic_block(self.main_fn, "while_end");
        self.builder.build_unconditional_branch(head_bb).map_err(verification)?;
        self.frames.push(Frame::While { head_bb, body_bb, merge_bb });
        self.builder.position_at_end(head_bb);
        Ok(())
    }

    fn do_branch(&mut self) -> Result<()> {
        let cell = self.pop()?;
        let cond = self.load(cell)?.into_int_value();
        match self.frames.last() {
            Some(Frame::While { body_bb, merge_bb, .. }) => {
                self.builder.build_conditional_branch(cond, *body_bb, *merge_bb).map_err(verification)?;
                self.builder.position_at_end(*body_bb);
                Ok(())
            }
            _ => Err(verification("`do` outside a `while` block")),
        }
    }

    fn end_block(&mut self) -> Result<()> {
        match self.frames.pop() {
            Some(Frame::If { false_bb, merge_bb, has_else }) => {
                self.builder.build_unconditional_branch(merge_bb).map_err(verification)?;
                if !has_else {
                    self.builder.position_at_end(false_bb);
                    self.builder.build_unconditional_branch(merge_bb).map_err(verification)?;
                }
                self.builder.position_at_end(merge_bb);
                Ok(())
            }
            Some(Frame::While { head_bb, merge_bb, .. }) => {
                self.builder.build_unconditional_branch(head_bb).map_err(verification)?;
                self.builder.position_at_end(merge_bb);
                Ok(())
            }
            None => Err(verification("`end` without a matching block")),
        }
    }

    // -- low-level helpers --------------------------------------------------

    fn alloca_cell(&self, ty: GenType, name: &str) -> Result<PointerValue<'ctx>> {
        self.builder.build_alloca(ty.basic(self.context), name).map_err(verification)
    }

    fn store(&self, ptr: PointerValue<'ctx>, value: BasicValueEnum<'ctx>) -> Result<()> {
        self.builder.build_store(ptr, value).map_err(verification)?;
        Ok(())
    }

    fn load(&self, cell: Cell<'ctx>) -> Result<BasicValueEnum<'ctx>> {
        self.builder.build_load(cell.ptr, "load").map_err(verification)
    }

    fn pop(&mut self) -> Result<Cell<'ctx>> {
        self.stack.pop().ok_or_else(|| verification("operand stack underflow"))
    }

    fn peek(&self, depth_from_top: usize) -> Result<Cell<'ctx>> {
        let len = self.stack.len();
        if len < depth_from_top {
            return Err(verification("operand stack underflow"));
        }
        Ok(self.stack[len - depth_from_top])
    }

    fn global_cstring(&mut self, bytes: &[u8], tag: &str) -> Result<PointerValue<'ctx>> {
        let name = format!(".{}.{}", tag, self.global_count);
        self.global_count += 1;
        let constant = self.context.const_string(bytes, true);
        let global = self.module.add_global(constant.get_type(), None, &name);
        global.set_initializer(&constant);
        global.set_linkage(Linkage::Private);
        global.set_constant(true);
        let i8_ptr_ty = crate::types::str_pointer_type(self.context);
        self.builder
            .build_pointer_cast(global.as_pointer_value(), i8_ptr_ty, &format!("{}.ptr", name))
            .map_err(verification)
    }

    fn format_string(&mut self, text: &'static str) -> Result<PointerValue<'ctx>> {
        if let Some(ptr) = self.format_strings.get(text) {
            return Ok(*ptr);
        }
        let ptr = self.global_cstring(text.as_bytes(), "fmt")?;
        self.format_strings.insert(text, ptr);
        Ok(ptr)
    }
}

fn verification(err: impl std::fmt::Display) -> CodeGenError {
    CodeGenError::Verification(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pilec_lex::Lexer;
    use pilec_par::Parser as PileParser;

    fn compile(source: &str) -> Result<String> {
        let tokens = Lexer::new("test.pile", source);
        let nodes = PileParser::new(tokens);
        let context = Context::create();
        let mut emitter = Emitter::new(&context, "test");
        emitter.emit(nodes)?;
        let ir = emitter.into_module().print_to_string().to_string();
        Ok(ir)
    }

    #[test]
    fn empty_program_just_returns_zero() {
        let ir = compile("").unwrap();
        assert!(ir.contains("ret i32 0"));
    }

    #[test]
    fn integer_arithmetic_lowers_to_int_add() {
        let ir = compile("2 3 + dump").unwrap();
        assert!(ir.contains("add i32"));
        assert!(ir.contains("declare i32 @printf"));
    }

    #[test]
    fn float_arithmetic_lowers_to_float_add() {
        let ir = compile("1.5 2.5 + dump").unwrap();
        assert!(ir.contains("fadd float"));
    }

    #[test]
    fn comparison_produces_branches() {
        let ir = compile("3 2 > if 1 dump else 0 dump end").unwrap();
        assert!(ir.contains("icmp sgt"));
        assert!(ir.contains("br i1"));
    }

    #[test]
    fn loop_emits_head_body_and_merge_blocks() {
        let ir = compile("0 while dup 3 < do dup dump 1 + end drop").unwrap();
        assert!(ir.contains("while_head"));
        assert!(ir.contains("while_body"));
        assert!(ir.contains("while_end"));
    }

    #[test]
    fn unknown_word_is_a_word_error() {
        let err = compile("frobnicate").unwrap_err();
        assert!(err.to_string().contains("word error"));
        assert!(err.to_string().contains("frobnicate"));
    }

    #[test]
    fn string_literal_becomes_a_private_global() {
        let ir = compile(r#""hi" dump"#).unwrap();
        assert!(ir.contains("private"));
        assert!(ir.contains("c\"hi\\00\""));
    }

    #[test]
    fn bitwise_not_lowers_for_integers() {
        let ir = compile("5 ! drop").unwrap();
        assert!(ir.contains("xor"));
    }

    #[test]
    fn bitwise_not_on_a_string_fails_at_emission_despite_passing_the_checker() {
        // `!` type-checks against `UNOP`, which accepts string operands, so
        // this program reaches the emitter; it still can't be lowered,
        // because there is no integer representation of a string pointer
        // to invert. See the comment on `bitwise_not` and DESIGN.md.
        let err = compile(r#""hi" ! drop"#).unwrap_err();
        assert!(err.to_string().contains("no integer representation"));
    }
}
