//! IR scalar type mapping.
//!
//! Pile's four compile-time type tags each map to exactly one LLVM scalar
//! type; there is no user-defined type to map.

use inkwell::context::Context;
use inkwell::types::BasicTypeEnum;
use inkwell::AddressSpace;

/// Fetches the single C-string pointer type used for Pile's `string` tag.
pub fn str_pointer_type<'ctx>(context: &'ctx Context) -> inkwell::types::PointerType<'ctx> {
    context.i8_type().ptr_type(AddressSpace::default())
}

use pilec_par::TypeTag;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenType {
    Int,
    Float,
    Bool,
    Str,
}

impl GenType {
    pub fn from_tag(tag: TypeTag) -> Self {
        match tag {
            TypeTag::Integer => GenType::Int,
            TypeTag::Float => GenType::Float,
            TypeTag::Bool => GenType::Bool,
            TypeTag::String => GenType::Str,
        }
    }

    pub fn basic<'ctx>(self, context: &'ctx Context) -> BasicTypeEnum<'ctx> {
        match self {
            GenType::Int => context.i32_type().into(),
            GenType::Float => context.f32_type().into(),
            GenType::Bool => context.bool_type().into(),
            GenType::Str => str_pointer_type(context).into(),
        }
    }
}
