//! Primitive-call emission
//!
//! Every primitive evaluates into `rax` and is free to use the scratch
//! slot at the current stack index; binary primitives evaluate their
//! second operand first, spill it, and evaluate the first operand one
//! slot deeper.

use super::{compile_expr, operand1, operand2, CompilerContext};
use crate::ast::AstNode;
use crate::error::CResult;
use crate::jit::{BufferWriter, Condition, Register, WORD_SIZE};
use crate::value::{
    encode_bool, encode_fixnum, BOOL_MASK, BOOL_SHIFT, BOOL_TAG, CHAR_SHIFT, CHAR_TAG,
    FIXNUM_MASK, FIXNUM_SHIFT, NIL_TAG,
};

/// Materialize a boolean from the zero flag of the preceding compare.
fn emit_bool_from_zf(w: &mut BufferWriter<'_>) {
    w.mov_reg_imm32(Register::Rax, 0);
    w.setcc_al(Condition::Equal);
    w.shl_reg_imm8(Register::Rax, BOOL_SHIFT as i32);
    w.or_reg_imm32(Register::Rax, BOOL_TAG as i32);
}

pub(super) fn compile_primcall(
    ctx: &mut CompilerContext<'_, '_>,
    name: &str,
    args: &AstNode,
    stack_index: i32,
) -> CResult<()> {
    match name {
        "add1" => {
            compile_expr(ctx, operand1(args), stack_index)?;
            ctx.writer
                .add_reg_imm32(Register::Rax, encode_fixnum(1) as i32);
            Ok(())
        }
        "sub1" => {
            compile_expr(ctx, operand1(args), stack_index)?;
            ctx.writer
                .sub_reg_imm32(Register::Rax, encode_fixnum(1) as i32);
            Ok(())
        }
        "integer->char" => {
            // Fixnums already carry two zero bits, so only the difference
            // of the shifts is applied before tagging.
            compile_expr(ctx, operand1(args), stack_index)?;
            ctx.writer
                .shl_reg_imm8(Register::Rax, (CHAR_SHIFT - FIXNUM_SHIFT) as i32);
            ctx.writer.or_reg_imm32(Register::Rax, CHAR_TAG as i32);
            Ok(())
        }
        "char->integer" => {
            compile_expr(ctx, operand1(args), stack_index)?;
            ctx.writer
                .shr_reg_imm8(Register::Rax, (CHAR_SHIFT - FIXNUM_SHIFT) as i32);
            Ok(())
        }
        "zero?" => {
            compile_expr(ctx, operand1(args), stack_index)?;
            ctx.writer.cmp_reg_imm32(Register::Rax, 0);
            emit_bool_from_zf(ctx.writer);
            Ok(())
        }
        "null?" => {
            compile_expr(ctx, operand1(args), stack_index)?;
            ctx.writer.cmp_reg_imm32(Register::Rax, NIL_TAG as i32);
            emit_bool_from_zf(ctx.writer);
            Ok(())
        }
        "not" => {
            // True exactly when the operand is the false word.
            compile_expr(ctx, operand1(args), stack_index)?;
            ctx.writer
                .cmp_reg_imm32(Register::Rax, encode_bool(false) as i32);
            emit_bool_from_zf(ctx.writer);
            Ok(())
        }
        "integer?" => {
            compile_expr(ctx, operand1(args), stack_index)?;
            ctx.writer.and_reg_imm32(Register::Rax, FIXNUM_MASK as i32);
            ctx.writer.cmp_reg_imm32(Register::Rax, 0);
            emit_bool_from_zf(ctx.writer);
            Ok(())
        }
        "boolean?" => {
            compile_expr(ctx, operand1(args), stack_index)?;
            ctx.writer.and_reg_imm32(Register::Rax, BOOL_MASK as i32);
            ctx.writer.cmp_reg_imm32(Register::Rax, BOOL_TAG as i32);
            emit_bool_from_zf(ctx.writer);
            Ok(())
        }
        "+" => {
            compile_expr(ctx, operand2(args), stack_index)?;
            ctx.writer.mov_reg_to_stack(Register::Rax, stack_index);
            compile_expr(ctx, operand1(args), stack_index - WORD_SIZE)?;
            ctx.writer.add_reg_stack(Register::Rax, stack_index);
            Ok(())
        }
        "-" => {
            compile_expr(ctx, operand2(args), stack_index)?;
            ctx.writer.mov_reg_to_stack(Register::Rax, stack_index);
            compile_expr(ctx, operand1(args), stack_index - WORD_SIZE)?;
            ctx.writer.sub_reg_stack(Register::Rax, stack_index);
            Ok(())
        }
        "car" => {
            // Heap addresses are biased by the pair tag, so the car sits
            // at offset -1 rather than 0.
            compile_expr(ctx, operand1(args), stack_index)?;
            ctx.writer.mov_reg_disp_to_rax(Register::Rax, -1);
            Ok(())
        }
        "cdr" => {
            compile_expr(ctx, operand1(args), stack_index)?;
            ctx.writer.mov_reg_disp_to_rax(Register::Rax, WORD_SIZE - 1);
            Ok(())
        }
        _ => panic!("unknown call: `{}'", name),
    }
}
