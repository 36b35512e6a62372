//! Expression compiler
//!
//! A post-order walk over the syntax tree that emits code into `rax`.
//! Every form is a statement: it leaves its result in the accumulator and
//! leaves live temporaries below `rsp` untouched. The `stack_index`
//! threaded through the walk is the (always negative) offset of the next
//! free scratch slot; temporaries grow downward one word at a time.
//!
//! Two environments ride along in the [`CompilerContext`]: `locals` maps
//! names to stack offsets, `labels` maps names to code-buffer offsets.
//! Both are borrowed linked lists whose frames live on the compiling
//! thread's stack, so scopes end exactly when the binding form returns.

mod primcall;

use crate::ast::AstNode;
use crate::env::Env;
use crate::error::{CResult, CompileError};
use crate::jit::{BufferWriter, Register, WORD_SIZE};
use crate::value::encode_bool;

/// Placeholder rel32 for jumps that get backpatched; never survives into
/// finished code.
const DISP_PLACEHOLDER: i32 = 0x5a5a_5a5a;

/// Everything a compilation step needs: the output cursor and the two
/// name environments. Derived contexts share the writer and replace one
/// environment, so emission through a child is visible to the parent.
pub struct CompilerContext<'a, 'buf> {
    pub writer: &'a mut BufferWriter<'buf>,
    pub labels: Option<&'a Env<'a>>,
    pub locals: Option<&'a Env<'a>>,
}

impl<'a, 'buf> CompilerContext<'a, 'buf> {
    pub fn new(writer: &'a mut BufferWriter<'buf>) -> Self {
        CompilerContext {
            writer,
            labels: None,
            locals: None,
        }
    }

    /// Shallow copy with one more local binding in scope.
    pub fn with_locals<'b>(&'b mut self, locals: &'b Env<'b>) -> CompilerContext<'b, 'buf> {
        CompilerContext {
            writer: &mut *self.writer,
            labels: self.labels,
            locals: Some(locals),
        }
    }

    /// Shallow copy with one more label binding in scope.
    pub fn with_labels<'b>(&'b mut self, labels: &'b Env<'b>) -> CompilerContext<'b, 'buf> {
        CompilerContext {
            writer: &mut *self.writer,
            labels: Some(labels),
            locals: self.locals,
        }
    }
}

pub(crate) fn operand1(args: &AstNode) -> &AstNode {
    args.car()
}

pub(crate) fn operand2(args: &AstNode) -> &AstNode {
    args.cdr().car()
}

pub(crate) fn operand3(args: &AstNode) -> &AstNode {
    args.cdr().cdr().car()
}

/// Compile one expression, leaving its value in `rax`.
pub fn compile_expr(
    ctx: &mut CompilerContext<'_, '_>,
    node: &AstNode,
    stack_index: i32,
) -> CResult<()> {
    match node {
        AstNode::Fixnum(v) => {
            ctx.writer
                .mov_reg_imm32(Register::Rax, crate::value::encode_fixnum(*v as i64) as i32);
            Ok(())
        }
        AstNode::Atom(name) => match Env::lookup(ctx.locals, name) {
            Some(offset) => {
                ctx.writer.mov_stack_to_reg(Register::Rax, offset);
                Ok(())
            }
            None => {
                eprintln!("Unbound variable: `{}'", name);
                Err(CompileError::UnboundVariable { name: name.clone() })
            }
        },
        AstNode::Cons(head, args) => compile_call(ctx, head, args, stack_index),
        AstNode::Nil => panic!("cannot compile the empty list"),
    }
}

fn compile_call(
    ctx: &mut CompilerContext<'_, '_>,
    fnexpr: &AstNode,
    args: &AstNode,
    stack_index: i32,
) -> CResult<()> {
    let name = match fnexpr {
        AstNode::Atom(s) => s.as_str(),
        _ => panic!("unknown call: head is not an atom"),
    };
    match name {
        "let" => compile_let(ctx, operand1(args), operand2(args), stack_index),
        "if" => compile_if(
            ctx,
            operand1(args),
            operand2(args),
            operand3(args),
            stack_index,
        ),
        "cons" => compile_cons(ctx, operand1(args), operand2(args), stack_index),
        // Control enters a `code` body in a fresh frame: the return
        // address sits at rsp, so the first formal lives one word below.
        "code" => compile_code(ctx, operand1(args), operand2(args), -WORD_SIZE),
        "labelcall" => {
            let label = operand1(args);
            let name = label.atom_name();
            match Env::lookup(ctx.labels, name) {
                // One slot below the current index is reserved for the
                // return address the call pushes; arguments spill below
                // it so the callee's frame lines up with its formals.
                Some(code_pos) => {
                    compile_labelcall(ctx, code_pos, args.cdr(), stack_index - WORD_SIZE)
                }
                None => {
                    eprintln!("Unbound label: `{}'", name);
                    Err(CompileError::UnboundLabel {
                        name: name.to_string(),
                    })
                }
            }
        }
        _ => primcall::compile_primcall(ctx, name, args, stack_index),
    }
}

/// Sequential `let`: each binding is evaluated, spilled to the current
/// scratch slot, and made visible to the bindings to its right.
fn compile_let(
    ctx: &mut CompilerContext<'_, '_>,
    bindings: &AstNode,
    body: &AstNode,
    stack_index: i32,
) -> CResult<()> {
    if bindings.is_nil() {
        return compile_expr(ctx, body, stack_index);
    }
    let binding = bindings.car();
    let name = binding.car().atom_name();
    let expr = operand2(binding);
    compile_expr(ctx, expr, stack_index)?;
    ctx.writer.mov_reg_to_stack(Register::Rax, stack_index);
    let locals = Env::bind(name, stack_index, ctx.locals);
    let mut inner = ctx.with_locals(&locals);
    compile_let(&mut inner, bindings.cdr(), body, stack_index - WORD_SIZE)
}

/// Branch on the test being exactly the false word; any other value,
/// including fixnum 0, takes the consequent.
fn compile_if(
    ctx: &mut CompilerContext<'_, '_>,
    test: &AstNode,
    consequent: &AstNode,
    alternative: &AstNode,
    stack_index: i32,
) -> CResult<()> {
    compile_expr(ctx, test, stack_index)?;
    ctx.writer
        .cmp_reg_imm32(Register::Rax, encode_bool(false) as i32);
    ctx.writer.je_imm32(DISP_PLACEHOLDER);
    let alternative_pos = ctx.writer.pos();
    compile_expr(ctx, consequent, stack_index)?;
    ctx.writer.jmp_imm32(DISP_PLACEHOLDER);
    let end_pos = ctx.writer.pos();
    ctx.writer.backpatch_displacement_imm32(alternative_pos);
    compile_expr(ctx, alternative, stack_index)?;
    ctx.writer.backpatch_displacement_imm32(end_pos);
    Ok(())
}

/// Allocate a pair from the bump pointer in `rsi`. The car is compiled
/// one slot deeper so evaluating the cdr cannot clobber it.
fn compile_cons(
    ctx: &mut CompilerContext<'_, '_>,
    car: &AstNode,
    cdr: &AstNode,
    stack_index: i32,
) -> CResult<()> {
    compile_expr(ctx, car, stack_index - WORD_SIZE)?;
    ctx.writer.mov_rax_to_reg_disp(Register::Rsi, 0);
    compile_expr(ctx, cdr, stack_index)?;
    ctx.writer.mov_rax_to_reg_disp(Register::Rsi, WORD_SIZE);
    ctx.writer.mov_reg_reg(Register::Rax, Register::Rsi);
    ctx.writer
        .or_reg_imm32(Register::Rax, crate::value::PAIR_TAG as i32);
    ctx.writer.add_reg_imm32(Register::Rsi, 2 * WORD_SIZE);
    Ok(())
}

/// Compile a function body in the called frame: formals bind to the
/// slots the caller spilled arguments into, left to right, each one word
/// deeper than the last.
fn compile_code(
    ctx: &mut CompilerContext<'_, '_>,
    formals: &AstNode,
    body: &AstNode,
    stack_index: i32,
) -> CResult<()> {
    if formals.is_nil() {
        compile_expr(ctx, body, stack_index)?;
        ctx.writer.ret();
        return Ok(());
    }
    let name = formals.car().atom_name();
    let locals = Env::bind(name, stack_index, ctx.locals);
    let mut inner = ctx.with_locals(&locals);
    compile_code(&mut inner, formals.cdr(), body, stack_index - WORD_SIZE)
}

/// Spill each argument to successive scratch slots, then emit a direct
/// call. No `rsp` adjustment happens: the caller leaves one slot free
/// for the pushed return address, so the slots the arguments land in
/// are exactly where the callee's frame expects its formals.
fn compile_labelcall(
    ctx: &mut CompilerContext<'_, '_>,
    code_pos: i32,
    args: &AstNode,
    stack_index: i32,
) -> CResult<()> {
    if args.is_nil() {
        let disp = code_pos - ctx.writer.pos() as i32;
        ctx.writer.call_imm32(disp);
        return Ok(());
    }
    compile_expr(ctx, args.car(), stack_index)?;
    ctx.writer.mov_reg_to_stack(Register::Rax, stack_index);
    compile_labelcall(ctx, code_pos, args.cdr(), stack_index - WORD_SIZE)
}

/// Bind each label to its emission position and compile its expression.
/// A label sees the labels bound before it, not after: forward references
/// within one `labels` form are not supported.
fn compile_labels(
    ctx: &mut CompilerContext<'_, '_>,
    bindings: &AstNode,
    body: &AstNode,
    body_pos: usize,
    stack_index: i32,
) -> CResult<()> {
    if bindings.is_nil() {
        ctx.writer.backpatch_displacement_imm32(body_pos);
        return compile_entry(ctx, body);
    }
    let binding = bindings.car();
    let name = binding.car().atom_name();
    let exp = operand2(binding);
    let labels = Env::bind(name, ctx.writer.pos() as i32, ctx.labels);
    let mut inner = ctx.with_labels(&labels);
    compile_expr(&mut inner, exp, stack_index)?;
    compile_labels(&mut inner, bindings.cdr(), body, body_pos, stack_index)
}

/// Compile an expression followed by `ret`, with no entry prologue.
pub fn compile_function(ctx: &mut CompilerContext<'_, '_>, node: &AstNode) -> CResult<()> {
    compile_expr(ctx, node, -WORD_SIZE)?;
    ctx.writer.ret();
    Ok(())
}

/// Compile an entry point: initialize the heap pointer from the incoming
/// argument, then the expression, then `ret`.
pub fn compile_entry(ctx: &mut CompilerContext<'_, '_>, node: &AstNode) -> CResult<()> {
    ctx.writer.mov_reg_reg(Register::Rsi, Register::Rdi);
    compile_function(ctx, node)
}

/// Compile a whole program. A `(labels ((name code) ...) body)` form
/// emits a jump over the label bodies, the labels in order, then the
/// entry-wrapped body; anything else is entry-wrapped directly.
pub fn compile_program(ctx: &mut CompilerContext<'_, '_>, node: &AstNode) -> CResult<()> {
    if let AstNode::Cons(head, args) = node {
        if head.is_atom() && head.atom_eq("labels") {
            ctx.writer.jmp_imm32(DISP_PLACEHOLDER);
            let body_pos = ctx.writer.pos();
            return compile_labels(
                ctx,
                operand1(args),
                operand2(args),
                body_pos,
                -WORD_SIZE,
            );
        }
    }
    compile_entry(ctx, node)
}
