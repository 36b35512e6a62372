//! # Sable - a tiny Lisp compiled straight to x86-64
//!
//! Sable reads a minimal Lisp-like expression language and compiles it
//! directly to native machine code in an executable memory region, then
//! calls it like any other function. There is no interpreter and no
//! intermediate representation: the syntax tree drives the encoder one
//! expression at a time.
//!
//! ## Quick Start
//!
//! ```
//! use sable::jit::{Buffer, BufferWriter, CompiledCode};
//! use sable::value::decode_fixnum;
//! use sable::{compile_entry, read_str, CompilerContext};
//!
//! let node = read_str("(add1 41)").unwrap();
//! let mut buf = Buffer::new(1024);
//! {
//!     let mut writer = BufferWriter::new(&mut buf);
//!     let mut ctx = CompilerContext::new(&mut writer);
//!     compile_entry(&mut ctx, &node).unwrap();
//! }
//! buf.make_executable().unwrap();
//! let mut heap = vec![0u64; 100];
//! let code = CompiledCode::new(buf);
//! let result = unsafe { code.call(heap.as_mut_ptr() as u64) };
//! assert_eq!(decode_fixnum(result), 42);
//! ```
//!
//! ## Architecture
//!
//! 1. **Reader** - parse one S-expression from text into an [`AstNode`]
//! 2. **Compiler** - walk the tree, emitting x86-64 through the encoder
//! 3. **Buffer** - flip the code region from writable to executable
//! 4. **Call** - invoke the entry point with a heap base, read back a
//!    tagged word
//!
//! The calling convention is fixed: the heap base arrives in `rdi`, is
//! copied to `rsi` and bump-allocated from there, and the tagged result
//! comes back in `rax`.

pub mod ast;
pub mod compiler;
pub mod env;
pub mod error;
pub mod jit;
pub mod reader;
pub mod value;

pub use ast::AstNode;
pub use compiler::{compile_entry, compile_function, compile_program, CompilerContext};
pub use error::{CResult, CompileError, ReadError};
pub use reader::read_str;
