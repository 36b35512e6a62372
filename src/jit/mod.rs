//! Machine-code plumbing
//!
//! The three layers under here are deliberately dumb: [`buffer`] owns
//! memory and a cursor, [`emit`] knows instruction encodings, and
//! [`code`] turns a finalized buffer into something callable. All of the
//! *deciding* what to emit lives in [`crate::compiler`].

mod buffer;
mod code;
mod emit;

pub use buffer::{Buffer, BufferState, BufferWriter, WORD_SIZE};
pub use code::{CompiledCode, EntryFn};
pub use emit::{Condition, Register};
