//! Compile-time environments
//!
//! An [`Env`] maps names to integer indices: stack offsets for local
//! variables, code offsets for labels. Frames are allocated on the Rust
//! call stack of whichever binding form created them and chained by
//! reference, so a binding's lifetime is exactly the scope that created
//! it. Lookup walks head-first; the first match wins, which is what gives
//! lexical shadowing.

/// One binding frame in a chain of scopes.
#[derive(Debug, Clone, Copy)]
pub struct Env<'a> {
    name: &'a str,
    index: i32,
    next: Option<&'a Env<'a>>,
}

impl<'a> Env<'a> {
    /// Prepend a binding onto an existing chain.
    pub fn bind(name: &'a str, index: i32, next: Option<&'a Env<'a>>) -> Env<'a> {
        Env { name, index, next }
    }

    /// Find the innermost binding for `name`.
    pub fn lookup(env: Option<&Env<'_>>, name: &str) -> Option<i32> {
        let mut cursor = env;
        while let Some(frame) = cursor {
            if frame.name == name {
                return Some(frame.index);
            }
            cursor = frame.next;
        }
        None
    }
}
