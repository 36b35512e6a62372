//! Syntax tree produced by the reader
//!
//! Programs are right-nested cons chains ending in [`AstNode::Nil`]; a cons
//! always has both children. The accessors assert these invariants:
//! handing the compiler a malformed tree is a caller bug, not a
//! recoverable error.

/// A single node of the source tree.
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    /// Small integer literal
    Fixnum(i32),
    /// Symbolic name
    Atom(String),
    /// Pair of child nodes
    Cons(Box<AstNode>, Box<AstNode>),
    /// The empty list
    Nil,
}

impl AstNode {
    pub fn atom(name: &str) -> AstNode {
        AstNode::Atom(name.to_string())
    }

    pub fn cons(car: AstNode, cdr: AstNode) -> AstNode {
        AstNode::Cons(Box::new(car), Box::new(cdr))
    }

    /// Build a proper list from the given elements.
    pub fn list(elements: Vec<AstNode>) -> AstNode {
        elements
            .into_iter()
            .rev()
            .fold(AstNode::Nil, |acc, e| AstNode::cons(e, acc))
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, AstNode::Nil)
    }

    #[inline]
    pub fn is_atom(&self) -> bool {
        matches!(self, AstNode::Atom(_))
    }

    /// Compare an atom against a name. Panics on non-atoms.
    pub fn atom_eq(&self, name: &str) -> bool {
        match self {
            AstNode::Atom(s) => s == name,
            _ => panic!("atom_eq on non-atom node"),
        }
    }

    /// Atom name accessor. Panics on non-atoms.
    pub fn atom_name(&self) -> &str {
        match self {
            AstNode::Atom(s) => s,
            _ => panic!("expected an atom, got {:?}", self),
        }
    }

    /// First element of a cons. Panics on nil and non-cons nodes.
    pub fn car(&self) -> &AstNode {
        match self {
            AstNode::Cons(car, _) => car,
            _ => panic!("car of non-cons node {:?}", self),
        }
    }

    /// Rest of a cons. Panics on nil and non-cons nodes.
    pub fn cdr(&self) -> &AstNode {
        match self {
            AstNode::Cons(_, cdr) => cdr,
            _ => panic!("cdr of non-cons node {:?}", self),
        }
    }
}
