//! The pattern algebra used on the left- and right-hand sides of [`crate::rule::Rule`]s.
//!
//! A [`Pattern`] mirrors [`crate::node::Node`] shape-for-shape, but additionally carries named
//! free variables ([`Pattern::variable`]) that bind to whatever [`Node`](crate::node::Node) they
//! line up against during [`crate::matcher::Matcher::match_node`]. Unlike nodes, patterns are
//! owned trees: a caller builds one once and hands it to a [`crate::rule::Rule`], so there is no
//! need for the `Rc`-based sharing that makes `Node` cheap to alias inside the e-graph.

use crate::node::BinaryOp;
use std::fmt;

/// A pattern tree: mirrors [`crate::node::Node`], plus [`Pattern::Variable`] for pattern
/// variables that bind during matching.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Pattern {
    Constant(i64),
    /// A free pattern variable. Binds to whatever `VariableNode` it is matched against; repeated
    /// uses of the same name within one pattern must match the identical node (see
    /// [`crate::matcher`]).
    Variable(String),
    Binary(BinaryOp, Box<Pattern>, Box<Pattern>),
}

impl Pattern {
    /// Build a constant pattern matching exactly `value`.
    pub fn constant(value: i64) -> Pattern {
        Pattern::Constant(value)
    }

    /// Build a pattern variable named `name`.
    pub fn variable(name: impl Into<String>) -> Pattern {
        Pattern::Variable(name.into())
    }

    /// Build a binary pattern applying `op` to `lhs` and `rhs`.
    pub fn binary(op: BinaryOp, lhs: Pattern, rhs: Pattern) -> Pattern {
        Pattern::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    /// Sugar for `Pattern::binary(BinaryOp::Add, self.clone(), rhs)`.
    pub fn add(&self, rhs: Pattern) -> Pattern {
        Pattern::binary(BinaryOp::Add, self.clone(), rhs)
    }

    /// Sugar for `Pattern::binary(BinaryOp::Sub, self.clone(), rhs)`.
    pub fn sub(&self, rhs: Pattern) -> Pattern {
        Pattern::binary(BinaryOp::Sub, self.clone(), rhs)
    }

    /// Sugar for `Pattern::binary(BinaryOp::Mul, self.clone(), rhs)`.
    pub fn mul(&self, rhs: Pattern) -> Pattern {
        Pattern::binary(BinaryOp::Mul, self.clone(), rhs)
    }

    /// Sugar for `Pattern::binary(BinaryOp::Div, self.clone(), rhs)`.
    pub fn div(&self, rhs: Pattern) -> Pattern {
        Pattern::binary(BinaryOp::Div, self.clone(), rhs)
    }

    /// Sugar for `Pattern::binary(BinaryOp::Lshift, self.clone(), rhs)`.
    pub fn lshift(&self, rhs: Pattern) -> Pattern {
        Pattern::binary(BinaryOp::Lshift, self.clone(), rhs)
    }

    /// Sugar for `Pattern::binary(BinaryOp::Rshift, self.clone(), rhs)`.
    pub fn rshift(&self, rhs: Pattern) -> Pattern {
        Pattern::binary(BinaryOp::Rshift, self.clone(), rhs)
    }

    /// This pattern's direct sub-patterns, left-to-right. Empty for constants and variables.
    pub fn inputs(&self) -> Vec<&Pattern> {
        match self {
            Pattern::Constant(_) | Pattern::Variable(_) => Vec::new(),
            Pattern::Binary(_, lhs, rhs) => vec![lhs.as_ref(), rhs.as_ref()],
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Constant(v) => write!(f, "{v}"),
            Pattern::Variable(name) => write!(f, "{name}"),
            Pattern::Binary(op, lhs, rhs) => write!(f, "({lhs} {op} {rhs})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_infix_shape() {
        let x = Pattern::variable("x");
        let pat = x.mul(Pattern::constant(2));
        assert_eq!(pat.to_string(), "(x * 2)");
    }

    #[test]
    fn inputs_empty_for_terminals() {
        assert!(Pattern::constant(1).inputs().is_empty());
        assert!(Pattern::variable("x").inputs().is_empty());
        assert_eq!(
            Pattern::variable("x").add(Pattern::constant(1)).inputs().len(),
            2
        );
    }
}
