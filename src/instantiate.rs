//! Substitution: turns a [`Pattern`] plus a prior match's [`Bindings`] into a fresh [`Node`] tree.
//!
//! Typically run on a rule's right-hand side after its left-hand side matched, see
//! [`crate::egraph::EGraph`].

use crate::matcher::Bindings;
use crate::node::Node;
use crate::pattern::Pattern;

/// Instantiate `pattern` under `bindings`, producing a fresh `Node` tree.
///
/// - `Pattern::Constant(v)` becomes `Node::constant(v)`.
/// - `Pattern::Variable(name)` becomes the node bound to `name` in `bindings`, or, if `name` is
///   unbound, a fresh free `Node::variable(name)`. Synthesizing a fresh variable for an unbound
///   name (rather than rejecting the pattern) is a deliberate choice carried over from the
///   source; see `SPEC_FULL.md` §9 Open Question 1.
/// - `Pattern::Binary(op, lhs, rhs)` recurses into both sides and rebuilds the binary node.
pub fn instantiate(pattern: &Pattern, bindings: &Bindings) -> Node {
    match pattern {
        Pattern::Constant(value) => Node::constant(*value),
        Pattern::Variable(name) => bindings
            .get(name)
            .cloned()
            .unwrap_or_else(|| Node::variable(name.clone())),
        Pattern::Binary(op, lhs, rhs) => {
            let lhs = instantiate(lhs, bindings);
            let rhs = instantiate(rhs, bindings);
            Node::binary(*op, lhs, rhs)
        }
    }
}
