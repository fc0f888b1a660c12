//! Structural matching of a [`Pattern`] against a candidate [`Node`].

use crate::node::Node;
use crate::pattern::Pattern;
use std::collections::HashMap;

/// A successful match's bindings: pattern-variable name -> the `Node` it matched.
///
/// Always a `VariableNode` per spec: a `Pattern::Variable` can only ever bind against a
/// `Node::variable`, never a constant or binary node (see [`Matcher::match_single`]).
pub type Bindings = HashMap<String, Node>;

/// Matches a fixed root [`Pattern`] against candidate nodes.
///
/// A `Matcher` is a pure, stateless-between-calls predicate: [`Matcher::match_node`] resets its
/// bindings on every call, so repeated calls against the same or different nodes never leak
/// state into each other and a `Matcher` can be reused (or shared read-only) across many match
/// attempts.
pub struct Matcher<'p> {
    pattern: &'p Pattern,
}

impl<'p> Matcher<'p> {
    /// A matcher for `pattern`.
    pub fn new(pattern: &'p Pattern) -> Matcher<'p> {
        Matcher { pattern }
    }

    /// Try to match this matcher's pattern against `root`. On success, returns the bindings from
    /// each `Pattern::Variable` name in the pattern to the `Node` it matched; on failure, `None`.
    pub fn match_node(&self, root: &Node) -> Option<Bindings> {
        let mut bindings = Bindings::new();
        if Self::match_rec(self.pattern, root, &mut bindings) {
            Some(bindings)
        } else {
            None
        }
    }

    /// Recursive structural walk in lockstep over `pattern` and `node`, accumulating into
    /// `bindings`. All-or-nothing: a failure anywhere discards whatever was bound so far (the
    /// caller throws away `bindings` when this returns `false`).
    fn match_rec(pattern: &Pattern, node: &Node, bindings: &mut Bindings) -> bool {
        if !Self::match_single(pattern, node, bindings) {
            return false;
        }
        let pattern_inputs = pattern.inputs();
        let node_inputs = node.inputs();
        if pattern_inputs.len() != node_inputs.len() {
            return false;
        }
        pattern_inputs
            .iter()
            .zip(node_inputs.iter())
            .all(|(p, n)| Self::match_rec(p, n, bindings))
    }

    /// Shape check for a single (pattern, node) pair, ignoring children; arity and recursion
    /// into children is handled by the caller, [`Self::match_rec`].
    fn match_single(pattern: &Pattern, node: &Node, bindings: &mut Bindings) -> bool {
        match pattern {
            Pattern::Constant(value) => node.as_constant() == Some(*value),
            Pattern::Variable(name) => Self::match_variable(name, node, bindings),
            Pattern::Binary(op, _, _) => node.as_binary().is_some_and(|(node_op, _, _)| node_op == *op),
        }
    }

    /// A `VariablePattern` matches only a `VariableNode`. Binds on first encounter of `name`; on
    /// a repeat encounter, requires identity with the prior binding. This is what makes a
    /// pattern like `X + X` refuse to match `x + y`.
    fn match_variable(name: &str, node: &Node, bindings: &mut Bindings) -> bool {
        let Some(_) = node.as_variable() else {
            return false;
        };
        match bindings.get(name) {
            Some(bound) => bound == node,
            None => {
                bindings.insert(name.to_string(), node.clone());
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::BinaryOp;

    #[test]
    /// A pattern variable named "x" matches only a variable node literally named "x".
    fn variable_pattern_matches_by_name() {
        let pattern = Pattern::variable("x");
        let matcher = Matcher::new(&pattern);

        assert!(matcher.match_node(&Node::variable("x")).is_some());
        assert!(matcher.match_node(&Node::variable("y")).is_none());
        assert!(matcher.match_node(&Node::constant(1)).is_none());
    }

    #[test]
    /// A ConstantPattern matches only a ConstantNode with an equal value.
    fn constant_pattern_matches_by_value() {
        let pattern = Pattern::constant(42);
        let matcher = Matcher::new(&pattern);

        assert!(matcher.match_node(&Node::constant(42)).is_some());
        assert!(matcher.match_node(&Node::constant(7)).is_none());
        assert!(matcher.match_node(&Node::variable("x")).is_none());
    }

    #[test]
    /// An op mismatch never matches, regardless of operand equivalence.
    fn op_mismatch_never_matches() {
        let pattern = Pattern::variable("x").add(Pattern::constant(2));
        let matcher = Matcher::new(&pattern);

        let x = Node::variable("x");
        assert!(matcher.match_node(&x.add(Node::constant(2))).is_some());
        assert!(matcher.match_node(&x.sub(Node::constant(2))).is_none());
    }

    #[test]
    /// Pattern `X + X` matches `x + x` but not `x + y`: repeated pattern variables require
    /// identity with the prior binding, not just equal names.
    fn double_variable_requires_identity() {
        let pattern = Pattern::variable("x").add(Pattern::variable("x"));
        let matcher = Matcher::new(&pattern);

        let x = Node::variable("x");
        let y = Node::variable("y");
        assert!(matcher.match_node(&x.add(x.clone())).is_some());
        assert!(matcher.match_node(&x.add(y)).is_none());
    }

    #[test]
    /// Bindings name the matched variable node.
    fn bindings_name_matched_nodes() {
        let pattern = Pattern::variable("x").mul(Pattern::constant(2));
        let matcher = Matcher::new(&pattern);

        let x = Node::variable("x");
        let bindings = matcher.match_node(&x.mul(Node::constant(2))).unwrap();
        assert_eq!(bindings.get("x"), Some(&x));
    }

    #[test]
    /// match_node is pure: repeated calls don't leak state between calls, and a non-matching
    /// call after a matching one doesn't see stale bindings.
    fn repeated_calls_do_not_leak_state() {
        let pattern = Pattern::variable("x");
        let matcher = Matcher::new(&pattern);

        let x = Node::variable("x");
        let y = Node::variable("y");
        let first = matcher.match_node(&x).unwrap();
        assert_eq!(first.get("x"), Some(&x));

        // A second, different node still binds fresh; it doesn't see the first call's "x".
        let second = matcher.match_node(&y).unwrap();
        assert_eq!(second.get("x"), Some(&y));
    }

    #[test]
    fn arity_mismatch_is_not_a_match() {
        // Sanity: a Binary pattern against a terminal node of any kind fails cleanly rather than
        // panicking; arity is checked alongside the shape check in match_rec.
        let pattern = Pattern::binary(BinaryOp::Add, Pattern::constant(1), Pattern::constant(2));
        let matcher = Matcher::new(&pattern);
        assert!(matcher.match_node(&Node::constant(1)).is_none());
    }
}
