//! Value-numbering hash-cons: assigns a stable integer to every structurally distinct term.
//!
//! Two distinct [`Node`] handles receive the same [`Vn`] iff they denote the same term shape.
//! This is the mechanism the rest of the engine leans on to decide "have I seen this shape
//! before" without ever comparing nodes structurally.

use crate::node::{BinaryOp, Node};
use std::collections::HashMap;

/// A value number: canonicalizes one structural shape. Immutable once assigned; meaningful only
/// relative to the [`Numberer`] instance that produced it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub struct Vn(pub(crate) usize);

impl Vn {
    /// The raw index backing this value number, for use as a dense array/map key.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Canonical key for a binary node: the value numbers of its (already-numbered) operands, plus
/// the operator. Two binary nodes get the same `Vn` iff their keys are equal.
type BinaryKey = (Vn, Vn, BinaryOp);

/// Assigns [`Vn`]s to [`Node`]s by hash-consing their canonical shape.
///
/// Maintains an identity cache (`node identity -> Vn`, so a node already seen short-circuits
/// immediately) plus three canonical-form tables, one per [`Node`] variant, so that two
/// *different* node allocations with the same shape still intern to one `Vn`.
pub struct Numberer {
    next_vn: usize,
    by_identity: HashMap<usize, Vn>,
    constants: HashMap<i64, Vn>,
    variables: HashMap<String, Vn>,
    binaries: HashMap<BinaryKey, Vn>,
}

impl Default for Numberer {
    fn default() -> Self {
        Self::new()
    }
}

impl Numberer {
    /// An empty numberer with no nodes seen yet.
    pub fn new() -> Numberer {
        Numberer {
            next_vn: 0,
            by_identity: HashMap::new(),
            constants: HashMap::new(),
            variables: HashMap::new(),
            binaries: HashMap::new(),
        }
    }

    /// Return `node`'s canonical value number, assigning a fresh one on first sight of a new
    /// structural shape and reusing an existing one otherwise.
    pub fn get_number(&mut self, node: &Node) -> Vn {
        let identity = node.identity();
        if let Some(vn) = self.by_identity.get(&identity) {
            return *vn;
        }
        let vn = self.number_by_shape(node);
        self.by_identity.insert(identity, vn);
        vn
    }

    /// Dispatch on the node's variant to build its canonical key and intern it. Recurses on
    /// binary children first, since a binary's key is built from its *operands'* value numbers.
    fn number_by_shape(&mut self, node: &Node) -> Vn {
        if let Some(value) = node.as_constant() {
            return Self::intern(&mut self.constants, &mut self.next_vn, value);
        }
        if let Some(name) = node.as_variable() {
            return Self::intern(&mut self.variables, &mut self.next_vn, name.to_string());
        }
        if let Some((op, lhs, rhs)) = node.as_binary() {
            let lhs_vn = self.get_number(lhs);
            let rhs_vn = self.get_number(rhs);
            return Self::intern(&mut self.binaries, &mut self.next_vn, (lhs_vn, rhs_vn, op));
        }
        unreachable!("Node is a closed enum of Constant | Variable | Binary");
    }

    /// Look up `node`'s value number without assigning one if it has never been seen: a
    /// read-only counterpart to [`Self::get_number`] for queries that must not mutate the
    /// numberer (see [`crate::egraph::EGraph::equivalent_to`]). Walks the canonical-form tables
    /// directly rather than the identity cache, since a query node may be a fresh allocation
    /// that structurally matches something already known.
    pub fn try_number(&self, node: &Node) -> Option<Vn> {
        if let Some(value) = node.as_constant() {
            return self.constants.get(&value).copied();
        }
        if let Some(name) = node.as_variable() {
            return self.variables.get(name).copied();
        }
        if let Some((op, lhs, rhs)) = node.as_binary() {
            let lhs_vn = self.try_number(lhs)?;
            let rhs_vn = self.try_number(rhs)?;
            return self.binaries.get(&(lhs_vn, rhs_vn, op)).copied();
        }
        unreachable!("Node is a closed enum of Constant | Variable | Binary")
    }

    /// Look `key` up in `table`, allocating a fresh monotonically increasing `Vn` on miss.
    fn intern<K: std::hash::Hash + Eq>(
        table: &mut HashMap<K, Vn>,
        next_vn: &mut usize,
        key: K,
    ) -> Vn {
        if let Some(vn) = table.get(&key) {
            return *vn;
        }
        let vn = Vn(*next_vn);
        *next_vn += 1;
        table.insert(key, vn);
        vn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// Structurally identical terms built from distinct node allocations share one Vn.
    fn structural_equality_shares_vn() {
        let mut numberer = Numberer::new();
        let a = Node::variable("x").mul(Node::constant(2));
        let b = Node::variable("x").mul(Node::constant(2));
        assert_ne!(a, b, "sanity: distinct allocations");
        assert_eq!(numberer.get_number(&a), numberer.get_number(&b));
    }

    #[test]
    /// Different shapes get different Vns.
    fn distinct_shapes_distinct_vn() {
        let mut numberer = Numberer::new();
        let mul = Node::variable("x").mul(Node::constant(2));
        let shift = Node::variable("x").lshift(Node::constant(1));
        assert_ne!(numberer.get_number(&mul), numberer.get_number(&shift));
    }

    #[test]
    /// Running the numberer twice on the same tree yields identical Vns in the same order.
    fn deterministic_across_runs() {
        let build = || Node::variable("x").mul(Node::constant(2)).div(Node::constant(2));

        let tree_a = build();
        let mut numberer_a = Numberer::new();
        let vn_a = numberer_a.get_number(&tree_a);

        let tree_b = build();
        let mut numberer_b = Numberer::new();
        let vn_b = numberer_b.get_number(&tree_b);

        assert_eq!(vn_a, vn_b);
    }

    #[test]
    fn repeated_lookup_is_idempotent() {
        let mut numberer = Numberer::new();
        let node = Node::constant(42);
        let first = numberer.get_number(&node);
        let second = numberer.get_number(&node);
        assert_eq!(first, second);
    }

    #[test]
    /// try_number finds a structurally-known shape without assigning a Vn to an unknown one.
    fn try_number_is_read_only() {
        let mut numberer = Numberer::new();
        let known = Node::variable("x").mul(Node::constant(2));
        let vn = numberer.get_number(&known);

        let same_shape = Node::variable("x").mul(Node::constant(2));
        assert_eq!(numberer.try_number(&same_shape), Some(vn));

        let unknown = Node::variable("x").div(Node::constant(2));
        assert_eq!(numberer.try_number(&unknown), None);
    }
}
