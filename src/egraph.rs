//! The e-graph: maintains equivalence classes under congruence closure and rule-driven
//! rewriting, and answers "what else is this node equal to".

use crate::instantiate::instantiate;
use crate::matcher::Matcher;
use crate::node::Node;
use crate::numberer::{Numberer, Vn};
use crate::rule::Rule;

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use indexmap::IndexSet;

/// Only emit trace-level saturation logging when the `trace-log` feature is enabled, so that a
/// default build never pays for checking the log level at every node visited during saturation.
macro_rules! trace_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "trace-log")]
        log::trace!($($arg)*);
    };
}

/// One equivalence class: a set of [`Node`]s sharing a [`Vn`] under the graph's current
/// equivalence relation. Wrapped in `Rc<RefCell<_>>` so that, per Invariant I2, multiple `Vn`
/// keys can alias one underlying set: merging two classes mutates the destination set in place
/// and rebinds the aliased keys to it, rather than copying members into a brand-new set that
/// some `Vn` keys would still point past.
type EClass = Rc<RefCell<IndexSet<Node, fxhash::FxBuildHasher>>>;

fn new_eclass(node: Node) -> EClass {
    let mut set = IndexSet::with_hasher(fxhash::FxBuildHasher::default());
    set.insert(node);
    Rc::new(RefCell::new(set))
}

/// Maintains the equivalence relation over [`Node`]s reachable from one root, built once by
/// [`EGraph::new`] and queried afterward. There is no incremental "add after construction" API;
/// saturation runs to completion inside the constructor.
pub struct EGraph {
    rules: Vec<Rule>,
    root: Node,
    numberer: Numberer,
    vn_to_eclass: HashMap<Vn, EClass>,
}

impl EGraph {
    /// Build an e-graph over `root` and run one bounded saturation pass applying `rules`.
    ///
    /// Seeds a singleton e-class for every node reachable from `root` (first node of a given
    /// shape wins, see [`Self::add_single_node`]), then performs a single post-order
    /// traversal that, at each node, closes over congruence across its (possibly already
    /// enriched) children's e-classes and tries every rule's left-hand side against every node
    /// currently in the node's e-class. New nodes introduced by a rewrite are not themselves
    /// re-traversed this pass (see `SPEC_FULL.md` §9: bounded, not fixpoint, saturation).
    pub fn new(rules: &[Rule], root: Node) -> EGraph {
        let mut egraph = EGraph {
            rules: rules.to_vec(),
            root: root.clone(),
            numberer: Numberer::new(),
            vn_to_eclass: HashMap::new(),
        };
        egraph.seed(&root);
        let mut visited = HashSet::new();
        egraph.traverse_and_rewrite(&root, &mut visited);
        egraph
    }

    /// The root this e-graph was constructed from.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// The rules this e-graph was constructed with.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The e-class of `node`: every node currently known to be equivalent to it, including
    /// itself. `O(1)` modulo the value-number lookup. A node never seen by this e-graph (not
    /// reachable from root, and not structurally identical to anything that is) comes back as a
    /// singleton containing only itself.
    pub fn equivalent_to(&self, node: &Node) -> Vec<Node> {
        match self.numberer.try_number(node) {
            Some(vn) => match self.vn_to_eclass.get(&vn) {
                Some(eclass) => eclass.borrow().iter().cloned().collect(),
                None => vec![node.clone()],
            },
            None => vec![node.clone()],
        }
    }

    /// Whether `a` and `b` are in the same e-class, compared structurally rather than by node
    /// identity. `a` and `b` need not be the exact node objects the e-graph holds: a caller-built
    /// node structurally equal to one the e-graph already knows resolves to the same value
    /// number via [`Numberer::try_number`], so this answers "is some node shaped like `b` in the
    /// class of some node shaped like `a`", which is what `equivalent_to(a).contains(b)` cannot
    /// do (`Node`'s `PartialEq` is identity, see `node.rs`).
    ///
    /// `false` for any node neither reachable from root nor structurally identical to anything
    /// that is, since [`Numberer::try_number`] has no value number to resolve it to.
    pub fn are_equivalent(&self, a: &Node, b: &Node) -> bool {
        let (Some(vn_a), Some(vn_b)) = (self.numberer.try_number(a), self.numberer.try_number(b))
        else {
            return false;
        };
        let class_a = self
            .vn_to_eclass
            .get(&vn_a)
            .expect("a value number known to the numberer was seeded into an e-class");
        let class_b = self
            .vn_to_eclass
            .get(&vn_b)
            .expect("a value number known to the numberer was seeded into an e-class");
        Rc::ptr_eq(class_a, class_b)
    }

    /// Every node held by any e-class, in deterministic (ascending value-number, then
    /// e-class insertion) order. Multiple value numbers can alias one underlying e-class (per
    /// Invariant I2); each distinct e-class is only emitted once, at the position of the
    /// smallest value number that resolves to it.
    pub fn all_nodes(&self) -> Vec<Node> {
        let mut vns: Vec<&Vn> = self.vn_to_eclass.keys().collect();
        vns.sort_by_key(|vn| vn.index());

        let mut seen_classes = HashSet::new();
        let mut out = Vec::new();
        for vn in vns {
            let eclass = &self.vn_to_eclass[vn];
            if seen_classes.insert(Rc::as_ptr(eclass) as usize) {
                out.extend(eclass.borrow().iter().cloned());
            }
        }
        out
    }

    /// Seed a singleton e-class for every node reachable from `root`, deduplicated by identity
    /// (a node shared at several tree positions is only added once).
    fn seed(&mut self, root: &Node) {
        let mut seen = HashSet::new();
        self.seed_rec(root, &mut seen);
    }

    fn seed_rec(&mut self, node: &Node, seen: &mut HashSet<usize>) {
        if !seen.insert(node.identity()) {
            return;
        }
        self.add_single_node(node);
        for input in node.inputs() {
            self.seed_rec(&input, seen);
        }
    }

    /// Post-order traversal that drives congruence closure and rule application. Each value
    /// number is processed at most once per pass; `visited` is keyed by `Vn`, not node
    /// identity, so a shape that recurs at several tree positions (e.g. a shared `x` used twice)
    /// is only closed over once; its e-class is already available to whichever parent asks for
    /// it afterward.
    fn traverse_and_rewrite(&mut self, node: &Node, visited: &mut HashSet<Vn>) {
        let vn = self.numberer.get_number(node);
        if !visited.insert(vn) {
            return;
        }

        let inputs = node.inputs();
        for input in &inputs {
            self.traverse_and_rewrite(input, visited);
        }

        self.close_congruence(node, &inputs);
        self.apply_rules(node);
    }

    /// For every combination of inputs drawn from the (already computed) e-classes of `node`'s
    /// original children (the Cartesian product across child e-classes), synthesize a sibling
    /// node with those inputs substituted and union it with `node`'s e-class. This realizes
    /// `x ≡ y ⇒ f(x) ≡ f(y)`.
    fn close_congruence(&mut self, node: &Node, inputs: &[Node]) {
        if inputs.is_empty() {
            return;
        }
        let child_classes: Vec<Vec<Node>> = inputs
            .iter()
            .map(|child| {
                let vn = self.numberer.get_number(child);
                self.vn_to_eclass
                    .get(&vn)
                    .expect("child was seeded before its parent is traversed")
                    .borrow()
                    .iter()
                    .cloned()
                    .collect()
            })
            .collect();

        for combo in cartesian_product(&child_classes) {
            let sibling = copy_with_inputs(node, &combo);
            trace_log!("congruence: {node} ~ {sibling}");
            self.add_single_node(&sibling);
            self.merge(node, &sibling);
        }
    }

    /// For every node currently in `node`'s e-class, try every rule's left-hand side; on a
    /// match, instantiate the right-hand side under the bindings and union it with the matched
    /// node.
    fn apply_rules(&mut self, node: &Node) {
        let vn = self.numberer.get_number(node);
        let members: Vec<Node> = self
            .vn_to_eclass
            .get(&vn)
            .expect("node was seeded before rules are applied to it")
            .borrow()
            .iter()
            .cloned()
            .collect();

        for rule in self.rules.clone() {
            let matcher = Matcher::new(&rule.lhs);
            for member in &members {
                if let Some(bindings) = matcher.match_node(member) {
                    let rewritten = instantiate(&rule.rhs, &bindings);
                    trace_log!("rewrite: {member} -> {rewritten} via {} => {}", rule.lhs, rule.rhs);
                    self.add_single_node(&rewritten);
                    self.merge(member, &rewritten);
                }
            }
        }
    }

    /// Add `node` to its own singleton e-class, keyed by its value number. Idempotent on value
    /// number: if the value number already has an e-class, `node` is *not* added (the first node
    /// of a given shape wins). Returns whether `node` was newly added.
    fn add_single_node(&mut self, node: &Node) -> bool {
        let vn = self.numberer.get_number(node);
        if self.vn_to_eclass.contains_key(&vn) {
            return false;
        }
        self.vn_to_eclass.insert(vn, new_eclass(node.clone()));
        true
    }

    /// Union `a`'s and `b`'s e-classes. No-op if they already resolve to the same underlying
    /// set. Otherwise the larger class (by member count) becomes the destination, the smaller
    /// class's members are copied in, and, per Invariant I2, *every* value number of *every*
    /// moved member (not just `a`'s and `b`'s own) is rebound to the destination set, since the
    /// smaller class may itself already be the aliased target of several prior merges.
    fn merge(&mut self, a: &Node, b: &Node) {
        let vn_a = self.numberer.get_number(a);
        let vn_b = self.numberer.get_number(b);
        let class_a = self.vn_to_eclass[&vn_a].clone();
        let class_b = self.vn_to_eclass[&vn_b].clone();

        if Rc::ptr_eq(&class_a, &class_b) {
            return;
        }

        let (from, to) = if class_a.borrow().len() > class_b.borrow().len() {
            (class_b, class_a)
        } else {
            (class_a, class_b)
        };

        let moved: Vec<Node> = from.borrow().iter().cloned().collect();
        to.borrow_mut().extend(moved.iter().cloned());
        for node in &moved {
            let vn = self.numberer.get_number(node);
            self.vn_to_eclass.insert(vn, to.clone());
        }
    }
}

/// Cartesian product of a list of non-empty candidate lists, preserving the order of `lists` and
/// the insertion order within each list.
fn cartesian_product(lists: &[Vec<Node>]) -> Vec<Vec<Node>> {
    let mut combos: Vec<Vec<Node>> = vec![Vec::new()];
    for list in lists {
        let mut next = Vec::with_capacity(combos.len() * list.len());
        for prefix in &combos {
            for item in list {
                let mut combo = prefix.clone();
                combo.push(item.clone());
                next.push(combo);
            }
        }
        combos = next;
    }
    combos
}

/// Clone `node` with its inputs substituted by `new_inputs`. Only meaningful for binary nodes;
/// congruence closure is never invoked with a terminal node's (empty) input list.
fn copy_with_inputs(node: &Node, new_inputs: &[Node]) -> Node {
    let (op, _, _) = node
        .as_binary()
        .expect("congruence closure only substitutes inputs of binary nodes");
    assert_eq!(new_inputs.len(), 2, "BinaryNode has exactly two inputs");
    Node::binary(op, new_inputs[0].clone(), new_inputs[1].clone())
}
