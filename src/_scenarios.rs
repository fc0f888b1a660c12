//! **(internal)** End-to-end saturation scenarios exercising [`crate::egraph::EGraph`] as a
//! whole, rather than one component in isolation.

use crate::egraph::EGraph;
use crate::node::{BinaryOp, Node};
use crate::pattern::Pattern;
use crate::rule::Rule;

fn mul_to_shift() -> Rule {
    let x = Pattern::variable("x");
    Rule::new(x.mul(Pattern::constant(2)), x.lshift(Pattern::constant(1)))
}

fn div_cancellation() -> Rule {
    let x = Pattern::variable("x");
    Rule::new(x.mul(Pattern::constant(2)).div(Pattern::constant(2)), x)
}

#[test]
/// `x * 2` rewrites to `x << 1`, and the two are each other's equivalents afterward.
fn scenario_mul_to_shift() {
    let x = Node::variable("x");
    let root = x.mul(Node::constant(2));

    let egraph = EGraph::new(&[mul_to_shift()], root.clone());

    let shifted = x.lshift(Node::constant(1));
    assert!(egraph.equivalent_to(&root).contains(&root));
    assert!(egraph.are_equivalent(&root, &shifted));
}

#[test]
/// `(x * 2) / 2` cancels down to `x`.
fn scenario_div_cancellation() {
    let x = Node::variable("x");
    let root = x.mul(Node::constant(2)).div(Node::constant(2));

    let egraph = EGraph::new(&[div_cancellation()], root.clone());

    assert!(egraph.equivalent_to(&root).contains(&x));
}

#[test]
/// Combined and nested: `((x * 2) / 2) * 2 / 2` must saturate down to `x` in one pass, which
/// requires cancellation to fire on the inner sub-term, congruence to lift that equivalence up
/// into the outer term, and cancellation to fire there too.
fn scenario_combined_nested() {
    let x = Node::variable("x");
    let inner = x.mul(Node::constant(2)).div(Node::constant(2));
    let root = inner.mul(Node::constant(2)).div(Node::constant(2));

    let rules = [mul_to_shift(), div_cancellation()];
    let egraph = EGraph::new(&rules, root.clone());

    assert!(egraph.equivalent_to(&root).contains(&x));
    assert!(egraph.equivalent_to(&inner).contains(&x));
}

#[test]
/// A rule whose left-hand side never matches anything in the tree leaves the e-graph exactly as
/// congruence-only seeding would: no shift node appears anywhere, and `x * 3`'s class is itself.
fn scenario_non_matching_rule() {
    let x = Node::variable("x");
    let root = x.mul(Node::constant(3));

    let egraph = EGraph::new(&[mul_to_shift()], root.clone());

    assert_eq!(egraph.equivalent_to(&root), vec![root]);
    assert!(egraph
        .all_nodes()
        .iter()
        .all(|node| node.as_binary().map(|(op, ..)| op) != Some(BinaryOp::Lshift)));
}

#[test]
/// No rules at all: `(x * 2) + (x * 2)` is closed under congruence alone. The two `x * 2`
/// sub-terms are distinct allocations of the same shape, so the hash-cons keeps exactly one
/// representative of that shape rather than tracking both occurrences separately.
fn scenario_congruence_only() {
    let x = Node::variable("x");
    let first_double = x.mul(Node::constant(2));
    let second_double = x.mul(Node::constant(2));
    let root = first_double.add(second_double);

    let egraph = EGraph::new(&[], root.clone());

    assert_eq!(egraph.equivalent_to(&first_double).len(), 1);
    assert!(egraph.equivalent_to(&root).contains(&root));
}

#[test]
/// A rule keyed on a repeated pattern variable (`X + X => X * 2`) only fires where the same node
/// genuinely occurs on both sides of the addition, never merely a same-named different node.
fn scenario_double_variable_identity() {
    let double_to_mul = {
        let v = Pattern::variable("v");
        Rule::new(v.add(v.clone()), v.mul(Pattern::constant(2)))
    };

    let x = Node::variable("x");
    let self_sum = x.add(x.clone());
    let egraph = EGraph::new(&[double_to_mul.clone()], self_sum.clone());
    assert!(egraph.are_equivalent(&self_sum, &x.mul(Node::constant(2))));

    let y = Node::variable("y");
    let mixed_sum = x.add(y);
    let egraph = EGraph::new(&[double_to_mul], mixed_sum.clone());
    assert_eq!(egraph.equivalent_to(&mixed_sum), vec![mixed_sum]);
}
