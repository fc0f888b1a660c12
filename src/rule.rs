//! Rewrite rules: an ordered pair of patterns asserting that any sub-term matching the left-hand
//! side is equivalent to the instantiation of the right-hand side under the match's bindings.

use crate::error::EqSatError;
use crate::pattern::Pattern;

/// `lhs ⇒ rhs`: wherever `lhs` matches a node, that node is unioned with `rhs` instantiated
/// under the match's bindings. Rules are owned by the caller and borrowed for the lifetime of
/// [`crate::egraph::EGraph::new`]'s saturation pass; there is no bidirectional or repeated
/// application within one pass (see `SPEC_FULL.md` §1 Non-goals).
#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    pub lhs: Pattern,
    pub rhs: Pattern,
}

impl Rule {
    /// Build a rule `lhs => rhs`.
    ///
    /// Plain construction never fails; use [`Rule::checked`] if you want the (optional) free
    /// variable name validation.
    pub fn new(lhs: Pattern, rhs: Pattern) -> Rule {
        Rule { lhs, rhs }
    }

    /// Build a rule `lhs => rhs`, rejecting an empty pattern-variable name anywhere in either
    /// side. Plain [`Rule::new`] does not perform this check; it exists for callers building
    /// rules from untrusted or generated pattern names who want to fail fast rather than later
    /// get a variable literally named `""`.
    pub fn checked(lhs: Pattern, rhs: Pattern) -> Result<Rule, EqSatError> {
        if has_empty_variable_name(&lhs) || has_empty_variable_name(&rhs) {
            return Err(EqSatError::EmptyVariableName);
        }
        Ok(Rule { lhs, rhs })
    }
}

fn has_empty_variable_name(pattern: &Pattern) -> bool {
    match pattern {
        Pattern::Variable(name) => name.is_empty(),
        Pattern::Constant(_) => false,
        Pattern::Binary(_, lhs, rhs) => has_empty_variable_name(lhs) || has_empty_variable_name(rhs),
    }
}
