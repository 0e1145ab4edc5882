//! Pre-order traversal of predicate trees.
//!
//! Nodes carry no parent references. A [`Visitor`] receives each node
//! together with the path of its ancestors, root first.
//!
//! ```rust
//! use std::ops::ControlFlow;
//! use sieve_query::{Predicate, Comparison};
//! use sieve_query::visit::{walk, Visitor};
//!
//! struct NegatedLeaves(usize);
//!
//! impl<'a> Visitor<'a> for NegatedLeaves {
//!     fn visit(&mut self, node: &'a Predicate, ancestors: &[&'a Predicate]) -> ControlFlow<()> {
//!         if node.is_leaf() && ancestors.iter().any(|a| matches!(a, Predicate::Not(_))) {
//!             self.0 += 1;
//!         }
//!         ControlFlow::Continue(())
//!     }
//! }
//!
//! let tree = Predicate::negate(Predicate::value("a", Comparison::Eq, 1));
//! let mut counter = NegatedLeaves(0);
//! walk(&tree, &mut counter);
//! assert_eq!(counter.0, 1);
//! ```

use std::ops::ControlFlow;

use indexmap::IndexSet;
use smallvec::SmallVec;

use crate::predicate::Predicate;

/// Receives nodes during a [`walk`].
pub trait Visitor<'a> {
    /// Visit a node. `ancestors` lists its parents, root first.
    ///
    /// Returning `Break` stops the walk.
    fn visit(&mut self, node: &'a Predicate, ancestors: &[&'a Predicate]) -> ControlFlow<()>;
}

/// Walk a tree in pre-order. Returns `Break` if the visitor stopped early.
pub fn walk<'a, V: Visitor<'a>>(root: &'a Predicate, visitor: &mut V) -> ControlFlow<()> {
    let mut ancestors = SmallVec::new();
    walk_inner(root, &mut ancestors, visitor)
}

type Ancestors<'a> = SmallVec<[&'a Predicate; 16]>;

fn walk_inner<'a, V: Visitor<'a>>(
    node: &'a Predicate,
    ancestors: &mut Ancestors<'a>,
    visitor: &mut V,
) -> ControlFlow<()> {
    visitor.visit(node, &ancestors[..])?;

    ancestors.push(node);
    for child in node.children() {
        if walk_inner(child, ancestors, visitor).is_break() {
            ancestors.pop();
            return ControlFlow::Break(());
        }
    }
    ancestors.pop();
    ControlFlow::Continue(())
}

/// Collects distinct field names in first-seen order.
#[derive(Debug, Default)]
pub struct FieldCollector<'a> {
    fields: IndexSet<&'a str>,
}

impl<'a> FieldCollector<'a> {
    /// Get the collected fields.
    pub fn into_fields(self) -> Vec<&'a str> {
        self.fields.into_iter().collect()
    }
}

impl<'a> Visitor<'a> for FieldCollector<'a> {
    fn visit(&mut self, node: &'a Predicate, _ancestors: &[&'a Predicate]) -> ControlFlow<()> {
        if let Some(field) = node.field() {
            self.fields.insert(field);
        }
        ControlFlow::Continue(())
    }
}

/// Finds the first node deeper than a limit.
#[derive(Debug)]
pub struct DepthProbe {
    limit: usize,
    exceeded_at: Option<String>,
}

impl DepthProbe {
    /// Create a probe for trees deeper than `limit` levels.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            exceeded_at: None,
        }
    }

    /// Rendered form of the first node found beyond the limit.
    pub fn exceeded_at(&self) -> Option<&str> {
        self.exceeded_at.as_deref()
    }
}

impl<'a> Visitor<'a> for DepthProbe {
    fn visit(&mut self, node: &'a Predicate, ancestors: &[&'a Predicate]) -> ControlFlow<()> {
        if ancestors.len() >= self.limit {
            self.exceeded_at = Some(node.to_string());
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::Comparison;

    struct Recorder(Vec<(String, usize)>);

    impl<'a> Visitor<'a> for Recorder {
        fn visit(&mut self, node: &'a Predicate, ancestors: &[&'a Predicate]) -> ControlFlow<()> {
            self.0.push((node.to_string(), ancestors.len()));
            ControlFlow::Continue(())
        }
    }

    #[test]
    fn test_walk_pre_order_with_ancestors() {
        let tree = Predicate::or([
            Predicate::value("a", Comparison::Eq, 1),
            Predicate::negate(Predicate::is_null("b", true)),
        ]);

        let mut recorder = Recorder(Vec::new());
        assert!(walk(&tree, &mut recorder).is_continue());
        assert_eq!(
            recorder.0,
            vec![
                ("OR(a = 1, NOT(b IS NULL))".to_string(), 0),
                ("a = 1".to_string(), 1),
                ("NOT(b IS NULL)".to_string(), 1),
                ("b IS NULL".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_field_collector() {
        let tree = Predicate::and([
            Predicate::value("x", Comparison::Eq, 1),
            Predicate::in_list("y", [1]),
            Predicate::value("x", Comparison::Gt, 0),
            Predicate::fulltext("hello"),
        ]);
        assert_eq!(tree.fields(), vec!["x", "y"]);
    }

    #[test]
    fn test_depth_probe_stops() {
        let tree = Predicate::negate(Predicate::negate(Predicate::negate(Predicate::FindAll)));

        let mut probe = DepthProbe::new(2);
        assert!(walk(&tree, &mut probe).is_break());
        assert_eq!(probe.exceeded_at(), Some("NOT(FIND_ALL)"));

        let mut probe = DepthProbe::new(10);
        assert!(walk(&tree, &mut probe).is_continue());
        assert_eq!(probe.exceeded_at(), None);
    }
}
