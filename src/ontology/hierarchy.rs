//! Ancestor walks over the inheritance graph.
//!
//! Inheritance edges point from child to parent or mixin, so "is `a` below
//! `b`" is plain reachability. All walks keep a visited set and terminate on
//! cyclic models.

use std::collections::HashSet;

use petgraph::Direction;
use petgraph::algo::has_path_connecting;
use petgraph::visit::EdgeRef;

use super::{BiolinkModel, Element, ElementId};

impl BiolinkModel {
    /// Whether `descendant` reaches `ancestor` through parent/mixin links.
    /// Reflexive.
    pub fn reaches(&self, descendant: ElementId, ancestor: ElementId) -> bool {
        has_path_connecting(&self.inheritance, descendant.node(), ancestor.node(), None)
    }

    /// Range compatibility: `candidate` is a descendant OR an ancestor of `range`.
    pub fn compatible(&self, candidate: ElementId, range: ElementId) -> bool {
        self.reaches(candidate, range) || self.reaches(range, candidate)
    }

    /// `start` followed by its ancestors in lookup order.
    ///
    /// Depth-first pre-order: an element's parent subtree is exhausted before
    /// its mixins, mixins in declaration order. Each ancestor appears once.
    pub fn ancestry(&self, start: ElementId) -> Vec<ElementId> {
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![start];

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            order.push(current);

            let mut ups: Vec<_> = self
                .inheritance
                .edges_directed(current.node(), Direction::Outgoing)
                .map(|edge| (*edge.weight(), ElementId::from_node(edge.target())))
                .collect();
            ups.sort_by_key(|&(link, _)| link);
            // Reverse so the parent is popped first.
            stack.extend(ups.into_iter().rev().map(|(_, id)| id).filter(|id| !visited.contains(id)));
        }
        order
    }

    /// First value produced by `f` along [`ancestry`](Self::ancestry).
    pub fn first_in_ancestry<T>(
        &self,
        start: ElementId,
        mut f: impl FnMut(&Element) -> Option<T>,
    ) -> Option<T> {
        self.ancestry(start)
            .into_iter()
            .find_map(|id| f(self.element(id)))
    }

    /// CURIEs of a class and its ancestors, in lookup order. Empty for
    /// unknown classes.
    pub fn ancestors(&self, category: &str) -> Vec<String> {
        match self.class(category) {
            Some(id) => self
                .ancestry(id)
                .into_iter()
                .map(|a| self.element(a).curie.clone())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Every `is_a` descendant of `root` in pre-order with its depth, root at
    /// depth 0. Children in declaration order.
    pub fn descendants(&self, root: ElementId) -> Vec<(ElementId, usize)> {
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![(root, 0usize)];

        while let Some((current, depth)) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            order.push((current, depth));
            for &child in self.element(current).children.iter().rev() {
                if !visited.contains(&child) {
                    stack.push((child, depth + 1));
                }
            }
        }
        order
    }
}
