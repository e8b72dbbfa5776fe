//! Prerequisite graph between activities.
//!
//! Maps an event to the ordered list of activities that must finish before
//! it starts. The graph is acyclic at all times: an edge that would close a
//! cycle is rolled back before the error is returned.
//!
//! # Algorithm
//! Cycle detection and ordering are both depth-first searches. A back-edge
//! (reaching a node already on the recursion stack) means a cycle.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{Activity, ActivityId, FlexibleActivity};
use crate::error::{PlannerError, Result};

/// One event and its prerequisites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEntry {
    pub event: ActivityId,
    pub prerequisites: Vec<ActivityId>,
}

/// Acyclic "must happen before" relation, keyed by [`ActivityId`].
///
/// Entries keep insertion order so that ordering is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyGraph {
    entries: Vec<DependencyEntry>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares that `event` requires `prerequisite` to finish first.
    ///
    /// # Errors
    /// [`PlannerError::CircularDependency`] if the edge would close a cycle.
    /// The graph is left exactly as it was before the call.
    pub fn add_dependency(
        &mut self,
        event: &impl Activity,
        prerequisite: &impl Activity,
    ) -> Result<()> {
        self.add_dependency_ids(event.id(), prerequisite.id())
    }

    /// Id-based form of [`add_dependency`](Self::add_dependency).
    pub fn add_dependency_ids(&mut self, event: ActivityId, prerequisite: ActivityId) -> Result<()> {
        if self.dependencies_of(event).contains(&prerequisite) {
            return Ok(());
        }

        let created = match self.position(event) {
            Some(idx) => {
                self.entries[idx].prerequisites.push(prerequisite);
                false
            }
            None => {
                self.entries.push(DependencyEntry {
                    event,
                    prerequisites: vec![prerequisite],
                });
                true
            }
        };

        if self.has_cycle() {
            // Roll back the edge we just added.
            if created {
                self.entries.pop();
            } else if let Some(idx) = self.position(event) {
                self.entries[idx].prerequisites.pop();
            }
            return Err(PlannerError::CircularDependency {
                event,
                prerequisite,
            });
        }

        Ok(())
    }

    /// Removes one edge. Drops the event's entry when it has no
    /// prerequisites left.
    pub fn remove_dependency(&mut self, event: &impl Activity, prerequisite: &impl Activity) {
        self.remove_dependency_ids(event.id(), prerequisite.id());
    }

    /// Id-based form of [`remove_dependency`](Self::remove_dependency).
    pub fn remove_dependency_ids(&mut self, event: ActivityId, prerequisite: ActivityId) {
        if let Some(idx) = self.position(event) {
            self.entries[idx].prerequisites.retain(|p| *p != prerequisite);
            if self.entries[idx].prerequisites.is_empty() {
                self.entries.remove(idx);
            }
        }
    }

    /// Prerequisites of `event`; empty for unknown events.
    pub fn dependencies_of(&self, event: ActivityId) -> &[ActivityId] {
        self.position(event)
            .map(|idx| self.entries[idx].prerequisites.as_slice())
            .unwrap_or(&[])
    }

    /// Events that list `prerequisite` among their prerequisites.
    pub fn dependents_of(&self, prerequisite: ActivityId) -> Vec<ActivityId> {
        self.entries
            .iter()
            .filter(|e| e.prerequisites.contains(&prerequisite))
            .map(|e| e.event)
            .collect()
    }

    /// Whether `event` has declared prerequisites.
    pub fn contains(&self, event: ActivityId) -> bool {
        self.position(event).is_some()
    }

    /// Whether anything depends on `id`.
    pub fn is_prerequisite(&self, id: ActivityId) -> bool {
        self.entries.iter().any(|e| e.prerequisites.contains(&id))
    }

    /// All entries, in insertion order.
    pub fn entries(&self) -> &[DependencyEntry] {
        &self.entries
    }

    /// Rebuilds a graph from persisted entries, re-checking acyclicity.
    pub fn from_entries(entries: impl IntoIterator<Item = DependencyEntry>) -> Result<Self> {
        let mut graph = Self::new();
        for entry in entries {
            for prerequisite in entry.prerequisites {
                graph.add_dependency_ids(entry.event, prerequisite)?;
            }
        }
        Ok(graph)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.entries.iter().map(|e| e.prerequisites.len()).sum()
    }

    /// Orders flexible activities so every prerequisite precedes its
    /// dependents.
    ///
    /// Activities without declared prerequisites come first, in their
    /// original relative order. The remaining activities follow in DFS
    /// post-order over the graph's events. Graph nodes that are not among
    /// `activities` are skipped.
    pub fn topological_order<'a>(
        &self,
        activities: &'a [FlexibleActivity],
    ) -> Vec<&'a FlexibleActivity> {
        let by_id: HashMap<ActivityId, &FlexibleActivity> =
            activities.iter().map(|a| (a.id, a)).collect();

        let mut order: Vec<&FlexibleActivity> = activities
            .iter()
            .filter(|a| !self.contains(a.id))
            .collect();

        let mut visited = HashSet::new();
        let mut post_order = Vec::new();
        for entry in &self.entries {
            self.post_order_dfs(entry.event, &mut visited, &mut post_order);
        }

        order.extend(
            post_order
                .into_iter()
                .filter(|id| self.contains(*id))
                .filter_map(|id| by_id.get(&id).copied()),
        );
        order
    }

    fn post_order_dfs(
        &self,
        node: ActivityId,
        visited: &mut HashSet<ActivityId>,
        out: &mut Vec<ActivityId>,
    ) {
        if !visited.insert(node) {
            return;
        }
        for &prerequisite in self.dependencies_of(node) {
            self.post_order_dfs(prerequisite, visited, out);
        }
        out.push(node);
    }

    fn position(&self, event: ActivityId) -> Option<usize> {
        self.entries.iter().position(|e| e.event == event)
    }

    fn has_cycle(&self) -> bool {
        let mut visited = HashSet::new();
        let mut in_stack = HashSet::new();
        self.entries.iter().any(|entry| {
            !visited.contains(&entry.event)
                && self.has_cycle_dfs(entry.event, &mut visited, &mut in_stack)
        })
    }

    fn has_cycle_dfs(
        &self,
        node: ActivityId,
        visited: &mut HashSet<ActivityId>,
        in_stack: &mut HashSet<ActivityId>,
    ) -> bool {
        visited.insert(node);
        in_stack.insert(node);

        for &next in self.dependencies_of(node) {
            if in_stack.contains(&next) {
                return true; // Back edge → cycle
            }
            if !visited.contains(&next) && self.has_cycle_dfs(next, visited, in_stack) {
                return true;
            }
        }

        in_stack.remove(&node);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CalendarDate;

    fn flex(name: &str) -> FlexibleActivity {
        FlexibleActivity::new(name, 60, CalendarDate::new(10, 1, 2025).unwrap())
    }

    fn position(order: &[&FlexibleActivity], id: ActivityId) -> usize {
        order.iter().position(|a| a.id == id).unwrap()
    }

    #[test]
    fn test_add_and_query() {
        let (a, b, c) = (flex("A"), flex("B"), flex("C"));
        let mut g = DependencyGraph::new();
        g.add_dependency(&a, &b).unwrap();
        g.add_dependency(&a, &c).unwrap();

        assert_eq!(g.dependencies_of(a.id), &[b.id, c.id]);
        assert!(g.dependencies_of(b.id).is_empty());
        assert_eq!(g.dependents_of(c.id), vec![a.id]);
        assert!(g.is_prerequisite(b.id));
        assert!(!g.is_prerequisite(a.id));
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn test_unknown_event_has_no_dependencies() {
        let g = DependencyGraph::new();
        assert!(g.dependencies_of(ActivityId::new()).is_empty());
    }

    #[test]
    fn test_duplicate_edge_is_noop() {
        let (a, b) = (flex("A"), flex("B"));
        let mut g = DependencyGraph::new();
        g.add_dependency(&a, &b).unwrap();
        g.add_dependency(&a, &b).unwrap();
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn test_two_node_cycle_rolls_back() {
        let (x, y) = (flex("X"), flex("Y"));
        let mut g = DependencyGraph::new();
        g.add_dependency(&x, &y).unwrap();
        let before = g.clone();

        let err = g.add_dependency(&y, &x).unwrap_err();
        assert!(matches!(
            err,
            PlannerError::CircularDependency { event, prerequisite }
                if event == y.id && prerequisite == x.id
        ));
        assert_eq!(g, before);
        assert_eq!(g.dependencies_of(x.id), &[y.id]);
        assert!(g.dependencies_of(y.id).is_empty());
        assert!(!g.contains(y.id));
    }

    #[test]
    fn test_long_cycle_rolls_back_existing_entry() {
        // A → B → C, then C already has an entry, adding C → A closes the loop
        let (a, b, c, d) = (flex("A"), flex("B"), flex("C"), flex("D"));
        let mut g = DependencyGraph::new();
        g.add_dependency(&a, &b).unwrap();
        g.add_dependency(&b, &c).unwrap();
        g.add_dependency(&c, &d).unwrap();
        let before = g.clone();

        assert!(g.add_dependency(&c, &a).is_err());
        assert_eq!(g, before);
        assert_eq!(g.dependencies_of(c.id), &[d.id]);
    }

    #[test]
    fn test_self_dependency_rejected() {
        let a = flex("A");
        let mut g = DependencyGraph::new();
        assert!(g.add_dependency(&a, &a).is_err());
        assert!(g.is_empty());
    }

    #[test]
    fn test_remove_dependency_drops_empty_key() {
        let (a, b, c) = (flex("A"), flex("B"), flex("C"));
        let mut g = DependencyGraph::new();
        g.add_dependency(&a, &b).unwrap();
        g.add_dependency(&a, &c).unwrap();

        g.remove_dependency(&a, &b);
        assert_eq!(g.dependencies_of(a.id), &[c.id]);
        g.remove_dependency(&a, &c);
        assert!(!g.contains(a.id));
        assert!(g.is_empty());
    }

    #[test]
    fn test_topological_order_chain() {
        // C needs B, B needs A
        let (a, b, c) = (flex("A"), flex("B"), flex("C"));
        let mut g = DependencyGraph::new();
        g.add_dependency(&c, &b).unwrap();
        g.add_dependency(&b, &a).unwrap();

        let acts = vec![c.clone(), b.clone(), a.clone()];
        let order = g.topological_order(&acts);
        assert_eq!(order.len(), 3);
        assert!(position(&order, a.id) < position(&order, b.id));
        assert!(position(&order, b.id) < position(&order, c.id));
    }

    #[test]
    fn test_topological_order_keeps_independent_first_in_input_order() {
        let (a, b, x, y) = (flex("A"), flex("B"), flex("X"), flex("Y"));
        let mut g = DependencyGraph::new();
        g.add_dependency(&b, &a).unwrap();

        let acts = vec![y.clone(), b.clone(), x.clone(), a.clone()];
        let order = g.topological_order(&acts);
        let names: Vec<&str> = order.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Y", "X", "A", "B"]);
    }

    #[test]
    fn test_topological_order_skips_foreign_nodes() {
        let (a, b) = (flex("A"), flex("B"));
        let mut g = DependencyGraph::new();
        g.add_dependency(&b, &a).unwrap();

        let acts = vec![b.clone()];
        let order = g.topological_order(&acts);
        assert_eq!(order.len(), 1);
        assert_eq!(order[0].id, b.id);
    }

    #[test]
    fn test_from_entries_rechecks_cycles() {
        let (a, b) = (ActivityId::new(), ActivityId::new());
        let entries = vec![
            DependencyEntry {
                event: a,
                prerequisites: vec![b],
            },
            DependencyEntry {
                event: b,
                prerequisites: vec![a],
            },
        ];
        assert!(DependencyGraph::from_entries(entries).is_err());
    }
}
