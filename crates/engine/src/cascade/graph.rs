use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};
use thiserror::Error;
use tracing::debug;

use super::pool::{EdgeOutcome, PoolState};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CascadeError {
    #[error("cascade edge '{field}' depends on itself")]
    SelfReference { field: &'static str },
    #[error("field '{field}' is downstream of more than one upstream field")]
    DuplicateDownstream { field: &'static str },
    #[error("cascade dependencies form a cycle through '{field}'")]
    Cycle { field: &'static str },
}

/// One dependency edge re-evaluated against form control `C`.
pub trait CascadeEdge<S, C> {
    fn upstream(&self) -> &'static str;

    fn downstream(&self) -> &'static str;

    fn state(&self) -> PoolState;

    /// Recompute the downstream pool and reconcile the downstream value.
    fn reevaluate(&mut self, control: &mut C) -> EdgeOutcome;
}

/// Validated dependency structure between named fields.
#[derive(Debug, Clone)]
pub struct CascadeGraph {
    dependents: IndexMap<&'static str, Vec<&'static str>>,
    order: IndexSet<&'static str>,
}

impl CascadeGraph {
    /// Build a graph from `(upstream, downstream)` pairs.
    ///
    /// Every downstream field has exactly one upstream and the graph must be acyclic.
    pub fn new(edges: &[(&'static str, &'static str)]) -> Result<Self, CascadeError> {
        let mut dependents: IndexMap<&'static str, Vec<&'static str>> = IndexMap::new();
        let mut parents: IndexMap<&'static str, &'static str> = IndexMap::new();
        let mut nodes: IndexSet<&'static str> = IndexSet::new();

        for &(upstream, downstream) in edges {
            if upstream == downstream {
                return Err(CascadeError::SelfReference { field: upstream });
            }
            if parents.insert(downstream, upstream).is_some() {
                return Err(CascadeError::DuplicateDownstream { field: downstream });
            }
            dependents.entry(upstream).or_default().push(downstream);
            nodes.insert(upstream);
            nodes.insert(downstream);
        }

        let mut in_degree: IndexMap<&'static str, usize> = nodes.iter().map(|node| (*node, 0)).collect();
        for downstream in parents.keys() {
            in_degree[downstream] += 1;
        }
        let mut ready: VecDeque<&'static str> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(node, _)| *node)
            .collect();
        let mut order = IndexSet::new();
        while let Some(node) = ready.pop_front() {
            order.insert(node);
            for child in dependents.get(node).into_iter().flatten() {
                let degree = &mut in_degree[child];
                *degree -= 1;
                if *degree == 0 {
                    ready.push_back(*child);
                }
            }
        }
        if let Some(&field) = nodes.iter().find(|node| !order.contains(*node)) {
            return Err(CascadeError::Cycle { field });
        }

        Ok(Self { dependents, order })
    }

    /// Transitive dependents of `field`, in topological order.
    pub fn affected_by(&self, field: &str) -> Vec<&'static str> {
        let mut affected: IndexSet<&'static str> = IndexSet::new();
        let mut queue: VecDeque<&'static str> = self.dependents.get(field).into_iter().flatten().copied().collect();
        while let Some(node) = queue.pop_front() {
            if affected.insert(node) {
                queue.extend(self.dependents.get(node).into_iter().flatten().copied());
            }
        }
        let mut affected: Vec<&'static str> = affected.into_iter().collect();
        affected.sort_by_key(|node| self.order.get_index_of(node));
        affected
    }

    /// All downstream fields, in topological order.
    pub fn downstream_fields(&self) -> Vec<&'static str> {
        self.order
            .iter()
            .copied()
            .filter(|node| self.dependents.values().any(|children| children.contains(node)))
            .collect()
    }
}

/// Applies the uniform re-evaluation rule over a [`CascadeGraph`].
#[derive(Debug, Clone)]
pub struct CascadeCoordinator {
    graph: CascadeGraph,
}

impl CascadeCoordinator {
    pub fn new(graph: CascadeGraph) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &CascadeGraph {
        &self.graph
    }

    /// Re-evaluate every edge affected by a change to `changed`.
    ///
    /// Each edge runs once and independently; sibling edges never read each
    /// other's pools, so their relative order carries no meaning.
    pub fn propagate<S, C>(
        &self,
        changed: &str,
        edges: &mut [&mut dyn CascadeEdge<S, C>],
        control: &mut C,
    ) -> Vec<(&'static str, EdgeOutcome)> {
        let affected = self.graph.affected_by(changed);
        debug!(changed, affected = ?affected, "propagating cascade");
        self.run(&affected, edges, control)
    }

    /// Re-evaluate `field`'s own edge and then everything downstream of it.
    pub fn refresh<S, C>(
        &self,
        field: &'static str,
        edges: &mut [&mut dyn CascadeEdge<S, C>],
        control: &mut C,
    ) -> Vec<(&'static str, EdgeOutcome)> {
        let mut targets = vec![field];
        targets.extend(self.graph.affected_by(field));
        self.run(&targets, edges, control)
    }

    /// Re-evaluate every edge in topological order.
    pub fn settle<S, C>(&self, edges: &mut [&mut dyn CascadeEdge<S, C>], control: &mut C) -> Vec<(&'static str, EdgeOutcome)> {
        let targets = self.graph.downstream_fields();
        self.run(&targets, edges, control)
    }

    fn run<S, C>(
        &self,
        targets: &[&'static str],
        edges: &mut [&mut dyn CascadeEdge<S, C>],
        control: &mut C,
    ) -> Vec<(&'static str, EdgeOutcome)> {
        let mut outcomes = Vec::with_capacity(targets.len());
        for target in targets {
            for edge in edges.iter_mut().filter(|edge| edge.downstream() == *target) {
                outcomes.push((*target, edge.reevaluate(control)));
            }
        }
        outcomes
    }
}
