//! Directed dependency graph with a cycle-reporting topological sort.
//!
//! An edge `a → b` records "b depends on a"; every order the sort produces
//! places an edge's source before its target. Kahn's algorithm is used
//! because it naturally yields the cycle remainder: whatever still has a
//! nonzero in-degree when the ready queue runs dry is part of (or reachable
//! only through) a cycle.

use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct DirectedGraph<T> {
    nodes: Vec<T>,
    indices: FxHashMap<T, usize>,
    successors: Vec<Vec<usize>>,
    in_degree: Vec<usize>,
}

impl<T: Copy + Eq + Hash> DirectedGraph<T> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            indices: FxHashMap::default(),
            successors: Vec::new(),
            in_degree: Vec::new(),
        }
    }

    /// Add a node. Returns false when it was already present.
    pub fn add_node(&mut self, node: T) -> bool {
        if self.indices.contains_key(&node) {
            return false;
        }
        self.indices.insert(node, self.nodes.len());
        self.nodes.push(node);
        self.successors.push(Vec::new());
        self.in_degree.push(0);
        true
    }

    pub fn contains(&self, node: T) -> bool {
        self.indices.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[T] {
        &self.nodes
    }

    /// Add an edge `from → to` ("to depends on from"). Self-edges and
    /// duplicates are ignored; both endpoints must already be nodes.
    pub fn add_edge(&mut self, from: T, to: T) {
        if from == to {
            return;
        }
        let (Some(&f), Some(&t)) = (self.indices.get(&from), self.indices.get(&to)) else {
            return;
        };
        if self.successors[f].contains(&t) {
            return;
        }
        self.successors[f].push(t);
        self.in_degree[t] += 1;
    }

    pub fn has_edge(&self, from: T, to: T) -> bool {
        match (self.indices.get(&from), self.indices.get(&to)) {
            (Some(&f), Some(&t)) => self.successors[f].contains(&t),
            _ => false,
        }
    }

    pub fn edge_count(&self) -> usize {
        self.successors.iter().map(Vec::len).sum()
    }

    /// Topologically sort the graph. Deterministic: the ready queue is
    /// seeded and drained in node-insertion order. Nodes that remain when
    /// the queue runs dry form the cycle remainder and are handed to
    /// `on_cycle` in insertion order; they are absent from the returned
    /// order.
    pub fn topological_sort(&self, mut on_cycle: impl FnMut(T)) -> Vec<T> {
        let mut in_degree = self.in_degree.clone();
        let mut ready: VecDeque<usize> = (0..self.nodes.len()).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut emitted = vec![false; self.nodes.len()];

        while let Some(i) = ready.pop_front() {
            emitted[i] = true;
            order.push(self.nodes[i]);
            for &succ in &self.successors[i] {
                in_degree[succ] -= 1;
                if in_degree[succ] == 0 {
                    ready.push_back(succ);
                }
            }
        }

        if order.len() != self.nodes.len() {
            for (i, node) in self.nodes.iter().enumerate() {
                if !emitted[i] {
                    on_cycle(*node);
                }
            }
        }
        order
    }
}

impl<T: Copy + Eq + Hash> Default for DirectedGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}
