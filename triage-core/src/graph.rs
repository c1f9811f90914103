//! Dependency graph analysis over one task batch.
//!
//! Edges point from a task to each of its dependencies. References to ids that
//! are not in the batch are dropped at build time: they cannot block anything
//! and cannot close a cycle.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::task::Task;

const UNVISITED: usize = usize::MAX;

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    /// task -> its dependencies
    deps: Vec<Vec<usize>>,
    /// dependency -> tasks that list it
    dependents: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// Build the graph. Ids are expected to be unique; on a repeat the first task wins.
    pub fn build(tasks: &[Task]) -> Self {
        let mut g = DependencyGraph::default();
        for t in tasks {
            if g.index.contains_key(&t.id) {
                continue;
            }
            g.index.insert(t.id.clone(), g.ids.len());
            g.ids.push(t.id.clone());
        }

        let n = g.ids.len();
        g.deps = vec![Vec::new(); n];
        g.dependents = vec![Vec::new(); n];

        let mut wired = vec![false; n];
        for t in tasks {
            let from = g.index[&t.id];
            if std::mem::replace(&mut wired[from], true) {
                continue;
            }
            for dep in &t.dependencies {
                let Some(&to) = g.index.get(dep) else {
                    continue;
                };
                if g.deps[from].contains(&to) {
                    continue;
                }
                g.deps[from].push(to);
                g.dependents[to].push(from);
            }
        }

        g
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// In-batch dependencies of `id`, in the order they were listed.
    pub fn dependencies_of(&self, id: &str) -> Vec<&str> {
        self.index
            .get(id)
            .map(|&i| self.deps[i].iter().map(|&d| self.ids[d].as_str()).collect())
            .unwrap_or_default()
    }

    /// How many other tasks list `id` as a direct dependency.
    pub fn blocking_count(&self, id: &str) -> usize {
        let Some(&i) = self.index.get(id) else {
            return 0;
        };
        self.dependents[i].iter().filter(|&&d| d != i).count()
    }

    /// Per-node flag: does the node sit on at least one cycle?
    ///
    /// Iterative depth-first search with Tarjan lowlinks. A node is unvisited,
    /// in progress (on the component stack) or done; a component closes when a
    /// node's lowlink equals its own discovery index. Components with more than
    /// one node, and single nodes with a self-loop, are cycles. Everything else
    /// (chains, nodes hanging off a cycle) stays unflagged. O(V + E).
    fn cycle_flags(&self) -> Vec<bool> {
        let n = self.len();
        let mut disc = vec![UNVISITED; n];
        let mut low = vec![0usize; n];
        let mut in_progress = vec![false; n];
        let mut component: Vec<usize> = Vec::new();
        let mut flags = vec![false; n];
        let mut next = 0usize;

        // (node, next edge to explore)
        let mut frames: Vec<(usize, usize)> = Vec::new();

        for root in 0..n {
            if disc[root] != UNVISITED {
                continue;
            }

            disc[root] = next;
            low[root] = next;
            next += 1;
            component.push(root);
            in_progress[root] = true;
            frames.push((root, 0));

            while let Some(frame) = frames.last_mut() {
                let v = frame.0;
                if frame.1 < self.deps[v].len() {
                    let w = self.deps[v][frame.1];
                    frame.1 += 1;

                    if disc[w] == UNVISITED {
                        disc[w] = next;
                        low[w] = next;
                        next += 1;
                        component.push(w);
                        in_progress[w] = true;
                        frames.push((w, 0));
                    } else if in_progress[w] {
                        low[v] = low[v].min(disc[w]);
                    }
                    continue;
                }

                frames.pop();
                if let Some(&(parent, _)) = frames.last() {
                    low[parent] = low[parent].min(low[v]);
                }

                if low[v] == disc[v] {
                    let mut members = Vec::new();
                    while let Some(w) = component.pop() {
                        in_progress[w] = false;
                        members.push(w);
                        if w == v {
                            break;
                        }
                    }
                    let cyclic = members.len() > 1 || self.deps[v].contains(&v);
                    if cyclic {
                        for m in members {
                            flags[m] = true;
                        }
                    }
                }
            }
        }

        flags
    }

    /// Ids of every task that participates in a cycle, sorted.
    pub fn cycle_members(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .cycle_flags()
            .into_iter()
            .enumerate()
            .filter(|(_, on_cycle)| *on_cycle)
            .map(|(i, _)| self.ids[i].clone())
            .collect();
        out.sort();
        out
    }

    /// Dependencies before dependents; among ready tasks the lowest `rank` goes first.
    ///
    /// Tasks that never become ready (cycle members and anything downstream of
    /// a cycle) are appended afterwards in rank order.
    pub fn topological_order(&self, rank: impl Fn(&str) -> usize) -> Vec<String> {
        let n = self.len();
        let ranks: Vec<usize> = self.ids.iter().map(|id| rank(id)).collect();
        let mut pending: Vec<usize> = self.deps.iter().map(|d| d.len()).collect();
        let mut emitted = vec![false; n];

        let mut ready: BinaryHeap<Reverse<(usize, usize)>> = (0..n)
            .filter(|&i| pending[i] == 0)
            .map(|i| Reverse((ranks[i], i)))
            .collect();

        let mut out = Vec::with_capacity(n);
        while let Some(Reverse((_, i))) = ready.pop() {
            emitted[i] = true;
            out.push(self.ids[i].clone());
            for &d in &self.dependents[i] {
                pending[d] -= 1;
                if pending[d] == 0 {
                    ready.push(Reverse((ranks[d], d)));
                }
            }
        }

        let mut rest: Vec<usize> = (0..n).filter(|&i| !emitted[i]).collect();
        rest.sort_by_key(|&i| (ranks[i], i));
        out.extend(rest.into_iter().map(|i| self.ids[i].clone()));
        out
    }
}
