//! Branch-graph path resolution.
//!
//! Turns the frozen branch list into a directed acyclic branch graph and
//! enumerates every source-to-terminal path, both as a branch sequence and as
//! a flattened channel sequence with cumulative chainage.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use lp_core::{ChannelId, Real};

use crate::branch::{Branch, BranchStep, NetworkTrace};

/// Derived branch adjacency. Built once from a trace; read-only afterwards.
///
/// An empty downstream list is a terminal branch (outlet or dead-end join);
/// an empty upstream list is a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchGraph {
    pub upstream: Vec<Vec<usize>>,
    pub downstream: Vec<Vec<usize>>,
}

impl BranchGraph {
    /// A downstream edge exists from branch `i` to the branch containing any
    /// channel `i` connects into. Heads match for splits; mid-branch channels
    /// match for re-joins, so re-joined paths continue through the shared
    /// tail.
    pub fn from_branches(branches: &[Branch]) -> Self {
        let n = branches.len();
        let mut downstream: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut upstream: Vec<Vec<usize>> = vec![Vec::new(); n];

        for (i, branch) in branches.iter().enumerate() {
            for id in branch.termination.connects_to() {
                let Some((j, entry)) = branches
                    .iter()
                    .enumerate()
                    .find_map(|(j, b)| b.step_of(id).map(|entry| (j, entry)))
                else {
                    continue;
                };
                if j == i || downstream[i].contains(&j) {
                    continue;
                }
                downstream[i].push(j);
                // Only a head entry makes `i` a true upstream branch of `j`;
                // a mid-branch re-join continues the path through `j` without
                // taking away `j`'s source status.
                if entry == 0 {
                    upstream[j].push(i);
                }
            }
        }

        Self {
            upstream,
            downstream,
        }
    }

    /// Branches with no upstream branch, in branch order.
    pub fn sources(&self) -> Vec<usize> {
        (0..self.upstream.len())
            .filter(|&i| self.upstream[i].is_empty())
            .collect()
    }
}

/// A contiguous run of steps within one branch: steps `from_step..` of
/// `branch`. Paths entering a branch mid-way (at a re-join) skip the steps
/// upstream of the entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSegment {
    pub branch: usize,
    pub from_step: usize,
}

/// One source-to-terminal route through the branch graph, flattened for
/// plotting. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub name: String,
    pub segments: Vec<PathSegment>,
    /// Representative channel id per step, in walk order.
    pub channels: Vec<ChannelId>,
    /// Cumulative chainage at step boundaries; `len() == channels.len() + 1`,
    /// starting at 0.
    pub cum_chainage: Vec<Real>,
    pub total_length: Real,
}

impl Path {
    /// Steps of this path in order, borrowed from the trace's branches.
    pub fn steps<'a>(&self, branches: &'a [Branch]) -> Vec<&'a BranchStep> {
        let mut out = Vec::new();
        for seg in &self.segments {
            if let Some(branch) = branches.get(seg.branch) {
                out.extend(branch.steps.iter().skip(seg.from_step));
            }
        }
        out
    }
}

/// Enumerate every source-to-terminal path through the trace's branches.
///
/// From each source branch the walk follows the first downstream edge;
/// every extra edge spawns a new path that copies the prefix up to the split
/// point. A per-path visited set guards against malformed cyclic input.
pub fn resolve(trace: &NetworkTrace) -> Vec<Path> {
    let graph = BranchGraph::from_branches(&trace.branches);

    let mut queue: VecDeque<Vec<usize>> = graph.sources().into_iter().map(|s| vec![s]).collect();
    let mut sequences: Vec<Vec<usize>> = Vec::new();

    while let Some(mut seq) = queue.pop_front() {
        let mut visited: HashSet<usize> = seq.iter().copied().collect();
        loop {
            let current = *seq.last().expect("path sequences are never empty");
            let next: Vec<usize> = graph.downstream[current]
                .iter()
                .copied()
                .filter(|j| !visited.contains(j))
                .collect();
            let Some(&first) = next.first() else {
                break;
            };
            for &alt in &next[1..] {
                let mut forked = seq.clone();
                forked.push(alt);
                queue.push_back(forked);
            }
            seq.push(first);
            visited.insert(first);
        }
        sequences.push(seq);
    }

    debug!(paths = sequences.len(), "paths resolved");
    sequences
        .into_iter()
        .enumerate()
        .map(|(i, seq)| flatten(trace, &seq, format!("Path {}", i + 1)))
        .collect()
}

/// Flatten a branch sequence into a channel sequence with cumulative
/// chainage. A branch entered via a re-join contributes its steps from the
/// connecting channel onward only.
fn flatten(trace: &NetworkTrace, seq: &[usize], name: String) -> Path {
    let mut segments = Vec::with_capacity(seq.len());
    let mut channels = Vec::new();
    let mut cum_chainage = vec![0.0];

    for (k, &bi) in seq.iter().enumerate() {
        let branch = &trace.branches[bi];
        let from_step = if k == 0 {
            0
        } else {
            let upstream = &trace.branches[seq[k - 1]];
            upstream
                .termination
                .connects_to()
                .iter()
                .find_map(|id| branch.step_of(id))
                .unwrap_or(0)
        };
        segments.push(PathSegment {
            branch: bi,
            from_step,
        });
        for step in branch.steps.iter().skip(from_step) {
            channels.push(step.representative().to_string());
            let last = *cum_chainage.last().expect("cumulative array starts at 0");
            cum_chainage.push(last + step.length);
        }
    }

    let total_length = *cum_chainage.last().expect("cumulative array starts at 0");
    Path {
        name,
        segments,
        channels,
        cum_chainage,
        total_length,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{ChannelKind, ChannelRecord, ChannelTable, ConnectivityTable};
    use crate::walk::{CheckLimits, NetworkWalker, Seed};

    fn network(
        lengths: &[(&str, Real)],
        links: &[(&str, &[&str])],
    ) -> (ChannelTable, ConnectivityTable) {
        let mut channels = ChannelTable::new();
        for (id, len) in lengths {
            channels
                .insert(*id, ChannelRecord::new(ChannelKind::Other, *len))
                .unwrap();
        }
        let mut connectivity = ConnectivityTable::new();
        for (id, downstream) in links {
            connectivity.connect(*id, downstream.iter().copied());
        }
        (channels, connectivity)
    }

    #[test]
    fn single_branch_single_path() {
        let (channels, connectivity) = network(
            &[("A", 10.0), ("B", 20.0)],
            &[("A", &["B"])],
        );
        let walker = NetworkWalker::new(&channels, &connectivity, CheckLimits::default());
        let trace = walker.trace([Seed::single("A")]).unwrap();
        let paths = resolve(&trace);

        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].name, "Path 1");
        assert_eq!(paths[0].channels, ["A", "B"]);
        assert_eq!(paths[0].cum_chainage, [0.0, 10.0, 30.0]);
        assert_eq!(paths[0].total_length, 30.0);
    }

    #[test]
    fn split_yields_one_path_per_outlet() {
        // A splits to B and C with separate outlets: two paths sharing the
        // A prefix.
        let (channels, connectivity) = network(
            &[("A", 10.0), ("B", 20.0), ("C", 5.0)],
            &[("A", &["B", "C"])],
        );
        let walker = NetworkWalker::new(&channels, &connectivity, CheckLimits::default());
        let trace = walker.trace([Seed::single("A")]).unwrap();
        let paths = resolve(&trace);

        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].channels, ["A", "B"]);
        assert_eq!(paths[1].channels, ["A", "C"]);
        assert_eq!(paths[0].total_length, 30.0);
        assert_eq!(paths[1].total_length, 15.0);
    }

    #[test]
    fn rejoin_shares_trailing_channels() {
        // Main stem A->J->Z walked first; tributary T joins at J. The
        // tributary's path continues through the shared tail J, Z.
        let (channels, connectivity) = network(
            &[("A", 10.0), ("J", 20.0), ("Z", 30.0), ("T", 5.0)],
            &[("A", &["J"]), ("J", &["Z"]), ("T", &["J"])],
        );
        let walker = NetworkWalker::new(&channels, &connectivity, CheckLimits::default());
        let trace = walker
            .trace([Seed::single("A"), Seed::single("T")])
            .unwrap();
        let paths = resolve(&trace);

        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].channels, ["A", "J", "Z"]);
        assert_eq!(paths[1].channels, ["T", "J", "Z"]);
        // mid-branch entry skips the steps upstream of the join
        assert_eq!(paths[1].segments[1].from_step, 1);
    }

    #[test]
    fn branch_graph_edges_and_sources() {
        let (channels, connectivity) = network(
            &[("A", 10.0), ("B", 20.0), ("C", 5.0)],
            &[("A", &["B", "C"])],
        );
        let walker = NetworkWalker::new(&channels, &connectivity, CheckLimits::default());
        let trace = walker.trace([Seed::single("A")]).unwrap();

        let graph = BranchGraph::from_branches(&trace.branches);
        assert_eq!(graph.sources(), [0]);
        assert_eq!(graph.downstream[0].len(), 2);
        assert!(graph.downstream[1].is_empty());
        assert_eq!(graph.upstream[1], [0]);
        assert_eq!(graph.upstream[2], [0]);
    }

    #[test]
    fn path_steps_borrows_branch_data() {
        let (channels, connectivity) = network(
            &[("A", 10.0), ("B", 20.0)],
            &[("A", &["B"])],
        );
        let walker = NetworkWalker::new(&channels, &connectivity, CheckLimits::default());
        let trace = walker.trace([Seed::single("A")]).unwrap();
        let paths = resolve(&trace);

        let steps = paths[0].steps(&trace.branches);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].length, 20.0);
    }
}
