//! Branch structures produced by the downstream walk.

use serde::{Deserialize, Serialize};

use lp_core::{ChannelId, Real};

use crate::tables::ChannelKind;
use crate::warning::Warning;

/// One step of a branch walk: a single channel, or a group of parallel
/// channels sharing the same upstream and downstream junctions.
///
/// Group values follow the conservative plotting envelope: geometry takes the
/// maximum across the group, inverts the minimum, area the sum. The first id
/// in `channels` is the group's representative for ground and vertex lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchStep {
    pub channels: Vec<ChannelId>,
    pub kinds: Vec<ChannelKind>,
    pub length: Real,
    pub width: Option<Real>,
    pub height: Option<Real>,
    pub us_invert: Option<Real>,
    pub ds_invert: Option<Real>,
    pub area: Real,
    /// Downstream connection angle in degrees; 0.0 means not set.
    pub angle: Real,
}

impl BranchStep {
    pub fn representative(&self) -> &str {
        &self.channels[0]
    }

    pub fn is_parallel(&self) -> bool {
        self.channels.len() > 1
    }

    pub fn contains(&self, id: &str) -> bool {
        self.channels.iter().any(|c| c == id)
    }

    /// Invert-to-obvert rise for the step, keyed on the representative kind.
    pub fn rise(&self) -> Option<Real> {
        match self.kinds.first() {
            Some(ChannelKind::Circular) => self.width,
            _ => self.height,
        }
    }
}

/// How a branch walk ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BranchTermination {
    /// No downstream connection remained.
    Outlet,

    /// The walk reached channels already claimed by an earlier branch.
    JoinsExisting(Vec<ChannelId>),

    /// The downstream set split into more than one distinct target; each
    /// split child was re-queued as its own walk.
    Branched(Vec<ChannelId>),
}

impl BranchTermination {
    /// Candidate downstream channel ids this branch connects into; empty for
    /// an outlet.
    pub fn connects_to(&self) -> &[ChannelId] {
        match self {
            BranchTermination::Outlet => &[],
            BranchTermination::JoinsExisting(ids) | BranchTermination::Branched(ids) => ids,
        }
    }
}

/// A maximal contiguous run of channels with no internal junction split.
/// Frozen once the walk that created it returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub steps: Vec<BranchStep>,
    pub termination: BranchTermination,
}

impl Branch {
    /// Channels of the first step (the branch head).
    pub fn head_channels(&self) -> &[ChannelId] {
        self.steps.first().map_or(&[], |s| s.channels.as_slice())
    }

    /// Index of the step containing `id`, if any.
    pub fn step_of(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.contains(id))
    }

    pub fn channel_ids(&self) -> impl Iterator<Item = &str> {
        self.steps
            .iter()
            .flat_map(|s| s.channels.iter().map(String::as_str))
    }
}

/// Output of one full downstream walk: the frozen branches plus every
/// continuity warning raised along the way. Owns all of its data; repeated
/// walks share nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkTrace {
    pub branches: Vec<Branch>,
    pub warnings: Vec<Warning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(ids: &[&str]) -> BranchStep {
        BranchStep {
            channels: ids.iter().map(|s| s.to_string()).collect(),
            kinds: vec![ChannelKind::Other; ids.len()],
            length: 10.0,
            width: None,
            height: None,
            us_invert: None,
            ds_invert: None,
            area: 0.0,
            angle: 0.0,
        }
    }

    #[test]
    fn termination_connects_to() {
        assert!(BranchTermination::Outlet.connects_to().is_empty());
        let t = BranchTermination::Branched(vec!["A".into(), "B".into()]);
        assert_eq!(t.connects_to().len(), 2);
    }

    #[test]
    fn branch_lookup_helpers() {
        let branch = Branch {
            name: "Branch 1".into(),
            steps: vec![step(&["A"]), step(&["B1", "B2"]), step(&["C"])],
            termination: BranchTermination::Outlet,
        };
        assert_eq!(branch.head_channels(), ["A".to_string()]);
        assert_eq!(branch.step_of("B2"), Some(1));
        assert_eq!(branch.step_of("missing"), None);
        assert_eq!(branch.channel_ids().count(), 4);
        assert!(branch.steps[1].is_parallel());
    }
}
