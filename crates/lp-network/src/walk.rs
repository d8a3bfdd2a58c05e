//! Downstream branch walker.
//!
//! Walks the channel network strictly downstream from one or more seeds,
//! splitting at junctions where the downstream set resolves to more than one
//! distinct target and terminating at outlets or at channels an earlier
//! branch already claimed. Continuity checks run inline on every step (see
//! the `checks` module).

use std::collections::{HashSet, VecDeque};

use tracing::{debug, trace, warn};

use lp_core::{ChannelId, Real};

use crate::branch::{Branch, BranchStep, BranchTermination, NetworkTrace};
use crate::checks::CheckState;
use crate::error::NetworkError;
use crate::tables::{ChannelTable, ConnectivityTable, GroundTable};
use crate::warning::Warning;

/// Thresholds for the optional continuity checks. `None` disables the
/// corresponding check.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CheckLimits {
    /// Minimum acceptable downstream connection angle, in degrees.
    pub angle_limit: Option<Real>,
    /// Minimum acceptable ground-to-obvert cover depth.
    pub cover_limit: Option<Real>,
}

/// Starting point for a walk: one channel, or several channels considered
/// simultaneously downstream (as after a junction split).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seed {
    Single(ChannelId),
    Multiple(Vec<ChannelId>),
}

impl Seed {
    pub fn single(id: impl Into<ChannelId>) -> Self {
        Seed::Single(id.into())
    }

    pub fn multiple<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ChannelId>,
    {
        Seed::Multiple(ids.into_iter().map(Into::into).collect())
    }

    fn into_channels(self) -> Vec<ChannelId> {
        match self {
            Seed::Single(id) => vec![id],
            Seed::Multiple(ids) => ids,
        }
    }
}

/// State threaded through one `trace` call. Two traces share nothing, so
/// repeated runs over the same tables are bit-for-bit identical.
#[derive(Debug, Default)]
struct WalkContext {
    processed: HashSet<ChannelId>,
    warnings: Vec<Warning>,
    queue: VecDeque<Vec<ChannelId>>,
}

/// The branch builder. Borrows the result tables; owns no walk state.
#[derive(Debug, Clone, Copy)]
pub struct NetworkWalker<'a> {
    channels: &'a ChannelTable,
    connectivity: &'a ConnectivityTable,
    ground: Option<&'a GroundTable>,
    limits: CheckLimits,
}

impl<'a> NetworkWalker<'a> {
    pub fn new(
        channels: &'a ChannelTable,
        connectivity: &'a ConnectivityTable,
        limits: CheckLimits,
    ) -> Self {
        Self {
            channels,
            connectivity,
            ground: None,
            limits,
        }
    }

    /// Attach ground-drape profiles, enabling the cover check when
    /// `limits.cover_limit` is set.
    pub fn with_ground(mut self, ground: &'a GroundTable) -> Self {
        self.ground = Some(ground);
        self
    }

    pub(crate) fn limits(&self) -> CheckLimits {
        self.limits
    }

    pub(crate) fn channel_table(&self) -> &ChannelTable {
        self.channels
    }

    pub(crate) fn ground_table(&self) -> Option<&GroundTable> {
        self.ground
    }

    /// Walk downstream from every seed and return the frozen branches plus
    /// all continuity warnings.
    ///
    /// Seeds must name channels present in the channel table (connectors are
    /// resolved first); everything encountered beyond the seeds degrades
    /// softly instead of erroring.
    pub fn trace(
        &self,
        seeds: impl IntoIterator<Item = Seed>,
    ) -> Result<NetworkTrace, NetworkError> {
        let mut ctx = WalkContext::default();

        for seed in seeds {
            let ids = seed.into_channels();
            let mut resolved = Vec::new();
            for id in &ids {
                match self.connectivity.resolve(id) {
                    Some(real) => {
                        if !self.channels.contains(&real) {
                            return Err(NetworkError::UnknownChannel { id: real });
                        }
                        if !resolved.contains(&real) {
                            resolved.push(real);
                        }
                    }
                    None => return Err(NetworkError::UnknownChannel { id: id.clone() }),
                }
            }
            if resolved.is_empty() {
                return Err(NetworkError::EmptySeed);
            }
            ctx.queue.push_back(resolved);
        }

        let mut branches = Vec::new();
        while let Some(candidates) = ctx.queue.pop_front() {
            if let Some((steps, termination)) = self.build(candidates, &mut ctx) {
                let name = format!("Branch {}", branches.len() + 1);
                debug!(branch = %name, steps = steps.len(), ?termination, "branch complete");
                branches.push(Branch {
                    name,
                    steps,
                    termination,
                });
            }
        }

        Ok(NetworkTrace {
            branches,
            warnings: ctx.warnings,
        })
    }

    /// Walk one branch. Returns `None` when the walk yields no new channels
    /// (an empty joining branch, or a seed that immediately fans out).
    fn build(
        &self,
        mut candidates: Vec<ChannelId>,
        ctx: &mut WalkContext,
    ) -> Option<(Vec<BranchStep>, BranchTermination)> {
        let mut steps: Vec<BranchStep> = Vec::new();
        let mut state = CheckState::default();

        let termination = loop {
            // Filtered copy: never mutate the candidate list while walking it.
            let fresh = self.fresh_channels(&candidates, ctx);
            if fresh.is_empty() {
                break BranchTermination::JoinsExisting(candidates);
            }

            if fresh.len() > 1 {
                let groups = self.partition_by_target(&fresh);
                if groups.len() > 1 {
                    for group in groups {
                        ctx.queue.push_back(group);
                    }
                    if steps.is_empty() {
                        // Pure fan-out seed: the parent branch already
                        // connects to every id in it.
                        return None;
                    }
                    break BranchTermination::Branched(fresh);
                }
            }

            let step = self.make_step(&fresh);
            trace!(channels = ?step.channels, area = step.area, "walking step");
            self.run_checks(&step, &mut state, &mut ctx.warnings);
            for id in &fresh {
                ctx.processed.insert(id.clone());
            }
            steps.push(step);

            let next = self.downstream_set(&fresh);
            if next.is_empty() {
                break BranchTermination::Outlet;
            }
            if next.len() > 1 {
                ctx.queue.push_back(next.clone());
                break BranchTermination::Branched(next);
            }
            candidates = next;
        };

        if steps.is_empty() {
            debug!(?termination, "empty branch discarded");
            return None;
        }
        Some((steps, termination))
    }

    /// Candidates that are real, known channels not yet claimed by any
    /// branch, deduplicated in order.
    fn fresh_channels(&self, candidates: &[ChannelId], ctx: &WalkContext) -> Vec<ChannelId> {
        let mut fresh: Vec<ChannelId> = Vec::new();
        for id in candidates {
            if ctx.processed.contains(id) || fresh.contains(id) {
                continue;
            }
            if !self.channels.contains(id) {
                warn!(channel = %id, "no channel record; dropping from walk");
                continue;
            }
            fresh.push(id.clone());
        }
        fresh
    }

    /// Group sibling channels by their resolved next-downstream target.
    ///
    /// Channels sharing one tracked target walk together as a parallel group;
    /// a channel whose downstream maps to nothing tracked (or to several
    /// targets at once) never groups with anything, matching the original
    /// "DOWNSTREAM NODE" rule. Ties break toward the first matching group.
    fn partition_by_target(&self, channels: &[ChannelId]) -> Vec<Vec<ChannelId>> {
        let mut groups: Vec<(Option<ChannelId>, Vec<ChannelId>)> = Vec::new();
        for id in channels {
            let key = self.single_target(id);
            if let Some(target) = &key {
                if let Some(group) = groups
                    .iter_mut()
                    .find(|(k, _)| k.as_deref() == Some(target.as_str()))
                {
                    group.1.push(id.clone());
                    continue;
                }
            }
            groups.push((key, vec![id.clone()]));
        }
        groups.into_iter().map(|(_, g)| g).collect()
    }

    /// The channel's single tracked downstream target, or `None` when it has
    /// none, several, or only untracked ones.
    fn single_target(&self, id: &str) -> Option<ChannelId> {
        let one = [id.to_string()];
        let targets = self.downstream_set(&one);
        match targets.as_slice() {
            [only] => Some(only.clone()),
            _ => None,
        }
    }

    /// Union of the group's downstream ids, connectors resolved, restricted
    /// to tracked channels, deduplicated in order.
    fn downstream_set(&self, group: &[ChannelId]) -> Vec<ChannelId> {
        let mut set: Vec<ChannelId> = Vec::new();
        for id in group {
            for ds in self.connectivity.downstream_of(id) {
                let Some(real) = self.connectivity.resolve(ds) else {
                    warn!(channel = %id, downstream = %ds, "connector leads nowhere; ignoring");
                    continue;
                };
                if !self.channels.contains(&real) {
                    // Downstream exists but maps to nothing tracked.
                    trace!(channel = %id, downstream = %real, "downstream not tracked; treating as outlet");
                    continue;
                }
                if !set.contains(&real) {
                    set.push(real);
                }
            }
        }
        set
    }

    /// Aggregate a channel group into one step: max geometry, min inverts,
    /// summed area. The asymmetry is deliberate; it draws a conservative
    /// worst-case envelope for the profile plot.
    fn make_step(&self, group: &[ChannelId]) -> BranchStep {
        let mut kinds = Vec::with_capacity(group.len());
        let mut length: Real = 0.0;
        let mut width: Option<Real> = None;
        let mut height: Option<Real> = None;
        let mut us_invert: Option<Real> = None;
        let mut ds_invert: Option<Real> = None;
        let mut area: Real = 0.0;
        let mut angle: Real = 0.0;

        for id in group {
            // fresh_channels guarantees the record exists
            let Some(rec) = self.channels.get(id) else {
                continue;
            };
            kinds.push(rec.kind);
            length = length.max(rec.length);
            width = max_opt(width, rec.width);
            height = max_opt(height, rec.height);
            us_invert = min_opt(us_invert, rec.us_invert);
            ds_invert = min_opt(ds_invert, rec.ds_invert);
            area += rec.cross_section_area();
            angle = angle.max(rec.connection_angle);
        }

        BranchStep {
            channels: group.to_vec(),
            kinds,
            length,
            width,
            height,
            us_invert,
            ds_invert,
            area,
            angle,
        }
    }
}

fn max_opt(acc: Option<Real>, v: Option<Real>) -> Option<Real> {
    match (acc, v) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

fn min_opt(acc: Option<Real>, v: Option<Real>) -> Option<Real> {
    match (acc, v) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
