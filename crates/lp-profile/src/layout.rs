//! Path-to-plot layout.
//!
//! Paths are laid out longest first. A placement map records the absolute
//! start chainage of every channel already drawn, so any later path that
//! shares channels with an earlier one is shifted to line up with it; the
//! greedy longest-first order gives shorter paths a stable reference to
//! align against.

use std::collections::HashMap;

use tracing::debug;

use lp_core::{Point, Real, lerp};
use lp_network::{
    BranchStep, ChannelKind, GroundTable, NetworkTrace, Path, Warning, WarningKind,
};

use crate::error::LayoutError;
use crate::geometry::{FlagMarker, PipePatch, PlotGeometry};

/// Vertical spacing between stacked flag markers on one step.
const FLAG_STACK_SPACING: Real = 0.1;

/// Converts paths into plot geometry. Borrows the optional ground table;
/// everything else comes from the trace and the paths themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutEngine<'a> {
    ground: Option<&'a GroundTable>,
}

impl<'a> LayoutEngine<'a> {
    pub fn new() -> Self {
        Self { ground: None }
    }

    /// Attach ground-drape profiles so the layout emits ground lines.
    pub fn with_ground(mut self, ground: &'a GroundTable) -> Self {
        self.ground = Some(ground);
        self
    }

    /// Lay out every path. Output order matches the input path order;
    /// placement order (longest total length first, ties by input order) is
    /// internal.
    pub fn layout(
        &self,
        trace: &NetworkTrace,
        paths: &[Path],
    ) -> Result<Vec<PlotGeometry>, LayoutError> {
        let mut order: Vec<usize> = (0..paths.len()).collect();
        // stable sort keeps input order for equal lengths
        order.sort_by(|&a, &b| paths[b].total_length.total_cmp(&paths[a].total_length));

        let mut placed: HashMap<String, Real> = HashMap::new();
        let mut laid_out: Vec<(usize, PlotGeometry)> = Vec::with_capacity(paths.len());
        for &i in &order {
            let geometry = self.layout_path(trace, &paths[i], &mut placed)?;
            laid_out.push((i, geometry));
        }
        laid_out.sort_by_key(|(i, _)| *i);
        Ok(laid_out.into_iter().map(|(_, g)| g).collect())
    }

    fn layout_path(
        &self,
        trace: &NetworkTrace,
        path: &Path,
        placed: &mut HashMap<String, Real>,
    ) -> Result<PlotGeometry, LayoutError> {
        let steps = self.path_steps(trace, path)?;

        // Shared-channel alignment: solve the offset at the first channel an
        // earlier path has already placed.
        let mut start: Real = 0.0;
        'outer: for (i, step) in steps.iter().enumerate() {
            for id in &step.channels {
                if let Some(&abs) = placed.get(id) {
                    start = abs - path.cum_chainage[i];
                    break 'outer;
                }
            }
        }
        debug!(path = %path.name, start, steps = steps.len(), "laying out path");

        let mut x = Vec::with_capacity(steps.len() * 2);
        let mut inverts = Vec::with_capacity(steps.len() * 2);
        let mut ground_x = Vec::new();
        let mut ground_y = Vec::new();
        let mut pipes = Vec::new();

        for (i, step) in steps.iter().enumerate() {
            let s = start + path.cum_chainage[i];
            let e = start + path.cum_chainage[i + 1];

            x.push(s);
            x.push(e);
            inverts.push(step.us_invert.unwrap_or(Real::NAN));
            inverts.push(step.ds_invert.unwrap_or(Real::NAN));

            for id in &step.channels {
                placed.entry(id.clone()).or_insert(s);
            }

            if let Some(profile) = self
                .ground
                .and_then(|g| g.get(step.representative()))
            {
                for sample in profile.samples() {
                    ground_x.push(s + sample.chainage);
                    ground_y.push(sample.elevation);
                }
            }

            if let Some(patch) = pipe_patch(step, s, e) {
                pipes.push(patch);
            }
        }

        let flags = place_flags(&trace.warnings, &steps, &path.cum_chainage, start);

        Ok(PlotGeometry {
            path: path.name.clone(),
            x,
            inverts,
            ground_x,
            ground_y,
            pipes,
            flags,
        })
    }

    fn path_steps<'t>(
        &self,
        trace: &'t NetworkTrace,
        path: &Path,
    ) -> Result<Vec<&'t BranchStep>, LayoutError> {
        let mut steps = Vec::new();
        for seg in &path.segments {
            let branch = trace.branches.get(seg.branch).ok_or_else(|| {
                LayoutError::BranchOutOfRange {
                    path: path.name.clone(),
                    branch: seg.branch,
                    len: trace.branches.len(),
                }
            })?;
            if seg.from_step >= branch.steps.len() {
                return Err(LayoutError::StepOutOfRange {
                    path: path.name.clone(),
                    branch: seg.branch,
                    step: seg.from_step,
                });
            }
            steps.extend(branch.steps.iter().skip(seg.from_step));
        }
        Ok(steps)
    }
}

/// Closed outline for a conduit step: both inverts known and a closed shape.
/// Open channels and steps with unknown inverts draw no patch.
fn pipe_patch(step: &BranchStep, s: Real, e: Real) -> Option<PipePatch> {
    if !matches!(
        step.kinds.first(),
        Some(ChannelKind::Rectangular) | Some(ChannelKind::Circular)
    ) {
        return None;
    }
    let us = step.us_invert?;
    let ds = step.ds_invert?;
    let rise = step.rise()?;
    Some(PipePatch {
        corners: [
            Point::new(s, us),
            Point::new(e, ds),
            Point::new(e, ds + rise),
            Point::new(s, us + rise),
        ],
    })
}

/// Place one marker per warning whose channel lies on the path. Markers on
/// the same step stack upward so they stay distinguishable.
fn place_flags(
    warnings: &[Warning],
    steps: &[&BranchStep],
    cum_chainage: &[Real],
    start: Real,
) -> Vec<FlagMarker> {
    let mut flags = Vec::new();
    let mut stacked: HashMap<usize, usize> = HashMap::new();

    for warning in warnings {
        let Some(i) = steps.iter().position(|s| s.contains(warning.channel())) else {
            continue;
        };
        let step = steps[i];
        let s = start + cum_chainage[i];
        let e = start + cum_chainage[i + 1];

        let (fx, t) = match warning.kind() {
            WarningKind::Gradient => ((s + e) / 2.0, 0.5),
            WarningKind::Cover => {
                let chainage = warning.chainage().unwrap_or(0.0).min(step.length);
                let t = if step.length > 0.0 {
                    (chainage / step.length).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                (s + chainage, t)
            }
            _ => (s, 0.0),
        };

        let us = step.us_invert.unwrap_or(0.0);
        let ds = step.ds_invert.unwrap_or(us);
        let base = lerp(us, ds, t);

        let count = stacked.entry(i).or_insert(0);
        flags.push(FlagMarker {
            kind: warning.kind(),
            x: fx,
            y: base + FLAG_STACK_SPACING * *count as Real,
        });
        *count += 1;
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use lp_network::BranchStep;

    fn step(id: &str, kind: ChannelKind, us: Option<Real>, ds: Option<Real>) -> BranchStep {
        BranchStep {
            channels: vec![id.to_string()],
            kinds: vec![kind],
            length: 10.0,
            width: Some(1.0),
            height: Some(2.0),
            us_invert: us,
            ds_invert: ds,
            area: 0.0,
            angle: 0.0,
        }
    }

    #[test]
    fn pipe_patch_skips_open_and_unknown() {
        let open = step("A", ChannelKind::Other, Some(5.0), Some(4.0));
        assert!(pipe_patch(&open, 0.0, 10.0).is_none());

        let unknown = step("B", ChannelKind::Circular, Some(5.0), None);
        assert!(pipe_patch(&unknown, 0.0, 10.0).is_none());
    }

    #[test]
    fn circular_patch_rises_by_diameter() {
        let pipe = step("C", ChannelKind::Circular, Some(5.0), Some(4.0));
        let patch = pipe_patch(&pipe, 0.0, 10.0).unwrap();
        // diameter (width) 1.0, not height 2.0
        assert_eq!(patch.corners[2], Point::new(10.0, 5.0));
        assert_eq!(patch.corners[3], Point::new(0.0, 6.0));
    }

    #[test]
    fn rectangular_patch_rises_by_height() {
        let pipe = step("R", ChannelKind::Rectangular, Some(5.0), Some(4.0));
        let patch = pipe_patch(&pipe, 0.0, 10.0).unwrap();
        assert_eq!(patch.corners[3], Point::new(0.0, 7.0));
    }

    #[test]
    fn flags_stack_on_one_step() {
        let target = step("X", ChannelKind::Circular, Some(5.0), Some(5.0));
        let steps: Vec<&BranchStep> = vec![&target];
        let warnings = vec![
            Warning::AdverseInvert {
                upstream: "W".into(),
                upstream_ds_invert: 4.0,
                channel: "X".into(),
                us_invert: 5.0,
                location: None,
            },
            Warning::DecreasingArea {
                upstream: "W".into(),
                upstream_area: 2.0,
                channel: "X".into(),
                area: 1.0,
                location: None,
            },
        ];
        let flags = place_flags(&warnings, &steps, &[0.0, 10.0], 0.0);
        assert_eq!(flags.len(), 2);
        assert_eq!(flags[0].y, 5.0);
        assert_eq!(flags[1].y, 5.1);
        assert_eq!(flags[0].x, 0.0);
    }
}
