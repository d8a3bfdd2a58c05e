//! Continuity checks, run inline on every step of the branch walk.
//!
//! Each check compares the current step against the previous step of the
//! same branch only; multi-way junction history is deliberately not
//! consulted. Parallel groups are checked once per step on the aggregated
//! values, so twin barrels never raise duplicate warnings.

use lp_core::{Point, Real, lerp};

use crate::branch::BranchStep;
use crate::tables::ChannelRecord;
use crate::walk::NetworkWalker;
use crate::warning::Warning;

/// Previous-step state carried along one branch walk; reset at branch start.
#[derive(Debug, Default)]
pub(crate) struct CheckState {
    prev: Option<PrevStep>,
}

#[derive(Debug)]
struct PrevStep {
    channel: String,
    area: Real,
    ds_invert: Option<Real>,
}

impl NetworkWalker<'_> {
    pub(crate) fn run_checks(
        &self,
        step: &BranchStep,
        state: &mut CheckState,
        warnings: &mut Vec<Warning>,
    ) {
        let id = step.representative().to_string();
        let rec = self.channel_table().get(&id);

        // Adverse gradient: invert rises along the channel itself.
        if let (Some(us), Some(ds)) = (step.us_invert, step.ds_invert) {
            if ds > us {
                warnings.push(Warning::AdverseGradient {
                    channel: id.clone(),
                    us_invert: us,
                    ds_invert: ds,
                    location: rec.and_then(ChannelRecord::midpoint),
                });
            }
        }

        if let Some(prev) = &state.prev {
            // Adverse invert at the junction: inlet above the previous outlet.
            if let (Some(prev_ds), Some(us)) = (prev.ds_invert, step.us_invert) {
                if us > prev_ds {
                    warnings.push(Warning::AdverseInvert {
                        upstream: prev.channel.clone(),
                        upstream_ds_invert: prev_ds,
                        channel: id.clone(),
                        us_invert: us,
                        location: rec.and_then(ChannelRecord::first_vertex),
                    });
                }
            }

            // Decreasing flow area; zero means unknown and never triggers.
            if step.area != 0.0 && step.area < prev.area {
                warnings.push(Warning::DecreasingArea {
                    upstream: prev.channel.clone(),
                    upstream_area: prev.area,
                    channel: id.clone(),
                    area: step.area,
                    location: rec.and_then(ChannelRecord::first_vertex),
                });
            }
        }

        // Sharp connection angle; zero means unset and never triggers.
        if let Some(limit) = self.limits().angle_limit {
            if step.angle != 0.0 && step.angle < limit {
                warnings.push(Warning::SharpAngle {
                    channel: id.clone(),
                    angle: step.angle,
                    location: rec.and_then(ChannelRecord::second_vertex),
                });
            }
        }

        self.check_cover(step, &id, warnings);

        state.prev = Some(PrevStep {
            channel: id,
            area: step.area,
            ds_invert: step.ds_invert,
        });
    }

    /// Insufficient cover: obvert interpolated by chainage between the step's
    /// end inverts plus the section rise. Only the first violating sample is
    /// recorded; later violations on the same channel are ignored.
    fn check_cover(&self, step: &BranchStep, id: &str, warnings: &mut Vec<Warning>) {
        let Some(limit) = self.limits().cover_limit else {
            return;
        };
        let Some(profile) = self.ground_table().and_then(|g| g.get(id)) else {
            return;
        };
        let (Some(us), Some(ds), Some(rise)) = (step.us_invert, step.ds_invert, step.rise())
        else {
            return;
        };

        for sample in profile.samples() {
            let t = if step.length > 0.0 {
                (sample.chainage / step.length).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let obvert = lerp(us + rise, ds + rise, t);
            let cover = sample.elevation - obvert;
            if cover < limit {
                warnings.push(Warning::InsufficientCover {
                    channel: id.to_string(),
                    cover,
                    chainage: sample.chainage,
                    location: Some(sample.point),
                });
                break;
            }
        }
    }
}
