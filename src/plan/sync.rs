//! Common-duration selection across degrees of freedom.
//!
//! Candidate durations are each DoF's minimum and the right endpoints of its
//! forbidden intervals, plus an optional user floor. Tested in ascending
//! order, the first candidate that no DoF blocks and that clears the floor
//! becomes the trajectory duration; the DoF it came from is the limiting
//! one and already has its profile.

use libm::ceil;

use crate::plan::block::Block;
use crate::profile::Profile;

/// Outcome of duration synchronization.
#[derive(Debug, Clone, Copy)]
pub struct SyncResult {
    /// Selected common duration.
    pub t_sync: f64,
    /// DoF whose extremal profile realizes the duration; `None` when the
    /// user floor was selected.
    pub limiting_dof: Option<usize>,
    /// Profile of the limiting DoF, taken straight from its block.
    pub profile: Option<Profile>,
}

/// Select a feasible common duration for all blocks.
///
/// `delta_time` quantizes every candidate upward onto its multiples when
/// present. Returns `None` when no candidate survives.
pub fn synchronize<const DOFS: usize>(
    blocks: &[Block; DOFS],
    duration_floor: Option<f64>,
    delta_time: Option<f64>,
) -> Option<SyncResult> {
    if DOFS == 1 && duration_floor.is_none() && delta_time.is_none() {
        return Some(SyncResult {
            t_sync: blocks[0].t_min,
            limiting_dof: Some(0),
            profile: Some(blocks[0].p_min),
        });
    }

    let quantize = |t: f64| match delta_time {
        Some(dt) => ceil(t / dt) * dt,
        None => t,
    };
    let candidate = |slot: usize, dof: usize| -> f64 {
        let raw = match slot {
            0 => blocks[dof].t_min,
            1 => blocks[dof].a.map_or(f64::INFINITY, |i| i.right),
            _ => blocks[dof].b.map_or(f64::INFINITY, |i| i.right),
        };
        quantize(raw)
    };
    let floor_candidate = duration_floor.map(|t| quantize(t));

    // Ascending scan over all candidates without materializing them.
    let mut last = f64::NEG_INFINITY;
    loop {
        let mut best: Option<(f64, usize, usize)> = None;
        for slot in 0..3 {
            for dof in 0..DOFS {
                let value = candidate(slot, dof);
                if value > last
                    && value.is_finite()
                    && best.map_or(true, |(b, _, _)| value < b)
                {
                    best = Some((value, slot, dof));
                }
            }
        }
        if let Some(f) = floor_candidate {
            if f > last && f.is_finite() && best.map_or(true, |(b, _, _)| f < b) {
                best = Some((f, 3, 0));
            }
        }

        let (value, slot, dof) = best?;
        last = value;

        if blocks.iter().any(|b| b.is_blocked(value)) || value < duration_floor.unwrap_or(0.0) {
            continue;
        }

        let (limiting_dof, profile) = match slot {
            0 => (Some(dof), Some(blocks[dof].p_min)),
            1 => (Some(dof), blocks[dof].a.map(|i| i.profile)),
            2 => (Some(dof), blocks[dof].b.map(|i| i.profile)),
            _ => (None, None),
        };
        return Some(SyncResult { t_sync: value, limiting_dof, profile });
    }
}
