// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use crate::intercept::{intercepts, Intercept};
use crate::model::{EventLayer, VelocityModel};

/// The fastest refracted (head-wave) arrival.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Refraction {
    /// Layer along whose top the ray refracts.
    pub layer: usize,
    /// Travel time in seconds.
    pub time: f64,
    /// Upper bound on the distance at which a direct ray can still arrive first.
    pub crossover: f64,
}

/// Intercept of a refraction along the top of `layer` for a surface source,
/// or `None` if a shallower layer is at least as fast.
fn surface_intercept(model: &VelocityModel, layer: usize) -> Option<f64> {
    let v = model.velocities();
    let vsq = model.squared_velocities();
    let mut tid = 0.0;
    for l in 0..layer {
        if vsq[layer] <= vsq[l] {
            return None;
        }
        tid += model.thickness(l) * (vsq[layer] - vsq[l]).sqrt() / (v[l] * v[layer]);
    }
    Some(tid)
}

/// Find the refracted ray with the smallest travel time.
///
/// Every layer below the event layer that is not a low-velocity layer is a
/// candidate. A candidate is discarded when its critical distance, corrected
/// for the source's depth inside the event layer, exceeds `distance`. Returns
/// `None` when no refraction is possible.
pub fn refract(model: &VelocityModel, event: &EventLayer, distance: f64) -> Option<Refraction> {
    let v = model.velocities();
    let vsq = model.squared_velocities();
    let jl = event.index;
    let tkj = event.depth_in_layer;
    let table = intercepts(model, jl);

    // Source-corrected intercept time for every feasible refractor below jl
    let mut tinj = vec![None; model.layer_count()];
    let mut best: Option<(usize, f64)> = None;
    for (m, ic) in table.iter().skip(1) {
        let Intercept::Feasible {
            time,
            critical_distance,
        } = ic
        else {
            continue;
        };
        let sqt = (vsq[m] - vsq[jl]).sqrt();
        let t_inj = time - tkj * sqt / (v[m] * v[jl]);
        let d_inj = critical_distance - tkj * v[jl] / sqt;
        tinj[m] = Some(t_inj);
        if d_inj > distance {
            continue;
        }
        let tr = t_inj + distance / v[m];
        if best.map_or(true, |(_, t)| tr < t) {
            best = Some((m, tr));
        }
    }

    let (layer, time) = best?;

    // lx: first layer below the event layer that is not a low-velocity layer.
    // One exists because a refractor was found.
    let (lx, t_lx) = tinj
        .iter()
        .enumerate()
        .skip(jl + 1)
        .find_map(|(m, t)| t.map(|t| (m, t)))?;

    // jx: first layer at or above the event layer that can carry a head wave
    // from a surface source; the surface layer otherwise.
    let (jx, tid_jx) = (1..=jl)
        .rev()
        .find_map(|j| surface_intercept(model, j).map(|t| (j, t)))
        .unwrap_or((0, 0.0));

    let crossover = (t_lx - tid_jx) * v[lx] * v[jx] / (v[lx] - v[jx]);

    tracing::trace!(layer, time, crossover, lx, jx, "refraction");
    Some(Refraction {
        layer,
        time,
        crossover,
    })
}
