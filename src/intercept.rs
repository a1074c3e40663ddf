// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use crate::model::VelocityModel;

/// Intercept time and critical distance of a head wave along the top of one layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intercept {
    /// A refraction along this layer is geometrically possible.
    Feasible {
        /// Travel-time intercept in seconds.
        time: f64,
        /// Critical distance in km.
        critical_distance: f64,
    },
    /// Some shallower layer is at least as fast, so no head wave exists.
    LowVelocity,
}

impl Intercept {
    /// True when the layer can carry a refracted ray.
    pub fn is_feasible(&self) -> bool {
        matches!(self, Intercept::Feasible { .. })
    }
}

/// Intercepts for every candidate refractor at or below an event layer.
#[derive(Debug, Clone, PartialEq)]
pub struct InterceptTable {
    event_layer: usize,
    entries: Vec<Intercept>,
}

impl InterceptTable {
    /// The event layer the table was built for.
    pub fn event_layer(&self) -> usize {
        self.event_layer
    }

    /// Intercept for refractor `layer`, or `None` above the event layer.
    pub fn get(&self, layer: usize) -> Option<Intercept> {
        layer
            .checked_sub(self.event_layer)
            .and_then(|k| self.entries.get(k).copied())
    }

    /// Iterate over `(layer, intercept)` pairs from the event layer downward.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Intercept)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(move |(k, &ic)| (self.event_layer + k, ic))
    }
}

/// Compute intercept times and critical distances for a ray leaving the top
/// of `event_layer`, refracting along the top of each deeper layer `m`, and
/// returning to the surface.
///
/// Layers above the event layer are crossed once (upgoing only); the event
/// layer and those below it are crossed twice.
pub fn intercepts(model: &VelocityModel, event_layer: usize) -> InterceptTable {
    let v = model.velocities();
    let vsq = model.squared_velocities();

    let entries = (event_layer..model.layer_count())
        .map(|m| {
            let mut once = (0.0, 0.0);
            let mut twice = (0.0, 0.0);
            for l in 0..m {
                if vsq[m] <= vsq[l] {
                    return Intercept::LowVelocity;
                }
                let sqt = (vsq[m] - vsq[l]).sqrt();
                let thk = model.thickness(l);
                let tim = thk * sqt / (v[l] * v[m]);
                let dim = thk * v[l] / sqt;
                let sum = if l < event_layer { &mut once } else { &mut twice };
                sum.0 += tim;
                sum.1 += dim;
            }
            Intercept::Feasible {
                time: once.0 + 2.0 * twice.0,
                critical_distance: once.1 + 2.0 * twice.1,
            }
        })
        .collect();

    InterceptTable {
        event_layer,
        entries,
    }
}
