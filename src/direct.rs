// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{RayTraceError, Result};
use crate::model::{EventLayer, VelocityModel};

/// Floor for square-root divisors that can vanish for near-grazing rays.
const DIVISOR_FLOOR: f64 = 1e-20;

/// Minimum thickness assumed for the fastest layer above the source.
const MIN_FAST_LAYER_THICKNESS: f64 = 0.05;

/// Upper limit on the squared sine of the take-off angle bounds.
const MAX_SINE_SQUARED: f64 = 0.9999;

/// Convergence settings for the false-position search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectSettings {
    /// Maximum number of false-position iterations.
    pub max_iterations: usize,
    /// Absolute tolerance on the horizontal distance, in km.
    pub tolerance: f64,
}

impl Default for DirectSettings {
    fn default() -> Self {
        DirectSettings {
            max_iterations: 25,
            tolerance: 0.02,
        }
    }
}

impl DirectSettings {
    /// Create settings with the given iteration cap and distance tolerance.
    ///
    /// # Errors
    /// Returns an error if the tolerance is not positive and finite.
    pub fn new(max_iterations: usize, tolerance: f64) -> Result<Self> {
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(RayTraceError::InvalidSettings(format!(
                "tolerance {} must be positive and finite",
                tolerance
            )));
        }
        Ok(DirectSettings {
            max_iterations,
            tolerance,
        })
    }
}

/// The upward-departing ray from a source to a surface receiver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectRay {
    /// Travel time in seconds.
    pub time: f64,
    /// Sine of the take-off angle, measured from the upward vertical.
    pub takeoff_sine: f64,
    /// Horizontal distance travelled inside the event layer, in km.
    pub horizontal_offset: f64,
    /// False-position iterations used.
    pub iterations: usize,
    /// False when the iteration cap was reached before the tolerance.
    pub converged: bool,
}

/// Horizontal distance covered in the layers above the event layer by a ray
/// with take-off sine `u`, plus the event-layer offset `x`.
fn total_offset(model: &VelocityModel, event: usize, x: f64, u: f64, usq: f64) -> f64 {
    let vsq = model.squared_velocities();
    (0..event).fold(x, |acc, l| {
        let div = (vsq[event] / vsq[l] - usq).sqrt().max(DIVISOR_FLOOR);
        acc + model.thickness(l) * u / div
    })
}

/// Compute the travel time of the direct (upgoing) ray.
///
/// A source in the surface layer travels along a straight line. Deeper
/// sources are handled by bracketing the take-off sine and applying the
/// method of false position until the total horizontal distance matches
/// `distance` within `settings.tolerance`. The remaining mismatch is removed
/// to first order from the final travel time.
///
/// # Parameters
/// - `model`: Layered velocity model
/// - `event`: Layer containing the source
/// - `distance`: Epicentral distance in km
/// - `depth`: Source depth in km
/// - `settings`: Iteration cap and distance tolerance
pub fn direct(
    model: &VelocityModel,
    event: &EventLayer,
    distance: f64,
    depth: f64,
    settings: &DirectSettings,
) -> DirectRay {
    let v = model.velocities();
    let vsq = model.squared_velocities();
    let jl = event.index;
    let tkj = event.depth_in_layer;

    if jl == 0 {
        let r = (depth * depth + distance * distance).sqrt();
        return DirectRay {
            time: r / v[0],
            takeoff_sine: if r > 0.0 { distance / r } else { 0.0 },
            horizontal_offset: distance,
            iterations: 0,
            converged: true,
        };
    }

    // Fastest layer between the source and the surface
    let mut lmax = jl;
    let mut tklmax = tkj;
    let mut vlmax = v[jl];
    for l in 0..jl {
        if v[l] > vlmax {
            lmax = l;
            tklmax = model.thickness(l);
            vlmax = v[l];
        }
    }
    let tklmax = tklmax.max(MIN_FAST_LAYER_THICKNESS);

    let ratio = v[jl] / vlmax;
    let ua = ratio * distance / (distance * distance + depth * depth).sqrt();
    let ub = ratio * distance / (distance * distance + tklmax * tklmax).sqrt();
    let uasq = (ua * ua).min(MAX_SINE_SQUARED);
    let ubsq = (ub * ub).min(MAX_SINE_SQUARED);

    let mut xa = tkj * ua / (1.0 - uasq).sqrt();
    let mut xb = if lmax == jl {
        distance
    } else {
        tkj * ub / (1.0 - ubsq).sqrt()
    };
    let mut dela = total_offset(model, jl, xa, ua, uasq);
    let mut delb = total_offset(model, jl, xb, ub, ubsq);

    let tol = settings.tolerance;
    let mut x = 0.5 * (xa + xb);
    let mut iterations = 0;
    let mut converged = false;
    while iterations < settings.max_iterations {
        iterations += 1;
        if delb - dela < tol {
            x = 0.5 * (xa + xb);
            converged = true;
            break;
        }
        x = xa + (distance - dela) * (xb - xa) / (delb - dela);
        let u = x / (x * x + tkj * tkj).sqrt();
        let delt = total_offset(model, jl, x, u, u * u);
        let xtest = delt - distance;
        if xtest.abs() < tol {
            converged = true;
            break;
        }
        if xtest < 0.0 {
            xa = x;
            dela = delt;
        } else {
            xb = x;
            delb = delt;
        }
    }
    if !converged {
        tracing::debug!(
            distance,
            depth,
            iterations,
            "false position stopped at iteration cap"
        );
    }

    let u = x / (x * x + tkj * tkj).sqrt();
    let usq = u * u;
    let delt = total_offset(model, jl, x, u, usq);

    let mut time = (x * x + tkj * tkj).sqrt() / v[jl];
    for l in 0..jl {
        let div = (vsq[jl] / vsq[l] - usq).sqrt().max(DIVISOR_FLOOR);
        time += model.thickness(l) * v[jl] / (vsq[l] * div);
    }
    time -= (u / v[jl]) * (delt - distance);

    tracing::trace!(time, u, x, iterations, "direct ray");
    DirectRay {
        time,
        takeoff_sine: u,
        horizontal_offset: x,
        iterations,
        converged,
    }
}
