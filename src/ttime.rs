// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use crate::direct::{direct, DirectSettings};
use crate::error::{RayTraceError, Result};
use crate::model::VelocityModel;
use crate::refraction::refract;

/// Which kind of ray produced the first arrival.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RayPath {
    /// Upgoing ray; carries the horizontal distance covered in the event layer.
    Direct {
        /// Horizontal offset within the event layer, in km.
        horizontal_offset: f64,
    },
    /// Head wave along the top of `layer`.
    Refracted {
        /// Refracting layer index.
        layer: usize,
    },
}

/// First-arrival travel time between a source and a surface receiver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrival {
    /// Travel time in seconds.
    pub time: f64,
    /// Take-off angle at the source in degrees from the downward vertical;
    /// values above 90 mean the ray departs upward.
    pub takeoff_angle: f64,
    /// The winning ray.
    pub path: RayPath,
}

/// Compute the fastest travel time from a source at `depth` to a receiver
/// at the surface, `distance` km away.
///
/// The refracted arrival is always evaluated. The direct ray is evaluated
/// when no refraction exists or when `distance` does not exceed the
/// refraction's crossover distance, and wins ties.
///
/// # Errors
/// Returns `InvalidDepth` for unusable depths and `NoFeasibleRay` when no
/// finite travel time can be found.
pub fn travel_time(
    model: &VelocityModel,
    distance: f64,
    depth: f64,
    settings: &DirectSettings,
) -> Result<Arrival> {
    let event = model.resolve_layer(depth)?;
    tracing::trace!(
        layer = event.index,
        depth_in_layer = event.depth_in_layer,
        "event layer"
    );

    let refraction = refract(model, &event, distance);
    let mut arrival = refraction.map(|r| Arrival {
        time: r.time,
        takeoff_angle: (model.velocity(event.index) / model.velocity(r.layer))
            .asin()
            .to_degrees(),
        path: RayPath::Refracted { layer: r.layer },
    });

    if refraction.map_or(true, |r| distance <= r.crossover) {
        let ray = direct(model, &event, distance, depth, settings);
        if arrival.map_or(true, |a| a.time >= ray.time) {
            arrival = Some(Arrival {
                time: ray.time,
                takeoff_angle: 180.0 - ray.takeoff_sine.asin().to_degrees(),
                path: RayPath::Direct {
                    horizontal_offset: ray.horizontal_offset,
                },
            });
        }
    }

    match arrival {
        Some(a) if a.time.is_finite() => Ok(a),
        _ => Err(RayTraceError::NoFeasibleRay { distance, depth }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_layer_direct_only() {
        let model = VelocityModel::new(vec![0.0], vec![5.8]).unwrap();
        let a = travel_time(&model, 50.0, 10.0, &DirectSettings::default()).unwrap();
        let r = (10.0_f64 * 10.0 + 50.0 * 50.0).sqrt();
        assert_eq!(a.time, r / 5.8);
        assert!(matches!(a.path, RayPath::Direct { .. }));
        let expected_angle = 180.0 - (50.0 / r).asin().to_degrees();
        assert!((a.takeoff_angle - expected_angle).abs() < 1e-9);
        assert!(a.takeoff_angle > 90.0);
    }

    #[test]
    fn far_receiver_gets_head_wave() {
        let model = VelocityModel::new(vec![0.0, 20.0], vec![5.8, 6.5]).unwrap();
        let a = travel_time(&model, 190.0, 5.0, &DirectSettings::default()).unwrap();
        assert_eq!(a.path, RayPath::Refracted { layer: 1 });
        let expected_angle = (5.8_f64 / 6.5).asin().to_degrees();
        assert!((a.takeoff_angle - expected_angle).abs() < 1e-9);
        assert!(a.takeoff_angle < 90.0);
    }

    #[test]
    fn near_receiver_gets_direct_wave() {
        let model = VelocityModel::new(vec![0.0, 20.0], vec![5.8, 6.5]).unwrap();
        let a = travel_time(&model, 80.0, 5.0, &DirectSettings::default()).unwrap();
        assert!(matches!(a.path, RayPath::Direct { .. }));
    }

    #[test]
    fn invalid_depth_propagates() {
        let model = VelocityModel::new(vec![0.0], vec![5.8]).unwrap();
        let result = travel_time(&model, 10.0, -2.0, &DirectSettings::default());
        assert!(matches!(result, Err(RayTraceError::InvalidDepth(_))));
    }

    #[test]
    fn non_finite_distance_is_no_feasible_ray() {
        let model = VelocityModel::new(vec![0.0], vec![5.8]).unwrap();
        let result = travel_time(&model, f64::INFINITY, 10.0, &DirectSettings::default());
        assert!(matches!(result, Err(RayTraceError::NoFeasibleRay { .. })));
    }
}
