// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{RayTraceError, Result};

/// Sources closer than this to an interior boundary are nudged off it.
pub const BOUNDARY_TOLERANCE: f64 = 1e-4;

/// Distance (km) a boundary source is moved upward.
pub const BOUNDARY_NUDGE: f64 = 0.001;

/// The layer containing a source, and how far below that layer's top it sits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventLayer {
    /// Index of the layer containing the source (0 = surface layer).
    pub index: usize,
    /// Source depth minus the top of its layer, in km.
    pub depth_in_layer: f64,
}

/// A one-dimensional, horizontally layered velocity model.
///
/// Layer 0 is the surface layer and the last layer is an unbounded half-space.
/// Squared velocities and thicknesses are derived once at construction; the
/// model is immutable afterwards and can be shared freely between threads.
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityModel {
    tops: Vec<f64>,
    velocities: Vec<f64>,
    squared: Vec<f64>,
    thicknesses: Vec<f64>,
}

impl VelocityModel {
    /// Create a new model from layer tops (km) and layer velocities (km/s).
    ///
    /// # Parameters
    /// - `tops`: Depth to the top of each layer; must start at 0 and be non-decreasing
    /// - `velocities`: Wave speed in each layer (must all be positive and finite)
    ///
    /// # Errors
    /// Returns an error if the model is empty, the arrays differ in length,
    /// or any top or velocity is invalid.
    pub fn new(tops: Vec<f64>, velocities: Vec<f64>) -> Result<Self> {
        if velocities.is_empty() && tops.is_empty() {
            return Err(RayTraceError::EmptyModel);
        }
        if tops.len() != velocities.len() {
            return Err(RayTraceError::LayerCountMismatch {
                tops: tops.len(),
                velocities: velocities.len(),
            });
        }

        for (index, &value) in velocities.iter().enumerate() {
            if !value.is_finite() || value <= 0.0 {
                return Err(RayTraceError::InvalidVelocity { index, value });
            }
        }

        if tops[0] != 0.0 {
            return Err(RayTraceError::InvalidLayerTop {
                index: 0,
                value: tops[0],
            });
        }
        for (index, pair) in tops.windows(2).enumerate() {
            if !pair[1].is_finite() || pair[1] < pair[0] {
                return Err(RayTraceError::InvalidLayerTop {
                    index: index + 1,
                    value: pair[1],
                });
            }
        }

        let squared = velocities.iter().map(|v| v * v).collect();
        let thicknesses = tops.windows(2).map(|pair| pair[1] - pair[0]).collect();

        Ok(VelocityModel {
            tops,
            velocities,
            squared,
            thicknesses,
        })
    }

    /// Number of layers, including the bottom half-space.
    pub fn layer_count(&self) -> usize {
        self.velocities.len()
    }

    /// Depth to the top of each layer.
    pub fn tops(&self) -> &[f64] {
        &self.tops
    }

    /// Wave speed in each layer.
    pub fn velocities(&self) -> &[f64] {
        &self.velocities
    }

    /// Squared wave speed in each layer.
    pub fn squared_velocities(&self) -> &[f64] {
        &self.squared
    }

    /// Thickness of every bounded layer; one shorter than the layer count.
    pub fn thicknesses(&self) -> &[f64] {
        &self.thicknesses
    }

    /// Wave speed of a single layer.
    pub fn velocity(&self, layer: usize) -> f64 {
        self.velocities[layer]
    }

    /// Thickness of a bounded layer. The half-space has none.
    pub fn thickness(&self, layer: usize) -> f64 {
        debug_assert!(layer + 1 < self.layer_count(), "half-space has no thickness");
        self.thicknesses[layer]
    }

    /// Find the layer containing a source at `depth`.
    ///
    /// The event layer is the deepest layer whose top lies strictly above the
    /// source, so a depth exactly on a boundary belongs to the layer above it.
    /// A surface source resolves to layer 0 and anything below the deepest top
    /// lies in the half-space.
    ///
    /// # Errors
    /// Returns `InvalidDepth` for negative or non-finite depths.
    pub fn resolve_layer(&self, depth: f64) -> Result<EventLayer> {
        if !depth.is_finite() || depth < 0.0 {
            return Err(RayTraceError::InvalidDepth(depth));
        }
        let index = self
            .tops
            .iter()
            .rposition(|&top| top < depth)
            .unwrap_or(0);
        Ok(EventLayer {
            index,
            depth_in_layer: depth - self.tops[index],
        })
    }

    /// Move a source that sits on an interior layer boundary slightly upward.
    ///
    /// Depths within [`BOUNDARY_TOLERANCE`] of `top[k]` for `k >= 1` are
    /// shifted by [`BOUNDARY_NUDGE`]. The free surface is not a boundary.
    pub fn nudge_off_boundary(&self, depth: f64) -> f64 {
        let mut nudged = depth;
        for &top in &self.tops[1..] {
            if (nudged - top).abs() < BOUNDARY_TOLERANCE {
                nudged -= BOUNDARY_NUDGE;
            }
        }
        if nudged != depth {
            tracing::debug!(depth, nudged, "source depth moved off layer boundary");
        }
        nudged
    }

    /// Derive a model with every velocity divided by `ratio`.
    ///
    /// Used to build the S-wave model from a P-wave model and a VP/VS ratio.
    ///
    /// # Errors
    /// Returns an error if the ratio is not positive and finite.
    pub fn scaled(&self, ratio: f64) -> Result<Self> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(RayTraceError::InvalidVpVsRatio(ratio));
        }
        let velocities = self.velocities.iter().map(|v| v / ratio).collect();
        VelocityModel::new(self.tops.clone(), velocities)
    }
}
