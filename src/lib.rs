// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! Seismic travel times in a one-dimensional layered Earth.
//!
//! This library computes first-arrival P and S travel times between point
//! sources and surface receivers in a horizontally layered velocity model.
//! For each source the fastest of the direct (upgoing) ray and the head waves
//! refracted along deeper interfaces is selected, and the partial derivatives
//! of travel time with respect to source position are derived from the
//! take-off angle and azimuth. Station/source pairs are processed in parallel.

#![warn(missing_docs)]

/// False-position solver for the direct ray.
pub mod direct;
/// Error types for the library.
pub mod error;
/// Distance and azimuth on a spherical Earth.
pub mod geodesic;
/// Refraction intercept times and critical distances.
pub mod intercept;
/// Control file, catalog and output file handling.
pub mod io;
/// Layered velocity model.
pub mod model;
/// All-pairs travel times and partial derivatives.
pub mod partials;
/// Fastest refracted ray and crossover distance.
pub mod refraction;
/// First-arrival selection between direct and refracted rays.
pub mod ttime;

pub use crate::direct::DirectSettings;
pub use crate::error::{RayTraceError, Result};
pub use crate::model::VelocityModel;
pub use crate::partials::{Partials, PartialsComputer, PartialsRecord, Source, Station};
pub use crate::ttime::{travel_time, Arrival, RayPath};
