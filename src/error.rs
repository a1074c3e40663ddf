// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::path::PathBuf;

/// Errors that can occur while building a model, reading catalogs, or
/// computing travel times.
#[derive(Debug)]
pub enum RayTraceError {
    /// The velocity model has no layers.
    EmptyModel,
    /// The number of layer tops does not match the number of velocities.
    LayerCountMismatch {
        /// Number of layer tops provided.
        tops: usize,
        /// Number of velocities provided.
        velocities: usize,
    },
    /// Layer velocity is not positive and finite.
    InvalidVelocity {
        /// The layer index.
        index: usize,
        /// The invalid value.
        value: f64,
    },
    /// Layer top is not finite, not ordered, or the first top is not zero.
    InvalidLayerTop {
        /// The layer index.
        index: usize,
        /// The invalid value.
        value: f64,
    },
    /// VP/VS ratio is not positive and finite.
    InvalidVpVsRatio(f64),
    /// Source depth is negative or not finite.
    InvalidDepth(f64),
    /// Direct-ray solver settings are unusable.
    InvalidSettings(String),
    /// Neither a direct nor a refracted ray produced a finite travel time.
    NoFeasibleRay {
        /// Epicentral distance in km.
        distance: f64,
        /// Source depth in km.
        depth: f64,
    },
    /// A single source/station pair failed; aborts the whole run.
    PairFailed {
        /// Event id of the source.
        source_id: u64,
        /// Station label.
        station: String,
        /// The underlying failure.
        cause: Box<RayTraceError>,
    },
    /// A line of an input file could not be parsed.
    Parse {
        /// The file being read.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },
    /// I/O error occurred.
    IoError(std::io::Error),
    /// Other error with a descriptive message.
    Other(String),
}

impl fmt::Display for RayTraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RayTraceError::EmptyModel => write!(f, "velocity model has no layers"),
            RayTraceError::LayerCountMismatch { tops, velocities } => {
                write!(
                    f,
                    "layer count mismatch: {} layer tops but {} velocities",
                    tops, velocities
                )
            }
            RayTraceError::InvalidVelocity { index, value } => {
                write!(
                    f,
                    "invalid velocity in layer {}: {} (must be positive and finite)",
                    index, value
                )
            }
            RayTraceError::InvalidLayerTop { index, value } => {
                write!(
                    f,
                    "invalid top of layer {}: {} (tops must start at 0 and be non-decreasing)",
                    index, value
                )
            }
            RayTraceError::InvalidVpVsRatio(ratio) => {
                write!(
                    f,
                    "invalid VP/VS ratio: {} (must be positive and finite)",
                    ratio
                )
            }
            RayTraceError::InvalidDepth(depth) => {
                write!(
                    f,
                    "invalid source depth: {} km (must be non-negative and finite)",
                    depth
                )
            }
            RayTraceError::InvalidSettings(msg) => write!(f, "invalid solver settings: {}", msg),
            RayTraceError::NoFeasibleRay { distance, depth } => {
                write!(
                    f,
                    "no feasible ray for distance {} km and depth {} km",
                    distance, depth
                )
            }
            RayTraceError::PairFailed {
                source_id,
                station,
                cause,
            } => {
                write!(
                    f,
                    "event {} to station {} failed: {}",
                    source_id, station, cause
                )
            }
            RayTraceError::Parse { path, line, reason } => {
                write!(f, "{}:{}: {}", path.display(), line, reason)
            }
            RayTraceError::IoError(e) => write!(f, "I/O error: {}", e),
            RayTraceError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for RayTraceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RayTraceError::IoError(e) => Some(e),
            RayTraceError::PairFailed { cause, .. } => Some(cause.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RayTraceError {
    fn from(e: std::io::Error) -> Self {
        RayTraceError::IoError(e)
    }
}

/// Convenience type alias for Results with RayTraceError.
pub type Result<T> = std::result::Result<T, RayTraceError>;
