// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::time::Instant;

use ndarray::Array2;
use rayon::prelude::*;

use crate::direct::DirectSettings;
use crate::error::{RayTraceError, Result};
use crate::geodesic::delaz;
use crate::model::VelocityModel;
use crate::ttime::travel_time;

/// An earthquake hypocenter.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    /// Unique integer event id.
    pub id: u64,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Depth in km.
    pub depth: f64,
}

/// A receiver at the free surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    /// Unique station label.
    pub label: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

/// Travel times and partial derivatives for one station/source pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialsRecord {
    /// Event id of the source.
    pub source_id: u64,
    /// P-wave travel time in seconds.
    pub p_time: f64,
    /// S-wave travel time in seconds.
    pub s_time: f64,
    /// Station label.
    pub station: String,
    /// Epicentral distance in km.
    pub distance: f64,
    /// Azimuth from source to station, degrees in [0, 360).
    pub azimuth: f64,
    /// P take-off angle in degrees.
    pub takeoff_angle: f64,
    /// Derivative of P time with respect to the source's x position (s/km).
    pub dx: f64,
    /// Derivative of P time with respect to the source's y position (s/km).
    pub dy: f64,
    /// Derivative of P time with respect to the source's depth (s/km).
    pub dz: f64,
}

/// Station-by-source matrices of travel times and derivatives.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialsTable {
    /// P travel times.
    pub p_times: Array2<f64>,
    /// S travel times.
    pub s_times: Array2<f64>,
    /// x derivatives.
    pub dx: Array2<f64>,
    /// y derivatives.
    pub dy: Array2<f64>,
    /// z derivatives.
    pub dz: Array2<f64>,
}

/// Output of a partials run.
#[derive(Debug, Clone, PartialEq)]
pub struct Partials {
    /// One record per pair, stations outermost and sources innermost.
    pub records: Vec<PartialsRecord>,
    /// The same values arranged as `[station, source]` matrices.
    pub table: PartialsTable,
}

/// Computes P and S travel times and source-position derivatives for every
/// station/source pair of a layered model.
///
/// Pairs are independent and evaluated in parallel; the output order is the
/// station-major order of a serial double loop regardless of thread count.
pub struct PartialsComputer {
    p_model: VelocityModel,
    s_model: VelocityModel,
    settings: DirectSettings,
    num_threads: Option<usize>,
}

impl PartialsComputer {
    /// Create a computer for a P-wave model and a VP/VS ratio.
    ///
    /// # Errors
    /// Returns an error if the VP/VS ratio is not positive and finite.
    pub fn new(p_model: VelocityModel, vpvs: f64) -> Result<Self> {
        let s_model = p_model.scaled(vpvs)?;
        Ok(PartialsComputer {
            p_model,
            s_model,
            settings: DirectSettings::default(),
            num_threads: None,
        })
    }

    /// Set the false-position settings for the direct ray (builder method).
    pub fn with_direct_settings(mut self, settings: DirectSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the number of worker threads (builder method).
    /// If not specified, defaults to the number of available CPU cores.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = Some(threads);
        self
    }

    /// The P-wave model.
    pub fn p_model(&self) -> &VelocityModel {
        &self.p_model
    }

    /// The S-wave model derived from the VP/VS ratio.
    pub fn s_model(&self) -> &VelocityModel {
        &self.s_model
    }

    fn get_num_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Compute travel times and derivatives for a single pair.
    ///
    /// # Errors
    /// Returns `PairFailed` naming the pair when no ray reaches the station.
    pub fn pair(&self, station: &Station, source: &Source) -> Result<PartialsRecord> {
        self.pair_inner(station, source)
            .map_err(|cause| RayTraceError::PairFailed {
                source_id: source.id,
                station: station.label.clone(),
                cause: Box::new(cause),
            })
    }

    fn pair_inner(&self, station: &Station, source: &Source) -> Result<PartialsRecord> {
        let depth = self.p_model.nudge_off_boundary(source.depth);
        let geo = delaz(source.lat, source.lon, station.lat, station.lon);

        let p = travel_time(&self.p_model, geo.distance, depth, &self.settings)?;
        let s = travel_time(&self.s_model, geo.distance, depth, &self.settings)?;

        // Wave speed at the hypocenter
        let event = self.p_model.resolve_layer(depth)?;
        let vel = self.p_model.velocity(event.index);

        let ain = p.takeoff_angle.to_radians();
        let az = geo.azimuth.to_radians();
        let dz = ain.cos() / vel;
        let dx = ain.sin() * (az - std::f64::consts::FRAC_PI_2).cos() / vel;
        let dy = ain.sin() * az.cos() / vel;

        Ok(PartialsRecord {
            source_id: source.id,
            p_time: p.time,
            s_time: s.time,
            station: station.label.clone(),
            distance: geo.distance,
            azimuth: geo.azimuth,
            takeoff_angle: p.takeoff_angle,
            dx,
            dy,
            dz,
        })
    }

    /// Compute all station/source pairs.
    ///
    /// # Errors
    /// Returns `PairFailed` for a pair that has no feasible ray, or an error
    /// if the thread pool cannot be built.
    pub fn compute(&self, sources: &[Source], stations: &[Station]) -> Result<Partials> {
        let start = Instant::now();
        let num_threads = self.get_num_threads();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| RayTraceError::Other(e.to_string()))?;

        let nsrc = sources.len();
        let npairs = stations.len() * nsrc;
        let records: Vec<PartialsRecord> = pool.install(|| {
            (0..npairs)
                .into_par_iter()
                .map(|k| self.pair(&stations[k / nsrc], &sources[k % nsrc]))
                .collect::<Result<Vec<_>>>()
        })?;

        let shape = (stations.len(), nsrc);
        let column = |f: fn(&PartialsRecord) -> f64| {
            Array2::from_shape_fn(shape, |(i, j)| f(&records[i * nsrc + j]))
        };
        let table = PartialsTable {
            p_times: column(|r| r.p_time),
            s_times: column(|r| r.s_time),
            dx: column(|r| r.dx),
            dy: column(|r| r.dy),
            dz: column(|r| r.dz),
        };

        tracing::info!(
            stations = stations.len(),
            sources = nsrc,
            threads = num_threads,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "partials complete"
        );
        Ok(Partials { records, table })
    }
}
