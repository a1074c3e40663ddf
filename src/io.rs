// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ndarray_npy::NpzWriter;

use crate::error::{RayTraceError, Result};
use crate::model::VelocityModel;
use crate::partials::{PartialsRecord, PartialsTable, Source, Station};

/// Contents of a ray-tracing control file.
///
/// The file lists, one item per non-comment line: the station file, the event
/// file, the number of layers, the VP/VS ratio, the layer tops (km) and the
/// layer P velocities (km/s). Lines starting with `*` are comments.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlFile {
    /// Path to the station catalog.
    pub station_file: PathBuf,
    /// Path to the event catalog.
    pub event_file: PathBuf,
    /// Number of layers declared in the file.
    pub layer_count: usize,
    /// VP/VS ratio.
    pub vpvs: f64,
    /// Depth to the top of each layer.
    pub tops: Vec<f64>,
    /// P velocity of each layer.
    pub velocities: Vec<f64>,
}

impl ControlFile {
    /// Build the P-wave velocity model described by the file.
    ///
    /// # Errors
    /// Returns an error if the declared layer count disagrees with the arrays
    /// or the model itself is invalid.
    pub fn model(&self) -> Result<VelocityModel> {
        for len in [self.tops.len(), self.velocities.len()] {
            if len != self.layer_count {
                return Err(RayTraceError::LayerCountMismatch {
                    tops: self.tops.len(),
                    velocities: self.velocities.len(),
                });
            }
        }
        VelocityModel::new(self.tops.clone(), self.velocities.clone())
    }
}

fn parse_error(path: &Path, line: usize, reason: impl Into<String>) -> RayTraceError {
    RayTraceError::Parse {
        path: path.to_path_buf(),
        line,
        reason: reason.into(),
    }
}

fn parse_field<T: FromStr>(path: &Path, line: usize, field: &str, what: &str) -> Result<T> {
    field
        .parse()
        .map_err(|_| parse_error(path, line, format!("invalid {}: '{}'", what, field)))
}

/// Non-empty lines of a file with their one-based line numbers.
fn data_lines(path: &Path) -> Result<Vec<(usize, String)>> {
    let reader = BufReader::new(std::fs::File::open(path)?);
    let mut lines = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if !line.trim().is_empty() {
            lines.push((i + 1, line));
        }
    }
    Ok(lines)
}

/// Read a control file.
pub fn read_control(path: &Path) -> Result<ControlFile> {
    let lines: Vec<(usize, String)> = data_lines(path)?
        .into_iter()
        .filter(|(_, l)| !l.trim_start().starts_with('*'))
        .collect();
    if lines.len() < 6 {
        let last = lines.last().map_or(0, |(n, _)| *n);
        return Err(parse_error(
            path,
            last,
            format!("expected 6 entries, found {}", lines.len()),
        ));
    }

    let first_token = |k: usize| lines[k].1.split_whitespace().next().unwrap_or("");
    let floats = |k: usize, what: &str| -> Result<Vec<f64>> {
        let (n, line) = &lines[k];
        line.split_whitespace()
            .map(|f| parse_field(path, *n, f, what))
            .collect()
    };

    Ok(ControlFile {
        station_file: PathBuf::from(first_token(0)),
        event_file: PathBuf::from(first_token(1)),
        layer_count: parse_field(path, lines[2].0, first_token(2), "layer count")?,
        vpvs: parse_field(path, lines[3].0, first_token(3), "VP/VS ratio")?,
        tops: floats(4, "layer top")?,
        velocities: floats(5, "layer velocity")?,
    })
}

/// Read a hypoDD-style event catalog.
///
/// Each line holds date, time, latitude, longitude and depth in its first
/// five columns and the integer event id in its last column.
pub fn read_events(path: &Path) -> Result<Vec<Source>> {
    data_lines(path)?
        .iter()
        .map(|(n, line)| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 6 {
                return Err(parse_error(
                    path,
                    *n,
                    format!("expected at least 6 fields, found {}", fields.len()),
                ));
            }
            Ok(Source {
                id: parse_field(path, *n, fields[fields.len() - 1], "event id")?,
                lat: parse_field(path, *n, fields[2], "latitude")?,
                lon: parse_field(path, *n, fields[3], "longitude")?,
                depth: parse_field(path, *n, fields[4], "depth")?,
            })
        })
        .collect()
}

/// Read a station catalog of `label latitude longitude` lines.
pub fn read_stations(path: &Path) -> Result<Vec<Station>> {
    data_lines(path)?
        .iter()
        .map(|(n, line)| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 3 {
                return Err(parse_error(
                    path,
                    *n,
                    format!("expected 3 fields, found {}", fields.len()),
                ));
            }
            Ok(Station {
                label: fields[0].to_string(),
                lat: parse_field(path, *n, fields[1], "latitude")?,
                lon: parse_field(path, *n, fields[2], "longitude")?,
            })
        })
        .collect()
}

/// Format one output record: event id, P time, S time, station, distance,
/// azimuth and take-off angle, each right-aligned in 13 columns.
pub fn format_record(r: &PartialsRecord) -> String {
    format!(
        "{:>13} {:>13.6} {:>13.6} {:>13} {:>13.4} {:>13.4} {:>13.4}",
        r.source_id, r.p_time, r.s_time, r.station, r.distance, r.azimuth, r.takeoff_angle
    )
}

/// Write records, one per line, in the order given.
pub fn write_records(path: &Path, records: &[PartialsRecord]) -> Result<()> {
    let mut w = BufWriter::new(std::fs::File::create(path)?);
    for r in records {
        writeln!(w, "{}", format_record(r))?;
    }
    w.flush()?;
    Ok(())
}

/// Save the station-by-source matrices to a NumPy `.npz` archive with arrays
/// `p_times`, `s_times`, `dx`, `dy` and `dz`, in that order.
pub fn save_partials_npz(path: &Path, table: &PartialsTable) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("npz") => {}
        Some(ext) => {
            return Err(RayTraceError::Other(format!(
                "unsupported partials format: {}",
                ext
            )))
        }
        None => {
            return Err(RayTraceError::Other(
                "unsupported partials format: (no extension)".to_string(),
            ))
        }
    }

    let file = std::fs::File::create(path)?;
    let mut npz = NpzWriter::new(file);
    let arrays = [
        ("p_times", &table.p_times),
        ("s_times", &table.s_times),
        ("dx", &table.dx),
        ("dy", &table.dy),
        ("dz", &table.dz),
    ];
    for (name, arr) in arrays {
        npz.add_array(name, arr)
            .map_err(|e| RayTraceError::Other(format!("npz write error: {}", e)))?;
    }
    npz.finish()
        .map_err(|e| RayTraceError::Other(format!("npz write error: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use ndarray_npy::NpzReader;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    const CONTROL: &str = "* RayTrac.INP: \n* --- Station File \nstation.dat \n\
* \n* --- Event File \nevent.dat \n\
* \n* --- Velocity Model: \n* Number of Layers \n5 \n\
* vpvs ratio \n1.750 \n* Top of Layers (km) \n\
0.000    20.000    35.000    77.500    120.000    \n\
* Layer Velocities (km/s) \n\
5.800    6.500    8.040    8.045    8.050    \n";

    #[test]
    fn control_file_roundtrip() {
        let path = temp_file("raytrace1d_test_control.inp", CONTROL);
        let ctl = read_control(&path).unwrap();
        assert_eq!(ctl.station_file, PathBuf::from("station.dat"));
        assert_eq!(ctl.event_file, PathBuf::from("event.dat"));
        assert_eq!(ctl.layer_count, 5);
        assert!((ctl.vpvs - 1.75).abs() < 1e-12);
        assert_eq!(ctl.tops, vec![0.0, 20.0, 35.0, 77.5, 120.0]);
        let model = ctl.model().unwrap();
        assert_eq!(model.layer_count(), 5);
        assert!((model.velocity(4) - 8.05).abs() < 1e-12);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn control_layer_count_disagrees() {
        let text = CONTROL.replace("\n5 \n", "\n4 \n");
        let path = temp_file("raytrace1d_test_control_count.inp", &text);
        let ctl = read_control(&path).unwrap();
        assert!(matches!(
            ctl.model(),
            Err(RayTraceError::LayerCountMismatch { .. })
        ));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn control_bad_number_reports_line() {
        let text = CONTROL.replace("1.750", "fast");
        let path = temp_file("raytrace1d_test_control_bad.inp", &text);
        match read_control(&path) {
            Err(RayTraceError::Parse { line, reason, .. }) => {
                assert_eq!(line, 12);
                assert!(reason.contains("VP/VS"));
            }
            other => panic!("unexpected result {:?}", other),
        }
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn control_truncated() {
        let path = temp_file("raytrace1d_test_control_short.inp", "station.dat\nevent.dat\n");
        assert!(matches!(
            read_control(&path),
            Err(RayTraceError::Parse { .. })
        ));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn event_catalog() {
        let text = "20200101   00000001  6.12345  5.54321 12.50000   1.0   0.0   0.0  0.0        1 \n\
\n\
20200101   00000001  7.00000  4.00000 61.25000   1.0   0.0   0.0  0.0       27 \n";
        let path = temp_file("raytrace1d_test_event.dat", text);
        let events = read_events(&path).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, 1);
        assert!((events[0].lat - 6.12345).abs() < 1e-12);
        assert!((events[0].lon - 5.54321).abs() < 1e-12);
        assert!((events[0].depth - 12.5).abs() < 1e-12);
        assert_eq!(events[1].id, 27);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn event_catalog_bad_id() {
        let text = "20200101 00000001 6.0 5.0 12.0 1.0 0.0 0.0 0.0 x1\n";
        let path = temp_file("raytrace1d_test_event_bad.dat", text);
        match read_events(&path) {
            Err(RayTraceError::Parse { line, reason, .. }) => {
                assert_eq!(line, 1);
                assert!(reason.contains("event id"));
            }
            other => panic!("unexpected result {:?}", other),
        }
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn station_catalog() {
        let text = "st0  3.25000  4.50000 \nst1 10.00000 11.75000 \n";
        let path = temp_file("raytrace1d_test_station.dat", text);
        let stations = read_stations(&path).unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[1].label, "st1");
        assert!((stations[1].lon - 11.75).abs() < 1e-12);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn station_catalog_short_line() {
        let path = temp_file("raytrace1d_test_station_short.dat", "st0 3.0\n");
        assert!(matches!(
            read_stations(&path),
            Err(RayTraceError::Parse { line: 1, .. })
        ));
        std::fs::remove_file(&path).ok();
    }

    fn record() -> PartialsRecord {
        PartialsRecord {
            source_id: 12,
            p_time: 8.288705,
            s_time: 14.505234,
            station: "st3".to_string(),
            distance: 40.0,
            azimuth: 123.45678,
            takeoff_angle: 121.3,
            dx: 0.1,
            dy: 0.05,
            dz: -0.08,
        }
    }

    #[test]
    fn record_layout() {
        let line = format_record(&record());
        assert_eq!(
            line,
            "           12      8.288705     14.505234           st3       40.0000      \
123.4568      121.3000"
        );
        assert_eq!(line.split_whitespace().count(), 7);
    }

    #[test]
    fn write_records_one_line_each() {
        let path = std::env::temp_dir().join("raytrace1d_test_records.src");
        let records = vec![record(), record()];
        write_records(&path, &records).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn npz_contains_all_matrices() {
        let m = |v: f64| Array2::from_elem((2, 3), v);
        let table = PartialsTable {
            p_times: m(1.0),
            s_times: m(2.0),
            dx: m(3.0),
            dy: m(4.0),
            dz: m(5.0),
        };
        let path = std::env::temp_dir().join("raytrace1d_test_partials.npz");
        save_partials_npz(&path, &table).unwrap();

        let mut npz = NpzReader::new(std::fs::File::open(&path).unwrap()).unwrap();
        assert_eq!(npz.len(), 5);
        let s: Array2<f64> = npz.by_index(1).unwrap();
        assert_eq!(s, m(2.0));
        let dz: Array2<f64> = npz.by_index(4).unwrap();
        assert_eq!(dz, m(5.0));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn npz_rejects_other_extensions() {
        let table = PartialsTable {
            p_times: Array2::zeros((1, 1)),
            s_times: Array2::zeros((1, 1)),
            dx: Array2::zeros((1, 1)),
            dy: Array2::zeros((1, 1)),
            dz: Array2::zeros((1, 1)),
        };
        let path = Path::new("partials.mat");
        assert!(matches!(
            save_partials_npz(path, &table),
            Err(RayTraceError::Other(_))
        ));
    }
}
