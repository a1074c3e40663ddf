// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::f64::consts::FRAC_PI_2;

/// Ratio applied to tan(latitude) to convert geographic to geocentric latitude.
pub const FLATTENING: f64 = 0.993231;

/// Equatorial radius of the Earth in km (IUGG).
pub const EQUATORIAL_RADIUS: f64 = 6378.137;

const ELLIPTICITY: f64 = 3.37853e-3;

/// Distance and azimuth between two points on the Earth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Delaz {
    /// Central angle in degrees.
    pub central_angle: f64,
    /// Surface distance in km.
    pub distance: f64,
    /// Azimuth from the first point to the second, degrees in [0, 360).
    pub azimuth: f64,
}

/// Compute distance and azimuth from point A to point B on a spherical Earth.
///
/// Latitudes are converted to geocentric colatitudes before the spherical
/// law of cosines is applied. The central angle is turned into a distance
/// with an effective radius evaluated at the mean latitude of the two points.
/// Coincident points yield zero distance and zero azimuth.
pub fn delaz(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> Delaz {
    if lat_a == lat_b && lon_a == lon_b {
        return Delaz {
            central_angle: 0.0,
            distance: 0.0,
            azimuth: 0.0,
        };
    }

    let alat = lat_a.to_radians();
    let blat = lat_b.to_radians();
    let acol = FRAC_PI_2 - (FLATTENING * alat.tan()).atan();
    let bcol = FRAC_PI_2 - (FLATTENING * blat.tan()).atan();
    let diflon = (lon_b - lon_a).to_radians();

    let cosdel = acol.sin() * bcol.sin() * diflon.cos() + acol.cos() * bcol.cos();
    let delr = cosdel.clamp(-1.0, 1.0).acos();

    let top = diflon.sin();
    let den = acol.sin() / bcol.tan() - diflon.cos() * acol.cos();
    let mut azimuth = top.atan2(den).to_degrees();
    if azimuth < 0.0 {
        azimuth += 360.0;
    }
    if azimuth >= 360.0 {
        azimuth -= 360.0;
    }

    let colat = FRAC_PI_2 - 0.5 * (alat + blat);
    let radius = EQUATORIAL_RADIUS * (1.0 + ELLIPTICITY * (1.0 / 3.0 - colat.cos().powi(2)));

    Delaz {
        central_angle: delr.to_degrees(),
        distance: delr * radius,
        azimuth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn angle_diff(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(360.0);
        d.min(360.0 - d)
    }

    #[test]
    fn one_degree_along_equator() {
        let d = delaz(0.0, 0.0, 0.0, 1.0);
        assert!((d.central_angle - 1.0).abs() < 1e-9);
        assert!((d.azimuth - 90.0).abs() < 1e-9, "azimuth {}", d.azimuth);
        // 1 degree at the equatorial effective radius
        let expected = 1.0_f64.to_radians() * EQUATORIAL_RADIUS * (1.0 + ELLIPTICITY / 3.0);
        assert!((d.distance - expected).abs() < 1e-9);
        assert!((d.distance - 111.445).abs() < 1e-2);
    }

    #[test]
    fn due_north_and_south() {
        let north = delaz(10.0, 30.0, 12.0, 30.0);
        assert!(angle_diff(north.azimuth, 0.0) < 1e-9);
        let south = delaz(12.0, 30.0, 10.0, 30.0);
        assert!((south.azimuth - 180.0).abs() < 1e-9);
    }

    #[test]
    fn westward_azimuth_is_normalized() {
        let d = delaz(0.0, 1.0, 0.0, 0.0);
        assert!((d.azimuth - 270.0).abs() < 1e-9);
    }

    #[test]
    fn coincident_points() {
        let d = delaz(35.2, -117.8, 35.2, -117.8);
        assert_eq!(d.distance, 0.0);
        assert_eq!(d.azimuth, 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (5.0, 6.0, 9.5, 3.2),
            (-20.0, 140.0, -18.5, 142.25),
            (45.0, -120.0, 44.0, -119.0),
        ];
        for &(alat, alon, blat, blon) in &pairs {
            let ab = delaz(alat, alon, blat, blon);
            let ba = delaz(blat, blon, alat, alon);
            assert!(
                (ab.distance - ba.distance).abs() < 1e-9,
                "{} vs {}",
                ab.distance,
                ba.distance
            );
        }
    }

    #[test]
    fn back_azimuth_differs_by_half_turn() {
        // Meridian and equator paths are exact; short oblique paths differ
        // only by meridian convergence.
        let cases = [
            (10.0, 30.0, 12.0, 30.0, 1e-9),
            (0.0, 10.0, 0.0, 11.0, 1e-9),
            (10.0, 20.0, 10.5, 20.3, 0.1),
            (4.0, 4.0, 5.0, 3.5, 0.1),
        ];
        for &(alat, alon, blat, blon, tol) in &cases {
            let ab = delaz(alat, alon, blat, blon);
            let ba = delaz(blat, blon, alat, alon);
            let diff = angle_diff(ab.azimuth + 180.0, ba.azimuth);
            assert!(diff < tol, "az {} back {} diff {}", ab.azimuth, ba.azimuth, diff);
        }
    }
}
