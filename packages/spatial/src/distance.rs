//! Great-circle distance on a spherical Earth.

/// Mean Earth radius used for every distance in the system.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance in meters between two WGS84 points.
///
/// Inputs are assumed to be valid latitudes and longitudes. The result is
/// symmetric in its two points and never negative. Poles and the
/// antimeridian go through the formula unchanged.
#[must_use]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_r = lat1.to_radians();
    let lat2_r = lat2.to_radians();
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1_r.cos() * lat2_r.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_POINTS: &[(f64, f64)] = &[
        (0.0, 0.0),
        (40.0, -111.0),
        (40.7128, -74.006),
        (-33.8688, 151.2093),
        (89.9999, 45.0),
        (-90.0, 0.0),
        (0.0, 179.9999),
        (0.0, -180.0),
    ];

    #[test]
    fn zero_for_identical_points() {
        for &(lat, lon) in SAMPLE_POINTS {
            let d = haversine_distance(lat, lon, lat, lon);
            assert!(d.abs() < 1e-6, "distance({lat},{lon}) to itself was {d}");
        }
    }

    #[test]
    fn symmetric_and_non_negative() {
        for &(lat1, lon1) in SAMPLE_POINTS {
            for &(lat2, lon2) in SAMPLE_POINTS {
                let ab = haversine_distance(lat1, lon1, lat2, lon2);
                let ba = haversine_distance(lat2, lon2, lat1, lon1);
                assert!(ab >= 0.0);
                assert!(!ab.is_nan());
                assert!((ab - ba).abs() < 1e-6, "{ab} != {ba}");
            }
        }
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = haversine_distance(0.0, 0.0, 1.0, 0.0);
        assert!(d > 110_000.0 && d < 112_000.0, "got {d}");
    }

    #[test]
    fn short_hop_across_antimeridian_stays_short() {
        let d = haversine_distance(0.0, 179.9999, 0.0, -179.9999);
        assert!(d < 50.0, "got {d}");
    }

    #[test]
    fn antipodes_are_half_the_circumference() {
        let d = haversine_distance(0.0, 0.0, 0.0, 180.0);
        let half = std::f64::consts::PI * EARTH_RADIUS_METERS;
        assert!((d - half).abs() < 1.0, "got {d}");
    }
}
