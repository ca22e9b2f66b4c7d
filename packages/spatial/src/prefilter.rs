//! Bounding-box prefilter for radius searches.
//!
//! A radius search first narrows candidates to a lat/lon rectangle that
//! encloses the search disc, then applies the exact haversine distance to
//! what is left. The rectangle may let through points outside the disc but
//! never drops points inside it.
//!
//! The longitude span is the flat `radius / (111 km * cos(lat))` estimate,
//! widened to the disc's true east-west reach where that is larger (high
//! latitudes, large radii). A disc that reaches a pole gets the full
//! longitude range.
//!
//! Longitude wraparound at ±180° is not handled: a disc straddling the
//! antimeridian produces a box that extends past ±180 and misses points on
//! the far side.

use civic_report_store_models::BoundingBox;

use crate::distance::EARTH_RADIUS_METERS;

/// Meters per degree of latitude used to size search boxes. Slightly under
/// the true value so the box errs on the large side.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Floor for `cos(latitude)` when widening the longitude span, so boxes
/// near the poles stay finite.
pub const MIN_LONGITUDE_SCALE: f64 = 0.01;

/// Returns the rectangle enclosing the disc of `radius_meters` around the
/// given point.
#[must_use]
pub fn search_box(latitude: f64, longitude: f64, radius_meters: f64) -> BoundingBox {
    let lat_delta = radius_meters / METERS_PER_DEGREE;
    let south = latitude - lat_delta;
    let north = latitude + lat_delta;

    // Latitude of the box edge nearest a pole.
    let lat_edge = latitude.abs() + lat_delta;
    if lat_edge >= 90.0 {
        return BoundingBox::new(-180.0, south, 180.0, north);
    }

    let lon_scale = latitude.to_radians().cos().max(MIN_LONGITUDE_SCALE);
    let flat_delta = radius_meters / (METERS_PER_DEGREE * lon_scale);

    let angular_radius = (radius_meters / EARTH_RADIUS_METERS).min(std::f64::consts::FRAC_PI_2);
    let reach = (angular_radius.sin() / lat_edge.to_radians().cos()).min(1.0);
    let lon_delta = flat_delta.max(reach.asin().to_degrees());

    BoundingBox::new(longitude - lon_delta, south, longitude + lon_delta, north)
}

#[cfg(test)]
mod tests {
    use crate::distance::haversine_distance;

    use super::*;

    #[test]
    fn box_is_centered_on_the_point() {
        let bbox = search_box(40.0, -111.0, 500.0);
        assert!(((bbox.north + bbox.south) / 2.0 - 40.0).abs() < 1e-12);
        assert!(((bbox.east + bbox.west) / 2.0 + 111.0).abs() < 1e-12);
        assert!((bbox.north - bbox.south - 2.0 * 500.0 / METERS_PER_DEGREE).abs() < 1e-12);
    }

    #[test]
    fn longitude_span_widens_with_latitude() {
        let equator = search_box(0.0, 0.0, 1_000.0);
        let north = search_box(60.0, 0.0, 1_000.0);
        assert!(north.east - north.west > equator.east - equator.west);
    }

    #[test]
    fn pole_clamp_keeps_box_finite() {
        for lat in [89.99, 90.0, -90.0] {
            let bbox = search_box(lat, 0.0, 1_000.0);
            assert!(bbox.east.is_finite() && bbox.west.is_finite());
            assert!(bbox.east <= 180.0 && bbox.west >= -180.0);
        }
    }

    #[test]
    fn box_covers_every_point_on_the_circle() {
        let radius = 2_000.0;
        for &(lat, lon) in &[(0.0, 0.0), (40.0, -111.0), (-62.5, 30.0), (75.0, 10.0)] {
            let bbox = search_box(lat, lon, radius);
            for step in 0..72 {
                let bearing = f64::from(step) * 5.0_f64.to_radians();
                // Walk slightly inside the circle along the bearing.
                let dlat = (radius * 0.999 * bearing.cos()) / 111_195.0;
                let dlon = (radius * 0.999 * bearing.sin())
                    / (111_195.0 * (lat + dlat).to_radians().cos());
                let (plat, plon) = (lat + dlat, lon + dlon);
                if haversine_distance(lat, lon, plat, plon) <= radius {
                    assert!(
                        bbox.contains(plat, plon),
                        "({plat},{plon}) within {radius}m of ({lat},{lon}) fell outside {bbox:?}"
                    );
                }
            }
        }
    }

    /// Great-circle destination from a start point, bearing and distance.
    fn destination(lat: f64, lon: f64, bearing: f64, meters: f64) -> (f64, f64) {
        let delta = meters / EARTH_RADIUS_METERS;
        let (phi1, lambda1) = (lat.to_radians(), lon.to_radians());
        let phi2 = (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * bearing.cos()).asin();
        let lambda2 = lambda1
            + (bearing.sin() * delta.sin() * phi1.cos())
                .atan2(delta.cos() - phi1.sin() * phi2.sin());
        (phi2.to_degrees(), lambda2.to_degrees())
    }

    #[test]
    fn box_covers_large_discs_near_the_poles() {
        for &(lat, lon, radius) in &[
            (89.0, 0.0, 100_000.0),
            (80.0, 20.0, 300_000.0),
            (-85.0, 100.0, 50_000.0),
            (70.0, -40.0, 800_000.0),
        ] {
            let bbox = search_box(lat, lon, radius);
            for step in 0..360 {
                let bearing = f64::from(step).to_radians();
                let (plat, plon) = destination(lat, lon, bearing, radius * 0.999);
                assert!(haversine_distance(lat, lon, plat, plon) <= radius);
                assert!(
                    bbox.contains(plat, plon),
                    "({plat},{plon}) within {radius}m of ({lat},{lon}) fell outside {bbox:?}"
                );
            }
        }
    }

    #[test]
    fn disc_reaching_a_pole_spans_all_longitudes() {
        let bbox = search_box(89.5, 10.0, 100_000.0);
        assert!((bbox.west + 180.0).abs() < f64::EPSILON);
        assert!((bbox.east - 180.0).abs() < f64::EPSILON);
    }

    #[test]
    fn small_discs_keep_the_flat_estimate() {
        let bbox = search_box(40.0, -111.0, 50.0);
        let flat = 50.0 / (METERS_PER_DEGREE * 40.0_f64.to_radians().cos());
        assert!((bbox.east - (-111.0 + flat)).abs() < 1e-9);
    }
}
