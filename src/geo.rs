//! Great-circle math shared by guidance, route gating, and the camera.
//!
//! Platform-agnostic. All coordinates use WGS84 (lat/lon in degrees).

use crate::model::Point;

/// Earth radius in meters (WGS84 mean).
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Haversine distance between two points in meters.
pub fn haversine(a: &Point, b: &Point) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Initial bearing from point A to point B in degrees [0, 360).
pub fn initial_bearing(a: &Point, b: &Point) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

    let bearing = y.atan2(x).to_degrees();
    (bearing + 360.0) % 360.0
}

/// Great-circle destination point: travel `distance_m` meters from
/// `origin` along `bearing_deg`.
///
/// Used by the camera's forward-looking mode to project a look-ahead
/// coordinate along the current heading.
pub fn project_forward(origin: &Point, bearing_deg: f64, distance_m: f64) -> Point {
    let lat1 = origin.lat.to_radians();
    let lon1 = origin.lon.to_radians();
    let brg = bearing_deg.to_radians();
    let ang = distance_m / EARTH_RADIUS_M;

    let lat2 = (lat1.sin() * ang.cos() + lat1.cos() * ang.sin() * brg.cos()).asin();
    let lon2 = lon1
        + (brg.sin() * ang.sin() * lat1.cos()).atan2(ang.cos() - lat1.sin() * lat2.sin());

    Point {
        lat: lat2.to_degrees(),
        lon: lon2.to_degrees(),
    }
}

/// Whether two coordinates differ by more than `epsilon_deg` on either
/// axis. This is the significant-change gate: movements below it are
/// treated as GPS noise and trigger no recomputation.
pub fn moved_significantly(a: &Point, b: &Point, epsilon_deg: f64) -> bool {
    (a.lat - b.lat).abs() > epsilon_deg || (a.lon - b.lon).abs() > epsilon_deg
}

/// Format a distance for guidance display: meters rounded to 10 m
/// below 1 km, kilometers with one decimal above.
pub fn format_distance(meters: f64) -> String {
    if meters >= 1000.0 {
        format!("{:.1} km", meters / 1000.0)
    } else {
        format!("{} m", (meters / 10.0).round() as i64 * 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lat: f64, lon: f64) -> Point {
        Point { lat, lon }
    }

    #[test]
    fn haversine_same_point() {
        let p = pt(13.7563, 100.5018);
        assert!((haversine(&p, &p)).abs() < 0.01);
    }

    #[test]
    fn haversine_known_distance() {
        // Bangkok to Pattaya ~100 km
        let bangkok = pt(13.7563, 100.5018);
        let pattaya = pt(12.9236, 100.8825);
        let dist = haversine(&bangkok, &pattaya);
        assert!(dist > 95_000.0 && dist < 105_000.0,
            "Expected ~100 km, got {:.0} m", dist);
    }

    #[test]
    fn bearing_east() {
        let b = initial_bearing(&pt(0.0, 0.0), &pt(0.0, 1.0));
        assert!((b - 90.0).abs() < 0.1, "Expected ~90, got {b}");
    }

    #[test]
    fn bearing_north() {
        let b = initial_bearing(&pt(0.0, 0.0), &pt(1.0, 0.0));
        assert!(b.abs() < 0.1, "Expected ~0, got {b}");
    }

    #[test]
    fn project_forward_east_100m() {
        // 100 m due east of (13, 100) shifts longitude only; the result
        // must match the destination formula to 1e-6 degrees.
        let p = project_forward(&pt(13.0, 100.0), 90.0, 100.0);

        let ang = 100.0 / EARTH_RADIUS_M;
        let lat1 = 13.0f64.to_radians();
        let expected_lon = 100.0f64.to_radians()
            + (90.0f64.to_radians().sin() * ang.sin() * lat1.cos())
                .atan2(ang.cos() - lat1.sin() * (lat1.sin() * ang.cos()).asin().sin());

        assert!((p.lon - expected_lon.to_degrees()).abs() < 1e-6,
            "Expected lon {}, got {}", expected_lon.to_degrees(), p.lon);
        assert!((p.lat - 13.0).abs() < 1e-5, "Latitude should barely move, got {}", p.lat);
    }

    #[test]
    fn project_forward_round_trip_distance() {
        let origin = pt(13.0, 100.0);
        let ahead = project_forward(&origin, 37.0, 250.0);
        let dist = haversine(&origin, &ahead);
        assert!((dist - 250.0).abs() < 0.01, "Expected 250 m, got {dist}");
    }

    #[test]
    fn moved_significantly_thresholds() {
        let a = pt(13.0, 100.0);
        assert!(!moved_significantly(&a, &pt(13.00005, 100.00005), 0.0001));
        assert!(moved_significantly(&a, &pt(13.0002, 100.0), 0.0001));
        assert!(moved_significantly(&a, &pt(13.0, 100.0002), 0.0001));
    }

    #[test]
    fn format_distance_meters() {
        assert_eq!(format_distance(150.0), "150 m");
        assert_eq!(format_distance(5.0), "10 m");
    }

    #[test]
    fn format_distance_km() {
        assert_eq!(format_distance(2500.0), "2.5 km");
    }
}
