//! Great-circle distance

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two WGS84 coordinates, in kilometres.
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = (from.0.to_radians(), from.1.to_radians());
    let (lat2, lon2) = (to.0.to_radians(), to.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_is_zero() {
        assert_eq!(haversine_km((52.52, 13.405), (52.52, 13.405)), 0.0);
    }

    #[test]
    fn berlin_to_paris() {
        let d = haversine_km((52.5200, 13.4050), (48.8566, 2.3522));
        assert!((d - 878.0).abs() < 5.0, "{}", d);
    }

    #[test]
    fn symmetric() {
        let a = (10.7769, 106.7009);
        let b = (21.0278, 105.8342);
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
    }
}
