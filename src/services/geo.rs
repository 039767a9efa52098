//! Geographic calculations

use crate::types::Coordinates;

/// Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate Haversine distance between two points in kilometers
pub fn haversine_distance(from: &Coordinates, to: &Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();

    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn london() -> Coordinates {
        Coordinates { lat: 51.5074, lng: -0.1278 }
    }

    fn manchester() -> Coordinates {
        Coordinates { lat: 53.4808, lng: -2.2426 }
    }

    #[test]
    fn test_haversine_london_manchester() {
        let distance = haversine_distance(&london(), &manchester());

        // London to Manchester is approximately 262 km
        assert!((distance - 262.0).abs() < 5.0, "got {} km", distance);
    }

    #[test]
    fn test_haversine_same_point() {
        let point = london();
        let distance = haversine_distance(&point, &point);
        assert!(distance.abs() < 1e-9);
    }

    #[test]
    fn test_haversine_symmetric() {
        let pairs = [
            (london(), manchester()),
            (Coordinates::new(0.0, 0.0), Coordinates::new(-33.87, 151.21)),
            (Coordinates::new(89.9, 179.9), Coordinates::new(-89.9, -179.9)),
        ];
        for (a, b) in pairs {
            let there = haversine_distance(&a, &b);
            let back = haversine_distance(&b, &a);
            assert!((there - back).abs() < 1e-9, "{} != {}", there, back);
        }
    }

    #[test]
    fn test_haversine_antipodes_is_half_circumference() {
        let a = Coordinates::new(0.0, 0.0);
        let b = Coordinates::new(0.0, 180.0);
        let half = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((haversine_distance(&a, &b) - half).abs() < 1e-6);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let a = Coordinates::new(10.0, 5.0);
        let b = Coordinates::new(11.0, 5.0);
        // ~111.19 km per degree on a 6371 km sphere
        assert!((haversine_distance(&a, &b) - 111.19).abs() < 0.01);
    }
}
