//! Route sequencing
//!
//! Every operation takes a route by reference and returns a new one, so a
//! caller can keep the previous route around and roll back if saving fails.

use std::collections::{HashMap, HashSet};

use crate::defaults::NATURAL_MINUTES_PER_STOP;
use crate::error::RouteError;
use crate::types::{OrderingMode, Route, Stop};

/// Build a route keeping the stops in the order given by the caller
pub fn build_route(courier_id: i64, stops: Vec<Stop>) -> Route {
    assemble(courier_id, stops, OrderingMode::Natural)
}

/// Apply a manual ordering. `new_order` lists every stop id exactly once.
pub fn reorder(route: &Route, new_order: &[i64]) -> Result<Route, RouteError> {
    if new_order.len() != route.stops.len() {
        return Err(RouteError::InvalidOrder(format!(
            "expected {} stops, got {}",
            route.stops.len(),
            new_order.len()
        )));
    }

    let by_id: HashMap<i64, &Stop> = route.stops.iter().map(|s| (s.id, s)).collect();
    let mut seen = HashSet::with_capacity(new_order.len());
    let mut stops = Vec::with_capacity(new_order.len());
    for &id in new_order {
        if !seen.insert(id) {
            return Err(RouteError::InvalidOrder(format!("stop {} listed twice", id)));
        }
        let stop = by_id
            .get(&id)
            .ok_or_else(|| RouteError::InvalidOrder(format!("stop {} is not on this route", id)))?;
        stops.push((*stop).clone());
    }

    Ok(assemble(route.courier_id, stops, OrderingMode::Manual))
}

/// Move one stop, as a drag-and-drop in the route planner does
pub fn move_stop(route: &Route, from: usize, to: usize) -> Result<Route, RouteError> {
    let len = route.stops.len();
    if from >= len || to >= len {
        return Err(RouteError::InvalidOrder(format!(
            "cannot move stop {} to {} on a route of {} stops",
            from, to, len
        )));
    }

    let mut order = route.stop_ids();
    let id = order.remove(from);
    order.insert(to, id);
    reorder(route, &order)
}

/// Shortest deliveries first. Ties keep their current relative order.
pub fn optimize(route: &Route) -> Route {
    let mut stops = route.stops.clone();
    stops.sort_by(|a, b| {
        a.distance_km()
            .total_cmp(&b.distance_km())
            .then(a.sequence.cmp(&b.sequence))
    });
    assemble(route.courier_id, stops, OrderingMode::Optimized)
}

/// `"1h 5m"` or `"45m"`
pub fn format_minutes(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

fn assemble(courier_id: i64, mut stops: Vec<Stop>, mode: OrderingMode) -> Route {
    for (idx, stop) in stops.iter_mut().enumerate() {
        stop.sequence = idx as u32 + 1;
    }

    let total_distance_km: f64 = stops.iter().map(Stop::distance_km).sum();
    let count = stops.len() as u32;
    let estimated_total_minutes = count * mode.minutes_per_stop();
    let baseline = count * NATURAL_MINUTES_PER_STOP;

    Route {
        courier_id,
        stops,
        mode,
        total_distance_km,
        estimated_total_minutes,
        time_saved_minutes: baseline.saturating_sub(estimated_total_minutes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coordinates, DeliveryStatus};

    /// Degrees of latitude giving `km` along a meridian
    fn lat_for_km(km: f64) -> f64 {
        km / 6371.0_f64 * 180.0 / std::f64::consts::PI
    }

    fn stop(id: i64, km: f64) -> Stop {
        Stop {
            id,
            pickup: Coordinates::new(0.0, 0.0),
            dropoff: Coordinates::new(lat_for_km(km), 0.0),
            sequence: 0,
            package_weight: 1.0,
            status: DeliveryStatus::Assigned,
        }
    }

    fn abc_route() -> Route {
        // A = 5 km, B = 1 km, C = 3 km
        build_route(7, vec![stop(1, 5.0), stop(2, 1.0), stop(3, 3.0)])
    }

    fn assert_sequenced(route: &Route) {
        for (idx, stop) in route.stops.iter().enumerate() {
            assert_eq!(stop.sequence as usize, idx + 1);
        }
    }

    #[test]
    fn test_build_route_assigns_sequence_in_given_order() {
        let route = abc_route();

        assert_eq!(route.stop_ids(), vec![1, 2, 3]);
        assert_sequenced(&route);
        assert_eq!(route.mode, OrderingMode::Natural);
        assert_eq!(route.estimated_total_minutes, 45);
        assert_eq!(route.time_saved_minutes, 0);
        assert!((route.total_distance_km - 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_build_empty_route() {
        let route = build_route(1, vec![]);
        assert!(route.is_empty());
        assert_eq!(route.total_distance_km, 0.0);
        assert_eq!(route.estimated_total_minutes, 0);
        assert_eq!(route.time_saved_minutes, 0);
    }

    #[test]
    fn test_optimize_sorts_by_distance() {
        let optimized = optimize(&abc_route());

        assert_eq!(optimized.stop_ids(), vec![2, 3, 1]);
        assert_sequenced(&optimized);
        assert!((optimized.total_distance_km - 9.0).abs() < 1e-6);
        assert_eq!(optimized.estimated_total_minutes, 36);
        assert_eq!(optimized.time_saved_minutes, 9);
        assert_eq!(optimized.mode, OrderingMode::Optimized);
    }

    #[test]
    fn test_optimize_is_idempotent() {
        let once = optimize(&abc_route());
        let twice = optimize(&once);
        assert_eq!(once.stop_ids(), twice.stop_ids());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_optimize_breaks_ties_by_sequence() {
        let route = build_route(1, vec![stop(10, 2.0), stop(11, 1.0), stop(12, 2.0), stop(13, 1.0)]);
        let optimized = optimize(&route);
        assert_eq!(optimized.stop_ids(), vec![11, 13, 10, 12]);
    }

    #[test]
    fn test_optimize_does_not_touch_input() {
        let route = abc_route();
        let before = route.clone();
        let _ = optimize(&route);
        assert_eq!(route, before);
    }

    #[test]
    fn test_reorder_applies_manual_order() {
        let route = abc_route();
        let reordered = reorder(&route, &[3, 1, 2]).unwrap();

        assert_eq!(reordered.stop_ids(), vec![3, 1, 2]);
        assert_sequenced(&reordered);
        assert_eq!(reordered.mode, OrderingMode::Manual);
        assert_eq!(reordered.estimated_total_minutes, 39);
        assert_eq!(reordered.time_saved_minutes, 6);
        assert!((reordered.total_distance_km - route.total_distance_km).abs() < 1e-9);
    }

    #[test]
    fn test_reorder_rejects_duplicate_ids() {
        let route = build_route(1, vec![stop(1, 1.0), stop(2, 2.0)]);
        let before = route.clone();

        let result = reorder(&route, &[5, 5]);

        assert!(matches!(result, Err(RouteError::InvalidOrder(_))));
        assert_eq!(route, before);

        let result = reorder(&route, &[1, 1]);
        assert_eq!(
            result,
            Err(RouteError::InvalidOrder("stop 1 listed twice".to_string()))
        );
    }

    #[test]
    fn test_reorder_reverses_long_route() {
        let stops: Vec<Stop> = (1..=500).map(|id| stop(id, id as f64 / 100.0)).collect();
        let route = build_route(2, stops);
        let reversed: Vec<i64> = (1..=500).rev().collect();

        let reordered = reorder(&route, &reversed).unwrap();

        assert_eq!(reordered.stop_ids(), reversed);
        assert_sequenced(&reordered);
        assert_eq!(reordered.stops[0].id, 500);
        assert_eq!(reordered.stops[499].sequence, 500);
        assert!((reordered.total_distance_km - route.total_distance_km).abs() < 1e-6);
    }

    #[test]
    fn test_reorder_rejects_wrong_length() {
        let route = abc_route();
        assert!(matches!(reorder(&route, &[1, 2]), Err(RouteError::InvalidOrder(_))));
        assert!(matches!(reorder(&route, &[1, 2, 3, 4]), Err(RouteError::InvalidOrder(_))));
    }

    #[test]
    fn test_reorder_rejects_foreign_id() {
        let route = abc_route();
        let before = route.clone();

        let result = reorder(&route, &[1, 2, 99]);

        assert_eq!(
            result,
            Err(RouteError::InvalidOrder("stop 99 is not on this route".to_string()))
        );
        assert_eq!(route, before);
    }

    #[test]
    fn test_reorder_then_optimize_then_reorder() {
        let route = abc_route();
        let manual = reorder(&route, &[3, 2, 1]).unwrap();
        let optimized = optimize(&manual);
        assert_eq!(optimized.stop_ids(), vec![2, 3, 1]);

        let back = reorder(&optimized, &[1, 2, 3]).unwrap();
        assert_eq!(back.mode, OrderingMode::Manual);
        assert_sequenced(&back);
    }

    #[test]
    fn test_move_stop_like_drag_and_drop() {
        let route = abc_route();

        let moved = move_stop(&route, 0, 2).unwrap();
        assert_eq!(moved.stop_ids(), vec![2, 3, 1]);

        let moved = move_stop(&route, 2, 0).unwrap();
        assert_eq!(moved.stop_ids(), vec![3, 1, 2]);
        assert_eq!(moved.mode, OrderingMode::Manual);
    }

    #[test]
    fn test_move_stop_out_of_range() {
        let route = abc_route();
        assert!(matches!(move_stop(&route, 0, 3), Err(RouteError::InvalidOrder(_))));
        assert!(matches!(move_stop(&build_route(1, vec![]), 0, 0), Err(RouteError::InvalidOrder(_))));
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(60), "1h 0m");
        assert_eq!(format_minutes(125), "2h 5m");
        assert_eq!(format_minutes(0), "0m");
    }
}
