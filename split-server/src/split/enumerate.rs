//! Split-point enumeration.
//!
//! Pure route geometry: which stations along a journey could serve as a
//! boundary between two separately bought tickets. Only leg boundaries
//! qualify, since a split must fall where the traveler is already
//! alighting from a train.

use std::collections::HashSet;

use crate::domain::{Journey, Station};

/// A station at which the journey may be split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPoint {
    /// Index of the first leg after the split.
    pub leg_index: usize,
    /// The station where one segment ends and the next begins.
    pub station: Station,
}

/// Candidate split points in travel order.
///
/// Boundary `k` (between leg `k - 1` and leg `k`) is a candidate when:
/// - leg `k - 1` is a ride that is not cancelled, so the traveler really
///   alights there (walks attach to the following segment)
/// - at least one ride remains from leg `k` on
/// - the station is neither the journey's origin nor its destination
/// - the station hasn't already been emitted
///
/// Returns at most `leg_count - 1` points.
pub fn split_points(journey: &Journey) -> Vec<SplitPoint> {
    let legs = journey.legs();
    let origin = &journey.origin().id;
    let destination = &journey.destination().id;

    let mut seen = HashSet::new();
    let mut points = Vec::new();

    for k in 1..legs.len() {
        let before = &legs[k - 1];
        if before.is_walking() || before.is_cancelled() {
            continue;
        }

        if legs[k..].iter().all(|leg| leg.is_walking()) {
            continue;
        }

        let station = before.destination();
        if station.id == *origin || station.id == *destination {
            continue;
        }

        if !seen.insert(station.id.clone()) {
            continue;
        }

        points.push(SplitPoint {
            leg_index: k,
            station: station.clone(),
        });
    }

    points
}
