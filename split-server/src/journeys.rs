//! Refinement of journey search results.
//!
//! The API answers a search with journeys around the requested time,
//! often including near-duplicates (the same trains under a different
//! fare offer). When the traveler asked for a specific departure, they
//! usually picked it from a previous result list, so we narrow the answer
//! to that exact connection.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::Duration;
use tracing::debug;

use crate::domain::{Journey, StationId, Timestamp};

/// How far a journey's departure may be from the requested time and
/// still count as the requested connection.
pub const EXACT_MATCH_TOLERANCE_SECS: i64 = 60;

/// What the traveler searched for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTarget {
    pub origin: StationId,
    pub destination: StationId,
    pub departure: Option<Timestamp>,
}

/// Whether a journey is exactly the requested connection.
pub fn is_exact_match(journey: &Journey, target: &SearchTarget, departure: Timestamp) -> bool {
    let offset = (journey.departure() - departure).abs();

    journey.origin().id == target.origin
        && journey.destination().id == target.destination
        && offset <= Duration::seconds(EXACT_MATCH_TOLERANCE_SECS)
}

/// Drop journeys whose route signature was already seen, keeping the first.
pub fn dedupe(journeys: Vec<Journey>) -> Vec<Journey> {
    let mut seen = HashSet::new();
    journeys
        .into_iter()
        .filter(|j| seen.insert(j.signature()))
        .collect()
}

/// Narrow and order search results for display.
///
/// With a requested departure: keep only exact matches if there are any
/// (otherwise everything, unchanged), deduplicated and cheapest first.
/// Without one: deduplicated, earliest first.
pub fn refine(journeys: Vec<Journey>, target: &SearchTarget) -> Vec<Journey> {
    let received = journeys.len();

    let Some(departure) = target.departure else {
        let mut unique = dedupe(journeys);
        unique.sort_by_key(|j| j.departure());
        debug!(received, unique = unique.len(), "deduplicated journeys");
        return unique;
    };

    let exact: Vec<Journey> = journeys
        .iter()
        .filter(|j| is_exact_match(j, target, departure))
        .cloned()
        .collect();

    if exact.is_empty() {
        debug!(received, "no exact matches, keeping all journeys");
        return journeys;
    }

    let mut unique = dedupe(exact);
    unique.sort_by(by_price);
    debug!(received, exact = unique.len(), "using exact matches");
    unique
}

/// Cheapest first; unpriced journeys last.
fn by_price(a: &Journey, b: &Journey) -> Ordering {
    match (a.price(), b.price()) {
        (Some(pa), Some(pb)) => pa.amount.cmp(&pb.amount),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
