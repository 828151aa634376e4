//! Split combination assembly.
//!
//! Every non-empty subset of split points partitions the original
//! journey into contiguous segments. Each partition becomes a
//! [`SplitOption`] carrying the quote found for every one of its
//! segments.

use std::collections::HashMap;
use std::ops::Range;

use tracing::trace;

use crate::domain::{Journey, Leg, Money, PassengerContext, Station, Timestamp};

use super::eligibility::{FareTreatment, fare_treatment};
use super::config::MAX_SPLIT_POINTS;
use super::enumerate::SplitPoint;
use super::pricer::{SegmentQuote, SegmentRequest};

/// Quotes keyed by leg range within the original journey.
pub type QuoteTable = HashMap<Range<usize>, SegmentQuote>;

/// One separately bought part of a split journey.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitSegment {
    /// The original legs this segment covers.
    pub journey: Journey,
    pub quote: SegmentQuote,
    pub treatment: FareTreatment,
}

/// One way to split the original journey.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitOption {
    pub segments: Vec<SplitSegment>,
    /// Stations where one ticket ends and the next begins.
    pub split_stations: Vec<Station>,
    /// Leg indices of the splits, ascending.
    pub boundaries: Vec<usize>,
}

impl SplitOption {
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn departure(&self) -> Timestamp {
        // Safe: at least two segments by construction
        self.segments[0].journey.departure()
    }

    /// All legs, in travel order.
    pub fn legs(&self) -> impl Iterator<Item = &Leg> {
        self.segments.iter().flat_map(|s| s.journey.legs())
    }

    /// True when some segment has neither a price nor pass coverage.
    pub fn has_missing_prices(&self) -> bool {
        self.segments
            .iter()
            .any(|s| !matches!(s.quote, SegmentQuote::Priced { .. } | SegmentQuote::Covered))
    }

    /// Sum of the prices that are known.
    pub fn known_total(&self) -> Money {
        self.segments
            .iter()
            .filter_map(|s| s.quote.price())
            .map(|p| p.amount)
            .sum()
    }

    /// Total price, if every segment is priced or covered.
    pub fn total_price(&self) -> Option<Money> {
        (!self.has_missing_prices()).then(|| self.known_total())
    }
}

/// Segment requests for every contiguous range the split points imply,
/// except the whole route, in travel order.
pub fn segment_requests(journey: &Journey, points: &[SplitPoint]) -> Vec<SegmentRequest> {
    let bounds = boundaries(journey, points.iter().map(|p| p.leg_index));
    let last = journey.leg_count();

    let mut requests = Vec::new();
    for (i, &start) in bounds.iter().enumerate() {
        for &end in &bounds[i + 1..] {
            if start == 0 && end == last {
                continue;
            }
            if let Ok(segment) = journey.slice(start..end) {
                requests.push(SegmentRequest {
                    legs: start..end,
                    journey: segment,
                });
            }
        }
    }

    requests
}

/// `0`, the given split indices, and the leg count.
fn boundaries(journey: &Journey, splits: impl Iterator<Item = usize>) -> Vec<usize> {
    let mut bounds = vec![0];
    bounds.extend(splits);
    bounds.push(journey.leg_count());
    bounds
}

/// Build every split option from the priced segments.
///
/// Partitions containing a range that has no quote or cannot be cut from
/// the journey are dropped. Points past [`MAX_SPLIT_POINTS`] are ignored.
pub fn assemble(
    journey: &Journey,
    points: &[SplitPoint],
    quotes: &QuoteTable,
    passenger: &PassengerContext,
) -> Vec<SplitOption> {
    let points = &points[..points.len().min(MAX_SPLIT_POINTS)];
    let subsets: u64 = 1 << points.len();
    let mut options = Vec::new();

    for mask in 1..subsets {
        let chosen: Vec<&SplitPoint> = points
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1u64 << i) != 0)
            .map(|(_, p)| p)
            .collect();

        let bounds = boundaries(journey, chosen.iter().map(|p| p.leg_index));

        match build_option(journey, &bounds, &chosen, quotes, passenger) {
            Some(option) => options.push(option),
            None => trace!(?bounds, "dropping partition without quotes"),
        }
    }

    options
}

fn build_option(
    journey: &Journey,
    bounds: &[usize],
    chosen: &[&SplitPoint],
    quotes: &QuoteTable,
    passenger: &PassengerContext,
) -> Option<SplitOption> {
    let mut segments = Vec::with_capacity(bounds.len() - 1);

    for window in bounds.windows(2) {
        let range = window[0]..window[1];
        let quote = quotes.get(&range)?.clone();
        let segment = journey.slice(range).ok()?;

        segments.push(SplitSegment {
            treatment: fare_treatment(&segment, passenger),
            journey: segment,
            quote,
        });
    }

    Some(SplitOption {
        segments,
        split_stations: chosen.iter().map(|p| p.station.clone()).collect(),
        boundaries: chosen.iter().map(|p| p.leg_index).collect(),
    })
}
