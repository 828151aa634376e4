//! Segment pricing.
//!
//! The engine sees the pricing API only through [`RoutePricer`]. Each
//! segment query's raw answer is reduced to a [`SegmentQuote`] by
//! matching the returned alternatives against the segment's own train.

use std::future::Future;
use std::ops::Range;
use std::sync::Arc;

use chrono::Duration;

use crate::domain::{Journey, PassengerContext, Price, StationId, Timestamp};

/// Error from a pricing lookup.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PricingError {
    /// The pricing API could not be reached at all
    #[error("pricing API unreachable: {0}")]
    Unreachable(String),

    /// The lookup took too long
    #[error("pricing lookup timed out")]
    Timeout,

    /// The pricing API is throttling us
    #[error("rate limited by pricing API")]
    RateLimited,

    /// The response could not be understood
    #[error("malformed pricing response: {0}")]
    Malformed(String),

    /// The pricing API reported an error
    #[error("pricing API error: {0}")]
    Upstream(String),
}

impl PricingError {
    /// True when the pricing API could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, PricingError::Unreachable(_))
    }
}

/// Answer to one route lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteQuote {
    /// Journeys found for the route; possibly none, possibly unpriced.
    Alternatives(Vec<Journey>),
    /// Journeys exist but the API offers no fare for any of them.
    Unavailable,
}

impl RouteQuote {
    /// Classify journeys returned for a route.
    ///
    /// No journeys at all is zero alternatives; journeys none of which
    /// carry a price means the route is `Unavailable`.
    pub fn from_journeys(journeys: Vec<Journey>) -> Self {
        if !journeys.is_empty() && journeys.iter().all(|j| j.price().is_none()) {
            RouteQuote::Unavailable
        } else {
            RouteQuote::Alternatives(journeys)
        }
    }
}

/// Trait for looking up fares for a route.
///
/// This abstraction allows the engine to be tested with canned answers
/// and decorated with a cache.
pub trait RoutePricer {
    /// Price journeys from `origin` to `destination` departing around
    /// `departure`.
    fn price_route(
        &self,
        origin: &StationId,
        destination: &StationId,
        departure: Timestamp,
        passenger: &PassengerContext,
    ) -> impl Future<Output = Result<RouteQuote, PricingError>> + Send;
}

impl<P: RoutePricer + Sync + Send> RoutePricer for Arc<P> {
    fn price_route(
        &self,
        origin: &StationId,
        destination: &StationId,
        departure: Timestamp,
        passenger: &PassengerContext,
    ) -> impl Future<Output = Result<RouteQuote, PricingError>> + Send {
        (**self).price_route(origin, destination, departure, passenger)
    }
}

/// One segment to price: a contiguous range of the original journey's legs.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRequest {
    /// Leg range within the original journey.
    pub legs: Range<usize>,
    /// The original legs in that range.
    pub journey: Journey,
}

impl SegmentRequest {
    /// Departure time sent to the pricing API.
    pub fn departure(&self) -> Timestamp {
        self.journey.departure()
    }
}

/// Why a segment has no price.
#[derive(Debug, Clone, PartialEq)]
pub enum UnpricedReason {
    /// No returned alternative runs on the segment's train.
    NoMatch,
    /// The matching alternatives carry no fare (competing carriers).
    NotOffered,
    /// The lookup exceeded its timeout.
    TimedOut,
    /// The lookup failed.
    Failed(PricingError),
}

/// Pricing outcome for one segment.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentQuote {
    /// The cheapest matching fare.
    Priced { price: Price, departure: Timestamp },
    /// Covered by the traveler's regional pass; never queried.
    Covered,
    Unpriced(UnpricedReason),
}

impl SegmentQuote {
    pub fn price(&self) -> Option<&Price> {
        match self {
            SegmentQuote::Priced { price, .. } => Some(price),
            _ => None,
        }
    }

    pub fn is_priced(&self) -> bool {
        matches!(self, SegmentQuote::Priced { .. })
    }

    /// The lookup failure, if the segment is unpriced because of one.
    pub fn failure(&self) -> Option<&PricingError> {
        match self {
            SegmentQuote::Unpriced(UnpricedReason::Failed(e)) => Some(e),
            _ => None,
        }
    }
}

/// Departure of the first vehicle, which identifies the train run.
fn train_departure(journey: &Journey) -> Timestamp {
    journey
        .first_ride()
        .map(|leg| leg.departure())
        .unwrap_or_else(|| journey.departure())
}

/// True when `alternative` is the same trip as `segment`.
///
/// Same endpoints, first train leaving within `tolerance` of the
/// segment's, arriving no later than the segment (plus `tolerance`).
pub fn matches_segment(segment: &Journey, alternative: &Journey, tolerance: Duration) -> bool {
    if alternative.origin().id != segment.origin().id
        || alternative.destination().id != segment.destination().id
    {
        return false;
    }

    let drift = train_departure(alternative).signed_duration_since(train_departure(segment));
    drift.abs() <= tolerance && alternative.arrival() <= segment.arrival() + tolerance
}

/// Reduce a route lookup to the segment's quote.
///
/// The cheapest priced match wins; ties go to the earliest departure.
pub fn select_quote(segment: &Journey, quote: RouteQuote, tolerance: Duration) -> SegmentQuote {
    let alternatives = match quote {
        RouteQuote::Unavailable => return SegmentQuote::Unpriced(UnpricedReason::NotOffered),
        RouteQuote::Alternatives(alternatives) => alternatives,
    };

    let matching: Vec<&Journey> = alternatives
        .iter()
        .filter(|alt| matches_segment(segment, alt, tolerance))
        .collect();

    if matching.is_empty() {
        return SegmentQuote::Unpriced(UnpricedReason::NoMatch);
    }

    matching
        .iter()
        .filter_map(|alt| alt.price().map(|price| (price, alt.departure())))
        .min_by_key(|(price, departure)| (price.amount, *departure))
        .map(|(price, departure)| SegmentQuote::Priced {
            price: price.clone(),
            departure,
        })
        .unwrap_or(SegmentQuote::Unpriced(UnpricedReason::NotOffered))
}
