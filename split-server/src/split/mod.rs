//! Split-ticket discovery and pricing engine.
//!
//! This module answers: "is this booked journey cheaper when bought as
//! several tickets?"
//!
//! A scan enumerates the stations where the traveler changes trains,
//! prices every sub-journey those stations imply, assembles each way of
//! splitting the route from the priced pieces, and ranks the results by
//! savings. Pricing goes through the [`RoutePricer`] capability so the
//! engine can run against the live API, a cache, or canned answers.

mod assemble;
mod config;
mod eligibility;
mod enumerate;
mod pricer;
mod progress;
mod rank;
mod scan;

#[cfg(test)]
pub(crate) mod testing;


pub use assemble::{QuoteTable, SplitOption, SplitSegment, assemble, segment_requests};
pub use config::{MAX_SPLIT_POINTS, ScanConfig};
pub use eligibility::{
    FareTreatment, REGIONAL_PRODUCTS, fare_treatment, has_flix_trains, has_regional_trains,
    is_flix_leg, is_regional_leg, journey_fully_covered, leg_covered,
};
pub use enumerate::{SplitPoint, split_points};
pub use pricer::{
    PricingError, RoutePricer, RouteQuote, SegmentQuote, SegmentRequest, UnpricedReason,
    matches_segment, select_quote,
};
pub use progress::{Cancelled, Progress, ProgressReporter, ScanEvent};
pub use rank::{PricingSummary, RankedOption, present, rank_options, select_for_display, summarize};
pub use scan::{ScanError, ScanRequest, SplitScanner};
