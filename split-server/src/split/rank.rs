//! Pricing summaries and ranking of split options.
//!
//! Decides what a split option costs the traveler, how much it saves,
//! how far its price can be trusted, and which options are worth showing.

use std::cmp::Ordering;

use crate::domain::{Money, PassengerContext};

use super::assemble::{SplitOption, SplitSegment};
use super::eligibility::{has_flix_trains, has_regional_trains, journey_fully_covered};
use super::pricer::SegmentQuote;

/// Derived pricing facts about one split option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingSummary {
    /// Every segment is covered by the traveler's regional pass.
    pub is_fully_covered: bool,
    pub has_regional_trains: bool,
    /// Some leg is run by a carrier outside pricing coverage.
    pub has_flix_trains: bool,
    /// No segment could be priced.
    pub cannot_show_price: bool,
    /// Some, but not all, segments lack a price.
    pub has_partial_pricing: bool,
    /// Indices of segments lacking a price.
    pub segments_without_pricing: Vec<usize>,
    /// What the traveler pays for the priced, uncovered segments.
    pub adjusted_total_price: Money,
    /// `max(0, original - adjusted_total_price)`.
    pub adjusted_savings: Money,
}

impl PricingSummary {
    /// True when every segment is priced or covered.
    pub fn is_complete(&self) -> bool {
        !self.cannot_show_price && !self.has_partial_pricing
    }
}

/// A split option with its pricing summary.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedOption {
    pub option: SplitOption,
    pub pricing: PricingSummary,
}

/// True when the traveler has nothing to buy for this segment.
fn segment_covered(segment: &SplitSegment, passenger: &PassengerContext) -> bool {
    matches!(segment.quote, SegmentQuote::Covered)
        || journey_fully_covered(&segment.journey, passenger)
}

/// True when the segment's price is unknown or can't be trusted.
///
/// Segments with carriers outside pricing coverage count as unpriced even
/// when a fare came back, since that fare can't cover the whole segment.
fn segment_lacks_price(segment: &SplitSegment, passenger: &PassengerContext) -> bool {
    !segment_covered(segment, passenger)
        && (!segment.quote.is_priced() || has_flix_trains(&segment.journey))
}

/// Compute the pricing summary of one option against the original fare.
pub fn summarize(
    option: &SplitOption,
    original_price: Money,
    passenger: &PassengerContext,
) -> PricingSummary {
    let segments_without_pricing: Vec<usize> = option
        .segments
        .iter()
        .enumerate()
        .filter(|(_, s)| segment_lacks_price(s, passenger))
        .map(|(i, _)| i)
        .collect();

    let adjusted_total_price: Money = option
        .segments
        .iter()
        .enumerate()
        .filter(|(i, s)| !segments_without_pricing.contains(i) && !segment_covered(s, passenger))
        .filter_map(|(_, s)| s.quote.price())
        .map(|p| p.amount)
        .sum();

    let cannot_show_price = segments_without_pricing.len() == option.segments.len();
    let has_partial_pricing = !segments_without_pricing.is_empty() && !cannot_show_price;

    PricingSummary {
        is_fully_covered: passenger.has_regional_pass
            && option.segments.iter().all(|s| segment_covered(s, passenger)),
        has_regional_trains: option
            .segments
            .iter()
            .any(|s| has_regional_trains(&s.journey)),
        has_flix_trains: option.segments.iter().any(|s| has_flix_trains(&s.journey)),
        cannot_show_price,
        has_partial_pricing,
        segments_without_pricing,
        adjusted_total_price,
        adjusted_savings: original_price.saturating_sub(adjusted_total_price),
    }
}

/// Sort options best-first.
///
/// Options are ranked by:
/// 1. Adjusted savings (higher is better)
/// 2. Number of segments (fewer is better)
/// 3. Departure (earlier is better)
/// 4. Split positions (lexicographic, for a stable order)
pub fn rank_options(mut options: Vec<RankedOption>) -> Vec<RankedOption> {
    options.sort_by(|a, b| {
        let savings = b.pricing.adjusted_savings.cmp(&a.pricing.adjusted_savings);
        if savings != Ordering::Equal {
            return savings;
        }

        let segments = a.option.segment_count().cmp(&b.option.segment_count());
        if segments != Ordering::Equal {
            return segments;
        }

        let departure = a.option.departure().cmp(&b.option.departure());
        if departure != Ordering::Equal {
            return departure;
        }

        a.option.boundaries.cmp(&b.option.boundaries)
    });

    options
}

/// Choose which of the ranked options to show.
///
/// - Regional-pass holders get only the best option.
/// - Otherwise, if the best option is completely priced, only it.
/// - Otherwise every option up to and including the first completely
///   priced one, or all of them if none is.
pub fn select_for_display(ranked: Vec<RankedOption>, has_regional_pass: bool) -> Vec<RankedOption> {
    let Some(best) = ranked.first() else {
        return ranked;
    };

    if has_regional_pass || best.pricing.is_complete() {
        return ranked.into_iter().take(1).collect();
    }

    match ranked.iter().position(|r| r.pricing.is_complete()) {
        Some(first_complete) => ranked.into_iter().take(first_complete + 1).collect(),
        None => ranked,
    }
}

/// Summarize, filter, rank and select options for presentation.
///
/// Options that save nothing are dropped.
pub fn present(
    options: Vec<SplitOption>,
    original_price: Money,
    passenger: &PassengerContext,
) -> Vec<RankedOption> {
    let candidates = options
        .into_iter()
        .map(|option| {
            let pricing = summarize(&option, original_price, passenger);
            RankedOption { option, pricing }
        })
        .filter(|r| r.pricing.adjusted_savings > Money::ZERO)
        .collect();

    select_for_display(rank_options(candidates), passenger.has_regional_pass)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Journey, Price};
    use crate::split::eligibility::FareTreatment;
    use crate::split::pricer::UnpricedReason;
    use crate::split::testing::{journey, ride, station, ts};
    use proptest::prelude::*;

    fn priced(cents: i64) -> SegmentQuote {
        SegmentQuote::Priced {
            price: Price::new(Money::from_cents(cents)),
            departure: ts("08:00"),
        }
    }

    fn unpriced() -> SegmentQuote {
        SegmentQuote::Unpriced(UnpricedReason::NotOffered)
    }

    fn segment(j: Journey, quote: SegmentQuote) -> SplitSegment {
        SplitSegment {
            journey: j,
            quote,
            treatment: FareTreatment::Full,
        }
    }

    /// Berlin → Nuremberg → Munich, split at Nuremberg.
    fn two_segments(first: SegmentQuote, second: SegmentQuote, line: &str) -> SplitOption {
        SplitOption {
            segments: vec![
                segment(
                    journey(vec![ride("BER", "NUE", "08:00", "10:00", line)], None),
                    first,
                ),
                segment(
                    journey(vec![ride("NUE", "MUC", "10:10", "11:20", line)], None),
                    second,
                ),
            ],
            split_stations: vec![station("NUE")],
            boundaries: vec![1],
        }
    }

    fn ranked(boundaries: Vec<usize>, segments: usize, savings: i64, complete: bool) -> RankedOption {
        let segs = (0..segments)
            .map(|i| {
                segment(
                    journey(vec![ride("A", "B", "08:00", "09:00", "ICE 1")], None),
                    if complete || i > 0 { priced(100) } else { unpriced() },
                )
            })
            .collect();
        RankedOption {
            option: SplitOption {
                segments: segs,
                split_stations: vec![station("B")],
                boundaries,
            },
            pricing: PricingSummary {
                is_fully_covered: false,
                has_regional_trains: false,
                has_flix_trains: false,
                cannot_show_price: false,
                has_partial_pricing: !complete,
                segments_without_pricing: if complete { vec![] } else { vec![0] },
                adjusted_total_price: Money::ZERO,
                adjusted_savings: Money::from_cents(savings),
            },
        }
    }

    /// Every segment priced, but the price can't be shown.
    fn hidden_price(boundaries: Vec<usize>, segments: usize, savings: i64) -> RankedOption {
        let mut option = ranked(boundaries, segments, savings, true);
        option.pricing.cannot_show_price = true;
        option
    }

    #[test]
    fn fully_priced_savings() {
        let option = two_segments(priced(40_00), priced(50_00), "ICE 1");
        let summary = summarize(&option, Money::from_cents(120_00), &PassengerContext::new());

        assert_eq!(summary.adjusted_total_price, Money::from_cents(90_00));
        assert_eq!(summary.adjusted_savings, Money::from_cents(30_00));
        assert!(!summary.has_partial_pricing);
        assert!(!summary.cannot_show_price);
        assert!(summary.segments_without_pricing.is_empty());
        assert!(summary.is_complete());
    }

    #[test]
    fn partial_pricing_sums_priced_segments() {
        let option = two_segments(priced(40_00), unpriced(), "ICE 1");
        let summary = summarize(&option, Money::from_cents(120_00), &PassengerContext::new());

        assert!(summary.has_partial_pricing);
        assert!(!summary.cannot_show_price);
        assert_eq!(summary.segments_without_pricing, vec![1]);
        assert_eq!(summary.adjusted_total_price, Money::from_cents(40_00));
        assert_eq!(summary.adjusted_savings, Money::from_cents(80_00));
    }

    #[test]
    fn nothing_priced_cannot_show_price() {
        let option = two_segments(unpriced(), unpriced(), "ICE 1");
        let summary = summarize(&option, Money::from_cents(120_00), &PassengerContext::new());

        assert!(summary.cannot_show_price);
        assert!(!summary.has_partial_pricing);
        assert_eq!(summary.segments_without_pricing, vec![0, 1]);
        assert_eq!(summary.adjusted_total_price, Money::ZERO);
    }

    #[test]
    fn flix_segment_counts_as_unpriced() {
        let mut option = two_segments(priced(40_00), priced(10_00), "ICE 1");
        option.segments[1].journey =
            journey(vec![ride("NUE", "MUC", "10:10", "11:20", "FLX 10")], None);

        let summary = summarize(&option, Money::from_cents(120_00), &PassengerContext::new());
        assert!(summary.has_flix_trains);
        assert_eq!(summary.segments_without_pricing, vec![1]);
        assert_eq!(summary.adjusted_total_price, Money::from_cents(40_00));
    }

    #[test]
    fn regional_pass_covers_regional_segments() {
        let option = two_segments(SegmentQuote::Covered, SegmentQuote::Covered, "RE 1");
        let pass = PassengerContext::new().with_regional_pass(true);
        let summary = summarize(&option, Money::from_cents(120_00), &pass);

        assert!(summary.is_fully_covered);
        assert!(summary.has_regional_trains);
        assert!(summary.is_complete());
        assert_eq!(summary.adjusted_total_price, Money::ZERO);
        assert_eq!(summary.adjusted_savings, Money::from_cents(120_00));
    }

    #[test]
    fn regional_pass_pays_uncovered_segments_only() {
        let mut option = two_segments(SegmentQuote::Covered, priced(50_00), "RE 1");
        option.segments[1].journey =
            journey(vec![ride("NUE", "MUC", "10:10", "11:20", "ICE 5")], None);
        let pass = PassengerContext::new().with_regional_pass(true);
        let summary = summarize(&option, Money::from_cents(120_00), &pass);

        assert!(!summary.is_fully_covered);
        assert_eq!(summary.adjusted_total_price, Money::from_cents(50_00));
        assert_eq!(summary.adjusted_savings, Money::from_cents(70_00));
    }

    #[test]
    fn savings_clamped_at_zero() {
        let option = two_segments(priced(100_00), priced(50_00), "ICE 1");
        let summary = summarize(&option, Money::from_cents(120_00), &PassengerContext::new());
        assert_eq!(summary.adjusted_savings, Money::ZERO);
    }

    #[test]
    fn present_drops_options_without_savings() {
        let options = vec![two_segments(priced(100_00), priced(50_00), "ICE 1")];
        assert!(present(options, Money::from_cents(120_00), &PassengerContext::new()).is_empty());
    }

    #[test]
    fn rank_by_savings_then_segments() {
        let ordered = rank_options(vec![
            ranked(vec![1, 2], 3, 30_00, true),
            ranked(vec![2], 2, 10_00, true),
            ranked(vec![1], 2, 30_00, true),
        ]);
        let bounds: Vec<Vec<usize>> = ordered.iter().map(|r| r.option.boundaries.clone()).collect();
        assert_eq!(bounds, vec![vec![1], vec![1, 2], vec![2]]);
    }

    #[test]
    fn complete_best_shown_alone() {
        let shown = select_for_display(
            vec![
                ranked(vec![1], 2, 30_00, true),
                ranked(vec![2], 2, 20_00, false),
            ],
            false,
        );
        assert_eq!(shown.len(), 1);
    }

    #[test]
    fn partial_best_shown_up_to_first_complete() {
        let shown = select_for_display(
            vec![
                ranked(vec![1], 2, 80_00, false),
                ranked(vec![2], 2, 60_00, false),
                ranked(vec![3], 2, 30_00, true),
                ranked(vec![1, 3], 3, 10_00, true),
            ],
            false,
        );
        let bounds: Vec<Vec<usize>> = shown.iter().map(|r| r.option.boundaries.clone()).collect();
        assert_eq!(bounds, vec![vec![1], vec![2], vec![3]]);
    }

    #[test]
    fn all_partial_shown_in_full() {
        let shown = select_for_display(
            vec![
                ranked(vec![1], 2, 80_00, false),
                ranked(vec![2], 2, 60_00, false),
            ],
            false,
        );
        assert_eq!(shown.len(), 2);
    }

    #[test]
    fn regional_pass_gets_one() {
        let shown = select_for_display(
            vec![
                ranked(vec![1], 2, 80_00, false),
                ranked(vec![2], 2, 60_00, true),
            ],
            true,
        );
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].option.boundaries, vec![1]);
    }

    #[test]
    fn hidden_price_top_extends_to_first_complete() {
        let shown = select_for_display(
            vec![
                hidden_price(vec![1], 2, 80_00),
                ranked(vec![2], 2, 60_00, false),
                ranked(vec![3], 2, 30_00, true),
                ranked(vec![1, 3], 3, 10_00, true),
            ],
            false,
        );

        assert!(!shown[0].pricing.has_partial_pricing);
        assert!(!shown[0].pricing.is_complete());
        let bounds: Vec<Vec<usize>> = shown.iter().map(|r| r.option.boundaries.clone()).collect();
        assert_eq!(bounds, vec![vec![1], vec![2], vec![3]]);
    }

    #[test]
    fn empty_stays_empty() {
        assert!(select_for_display(vec![], true).is_empty());
        assert!(select_for_display(vec![], false).is_empty());
    }

    fn arb_ranked() -> impl Strategy<Value = Vec<RankedOption>> {
        prop::collection::vec(
            (
                prop::collection::vec(1usize..8, 1..4),
                0i64..10_000,
                0u8..3,
            ),
            0..10,
        )
        .prop_map(|items| {
            items
                .into_iter()
                .map(|(boundaries, savings, state)| {
                    let segments = boundaries.len() + 1;
                    match state {
                        0 => ranked(boundaries, segments, savings, true),
                        1 => ranked(boundaries, segments, savings, false),
                        _ => hidden_price(boundaries, segments, savings),
                    }
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn ranked_order_is_by_savings(options in arb_ranked()) {
            let ordered = rank_options(options);
            for pair in ordered.windows(2) {
                prop_assert!(pair[0].pricing.adjusted_savings >= pair[1].pricing.adjusted_savings);
            }
        }

        #[test]
        fn regional_pass_yields_exactly_one(options in arb_ranked()) {
            let had_any = !options.is_empty();
            let shown = select_for_display(rank_options(options), true);
            prop_assert_eq!(shown.len(), usize::from(had_any));
        }

        #[test]
        fn prefix_reaches_first_complete(options in arb_ranked()) {
            let ordered = rank_options(options);
            let shown = select_for_display(ordered.clone(), false);

            // Always a prefix of the ranked list
            prop_assert_eq!(&ordered[..shown.len()], &shown[..]);

            match ordered.iter().position(|r| r.pricing.is_complete()) {
                Some(i) => prop_assert_eq!(shown.len(), i + 1),
                None => prop_assert_eq!(shown.len(), ordered.len()),
            }
        }

        #[test]
        fn summaries_never_negative(first in 0i64..20_000, second in 0i64..20_000, original in 0i64..20_000) {
            let option = two_segments(priced(first), priced(second), "ICE 1");
            let summary = summarize(&option, Money::from_cents(original), &PassengerContext::new());
            prop_assert!(summary.adjusted_savings >= Money::ZERO);
            prop_assert!(summary.adjusted_savings <= Money::from_cents(original));
        }
    }
}
