//! Discount eligibility.
//!
//! The single source of truth for regional-pass coverage. Everything here
//! is a pure function of legs and the passenger context.

use crate::domain::{Journey, Leg, PassengerContext, Product};

/// Products a flat-rate regional pass is valid on.
pub const REGIONAL_PRODUCTS: [Product; 3] = [
    Product::RegionalExpress,
    Product::Regional,
    Product::Suburban,
];

/// How a segment's fare is computed for this passenger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FareTreatment {
    /// Fully covered by the regional pass; nothing to buy.
    Waived,
    /// Loyalty-card discount applies, in percent.
    Discounted(u8),
    /// Full fare.
    Full,
}

/// True for legs on regional or suburban rail.
pub fn is_regional_leg(leg: &Leg) -> bool {
    leg.product().is_some_and(|p| REGIONAL_PRODUCTS.contains(p))
}

/// True for legs run by a carrier outside the pricing API's coverage.
///
/// Matches on line name, product label and operator, since the API
/// reports these carriers inconsistently.
pub fn is_flix_leg(leg: &Leg) -> bool {
    let Some(line) = leg.line() else {
        return false;
    };

    let mentions_flix = |s: &str| s.to_ascii_lowercase().contains("flix");

    mentions_flix(&line.name)
        || line.name.trim_start().to_ascii_uppercase().starts_with("FLX")
        || line.product_name.as_deref().is_some_and(mentions_flix)
        || line.operator.as_deref().is_some_and(mentions_flix)
}

/// True when the traveler's regional pass covers this leg.
///
/// Walks are never "covered"; they need no ticket at all.
pub fn leg_covered(leg: &Leg, passenger: &PassengerContext) -> bool {
    passenger.has_regional_pass && !leg.is_walking() && is_regional_leg(leg) && !is_flix_leg(leg)
}

/// True when every ride of the journey is covered by the regional pass.
pub fn journey_fully_covered(journey: &Journey, passenger: &PassengerContext) -> bool {
    passenger.has_regional_pass && journey.ride_legs().all(|leg| leg_covered(leg, passenger))
}

pub fn has_regional_trains(journey: &Journey) -> bool {
    journey.ride_legs().any(is_regional_leg)
}

pub fn has_flix_trains(journey: &Journey) -> bool {
    journey.ride_legs().any(is_flix_leg)
}

/// Fare treatment of a segment.
///
/// Loyalty discounts don't apply to carriers outside the pricing API's
/// coverage.
pub fn fare_treatment(segment: &Journey, passenger: &PassengerContext) -> FareTreatment {
    if journey_fully_covered(segment, passenger) {
        return FareTreatment::Waived;
    }

    match &passenger.loyalty_card {
        Some(card) if !has_flix_trains(segment) => FareTreatment::Discounted(card.discount_percent()),
        _ => FareTreatment::Full,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BahnCardDiscount, Line, LoyaltyCard, TravelClass};
    use crate::split::testing::{journey, ride, ride_on, walk};

    fn pass_holder() -> PassengerContext {
        PassengerContext::new().with_regional_pass(true)
    }

    #[test]
    fn regional_products() {
        assert!(is_regional_leg(&ride("A", "B", "08:00", "09:00", "RE 1")));
        assert!(is_regional_leg(&ride("A", "B", "08:00", "09:00", "RB 12")));
        assert!(is_regional_leg(&ride("A", "B", "08:00", "09:00", "S 5")));
        assert!(!is_regional_leg(&ride("A", "B", "08:00", "09:00", "ICE 1")));
        assert!(!is_regional_leg(&walk("A", "B", "08:00", "08:10")));
    }

    #[test]
    fn regional_aliases_parse() {
        let leg = ride_on(
            "A",
            "B",
            "08:00",
            "09:00",
            Line::named("RB 1").with_product(Product::parse("regionalbahn")),
        );
        assert!(is_regional_leg(&leg));

        let leg = ride_on(
            "A",
            "B",
            "08:00",
            "09:00",
            Line::named("S 1").with_product(Product::parse("SBAHN")),
        );
        assert!(is_regional_leg(&leg));
    }

    #[test]
    fn flix_detection() {
        assert!(is_flix_leg(&ride("A", "B", "08:00", "09:00", "FLX 1234")));
        assert!(is_flix_leg(&ride_on(
            "A",
            "B",
            "08:00",
            "09:00",
            Line::named("Train 55").with_operator("FlixTrain GmbH"),
        )));
        assert!(!is_flix_leg(&ride("A", "B", "08:00", "09:00", "ICE 1")));
        assert!(!is_flix_leg(&walk("A", "B", "08:00", "08:10")));
    }

    #[test]
    fn coverage_requires_pass() {
        let leg = ride("A", "B", "08:00", "09:00", "RE 1");
        assert!(leg_covered(&leg, &pass_holder()));
        assert!(!leg_covered(&leg, &PassengerContext::new()));
    }

    #[test]
    fn regional_flix_not_covered() {
        let leg = ride_on(
            "A",
            "B",
            "08:00",
            "09:00",
            Line::named("RE 99")
                .with_product(Product::RegionalExpress)
                .with_operator("Flix"),
        );
        assert!(!leg_covered(&leg, &pass_holder()));
    }

    #[test]
    fn fully_covered_ignores_walks() {
        let j = journey(
            vec![
                ride("A", "B", "08:00", "09:00", "RE 1"),
                walk("B", "C", "09:00", "09:05"),
                ride("C", "D", "09:10", "10:00", "S 2"),
            ],
            None,
        );
        assert!(journey_fully_covered(&j, &pass_holder()));

        let j = journey(
            vec![
                ride("A", "B", "08:00", "09:00", "RE 1"),
                ride("B", "D", "09:10", "10:00", "ICE 2"),
            ],
            None,
        );
        assert!(!journey_fully_covered(&j, &pass_holder()));
        assert!(has_regional_trains(&j));
        assert!(!has_flix_trains(&j));
    }

    #[test]
    fn fare_treatments() {
        let regional = journey(vec![ride("A", "B", "08:00", "09:00", "RE 1")], None);
        let flix = journey(vec![ride("A", "B", "08:00", "09:00", "FLX 10")], None);
        let card = LoyaltyCard::BahnCard {
            discount: BahnCardDiscount::Bc25,
            class: TravelClass::Second,
        };

        assert_eq!(fare_treatment(&regional, &pass_holder()), FareTreatment::Waived);
        assert_eq!(
            fare_treatment(&regional, &PassengerContext::new()),
            FareTreatment::Full
        );

        let carded = PassengerContext::new().with_loyalty_card(card);
        assert_eq!(
            fare_treatment(&regional, &carded),
            FareTreatment::Discounted(25)
        );
        assert_eq!(fare_treatment(&flix, &carded), FareTreatment::Full);
    }
}
