//! Passenger context: who is travelling and with which discounts.

use std::fmt;

use super::DomainError;

/// Travel class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TravelClass {
    First,
    #[default]
    Second,
}

impl TravelClass {
    /// Parse "1" or "2".
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim() {
            "1" => Ok(TravelClass::First),
            "2" => Ok(TravelClass::Second),
            other => Err(DomainError::InvalidTravelClass(other.to_string())),
        }
    }

    /// The class as a number.
    pub fn number(self) -> u8 {
        match self {
            TravelClass::First => 1,
            TravelClass::Second => 2,
        }
    }
}

/// BahnCard discount tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BahnCardDiscount {
    Bc25,
    Bc50,
    Bc100,
}

impl BahnCardDiscount {
    /// Discount in percent.
    pub fn percent(self) -> u8 {
        match self {
            BahnCardDiscount::Bc25 => 25,
            BahnCardDiscount::Bc50 => 50,
            BahnCardDiscount::Bc100 => 100,
        }
    }
}

/// A loyalty card held by the traveler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoyaltyCard {
    BahnCard {
        discount: BahnCardDiscount,
        class: TravelClass,
    },
}

impl LoyaltyCard {
    /// Parse a BahnCard selection: `"none"`/empty, `"25"`, `"50"` or `"100"`.
    ///
    /// Returns `Ok(None)` when no card is selected.
    pub fn parse_bahncard(s: &str, class: TravelClass) -> Result<Option<Self>, DomainError> {
        let discount = match s.trim() {
            "" | "none" => return Ok(None),
            "25" => BahnCardDiscount::Bc25,
            "50" => BahnCardDiscount::Bc50,
            "100" => BahnCardDiscount::Bc100,
            other => return Err(DomainError::InvalidBahnCard(other.to_string())),
        };
        Ok(Some(LoyaltyCard::BahnCard { discount, class }))
    }

    /// Discount in percent the card grants on eligible fares.
    pub fn discount_percent(&self) -> u8 {
        match self {
            LoyaltyCard::BahnCard { discount, .. } => discount.percent(),
        }
    }
}

impl fmt::Display for LoyaltyCard {
    /// Renders the API's loyalty-card id, e.g. `bahncard-2nd-50`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoyaltyCard::BahnCard { discount, class } => {
                let class = match class {
                    TravelClass::First => "1st",
                    TravelClass::Second => "2nd",
                };
                write!(f, "bahncard-{class}-{}", discount.percent())
            }
        }
    }
}

/// Everything about the traveler that affects fares.
///
/// Supplied once per request; the engine only reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PassengerContext {
    pub travel_class: TravelClass,
    /// Age in years; the API picks the fare class from it
    pub age: Option<u8>,
    pub loyalty_card: Option<LoyaltyCard>,
    /// Holds a flat-rate regional pass (Deutschland-Ticket)
    pub has_regional_pass: bool,
}

impl PassengerContext {
    /// Second class adult without discounts.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_travel_class(mut self, class: TravelClass) -> Self {
        self.travel_class = class;
        self
    }

    pub fn with_age(mut self, age: u8) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_loyalty_card(mut self, card: LoyaltyCard) -> Self {
        self.loyalty_card = Some(card);
        self
    }

    pub fn with_regional_pass(mut self, has_pass: bool) -> Self {
        self.has_regional_pass = has_pass;
        self
    }
}
