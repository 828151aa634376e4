//! Journey types.
//!
//! A `Journey` is an ordered sequence of legs from an origin to a
//! destination, optionally carrying the fare the API quoted for it.

use std::ops::Range;

use chrono::Duration;

use super::{DomainError, Leg, Price, Station, Timestamp};

/// A complete journey from origin to destination.
///
/// # Invariants
///
/// - At least one leg
/// - Consecutive legs connect (destination id of one = origin id of next)
/// - Each leg arrives (planned) no later than the next one departs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journey {
    legs: Vec<Leg>,
    price: Option<Price>,
}

impl Journey {
    /// Constructs a journey, validating leg contiguity.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - `legs` is empty
    /// - consecutive legs don't share a station
    /// - a leg arrives after the next leg departs
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::DateTime;
    /// use split_server::domain::{Journey, Leg, Station, StationId};
    ///
    /// let berlin = Station::new(StationId::parse("8011160").unwrap(), "Berlin Hbf");
    /// let munich = Station::new(StationId::parse("8000261").unwrap(), "München Hbf");
    ///
    /// let leg = Leg::ride(
    ///     berlin,
    ///     munich,
    ///     DateTime::parse_from_rfc3339("2025-06-02T08:00:00+02:00").unwrap(),
    ///     DateTime::parse_from_rfc3339("2025-06-02T12:00:00+02:00").unwrap(),
    ///     None,
    /// )
    /// .unwrap();
    ///
    /// let journey = Journey::new(vec![leg], None).unwrap();
    /// assert_eq!(journey.leg_count(), 1);
    /// assert_eq!(journey.change_count(), 0);
    /// ```
    pub fn new(legs: Vec<Leg>, price: Option<Price>) -> Result<Self, DomainError> {
        if legs.is_empty() {
            return Err(DomainError::EmptyJourney);
        }

        for (index, window) in legs.windows(2).enumerate() {
            let (prev, next) = (&window[0], &window[1]);

            if prev.destination().id != next.origin().id {
                return Err(DomainError::NotContiguous {
                    index,
                    from: prev.destination().id.clone(),
                    to: next.origin().id.clone(),
                });
            }

            if prev.arrival() > next.departure() {
                return Err(DomainError::OverlappingLegs { index });
            }
        }

        Ok(Journey { legs, price })
    }

    /// Returns the legs in travel order.
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn leg_count(&self) -> usize {
        self.legs.len()
    }

    /// The quoted fare, if any.
    pub fn price(&self) -> Option<&Price> {
        self.price.as_ref()
    }

    /// Replace the fare.
    pub fn with_price(mut self, price: Option<Price>) -> Self {
        self.price = price;
        self
    }

    pub fn origin(&self) -> &Station {
        // Safe: non-empty by construction
        self.legs[0].origin()
    }

    pub fn destination(&self) -> &Station {
        self.legs[self.legs.len() - 1].destination()
    }

    /// Planned departure of the first leg.
    pub fn departure(&self) -> Timestamp {
        self.legs[0].departure()
    }

    /// Planned arrival of the last leg.
    pub fn arrival(&self) -> Timestamp {
        self.legs[self.legs.len() - 1].arrival()
    }

    pub fn duration(&self) -> Duration {
        self.arrival().signed_duration_since(self.departure())
    }

    /// Iterate over non-walking legs.
    pub fn ride_legs(&self) -> impl Iterator<Item = &Leg> {
        self.legs.iter().filter(|l| !l.is_walking())
    }

    /// The first non-walking leg, if any.
    pub fn first_ride(&self) -> Option<&Leg> {
        self.ride_legs().next()
    }

    /// Number of vehicle changes.
    pub fn change_count(&self) -> usize {
        self.ride_legs().count().saturating_sub(1)
    }

    /// Cut out the sub-journey covering `range` of legs, without a price.
    pub fn slice(&self, range: Range<usize>) -> Result<Journey, DomainError> {
        if range.start >= range.end || range.end > self.legs.len() {
            return Err(DomainError::InvalidLegRange {
                start: range.start,
                end: range.end,
                len: self.legs.len(),
            });
        }

        // Contiguity is inherited from self
        Ok(Journey {
            legs: self.legs[range].to_vec(),
            price: None,
        })
    }

    /// Route signature: identifies the physical route and fare.
    ///
    /// Two journeys with the same signature are duplicates. Each leg
    /// contributes `line-origin-destination-departure` (walks use `walk` as
    /// the line), legs are joined by `|`, and the fare in cents (or
    /// `no-price`) is appended.
    pub fn signature(&self) -> String {
        let legs: Vec<String> = self
            .legs
            .iter()
            .map(|leg| {
                format!(
                    "{}-{}-{}-{}",
                    leg.line().map(|l| l.name.as_str()).unwrap_or("walk"),
                    leg.origin().id,
                    leg.destination().id,
                    leg.departure().to_rfc3339()
                )
            })
            .collect();

        let price = self
            .price
            .as_ref()
            .map(|p| p.amount.cents().to_string())
            .unwrap_or_else(|| "no-price".to_string());

        format!("{}-{}", legs.join("|"), price)
    }
}
