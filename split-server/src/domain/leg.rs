//! Journey leg types.
//!
//! A `Leg` is one continuous ride on a vehicle or one walking transfer.

use chrono::{DateTime, Duration, FixedOffset};

use super::{DomainError, Station};

/// Timestamps carry the offset the API reported them in.
pub type Timestamp = DateTime<FixedOffset>;

/// Transport category of a line, as reported by the API.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Product {
    /// ICE and comparable high-speed trains
    NationalExpress,
    /// IC/EC
    National,
    /// RE
    RegionalExpress,
    /// RB
    Regional,
    /// S-Bahn
    Suburban,
    Bus,
    Ferry,
    Subway,
    Tram,
    Taxi,
    /// Anything we don't recognise, kept verbatim
    Other(String),
}

impl Product {
    /// Parse a product id, case-insensitively.
    ///
    /// Besides the API's own ids this accepts the colloquial aliases
    /// `regionalbahn` and `sbahn`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "nationalexpress" => Product::NationalExpress,
            "national" => Product::National,
            "regionalexpress" => Product::RegionalExpress,
            "regional" | "regionalbahn" => Product::Regional,
            "suburban" | "sbahn" => Product::Suburban,
            "bus" => Product::Bus,
            "ferry" => Product::Ferry,
            "subway" => Product::Subway,
            "tram" => Product::Tram,
            "taxi" => Product::Taxi,
            _ => Product::Other(s.to_string()),
        }
    }

    /// The API's product id.
    pub fn as_str(&self) -> &str {
        match self {
            Product::NationalExpress => "nationalExpress",
            Product::National => "national",
            Product::RegionalExpress => "regionalExpress",
            Product::Regional => "regional",
            Product::Suburban => "suburban",
            Product::Bus => "bus",
            Product::Ferry => "ferry",
            Product::Subway => "subway",
            Product::Tram => "tram",
            Product::Taxi => "taxi",
            Product::Other(s) => s,
        }
    }
}

/// The line a ride leg runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Display name, e.g. "ICE 1601" or "RE 1"
    pub name: String,
    pub product: Option<Product>,
    /// Short product label, e.g. "ICE", "RE", "FLX"
    pub product_name: Option<String>,
    /// Transport mode, e.g. "train"
    pub mode: Option<String>,
    /// Operating company
    pub operator: Option<String>,
}

impl Line {
    /// A line with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            product: None,
            product_name: None,
            mode: None,
            operator: None,
        }
    }

    /// Set the product.
    pub fn with_product(mut self, product: Product) -> Self {
        self.product = Some(product);
        self
    }

    /// Set the operator.
    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }
}

/// An intermediate stop passed without alighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stopover {
    pub station: Station,
    pub arrival: Option<Timestamp>,
    pub departure: Option<Timestamp>,
    pub cancelled: bool,
}

/// What kind of movement a leg is.
///
/// Walks cannot carry a line; the enum makes that unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegKind {
    Ride { line: Option<Line> },
    Walk,
}

/// One ride or walking transfer.
///
/// # Invariants
///
/// - Planned arrival is not before planned departure
/// - Walking legs carry no line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leg {
    origin: Station,
    destination: Station,
    departure: Timestamp,
    arrival: Timestamp,
    kind: LegKind,
    departure_platform: Option<String>,
    arrival_platform: Option<String>,
    departure_delay: Option<Duration>,
    arrival_delay: Option<Duration>,
    cancelled: bool,
    stopovers: Vec<Stopover>,
}

fn delayed(planned: Timestamp, delay: Option<Duration>) -> Timestamp {
    delay
        .and_then(|d| planned.checked_add_signed(d))
        .unwrap_or(planned)
}

impl Leg {
    /// Construct a leg of the given kind with planned times.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `arrival` is before `departure`.
    pub fn new(
        origin: Station,
        destination: Station,
        departure: Timestamp,
        arrival: Timestamp,
        kind: LegKind,
    ) -> Result<Self, DomainError> {
        if arrival < departure {
            return Err(DomainError::ArrivalBeforeDeparture { index: 0 });
        }

        Ok(Leg {
            origin,
            destination,
            departure,
            arrival,
            kind,
            departure_platform: None,
            arrival_platform: None,
            departure_delay: None,
            arrival_delay: None,
            cancelled: false,
            stopovers: Vec::new(),
        })
    }

    /// Construct a ride leg.
    pub fn ride(
        origin: Station,
        destination: Station,
        departure: Timestamp,
        arrival: Timestamp,
        line: Option<Line>,
    ) -> Result<Self, DomainError> {
        Self::new(
            origin,
            destination,
            departure,
            arrival,
            LegKind::Ride { line },
        )
    }

    /// Construct a walking transfer.
    pub fn walk(
        origin: Station,
        destination: Station,
        departure: Timestamp,
        arrival: Timestamp,
    ) -> Result<Self, DomainError> {
        Self::new(origin, destination, departure, arrival, LegKind::Walk)
    }

    /// Attach platform information.
    pub fn with_platforms(mut self, departure: Option<String>, arrival: Option<String>) -> Self {
        self.departure_platform = departure;
        self.arrival_platform = arrival;
        self
    }

    /// Attach realtime delays.
    pub fn with_delays(mut self, departure: Option<Duration>, arrival: Option<Duration>) -> Self {
        self.departure_delay = departure;
        self.arrival_delay = arrival;
        self
    }

    /// Mark the leg as cancelled (or not).
    pub fn with_cancelled(mut self, cancelled: bool) -> Self {
        self.cancelled = cancelled;
        self
    }

    /// Attach intermediate stops.
    pub fn with_stopovers(mut self, stopovers: Vec<Stopover>) -> Self {
        self.stopovers = stopovers;
        self
    }

    pub fn origin(&self) -> &Station {
        &self.origin
    }

    pub fn destination(&self) -> &Station {
        &self.destination
    }

    /// Planned departure.
    pub fn departure(&self) -> Timestamp {
        self.departure
    }

    /// Planned arrival.
    pub fn arrival(&self) -> Timestamp {
        self.arrival
    }

    /// Departure including any reported delay.
    ///
    /// A delay that would leave the representable range is ignored.
    pub fn expected_departure(&self) -> Timestamp {
        delayed(self.departure, self.departure_delay)
    }

    /// Arrival including any reported delay.
    pub fn expected_arrival(&self) -> Timestamp {
        delayed(self.arrival, self.arrival_delay)
    }

    /// Planned duration.
    pub fn duration(&self) -> Duration {
        self.arrival.signed_duration_since(self.departure)
    }

    pub fn kind(&self) -> &LegKind {
        &self.kind
    }

    /// Returns true for walking transfers.
    pub fn is_walking(&self) -> bool {
        matches!(self.kind, LegKind::Walk)
    }

    /// The line, if this is a ride with line information.
    pub fn line(&self) -> Option<&Line> {
        match &self.kind {
            LegKind::Ride { line } => line.as_ref(),
            LegKind::Walk => None,
        }
    }

    /// The product of the line, if known.
    pub fn product(&self) -> Option<&Product> {
        self.line().and_then(|l| l.product.as_ref())
    }

    pub fn departure_platform(&self) -> Option<&str> {
        self.departure_platform.as_deref()
    }

    pub fn arrival_platform(&self) -> Option<&str> {
        self.arrival_platform.as_deref()
    }

    pub fn departure_delay(&self) -> Option<Duration> {
        self.departure_delay
    }

    pub fn arrival_delay(&self) -> Option<Duration> {
        self.arrival_delay
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn stopovers(&self) -> &[Stopover] {
        &self.stopovers
    }
}
