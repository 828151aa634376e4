//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    DomainError, LoyaltyCard, Money, PassengerContext, Station, StationId, TravelClass,
};
use crate::journeys::SearchTarget;
use crate::split::{
    FareTreatment, PricingSummary, Progress, RankedOption, ScanEvent, ScanRequest, SegmentQuote,
    SplitSegment, UnpricedReason,
};
use crate::vendo::{
    JourneyQuery, VendoJourney, convert_journey, journey_to_wire, parse_timestamp,
};

/// Journeys requested when the traveler picked an exact departure.
const EXACT_SEARCH_RESULTS: u8 = 5;

/// Journeys requested for an open search unless the query says otherwise.
const DEFAULT_SEARCH_RESULTS: u8 = 10;

/// Build the passenger context from the loosely typed request fields.
///
/// Travel class defaults to second; a BahnCard of `"none"` or empty is
/// no card.
pub fn passenger_context(
    travel_class: Option<&str>,
    bahn_card: Option<&str>,
    age: Option<u8>,
    has_regional_pass: bool,
) -> Result<PassengerContext, DomainError> {
    let class = match travel_class {
        Some(s) if !s.trim().is_empty() => TravelClass::parse(s)?,
        _ => TravelClass::default(),
    };

    let mut passenger = PassengerContext::new()
        .with_travel_class(class)
        .with_regional_pass(has_regional_pass);

    if let Some(card) = bahn_card
        .map(|s| LoyaltyCard::parse_bahncard(s, class))
        .transpose()?
        .flatten()
    {
        passenger = passenger.with_loyalty_card(card);
    }

    if let Some(age) = age {
        passenger = passenger.with_age(age);
    }

    Ok(passenger)
}

/// Query parameters of `GET /api/journeys`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneysParams {
    /// Origin station id
    pub from: Option<String>,

    /// Destination station id
    pub to: Option<String>,

    /// Departure time (RFC 3339)
    pub departure: Option<String>,

    pub results: Option<u8>,

    /// `"none"`, `"25"`, `"50"` or `"100"`
    pub bahn_card: Option<String>,

    #[serde(default)]
    pub has_deutschland_ticket: bool,

    pub passenger_age: Option<String>,

    /// `"1"` or `"2"`
    pub travel_class: Option<String>,
}

impl JourneysParams {
    /// Validate the parameters into an API query and the search target.
    ///
    /// Returns a message for the traveler on invalid input.
    pub fn to_query(&self, now: DateTime<Utc>) -> Result<(JourneyQuery, SearchTarget), String> {
        let (Some(from), Some(to)) = (non_empty(&self.from), non_empty(&self.to)) else {
            return Err("Missing required parameters: from and to station IDs".to_string());
        };

        let origin = StationId::parse(from).map_err(|e| e.to_string())?;
        let destination = StationId::parse(to).map_err(|e| e.to_string())?;

        let departure = non_empty(&self.departure)
            .map(parse_timestamp)
            .transpose()
            .map_err(|e| e.to_string())?;

        if departure.is_some_and(|d| d < now) {
            return Err("Departure time cannot be in the past".to_string());
        }

        let age = non_empty(&self.passenger_age)
            .map(|s| s.trim().parse::<u8>())
            .transpose()
            .map_err(|_| format!("Invalid passenger age: {:?}", self.passenger_age))?;

        let passenger = passenger_context(
            self.travel_class.as_deref(),
            self.bahn_card.as_deref(),
            age,
            self.has_deutschland_ticket,
        )
        .map_err(|e| e.to_string())?;

        let results = match departure {
            Some(_) => EXACT_SEARCH_RESULTS,
            None => self.results.unwrap_or(DEFAULT_SEARCH_RESULTS),
        };

        let mut query = JourneyQuery::new(origin.clone(), destination.clone())
            .with_results(results)
            .with_passenger(passenger);
        if let Some(departure) = departure {
            query = query.departing_at(departure);
        }

        let target = SearchTarget {
            origin,
            destination,
            departure,
        };

        Ok((query, target))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// Response of `GET /api/journeys`.
#[derive(Debug, Serialize)]
pub struct JourneySearchResponse {
    pub journeys: Vec<VendoJourney>,
}

/// Body of `POST /api/split-journey`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitJourneyRequest {
    /// The journey as returned by the search
    pub original_journey: VendoJourney,

    #[serde(default)]
    pub bahn_card: Option<String>,

    #[serde(default)]
    pub has_deutschland_ticket: bool,

    #[serde(default)]
    pub passenger_age: Option<u8>,

    #[serde(default)]
    pub travel_class: Option<String>,

    /// Answer with Server-Sent Events instead of a single JSON body
    #[serde(default)]
    pub use_streaming: bool,
}

impl SplitJourneyRequest {
    /// Validate the request into a scan request.
    ///
    /// Returns a message for the traveler on invalid input.
    pub fn to_scan_request(&self) -> Result<ScanRequest, String> {
        let passenger = passenger_context(
            self.travel_class.as_deref(),
            self.bahn_card.as_deref(),
            self.passenger_age,
            self.has_deutschland_ticket,
        )
        .map_err(|e| e.to_string())?;

        let journey = convert_journey(&self.original_journey)
            .map_err(|e| format!("Invalid original journey: {e}"))?;

        ScanRequest::new(journey, passenger).map_err(|e| format!("Invalid original journey: {e}"))
    }
}

/// A station in responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationDto {
    pub id: String,
    pub name: String,
}

impl From<&Station> for StationDto {
    fn from(station: &Station) -> Self {
        Self {
            id: station.id.to_string(),
            name: station.display_name().to_string(),
        }
    }
}

/// One separately bought segment.
///
/// The segment's legs in the wire journey shape, priced with the
/// segment's fare when one was found.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentDto {
    #[serde(flatten)]
    pub journey: VendoJourney,

    /// `"waived"`, `"discounted"` or `"full"`
    pub fare: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<u8>,

    /// Why the segment has no price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unpriced_reason: Option<String>,
}

impl From<&SplitSegment> for SegmentDto {
    fn from(segment: &SplitSegment) -> Self {
        let priced = segment
            .journey
            .clone()
            .with_price(segment.quote.price().cloned());

        let (fare, discount_percent) = match segment.treatment {
            FareTreatment::Waived => ("waived", None),
            FareTreatment::Discounted(percent) => ("discounted", Some(percent)),
            FareTreatment::Full => ("full", None),
        };

        let unpriced_reason = match &segment.quote {
            SegmentQuote::Unpriced(reason) => Some(describe_unpriced(reason)),
            _ => None,
        };

        Self {
            journey: journey_to_wire(&priced),
            fare,
            discount_percent,
            unpriced_reason,
        }
    }
}

fn describe_unpriced(reason: &UnpricedReason) -> String {
    match reason {
        UnpricedReason::NoMatch => "no fare found for this train".to_string(),
        UnpricedReason::NotOffered => "fare not offered".to_string(),
        UnpricedReason::TimedOut => "price lookup timed out".to_string(),
        UnpricedReason::Failed(e) => e.to_string(),
    }
}

/// A ranked split option.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitOptionDto {
    pub segments: Vec<SegmentDto>,
    pub split_stations: Vec<StationDto>,

    /// Sum of the segment fares, when every segment is priced or covered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<f64>,

    pub savings: f64,

    #[serde(flatten)]
    pub pricing: PricingSummaryDto,
}

impl From<&RankedOption> for SplitOptionDto {
    fn from(ranked: &RankedOption) -> Self {
        Self {
            segments: ranked.option.segments.iter().map(SegmentDto::from).collect(),
            split_stations: ranked
                .option
                .split_stations
                .iter()
                .map(StationDto::from)
                .collect(),
            total_price: ranked.option.total_price().map(Money::to_decimal),
            savings: ranked.pricing.adjusted_savings.to_decimal(),
            pricing: PricingSummaryDto::from(&ranked.pricing),
        }
    }
}

/// Pricing facts about a split option, amounts in euros.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingSummaryDto {
    pub is_fully_covered: bool,
    pub has_regional_trains: bool,
    pub has_flix_trains: bool,
    pub cannot_show_price: bool,
    pub has_partial_pricing: bool,
    pub segments_without_pricing: Vec<usize>,
    pub adjusted_total_price: f64,
    pub adjusted_savings: f64,
}

impl From<&PricingSummary> for PricingSummaryDto {
    fn from(summary: &PricingSummary) -> Self {
        Self {
            is_fully_covered: summary.is_fully_covered,
            has_regional_trains: summary.has_regional_trains,
            has_flix_trains: summary.has_flix_trains,
            cannot_show_price: summary.cannot_show_price,
            has_partial_pricing: summary.has_partial_pricing,
            segments_without_pricing: summary.segments_without_pricing.clone(),
            adjusted_total_price: summary.adjusted_total_price.to_decimal(),
            adjusted_savings: summary.adjusted_savings.to_decimal(),
        }
    }
}

/// Single-shot response of `POST /api/split-journey`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitJourneyResponse {
    pub split_options: Vec<SplitOptionDto>,
}

impl SplitJourneyResponse {
    pub fn new(options: &[RankedOption]) -> Self {
        Self {
            split_options: options.iter().map(SplitOptionDto::from).collect(),
        }
    }
}

/// One Server-Sent Event of a streamed scan.
#[derive(Debug, Serialize)]
#[serde(
    tag = "type",
    rename_all = "lowercase",
    rename_all_fields = "camelCase"
)]
pub enum ScanEventDto {
    Progress {
        checked: usize,
        total: usize,
        current_station: String,
        message: String,
    },
    Complete {
        split_options: Vec<SplitOptionDto>,
    },
    Error {
        error: String,
    },
}

impl From<&ScanEvent> for ScanEventDto {
    fn from(event: &ScanEvent) -> Self {
        match event {
            ScanEvent::Progress(Progress {
                checked,
                total,
                current_station,
                message,
            }) => ScanEventDto::Progress {
                checked: *checked,
                total: *total,
                current_station: current_station.clone(),
                message: message.clone(),
            },
            ScanEvent::Complete(options) => ScanEventDto::Complete {
                split_options: options.iter().map(SplitOptionDto::from).collect(),
            },
            ScanEvent::Error(message) => ScanEventDto::Error {
                error: message.clone(),
            },
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
