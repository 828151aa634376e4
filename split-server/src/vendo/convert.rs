//! Conversion between journey API DTOs and domain types.
//!
//! Inbound conversion is strict about the fields the engine relies on
//! (station ids, planned times, leg contiguity) and lenient about the
//! rest: an unparseable platform or stopover time is dropped, not fatal.
//! Outbound conversion renders domain journeys back into the wire shape,
//! which is also the shape the HTTP surface exchanges with its clients.

use chrono::{DateTime, Duration};
use tracing::warn;

use crate::domain::{
    DomainError, Journey, Leg, LegKind, Line, Money, Price, Product, Station, StationId,
    Stopover, Timestamp,
};

use super::types::{
    JourneysResponse, VendoJourney, VendoLeg, VendoLine, VendoLocation, VendoOperator,
    VendoPrice, VendoStopover,
};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Failed to parse a station id
    #[error("invalid station id: {0:?}")]
    InvalidStation(String),

    /// Failed to parse a timestamp
    #[error("invalid time: {0}")]
    InvalidTime(String),

    /// Negative or non-finite amount
    #[error("invalid price amount: {0}")]
    InvalidPrice(f64),

    /// A leg violates its own invariants
    #[error("invalid leg {index}: {source}")]
    InvalidLeg {
        index: usize,
        #[source]
        source: DomainError,
    },

    /// The legs don't form a valid journey
    #[error("invalid journey: {0}")]
    InvalidJourney(#[from] DomainError),
}

/// Convert every journey in a response, skipping malformed ones.
pub fn convert_journeys(response: &JourneysResponse) -> Vec<Journey> {
    let mut journeys = Vec::with_capacity(response.journeys.len());

    for (index, item) in response.journeys.iter().enumerate() {
        match convert_journey(item) {
            Ok(journey) => journeys.push(journey),
            Err(e) => warn!(index, error = %e, "skipping malformed journey"),
        }
    }

    journeys
}

/// Convert a single journey.
pub fn convert_journey(item: &VendoJourney) -> Result<Journey, ConversionError> {
    let legs = item
        .legs
        .iter()
        .enumerate()
        .map(|(index, leg)| {
            convert_leg(leg).map_err(|e| match e {
                ConversionError::InvalidJourney(source) => {
                    ConversionError::InvalidLeg { index, source }
                }
                other => other,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let price = item.price.as_ref().map(convert_price).transpose()?.flatten();

    Ok(Journey::new(legs, price)?)
}

/// Convert a single leg.
pub fn convert_leg(leg: &VendoLeg) -> Result<Leg, ConversionError> {
    let origin = convert_location(leg.origin.as_ref().ok_or(ConversionError::MissingField("origin"))?)?;
    let destination = convert_location(
        leg.destination
            .as_ref()
            .ok_or(ConversionError::MissingField("destination"))?,
    )?;

    let departure = planned_time(
        leg.planned_departure.as_deref(),
        leg.departure.as_deref(),
        leg.departure_delay,
    )?
    .ok_or(ConversionError::MissingField("departure"))?;

    let arrival = planned_time(
        leg.planned_arrival.as_deref(),
        leg.arrival.as_deref(),
        leg.arrival_delay,
    )?
    .ok_or(ConversionError::MissingField("arrival"))?;

    let kind = if leg.walking.unwrap_or(false) {
        LegKind::Walk
    } else {
        LegKind::Ride {
            line: leg.line.as_ref().and_then(convert_line),
        }
    };

    let stopovers = leg
        .stopovers
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter_map(convert_stopover)
        .collect();

    let departure_delay = leg
        .departure_delay
        .map(|secs| delay_from(departure, secs))
        .transpose()?;
    let arrival_delay = leg
        .arrival_delay
        .map(|secs| delay_from(arrival, secs))
        .transpose()?;

    Ok(Leg::new(origin, destination, departure, arrival, kind)?
        .with_platforms(leg.departure_platform.clone(), leg.arrival_platform.clone())
        .with_delays(departure_delay, arrival_delay)
        .with_cancelled(leg.cancelled.unwrap_or(false))
        .with_stopovers(stopovers))
}

/// Convert a station reference. The id is required; the name is not.
pub fn convert_location(location: &VendoLocation) -> Result<Station, ConversionError> {
    let raw = location
        .id
        .as_deref()
        .ok_or(ConversionError::MissingField("station id"))?;
    let id = StationId::parse(raw).map_err(|_| ConversionError::InvalidStation(raw.to_string()))?;

    Ok(match &location.name {
        Some(name) if !name.trim().is_empty() => Station::new(id, name.trim()),
        _ => Station::unnamed(id),
    })
}

/// Convert a fare. A null amount means "no fare known", not zero.
pub fn convert_price(price: &VendoPrice) -> Result<Option<Price>, ConversionError> {
    let Some(amount) = price.amount else {
        return Ok(None);
    };

    let amount = Money::from_decimal(amount).map_err(|e| ConversionError::InvalidPrice(e.0))?;

    Ok(Some(Price {
        amount,
        hint: price.hint.clone().filter(|h| !h.trim().is_empty()),
    }))
}

/// Lines without a name are treated as unknown.
fn convert_line(line: &VendoLine) -> Option<Line> {
    let name = line
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())?;

    let mode = line.mode.as_ref().and_then(|m| match m {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(o) => o
            .get("type")
            .or_else(|| o.get("id"))
            .and_then(|v| v.as_str())
            .map(str::to_string),
        _ => None,
    });

    Some(Line {
        name: name.to_string(),
        product: line.product.as_deref().map(Product::parse),
        product_name: line.product_name.clone(),
        mode,
        operator: line.operator.as_ref().and_then(|o| o.name.clone()),
    })
}

fn convert_stopover(stopover: &VendoStopover) -> Option<Stopover> {
    let station = convert_location(stopover.stop.as_ref()?).ok()?;

    let arrival = stopover
        .planned_arrival
        .as_deref()
        .or(stopover.arrival.as_deref())
        .and_then(|s| parse_timestamp(s).ok());
    let departure = stopover
        .planned_departure
        .as_deref()
        .or(stopover.departure.as_deref())
        .and_then(|s| parse_timestamp(s).ok());

    Some(Stopover {
        station,
        arrival,
        departure,
        cancelled: stopover.cancelled.unwrap_or(false),
    })
}

/// The planned time, derived from the realtime one and its delay when the
/// API only sends the latter.
fn planned_time(
    planned: Option<&str>,
    realtime: Option<&str>,
    delay_secs: Option<i64>,
) -> Result<Option<Timestamp>, ConversionError> {
    if let Some(planned) = planned {
        return parse_timestamp(planned).map(Some);
    }

    match realtime {
        Some(raw) => {
            let realtime = parse_timestamp(raw)?;
            let delay = delay_secs.map(delay_seconds).transpose()?.unwrap_or_default();
            realtime
                .checked_sub_signed(delay)
                .map(Some)
                .ok_or_else(|| ConversionError::InvalidTime(raw.to_string()))
        }
        None => Ok(None),
    }
}

/// A delay in seconds, rejected when chrono can't represent it.
fn delay_seconds(secs: i64) -> Result<Duration, ConversionError> {
    Duration::try_seconds(secs)
        .ok_or_else(|| ConversionError::InvalidTime(format!("delay of {secs}s")))
}

/// A delay that still yields a representable time when applied to `planned`.
fn delay_from(planned: Timestamp, secs: i64) -> Result<Duration, ConversionError> {
    let delay = delay_seconds(secs)?;
    planned
        .checked_add_signed(delay)
        .map(|_| delay)
        .ok_or_else(|| ConversionError::InvalidTime(format!("delay of {secs}s")))
}

/// Parse an ISO 8601 timestamp with offset.
pub fn parse_timestamp(s: &str) -> Result<Timestamp, ConversionError> {
    DateTime::parse_from_rfc3339(s.trim()).map_err(|_| ConversionError::InvalidTime(s.to_string()))
}

/// Render a journey in the wire shape.
pub fn journey_to_wire(journey: &Journey) -> VendoJourney {
    VendoJourney {
        legs: journey.legs().iter().map(leg_to_wire).collect(),
        price: journey.price().map(price_to_wire),
        refresh_token: None,
    }
}

/// Render a fare in the wire shape.
pub fn price_to_wire(price: &Price) -> VendoPrice {
    money_to_wire(price.amount, price.hint.clone())
}

/// Render an amount in euros in the wire shape.
pub fn money_to_wire(amount: Money, hint: Option<String>) -> VendoPrice {
    VendoPrice {
        amount: Some(amount.to_decimal()),
        currency: Some("EUR".to_string()),
        hint,
    }
}

fn leg_to_wire(leg: &Leg) -> VendoLeg {
    let (line, walking) = match leg.kind() {
        LegKind::Walk => (None, Some(true)),
        LegKind::Ride { line } => (line.as_ref().map(line_to_wire), None),
    };

    VendoLeg {
        origin: Some(location_to_wire(leg.origin())),
        destination: Some(location_to_wire(leg.destination())),
        departure: Some(leg.expected_departure().to_rfc3339()),
        planned_departure: Some(leg.departure().to_rfc3339()),
        departure_delay: leg.departure_delay().map(|d| d.num_seconds()),
        arrival: Some(leg.expected_arrival().to_rfc3339()),
        planned_arrival: Some(leg.arrival().to_rfc3339()),
        arrival_delay: leg.arrival_delay().map(|d| d.num_seconds()),
        departure_platform: leg.departure_platform().map(str::to_string),
        arrival_platform: leg.arrival_platform().map(str::to_string),
        line,
        walking,
        cancelled: leg.is_cancelled().then_some(true),
        stopovers: (!leg.stopovers().is_empty())
            .then(|| leg.stopovers().iter().map(stopover_to_wire).collect()),
    }
}

fn location_to_wire(station: &Station) -> VendoLocation {
    VendoLocation {
        kind: Some("stop".to_string()),
        id: Some(station.id.to_string()),
        name: station.name.clone(),
    }
}

fn line_to_wire(line: &Line) -> VendoLine {
    VendoLine {
        name: Some(line.name.clone()),
        product: line.product.as_ref().map(|p| p.as_str().to_string()),
        product_name: line.product_name.clone(),
        mode: line.mode.clone().map(serde_json::Value::String),
        operator: line.operator.as_ref().map(|name| VendoOperator {
            id: None,
            name: Some(name.clone()),
        }),
    }
}

fn stopover_to_wire(stopover: &Stopover) -> VendoStopover {
    VendoStopover {
        stop: Some(location_to_wire(&stopover.station)),
        arrival: None,
        planned_arrival: stopover.arrival.map(|t| t.to_rfc3339()),
        departure: None,
        planned_departure: stopover.departure.map(|t| t.to_rfc3339()),
        cancelled: stopover.cancelled.then_some(true),
    }
}
