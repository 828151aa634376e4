//! Journey API response DTOs.
//!
//! These types map directly to the JSON the journey API returns from
//! `GET /journeys`. They use `Option` liberally because the API omits
//! fields rather than sending null values, and some fields change shape
//! between profiles (`line.mode` is sometimes a string, sometimes an
//! object). Nothing here is trusted; `convert` validates it into domain
//! types.

use serde::{Deserialize, Serialize};

/// Response from `GET /journeys`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneysResponse {
    /// Journeys found, in the API's order.
    #[serde(default)]
    pub journeys: Vec<VendoJourney>,

    /// Paging token for earlier journeys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earlier_ref: Option<String>,

    /// Paging token for later journeys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub later_ref: Option<String>,
}

/// A journey as returned by the API.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendoJourney {
    #[serde(default)]
    pub legs: Vec<VendoLeg>,

    /// Cheapest fare for the whole journey, if the API could price it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<VendoPrice>,

    /// Token to refresh this journey later.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// One leg of a journey.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendoLeg {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<VendoLocation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<VendoLocation>,

    /// Realtime departure (ISO 8601), or planned if no realtime data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure: Option<String>,

    /// Planned departure (ISO 8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_departure: Option<String>,

    /// Departure delay in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_delay: Option<i64>,

    /// Realtime arrival (ISO 8601), or planned if no realtime data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival: Option<String>,

    /// Planned arrival (ISO 8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_arrival: Option<String>,

    /// Arrival delay in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_delay: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_platform: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_platform: Option<String>,

    /// Line information; absent for walks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<VendoLine>,

    /// True for walking transfers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walking: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled: Option<bool>,

    /// Intermediate stops, including the leg's own origin and destination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopovers: Option<Vec<VendoStopover>>,
}

/// A station, stop or location reference.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendoLocation {
    /// Location kind: "station", "stop" or "location".
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Line information for a ride.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendoLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Product id, e.g. "nationalExpress", "regional".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,

    /// Short label, e.g. "ICE", "RE", "FLX".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,

    /// Mode; a string in most profiles, an object in some.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<VendoOperator>,
}

/// Operating company.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendoOperator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// An intermediate stop on a leg.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendoStopover {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<VendoLocation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_arrival: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_departure: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled: Option<bool>,
}

/// A fare.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendoPrice {
    /// Decimal amount, e.g. 49.9. Null when the fare is unknown.
    #[serde(default)]
    pub amount: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}
