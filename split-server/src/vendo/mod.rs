//! Journey API client.
//!
//! This module provides an HTTP client for a db-rest style journey API,
//! which plans and prices journeys on the German rail network.
//!
//! Key characteristics of the API:
//! - Payloads are loosely typed: fields are omitted rather than null, and
//!   some change shape between profiles
//! - Fares are decimal euro amounts and may be null when the API cannot
//!   price a journey (competing carriers in particular)
//! - Public instances rate-limit aggressively, so requests are bounded by
//!   a semaphore

mod client;
mod convert;
mod error;
mod types;

pub use client::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT, JourneyQuery, VendoClient, VendoConfig};
pub use convert::{
    ConversionError, convert_journey, convert_journeys, journey_to_wire, money_to_wire,
    parse_timestamp, price_to_wire,
};
pub use error::VendoError;
pub use types::{
    JourneysResponse, VendoJourney, VendoLeg, VendoLine, VendoLocation, VendoOperator,
    VendoPrice, VendoStopover,
};
