//! Journey API HTTP client.
//!
//! Provides async methods for querying a db-rest style `/journeys`
//! endpoint. Handles the user agent, concurrency limiting, and conversion
//! to domain types.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::{Journey, PassengerContext, StationId, Timestamp, TravelClass};
use crate::split::{PricingError, RoutePricer, RouteQuote};

use super::convert::convert_journeys;
use super::error::VendoError;
use super::types::JourneysResponse;

/// Default base URL for the journey API.
pub const DEFAULT_BASE_URL: &str = "https://v6.db.transport.rest";

/// Default user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "split-server";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Default number of journeys requested per query.
const DEFAULT_RESULTS: u8 = 5;

/// Longest error body kept for diagnostics.
const MAX_ERROR_BODY: usize = 500;

/// Configuration for the journey API client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendoConfig {
    /// Base URL for the API
    pub base_url: String,
    /// User agent; public instances ask clients to identify themselves
    pub user_agent: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Journeys requested per query unless the query says otherwise
    pub results: u8,
}

impl VendoConfig {
    /// Create a config pointing at the public instance.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
            results: DEFAULT_RESULTS,
        }
    }

    /// Set a custom base URL (for self-hosted instances and testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the default number of journeys per query.
    pub fn with_results(mut self, results: u8) -> Self {
        self.results = results;
        self
    }
}

impl Default for VendoConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Parameters of one journey search.
#[derive(Debug, Clone, PartialEq)]
pub struct JourneyQuery {
    pub origin: StationId,
    pub destination: StationId,
    /// Departure time; the API uses "now" when absent
    pub departure: Option<Timestamp>,
    /// Overrides the client's default result count
    pub results: Option<u8>,
    pub passenger: PassengerContext,
}

impl JourneyQuery {
    /// A query for the next departures between two stations.
    pub fn new(origin: StationId, destination: StationId) -> Self {
        Self {
            origin,
            destination,
            departure: None,
            results: None,
            passenger: PassengerContext::default(),
        }
    }

    pub fn departing_at(mut self, departure: Timestamp) -> Self {
        self.departure = Some(departure);
        self
    }

    pub fn with_results(mut self, results: u8) -> Self {
        self.results = Some(results);
        self
    }

    pub fn with_passenger(mut self, passenger: PassengerContext) -> Self {
        self.passenger = passenger;
        self
    }

    /// Query string parameters for `GET /journeys`.
    pub fn params(&self, default_results: u8) -> Vec<(&'static str, String)> {
        let passenger = &self.passenger;

        let mut params = vec![
            ("from", self.origin.to_string()),
            ("to", self.destination.to_string()),
        ];

        if let Some(departure) = self.departure {
            params.push(("departure", departure.to_rfc3339()));
        }

        params.push((
            "results",
            self.results.unwrap_or(default_results).to_string(),
        ));
        params.push(("stopovers", "true".to_string()));
        params.push((
            "firstClass",
            (passenger.travel_class == TravelClass::First).to_string(),
        ));

        if let Some(card) = &passenger.loyalty_card {
            params.push(("loyaltyCard", card.to_string()));
        }

        if let Some(age) = passenger.age {
            params.push(("age", age.to_string()));
        }

        params.push((
            "deutschlandTicketDiscount",
            passenger.has_regional_pass.to_string(),
        ));

        params
    }
}

/// Journey API client.
///
/// Uses a semaphore to limit concurrent requests and avoid tripping the
/// API's abuse protection.
#[derive(Debug, Clone)]
pub struct VendoClient {
    http: reqwest::Client,
    base_url: String,
    results: u8,
    semaphore: Arc<Semaphore>,
}

impl VendoClient {
    /// Create a new client with the given configuration.
    pub fn new(config: VendoConfig) -> Result<Self, VendoError> {
        let mut headers = HeaderMap::new();

        let agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|_| VendoError::Config(format!("invalid user agent {:?}", config.user_agent)))?;
        headers.insert(USER_AGENT, agent);

        if config.max_concurrent == 0 {
            return Err(VendoError::Config("max_concurrent must be at least 1".into()));
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            results: config.results,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// Search journeys between two stations.
    ///
    /// Malformed journeys in the response are skipped; the rest are
    /// returned in the API's order.
    pub async fn journeys(&self, query: &JourneyQuery) -> Result<Vec<Journey>, VendoError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| VendoError::Config("semaphore closed".to_string()))?;

        let url = format!("{}/journeys", self.base_url);

        debug!(
            from = %query.origin,
            to = %query.destination,
            departure = ?query.departure.map(|d| d.to_rfc3339()),
            "querying journeys"
        );

        let response = self
            .http
            .get(&url)
            .query(&query.params(self.results))
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(VendoError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(VendoError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VendoError::Api {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let body = response.text().await?;

        let parsed: JourneysResponse =
            serde_json::from_str(&body).map_err(|e| VendoError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(MAX_ERROR_BODY).collect()),
            })?;

        let journeys = convert_journeys(&parsed);

        debug!(
            from = %query.origin,
            to = %query.destination,
            received = parsed.journeys.len(),
            converted = journeys.len(),
            "journeys received"
        );

        Ok(journeys)
    }
}

impl From<VendoError> for PricingError {
    fn from(e: VendoError) -> Self {
        if e.is_unreachable() {
            return PricingError::Unreachable(e.to_string());
        }

        match e {
            VendoError::RateLimited => PricingError::RateLimited,
            VendoError::Json { message, .. } => PricingError::Malformed(message),
            VendoError::Http(e) if e.is_timeout() => PricingError::Timeout,
            other => PricingError::Upstream(other.to_string()),
        }
    }
}

impl RoutePricer for VendoClient {
    async fn price_route(
        &self,
        origin: &StationId,
        destination: &StationId,
        departure: Timestamp,
        passenger: &PassengerContext,
    ) -> Result<RouteQuote, PricingError> {
        let query = JourneyQuery::new(origin.clone(), destination.clone())
            .departing_at(departure)
            .with_passenger(passenger.clone());

        let journeys = self.journeys(&query).await?;

        Ok(RouteQuote::from_journeys(journeys))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BahnCardDiscount, LoyaltyCard};
    use chrono::DateTime;

    fn id(s: &str) -> StationId {
        StationId::parse(s).unwrap()
    }

    fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn config_builder() {
        let config = VendoConfig::new()
            .with_base_url("http://localhost:3000/")
            .with_user_agent("tests")
            .with_max_concurrent(10)
            .with_timeout(60)
            .with_results(3);

        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.user_agent, "tests");
        assert_eq!(config.max_concurrent, 10);
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.results, 3);
    }

    #[test]
    fn config_defaults() {
        let config = VendoConfig::default();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.max_concurrent, DEFAULT_MAX_CONCURRENT);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.results, DEFAULT_RESULTS);
    }

    #[test]
    fn client_creation() {
        assert!(VendoClient::new(VendoConfig::new()).is_ok());
        assert!(matches!(
            VendoClient::new(VendoConfig::new().with_max_concurrent(0)),
            Err(VendoError::Config(_))
        ));
        assert!(matches!(
            VendoClient::new(VendoConfig::new().with_user_agent("bad\nagent")),
            Err(VendoError::Config(_))
        ));
    }

    #[test]
    fn params_minimal() {
        let query = JourneyQuery::new(id("8011160"), id("8000261"));
        let params = query.params(5);

        assert_eq!(param(&params, "from"), Some("8011160"));
        assert_eq!(param(&params, "to"), Some("8000261"));
        assert_eq!(param(&params, "departure"), None);
        assert_eq!(param(&params, "results"), Some("5"));
        assert_eq!(param(&params, "stopovers"), Some("true"));
        assert_eq!(param(&params, "firstClass"), Some("false"));
        assert_eq!(param(&params, "loyaltyCard"), None);
        assert_eq!(param(&params, "age"), None);
        assert_eq!(param(&params, "deutschlandTicketDiscount"), Some("false"));
    }

    #[test]
    fn params_with_passenger() {
        let passenger = PassengerContext::new()
            .with_travel_class(TravelClass::First)
            .with_age(30)
            .with_loyalty_card(LoyaltyCard::BahnCard {
                discount: BahnCardDiscount::Bc50,
                class: TravelClass::First,
            })
            .with_regional_pass(true);

        let query = JourneyQuery::new(id("8011160"), id("8000261"))
            .departing_at(DateTime::parse_from_rfc3339("2025-06-02T08:00:00+02:00").unwrap())
            .with_results(2)
            .with_passenger(passenger);
        let params = query.params(5);

        assert_eq!(param(&params, "departure"), Some("2025-06-02T08:00:00+02:00"));
        assert_eq!(param(&params, "results"), Some("2"));
        assert_eq!(param(&params, "firstClass"), Some("true"));
        assert_eq!(param(&params, "loyaltyCard"), Some("bahncard-1st-50"));
        assert_eq!(param(&params, "age"), Some("30"));
        assert_eq!(param(&params, "deutschlandTicketDiscount"), Some("true"));
    }

    #[test]
    fn vendo_errors_map_to_pricing_errors() {
        assert_eq!(
            PricingError::from(VendoError::RateLimited),
            PricingError::RateLimited
        );
        assert_eq!(
            PricingError::from(VendoError::Json {
                message: "eof".into(),
                body: None
            }),
            PricingError::Malformed("eof".into())
        );
        assert!(matches!(
            PricingError::from(VendoError::Api {
                status: 503,
                message: "down".into()
            }),
            PricingError::Upstream(_)
        ));
    }

    #[tokio::test]
    async fn unreachable_api_maps_to_unreachable() {
        // Port 9 on localhost is discard; nothing listens there in test environments.
        let client = VendoClient::new(
            VendoConfig::new()
                .with_base_url("http://127.0.0.1:9")
                .with_timeout(5),
        )
        .unwrap();

        let err = client
            .journeys(&JourneyQuery::new(id("1"), id("2")))
            .await
            .unwrap_err();
        assert!(err.is_unreachable(), "unexpected error: {err}");
    }
}
