//! Test fixtures: journey builders and a canned pricer.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration};
use proptest::prelude::*;

use crate::domain::{
    Journey, Leg, Line, Money, PassengerContext, Price, Product, Station, StationId, Timestamp,
};

use super::pricer::{PricingError, RoutePricer, RouteQuote};

/// A timestamp on the test day.
pub fn ts(hhmm: &str) -> Timestamp {
    DateTime::parse_from_rfc3339(&format!("2025-06-02T{hhmm}:00+02:00")).unwrap()
}

pub fn station(id: &str) -> Station {
    Station::new(StationId::parse(id).unwrap(), format!("{id} Hbf"))
}

/// A line whose product is inferred from the name's prefix.
pub fn line(name: &str) -> Line {
    let prefix = name.split_whitespace().next().unwrap_or_default();
    let product = match prefix {
        "ICE" => Some(Product::NationalExpress),
        "IC" | "EC" => Some(Product::National),
        "RE" => Some(Product::RegionalExpress),
        "RB" => Some(Product::Regional),
        "S" => Some(Product::Suburban),
        "Bus" => Some(Product::Bus),
        _ => None,
    };

    let mut line = Line::named(name);
    line.product = product;
    line.product_name = Some(prefix.to_string());
    line
}

pub fn ride(from: &str, to: &str, dep: &str, arr: &str, line_name: &str) -> Leg {
    ride_on(from, to, dep, arr, line(line_name))
}

pub fn ride_on(from: &str, to: &str, dep: &str, arr: &str, line: Line) -> Leg {
    Leg::ride(station(from), station(to), ts(dep), ts(arr), Some(line)).unwrap()
}

pub fn walk(from: &str, to: &str, dep: &str, arr: &str) -> Leg {
    Leg::walk(station(from), station(to), ts(dep), ts(arr)).unwrap()
}

/// A journey with an optional price in cents.
pub fn journey(legs: Vec<Leg>, cents: Option<i64>) -> Journey {
    Journey::new(legs, cents.map(|c| Price::new(Money::from_cents(c)))).unwrap()
}

/// A single-leg priced alternative, as the pricing API would return it.
pub fn offer(from: &str, to: &str, dep: &str, arr: &str, line_name: &str, cents: i64) -> Journey {
    journey(vec![ride(from, to, dep, arr, line_name)], Some(cents))
}

/// An unpriced single-leg alternative.
pub fn unpriced_offer(from: &str, to: &str, dep: &str, arr: &str, line_name: &str) -> Journey {
    journey(vec![ride(from, to, dep, arr, line_name)], None)
}

const LINES: [&str; 6] = ["ICE 1", "IC 2", "RE 3", "RB 4", "S 5", "FLX 6"];

/// Arbitrary valid journeys of one to six legs over a small station pool.
pub fn arb_journey() -> impl Strategy<Value = Journey> {
    (1usize..=6)
        .prop_flat_map(|n| {
            (
                prop::collection::vec(0usize..5, n + 1),
                prop::collection::vec((any::<bool>(), 0usize..LINES.len()), n),
                prop::option::of(100i64..50_000),
            )
        })
        .prop_map(|(stations, kinds, cents)| {
            let start = ts("06:00");
            let legs = kinds
                .iter()
                .enumerate()
                .map(|(i, &(walking, line_idx))| {
                    let from = station(&format!("S{}", stations[i]));
                    let to = station(&format!("S{}", stations[i + 1]));
                    let dep = start + Duration::minutes(30 * i as i64);
                    let arr = dep + Duration::minutes(25);
                    if walking {
                        Leg::walk(from, to, dep, arr).unwrap()
                    } else {
                        Leg::ride(from, to, dep, arr, Some(line(LINES[line_idx]))).unwrap()
                    }
                })
                .collect();
            Journey::new(legs, cents.map(|c| Price::new(Money::from_cents(c)))).unwrap()
        })
}

/// A pricer that answers from a fixed table and records every call.
///
/// Station pairs missing from the table answer with no alternatives.
#[derive(Default)]
pub struct StubPricer {
    answers: HashMap<(String, String), Result<RouteQuote, PricingError>>,
    delays: HashMap<(String, String), StdDuration>,
    calls: Mutex<Vec<(String, String)>>,
}

impl StubPricer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, from: &str, to: &str, quote: RouteQuote) -> Self {
        self.answers.insert(key(from, to), Ok(quote));
        self
    }

    pub fn offers(self, from: &str, to: &str, journeys: Vec<Journey>) -> Self {
        self.answer(from, to, RouteQuote::Alternatives(journeys))
    }

    pub fn fail(mut self, from: &str, to: &str, error: PricingError) -> Self {
        self.answers.insert(key(from, to), Err(error));
        self
    }

    pub fn delay(mut self, from: &str, to: &str, delay: StdDuration) -> Self {
        self.delays.insert(key(from, to), delay);
        self
    }

    /// Calls made so far, in the order they started.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

fn key(from: &str, to: &str) -> (String, String) {
    (from.to_string(), to.to_string())
}

impl RoutePricer for StubPricer {
    async fn price_route(
        &self,
        origin: &StationId,
        destination: &StationId,
        _departure: Timestamp,
        _passenger: &PassengerContext,
    ) -> Result<RouteQuote, PricingError> {
        let key = key(origin.as_str(), destination.as_str());
        self.calls.lock().unwrap().push(key.clone());

        if let Some(delay) = self.delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }

        self.answers
            .get(&key)
            .cloned()
            .unwrap_or(Ok(RouteQuote::Alternatives(Vec::new())))
    }
}
