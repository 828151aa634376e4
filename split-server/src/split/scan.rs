//! Orchestration of one split scan.
//!
//! A scan enumerates split points, prices every implied segment with
//! bounded concurrency, assembles and ranks the options, and streams
//! progress to its caller as each pricing call resolves.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::domain::{Journey, Money, PassengerContext};

use super::assemble::{QuoteTable, assemble, segment_requests};
use super::config::ScanConfig;
use super::eligibility::journey_fully_covered;
use super::enumerate::split_points;
use super::pricer::{RoutePricer, SegmentQuote, UnpricedReason, select_quote};
use super::progress::{Cancelled, ProgressReporter};
use super::rank::{RankedOption, present};

/// Error from a split scan.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScanError {
    /// The original journey has no fare to compare against
    #[error("original journey has no price")]
    MissingPrice,

    /// Every pricing call failed to reach the pricing API
    #[error("every pricing call failed: {0}")]
    Unreachable(String),

    /// The consumer stopped listening
    #[error("scan cancelled")]
    Cancelled,
}

impl From<Cancelled> for ScanError {
    fn from(_: Cancelled) -> Self {
        ScanError::Cancelled
    }
}

/// A validated scan request.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRequest {
    journey: Journey,
    original_price: Money,
    passenger: PassengerContext,
}

impl ScanRequest {
    /// Validate the original journey.
    ///
    /// # Errors
    ///
    /// Returns `Err(ScanError::MissingPrice)` when the journey carries no
    /// fare.
    pub fn new(journey: Journey, passenger: PassengerContext) -> Result<Self, ScanError> {
        let original_price = journey.price().ok_or(ScanError::MissingPrice)?.amount;
        Ok(Self {
            journey,
            original_price,
            passenger,
        })
    }

    pub fn journey(&self) -> &Journey {
        &self.journey
    }

    pub fn original_price(&self) -> Money {
        self.original_price
    }

    pub fn passenger(&self) -> &PassengerContext {
        &self.passenger
    }
}

/// Runs split scans against a pricer.
#[derive(Debug)]
pub struct SplitScanner<P> {
    pricer: Arc<P>,
    config: ScanConfig,
}

impl<P> Clone for SplitScanner<P> {
    fn clone(&self) -> Self {
        Self {
            pricer: Arc::clone(&self.pricer),
            config: self.config.clone(),
        }
    }
}

impl<P: RoutePricer + Send + Sync + 'static> SplitScanner<P> {
    pub fn new(pricer: P, config: ScanConfig) -> Self {
        Self::from_shared(Arc::new(pricer), config)
    }

    /// A scanner sharing an existing pricer.
    pub fn from_shared(pricer: Arc<P>, config: ScanConfig) -> Self {
        Self { pricer, config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn pricer(&self) -> &P {
        &self.pricer
    }

    /// Run a scan to its terminal event.
    ///
    /// Emits progress while pricing, then exactly one `Complete` or
    /// `Error` event, unless the consumer has gone away.
    pub async fn run(&self, request: &ScanRequest, mut reporter: ProgressReporter) {
        match self.scan(request, &mut reporter).await {
            Ok(options) => {
                info!(options = options.len(), "scan complete");
                if reporter.complete(options).await.is_err() {
                    debug!("consumer left before completion");
                }
            }
            Err(ScanError::Cancelled) => {
                info!("scan cancelled by consumer");
            }
            Err(e) => {
                warn!(error = %e, "scan failed");
                if reporter.fail(e.to_string()).await.is_err() {
                    debug!("consumer left before failure");
                }
            }
        }
    }

    /// Price every segment and return the options to present.
    ///
    /// Per-segment failures and timeouts leave that segment unpriced. The
    /// scan fails only when every pricing call found the API unreachable,
    /// or when the consumer goes away.
    pub async fn scan(
        &self,
        request: &ScanRequest,
        reporter: &mut ProgressReporter,
    ) -> Result<Vec<RankedOption>, ScanError> {
        let journey = &request.journey;
        let passenger = &request.passenger;

        let limit = self.config.split_point_limit();
        let mut points = split_points(journey);
        if points.len() > limit {
            info!(
                found = points.len(),
                kept = limit,
                "too many split points, keeping the first"
            );
            points.truncate(limit);
        }

        let mut quotes = QuoteTable::new();
        let mut to_query = Vec::new();
        for segment in segment_requests(journey, &points) {
            if journey_fully_covered(&segment.journey, passenger) {
                quotes.insert(segment.legs.clone(), SegmentQuote::Covered);
            } else {
                to_query.push(segment);
            }
        }

        debug!(
            split_points = points.len(),
            queries = to_query.len(),
            covered = quotes.len(),
            "starting scan"
        );

        if reporter.is_closed() {
            return Err(ScanError::Cancelled);
        }
        reporter.start(to_query.len(), journey.origin()).await?;

        let queried = to_query.len();
        let timeout = self.config.call_timeout();
        let tolerance = self.config.departure_tolerance();
        let shared_passenger = Arc::new(passenger.clone());
        let pricer = Arc::clone(&self.pricer);

        let mut results = stream::iter(to_query)
            .map(move |segment| {
                let pricer = Arc::clone(&pricer);
                let passenger = Arc::clone(&shared_passenger);
                async move {
                    let lookup = pricer.price_route(
                        &segment.journey.origin().id,
                        &segment.journey.destination().id,
                        segment.departure(),
                        &passenger,
                    );
                    let outcome = tokio::time::timeout(timeout, lookup).await;
                    (segment, outcome)
                }
            })
            .buffered(self.config.max_concurrent.max(1));

        let mut unreachable = Vec::new();

        loop {
            let next = tokio::select! {
                next = results.next() => next,
                _ = reporter.closed() => return Err(ScanError::Cancelled),
            };
            let Some((segment, outcome)) = next else {
                break;
            };

            let from = segment.journey.origin();
            let to = segment.journey.destination();

            let quote = match outcome {
                Err(_) => {
                    warn!(from = %from.id, to = %to.id, "pricing call timed out");
                    SegmentQuote::Unpriced(UnpricedReason::TimedOut)
                }
                Ok(Err(e)) => {
                    warn!(from = %from.id, to = %to.id, error = %e, "pricing call failed");
                    if e.is_unreachable() {
                        unreachable.push(e.to_string());
                    }
                    SegmentQuote::Unpriced(UnpricedReason::Failed(e))
                }
                Ok(Ok(route)) => select_quote(&segment.journey, route, tolerance),
            };

            debug!(from = %from.id, to = %to.id, ?quote, "segment priced");

            let message = format!("Checking {} → {}", from.display_name(), to.display_name());
            reporter.advance(from, message).await?;

            quotes.insert(segment.legs, quote);
        }

        if queried > 0 && unreachable.len() == queried {
            return Err(ScanError::Unreachable(unreachable.swap_remove(0)));
        }

        let options = assemble(journey, &points, &quotes, passenger);
        debug!(assembled = options.len(), "options assembled");

        Ok(present(options, request.original_price, passenger))
    }
}
