//! Domain error types.
//!
//! These errors represent validation failures and data inconsistencies
//! in the domain layer. They are distinct from API/IO errors.

use super::StationId;

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// Journey has no legs
    #[error("journey must have at least one leg")]
    EmptyJourney,

    /// A leg arrives before it departs
    #[error("leg {index} arrives before it departs")]
    ArrivalBeforeDeparture { index: usize },

    /// Consecutive legs don't share a station
    #[error("leg {index} ends at {from} but the next leg starts at {to}")]
    NotContiguous {
        index: usize,
        from: StationId,
        to: StationId,
    },

    /// Consecutive legs overlap in time
    #[error("leg {index} arrives after the next leg departs")]
    OverlappingLegs { index: usize },

    /// Requested sub-range of legs is empty or out of bounds
    #[error("invalid leg range {start}..{end} for a journey of {len} legs")]
    InvalidLegRange { start: usize, end: usize, len: usize },

    /// Travel class is not 1 or 2
    #[error("invalid travel class: {0}")]
    InvalidTravelClass(String),

    /// BahnCard discount tier is not 25, 50 or 100
    #[error("invalid BahnCard: {0}")]
    InvalidBahnCard(String),
}
