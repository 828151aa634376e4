//! Domain types for the split-ticket finder.
//!
//! This module contains the core domain model types that represent
//! validated journey data. All types enforce their invariants at
//! construction time, so code that receives these types can trust their
//! validity.

mod error;
mod journey;
mod leg;
mod money;
mod passenger;
mod station;

pub use error::DomainError;
pub use journey::Journey;
pub use leg::{Leg, LegKind, Line, Product, Stopover, Timestamp};
pub use money::{InvalidAmount, Money, Price};
pub use passenger::{BahnCardDiscount, LoyaltyCard, PassengerContext, TravelClass};
pub use station::{InvalidStationId, Station, StationId};
