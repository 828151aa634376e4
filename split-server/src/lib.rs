//! Split-ticket finder server.
//!
//! A web application that answers: "is this train journey cheaper when
//! bought as several tickets?"

pub mod cache;
pub mod config;
pub mod domain;
pub mod journeys;
pub mod split;
pub mod vendo;
pub mod web;
