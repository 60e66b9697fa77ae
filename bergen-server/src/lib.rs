//! Bergen dashboard backend.
//!
//! Serves live public-transport departures for Bergen stops, looked up by
//! stop id or by a free-text stop name, alongside bike-share availability
//! and the local weather forecast.

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod domain;
pub mod entur;
pub mod proxy;
pub mod stops;
pub mod web;
