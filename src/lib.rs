//! Event Locator: location resolution for the event-discovery app.
//!
//! Library entry points live in [`location`]; [`config`] builds providers from
//! flags and environment, and [`server`] exposes the same operations over HTTP.

pub mod config;
pub mod location;
pub mod server;
