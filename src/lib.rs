//! Shorecast library — surf bulletin zone snapshots.
//!
//! Periodically loads a NOAA forecast product page in a headless browser,
//! extracts one forecast zone from its delimited text blocks, renders the
//! zone to a PNG artifact, and publishes it at a single fixed path served
//! over HTTP.

pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod extract;
pub mod fetch;
pub mod publish;
pub mod render;
pub mod rest;
pub mod scheduler;
pub mod snapshot;
